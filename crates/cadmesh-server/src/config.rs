// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Server configuration from environment variables
//!
//! | variable | default |
//! |---|---|
//! | `HOST` | `0.0.0.0` |
//! | `PORT` | `8000` |
//! | `CADMESH_MAX_UPLOAD_MB` | `50` |
//! | `CADMESH_LINEAR_DEFLECTION` | `0.1` |
//! | `CADMESH_ANGULAR_DEFLECTION` | `0.5` |
//! | `CADMESH_PART_GROUPING` | `merged` (or `per-part`) |
//! | `CADMESH_TIMEOUT_SECS` | `120` |
//!
//! Invalid values are logged and replaced by their default.

use cadmesh_converter::{ConverterOptions, MeshParams, PartGrouping};
use std::fmt::Debug;
use std::str::FromStr;
use std::time::Duration;

const MIB: usize = 1024 * 1024;

/// Runtime settings of the HTTP service
#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// TCP port
    pub port: u16,
    /// Largest accepted upload in bytes
    pub max_upload_bytes: usize,
    /// Tessellation deflections
    pub params: MeshParams,
    /// Output mesh grouping
    pub grouping: PartGrouping,
    /// Time allowed for one conversion
    pub timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_bytes: 50 * MIB,
            params: MeshParams::default(),
            grouping: PartGrouping::Merged,
            timeout: Duration::from_secs(120),
        }
    }
}

impl ServerConfig {
    /// Read the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let host = parse_var(&lookup, "HOST", defaults.host, |h: &String| !h.is_empty());
        let port = parse_var(&lookup, "PORT", defaults.port, |p| *p > 0);
        let max_upload_mb = parse_var(
            &lookup,
            "CADMESH_MAX_UPLOAD_MB",
            defaults.max_upload_bytes / MIB,
            |mb| *mb > 0,
        );
        let linear = parse_var(
            &lookup,
            "CADMESH_LINEAR_DEFLECTION",
            defaults.params.linear_deflection,
            positive,
        );
        let angular = parse_var(
            &lookup,
            "CADMESH_ANGULAR_DEFLECTION",
            defaults.params.angular_deflection,
            positive,
        );
        let grouping = parse_var(&lookup, "CADMESH_PART_GROUPING", defaults.grouping, |_| true);
        let timeout_secs = parse_var(
            &lookup,
            "CADMESH_TIMEOUT_SECS",
            defaults.timeout.as_secs(),
            |s| *s > 0,
        );

        Self {
            host,
            port,
            max_upload_bytes: max_upload_mb.saturating_mul(MIB),
            params: MeshParams::new(linear, angular),
            grouping,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// `host:port` to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Upload limit in whole megabytes (for messages)
    pub fn max_upload_mb(&self) -> usize {
        self.max_upload_bytes / MIB
    }

    /// Options for the conversion pipeline
    pub fn converter_options(&self) -> ConverterOptions {
        ConverterOptions {
            params: self.params,
            grouping: self.grouping,
            reject_empty: false,
        }
    }
}

fn positive(v: &f64) -> bool {
    v.is_finite() && *v > 0.0
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    valid: impl Fn(&T) -> bool,
) -> T
where
    T: FromStr + Debug,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) if valid(&value) => value,
        _ => {
            log::warn!("Ignoring invalid {}={:?}, using {:?}", key, raw, default);
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
        assert_eq!(config.params, MeshParams::new(0.1, 0.5));
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("CADMESH_MAX_UPLOAD_MB", "5"),
            ("CADMESH_LINEAR_DEFLECTION", "0.01"),
            ("CADMESH_ANGULAR_DEFLECTION", " 0.2 "),
            ("CADMESH_PART_GROUPING", "per-part"),
            ("CADMESH_TIMEOUT_SECS", "30"),
        ]);
        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert_eq!(config.max_upload_mb(), 5);
        assert_eq!(config.params.linear_deflection, 0.01);
        assert_eq!(config.params.angular_deflection, 0.2);
        assert_eq!(config.grouping, PartGrouping::PerPart);
        assert_eq!(config.timeout, Duration::from_secs(30));

        let options = config.converter_options();
        assert_eq!(options.grouping, PartGrouping::PerPart);
        assert!(!options.reject_empty);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config(&[
            ("PORT", "eighty"),
            ("CADMESH_MAX_UPLOAD_MB", "0"),
            ("CADMESH_LINEAR_DEFLECTION", "-1"),
            ("CADMESH_ANGULAR_DEFLECTION", "NaN"),
            ("CADMESH_PART_GROUPING", "assemblies"),
            ("CADMESH_TIMEOUT_SECS", "0"),
        ]);
        assert_eq!(config, ServerConfig::default());
    }
}
