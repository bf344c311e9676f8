// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for tessellation

use thiserror::Error;

/// Tessellation result type
pub type Result<T> = std::result::Result<T, Error>;

/// Per-face tessellation errors
///
/// These never leave the kernel: a face that fails to mesh simply has no
/// triangulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Triangulation error
    #[error("Triangulation error: {0}")]
    Triangulation(String),

    /// Boundary wires that do not enclose an area
    #[error("Degenerate boundary: {0}")]
    DegenerateBoundary(String),

    /// Surface kind the built-in kernel cannot mesh
    #[error("Unsupported surface: {0}")]
    UnsupportedSurface(String),

    /// Deflection parameters out of range
    #[error("Invalid mesh parameters: {0}")]
    InvalidParams(String),
}

impl Error {
    /// Create a triangulation error
    pub fn triangulation(msg: impl Into<String>) -> Self {
        Error::Triangulation(msg.into())
    }

    /// Create a degenerate boundary error
    pub fn degenerate(msg: impl Into<String>) -> Self {
        Error::DegenerateBoundary(msg.into())
    }

    /// Create an unsupported surface error
    pub fn unsupported_surface(name: impl Into<String>) -> Self {
        Error::UnsupportedSurface(name.into())
    }
}
