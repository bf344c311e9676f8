// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IGES (Initial Graphics Exchange Specification) reader
//!
//! Decodes the fixed-format sections eagerly and transfers B-rep solids,
//! shells and faces into a [`BrepModel`].

mod records;
mod transfer;

pub use records::{Delimiters, DirectoryEntry, Param};

use cadmesh_model::{BrepModel, ModelMetadata, ParseError, Result};
use records::{
    entry_params, global_metadata, global_text, parse_delimiters, parse_directory, split_params,
    split_sections,
};
use rustc_hash::FxHashMap;
use std::path::Path;

/// One decoded entity: directory entry plus parameter values
///
/// `params` excludes the leading entity type number.
#[derive(Clone, Debug)]
pub struct IgesEntity {
    pub entry: DirectoryEntry,
    pub params: Vec<Param>,
}

impl IgesEntity {
    /// Entity type number
    pub fn entity_type(&self) -> i32 {
        self.entry.entity_type
    }
}

/// A parsed IGES file
pub struct IgesFile {
    entities: FxHashMap<u32, IgesEntity>,
    /// Directory pointers in file order
    order: Vec<u32>,
    metadata: ModelMetadata,
}

impl IgesFile {
    /// Parse ASCII file content
    ///
    /// Fails when the directory section is missing or malformed.
    pub fn parse(content: &str) -> Result<Self> {
        let sections = split_sections(content);
        if sections.directory.is_empty() {
            return Err(ParseError::format("missing IGES directory section"));
        }

        let global = global_text(&sections.global);
        let delims = parse_delimiters(&global);
        let metadata = global_metadata(&split_params(&global, delims));

        let directory = parse_directory(&sections.directory)?;
        let mut entities = FxHashMap::default();
        let mut order = Vec::with_capacity(directory.len());

        for entry in directory {
            // Null entities (type 0) are padding
            if entry.entity_type == 0 {
                continue;
            }
            let Some(text) = entry_params(&sections.parameter, &entry) else {
                log::warn!(
                    "IGES entity {} (type {}) has no parameter data",
                    entry.pointer,
                    entry.entity_type
                );
                continue;
            };

            let mut params = split_params(&text, delims);
            match params.first().and_then(Param::as_i64) {
                Some(t) if t == i64::from(entry.entity_type) => {
                    params.remove(0);
                }
                _ => log::debug!(
                    "IGES entity {}: parameter data does not start with type {}",
                    entry.pointer,
                    entry.entity_type
                ),
            }

            order.push(entry.pointer);
            entities.insert(entry.pointer, IgesEntity { entry, params });
        }

        if entities.is_empty() {
            return Err(ParseError::format("IGES file contains no entities"));
        }

        log::debug!(
            "IGES file parsed: {} entities, from '{}'",
            entities.len(),
            metadata.originating_system.as_deref().unwrap_or("unknown")
        );

        Ok(Self {
            entities,
            order,
            metadata,
        })
    }

    /// Read and parse a file from disk
    ///
    /// Non-ASCII bytes are blanked so that column arithmetic stays valid.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let text: String = bytes
            .iter()
            .map(|&b| if b.is_ascii() { b as char } else { ' ' })
            .collect();
        Self::parse(&text)
    }

    /// Entity by directory pointer
    pub fn entity(&self, pointer: u32) -> Option<&IgesEntity> {
        self.entities.get(&pointer)
    }

    /// Pointers of all entities of a type, in file order
    pub fn ids_by_type(&self, entity_type: i32) -> Vec<u32> {
        self.order
            .iter()
            .copied()
            .filter(|p| {
                self.entities
                    .get(p)
                    .is_some_and(|e| e.entry.entity_type == entity_type)
            })
            .collect()
    }

    /// Number of decoded entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Global section information
    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Transfer every root into a B-rep model
    pub fn transfer(&self) -> BrepModel {
        transfer::Transfer::new(self).run()
    }
}

/// Builds IGES files from `(type, form, transform, params)` tuples
///
/// The n-th entity (0-based) gets directory pointer `2n + 1`.
#[cfg(test)]
pub(crate) fn build_iges(entities: &[(i32, i32, u32, &str)]) -> String {
    let mut directory = Vec::new();
    let mut parameter = Vec::new();

    for (i, (entity_type, form, transform, params)) in entities.iter().enumerate() {
        let pointer = 2 * i + 1;
        let text = format!("{},{}", entity_type, params);
        let chunks: Vec<String> = text
            .as_bytes()
            .chunks(64)
            .map(|c| String::from_utf8_lossy(c).into_owned())
            .collect();
        let start = parameter.len() + 1;

        for chunk in &chunks {
            let seq = parameter.len() + 1;
            parameter.push(format!("{:<64} {:>7}P{:>7}", chunk, pointer, seq));
        }

        directory.push(format!(
            "{:>8}{:>8}{:>8}{:>8}{:>8}{:>8}{:>8}{:>8}{:>8}D{:>7}",
            entity_type, start, 0, 1, 0, 0, transform, 0, "00000000", pointer
        ));
        directory.push(format!(
            "{:>8}{:>8}{:>8}{:>8}{:>8}{:>8}{:>8}{:>8}{:>8}D{:>7}",
            entity_type,
            0,
            0,
            chunks.len(),
            form,
            "",
            "",
            "",
            0,
            pointer + 1
        ));
    }

    let global = "1H,,1H;,4Htest,8Htest.igs,7HTestCAD,3H1.0,32,38,6,308,15,4Htest,1.,2,2HMM,1,1.,13H20240101.1200;";
    let mut out = vec![format!("{:<72}S{:>7}", "cadmesh test file", 1)];
    for (i, chunk) in global.as_bytes().chunks(72).enumerate() {
        out.push(format!(
            "{:<72}G{:>7}",
            String::from_utf8_lossy(chunk),
            i + 1
        ));
    }
    let global_count = out.len() - 1;
    out.extend(directory.iter().cloned());
    out.extend(parameter.iter().cloned());
    out.push(format!(
        "{:<72}T{:>7}",
        format!(
            "S{:>7}G{:>7}D{:>7}P{:>7}",
            1,
            global_count,
            directory.len(),
            parameter.len()
        ),
        1
    ));
    out.join("\n")
}
