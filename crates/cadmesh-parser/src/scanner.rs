// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fast entity scanner using SIMD-accelerated byte searching
//!
//! Scans Part 21 files to discover entity instances without full parsing.

use crate::tokenizer::parse_record;
use cadmesh_model::{AttributeValue, ModelMetadata};
use memchr::{memchr, memmem};
use rustc_hash::FxHashMap;

/// Magic token every Part 21 exchange file starts with
pub const STEP_SIGNATURE: &str = "ISO-10303-21";

/// Entity index mapping ID to byte offsets
pub type EntityIndex = FxHashMap<u32, (usize, usize)>;

/// Fast entity scanner for STEP files
///
/// Uses memchr for SIMD-accelerated scanning to quickly find entity
/// boundaries without full parsing.
pub struct EntityScanner<'a> {
    content: &'a str,
    pos: usize,
    data_start: usize,
}

impl<'a> EntityScanner<'a> {
    /// Create a new scanner positioned after the `DATA;` keyword
    ///
    /// Content without a data section yields no entities.
    pub fn new(content: &'a str) -> Self {
        let pos = data_section_start(content).unwrap_or(content.len());
        Self {
            content,
            pos,
            data_start: pos,
        }
    }

    /// Scan to find the next simple entity instance
    ///
    /// Returns (id, type_name, start_byte, end_byte). Complex instances
    /// (`#1=(A()B());`) are stepped over.
    pub fn next_entity(&mut self) -> Option<(u32, &'a str, usize, usize)> {
        let bytes = self.content.as_bytes();

        while self.pos < bytes.len() {
            let hash_pos = memchr(b'#', &bytes[self.pos..])?;
            self.pos += hash_pos;

            // Instance names start a statement; references inside attribute
            // lists are preceded by '(' or ','
            if !self.at_statement_start() {
                self.pos += 1;
                continue;
            }

            let start = self.pos;
            self.pos += 1;
            let id_start = self.pos;

            while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
                self.pos += 1;
            }

            if self.pos == id_start {
                continue;
            }

            let Ok(id) = self.content[id_start..self.pos].parse::<u32>() else {
                continue;
            };

            self.skip_blanks();
            if self.pos >= bytes.len() || bytes[self.pos] != b'=' {
                continue;
            }
            self.pos += 1;
            self.skip_blanks();

            let type_start = self.pos;
            while self.pos < bytes.len()
                && (bytes[self.pos].is_ascii_alphanumeric() || bytes[self.pos] == b'_')
            {
                self.pos += 1;
            }

            if self.pos == type_start {
                // Complex instance; skip the whole statement
                self.find_entity_end()?;
                continue;
            }

            let type_name = &self.content[type_start..self.pos];
            let end = self.find_entity_end()?;

            return Some((id, type_name, start, end));
        }

        None
    }

    fn at_statement_start(&self) -> bool {
        let bytes = self.content.as_bytes();
        let mut i = self.pos;
        while i > self.data_start {
            match bytes[i - 1] {
                b' ' | b'\t' => i -= 1,
                b'\n' | b'\r' | b';' | b'/' => return true,
                _ => return false,
            }
        }
        true
    }

    fn skip_blanks(&mut self) {
        let bytes = self.content.as_bytes();
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    /// Find the end of an entity (semicolon), handling quoted strings
    fn find_entity_end(&mut self) -> Option<usize> {
        let bytes = self.content.as_bytes();
        let mut in_string = false;

        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'\'' => {
                    if in_string && self.pos + 1 < bytes.len() && bytes[self.pos + 1] == b'\'' {
                        self.pos += 2;
                        continue;
                    }
                    in_string = !in_string;
                }
                b';' if !in_string => {
                    self.pos += 1;
                    return Some(self.pos);
                }
                _ => {}
            }
            self.pos += 1;
        }

        None
    }

    /// Build an index of all entities (ID -> byte offsets)
    pub fn build_index(content: &'a str) -> EntityIndex {
        let mut scanner = Self::new(content);
        let mut index = FxHashMap::default();

        while let Some((id, _, start, end)) = scanner.next_entity() {
            index.insert(id, (start, end));
        }

        index
    }

    /// Count entities by (upper-cased) type name
    pub fn count_by_type(content: &'a str) -> FxHashMap<String, usize> {
        let mut scanner = Self::new(content);
        let mut counts: FxHashMap<String, usize> = FxHashMap::default();

        while let Some((_, type_name, _, _)) = scanner.next_entity() {
            *counts.entry(type_name.to_uppercase()).or_insert(0) += 1;
        }

        counts
    }

    /// Get total entity count
    pub fn entity_count(content: &'a str) -> usize {
        let mut scanner = Self::new(content);
        let mut count = 0;

        while scanner.next_entity().is_some() {
            count += 1;
        }

        count
    }
}

/// Whether the content starts with the Part 21 signature
pub fn has_signature(content: &str) -> bool {
    content.trim_start().starts_with(STEP_SIGNATURE)
}

/// Byte offset right after the `DATA;` keyword, if present
pub fn data_section_start(content: &str) -> Option<usize> {
    let bytes = content.as_bytes();
    let mut from = 0;
    while let Some(found) = memmem::find(&bytes[from..], b"DATA") {
        let at = from + found;
        let mut i = at + 4;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        // Skip FILE_DATA-like identifiers and DATA(...) parameter lists
        let standalone =
            at == 0 || !(bytes[at - 1].is_ascii_alphanumeric() || bytes[at - 1] == b'_');
        if standalone && i < bytes.len() && bytes[i] == b';' {
            return Some(i + 1);
        }
        from = at + 4;
    }
    None
}

/// Split a section into `;`-terminated statements, ignoring quoted `;`
fn statements(section: &str) -> Vec<&str> {
    let bytes = section.as_bytes();
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_string = false;

    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'\'' => in_string = !in_string,
            b';' if !in_string => {
                out.push(section[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }

    out
}

/// Parse the header section to extract metadata
///
/// FILE_NAME(name, time_stamp, author, organization, preprocessor_version,
/// originating_system, authorization) and FILE_SCHEMA((schema, ...)).
pub fn parse_header(content: &str) -> ModelMetadata {
    let mut info = ModelMetadata::default();

    let Some(header_start) = content.find("HEADER;") else {
        return info;
    };
    let body = &content[header_start + "HEADER;".len()..];
    let header_end = body.find("ENDSEC;").unwrap_or(body.len());

    for statement in statements(&body[..header_end]) {
        let Ok((keyword, attrs)) = parse_record(statement) else {
            continue;
        };

        let text = |index: usize| -> Option<String> {
            attrs
                .get(index)
                .and_then(AttributeValue::as_string)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        match keyword.as_str() {
            "FILE_NAME" => {
                info.file_name = text(0);
                info.timestamp = text(1);
                info.preprocessor_version = text(4);
                info.originating_system = text(5);
            }
            "FILE_SCHEMA" => {
                if let Some(first) = attrs
                    .first()
                    .and_then(AttributeValue::as_list)
                    .and_then(|list| list.first())
                    .and_then(AttributeValue::as_string)
                {
                    info.schema = first.to_string();
                }
            }
            _ => {}
        }
    }

    info
}
