// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IGES fixed-format records
//!
//! An IGES file is a sequence of 80-column records. Column 73 holds the
//! section letter (S, G, D, P, T) and columns 74-80 the sequence number.
//! Directory entries span two records of nine 8-column fields; parameter
//! records carry free-format data in columns 1-64 and the owning directory
//! pointer in columns 66-72.

use cadmesh_model::{ModelMetadata, ParseError, Result};

/// Length of one record
pub const RECORD_LEN: usize = 80;
/// Data columns of start, global and directory records
const DATA_COLS: usize = 72;
/// Data columns of parameter records
const PARAM_COLS: usize = 64;
/// Width of a directory field
const FIELD_WIDTH: usize = 8;

/// File section a record belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    Start,
    Global,
    Directory,
    Parameter,
    Terminate,
}

impl Section {
    fn from_code(code: u8) -> Option<Self> {
        match code {
            b'S' => Some(Section::Start),
            b'G' => Some(Section::Global),
            b'D' => Some(Section::Directory),
            b'P' => Some(Section::Parameter),
            b'T' => Some(Section::Terminate),
            _ => None,
        }
    }
}

/// Record lines grouped by section
#[derive(Debug, Default)]
pub struct Sections<'a> {
    pub start: Vec<&'a str>,
    pub global: Vec<&'a str>,
    pub directory: Vec<&'a str>,
    pub parameter: Vec<&'a str>,
}

/// Split ASCII content into section records
///
/// Accepts newline-separated records as well as a single unbroken stream
/// of 80-byte records.
pub fn split_sections(content: &str) -> Sections<'_> {
    let mut sections = Sections::default();

    let records: Vec<&str> = if !content.contains('\n') && content.len() > RECORD_LEN {
        (0..content.len())
            .step_by(RECORD_LEN)
            .filter_map(|i| content.get(i..(i + RECORD_LEN).min(content.len())))
            .collect()
    } else {
        content.lines().map(|l| l.trim_end_matches('\r')).collect()
    };

    for record in records {
        let Some(section) = record.as_bytes().get(DATA_COLS).copied().and_then(Section::from_code)
        else {
            continue;
        };
        match section {
            Section::Start => sections.start.push(record),
            Section::Global => sections.global.push(record),
            Section::Directory => sections.directory.push(record),
            Section::Parameter => sections.parameter.push(record),
            Section::Terminate => {}
        }
    }

    sections
}

/// Parameter and record delimiters declared in the global section
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Delimiters {
    pub param: u8,
    pub record: u8,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            param: b',',
            record: b';',
        }
    }
}

/// Read the two leading global fields, each either empty or `1Hx`
pub fn parse_delimiters(global: &str) -> Delimiters {
    let bytes = global.trim_start().as_bytes();
    let mut delims = Delimiters::default();

    let hollerith = |at: usize| -> Option<u8> {
        match bytes.get(at..at + 3) {
            Some([b'1', b'H' | b'h', c]) => Some(*c),
            _ => None,
        }
    };

    // Field 1
    let mut pos = match hollerith(0) {
        Some(c) => {
            delims.param = c;
            3
        }
        None => 0,
    };

    // Delimiter after field 1, then field 2
    if bytes.get(pos) == Some(&delims.param) {
        pos += 1;
        if let Some(c) = hollerith(pos) {
            delims.record = c;
        }
    }

    delims
}

/// A single free-format parameter value
#[derive(Clone, Debug, PartialEq)]
pub enum Param {
    /// Empty field
    Default,
    Integer(i64),
    Real(f64),
    /// Hollerith string
    String(String),
}

impl Param {
    /// Numeric value; empty fields read as zero
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Param::Integer(i) => Some(*i as f64),
            Param::Real(f) => Some(*f),
            Param::Default => Some(0.0),
            Param::String(_) => None,
        }
    }

    /// Integer value; empty fields read as zero
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Param::Integer(i) => Some(*i),
            Param::Real(f) if f.fract() == 0.0 => Some(*f as i64),
            Param::Default => Some(0),
            _ => None,
        }
    }

    /// Directory entry pointer (0 means "none")
    pub fn as_pointer(&self) -> Option<u32> {
        self.as_i64().and_then(|i| u32::try_from(i.unsigned_abs()).ok())
    }

    /// String value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Param::String(s) => Some(s),
            _ => None,
        }
    }
}

fn parse_value(field: &str) -> Param {
    let field = field.trim();
    if field.is_empty() {
        return Param::Default;
    }

    let is_real = field.contains(['.', 'E', 'e', 'D', 'd']);
    if is_real {
        let normalized = field.replace(['D', 'd'], "E");
        lexical_core::parse::<f64>(normalized.as_bytes())
            .ok()
            .or_else(|| normalized.parse().ok())
            .map(Param::Real)
            .unwrap_or(Param::Default)
    } else {
        lexical_core::parse::<i64>(field.trim_start_matches('+').as_bytes())
            .map(Param::Integer)
            .unwrap_or(Param::Default)
    }
}

/// Split free-format data into parameters, stopping at the record delimiter
pub fn split_params(text: &str, delims: Delimiters) -> Vec<Param> {
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut params = Vec::new();
    let mut i = 0;

    loop {
        while i < len && bytes[i] == b' ' {
            i += 1;
        }

        let digits_start = i;
        while i < len && bytes[i].is_ascii_digit() {
            i += 1;
        }

        if i > digits_start && i < len && (bytes[i] == b'H' || bytes[i] == b'h') {
            let count: usize = text[digits_start..i].parse().unwrap_or(0);
            let start = i + 1;
            let end = (start + count).min(len);
            params.push(Param::String(text[start..end].to_string()));
            i = end;
            while i < len && bytes[i] != delims.param && bytes[i] != delims.record {
                i += 1;
            }
        } else {
            i = digits_start;
            let start = i;
            while i < len && bytes[i] != delims.param && bytes[i] != delims.record {
                i += 1;
            }
            params.push(parse_value(&text[start..i]));
        }

        if i >= len || bytes[i] == delims.record {
            break;
        }
        i += 1;
    }

    params
}

/// Concatenate the data columns of records
pub fn join_data(records: &[&str], cols: usize) -> String {
    records
        .iter()
        .map(|r| {
            let data = r.get(..cols).unwrap_or(r);
            format!("{:<width$}", data, width = cols)
        })
        .collect()
}

/// Metadata from the global section
///
/// Fields: 4 file name, 5 native system id, 6 preprocessor version,
/// 18 date of model creation.
pub fn global_metadata(params: &[Param]) -> ModelMetadata {
    let text = |index: usize| {
        params
            .get(index)
            .and_then(Param::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    ModelMetadata {
        schema: "IGES".to_string(),
        file_name: text(3),
        originating_system: text(4),
        preprocessor_version: text(5),
        timestamp: text(17),
    }
}

/// One directory entry (two records)
#[derive(Clone, Debug, PartialEq)]
pub struct DirectoryEntry {
    /// Sequence number of the first record, used as the entity pointer
    pub pointer: u32,
    pub entity_type: i32,
    /// Sequence number of the first parameter record
    pub param_start: usize,
    /// Pointer to a 124 transformation matrix (0 = none)
    pub transform: u32,
    pub param_lines: usize,
    pub form: i32,
}

fn field(record: &str, index: usize) -> &str {
    let start = index * FIELD_WIDTH;
    record
        .get(start..(start + FIELD_WIDTH).min(record.len()))
        .unwrap_or("")
        .trim()
}

fn int_field(record: &str, index: usize) -> i64 {
    let f = field(record, index);
    if f.is_empty() {
        0
    } else {
        lexical_core::parse::<i64>(f.as_bytes()).unwrap_or(0)
    }
}

/// Decode the directory section
pub fn parse_directory(records: &[&str]) -> Result<Vec<DirectoryEntry>> {
    if records.len() % 2 != 0 {
        return Err(ParseError::format(format!(
            "directory section has an odd number of records ({})",
            records.len()
        )));
    }

    records
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| {
            let (first, second) = (pair[0], pair[1]);
            let entity_type = i32::try_from(int_field(first, 0))
                .map_err(|_| ParseError::format("entity type out of range"))?;
            if entity_type != i32::try_from(int_field(second, 0)).unwrap_or(-1) {
                return Err(ParseError::format(format!(
                    "directory entry {} has mismatched entity types",
                    2 * i + 1
                )));
            }

            Ok(DirectoryEntry {
                pointer: (2 * i + 1) as u32,
                entity_type,
                param_start: usize::try_from(int_field(first, 1)).unwrap_or(0),
                transform: u32::try_from(int_field(first, 6)).unwrap_or(0),
                param_lines: usize::try_from(int_field(second, 3)).unwrap_or(0),
                form: i32::try_from(int_field(second, 4)).unwrap_or(0),
            })
        })
        .collect()
}

/// Parameter text of one entity, entity type number included
pub fn entry_params(parameter: &[&str], entry: &DirectoryEntry) -> Option<String> {
    let first = entry.param_start.checked_sub(1)?;
    let count = entry.param_lines.max(1);
    let records = parameter.get(first..(first + count).min(parameter.len()))?;
    Some(join_data(records, PARAM_COLS))
}

/// Global section text
pub fn global_text(global: &[&str]) -> String {
    join_data(global, DATA_COLS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_and_custom_delimiters() {
        assert_eq!(parse_delimiters(",,4Htest;"), Delimiters::default());
        assert_eq!(
            parse_delimiters("1H//1H#/4Htest#"),
            Delimiters {
                param: b'/',
                record: b'#'
            }
        );
        assert_eq!(
            parse_delimiters("1H,,1H;,4Htest;"),
            Delimiters::default()
        );
    }

    #[test]
    fn test_split_params_with_hollerith_and_exponents() {
        let params = split_params(
            "110,1.0D0,-.5,,3HA,B,12;ignored",
            Delimiters::default(),
        );
        assert_eq!(
            params,
            vec![
                Param::Integer(110),
                Param::Real(1.0),
                Param::Real(-0.5),
                Param::Default,
                Param::String("A,B".to_string()),
                Param::Integer(12),
            ]
        );
    }

    #[test]
    fn test_param_accessors() {
        assert_eq!(Param::Default.as_f64(), Some(0.0));
        assert_eq!(Param::Real(3.0).as_i64(), Some(3));
        assert_eq!(Param::Real(3.5).as_i64(), None);
        assert_eq!(Param::Integer(-7).as_pointer(), Some(7));
        assert_eq!(Param::String("x".into()).as_f64(), None);
    }

    #[test]
    fn test_split_sections_ignores_short_records() {
        let s = format!("{:<72}S{:>7}\n{:<72}G{:>7}\nshort line\n", "hello", 1, "1H,,1H;;", 1);
        let sections = split_sections(&s);
        assert_eq!(sections.start.len(), 1);
        assert_eq!(sections.global.len(), 1);
        assert!(sections.directory.is_empty());
    }

    #[test]
    fn test_parse_directory_pair() {
        let first = format!(
            "{:>8}{:>8}{:>8}{:>8}{:>8}{:>8}{:>8}{:>8}{:>8}D{:>7}",
            110, 1, 0, 1, 0, 0, 3, 0, "00000000", 1
        );
        let second = format!(
            "{:>8}{:>8}{:>8}{:>8}{:>8}{:>8}{:>8}{:>8}{:>8}D{:>7}",
            110, 0, 0, 2, 1, "", "", "", 0, 2
        );
        let entries = parse_directory(&[first.as_str(), second.as_str()]).unwrap();
        assert_eq!(
            entries[0],
            DirectoryEntry {
                pointer: 1,
                entity_type: 110,
                param_start: 1,
                transform: 3,
                param_lines: 2,
                form: 1,
            }
        );
    }

    #[test]
    fn test_odd_directory_is_rejected() {
        let record = format!("{:>8}{:<64}D{:>7}", 110, "", 1);
        assert!(parse_directory(&[record.as_str()]).is_err());
    }

    #[test]
    fn test_global_metadata() {
        let params = split_params(
            "1H,,1H;,4Hpart,8Hpart.igs,7HTestCAD,3H1.0,32,38,6,308,15,4Hpart,1.,2,2HMM,1,1.,13H20240101.1200;",
            Delimiters::default(),
        );
        let meta = global_metadata(&params);
        assert_eq!(meta.file_name.as_deref(), Some("part.igs"));
        assert_eq!(meta.originating_system.as_deref(), Some("TestCAD"));
        assert_eq!(meta.timestamp.as_deref(), Some("20240101.1200"));
    }
}
