// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CAD-Mesh Parser - STEP and IGES readers
//!
//! This crate reads the two exchange formats the converter accepts and
//! translates their B-rep entities into the format-independent
//! [`BrepModel`](cadmesh_model::BrepModel) description.
//!
//! # Features
//!
//! - **Fast STEP tokenization** using `nom` combinators
//! - **SIMD-accelerated scanning** using `memchr`
//! - **Lazy entity decoding** with an `Arc`-based cache
//! - **Fixed-format IGES decoding** including Hollerith strings and
//!   transformation matrix chains
//!
//! # Example
//!
//! ```ignore
//! use cadmesh_parser::StepFile;
//!
//! let file = StepFile::open(path)?;
//! let model = file.transfer();
//! println!("{} parts, {} faces", model.part_count, model.faces.len());
//! ```

mod iges;
mod math;
mod resolver;
mod scanner;
mod step;
mod tokenizer;

pub use iges::{IgesEntity, IgesFile, Param};
pub use resolver::StepResolver;
pub use scanner::{EntityScanner, STEP_SIGNATURE};
pub use step::StepFile;
pub use tokenizer::{parse_entity, Token};
