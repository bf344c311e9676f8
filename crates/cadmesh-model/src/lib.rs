// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CAD-Mesh Model - Shared types and kernel traits for CAD to mesh conversion
//!
//! This crate provides the core abstractions for turning STEP and IGES files
//! into GPU-ready triangle meshes. It defines the kernel capability as traits
//! so the consolidation logic never depends on a particular kernel.
//!
//! # Architecture
//!
//! - [`CadKernel`] - Creates one [`ShapeReader`] per file and format
//! - [`ShapeReader`] - Read / transfer / one-shape sequence
//! - [`BrepShape`] - Tessellation and face enumeration
//! - [`Face`] - Value-typed face record (transform + triangulation)
//! - [`MeshData`] / [`ConversionMetadata`] - Conversion output
//! - [`ConvertError`] - Failure taxonomy crossing the converter boundary
//!
//! # Example
//!
//! ```ignore
//! use cadmesh_model::{CadFormat, CadKernel, MeshParams};
//!
//! let mut reader = kernel.reader(CadFormat::Step);
//! if reader.read_file(path).is_done() {
//!     reader.transfer_roots();
//!     let mut shape = reader.one_shape();
//!     shape.tessellate(&MeshParams::default());
//!     for face in shape.faces() {
//!         println!("meshed: {}", face.is_meshed());
//!     }
//! }
//! ```

pub mod brep;
pub mod error;
pub mod geometry;
pub mod resolver;
pub mod traits;
pub mod types;

// Re-export all public types
pub use brep::*;
pub use error::*;
pub use geometry::*;
pub use resolver::*;
pub use traits::*;
pub use types::*;

// Re-export nalgebra types used in public signatures
pub use nalgebra::{Isometry3, Point3, Vector3};
