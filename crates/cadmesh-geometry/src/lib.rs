// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # CAD-Mesh Geometry
//!
//! Tessellation and mesh consolidation for B-rep shapes.
//!
//! ## Overview
//!
//! This crate turns the faces transferred by `cadmesh-parser` into GPU-ready
//! triangle meshes:
//!
//! - **Kernel**: [`BuiltinKernel`] implements the `CadKernel` capability
//!   for STEP and IGES
//! - **Mesher**: Deflection-driven arc sampling, planar and cylindrical
//!   face triangulation with hole support via earcutr
//! - **Consolidation**: Parallel per-face transformation, ordered merge into
//!   one mesh or one mesh per part
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cadmesh_geometry::{extract, BuiltinKernel};
//! use cadmesh_model::{CadFormat, CadKernel, MeshParams, PartGrouping};
//!
//! let mut reader = BuiltinKernel.reader(CadFormat::Step);
//! reader.read_file(path);
//! reader.transfer_roots();
//! let mut shape = reader.one_shape();
//!
//! let (meshes, metadata) = extract(
//!     shape.as_mut(),
//!     &MeshParams::default(),
//!     PartGrouping::Merged,
//!     CadFormat::Step,
//!     "part.step",
//! )?;
//! println!("{} triangles", metadata.face_count);
//! ```

pub mod consolidate;
pub mod constants;
pub mod error;
pub mod kernel;
pub mod mesher;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

// Re-export main types
pub use consolidate::{consolidate, extract};
pub use error::{Error, Result};
pub use kernel::{BuiltinKernel, FileReader, IgesReader, MeshedShape, SourceFile, StepReader};
pub use mesher::{arc_segments, mesh_face, sample_arc, wire_points};
pub use triangulation::{plane_basis, polygon_normal, project_to_2d, triangulate};
