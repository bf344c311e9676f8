// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CAD-Mesh Converter - STEP/IGES bytes to GPU-ready meshes
//!
//! Two stages, both pure functions of their inputs:
//!
//! 1. [`load`] - bytes + declared extension -> kernel shape
//! 2. [`cadmesh_geometry::extract`] - tessellation and consolidation
//!
//! [`Converter`] chains them, applies [`ConverterOptions`] and turns kernel
//! panics into [`ConvertError::Internal`](cadmesh_model::ConvertError).
//!
//! # Example
//!
//! ```ignore
//! use cadmesh_converter::{Converter, ConverterOptions};
//!
//! let converter = Converter::builtin(ConverterOptions::default());
//! let result = converter.convert(&bytes, "bracket.step")?;
//! println!("{} triangles", result.metadata.face_count);
//! ```

mod loader;
mod pipeline;

#[cfg(test)]
mod testing;

pub use loader::{load, LoadedShape};
pub use pipeline::{Conversion, Converter, ConverterOptions};

// Re-export the types callers need to handle results
pub use cadmesh_model::{
    extension_of, CadFormat, ConversionMetadata, ConvertError, MeshData, MeshParams,
    PartGrouping, SUPPORTED_EXTENSIONS,
};
