// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion pipeline: Shape Loader followed by Mesh Consolidator
//!
//! Kernel panics are caught at this boundary and reported as
//! [`ConvertError::Internal`].

use crate::loader::load;
use cadmesh_geometry::{extract, BuiltinKernel};
use cadmesh_model::{
    extension_of, CadKernel, ConversionMetadata, ConvertError, MeshData, MeshParams,
    PartGrouping,
};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

/// Conversion settings
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ConverterOptions {
    /// Tessellation deflections
    pub params: MeshParams,
    /// Output mesh grouping
    pub grouping: PartGrouping,
    /// Treat a result without meshes as [`ConvertError::EmptyResult`]
    pub reject_empty: bool,
}

/// Output of one conversion
#[derive(Clone, Debug, PartialEq)]
pub struct Conversion {
    pub meshes: Vec<MeshData>,
    pub metadata: ConversionMetadata,
}

/// Converts uploaded STEP/IGES bytes into meshes
///
/// Stateless between calls; one instance is shared by all requests.
#[derive(Clone)]
pub struct Converter {
    kernel: Arc<dyn CadKernel>,
    options: ConverterOptions,
}

impl Converter {
    /// Create a converter over the given kernel
    pub fn new(kernel: Arc<dyn CadKernel>, options: ConverterOptions) -> Self {
        Self { kernel, options }
    }

    /// Create a converter over the built-in kernel
    pub fn builtin(options: ConverterOptions) -> Self {
        Self::new(Arc::new(BuiltinKernel), options)
    }

    /// Name of the underlying kernel
    pub fn kernel_name(&self) -> &str {
        self.kernel.name()
    }

    /// Convert one file
    ///
    /// # Arguments
    /// * `bytes` - File content
    /// * `file_name` - Upload name; its extension selects the reader
    pub fn convert(&self, bytes: &[u8], file_name: &str) -> Result<Conversion, ConvertError> {
        let start = Instant::now();
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.run(bytes, file_name)))
            .unwrap_or_else(|payload| Err(ConvertError::internal(panic_message(payload.as_ref()))));

        match &result {
            Ok(conversion) => log::info!(
                "Converted {} ({} bytes) in {:.1?}: {} meshes, {} vertices, {} triangles",
                file_name,
                bytes.len(),
                start.elapsed(),
                conversion.metadata.part_count,
                conversion.metadata.vertex_count,
                conversion.metadata.face_count
            ),
            Err(e) => log::warn!("Conversion of {} failed: {}", file_name, e),
        }
        result
    }

    fn run(&self, bytes: &[u8], file_name: &str) -> Result<Conversion, ConvertError> {
        let extension = extension_of(file_name);
        let mut loaded = load(self.kernel.as_ref(), bytes, &extension)?;

        let (meshes, metadata) = extract(
            loaded.shape.as_mut(),
            &self.options.params,
            self.options.grouping,
            loaded.format,
            file_name,
        )?;

        if meshes.is_empty() && self.options.reject_empty {
            return Err(ConvertError::EmptyResult(file_name.to_string()));
        }
        Ok(Conversion { meshes, metadata })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown cause".to_string());
    format!("kernel panicked: {}", detail)
}
