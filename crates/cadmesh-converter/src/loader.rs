// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shape loader
//!
//! Persists an upload to a unique temporary file (kernels read from paths),
//! drives the format's reader through read / transfer / one-shape and
//! removes the file again on every exit path.

use cadmesh_model::{BrepShape, CadFormat, CadKernel, ConvertError, ReadStatus};
use std::io::Write;

/// Shape materialized from one upload
pub struct LoadedShape {
    /// Format the bytes were read as
    pub format: CadFormat,
    /// Roots transferred by the reader
    pub roots: usize,
    /// Combined top-level shape
    pub shape: Box<dyn BrepShape>,
}

/// Load raw file bytes as a kernel shape
///
/// # Arguments
/// * `kernel` - Kernel providing the format readers
/// * `bytes` - File content
/// * `extension` - Declared extension, with or without the leading dot
///
/// # Errors
/// `UnsupportedFormat` for unknown extensions (no kernel call is made),
/// `ParseFailure` when the reader does not report success, `Io` when the
/// temporary file cannot be written.
pub fn load(
    kernel: &dyn CadKernel,
    bytes: &[u8],
    extension: &str,
) -> Result<LoadedShape, ConvertError> {
    let format =
        CadFormat::from_extension(extension).ok_or_else(|| ConvertError::unsupported(extension))?;

    let suffix = format!(".{}", extension.trim_start_matches('.').to_ascii_lowercase());
    let mut file = tempfile::Builder::new()
        .prefix("cadmesh-")
        .suffix(&suffix)
        .tempfile()?;
    file.write_all(bytes)?;
    file.flush()?;

    let mut reader = kernel.reader(format);
    if let ReadStatus::Fail(reason) = reader.read_file(file.path()) {
        return Err(ConvertError::parse(format.tag(), reason));
    }

    let roots = reader.transfer_roots();
    let shape = reader.one_shape();
    log::debug!(
        "{} loaded via {}: {} roots, {} faces",
        format,
        kernel.name(),
        roots,
        shape.face_count()
    );

    Ok(LoadedShape {
        format,
        roots,
        shape,
    })
}
