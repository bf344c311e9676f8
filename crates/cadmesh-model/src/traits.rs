// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Kernel capability traits
//!
//! These traits describe what the converter needs from a CAD kernel: a
//! per-format reader that materializes a shape, and a shape that can be
//! tessellated and enumerated as value-typed [`Face`] records. Any kernel
//! (the built-in one, or bindings to an external library) plugs in here.

use crate::{CadFormat, Face, MeshParams};
use std::fmt;
use std::path::Path;

/// Outcome of a reader's file-read step
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadStatus {
    /// The file was read and its entities are ready for transfer
    Done,
    /// The file could not be read; carries the reason
    Fail(String),
}

impl ReadStatus {
    /// Whether the read succeeded
    pub fn is_done(&self) -> bool {
        matches!(self, ReadStatus::Done)
    }
}

impl fmt::Display for ReadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadStatus::Done => f.write_str("Done"),
            ReadStatus::Fail(reason) => write!(f, "Fail: {}", reason),
        }
    }
}

/// Format-specific reader
///
/// Mirrors the read / transfer / one-shape sequence of B-rep kernels. A
/// reader is used for exactly one file and is not shared between threads.
///
/// # Example
///
/// ```ignore
/// let mut reader = kernel.reader(CadFormat::Step);
/// if reader.read_file(path).is_done() {
///     reader.transfer_roots();
///     let shape = reader.one_shape();
/// }
/// ```
pub trait ShapeReader: Send {
    /// Format handled by this reader
    fn format(&self) -> CadFormat;

    /// Parse the file at `path`
    fn read_file(&mut self, path: &Path) -> ReadStatus;

    /// Materialize shapes from the parsed roots
    ///
    /// # Returns
    /// The number of roots transferred
    fn transfer_roots(&mut self) -> usize;

    /// Combined top-level shape of everything transferred
    ///
    /// Consumes the transferred result; a second call yields an empty shape.
    fn one_shape(&mut self) -> Box<dyn BrepShape>;
}

/// A shape owned by the kernel
pub trait BrepShape: Send {
    /// Mesh every face with the given tolerances
    ///
    /// # Returns
    /// `false` when the kernel could not complete the operation
    fn tessellate(&mut self, params: &MeshParams) -> bool;

    /// Snapshot of every face in topological order
    fn faces(&self) -> Vec<Face>;

    /// Number of topological faces, meshed or not
    fn face_count(&self) -> usize {
        self.faces().len()
    }
}

/// A CAD kernel able to read the supported formats
pub trait CadKernel: Send + Sync {
    /// Human-readable kernel name (for logs)
    fn name(&self) -> &str;

    /// Create a fresh reader for one file
    fn reader(&self, format: CadFormat) -> Box<dyn ShapeReader>;
}
