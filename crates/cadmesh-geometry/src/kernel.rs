// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Built-in CAD kernel
//!
//! Implements the [`CadKernel`] capability on top of the STEP and IGES
//! readers of `cadmesh-parser` and the face mesher of this crate.

use crate::mesher::mesh_face;
use cadmesh_model::{
    BrepModel, BrepShape, CadFormat, CadKernel, Face, FaceTriangulation, MeshParams,
    ParseError, ReadStatus, ShapeReader,
};
use cadmesh_parser::{IgesFile, StepFile};
use rayon::prelude::*;
use std::marker::PhantomData;
use std::path::Path;

/// A parsed exchange file able to transfer its roots
pub trait SourceFile: Sized + Send {
    /// Format of the file
    const FORMAT: CadFormat;

    /// Read and parse the file at `path`
    fn open(path: &Path) -> Result<Self, ParseError>;

    /// Translate B-rep roots into faces
    fn transfer(&self) -> BrepModel;
}

impl SourceFile for StepFile {
    const FORMAT: CadFormat = CadFormat::Step;

    fn open(path: &Path) -> Result<Self, ParseError> {
        StepFile::open(path)
    }

    fn transfer(&self) -> BrepModel {
        StepFile::transfer(self)
    }
}

impl SourceFile for IgesFile {
    const FORMAT: CadFormat = CadFormat::Iges;

    fn open(path: &Path) -> Result<Self, ParseError> {
        IgesFile::open(path)
    }

    fn transfer(&self) -> BrepModel {
        IgesFile::transfer(self)
    }
}

/// Reader for one file of format `F`
pub struct FileReader<F: SourceFile> {
    file: Option<F>,
    model: Option<BrepModel>,
    _format: PhantomData<F>,
}

impl<F: SourceFile> Default for FileReader<F> {
    fn default() -> Self {
        Self {
            file: None,
            model: None,
            _format: PhantomData,
        }
    }
}

/// STEP reader of the built-in kernel
pub type StepReader = FileReader<StepFile>;

/// IGES reader of the built-in kernel
pub type IgesReader = FileReader<IgesFile>;

impl<F: SourceFile> ShapeReader for FileReader<F> {
    fn format(&self) -> CadFormat {
        F::FORMAT
    }

    fn read_file(&mut self, path: &Path) -> ReadStatus {
        match F::open(path) {
            Ok(file) => {
                self.file = Some(file);
                ReadStatus::Done
            }
            Err(e) => {
                log::debug!("{} read of {} failed: {}", F::FORMAT, path.display(), e);
                ReadStatus::Fail(e.to_string())
            }
        }
    }

    fn transfer_roots(&mut self) -> usize {
        let Some(file) = self.file.as_ref() else {
            return 0;
        };
        let model = file.transfer();
        let roots = model.part_count;
        log::debug!(
            "{} transfer: {} roots, {} faces",
            F::FORMAT,
            roots,
            model.faces.len()
        );
        self.model = Some(model);
        roots
    }

    fn one_shape(&mut self) -> Box<dyn BrepShape> {
        Box::new(MeshedShape::new(self.model.take().unwrap_or_default()))
    }
}

/// Shape of the built-in kernel
///
/// Holds the transferred faces and, after [`BrepShape::tessellate`], one
/// optional triangulation per face.
pub struct MeshedShape {
    model: BrepModel,
    meshes: Vec<Option<FaceTriangulation>>,
}

impl MeshedShape {
    /// Wrap a transferred model
    pub fn new(model: BrepModel) -> Self {
        Self {
            model,
            meshes: Vec::new(),
        }
    }

    /// Number of faces that produced a triangulation
    pub fn meshed_count(&self) -> usize {
        self.meshes.iter().filter(|m| m.is_some()).count()
    }
}

impl BrepShape for MeshedShape {
    fn tessellate(&mut self, params: &MeshParams) -> bool {
        if !params.is_valid() {
            log::warn!(
                "Refusing to mesh with deflection {} / {}",
                params.linear_deflection,
                params.angular_deflection
            );
            return false;
        }

        let mesh_one = |face: &cadmesh_model::BrepFace| match mesh_face(face, params) {
            Ok(tri) => Some(tri),
            Err(e) => {
                log::debug!("Face {} not meshed: {}", face.id, e);
                None
            }
        };

        self.meshes = if params.parallel {
            self.model.faces.par_iter().map(mesh_one).collect()
        } else {
            self.model.faces.iter().map(mesh_one).collect()
        };

        let skipped = self.meshes.len() - self.meshed_count();
        if skipped > 0 {
            log::warn!(
                "{} of {} faces could not be meshed",
                skipped,
                self.meshes.len()
            );
        }
        true
    }

    fn faces(&self) -> Vec<Face> {
        self.model
            .faces
            .iter()
            .enumerate()
            .map(|(i, f)| Face {
                location: f.location,
                triangulation: self.meshes.get(i).cloned().flatten(),
                part: f.part,
            })
            .collect()
    }

    fn face_count(&self) -> usize {
        self.model.faces.len()
    }
}

/// Kernel backed by the built-in readers and mesher
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinKernel;

impl CadKernel for BuiltinKernel {
    fn name(&self) -> &str {
        "cadmesh built-in"
    }

    fn reader(&self, format: CadFormat) -> Box<dyn ShapeReader> {
        match format {
            CadFormat::Step => Box::new(StepReader::default()),
            CadFormat::Iges => Box::new(IgesReader::default()),
        }
    }
}
