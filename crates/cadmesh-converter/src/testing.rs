// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Deterministic kernel double for loader and pipeline tests

use cadmesh_model::{
    BrepShape, CadFormat, CadKernel, Face, FaceTriangulation, MeshParams, Point3, ReadStatus,
    ShapeReader,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// How the stub shape reacts to tessellation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tessellation {
    Done,
    Refused,
    Panic,
}

/// What the stub reader saw during `read_file`
#[derive(Clone, Debug, Default)]
pub struct ReadLog {
    pub path: Option<PathBuf>,
    pub existed: bool,
    pub bytes: Vec<u8>,
}

pub struct StubKernel {
    pub status: ReadStatus,
    pub faces: Vec<Face>,
    pub tessellation: Tessellation,
    pub readers: AtomicUsize,
    pub tessellations: Arc<AtomicUsize>,
    pub log: Arc<Mutex<ReadLog>>,
}

impl StubKernel {
    pub fn new(faces: Vec<Face>) -> Self {
        Self {
            status: ReadStatus::Done,
            faces,
            tessellation: Tessellation::Done,
            readers: AtomicUsize::new(0),
            tessellations: Arc::new(AtomicUsize::new(0)),
            log: Arc::new(Mutex::new(ReadLog::default())),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            status: ReadStatus::Fail(reason.to_string()),
            ..Self::new(Vec::new())
        }
    }

    pub fn with_tessellation(mut self, tessellation: Tessellation) -> Self {
        self.tessellation = tessellation;
        self
    }

    pub fn reader_calls(&self) -> usize {
        self.readers.load(Ordering::SeqCst)
    }

    /// Number of `tessellate` calls across every shape handed out
    pub fn tessellation_calls(&self) -> usize {
        self.tessellations.load(Ordering::SeqCst)
    }

    pub fn read_log(&self) -> ReadLog {
        self.log.lock().unwrap().clone()
    }
}

impl CadKernel for StubKernel {
    fn name(&self) -> &str {
        "stub"
    }

    fn reader(&self, format: CadFormat) -> Box<dyn ShapeReader> {
        self.readers.fetch_add(1, Ordering::SeqCst);
        Box::new(StubReader {
            format,
            status: self.status.clone(),
            faces: self.faces.clone(),
            tessellation: self.tessellation,
            tessellations: Arc::clone(&self.tessellations),
            log: Arc::clone(&self.log),
        })
    }
}

struct StubReader {
    format: CadFormat,
    status: ReadStatus,
    faces: Vec<Face>,
    tessellation: Tessellation,
    tessellations: Arc<AtomicUsize>,
    log: Arc<Mutex<ReadLog>>,
}

impl ShapeReader for StubReader {
    fn format(&self) -> CadFormat {
        self.format
    }

    fn read_file(&mut self, path: &Path) -> ReadStatus {
        let mut log = self.log.lock().unwrap();
        log.path = Some(path.to_path_buf());
        log.existed = path.exists();
        log.bytes = std::fs::read(path).unwrap_or_default();
        self.status.clone()
    }

    fn transfer_roots(&mut self) -> usize {
        1
    }

    fn one_shape(&mut self) -> Box<dyn BrepShape> {
        Box::new(StubShape {
            faces: std::mem::take(&mut self.faces),
            tessellation: self.tessellation,
            tessellations: Arc::clone(&self.tessellations),
        })
    }
}

struct StubShape {
    faces: Vec<Face>,
    tessellation: Tessellation,
    tessellations: Arc<AtomicUsize>,
}

impl BrepShape for StubShape {
    fn tessellate(&mut self, _params: &MeshParams) -> bool {
        self.tessellations.fetch_add(1, Ordering::SeqCst);
        match self.tessellation {
            Tessellation::Done => true,
            Tessellation::Refused => false,
            Tessellation::Panic => panic!("kernel exploded"),
        }
    }

    fn faces(&self) -> Vec<Face> {
        self.faces.clone()
    }
}

/// Face holding a single triangle at the origin
pub fn triangle_face() -> Face {
    Face::new(Some(FaceTriangulation::new(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ],
        vec![[1, 2, 3]],
    )))
}
