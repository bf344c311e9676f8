// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boundary-representation description produced by the readers
//!
//! Readers translate file entities into this small, format-independent
//! vocabulary. The mesher turns each [`BrepFace`] into a
//! [`FaceTriangulation`](crate::FaceTriangulation).

use crate::{EntityId, FaceTriangulation, ModelMetadata};
use nalgebra::{Isometry3, Point3, Vector3};

/// All faces transferred from one file
#[derive(Clone, Debug, Default)]
pub struct BrepModel {
    /// Faces in traversal order
    pub faces: Vec<BrepFace>,
    /// Number of transferred roots (solids, shells, surface models)
    pub part_count: usize,
    /// Header information
    pub metadata: ModelMetadata,
}

impl BrepModel {
    /// Append the faces of one root and return its part index
    pub fn push_part(&mut self, faces: impl IntoIterator<Item = BrepFace>) -> usize {
        let part = self.part_count;
        self.faces.extend(faces.into_iter().map(|mut f| {
            f.part = part;
            f
        }));
        self.part_count += 1;
        part
    }

    /// Whether nothing was transferred
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

/// A single topological face
#[derive(Clone, Debug)]
pub struct BrepFace {
    /// Source entity of the face
    pub id: EntityId,
    /// Owning root index
    pub part: usize,
    /// Local-to-global transform
    pub location: Isometry3<f64>,
    /// Face geometry
    pub kind: FaceKind,
}

impl BrepFace {
    /// Create a face with identity location in part 0
    pub fn new(id: EntityId, kind: FaceKind) -> Self {
        Self {
            id,
            part: 0,
            location: Isometry3::identity(),
            kind,
        }
    }

    /// Set the local transform
    pub fn with_location(mut self, location: Isometry3<f64>) -> Self {
        self.location = location;
        self
    }
}

/// Geometry carried by a face
#[derive(Clone, Debug)]
pub enum FaceKind {
    /// Surface trimmed by boundary wires, meshed by the kernel
    Bounded {
        surface: Surface,
        bounds: Vec<FaceBound>,
        /// False when the face normal opposes the surface normal
        same_sense: bool,
    },
    /// Triangles supplied by the file itself
    Tessellated(FaceTriangulation),
}

/// Underlying surface of a bounded face
#[derive(Clone, Debug, PartialEq)]
pub enum Surface {
    /// Plane; the normal is derived from the outer wire when unknown
    Planar { normal: Option<Vector3<f64>> },
    /// Right circular cylinder
    Cylinder {
        origin: Point3<f64>,
        axis: Vector3<f64>,
        ref_dir: Vector3<f64>,
        radius: f64,
    },
    /// Anything the built-in kernel cannot mesh (name kept for logging)
    Unsupported(String),
}

/// One boundary wire of a face
#[derive(Clone, Debug)]
pub struct FaceBound {
    /// Outer boundary (as opposed to a hole)
    pub outer: bool,
    /// False when the wire is traversed against its edge directions
    pub orientation: bool,
    /// Edges in wire order
    pub edges: Vec<BoundEdge>,
}

impl FaceBound {
    /// Create a wire
    pub fn new(outer: bool, edges: Vec<BoundEdge>) -> Self {
        Self {
            outer,
            orientation: true,
            edges,
        }
    }
}

/// An oriented edge of a wire
#[derive(Clone, Debug, PartialEq)]
pub enum BoundEdge {
    /// Straight segment
    Line { start: Point3<f64>, end: Point3<f64> },
    /// Sequence of straight segments
    Polyline(Vec<Point3<f64>>),
    /// Circular arc, counter-clockwise about `axis` from `start` to `end`
    ///
    /// `start == end` describes a full circle.
    Arc {
        center: Point3<f64>,
        axis: Vector3<f64>,
        radius: f64,
        start: Point3<f64>,
        end: Point3<f64>,
    },
}

impl BoundEdge {
    /// Same edge traversed in the opposite direction
    pub fn reversed(self) -> Self {
        match self {
            BoundEdge::Line { start, end } => BoundEdge::Line {
                start: end,
                end: start,
            },
            BoundEdge::Polyline(mut points) => {
                points.reverse();
                BoundEdge::Polyline(points)
            }
            BoundEdge::Arc {
                center,
                axis,
                radius,
                start,
                end,
            } => BoundEdge::Arc {
                center,
                axis: -axis,
                radius,
                start: end,
                end: start,
            },
        }
    }

    /// First point of the edge
    pub fn start(&self) -> Option<Point3<f64>> {
        match self {
            BoundEdge::Line { start, .. } | BoundEdge::Arc { start, .. } => Some(*start),
            BoundEdge::Polyline(points) => points.first().copied(),
        }
    }
}
