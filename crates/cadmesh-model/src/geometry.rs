// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Face records and tessellation parameters
//!
//! A [`Face`] is a value-typed snapshot of one kernel face: its local
//! transform plus an optional triangulation. The consolidator only ever sees
//! these records, never live kernel objects.

use nalgebra::{Isometry3, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Triangulation of a single face in its local coordinate frame
///
/// Node and triangle references are 1-based, as produced by B-rep kernels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceTriangulation {
    /// Node positions in local coordinates
    pub nodes: Vec<Point3<f64>>,
    /// Optional per-node normals, same length as `nodes`
    pub normals: Option<Vec<Vector3<f64>>>,
    /// Triangles as three 1-based node references
    pub triangles: Vec<[u32; 3]>,
}

impl FaceTriangulation {
    /// Create a triangulation without normals
    pub fn new(nodes: Vec<Point3<f64>>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            nodes,
            normals: None,
            triangles,
        }
    }

    /// Attach per-node normals
    pub fn with_normals(mut self, normals: Vec<Vector3<f64>>) -> Self {
        self.normals = Some(normals);
        self
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Node by 1-based index
    pub fn node(&self, index: u32) -> Option<&Point3<f64>> {
        (index as usize).checked_sub(1).and_then(|i| self.nodes.get(i))
    }

    /// Whether normals are present for every node
    pub fn has_normals(&self) -> bool {
        self.normals
            .as_ref()
            .is_some_and(|n| n.len() == self.nodes.len())
    }

    /// Check that every triangle references an existing node
    pub fn is_well_formed(&self) -> bool {
        let n = self.nodes.len() as u32;
        self.triangles
            .iter()
            .all(|t| t.iter().all(|&i| i >= 1 && i <= n))
    }
}

/// One face of a tessellated shape
#[derive(Clone, Debug, PartialEq)]
pub struct Face {
    /// Local-to-global transform (rotation + translation)
    pub location: Isometry3<f64>,
    /// Triangulation, absent for faces the kernel could not mesh
    pub triangulation: Option<FaceTriangulation>,
    /// Index of the transferred root (solid or shell) this face belongs to
    pub part: usize,
}

impl Face {
    /// Create a face with an identity transform
    pub fn new(triangulation: Option<FaceTriangulation>) -> Self {
        Self {
            location: Isometry3::identity(),
            triangulation,
            part: 0,
        }
    }

    /// Set the local transform
    pub fn with_location(mut self, location: Isometry3<f64>) -> Self {
        self.location = location;
        self
    }

    /// Set the owning part index
    pub fn in_part(mut self, part: usize) -> Self {
        self.part = part;
        self
    }

    /// Whether the face carries a triangulation
    pub fn is_meshed(&self) -> bool {
        self.triangulation.is_some()
    }
}

/// Tessellation quality settings
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshParams {
    /// Max distance between the true surface and its triangles
    pub linear_deflection: f64,
    /// Max angle (radians) between normals of adjacent triangles
    pub angular_deflection: f64,
    /// Interpret `linear_deflection` relative to each edge's size
    pub relative: bool,
    /// Allow faces to be meshed in parallel
    pub parallel: bool,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            linear_deflection: 0.1,
            angular_deflection: 0.5,
            relative: false,
            parallel: true,
        }
    }
}

impl MeshParams {
    /// Create absolute-mode parameters with the given deflections
    pub fn new(linear_deflection: f64, angular_deflection: f64) -> Self {
        Self {
            linear_deflection,
            angular_deflection,
            ..Self::default()
        }
    }

    /// Toggle parallel meshing
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Both deflections are finite and strictly positive
    pub fn is_valid(&self) -> bool {
        self.linear_deflection.is_finite()
            && self.linear_deflection > 0.0
            && self.angular_deflection.is_finite()
            && self.angular_deflection > 0.0
    }
}

/// How faces are grouped into output meshes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartGrouping {
    /// All faces merged into one "Model" mesh
    #[default]
    Merged,
    /// One mesh per transferred root
    PerPart,
}

impl std::str::FromStr for PartGrouping {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "merged" | "single" => Ok(PartGrouping::Merged),
            "per-part" | "per_part" | "parts" => Ok(PartGrouping::PerPart),
            other => Err(format!("unknown part grouping '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_lookup_is_one_based() {
        let tri = FaceTriangulation::new(
            vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)],
            vec![],
        );
        assert_eq!(tri.node(0), None);
        assert_eq!(tri.node(2), Some(&Point3::new(1.0, 0.0, 0.0)));
        assert_eq!(tri.node(3), None);
    }

    #[test]
    fn test_well_formed_rejects_out_of_range() {
        let nodes = vec![Point3::origin(); 3];
        assert!(FaceTriangulation::new(nodes.clone(), vec![[1, 2, 3]]).is_well_formed());
        assert!(!FaceTriangulation::new(nodes.clone(), vec![[0, 1, 2]]).is_well_formed());
        assert!(!FaceTriangulation::new(nodes, vec![[1, 2, 4]]).is_well_formed());
    }

    #[test]
    fn test_has_normals_requires_full_length() {
        let tri = FaceTriangulation::new(vec![Point3::origin(); 3], vec![[1, 2, 3]])
            .with_normals(vec![Vector3::z(); 2]);
        assert!(!tri.has_normals());
    }

    #[test]
    fn test_params_validation() {
        assert!(MeshParams::default().is_valid());
        assert!(!MeshParams::new(0.0, 0.5).is_valid());
        assert!(!MeshParams::new(0.1, f64::NAN).is_valid());
        assert!(!MeshParams::new(-1.0, 0.5).is_valid());
    }

    #[test]
    fn test_grouping_from_str() {
        assert_eq!("merged".parse::<PartGrouping>(), Ok(PartGrouping::Merged));
        assert_eq!("Per-Part".parse::<PartGrouping>(), Ok(PartGrouping::PerPart));
        assert!("solids".parse::<PartGrouping>().is_err());
    }
}
