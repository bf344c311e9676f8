// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tessellation constants

/// Upper bound on segments used for a single arc
pub const MAX_ARC_SEGMENTS: usize = 512;

/// Points closer than this are merged while building wires
pub const POINT_MERGE_TOLERANCE: f64 = 1e-7;

/// Polygons with a smaller area magnitude are treated as degenerate
pub const MIN_POLYGON_AREA: f64 = 1e-14;

/// Refinement passes over cylindrical faces
pub const MAX_REFINE_PASSES: usize = 12;

/// Edge flip passes over cylindrical faces
pub const MAX_FLIP_PASSES: usize = 64;

/// Placeholder normal for nodes without one
pub const PLACEHOLDER_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];

/// Name of the single merged mesh
pub const MERGED_MESH_NAME: &str = "Model";
