// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh consolidation
//!
//! Collects every face triangulation of a shape into flat, GPU-ready
//! [`MeshData`] buffers. Faces are converted to global coordinates in
//! parallel and then appended in face order, so the output does not depend
//! on thread scheduling.

use crate::constants::{MERGED_MESH_NAME, PLACEHOLDER_NORMAL};
use cadmesh_model::{
    BrepShape, CadFormat, ConversionMetadata, ConvertError, Face, MeshData, MeshParams,
    PartGrouping,
};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// One face in global coordinates with 0-based local indices
#[derive(Debug, Default)]
struct FacePatch {
    part: usize,
    vertex_count: u32,
    vertices: Vec<f32>,
    normals: Vec<f32>,
    indices: Vec<u32>,
}

fn too_many_vertices(what: impl std::fmt::Display) -> ConvertError {
    ConvertError::tessellation(format!("{} exceeds {} vertices", what, u32::MAX))
}

/// Transform one face into global coordinates
///
/// Positions get the full transform, normals only its rotation. Triangles
/// referencing missing nodes are dropped.
fn face_patch(face: &Face) -> Result<Option<FacePatch>, ConvertError> {
    let Some(tri) = face.triangulation.as_ref() else {
        return Ok(None);
    };
    let node_count = tri.node_count();
    let n = u32::try_from(node_count).map_err(|_| too_many_vertices("face"))?;
    let rotation = face.location.rotation;

    let mut patch = FacePatch {
        part: face.part,
        vertex_count: n,
        vertices: Vec::with_capacity(node_count * 3),
        normals: Vec::with_capacity(node_count * 3),
        indices: Vec::with_capacity(tri.triangle_count() * 3),
    };

    for node in &tri.nodes {
        let p = face.location.transform_point(node);
        patch
            .vertices
            .extend_from_slice(&[p.x as f32, p.y as f32, p.z as f32]);
    }

    match tri.normals.as_ref().filter(|_| tri.has_normals()) {
        Some(normals) => {
            for n in normals {
                let n = rotation * n;
                patch
                    .normals
                    .extend_from_slice(&[n.x as f32, n.y as f32, n.z as f32]);
            }
        }
        None => {
            for _ in 0..node_count {
                patch.normals.extend_from_slice(&PLACEHOLDER_NORMAL);
            }
        }
    }

    for t in &tri.triangles {
        if t.iter().all(|&i| i >= 1 && i <= n) {
            patch.indices.extend(t.iter().map(|&i| i - 1));
        }
    }

    Ok(Some(patch))
}

/// Appends face patches to one growing mesh
struct MeshAccumulator {
    mesh: MeshData,
    vertex_offset: u32,
}

impl MeshAccumulator {
    fn new(name: impl Into<String>) -> Self {
        Self {
            mesh: MeshData::new(name),
            vertex_offset: 0,
        }
    }

    /// Append a patch; fails when the mesh would outgrow `u32` indices
    fn push(&mut self, patch: &FacePatch) -> Result<(), ConvertError> {
        let offset = self.vertex_offset;
        self.vertex_offset = offset
            .checked_add(patch.vertex_count)
            .ok_or_else(|| too_many_vertices(format!("mesh '{}'", self.mesh.name)))?;

        self.mesh.vertices.extend_from_slice(&patch.vertices);
        self.mesh.normals.extend_from_slice(&patch.normals);
        self.mesh
            .indices
            .extend(patch.indices.iter().map(|i| i + offset));
        Ok(())
    }

    /// The finished mesh, `None` when nothing was appended
    fn finish(self) -> Option<MeshData> {
        (!self.mesh.is_empty()).then_some(self.mesh)
    }
}

/// Consolidate face records into meshes
///
/// With [`PartGrouping::Merged`] the result is a single "Model" mesh; with
/// [`PartGrouping::PerPart`] one "Part N" mesh per part (1-based part
/// index). Faces without a triangulation contribute nothing and meshes
/// without vertices are omitted.
///
/// Fails with [`ConvertError::TessellationFailure`] when a mesh would need
/// more vertices than `u32` indices can address.
pub fn consolidate(
    faces: &[Face],
    grouping: PartGrouping,
    parallel: bool,
) -> Result<Vec<MeshData>, ConvertError> {
    let patches: Vec<Option<FacePatch>> = if parallel {
        faces.par_iter().map(face_patch).collect::<Result<_, _>>()?
    } else {
        faces.iter().map(face_patch).collect::<Result<_, _>>()?
    };

    match grouping {
        PartGrouping::Merged => {
            let mut acc = MeshAccumulator::new(MERGED_MESH_NAME);
            for patch in patches.iter().flatten() {
                acc.push(patch)?;
            }
            Ok(acc.finish().into_iter().collect())
        }
        PartGrouping::PerPart => {
            let mut parts: BTreeMap<usize, MeshAccumulator> = BTreeMap::new();
            for patch in patches.iter().flatten() {
                parts
                    .entry(patch.part)
                    .or_insert_with(|| MeshAccumulator::new(format!("Part {}", patch.part + 1)))
                    .push(patch)?;
            }
            Ok(parts.into_values().filter_map(MeshAccumulator::finish).collect())
        }
    }
}

/// Tessellate a shape and consolidate its faces
///
/// # Arguments
/// * `shape` - Kernel shape obtained from a reader
/// * `params` - Deflection settings passed to the kernel
/// * `grouping` - Output mesh grouping
/// * `format` / `file_name` - Reported in the metadata
///
/// # Returns
/// The meshes (possibly empty) and their aggregate metadata
pub fn extract(
    shape: &mut dyn BrepShape,
    params: &MeshParams,
    grouping: PartGrouping,
    format: CadFormat,
    file_name: &str,
) -> Result<(Vec<MeshData>, ConversionMetadata), ConvertError> {
    if !shape.tessellate(params) {
        return Err(ConvertError::tessellation(format!(
            "kernel rejected deflection {} / {}",
            params.linear_deflection, params.angular_deflection
        )));
    }

    let faces = shape.faces();
    let meshed = faces.iter().filter(|f| f.is_meshed()).count();
    let meshes = consolidate(&faces, grouping, params.parallel)?;
    let metadata = ConversionMetadata::from_meshes(&meshes, format, file_name);

    log::info!(
        "{}: {}/{} faces meshed, {} meshes, {} vertices, {} triangles",
        file_name,
        meshed,
        faces.len(),
        metadata.part_count,
        metadata.vertex_count,
        metadata.face_count
    );

    Ok((meshes, metadata))
}
