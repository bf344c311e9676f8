// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IGES entity graph to B-rep transfer

use super::{IgesEntity, IgesFile, Param};
use crate::math::{affine_from_rows, orthogonal_ref, to_isometry, to_point};
use cadmesh_model::{
    BoundEdge, BrepFace, BrepModel, EntityId, FaceBound, FaceKind, ParseError, Result, Surface,
};
use nalgebra::{Affine3, Point3, Vector3};
use rustc_hash::FxHashSet;

// Entity type numbers
const CIRCULAR_ARC: i32 = 100;
const COMPOSITE_CURVE: i32 = 102;
const COPIOUS_DATA: i32 = 106;
const PLANE: i32 = 108;
const LINE: i32 = 110;
const POINT: i32 = 116;
const DIRECTION: i32 = 123;
const TRANSFORMATION_MATRIX: i32 = 124;
const RATIONAL_BSPLINE_CURVE: i32 = 126;
const CURVE_ON_SURFACE: i32 = 142;
const TRIMMED_SURFACE: i32 = 144;
const MANIFOLD_SOLID: i32 = 186;
const PLANE_SURFACE: i32 = 190;
const CYLINDRICAL_SURFACE: i32 = 192;
const VERTEX_LIST: i32 = 502;
const EDGE_LIST: i32 = 504;
const LOOP: i32 = 508;
const FACE: i32 = 510;
const SHELL: i32 = 514;

/// Nesting limit for matrix chains and composite curves
const MAX_DEPTH: usize = 32;

pub(super) struct Transfer<'a> {
    file: &'a IgesFile,
}

impl<'a> Transfer<'a> {
    pub(super) fn new(file: &'a IgesFile) -> Self {
        Self { file }
    }

    pub(super) fn run(&self) -> BrepModel {
        let mut model = BrepModel {
            metadata: self.file.metadata().clone(),
            ..BrepModel::default()
        };

        let solids = self.file.ids_by_type(MANIFOLD_SOLID);
        let shells = self.file.ids_by_type(SHELL);

        let mut shells_in_solids = FxHashSet::default();
        for solid in solids.iter().filter_map(|p| self.file.entity(*p)) {
            shells_in_solids.extend(solid_shells(solid));
        }

        let mut faces_in_shells = FxHashSet::default();
        for shell in shells.iter().filter_map(|p| self.file.entity(*p)) {
            faces_in_shells.extend(shell_faces(shell).into_iter().map(|(face, _)| face));
        }

        for pointer in &solids {
            let Some(solid) = self.file.entity(*pointer) else {
                continue;
            };
            let faces: Vec<BrepFace> = solid_shells(solid)
                .into_iter()
                .flat_map(|shell| self.shell(shell))
                .collect();
            model.push_part(faces);
        }

        for pointer in shells.iter().filter(|p| !shells_in_solids.contains(*p)) {
            model.push_part(self.shell(*pointer));
        }

        let mut loose: Vec<u32> = self
            .file
            .ids_by_type(FACE)
            .into_iter()
            .chain(self.file.ids_by_type(TRIMMED_SURFACE))
            .filter(|p| !faces_in_shells.contains(p))
            .collect();
        loose.sort_unstable();

        if !loose.is_empty() {
            let faces: Vec<BrepFace> = loose
                .iter()
                .filter_map(|p| self.face_or_warn(*p, true))
                .collect();
            model.push_part(faces);
        }

        log::debug!(
            "IGES transfer: {} parts, {} faces",
            model.part_count,
            model.faces.len()
        );
        model
    }

    // ========================================================================
    // Entity access
    // ========================================================================

    fn entity(&self, pointer: u32) -> Result<&'a IgesEntity> {
        self.file
            .entity(pointer)
            .ok_or(ParseError::EntityNotFound(EntityId(pointer)))
    }

    fn typed(&self, pointer: u32, expected: i32) -> Result<&'a IgesEntity> {
        let entity = self.entity(pointer)?;
        if entity.entity_type() != expected {
            return Err(ParseError::entity_parse(
                EntityId(pointer),
                format!("expected type {}, found {}", expected, entity.entity_type()),
            ));
        }
        Ok(entity)
    }

    /// Full transform of an entity: its own matrix composed with every parent
    fn transform(&self, entity: &IgesEntity) -> Result<Affine3<f64>> {
        self.matrix(entity.entry.transform, 0)
    }

    fn matrix(&self, pointer: u32, depth: usize) -> Result<Affine3<f64>> {
        if pointer == 0 {
            return Ok(Affine3::identity());
        }
        if depth > MAX_DEPTH {
            return Err(ParseError::entity_parse(
                EntityId(pointer),
                "transformation matrix chain too deep",
            ));
        }

        let m = self.typed(pointer, TRANSFORMATION_MATRIX)?;
        let mut values = [0.0; 12];
        for (i, v) in values.iter_mut().enumerate() {
            *v = real(m, i)?;
        }
        let parent = self.matrix(m.entry.transform, depth + 1)?;
        Ok(parent * affine_from_rows(&values))
    }

    // ========================================================================
    // Topology
    // ========================================================================

    fn shell(&self, pointer: u32) -> Vec<BrepFace> {
        let Ok(shell) = self.typed(pointer, SHELL) else {
            log::warn!("Skipping missing IGES shell {}", pointer);
            return Vec::new();
        };
        shell_faces(shell)
            .into_iter()
            .filter_map(|(face, agrees)| self.face_or_warn(face, agrees))
            .collect()
    }

    fn face_or_warn(&self, pointer: u32, agrees: bool) -> Option<BrepFace> {
        match self.face(pointer, agrees) {
            Ok(face) => Some(face),
            Err(e) => {
                log::warn!("Skipping IGES face {}: {}", pointer, e);
                None
            }
        }
    }

    fn face(&self, pointer: u32, agrees: bool) -> Result<BrepFace> {
        let entity = self.entity(pointer)?;
        let (surface, bounds) = match entity.entity_type() {
            FACE => self.brep_face(entity)?,
            TRIMMED_SURFACE => self.trimmed_surface(entity)?,
            other => {
                return Err(ParseError::entity_parse(
                    EntityId(pointer),
                    format!("type {} is not a face", other),
                ))
            }
        };

        let location = to_isometry(&self.transform(entity)?);
        Ok(BrepFace::new(
            EntityId(pointer),
            FaceKind::Bounded {
                surface,
                bounds,
                same_sense: agrees,
            },
        )
        .with_location(location))
    }

    /// 510: SURF, N, OF, LOOP1..LOOPN
    fn brep_face(&self, face: &IgesEntity) -> Result<(Surface, Vec<FaceBound>)> {
        let surface = self.surface(ptr_at(face, 0)?)?;
        let count = listed_count(face, 1, 3, 1)?;
        let first_is_outer = int(face, 2)? == 1;

        let bounds = (0..count)
            .map(|i| {
                let edges = self.loop_edges(ptr_at(face, 3 + i)?)?;
                Ok(FaceBound::new(i == 0 && first_is_outer, edges))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok((surface, bounds))
    }

    /// 144: PTS, N1, N2, PTO, PTI1..PTIN2
    fn trimmed_surface(&self, trimmed: &IgesEntity) -> Result<(Surface, Vec<FaceBound>)> {
        let surface_ptr = ptr_at(trimmed, 0)?;
        let surface = self.surface(surface_ptr)?;
        let natural_outer = int(trimmed, 1)? == 0;
        let holes = listed_count(trimmed, 2, 4, 1)?;
        let outer_ptr = ptr_at(trimmed, 3)?;

        let mut bounds = Vec::with_capacity(holes + 1);
        if outer_ptr != 0 {
            bounds.push(FaceBound::new(true, self.curve_on_surface(outer_ptr)?));
        } else if natural_outer {
            bounds.push(FaceBound::new(true, self.natural_boundary(surface_ptr)?));
        }

        for i in 0..holes {
            let hole = self.curve_on_surface(ptr_at(trimmed, 4 + i)?)?;
            bounds.push(FaceBound::new(false, hole));
        }

        Ok((surface, bounds))
    }

    /// Bounding curve of a bounded 108 plane
    fn natural_boundary(&self, surface_ptr: u32) -> Result<Vec<BoundEdge>> {
        let surface = self.entity(surface_ptr)?;
        let curve = match surface.entity_type() {
            PLANE => ptr_at(surface, 4)?,
            _ => 0,
        };
        if curve == 0 {
            return Err(ParseError::entity_parse(
                EntityId(surface_ptr),
                "untrimmed surface has no boundary curve",
            ));
        }
        self.curve(curve, &self.transform(surface)?, 0)
    }

    /// 142: CRTN, SPTR, BPTR, CPTR, PREF; only the model-space curve is used
    fn curve_on_surface(&self, pointer: u32) -> Result<Vec<BoundEdge>> {
        let cos = self.typed(pointer, CURVE_ON_SURFACE)?;
        let model_curve = ptr_at(cos, 3)?;
        if model_curve == 0 {
            return Err(ParseError::entity_parse(
                EntityId(pointer),
                "boundary has no model-space curve",
            ));
        }
        self.curve(model_curve, &self.transform(cos)?, 0)
    }

    /// 508: N, then per edge TYPE, EDGE, NDX, OF, K, (ISOP, CURV) x K
    fn loop_edges(&self, pointer: u32) -> Result<Vec<BoundEdge>> {
        let lp = self.typed(pointer, LOOP)?;
        let count = int(lp, 0)?.max(0) as usize;
        let mut cursor = 1;
        let mut edges = Vec::new();

        for _ in 0..count {
            let kind = int(lp, cursor)?;
            let list = ptr_at(lp, cursor + 1)?;
            let index = int(lp, cursor + 2)?;
            let agrees = int(lp, cursor + 3)? == 1;
            let pcurves = int(lp, cursor + 4)?.max(0) as usize;
            cursor += 5 + 2 * pcurves;

            // Vertex-only entries contribute nothing to the wire
            if kind != 0 {
                continue;
            }

            let edge = self.edge(list, index)?;
            if agrees {
                edges.extend(edge);
            } else {
                edges.extend(reverse_edges(edge));
            }
        }

        Ok(edges)
    }

    /// Edge `index` (1-based) of a 504 list: CURV, SVP, SV, TVP, TV
    ///
    /// The curve geometry is oriented to run from the start vertex to the
    /// terminate vertex.
    fn edge(&self, list_ptr: u32, index: i64) -> Result<Vec<BoundEdge>> {
        let list = self.typed(list_ptr, EDGE_LIST)?;
        let base = usize::try_from(index - 1)
            .map(|i| 1 + 5 * i)
            .map_err(|_| ParseError::entity_parse(EntityId(list_ptr), "edge index below 1"))?;

        let curve = ptr_at(list, base)?;
        let start = self.vertex(ptr_at(list, base + 1)?, int(list, base + 2)?)?;
        let end = self.vertex(ptr_at(list, base + 3)?, int(list, base + 4)?)?;

        let mut edges = self.curve(curve, &Affine3::identity(), 0)?;
        if let [BoundEdge::Line { .. }] = edges.as_slice() {
            return Ok(vec![BoundEdge::Line { start, end }]);
        }

        let first = edges.first().and_then(BoundEdge::start);
        if let Some(first) = first {
            if (first - end).norm() < (first - start).norm() {
                edges = reverse_edges(edges);
            }
        }
        Ok(edges)
    }

    /// Vertex `index` (1-based) of a 502 list
    fn vertex(&self, list_ptr: u32, index: i64) -> Result<Point3<f64>> {
        let list = self.typed(list_ptr, VERTEX_LIST)?;
        let base = usize::try_from(index - 1)
            .map(|i| 1 + 3 * i)
            .map_err(|_| ParseError::entity_parse(EntityId(list_ptr), "vertex index below 1"))?;
        let p = Point3::new(real(list, base)?, real(list, base + 1)?, real(list, base + 2)?);
        Ok(self.transform(list)?.transform_point(&p))
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    fn surface(&self, pointer: u32) -> Result<Surface> {
        let surface = self.entity(pointer)?;
        let t = self.transform(surface)?;

        Ok(match surface.entity_type() {
            PLANE => {
                let n = Vector3::new(real(surface, 0)?, real(surface, 1)?, real(surface, 2)?);
                Surface::Planar {
                    normal: t.transform_vector(&n).try_normalize(f64::EPSILON),
                }
            }
            PLANE_SURFACE => {
                let normal = self.direction(ptr_at(surface, 1)?, &t)?;
                Surface::Planar {
                    normal: Some(normal),
                }
            }
            CYLINDRICAL_SURFACE => {
                let origin = self.point(ptr_at(surface, 0)?, &t)?;
                let axis = self.direction(ptr_at(surface, 1)?, &t)?;
                let radius = real(surface, 2)?;
                let ref_dir = match surface.params.get(3).and_then(Param::as_pointer) {
                    Some(p) if p != 0 => self.direction(p, &t)?,
                    _ => Vector3::x(),
                };
                Surface::Cylinder {
                    origin,
                    axis,
                    ref_dir: orthogonal_ref(&axis, &ref_dir),
                    radius,
                }
            }
            other => Surface::Unsupported(format!("IGES {}", other)),
        })
    }

    /// 116 point, mapped by its own transform then `outer`
    fn point(&self, pointer: u32, outer: &Affine3<f64>) -> Result<Point3<f64>> {
        let p = self.typed(pointer, POINT)?;
        let local = Point3::new(real(p, 0)?, real(p, 1)?, real(p, 2)?);
        Ok((outer * self.transform(p)?).transform_point(&local))
    }

    /// 123 direction, rotated by its own transform then `outer`
    fn direction(&self, pointer: u32, outer: &Affine3<f64>) -> Result<Vector3<f64>> {
        let d = self.typed(pointer, DIRECTION)?;
        let local = Vector3::new(real(d, 0)?, real(d, 1)?, real(d, 2)?);
        (outer * self.transform(d)?)
            .transform_vector(&local)
            .try_normalize(f64::EPSILON)
            .ok_or_else(|| ParseError::entity_parse(EntityId(pointer), "zero-length direction"))
    }

    /// Model-space edges of a curve entity
    ///
    /// `outer` is the transform of the referencing entity (composite curve
    /// or curve on surface); the curve's own matrix chain is applied first.
    fn curve(&self, pointer: u32, outer: &Affine3<f64>, depth: usize) -> Result<Vec<BoundEdge>> {
        if depth > MAX_DEPTH {
            return Err(ParseError::entity_parse(
                EntityId(pointer),
                "curve nesting too deep",
            ));
        }

        let curve = self.entity(pointer)?;
        let t = outer * self.transform(curve)?;

        match curve.entity_type() {
            LINE => {
                let start = t.transform_point(&point_at(curve, 0)?);
                let end = t.transform_point(&point_at(curve, 3)?);
                Ok(vec![BoundEdge::Line { start, end }])
            }
            CIRCULAR_ARC => {
                // ZT, X1, Y1 (center), X2, Y2 (start), X3, Y3 (end)
                let zt = real(curve, 0)?;
                let (cx, cy) = (real(curve, 1)?, real(curve, 2)?);
                let (sx, sy) = (real(curve, 3)?, real(curve, 4)?);
                let (ex, ey) = (real(curve, 5)?, real(curve, 6)?);

                let center = t.transform_point(&Point3::new(cx, cy, zt));
                let start = t.transform_point(&Point3::new(sx, sy, zt));
                let closed = (sx - ex).hypot(sy - ey) <= 1e-9 * (1.0 + (sx - cx).hypot(sy - cy));
                let end = if closed {
                    start
                } else {
                    t.transform_point(&Point3::new(ex, ey, zt))
                };

                // Counter-clockwise in definition space; mirroring flips it
                let axis = t
                    .transform_vector(&Vector3::x())
                    .cross(&t.transform_vector(&Vector3::y()))
                    .try_normalize(f64::EPSILON)
                    .ok_or_else(|| {
                        ParseError::entity_parse(EntityId(pointer), "degenerate arc transform")
                    })?;

                Ok(vec![BoundEdge::Arc {
                    center,
                    axis,
                    radius: (start - center).norm(),
                    start,
                    end,
                }])
            }
            COPIOUS_DATA => {
                // IP, N, then (ZT, pairs) | triples | sextuples
                let ip = int(curve, 0)?;
                let n = int(curve, 1)?.max(0) as usize;
                let points = (0..n)
                    .map(|i| {
                        let p = match ip {
                            1 => Point3::new(
                                real(curve, 3 + 2 * i)?,
                                real(curve, 4 + 2 * i)?,
                                real(curve, 2)?,
                            ),
                            2 => point_at(curve, 2 + 3 * i)?,
                            _ => point_at(curve, 2 + 6 * i)?,
                        };
                        Ok(t.transform_point(&p))
                    })
                    .collect::<Result<Vec<_>>>()?;
                if points.len() < 2 {
                    return Err(ParseError::entity_parse(
                        EntityId(pointer),
                        "copious data with fewer than two points",
                    ));
                }
                Ok(vec![BoundEdge::Polyline(points)])
            }
            COMPOSITE_CURVE => {
                let n = int(curve, 0)?.max(0) as usize;
                let mut edges = Vec::new();
                for i in 0..n {
                    edges.extend(self.curve(ptr_at(curve, 1 + i)?, &t, depth + 1)?);
                }
                Ok(edges)
            }
            RATIONAL_BSPLINE_CURVE => {
                // K, M, PROP1..4, knots (K+M+2), weights (K+1), control points
                let k = int(curve, 0)?.max(0) as usize;
                let m = int(curve, 1)?.max(0) as usize;
                let first = 6 + (k + m + 2) + (k + 1);
                let points = (0..=k)
                    .map(|i| Ok(t.transform_point(&point_at(curve, first + 3 * i)?)))
                    .collect::<Result<Vec<_>>>()?;
                if m > 1 {
                    log::debug!(
                        "Approximating degree-{} B-spline {} by its control polygon",
                        m,
                        pointer
                    );
                }
                Ok(vec![BoundEdge::Polyline(points)])
            }
            other => Err(ParseError::entity_parse(
                EntityId(pointer),
                format!("unsupported curve type {}", other),
            )),
        }
    }
}

// ============================================================================
// Parameter helpers
// ============================================================================

fn param(entity: &IgesEntity, index: usize) -> Result<&Param> {
    entity
        .params
        .get(index)
        .ok_or_else(|| ParseError::missing(EntityId(entity.entry.pointer), index))
}

fn real(entity: &IgesEntity, index: usize) -> Result<f64> {
    param(entity, index)?.as_f64().ok_or_else(|| {
        ParseError::entity_parse(
            EntityId(entity.entry.pointer),
            format!("parameter {} is not a number", index),
        )
    })
}

fn int(entity: &IgesEntity, index: usize) -> Result<i64> {
    param(entity, index)?.as_i64().ok_or_else(|| {
        ParseError::entity_parse(
            EntityId(entity.entry.pointer),
            format!("parameter {} is not an integer", index),
        )
    })
}

fn ptr_at(entity: &IgesEntity, index: usize) -> Result<u32> {
    param(entity, index)?.as_pointer().ok_or_else(|| {
        ParseError::entity_parse(
            EntityId(entity.entry.pointer),
            format!("parameter {} is not a pointer", index),
        )
    })
}

/// Count at `index` of a list of `stride`-wide items starting at `first`
///
/// Counts that reach past the stored parameters are rejected, so a corrupt
/// entity cannot drive allocation or iteration.
fn listed_count(entity: &IgesEntity, index: usize, first: usize, stride: usize) -> Result<usize> {
    let count = int(entity, index)?.max(0) as usize;
    let available = entity.params.len().saturating_sub(first) / stride;
    if count > available {
        return Err(ParseError::entity_parse(
            EntityId(entity.entry.pointer),
            format!("lists {} items but only {} are present", count, available),
        ));
    }
    Ok(count)
}

fn point_at(entity: &IgesEntity, index: usize) -> Result<Point3<f64>> {
    Ok(to_point(&[
        real(entity, index)?,
        real(entity, index + 1)?,
        real(entity, index + 2)?,
    ]))
}

/// 186: SHELL, SOF, N, (VOID, VOF) x N
fn solid_shells(solid: &IgesEntity) -> Vec<u32> {
    let mut shells: Vec<u32> = solid
        .params
        .first()
        .and_then(Param::as_pointer)
        .into_iter()
        .collect();
    let voids = listed_count(solid, 2, 3, 2).unwrap_or(0);
    shells.extend(
        (0..voids).filter_map(|i| solid.params.get(3 + 2 * i).and_then(Param::as_pointer)),
    );
    shells.retain(|p| *p != 0);
    shells
}

/// 514: N, (FACE, OF) x N; yields face pointer and orientation agreement
fn shell_faces(shell: &IgesEntity) -> Vec<(u32, bool)> {
    let n = listed_count(shell, 0, 1, 2).unwrap_or(0);
    (0..n)
        .filter_map(|i| {
            let face = shell.params.get(1 + 2 * i).and_then(Param::as_pointer)?;
            let agrees = shell
                .params
                .get(2 + 2 * i)
                .and_then(Param::as_i64)
                .map_or(true, |of| of == 1);
            Some((face, agrees))
        })
        .collect()
}

fn reverse_edges(edges: Vec<BoundEdge>) -> Vec<BoundEdge> {
    edges.into_iter().rev().map(BoundEdge::reversed).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iges::build_iges;
    use approx::assert_relative_eq;

    fn parse(entities: &[(i32, i32, u32, &str)]) -> IgesFile {
        IgesFile::parse(&build_iges(entities)).unwrap()
    }

    /// Unit square face on a 108 plane, inside a shell and a solid
    fn square_solid() -> IgesFile {
        parse(&[
            (502, 1, 0, "4,0.,0.,0.,1.,0.,0.,1.,1.,0.,0.,1.,0.;"), // 1
            (110, 0, 0, "0.,0.,0.,1.,0.,0.;"),                     // 3
            (110, 0, 0, "1.,0.,0.,1.,1.,0.;"),                     // 5
            (110, 0, 0, "1.,1.,0.,0.,1.,0.;"),                     // 7
            (110, 0, 0, "0.,1.,0.,0.,0.,0.;"),                     // 9
            (504, 1, 0, "4,3,1,1,1,2,5,1,2,1,3,7,1,3,1,4,9,1,4,1,1;"), // 11
            (508, 1, 0, "4,0,11,1,1,0,0,11,2,1,0,0,11,3,1,0,0,11,4,1,0;"), // 13
            (108, 0, 0, "0.,0.,1.,0.,0,0.,0.,0.,0.;"),            // 15
            (510, 1, 0, "15,1,1,13;"),                             // 17
            (514, 1, 0, "1,17,1;"),                                // 19
            (186, 0, 0, "19,1,0;"),                                // 21
        ])
    }

    #[test]
    fn test_solid_transfers_one_part() {
        let model = square_solid().transfer();
        assert_eq!(model.part_count, 1);
        assert_eq!(model.faces.len(), 1);
        assert_eq!(model.faces[0].id, EntityId(17));

        let FaceKind::Bounded {
            surface,
            bounds,
            same_sense,
        } = &model.faces[0].kind
        else {
            panic!("expected bounded face");
        };
        assert!(*same_sense);
        assert_eq!(surface, &Surface::Planar { normal: Some(Vector3::z()) });
        assert_eq!(bounds.len(), 1);
        assert!(bounds[0].outer);
        assert_eq!(bounds[0].edges.len(), 4);
        assert_eq!(
            bounds[0].edges[1],
            BoundEdge::Line {
                start: Point3::new(1.0, 0.0, 0.0),
                end: Point3::new(1.0, 1.0, 0.0),
            }
        );
    }

    #[test]
    fn test_shell_without_solid_is_its_own_part() {
        let content = build_iges(&[
            (502, 1, 0, "3,0.,0.,0.,1.,0.,0.,0.,1.,0.;"),       // 1
            (110, 0, 0, "0.,0.,0.,1.,0.,0.;"),                  // 3
            (110, 0, 0, "1.,0.,0.,0.,1.,0.;"),                  // 5
            (110, 0, 0, "0.,1.,0.,0.,0.,0.;"),                  // 7
            (504, 1, 0, "3,3,1,1,1,2,5,1,2,1,3,7,1,3,1,1;"),    // 9
            (508, 1, 0, "3,0,9,3,0,0,0,9,2,0,0,0,9,1,0,0;"),    // 11
            (108, 0, 0, "0.,0.,1.,0.,0,0.,0.,0.,0.;"),          // 13
            (510, 1, 0, "13,1,1,11;"),                          // 15
            (514, 2, 0, "1,15,0;"),                             // 17
        ]);
        let model = IgesFile::parse(&content).unwrap().transfer();
        assert_eq!(model.part_count, 1);

        let FaceKind::Bounded {
            bounds, same_sense, ..
        } = &model.faces[0].kind
        else {
            panic!("expected bounded face");
        };
        // Shell orientation flag 0 flips the face
        assert!(!same_sense);
        // Loop flag 0 runs each edge from its terminate vertex
        assert_eq!(
            bounds[0].edges[0],
            BoundEdge::Line {
                start: Point3::new(0.0, 0.0, 0.0),
                end: Point3::new(0.0, 1.0, 0.0),
            }
        );
    }

    #[test]
    fn test_trimmed_surface_with_circular_hole() {
        let model = parse(&[
            (116, 0, 0, "0.,0.,0.,0;"),            // 1
            (123, 0, 0, "0.,0.,1.;"),              // 3
            (190, 0, 0, "1,3;"),                   // 5
            (110, 0, 0, "-2.,-2.,0.,2.,-2.,0.;"),  // 7
            (110, 0, 0, "2.,-2.,0.,2.,2.,0.;"),    // 9
            (110, 0, 0, "2.,2.,0.,-2.,2.,0.;"),    // 11
            (110, 0, 0, "-2.,2.,0.,-2.,-2.,0.;"),  // 13
            (102, 0, 0, "4,7,9,11,13;"),           // 15
            (142, 0, 0, "1,5,0,15,1;"),            // 17
            (100, 0, 0, "0.,0.,0.,1.,0.,1.,0.;"),  // 19
            (142, 0, 0, "1,5,0,19,1;"),            // 21
            (144, 0, 0, "5,1,1,17,21;"),           // 23
        ])
        .transfer();

        assert_eq!(model.part_count, 1);
        assert_eq!(model.faces.len(), 1);
        let FaceKind::Bounded {
            surface, bounds, ..
        } = &model.faces[0].kind
        else {
            panic!("expected bounded face");
        };
        assert_eq!(surface, &Surface::Planar { normal: Some(Vector3::z()) });
        assert_eq!(bounds.len(), 2);
        assert_eq!(bounds[0].edges.len(), 4);
        assert!(!bounds[1].outer);

        match &bounds[1].edges[0] {
            BoundEdge::Arc {
                radius, start, end, ..
            } => {
                assert_relative_eq!(*radius, 1.0);
                assert_eq!(start, end);
            }
            other => panic!("unexpected hole edge {:?}", other),
        }
    }

    #[test]
    fn test_transform_chains_apply_to_curves() {
        let file = parse(&[
            (124, 0, 0, "1.,0.,0.,10.,0.,1.,0.,0.,0.,0.,1.,0.;"),  // 1: translate x+10
            (124, 0, 1, "-1.,0.,0.,0.,0.,1.,0.,0.,0.,0.,1.,0.;"),  // 3: mirror x, then #1
            (110, 0, 1, "0.,0.,0.,1.,0.,0.;"),                    // 5
            (100, 0, 3, "0.,0.,0.,1.,0.,0.,1.;"),                 // 7
        ]);
        let transfer = Transfer::new(&file);

        let line = transfer.curve(5, &Affine3::identity(), 0).unwrap();
        assert_eq!(
            line,
            vec![BoundEdge::Line {
                start: Point3::new(10.0, 0.0, 0.0),
                end: Point3::new(11.0, 0.0, 0.0),
            }]
        );

        match &transfer.curve(7, &Affine3::identity(), 0).unwrap()[0] {
            BoundEdge::Arc {
                center,
                axis,
                start,
                end,
                ..
            } => {
                assert_relative_eq!(*center, Point3::new(10.0, 0.0, 0.0));
                assert_relative_eq!(*start, Point3::new(9.0, 0.0, 0.0));
                assert_relative_eq!(*end, Point3::new(10.0, 1.0, 0.0));
                assert_relative_eq!(*axis, -Vector3::z());
            }
            other => panic!("unexpected edge {:?}", other),
        }
    }

    #[test]
    fn test_cylinder_surface() {
        let file = parse(&[
            (116, 0, 0, "0.,0.,1.,0;"),   // 1
            (123, 0, 0, "0.,0.,3.;"),     // 3
            (123, 0, 0, "0.,1.,0.;"),     // 5
            (192, 1, 0, "1,3,2.5,5;"),    // 7
        ]);
        let surface = Transfer::new(&file).surface(7).unwrap();
        assert_eq!(
            surface,
            Surface::Cylinder {
                origin: Point3::new(0.0, 0.0, 1.0),
                axis: Vector3::z(),
                ref_dir: Vector3::y(),
                radius: 2.5,
            }
        );
    }

    #[test]
    fn test_unsupported_curve_skips_face() {
        let model = parse(&[
            (116, 0, 0, "0.,0.,0.,0;"),   // 1
            (123, 0, 0, "0.,0.,1.;"),     // 3
            (190, 0, 0, "1,3;"),          // 5
            (112, 0, 0, "1,1,0,0.;"),     // 7: parametric spline
            (142, 0, 0, "1,5,0,7,1;"),    // 9
            (144, 0, 0, "5,1,0,9;"),      // 11
        ])
        .transfer();
        assert_eq!(model.part_count, 1);
        assert!(model.faces.is_empty());
    }

    #[test]
    fn test_oversized_counts_are_rejected() {
        let model = parse(&[
            (116, 0, 0, "0.,0.,0.,0;"),                // 1
            (123, 0, 0, "0.,0.,1.;"),                  // 3
            (190, 0, 0, "1,3;"),                       // 5
            (144, 0, 0, "5,1,1000000000000000,9;"),    // 7
            (514, 1, 0, "1000000000000000,7,1;"),      // 9
            (186, 0, 0, "9,1,1000000000000000;"),      // 11
        ])
        .transfer();
        assert!(model.faces.is_empty());

        let file = parse(&[(144, 0, 0, "5,1,1000000000000000,9;")]);
        let trimmed = file.entity(1).unwrap();
        assert!(listed_count(trimmed, 2, 4, 1).is_err());
        assert_eq!(listed_count(trimmed, 1, 3, 1).unwrap(), 1);
    }

    #[test]
    fn test_transform_cycle_is_an_error() {
        let file = parse(&[
            (124, 0, 3, "1.,0.,0.,0.,0.,1.,0.,0.,0.,0.,1.,0.;"), // 1 -> 3
            (124, 0, 1, "1.,0.,0.,0.,0.,1.,0.,0.,0.,0.,1.,0.;"), // 3 -> 1
        ]);
        assert!(Transfer::new(&file).matrix(1, 0).is_err());
    }
}
