// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP (ISO 10303-21) reader
//!
//! Parses a Part 21 exchange file and transfers its B-rep roots into a
//! [`BrepModel`]. Roots are visited in entity-id order:
//!
//! 1. Solids, surface models and tessellated solids/shells
//! 2. Shells not referenced by any of the above
//! 3. If nothing was found, every face entity as a single part

use crate::math::{orthogonal_ref, to_point};
use crate::resolver::StepResolver;
use crate::scanner::{data_section_start, has_signature, parse_header};
use cadmesh_model::{
    BoundEdge, BrepFace, BrepModel, DecodedEntity, EntityId, EntityResolver, EntityResolverExt,
    FaceBound, FaceKind, FaceTriangulation, ModelMetadata, ParseError, Result, StepType, Surface,
};
use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashSet;
use std::path::Path;
use std::sync::Arc;

/// Root entity types, each transferred as one part
const ROOT_TYPES: [StepType; 6] = [
    StepType::ManifoldSolidBrep,
    StepType::FacetedBrep,
    StepType::BrepWithVoids,
    StepType::ShellBasedSurfaceModel,
    StepType::TessellatedSolid,
    StepType::TessellatedShell,
];

const FACE_TYPES: [StepType; 3] = [
    StepType::AdvancedFace,
    StepType::FaceSurface,
    StepType::TriangulatedFace,
];

/// A parsed STEP file
pub struct StepFile {
    resolver: StepResolver,
    metadata: ModelMetadata,
}

impl StepFile {
    /// Parse file content
    ///
    /// Fails when the signature, the data section or every entity instance
    /// is missing.
    pub fn parse(content: String) -> Result<Self> {
        if !has_signature(&content) {
            return Err(ParseError::format("missing ISO-10303-21 signature"));
        }
        if data_section_start(&content).is_none() {
            return Err(ParseError::format("missing DATA section"));
        }

        let metadata = parse_header(&content);
        let resolver = StepResolver::new(content);
        if resolver.entity_count() == 0 {
            return Err(ParseError::format("DATA section contains no entities"));
        }

        log::debug!(
            "STEP file parsed: {} entities, schema '{}', from '{}'",
            resolver.entity_count(),
            metadata.schema,
            metadata.originating_system.as_deref().unwrap_or("unknown")
        );

        Ok(Self { resolver, metadata })
    }

    /// Read and parse a file from disk
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::parse(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Header information
    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Entity resolver over the data section
    pub fn resolver(&self) -> &StepResolver {
        &self.resolver
    }

    /// Transfer every root into a B-rep model
    pub fn transfer(&self) -> BrepModel {
        Transfer::new(&self.resolver).run(self.metadata.clone())
    }
}

/// Walks the entity graph and builds the B-rep description
struct Transfer<'a> {
    resolver: &'a StepResolver,
    visited_shells: FxHashSet<EntityId>,
}

impl<'a> Transfer<'a> {
    fn new(resolver: &'a StepResolver) -> Self {
        Self {
            resolver,
            visited_shells: FxHashSet::default(),
        }
    }

    fn run(mut self, metadata: ModelMetadata) -> BrepModel {
        let mut model = BrepModel {
            metadata,
            ..BrepModel::default()
        };

        let mut roots: Vec<EntityId> = ROOT_TYPES
            .iter()
            .flat_map(|t| self.resolver.ids_by_type(t))
            .collect();
        roots.sort_unstable();

        for id in roots {
            let Some(root) = self.resolver.get(id) else {
                log::warn!("Skipping undecodable root {}", id);
                continue;
            };
            let faces = self.root_faces(&root);
            model.push_part(self.convert_faces(&faces));
        }

        let mut shells: Vec<EntityId> = [StepType::ClosedShell, StepType::OpenShell]
            .iter()
            .flat_map(|t| self.resolver.ids_by_type(t))
            .filter(|id| !self.visited_shells.contains(id))
            .collect();
        shells.sort_unstable();

        for id in shells {
            if let Some(shell) = self.resolver.get(id) {
                let faces = self.shell_faces(&shell);
                model.push_part(self.convert_faces(&faces));
            }
        }

        if model.part_count == 0 {
            let mut ids: Vec<EntityId> = FACE_TYPES
                .iter()
                .flat_map(|t| self.resolver.ids_by_type(t))
                .collect();
            ids.sort_unstable();

            if !ids.is_empty() {
                let faces: Vec<_> = ids.iter().filter_map(|id| self.resolver.get(*id)).collect();
                model.push_part(self.convert_faces(&faces));
            }
        }

        log::debug!(
            "STEP transfer: {} parts, {} faces",
            model.part_count,
            model.faces.len()
        );
        model
    }

    /// Face entities of a root, in shell order
    fn root_faces(&mut self, root: &DecodedEntity) -> Vec<Arc<DecodedEntity>> {
        let shells: Vec<Arc<DecodedEntity>> = match root.step_type {
            StepType::ManifoldSolidBrep | StepType::FacetedBrep => {
                root.get(1).and_then(|a| self.resolver.resolve_ref(a)).into_iter().collect()
            }
            StepType::BrepWithVoids => {
                let mut shells: Vec<_> =
                    root.get(1).and_then(|a| self.resolver.resolve_ref(a)).into_iter().collect();
                if let Some(voids) = root.get(2) {
                    shells.extend(self.resolver.resolve_ref_list(voids));
                }
                shells
            }
            StepType::ShellBasedSurfaceModel => root
                .get(1)
                .map(|a| self.resolver.resolve_ref_list(a))
                .unwrap_or_default(),
            StepType::TessellatedSolid | StepType::TessellatedShell => {
                return self.tessellated_items(root);
            }
            _ => Vec::new(),
        };

        shells.iter().flat_map(|s| self.shell_faces(s)).collect()
    }

    /// Faces of a (possibly oriented) shell
    fn shell_faces(&mut self, shell: &DecodedEntity) -> Vec<Arc<DecodedEntity>> {
        match &shell.step_type {
            StepType::ClosedShell | StepType::OpenShell => {
                self.visited_shells.insert(shell.id);
                shell
                    .get(1)
                    .map(|a| self.resolver.resolve_ref_list(a))
                    .unwrap_or_default()
            }
            StepType::TessellatedShell => self.tessellated_items(shell),
            StepType::Unknown(name)
                if name == "ORIENTED_CLOSED_SHELL" || name == "ORIENTED_OPEN_SHELL" =>
            {
                match self.resolver.resolve_attr(shell, 2) {
                    Ok(inner) => self.shell_faces(&inner),
                    Err(e) => {
                        log::warn!("Skipping shell {}: {}", shell.id, e);
                        Vec::new()
                    }
                }
            }
            other => {
                log::debug!("Ignoring {} referenced as shell", other);
                Vec::new()
            }
        }
    }

    fn tessellated_items(&self, entity: &DecodedEntity) -> Vec<Arc<DecodedEntity>> {
        entity
            .get(1)
            .map(|a| self.resolver.resolve_ref_list(a))
            .unwrap_or_default()
            .into_iter()
            .filter(|item| item.step_type == StepType::TriangulatedFace)
            .collect()
    }

    fn convert_faces(&self, faces: &[Arc<DecodedEntity>]) -> Vec<BrepFace> {
        faces
            .iter()
            .filter(|f| f.step_type.is_face())
            .filter_map(|f| match self.face(f) {
                Ok(face) => Some(face),
                Err(e) => {
                    log::warn!("Skipping face {}: {}", f.id, e);
                    None
                }
            })
            .collect()
    }

    // ========================================================================
    // Faces
    // ========================================================================

    fn face(&self, face: &DecodedEntity) -> Result<BrepFace> {
        let kind = match face.step_type {
            StepType::TriangulatedFace => FaceKind::Tessellated(self.triangulated_face(face)?),
            _ => {
                let bounds = face
                    .get(1)
                    .map(|a| self.resolver.resolve_ref_list(a))
                    .unwrap_or_default()
                    .iter()
                    .map(|b| self.face_bound(b))
                    .collect::<Result<Vec<_>>>()?;
                let surface = self.surface(&*self.resolver.resolve_attr(face, 2)?)?;
                FaceKind::Bounded {
                    surface,
                    bounds,
                    same_sense: face.get_bool(3).unwrap_or(true),
                }
            }
        };

        Ok(BrepFace::new(face.id, kind))
    }

    /// TRIANGULATED_FACE(name, coordinates, pnmax, normals, geometric_link,
    /// pnindex, triangles)
    fn triangulated_face(&self, face: &DecodedEntity) -> Result<FaceTriangulation> {
        let coords_list = self.resolver.resolve_attr(face, 1)?;
        let coords: Vec<Point3<f64>> = coords_list
            .get_list(2)
            .ok_or_else(|| ParseError::missing(coords_list.id, 2))?
            .iter()
            .filter_map(|c| c.as_float_list())
            .map(|c| to_point(&c))
            .collect();

        let pnindex: Vec<i64> = face
            .get_list(5)
            .map(|l| l.iter().filter_map(|v| v.as_integer()).collect())
            .unwrap_or_default();

        let nodes = if pnindex.is_empty() {
            coords
        } else {
            pnindex
                .iter()
                .map(|&i| {
                    usize::try_from(i - 1)
                        .ok()
                        .and_then(|i| coords.get(i).copied())
                        .ok_or_else(|| {
                            ParseError::entity_parse(face.id, format!("pnindex {} out of range", i))
                        })
                })
                .collect::<Result<Vec<_>>>()?
        };

        let triangles: Vec<[u32; 3]> = face
            .get_list(6)
            .ok_or_else(|| ParseError::missing(face.id, 6))?
            .iter()
            .filter_map(|t| {
                let ids: Vec<u32> = t
                    .as_list()?
                    .iter()
                    .filter_map(|v| v.as_integer())
                    .filter_map(|v| u32::try_from(v).ok())
                    .collect();
                (ids.len() == 3).then(|| [ids[0], ids[1], ids[2]])
            })
            .collect();

        let normals: Vec<Vector3<f64>> = face
            .get_list(3)
            .unwrap_or_default()
            .iter()
            .filter_map(|n| n.as_float_list())
            .filter(|n| n.len() >= 3)
            .map(|n| Vector3::new(n[0], n[1], n[2]))
            .collect();

        let mut triangulation = FaceTriangulation::new(nodes, triangles);
        if normals.len() == triangulation.node_count() {
            triangulation = triangulation.with_normals(normals);
        } else if normals.len() == 1 {
            let uniform = vec![normals[0]; triangulation.node_count()];
            triangulation = triangulation.with_normals(uniform);
        }

        if !triangulation.is_well_formed() {
            return Err(ParseError::entity_parse(
                face.id,
                "triangle references a missing node",
            ));
        }
        Ok(triangulation)
    }

    fn surface(&self, surface: &DecodedEntity) -> Result<Surface> {
        Ok(match surface.step_type {
            StepType::Plane => {
                let (_, axis, _) = self.placement(&*self.resolver.resolve_attr(surface, 1)?)?;
                Surface::Planar { normal: Some(axis) }
            }
            StepType::CylindricalSurface => {
                let (origin, axis, ref_dir) =
                    self.placement(&*self.resolver.resolve_attr(surface, 1)?)?;
                let radius = surface
                    .get_float(2)
                    .ok_or_else(|| ParseError::missing(surface.id, 2))?;
                Surface::Cylinder {
                    origin,
                    axis,
                    ref_dir,
                    radius,
                }
            }
            ref other => Surface::Unsupported(other.name().to_string()),
        })
    }

    // ========================================================================
    // Loops and edges
    // ========================================================================

    /// FACE_BOUND / FACE_OUTER_BOUND(name, bound, orientation)
    fn face_bound(&self, bound: &DecodedEntity) -> Result<FaceBound> {
        let outer = bound.step_type == StepType::FaceOuterBound;
        let wire = self.resolver.resolve_attr(bound, 1)?;

        let edges = match wire.step_type {
            StepType::EdgeLoop => wire
                .get(1)
                .map(|a| self.resolver.resolve_ref_list(a))
                .unwrap_or_default()
                .iter()
                .map(|e| self.oriented_edge(e))
                .collect::<Result<Vec<_>>>()?,
            StepType::PolyLoop => {
                let mut points = wire
                    .get(1)
                    .map(|a| self.resolver.resolve_ref_list(a))
                    .unwrap_or_default()
                    .iter()
                    .map(|p| self.point(p))
                    .collect::<Result<Vec<_>>>()?;
                if let Some(first) = points.first().copied() {
                    points.push(first);
                }
                vec![BoundEdge::Polyline(points)]
            }
            ref other => {
                return Err(ParseError::entity_parse(
                    wire.id,
                    format!("unsupported loop type {}", other),
                ))
            }
        };

        let mut face_bound = FaceBound::new(outer, edges);
        face_bound.orientation = bound.get_bool(2).unwrap_or(true);
        Ok(face_bound)
    }

    /// ORIENTED_EDGE(name, *, *, edge_element, orientation) or a bare EDGE_CURVE
    fn oriented_edge(&self, edge: &DecodedEntity) -> Result<BoundEdge> {
        match edge.step_type {
            StepType::OrientedEdge => {
                let curve = self.edge_curve(&*self.resolver.resolve_attr(edge, 3)?)?;
                Ok(if edge.get_bool(4).unwrap_or(true) {
                    curve
                } else {
                    curve.reversed()
                })
            }
            StepType::EdgeCurve => self.edge_curve(edge),
            ref other => Err(ParseError::entity_parse(
                edge.id,
                format!("unsupported edge type {}", other),
            )),
        }
    }

    /// EDGE_CURVE(name, edge_start, edge_end, edge_geometry, same_sense)
    fn edge_curve(&self, edge: &DecodedEntity) -> Result<BoundEdge> {
        let start = self.vertex(&*self.resolver.resolve_attr(edge, 1)?)?;
        let end = self.vertex(&*self.resolver.resolve_attr(edge, 2)?)?;
        let same_sense = edge.get_bool(4).unwrap_or(true);

        let mut geometry = self.resolver.resolve_attr(edge, 3)?;
        // SURFACE_CURVE / SEAM_CURVE wrap the 3D curve in attribute 1
        while matches!(
            &geometry.step_type,
            StepType::Unknown(n) if n == "SURFACE_CURVE" || n == "SEAM_CURVE"
        ) {
            geometry = self.resolver.resolve_attr(&geometry, 1)?;
        }

        match geometry.step_type {
            StepType::Circle => {
                let (center, axis, _) =
                    self.placement(&*self.resolver.resolve_attr(&geometry, 1)?)?;
                let radius = geometry
                    .get_float(2)
                    .ok_or_else(|| ParseError::missing(geometry.id, 2))?;
                Ok(BoundEdge::Arc {
                    center,
                    axis: if same_sense { axis } else { -axis },
                    radius,
                    start,
                    end,
                })
            }
            StepType::Polyline => {
                let mut points = geometry
                    .get(1)
                    .map(|a| self.resolver.resolve_ref_list(a))
                    .unwrap_or_default()
                    .iter()
                    .map(|p| self.point(p))
                    .collect::<Result<Vec<_>>>()?;
                if !same_sense {
                    points.reverse();
                }
                Ok(BoundEdge::Polyline(points))
            }
            StepType::Line => Ok(BoundEdge::Line { start, end }),
            ref other => {
                // Curved edges without a closed form are replaced by their chord
                log::debug!("Approximating {} edge {} by its chord", other, edge.id);
                Ok(BoundEdge::Line { start, end })
            }
        }
    }

    // ========================================================================
    // Geometry primitives
    // ========================================================================

    fn vertex(&self, vertex: &DecodedEntity) -> Result<Point3<f64>> {
        if vertex.step_type != StepType::VertexPoint {
            return Err(ParseError::entity_parse(vertex.id, "expected VERTEX_POINT"));
        }
        self.point(&*self.resolver.resolve_attr(vertex, 1)?)
    }

    fn point(&self, point: &DecodedEntity) -> Result<Point3<f64>> {
        point
            .get(1)
            .and_then(|a| a.as_float_list())
            .filter(|c| !c.is_empty())
            .map(|c| to_point(&c))
            .ok_or_else(|| ParseError::missing(point.id, 1))
    }

    fn direction(&self, direction: &DecodedEntity) -> Result<Vector3<f64>> {
        let ratios = direction
            .get(1)
            .and_then(|a| a.as_float_list())
            .ok_or_else(|| ParseError::missing(direction.id, 1))?;
        to_point(&ratios)
            .coords
            .try_normalize(f64::EPSILON)
            .ok_or_else(|| ParseError::entity_parse(direction.id, "zero-length direction"))
    }

    /// AXIS2_PLACEMENT_3D(name, location, axis, ref_direction)
    ///
    /// Returns origin, unit axis and a unit reference direction orthogonal
    /// to the axis.
    fn placement(
        &self,
        placement: &DecodedEntity,
    ) -> Result<(Point3<f64>, Vector3<f64>, Vector3<f64>)> {
        let origin = self.point(&*self.resolver.resolve_attr(placement, 1)?)?;
        let axis = match placement.get(2).and_then(|a| self.resolver.resolve_ref(a)) {
            Some(d) => self.direction(&d)?,
            None => Vector3::z(),
        };
        let ref_dir = match placement.get(3).and_then(|a| self.resolver.resolve_ref(a)) {
            Some(d) => self.direction(&d)?,
            None => Vector3::x(),
        };
        Ok((origin, axis, orthogonal_ref(&axis, &ref_dir)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn step(data: &str) -> String {
        format!(
            "ISO-10303-21;\nHEADER;\nFILE_NAME('t.stp','2024-01-01',(''),(''),'','TestCAD','');\nFILE_SCHEMA(('AUTOMOTIVE_DESIGN'));\nENDSEC;\nDATA;\n{}\nENDSEC;\nEND-ISO-10303-21;\n",
            data
        )
    }

    /// Unit square in the XY plane bounded by a POLY_LOOP, wrapped in a
    /// closed shell and a faceted brep
    const SQUARE: &str = "#1=CARTESIAN_POINT('',(0.,0.,0.));
#2=CARTESIAN_POINT('',(1.,0.,0.));
#3=CARTESIAN_POINT('',(1.,1.,0.));
#4=CARTESIAN_POINT('',(0.,1.,0.));
#5=POLY_LOOP('',(#1,#2,#3,#4));
#6=FACE_OUTER_BOUND('',#5,.T.);
#7=DIRECTION('',(0.,0.,1.));
#8=DIRECTION('',(1.,0.,0.));
#9=AXIS2_PLACEMENT_3D('',#1,#7,#8);
#10=PLANE('',#9);
#11=FACE_SURFACE('',(#6),#10,.T.);
#12=CLOSED_SHELL('',(#11));
#13=FACETED_BREP('',#12);";

    #[test]
    fn test_rejects_missing_signature() {
        let err = StepFile::parse("solid cube\nendsolid".to_string()).err().unwrap();
        assert!(matches!(err, ParseError::InvalidFormat(_)));
    }

    #[test]
    fn test_rejects_empty_data_section() {
        assert!(StepFile::parse(step("")).is_err());
        assert!(StepFile::parse("ISO-10303-21;\nHEADER;\nENDSEC;\n".to_string()).is_err());
    }

    #[test]
    fn test_header_metadata() {
        let file = StepFile::parse(step(SQUARE)).unwrap();
        assert_eq!(file.metadata().schema, "AUTOMOTIVE_DESIGN");
        assert_eq!(file.metadata().originating_system.as_deref(), Some("TestCAD"));
    }

    #[test]
    fn test_faceted_brep_transfers_one_part() {
        let model = StepFile::parse(step(SQUARE)).unwrap().transfer();
        assert_eq!(model.part_count, 1);
        assert_eq!(model.faces.len(), 1);

        match &model.faces[0].kind {
            FaceKind::Bounded {
                surface,
                bounds,
                same_sense,
            } => {
                assert!(*same_sense);
                assert_eq!(surface, &Surface::Planar { normal: Some(Vector3::z()) });
                assert_eq!(bounds.len(), 1);
                assert!(bounds[0].outer);
                match &bounds[0].edges[0] {
                    BoundEdge::Polyline(points) => {
                        assert_eq!(points.len(), 5);
                        assert_eq!(points.first(), points.last());
                    }
                    other => panic!("unexpected edge {:?}", other),
                }
            }
            other => panic!("unexpected face {:?}", other),
        }
    }

    #[test]
    fn test_loose_shell_and_face_fallback() {
        // Without the brep, the closed shell becomes the root
        let without_brep = SQUARE.replace("#13=FACETED_BREP('',#12);", "");
        let model = StepFile::parse(step(&without_brep)).unwrap().transfer();
        assert_eq!(model.part_count, 1);
        assert_eq!(model.faces.len(), 1);

        // Without the shell, faces are collected directly
        let faces_only = without_brep.replace("#12=CLOSED_SHELL('',(#11));", "");
        let model = StepFile::parse(step(&faces_only)).unwrap().transfer();
        assert_eq!(model.part_count, 1);
        assert_eq!(model.faces[0].id, EntityId(11));
    }

    #[test]
    fn test_shell_referenced_by_root_is_not_repeated() {
        let two_roots = format!("{}\n#14=CLOSED_SHELL('',(#11));", SQUARE);
        let model = StepFile::parse(step(&two_roots)).unwrap().transfer();
        // #13 (with #12) then loose #14
        assert_eq!(model.part_count, 2);
        assert_eq!(model.faces[1].part, 1);
    }

    #[test]
    fn test_edge_loop_with_circle() {
        // Half disc: a line from (1,0,0) to (-1,0,0) closed by an arc
        let data = "#1=CARTESIAN_POINT('',(0.,0.,0.));
#2=DIRECTION('',(0.,0.,1.));
#3=DIRECTION('',(1.,0.,0.));
#4=AXIS2_PLACEMENT_3D('',#1,#2,#3);
#5=CARTESIAN_POINT('',(1.,0.,0.));
#6=CARTESIAN_POINT('',(-1.,0.,0.));
#7=VERTEX_POINT('',#5);
#8=VERTEX_POINT('',#6);
#9=CIRCLE('',#4,1.);
#10=EDGE_CURVE('',#7,#8,#9,.T.);
#11=VECTOR('',#3,1.);
#12=LINE('',#5,#11);
#13=EDGE_CURVE('',#7,#8,#12,.T.);
#14=ORIENTED_EDGE('',*,*,#10,.T.);
#15=ORIENTED_EDGE('',*,*,#13,.F.);
#16=EDGE_LOOP('',(#14,#15));
#17=FACE_OUTER_BOUND('',#16,.T.);
#18=PLANE('',#4);
#19=ADVANCED_FACE('',(#17),#18,.F.);
#20=CLOSED_SHELL('',(#19));
#21=MANIFOLD_SOLID_BREP('',#20);";

        let model = StepFile::parse(step(data)).unwrap().transfer();
        assert_eq!(model.faces.len(), 1);
        let FaceKind::Bounded {
            bounds, same_sense, ..
        } = &model.faces[0].kind
        else {
            panic!("expected bounded face");
        };
        assert!(!same_sense);

        let edges = &bounds[0].edges;
        assert_eq!(edges.len(), 2);
        match &edges[0] {
            BoundEdge::Arc {
                radius, axis, start, ..
            } => {
                assert_relative_eq!(*radius, 1.0);
                assert_eq!(*axis, Vector3::z());
                assert_eq!(*start, Point3::new(1.0, 0.0, 0.0));
            }
            other => panic!("unexpected edge {:?}", other),
        }
        // Reversed line runs back to the arc start
        assert_eq!(
            edges[1],
            BoundEdge::Line {
                start: Point3::new(-1.0, 0.0, 0.0),
                end: Point3::new(1.0, 0.0, 0.0),
            }
        );
    }

    #[test]
    fn test_cylindrical_surface() {
        let data = "#1=CARTESIAN_POINT('',(0.,0.,5.));
#2=DIRECTION('',(0.,0.,2.));
#3=DIRECTION('',(1.,0.,1.));
#4=AXIS2_PLACEMENT_3D('',#1,#2,#3);
#5=CYLINDRICAL_SURFACE('',#4,2.5);
#6=CARTESIAN_POINT('',(2.5,0.,5.));
#7=CARTESIAN_POINT('',(2.5,0.,6.));
#8=CARTESIAN_POINT('',(0.,2.5,6.));
#9=POLY_LOOP('',(#6,#7,#8));
#10=FACE_BOUND('',#9,.T.);
#11=ADVANCED_FACE('',(#10),#5,.T.);";

        let model = StepFile::parse(step(data)).unwrap().transfer();
        let FaceKind::Bounded { surface, .. } = &model.faces[0].kind else {
            panic!("expected bounded face");
        };
        match surface {
            Surface::Cylinder {
                origin,
                axis,
                ref_dir,
                radius,
            } => {
                assert_eq!(*origin, Point3::new(0.0, 0.0, 5.0));
                assert_relative_eq!(*axis, Vector3::z());
                assert_relative_eq!(*ref_dir, Vector3::x(), epsilon = 1e-12);
                assert_relative_eq!(*radius, 2.5);
            }
            other => panic!("unexpected surface {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_surface_is_kept() {
        let data = SQUARE.replace(
            "#10=PLANE('',#9);",
            "#10=B_SPLINE_SURFACE_WITH_KNOTS('',1,1,(),.UNSPECIFIED.,.F.,.F.,.F.,(),(),(),(),.UNSPECIFIED.);",
        );
        let model = StepFile::parse(step(&data)).unwrap().transfer();
        assert!(matches!(
            &model.faces[0].kind,
            FaceKind::Bounded { surface: Surface::Unsupported(name), .. }
                if name == "B_SPLINE_SURFACE_WITH_KNOTS"
        ));
    }

    #[test]
    fn test_triangulated_face() {
        let data = "#1=COORDINATES_LIST('',4,((0.,0.,0.),(1.,0.,0.),(1.,1.,0.),(0.,1.,0.)));
#2=TRIANGULATED_FACE('',#1,4,((0.,0.,1.)),$,(),((1,2,3),(1,3,4)));
#3=TESSELLATED_SHELL('',(#2),$);
#4=TESSELLATED_SOLID('',(#2),$);";

        let model = StepFile::parse(step(data)).unwrap().transfer();
        // Both the shell and the solid are roots
        assert_eq!(model.part_count, 2);

        let FaceKind::Tessellated(tri) = &model.faces[0].kind else {
            panic!("expected tessellated face");
        };
        assert_eq!(tri.node_count(), 4);
        assert_eq!(tri.triangles, vec![[1, 2, 3], [1, 3, 4]]);
        assert!(tri.has_normals());
        assert_eq!(tri.normals.as_ref().unwrap()[3], Vector3::z());
    }

    #[test]
    fn test_triangulated_face_with_pnindex() {
        let data = "#1=COORDINATES_LIST('',3,((0.,0.,0.),(1.,0.,0.),(0.,1.,0.)));
#2=TRIANGULATED_FACE('',#1,3,(),$,(3,1,2),((1,2,3)));";

        let model = StepFile::parse(step(data)).unwrap().transfer();
        let FaceKind::Tessellated(tri) = &model.faces[0].kind else {
            panic!("expected tessellated face");
        };
        assert_eq!(tri.nodes[0], Point3::new(0.0, 1.0, 0.0));
        assert!(!tri.has_normals());
    }

    #[test]
    fn test_malformed_triangles_skip_face() {
        let data = "#1=COORDINATES_LIST('',3,((0.,0.,0.),(1.,0.,0.),(0.,1.,0.)));
#2=TRIANGULATED_FACE('',#1,3,(),$,(),((1,2,7)));";

        let model = StepFile::parse(step(data)).unwrap().transfer();
        assert_eq!(model.part_count, 1);
        assert!(model.faces.is_empty());
    }
}
