// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Face mesher
//!
//! Turns one [`BrepFace`] into a [`FaceTriangulation`] in the face's local
//! frame:
//!
//! - **Planar faces**: wires are flattened onto the plane and triangulated
//!   with earcut (holes included)
//! - **Cylindrical faces**: wires are unrolled into `(r·θ, h)`, triangulated,
//!   flipped towards Delaunay and refined until no triangle edge spans more
//!   than one arc step
//! - **Tessellated faces**: passed through unchanged
//!
//! Arcs are sampled so that neither the chord height nor the turning angle
//! between segments exceeds the requested deflections. Triangle winding
//! always agrees with the face normal.

use crate::constants::{
    MAX_ARC_SEGMENTS, MAX_FLIP_PASSES, MAX_REFINE_PASSES, POINT_MERGE_TOLERANCE,
};
use crate::triangulation::{
    area_vector, plane_basis, polygon_normal, project_to_2d, signed_area, triangulate,
};
use crate::{Error, Result};
use cadmesh_model::{
    BoundEdge, BrepFace, FaceBound, FaceKind, FaceTriangulation, MeshParams, Surface,
};
use nalgebra::{Point2, Point3, Vector3};
use rustc_hash::FxHashMap;
use std::f64::consts::{PI, TAU};
use std::ops::Range;

/// Largest angle one arc segment may span
fn angular_step(radius: f64, params: &MeshParams) -> f64 {
    let deflection = if params.relative {
        params.linear_deflection * radius
    } else {
        params.linear_deflection
    };

    let mut step = params.angular_deflection;
    if radius > 0.0 && deflection < radius {
        // Chord height of a segment spanning `a` is r·(1 - cos(a/2))
        step = step.min(2.0 * (1.0 - deflection / radius).acos());
    }
    step.max(TAU / MAX_ARC_SEGMENTS as f64)
}

/// Number of segments needed to sample an arc of `angle` radians
///
/// `max(ceil(φ/angular), ceil(φ/(2·acos(1 - d/r))))`, at least 1 and at most
/// [`MAX_ARC_SEGMENTS`]. In relative mode `d` scales with the radius.
pub fn arc_segments(angle: f64, radius: f64, params: &MeshParams) -> usize {
    let n = (angle.abs() / angular_step(radius, params)).ceil();
    if n.is_finite() {
        (n as usize).clamp(1, MAX_ARC_SEGMENTS)
    } else {
        1
    }
}

/// Sample a circular arc, counter-clockwise about `axis`
///
/// The result starts at `start` and ends at `end`; `start == end` yields a
/// full circle.
pub fn sample_arc(
    center: &Point3<f64>,
    axis: &Vector3<f64>,
    radius: f64,
    start: &Point3<f64>,
    end: &Point3<f64>,
    params: &MeshParams,
) -> Vec<Point3<f64>> {
    let axis = axis.try_normalize(1e-12).unwrap_or_else(Vector3::z);
    let radial = start - center;
    let Some(u) = (radial - axis * radial.dot(&axis)).try_normalize(1e-12) else {
        return vec![*start, *end];
    };
    let v = axis.cross(&u);

    let e = end - center;
    let mut sweep = e.dot(&v).atan2(e.dot(&u));
    if sweep <= 1e-9 {
        sweep += TAU;
    }

    let n = arc_segments(sweep, radius, params);
    let mut points = Vec::with_capacity(n + 1);
    points.push(*start);
    for i in 1..n {
        let t = sweep * i as f64 / n as f64;
        points.push(center + (u * t.cos() + v * t.sin()) * radius);
    }
    points.push(*end);
    points
}

fn edge_points(edge: &BoundEdge, params: &MeshParams) -> Vec<Point3<f64>> {
    match edge {
        BoundEdge::Line { start, end } => vec![*start, *end],
        BoundEdge::Polyline(points) => points.clone(),
        BoundEdge::Arc {
            center,
            axis,
            radius,
            start,
            end,
        } => sample_arc(center, axis, *radius, start, end, params),
    }
}

/// Discretize a wire into a closed point loop (last point not repeated)
pub fn wire_points(bound: &FaceBound, params: &MeshParams) -> Vec<Point3<f64>> {
    let mut points: Vec<Point3<f64>> = Vec::new();
    for edge in &bound.edges {
        for p in edge_points(edge, params) {
            if points
                .last()
                .is_some_and(|q| (p - q).norm() <= POINT_MERGE_TOLERANCE)
            {
                continue;
            }
            points.push(p);
        }
    }

    while points.len() > 1
        && (points[0] - points[points.len() - 1]).norm() <= POINT_MERGE_TOLERANCE
    {
        points.pop();
    }

    if !bound.orientation {
        points.reverse();
    }
    points
}

/// A discretized wire
struct Wire {
    points: Vec<Point3<f64>>,
    outer: bool,
}

fn collect_wires(bounds: &[FaceBound], params: &MeshParams) -> Vec<Wire> {
    bounds
        .iter()
        .map(|b| Wire {
            points: wire_points(b, params),
            outer: b.outer,
        })
        .filter(|w| w.points.len() >= 3)
        .collect()
}

/// Index of the outer wire: the flagged one, else the one with the largest area
fn outer_index(outer_flags: impl Iterator<Item = bool>, areas: &[f64]) -> usize {
    let flags: Vec<bool> = outer_flags.collect();
    flags.iter().position(|&f| f).unwrap_or_else(|| {
        areas
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map_or(0, |(i, _)| i)
    })
}

/// Mesh a single face
///
/// # Returns
/// The triangulation in the face's local frame, with 1-based references
pub fn mesh_face(face: &BrepFace, params: &MeshParams) -> Result<FaceTriangulation> {
    match &face.kind {
        FaceKind::Tessellated(triangulation) => {
            if triangulation.triangles.is_empty() || !triangulation.is_well_formed() {
                return Err(Error::degenerate("tessellated face without valid triangles"));
            }
            Ok(triangulation.clone())
        }
        FaceKind::Bounded {
            surface,
            bounds,
            same_sense,
        } => {
            if let Surface::Unsupported(name) = surface {
                return Err(Error::unsupported_surface(name.clone()));
            }

            let wires = collect_wires(bounds, params);
            if wires.is_empty() {
                return Err(Error::degenerate("no closed wire"));
            }

            match surface {
                Surface::Planar { normal } => mesh_planar(*normal, &wires, *same_sense),
                Surface::Cylinder {
                    origin,
                    axis,
                    ref_dir,
                    radius,
                } => {
                    let frame = CylinderFrame::new(*origin, axis, ref_dir, *radius)?;
                    mesh_cylinder(&frame, &wires, *same_sense, params)
                }
                Surface::Unsupported(name) => Err(Error::unsupported_surface(name.clone())),
            }
        }
    }
}

fn mesh_planar(
    normal: Option<Vector3<f64>>,
    wires: &[Wire],
    same_sense: bool,
) -> Result<FaceTriangulation> {
    let areas: Vec<f64> = wires.iter().map(|w| area_vector(&w.points).norm()).collect();
    let outer_idx = outer_index(wires.iter().map(|w| w.outer), &areas);
    let outer = &wires[outer_idx];

    let surface_normal = match normal.and_then(|n| n.try_normalize(1e-12)) {
        Some(n) => n,
        None => polygon_normal(&outer.points)
            .ok_or_else(|| Error::degenerate("outer wire encloses no area"))?,
    };
    let face_normal = if same_sense {
        surface_normal
    } else {
        -surface_normal
    };

    let (u_axis, v_axis) = plane_basis(&surface_normal);
    let origin = outer.points[0];

    let mut nodes = outer.points.clone();
    let mut ranges = vec![0..nodes.len()];
    let outer_2d = project_to_2d(&outer.points, &origin, &u_axis, &v_axis);
    let mut holes_2d = Vec::with_capacity(wires.len() - 1);
    for (i, wire) in wires.iter().enumerate() {
        if i == outer_idx {
            continue;
        }
        holes_2d.push(project_to_2d(&wire.points, &origin, &u_axis, &v_axis));
        ranges.push(nodes.len()..nodes.len() + wire.points.len());
        nodes.extend_from_slice(&wire.points);
    }

    let triangles = triangulate(&outer_2d, &holes_2d)?;
    let triangles = restore_boundary_nodes(triangles, &ranges);

    let triangles = triangles
        .into_iter()
        .map(|[a, b, c]| {
            let n = (nodes[b] - nodes[a]).cross(&(nodes[c] - nodes[a]));
            if n.dot(&face_normal) < 0.0 {
                [a, c, b]
            } else {
                [a, b, c]
            }
        })
        .collect::<Vec<_>>();

    finish(nodes, vec![face_normal; ranges_len(&ranges)], &triangles)
}

fn ranges_len(ranges: &[Range<usize>]) -> usize {
    ranges.last().map_or(0, |r| r.end)
}

/// Convert 0-based triangles into a 1-based triangulation
fn finish(
    nodes: Vec<Point3<f64>>,
    normals: Vec<Vector3<f64>>,
    triangles: &[[usize; 3]],
) -> Result<FaceTriangulation> {
    if triangles.is_empty() {
        return Err(Error::triangulation("no triangles produced"));
    }
    let triangles = triangles
        .iter()
        .map(|t| [t[0] as u32 + 1, t[1] as u32 + 1, t[2] as u32 + 1])
        .collect();
    Ok(FaceTriangulation::new(nodes, triangles).with_normals(normals))
}

/// Put back boundary nodes that earcut dropped as collinear
///
/// Each dropped run sits on a boundary edge owned by exactly one triangle;
/// that triangle is fanned from its opposite corner over the run.
fn restore_boundary_nodes(
    triangles: Vec<[usize; 3]>,
    ranges: &[Range<usize>],
) -> Vec<[usize; 3]> {
    let mut used = vec![false; ranges_len(ranges)];
    for t in &triangles {
        for &i in t {
            if let Some(u) = used.get_mut(i) {
                *u = true;
            }
        }
    }

    // Directed boundary edge -> dropped nodes in wire order
    let mut runs: FxHashMap<(usize, usize), Vec<usize>> = FxHashMap::default();
    for range in ranges {
        let wire: Vec<usize> = range.clone().collect();
        let Some(first) = wire.iter().position(|&i| used[i]) else {
            continue;
        };
        let n = wire.len();
        let mut start = wire[first];
        let mut pending = Vec::new();
        for step in 1..=n {
            let node = wire[(first + step) % n];
            if used[node] {
                if !pending.is_empty() && start != node {
                    runs.insert((start, node), std::mem::take(&mut pending));
                }
                pending.clear();
                start = node;
            } else {
                pending.push(node);
            }
        }
    }

    if runs.is_empty() {
        return triangles;
    }

    let run_between = |a: usize, b: usize| -> Option<Vec<usize>> {
        if let Some(run) = runs.get(&(a, b)) {
            return Some(run.clone());
        }
        runs.get(&(b, a)).map(|run| run.iter().rev().copied().collect())
    };

    let mut stack = triangles;
    let mut out = Vec::with_capacity(stack.len());
    while let Some(t) = stack.pop() {
        let split = (0..3).find_map(|k| run_between(t[k], t[(k + 1) % 3]).map(|run| (k, run)));
        match split {
            None => out.push(t),
            Some((k, run)) => {
                let (a, b, c) = (t[k], t[(k + 1) % 3], t[(k + 2) % 3]);
                let mut chain = Vec::with_capacity(run.len() + 2);
                chain.push(a);
                chain.extend(run);
                chain.push(b);
                for w in chain.windows(2) {
                    stack.push([w[0], w[1], c]);
                }
            }
        }
    }
    out
}

/// Orthonormal frame of a cylinder
struct CylinderFrame {
    origin: Point3<f64>,
    axis: Vector3<f64>,
    x_dir: Vector3<f64>,
    y_dir: Vector3<f64>,
    radius: f64,
}

impl CylinderFrame {
    fn new(
        origin: Point3<f64>,
        axis: &Vector3<f64>,
        ref_dir: &Vector3<f64>,
        radius: f64,
    ) -> Result<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(Error::degenerate(format!("cylinder radius {}", radius)));
        }
        let axis = axis
            .try_normalize(1e-12)
            .ok_or_else(|| Error::degenerate("cylinder axis"))?;
        let x_dir = (ref_dir - axis * ref_dir.dot(&axis))
            .try_normalize(1e-12)
            .unwrap_or_else(|| plane_basis(&axis).0);
        let y_dir = axis.cross(&x_dir);
        Ok(Self {
            origin,
            axis,
            x_dir,
            y_dir,
            radius,
        })
    }

    fn angle(&self, p: &Point3<f64>) -> f64 {
        let d = p - self.origin;
        d.dot(&self.y_dir).atan2(d.dot(&self.x_dir))
    }

    fn height(&self, p: &Point3<f64>) -> f64 {
        (p - self.origin).dot(&self.axis)
    }

    fn radial(&self, theta: f64) -> Vector3<f64> {
        self.x_dir * theta.cos() + self.y_dir * theta.sin()
    }

    /// Surface point at unrolled coordinates `(r·θ, h)`
    fn point(&self, uv: &Point2<f64>) -> Point3<f64> {
        let theta = uv.x / self.radius;
        self.origin + self.radial(theta) * self.radius + self.axis * uv.y
    }

    /// Unroll a closed wire, keeping θ continuous along it
    ///
    /// Also returns the winding: total θ travelled including the closing
    /// segment. It is ±2π for a wire that circles the axis and 0 otherwise.
    fn unroll(&self, points: &[Point3<f64>]) -> (Vec<Point2<f64>>, f64) {
        let mut out = Vec::with_capacity(points.len() + 1);
        let mut raw_prev = 0.0;
        let mut theta = 0.0;
        for (i, p) in points.iter().enumerate() {
            let raw = self.angle(p);
            theta = if i == 0 { raw } else { theta + wrap_angle(raw - raw_prev) };
            raw_prev = raw;
            out.push(Point2::new(theta * self.radius, self.height(p)));
        }

        let winding = match points.first() {
            Some(first) => {
                let first_raw = self.angle(first);
                theta + wrap_angle(first_raw - raw_prev) - first_raw
            }
            None => 0.0,
        };
        (out, winding)
    }
}

/// Map an angle difference into (-π, π]
fn wrap_angle(mut a: f64) -> f64 {
    while a > PI {
        a -= TAU;
    }
    while a <= -PI {
        a += TAU;
    }
    a
}

fn mesh_cylinder(
    frame: &CylinderFrame,
    wires: &[Wire],
    same_sense: bool,
    params: &MeshParams,
) -> Result<FaceTriangulation> {
    let r = frame.radius;
    let unrolled: Vec<(Vec<Point2<f64>>, f64)> =
        wires.iter().map(|w| frame.unroll(&w.points)).collect();
    let rings: Vec<usize> = unrolled
        .iter()
        .enumerate()
        .filter(|(_, (_, winding))| winding.abs() > PI)
        .map(|(i, _)| i)
        .collect();

    let mut uv: Vec<Point2<f64>>;
    let mut ranges: Vec<Range<usize>>;
    let triangles = if rings.is_empty() {
        let areas: Vec<f64> = unrolled.iter().map(|(p, _)| signed_area(p).abs()).collect();
        let outer_idx = outer_index(wires.iter().map(|w| w.outer), &areas);
        let outer = &unrolled[outer_idx].0;
        let (min_s, max_s) = outer
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.x), hi.max(p.x)));
        let mid = (min_s + max_s) * 0.5;

        uv = outer.clone();
        ranges = vec![0..uv.len()];
        let mut holes = Vec::with_capacity(unrolled.len() - 1);
        for (i, (points, _)) in unrolled.iter().enumerate() {
            if i == outer_idx {
                continue;
            }
            // Bring the hole onto the same turn as the outer wire
            let hole_mid = points.iter().map(|p| p.x).sum::<f64>() / points.len() as f64;
            let shift = ((mid - hole_mid) / (TAU * r)).round() * TAU * r;
            let hole: Vec<Point2<f64>> = points
                .iter()
                .map(|p| Point2::new(p.x + shift, p.y))
                .collect();
            ranges.push(uv.len()..uv.len() + hole.len());
            uv.extend_from_slice(&hole);
            holes.push(hole);
        }
        triangulate(outer, &holes)?
    } else if rings.len() == 2 && unrolled.len() == 2 {
        uv = band_polygon(&unrolled[0], &unrolled[1], r);
        ranges = vec![0..uv.len()];
        triangulate(&uv, &[])?
    } else {
        return Err(Error::degenerate(format!(
            "cylinder bounded by {} wires, {} around the axis",
            unrolled.len(),
            rings.len()
        )));
    };

    let triangles = restore_boundary_nodes(triangles, &ranges);

    // Counter-clockwise in (r·θ, h) faces radially outward
    let mut triangles: Vec<[usize; 3]> = triangles
        .into_iter()
        .map(|[a, b, c]| {
            if signed_area(&[uv[a], uv[b], uv[c]]) >= 0.0 {
                [a, b, c]
            } else {
                [a, c, b]
            }
        })
        .collect();

    let max_ds = r * angular_step(r, params) * (1.0 + 1e-6);
    flip_to_delaunay(&uv, &mut triangles);
    let mut triangles = refine(&mut uv, triangles, max_ds);
    flip_to_delaunay(&uv, &mut triangles);
    let mut triangles = refine(&mut uv, triangles, max_ds);
    if !same_sense {
        triangles.iter_mut().for_each(|t| t.swap(1, 2));
    }

    let sign = if same_sense { 1.0 } else { -1.0 };
    let nodes = uv.iter().map(|p| frame.point(p)).collect();
    let normals = uv
        .iter()
        .map(|p| frame.radial(p.x / r) * sign)
        .collect();
    finish(nodes, normals, &triangles)
}

/// Closed polygon between two wires that each circle the axis once
///
/// Both rings run towards +s and are closed by a copy of their first node one
/// turn later. The second ring starts at its node nearest the first ring's
/// start, so the two connecting edges stay short.
fn band_polygon(
    first: &(Vec<Point2<f64>>, f64),
    second: &(Vec<Point2<f64>>, f64),
    radius: f64,
) -> Vec<Point2<f64>> {
    let turn = TAU * radius;
    let forward = |(points, winding): &(Vec<Point2<f64>>, f64)| {
        let mut ring = points.clone();
        if *winding < 0.0 {
            ring.reverse();
        }
        ring
    };

    let mut bottom = forward(first);
    let mut top = forward(second);
    let Some(anchor) = bottom.first().map(|p| p.x) else {
        return top;
    };

    let offset = |x: f64| {
        let d = x - anchor;
        d - (d / turn).round() * turn
    };
    let start = top
        .iter()
        .enumerate()
        .min_by(|a, b| offset(a.1.x).abs().total_cmp(&offset(b.1.x).abs()))
        .map_or(0, |(i, _)| i);
    top.rotate_left(start);
    let wrapped = top.len() - start;
    top[wrapped..].iter_mut().for_each(|p| p.x += turn);
    if let Some(head) = top.first().map(|p| p.x) {
        let shift = anchor + offset(head) - head;
        top.iter_mut().for_each(|p| p.x += shift);
    }

    for ring in [&mut bottom, &mut top] {
        if let Some(head) = ring.first().copied() {
            ring.push(Point2::new(head.x + turn, head.y));
        }
    }

    top.reverse();
    bottom.append(&mut top);
    bottom
}

/// Whether `d` lies strictly inside the circumcircle of counter-clockwise `abc`
fn in_circumcircle(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>, d: &Point2<f64>) -> bool {
    let (adx, ady) = (a.x - d.x, a.y - d.y);
    let (bdx, bdy) = (b.x - d.x, b.y - d.y);
    let (cdx, cdy) = (c.x - d.x, c.y - d.y);
    let ad = adx * adx + ady * ady;
    let bd = bdx * bdx + bdy * bdy;
    let cd = cdx * cdx + cdy * cdy;

    let det = adx * (bdy * cd - bd * cdy) - ady * (bdx * cd - bd * cdx)
        + ad * (bdx * cdy - bdy * cdx);
    det > 1e-9 * (ad * bd + bd * cd + cd * ad)
}

/// Lawson edge flips towards the constrained Delaunay triangulation
///
/// Triangles must be counter-clockwise. Edges used by a single triangle are
/// boundary and never flipped.
fn flip_to_delaunay(uv: &[Point2<f64>], triangles: &mut [[usize; 3]]) {
    for _ in 0..MAX_FLIP_PASSES {
        let mut edges: FxHashMap<(usize, usize), (usize, usize)> = FxHashMap::default();
        for (i, t) in triangles.iter().enumerate() {
            for k in 0..3 {
                edges.insert((t[k], t[(k + 1) % 3]), (i, k));
            }
        }

        let mut touched = vec![false; triangles.len()];
        let mut flipped = false;
        for i in 0..triangles.len() {
            for k in 0..3 {
                if touched[i] {
                    break;
                }
                let t = triangles[i];
                let (a, b, c) = (t[k], t[(k + 1) % 3], t[(k + 2) % 3]);
                let Some(&(j, kj)) = edges.get(&(b, a)) else {
                    continue;
                };
                if j == i || touched[j] {
                    continue;
                }
                let d = triangles[j][(kj + 2) % 3];
                if !in_circumcircle(&uv[a], &uv[b], &uv[c], &uv[d]) {
                    continue;
                }

                let left = [c, a, d];
                let right = [d, b, c];
                let positive = |t: &[usize; 3]| signed_area(&[uv[t[0]], uv[t[1]], uv[t[2]]]) > 0.0;
                if !(positive(&left) && positive(&right)) {
                    continue;
                }
                triangles[i] = left;
                triangles[j] = right;
                touched[i] = true;
                touched[j] = true;
                flipped = true;
            }
        }
        if !flipped {
            break;
        }
    }
}

/// Split triangle edges spanning more than `max_ds` along the unrolled angle
///
/// Midpoints are shared between neighbours so the mesh stays conforming.
fn refine(
    uv: &mut Vec<Point2<f64>>,
    mut triangles: Vec<[usize; 3]>,
    max_ds: f64,
) -> Vec<[usize; 3]> {
    for _ in 0..MAX_REFINE_PASSES {
        let mut midpoints: FxHashMap<(usize, usize), usize> = FxHashMap::default();
        for t in &triangles {
            for k in 0..3 {
                let (a, b) = (t[k], t[(k + 1) % 3]);
                if (uv[a].x - uv[b].x).abs() <= max_ds {
                    continue;
                }
                let key = (a.min(b), a.max(b));
                if !midpoints.contains_key(&key) {
                    let mid = Point2::from((uv[a].coords + uv[b].coords) * 0.5);
                    midpoints.insert(key, uv.len());
                    uv.push(mid);
                }
            }
        }
        if midpoints.is_empty() {
            break;
        }

        let mut next = Vec::with_capacity(triangles.len() * 2);
        for t in &triangles {
            split_triangle(*t, &midpoints, &mut next);
        }
        triangles = next;
    }
    triangles
}

fn split_triangle(
    t: [usize; 3],
    midpoints: &FxHashMap<(usize, usize), usize>,
    out: &mut Vec<[usize; 3]>,
) {
    let mid = |a: usize, b: usize| midpoints.get(&(a.min(b), a.max(b))).copied();
    let m = [mid(t[0], t[1]), mid(t[1], t[2]), mid(t[2], t[0])];

    match m.iter().filter(|x| x.is_some()).count() {
        0 => out.push(t),
        1 => {
            // Rotate so the split edge is v0-v1
            let k = m.iter().position(Option::is_some).unwrap_or(0);
            let (v0, v1, v2) = (t[k], t[(k + 1) % 3], t[(k + 2) % 3]);
            if let Some(m0) = m[k] {
                out.push([v0, m0, v2]);
                out.push([m0, v1, v2]);
            }
        }
        2 => {
            // Rotate so v2-v0 is the unsplit edge
            let k = (m.iter().position(Option::is_none).unwrap_or(2) + 1) % 3;
            let (v0, v1, v2) = (t[k], t[(k + 1) % 3], t[(k + 2) % 3]);
            if let (Some(m0), Some(m1)) = (m[k], m[(k + 1) % 3]) {
                out.push([m0, v1, m1]);
                out.push([v0, m0, m1]);
                out.push([v0, m1, v2]);
            }
        }
        _ => {
            if let [Some(m0), Some(m1), Some(m2)] = m {
                out.push([t[0], m0, m2]);
                out.push([m0, t[1], m1]);
                out.push([m2, m1, t[2]]);
                out.push([m0, m1, m2]);
            }
        }
    }
}
