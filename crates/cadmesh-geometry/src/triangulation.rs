// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation utilities
//!
//! Wrapper around earcutr for 2D polygons with holes, plus the plane
//! helpers used to flatten boundary wires before triangulating them.

use crate::constants::MIN_POLYGON_AREA;
use crate::{Error, Point2, Point3, Result, Vector3};

/// Check if a polygon is strictly convex (all cross products have same sign)
///
/// Collinear runs count as non-convex so a fan never emits zero-area triangles.
#[inline]
fn is_convex(points: &[Point2<f64>]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }

    let mut sign = 0i8;
    for i in 0..n {
        let p0 = &points[i];
        let p1 = &points[(i + 1) % n];
        let p2 = &points[(i + 2) % n];

        let cross = (p1.x - p0.x) * (p2.y - p1.y) - (p1.y - p0.y) * (p2.x - p1.x);
        if cross.abs() <= 1e-12 {
            return false;
        }
        let current = if cross > 0.0 { 1i8 } else { -1i8 };
        if sign == 0 {
            sign = current;
        } else if sign != current {
            return false;
        }
    }

    true
}

/// Fan triangulation for convex polygons
#[inline]
fn fan_triangulate(n: usize) -> Vec<[usize; 3]> {
    (1..n - 1).map(|i| [0, i, i + 1]).collect()
}

/// Triangulate a polygon with optional holes
///
/// Returns triangles as index triples into the concatenation of `outer`
/// followed by every hole, in order. Holes must already have three or more
/// points; callers filter them so that node numbering stays in sync.
pub fn triangulate(outer: &[Point2<f64>], holes: &[Vec<Point2<f64>>]) -> Result<Vec<[usize; 3]>> {
    let n = outer.len();
    if n < 3 {
        return Err(Error::triangulation(
            "Need at least 3 points in outer boundary",
        ));
    }
    if let Some(hole) = holes.iter().find(|h| h.len() < 3) {
        return Err(Error::triangulation(format!(
            "Hole with {} points",
            hole.len()
        )));
    }

    if holes.is_empty() {
        // FAST PATH: Triangle
        if n == 3 {
            return Ok(vec![[0, 1, 2]]);
        }
        // FAST PATH: Small convex polygon
        if n <= 8 && is_convex(outer) {
            return Ok(fan_triangulate(n));
        }
    }

    let total = n + holes.iter().map(Vec::len).sum::<usize>();
    let mut vertices = Vec::with_capacity(total * 2);
    for p in outer {
        vertices.push(p.x);
        vertices.push(p.y);
    }

    let mut hole_indices = Vec::with_capacity(holes.len());
    for hole in holes {
        hole_indices.push(vertices.len() / 2);
        for p in hole {
            vertices.push(p.x);
            vertices.push(p.y);
        }
    }

    let indices = earcutr::earcut(&vertices, &hole_indices, 2)
        .map_err(|e| Error::triangulation(format!("{:?}", e)))?;

    Ok(indices
        .chunks_exact(3)
        .map(|c| [c[0], c[1], c[2]])
        .collect())
}

/// Orthonormal in-plane axes `(u, v)` with `u × v == normal`
///
/// Counter-clockwise polygons in `(u, v)` therefore face along `normal`.
pub fn plane_basis(normal: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let abs_x = normal.x.abs();
    let abs_y = normal.y.abs();
    let abs_z = normal.z.abs();

    // Pick the axis least aligned with the normal
    let reference = if abs_x <= abs_y && abs_x <= abs_z {
        Vector3::x()
    } else if abs_y <= abs_z {
        Vector3::y()
    } else {
        Vector3::z()
    };

    let u_axis = normal.cross(&reference).normalize();
    let v_axis = normal.cross(&u_axis).normalize();
    (u_axis, v_axis)
}

/// Project 3D points onto the plane through `origin` spanned by `u_axis` and `v_axis`
#[inline]
pub fn project_to_2d(
    points: &[Point3<f64>],
    origin: &Point3<f64>,
    u_axis: &Vector3<f64>,
    v_axis: &Vector3<f64>,
) -> Vec<Point2<f64>> {
    points
        .iter()
        .map(|p| {
            let d = p - origin;
            Point2::new(d.dot(u_axis), d.dot(v_axis))
        })
        .collect()
}

/// Vector area of a closed polygon (Newell's method)
///
/// Its direction is the polygon normal and its length the enclosed area.
pub fn area_vector(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    let mut sum = Vector3::<f64>::zeros();
    for i in 0..n {
        let current = &points[i];
        let next = &points[(i + 1) % n];

        sum.x += (current.y - next.y) * (current.z + next.z);
        sum.y += (current.z - next.z) * (current.x + next.x);
        sum.z += (current.x - next.x) * (current.y + next.y);
    }
    sum * 0.5
}

/// Unit normal of a polygon, `None` when it encloses no area
pub fn polygon_normal(points: &[Point3<f64>]) -> Option<Vector3<f64>> {
    if points.len() < 3 {
        return None;
    }
    let area = area_vector(points);
    let len = area.norm();
    (len > MIN_POLYGON_AREA).then(|| area / len)
}

/// Signed area of a 2D polygon, positive when counter-clockwise
pub fn signed_area(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    let mut sum = 0.0;
    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        sum += a.x * b.y - b.x * a.y;
    }
    sum * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square() -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn test_triangulate_square() {
        let tris = triangulate(&square(), &[]).unwrap();
        assert_eq!(tris.len(), 2);
    }

    #[test]
    fn test_triangulate_concave_quad() {
        // Arrow head: vertex 2 is reflex, a naive fan from vertex 0 would fold over
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(0.5, 1.0),
            Point2::new(0.0, 2.0),
        ];
        let tris = triangulate(&points, &[]).unwrap();
        assert_eq!(tris.len(), 2);

        let total: f64 = tris
            .iter()
            .map(|t| signed_area(&[points[t[0]], points[t[1]], points[t[2]]]).abs())
            .sum();
        assert_relative_eq!(total, signed_area(&points).abs(), epsilon = 1e-9);
    }

    #[test]
    fn test_triangulate_with_hole_indexes_hole_nodes() {
        let outer = vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 4.0),
            Point2::new(0.0, 4.0),
        ];
        let hole = vec![
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 3.0),
            Point2::new(3.0, 3.0),
            Point2::new(3.0, 1.0),
        ];
        let tris = triangulate(&outer, &[hole]).unwrap();

        assert_eq!(tris.len(), 8);
        assert!(tris.iter().flatten().any(|&i| i >= 4));
        assert!(tris.iter().flatten().all(|&i| i < 8));
    }

    #[test]
    fn test_triangulate_rejects_short_input() {
        assert!(triangulate(&square()[..2], &[]).is_err());
        assert!(triangulate(&square(), &[vec![Point2::new(0.5, 0.5)]]).is_err());
    }

    #[test]
    fn test_plane_basis_is_right_handed() {
        for normal in [Vector3::z(), -Vector3::x(), Vector3::new(1.0, 2.0, 3.0).normalize()] {
            let (u, v) = plane_basis(&normal);
            assert_relative_eq!(u.cross(&v), normal, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_polygon_normal_and_area() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ];
        assert_relative_eq!(area_vector(&points), Vector3::new(0.0, 0.0, 4.0));
        assert_eq!(polygon_normal(&points), Some(Vector3::z()));

        let collinear = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        assert_eq!(polygon_normal(&collinear), None);
    }

    #[test]
    fn test_signed_area_orientation() {
        let mut points = square();
        assert_relative_eq!(signed_area(&points), 1.0);
        points.reverse();
        assert_relative_eq!(signed_area(&points), -1.0);
    }
}
