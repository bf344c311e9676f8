// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Small geometric helpers shared by the readers

use nalgebra::{
    Affine3, Isometry3, Matrix3, Matrix4, Point3, Rotation3, Translation3, UnitQuaternion, Vector3,
};

/// Build a point from up to three coordinates, padding with zeros
pub fn to_point(coords: &[f64]) -> Point3<f64> {
    let c = |i: usize| coords.get(i).copied().unwrap_or(0.0);
    Point3::new(c(0), c(1), c(2))
}

/// Project `ref_dir` onto the plane normal to `axis`
///
/// Picks an arbitrary perpendicular when the two are parallel.
pub fn orthogonal_ref(axis: &Vector3<f64>, ref_dir: &Vector3<f64>) -> Vector3<f64> {
    (ref_dir - axis * axis.dot(ref_dir))
        .try_normalize(1e-9)
        .unwrap_or_else(|| {
            let helper = if axis.x.abs() < 0.9 {
                Vector3::x()
            } else {
                Vector3::y()
            };
            axis.cross(&helper).normalize()
        })
}

/// Affine transform from a 3x4 row-major matrix `[R | T]`
pub fn affine_from_rows(values: &[f64; 12]) -> Affine3<f64> {
    #[rustfmt::skip]
    let m = Matrix4::new(
        values[0], values[1], values[2],  values[3],
        values[4], values[5], values[6],  values[7],
        values[8], values[9], values[10], values[11],
        0.0,       0.0,       0.0,        1.0,
    );
    Affine3::from_matrix_unchecked(m)
}

/// Closest rigid motion to an affine transform
///
/// Scaling and shear are dropped; face locations only carry rotation and
/// translation.
pub fn to_isometry(transform: &Affine3<f64>) -> Isometry3<f64> {
    let m = transform.matrix();
    let linear: Matrix3<f64> = m.fixed_view::<3, 3>(0, 0).into_owned();
    let translation = Vector3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)]);
    let rotation = Rotation3::from_matrix(&linear);
    Isometry3::from_parts(
        Translation3::from(translation),
        UnitQuaternion::from_rotation_matrix(&rotation),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_orthogonal_ref() {
        let r = orthogonal_ref(&Vector3::z(), &Vector3::new(1.0, 0.0, 1.0));
        assert_relative_eq!(r, Vector3::x(), epsilon = 1e-12);

        let parallel = orthogonal_ref(&Vector3::z(), &Vector3::z());
        assert_relative_eq!(parallel.dot(&Vector3::z()), 0.0, epsilon = 1e-12);
        assert_relative_eq!(parallel.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_affine_rows_and_isometry() {
        // 90 degrees about Z, then translate by (1, 2, 3)
        let t = affine_from_rows(&[
            0.0, -1.0, 0.0, 1.0, //
            1.0, 0.0, 0.0, 2.0, //
            0.0, 0.0, 1.0, 3.0,
        ]);
        let p = t.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(1.0, 3.0, 3.0), epsilon = 1e-12);

        let iso = to_isometry(&t);
        assert_relative_eq!(
            iso.transform_point(&Point3::new(1.0, 0.0, 0.0)),
            Point3::new(1.0, 3.0, 3.0),
            epsilon = 1e-9
        );
    }
}
