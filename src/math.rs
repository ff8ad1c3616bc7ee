// Copyright 2026 the PGF developers. This file is part of PGF.
//
// PGF is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// PGF is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with PGF. If not, see <http://www.gnu.org/licenses/>.

use cgmath::{EuclideanSpace, InnerSpace, Matrix3, Matrix4, Point3, Rad, Vector3, Zero};

/// Threshold below which a geometric quantity is treated as degenerate.
pub const GRAVITY_EPSILON: f32 = 0.001;

/// Threshold for treating a vector as exactly zero.
pub const VEC_EPSILON: f32 = 0.000001;

#[inline(always)]
pub fn clamp(n: f32, min: f32, max: f32) -> f32 {
    if n < min {
        min
    } else if n > max {
        max
    } else {
        n
    }
}

#[inline(always)]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline(always)]
pub fn is_near_zero(v: f32, eps: f32) -> bool {
    v.abs() < eps
}

#[inline(always)]
pub fn is_near_zero_vec3(v: Vector3<f32>, eps: f32) -> bool {
    v.x.abs() < eps && v.y.abs() < eps && v.z.abs() < eps
}

/// Normalizes a vector, returning the zero vector instead of NaN when the
/// input has no length.
pub fn normalize_or_zero(v: Vector3<f32>) -> Vector3<f32> {
    let m2 = v.magnitude2();
    if m2 > 0.0 {
        v / m2.sqrt()
    } else {
        Vector3::zero()
    }
}

/// Removes the component of `v` along the unit vector `axis`. Returns the
/// orthogonalized vector and the removed signed magnitude.
pub fn vec_kill_element(v: Vector3<f32>, axis: Vector3<f32>) -> (Vector3<f32>, f32) {
    let d = v.dot(axis);
    (v - axis * d, d)
}

/// Closest point to `p` on the segment from `a` to `b`. A degenerate segment
/// collapses to `a`.
pub fn perpendic_foot_to_line_inside(p: Point3<f32>, a: Point3<f32>, b: Point3<f32>) -> Point3<f32> {
    let ab = b - a;
    let denom = ab.magnitude2();
    if denom <= 0.0 {
        return a;
    }
    let t = clamp((p - a).dot(ab) / denom, 0.0, 1.0);
    a + ab * t
}

/// Produces a unit vector perpendicular to `front`, preferring the world Z
/// axis and falling back to X when they are parallel.
pub fn make_axis_vertical_zx(front: Vector3<f32>) -> Vector3<f32> {
    let (v, _) = vec_kill_element(Vector3::unit_z(), front);
    let v = if is_near_zero_vec3(v, GRAVITY_EPSILON) {
        vec_kill_element(Vector3::unit_x(), front).0
    } else {
        v
    };
    normalize_or_zero(v)
}

/// Rotates `v` by `angle` about the unit vector `axis`. A degenerate axis
/// leaves the vector unchanged.
pub fn rotate_about_axis(v: Vector3<f32>, axis: Vector3<f32>, angle: f32) -> Vector3<f32> {
    let axis = normalize_or_zero(axis);
    if is_near_zero_vec3(axis, VEC_EPSILON) {
        v
    } else {
        Matrix3::from_axis_angle(axis, Rad(angle)) * v
    }
}

pub fn matrix_axis_x(m: &Matrix4<f32>) -> Vector3<f32> {
    m.x.truncate()
}

pub fn matrix_axis_y(m: &Matrix4<f32>) -> Vector3<f32> {
    m.y.truncate()
}

pub fn matrix_axis_z(m: &Matrix4<f32>) -> Vector3<f32> {
    m.z.truncate()
}

pub fn matrix_translation(m: &Matrix4<f32>) -> Point3<f32> {
    Point3::from_vec(m.w.truncate())
}

pub fn set_matrix_translation(m: &mut Matrix4<f32>, p: Point3<f32>) {
    m.w = p.to_vec().extend(1.0);
}

/// Scales the three axis columns of a model matrix componentwise.
pub fn scale_matrix_axes(m: &mut Matrix4<f32>, s: Vector3<f32>) {
    m.x *= s.x;
    m.y *= s.y;
    m.z *= s.z;
}

/// Builds a model matrix from scale, Euler rotation (radians, applied in
/// X then Y then Z order) and translation.
pub fn model_matrix_srt(
    scale: Vector3<f32>,
    rotation: Vector3<f32>,
    translation: Point3<f32>,
) -> Matrix4<f32> {
    let r = Matrix3::from_angle_z(Rad(rotation.z))
        * Matrix3::from_angle_y(Rad(rotation.y))
        * Matrix3::from_angle_x(Rad(rotation.x));
    Matrix4::from_cols(
        (r.x * scale.x).extend(0.0),
        (r.y * scale.y).extend(0.0),
        (r.z * scale.z).extend(0.0),
        translation.to_vec().extend(1.0),
    )
}

pub fn model_matrix_tr(translation: Point3<f32>, rotation: Vector3<f32>) -> Matrix4<f32> {
    model_matrix_srt(Vector3::new(1.0, 1.0, 1.0), rotation, translation)
}

pub fn model_matrix_r(rotation: Vector3<f32>) -> Matrix4<f32> {
    model_matrix_srt(Vector3::new(1.0, 1.0, 1.0), rotation, Point3::origin())
}

#[cfg(test)]
mod tests {
    mod math {
        use approx::assert_relative_eq;
        use cgmath::{InnerSpace, Point3, Vector3, Zero};

        use crate::math::*;

        #[test]
        fn test_normalize_or_zero() {
            assert_eq!(normalize_or_zero(Vector3::zero()), Vector3::zero());
            let v = normalize_or_zero(Vector3::new(0.0, 3.0, 4.0));
            assert_relative_eq!(v, Vector3::new(0.0, 0.6, 0.8), epsilon = 1e-6);
        }

        #[test]
        fn test_vec_kill_element() {
            let (v, d) = vec_kill_element(Vector3::new(3.0, 5.0, 0.0), Vector3::unit_y());
            assert_eq!(v, Vector3::new(3.0, 0.0, 0.0));
            assert_eq!(d, 5.0);
        }

        #[test]
        fn test_perpendic_foot_clamps_to_segment() {
            let a = Point3::new(0.0, 0.0, 0.0);
            let b = Point3::new(10.0, 0.0, 0.0);
            let mid = perpendic_foot_to_line_inside(Point3::new(4.0, 7.0, 0.0), a, b);
            assert_eq!(mid, Point3::new(4.0, 0.0, 0.0));
            let past = perpendic_foot_to_line_inside(Point3::new(25.0, 7.0, 0.0), a, b);
            assert_eq!(past, b);
            let before = perpendic_foot_to_line_inside(Point3::new(-5.0, 7.0, 0.0), a, b);
            assert_eq!(before, a);
            // Degenerate segment collapses to its start.
            assert_eq!(
                perpendic_foot_to_line_inside(Point3::new(1.0, 2.0, 3.0), a, a),
                a
            );
        }

        #[test]
        fn test_make_axis_vertical_zx() {
            let v = make_axis_vertical_zx(Vector3::unit_y());
            assert_relative_eq!(v, Vector3::unit_z(), epsilon = 1e-6);
            // Z is parallel to the input, so the fallback X branch is taken.
            let v = make_axis_vertical_zx(Vector3::unit_z());
            assert_relative_eq!(v, Vector3::unit_x(), epsilon = 1e-6);
            assert!(v.dot(Vector3::unit_z()).abs() < 1e-6);
        }

        #[test]
        fn test_model_matrix_axes() {
            use std::f32::consts::FRAC_PI_2;
            let m = model_matrix_r(Vector3::new(FRAC_PI_2, 0.0, 0.0));
            // Rotating a quarter turn about X maps Y onto Z.
            assert_relative_eq!(matrix_axis_y(&m), Vector3::unit_z(), epsilon = 1e-6);
            let m = model_matrix_srt(
                Vector3::new(2.0, 3.0, 4.0),
                Vector3::zero(),
                Point3::new(5.0, 6.0, 7.0),
            );
            assert_relative_eq!(matrix_axis_x(&m), Vector3::new(2.0, 0.0, 0.0), epsilon = 1e-6);
            assert_relative_eq!(matrix_axis_y(&m), Vector3::new(0.0, 3.0, 0.0), epsilon = 1e-6);
            assert_relative_eq!(matrix_axis_z(&m), Vector3::new(0.0, 0.0, 4.0), epsilon = 1e-6);
            assert_eq!(matrix_translation(&m), Point3::new(5.0, 6.0, 7.0));
        }

        #[test]
        fn test_rotate_about_axis() {
            use std::f32::consts::FRAC_PI_2;
            let v = rotate_about_axis(Vector3::unit_x(), Vector3::unit_y(), FRAC_PI_2);
            assert_relative_eq!(v, -Vector3::unit_z(), epsilon = 1e-6);
            // Degenerate axis leaves the input untouched.
            let v = rotate_about_axis(Vector3::unit_x(), Vector3::zero(), FRAC_PI_2);
            assert_eq!(v, Vector3::unit_x());
        }
    }
}
