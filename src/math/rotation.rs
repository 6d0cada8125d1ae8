//! Quaternion and small linear algebra helpers.
//!
//! Quaternions are stored as `Vector4` in scalar-first order `(w, x, y, z)`,
//! unlike `nalgebra::Quaternion` which keeps the scalar last.

use nalgebra::{Matrix3, Vector3, Vector4, matrix};

use crate::error::Error;

/// Rotation matrix (body -> world) of the quaternion `(w, x, y, z)`.
///
/// The quaternion is assumed to be unit norm.
pub fn quat_to_rotation_matrix(w: f64, x: f64, y: f64, z: f64) -> Matrix3<f64> {
    let xx = x * x;
    let yy = y * y;
    let zz = z * z;
    let xy = x * y;
    let xz = x * z;
    let yz = y * z;
    let wx = w * x;
    let wy = w * y;
    let wz = w * z;

    matrix![
        1.0 - 2.0 * (yy + zz), 2.0 * (xy - wz), 2.0 * (xz + wy);
        2.0 * (xy + wz), 1.0 - 2.0 * (xx + zz), 2.0 * (yz - wx);
        2.0 * (xz - wy), 2.0 * (yz + wx), 1.0 - 2.0 * (xx + yy)
    ]
}

pub fn quat_vec_to_rotation_matrix(q: &Vector4<f64>) -> Matrix3<f64> {
    quat_to_rotation_matrix(q[0], q[1], q[2], q[3])
}

/// Divides each component by the euclidean norm.
///
/// A zero quaternion yields NaNs; use [`try_normalize_quaternion`] on
/// untrusted input.
pub fn normalize_quaternion(q: &Vector4<f64>) -> Vector4<f64> {
    q / q.norm()
}

pub fn try_normalize_quaternion(q: &Vector4<f64>) -> Result<Vector4<f64>, Error> {
    let norm = q.norm();
    if !norm.is_finite() || norm == 0.0 {
        return Err(Error::DegenerateQuaternion { norm });
    }

    Ok(normalize_quaternion(q))
}

pub fn cross(a: &Vector3<f64>, b: &Vector3<f64>) -> Vector3<f64> {
    a.cross(b)
}

pub fn mat_vec_mul(m: &Matrix3<f64>, v: &Vector3<f64>) -> Vector3<f64> {
    m * v
}
