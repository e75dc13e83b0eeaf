//! 3×3 row-major rotation helpers
//!
//! Rotations produced by the Kabsch fit are stored row-major as
//! `m[row][col]`, so `m · v` reads the way it is written on paper.

use lin_alg::f64::Vec3;

/// Row-major 3×3 matrix.
pub type Mat3 = [[f64; 3]; 3];

/// The 3×3 identity.
pub const IDENTITY_3X3: Mat3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Transform a Vec3 by a 3×3 row-major matrix
pub fn transform_3x3(m: &Mat3, v: Vec3) -> Vec3 {
    Vec3::new(
        m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
        m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
        m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
    )
}

/// Left-multiply: result = left · right
pub fn multiply_3x3(left: &Mat3, right: &Mat3) -> Mat3 {
    let mut out = [[0.0f64; 3]; 3];
    for (row, out_row) in out.iter_mut().enumerate() {
        for (col, cell) in out_row.iter_mut().enumerate() {
            *cell = (0..3).map(|k| left[row][k] * right[k][col]).sum();
        }
    }
    out
}

pub fn transpose_3x3(m: &Mat3) -> Mat3 {
    [
        [m[0][0], m[1][0], m[2][0]],
        [m[0][1], m[1][1], m[2][1]],
        [m[0][2], m[1][2], m[2][2]],
    ]
}

pub fn determinant_3x3(m: &Mat3) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// Check if a 3×3 matrix is the identity within `tol`
pub fn is_identity_3x3(m: &Mat3, tol: f64) -> bool {
    m.iter()
        .flatten()
        .zip(IDENTITY_3X3.iter().flatten())
        .all(|(a, b)| (a - b).abs() < tol)
}
