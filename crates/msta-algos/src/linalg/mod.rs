//! Linear algebra utilities
//!
//! - [`svd3`] — Analytical 3×3 SVD decomposition (Jacobi eigenvalue method)
//! - [`mat3`] — 3×3 row-major rotation helpers (multiply, transform, determinant)

pub mod mat3;
pub mod svd3;

pub use mat3::{
    determinant_3x3, is_identity_3x3, multiply_3x3, transform_3x3, transpose_3x3, Mat3,
    IDENTITY_3X3,
};
pub use svd3::{svd3, Svd3, RANK_TOL};
