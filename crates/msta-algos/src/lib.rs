//! Geometric kernels for multiple structure alignment
//!
//! - Analytical 3×3 SVD decomposition
//! - Kabsch algorithm for optimal proper rigid-body superposition
//! - Row-major 3×3 rotation helpers

pub mod kabsch;
pub mod linalg;

pub use kabsch::{kabsch, KabschResult};
pub use linalg::{Mat3, Svd3};

/// Errors from fitting algorithms
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FitError {
    #[error("Coordinate arrays have different lengths: {0} vs {1}")]
    LengthMismatch(usize, usize),

    #[error("Not enough atoms for superposition (need at least 3, got {0})")]
    TooFewAtoms(usize),
}
