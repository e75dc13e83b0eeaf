//! Kabsch algorithm for optimal rigid-body superposition
//!
//! Given two sets of corresponding 3D points, finds the proper rotation and
//! translation that minimizes RMSD.

use lin_alg::f64::Vec3;

use crate::linalg::mat3::{transform_3x3, Mat3};
use crate::linalg::svd3::{det_col_major, svd3};
use crate::FitError;

/// Result of Kabsch superposition
#[derive(Debug, Clone)]
pub struct KabschResult {
    /// Row-major 3×3 rotation, determinant +1
    pub rotation: Mat3,
    /// Translation vector (applied after rotation)
    pub translation: Vec3,
    /// RMSD after superposition
    pub rmsd: f64,
    /// Number of point pairs used
    pub n_atoms: usize,
    /// Singular values of the cross-covariance matrix, descending
    pub singular_values: [f64; 3],
    /// Numerical rank of the cross-covariance matrix
    pub rank: usize,
    /// Whether the raw solution was a reflection and had to be corrected
    pub reflection_corrected: bool,
}

impl KabschResult {
    /// True when the centered point set spans at most a line, leaving the
    /// rotation about that line undetermined.
    pub fn is_collinear(&self) -> bool {
        self.rank <= 1
    }
}

fn centroid(points: &[Vec3]) -> [f64; 3] {
    let mut c = [0.0f64; 3];
    for p in points {
        c[0] += p.x;
        c[1] += p.y;
        c[2] += p.z;
    }
    let n = points.len() as f64;
    [c[0] / n, c[1] / n, c[2] / n]
}

fn centered(points: &[Vec3], c: &[f64; 3]) -> Vec<[f64; 3]> {
    points
        .iter()
        .map(|p| [p.x - c[0], p.y - c[1], p.z - c[2]])
        .collect()
}

/// Compute optimal superposition of source onto target.
///
/// Returns the transformation that maps source → target.
/// Both slices must have the same length (≥ 3).
pub fn kabsch(source: &[Vec3], target: &[Vec3]) -> Result<KabschResult, FitError> {
    let n = source.len();
    if n != target.len() {
        return Err(FitError::LengthMismatch(n, target.len()));
    }
    if n < 3 {
        return Err(FitError::TooFewAtoms(n));
    }

    let centroid_src = centroid(source);
    let centroid_tgt = centroid(target);
    let centered_src = centered(source, &centroid_src);
    let centered_tgt = centered(target, &centroid_tgt);

    // Cross-covariance H = Pᵀ · Q, column-major: h[col][row] = Σ src[row] · tgt[col]
    let mut h = [[0.0f64; 3]; 3];
    for (p, q) in centered_src.iter().zip(centered_tgt.iter()) {
        for col in 0..3 {
            for row in 0..3 {
                h[col][row] += p[row] * q[col];
            }
        }
    }

    let svd = svd3(&h);

    // R = V · diag(1, 1, d) · Uᵀ, d = sign(det(V) · det(U)).
    // The last singular value is the smallest, so d flips that component.
    let det = det_col_major(&svd.u) * det_col_major(&svd.vt);
    let reflection_corrected = det < 0.0;
    let diag = [1.0, 1.0, if reflection_corrected { -1.0 } else { 1.0 }];

    // V[i][k] = vt[i][k] (column-major Vᵀ), U[j][k] = u[k][j]
    let mut rotation = [[0.0f64; 3]; 3];
    for (i, rot_row) in rotation.iter_mut().enumerate() {
        for (j, cell) in rot_row.iter_mut().enumerate() {
            *cell = (0..3).map(|k| svd.vt[i][k] * diag[k] * svd.u[k][j]).sum();
        }
    }

    // t = centroid_target - R · centroid_source
    let r_cs = transform_3x3(
        &rotation,
        Vec3::new(centroid_src[0], centroid_src[1], centroid_src[2]),
    );
    let translation = Vec3::new(
        centroid_tgt[0] - r_cs.x,
        centroid_tgt[1] - r_cs.y,
        centroid_tgt[2] - r_cs.z,
    );

    let sum_sq: f64 = centered_src
        .iter()
        .zip(centered_tgt.iter())
        .map(|(p, q)| {
            let r = transform_3x3(&rotation, Vec3::new(p[0], p[1], p[2]));
            let dx = r.x - q[0];
            let dy = r.y - q[1];
            let dz = r.z - q[2];
            dx * dx + dy * dy + dz * dz
        })
        .sum();

    Ok(KabschResult {
        rotation,
        translation,
        rmsd: (sum_sq / n as f64).sqrt(),
        n_atoms: n,
        singular_values: svd.s,
        rank: svd.rank(),
        reflection_corrected,
    })
}
