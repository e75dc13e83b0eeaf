//! Analytical 3×3 SVD decomposition
//!
//! Computes A = U · diag(S) · Vᵀ for a 3×3 matrix from the symmetric
//! eigendecomposition of AᵀA (cyclic Jacobi).
//!
//! Forming AᵀA squares the condition number, so a singular value that is
//! zero in exact arithmetic comes back as roughly `sqrt(eps) · σ₀`. Rank is
//! therefore decided relative to the largest singular value, and U is always
//! built as an orthonormal frame: u₀ from A·v₀, u₁ from A·v₁ made orthogonal
//! to u₀, u₂ = u₀ × u₁. Only at full rank does u₂ take the sign of A·v₂, so
//! det(U)·det(V) still carries sign(det A).
//!
//! All matrices use column-major layout: `m[col][row]`.

/// Singular values at or below `RANK_TOL · σ₀` count as zero.
pub const RANK_TOL: f64 = 1e-6;

const MAX_SWEEPS: usize = 64;

/// Result of 3×3 SVD decomposition: A = U · diag(S) · Vᵀ
#[derive(Debug, Clone)]
pub struct Svd3 {
    /// Left singular vectors (column-major: u[col][row]), orthonormal
    pub u: [[f64; 3]; 3],
    /// Singular values (sorted descending, zero past the numerical rank)
    pub s: [f64; 3],
    /// Right singular vectors transposed (column-major: vt[col][row]), det +1
    pub vt: [[f64; 3]; 3],
    rank: usize,
}

impl Svd3 {
    /// Numerical rank of the decomposed matrix
    pub fn rank(&self) -> usize {
        self.rank
    }
}

/// Compute SVD of a 3×3 matrix (column-major: matrix[col][row])
pub fn svd3(a: &[[f64; 3]; 3]) -> Svd3 {
    let (eigenvalues, v_cols) = symmetric_eigen(&gram(a));

    let mut s = eigenvalues.map(|l| l.max(0.0).sqrt());
    let rank = if s[0] > 0.0 {
        s.iter().filter(|&&si| si > RANK_TOL * s[0]).count()
    } else {
        0
    };
    for si in s.iter_mut().skip(rank) {
        *si = 0.0;
    }

    let av = v_cols.map(|v| mat_vec_mul(a, &v));

    let u0 = match rank {
        0 => [1.0, 0.0, 0.0],
        _ => normalized(av[0]).unwrap_or([1.0, 0.0, 0.0]),
    };
    let u1 = if rank >= 2 {
        let d = dot(&av[1], &u0);
        normalized([av[1][0] - d * u0[0], av[1][1] - d * u0[1], av[1][2] - d * u0[2]])
            .unwrap_or_else(|| arbitrary_perpendicular(&u0))
    } else {
        arbitrary_perpendicular(&u0)
    };
    let mut u2 = cross(&u0, &u1);
    if rank == 3 && dot(&av[2], &u2) < 0.0 {
        u2 = [-u2[0], -u2[1], -u2[2]];
    }

    // Vᵀ: vt[col][row] = V[row][col] = v_cols[row][col]
    let vt = [
        [v_cols[0][0], v_cols[1][0], v_cols[2][0]],
        [v_cols[0][1], v_cols[1][1], v_cols[2][1]],
        [v_cols[0][2], v_cols[1][2], v_cols[2][2]],
    ];

    Svd3 {
        u: [u0, u1, u2],
        s,
        vt,
        rank,
    }
}

/// Determinant of a column-major 3×3 matrix.
pub fn det_col_major(m: &[[f64; 3]; 3]) -> f64 {
    dot(&m[0], &cross(&m[1], &m[2]))
}

/// AᵀA for column-major A: entry (i, j) is dot(col_i, col_j).
fn gram(a: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let mut g = [[0.0f64; 3]; 3];
    for i in 0..3 {
        for j in i..3 {
            g[i][j] = dot(&a[i], &a[j]);
            g[j][i] = g[i][j];
        }
    }
    g
}

/// Eigenpairs of a symmetric 3×3 matrix, eigenvalues descending.
///
/// Eigenvectors are returned as columns of a right-handed orthonormal frame.
fn symmetric_eigen(m: &[[f64; 3]; 3]) -> ([f64; 3], [[f64; 3]; 3]) {
    let mut a = *m;
    // v[row][col], columns are eigenvectors
    let mut v = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

    let scale: f64 = a.iter().flatten().map(|x| x * x).sum();
    if scale > 0.0 {
        let threshold = f64::EPSILON * f64::EPSILON * scale;
        for _ in 0..MAX_SWEEPS {
            let off = a[0][1] * a[0][1] + a[0][2] * a[0][2] + a[1][2] * a[1][2];
            if off <= threshold {
                break;
            }
            for (p, q) in [(0, 1), (0, 2), (1, 2)] {
                schur_rotate(&mut a, &mut v, p, q);
            }
        }
    }

    let mut order = [0usize, 1, 2];
    order.sort_by(|&i, &j| a[j][j].total_cmp(&a[i][i]));

    let eigenvalues = order.map(|i| a[i][i]);
    let mut cols = order.map(|i| [v[0][i], v[1][i], v[2][i]]);
    if det_col_major(&cols) < 0.0 {
        cols[2] = cols[2].map(|x| -x);
    }
    (eigenvalues, cols)
}

/// One symmetric Schur rotation A ← JᵀAJ zeroing a[p][q]; V ← VJ.
fn schur_rotate(a: &mut [[f64; 3]; 3], v: &mut [[f64; 3]; 3], p: usize, q: usize) {
    let apq = a[p][q];
    if apq == 0.0 {
        return;
    }
    let tau = (a[q][q] - a[p][p]) / (2.0 * apq);
    let t = tau.signum() / (tau.abs() + (1.0 + tau * tau).sqrt());
    let c = 1.0 / (1.0 + t * t).sqrt();
    let s = t * c;

    for row in a.iter_mut() {
        let (kp, kq) = (row[p], row[q]);
        row[p] = c * kp - s * kq;
        row[q] = s * kp + c * kq;
    }
    for k in 0..3 {
        let (pk, qk) = (a[p][k], a[q][k]);
        a[p][k] = c * pk - s * qk;
        a[q][k] = s * pk + c * qk;
    }
    a[p][q] = 0.0;
    a[q][p] = 0.0;

    for row in v.iter_mut() {
        let (kp, kq) = (row[p], row[q]);
        row[p] = c * kp - s * kq;
        row[q] = s * kp + c * kq;
    }
}

fn mat_vec_mul(a: &[[f64; 3]; 3], v: &[f64; 3]) -> [f64; 3] {
    [
        a[0][0] * v[0] + a[1][0] * v[1] + a[2][0] * v[2],
        a[0][1] * v[0] + a[1][1] * v[1] + a[2][1] * v[2],
        a[0][2] * v[0] + a[1][2] * v[1] + a[2][2] * v[2],
    ]
}

fn cross(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn normalized(v: [f64; 3]) -> Option<[f64; 3]> {
    let len = dot(&v, &v).sqrt();
    (len > f64::MIN_POSITIVE).then(|| v.map(|x| x / len))
}

/// Unit vector perpendicular to unit `v`, built against its smallest axis.
fn arbitrary_perpendicular(v: &[f64; 3]) -> [f64; 3] {
    let candidate = if v[0].abs() < v[1].abs() && v[0].abs() < v[2].abs() {
        [1.0, 0.0, 0.0]
    } else if v[1].abs() < v[2].abs() {
        [0.0, 1.0, 0.0]
    } else {
        [0.0, 0.0, 1.0]
    };
    normalized(cross(v, &candidate)).unwrap_or([0.0, 1.0, 0.0])
}
