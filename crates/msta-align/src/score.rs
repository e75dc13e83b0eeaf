//! Reference-based alignment scores
//!
//! Both scores compare every non-reference structure with the reference
//! structure after mapping all structures through their transformations.
//! A missing transformation set means all identity.
//!
//! - [`ref_rmsd`]: root of the mean over columns of the per-column mean
//!   squared deviation from the reference.
//! - [`ref_tm_score`]: TM-score of each structure against the reference,
//!   normalized by the reference's full length and averaged over structures.

use lin_alg::f64::Vec3;

use crate::alignment::MultipleAlignment;
use crate::error::{MstaError, Result};
use crate::superimpose::check_reference;
use crate::transform::{Transformation, TransformationSet};

pub const TM_D0_SCALE: f64 = 1.24;
pub const TM_D0_LENGTH_OFFSET: f64 = 15.0;
pub const TM_D0_SHIFT: f64 = 1.8;
/// Floor for d0 on short chains
pub const TM_D0_MIN: f64 = 0.5;

/// Both reference scores of one alignment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefScores {
    pub rmsd: f64,
    pub tm_score: f64,
}

/// TM-score distance scale for a chain of `length` residues:
/// `1.24 · ∛(L − 15) − 1.8`, never below 0.5.
pub fn tm_d0(length: usize) -> f64 {
    let excess = length as f64 - TM_D0_LENGTH_OFFSET;
    if excess <= 0.0 {
        return TM_D0_MIN;
    }
    (TM_D0_SCALE * excess.cbrt() - TM_D0_SHIFT).max(TM_D0_MIN)
}

/// Column-ordered coordinates of every structure in the shared frame,
/// `None` at gaps. Indexed `[structure][column]`.
pub fn transformed_columns(
    alignment: &MultipleAlignment<'_>,
    transforms: Option<&TransformationSet>,
) -> Result<Vec<Vec<Option<Vec3>>>> {
    let structures = alignment.structure_count();
    if let Some(set) = transforms {
        if set.len() != structures {
            return Err(MstaError::StructureCountMismatch {
                expected: structures,
                actual: set.len(),
            });
        }
    }

    let identity = Transformation::identity();
    Ok(alignment
        .ensemble()
        .structures()
        .iter()
        .enumerate()
        .map(|(s, structure)| {
            let t = transforms.and_then(|set| set.get(s)).unwrap_or(&identity);
            alignment
                .column_entries(s)
                .map(|entry| entry.and_then(|r| structure.coord(r)).map(|p| t.apply(p)))
                .collect::<Vec<_>>()
        })
        .collect())
}

fn dist_sq(a: &Vec3, b: &Vec3) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    dx * dx + dy * dy + dz * dz
}

/// RMSD of all structures to the reference structure.
///
/// For each column where the reference and at least one other structure are
/// present, the squared deviations of the present structures are averaged;
/// the result is the root of the mean of those column averages. Columns where
/// the reference is a gap, or where every other structure is, do not count.
pub fn ref_rmsd(
    alignment: &MultipleAlignment<'_>,
    transforms: Option<&TransformationSet>,
    reference: usize,
) -> Result<f64> {
    check_reference(alignment.structure_count(), reference)?;
    let columns = transformed_columns(alignment, transforms)?;

    let mut sum_sq = 0.0;
    let mut n_columns = 0usize;
    for (c, ref_atom) in columns[reference].iter().enumerate() {
        let Some(ref_atom) = ref_atom else {
            continue;
        };
        let (col_sq, present) = columns
            .iter()
            .enumerate()
            .filter(|&(s, _)| s != reference)
            .filter_map(|(_, col)| col[c].as_ref())
            .fold((0.0, 0usize), |(sq, k), atom| (sq + dist_sq(atom, ref_atom), k + 1));
        if present > 0 {
            sum_sq += col_sq / present as f64;
            n_columns += 1;
        }
    }

    if n_columns == 0 {
        return Err(MstaError::NoOverlap { reference });
    }
    let rmsd = (sum_sq / n_columns as f64).sqrt();
    log::debug!(
        "Reference RMSD to structure {}: {:.6} over {} columns",
        reference,
        rmsd,
        n_columns
    );
    Ok(rmsd)
}

/// TM-score of all structures to the reference structure.
///
/// `d0` and the normalization use the reference's full residue count, not
/// the number of aligned columns. A structure sharing no column with the
/// reference contributes zero.
pub fn ref_tm_score(
    alignment: &MultipleAlignment<'_>,
    transforms: Option<&TransformationSet>,
    reference: usize,
) -> Result<f64> {
    let structures = alignment.structure_count();
    check_reference(structures, reference)?;
    let columns = transformed_columns(alignment, transforms)?;

    let length = alignment.ensemble().structures()[reference].len();
    let d0 = tm_d0(length);
    let d0_sq = d0 * d0;

    let mut total = 0.0;
    let mut overlap = 0usize;
    for (s, col) in columns.iter().enumerate() {
        if s == reference {
            continue;
        }
        let mut sub = 0.0;
        for (atom, ref_atom) in col.iter().zip(columns[reference].iter()) {
            if let (Some(atom), Some(ref_atom)) = (atom, ref_atom) {
                sub += 1.0 / (1.0 + dist_sq(atom, ref_atom) / d0_sq);
                overlap += 1;
            }
        }
        if length > 0 {
            total += sub / length as f64;
        }
    }

    if overlap == 0 {
        return Err(MstaError::NoOverlap { reference });
    }
    let tm_score = total / (structures - 1) as f64;
    log::debug!(
        "Reference TM-score to structure {} (L = {}, d0 = {:.4}): {:.6}",
        reference,
        length,
        d0,
        tm_score
    );
    Ok(tm_score)
}

/// Reference RMSD and TM-score in one call
pub fn reference_scores(
    alignment: &MultipleAlignment<'_>,
    transforms: Option<&TransformationSet>,
    reference: usize,
) -> Result<RefScores> {
    Ok(RefScores {
        rmsd: ref_rmsd(alignment, transforms, reference)?,
        tm_score: ref_tm_score(alignment, transforms, reference)?,
    })
}
