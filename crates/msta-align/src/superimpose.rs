//! Reference superposition engine
//!
//! Every non-reference structure is fitted independently onto the reference
//! structure with a Kabsch least-squares fit over the columns where both are
//! present. Fits are pairwise against the fixed reference, never joint, so
//! they can run in any order (and in parallel).

use lin_alg::f64::Vec3;
use msta_algos::kabsch;
use rayon::prelude::*;

use crate::alignment::MultipleAlignment;
use crate::error::{MstaError, Result};
use crate::transform::{Transformation, TransformationSet};

/// Minimum number of corresponding residues for a fit
pub const MIN_FIT_PAIRS: usize = 3;

/// Parameters for reference superposition
#[derive(Debug, Clone)]
pub struct SuperimposeParams {
    /// Index of the structure that stays fixed
    pub reference: usize,
    /// Fit structures on the rayon thread pool
    pub parallel: bool,
}

impl Default for SuperimposeParams {
    fn default() -> Self {
        Self {
            reference: 0,
            parallel: true,
        }
    }
}

/// Superimposes every structure of an alignment onto a reference structure
#[derive(Debug, Clone, Default)]
pub struct ReferenceSuperimposer {
    params: SuperimposeParams,
}

impl ReferenceSuperimposer {
    pub fn new(params: SuperimposeParams) -> Self {
        ReferenceSuperimposer { params }
    }

    pub fn with_reference(reference: usize) -> Self {
        Self::new(SuperimposeParams {
            reference,
            ..SuperimposeParams::default()
        })
    }

    pub fn params(&self) -> &SuperimposeParams {
        &self.params
    }

    /// Compute a fresh transformation set for `alignment`.
    ///
    /// The alignment itself is left untouched; recomputing is side-effect free.
    pub fn superimpose(&self, alignment: &MultipleAlignment<'_>) -> Result<TransformationSet> {
        let reference = self.params.reference;
        check_reference(alignment.structure_count(), reference)?;

        let fit = |s: usize| fit_to_reference(alignment, s, reference);
        let transformations = if self.params.parallel {
            (0..alignment.structure_count())
                .into_par_iter()
                .map(fit)
                .collect::<Result<Vec<_>>>()?
        } else {
            (0..alignment.structure_count())
                .map(fit)
                .collect::<Result<Vec<_>>>()?
        };

        TransformationSet::from_transformations(transformations, alignment.structure_count())
    }
}

/// Transformation set placing every structure onto `reference`.
pub fn compute_transformations(
    alignment: &MultipleAlignment<'_>,
    reference: usize,
) -> Result<TransformationSet> {
    ReferenceSuperimposer::with_reference(reference).superimpose(alignment)
}

pub(crate) fn check_reference(structures: usize, reference: usize) -> Result<()> {
    if structures < 2 || reference >= structures {
        return Err(MstaError::InvalidReference {
            reference,
            structures,
        });
    }
    Ok(())
}

/// Fit one structure onto the reference over their shared columns.
fn fit_to_reference(
    alignment: &MultipleAlignment<'_>,
    structure: usize,
    reference: usize,
) -> Result<Transformation> {
    if structure == reference {
        return Ok(Transformation::identity());
    }

    let pairs = alignment.reference_pairs(structure, reference);
    if pairs.len() < MIN_FIT_PAIRS {
        return Err(MstaError::InsufficientCorrespondence {
            structure,
            pairs: pairs.len(),
        });
    }

    let ensemble = alignment.ensemble();
    let mobile = ensemble.structures()[structure].coords();
    let fixed = ensemble.structures()[reference].coords();
    let (source, target): (Vec<Vec3>, Vec<Vec3>) =
        pairs.iter().map(|&(s, r)| (mobile[s], fixed[r])).unzip();

    let fit = kabsch(&source, &target)?;
    if fit.is_collinear() {
        log::warn!(
            "Structure {} overlaps reference {} on a collinear set of {} residues; rotation about that axis is undetermined",
            structure,
            reference,
            fit.n_atoms
        );
    }
    log::debug!(
        "Superimposed structure {} onto {}: {} pairs (rank {}), RMSD {:.4}{}",
        structure,
        reference,
        fit.n_atoms,
        fit.rank,
        fit.rmsd,
        if fit.reflection_corrected { " (reflection corrected)" } else { "" }
    );

    Ok(Transformation::from(&fit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Block;
    use crate::ensemble::{Ensemble, Structure};
    use msta_algos::linalg::{
        determinant_3x3, is_identity_3x3, multiply_3x3, transpose_3x3, Mat3,
    };

    fn helix(n: usize) -> Vec<Vec3> {
        (0..n)
            .map(|i| {
                let t = i as f64 * 100f64.to_radians();
                Vec3::new(2.3 * t.cos(), 2.3 * t.sin(), 1.5 * i as f64)
            })
            .collect()
    }

    fn moved(points: &[Vec3], rotation: Mat3, shift: [f64; 3]) -> Vec<Vec3> {
        let t = Transformation::new(rotation, Vec3::new(shift[0], shift[1], shift[2]));
        points.iter().map(|&p| t.apply(p)).collect()
    }

    fn rot_x(angle: f64) -> Mat3 {
        let (s, c) = angle.sin_cos();
        [[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]]
    }

    fn rot_z(angle: f64) -> Mat3 {
        let (s, c) = angle.sin_cos();
        [[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]]
    }

    fn identity_block(n_structures: usize, n: usize) -> Block {
        Block::from_residues(vec![(0..n).collect::<Vec<_>>(); n_structures]).unwrap()
    }

    fn assert_proper_rotation(t: &Transformation) {
        let rtr = multiply_3x3(&transpose_3x3(&t.rotation), &t.rotation);
        assert!(is_identity_3x3(&rtr, 1e-9), "RᵀR is not the identity: {:?}", rtr);
        let det = determinant_3x3(&t.rotation);
        assert!((det - 1.0).abs() < 1e-9, "det(R) should be +1, got {}", det);
    }

    fn assert_maps_onto(t: &Transformation, from: &[Vec3], onto: &[Vec3], tol: f64) {
        for (p, q) in from.iter().zip(onto.iter()) {
            let m = t.apply(*p);
            assert!(
                (m.x - q.x).abs() < tol && (m.y - q.y).abs() < tol && (m.z - q.z).abs() < tol,
                "{:?} mapped to {:?}, expected {:?}",
                p,
                m,
                q
            );
        }
    }

    #[test]
    fn test_recovers_rigid_motion() {
        let base = helix(12);
        let ensemble = Ensemble::new(vec![
            Structure::new(base.clone()),
            Structure::new(moved(&base, rot_z(0.8), [4.0, -2.0, 7.0])),
            Structure::new(moved(&base, rot_x(-1.9), [-3.0, 0.5, 1.0])),
        ]);
        let msa = MultipleAlignment::new(&ensemble, vec![identity_block(3, 12)]).unwrap();

        let set = compute_transformations(&msa, 0).unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.get(0).unwrap().is_identity());

        for s in 1..3 {
            let t = set.get(s).unwrap();
            assert!((t.determinant() - 1.0).abs() < 1e-9);
            for (p, q) in ensemble.structures()[s].coords().iter().zip(base.iter()) {
                let m = t.apply(*p);
                assert!((m.x - q.x).abs() < 1e-8);
                assert!((m.y - q.y).abs() < 1e-8);
                assert!((m.z - q.z).abs() < 1e-8);
            }
        }
    }

    #[test]
    fn test_mirror_image_gets_proper_rotation() {
        let base = helix(10);
        let mirrored: Vec<Vec3> = base.iter().map(|p| Vec3::new(p.x, p.y, -p.z)).collect();
        let ensemble = Ensemble::new(vec![Structure::new(base), Structure::new(mirrored)]);
        let msa = MultipleAlignment::new(&ensemble, vec![identity_block(2, 10)]).unwrap();

        let set = compute_transformations(&msa, 0).unwrap();
        let det = set.get(1).unwrap().determinant();
        assert!((det - 1.0).abs() < 1e-9, "det(R) should be +1, got {}", det);
    }

    #[test]
    fn test_serial_and_parallel_agree() {
        let base = helix(9);
        let ensemble = Ensemble::new(vec![
            Structure::new(moved(&base, rot_x(0.3), [1.0, 1.0, 1.0])),
            Structure::new(base.clone()),
            Structure::new(moved(&base, rot_z(2.0), [0.0, 5.0, 0.0])),
        ]);
        let msa = MultipleAlignment::new(&ensemble, vec![identity_block(3, 9)]).unwrap();

        let serial = ReferenceSuperimposer::new(SuperimposeParams {
            reference: 1,
            parallel: false,
        })
        .superimpose(&msa)
        .unwrap();
        let parallel = ReferenceSuperimposer::with_reference(1).superimpose(&msa).unwrap();
        assert_eq!(serial, parallel);
        assert!(serial.get(1).unwrap().is_identity());
    }

    #[test]
    fn test_exactly_three_pairs_far_from_origin() {
        let base: Vec<Vec3> = helix(6)
            .iter()
            .map(|p| Vec3::new(p.x + 950.0, p.y - 1730.0, p.z + 2405.0))
            .collect();
        let rotation = multiply_3x3(&rot_z(2.4), &rot_x(-0.7));
        let ensemble = Ensemble::new(vec![
            Structure::new(base.clone()),
            Structure::new(moved(&base, rotation, [-820.0, 415.0, 66.0])),
        ]);
        // only the first three residues are aligned
        let block = Block::new(vec![
            (0..6).map(Some).collect::<Vec<_>>(),
            vec![Some(0), Some(1), Some(2), None, None, None],
        ])
        .unwrap();
        let msa = MultipleAlignment::new(&ensemble, vec![block]).unwrap();

        let set = compute_transformations(&msa, 0).unwrap();
        let t = set.get(1).unwrap();
        assert_proper_rotation(t);
        // unaligned residues follow the same rigid motion
        assert_maps_onto(t, ensemble.structures()[1].coords(), &base, 1e-6);
    }

    #[test]
    fn test_planar_overlap_fits_whole_structure() {
        // four aligned residues on a plane, two more above and below it
        let base = vec![
            Vec3::new(310.0, 42.0, -75.0),
            Vec3::new(313.8, 42.0, -75.0),
            Vec3::new(313.8, 45.8, -75.0),
            Vec3::new(310.0, 45.8, -75.0),
            Vec3::new(311.9, 43.9, -71.2),
            Vec3::new(311.9, 43.9, -78.8),
        ];
        let rotation = multiply_3x3(&rot_x(1.1), &rot_z(-0.4));
        let ensemble = Ensemble::new(vec![
            Structure::new(base.clone()),
            Structure::new(moved(&base, rotation, [12.0, -300.0, 48.5])),
        ]);
        let block = Block::new(vec![
            (0..6).map(Some).collect::<Vec<_>>(),
            vec![Some(0), Some(1), Some(2), Some(3), None, None],
        ])
        .unwrap();
        let msa = MultipleAlignment::new(&ensemble, vec![block]).unwrap();

        let set = compute_transformations(&msa, 0).unwrap();
        let t = set.get(1).unwrap();
        assert_proper_rotation(t);
        assert_maps_onto(t, ensemble.structures()[1].coords(), &base, 1e-6);
    }

    #[test]
    fn test_long_collinear_trace_off_axis() {
        let trace: Vec<Vec3> = (0..400)
            .map(|i| {
                let t = 3.8 * i as f64;
                Vec3::new(-2100.0 + 0.36 * t, 880.0 + 0.48 * t, 1325.0 - 0.8 * t)
            })
            .collect();
        let ensemble = Ensemble::new(vec![
            Structure::new(trace.clone()),
            Structure::new(moved(&trace, rot_z(1.7), [40.0, -15.0, 600.0])),
        ]);
        let msa = MultipleAlignment::new(&ensemble, vec![identity_block(2, 400)]).unwrap();

        let set = compute_transformations(&msa, 0).unwrap();
        let t = set.get(1).unwrap();
        assert_proper_rotation(t);
        assert_maps_onto(t, ensemble.structures()[1].coords(), &trace, 1e-6);
    }

    #[test]
    fn test_fits_are_pairwise_so_gaps_elsewhere_do_not_matter() {
        let base = helix(8);
        let structures = || {
            vec![
                Structure::new(base.clone()),
                Structure::new(moved(&base, rot_z(0.6), [2.0, 1.0, -3.0])),
                Structure::new(moved(&base, rot_x(1.4), [-5.0, 0.0, 2.0])),
            ]
        };
        let dense = Ensemble::new(structures());
        let gapped = Ensemble::new(structures());

        let full = MultipleAlignment::new(&dense, vec![identity_block(3, 8)]).unwrap();
        let holes = MultipleAlignment::new(
            &gapped,
            vec![Block::new(vec![
                (0..8).map(Some).collect::<Vec<_>>(),
                (0..8).map(Some).collect::<Vec<_>>(),
                vec![Some(0), None, Some(2), None, Some(4), Some(5), None, Some(7)],
            ])
            .unwrap()],
        )
        .unwrap();

        let with_full = compute_transformations(&full, 0).unwrap();
        let with_holes = compute_transformations(&holes, 0).unwrap();
        // structure 1 sees the same reference pairs in both alignments
        assert_eq!(with_full.get(1), with_holes.get(1));
    }

    #[test]
    fn test_all_gap_structure_is_insufficient() {
        let base = helix(6);
        let ensemble = Ensemble::new(vec![
            Structure::new(base.clone()),
            Structure::new(base.clone()),
            Structure::new(base),
        ]);
        let block = Block::new(vec![
            (0..6).map(Some).collect::<Vec<_>>(),
            (0..6).map(Some).collect::<Vec<_>>(),
            vec![None; 6],
        ])
        .unwrap();
        let msa = MultipleAlignment::new(&ensemble, vec![block]).unwrap();

        assert_eq!(
            compute_transformations(&msa, 0).unwrap_err(),
            MstaError::InsufficientCorrespondence { structure: 2, pairs: 0 }
        );
    }

    #[test]
    fn test_two_pairs_are_insufficient() {
        let base = helix(4);
        let ensemble = Ensemble::new(vec![Structure::new(base.clone()), Structure::new(base)]);
        let block = Block::new(vec![
            vec![Some(0), Some(1), Some(2)],
            vec![Some(0), None, Some(2)],
        ])
        .unwrap();
        let msa = MultipleAlignment::new(&ensemble, vec![block]).unwrap();
        assert_eq!(
            compute_transformations(&msa, 0).unwrap_err(),
            MstaError::InsufficientCorrespondence { structure: 1, pairs: 2 }
        );
    }

    #[test]
    fn test_invalid_reference() {
        let base = helix(5);
        let ensemble = Ensemble::new(vec![Structure::new(base.clone()), Structure::new(base)]);
        let msa = MultipleAlignment::new(&ensemble, vec![identity_block(2, 5)]).unwrap();
        assert_eq!(
            compute_transformations(&msa, 2).unwrap_err(),
            MstaError::InvalidReference { reference: 2, structures: 2 }
        );

        let single = Ensemble::new(vec![Structure::new(helix(5))]);
        let msa = MultipleAlignment::new(&single, vec![identity_block(1, 5)]).unwrap();
        assert!(matches!(
            compute_transformations(&msa, 0),
            Err(MstaError::InvalidReference { structures: 1, .. })
        ));
    }
}
