//! Correspondence table
//!
//! [`MultipleAlignment`] is an ordered list of [`Block`]s over one
//! [`Ensemble`]. Columns are addressed in alignment order across all blocks
//! (the first column of block 1 follows the last column of block 0). The
//! table is pure correspondence; no transformation is applied here.

use lin_alg::f64::Vec3;

use crate::block::{Block, ResidueIndex};
use crate::ensemble::Ensemble;
use crate::error::{MstaError, Result};

#[derive(Debug, Clone)]
pub struct MultipleAlignment<'e> {
    ensemble: &'e Ensemble,
    blocks: Vec<Block>,
}

impl<'e> MultipleAlignment<'e> {
    /// Build an alignment, checking that every block covers the whole
    /// ensemble and only names residues that exist.
    pub fn new(ensemble: &'e Ensemble, blocks: Vec<Block>) -> Result<Self> {
        for block in &blocks {
            if block.structure_count() != ensemble.len() {
                return Err(MstaError::StructureCountMismatch {
                    expected: ensemble.len(),
                    actual: block.structure_count(),
                });
            }
            for (structure, row) in block.rows().iter().enumerate() {
                let length = ensemble.structures()[structure].len();
                if let Some(residue) = row.iter().flatten().find(|&&r| r >= length) {
                    return Err(MstaError::ResidueOutOfRange {
                        structure,
                        residue: *residue,
                        length,
                    });
                }
            }
        }
        Ok(MultipleAlignment { ensemble, blocks })
    }

    pub fn ensemble(&self) -> &'e Ensemble {
        self.ensemble
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of structures (S)
    pub fn structure_count(&self) -> usize {
        self.ensemble.len()
    }

    /// Total number of columns across all blocks
    pub fn aligned_column_count(&self) -> usize {
        self.blocks.iter().map(Block::length).sum()
    }

    /// Number of columns without a gap in any structure
    pub fn core_length(&self) -> usize {
        self.blocks.iter().map(Block::core_length).sum()
    }

    /// Residue of `structure` at flattened `column`; `Ok(None)` is a gap.
    pub fn residue_at(&self, structure: usize, column: usize) -> Result<Option<ResidueIndex>> {
        if structure >= self.structure_count() {
            return Err(self.out_of_range(structure, column));
        }
        let mut offset = column;
        for block in &self.blocks {
            if offset < block.length() {
                return Ok(block.residue(structure, offset));
            }
            offset -= block.length();
        }
        Err(self.out_of_range(structure, column))
    }

    /// Untransformed coordinate of `structure` at flattened `column`
    pub fn coordinate_at(&self, structure: usize, column: usize) -> Result<Option<Vec3>> {
        let Some(residue) = self.residue_at(structure, column)? else {
            return Ok(None);
        };
        self.ensemble
            .structure(structure)
            .and_then(|s| s.coord(residue))
            .map(Some)
            .ok_or_else(|| self.out_of_range(structure, column))
    }

    /// Column entries of one structure in alignment order
    pub fn column_entries(
        &self,
        structure: usize,
    ) -> impl Iterator<Item = Option<ResidueIndex>> + '_ {
        self.blocks
            .iter()
            .filter_map(move |block| block.row(structure))
            .flat_map(|row| row.iter().copied())
    }

    /// Residue pairs `(structure residue, reference residue)` for every
    /// column where both are present, in alignment order. Gaps in any third
    /// structure do not matter.
    pub fn reference_pairs(
        &self,
        structure: usize,
        reference: usize,
    ) -> Vec<(ResidueIndex, ResidueIndex)> {
        self.column_entries(structure)
            .zip(self.column_entries(reference))
            .filter_map(|(s, r)| Some((s?, r?)))
            .collect()
    }

    fn out_of_range(&self, structure: usize, column: usize) -> MstaError {
        MstaError::IndexOutOfRange {
            structure,
            column,
            structures: self.structure_count(),
            columns: self.aligned_column_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ensemble::Structure;

    fn line(n: usize) -> Structure {
        Structure::new((0..n).map(|i| Vec3::new(i as f64, 0.0, 0.0)).collect())
    }

    fn ensemble() -> Ensemble {
        Ensemble::new(vec![line(10), line(10), line(10)])
    }

    fn two_blocks(ensemble: &Ensemble) -> MultipleAlignment<'_> {
        let b0 = Block::new(vec![
            vec![Some(0), Some(1)],
            vec![Some(1), None],
            vec![Some(2), Some(3)],
        ])
        .unwrap();
        let b1 = Block::new(vec![
            vec![Some(5), None, Some(7)],
            vec![Some(6), Some(7), Some(8)],
            vec![None, Some(8), Some(9)],
        ])
        .unwrap();
        MultipleAlignment::new(ensemble, vec![b0, b1]).unwrap()
    }

    #[test]
    fn test_column_counts() {
        let ens = ensemble();
        let msa = two_blocks(&ens);
        assert_eq!(msa.aligned_column_count(), 5);
        assert_eq!(msa.core_length(), 2);
        assert_eq!(msa.structure_count(), 3);
    }

    #[test]
    fn test_residue_at_spans_blocks() {
        let ens = ensemble();
        let msa = two_blocks(&ens);
        assert_eq!(msa.residue_at(0, 0).unwrap(), Some(0));
        assert_eq!(msa.residue_at(1, 1).unwrap(), None);
        assert_eq!(msa.residue_at(0, 2).unwrap(), Some(5));
        assert_eq!(msa.residue_at(2, 4).unwrap(), Some(9));
    }

    #[test]
    fn test_residue_at_out_of_range() {
        let ens = ensemble();
        let msa = two_blocks(&ens);
        assert!(matches!(
            msa.residue_at(0, 5),
            Err(MstaError::IndexOutOfRange { column: 5, columns: 5, .. })
        ));
        assert!(matches!(
            msa.residue_at(3, 0),
            Err(MstaError::IndexOutOfRange { structure: 3, .. })
        ));
    }

    #[test]
    fn test_coordinate_at() {
        let ens = ensemble();
        let msa = two_blocks(&ens);
        let c = msa.coordinate_at(1, 3).unwrap().unwrap();
        assert_eq!(c.x, 7.0);
        assert!(msa.coordinate_at(0, 3).unwrap().is_none());
    }

    #[test]
    fn test_reference_pairs_ignore_third_structure_gaps() {
        let ens = ensemble();
        let msa = two_blocks(&ens);
        // structure 2 vs reference 0: columns 0, 1 and 4
        assert_eq!(msa.reference_pairs(2, 0), vec![(2, 0), (3, 1), (9, 7)]);
        // structure 1 vs reference 0: columns 0, 2 and 4
        assert_eq!(msa.reference_pairs(1, 0), vec![(1, 0), (6, 5), (8, 7)]);
    }

    #[test]
    fn test_rejects_foreign_blocks() {
        let ens = ensemble();
        let short = Block::new(vec![vec![Some(0)], vec![Some(0)]]).unwrap();
        assert!(matches!(
            MultipleAlignment::new(&ens, vec![short]),
            Err(MstaError::StructureCountMismatch { expected: 3, actual: 2 })
        ));

        let past_end = Block::new(vec![vec![Some(0)], vec![Some(10)], vec![Some(0)]]).unwrap();
        assert!(matches!(
            MultipleAlignment::new(&ens, vec![past_end]),
            Err(MstaError::ResidueOutOfRange { structure: 1, residue: 10, length: 10 })
        ));
    }
}
