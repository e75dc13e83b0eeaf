//! Aligned column groups
//!
//! A [`Block`] is one contiguous run of aligned columns. For every structure
//! of the ensemble it stores one entry per column: `Some(residue)` for an
//! aligned residue, `None` for a gap.

use crate::error::{MstaError, Result};

/// Residue index into a structure's coordinate sequence
pub type ResidueIndex = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// align_res[structure][column]
    align_res: Vec<Vec<Option<ResidueIndex>>>,
    length: usize,
}

impl Block {
    /// Build a block from per-structure column lists.
    ///
    /// Every list must have the same number of columns.
    pub fn new(align_res: Vec<Vec<Option<ResidueIndex>>>) -> Result<Self> {
        let length = align_res.first().map_or(0, Vec::len);
        if let Some((structure, row)) = align_res
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != length)
        {
            return Err(MstaError::MalformedBlock {
                structure,
                expected: length,
                actual: row.len(),
            });
        }
        Ok(Block { align_res, length })
    }

    /// Gap-free block from plain residue lists
    pub fn from_residues(align_res: Vec<Vec<ResidueIndex>>) -> Result<Self> {
        Self::new(
            align_res
                .into_iter()
                .map(|row| row.into_iter().map(Some).collect())
                .collect(),
        )
    }

    /// Number of aligned columns
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn structure_count(&self) -> usize {
        self.align_res.len()
    }

    /// Number of columns with no gap in any structure
    pub fn core_length(&self) -> usize {
        (0..self.length)
            .filter(|&col| self.align_res.iter().all(|row| row[col].is_some()))
            .count()
    }

    /// Entry for `structure` at `column`; `None` for a gap or out of range.
    pub fn residue(&self, structure: usize, column: usize) -> Option<ResidueIndex> {
        self.align_res
            .get(structure)
            .and_then(|row| row.get(column))
            .copied()
            .flatten()
    }

    /// Column list of one structure
    pub fn row(&self, structure: usize) -> Option<&[Option<ResidueIndex>]> {
        self.align_res.get(structure).map(Vec::as_slice)
    }

    pub fn rows(&self) -> &[Vec<Option<ResidueIndex>>] {
        &self.align_res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lengths() {
        let block = Block::new(vec![
            vec![Some(0), Some(1), None, Some(3)],
            vec![Some(0), None, Some(2), Some(4)],
            vec![Some(1), Some(2), Some(3), Some(5)],
        ])
        .unwrap();
        assert_eq!(block.length(), 4);
        assert_eq!(block.structure_count(), 3);
        assert_eq!(block.core_length(), 2);
    }

    #[test]
    fn test_residue_lookup() {
        let block = Block::new(vec![vec![Some(0), None], vec![None, Some(7)]]).unwrap();
        assert_eq!(block.residue(0, 0), Some(0));
        assert_eq!(block.residue(0, 1), None);
        assert_eq!(block.residue(1, 1), Some(7));
        assert_eq!(block.residue(2, 0), None);
        assert_eq!(block.residue(0, 5), None);
    }

    #[test]
    fn test_gap_is_not_residue_zero() {
        let block = Block::new(vec![vec![Some(0)], vec![None]]).unwrap();
        assert_eq!(block.row(0), Some(&[Some(0)][..]));
        assert_eq!(block.row(1), Some(&[None][..]));
    }

    #[test]
    fn test_unequal_rows_rejected() {
        let err = Block::new(vec![vec![Some(0), Some(1)], vec![Some(0)]]).unwrap_err();
        assert_eq!(
            err,
            MstaError::MalformedBlock {
                structure: 1,
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_from_residues() {
        let block = Block::from_residues(vec![vec![0, 1, 2], vec![2, 3, 4]]).unwrap();
        assert_eq!(block.core_length(), 3);
        assert_eq!(block.residue(1, 2), Some(4));
    }
}
