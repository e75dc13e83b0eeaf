//! Structure store
//!
//! A [`Structure`] is one immutable coordinate trace (one point per residue,
//! typically Cα). An [`Ensemble`] owns the structures taking part in one
//! multiple alignment; the position of a structure in the ensemble is its
//! stable handle everywhere else in the crate.

use lin_alg::f64::Vec3;

/// Ordered, read-only residue coordinates of a single chain
#[derive(Debug, Clone)]
pub struct Structure {
    coords: Vec<Vec3>,
}

impl Structure {
    pub fn new(coords: Vec<Vec3>) -> Self {
        Structure { coords }
    }

    /// Build a structure from raw `[x, y, z]` triples
    pub fn from_xyz(coords: &[[f64; 3]]) -> Self {
        Structure {
            coords: coords.iter().map(|c| Vec3::new(c[0], c[1], c[2])).collect(),
        }
    }

    /// Number of residues
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Coordinate of a residue, `None` past the end
    pub fn coord(&self, residue: usize) -> Option<Vec3> {
        self.coords.get(residue).copied()
    }

    pub fn coords(&self) -> &[Vec3] {
        &self.coords
    }
}

/// Fixed group of structures aligned together
#[derive(Debug, Clone, Default)]
pub struct Ensemble {
    structures: Vec<Structure>,
}

impl Ensemble {
    pub fn new(structures: Vec<Structure>) -> Self {
        Ensemble { structures }
    }

    /// Number of structures (S)
    pub fn len(&self) -> usize {
        self.structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    pub fn structure(&self, index: usize) -> Option<&Structure> {
        self.structures.get(index)
    }

    pub fn structures(&self) -> &[Structure] {
        &self.structures
    }
}

impl FromIterator<Structure> for Ensemble {
    fn from_iter<I: IntoIterator<Item = Structure>>(iter: I) -> Self {
        Ensemble::new(iter.into_iter().collect())
    }
}
