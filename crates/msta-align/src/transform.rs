//! Per-structure rigid transformations
//!
//! A [`Transformation`] maps one structure's native coordinates into the
//! shared reference frame: `p' = R · p + t`. A [`TransformationSet`] holds
//! exactly one per structure of the ensemble, indexed like the ensemble.

use lin_alg::f64::Vec3;
use msta_algos::linalg::{
    determinant_3x3, is_identity_3x3, multiply_3x3, transform_3x3, Mat3, IDENTITY_3X3,
};
use msta_algos::KabschResult;

use crate::error::{MstaError, Result};

/// Rigid rotation (row-major, det +1) plus translation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transformation {
    pub rotation: Mat3,
    pub translation: Vec3,
}

impl Default for Transformation {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transformation {
    pub fn new(rotation: Mat3, translation: Vec3) -> Self {
        Transformation {
            rotation,
            translation,
        }
    }

    pub fn identity() -> Self {
        Transformation {
            rotation: IDENTITY_3X3,
            translation: Vec3::new(0.0, 0.0, 0.0),
        }
    }

    pub fn is_identity(&self) -> bool {
        is_identity_3x3(&self.rotation, 1e-12)
            && self.translation.x.abs() < 1e-12
            && self.translation.y.abs() < 1e-12
            && self.translation.z.abs() < 1e-12
    }

    /// Map a point into the reference frame
    pub fn apply(&self, p: Vec3) -> Vec3 {
        let r = transform_3x3(&self.rotation, p);
        Vec3::new(
            r.x + self.translation.x,
            r.y + self.translation.y,
            r.z + self.translation.z,
        )
    }

    /// Determinant of the rotation part
    pub fn determinant(&self) -> f64 {
        determinant_3x3(&self.rotation)
    }

    /// `self` followed by `next`: `next.apply(self.apply(p))`
    pub fn then(&self, next: &Transformation) -> Transformation {
        let rotation = multiply_3x3(&next.rotation, &self.rotation);
        let t = next.apply(self.translation);
        Transformation::new(rotation, t)
    }

    /// Row-major 4×4 homogeneous matrix
    pub fn to_homogeneous(&self) -> [[f64; 4]; 4] {
        let r = &self.rotation;
        let t = &self.translation;
        [
            [r[0][0], r[0][1], r[0][2], t.x],
            [r[1][0], r[1][1], r[1][2], t.y],
            [r[2][0], r[2][1], r[2][2], t.z],
            [0.0, 0.0, 0.0, 1.0],
        ]
    }
}

impl From<&KabschResult> for Transformation {
    fn from(fit: &KabschResult) -> Self {
        Transformation::new(fit.rotation, fit.translation)
    }
}

/// One transformation per structure, in ensemble order
#[derive(Debug, Clone, PartialEq)]
pub struct TransformationSet {
    transformations: Vec<Transformation>,
}

impl TransformationSet {
    /// All-identity set for `n` structures
    pub fn identity(n: usize) -> Self {
        TransformationSet {
            transformations: vec![Transformation::identity(); n],
        }
    }

    /// Wrap caller-supplied transformations, one per structure.
    pub fn from_transformations(
        transformations: Vec<Transformation>,
        structures: usize,
    ) -> Result<Self> {
        if transformations.len() != structures {
            return Err(MstaError::StructureCountMismatch {
                expected: structures,
                actual: transformations.len(),
            });
        }
        Ok(TransformationSet { transformations })
    }

    pub fn len(&self) -> usize {
        self.transformations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformations.is_empty()
    }

    pub fn get(&self, structure: usize) -> Option<&Transformation> {
        self.transformations.get(structure)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transformation> {
        self.transformations.iter()
    }

    pub fn as_slice(&self) -> &[Transformation] {
        &self.transformations
    }
}

impl<'a> IntoIterator for &'a TransformationSet {
    type Item = &'a Transformation;
    type IntoIter = std::slice::Iter<'a, Transformation>;

    fn into_iter(self) -> Self::IntoIter {
        self.transformations.iter()
    }
}
