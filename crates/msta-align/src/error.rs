//! Error types for multiple structure alignment evaluation

use msta_algos::FitError;
use thiserror::Error;

/// Errors raised while building, superimposing or scoring an alignment
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MstaError {
    /// Reference index outside `[0, S)`, or fewer than two structures
    #[error("Invalid reference structure {reference} for an ensemble of {structures} structures")]
    InvalidReference { reference: usize, structures: usize },

    /// Too few corresponding residues to determine a rotation
    #[error("Structure {structure} shares only {pairs} aligned residues with the reference (need at least 3)")]
    InsufficientCorrespondence { structure: usize, pairs: usize },

    /// No aligned, non-gap column between the reference and any other structure
    #[error("No structure overlaps reference structure {reference} at any aligned column")]
    NoOverlap { reference: usize },

    /// Lookup outside the alignment or the structure store
    #[error("Index out of range: structure {structure}, column {column} (alignment has {structures} structures, {columns} columns)")]
    IndexOutOfRange {
        structure: usize,
        column: usize,
        structures: usize,
        columns: usize,
    },

    /// Per-structure column lists of a block differ in length
    #[error("Malformed block: structure {structure} has {actual} columns, expected {expected}")]
    MalformedBlock {
        structure: usize,
        expected: usize,
        actual: usize,
    },

    /// Block or transformation set does not cover the ensemble exactly
    #[error("Structure count mismatch: expected {expected}, got {actual}")]
    StructureCountMismatch { expected: usize, actual: usize },

    /// Residue index past the end of its structure
    #[error("Residue {residue} is out of range for structure {structure} of length {length}")]
    ResidueOutOfRange {
        structure: usize,
        residue: usize,
        length: usize,
    },

    #[error(transparent)]
    Fit(#[from] FitError),
}

/// Result type for alignment operations
pub type Result<T> = std::result::Result<T, MstaError>;
