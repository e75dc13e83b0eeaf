//! Evaluation of multiple structure alignments
//!
//! A multiple structure alignment maps residues of three or more structures
//! onto shared columns, with gaps. This crate superimposes every structure
//! onto a chosen reference structure and scores the result with the
//! reference RMSD and the reference TM-score.
//!
//! - [`Ensemble`] / [`Structure`]: the read-only coordinate traces
//! - [`MultipleAlignment`] / [`Block`]: the gapped correspondence table
//! - [`TransformationSet`]: one rigid transformation per structure
//! - [`ReferenceSuperimposer`]: Kabsch fit of each structure onto the reference
//! - [`ref_rmsd`] / [`ref_tm_score`]: scores relative to the reference
//!
//! # Example
//!
//! ```rust
//! use lin_alg::f64::Vec3;
//! use msta_align::{
//!     compute_transformations, reference_scores, Block, Ensemble, MultipleAlignment, Structure,
//! };
//!
//! let trace = |shift: f64| {
//!     Structure::new(
//!         (0..20)
//!             .map(|i| {
//!                 let t = i as f64 * 1.7;
//!                 Vec3::new(2.3 * t.cos() + shift, 2.3 * t.sin(), 1.5 * i as f64)
//!             })
//!             .collect(),
//!     )
//! };
//! let ensemble = Ensemble::new(vec![trace(0.0), trace(4.0), trace(-2.0)]);
//! let block = Block::from_residues(vec![(0..20).collect::<Vec<_>>(); 3]).unwrap();
//! let msa = MultipleAlignment::new(&ensemble, vec![block]).unwrap();
//!
//! let transforms = compute_transformations(&msa, 0).unwrap();
//! let scores = reference_scores(&msa, Some(&transforms), 0).unwrap();
//! assert!(scores.rmsd < 1e-6);
//! assert!((scores.tm_score - 1.0).abs() < 1e-6);
//! ```

mod alignment;
mod block;
mod ensemble;
mod error;
mod score;
mod superimpose;
mod transform;

pub use alignment::MultipleAlignment;
pub use block::{Block, ResidueIndex};
pub use ensemble::{Ensemble, Structure};
pub use error::{MstaError, Result};
pub use score::{
    ref_rmsd, ref_tm_score, reference_scores, tm_d0, transformed_columns, RefScores, TM_D0_MIN,
    TM_D0_LENGTH_OFFSET, TM_D0_SCALE, TM_D0_SHIFT,
};
pub use superimpose::{
    compute_transformations, ReferenceSuperimposer, SuperimposeParams, MIN_FIT_PAIRS,
};
pub use transform::{Transformation, TransformationSet};
