use thiserror::Error;

use ccmp_common::LatticeError;

/// Errors that stop a validation run before any trial.
#[derive(Debug, Error)]
pub enum ProofreadError {
    #[error("Time lattice has no buckets")]
    EmptyLattice,

    #[error("Aggregate grid has no cells")]
    EmptyExtent,

    #[error("Lattice has {lattice} buckets but the aggregate only has {aggregate}")]
    LatticeMismatch { lattice: usize, aggregate: usize },

    #[error(transparent)]
    Lattice(#[from] LatticeError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
