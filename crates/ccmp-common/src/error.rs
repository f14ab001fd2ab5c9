//! Error types for CCMP data access.

use thiserror::Error;

/// Result type alias using CcmpError.
pub type CcmpResult<T> = Result<T, CcmpError>;

/// Primary error type for reading CCMP grids.
#[derive(Debug, Error)]
pub enum CcmpError {
    #[error("Variable not found: {0}")]
    VariableNotFound(String),

    #[error("Index {index:?} out of bounds for '{variable}' with shape {shape:?}")]
    OutOfBounds {
        variable: String,
        index: Vec<usize>,
        shape: Vec<usize>,
    },

    #[error("Failed to read data: {0}")]
    DataReadError(String),

    #[error("Invalid NetCDF data: {0}")]
    NetCdfError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
