//! Error types for NetCDF parsing operations.

use ccmp_common::CcmpError;
use thiserror::Error;

/// Result type for NetCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF parsing.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Missing required variable or attribute
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Index outside the variable's shape
    #[error("Index {index:?} out of bounds for '{variable}' with shape {shape:?}")]
    OutOfBounds {
        variable: String,
        index: Vec<usize>,
        shape: Vec<usize>,
    },

    /// Error reported by libnetcdf
    #[error("NetCDF library error: {0}")]
    Library(#[from] netcdf::Error),
}

impl From<NetCdfError> for CcmpError {
    fn from(err: NetCdfError) -> Self {
        match err {
            NetCdfError::MissingData(what) => CcmpError::VariableNotFound(what),
            NetCdfError::OutOfBounds {
                variable,
                index,
                shape,
            } => CcmpError::OutOfBounds {
                variable,
                index,
                shape,
            },
            NetCdfError::IoError(e) => CcmpError::Io(e),
            other => CcmpError::NetCdfError(other.to_string()),
        }
    }
}
