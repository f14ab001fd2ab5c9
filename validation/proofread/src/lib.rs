//! Sample validator for CCMP yearly means.
//!
//! This crate provides tools to:
//! - Draw random (variable, weekly bucket, grid cell) samples from a year
//! - Recompute the mean of a sample from the daily files in its window
//! - Compare it with the mean and count recorded in the yearly aggregate
//! - Summarise a run as a console table or JSON
//!
//! The validator is generic over the data-access traits in `ccmp-common`,
//! so it runs against NetCDF files in production and synthetic grids in tests.

pub mod config;
pub mod dump;
pub mod error;
pub mod outcome;
pub mod report;
pub mod sampler;
pub mod summary;
pub mod validator;

pub use config::{ProofreadConfig, SlotPolicy};
pub use dump::CellDump;
pub use error::ProofreadError;
pub use outcome::{approx_eq, Comparison, SkipKind, SkipReason, Trial, TrialOutcome};
pub use report::ResultsReport;
pub use sampler::{Sample, Sampler};
pub use summary::RunSummary;
pub use validator::Validator;
