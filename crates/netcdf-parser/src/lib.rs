//! NetCDF readers for CCMP wind products.
//!
//! This crate reads the two file kinds the proofreading tools need:
//!
//! - daily wind analysis files (`CCMP_Wind_Analysis_<YYYYMMDD>_V03.0_L4.0.nc`),
//!   opened per day through [`NetCdfArchive`]
//! - yearly means files (`ccmp_means_<YYYY>.nc`), opened once per run as an
//!   [`AggregateGridFile`]
//!
//! Daily files can also be flattened into per-cell [`PointRecord`]s for
//! loading into a document store.
//!
//! Both readers implement the data-access traits from `ccmp-common`, so callers can
//! swap in synthetic grids for testing.
//!
//! Validator reads are point reads: a trial touches one cell in a handful of
//! files. Record extraction reads one latitude row per variable at a time.

pub mod aggregate;
pub mod archive;
pub mod daily;
pub mod error;
pub mod native;
pub mod records;

pub use aggregate::AggregateGridFile;
pub use archive::NetCdfArchive;
pub use daily::{DailyGridFile, DUMP_VARIABLES};
pub use error::{NetCdfError, NetCdfResult};
pub use native::silence_hdf5_errors;
pub use records::{
    file_metadata, row_records, timeseries, FileMetadata, PointRecord, VariableInfo,
};
