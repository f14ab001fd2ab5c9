//! Data-access traits for daily observation grids and yearly aggregates.
//!
//! The validator only talks to these traits, so NetCDF-backed readers and
//! in-memory synthetic grids are interchangeable.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

use crate::error::CcmpResult;
use crate::grid::{GridCell, GridExtent};
use crate::variable::WindVariable;

/// Aggregate mean meaning "no data for this bucket".
pub const AGGREGATE_SENTINEL: f64 = -999.9;

/// Whether a recorded aggregate mean carries no ground truth.
///
/// The sentinel is stored as f32, so it is matched with a loose tolerance.
pub fn is_no_data(mean: f64) -> bool {
    mean.is_nan() || (mean - AGGREGATE_SENTINEL).abs() < 1e-3
}

/// Failure to open one day of the observation archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// No file exists for the day.
    #[error("Daily file for {date} not found at {}", path.display())]
    Missing { date: NaiveDate, path: PathBuf },

    /// The file exists but could not be opened or is not a CCMP daily grid.
    #[error("Daily file for {date} is unreadable: {message}")]
    Unreadable { date: NaiveDate, message: String },
}

/// One day of sub-daily observations, indexed by (lat, lon, slot).
pub trait DailyGrid {
    /// Value of `variable` at `cell` and sub-day `slot`.
    ///
    /// Returns `Ok(None)` for a missing (NaN or fill) value.
    fn value(&self, variable: WindVariable, cell: GridCell, slot: usize) -> CcmpResult<Option<f64>>;

    /// Number of sub-day slots in this file.
    fn slots(&self) -> usize;
}

/// Yearly aggregate of weekly means, indexed by (bucket, lat, lon).
pub trait AggregateGrid {
    /// Spatial extent of the aggregate.
    fn extent(&self) -> GridExtent;

    /// Number of time buckets.
    fn buckets(&self) -> usize;

    /// Recorded mean of `variable`. May be the sentinel.
    fn mean(&self, variable: WindVariable, bucket: usize, cell: GridCell) -> CcmpResult<f64>;

    /// Recorded observation count behind the mean.
    fn nobs(&self, variable: WindVariable, bucket: usize, cell: GridCell) -> CcmpResult<f64>;
}

/// A source of daily grids keyed by calendar day.
pub trait ObservationArchive {
    type Grid: DailyGrid;

    fn open_day(&self, date: NaiveDate) -> Result<Self::Grid, ArchiveError>;
}

impl<A: ObservationArchive + ?Sized> ObservationArchive for &A {
    type Grid = A::Grid;

    fn open_day(&self, date: NaiveDate) -> Result<Self::Grid, ArchiveError> {
        (**self).open_day(date)
    }
}

impl<G: AggregateGrid + ?Sized> AggregateGrid for &G {
    fn extent(&self) -> GridExtent {
        (**self).extent()
    }

    fn buckets(&self) -> usize {
        (**self).buckets()
    }

    fn mean(&self, variable: WindVariable, bucket: usize, cell: GridCell) -> CcmpResult<f64> {
        (**self).mean(variable, bucket, cell)
    }

    fn nobs(&self, variable: WindVariable, bucket: usize, cell: GridCell) -> CcmpResult<f64> {
        (**self).nobs(variable, bucket, cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_survives_f32_storage() {
        let stored = AGGREGATE_SENTINEL as f32;
        assert!(is_no_data(stored as f64));
        assert!(is_no_data(f64::NAN));
        assert!(!is_no_data(-999.0));
        assert!(!is_no_data(0.0));
    }
}
