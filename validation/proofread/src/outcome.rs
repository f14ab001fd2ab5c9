//! Per-trial results.

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;

use ccmp_common::ArchiveError;

use crate::sampler::Sample;

/// Why a trial produced no comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// A day in the window has no file.
    MissingDailyFile { date: NaiveDate, path: PathBuf },
    /// A day in the window could not be opened as a daily grid.
    UnreadableDailyFile { date: NaiveDate, message: String },
    /// No non-missing values in the window.
    NoObservations,
    /// The aggregate holds the no-data sentinel for this sample.
    NoGroundTruth,
    /// Reading the aggregate mean or count failed.
    UnreadableAggregate { message: String },
}

/// Skip reasons without their payload, for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipKind {
    MissingDailyFile,
    UnreadableDailyFile,
    NoObservations,
    NoGroundTruth,
    UnreadableAggregate,
}

impl SkipKind {
    pub const ALL: [SkipKind; 5] = [
        SkipKind::MissingDailyFile,
        SkipKind::UnreadableDailyFile,
        SkipKind::NoObservations,
        SkipKind::NoGroundTruth,
        SkipKind::UnreadableAggregate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SkipKind::MissingDailyFile => "missing_daily_file",
            SkipKind::UnreadableDailyFile => "unreadable_daily_file",
            SkipKind::NoObservations => "no_observations",
            SkipKind::NoGroundTruth => "no_ground_truth",
            SkipKind::UnreadableAggregate => "unreadable_aggregate",
        }
    }
}

impl fmt::Display for SkipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl SkipReason {
    pub fn kind(&self) -> SkipKind {
        match self {
            SkipReason::MissingDailyFile { .. } => SkipKind::MissingDailyFile,
            SkipReason::UnreadableDailyFile { .. } => SkipKind::UnreadableDailyFile,
            SkipReason::NoObservations => SkipKind::NoObservations,
            SkipReason::NoGroundTruth => SkipKind::NoGroundTruth,
            SkipReason::UnreadableAggregate { .. } => SkipKind::UnreadableAggregate,
        }
    }
}

impl From<ArchiveError> for SkipReason {
    fn from(err: ArchiveError) -> Self {
        match err {
            ArchiveError::Missing { date, path } => SkipReason::MissingDailyFile { date, path },
            ArchiveError::Unreadable { date, message } => {
                SkipReason::UnreadableDailyFile { date, message }
            }
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingDailyFile { date, path } => {
                write!(f, "{} date={} path={}", self.kind(), date, path.display())
            }
            SkipReason::UnreadableDailyFile { date, message } => {
                write!(f, "{} date={} ({})", self.kind(), date, message)
            }
            SkipReason::UnreadableAggregate { message } => {
                write!(f, "{} ({})", self.kind(), message)
            }
            SkipReason::NoObservations | SkipReason::NoGroundTruth => write!(f, "{}", self.kind()),
        }
    }
}

/// A recomputed mean checked against the aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub sample_mean: f64,
    pub sample_nobs: u64,
    pub recorded_mean: f64,
    pub recorded_nobs: f64,
    pub passed: bool,
}

impl Comparison {
    pub fn new(
        sample_mean: f64,
        sample_nobs: u64,
        recorded_mean: f64,
        recorded_nobs: f64,
        tolerance: f64,
    ) -> Self {
        let passed = approx_eq(sample_mean, recorded_mean, tolerance)
            && approx_eq(sample_nobs as f64, recorded_nobs, tolerance);
        Self {
            sample_mean,
            sample_nobs,
            recorded_mean,
            recorded_nobs,
            passed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TrialOutcome {
    Skipped(SkipReason),
    Compared(Comparison),
}

/// A sample and what checking it produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trial {
    pub sample: Sample,
    /// Slots whose read failed and were left out of the mean.
    pub slot_errors: usize,
    pub outcome: TrialOutcome,
}

impl Trial {
    pub fn passed(&self) -> bool {
        matches!(&self.outcome, TrialOutcome::Compared(c) if c.passed)
    }

    pub fn failed(&self) -> bool {
        matches!(&self.outcome, TrialOutcome::Compared(c) if !c.passed)
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match &self.outcome {
            TrialOutcome::Skipped(reason) => Some(reason),
            TrialOutcome::Compared(_) => None,
        }
    }
}

/// `|a - b| <= max(tolerance, 1e-9 * max(|a|, |b|))`
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    if a == b {
        return true;
    }
    let scale = a.abs().max(b.abs());
    (a - b).abs() <= tolerance.max(1e-9 * scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approx_eq() {
        assert!(approx_eq(3.14159, 3.141595, 1e-5));
        assert!(!approx_eq(3.14159, 3.2, 1e-5));
        assert!(approx_eq(1e12, 1e12 + 1.0, 1e-5));
        assert!(!approx_eq(f64::NAN, f64::NAN, 1e-5));
    }

    #[test]
    fn test_comparison_checks_mean_and_count() {
        assert!(Comparison::new(2.5, 28, 2.5, 28.0, 1e-5).passed);
        assert!(!Comparison::new(2.5, 28, 2.5, 27.0, 1e-5).passed);
        assert!(!Comparison::new(2.5, 28, 2.6, 28.0, 1e-5).passed);
    }

    #[test]
    fn test_archive_errors_map_to_skip_reasons() {
        let date = NaiveDate::from_ymd_opt(1993, 1, 17).unwrap();
        let missing: SkipReason = ArchiveError::Missing {
            date,
            path: PathBuf::from("y1993/m01/x.nc"),
        }
        .into();
        assert_eq!(missing.kind(), SkipKind::MissingDailyFile);

        let unreadable: SkipReason = ArchiveError::Unreadable {
            date,
            message: "bad".into(),
        }
        .into();
        assert_eq!(unreadable.kind(), SkipKind::UnreadableDailyFile);
        assert_eq!(unreadable.to_string(), "unreadable_daily_file date=1993-01-17 (bad)");
    }
}
