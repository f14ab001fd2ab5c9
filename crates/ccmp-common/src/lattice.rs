//! Time lattice: the weekly reference timestamps of each yearly aggregate.
//!
//! Bucket `i` of a year's lattice corresponds to index `i` of the aggregate
//! file's time dimension. Lattices are loaded from a YAML table keyed by year:
//!
//! ```yaml
//! years:
//!   1993:
//!     - "1993-01-10T00:00:00Z"
//!     - "1993-01-17T00:00:00Z"
//! ```

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::time::parse_timestamp;

/// Errors raised while loading or querying a time lattice.
#[derive(Debug, Error)]
pub enum LatticeError {
    #[error("Failed to read lattice file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse lattice table: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid timestamp '{value}' for year {year}")]
    InvalidTimestamp { year: i32, value: String },

    #[error("Lattice for year {0} is empty")]
    EmptyYear(i32),

    #[error("Lattice for year {year} is not strictly increasing at bucket {index}")]
    Unordered { year: i32, index: usize },

    #[error("Bucket {index} ({timestamp}) does not fall in year {year}")]
    OutsideYear {
        year: i32,
        index: usize,
        timestamp: DateTime<Utc>,
    },

    #[error("No time lattice configured for year {year} (available: {available:?})")]
    UnknownYear { year: i32, available: Vec<i32> },
}

#[derive(Debug, Deserialize)]
struct LatticeTable {
    years: BTreeMap<i32, Vec<String>>,
}

/// Validated per-year bucket timestamps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeLattice {
    years: BTreeMap<i32, Vec<DateTime<Utc>>>,
}

impl TimeLattice {
    /// Load and validate a lattice table from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LatticeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| LatticeError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate a lattice table from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self, LatticeError> {
        let table: LatticeTable = serde_yaml::from_str(content)?;

        let mut years = BTreeMap::new();
        for (year, raw) in table.years {
            let mut buckets = Vec::with_capacity(raw.len());
            for value in raw {
                let ts = parse_timestamp(&value)
                    .map_err(|_| LatticeError::InvalidTimestamp { year, value })?;
                buckets.push(ts);
            }
            years.insert(year, buckets);
        }

        let lattice = Self { years };
        lattice.validate()?;
        Ok(lattice)
    }

    /// A lattice of `count` buckets spaced one week apart, starting at `first`.
    ///
    /// Buckets spilling past the end of `first`'s year are dropped.
    pub fn weekly(first: NaiveDate, count: usize) -> Self {
        let year = first.year();
        let buckets = first
            .iter_weeks()
            .take(count)
            .take_while(|d| d.year() == year)
            .filter_map(|d| d.and_hms_opt(0, 0, 0))
            .map(|ndt| Utc.from_utc_datetime(&ndt))
            .collect();

        let mut years = BTreeMap::new();
        years.insert(year, buckets);
        Self { years }
    }

    /// Check every year is non-empty, strictly increasing and inside its year.
    pub fn validate(&self) -> Result<(), LatticeError> {
        for (&year, buckets) in &self.years {
            if buckets.is_empty() {
                return Err(LatticeError::EmptyYear(year));
            }
            for (index, ts) in buckets.iter().enumerate() {
                if ts.year() != year {
                    return Err(LatticeError::OutsideYear {
                        year,
                        index,
                        timestamp: *ts,
                    });
                }
                if index > 0 && *ts <= buckets[index - 1] {
                    return Err(LatticeError::Unordered { year, index });
                }
            }
        }
        Ok(())
    }

    /// Bucket timestamps for `year`.
    pub fn buckets(&self, year: i32) -> Result<&[DateTime<Utc>], LatticeError> {
        self.years
            .get(&year)
            .map(Vec::as_slice)
            .ok_or_else(|| LatticeError::UnknownYear {
                year,
                available: self.years(),
            })
    }

    /// Years present in the table, ascending.
    pub fn years(&self) -> Vec<i32> {
        self.years.keys().copied().collect()
    }
}
