//! In-memory synthetic archives and aggregates.
//!
//! These implement the `ccmp-common` data-access traits with predictable
//! values, so validator tests can control every slot without touching disk.

use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::PathBuf;

use ccmp_common::naming::daily_relative_path;
use ccmp_common::time::days_in_range;
use ccmp_common::{
    AggregateGrid, ArchiveError, CcmpError, CcmpResult, DailyGrid, GridCell, GridExtent,
    ObservationArchive, WindVariable, SLOTS_PER_DAY,
};
use chrono::NaiveDate;

/// One synthetic day of observations.
///
/// Every (variable, cell, slot) returns `default` unless overridden.
#[derive(Debug, Clone)]
pub struct SyntheticDay {
    default: Option<f64>,
    overrides: HashMap<(WindVariable, GridCell, usize), Option<f64>>,
    failing_slots: HashSet<usize>,
    slots: usize,
}

impl SyntheticDay {
    /// Every value is `value`.
    pub fn constant(value: f64) -> Self {
        Self {
            default: Some(value),
            overrides: HashMap::new(),
            failing_slots: HashSet::new(),
            slots: SLOTS_PER_DAY,
        }
    }

    /// Every value is missing.
    pub fn empty() -> Self {
        Self {
            default: None,
            ..Self::constant(0.0)
        }
    }

    /// Override one value; `None` marks it missing.
    pub fn with_value(
        mut self,
        variable: WindVariable,
        cell: GridCell,
        slot: usize,
        value: Option<f64>,
    ) -> Self {
        self.overrides.insert((variable, cell, slot), value);
        self
    }

    /// A day holding only `slots` sub-day slots.
    pub fn with_slots(mut self, slots: usize) -> Self {
        self.slots = slots;
        self
    }

    /// Reading `slot` fails with a data error for every variable and cell.
    pub fn with_failing_slot(mut self, slot: usize) -> Self {
        self.failing_slots.insert(slot);
        self
    }
}

impl DailyGrid for SyntheticDay {
    fn value(&self, variable: WindVariable, cell: GridCell, slot: usize) -> CcmpResult<Option<f64>> {
        if slot >= self.slots {
            return Err(CcmpError::OutOfBounds {
                variable: variable.name().to_string(),
                index: vec![cell.lat, cell.lon, slot],
                shape: vec![0, 0, self.slots],
            });
        }
        if self.failing_slots.contains(&slot) {
            return Err(CcmpError::DataReadError(format!(
                "synthetic read failure in slot {}",
                slot
            )));
        }
        Ok(self
            .overrides
            .get(&(variable, cell, slot))
            .copied()
            .unwrap_or(self.default))
    }

    fn slots(&self) -> usize {
        self.slots
    }
}

/// An in-memory archive of synthetic days.
#[derive(Debug, Default)]
pub struct SyntheticArchive {
    days: BTreeMap<NaiveDate, SyntheticDay>,
    unreadable: BTreeSet<NaiveDate>,
    opened: Cell<usize>,
}

impl SyntheticArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every day from `start` through `end` holds the constant `value`.
    pub fn constant(start: NaiveDate, end: NaiveDate, value: f64) -> Self {
        let mut archive = Self::new();
        for date in days_in_range(start, end) {
            archive.days.insert(date, SyntheticDay::constant(value));
        }
        archive
    }

    pub fn with_day(mut self, date: NaiveDate, day: SyntheticDay) -> Self {
        self.days.insert(date, day);
        self
    }

    /// Remove a day so opening it reports a missing file.
    pub fn without_day(mut self, date: NaiveDate) -> Self {
        self.days.remove(&date);
        self
    }

    /// Opening `date` reports an unreadable file.
    pub fn with_unreadable_day(mut self, date: NaiveDate) -> Self {
        self.unreadable.insert(date);
        self
    }

    /// Number of successful `open_day` calls so far.
    pub fn opened(&self) -> usize {
        self.opened.get()
    }
}

impl ObservationArchive for SyntheticArchive {
    type Grid = SyntheticDay;

    fn open_day(&self, date: NaiveDate) -> Result<SyntheticDay, ArchiveError> {
        if self.unreadable.contains(&date) {
            return Err(ArchiveError::Unreadable {
                date,
                message: "synthetic corrupt file".to_string(),
            });
        }
        let day = self.days.get(&date).cloned().ok_or_else(|| ArchiveError::Missing {
            date,
            path: PathBuf::from(daily_relative_path(date)),
        })?;
        self.opened.set(self.opened.get() + 1);
        Ok(day)
    }
}

/// An in-memory yearly aggregate.
#[derive(Debug, Clone)]
pub struct SyntheticAggregate {
    extent: GridExtent,
    buckets: usize,
    default_mean: f64,
    default_nobs: f64,
    overrides: HashMap<(WindVariable, usize, GridCell), (f64, f64)>,
}

impl SyntheticAggregate {
    /// Every (variable, bucket, cell) records `mean` over `nobs` observations.
    pub fn uniform(extent: GridExtent, buckets: usize, mean: f64, nobs: f64) -> Self {
        Self {
            extent,
            buckets,
            default_mean: mean,
            default_nobs: nobs,
            overrides: HashMap::new(),
        }
    }

    pub fn with_cell(
        mut self,
        variable: WindVariable,
        bucket: usize,
        cell: GridCell,
        mean: f64,
        nobs: f64,
    ) -> Self {
        self.overrides.insert((variable, bucket, cell), (mean, nobs));
        self
    }

    fn lookup(&self, variable: WindVariable, bucket: usize, cell: GridCell) -> CcmpResult<(f64, f64)> {
        if bucket >= self.buckets || !self.extent.contains(cell) {
            return Err(CcmpError::OutOfBounds {
                variable: variable.name().to_string(),
                index: vec![bucket, cell.lat, cell.lon],
                shape: vec![self.buckets, self.extent.n_lat, self.extent.n_lon],
            });
        }
        Ok(self
            .overrides
            .get(&(variable, bucket, cell))
            .copied()
            .unwrap_or((self.default_mean, self.default_nobs)))
    }
}

impl AggregateGrid for SyntheticAggregate {
    fn extent(&self) -> GridExtent {
        self.extent
    }

    fn buckets(&self) -> usize {
        self.buckets
    }

    fn mean(&self, variable: WindVariable, bucket: usize, cell: GridCell) -> CcmpResult<f64> {
        self.lookup(variable, bucket, cell).map(|(mean, _)| mean)
    }

    fn nobs(&self, variable: WindVariable, bucket: usize, cell: GridCell) -> CcmpResult<f64> {
        self.lookup(variable, bucket, cell).map(|(_, nobs)| nobs)
    }
}
