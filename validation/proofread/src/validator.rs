//! Trial execution: recompute a sample's mean from daily files and compare.
//!
//! A trial opens every daily grid in the sample's window, accumulates the
//! non-missing slot values at the sampled cell and checks the result against
//! the aggregate. Daily-file problems end the trial as a skip; they never
//! count as zero-valued data. The aggregate is opened once by the caller and
//! borrowed for the whole run.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};

use ccmp_common::time::day_window;
use ccmp_common::{is_no_data, AggregateGrid, DailyGrid, ObservationArchive, WindowAlignment};

use crate::config::{ProofreadConfig, SlotPolicy};
use crate::error::ProofreadError;
use crate::outcome::{Comparison, SkipReason, Trial, TrialOutcome};
use crate::sampler::{Sample, Sampler};
use crate::summary::RunSummary;

/// Running total for one sample.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Accumulator {
    total: f64,
    nobs: u64,
    slot_errors: usize,
}

/// Draws samples and checks them against an aggregate.
pub struct Validator<A, G> {
    archive: A,
    aggregate: G,
    sampler: Sampler,
    window_days: u32,
    alignment: WindowAlignment,
    slot_policy: SlotPolicy,
    slots_per_day: usize,
    tolerance: f64,
}

impl<A: ObservationArchive, G: AggregateGrid> Validator<A, G> {
    /// `buckets` is the year's time lattice; bucket `i` must exist in the aggregate.
    pub fn new(
        archive: A,
        aggregate: G,
        buckets: Vec<DateTime<Utc>>,
        config: &ProofreadConfig,
    ) -> Result<Self, ProofreadError> {
        config.validate()?;

        if buckets.len() > aggregate.buckets() {
            return Err(ProofreadError::LatticeMismatch {
                lattice: buckets.len(),
                aggregate: aggregate.buckets(),
            });
        }

        let sampler = Sampler::new(buckets, aggregate.extent(), config.seed)?;

        Ok(Self {
            archive,
            aggregate,
            sampler,
            window_days: config.window_days,
            alignment: config.alignment,
            slot_policy: config.slot_policy,
            slots_per_day: config.slots_per_day,
            tolerance: config.tolerance,
        })
    }

    /// Calendar days whose files feed a bucket anchored at `timestamp`.
    pub fn window(&self, timestamp: DateTime<Utc>) -> Vec<NaiveDate> {
        day_window(timestamp.date_naive(), self.window_days, self.alignment)
    }

    /// Draw one sample and evaluate it.
    pub fn trial(&mut self) -> Trial {
        let sample = self.sampler.next_sample();
        self.evaluate(sample)
    }

    /// Evaluate a given sample.
    pub fn evaluate(&self, sample: Sample) -> Trial {
        let (outcome, slot_errors) = match self.check(&sample) {
            Ok((comparison, slot_errors)) => (TrialOutcome::Compared(comparison), slot_errors),
            Err((reason, slot_errors)) => (TrialOutcome::Skipped(reason), slot_errors),
        };

        Trial {
            sample,
            slot_errors,
            outcome,
        }
    }

    fn check(&self, sample: &Sample) -> Result<(Comparison, usize), (SkipReason, usize)> {
        let mut grids = Vec::with_capacity(self.window_days as usize);
        for date in self.window(sample.timestamp) {
            let grid = self.archive.open_day(date).map_err(|e| {
                debug!(error = %e, "Skipping trial");
                (SkipReason::from(e), 0)
            })?;
            if grid.slots() < self.slots_per_day {
                debug!(%date, slots = grid.slots(), "Skipping trial, daily file is short");
                return Err((
                    SkipReason::UnreadableDailyFile {
                        date,
                        message: format!(
                            "{} time slots, expected {}",
                            grid.slots(),
                            self.slots_per_day
                        ),
                    },
                    0,
                ));
            }
            grids.push(grid);
        }

        let acc = self.accumulate(&grids, sample);
        drop(grids);

        if acc.nobs == 0 {
            return Err((SkipReason::NoObservations, acc.slot_errors));
        }
        let sample_mean = acc.total / acc.nobs as f64;

        let unreadable = |e: ccmp_common::CcmpError| {
            (
                SkipReason::UnreadableAggregate {
                    message: e.to_string(),
                },
                acc.slot_errors,
            )
        };
        let recorded_mean = self
            .aggregate
            .mean(sample.variable, sample.bucket, sample.cell)
            .map_err(unreadable)?;
        if is_no_data(recorded_mean) {
            return Err((SkipReason::NoGroundTruth, acc.slot_errors));
        }
        let recorded_nobs = self
            .aggregate
            .nobs(sample.variable, sample.bucket, sample.cell)
            .map_err(unreadable)?;

        let comparison = Comparison::new(
            sample_mean,
            acc.nobs,
            recorded_mean,
            recorded_nobs,
            self.tolerance,
        );
        Ok((comparison, acc.slot_errors))
    }

    fn accumulate(&self, grids: &[A::Grid], sample: &Sample) -> Accumulator {
        let mut acc = Accumulator::default();

        for grid in grids {
            let mut day_total = 0.0;
            let mut day_nobs = 0u64;
            let mut day_complete = true;

            for slot in 0..self.slots_per_day {
                match grid.value(sample.variable, sample.cell, slot) {
                    Ok(Some(value)) => {
                        day_total += value;
                        day_nobs += 1;
                    }
                    Ok(None) => day_complete = false,
                    Err(e) => {
                        debug!(slot, error = %e, "Slot read failed");
                        acc.slot_errors += 1;
                        day_complete = false;
                    }
                }
            }

            if self.slot_policy == SlotPolicy::PerSlot || day_complete {
                acc.total += day_total;
                acc.nobs += day_nobs;
            }
        }

        acc
    }

    /// Run exactly `trials` trials.
    pub fn run(&mut self, trials: u64) -> RunSummary {
        self.run_until(Some(trials), &AtomicBool::new(false), |_| {})
    }

    /// Run until `limit` trials are done (forever when `None`) or `stop` is set.
    ///
    /// `on_trial` sees every trial as it completes.
    pub fn run_until<F>(
        &mut self,
        limit: Option<u64>,
        stop: &AtomicBool,
        mut on_trial: F,
    ) -> RunSummary
    where
        F: FnMut(&Trial),
    {
        let mut summary = RunSummary::default();

        while limit.map_or(true, |n| summary.trials < n) && !stop.load(Ordering::Relaxed) {
            let trial = self.trial();
            on_trial(&trial);
            summary.record(trial);
        }

        info!(
            trials = summary.trials,
            compared = summary.compared,
            passed = summary.passed,
            failed = summary.failed,
            skipped = summary.skipped_total(),
            slot_errors = summary.slot_errors,
            "Validation run complete"
        );
        summary
    }
}
