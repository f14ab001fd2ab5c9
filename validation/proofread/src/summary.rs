//! Run totals.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::outcome::{SkipKind, Trial, TrialOutcome};

/// Counts collected over a validation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub trials: u64,
    pub compared: u64,
    pub passed: u64,
    pub failed: u64,
    /// Skipped trials by reason.
    pub skipped: BTreeMap<SkipKind, u64>,
    /// Slot reads that failed and were left out of their sample mean.
    pub slot_errors: u64,
    /// Every comparison that failed, in run order.
    pub failures: Vec<Trial>,
}

impl RunSummary {
    /// Record a finished trial.
    pub fn record(&mut self, trial: Trial) {
        self.trials += 1;
        self.slot_errors += trial.slot_errors as u64;

        match &trial.outcome {
            TrialOutcome::Skipped(reason) => {
                *self.skipped.entry(reason.kind()).or_insert(0) += 1;
            }
            TrialOutcome::Compared(comparison) => {
                self.compared += 1;
                if comparison.passed {
                    self.passed += 1;
                } else {
                    self.failed += 1;
                    self.failures.push(trial);
                }
            }
        }
    }

    pub fn skipped(&self, kind: SkipKind) -> u64 {
        self.skipped.get(&kind).copied().unwrap_or(0)
    }

    pub fn skipped_total(&self) -> u64 {
        self.skipped.values().sum()
    }

    /// Share of compared trials that passed, in percent.
    pub fn pass_rate(&self) -> Option<f64> {
        (self.compared > 0).then(|| self.passed as f64 / self.compared as f64 * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::{Comparison, SkipReason};
    use crate::sampler::Sample;
    use ccmp_common::{GridCell, WindVariable};
    use chrono::{TimeZone, Utc};

    fn trial(outcome: TrialOutcome, slot_errors: usize) -> Trial {
        Trial {
            sample: Sample {
                bucket: 1,
                timestamp: Utc.with_ymd_and_hms(1993, 1, 17, 0, 0, 0).unwrap(),
                variable: WindVariable::Ws,
                cell: GridCell::new(4, 5),
            },
            slot_errors,
            outcome,
        }
    }

    #[test]
    fn test_record_counts() {
        let mut summary = RunSummary::default();
        summary.record(trial(TrialOutcome::Compared(Comparison::new(1.0, 28, 1.0, 28.0, 1e-5)), 0));
        summary.record(trial(TrialOutcome::Compared(Comparison::new(1.0, 28, 1.0, 27.0, 1e-5)), 2));
        summary.record(trial(TrialOutcome::Skipped(SkipReason::NoGroundTruth), 0));
        summary.record(trial(TrialOutcome::Skipped(SkipReason::NoGroundTruth), 1));

        assert_eq!(summary.trials, 4);
        assert_eq!(summary.compared, 2);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.skipped(SkipKind::NoGroundTruth), 2);
        assert_eq!(summary.skipped(SkipKind::NoObservations), 0);
        assert_eq!(summary.skipped_total(), 2);
        assert_eq!(summary.slot_errors, 3);
        assert_eq!(summary.pass_rate(), Some(50.0));
    }

    #[test]
    fn test_empty_pass_rate() {
        assert_eq!(RunSummary::default().pass_rate(), None);
    }
}
