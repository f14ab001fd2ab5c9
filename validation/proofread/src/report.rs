//! Trial lines and run summaries for the console.

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};

use ccmp_common::time::format_timestamp;

use crate::outcome::{Trial, TrialOutcome};
use crate::summary::RunSummary;

/// Formats trials and run summaries for output.
pub struct ResultsReport;

impl ResultsReport {
    /// `pass|fail <timestamp> <variable> lat=<i> lon=<j> mean=<sample>/<recorded> nobs=<sample>/<recorded>`
    ///
    /// `None` for skipped trials.
    pub fn format_line(trial: &Trial) -> Option<String> {
        let TrialOutcome::Compared(c) = &trial.outcome else {
            return None;
        };
        Some(format!(
            "{} {} {} {} mean={:.6}/{:.6} nobs={}/{:.0}",
            if c.passed { "pass" } else { "fail" },
            format_timestamp(&trial.sample.timestamp),
            trial.sample.variable,
            trial.sample.cell,
            c.sample_mean,
            c.recorded_mean,
            c.sample_nobs,
            c.recorded_nobs
        ))
    }

    /// `skip <timestamp> <variable> <reason>`, or `None` for compared trials.
    pub fn format_skip_line(trial: &Trial) -> Option<String> {
        let TrialOutcome::Skipped(reason) = &trial.outcome else {
            return None;
        };
        Some(format!(
            "skip {} {} {}",
            format_timestamp(&trial.sample.timestamp),
            trial.sample.variable,
            reason
        ))
    }

    /// Format a run summary as a console table.
    pub fn format_table(title: &str, summary: &RunSummary) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![format!("Proofread Results: {}", title)]);

        table.add_row(vec!["Trials:", &summary.trials.to_string()]);
        table.add_row(vec!["Compared:", &summary.compared.to_string()]);
        table.add_row(vec!["Passed:", &summary.passed.to_string()]);
        table.add_row(vec!["Failed:", &summary.failed.to_string()]);
        table.add_row(vec![
            "Pass Rate:",
            &summary
                .pass_rate()
                .map(|p| format!("{:.1}%", p))
                .unwrap_or_else(|| "n/a".to_string()),
        ]);

        table.add_row(vec!["", ""]);
        table.add_row(vec!["Skipped:", &summary.skipped_total().to_string()]);
        for (kind, count) in &summary.skipped {
            table.add_row(vec![format!("  {}", kind), count.to_string()]);
        }
        table.add_row(vec!["Slot Errors:", &summary.slot_errors.to_string()]);

        table.to_string()
    }

    /// Format a run summary as JSON.
    pub fn format_json(summary: &RunSummary) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(summary)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::{Comparison, SkipReason};
    use crate::sampler::Sample;
    use ccmp_common::{GridCell, WindVariable};
    use chrono::{TimeZone, Utc};

    fn trial(outcome: TrialOutcome) -> Trial {
        Trial {
            sample: Sample {
                bucket: 1,
                timestamp: Utc.with_ymd_and_hms(1993, 1, 17, 0, 0, 0).unwrap(),
                variable: WindVariable::Vwnd,
                cell: GridCell::new(412, 1033),
            },
            slot_errors: 0,
            outcome,
        }
    }

    #[test]
    fn test_pass_and_fail_lines() {
        let pass = trial(TrialOutcome::Compared(Comparison::new(3.14159, 28, 3.14159, 28.0, 1e-5)));
        assert_eq!(
            ResultsReport::format_line(&pass).unwrap(),
            "pass 1993-01-17T00:00:00Z vwnd lat=412 lon=1033 mean=3.141590/3.141590 nobs=28/28"
        );

        let fail = trial(TrialOutcome::Compared(Comparison::new(3.14159, 28, 3.2, 27.0, 1e-5)));
        assert_eq!(
            ResultsReport::format_line(&fail).unwrap(),
            "fail 1993-01-17T00:00:00Z vwnd lat=412 lon=1033 mean=3.141590/3.200000 nobs=28/27"
        );
        assert!(ResultsReport::format_skip_line(&fail).is_none());
    }

    #[test]
    fn test_skip_line() {
        let skipped = trial(TrialOutcome::Skipped(SkipReason::NoGroundTruth));
        assert!(ResultsReport::format_line(&skipped).is_none());
        assert_eq!(
            ResultsReport::format_skip_line(&skipped).unwrap(),
            "skip 1993-01-17T00:00:00Z vwnd no_ground_truth"
        );
    }

    #[test]
    fn test_table_and_json() {
        let mut summary = RunSummary::default();
        summary.record(trial(TrialOutcome::Skipped(SkipReason::NoObservations)));

        let table = ResultsReport::format_table("1993", &summary);
        assert!(table.contains("Proofread Results: 1993"));
        assert!(table.contains("no_observations"));

        let json: serde_json::Value =
            serde_json::from_str(&ResultsReport::format_json(&summary).unwrap()).unwrap();
        assert_eq!(json["trials"], 1);
        assert_eq!(json["skipped"]["no_observations"], 1);
    }
}
