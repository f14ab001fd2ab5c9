//! Configuration loading and management.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use ccmp_common::WindowAlignment;

use crate::error::ProofreadError;

/// How sub-daily slots are counted towards a sample mean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotPolicy {
    /// Every non-missing slot counts on its own.
    #[default]
    PerSlot,
    /// A day counts only when all of its slots are present.
    WholeDay,
}

/// Validator settings loaded from YAML (see `config/proofread.yaml`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofreadConfig {
    /// Root of the daily mirror (`y<YYYY>/m<MM>/` below it).
    #[serde(default = "default_data_root")]
    pub data_root: PathBuf,
    /// Directory holding `ccmp_means_<YYYY>.nc`.
    #[serde(default = "default_means_root")]
    pub means_root: PathBuf,
    #[serde(default = "default_lattice_path")]
    pub lattice_path: PathBuf,
    #[serde(default = "default_year")]
    pub year: i32,
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    #[serde(default)]
    pub alignment: WindowAlignment,
    #[serde(default)]
    pub slot_policy: SlotPolicy,
    #[serde(default = "default_slots_per_day")]
    pub slots_per_day: usize,
    /// Absolute tolerance for both the mean and the count.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Number of trials; 0 runs until interrupted.
    #[serde(default = "default_trials")]
    pub trials: u64,
    /// RNG seed for a reproducible run; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_data_root() -> PathBuf {
    PathBuf::from("/data/ccmp/daily")
}

fn default_means_root() -> PathBuf {
    PathBuf::from("/data/ccmp/means")
}

fn default_lattice_path() -> PathBuf {
    PathBuf::from("config/lattice.yaml")
}

fn default_year() -> i32 {
    1993
}

fn default_window_days() -> u32 {
    7
}

fn default_slots_per_day() -> usize {
    ccmp_common::SLOTS_PER_DAY
}

fn default_tolerance() -> f64 {
    1e-5
}

fn default_trials() -> u64 {
    1000
}

impl Default for ProofreadConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            means_root: default_means_root(),
            lattice_path: default_lattice_path(),
            year: default_year(),
            window_days: default_window_days(),
            alignment: WindowAlignment::default(),
            slot_policy: SlotPolicy::default(),
            slots_per_day: default_slots_per_day(),
            tolerance: default_tolerance(),
            trials: default_trials(),
            seed: None,
        }
    }
}

impl ProofreadConfig {
    /// Load configuration from YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: ProofreadConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ProofreadError> {
        if self.window_days == 0 {
            return Err(ProofreadError::InvalidConfig(
                "window_days must be > 0".to_string(),
            ));
        }
        if self.slots_per_day == 0 {
            return Err(ProofreadError::InvalidConfig(
                "slots_per_day must be > 0".to_string(),
            ));
        }
        if self.tolerance.is_nan() || self.tolerance <= 0.0 {
            return Err(ProofreadError::InvalidConfig(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: ProofreadConfig = serde_yaml::from_str("year: 1993\n").unwrap();
        assert_eq!(config, ProofreadConfig::default());
        assert_eq!(config.window_days, 7);
        assert_eq!(config.slot_policy, SlotPolicy::PerSlot);
        assert_eq!(config.alignment, WindowAlignment::Start);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_enum_spelling() {
        let config: ProofreadConfig =
            serde_yaml::from_str("alignment: centered\nslot_policy: whole_day\nseed: 7\n").unwrap();
        assert_eq!(config.alignment, WindowAlignment::Centered);
        assert_eq!(config.slot_policy, SlotPolicy::WholeDay);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_validate_rejects_degenerate_settings() {
        assert!(ProofreadConfig::default().validate().is_ok());

        let bad = [
            ProofreadConfig { window_days: 0, ..Default::default() },
            ProofreadConfig { slots_per_day: 0, ..Default::default() },
            ProofreadConfig { tolerance: 0.0, ..Default::default() },
            ProofreadConfig { tolerance: f64::NAN, ..Default::default() },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(ProofreadError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_shipped_config_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/proofread.yaml");
        let config = ProofreadConfig::from_file(path).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.trials, 1000);
    }
}
