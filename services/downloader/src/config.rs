//! Fetcher configuration.
//!
//! Settings come from an optional YAML file (see `config/fetch.yaml`) and are
//! then overridden by command-line flags and `CCMP_*` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::info;

use ccmp_common::naming::DEFAULT_BASE_URL;

/// Where to fetch from, where to store, and how.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FetchConfig {
    /// Remote archive root; daily files live under `y<YYYY>/m<MM>/`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Local mirror root.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Re-download files that already exist locally.
    #[serde(default)]
    pub overwrite: bool,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_root() -> PathBuf {
    PathBuf::from("/data/ccmp/daily")
}

fn default_request_timeout_secs() -> u64 {
    600
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            root: default_root(),
            request_timeout_secs: default_request_timeout_secs(),
            overwrite: false,
        }
    }
}

impl FetchConfig {
    /// Load a fetch config from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: FetchConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        info!(path = %path.display(), base_url = %config.base_url, "Loaded fetch config");
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            bail!("base_url must be an http(s) URL, got '{}'", self.base_url);
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be positive");
        }
        Ok(())
    }
}

/// HTTP basic-auth credentials for the archive.
#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub user: String,
    pub pass: String,
}

impl Credentials {
    /// Credentials are used only when both halves are present.
    pub fn from_parts(user: Option<String>, pass: Option<String>) -> Option<Self> {
        match (user, pass) {
            (Some(user), Some(pass)) if !user.is_empty() => Some(Self { user, pass }),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("pass", &"***")
            .finish()
    }
}
