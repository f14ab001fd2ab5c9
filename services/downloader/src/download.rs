//! Sequential download of CCMP daily files.
//!
//! Each file is streamed to `<filename>.partial` next to its final path and
//! renamed only after the body has been written completely, so an
//! interrupted or failed transfer never leaves a truncated file where the
//! validator would pick it up.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use futures::StreamExt;
use reqwest::{Client, Response};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

use ccmp_common::naming::{daily_filename, daily_path, daily_url};

use crate::config::{Credentials, FetchConfig};

/// Result of fetching a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Downloaded { bytes: u64 },
    /// The file already existed and `overwrite` is off.
    Skipped,
}

/// Totals for a fetch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub downloaded: usize,
    pub skipped: usize,
    /// File names that could not be fetched.
    pub failed: Vec<String>,
    pub bytes: u64,
}

impl FetchSummary {
    pub fn total(&self) -> usize {
        self.downloaded + self.skipped + self.failed.len()
    }
}

/// Fetches daily files from the remote archive into the local mirror.
pub struct DownloadManager {
    client: Client,
    config: FetchConfig,
    credentials: Option<Credentials>,
}

impl DownloadManager {
    pub fn new(config: FetchConfig, credentials: Option<Credentials>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            config,
            credentials,
        })
    }

    pub fn url_for(&self, date: NaiveDate) -> String {
        daily_url(&self.config.base_url, date)
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        daily_path(&self.config.root, date)
    }

    /// Fetch one day unless it is already present locally.
    #[instrument(skip(self), fields(date = %date))]
    pub async fn fetch_day(&self, date: NaiveDate) -> Result<FetchOutcome> {
        let url = self.url_for(date);
        let final_path = self.path_for(date);

        if !self.config.overwrite && fs::try_exists(&final_path).await.unwrap_or(false) {
            debug!(path = %final_path.display(), "File already exists, skipping download");
            return Ok(FetchOutcome::Skipped);
        }

        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        info!(url = %url, "Starting download");
        let bytes = self.download(&url, &final_path).await?;
        info!(path = %final_path.display(), bytes, "Download completed");

        Ok(FetchOutcome::Downloaded { bytes })
    }

    /// Fetch every day in order. A failed day is reported and the run moves on.
    pub async fn fetch_all(&self, days: &[NaiveDate]) -> FetchSummary {
        let mut summary = FetchSummary::default();

        for &date in days {
            match self.fetch_day(date).await {
                Ok(FetchOutcome::Downloaded { bytes }) => {
                    summary.downloaded += 1;
                    summary.bytes += bytes;
                }
                Ok(FetchOutcome::Skipped) => summary.skipped += 1,
                Err(e) => {
                    let filename = daily_filename(date);
                    warn!(file = %filename, error = %format!("{:#}", e), "Download failed");
                    println!("failed {}", filename);
                    summary.failed.push(filename);
                }
            }
        }

        summary
    }

    /// GET `url` into `final_path` through a `.partial` sibling.
    async fn download(&self, url: &str, final_path: &Path) -> Result<u64> {
        let mut request = self.client.get(url);
        if let Some(creds) = &self.credentials {
            request = request.basic_auth(&creds.user, Some(&creds.pass));
        }

        let response = request.send().await.context("HTTP request failed")?;
        let status = response.status();
        if !status.is_success() {
            bail!("HTTP error: {}", status);
        }

        let partial = partial_path(final_path);
        match stream_to_file(response, &partial).await {
            Ok(bytes) => {
                fs::rename(&partial, final_path).await.with_context(|| {
                    format!("Failed to move download into {}", final_path.display())
                })?;
                Ok(bytes)
            }
            Err(e) => {
                fs::remove_file(&partial).await.ok();
                Err(e)
            }
        }
    }
}

/// `<final path>.partial`
pub fn partial_path(final_path: &Path) -> PathBuf {
    let mut name = final_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    final_path.with_file_name(name)
}

/// Stream a response body to `path`, checking Content-Length when given.
async fn stream_to_file(response: Response, path: &Path) -> Result<u64> {
    let expected = response.content_length();

    let mut file = File::create(path)
        .await
        .with_context(|| format!("Failed to open output file {}", path.display()))?;

    let mut written = 0u64;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("Error reading response chunk")?;
        file.write_all(&chunk)
            .await
            .context("Error writing to file")?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    file.sync_all().await?;

    if let Some(expected) = expected {
        if written != expected {
            bail!(
                "Download size mismatch: expected {} bytes, got {}",
                expected,
                written
            );
        }
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    use axum::extract::State;
    use axum::http::{header, HeaderMap, StatusCode, Uri};
    use axum::response::{IntoResponse, Response as AxumResponse};
    use axum::Router;
    use ccmp_common::naming::daily_relative_path;

    #[derive(Clone, Default)]
    struct Archive {
        files: Arc<HashMap<String, Vec<u8>>>,
        required_auth: Option<String>,
    }

    async fn serve(State(archive): State<Archive>, uri: Uri, headers: HeaderMap) -> AxumResponse {
        if let Some(expected) = &archive.required_auth {
            let given = headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok());
            if given != Some(expected.as_str()) {
                return StatusCode::UNAUTHORIZED.into_response();
            }
        }
        match archive.files.get(uri.path()) {
            Some(body) => (StatusCode::OK, body.clone()).into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        }
    }

    /// Serve `files` (keyed by URL path) on an ephemeral port; returns the base URL.
    async fn spawn_archive(files: Vec<(NaiveDate, &[u8])>, required_auth: Option<&str>) -> String {
        let files: HashMap<String, Vec<u8>> = files
            .into_iter()
            .map(|(date, body)| (format!("/ccmp/{}", daily_relative_path(date)), body.to_vec()))
            .collect();
        let archive = Archive {
            files: Arc::new(files),
            required_auth: required_auth.map(str::to_string),
        };
        let app = Router::new().fallback(serve).with_state(archive);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        format!("http://{}/ccmp", addr)
    }

    fn manager(base_url: String, root: &Path, overwrite: bool) -> DownloadManager {
        let config = FetchConfig {
            base_url,
            root: root.to_path_buf(),
            request_timeout_secs: 10,
            overwrite,
        };
        DownloadManager::new(config, None).unwrap()
    }

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(1993, 1, day).unwrap()
    }

    #[test]
    fn test_url_and_path_layout() {
        let dm = manager(
            "https://data.remss.com/ccmp/v03.0/daily/".into(),
            Path::new("/mirror"),
            false,
        );
        assert_eq!(
            dm.url_for(jan(17)),
            "https://data.remss.com/ccmp/v03.0/daily/y1993/m01/CCMP_Wind_Analysis_19930117_V03.0_L4.0.nc"
        );
        assert_eq!(
            dm.path_for(jan(17)),
            PathBuf::from("/mirror/y1993/m01/CCMP_Wind_Analysis_19930117_V03.0_L4.0.nc")
        );
    }

    #[test]
    fn test_partial_path_is_sibling() {
        let path = Path::new("/mirror/y1993/m01/a.nc");
        assert_eq!(partial_path(path), PathBuf::from("/mirror/y1993/m01/a.nc.partial"));
    }

    #[tokio::test]
    async fn test_downloads_into_month_directory() {
        let base = spawn_archive(vec![(jan(17), b"netcdf-bytes")], None).await;
        let dir = tempfile::tempdir().unwrap();
        let dm = manager(base, dir.path(), false);

        let outcome = dm.fetch_day(jan(17)).await.unwrap();
        assert_eq!(outcome, FetchOutcome::Downloaded { bytes: 12 });

        let path = dm.path_for(jan(17));
        assert_eq!(std::fs::read(&path).unwrap(), b"netcdf-bytes");
        assert!(!partial_path(&path).exists());
    }

    #[tokio::test]
    async fn test_existing_file_is_skipped_unless_overwrite() {
        let base = spawn_archive(vec![(jan(17), b"fresh")], None).await;
        let dir = tempfile::tempdir().unwrap();

        let dm = manager(base.clone(), dir.path(), false);
        let path = dm.path_for(jan(17));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"stale").unwrap();

        assert_eq!(dm.fetch_day(jan(17)).await.unwrap(), FetchOutcome::Skipped);
        assert_eq!(std::fs::read(&path).unwrap(), b"stale");

        let dm = manager(base, dir.path(), true);
        let outcome = tokio_test::assert_ok!(dm.fetch_day(jan(17)).await);
        assert!(matches!(outcome, FetchOutcome::Downloaded { .. }));
        assert_eq!(std::fs::read(&path).unwrap(), b"fresh");
    }

    #[tokio::test]
    async fn test_failure_is_recorded_and_run_continues() {
        let base = spawn_archive(vec![(jan(18), b"day18")], None).await;
        let dir = tempfile::tempdir().unwrap();
        let dm = manager(base, dir.path(), false);

        let summary = dm.fetch_all(&[jan(17), jan(18)]).await;
        assert_eq!(summary.downloaded, 1);
        assert_eq!(summary.failed, vec![daily_filename(jan(17))]);
        assert_eq!(summary.total(), 2);

        let missing = dm.path_for(jan(17));
        assert!(!missing.exists());
        assert!(!partial_path(&missing).exists());
        assert!(dm.path_for(jan(18)).exists());
    }

    #[tokio::test]
    async fn test_basic_auth_is_sent() {
        // base64("user:pass")
        let base = spawn_archive(vec![(jan(17), b"secret")], Some("Basic dXNlcjpwYXNz")).await;
        let dir = tempfile::tempdir().unwrap();

        let anonymous = manager(base.clone(), dir.path(), false);
        assert!(anonymous.fetch_day(jan(17)).await.is_err());

        let config = FetchConfig {
            base_url: base,
            root: dir.path().to_path_buf(),
            request_timeout_secs: 10,
            overwrite: false,
        };
        let creds = Credentials::from_parts(Some("user".into()), Some("pass".into()));
        let dm = DownloadManager::new(config, creds).unwrap();
        assert_eq!(
            dm.fetch_day(jan(17)).await.unwrap(),
            FetchOutcome::Downloaded { bytes: 6 }
        );
    }
}
