//! CCMP archive fetcher.
//!
//! Downloads daily wind analysis files from the Remote Sensing Systems
//! archive into a local mirror laid out as `<root>/y<YYYY>/m<MM>/`:
//! - one file per calendar day, fetched sequentially
//! - existing files are kept unless `--overwrite` is given
//! - a failed day is reported as `failed <filename>` and the run continues

mod config;
mod download;
mod plan;

use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use ccmp_common::naming::daily_url;
use config::{Credentials, FetchConfig};
use download::DownloadManager;

#[derive(Parser, Debug)]
#[command(name = "downloader")]
#[command(about = "Fetch CCMP daily wind files into a local y<YYYY>/m<MM>/ mirror")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// YAML fetch config (base_url, root, request_timeout_secs, overwrite)
    #[arg(long, global = true, env = "CCMP_FETCH_CONFIG")]
    config: Option<PathBuf>,

    /// Remote archive root
    #[arg(long, global = true, env = "CCMP_BASE_URL")]
    base_url: Option<String>,

    /// Local mirror root
    #[arg(long, global = true, env = "CCMP_DATA_ROOT")]
    root: Option<PathBuf>,

    /// Re-download files that already exist
    #[arg(long, global = true)]
    overwrite: bool,

    /// HTTP request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Archive user name (HTTP basic auth)
    #[arg(long, global = true, env = "CCMP_USER")]
    user: Option<String>,

    /// Archive password (HTTP basic auth)
    #[arg(long, global = true, env = "CCMP_PASS", hide_env_values = true)]
    pass: Option<String>,

    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a single day
    Day { year: i32, month: u32, day: u32 },

    /// Fetch every day of a month
    Month { year: i32, month: u32 },

    /// Fetch every day of a year
    Year {
        year: i32,

        /// First month to fetch
        #[arg(long, default_value_t = 1)]
        from_month: u32,
    },

    /// Fetch an inclusive range of days (YYYY-MM-DD)
    Range { start: NaiveDate, end: NaiveDate },

    /// Print the remote URLs of an inclusive range without fetching
    Urls { start: NaiveDate, end: NaiveDate },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_tracing(log_level: &str, format: LogFormat) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish())?,
    }
    Ok(())
}

fn resolve_config(args: &Args) -> Result<FetchConfig> {
    let mut config = match &args.config {
        Some(path) => FetchConfig::load(path)?,
        None => FetchConfig::default(),
    };

    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(root) = &args.root {
        config.root = root.clone();
    }
    if let Some(secs) = args.timeout_secs {
        config.request_timeout_secs = secs;
    }
    config.overwrite |= args.overwrite;

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.log_format)?;

    let config = resolve_config(&args)?;

    let days = match &args.command {
        Command::Day { year, month, day } => plan::single_day(*year, *month, *day)?,
        Command::Month { year, month } => plan::month(*year, *month)?,
        Command::Year { year, from_month } => plan::year(*year, *from_month)?,
        Command::Range { start, end } => plan::range(*start, *end)?,
        Command::Urls { start, end } => {
            for date in plan::range(*start, *end)? {
                println!("{}", daily_url(&config.base_url, date));
            }
            return Ok(());
        }
    };

    info!(
        days = days.len(),
        base_url = %config.base_url,
        root = %config.root.display(),
        overwrite = config.overwrite,
        "Starting CCMP fetch"
    );

    let credentials = Credentials::from_parts(args.user.clone(), args.pass.clone());
    let manager = DownloadManager::new(config, credentials)?;

    let summary = tokio::select! {
        summary = manager.fetch_all(&days) => summary,
        _ = tokio::signal::ctrl_c() => {
            warn!("Received shutdown signal, stopping fetch");
            bail!("fetch interrupted");
        }
    };

    info!(
        downloaded = summary.downloaded,
        skipped = summary.skipped,
        failed = summary.failed.len(),
        total_bytes = summary.bytes,
        "Fetch session complete"
    );
    println!(
        "downloaded {} skipped {} failed {} ({} bytes)",
        summary.downloaded,
        summary.skipped,
        summary.failed.len(),
        summary.bytes
    );

    if !summary.failed.is_empty() {
        bail!("{} of {} files failed", summary.failed.len(), summary.total());
    }
    Ok(())
}
