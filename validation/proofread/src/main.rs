//! Proofread CLI: spot-check CCMP yearly means against the daily archive.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use ccmp_common::naming::aggregate_path;
use ccmp_common::{TimeLattice, WindowAlignment};
use netcdf_parser::{AggregateGridFile, DailyGridFile, NetCdfArchive};
use proofread::{CellDump, ProofreadConfig, ResultsReport, RunSummary, SlotPolicy, Validator};

#[derive(Parser)]
#[command(name = "proofread")]
#[command(about = "Compare random daily-file means against a CCMP yearly means file", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run random trials against one year's means file
    Run {
        /// Path to a proofread YAML config
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Root of the daily mirror
        #[arg(long, env = "CCMP_DATA_ROOT")]
        data_root: Option<PathBuf>,

        /// Directory holding ccmp_means_<YYYY>.nc
        #[arg(long, env = "CCMP_MEANS_ROOT")]
        means_root: Option<PathBuf>,

        /// Time lattice table
        #[arg(long, env = "CCMP_LATTICE")]
        lattice: Option<PathBuf>,

        /// Year to check
        #[arg(short, long)]
        year: Option<i32>,

        /// Number of trials (0 runs until Ctrl-C)
        #[arg(short = 'n', long)]
        trials: Option<u64>,

        /// RNG seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Days per bucket window
        #[arg(long)]
        window_days: Option<u32>,

        /// Window placement relative to the bucket date
        #[arg(long, value_enum)]
        alignment: Option<AlignmentArg>,

        /// How sub-daily slots count towards the mean
        #[arg(long, value_enum)]
        slot_policy: Option<SlotPolicyArg>,

        /// Absolute tolerance for mean and count
        #[arg(long)]
        tolerance: Option<f64>,

        /// Also print a line for every skipped trial
        #[arg(long)]
        verbose_skips: bool,

        /// Summary format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },

    /// Print the slot values of one cell in a daily file
    Dump {
        /// Daily NetCDF file
        file: PathBuf,

        /// Exact latitude of the cell
        #[arg(long, default_value_t = -78.375, allow_hyphen_values = true)]
        lat: f64,

        /// Exact longitude of the cell
        #[arg(long, default_value_t = 0.125, allow_hyphen_values = true)]
        lon: f64,
    },

    /// Print a daily file as JSON lines: its metadata, then one record per observed cell
    Records {
        /// Daily NetCDF file
        file: PathBuf,

        /// Latitude row to extract; repeat for several (default: every row)
        #[arg(long)]
        row: Vec<usize>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AlignmentArg {
    Start,
    Centered,
}

impl From<AlignmentArg> for WindowAlignment {
    fn from(arg: AlignmentArg) -> Self {
        match arg {
            AlignmentArg::Start => WindowAlignment::Start,
            AlignmentArg::Centered => WindowAlignment::Centered,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SlotPolicyArg {
    PerSlot,
    WholeDay,
}

impl From<SlotPolicyArg> for SlotPolicy {
    fn from(arg: SlotPolicyArg) -> Self {
        match arg {
            SlotPolicyArg::PerSlot => SlotPolicy::PerSlot,
            SlotPolicyArg::WholeDay => SlotPolicy::WholeDay,
        }
    }
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

    // stdout carries trial lines; logs go to stderr
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

/// Validate and run; blocks until the run ends.
fn run_trials(
    config: &ProofreadConfig,
    verbose_skips: bool,
    stop: &AtomicBool,
) -> Result<RunSummary> {
    let lattice = TimeLattice::from_file(&config.lattice_path).with_context(|| {
        format!(
            "Failed to load time lattice {}",
            config.lattice_path.display()
        )
    })?;
    let buckets = lattice.buckets(config.year)?.to_vec();

    let means = aggregate_path(&config.means_root, config.year);
    let aggregate = AggregateGridFile::open(&means)
        .with_context(|| format!("Failed to open aggregate {}", means.display()))?;
    let archive = NetCdfArchive::new(config.data_root.clone());

    let mut validator = Validator::new(archive, aggregate, buckets, config)?;
    let limit = (config.trials > 0).then_some(config.trials);

    Ok(validator.run_until(limit, stop, |trial| {
        if let Some(line) = ResultsReport::format_line(trial) {
            println!("{}", line);
        } else if verbose_skips {
            if let Some(line) = ResultsReport::format_skip_line(trial) {
                println!("{}", line);
            }
        }
    }))
}

/// Stream metadata and point records of a daily file to stdout.
fn print_records(path: &Path, rows: Vec<usize>) -> Result<()> {
    let grid = DailyGridFile::open(path)
        .with_context(|| format!("Failed to open daily file {}", path.display()))?;
    let metadata = netcdf_parser::file_metadata(&grid)?;

    let rows = if rows.is_empty() {
        (0..grid.coordinates("latitude")?.len()).collect()
    } else {
        rows
    };

    let mut out = BufWriter::new(std::io::stdout().lock());
    serde_json::to_writer(&mut out, &metadata)?;
    writeln!(out)?;

    let mut written = 0usize;
    for lat in rows {
        for record in netcdf_parser::row_records(&grid, lat, &metadata.timeseries)? {
            serde_json::to_writer(&mut out, &record)?;
            writeln!(out)?;
            written += 1;
        }
    }
    out.flush()?;

    info!(file = %path.display(), records = written, "Extracted point records");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format)?;
    netcdf_parser::silence_hdf5_errors();

    match cli.command {
        Commands::Run {
            config,
            data_root,
            means_root,
            lattice,
            year,
            trials,
            seed,
            window_days,
            alignment,
            slot_policy,
            tolerance,
            verbose_skips,
            output,
        } => {
            let mut config = match config {
                Some(path) => ProofreadConfig::from_file(&path)?,
                None => ProofreadConfig::default(),
            };

            // Apply overrides
            if let Some(v) = data_root {
                config.data_root = v;
            }
            if let Some(v) = means_root {
                config.means_root = v;
            }
            if let Some(v) = lattice {
                config.lattice_path = v;
            }
            if let Some(v) = year {
                config.year = v;
            }
            if let Some(v) = trials {
                config.trials = v;
            }
            if seed.is_some() {
                config.seed = seed;
            }
            if let Some(v) = window_days {
                config.window_days = v;
            }
            if let Some(v) = alignment {
                config.alignment = v.into();
            }
            if let Some(v) = slot_policy {
                config.slot_policy = v.into();
            }
            if let Some(v) = tolerance {
                config.tolerance = v;
            }

            config.validate()?;

            info!(
                year = config.year,
                trials = config.trials,
                seed = ?config.seed,
                window_days = config.window_days,
                alignment = ?config.alignment,
                slot_policy = ?config.slot_policy,
                "Starting proofread run"
            );

            let stop = Arc::new(AtomicBool::new(false));
            let stop_signal = stop.clone();
            tokio::spawn(async move {
                tokio::signal::ctrl_c().await.ok();
                warn!("Received shutdown signal, finishing current trial");
                stop_signal.store(true, Ordering::Relaxed);
            });

            let title = config.year.to_string();
            let summary = tokio::task::spawn_blocking(move || {
                run_trials(&config, verbose_skips, &stop)
            })
            .await
            .context("Validation task panicked")??;

            match output {
                OutputFormat::Json => println!("{}", ResultsReport::format_json(&summary)?),
                OutputFormat::Table => println!("{}", ResultsReport::format_table(&title, &summary)),
            }

            if summary.failed > 0 {
                bail!("{} of {} comparisons failed", summary.failed, summary.compared);
            }
            Ok(())
        }
        Commands::Dump { file, lat, lon } => {
            let dump = CellDump::read(&file, lat, lon)
                .with_context(|| format!("Failed to dump {}", file.display()))?;
            print!("{}", dump);
            Ok(())
        }
        Commands::Records { file, row } => print_records(&file, row),
    }
}
