use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, ValueEnum};

use flightdata_rs::config::{AdapterConfig, AircraftProfile};
use flightdata_rs::export;
use flightdata_rs::{NormalizedResult, SourceFormat};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    /// Structured time-series container dump (.json / .json.gz)
    Container,
    /// Topic-based binary log dump (.json / .json.gz)
    Binlog,
    /// Directory of CSV stream files
    Delimited,
}

impl From<FormatArg> for SourceFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Container => SourceFormat::Container,
            FormatArg::Binlog => SourceFormat::Binlog,
            FormatArg::Delimited => SourceFormat::Delimited,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "flightdata")]
#[command(about = "Normalize flight-test logs into common telemetry streams", long_about = None)]
struct Args {
    /// Source format
    #[arg(value_enum)]
    format: FormatArg,

    /// Container/log file, or flight directory for delimited logs
    path: PathBuf,

    /// Adapter configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Built-in aircraft profile (none, mjolner); overrides the config file
    #[arg(long)]
    profile: Option<String>,

    /// Alternate IMU calibration applied after backing out the logged one
    #[arg(long)]
    recalibrate: Option<PathBuf>,

    /// Write all streams as JSON (gzip when the name ends in .gz)
    #[arg(long, value_name = "OUT")]
    json: Option<PathBuf>,

    /// Write imu-0.txt / gps-0.txt / filter-0.txt summaries into this directory
    #[arg(long, value_name = "DIR")]
    summaries: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn ts_now() -> String {
    Utc::now().format("%H:%M:%S").to_string()
}

fn print_streams(result: &NormalizedResult) {
    println!("{:<12} {:>9} {:>12} {:>12}", "stream", "records", "start (s)", "end (s)");
    for (kind, stream) in result.iter() {
        match stream.time_span() {
            Some((start, end)) => println!(
                "{:<12} {:>9} {:>12.3} {:>12.3}",
                kind.as_str(),
                stream.len(),
                start,
                end
            ),
            None => println!("{:<12} {:>9} {:>12} {:>12}", kind.as_str(), 0, "-", "-"),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config = match &args.config {
        Some(path) => AdapterConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AdapterConfig::default(),
    };
    if let Some(name) = &args.profile {
        match AircraftProfile::builtin(name) {
            Some(profile) => config.profile = profile,
            None => bail!("Unknown aircraft profile '{}'", name),
        }
    }

    let format = SourceFormat::from(args.format);
    println!("[{}] Loading {} from {}", ts_now(), format, args.path.display());

    let result = flightdata_rs::load(format, &args.path, &config, args.recalibrate.as_deref())
        .with_context(|| format!("Failed to load {}", args.path.display()))?;

    print_streams(&result);

    if let Some(dir) = &args.summaries {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        export::write_summaries(&result, dir).context("Failed to write summaries")?;
    }

    if let Some(out) = &args.json {
        export::write_json(&result, out)
            .with_context(|| format!("Failed to write {}", out.display()))?;
        println!("[{}] Saved {}", ts_now(), out.display());
    }

    Ok(())
}
