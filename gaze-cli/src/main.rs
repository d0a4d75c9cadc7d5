//! Gaze CLI Application
//!
//! Command-line front end for the gaze-core library. It adds:
//! - Message search with literal or regex patterns
//! - Fixation filtering by region and time period
//! - Batch processing of many data files from a config file
//! - Report generation (TXT/JSON)

use anyhow::{bail, Context, Result};
use clap::Parser;
use gaze_core::{ContainsMode, Region};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

mod config;
mod report;

use config::{AppConfig, MessageQueryConfig, OutputFormat, QuerySet, RegionQueryConfig};
use report::FileReport;

/// Gaze CLI - Query and summarize eye-tracking recordings
#[derive(Parser, Debug)]
#[command(name = "gaze-cli")]
#[command(about = "Query and summarize eye-tracking event data", long_about = None)]
#[command(version)]
struct Args {
    /// Path to a gaze data file (JSON)
    #[arg(short, long, value_name = "FILE")]
    data: Option<PathBuf>,

    /// Path to configuration file (config.toml) for batch processing
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only report this recording of the data file (default: all)
    #[arg(short, long, value_name = "INDEX")]
    recording: Option<usize>,

    /// Search messages for this pattern (can be repeated)
    #[arg(long, value_name = "PATTERN")]
    find_message: Vec<String>,

    /// Treat --find-message patterns as regular expressions
    #[arg(long)]
    regex: bool,

    /// Filter fixations by region: circle:X,Y,R or rect:LEFT,RIGHT,BOTTOM,TOP
    #[arg(long, value_name = "SHAPE")]
    region: Option<Region>,

    /// Restrict the region filter to fixations starting in T0,T1
    #[arg(long, value_name = "T0,T1", value_parser = parse_period)]
    period: Option<(f64, f64)>,

    /// Accept fixations with any sample in the region (default: all samples)
    #[arg(long)]
    any: bool,

    /// Output file for the report (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Txt)]
    format: OutputFormat,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn parse_period(s: &str) -> std::result::Result<(f64, f64), String> {
    let (t0, t1) = s
        .split_once(',')
        .ok_or_else(|| format!("expected T0,T1, got '{}'", s))?;
    let t0: f64 = t0.trim().parse().map_err(|e| format!("bad T0: {}", e))?;
    let t1: f64 = t1.trim().parse().map_err(|e| format!("bad T1: {}", e))?;
    if t0 > t1 {
        return Err(format!("period start {} is after end {}", t0, t1));
    }
    Ok((t0, t1))
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("Gaze CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using gaze-core library v{}", gaze_core::VERSION);

    if let Some(data_path) = &args.data {
        simple_mode(data_path, &args)?;
    } else if let Some(config_path) = &args.config {
        config_mode(config_path)?;
    } else {
        println!("Gaze CLI - No input specified");
        println!("\nQuick Start:");
        println!("  gaze-cli --data session.json");
        println!("  gaze-cli --data session.json --find-message '^stimulus' --regex");
        println!("  gaze-cli --data session.json --region circle:800,500,200 --period 5000,10000");
        println!("\nFor batch processing:");
        println!("  gaze-cli --config config.toml");
        println!("\nUse --help for more options");
    }

    Ok(())
}

/// Queries described by command line flags
fn queries_from_args(args: &Args) -> QuerySet {
    let messages = args
        .find_message
        .iter()
        .map(|pattern| MessageQueryConfig {
            pattern: pattern.clone(),
            regex: args.regex,
        })
        .collect();

    let regions = args
        .region
        .map(|region| RegionQueryConfig {
            name: "region".to_string(),
            region,
            period: args.period.map(|(t0, t1)| [t0, t1]),
            mode: if args.any { ContainsMode::Any } else { ContainsMode::All },
        })
        .into_iter()
        .collect();

    QuerySet {
        messages,
        regions,
        microsaccade: None,
    }
}

/// Simple mode - load one file, run flag queries, print the report
fn simple_mode(data_path: &Path, args: &Args) -> Result<()> {
    if args.period.is_some() && args.region.is_none() {
        bail!("--period requires --region");
    }

    log::info!("Loading data file: {:?}", data_path);
    let data = gaze_core::load_file(data_path)
        .with_context(|| format!("Failed to load data file: {:?}", data_path))?;
    log::info!("Loaded {} recordings", data.recordings.len());

    let queries = queries_from_args(args);
    let selection = args.recording.map(|i| vec![i]);
    let report = FileReport::build(data_path, &data, selection.as_deref(), &queries)?;
    let rendered = report.render(args.format)?;

    match &args.output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("Failed to write report: {:?}", path))?;
            log::info!("Report written to {:?}", path);
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

/// Config mode - process every configured file in parallel
fn config_mode(config_path: &Path) -> Result<()> {
    log::info!("Loading configuration from: {:?}", config_path);
    let config = config::load_config(config_path)?;
    log::debug!("Configuration loaded successfully");

    if let Some(dir) = &config.output.output_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
    }

    let queries = QuerySet::from(&config);
    let results: Vec<(PathBuf, Result<String>)> = config
        .input
        .files
        .par_iter()
        .map(|path| (path.clone(), process_file(path, &config, &queries)))
        .collect();

    let mut failures = 0;
    for (path, result) in results {
        match result {
            Ok(rendered) => write_report(&path, &rendered, &config)?,
            Err(e) => {
                log::error!("{:?}: {:#}", path, e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} files failed", failures, config.input.files.len());
    }
    Ok(())
}

fn process_file(path: &Path, config: &AppConfig, queries: &QuerySet) -> Result<String> {
    log::info!("Processing {:?}", path);
    let data = gaze_core::load_file(path)
        .with_context(|| format!("Failed to load data file: {:?}", path))?;
    let report = FileReport::build(path, &data, config.input.recordings.as_deref(), queries)?;
    report.render(config.output.format)
}

fn write_report(source: &Path, rendered: &str, config: &AppConfig) -> Result<()> {
    match &config.output.output_dir {
        Some(dir) => {
            let stem = source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "report".to_string());
            let path = dir.join(format!("{}.{}", stem, config.output.format.extension()));
            fs::write(&path, rendered)
                .with_context(|| format!("Failed to write report: {:?}", path))?;
            log::info!("Report written to {:?}", path);
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
