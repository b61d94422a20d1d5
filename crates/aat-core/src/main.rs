//! Anticipatory Action Triggers - CLI front end.
//!
//! The binary is a thin file-in/table-out wrapper: it loads the YAML
//! configuration and the exported dataset, hands both to the pure engine,
//! and prints the resulting tables. stdout carries payloads, stderr carries
//! logs and error reports.

use aat_common::{format_error_human, Error, OutputFormat, Result, SCHEMA_VERSION};
use aat_core::adapt::{adapt, AdaptedDataset, RawRecord};
use aat_core::analyze::{quantile_report, ValueSource};
use aat_core::classify::classify;
use aat_core::config::{AnalysisConfig, Grouping};
use aat_core::exit_codes::ExitCode;
use aat_core::logging::{generate_run_id, init_logging, LogConfig, LogLevel};
use aat_core::output::{render_check, render_quantiles, render_sweep};
use aat_core::sweep::sweep;
use clap::{Args, Parser, Subcommand};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Anticipatory Action Triggers - trigger evaluation and scoring engine
#[derive(Parser)]
#[command(name = "aat-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to the YAML analysis configuration
    #[arg(long, global = true, env = "AAT_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the exported dataset (JSON records)
    #[arg(long, global = true, env = "AAT_DATASET")]
    dataset: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the frequency sweep and print outcome and metrics tables
    Sweep,

    /// Classify at one frequency and print per-group quantile tables
    Quantiles(QuantilesArgs),

    /// Validate configuration without running anything
    Check,

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct QuantilesArgs {
    /// Trigger frequency (percent) to classify at
    #[arg(long)]
    frequency: f64,

    /// Quantile probabilities in [0, 1]
    #[arg(long, value_delimiter = ',', default_values_t = [0.0, 0.25, 0.5, 0.75, 1.0])]
    probs: Vec<f64>,

    /// Grouping level to analyze
    #[arg(long, value_enum, default_value_t = Grouping::National)]
    grouping: Grouping,

    /// Analyze trigger differences instead of raw predictor values
    #[arg(long)]
    trigger_difference: bool,
}

fn main() {
    let cli = Cli::parse();
    let level = resolve_level(cli.global.verbose, cli.global.quiet);
    init_logging(&LogConfig::from_env(level, None));
    let run_id = generate_run_id();

    match run(&cli, &run_id) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            let use_color = !cli.global.no_color && std::io::stderr().is_terminal();
            eprintln!("{}", format_error_human(&err, use_color));
            std::process::exit(ExitCode::from_error(&err).as_i32());
        }
    }
}

fn resolve_level(verbose: u8, quiet: bool) -> Option<LogLevel> {
    if quiet {
        return Some(LogLevel::Error);
    }
    match verbose {
        0 => None,
        1 => Some(LogLevel::Debug),
        _ => Some(LogLevel::Trace),
    }
}

fn require_path<'a>(path: &'a Option<PathBuf>, flag: &str) -> Result<&'a Path> {
    path.as_deref()
        .ok_or_else(|| Error::Config(format!("missing {flag} <path>")))
}

fn load_inputs(global: &GlobalOpts, run_id: &str) -> Result<(AnalysisConfig, AdaptedDataset)> {
    let config_path = require_path(&global.config, "--config")?;
    let dataset_path = require_path(&global.dataset, "--dataset")?;

    let config = AnalysisConfig::load(config_path)?;
    let text = std::fs::read_to_string(dataset_path)?;
    let records: Vec<RawRecord> = serde_json::from_str(&text)?;
    let adapted = adapt(&records, &config.dataset, &config.filters)?;

    tracing::info!(
        run_id,
        observations = adapted.observations.len(),
        excluded = adapted.excluded.total(),
        missing_predictor = adapted.excluded.missing_predictor,
        unit_not_allowed = adapted.excluded.unit_not_allowed,
        upcoming_season = adapted.excluded.upcoming_season,
        "dataset adapted"
    );

    Ok((config, adapted))
}

fn run(cli: &Cli, run_id: &str) -> Result<ExitCode> {
    match &cli.command {
        Commands::Sweep => {
            let (config, adapted) = load_inputs(&cli.global, run_id)?;
            let report = sweep(&adapted.observations, &config)?;
            tracing::info!(
                run_id,
                tables = report.tables.len(),
                failed_partitions = report.failures.len(),
                "sweep complete"
            );
            println!("{}", render_sweep(&report, cli.global.format)?);
            Ok(if report.summary.all_succeeded {
                ExitCode::Clean
            } else {
                ExitCode::Partial
            })
        }

        Commands::Quantiles(args) => {
            let (config, adapted) = load_inputs(&cli.global, run_id)?;
            let tables = classify(
                &adapted.observations,
                args.frequency,
                args.grouping,
                &config.trigger,
            )?;
            let source = if args.trigger_difference {
                ValueSource::TriggerDifference
            } else {
                ValueSource::Predictor
            };
            let report = quantile_report(&tables, &args.probs, args.frequency, source)?;
            println!("{}", render_quantiles(&report, cli.global.format)?);
            Ok(ExitCode::Clean)
        }

        Commands::Check => {
            let config_path = require_path(&cli.global.config, "--config")?;
            AnalysisConfig::load(config_path)?;
            println!(
                "{}",
                render_check(&config_path.display().to_string(), cli.global.format)
            );
            Ok(ExitCode::Clean)
        }

        Commands::Version => {
            println!("aat-core {} (schema {})", env!("CARGO_PKG_VERSION"), SCHEMA_VERSION);
            Ok(ExitCode::Clean)
        }
    }
}
