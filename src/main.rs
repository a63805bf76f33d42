// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::app_controller::Controller;
use crate::corpus::SourceDataset;
use crate::file_utils::FileManager;

mod alignment;
mod app_config;
mod app_controller;
mod corpus;
mod diagnostics;
mod errors;
mod file_utils;
mod parser;
mod validation;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse, validate and align translation datasets (default command)
    #[command(alias = "build")]
    Build(BuildArgs),

    /// Generate shell completions for crossverse
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct BuildArgs {
    /// Directory containing one .txt dataset per translation
    #[arg(value_name = "INPUT_DIR")]
    input_dir: PathBuf,

    /// Output directory for crossrefs.json and the diagnostics report
    #[arg(short, long, default_value = "dist")]
    output_dir: PathBuf,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Reference translation code for the alignment skeleton
    #[arg(short, long)]
    reference: Option<String>,

    /// Minimum Jaccard similarity for fallback matches
    #[arg(long)]
    jaccard_threshold: Option<f64>,

    /// Maximum normalized edit-distance ratio for fallback matches
    #[arg(long)]
    levenshtein_threshold: Option<f64>,

    /// Verse-number search window for the fallback pass
    #[arg(short = 'w', long)]
    neighbor_window: Option<u32>,

    /// Abort the build after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// crossverse - cross-version corpus alignment
///
/// Parses book/chapter/verse structured translation datasets, validates
/// them, and aligns every canonical reference across all translations.
#[derive(Parser, Debug)]
#[command(name = "crossverse")]
#[command(version)]
#[command(about = "Cross-version corpus alignment tool")]
#[command(long_about = "crossverse parses translation datasets, validates them and computes a
cross-translation reference map.

EXAMPLES:
    crossverse data/                       # Align all datasets under data/
    crossverse -o site/api data/           # Write output under site/api/
    crossverse -r kjv data/                # Use kjv as the reference skeleton
    crossverse --jaccard-threshold 0.8 data/
    crossverse --log-level debug data/     # Verbose build logging
    crossverse completions bash > crossverse.bash

CONFIGURATION:
    Configuration is read from conf.json by default. You can specify a
    different config file with --config-path. Missing fields fall back to
    the documented defaults; command line options override the file.

DATASETS:
    Each translation is one .txt file in the input directory; the file
    stem is the translation code (kjv.txt -> \"kjv\").")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory containing one .txt dataset per translation
    #[arg(value_name = "INPUT_DIR")]
    input_dir: Option<PathBuf>,

    /// Output directory for crossrefs.json and the diagnostics report
    #[arg(short, long, default_value = "dist")]
    output_dir: PathBuf,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Reference translation code for the alignment skeleton
    #[arg(short, long)]
    reference: Option<String>,

    /// Minimum Jaccard similarity for fallback matches
    #[arg(long)]
    jaccard_threshold: Option<f64>,

    /// Maximum normalized edit-distance ratio for fallback matches
    #[arg(long)]
    levenshtein_threshold: Option<f64>,

    /// Verse-number search window for the fallback pass
    #[arg(short = 'w', long)]
    neighbor_window: Option<u32>,

    /// Abort the build after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::color_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:5} {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default; the level
    // is updated after the config is loaded if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "crossverse", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Build(args)) => run_build(args).await,
        None => {
            // Default behavior - use top-level args
            let input_dir = cli
                .input_dir
                .ok_or_else(|| anyhow!("INPUT_DIR is required when no subcommand is specified"))?;
            let args = BuildArgs {
                input_dir,
                output_dir: cli.output_dir,
                config_path: cli.config_path,
                reference: cli.reference,
                jaccard_threshold: cli.jaccard_threshold,
                levenshtein_threshold: cli.levenshtein_threshold,
                neighbor_window: cli.neighbor_window,
                timeout_secs: cli.timeout_secs,
                log_level: cli.log_level,
            };
            run_build(args).await
        }
    }
}

async fn run_build(options: BuildArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    // Load configuration, then apply CLI overrides
    let mut config = if Path::new(&options.config_path).exists() {
        Config::from_file(&options.config_path)
            .with_context(|| format!("Failed to load config: {}", options.config_path))?
    } else {
        Config::default()
    };

    if let Some(reference) = options.reference {
        config.alignment.reference_translation = Some(reference);
    }
    if let Some(threshold) = options.jaccard_threshold {
        config.alignment.jaccard_threshold = threshold;
    }
    if let Some(threshold) = options.levenshtein_threshold {
        config.alignment.levenshtein_threshold = threshold;
    }
    if let Some(window) = options.neighbor_window {
        config.alignment.neighbor_window = window;
    }
    if let Some(secs) = options.timeout_secs {
        config.build_timeout_secs = Some(secs);
    }
    if let Some(level) = options.log_level {
        config.log_level = level.into();
    }
    log::set_max_level(config.log_level.to_level_filter());
    config.validate()?;

    // Discover datasets: one .txt file per translation
    if !FileManager::dir_exists(&options.input_dir) {
        return Err(anyhow!("Input directory does not exist: {:?}", options.input_dir));
    }
    let files = FileManager::find_files(&options.input_dir, "txt")?;
    if files.is_empty() {
        return Err(anyhow!("No .txt datasets found in {:?}", options.input_dir));
    }

    let mut datasets = Vec::with_capacity(files.len());
    for file in &files {
        let code = FileManager::dataset_code(file)?;
        let raw = FileManager::read_to_string(file)?;
        datasets.push(SourceDataset::new(code, raw));
    }
    info!("found {} datasets in {:?}", datasets.len(), options.input_dir);

    let progress = ProgressBar::new(datasets.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    progress.set_message("parsing and validating");

    let controller = Controller::with_config(config)?;
    let output = controller
        .build_with_progress(datasets, Some(&progress))
        .await?;
    progress.finish_with_message("done");

    // Write outputs
    FileManager::ensure_dir(&options.output_dir)?;

    if let Some(crossrefs) = &output.crossrefs {
        let json = crossrefs.to_canonical_json()?;
        let path = options.output_dir.join("crossrefs.json");
        FileManager::write_to_file(&path, &json)?;
        info!("wrote cross-reference map to {:?}", path);
    } else {
        warn!("no cross-reference map produced");
    }

    let report = output.diagnostics.report(output.stats());
    let report_json =
        serde_json::to_string_pretty(&report).context("Failed to serialize diagnostic report")?;
    let report_path = options
        .output_dir
        .join(format!("diagnostics-{}.json", report.build_id));
    FileManager::write_to_file(&report_path, &report_json)?;
    info!(
        "build finished: {} errors, {} warnings, report at {:?}",
        report.summary.errors, report.summary.warnings, report_path
    );

    if output.timed_out {
        return Err(anyhow!("build timed out; partial diagnostics written"));
    }
    Ok(())
}
