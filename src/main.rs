// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::too_many_arguments)]
// Add other lints specific to this module that you want to allow but not auto-fix

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::fs::File;
use std::io::BufReader;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::aligner::remote::RemoteAligner;
use crate::alignment_service::AlignmentService;
use crate::app_config::Config;
use crate::file_utils::FileManager;

mod aligner;
mod alignment_service;
mod app_config;
mod errors;
mod file_utils;
mod language_utils;
mod tei;
mod text_cleaner;
mod xml_tree;

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

/// teialign - TEI alignment projection
///
/// Aligns two parallel TEI documents through an alignment service and writes
/// a teiCorpus combining both documents with standoff links between the
/// aligned spans.
#[derive(Parser, Debug)]
#[command(name = "teialign")]
#[command(version = "0.2.0")]
#[command(about = "TEI parallel text alignment tool")]
#[command(long_about = "teialign aligns two parallel TEI documents and produces a teiCorpus
with standoff links between the aligned text spans.

EXAMPLES:
    teialign source.xml target.xml                   # Align using default config
    teialign -s en -t fr source.xml target.xml       # Override document languages
    teialign -o corpus.xml source.xml target.xml     # Write to a specific file
    teialign -e http://aligner:8000 source.xml target.xml
    teialign --log-level debug source.xml target.xml

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    /// Source TEI document
    #[arg(value_name = "SOURCE_FILE")]
    source_file: PathBuf,

    /// Target TEI document
    #[arg(value_name = "TARGET_FILE")]
    target_file: PathBuf,

    /// Output file for the aligned corpus (defaults to <source>.aligned.xml)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Source language code (e.g., 'en', 'es', 'fr'); overrides document metadata
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'en', 'es', 'fr'); overrides document metadata
    #[arg(short, long)]
    target_language: Option<String>,

    /// Aligner service endpoint
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

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

    // @returns: ANSI color code for log level
    fn get_color_for_level(level: Level) -> &'static str {
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
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let color = Self::get_color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {}\x1B[0m", color, now, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let options = CommandLineOptions::parse();

    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level_filter(&config_log_level));
    }

    // Load or create configuration
    let config_path = &options.config_path;
    let mut config = if Path::new(config_path).exists() {
        // Load existing configuration
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?;

        config
    } else {
        // Create default configuration if not exists
        warn!(
            "Config file not found at '{}', creating default config.",
            config_path
        );

        let config = Config::default();

        // Save default config
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    // Override config with CLI options if provided
    if let Some(source_lang) = &options.source_language {
        config.source_language = Some(source_lang.clone());
    }
    if let Some(target_lang) = &options.target_language {
        config.target_language = Some(target_lang.clone());
    }
    if let Some(endpoint) = &options.endpoint {
        config.aligner.endpoint = endpoint.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    // Validate the configuration after loading and overriding
    config
        .validate()
        .context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        // Just update the max level without reinitializing the logger
        log::set_max_level(level_filter(&config.log_level));
    }

    run_align(options, config).await
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

async fn run_align(options: CommandLineOptions, config: Config) -> Result<()> {
    if !FileManager::file_exists(&options.source_file) {
        return Err(anyhow!("Source file does not exist: {:?}", options.source_file));
    }
    if !FileManager::file_exists(&options.target_file) {
        return Err(anyhow!("Target file does not exist: {:?}", options.target_file));
    }

    let source_xml = FileManager::read_to_string(&options.source_file)?;
    let target_xml = FileManager::read_to_string(&options.target_file)?;

    if !FileManager::looks_like_tei(&source_xml) {
        warn!("Source file does not look like XML: {:?}", options.source_file);
    }
    if !FileManager::looks_like_tei(&target_xml) {
        warn!("Target file does not look like XML: {:?}", options.target_file);
    }

    let aligner = Arc::new(RemoteAligner::new(
        &config.aligner.endpoint,
        config.aligner.timeout_secs,
    ));
    let service = AlignmentService::new(aligner);

    info!(
        "Aligning {:?} and {:?} via {}",
        options.source_file, options.target_file, config.aligner.endpoint
    );

    let result = service
        .align_tei_documents(
            &source_xml,
            &target_xml,
            config.source_language.as_deref(),
            config.target_language.as_deref(),
            &config.aligner.params,
        )
        .await
        .map_err(|e| anyhow!("Alignment failed: {}", e))?;

    let output_path = options
        .output
        .clone()
        .unwrap_or_else(|| FileManager::generate_output_path(&options.source_file, "aligned"));

    FileManager::write_to_file(&output_path, &result.aligned_xml)?;

    info!(
        "Wrote {} alignment links ({} -> {}) to {:?} in {:.2}s",
        result.alignment_count,
        result.source_language,
        result.target_language,
        output_path,
        result.processing_time
    );

    Ok(())
}
