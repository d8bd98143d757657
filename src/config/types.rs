//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument
//! parsing and library configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{CACHE_CAPACITY, CONCURRENT_SCAN_LIMIT, DEFAULT_SCAN_BUDGET};

/// Logging level for the application.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration (no CLI dependencies).
///
/// This is the core configuration struct used by the library. It can be
/// constructed programmatically without any CLI dependencies.
///
/// # Examples
///
/// ```no_run
/// use media_sentry::Config;
/// use std::time::Duration;
///
/// let config = Config {
///     scan_budget: Duration::from_millis(3000),
///     max_concurrent_scans: 2,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Wall-clock budget for a single scan
    pub scan_budget: Duration,

    /// Maximum scans running concurrently (fair FIFO queue beyond this)
    pub max_concurrent_scans: usize,

    /// Result cache capacity (LRU)
    pub cache_capacity: usize,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Disable the result cache entirely
    pub no_cache: bool,

    /// Show detailed timing metrics at the end of a batch run
    pub show_timing: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan_budget: DEFAULT_SCAN_BUDGET,
            max_concurrent_scans: CONCURRENT_SCAN_LIMIT,
            cache_capacity: CACHE_CAPACITY,
            user_agent: format!("media_sentry/{}", env!("CARGO_PKG_VERSION")),
            no_cache: false,
            show_timing: false,
        }
    }
}

/// Command-line options for the `media_sentry` binary.
#[derive(Debug, Parser)]
#[command(
    name = "media_sentry",
    about = "Scans media URLs and assigns authenticity verdicts (safe / warning / danger)"
)]
pub struct Opt {
    /// File containing media URLs, one per line ("-" reads from stdin)
    pub file: PathBuf,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value = "plain")]
    pub log_format: LogFormat,

    /// Per-scan wall-clock budget in milliseconds
    #[arg(long, default_value_t = DEFAULT_SCAN_BUDGET.as_millis() as u64)]
    pub budget_ms: u64,

    /// Maximum concurrent scans
    #[arg(long, default_value_t = CONCURRENT_SCAN_LIMIT)]
    pub max_concurrency: usize,

    /// Disable the scan-result cache
    #[arg(long)]
    pub no_cache: bool,

    /// Write flat scan records to this file as JSON Lines
    #[arg(long)]
    pub export_jsonl: Option<PathBuf>,

    /// Show detailed timing metrics at the end of the run
    #[arg(long)]
    pub show_timing: bool,
}

impl From<&Opt> for Config {
    fn from(opt: &Opt) -> Self {
        Config {
            scan_budget: Duration::from_millis(opt.budget_ms),
            max_concurrent_scans: opt.max_concurrency,
            no_cache: opt.no_cache,
            show_timing: opt.show_timing,
            ..Default::default()
        }
    }
}
