//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `media_sentry` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use media_sentry::initialization::init_logger_with;
use media_sentry::{run_batch, Opt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env when present
    let _ = dotenvy::dotenv();

    let opt = Opt::parse();

    let log_level = opt.log_level.clone();
    let log_format = opt.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    match run_batch(&opt).await {
        Ok(report) => {
            println!(
                "Scanned {} URL{} in {:.1}s: {} safe, {} warning, {} danger",
                report.total,
                if report.total == 1 { "" } else { "s" },
                report.elapsed_seconds,
                report.safe,
                report.warning,
                report.danger
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("media_sentry error: {:#}", e);
            process::exit(1);
        }
    }
}
