//! Batch scanning over a URL list.
//!
//! Reads URLs from a file (or stdin), runs them through one shared
//! [`ScanScheduler`], prints a colored verdict line per URL, and
//! optionally exports flat records as JSON Lines. The scheduler's own
//! concurrency ceiling governs how many scans run at once.

use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use colored::*;
use futures::stream::{FuturesUnordered, StreamExt};

use crate::config::{Config, Opt, PROGRESS_LOG_INTERVAL_SECS};
use crate::fetch::HttpByteSource;
use crate::initialization::init_client;
use crate::models::{ScanResult, Verdict};
use crate::scheduler::ScanScheduler;

/// Summary of one batch run.
#[derive(Debug, Clone, Copy)]
pub struct BatchReport {
    pub total: usize,
    pub safe: usize,
    pub warning: usize,
    pub danger: usize,
    pub elapsed_seconds: f64,
}

/// Reads the URL list: one URL per line, blank lines and `#` comments
/// skipped. `-` reads from stdin.
fn read_urls(path: &Path) -> Result<Vec<String>> {
    let raw = if path.as_os_str() == "-" {
        let mut buffer = String::new();
        for line in std::io::stdin().lock().lines() {
            buffer.push_str(&line.context("Failed to read URLs from stdin")?);
            buffer.push('\n');
        }
        buffer
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read URL file {}", path.display()))?
    };
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

fn verdict_line(result: &ScanResult) -> String {
    let verdict = match result.verdict {
        Verdict::Safe => result.verdict.as_str().green(),
        Verdict::Warning => result.verdict.as_str().yellow(),
        Verdict::Danger => result.verdict.as_str().red(),
    };
    let mut line = format!(
        "{:7} {:.2}  {}  ({} ms)",
        verdict,
        result.confidence,
        result.url,
        result.scan_time.as_millis()
    );
    if let Some(reason) = result.reasons.first() {
        line.push_str(&format!("\n        {}", reason.dimmed()));
    }
    line
}

/// Runs a full batch scan per the CLI options.
pub async fn run_batch(opt: &Opt) -> Result<BatchReport> {
    let urls = read_urls(&opt.file)?;
    if urls.is_empty() {
        anyhow::bail!("No URLs to scan in {}", opt.file.display());
    }

    let config = Config::from(opt);
    let show_timing = config.show_timing;
    let client = init_client(&config).context("Failed to build HTTP client")?;
    let scheduler = Arc::new(ScanScheduler::new(config, Arc::new(HttpByteSource::new(client))));

    let started = Instant::now();
    let total = urls.len();
    let completed = Arc::new(AtomicUsize::new(0));

    // Periodic progress line for long batches
    let progress = {
        let completed = completed.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(
                PROGRESS_LOG_INTERVAL_SECS,
            ));
            interval.tick().await;
            loop {
                interval.tick().await;
                log::info!(
                    "Progress: {}/{} URLs scanned",
                    completed.load(Ordering::Relaxed),
                    total
                );
            }
        })
    };

    let mut in_flight: FuturesUnordered<_> = urls
        .iter()
        .map(|url| {
            let scheduler = scheduler.clone();
            let completed = completed.clone();
            let url = url.clone();
            async move {
                let result = scheduler.scan(&url).await;
                completed.fetch_add(1, Ordering::Relaxed);
                result
            }
        })
        .collect();

    let mut results: Vec<ScanResult> = Vec::with_capacity(total);
    while let Some(result) = in_flight.next().await {
        println!("{}", verdict_line(&result));
        results.push(result);
    }
    progress.abort();

    if let Some(path) = &opt.export_jsonl {
        export_jsonl(path, &results)
            .with_context(|| format!("Failed to export records to {}", path.display()))?;
        log::info!("Exported {} records to {}", results.len(), path.display());
    }

    scheduler.stats().print_summary();
    if show_timing {
        let report = scheduler.performance_report();
        println!(
            "Timing: avg scan {:.0} ms, avg bandwidth {:.1} KB/s, confident verdicts {:.0}%",
            report.avg_scan_time.as_secs_f64() * 1000.0,
            report.avg_bandwidth / 1024.0,
            report.accuracy_estimate * 100.0
        );
    }

    let mut report = BatchReport {
        total: results.len(),
        safe: 0,
        warning: 0,
        danger: 0,
        elapsed_seconds: started.elapsed().as_secs_f64(),
    };
    for result in &results {
        match result.verdict {
            Verdict::Safe => report.safe += 1,
            Verdict::Warning => report.warning += 1,
            Verdict::Danger => report.danger += 1,
        }
    }
    Ok(report)
}

/// Writes flat records, one JSON object per line.
fn export_jsonl(path: &Path, results: &[ScanResult]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    for result in results {
        serde_json::to_writer(&mut writer, &result.to_flat_record())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
