//! media_sentry library: media authenticity scanning.
//!
//! Scans media URLs and fuses multiple signal sources into a single
//! authenticity verdict (`safe` / `warning` / `danger`) with a confidence
//! score: embedded provenance manifest validation when present, heuristic
//! header/URL/byte/network analysis when not, and loop-artifact detection
//! for video. A latency-aware scheduler keeps every scan inside a
//! wall-clock budget and degrades gracefully when it cannot finish.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use media_sentry::{Config, HttpByteSource, ScanScheduler};
//! use media_sentry::initialization::init_client;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let client = init_client(&config)?;
//! let scheduler = ScanScheduler::new(config, Arc::new(HttpByteSource::new(client)));
//!
//! let result = scheduler.scan("https://example.com/photo.jpg").await;
//! println!("{}: {} ({:.2})", result.url, result.verdict.as_str(), result.confidence);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your
//! application or call library functions from an existing async context.

pub mod batch;
pub mod config;
pub mod error_handling;
pub mod fetch;
mod heuristics;
pub mod initialization;
mod manifest;
mod models;
mod scheduler;
mod utils;
mod video;

// Re-export public API
pub use batch::{run_batch, BatchReport};
pub use config::{Config, LogFormat, LogLevel, Opt};
pub use fetch::{ByteSource, Frame, HeadInfo, HttpByteSource, VideoFrameSource, VideoMetadata};
pub use heuristics::{
    FallbackAnalyzer, FallbackReport, FileSignals, Finding, FindingKind, HeaderSignals,
    NetworkSignals, SignalBundle, UrlSignals,
};
pub use manifest::{
    ManifestValidator, TrustLevel, ValidationOutcome, ValidationReport,
};
pub use models::{FlatScanRecord, MediaKind, ScanResult, ScanStatus, Verdict};
pub use scheduler::{MediaHint, ScanScheduler, TaskKind};
pub use utils::PerformanceReport;
pub use video::{AnalysisSettings, LoopAnalysisResult, LoopArtifactDetector, PerformanceTuner};
