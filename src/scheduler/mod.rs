//! Latency-aware scan orchestration.
//!
//! One scheduler instance owns the whole scan pipeline: the result cache,
//! the concurrency ceiling, the shared analyzers, and the per-scan state
//! machine (cache lookup, fast path, planning, execution, aggregation).
//! Every entry returns a structurally valid [`ScanResult`]; failures and
//! timeouts degrade the verdict instead of surfacing as errors.

mod aggregate;
mod cache;
mod execute;
mod fast_path;
mod plan;

pub use plan::{MediaHint, TaskKind};

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tldextract::{TldExtractor, TldOption};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, CACHE_TTL, SCAN_BUDGET_SLACK};
use crate::error_handling::{ErrorType, InfoType, ScanStats, WarningType};
use crate::fetch::{ByteSource, VideoFrameSource};
use crate::heuristics::FallbackAnalyzer;
use crate::manifest::ManifestValidator;
use crate::models::{ScanResult, ScanStatus, Verdict};
use crate::utils::{PerformanceReport, ScanTimingMetrics, TimingStats};
use crate::video::LoopArtifactDetector;

use cache::ResultCache;
use execute::ScanContext;

/// Orchestrates scans behind a concurrency ceiling and a result cache.
pub struct ScanScheduler {
    config: Config,
    byte_source: Arc<dyn ByteSource>,
    validator: Arc<ManifestValidator>,
    analyzer: Arc<FallbackAnalyzer>,
    detector: Arc<LoopArtifactDetector>,
    cache: ResultCache,
    semaphore: Arc<Semaphore>,
    stats: Arc<ScanStats>,
    timing: Mutex<TimingStats>,
    extractor: TldExtractor,
}

impl ScanScheduler {
    pub fn new(config: Config, byte_source: Arc<dyn ByteSource>) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_scans));
        let cache = ResultCache::new(config.cache_capacity, CACHE_TTL);
        Self {
            config,
            byte_source,
            validator: Arc::new(ManifestValidator::new()),
            analyzer: Arc::new(FallbackAnalyzer::new()),
            detector: Arc::new(LoopArtifactDetector::new()),
            cache,
            semaphore,
            stats: Arc::new(ScanStats::new()),
            timing: Mutex::new(TimingStats::new()),
            extractor: TldExtractor::new(TldOption::default()),
        }
    }

    /// Scans a media URL with the default budget and no frame source.
    pub async fn scan(&self, url: &str) -> ScanResult {
        self.scan_with(url, None, None).await
    }

    /// Primary entry point: scans a media URL, optionally with a video
    /// frame source for deep video analysis and an explicit time budget.
    ///
    /// Always returns within roughly `budget + slack` wall-clock time,
    /// and always returns a structurally valid result.
    pub async fn scan_with(
        &self,
        url: &str,
        frame_source: Option<Arc<dyn VideoFrameSource>>,
        budget: Option<Duration>,
    ) -> ScanResult {
        let started = Instant::now();

        if !self.config.no_cache {
            if let Some(mut hit) = self.cache.get(url) {
                self.stats.increment_info(InfoType::CacheHit);
                log::debug!("Cache hit for {url}");
                hit.scan_time = started.elapsed();
                return hit;
            }
        }

        // FIFO concurrency ceiling across all callers
        let _permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                return self.error_result(url, started, "scheduler shut down");
            }
        };

        let url_signals = crate::heuristics::analyze_url(&self.extractor, url);

        if let Some(signals) = &url_signals {
            if let Some(fast) = fast_path::fast_verdict(signals) {
                self.stats.increment_info(InfoType::FastPathExit);
                log::debug!(
                    "Fast path exit for {url}: {} ({:.2})",
                    fast.verdict.as_str(),
                    fast.confidence
                );
                let result = ScanResult {
                    url: url.to_string(),
                    verdict: fast.verdict,
                    confidence: fast.confidence,
                    signals: vec![fast.signal],
                    reasons: vec![fast.reason],
                    scan_time: started.elapsed(),
                    bytes_downloaded: 0,
                    status: ScanStatus::Complete,
                    error: None,
                    manifest: None,
                    heuristics: None,
                    loop_analysis: None,
                };
                return self.finish(result);
            }
        }

        let budget = budget.unwrap_or(self.config.scan_budget);
        let cancel = CancellationToken::new();
        let context = Arc::new(ScanContext::new(
            url.to_string(),
            self.byte_source.clone(),
            frame_source,
            self.validator.clone(),
            self.analyzer.clone(),
            self.detector.clone(),
            self.stats.clone(),
            cancel.clone(),
        ));

        let hint = plan::hint_from_url(url);
        if hint == MediaHint::Video && context.frame_source.is_none() {
            self.stats.increment_warning(WarningType::MissingFrameSource);
        }
        let tasks = plan::plan_tasks(budget, hint, context.frame_source.is_some());
        log::debug!(
            "Planned {} tasks for {url} within {budget:?}: {:?}",
            tasks.len(),
            tasks
        );

        let outcomes = Arc::new(Mutex::new(Vec::new()));
        let run = execute::run_tasks(context.clone(), tasks, outcomes.clone());

        let status = match tokio::time::timeout(budget + SCAN_BUDGET_SLACK, run).await {
            Ok(()) => ScanStatus::Complete,
            Err(_) => {
                // Cancels in-flight frame work so buffers release promptly
                cancel.cancel();
                self.stats.increment_error(ErrorType::ScanTimeout);
                log::warn!("Scan budget exhausted for {url}");
                ScanStatus::Timeout
            }
        };

        let collected = match outcomes.lock() {
            Ok(outcomes) => outcomes.clone(),
            Err(_) => Vec::new(),
        };
        let error =
            (status == ScanStatus::Timeout).then(|| "scan budget exhausted".to_string());

        let mut result = aggregate::aggregate(
            url,
            url_signals.as_ref(),
            &collected,
            status,
            started.elapsed(),
            context.bytes_downloaded(),
            error,
        );

        // An incomplete scan cannot vouch for safety
        if status == ScanStatus::Timeout && result.verdict == Verdict::Safe {
            result.verdict = Verdict::Warning;
            result.confidence = result.confidence.min(0.4);
        }

        self.finish(result)
    }

    fn finish(&self, result: ScanResult) -> ScanResult {
        if !self.config.no_cache && result.status == ScanStatus::Complete {
            self.cache.insert(&result.url, result.clone());
        }
        if let Ok(mut timing) = self.timing.lock() {
            timing.record(ScanTimingMetrics {
                scan_time: result.scan_time,
                bytes_downloaded: result.bytes_downloaded,
                confidence: result.confidence,
            });
        }
        result
    }

    fn error_result(&self, url: &str, started: Instant, message: &str) -> ScanResult {
        ScanResult {
            url: url.to_string(),
            verdict: Verdict::Warning,
            confidence: 0.1,
            signals: Vec::new(),
            reasons: Vec::new(),
            scan_time: started.elapsed(),
            bytes_downloaded: 0,
            status: ScanStatus::Error,
            error: Some(message.to_string()),
            manifest: None,
            heuristics: None,
            loop_analysis: None,
        }
    }

    /// Diagnostics over all scans this scheduler has run.
    pub fn performance_report(&self) -> PerformanceReport {
        self.timing
            .lock()
            .map(|timing| timing.report())
            .unwrap_or_else(|_| TimingStats::new().report())
    }

    /// Per-category error/warning/info counters.
    pub fn stats(&self) -> Arc<ScanStats> {
        self.stats.clone()
    }

    /// Number of cached results currently held.
    pub fn cached_results(&self) -> usize {
        self.cache.len()
    }
}
