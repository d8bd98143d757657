//! Task execution for one scan.
//!
//! Planned tasks fan out concurrently, each wrapped in its own timeout. A
//! task that times out or fails is recorded and the rest keep running; the
//! join collects every outcome rather than failing fast. Outcomes land in
//! a shared vector as they finish so a scan-level timeout can still
//! aggregate whatever completed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;

use crate::config::PREFIX_FETCH_BYTES;
use crate::error_handling::{ErrorType, FetchError, InfoType, ScanStats, WarningType};
use crate::fetch::{ByteSource, HeadInfo, VideoFrameSource};
use crate::heuristics::{FallbackAnalyzer, FallbackReport};
use crate::manifest::{ManifestValidator, ValidationOutcome, ValidationReport};
use crate::video::{LoopAnalysisResult, LoopArtifactDetector};

use super::plan::TaskKind;

/// Successful output of one task.
#[derive(Debug, Clone)]
pub(crate) enum TaskOutput {
    Header(HeadInfo),
    Manifest(ValidationReport),
    Heuristics(FallbackReport),
    Video(LoopAnalysisResult),
}

/// Terminal record of one task, success or failure.
#[derive(Debug, Clone)]
pub(crate) struct TaskOutcome {
    pub kind: TaskKind,
    pub output: Result<TaskOutput, ErrorType>,
}

/// Shared per-scan state: collaborators plus memoized fetches so the
/// header and prefix are fetched at most once across all tasks.
pub(crate) struct ScanContext {
    pub url: String,
    pub byte_source: Arc<dyn ByteSource>,
    pub frame_source: Option<Arc<dyn VideoFrameSource>>,
    pub validator: Arc<ManifestValidator>,
    pub analyzer: Arc<FallbackAnalyzer>,
    pub detector: Arc<LoopArtifactDetector>,
    pub stats: Arc<ScanStats>,
    pub cancel: CancellationToken,
    head: OnceCell<Option<HeadInfo>>,
    prefix: OnceCell<Option<Vec<u8>>>,
    load_time: Mutex<Option<Duration>>,
    bytes_downloaded: AtomicU64,
}

impl ScanContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        url: String,
        byte_source: Arc<dyn ByteSource>,
        frame_source: Option<Arc<dyn VideoFrameSource>>,
        validator: Arc<ManifestValidator>,
        analyzer: Arc<FallbackAnalyzer>,
        detector: Arc<LoopArtifactDetector>,
        stats: Arc<ScanStats>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            url,
            byte_source,
            frame_source,
            validator,
            analyzer,
            detector,
            stats,
            cancel,
            head: OnceCell::new(),
            prefix: OnceCell::new(),
            load_time: Mutex::new(None),
            bytes_downloaded: AtomicU64::new(0),
        }
    }

    /// HEAD response, fetched once and shared across tasks.
    pub async fn head_info(&self) -> Option<HeadInfo> {
        self.head
            .get_or_init(|| async {
                match self.byte_source.head(&self.url).await {
                    Ok(info) => Some(info),
                    Err(err) => {
                        log::debug!("HEAD request for {} failed: {err}", self.url);
                        self.stats.increment_error(ErrorType::HeadRequestError);
                        None
                    }
                }
            })
            .await
            .clone()
    }

    /// Byte prefix, fetched once and shared across tasks. Records the
    /// fetch time for the network anomaly signal.
    pub async fn prefix(&self) -> Option<&[u8]> {
        self.prefix
            .get_or_init(|| async {
                let started = Instant::now();
                match self
                    .byte_source
                    .range(&self.url, 0, PREFIX_FETCH_BYTES)
                    .await
                {
                    Ok(bytes) => {
                        if let Ok(mut load_time) = self.load_time.lock() {
                            *load_time = Some(started.elapsed());
                        }
                        self.bytes_downloaded
                            .fetch_add(bytes.len() as u64, Ordering::Relaxed);
                        Some(bytes)
                    }
                    Err(err) => {
                        log::debug!("Prefix fetch for {} failed: {err}", self.url);
                        let error_type = match err {
                            FetchError::Timeout(_) => ErrorType::FetchTimeoutError,
                            _ => ErrorType::RangeRequestError,
                        };
                        self.stats.increment_error(error_type);
                        None
                    }
                }
            })
            .await
            .as_deref()
    }

    pub fn load_time(&self) -> Option<Duration> {
        self.load_time.lock().ok().and_then(|t| *t)
    }

    pub fn bytes_downloaded(&self) -> u64 {
        self.bytes_downloaded.load(Ordering::Relaxed)
    }
}

/// Runs the planned tasks concurrently, pushing outcomes into `outcomes`
/// as they complete. Returns once every task has finished or timed out.
pub(crate) async fn run_tasks(
    context: Arc<ScanContext>,
    tasks: Vec<TaskKind>,
    outcomes: Arc<Mutex<Vec<TaskOutcome>>>,
) {
    let mut in_flight: FuturesUnordered<_> = tasks
        .into_iter()
        .map(|kind| run_one(context.clone(), kind))
        .collect();

    while let Some(outcome) = in_flight.next().await {
        if let Err(error_type) = &outcome.output {
            context.stats.increment_error(*error_type);
            log::debug!(
                "Task {} for {} failed: {}",
                outcome.kind.as_str(),
                context.url,
                error_type.as_str()
            );
        }
        if let Ok(mut outcomes) = outcomes.lock() {
            outcomes.push(outcome);
        }
    }
}

async fn run_one(context: Arc<ScanContext>, kind: TaskKind) -> TaskOutcome {
    let output = match tokio::time::timeout(kind.timeout(), execute_task(&context, kind)).await {
        Ok(output) => output,
        Err(_) => Err(ErrorType::TaskTimeout),
    };
    TaskOutcome { kind, output }
}

async fn execute_task(context: &ScanContext, kind: TaskKind) -> Result<TaskOutput, ErrorType> {
    match kind {
        TaskKind::HeaderCheck => {
            let info = context
                .head_info()
                .await
                .ok_or(ErrorType::HeadRequestError)?;
            if info.content_type().is_none() {
                context
                    .stats
                    .increment_warning(WarningType::MissingContentType);
            }
            if info.content_length().is_none() {
                context
                    .stats
                    .increment_warning(WarningType::MissingContentLength);
            }
            Ok(TaskOutput::Header(info))
        }
        TaskKind::ManifestCheck => {
            let bytes = context
                .prefix()
                .await
                .ok_or(ErrorType::ManifestResourceError)?;
            let report = context.validator.validate(bytes);
            if report.outcome != ValidationOutcome::Missing {
                context.stats.increment_info(InfoType::ManifestFound);
            }
            Ok(TaskOutput::Manifest(report))
        }
        TaskKind::DeepImageAnalysis => {
            let head = context.head_info().await;
            let prefix = context.prefix().await;
            let report = context
                .analyzer
                .analyze(&context.url, head.as_ref(), prefix, context.load_time())
                .await;
            if report.recommends_upgrade {
                context.stats.increment_info(InfoType::UpgradeRecommended);
            }
            Ok(TaskOutput::Heuristics(report))
        }
        TaskKind::DeepVideoAnalysis => {
            let source = context
                .frame_source
                .as_ref()
                .ok_or(ErrorType::VideoMetadataError)?;
            let result = context.detector.analyze(source.as_ref(), &context.cancel).await;
            Ok(TaskOutput::Video(result))
        }
    }
}
