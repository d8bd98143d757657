//! Configuration constants.
//!
//! This module defines all configuration constants used throughout the crate,
//! including timeouts, fetch limits, scoring weights, and detector thresholds.
//! Scoring weights are tuned heuristics, not derived values; they are kept
//! here so they can be adjusted in one place.

use std::time::Duration;

// Scan orchestration
/// Default wall-clock budget for a single scan.
pub const DEFAULT_SCAN_BUDGET: Duration = Duration::from_millis(5000);
/// Maximum number of scans running concurrently system-wide.
/// Excess requests queue on a fair semaphore and are served FIFO.
pub const CONCURRENT_SCAN_LIMIT: usize = 3;
/// Fast-path confidence threshold: URL-only heuristics above this confidence
/// terminate the scan without any network round-trip.
pub const FAST_PATH_CONFIDENCE_THRESHOLD: f64 = 0.8;
/// Multiplier applied to a task's cost estimate to derive its timeout.
/// A header check estimated at 50ms gets a 200ms timeout, and so on.
pub const TASK_TIMEOUT_MULTIPLIER: u32 = 4;
/// Slack added on top of the scan budget before the scheduler force-resolves
/// with a degraded result. Covers the final aggregation pass.
pub const SCAN_BUDGET_SLACK: Duration = Duration::from_millis(250);

// Task cost estimates (used for budget planning)
/// Estimated cost of the metadata/header check task.
pub const COST_HEADER_CHECK: Duration = Duration::from_millis(50);
/// Estimated cost of the manifest quick-check task.
pub const COST_MANIFEST_CHECK: Duration = Duration::from_millis(200);
/// Estimated cost of image deep analysis (byte heuristics over the prefix).
pub const COST_IMAGE_ANALYSIS: Duration = Duration::from_millis(400);
/// Estimated cost of video loop analysis (frame extraction + flow).
pub const COST_VIDEO_ANALYSIS: Duration = Duration::from_millis(600);
/// Minimum remaining budget required to plan the manifest quick-check.
pub const MANIFEST_CHECK_MIN_BUDGET: Duration = Duration::from_millis(500);
/// Minimum remaining budget required to plan media-type deep analysis.
pub const DEEP_ANALYSIS_MIN_BUDGET: Duration = Duration::from_millis(1200);

// Verdict aggregation
/// Suspicion ratio above which the fused verdict is Danger.
pub const DANGER_RATIO_THRESHOLD: f64 = 0.6;
/// Suspicion ratio above which the fused verdict is Warning.
pub const WARNING_RATIO_THRESHOLD: f64 = 0.3;

// Result cache
/// Maximum number of cached scan results (LRU eviction beyond this).
pub const CACHE_CAPACITY: usize = 128;
/// Time-to-live for cached scan results. Kept short: the cache absorbs
/// bursty repeated requests for the same media, it does not persist.
pub const CACHE_TTL: Duration = Duration::from_secs(300);

// Byte fetching
/// Number of bytes fetched from the start of the media for manifest
/// detection and byte-level heuristics. Manifest containers and metadata
/// segments live near the start of well-formed media files.
pub const PREFIX_FETCH_BYTES: u64 = 64 * 1024;
/// Timeout for HEAD requests.
pub const HEAD_REQUEST_TIMEOUT: Duration = Duration::from_secs(3);
/// Timeout for range requests.
pub const RANGE_REQUEST_TIMEOUT: Duration = Duration::from_secs(3);
/// Maximum retry attempts for transient fetch failures.
pub const FETCH_RETRY_ATTEMPTS: usize = 2;
/// Base backoff for fetch retries (exponential, with jitter).
pub const FETCH_RETRY_BASE_MS: u64 = 100;
/// A response that arrives faster than this is flagged as suspiciously fast
/// (cached/synthetic content served from an edge that never touched disk).
pub const SUSPICIOUSLY_FAST_RESPONSE: Duration = Duration::from_millis(15);

// Manifest validation confidence weights (sum to 1.0)
/// Weight of the validation-status base bucket.
pub const MANIFEST_WEIGHT_STATUS: f64 = 0.40;
/// Weight of the certificate-chain quality bucket.
pub const MANIFEST_WEIGHT_CERTS: f64 = 0.25;
/// Weight of the manifest completeness bucket.
pub const MANIFEST_WEIGHT_COMPLETENESS: f64 = 0.20;
/// Weight of the error/warning penalty bucket.
pub const MANIFEST_WEIGHT_PENALTY: f64 = 0.15;
/// Confidence score at or above which trust level is High.
pub const TRUST_HIGH_THRESHOLD: f64 = 80.0;
/// Confidence score at or above which trust level is Medium.
pub const TRUST_MEDIUM_THRESHOLD: f64 = 50.0;
/// A manifest timestamp this far in the future is a critical error.
pub const FUTURE_TIMESTAMP_TOLERANCE: Duration = Duration::from_secs(24 * 60 * 60);
/// A manifest older than this earns an age warning.
pub const STALE_MANIFEST_AGE: Duration = Duration::from_secs(365 * 24 * 60 * 60);

// Fallback heuristics (finding-type blend, sums to 1.0)
/// Weight of metadata findings in the fallback confidence blend.
pub const FALLBACK_WEIGHT_METADATA: f64 = 0.4;
/// Weight of tool-signature findings in the fallback confidence blend.
pub const FALLBACK_WEIGHT_SIGNATURE: f64 = 0.3;
/// Weight of structural findings in the fallback confidence blend.
pub const FALLBACK_WEIGHT_STRUCTURE: f64 = 0.2;
/// Weight of anomaly findings in the fallback confidence blend.
pub const FALLBACK_WEIGHT_ANOMALY: f64 = 0.1;
/// Confidence assigned to a generation-tool signature hit.
pub const SIGNATURE_CONFIDENCE_GENERATION: f64 = 0.95;
/// Confidence assigned to a deepfake-tool signature hit.
pub const SIGNATURE_CONFIDENCE_DEEPFAKE: f64 = 0.9;
/// Confidence assigned to an editing-tool signature hit.
pub const SIGNATURE_CONFIDENCE_EDITING: f64 = 0.7;
/// URL suspicion above which a claimed manifest is treated as forged.
pub const MANIFEST_CLAIM_SUSPICION_THRESHOLD: f64 = 0.5;

// Loop detection (score blend sums to 1.0)
/// Weight of frame similarity in the loop confidence blend.
pub const LOOP_WEIGHT_SIMILARITY: f64 = 0.4;
/// Weight of motion consistency in the loop confidence blend.
pub const LOOP_WEIGHT_MOTION: f64 = 0.35;
/// Weight of optical-flow circularity in the loop confidence blend.
pub const LOOP_WEIGHT_FLOW: f64 = 0.25;
/// Baseline frame-similarity threshold (medium quality tier).
pub const LOOP_SIMILARITY_BASELINE: f64 = 0.85;
/// Baseline motion-consistency threshold (medium quality tier).
pub const LOOP_MOTION_BASELINE: f64 = 0.9;
/// Baseline optical-flow circularity threshold (medium quality tier).
pub const LOOP_FLOW_BASELINE: f64 = 0.8;
/// Minimum plausible flow displacement (px) for circular-motion scoring.
pub const FLOW_MAGNITUDE_MIN: f64 = 2.0;
/// Maximum plausible flow displacement (px) for circular-motion scoring.
pub const FLOW_MAGNITUDE_MAX: f64 = 20.0;

// Loop detector performance tuning
/// Number of past analyses kept in the rolling performance history.
pub const TUNER_HISTORY_SIZE: usize = 100;
/// Number of recent runs averaged when checking for slow performance.
pub const TUNER_RECENT_RUNS: usize = 5;
/// Recent-average analysis time above which frame count is reduced.
pub const TUNER_SLOW_THRESHOLD: Duration = Duration::from_secs(3);
/// Recent-average memory above which target resolution is reduced.
pub const TUNER_MEMORY_THRESHOLD: u64 = 50 * 1024 * 1024;
/// Video duration above which analysis may be skipped when recent
/// performance has been slow.
pub const VIDEO_SKIP_DURATION_SECS: f64 = 120.0;
/// Frame buffer pool capacity; overflow buffers are dropped, not retained.
pub const FRAME_POOL_CAPACITY: usize = 16;

// Logging
/// Interval between progress log lines during a batch run, in seconds.
pub const PROGRESS_LOG_INTERVAL_SECS: u64 = 5;
