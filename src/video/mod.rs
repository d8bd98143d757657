//! Loop-artifact detection.
//!
//! Synthetic video loops betray themselves through three measurable
//! properties: the last frame closely matches the first, motion magnitude
//! stays abnormally steady between samples, and feature-point flow
//! clusters into opposing angular bands. The detector samples a handful
//! of frames, scores all three, and only calls a loop when every score
//! clears its adaptive threshold.

mod analysis;
mod pool;
mod tuner;

pub use pool::FramePool;
pub use tuner::{AnalysisSettings, PerformanceTuner, QualityTier, RunMetrics};

use std::sync::Mutex;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::config::{LOOP_WEIGHT_FLOW, LOOP_WEIGHT_MOTION, LOOP_WEIGHT_SIMILARITY};
use crate::fetch::{Frame, VideoFrameSource, VideoMetadata};

/// Scores and verdict from one loop analysis.
#[derive(Debug, Clone, Default)]
pub struct LoopAnalysisResult {
    /// All three scores cleared their thresholds.
    pub is_loop: bool,
    /// Weighted blend of the three scores, in [0, 1].
    pub confidence: f64,
    /// First-to-last frame correlation, in [0, 1].
    pub similarity: f64,
    /// Steadiness of motion between consecutive samples, in [0, 1].
    pub motion_consistency: f64,
    /// Fraction of feature flow in the circular-motion bands, in [0, 1].
    pub optical_flow_score: f64,
    /// Number of frames actually captured.
    pub frames_analyzed: usize,
    /// Analysis was skipped or aborted; all scores are neutral zeros.
    pub skipped: bool,
}

impl LoopAnalysisResult {
    /// Zero-confidence result for skipped or failed analysis.
    fn neutral() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

/// Verdict rule: strict AND over the three thresholds, blended confidence.
fn evaluate(
    settings: &AnalysisSettings,
    similarity: f64,
    motion: f64,
    flow: f64,
) -> (bool, f64) {
    let is_loop = similarity > settings.similarity_threshold
        && motion > settings.motion_threshold
        && flow > settings.flow_threshold;
    let confidence = LOOP_WEIGHT_SIMILARITY * similarity
        + LOOP_WEIGHT_MOTION * motion
        + LOOP_WEIGHT_FLOW * flow;
    (is_loop, confidence.clamp(0.0, 1.0))
}

pub struct LoopArtifactDetector {
    pool: FramePool,
    tuner: Mutex<PerformanceTuner>,
}

impl Default for LoopArtifactDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopArtifactDetector {
    pub fn new() -> Self {
        Self {
            pool: FramePool::default(),
            tuner: Mutex::new(PerformanceTuner::new()),
        }
    }

    /// Analyzes a video for loop artifacts, tuning frame count and
    /// resolution from the recent performance history.
    ///
    /// Never fails: metadata errors, capture errors, cancellation, and
    /// budget skips all come back as a neutral zero-confidence result.
    pub async fn analyze(
        &self,
        source: &dyn VideoFrameSource,
        cancel: &CancellationToken,
    ) -> LoopAnalysisResult {
        let metadata = match source.load_metadata().await {
            Ok(metadata) => metadata,
            Err(err) => {
                log::warn!("Video metadata unavailable, skipping loop analysis: {err}");
                return LoopAnalysisResult::neutral();
            }
        };

        let settings = {
            let tuner = match self.tuner.lock() {
                Ok(tuner) => tuner,
                Err(_) => return LoopAnalysisResult::neutral(),
            };
            if tuner.should_skip(&metadata) {
                log::info!(
                    "Skipping loop analysis for {:.0}s video under recent slow performance",
                    metadata.duration
                );
                return LoopAnalysisResult::neutral();
            }
            tuner.settings_for(&metadata)
        };

        let started = Instant::now();
        let (result, memory_bytes) = self
            .analyze_with(source, &metadata, &settings, cancel)
            .await;

        if let Ok(mut tuner) = self.tuner.lock() {
            tuner.observe(RunMetrics {
                elapsed: started.elapsed(),
                memory_bytes,
            });
        }
        result
    }

    /// Runs one analysis pass with explicit settings.
    ///
    /// Returns the result plus the peak buffer memory used, for the tuner.
    /// Every captured or derived frame buffer goes back to the pool on
    /// every exit path.
    pub async fn analyze_with(
        &self,
        source: &dyn VideoFrameSource,
        metadata: &VideoMetadata,
        settings: &AnalysisSettings,
        cancel: &CancellationToken,
    ) -> (LoopAnalysisResult, u64) {
        let target = (settings.target_width, settings.target_height);
        let timestamps = analysis::plan_timestamps(metadata.duration, settings.frame_count);

        let mut frames: Vec<Frame> = Vec::with_capacity(timestamps.len());
        for time in timestamps {
            if cancel.is_cancelled() {
                let memory = self.release_all(frames);
                return (LoopAnalysisResult::neutral(), memory);
            }
            match source.seek_and_capture(time, target).await {
                Ok(frame) => frames.push(frame),
                Err(err) => {
                    log::warn!("Frame capture at {time:.2}s failed: {err}");
                    let memory = self.release_all(frames);
                    return (LoopAnalysisResult::neutral(), memory);
                }
            }
        }

        if frames.len() < 3 {
            let memory = self.release_all(frames);
            return (LoopAnalysisResult::neutral(), memory);
        }

        // Work on uniformly sized downscaled copies
        let small: Vec<Frame> = frames
            .iter()
            .map(|f| analysis::resize(f, settings.target_width, settings.target_height, &self.pool))
            .collect();

        if cancel.is_cancelled() {
            let mut memory = self.release_all(frames);
            memory += self.release_all(small);
            return (LoopAnalysisResult::neutral(), memory);
        }

        let similarity = analysis::similarity(&small[0], &small[small.len() - 1]);

        let magnitudes: Vec<f64> = small
            .windows(2)
            .map(|pair| analysis::average_flow_magnitude(&pair[0], &pair[1]))
            .collect();
        let motion = analysis::motion_consistency(&magnitudes);

        let points = analysis::feature_points(&small[0]);
        let vectors = analysis::flow_vectors(&points, &small[0], &small[1]);
        let flow = analysis::circularity_score(&vectors);

        let (is_loop, confidence) = evaluate(settings, similarity, motion, flow);
        let frames_analyzed = frames.len();

        let mut memory = self.release_all(frames);
        memory += self.release_all(small);

        log::debug!(
            "Loop analysis: similarity={similarity:.3} motion={motion:.3} flow={flow:.3} is_loop={is_loop}"
        );

        (
            LoopAnalysisResult {
                is_loop,
                confidence,
                similarity,
                motion_consistency: motion,
                optical_flow_score: flow,
                frames_analyzed,
                skipped: false,
            },
            memory,
        )
    }

    /// Returns all frame buffers to the pool, reporting the bytes held.
    fn release_all(&self, frames: Vec<Frame>) -> u64 {
        let mut total = 0u64;
        for frame in frames {
            total += frame.data.len() as u64;
            self.pool.give_back(frame.data);
        }
        total
    }
}
