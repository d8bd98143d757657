//! Performance-adaptive analysis tuning.
//!
//! Keeps a rolling history of recent analysis runs and derives the
//! settings for the next run from it: historically slow runs reduce the
//! frame count, memory-heavy runs reduce the working resolution. Threshold
//! selection is a pure function of the video's quality tier, so the tuner
//! can be tested without any frame data.

use std::collections::VecDeque;
use std::time::Duration;

use crate::config::{
    LOOP_FLOW_BASELINE, LOOP_MOTION_BASELINE, LOOP_SIMILARITY_BASELINE, TUNER_HISTORY_SIZE,
    TUNER_MEMORY_THRESHOLD, TUNER_RECENT_RUNS, TUNER_SLOW_THRESHOLD, VIDEO_SKIP_DURATION_SECS,
};
use crate::fetch::VideoMetadata;

/// Measurements from one completed analysis run.
#[derive(Debug, Clone, Copy)]
pub struct RunMetrics {
    pub elapsed: Duration,
    pub memory_bytes: u64,
}

/// Concrete settings for one analysis run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisSettings {
    /// Number of frames to sample, 3 to 5.
    pub frame_count: usize,
    /// Working resolution frames are scaled down to.
    pub target_width: u32,
    pub target_height: u32,
    pub similarity_threshold: f64,
    pub motion_threshold: f64,
    pub flow_threshold: f64,
}

/// Estimated video quality tier, from resolution and duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityTier {
    Low,
    Medium,
    High,
}

/// Pixel-seconds score at or above which a video counts as high quality.
const HIGH_TIER_SCORE: f64 = 921_600.0; // 720p sustained for a minute
/// Pixel-seconds score at or above which a video counts as medium quality.
const MEDIUM_TIER_SCORE: f64 = 115_200.0;

pub fn quality_tier(metadata: &VideoMetadata) -> QualityTier {
    let pixels = f64::from(metadata.width) * f64::from(metadata.height);
    let score = pixels * metadata.duration.clamp(1.0, 60.0) / 60.0;
    if score >= HIGH_TIER_SCORE {
        QualityTier::High
    } else if score >= MEDIUM_TIER_SCORE {
        QualityTier::Medium
    } else {
        QualityTier::Low
    }
}

/// Detection thresholds for a quality tier.
///
/// High-quality video justifies stricter thresholds; low-quality video
/// gets looser ones so compression noise does not mask real loops.
fn thresholds_for(tier: QualityTier) -> (f64, f64, f64) {
    let shift = match tier {
        QualityTier::Low => -0.05,
        QualityTier::Medium => 0.0,
        QualityTier::High => 0.05,
    };
    (
        LOOP_SIMILARITY_BASELINE + shift,
        LOOP_MOTION_BASELINE + shift,
        // Flow scoring is noisier, so the low tier loosens it further
        LOOP_FLOW_BASELINE + if tier == QualityTier::Low { -0.10 } else { shift },
    )
}

pub struct PerformanceTuner {
    history: VecDeque<RunMetrics>,
}

impl Default for PerformanceTuner {
    fn default() -> Self {
        Self::new()
    }
}

impl PerformanceTuner {
    pub fn new() -> Self {
        Self {
            history: VecDeque::with_capacity(TUNER_HISTORY_SIZE),
        }
    }

    /// Records the metrics of a completed run.
    pub fn observe(&mut self, metrics: RunMetrics) {
        if self.history.len() == TUNER_HISTORY_SIZE {
            self.history.pop_front();
        }
        self.history.push_back(metrics);
    }

    /// Average elapsed time over the most recent runs.
    fn recent_avg_elapsed(&self) -> Duration {
        let recent: Vec<_> = self.history.iter().rev().take(TUNER_RECENT_RUNS).collect();
        if recent.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = recent.iter().map(|m| m.elapsed).sum();
        total / recent.len() as u32
    }

    /// Average memory use over the most recent runs.
    fn recent_avg_memory(&self) -> u64 {
        let recent: Vec<_> = self.history.iter().rev().take(TUNER_RECENT_RUNS).collect();
        if recent.is_empty() {
            return 0;
        }
        recent.iter().map(|m| m.memory_bytes).sum::<u64>() / recent.len() as u64
    }

    /// Derives settings for the next run from the video's quality tier
    /// and the recent performance history.
    pub fn settings_for(&self, metadata: &VideoMetadata) -> AnalysisSettings {
        let tier = quality_tier(metadata);
        let (similarity_threshold, motion_threshold, flow_threshold) = thresholds_for(tier);

        let frame_count = if self.recent_avg_elapsed() > TUNER_SLOW_THRESHOLD {
            3
        } else {
            5
        };

        let (target_width, target_height) = if self.recent_avg_memory() > TUNER_MEMORY_THRESHOLD {
            (32, 32)
        } else {
            (64, 64)
        };

        AnalysisSettings {
            frame_count,
            target_width,
            target_height,
            similarity_threshold,
            motion_threshold,
            flow_threshold,
        }
    }

    /// Long videos combined with recent slow performance are skipped
    /// entirely rather than allowed to block a scan.
    pub fn should_skip(&self, metadata: &VideoMetadata) -> bool {
        metadata.duration > VIDEO_SKIP_DURATION_SECS
            && self.recent_avg_elapsed() > TUNER_SLOW_THRESHOLD
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}
