//! Budget-aware task planning.
//!
//! Given the remaining time budget, builds the ordered task list for one
//! scan. Cheap tasks are always worth scheduling; expensive ones only make
//! the plan when ample budget remains. Cost estimates are rough and only
//! drive inclusion and per-task timeouts.

use std::time::Duration;

use crate::config::{
    COST_HEADER_CHECK, COST_IMAGE_ANALYSIS, COST_MANIFEST_CHECK, COST_VIDEO_ANALYSIS,
    DEEP_ANALYSIS_MIN_BUDGET, MANIFEST_CHECK_MIN_BUDGET, TASK_TIMEOUT_MULTIPLIER,
};

/// One schedulable unit of scan work, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// HEAD request and header signal extraction.
    HeaderCheck,
    /// Prefix fetch and manifest validation.
    ManifestCheck,
    /// Heuristic analysis over the byte prefix.
    DeepImageAnalysis,
    /// Frame sampling and loop-artifact detection.
    DeepVideoAnalysis,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::HeaderCheck => "header-check",
            TaskKind::ManifestCheck => "manifest-check",
            TaskKind::DeepImageAnalysis => "image-analysis",
            TaskKind::DeepVideoAnalysis => "video-analysis",
        }
    }

    /// Rough cost estimate used for planning.
    pub fn estimated_cost(&self) -> Duration {
        match self {
            TaskKind::HeaderCheck => COST_HEADER_CHECK,
            TaskKind::ManifestCheck => COST_MANIFEST_CHECK,
            TaskKind::DeepImageAnalysis => COST_IMAGE_ANALYSIS,
            TaskKind::DeepVideoAnalysis => COST_VIDEO_ANALYSIS,
        }
    }

    /// Per-task timeout: generous multiple of the estimate, so a healthy
    /// task never trips it while a hung one cannot stall the scan.
    pub fn timeout(&self) -> Duration {
        self.estimated_cost() * TASK_TIMEOUT_MULTIPLIER
    }
}

/// Whether deep analysis should use the image or video pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaHint {
    Image,
    Video,
    Unknown,
}

/// Guesses the media kind from the URL path extension.
pub(crate) fn hint_from_url(url: &str) -> MediaHint {
    let path = match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_ascii_lowercase(),
        Err(_) => return MediaHint::Unknown,
    };
    let extension = path.rsplit('.').next().unwrap_or_default().to_string();
    match extension.as_str() {
        "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp" | "avif" => MediaHint::Image,
        "mp4" | "webm" | "mov" | "mkv" | "m4v" | "avi" => MediaHint::Video,
        _ => MediaHint::Unknown,
    }
}

/// Builds the task list for the remaining budget, in priority order.
pub(crate) fn plan_tasks(remaining: Duration, hint: MediaHint, has_frame_source: bool) -> Vec<TaskKind> {
    let mut tasks = Vec::new();
    if remaining >= TaskKind::HeaderCheck.estimated_cost() {
        tasks.push(TaskKind::HeaderCheck);
    }
    if remaining >= MANIFEST_CHECK_MIN_BUDGET {
        tasks.push(TaskKind::ManifestCheck);
    }
    if remaining >= DEEP_ANALYSIS_MIN_BUDGET {
        match hint {
            MediaHint::Video if has_frame_source => tasks.push(TaskKind::DeepVideoAnalysis),
            // Prefix heuristics apply to any byte stream, so an unknown
            // kind still gets the image pipeline
            _ => tasks.push(TaskKind::DeepImageAnalysis),
        }
    }
    tasks
}
