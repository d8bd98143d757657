//! Core data model: verdicts, scan results, and the flat persisted record.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::heuristics::SignalBundle;
use crate::manifest::ValidationReport;
use crate::video::LoopAnalysisResult;

/// Authenticity verdict assigned to a piece of media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// No meaningful evidence of inauthenticity.
    Safe,
    /// Mixed or weak evidence; worth a closer look.
    Warning,
    /// Strong evidence of inauthenticity.
    Danger,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Safe => "safe",
            Verdict::Warning => "warning",
            Verdict::Danger => "danger",
        }
    }
}

/// Terminal status of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    /// All planned tasks completed or individually timed out.
    Complete,
    /// The scan-level budget expired; the result is the best partial verdict.
    Timeout,
    /// A scan-level failure occurred; the result is degraded but valid.
    Error,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Complete => "complete",
            ScanStatus::Timeout => "timeout",
            ScanStatus::Error => "error",
        }
    }
}

/// Broad media kind, sniffed from bytes, headers, or the URL path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Jpeg,
    Png,
    Gif,
    WebP,
    Mp4,
    WebM,
    Unknown,
}

impl MediaKind {
    /// True for still-image formats.
    pub fn is_image(&self) -> bool {
        matches!(
            self,
            MediaKind::Jpeg | MediaKind::Png | MediaKind::Gif | MediaKind::WebP
        )
    }

    /// True for video formats.
    pub fn is_video(&self) -> bool {
        matches!(self, MediaKind::Mp4 | MediaKind::WebM)
    }
}

/// Result of one scan request.
///
/// Created fresh per scan and immutable once returned. Carries the full
/// analyzer outputs used to produce the verdict so callers can audit the
/// decision. A failed or timed-out scan has the same shape as a successful
/// one; only `confidence`, `status`, and `error` differ.
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// The media URL that was scanned.
    pub url: String,
    /// Fused authenticity verdict.
    pub verdict: Verdict,
    /// Confidence in the verdict, in [0, 1].
    pub confidence: f64,
    /// Ordered labels of the signals that contributed to the verdict.
    pub signals: Vec<String>,
    /// Ordered human-readable reasons.
    pub reasons: Vec<String>,
    /// Wall-clock time the scan took.
    pub scan_time: Duration,
    /// Total bytes fetched from the byte source.
    pub bytes_downloaded: u64,
    /// Terminal status of the scan.
    pub status: ScanStatus,
    /// Scan-level error description, if any.
    pub error: Option<String>,
    /// Manifest validation output, if the manifest check ran.
    pub manifest: Option<ValidationReport>,
    /// Heuristic signal bundle, if the fallback analyzer ran.
    pub heuristics: Option<SignalBundle>,
    /// Video loop analysis output, if the loop detector ran.
    pub loop_analysis: Option<LoopAnalysisResult>,
}

impl ScanResult {
    /// Converts this result to the flat serializable record consumed by
    /// external storage/history collaborators.
    pub fn to_flat_record(&self) -> FlatScanRecord {
        FlatScanRecord {
            url: self.url.clone(),
            verdict: self.verdict,
            confidence: self.confidence,
            scan_time_ms: self.scan_time.as_millis() as u64,
            bytes_downloaded: self.bytes_downloaded,
            reasons: self.reasons.clone(),
            signals: self.signals.clone(),
            status: self.status,
            error: self.error.clone(),
            scanned_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Flat, serializable scan record.
///
/// This is the persistence/history contract: the core does not assume any
/// storage mechanism, it only guarantees this shape round-trips through
/// serde.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatScanRecord {
    pub url: String,
    pub verdict: Verdict,
    pub confidence: f64,
    pub scan_time_ms: u64,
    pub bytes_downloaded: u64,
    pub reasons: Vec<String>,
    pub signals: Vec<String>,
    pub status: ScanStatus,
    pub error: Option<String>,
    /// Epoch milliseconds at record creation.
    pub scanned_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> ScanResult {
        ScanResult {
            url: "https://example.com/cat.jpg".to_string(),
            verdict: Verdict::Safe,
            confidence: 0.91,
            signals: vec!["trusted-domain".to_string()],
            reasons: vec!["Domain is on the trusted list".to_string()],
            scan_time: Duration::from_millis(42),
            bytes_downloaded: 65536,
            status: ScanStatus::Complete,
            error: None,
            manifest: None,
            heuristics: None,
            loop_analysis: None,
        }
    }

    #[test]
    fn test_flat_record_round_trip() {
        let record = sample_result().to_flat_record();
        let json = serde_json::to_string(&record).unwrap();
        let back: FlatScanRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.verdict, Verdict::Safe);
        assert_eq!(back.status, ScanStatus::Complete);
        assert_eq!(back.scan_time_ms, 42);
        assert_eq!(back.bytes_downloaded, 65536);
        assert_eq!(back.reasons.len(), 1);
    }

    #[test]
    fn test_verdict_serializes_lowercase() {
        let json = serde_json::to_string(&Verdict::Danger).unwrap();
        assert_eq!(json, "\"danger\"");
        let json = serde_json::to_string(&ScanStatus::Timeout).unwrap();
        assert_eq!(json, "\"timeout\"");
    }

    #[test]
    fn test_media_kind_classification() {
        assert!(MediaKind::Jpeg.is_image());
        assert!(!MediaKind::Jpeg.is_video());
        assert!(MediaKind::Mp4.is_video());
        assert!(!MediaKind::Unknown.is_image());
        assert!(!MediaKind::Unknown.is_video());
    }
}
