//! Verdict aggregation.
//!
//! Each successful task output is reduced to one boolean, "does this
//! indicate suspicion", by a rule specific to the task type. The fraction
//! of suspicious tasks maps to the verdict through two thresholds, with
//! confidence scaled linearly inside each band. Manifest evidence fuses
//! on top: a validated trusted manifest lifts the verdict to safe, while
//! a manifest claimed from a suspicious source is treated as forged and
//! forces danger.

use std::time::Duration;

use crate::config::{DANGER_RATIO_THRESHOLD, WARNING_RATIO_THRESHOLD};
use crate::heuristics::{SignalBundle, UrlSignals};
use crate::manifest::{TrustLevel, ValidationOutcome};
use crate::models::{ScanResult, ScanStatus, Verdict};

use super::execute::{TaskOutcome, TaskOutput};

/// Heuristic suspicion above this makes the heuristics task count as
/// suspicious in the ratio.
const HEURISTIC_SUSPICION_CUTOFF: f64 = 0.4;
/// Floor confidence for the forged-manifest danger override.
const FORGED_MANIFEST_CONFIDENCE: f64 = 0.75;

/// Task-type-specific suspicion rule.
fn indicates_suspicion(output: &TaskOutput, claim_suspect: bool) -> bool {
    match output {
        TaskOutput::Header(info) => info.status >= 400,
        TaskOutput::Manifest(report) => match report.outcome {
            ValidationOutcome::Invalid => true,
            ValidationOutcome::Valid | ValidationOutcome::ValidUntrusted => claim_suspect,
            ValidationOutcome::Missing | ValidationOutcome::Error => false,
        },
        TaskOutput::Heuristics(report) => report.suspicion > HEURISTIC_SUSPICION_CUTOFF,
        TaskOutput::Video(result) => result.is_loop,
    }
}

/// Maps the suspicion ratio to a verdict with in-band linear confidence.
fn verdict_for_ratio(ratio: f64) -> (Verdict, f64) {
    if ratio > DANGER_RATIO_THRESHOLD {
        let position = (ratio - DANGER_RATIO_THRESHOLD) / (1.0 - DANGER_RATIO_THRESHOLD);
        (Verdict::Danger, 0.6 + 0.4 * position)
    } else if ratio > WARNING_RATIO_THRESHOLD {
        let position =
            (ratio - WARNING_RATIO_THRESHOLD) / (DANGER_RATIO_THRESHOLD - WARNING_RATIO_THRESHOLD);
        (Verdict::Warning, 0.4 + 0.2 * position)
    } else {
        let position = 1.0 - ratio / WARNING_RATIO_THRESHOLD;
        (Verdict::Safe, 0.6 + 0.4 * position)
    }
}

/// Fuses all task outcomes into the final scan result.
pub(crate) fn aggregate(
    url: &str,
    url_signals: Option<&UrlSignals>,
    outcomes: &[TaskOutcome],
    status: ScanStatus,
    scan_time: Duration,
    bytes_downloaded: u64,
    error: Option<String>,
) -> ScanResult {
    let claim_suspect = url_signals
        .map(crate::heuristics::manifest_claim_is_suspect)
        .unwrap_or(false);

    let mut signals: Vec<String> = Vec::new();
    let mut reasons: Vec<String> = Vec::new();
    let mut manifest = None;
    let mut heuristics: Option<SignalBundle> = None;
    let mut loop_analysis = None;

    let mut successful = 0usize;
    let mut suspicious = 0usize;

    for outcome in outcomes {
        match &outcome.output {
            Ok(output) => {
                successful += 1;
                if indicates_suspicion(output, claim_suspect) {
                    suspicious += 1;
                }
                describe_output(output, &mut signals, &mut reasons);
                match output {
                    TaskOutput::Manifest(report) => manifest = Some(report.clone()),
                    TaskOutput::Heuristics(report) => {
                        heuristics = Some(report.bundle.clone());
                    }
                    TaskOutput::Video(result) => loop_analysis = Some(result.clone()),
                    TaskOutput::Header(_) => {}
                }
            }
            Err(error_type) => {
                reasons.push(format!(
                    "{} did not complete: {}",
                    outcome.kind.as_str(),
                    error_type.as_str()
                ));
            }
        }
    }

    let (mut verdict, mut confidence) = if successful == 0 {
        reasons.push("No analysis task completed".to_string());
        (Verdict::Warning, 0.1)
    } else {
        verdict_for_ratio(suspicious as f64 / successful as f64)
    };

    // Manifest fusion on top of the ratio verdict
    if let Some(report) = &manifest {
        match report.outcome {
            ValidationOutcome::Valid | ValidationOutcome::ValidUntrusted if claim_suspect => {
                verdict = Verdict::Danger;
                confidence = confidence.max(FORGED_MANIFEST_CONFIDENCE);
                signals.push("manifest-forgery-suspected".to_string());
                reasons.push(
                    "Manifest present but the source is suspicious; likely self-signed or forged"
                        .to_string(),
                );
            }
            ValidationOutcome::Valid
                if report.trust_level == TrustLevel::High && verdict == Verdict::Safe =>
            {
                confidence = confidence.max(report.confidence_score / 100.0);
                reasons.push("Trusted provenance manifest verified".to_string());
            }
            ValidationOutcome::Invalid => {
                if verdict == Verdict::Safe {
                    verdict = Verdict::Warning;
                    confidence = confidence.min(0.5);
                }
                reasons.push("Embedded manifest failed validation".to_string());
            }
            _ => {}
        }
    }

    if let Some(url_signals) = url_signals {
        if let Some(domain) = &url_signals.domain {
            signals.push(format!("domain:{domain}"));
        }
    }

    ScanResult {
        url: url.to_string(),
        verdict,
        confidence: confidence.clamp(0.0, 1.0),
        signals,
        reasons,
        scan_time,
        bytes_downloaded,
        status,
        error,
        manifest,
        heuristics,
        loop_analysis,
    }
}

fn describe_output(output: &TaskOutput, signals: &mut Vec<String>, reasons: &mut Vec<String>) {
    match output {
        TaskOutput::Header(info) => {
            signals.push(format!("http-status:{}", info.status));
            if let Some(content_type) = info.content_type() {
                signals.push(format!("content-type:{content_type}"));
            }
        }
        TaskOutput::Manifest(report) => {
            signals.push(format!("manifest:{}", report.outcome.as_str()));
            for error in &report.errors {
                reasons.push(format!("Manifest: {error}"));
            }
        }
        TaskOutput::Heuristics(report) => {
            for finding in report.findings.iter().filter(|f| f.suspicious).take(3) {
                signals.push(finding.label.clone());
                reasons.push(finding.description.clone());
            }
        }
        TaskOutput::Video(result) => {
            if result.skipped {
                signals.push("loop-analysis:skipped".to_string());
            } else if result.is_loop {
                signals.push("loop-artifact".to_string());
                reasons.push(format!(
                    "Video shows loop artifacts (similarity {:.2}, motion {:.2}, flow {:.2})",
                    result.similarity, result.motion_consistency, result.optical_flow_score
                ));
            } else {
                signals.push("loop-analysis:clean".to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::HeadInfo;
    use crate::manifest::ManifestValidator;
    use crate::scheduler::plan::TaskKind;
    use crate::video::LoopAnalysisResult;

    fn ok_header(status: u16) -> TaskOutcome {
        TaskOutcome {
            kind: TaskKind::HeaderCheck,
            output: Ok(TaskOutput::Header(HeadInfo {
                status,
                headers: Default::default(),
            })),
        }
    }

    fn missing_manifest() -> TaskOutcome {
        TaskOutcome {
            kind: TaskKind::ManifestCheck,
            output: Ok(TaskOutput::Manifest(ManifestValidator::new().validate(b"plain bytes"))),
        }
    }

    fn loop_video(is_loop: bool) -> TaskOutcome {
        TaskOutcome {
            kind: TaskKind::DeepVideoAnalysis,
            output: Ok(TaskOutput::Video(LoopAnalysisResult {
                is_loop,
                confidence: if is_loop { 0.9 } else { 0.2 },
                similarity: 0.9,
                motion_consistency: 0.95,
                optical_flow_score: 0.85,
                frames_analyzed: 5,
                skipped: false,
            })),
        }
    }

    #[test]
    fn test_ratio_bands() {
        let (verdict, confidence) = verdict_for_ratio(0.0);
        assert_eq!(verdict, Verdict::Safe);
        assert!((confidence - 1.0).abs() < 1e-9);

        let (verdict, _) = verdict_for_ratio(0.5);
        assert_eq!(verdict, Verdict::Warning);

        let (verdict, confidence) = verdict_for_ratio(1.0);
        assert_eq!(verdict, Verdict::Danger);
        assert!((confidence - 1.0).abs() < 1e-9);

        // Band edges are exclusive
        let (verdict, _) = verdict_for_ratio(0.3);
        assert_eq!(verdict, Verdict::Safe);
        let (verdict, _) = verdict_for_ratio(0.6);
        assert_eq!(verdict, Verdict::Warning);
    }

    #[test]
    fn test_all_clean_tasks_aggregate_safe() {
        let outcomes = vec![ok_header(200), missing_manifest(), loop_video(false)];
        let result = aggregate(
            "https://example.com/clip.mp4",
            None,
            &outcomes,
            ScanStatus::Complete,
            Duration::from_millis(300),
            1024,
            None,
        );
        assert_eq!(result.verdict, Verdict::Safe);
        assert!(result.confidence >= 0.6);
        assert!(result.loop_analysis.is_some());
    }

    #[test]
    fn test_loop_detection_flags_verdict() {
        let outcomes = vec![loop_video(true)];
        let result = aggregate(
            "https://example.com/clip.mp4",
            None,
            &outcomes,
            ScanStatus::Complete,
            Duration::from_millis(300),
            1024,
            None,
        );
        assert_eq!(result.verdict, Verdict::Danger);
        assert!(result.signals.iter().any(|s| s == "loop-artifact"));
    }

    #[test]
    fn test_failed_tasks_excluded_from_ratio() {
        let outcomes = vec![
            ok_header(200),
            TaskOutcome {
                kind: TaskKind::ManifestCheck,
                output: Err(crate::error_handling::ErrorType::TaskTimeout),
            },
        ];
        let result = aggregate(
            "https://example.com/a.jpg",
            None,
            &outcomes,
            ScanStatus::Complete,
            Duration::from_millis(300),
            0,
            None,
        );
        assert_eq!(result.verdict, Verdict::Safe);
        assert!(result
            .reasons
            .iter()
            .any(|r| r.contains("did not complete")));
    }

    #[test]
    fn test_no_successful_tasks_degrades_to_warning() {
        let outcomes = vec![TaskOutcome {
            kind: TaskKind::HeaderCheck,
            output: Err(crate::error_handling::ErrorType::HeadRequestError),
        }];
        let result = aggregate(
            "https://example.com/a.jpg",
            None,
            &outcomes,
            ScanStatus::Error,
            Duration::from_millis(300),
            0,
            Some("network unreachable".to_string()),
        );
        assert_eq!(result.verdict, Verdict::Warning);
        assert!(result.confidence < 0.2);
        assert_eq!(result.error.as_deref(), Some("network unreachable"));
    }

    #[test]
    fn test_valid_manifest_on_suspicious_source_forces_danger() {
        let suspicious = UrlSignals {
            suspicion_score: 0.6,
            domain: Some("malware-test.org".to_string()),
            ..UrlSignals::default()
        };
        // A structurally clean manifest report
        let manifest = TaskOutcome {
            kind: TaskKind::ManifestCheck,
            output: Ok(TaskOutput::Manifest(crate::manifest::ValidationReport {
                outcome: ValidationOutcome::Valid,
                errors: Vec::new(),
                warnings: Vec::new(),
                confidence_score: 90.0,
                trust_level: TrustLevel::High,
                record: None,
            })),
        };
        let result = aggregate(
            "https://malware-test.org/signed.jpg",
            Some(&suspicious),
            &[ok_header(200), manifest],
            ScanStatus::Complete,
            Duration::from_millis(300),
            4096,
            None,
        );
        assert_eq!(result.verdict, Verdict::Danger);
        assert!(result.confidence >= FORGED_MANIFEST_CONFIDENCE);
        assert!(result
            .signals
            .iter()
            .any(|s| s == "manifest-forgery-suspected"));
    }

    #[test]
    fn test_trusted_manifest_lifts_confidence() {
        let trusted = UrlSignals {
            trust_score: 1.0,
            domain: Some("wikipedia.org".to_string()),
            ..UrlSignals::default()
        };
        let manifest = TaskOutcome {
            kind: TaskKind::ManifestCheck,
            output: Ok(TaskOutput::Manifest(crate::manifest::ValidationReport {
                outcome: ValidationOutcome::Valid,
                errors: Vec::new(),
                warnings: Vec::new(),
                confidence_score: 95.0,
                trust_level: TrustLevel::High,
                record: None,
            })),
        };
        let result = aggregate(
            "https://wikipedia.org/signed.jpg",
            Some(&trusted),
            &[ok_header(200), manifest],
            ScanStatus::Complete,
            Duration::from_millis(300),
            4096,
            None,
        );
        assert_eq!(result.verdict, Verdict::Safe);
        assert!(result.confidence >= 0.9);
    }
}
