//! Embedded authenticity manifest validation.
//!
//! Detection, tolerant parsing, structural validation, and confidence
//! scoring for embedded provenance manifests. The pipeline is:
//! cheap marker scan -> tolerant parse -> structural rules -> outcome
//! classification -> weighted confidence score.
//!
//! Validation never throws past this module: unsupported or corrupt input
//! degrades to a `Missing`/`Invalid`/`Error` outcome with descriptive
//! messages.

mod confidence;
mod detect;
mod parse;
mod records;
mod rules;

pub use confidence::trust_level_for;
pub use detect::has_manifest_marker;
pub use records::{Assertion, CertificateRecord, Ingredient, ManifestRecord, SignatureInfo};

use chrono::Utc;

/// Outcome of a manifest validation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Manifest parsed, all checks passed, chain trusted.
    Valid,
    /// Manifest parsed and structurally sound, but the signer could not be
    /// independently trusted (self-signed, unknown issuer, minor errors).
    ValidUntrusted,
    /// A critical structural error: the manifest cannot be believed.
    Invalid,
    /// No manifest container found in the scanned bytes.
    Missing,
    /// The container was detected but could not be processed.
    Error,
}

impl ValidationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationOutcome::Valid => "valid",
            ValidationOutcome::ValidUntrusted => "valid-untrusted",
            ValidationOutcome::Invalid => "invalid",
            ValidationOutcome::Missing => "missing",
            ValidationOutcome::Error => "error",
        }
    }
}

/// Trust level derived from the confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustLevel {
    High,
    Medium,
    Low,
}

/// Full result of one validation attempt.
///
/// Computed once per scan attempt and never mutated afterward; a fresh scan
/// supersedes it wholesale.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub outcome: ValidationOutcome,
    /// Structural errors, in rule order.
    pub errors: Vec<String>,
    /// Structural warnings, in rule order.
    pub warnings: Vec<String>,
    /// Confidence in [0, 100].
    pub confidence_score: f64,
    pub trust_level: TrustLevel,
    /// The parsed manifest, when parsing succeeded.
    pub record: Option<ManifestRecord>,
}

/// Validates embedded manifests in media byte prefixes.
pub struct ManifestValidator;

impl ManifestValidator {
    pub fn new() -> Self {
        ManifestValidator
    }

    /// Validates the manifest embedded in `bytes`, if any.
    ///
    /// The marker scan is a single linear pass; bytes without any container
    /// marker return `Missing` without attempting a parse.
    pub fn validate(&self, bytes: &[u8]) -> ValidationReport {
        let now = Utc::now();

        if !detect::has_manifest_marker(bytes) {
            let score = confidence::confidence_score(ValidationOutcome::Missing, None, &[], &[], now);
            return ValidationReport {
                outcome: ValidationOutcome::Missing,
                errors: Vec::new(),
                warnings: Vec::new(),
                confidence_score: score,
                trust_level: trust_level_for(score),
                record: None,
            };
        }

        let Some(record) = parse::parse_manifest(bytes) else {
            // Container markers are present but no claim payload decoded:
            // truncated fetch, corrupted container, or an encoding this
            // parser does not speak.
            return Self::failure_report(
                "Manifest container detected but payload could not be decoded",
            );
        };

        let (errors, warnings) = rules::run_structural_checks(&record, now);
        let outcome = Self::classify(&errors, &warnings);
        let score = confidence::confidence_score(outcome, Some(&record), &errors, &warnings, now);

        log::debug!(
            "Manifest validation: outcome={} errors={} warnings={} score={:.0}",
            outcome.as_str(),
            errors.len(),
            warnings.len(),
            score
        );

        ValidationReport {
            outcome,
            errors,
            warnings,
            confidence_score: score,
            trust_level: trust_level_for(score),
            record: Some(record),
        }
    }

    /// Builds an `Error` report from a failure description.
    ///
    /// Read timeouts, corrupted containers, and module-load failures all
    /// land here; the message pattern distinguishes them for callers.
    pub(crate) fn failure_report(message: &str) -> ValidationReport {
        let errors = vec![message.to_string()];
        let score =
            confidence::confidence_score(ValidationOutcome::Error, None, &errors, &[], Utc::now());
        ValidationReport {
            outcome: ValidationOutcome::Error,
            errors,
            warnings: Vec::new(),
            confidence_score: score,
            trust_level: trust_level_for(score),
            record: None,
        }
    }

    fn classify(errors: &[String], warnings: &[String]) -> ValidationOutcome {
        if errors.iter().any(|e| rules::is_critical_error(e)) {
            return ValidationOutcome::Invalid;
        }
        if !errors.is_empty() {
            return ValidationOutcome::ValidUntrusted;
        }
        let downgraded = warnings.iter().any(|w| {
            let lower = w.to_ascii_lowercase();
            lower.contains("untrusted") || lower.contains("self-signed")
        });
        if downgraded {
            ValidationOutcome::ValidUntrusted
        } else {
            ValidationOutcome::Valid
        }
    }
}

impl Default for ManifestValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest_bytes(json: &str) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8];
        bytes.extend_from_slice(b"\x00\x00\x00\x40jumb");
        bytes.extend_from_slice(json.as_bytes());
        bytes
    }

    const CLEAN_MANIFEST: &str = r#"{
        "claim_generator": "acme-cam/2.0",
        "timestamp": "2025-03-01T10:00:00Z",
        "producer": "Acme Camera",
        "assertions": [{"label": "c2pa.actions"}],
        "signature": {
            "algorithm": "es256",
            "signature_value": "sig",
            "certificates": [
                {"subject": "CN=leaf", "issuer": "CN=Adobe Root CA",
                 "valid_from": "2024-01-01T00:00:00Z",
                 "valid_to": "2066-01-01T00:00:00Z"}
            ]
        }
    }"#;

    #[test]
    fn test_validate_clean_manifest() {
        let report = ManifestValidator::new().validate(&manifest_bytes(CLEAN_MANIFEST));
        assert_eq!(report.outcome, ValidationOutcome::Valid);
        assert!(report.errors.is_empty());
        assert!(report.confidence_score >= 80.0);
        assert_eq!(report.trust_level, TrustLevel::High);
    }

    #[test]
    fn test_validate_no_marker_is_missing() {
        let report = ManifestValidator::new().validate(b"plain image bytes, nothing embedded");
        assert_eq!(report.outcome, ValidationOutcome::Missing);
        assert!(report.record.is_none());
        assert_eq!(report.trust_level, TrustLevel::Low);
    }

    #[test]
    fn test_validate_marker_without_payload_is_error() {
        let mut bytes = vec![0u8; 8];
        bytes.extend_from_slice(b"jumb");
        bytes.extend(std::iter::repeat(0xEEu8).take(32));
        let report = ManifestValidator::new().validate(&bytes);
        assert_eq!(report.outcome, ValidationOutcome::Error);
        assert!(!report.errors.is_empty());
    }

    #[test]
    fn test_validate_future_timestamp_is_invalid() {
        let future = (Utc::now() + chrono::Duration::days(3)).to_rfc3339();
        let json = format!(
            r#"{{
                "claim_generator": "acme-cam/2.0",
                "timestamp": "{future}",
                "assertions": [{{"label": "c2pa.actions"}}],
                "signature": {{
                    "algorithm": "es256",
                    "signature_value": "sig",
                    "certificates": [
                        {{"subject": "CN=leaf", "issuer": "CN=Adobe Root CA",
                         "valid_from": "2024-01-01T00:00:00Z",
                         "valid_to": "2066-01-01T00:00:00Z"}}
                    ]
                }}
            }}"#
        );
        let report = ManifestValidator::new().validate(&manifest_bytes(&json));
        assert_eq!(report.outcome, ValidationOutcome::Invalid);
        assert!(report.errors.iter().any(|e| e.contains("future")));
    }

    #[test]
    fn test_validate_self_signed_is_valid_untrusted() {
        let json = r#"{
            "claim_generator": "home-tool/1.0",
            "timestamp": "2025-03-01T10:00:00Z",
            "assertions": [{"label": "c2pa.actions"}],
            "signature": {
                "algorithm": "es256",
                "signature_value": "sig",
                "certificates": [
                    {"subject": "CN=me", "issuer": "CN=me",
                     "valid_from": "2024-01-01T00:00:00Z",
                     "valid_to": "2066-01-01T00:00:00Z"}
                ]
            }
        }"#;
        let report = ManifestValidator::new().validate(&manifest_bytes(json));
        assert_eq!(report.outcome, ValidationOutcome::ValidUntrusted);
    }

    #[test]
    fn test_validate_missing_signature_is_invalid() {
        let json = r#"{
            "claim_generator": "acme-cam/2.0",
            "timestamp": "2025-03-01T10:00:00Z",
            "assertions": [{"label": "c2pa.actions"}]
        }"#;
        let report = ManifestValidator::new().validate(&manifest_bytes(json));
        // "no signature block" contains the critical term "signature"
        assert_eq!(report.outcome, ValidationOutcome::Invalid);
    }

    #[test]
    fn test_confidence_always_in_bounds() {
        for bytes in [
            manifest_bytes(CLEAN_MANIFEST),
            manifest_bytes("{}"),
            b"no marker at all".to_vec(),
        ] {
            let report = ManifestValidator::new().validate(&bytes);
            assert!(
                (0.0..=100.0).contains(&report.confidence_score),
                "score out of bounds: {}",
                report.confidence_score
            );
        }
    }

    #[test]
    fn test_failure_report_shape() {
        let report = ManifestValidator::failure_report("Module load timed out");
        assert_eq!(report.outcome, ValidationOutcome::Error);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.trust_level, TrustLevel::Low);
    }
}
