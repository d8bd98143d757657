//! Structural validation rules.
//!
//! Each rule is independent and contributes to either the error list or the
//! warning list, never both. Rule order determines message order in the
//! final report.

use chrono::{DateTime, Duration as ChronoDuration, Utc};

use super::records::ManifestRecord;
use crate::config::{FUTURE_TIMESTAMP_TOLERANCE, STALE_MANIFEST_AGE};

/// Issuer substrings accepted as independently trusted manifest signers.
///
/// Matching is case-insensitive substring on the issuer DN. Self-signed
/// certificates never match regardless of this list.
pub(crate) const TRUSTED_ISSUERS: &[&str] = &[
    "Adobe",
    "Truepic",
    "DigiCert",
    "Sony",
    "Leica",
    "Nikon",
    "Canon",
    "Microsoft",
    "C2PA Conformance",
];

/// Signature algorithms we recognize as standard.
const KNOWN_ALGORITHMS: &[&str] = &[
    "es256", "es384", "es512", "ps256", "ps384", "ps512", "ed25519",
];

/// Runs all structural checks against a parsed manifest.
///
/// Returns `(errors, warnings)` in rule order.
pub(crate) fn run_structural_checks(
    record: &ManifestRecord,
    now: DateTime<Utc>,
) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if record.claim_generator.is_none() {
        errors.push("Missing claim generator information".to_string());
    }

    match record.timestamp {
        None => warnings.push("Manifest has no signing timestamp".to_string()),
        Some(ts) => {
            let future_limit =
                now + ChronoDuration::from_std(FUTURE_TIMESTAMP_TOLERANCE).unwrap_or_default();
            let stale_limit =
                now - ChronoDuration::from_std(STALE_MANIFEST_AGE).unwrap_or_default();
            if ts > future_limit {
                errors.push("Manifest timestamp is in the future".to_string());
            } else if ts < stale_limit {
                warnings.push("Manifest timestamp is more than a year old".to_string());
            }
        }
    }

    match &record.signature {
        None => {
            errors.push("Manifest has no signature block".to_string());
        }
        Some(sig) => {
            if sig.certificates.is_empty() {
                errors.push("Certificate chain is empty".to_string());
            } else {
                for cert in &sig.certificates {
                    let label = cert
                        .subject
                        .as_deref()
                        .unwrap_or("<unknown subject>")
                        .to_string();
                    if !cert.is_valid(now) {
                        errors.push(format!("Certificate '{}' is not within its validity window", label));
                    }
                    if cert.is_expired(now) {
                        errors.push(format!("Certificate '{}' has expired", label));
                    }
                    if cert.is_self_signed() {
                        warnings.push(format!("Certificate '{}' is self-signed", label));
                    } else if !cert.is_trusted(TRUSTED_ISSUERS) {
                        warnings.push(format!("Certificate '{}' has an untrusted issuer", label));
                    }
                }
            }

            match &sig.algorithm {
                None => errors.push("Signature algorithm is absent".to_string()),
                Some(alg) => {
                    let alg_lower = alg.to_ascii_lowercase();
                    if !KNOWN_ALGORITHMS.contains(&alg_lower.as_str()) {
                        warnings.push(format!("Unrecognized signature algorithm '{}'", alg));
                    }
                }
            }

            if sig.signature_value.is_none() {
                errors.push("Signature value is missing".to_string());
            }
        }
    }

    if record.assertions.is_empty() {
        warnings.push("Manifest carries no assertions".to_string());
    } else if !record.has_action_assertion() {
        warnings.push("Manifest has assertions but no action assertion".to_string());
    }

    (errors, warnings)
}

/// True when an error message describes a critical failure.
///
/// Critical terms cover signature problems, corruption, invalid structures,
/// and future timestamps; any one of them makes the whole manifest invalid
/// rather than merely untrusted.
pub(crate) fn is_critical_error(error: &str) -> bool {
    let lower = error.to_ascii_lowercase();
    lower.contains("signature")
        || lower.contains("corrupt")
        || lower.contains("invalid")
        || lower.contains("future")
}
