//! Manifest confidence scoring.
//!
//! The confidence score is a weighted sum over four independently-scored
//! buckets: validation-status base, certificate-chain quality, manifest
//! completeness, and an error/warning penalty. Weights live in
//! `config::constants` and are tuned heuristics.

use chrono::{DateTime, Utc};

use super::records::ManifestRecord;
use super::rules::{is_critical_error, TRUSTED_ISSUERS};
use super::{TrustLevel, ValidationOutcome};
use crate::config::{
    MANIFEST_WEIGHT_CERTS, MANIFEST_WEIGHT_COMPLETENESS, MANIFEST_WEIGHT_PENALTY,
    MANIFEST_WEIGHT_STATUS, TRUST_HIGH_THRESHOLD, TRUST_MEDIUM_THRESHOLD,
};

/// Computes the confidence score in [0, 100] for a validated manifest.
pub(crate) fn confidence_score(
    outcome: ValidationOutcome,
    record: Option<&ManifestRecord>,
    errors: &[String],
    warnings: &[String],
    now: DateTime<Utc>,
) -> f64 {
    let status = status_bucket(outcome);
    let certs = record.map(|r| certificate_bucket(r, now)).unwrap_or(0.0);
    let completeness = record.map(completeness_bucket).unwrap_or(0.0);
    let penalty = penalty_bucket(errors, warnings);

    let score = (MANIFEST_WEIGHT_STATUS * status
        + MANIFEST_WEIGHT_CERTS * certs
        + MANIFEST_WEIGHT_COMPLETENESS * completeness
        + MANIFEST_WEIGHT_PENALTY * penalty)
        * 100.0;
    score.clamp(0.0, 100.0)
}

/// Maps a confidence score to a trust level. Pure function of the score.
pub fn trust_level_for(score: f64) -> TrustLevel {
    if score >= TRUST_HIGH_THRESHOLD {
        TrustLevel::High
    } else if score >= TRUST_MEDIUM_THRESHOLD {
        TrustLevel::Medium
    } else {
        TrustLevel::Low
    }
}

fn status_bucket(outcome: ValidationOutcome) -> f64 {
    match outcome {
        ValidationOutcome::Valid => 1.0,
        ValidationOutcome::ValidUntrusted => 0.7,
        ValidationOutcome::Invalid => 0.2,
        ValidationOutcome::Error => 0.1,
        ValidationOutcome::Missing => 0.0,
    }
}

/// Certificate-chain quality: fraction of currently-valid certificates,
/// whether any issuer is trusted, and whether the whole chain is unexpired.
fn certificate_bucket(record: &ManifestRecord, now: DateTime<Utc>) -> f64 {
    let Some(sig) = &record.signature else {
        return 0.0;
    };
    if sig.certificates.is_empty() {
        return 0.0;
    }

    let total = sig.certificates.len() as f64;
    let valid = sig.certificates.iter().filter(|c| c.is_valid(now)).count() as f64;
    let any_trusted = sig.certificates.iter().any(|c| c.is_trusted(TRUSTED_ISSUERS));
    let all_unexpired = sig.certificates.iter().all(|c| !c.is_expired(now));

    let mut bucket = 0.5 * (valid / total);
    if any_trusted {
        bucket += 0.3;
    }
    if all_unexpired {
        bucket += 0.2;
    }
    bucket
}

/// Completeness: presence of generator, timestamp, signature, assertions,
/// and producer, each weighted equally.
fn completeness_bucket(record: &ManifestRecord) -> f64 {
    let mut bucket = 0.0;
    if record.claim_generator.is_some() {
        bucket += 0.2;
    }
    if record.timestamp.is_some() {
        bucket += 0.2;
    }
    if record
        .signature
        .as_ref()
        .is_some_and(|s| s.signature_value.is_some())
    {
        bucket += 0.2;
    }
    if !record.assertions.is_empty() {
        bucket += 0.2;
    }
    if record.producer.is_some() {
        bucket += 0.2;
    }
    bucket
}

/// Error/warning penalty: critical errors cost the most, minor errors
/// less, warnings least. Floors at zero.
fn penalty_bucket(errors: &[String], warnings: &[String]) -> f64 {
    let mut bucket: f64 = 1.0;
    for error in errors {
        if is_critical_error(error) {
            bucket -= 0.5;
        } else {
            bucket -= 0.25;
        }
    }
    bucket -= 0.1 * warnings.len() as f64;
    bucket.max(0.0)
}
