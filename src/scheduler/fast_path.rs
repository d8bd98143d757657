//! Network-free fast path.
//!
//! URL and domain signals alone often settle the verdict: a trusted
//! newsroom domain or a URL openly advertising generated content does not
//! need a byte-level scan. The fast path only fires when its confidence
//! clears a high bar; anything ambiguous falls through to the full
//! pipeline.

use crate::config::FAST_PATH_CONFIDENCE_THRESHOLD;
use crate::heuristics::UrlSignals;
use crate::models::Verdict;

/// A verdict the fast path is confident enough to stand behind.
#[derive(Debug, Clone)]
pub(crate) struct FastVerdict {
    pub verdict: Verdict,
    pub confidence: f64,
    pub signal: String,
    pub reason: String,
}

/// Evaluates URL signals for an early exit. `None` means the full
/// pipeline must run.
pub(crate) fn fast_verdict(signals: &UrlSignals) -> Option<FastVerdict> {
    // Overwhelming URL-level suspicion: no fetch needed to flag it
    if signals.suspicion_score > FAST_PATH_CONFIDENCE_THRESHOLD {
        return Some(FastVerdict {
            verdict: Verdict::Danger,
            confidence: signals.suspicion_score,
            signal: "url-suspicion".to_string(),
            reason: "URL matches multiple suspicious patterns".to_string(),
        });
    }
    if signals.generated_likelihood > FAST_PATH_CONFIDENCE_THRESHOLD {
        return Some(FastVerdict {
            verdict: Verdict::Danger,
            confidence: signals.generated_likelihood,
            signal: "url-generated-markers".to_string(),
            reason: "URL openly advertises generated content".to_string(),
        });
    }
    // Trusted domain with nothing pointing the other way
    if signals.trust_score > FAST_PATH_CONFIDENCE_THRESHOLD
        && signals.suspicion_score == 0.0
        && signals.generated_likelihood == 0.0
        && !signals.temporary_hosting
        && !signals.shortener
    {
        return Some(FastVerdict {
            verdict: Verdict::Safe,
            confidence: signals.trust_score,
            signal: "trusted-domain".to_string(),
            reason: "Domain is on the trusted publisher list".to_string(),
        });
    }
    None
}
