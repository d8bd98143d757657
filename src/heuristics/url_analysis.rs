//! URL and domain reputation analysis.
//!
//! Pattern-matches the URL against curated suspicious-pattern and
//! trusted-domain lists, a disposable-TLD blacklist, shortener and
//! temporary-hosting lists, and inspects the query string for explicit
//! generation markers. Scores combine additively and cap at 1.0; the
//! weights are tuned heuristics.

use std::sync::OnceLock;

use regex::Regex;
use tldextract::TldExtractor;

use super::signals::UrlSignals;

/// URL substrings/patterns that indicate suspicious or test content.
const SUSPICIOUS_PATTERNS: &[&str] = &[
    r"deep-?fake",
    r"face-?swap",
    r"ai-?gen(erated)?",
    r"synthetic",
    r"\bfake\b",
    r"malware-test",
    r"test-fake",
    r"not-?real",
];

/// Keywords indicating generated content in paths or query strings.
const GENERATED_KEYWORDS: &[&str] = &[
    "generated",
    "midjourney",
    "dalle",
    "stable-diffusion",
    "ai-art",
    "txt2img",
    "img2img",
];

/// Domains whose media we extend baseline trust to.
const TRUSTED_DOMAINS: &[&str] = &[
    "wikipedia.org",
    "wikimedia.org",
    "nytimes.com",
    "bbc.co.uk",
    "reuters.com",
    "apnews.com",
    "gettyimages.com",
    "nasa.gov",
    "smithsonianmag.com",
    "nationalgeographic.com",
];

/// TLDs with a history of abuse from free registration.
const TLD_BLACKLIST: &[&str] = &["tk", "ml", "ga", "cf", "gq", "top", "click", "zip"];

/// Link shorteners (the destination is opaque).
const SHORTENERS: &[&str] = &[
    "bit.ly", "tinyurl.com", "t.co", "goo.gl", "is.gd", "ow.ly", "buff.ly",
];

/// Temporary/anonymous file hosts.
const TEMP_HOSTS: &[&str] = &[
    "file.io",
    "anonfiles.com",
    "catbox.moe",
    "0x0.st",
    "transfer.sh",
    "tmpfiles.org",
    "litterbox.catbox.moe",
];

fn suspicious_regexes() -> &'static Vec<Regex> {
    static REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();
    REGEXES.get_or_init(|| {
        SUSPICIOUS_PATTERNS
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect()
    })
}

/// Analyzes a URL's reputation signals.
///
/// Returns `None` only when the URL cannot be parsed at all; partial
/// extraction failures (e.g. IP-address hosts) degrade to absent fields.
pub(crate) fn analyze_url(extractor: &TldExtractor, raw_url: &str) -> Option<UrlSignals> {
    let parsed = url::Url::parse(raw_url).ok()?;
    let host = parsed.host_str().unwrap_or_default().to_ascii_lowercase();
    let url_lower = raw_url.to_ascii_lowercase();

    let mut signals = UrlSignals::default();

    // Registrable domain and TLD, tolerating extraction failure
    if let Ok(result) = extractor.extract(raw_url) {
        signals.tld = result.suffix.clone();
        signals.domain = match (result.domain, result.suffix) {
            (Some(domain), Some(suffix)) => Some(format!("{}.{}", domain, suffix)),
            (Some(domain), None) => Some(domain),
            _ => None,
        };
    }

    let mut suspicion: f64 = 0.0;
    let mut generated: f64 = 0.0;

    for regex in suspicious_regexes() {
        if regex.is_match(&url_lower) {
            suspicion += 0.35;
        }
    }

    for keyword in GENERATED_KEYWORDS {
        if url_lower.contains(keyword) {
            generated += 0.4;
            suspicion += 0.2;
        }
    }

    // Query markers like ?fake=1 or ?generated=true are explicit admissions
    for (key, _) in parsed.query_pairs() {
        let key = key.to_ascii_lowercase();
        if key == "fake" || key == "generated" || key == "synthetic" || key == "ai" {
            suspicion += 0.3;
            generated += 0.3;
        }
    }

    if let Some(tld) = &signals.tld {
        let last_label = tld.rsplit('.').next().unwrap_or(tld);
        if TLD_BLACKLIST.contains(&last_label) {
            suspicion += 0.25;
        }
    }

    signals.shortener = SHORTENERS.iter().any(|s| host == *s || host.ends_with(&format!(".{s}")));
    if signals.shortener {
        suspicion += 0.2;
    }

    signals.temporary_hosting =
        TEMP_HOSTS.iter().any(|s| host == *s || host.ends_with(&format!(".{s}")));
    if signals.temporary_hosting {
        suspicion += 0.3;
    }

    let mut trust: f64 = 0.0;
    if let Some(domain) = &signals.domain {
        if TRUSTED_DOMAINS.contains(&domain.as_str()) {
            trust = 0.9;
        }
    }
    if parsed.scheme() == "https" {
        trust += 0.1;
    }

    signals.suspicion_score = suspicion.min(1.0);
    signals.generated_likelihood = generated.min(1.0);
    signals.trust_score = trust.min(1.0);
    Some(signals)
}

/// True when URL evidence is suspicious enough that a *claimed* manifest
/// should be treated as forged rather than as a trust signal.
pub(crate) fn manifest_claim_is_suspect(signals: &UrlSignals) -> bool {
    use crate::config::MANIFEST_CLAIM_SUSPICION_THRESHOLD;

    if signals.suspicion_score > MANIFEST_CLAIM_SUSPICION_THRESHOLD {
        return true;
    }
    if signals.generated_likelihood > MANIFEST_CLAIM_SUSPICION_THRESHOLD {
        return true;
    }
    if signals.temporary_hosting {
        return true;
    }
    if let Some(domain) = &signals.domain {
        let d = domain.to_ascii_lowercase();
        if d.contains("fake") || d.contains("test") || d.contains("malware") {
            return true;
        }
    }
    false
}
