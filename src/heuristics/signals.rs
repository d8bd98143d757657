//! Heuristic signal types.
//!
//! Each signal group is independently optional: any sub-scan may fail
//! without invalidating the rest of the bundle.

use std::time::Duration;

/// Signals derived from HTTP response headers.
#[derive(Debug, Clone, Default)]
pub struct HeaderSignals {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    /// A header hinted at embedded provenance data (e.g. a C2PA link or
    /// manifest content type).
    pub provenance_hint: bool,
    /// CDN identified from response headers, if any.
    pub cdn: Option<String>,
}

/// Signals derived from the URL and its domain.
#[derive(Debug, Clone, Default)]
pub struct UrlSignals {
    /// Accumulated suspicion in [0, 1].
    pub suspicion_score: f64,
    /// Accumulated trust in [0, 1].
    pub trust_score: f64,
    /// Likelihood the URL advertises generated content, in [0, 1].
    pub generated_likelihood: f64,
    /// Registrable domain, when extractable.
    pub domain: Option<String>,
    /// Top-level domain, when extractable.
    pub tld: Option<String>,
    /// URL points at a temporary/anonymous file host.
    pub temporary_hosting: bool,
    /// URL goes through a link shortener.
    pub shortener: bool,
}

/// Signals derived from the media byte prefix.
#[derive(Debug, Clone, Default)]
pub struct FileSignals {
    /// Manifest container markers were seen in the bytes.
    pub manifest_marker: bool,
    /// Camera make/model string found in metadata.
    pub camera_model: Option<String>,
    /// GPS metadata present.
    pub has_gps: bool,
    /// Editing software name found in metadata or byte signatures.
    pub editing_tool: Option<String>,
    /// Generation-tool markers found in the bytes.
    pub generation_markers: Vec<String>,
    /// The container structure looked well-formed.
    pub structurally_valid: bool,
}

/// Signals derived from network behavior during the fetch.
#[derive(Debug, Clone, Default)]
pub struct NetworkSignals {
    /// Time the prefix fetch took.
    pub load_time: Duration,
    /// Response arrived implausibly fast.
    pub suspiciously_fast: bool,
    /// Server hinted at rate limiting.
    pub rate_limited: bool,
    /// The fetch errored (signals below may be partial).
    pub errored: bool,
}

/// The full heuristic signal bundle. Every group is optional.
#[derive(Debug, Clone, Default)]
pub struct SignalBundle {
    pub headers: Option<HeaderSignals>,
    pub url: Option<UrlSignals>,
    pub file: Option<FileSignals>,
    pub network: Option<NetworkSignals>,
}

/// Category of a heuristic finding, used for the confidence blend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindingKind {
    /// Metadata container content (EXIF/XMP fields).
    Metadata,
    /// Tool-name byte signature (generation/deepfake/editing).
    Signature,
    /// Container structure observation.
    Structure,
    /// Format-specific structural anomaly.
    Anomaly,
}

/// One heuristic finding with its own confidence.
#[derive(Debug, Clone)]
pub struct Finding {
    pub kind: FindingKind,
    /// Short machine-usable label, e.g. `generation-tool:midjourney`.
    pub label: String,
    /// Human-readable description.
    pub description: String,
    /// Confidence in [0, 1] that this finding indicates inauthenticity.
    pub confidence: f64,
    /// True when the finding points at inauthenticity; false when it is
    /// benign or even exculpatory (camera metadata, pro editing software).
    pub suspicious: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_default_is_all_absent() {
        let bundle = SignalBundle::default();
        assert!(bundle.headers.is_none());
        assert!(bundle.url.is_none());
        assert!(bundle.file.is_none());
        assert!(bundle.network.is_none());
    }

    #[test]
    fn test_partial_bundle_is_valid() {
        // One failed sub-scan leaves its group absent without affecting others
        let bundle = SignalBundle {
            url: Some(UrlSignals {
                trust_score: 0.9,
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(bundle.url.is_some());
        assert!(bundle.file.is_none());
    }
}
