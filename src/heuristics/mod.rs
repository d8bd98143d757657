//! Heuristic fallback analysis for media without verifiable provenance.
//!
//! When no manifest is embedded (the common case), the verdict rests on
//! four weaker signal groups gathered concurrently: response headers, the
//! URL itself, the leading bytes of the file, and network behavior. Each
//! sub-scan is failure-tolerant; a sub-scan that cannot run contributes
//! nothing rather than failing the analysis.

mod metadata;
mod signals;
mod signatures;
mod structure;
mod url_analysis;

use std::time::Duration;

use tldextract::{TldExtractor, TldOption};

use crate::config::{
    FALLBACK_WEIGHT_ANOMALY, FALLBACK_WEIGHT_METADATA, FALLBACK_WEIGHT_SIGNATURE,
    FALLBACK_WEIGHT_STRUCTURE, SUSPICIOUSLY_FAST_RESPONSE,
};
use crate::fetch::HeadInfo;

pub use signals::{
    FileSignals, Finding, FindingKind, HeaderSignals, NetworkSignals, SignalBundle, UrlSignals,
};
pub use structure::sniff_media_type;
pub(crate) use url_analysis::{analyze_url, manifest_claim_is_suspect};

/// Outcome of a full fallback analysis pass.
#[derive(Debug, Clone)]
pub struct FallbackReport {
    /// The raw signal groups, for callers that want the evidence.
    pub bundle: SignalBundle,
    /// Blended suspicion score in `[0, 1]`.
    pub suspicion: f64,
    /// True when the evidence suggests professional provenance (camera
    /// metadata, professional editing software) worth manifest-signing.
    pub recommends_upgrade: bool,
    /// Individual findings that fed the score, most confident first.
    pub findings: Vec<Finding>,
}

/// Header names that hint at provenance tooling upstream.
const PROVENANCE_HEADERS: &[&str] = &["x-c2pa-manifest", "content-credentials", "x-content-credentials"];

/// Header names set by common CDNs.
const CDN_HEADERS: &[&str] = &["cf-ray", "x-amz-cf-id", "x-cache", "x-fastly-request-id", "x-akamai-request-id"];

/// Runs the four fallback sub-scans and blends their scores.
pub struct FallbackAnalyzer {
    extractor: TldExtractor,
}

impl Default for FallbackAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl FallbackAnalyzer {
    pub fn new() -> Self {
        Self {
            extractor: TldExtractor::new(TldOption::default()),
        }
    }

    /// Analyzes whatever evidence is available for `url`.
    ///
    /// # Arguments
    /// * `url` - The media URL under scan.
    /// * `head` - HEAD response info, if the request succeeded.
    /// * `prefix` - Leading bytes of the file, if a range fetch succeeded.
    /// * `load_time` - Observed time-to-first-response, if measured.
    pub async fn analyze(
        &self,
        url: &str,
        head: Option<&HeadInfo>,
        prefix: Option<&[u8]>,
        load_time: Option<Duration>,
    ) -> FallbackReport {
        let (header_signals, url_signals, file_scan, network_signals) = futures::join!(
            async { head.map(scan_headers) },
            async { url_analysis::analyze_url(&self.extractor, url) },
            async { prefix.map(scan_bytes) },
            async { scan_network(head, load_time) },
        );

        let mut findings: Vec<Finding> = Vec::new();
        let mut bundle = SignalBundle {
            headers: header_signals,
            url: url_signals,
            file: None,
            network: Some(network_signals.clone()),
        };

        if let Some((file_signals, mut file_findings)) = file_scan {
            bundle.file = Some(file_signals);
            findings.append(&mut file_findings);
        }

        let suspicion = blend_suspicion(&bundle, &findings);
        let recommends_upgrade = should_upgrade(&bundle);

        findings.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        FallbackReport {
            bundle,
            suspicion,
            recommends_upgrade,
            findings,
        }
    }
}

fn scan_headers(head: &HeadInfo) -> HeaderSignals {
    let provenance_hint = PROVENANCE_HEADERS.iter().any(|h| head.header(h).is_some());
    let cdn = CDN_HEADERS
        .iter()
        .find(|h| head.header(h).is_some())
        .map(|h| h.to_string());
    HeaderSignals {
        content_type: head.content_type().map(str::to_string),
        content_length: head.content_length(),
        provenance_hint,
        cdn,
    }
}

fn scan_network(head: Option<&HeadInfo>, load_time: Option<Duration>) -> NetworkSignals {
    let suspiciously_fast = load_time
        .map(|t| t < SUSPICIOUSLY_FAST_RESPONSE && t > Duration::ZERO)
        .unwrap_or(false);
    NetworkSignals {
        load_time: load_time.unwrap_or_default(),
        suspiciously_fast,
        rate_limited: head.map(|h| h.status == 429).unwrap_or(false),
        errored: head.is_none(),
    }
}

/// Runs the three byte-level scans over the file prefix.
fn scan_bytes(prefix: &[u8]) -> (FileSignals, Vec<Finding>) {
    let metadata = metadata::scan_metadata(prefix);
    let signatures = signatures::scan_signatures(prefix);
    let structure = structure::scan_structure(prefix);

    let mut findings = Vec::new();
    findings.extend(metadata.findings);
    findings.extend(signatures.findings);
    findings.extend(structure.findings);

    let file_signals = FileSignals {
        manifest_marker: crate::manifest::has_manifest_marker(prefix),
        camera_model: metadata.camera_model,
        has_gps: metadata.has_gps,
        editing_tool: metadata.editing_tool.or(signatures.editing_tool),
        generation_markers: signatures.generation_markers,
        structurally_valid: structure.structurally_valid,
    };

    // Absence of any metadata container in an image prefix is itself a
    // weak signal: cameras write EXIF, generators often do not.
    if !metadata.has_metadata_container && structure.kind.is_image() {
        findings.push(Finding {
            kind: FindingKind::Metadata,
            label: "metadata-absent".into(),
            description: "No EXIF/XMP metadata container in file prefix".into(),
            confidence: 0.4,
            suspicious: true,
        });
    }

    (file_signals, findings)
}

/// Weighted blend of the four signal groups into one suspicion score.
fn blend_suspicion(bundle: &SignalBundle, findings: &[Finding]) -> f64 {
    let component = |kind: FindingKind| -> f64 {
        findings
            .iter()
            .filter(|f| f.kind == kind && f.suspicious)
            .map(|f| f.confidence)
            .fold(0.0f64, f64::max)
    };

    let metadata_score = component(FindingKind::Metadata);
    let mut signature_score = component(FindingKind::Signature);
    let structure_score = component(FindingKind::Structure);
    let mut anomaly_score = component(FindingKind::Anomaly);

    if let Some(url) = &bundle.url {
        anomaly_score = anomaly_score.max(url.suspicion_score);
        signature_score = signature_score.max(url.generated_likelihood);
    }
    if let Some(network) = &bundle.network {
        if network.suspiciously_fast {
            anomaly_score = anomaly_score.max(0.5);
        }
        if network.rate_limited {
            anomaly_score = anomaly_score.max(0.3);
        }
    }

    let mut suspicion = FALLBACK_WEIGHT_METADATA * metadata_score
        + FALLBACK_WEIGHT_SIGNATURE * signature_score
        + FALLBACK_WEIGHT_STRUCTURE * structure_score
        + FALLBACK_WEIGHT_ANOMALY * anomaly_score;

    // Strong positive provenance evidence offsets weak negatives
    if let Some(url) = &bundle.url {
        suspicion -= url.trust_score * 0.2;
    }
    if let Some(file) = &bundle.file {
        if file.camera_model.is_some() {
            suspicion -= 0.1;
        }
    }

    suspicion.clamp(0.0, 1.0)
}

/// Professional provenance present but unsigned: manifest adoption would
/// let this media carry verifiable credentials.
fn should_upgrade(bundle: &SignalBundle) -> bool {
    match &bundle.file {
        Some(file) => {
            file.camera_model.is_some()
                || (file.editing_tool.is_some() && file.generation_markers.is_empty())
        }
        None => false,
    }
}
