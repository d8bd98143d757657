//! Editing/generation tool-name signature scan.
//!
//! Case-insensitive substring match of the permissively-decoded byte prefix
//! against curated tool-name lists. Hits are weighted by list: generation
//! tools highest, deepfake tools next, editing tools lowest. A generation
//! tool name embedded in file bytes is near-conclusive, while an editor
//! name merely says the file was touched.

use super::signals::{Finding, FindingKind};
use crate::config::{
    SIGNATURE_CONFIDENCE_DEEPFAKE, SIGNATURE_CONFIDENCE_EDITING, SIGNATURE_CONFIDENCE_GENERATION,
};

/// AI generation tools. A hit strongly indicates synthetic content.
const GENERATION_TOOLS: &[&str] = &[
    "midjourney",
    "dall-e",
    "dalle",
    "stable diffusion",
    "stablediffusion",
    "sdxl",
    "adobe firefly",
    "imagen",
    "flux.1",
    "runway gen",
    "sora",
    "leonardo.ai",
    "ideogram",
    "novelai",
    "craiyon",
];

/// Deepfake/face-swap tools.
const DEEPFAKE_TOOLS: &[&str] = &[
    "deepfacelab",
    "faceswap",
    "simswap",
    "wav2lip",
    "roop",
    "deepswap",
    "faceapp",
    "reface",
];

/// Conventional editing software. A hit indicates the file was edited,
/// which is weak evidence on its own.
const EDITING_TOOLS: &[&str] = &[
    "photoshop",
    "lightroom",
    "gimp",
    "affinity photo",
    "capture one",
    "snapseed",
    "pixlr",
    "canva",
    "paint.net",
];

/// Result of the signature scan.
#[derive(Debug, Clone, Default)]
pub(crate) struct SignatureScan {
    pub generation_markers: Vec<String>,
    pub editing_tool: Option<String>,
    pub findings: Vec<Finding>,
}

/// Scans the byte prefix for tool-name signatures.
pub(crate) fn scan_signatures(bytes: &[u8]) -> SignatureScan {
    let text = String::from_utf8_lossy(bytes).to_ascii_lowercase();
    let mut scan = SignatureScan::default();

    for tool in GENERATION_TOOLS {
        if text.contains(tool) {
            scan.generation_markers.push((*tool).to_string());
            scan.findings.push(Finding {
                kind: FindingKind::Signature,
                label: format!("generation-tool:{tool}"),
                description: format!("AI generation tool signature found ({tool})"),
                confidence: SIGNATURE_CONFIDENCE_GENERATION,
                suspicious: true,
            });
        }
    }

    for tool in DEEPFAKE_TOOLS {
        if text.contains(tool) {
            scan.generation_markers.push((*tool).to_string());
            scan.findings.push(Finding {
                kind: FindingKind::Signature,
                label: format!("deepfake-tool:{tool}"),
                description: format!("Deepfake tool signature found ({tool})"),
                confidence: SIGNATURE_CONFIDENCE_DEEPFAKE,
                suspicious: true,
            });
        }
    }

    for tool in EDITING_TOOLS {
        if text.contains(tool) {
            if scan.editing_tool.is_none() {
                scan.editing_tool = Some((*tool).to_string());
            }
            scan.findings.push(Finding {
                kind: FindingKind::Signature,
                label: format!("editing-tool:{tool}"),
                description: format!("Editing software signature found ({tool})"),
                confidence: SIGNATURE_CONFIDENCE_EDITING,
                suspicious: false,
            });
        }
    }

    scan
}
