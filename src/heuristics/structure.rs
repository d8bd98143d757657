//! Structural-anomaly scan and media-type sniffing.
//!
//! Format-specific checks over the byte prefix. Findings here carry low
//! confidence: structural quirks also occur in legitimately re-encoded
//! media.

use super::signals::{Finding, FindingKind};
use crate::models::MediaKind;

/// Sniffs the media kind from magic bytes.
pub fn sniff_media_type(bytes: &[u8]) -> MediaKind {
    if bytes.len() < 12 {
        return MediaKind::Unknown;
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return MediaKind::Jpeg;
    }
    if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return MediaKind::Png;
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return MediaKind::Gif;
    }
    if bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        return MediaKind::WebP;
    }
    // MP4 family: size box followed by "ftyp"
    if &bytes[4..8] == b"ftyp" {
        return MediaKind::Mp4;
    }
    // EBML header (Matroska/WebM)
    if bytes.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return MediaKind::WebM;
    }
    MediaKind::Unknown
}

/// Result of the structural scan.
#[derive(Debug, Clone)]
pub(crate) struct StructureScan {
    pub kind: MediaKind,
    pub structurally_valid: bool,
    pub findings: Vec<Finding>,
}

/// Runs format-specific structural checks over the prefix.
pub(crate) fn scan_structure(bytes: &[u8]) -> StructureScan {
    let kind = sniff_media_type(bytes);
    let mut findings = Vec::new();
    let mut valid = kind != MediaKind::Unknown;

    match kind {
        MediaKind::Jpeg => {
            // Multiple SOI markers in one stream: concatenated or spliced data
            let soi_count = count_marker(bytes, &[0xFF, 0xD8, 0xFF]);
            if soi_count > 1 {
                valid = false;
                findings.push(Finding {
                    kind: FindingKind::Anomaly,
                    label: "jpeg-multiple-soi".to_string(),
                    description: format!("JPEG contains {} start-of-image markers", soi_count),
                    confidence: 0.4,
                    suspicious: true,
                });
            }
            // Generators sometimes emit long runs of identical APP segments
            let app_count = (0xE0..=0xEF)
                .map(|m| count_marker(bytes, &[0xFF, m]))
                .sum::<usize>();
            if app_count > 16 {
                findings.push(Finding {
                    kind: FindingKind::Anomaly,
                    label: "jpeg-excessive-app-segments".to_string(),
                    description: format!("JPEG has {} application segments", app_count),
                    confidence: 0.3,
                    suspicious: true,
                });
            }
        }
        MediaKind::Png => {
            // Data after IEND means the file was appended to
            if let Some(pos) = find_marker(bytes, b"IEND") {
                // IEND chunk = 4 type bytes + 4 CRC bytes
                if bytes.len() > pos + 8 {
                    findings.push(Finding {
                        kind: FindingKind::Anomaly,
                        label: "png-trailing-data".to_string(),
                        description: "PNG has data after the IEND chunk".to_string(),
                        confidence: 0.4,
                        suspicious: true,
                    });
                }
            }
        }
        MediaKind::Unknown => {
            findings.push(Finding {
                kind: FindingKind::Structure,
                label: "unrecognized-container".to_string(),
                description: "Byte prefix does not match any known media container".to_string(),
                confidence: 0.3,
                suspicious: true,
            });
        }
        _ => {}
    }

    if valid && findings.is_empty() {
        findings.push(Finding {
            kind: FindingKind::Structure,
            label: "container-well-formed".to_string(),
            description: "Container structure looks well-formed".to_string(),
            confidence: 0.3,
            suspicious: false,
        });
    }

    StructureScan {
        kind,
        structurally_valid: valid,
        findings,
    }
}

fn count_marker(haystack: &[u8], needle: &[u8]) -> usize {
    if haystack.len() < needle.len() {
        return 0;
    }
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

fn find_marker(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
