//! Metadata-signature scan.
//!
//! Searches the byte prefix for known metadata container markers (EXIF,
//! XMP, Photoshop IRB) and, when found, attempts shallow field extraction:
//! camera make/model, editing software, creator, and GPS presence. This is
//! not a full EXIF parser; it pulls printable strings near known markers,
//! which is enough for provenance signals.

use super::signals::{Finding, FindingKind};

/// Metadata container markers searched in the prefix.
const EXIF_MARKER: &[u8] = b"Exif\0\0";
const XMP_MARKER: &[u8] = b"http://ns.adobe.com/xap/1.0/";
const XMP_META_TAG: &[u8] = b"<x:xmpmeta";
const PHOTOSHOP_IRB: &[u8] = b"Photoshop 3.0";

/// Camera makers recognized in metadata strings.
const CAMERA_MAKERS: &[&str] = &[
    "Canon", "NIKON", "Nikon", "SONY", "Sony", "Apple", "FUJIFILM", "OLYMPUS",
    "Panasonic", "Leica", "DJI", "GoPro", "samsung", "Google",
];

/// Editing software recognized in metadata strings. These are *benign*
/// provenance markers; they lower suspicion and suggest a professional
/// workflow worth manifest-signing.
const EDITING_SOFTWARE: &[&str] = &[
    "Adobe Photoshop",
    "Adobe Lightroom",
    "Capture One",
    "Affinity Photo",
    "GIMP",
    "darktable",
];

/// GPS-related tag names that appear as text in EXIF/XMP payloads.
const GPS_MARKERS: &[&[u8]] = &[b"GPSLatitude", b"GPSLongitude", b"exif:GPS"];

/// Shallow metadata extraction result.
#[derive(Debug, Clone, Default)]
pub(crate) struct MetadataScan {
    pub camera_model: Option<String>,
    pub editing_tool: Option<String>,
    pub has_gps: bool,
    pub has_metadata_container: bool,
    pub findings: Vec<Finding>,
}

/// Scans the byte prefix for metadata containers and extracts shallow
/// provenance fields.
pub(crate) fn scan_metadata(bytes: &[u8]) -> MetadataScan {
    let mut scan = MetadataScan::default();

    let has_container = contains(bytes, EXIF_MARKER)
        || contains(bytes, XMP_MARKER)
        || contains(bytes, XMP_META_TAG)
        || contains(bytes, PHOTOSHOP_IRB);
    scan.has_metadata_container = has_container;

    if !has_container {
        return scan;
    }

    // Permissive text view of the prefix; metadata strings are ASCII and
    // survive lossy decoding.
    let text = String::from_utf8_lossy(bytes);

    for maker in CAMERA_MAKERS {
        if text.contains(maker) {
            scan.camera_model = Some((*maker).to_string());
            scan.findings.push(Finding {
                kind: FindingKind::Metadata,
                label: format!("camera-metadata:{}", maker.to_ascii_lowercase()),
                description: format!("Camera metadata present ({})", maker),
                confidence: 0.6,
                suspicious: false,
            });
            break;
        }
    }

    for software in EDITING_SOFTWARE {
        if text.contains(software) {
            scan.editing_tool = Some((*software).to_string());
            scan.findings.push(Finding {
                kind: FindingKind::Metadata,
                label: format!("editing-metadata:{}", software.to_ascii_lowercase()),
                description: format!("Professional editing metadata present ({})", software),
                confidence: 0.5,
                suspicious: false,
            });
            break;
        }
    }

    scan.has_gps = GPS_MARKERS.iter().any(|m| contains(bytes, m));
    if scan.has_gps {
        scan.findings.push(Finding {
            kind: FindingKind::Metadata,
            label: "gps-metadata".to_string(),
            description: "GPS metadata present".to_string(),
            confidence: 0.5,
            suspicious: false,
        });
    }

    scan
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty()
        && haystack.len() >= needle.len()
        && haystack.windows(needle.len()).any(|w| w == needle)
}
