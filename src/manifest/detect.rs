//! Cheap manifest container detection.
//!
//! A full manifest parse is expensive; this scan is a single linear pass
//! over the byte prefix looking for container markers, so a file with no
//! manifest costs O(bytes scanned) and nothing more.

/// Binary and textual markers that indicate an embedded manifest container.
///
/// Covers JUMBF box types (`jumb`, `jumd`), the C2PA box brand, the URN
/// used inside claim payloads, and identifiers older generators embedded
/// as plain text.
const MANIFEST_MARKERS: &[&[u8]] = &[
    b"jumb",
    b"jumd",
    b"c2pa",
    b"urn:c2pa",
    b"urn:uuid:c2pa",
    b"contentauth",
    b"cai:",
    b"c2pa.manifest",
];

/// JPEG APP11 marker, the segment JUMBF boxes are carried in.
const JPEG_APP11: [u8; 2] = [0xFF, 0xEB];

/// Returns the offset of the first manifest marker in `bytes`, or `None`
/// when no marker is present.
pub(crate) fn find_manifest_marker(bytes: &[u8]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for marker in MANIFEST_MARKERS {
        if let Some(pos) = find_subsequence(bytes, marker) {
            best = Some(best.map_or(pos, |b: usize| b.min(pos)));
        }
    }
    // An APP11 segment alone is only a hint; it counts as a marker because
    // JUMBF payloads always ride in APP11 for JPEG.
    if let Some(pos) = find_subsequence(bytes, &JPEG_APP11) {
        best = Some(best.map_or(pos, |b: usize| b.min(pos)));
    }
    best
}

/// True when the byte prefix contains any manifest container marker.
pub fn has_manifest_marker(bytes: &[u8]) -> bool {
    find_manifest_marker(bytes).is_some()
}

/// Naive subsequence search; prefixes are small (tens of KB) so this is
/// fast enough without a substring-search dependency.
fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_marker_in_plain_jpeg() {
        // SOI + APP0/JFIF + filler: no manifest markers
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        bytes.extend_from_slice(b"JFIF\0");
        bytes.extend(std::iter::repeat(0u8).take(256));
        assert!(!has_manifest_marker(&bytes));
    }

    #[test]
    fn test_jumbf_box_marker() {
        let mut bytes = vec![0u8; 32];
        bytes.extend_from_slice(b"\x00\x00\x00\x20jumb");
        assert!(has_manifest_marker(&bytes));
        assert_eq!(find_manifest_marker(&bytes), Some(36));
    }

    #[test]
    fn test_textual_urn_marker() {
        let mut bytes = b"prefix....".to_vec();
        bytes.extend_from_slice(b"urn:c2pa:claim");
        assert!(has_manifest_marker(&bytes));
    }

    #[test]
    fn test_app11_segment_counts_as_marker() {
        let bytes = [0xFF, 0xD8, 0xFF, 0xEB, 0x00, 0x08];
        assert!(has_manifest_marker(&bytes));
    }

    #[test]
    fn test_earliest_marker_wins() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"..c2pa..");
        bytes.extend_from_slice(b"....jumb");
        assert_eq!(find_manifest_marker(&bytes), Some(2));
    }

    #[test]
    fn test_empty_input() {
        assert!(!has_manifest_marker(&[]));
    }
}
