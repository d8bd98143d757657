//! Defensive manifest payload parsing.
//!
//! Manifest generators have shipped several generations of key names; every
//! field extraction tries an ordered list of historical variants and
//! returns "absent" rather than failing. A broken field never aborts the
//! parse of the rest of the manifest.

use base64::Engine as _;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use x509_parser::prelude::*;

use super::detect::find_manifest_marker;
use super::records::{Assertion, CertificateRecord, Ingredient, ManifestRecord, SignatureInfo};

/// Maximum number of candidate JSON objects tried inside the manifest
/// region before giving up.
const MAX_PAYLOAD_CANDIDATES: usize = 8;

/// Extracts a string field, trying each key variant in order.
///
/// This is the only sanctioned way to read manifest fields: an ordered
/// legacy-key lookup returning an `Option`, never a dynamic any-typed
/// access.
pub(crate) fn field_str(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        match value.get(key) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => continue,
        }
    }
    None
}

/// Extracts an array field, trying each key variant in order.
pub(crate) fn field_array<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Vec<Value>> {
    for key in keys {
        if let Some(Value::Array(items)) = value.get(key) {
            return Some(items);
        }
    }
    None
}

/// Extracts an object field, trying each key variant in order.
pub(crate) fn field_object<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    for key in keys {
        if let Some(v @ Value::Object(_)) = value.get(key) {
            return Some(v);
        }
    }
    None
}

/// Parses a manifest timestamp from any of the historical encodings:
/// RFC 3339, `YYYY-MM-DD HH:MM:SS`, or epoch seconds.
pub(crate) fn parse_timestamp(value: &Value, keys: &[&str]) -> Option<DateTime<Utc>> {
    for key in keys {
        match value.get(key) {
            Some(Value::String(s)) => {
                if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                    return Some(dt.with_timezone(&Utc));
                }
                if let Ok(naive) =
                    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                {
                    return Some(Utc.from_utc_datetime(&naive));
                }
            }
            Some(Value::Number(n)) => {
                if let Some(secs) = n.as_i64() {
                    if let Some(dt) = Utc.timestamp_opt(secs, 0).single() {
                        return Some(dt);
                    }
                }
            }
            _ => continue,
        }
    }
    None
}

/// Parses the manifest record out of a byte prefix.
///
/// Returns `None` when no JSON claim payload could be decoded from the
/// manifest region. Individual field failures degrade to absent fields.
pub(crate) fn parse_manifest(bytes: &[u8]) -> Option<ManifestRecord> {
    let start = find_manifest_marker(bytes)?;
    let payload = extract_json_payload(&bytes[start..])?;
    Some(record_from_payload(&payload))
}

/// Builds a [`ManifestRecord`] from a decoded claim payload, tolerating
/// absent or malformed fields throughout.
pub(crate) fn record_from_payload(payload: &Value) -> ManifestRecord {
    let signature = field_object(
        payload,
        &["signature", "signature_info", "signatureInfo", "sig"],
    )
    .map(parse_signature);

    ManifestRecord {
        claim_generator: field_str(
            payload,
            &[
                "claim_generator",
                "claimGenerator",
                "generator",
                "claim_generator_info",
            ],
        ),
        title: field_str(payload, &["title", "dc:title", "name"]),
        format: field_str(payload, &["format", "dc:format", "mime_type", "mimeType"]),
        timestamp: parse_timestamp(
            payload,
            &["timestamp", "signing_time", "signingTime", "time", "date"],
        ),
        producer: field_str(payload, &["producer", "author", "creator", "signed_by"]),
        assertions: parse_assertions(payload),
        ingredients: parse_ingredients(payload),
        signature,
    }
}

fn parse_assertions(payload: &Value) -> Vec<Assertion> {
    let Some(items) = field_array(payload, &["assertions", "claims", "assertion_store"]) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            // An assertion without a label is unusable; everything else is
            // optional.
            let label = field_str(item, &["label", "type", "kind"])?;
            Some(Assertion {
                label,
                data: item.get("data").cloned(),
                hash: field_str(item, &["hash", "digest"]),
            })
        })
        .collect()
}

fn parse_ingredients(payload: &Value) -> Vec<Ingredient> {
    let Some(items) = field_array(payload, &["ingredients", "sources", "parents"]) else {
        return Vec::new();
    };
    items
        .iter()
        .map(|item| Ingredient {
            title: field_str(item, &["title", "name", "dc:title"]),
            format: field_str(item, &["format", "mime_type", "mimeType"]),
            relationship: field_str(item, &["relationship", "relation", "rel"]),
        })
        .collect()
}

fn parse_signature(sig: &Value) -> SignatureInfo {
    let certificates = field_array(sig, &["certificates", "cert_chain", "certChain", "x5chain"])
        .map(|items| items.iter().filter_map(parse_certificate).collect())
        .unwrap_or_default();

    SignatureInfo {
        algorithm: field_str(sig, &["algorithm", "alg", "sig_alg", "sigAlg"]),
        certificates,
        signature_value: field_str(sig, &["signature_value", "signatureValue", "value", "sig"]),
        timestamp_info: field_str(sig, &["timestamp_info", "timestampInfo", "tsa", "time_authority"]),
    }
}

/// Parses one certificate entry. A string entry is treated as base64 DER
/// and handed to `x509-parser`; an object entry is read field-by-field.
/// Anything unparseable yields `None` rather than an error.
fn parse_certificate(entry: &Value) -> Option<CertificateRecord> {
    match entry {
        Value::String(blob) => parse_der_certificate(blob),
        Value::Object(_) => Some(CertificateRecord {
            subject: field_str(entry, &["subject", "subject_name", "subjectName"]),
            issuer: field_str(entry, &["issuer", "issuer_name", "issuerName"]),
            serial: field_str(entry, &["serial", "serial_number", "serialNumber"]),
            valid_from: parse_timestamp(entry, &["valid_from", "validFrom", "not_before", "notBefore"]),
            valid_to: parse_timestamp(entry, &["valid_to", "validTo", "not_after", "notAfter"]),
            purposes: field_array(entry, &["purposes", "key_usage", "keyUsage"])
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default(),
        }),
        _ => None,
    }
}

/// Decodes a base64 DER blob and extracts the fields we validate against.
fn parse_der_certificate(blob: &str) -> Option<CertificateRecord> {
    let der = base64::engine::general_purpose::STANDARD
        .decode(blob.trim())
        .ok()?;
    let (_, cert) = X509Certificate::from_der(&der).ok()?;

    let valid_from = Utc
        .timestamp_opt(cert.validity().not_before.timestamp(), 0)
        .single();
    let valid_to = Utc
        .timestamp_opt(cert.validity().not_after.timestamp(), 0)
        .single();

    let mut purposes = Vec::new();
    for ext in cert.extensions() {
        if let ParsedExtension::ExtendedKeyUsage(eku) = ext.parsed_extension() {
            if eku.server_auth {
                purposes.push("serverAuth".to_string());
            }
            if eku.client_auth {
                purposes.push("clientAuth".to_string());
            }
            if eku.code_signing {
                purposes.push("codeSigning".to_string());
            }
            if eku.email_protection {
                purposes.push("emailProtection".to_string());
            }
            if eku.time_stamping {
                purposes.push("timeStamping".to_string());
            }
            if eku.ocsp_signing {
                purposes.push("ocspSigning".to_string());
            }
        }
    }

    Some(CertificateRecord {
        subject: Some(cert.subject().to_string()),
        issuer: Some(cert.issuer().to_string()),
        serial: Some(cert.raw_serial_as_string()),
        valid_from,
        valid_to,
        purposes,
    })
}

/// Finds and decodes the first complete JSON object in the manifest
/// region. Tries successive `{` candidates because container headers can
/// contain stray brace bytes.
fn extract_json_payload(region: &[u8]) -> Option<Value> {
    let mut attempts = 0;
    let mut offset = 0;
    while attempts < MAX_PAYLOAD_CANDIDATES {
        let start = region[offset..].iter().position(|&b| b == b'{')? + offset;
        if let Some(end) = balanced_object_end(&region[start..]) {
            let candidate = &region[start..start + end];
            if let Ok(value) = serde_json::from_slice::<Value>(candidate) {
                if value.is_object() {
                    return Some(value);
                }
            }
        }
        offset = start + 1;
        attempts += 1;
    }
    None
}

/// Returns the exclusive end index of a balanced JSON object starting at
/// byte 0, honoring string literals and escapes.
fn balanced_object_end(bytes: &[u8]) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap_payload(json: &str) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8]; // JPEG SOI
        bytes.extend_from_slice(b"\x00\x00\x00\x40jumbc2pa");
        bytes.extend_from_slice(json.as_bytes());
        bytes
    }

    #[test]
    fn test_field_str_legacy_variants() {
        let v: Value =
            serde_json::from_str(r#"{"claimGenerator": "acme-cam/2.0"}"#).unwrap();
        let got = field_str(&v, &["claim_generator", "claimGenerator", "generator"]);
        assert_eq!(got, Some("acme-cam/2.0".to_string()));
    }

    #[test]
    fn test_field_str_absent() {
        let v: Value = serde_json::from_str(r#"{"other": 1}"#).unwrap();
        assert_eq!(field_str(&v, &["claim_generator", "generator"]), None);
    }

    #[test]
    fn test_parse_timestamp_rfc3339() {
        let v: Value =
            serde_json::from_str(r#"{"timestamp": "2025-03-01T10:00:00Z"}"#).unwrap();
        let ts = parse_timestamp(&v, &["timestamp"]).unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-03-01T10:00:00+00:00");
    }

    #[test]
    fn test_parse_timestamp_epoch_seconds() {
        let v: Value = serde_json::from_str(r#"{"time": 1700000000}"#).unwrap();
        assert!(parse_timestamp(&v, &["timestamp", "time"]).is_some());
    }

    #[test]
    fn test_parse_timestamp_garbage_is_absent() {
        let v: Value = serde_json::from_str(r#"{"timestamp": "yesterday-ish"}"#).unwrap();
        assert_eq!(parse_timestamp(&v, &["timestamp"]), None);
    }

    #[test]
    fn test_parse_manifest_full() {
        let json = r#"{
            "claim_generator": "acme-cam/2.0",
            "title": "IMG_0042",
            "format": "image/jpeg",
            "timestamp": "2025-03-01T10:00:00Z",
            "producer": "Acme Camera",
            "assertions": [
                {"label": "c2pa.actions", "hash": "abc123"},
                {"label": "stds.exif"}
            ],
            "ingredients": [{"title": "raw", "relationship": "parentOf"}],
            "signature": {
                "algorithm": "es256",
                "signature_value": "sig-bytes",
                "certificates": [
                    {"subject": "CN=leaf", "issuer": "CN=Adobe Root CA",
                     "valid_from": "2024-01-01T00:00:00Z",
                     "valid_to": "2030-01-01T00:00:00Z"}
                ]
            }
        }"#;
        let bytes = wrap_payload(json);
        let record = parse_manifest(&bytes).expect("manifest should parse");
        assert_eq!(record.claim_generator.as_deref(), Some("acme-cam/2.0"));
        assert_eq!(record.assertions.len(), 2);
        assert!(record.has_action_assertion());
        assert_eq!(record.ingredients.len(), 1);
        let sig = record.signature.unwrap();
        assert_eq!(sig.algorithm.as_deref(), Some("es256"));
        assert_eq!(sig.certificates.len(), 1);
        assert_eq!(sig.certificates[0].issuer.as_deref(), Some("CN=Adobe Root CA"));
    }

    #[test]
    fn test_parse_manifest_broken_assertion_does_not_abort() {
        // Second assertion has no label and is dropped; the rest parses.
        let json = r#"{
            "generator": "legacy-tool",
            "assertions": [{"label": "c2pa.actions"}, {"data": 42}]
        }"#;
        let bytes = wrap_payload(json);
        let record = parse_manifest(&bytes).unwrap();
        assert_eq!(record.claim_generator.as_deref(), Some("legacy-tool"));
        assert_eq!(record.assertions.len(), 1);
    }

    #[test]
    fn test_parse_manifest_no_payload() {
        // Marker present but no JSON object follows
        let mut bytes = vec![0u8; 16];
        bytes.extend_from_slice(b"jumb");
        bytes.extend(std::iter::repeat(0xAAu8).take(64));
        assert!(parse_manifest(&bytes).is_none());
    }

    #[test]
    fn test_parse_manifest_no_marker() {
        assert!(parse_manifest(b"plain bytes without anything").is_none());
    }

    #[test]
    fn test_extract_payload_skips_stray_braces() {
        // A stray '{' in the container header precedes the real payload.
        let mut bytes = b"jumb\x00{\x01\x02".to_vec();
        bytes.extend_from_slice(br#"{"generator": "t"}"#);
        let record = parse_manifest(&bytes).unwrap();
        assert_eq!(record.claim_generator.as_deref(), Some("t"));
    }

    #[test]
    fn test_balanced_object_with_nested_strings() {
        let json = br#"{"a": "brace } in string", "b": {"c": 1}}"#;
        assert_eq!(balanced_object_end(json), Some(json.len()));
    }
}
