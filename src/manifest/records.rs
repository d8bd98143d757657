//! Manifest and certificate record types.
//!
//! Every field is optional by construction: a manifest produced by an old
//! or broken generator must never crash validation, so accessors tolerate
//! absent data throughout.

use chrono::{DateTime, Utc};

/// A single provenance assertion inside a manifest.
#[derive(Debug, Clone)]
pub struct Assertion {
    /// Assertion label, e.g. `c2pa.actions` or `stds.schema-org.CreativeWork`.
    pub label: String,
    /// Raw assertion payload, if any.
    pub data: Option<serde_json::Value>,
    /// Hash binding the assertion to the claim, if present.
    pub hash: Option<String>,
}

impl Assertion {
    /// True if this assertion records an editing/creation action.
    pub fn is_action(&self) -> bool {
        let label = self.label.to_ascii_lowercase();
        label.contains("action") || label.contains("c2pa.actions")
    }
}

/// An ingredient (source asset) referenced by a manifest.
#[derive(Debug, Clone)]
pub struct Ingredient {
    pub title: Option<String>,
    pub format: Option<String>,
    /// Relationship to the claim, e.g. `parentOf` or `componentOf`.
    pub relationship: Option<String>,
}

/// Signing certificate extracted from a manifest's certificate chain.
#[derive(Debug, Clone)]
pub struct CertificateRecord {
    pub subject: Option<String>,
    pub issuer: Option<String>,
    pub serial: Option<String>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,
    /// Key purposes (serverAuth, emailProtection, ...), when available.
    pub purposes: Vec<String>,
}

impl CertificateRecord {
    /// True when `now` falls inside the certificate's validity window.
    /// A certificate missing either bound is not considered valid.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        match (self.valid_from, self.valid_to) {
            (Some(from), Some(to)) => from <= now && now <= to,
            _ => false,
        }
    }

    /// True when the certificate is expired relative to `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.valid_to.map(|to| to < now).unwrap_or(false)
    }

    /// True when subject and issuer are identical (ignoring case and
    /// surrounding whitespace).
    pub fn is_self_signed(&self) -> bool {
        match (&self.subject, &self.issuer) {
            (Some(subject), Some(issuer)) => {
                subject.trim().eq_ignore_ascii_case(issuer.trim())
            }
            _ => false,
        }
    }

    /// True when the issuer matches the trusted-issuer allow-list.
    ///
    /// A self-signed certificate is never trusted, regardless of its
    /// validity window or issuer string.
    pub fn is_trusted(&self, trusted_issuers: &[&str]) -> bool {
        if self.is_self_signed() {
            return false;
        }
        let Some(issuer) = &self.issuer else {
            return false;
        };
        let issuer_lower = issuer.to_ascii_lowercase();
        trusted_issuers
            .iter()
            .any(|t| issuer_lower.contains(&t.to_ascii_lowercase()))
    }
}

/// Signature block of a manifest.
#[derive(Debug, Clone)]
pub struct SignatureInfo {
    /// Signature algorithm identifier, e.g. `es256` or `ps256`.
    pub algorithm: Option<String>,
    /// Certificate chain, leaf first.
    pub certificates: Vec<CertificateRecord>,
    /// Raw signature value (base64/hex), presence-checked only.
    pub signature_value: Option<String>,
    /// RFC 3161 timestamp info, if the signature was countersigned.
    pub timestamp_info: Option<String>,
}

/// Parsed embedded authenticity manifest.
#[derive(Debug, Clone, Default)]
pub struct ManifestRecord {
    pub claim_generator: Option<String>,
    pub title: Option<String>,
    pub format: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub producer: Option<String>,
    pub assertions: Vec<Assertion>,
    pub ingredients: Vec<Ingredient>,
    pub signature: Option<SignatureInfo>,
}

impl ManifestRecord {
    /// True if any assertion is an action-type assertion.
    pub fn has_action_assertion(&self) -> bool {
        self.assertions.iter().any(Assertion::is_action)
    }
}
