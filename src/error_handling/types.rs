//! Error type definitions.
//!
//! This module defines all error, warning, and info types used throughout
//! the crate.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Error types for byte and frame source operations.
///
/// Every variant maps to a transient or permanent fetch condition. Analyzers
/// catch these at their own boundary and degrade to absent signals; they
/// never propagate past the scheduler.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request did not complete within its timeout.
    #[error("Fetch timed out after {0} ms")]
    Timeout(u64),

    /// The server responded with a non-success status.
    #[error("HTTP status {0}")]
    Status(u16),

    /// The server rejected the range request.
    #[error("Range request not supported: {0}")]
    RangeNotSupported(String),

    /// Network-level failure (connect, DNS, TLS).
    #[error("Network error: {0}")]
    Network(String),

    /// The frame source could not seek to or capture the requested frame.
    #[error("Frame capture failed: {0}")]
    FrameCapture(String),
}

/// Categories of errors recorded during scan processing.
///
/// These feed the per-run statistics printed at the end of a batch
/// (see [`super::ScanStats`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    // Fetch errors
    HeadRequestError,
    RangeRequestError,
    FetchTimeoutError,
    // Analyzer errors
    ManifestParseError,
    ManifestResourceError,
    HeuristicsError,
    VideoMetadataError,
    VideoFrameError,
    // Scheduler errors
    TaskTimeout,
    ScanTimeout,
}

/// Warnings recorded during scan processing: missing optional data that
/// doesn't prevent a verdict but is worth tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
#[allow(clippy::enum_variant_names)]
pub enum WarningType {
    MissingContentType,
    MissingContentLength,
    MissingFrameSource,
}

/// Notable events that aren't errors or warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    CacheHit,
    FastPathExit,
    ManifestFound,
    UpgradeRecommended,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::HeadRequestError => "HEAD request error",
            ErrorType::RangeRequestError => "Range request error",
            ErrorType::FetchTimeoutError => "Fetch timeout",
            ErrorType::ManifestParseError => "Manifest parse error",
            ErrorType::ManifestResourceError => "Manifest resource error",
            ErrorType::HeuristicsError => "Heuristics error",
            ErrorType::VideoMetadataError => "Video metadata error",
            ErrorType::VideoFrameError => "Video frame error",
            ErrorType::TaskTimeout => "Task timeout",
            ErrorType::ScanTimeout => "Scan timeout",
        }
    }
}

impl WarningType {
    /// Returns a human-readable string representation of the warning type.
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningType::MissingContentType => "Missing content type",
            WarningType::MissingContentLength => "Missing content length",
            WarningType::MissingFrameSource => "Missing frame source",
        }
    }
}

impl InfoType {
    /// Returns a human-readable string representation of the info type.
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::CacheHit => "Cache hit",
            InfoType::FastPathExit => "Fast path exit",
            InfoType::ManifestFound => "Manifest found",
            InfoType::UpgradeRecommended => "Manifest signing recommended",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_error_type_as_str() {
        assert_eq!(ErrorType::ScanTimeout.as_str(), "Scan timeout");
        assert_eq!(ErrorType::HeadRequestError.as_str(), "HEAD request error");
    }

    #[test]
    fn test_all_error_types_have_strings() {
        for error in ErrorType::iter() {
            assert!(!error.as_str().is_empty());
        }
        for warning in WarningType::iter() {
            assert!(!warning.as_str().is_empty());
        }
        for info in InfoType::iter() {
            assert!(!info.as_str().is_empty());
        }
    }

    #[test]
    fn test_fetch_error_display() {
        let e = FetchError::Timeout(3000);
        assert!(e.to_string().contains("3000"));
        let e = FetchError::Status(404);
        assert!(e.to_string().contains("404"));
    }
}
