//! Fetch error retriability.

use crate::error_handling::FetchError;

/// Determines whether a fetch error is transient and worth retrying.
///
/// Retriable: timeouts, network-level failures, server errors (5xx), and
/// rate limiting (429). Not retriable: client errors (4xx except 429),
/// explicit range-request rejection, and frame-capture failures.
pub(crate) fn is_retriable_fetch_error(error: &FetchError) -> bool {
    match error {
        FetchError::Timeout(_) => true,
        FetchError::Network(_) => true,
        FetchError::Status(status) => {
            // 429 is retriable with backoff; other 4xx are permanent
            if *status == 429 {
                return true;
            }
            (500..600).contains(status)
        }
        FetchError::RangeNotSupported(_) => false,
        FetchError::FrameCapture(_) => false,
    }
}

/// Maps a `reqwest` error to our fetch taxonomy.
pub(crate) fn map_reqwest_error(error: reqwest::Error, timeout_ms: u64) -> FetchError {
    if error.is_timeout() {
        return FetchError::Timeout(timeout_ms);
    }
    if let Some(status) = error.status() {
        return FetchError::Status(status.as_u16());
    }
    FetchError::Network(error.to_string())
}
