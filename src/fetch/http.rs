//! HTTP byte source over `reqwest`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;

use super::retry::{is_retriable_fetch_error, map_reqwest_error};
use super::{ByteSource, HeadInfo};
use crate::config::{
    FETCH_RETRY_ATTEMPTS, FETCH_RETRY_BASE_MS, HEAD_REQUEST_TIMEOUT, RANGE_REQUEST_TIMEOUT,
};
use crate::error_handling::FetchError;

/// [`ByteSource`] implementation over a shared `reqwest` client.
///
/// Every request carries its own timeout; transient failures (timeouts,
/// 5xx, 429, network errors) are retried with exponential backoff and
/// jitter, permanent ones fail immediately.
pub struct HttpByteSource {
    client: Arc<reqwest::Client>,
}

impl HttpByteSource {
    pub fn new(client: Arc<reqwest::Client>) -> Self {
        HttpByteSource { client }
    }

    fn retry_strategy() -> impl Iterator<Item = std::time::Duration> {
        ExponentialBackoff::from_millis(FETCH_RETRY_BASE_MS)
            .map(jitter)
            .take(FETCH_RETRY_ATTEMPTS)
    }

    async fn head_once(&self, url: &str) -> Result<HeadInfo, FetchError> {
        let timeout_ms = HEAD_REQUEST_TIMEOUT.as_millis() as u64;
        let response = tokio::time::timeout(
            HEAD_REQUEST_TIMEOUT,
            self.client.head(url).send(),
        )
        .await
        .map_err(|_| FetchError::Timeout(timeout_ms))?
        .map_err(|e| map_reqwest_error(e, timeout_ms))?;

        let status = response.status().as_u16();
        if response.status().is_server_error() {
            return Err(FetchError::Status(status));
        }

        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(name.as_str().to_ascii_lowercase(), v.to_string());
            }
        }
        Ok(HeadInfo { status, headers })
    }

    async fn range_once(&self, url: &str, start: u64, end: u64) -> Result<Vec<u8>, FetchError> {
        let timeout_ms = RANGE_REQUEST_TIMEOUT.as_millis() as u64;
        let request = self
            .client
            .get(url)
            .header(reqwest::header::RANGE, format!("bytes={}-{}", start, end.saturating_sub(1)));

        let response = tokio::time::timeout(RANGE_REQUEST_TIMEOUT, request.send())
            .await
            .map_err(|_| FetchError::Timeout(timeout_ms))?
            .map_err(|e| map_reqwest_error(e, timeout_ms))?;

        let status = response.status();
        if status.as_u16() == 416 {
            return Err(FetchError::RangeNotSupported(format!(
                "server rejected range {}-{}",
                start, end
            )));
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        // A 200 response means the server ignored the range header and is
        // sending the whole body; truncate to the requested window.
        let full_body = status.as_u16() == 200;
        let bytes = tokio::time::timeout(RANGE_REQUEST_TIMEOUT, response.bytes())
            .await
            .map_err(|_| FetchError::Timeout(timeout_ms))?
            .map_err(|e| map_reqwest_error(e, timeout_ms))?;

        let mut data = bytes.to_vec();
        if full_body {
            let want = (end.saturating_sub(start)) as usize;
            data.truncate(want);
        }
        Ok(data)
    }
}

#[async_trait]
impl ByteSource for HttpByteSource {
    async fn head(&self, url: &str) -> Result<HeadInfo, FetchError> {
        RetryIf::spawn(
            Self::retry_strategy(),
            || self.head_once(url),
            is_retriable_fetch_error,
        )
        .await
    }

    async fn range(&self, url: &str, start: u64, end: u64) -> Result<Vec<u8>, FetchError> {
        RetryIf::spawn(
            Self::retry_strategy(),
            || self.range_once(url, start, end),
            is_retriable_fetch_error,
        )
        .await
    }
}
