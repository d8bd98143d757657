//! HTTP client initialization.

use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::Config;

/// Overall request timeout; individual operations apply tighter ones.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Initializes the shared HTTP client.
///
/// Configured with the user agent from [`Config`], gzip decompression, a
/// conservative overall timeout, and redirect following. Range and HEAD
/// operations apply their own tighter timeouts on top.
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_client(config: &Config) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .timeout(CLIENT_TIMEOUT)
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(Arc::new(client))
}
