// ABOUTME: HTTP client construction with the timeouts used for Podio calls
// ABOUTME: Separate presets for the token endpoint and for regular API traffic

use crate::constants::defaults;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// `User-Agent` sent on every request
pub const USER_AGENT: &str = concat!("podio-cli/", env!("CARGO_PKG_VERSION"));

/// Create a new HTTP client with custom timeout settings
///
/// # Arguments
/// * `timeout_secs` - Request timeout in seconds
/// * `connect_timeout_secs` - Connection timeout in seconds
///
/// Falls back to a default client if the builder fails.
#[must_use]
pub fn create_client_with_timeout(timeout_secs: u64, connect_timeout_secs: u64) -> Client {
    ClientBuilder::new()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Client for token exchanges, which should be fast
#[must_use]
pub fn oauth_client() -> Client {
    create_client_with_timeout(
        defaults::OAUTH_TIMEOUT_SECS,
        defaults::CONNECT_TIMEOUT_SECS,
    )
}

/// Client for regular API calls
#[must_use]
pub fn api_client(timeout_secs: u64) -> Client {
    create_client_with_timeout(timeout_secs, defaults::CONNECT_TIMEOUT_SECS)
}
