// ABOUTME: Configuration management module for credentials, retry policy, and API endpoints
// ABOUTME: Resolves layered dotenv sources once at startup and validates them eagerly
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//! Configuration module for the Podio CLI
//!
//! - **Environment**: layered lookup over the process environment and dotenv files
//! - **Store**: credential loading and atomic token persistence
//! - **Credentials**: immutable snapshot consumed by auth resolution
//! - **Retry**: validated backoff settings
//! - **Api**: base URLs and timeouts

/// API base URLs and timeouts
pub mod api;
/// Credential snapshot
pub mod credentials;
/// Layered environment sources
pub mod environment;
/// Retry and backoff settings
pub mod retry;
/// Credential store with atomic persistence
pub mod store;

pub use api::ApiConfig;
pub use credentials::Credentials;
pub use environment::EnvSources;
pub use retry::RetryConfig;
pub use store::CredentialStore;

use crate::errors::AppResult;
use tracing::debug;

/// Everything a command needs, resolved once per invocation
#[derive(Debug, Clone)]
pub struct Settings {
    /// Credential snapshot
    pub credentials: Credentials,
    /// Validated retry policy settings
    pub retry: RetryConfig,
    /// API endpoints and timeouts
    pub api: ApiConfig,
}

impl Settings {
    /// Resolve and validate every setting from `store`
    ///
    /// # Errors
    ///
    /// Returns a validation error for any malformed value; no network
    /// activity happens before this succeeds
    pub fn load(store: &CredentialStore) -> AppResult<Self> {
        let sources = store.sources();
        let settings = Self {
            credentials: store.load()?,
            retry: RetryConfig::from_sources(sources)?,
            api: ApiConfig::from_sources(sources)?,
        };
        debug!(
            retry = ?settings.retry,
            api_url = %settings.api.api_url,
            files = ?sources.loaded_files(),
            "Configuration loaded"
        );
        Ok(settings)
    }
}
