// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides quiet logging, a recording sleeper and clients pointed at a mock server
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]
//! Shared test utilities for `podio_cli`

use async_trait::async_trait;
use podio_cli::auth::{ClientCredentials, Session, TokenRefresher};
use podio_cli::client::PodioClient;
use podio_cli::config::{ApiConfig, CredentialStore, EnvSources, RetryConfig};
use podio_cli::constants::env_vars;
use podio_cli::oauth2_client::OAuth2Client;
use podio_cli::retry::{RetryPolicy, Sleeper};
use std::env;
use std::path::Path;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use tracing::Level;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Sleeper that records requested delays and returns immediately
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    slept: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn recorded_secs(&self) -> Vec<f64> {
        self.slept
            .lock()
            .unwrap()
            .iter()
            .map(Duration::as_secs_f64)
            .collect()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}

pub fn client_credentials() -> ClientCredentials {
    ClientCredentials {
        client_id: "test-client".into(),
        client_secret: "test-secret".into(),
    }
}

/// Sources that point every endpoint at `base_url`
pub fn sources_for(base_url: &str) -> EnvSources {
    EnvSources::from_pairs([
        (env_vars::API_URL, base_url),
        (env_vars::HTTP_TIMEOUT_SECS, "5"),
    ])
}

pub fn api_for(base_url: &str) -> ApiConfig {
    ApiConfig::from_sources(&sources_for(base_url)).unwrap()
}

/// Three attempts, 1s base delay doubling up to 10s, no jitter
pub fn deterministic_retry() -> RetryConfig {
    RetryConfig::new(3, 1.0, 10.0, 2.0, false, true).unwrap()
}

/// Store writing to `.env` inside `dir`
pub fn store_in(dir: &Path, base_url: &str) -> CredentialStore {
    CredentialStore::new(sources_for(base_url), dir.join(".env"))
}

/// Client for `base_url` with a refresh-capable token session
pub fn mock_client(
    base_url: &str,
    store: CredentialStore,
    access_token: &str,
    retry: RetryConfig,
) -> PodioClient<RecordingSleeper> {
    init_test_logging();
    let api = api_for(base_url);
    let refresher = TokenRefresher::new(OAuth2Client::new(&api).unwrap()).with_store(store);
    let session = Session::from_access_token(
        access_token,
        Some("refresh-1".into()),
        Some(client_credentials()),
    );
    let policy = RetryPolicy::with_sleeper(retry, RecordingSleeper::default());
    PodioClient::with_policy(api, policy, session, refresher)
}
