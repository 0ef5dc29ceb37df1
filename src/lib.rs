// ABOUTME: Main library entry point for the Podio command-line client
// ABOUTME: Credential storage, OAuth flows, token refresh and retrying API dispatch
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

// Crate-level attributes:
// - deny(unsafe_code): Zero-tolerance unsafe policy
#![deny(unsafe_code)]

//! # Podio CLI
//!
//! Library behind the `podio` binary. Each invocation is one short-lived
//! process that maps shell arguments onto calls against the Podio REST API
//! and prints the JSON response.
//!
//! ## Architecture
//!
//! - **Config**: layered dotenv sources, credential store, retry and API settings
//! - **Auth**: grant flow selection, sessions and token refresh
//! - **`OAuth2` client**: token endpoint grants and authorize URLs
//! - **Retry**: exponential backoff around transient failures
//! - **Client**: authenticated dispatch with one-shot refresh on 401
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use podio_cli::auth::{authenticate, TokenRefresher};
//! use podio_cli::client::PodioClient;
//! use podio_cli::config::{CredentialStore, Settings};
//! use podio_cli::errors::AppResult;
//! use podio_cli::oauth2_client::OAuth2Client;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> AppResult<()> {
//!     let store = CredentialStore::discover()?;
//!     let settings = Settings::load(&store)?;
//!     let oauth = OAuth2Client::new(&settings.api)?;
//!     let session = authenticate(&settings.credentials, &oauth, &store).await?;
//!     let refresher = TokenRefresher::new(OAuth2Client::new(&settings.api)?).with_store(store);
//!
//!     let mut client = PodioClient::new(settings.api, settings.retry, session, refresher);
//!     let orgs = client.get("/org/").await?;
//!     println!("{orgs}");
//!     Ok(())
//! }
//! ```

/// Grant flows, sessions and token refresh
pub mod auth;

/// Authenticated request dispatch
pub mod client;

/// Configuration sources, credential store and settings
pub mod config;

/// Structured logging setup
pub mod logging;

/// Token endpoint client
pub mod oauth2_client;

/// Retry with exponential backoff
pub mod retry;

/// Shared helpers
pub mod utils;

/// Error types and constants shared with `podio-core`
pub use podio_core::{constants, errors};
