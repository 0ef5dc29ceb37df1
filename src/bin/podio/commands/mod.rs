// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
// ABOUTME: Command modules for the podio binary and the context they share
// ABOUTME: The context resolves settings once and builds an authenticated API client on demand

pub mod app;
pub mod auth;
pub mod comment;
pub mod conversation;
pub mod file;
pub mod item;
pub mod org;
pub mod space;
pub mod task;
pub mod webform;
pub mod webhook;

use crate::helpers::output::{print_json, print_success};
use clap::Args;
use podio_cli::auth::{authenticate, TokenRefresher};
use podio_cli::client::{ApiRequest, PodioClient};
use podio_cli::config::{CredentialStore, Settings};
use podio_cli::constants::env_vars;
use podio_cli::errors::{AppError, AppResult};
use podio_cli::oauth2_client::OAuth2Client;
use serde_json::Value;
use tracing::debug;

/// Settings and credential store for one invocation
pub struct Context {
    store: CredentialStore,
    settings: Settings,
}

impl Context {
    /// Resolve and validate configuration before any network activity
    pub fn load() -> AppResult<Self> {
        let store = CredentialStore::discover()?;
        let settings = Settings::load(&store)?;
        debug!(env_file = %store.env_file_path().display(), "Context ready");
        Ok(Self { store, settings })
    }

    pub const fn store(&self) -> &CredentialStore {
        &self.store
    }

    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn oauth(&self) -> AppResult<OAuth2Client> {
        OAuth2Client::new(&self.settings.api)
    }

    /// Authenticate and build a client that refreshes and persists tokens
    pub async fn client(&self) -> AppResult<PodioClient> {
        let oauth = self.oauth()?;
        let session = authenticate(&self.settings.credentials, &oauth, &self.store).await?;
        let refresher = TokenRefresher::new(oauth).with_store(self.store.clone());
        Ok(PodioClient::new(
            self.settings.api.clone(),
            self.settings.retry,
            session,
            refresher,
        ))
    }

    /// Send one request on a fresh client
    pub async fn send(&self, request: ApiRequest) -> AppResult<Value> {
        let mut client = self.client().await?;
        client.send(&request).await
    }

    /// Send one request and print the response
    pub async fn execute(&self, request: ApiRequest) -> AppResult<()> {
        print_json(&self.send(request).await?)
    }

    /// Send one request, then report `message` and print `ack` instead of the
    /// usually empty response
    pub async fn acknowledge(
        &self,
        request: ApiRequest,
        message: &str,
        ack: Value,
    ) -> AppResult<()> {
        self.send(request).await?;
        print_success(message);
        print_json(&ack)
    }

    /// Send one request, report `message` and print the response
    pub async fn execute_reporting(
        &self,
        request: ApiRequest,
        message: &str,
    ) -> AppResult<()> {
        let response = self.send(request).await?;
        print_success(message);
        print_json(&response)
    }

    /// `explicit`, else `PODIO_WORKSPACE_ID`
    pub fn workspace_id(&self, explicit: Option<u64>) -> AppResult<u64> {
        explicit
            .or(self.settings.credentials.workspace_id)
            .ok_or_else(|| missing_default("--space-id", env_vars::WORKSPACE_ID))
    }

    /// `explicit`, else `PODIO_ORGANIZATION_ID`
    pub fn organization_id(&self, explicit: Option<u64>) -> AppResult<u64> {
        explicit
            .or(self.settings.credentials.organization_id)
            .ok_or_else(|| missing_default("--org-id", env_vars::ORGANIZATION_ID))
    }
}

/// Notification switches accepted by write operations
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct WriteFlags {
    /// Do not notify followers or create stream events
    #[arg(long)]
    pub silent: bool,

    /// Do not fire webhooks for this change
    #[arg(long)]
    pub no_hook: bool,
}

impl WriteFlags {
    /// Add `silent=true` and `hook=false` query parameters when set
    pub fn apply(self, request: ApiRequest) -> ApiRequest {
        let request = if self.silent {
            request.query("silent", true)
        } else {
            request
        };
        if self.no_hook {
            request.query("hook", false)
        } else {
            request
        }
    }
}

fn missing_default(flag: &str, var: &str) -> AppError {
    AppError::config(format!("No id given: pass {flag} or set {var}"))
}
