// ABOUTME: Exchanges a refresh token for a new token pair when the API rejects a session
// ABOUTME: Updates the session in place and writes the new pair back to the credential store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::flow::FlowKind;
use super::session::Session;
use crate::config::CredentialStore;
use crate::constants::env_vars;
use crate::errors::{AppError, AppResult};
use crate::oauth2_client::{OAuth2Client, TokenGrant};
use tracing::{info, warn};

/// Runs the `refresh_token` grant on behalf of the dispatcher
pub struct TokenRefresher {
    oauth: OAuth2Client,
    store: Option<CredentialStore>,
}

impl TokenRefresher {
    /// Refresher that keeps new tokens in memory only
    #[must_use]
    pub const fn new(oauth: OAuth2Client) -> Self {
        Self { oauth, store: None }
    }

    /// Also persist refreshed tokens through `store`
    #[must_use]
    pub fn with_store(mut self, store: CredentialStore) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub const fn oauth(&self) -> &OAuth2Client {
        &self.oauth
    }

    /// Refresh ahead of a call when the session is known to be expired
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationError` when the session is expired and cannot
    /// be refreshed, or when the refresh grant fails
    pub async fn ensure_valid(&self, session: &mut Session) -> AppResult<()> {
        if session.is_expired() {
            info!("Access token expired, refreshing before the call");
            self.refresh(session).await?;
        }
        Ok(())
    }

    /// Replace the session's token pair using its refresh token
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationError` when the session has no refresh token or
    /// client credentials, or when the token endpoint rejects the refresh.
    /// A failure to persist the new pair is only logged.
    pub async fn refresh(&self, session: &mut Session) -> AppResult<()> {
        if !session.can_refresh() {
            return Err(not_refreshable(session));
        }
        let (Some(client), Some(refresh_token)) = (session.client(), session.refresh_token())
        else {
            return Err(not_refreshable(session));
        };

        let tokens = self
            .oauth
            .exchange(&TokenGrant::RefreshToken {
                client_id: &client.client_id,
                client_secret: &client.client_secret,
                refresh_token,
            })
            .await
            .map_err(|e| {
                AppError::authentication(format!("Token refresh failed: {}", e.message))
                    .with_source(e)
            })?;

        session.apply(tokens);
        info!("Access token refreshed");

        if let Some(store) = &self.store {
            let refresh_token = session.refresh_token().unwrap_or_default();
            if let Err(e) = store.persist(session.access_token(), refresh_token) {
                warn!("Refreshed tokens could not be saved, they are valid for this run only: {e}");
            }
        }
        Ok(())
    }
}

fn not_refreshable(session: &Session) -> AppError {
    if session.kind() == FlowKind::App {
        return AppError::authentication(
            "App token expired; app sessions are re-authenticated, not refreshed",
        );
    }
    AppError::authentication(format!(
        "Access token expired and cannot be refreshed: set {}, {} and {}, or run 'podio auth login'",
        env_vars::REFRESH_TOKEN,
        env_vars::CLIENT_ID,
        env_vars::CLIENT_SECRET
    ))
}
