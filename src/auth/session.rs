// ABOUTME: Authenticated session state and its construction from a resolved flow
// ABOUTME: Runs the token grant for code, password and app flows and persists single-use code results
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::flow::{AuthFlow, ClientCredentials, FlowKind};
use crate::config::{CredentialStore, Credentials};
use crate::constants::env_vars;
use crate::errors::AppResult;
use crate::oauth2_client::{OAuth2Client, TokenGrant, TokenSet};
use chrono::{DateTime, Utc};
use std::fmt;
use tracing::{info, warn};

/// Current credentials for API calls
///
/// Mutated in place only by the token refresher.
#[derive(Clone)]
pub struct Session {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    kind: FlowKind,
    client: Option<ClientCredentials>,
}

impl Session {
    /// Session from a pre-issued access token
    #[must_use]
    pub fn from_access_token(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        client: Option<ClientCredentials>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at: None,
            kind: FlowKind::Token,
            client,
        }
    }

    /// Session from a token endpoint response
    #[must_use]
    pub fn from_token_set(kind: FlowKind, client: ClientCredentials, tokens: TokenSet) -> Self {
        // App tokens are scoped to one app and are re-issued, never refreshed
        let refresh_token = if kind == FlowKind::App {
            None
        } else {
            tokens.refresh_token
        };
        Self {
            access_token: tokens.access_token,
            refresh_token,
            expires_at: tokens.expires_at,
            kind,
            client: Some(client),
        }
    }

    /// Override the expiry, e.g. when it is known from an earlier exchange
    #[must_use]
    pub fn with_expires_at(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = expires_at;
        self
    }

    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    #[must_use]
    pub const fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    #[must_use]
    pub const fn kind(&self) -> FlowKind {
        self.kind
    }

    #[must_use]
    pub const fn client(&self) -> Option<&ClientCredentials> {
        self.client.as_ref()
    }

    /// True only when an expiry is known and already in the past
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }

    /// Whether the refresh grant can be attempted
    #[must_use]
    pub fn can_refresh(&self) -> bool {
        self.kind != FlowKind::App && self.refresh_token.is_some() && self.client.is_some()
    }

    /// Replace the token pair after a refresh, keeping the old refresh token
    /// when the endpoint does not rotate it
    pub(crate) fn apply(&mut self, tokens: TokenSet) {
        self.access_token = tokens.access_token;
        if let Some(refresh_token) = tokens.refresh_token {
            self.refresh_token = Some(refresh_token);
        }
        self.expires_at = tokens.expires_at;
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("kind", &self.kind)
            .field("expires_at", &self.expires_at)
            .field("refreshable", &self.can_refresh())
            .finish_non_exhaustive()
    }
}

/// Resolve a flow from `credentials` and turn it into a session
///
/// # Errors
///
/// Returns `AuthConfigError` when no flow is complete and
/// `AuthenticationError` when the token grant is rejected
pub async fn authenticate(
    credentials: &Credentials,
    oauth: &OAuth2Client,
    store: &CredentialStore,
) -> AppResult<Session> {
    let flow = AuthFlow::resolve(credentials)?;
    establish(flow, oauth, store).await
}

/// Turn an already resolved flow into a session
///
/// # Errors
///
/// Returns `AuthenticationError` when the token grant is rejected
pub async fn establish(
    flow: AuthFlow,
    oauth: &OAuth2Client,
    store: &CredentialStore,
) -> AppResult<Session> {
    let kind = flow.kind();
    let session = match flow {
        AuthFlow::Token {
            access_token,
            refresh,
        } => {
            let (refresh_token, client) = refresh
                .map_or((None, None), |grant| {
                    (Some(grant.refresh_token), Some(grant.client))
                });
            Session::from_access_token(access_token, refresh_token, client)
        }
        AuthFlow::AuthorizationCode {
            client,
            code,
            redirect_uri,
        } => {
            let tokens = oauth
                .exchange(&TokenGrant::AuthorizationCode {
                    client_id: &client.client_id,
                    client_secret: &client.client_secret,
                    code: &code,
                    redirect_uri: &redirect_uri,
                })
                .await?;
            let session = Session::from_token_set(kind, client, tokens);
            save_exchanged_code(store, &session);
            session
        }
        AuthFlow::Password {
            client,
            username,
            password,
        } => {
            let tokens = oauth
                .exchange(&TokenGrant::Password {
                    client_id: &client.client_id,
                    client_secret: &client.client_secret,
                    username: &username,
                    password: &password,
                })
                .await?;
            Session::from_token_set(kind, client, tokens)
        }
        AuthFlow::App {
            client,
            app_id,
            app_token,
        } => {
            let tokens = oauth
                .exchange(&TokenGrant::App {
                    client_id: &client.client_id,
                    client_secret: &client.client_secret,
                    app_id,
                    app_token: &app_token,
                })
                .await?;
            Session::from_token_set(kind, client, tokens)
        }
    };

    info!("Authenticated using the {kind} flow");
    Ok(session)
}

// Codes are single-use: keep the issued tokens and drop the spent code.
fn save_exchanged_code(store: &CredentialStore, session: &Session) {
    let result = store.update(&[
        (env_vars::ACCESS_TOKEN, session.access_token()),
        (
            env_vars::REFRESH_TOKEN,
            session.refresh_token().unwrap_or_default(),
        ),
        (env_vars::AUTHORIZATION_CODE, ""),
    ]);
    if let Err(e) = result {
        warn!("Could not save tokens from the authorization code exchange: {e}");
    }
}
