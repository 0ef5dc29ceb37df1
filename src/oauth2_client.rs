// ABOUTME: OAuth2 token endpoint client for the Podio API
// ABOUTME: Performs password, app, authorization-code and refresh-token grants and builds authorize URLs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::config::ApiConfig;
use crate::constants::endpoints;
use crate::errors::{AppError, AppResult};
use crate::utils::http_client;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

/// Which token the authorize page hands back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    /// Client-side flow: access token in the URL fragment
    Token,
    /// Server-side flow: authorization code in the query string
    Code,
}

impl ResponseType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Code => "code",
        }
    }
}

/// Token grant request, serialized as the JSON body of `/oauth/token/v2`
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "grant_type", rename_all = "snake_case")]
pub enum TokenGrant<'a> {
    /// Resource-owner password credentials
    Password {
        /// API client id
        client_id: &'a str,
        /// API client secret
        client_secret: &'a str,
        /// Podio login
        username: &'a str,
        /// Podio password
        password: &'a str,
    },
    /// App-scoped authentication
    App {
        /// API client id
        client_id: &'a str,
        /// API client secret
        client_secret: &'a str,
        /// App id
        app_id: u64,
        /// App token
        app_token: &'a str,
    },
    /// Server-side authorization code exchange
    AuthorizationCode {
        /// API client id
        client_id: &'a str,
        /// API client secret
        client_secret: &'a str,
        /// Code received on the redirect
        code: &'a str,
        /// Redirect URI used for the authorize request
        redirect_uri: &'a str,
    },
    /// Exchange a refresh token for a new token pair
    RefreshToken {
        /// API client id
        client_id: &'a str,
        /// API client secret
        client_secret: &'a str,
        /// Current refresh token
        refresh_token: &'a str,
    },
}

impl TokenGrant<'_> {
    /// Grant name as sent on the wire
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Password { .. } => "password",
            Self::App { .. } => "app",
            Self::AuthorizationCode { .. } => "authorization_code",
            Self::RefreshToken { .. } => "refresh_token",
        }
    }
}

/// Token pair issued by the token endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub token_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    token_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

pub struct OAuth2Client {
    token_url: Url,
    auth_url: Url,
    client: reqwest::Client,
}

impl OAuth2Client {
    /// Build a client for the token endpoint of `config.api_url`
    ///
    /// # Errors
    ///
    /// Returns an error if the token endpoint URL cannot be formed
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        Ok(Self {
            token_url: config.endpoint(endpoints::OAUTH_TOKEN)?,
            auth_url: config.auth_url.clone(),
            client: http_client::oauth_client(),
        })
    }

    /// Authorization page URL for the client-side (`Token`) or server-side
    /// (`Code`) flow
    #[must_use]
    pub fn get_authorization_url(
        &self,
        client_id: &str,
        redirect_uri: &str,
        response_type: ResponseType,
        scope: Option<&str>,
    ) -> Url {
        let mut url = self.auth_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", response_type.as_str())
                .append_pair("client_id", client_id)
                .append_pair("redirect_uri", redirect_uri);
            if let Some(scope) = scope {
                query.append_pair("scope", scope);
            }
        }
        url
    }

    /// Run a token grant
    ///
    /// # Errors
    ///
    /// Returns a network error if the endpoint is unreachable, and an
    /// authentication error if the endpoint rejects the grant or answers with
    /// an unreadable body
    pub async fn exchange(&self, grant: &TokenGrant<'_>) -> AppResult<TokenSet> {
        debug!("Requesting token with grant_type={}", grant.name());

        let response = self
            .client
            .post(self.token_url.clone())
            .json(grant)
            .send()
            .await
            .map_err(|e| {
                AppError::network(format!("Token endpoint unreachable: {e}")).with_source(e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            AppError::network(format!("Failed to read token response: {e}")).with_source(e)
        })?;

        if !status.is_success() {
            let detail = serde_json::from_str::<TokenErrorResponse>(&body)
                .ok()
                .and_then(|err| err.error_description.or(err.error))
                .unwrap_or(body);
            warn!("{} grant rejected with status {status}", grant.name());
            return Err(AppError::authentication(format!(
                "{} grant failed ({status}): {detail}",
                grant.name()
            ))
            .with_status(status.as_u16()));
        }

        let response: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            AppError::authentication(format!("Malformed token response: {e}")).with_source(e)
        })?;
        Ok(Self::token_from_response(response))
    }

    #[must_use]
    fn token_from_response(response: TokenResponse) -> TokenSet {
        let expires_at = response
            .expires_in
            .map(|seconds| Utc::now() + Duration::seconds(seconds));

        TokenSet {
            access_token: response.access_token,
            refresh_token: response.refresh_token.filter(|token| !token.is_empty()),
            expires_in: response.expires_in,
            expires_at,
            token_type: response.token_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvSources;

    fn client() -> OAuth2Client {
        OAuth2Client::new(&ApiConfig::from_sources(&EnvSources::default()).unwrap()).unwrap()
    }

    #[test]
    fn test_client_side_url_requests_token() {
        let url = client().get_authorization_url(
            "my-app",
            "https://example.com/cb",
            ResponseType::Token,
            None,
        );
        assert_eq!(
            url.as_str(),
            "https://podio.com/oauth/authorize?response_type=token&client_id=my-app&redirect_uri=https%3A%2F%2Fexample.com%2Fcb"
        );
    }

    #[test]
    fn test_server_side_url_with_scope() {
        let url = client().get_authorization_url(
            "my-app",
            "https://example.com/cb",
            ResponseType::Code,
            Some("global:all"),
        );
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("response_type".into(), "code".into())));
        assert!(pairs.contains(&("scope".into(), "global:all".into())));
    }

    #[test]
    fn test_grant_serialization() {
        let grant = TokenGrant::RefreshToken {
            client_id: "id",
            client_secret: "secret",
            refresh_token: "r1",
        };
        let json = serde_json::to_value(&grant).unwrap();
        assert_eq!(json["grant_type"], "refresh_token");
        assert_eq!(json["refresh_token"], "r1");

        let grant = TokenGrant::App {
            client_id: "id",
            client_secret: "secret",
            app_id: 7,
            app_token: "t",
        };
        let json = serde_json::to_value(&grant).unwrap();
        assert_eq!(json["grant_type"], "app");
        assert_eq!(json["app_id"], 7);
    }
}
