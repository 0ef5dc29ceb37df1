// ABOUTME: Immutable snapshot of every credential-related setting
// ABOUTME: Built once from the layered sources and passed by reference into auth resolution
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::environment::{parse_var, EnvSources};
use crate::constants::env_vars;
use crate::errors::AppResult;
use std::fmt;

/// Credential fields as resolved from the environment and dotenv files
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// API client id
    pub client_id: Option<String>,
    /// API client secret
    pub client_secret: Option<String>,
    /// Access token from a previous login
    pub access_token: Option<String>,
    /// Refresh token paired with `access_token`
    pub refresh_token: Option<String>,
    /// Username for the password flow
    pub username: Option<String>,
    /// Password for the password flow
    pub password: Option<String>,
    /// App id for the app flow
    pub app_id: Option<u64>,
    /// App token for the app flow
    pub app_token: Option<String>,
    /// Single-use authorization code for the server-side flow
    pub authorization_code: Option<String>,
    /// Redirect URI registered with the API key
    pub redirect_uri: Option<String>,
    /// Default organization id
    pub organization_id: Option<u64>,
    /// Default workspace (space) id
    pub workspace_id: Option<u64>,
}

impl Credentials {
    /// Read every credential field from `sources`
    ///
    /// # Errors
    ///
    /// Returns a validation error when a numeric id is not a number
    pub fn from_sources(sources: &EnvSources) -> AppResult<Self> {
        Ok(Self {
            client_id: sources.get_owned(env_vars::CLIENT_ID),
            client_secret: sources.get_owned(env_vars::CLIENT_SECRET),
            access_token: sources.get_owned(env_vars::ACCESS_TOKEN),
            refresh_token: sources.get_owned(env_vars::REFRESH_TOKEN),
            username: sources.get_owned(env_vars::USERNAME),
            password: sources.get_owned(env_vars::PASSWORD),
            app_id: parse_var(sources, env_vars::APP_ID)?,
            app_token: sources.get_owned(env_vars::APP_TOKEN),
            authorization_code: sources.get_owned(env_vars::AUTHORIZATION_CODE),
            redirect_uri: sources.get_owned(env_vars::REDIRECT_URI),
            organization_id: parse_var(sources, env_vars::ORGANIZATION_ID)?,
            workspace_id: parse_var(sources, env_vars::WORKSPACE_ID)?,
        })
    }
}

/// Shorten a secret for display: first eight characters followed by an ellipsis
#[must_use]
pub fn mask_secret(secret: &str) -> String {
    let prefix: String = secret.chars().take(8).collect();
    format!("{prefix}...")
}

fn masked(value: Option<&String>) -> Option<&'static str> {
    value.map(|_| "<redacted>")
}

// Secrets never reach log output, even at trace level.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &masked(self.client_secret.as_ref()))
            .field("access_token", &masked(self.access_token.as_ref()))
            .field("refresh_token", &masked(self.refresh_token.as_ref()))
            .field("username", &self.username)
            .field("password", &masked(self.password.as_ref()))
            .field("app_id", &self.app_id)
            .field("app_token", &masked(self.app_token.as_ref()))
            .field("authorization_code", &masked(self.authorization_code.as_ref()))
            .field("redirect_uri", &self.redirect_uri)
            .field("organization_id", &self.organization_id)
            .field("workspace_id", &self.workspace_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_numeric_ids_are_parsed() {
        let sources = EnvSources::from_pairs([
            (env_vars::APP_ID, "12345"),
            (env_vars::WORKSPACE_ID, " 42 "),
        ]);
        let creds = Credentials::from_sources(&sources).unwrap();
        assert_eq!(creds.app_id, Some(12345));
        assert_eq!(creds.workspace_id, Some(42));
        assert_eq!(creds.organization_id, None);
    }

    #[test]
    fn test_non_numeric_app_id_is_rejected() {
        let sources = EnvSources::from_pairs([(env_vars::APP_ID, "abc")]);
        let err = Credentials::from_sources(&sources).unwrap_err();
        assert_eq!(err.code, ErrorCode::Validation);
        assert!(err.message.contains(env_vars::APP_ID));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials {
            client_id: Some("my-client".into()),
            client_secret: Some("super-secret".into()),
            access_token: Some("token-value".into()),
            ..Credentials::default()
        };
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("my-client"));
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("token-value"));
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("abcdefghijkl"), "abcdefgh...");
        assert_eq!(mask_secret("abc"), "abc...");
    }
}
