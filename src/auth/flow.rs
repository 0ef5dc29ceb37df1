// ABOUTME: Selects which OAuth grant flow the configured credentials satisfy
// ABOUTME: Flows are a closed enum whose variants carry only their required fields
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::config::Credentials;
use crate::constants::env_vars;
use crate::errors::{AppError, AppResult};
use serde::Serialize;
use std::fmt;

/// API key pair used by every grant except a bare access token
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Everything needed to run the `refresh_token` grant
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshGrant {
    pub client: ClientCredentials,
    pub refresh_token: String,
}

impl fmt::Debug for RefreshGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshGrant")
            .field("client", &self.client)
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Which flow a session came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    Token,
    AuthorizationCode,
    Password,
    App,
}

impl FlowKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::AuthorizationCode => "authorization_code",
            Self::Password => "password",
            Self::App => "app",
        }
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully satisfied authentication flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFlow {
    /// Pre-issued access token, refresh-capable when `refresh` is present
    Token {
        access_token: String,
        refresh: Option<RefreshGrant>,
    },
    /// Single-use code from the server-side authorize redirect
    AuthorizationCode {
        client: ClientCredentials,
        code: String,
        redirect_uri: String,
    },
    /// Username and password
    Password {
        client: ClientCredentials,
        username: String,
        password: String,
    },
    /// App id and app token
    App {
        client: ClientCredentials,
        app_id: u64,
        app_token: String,
    },
}

impl AuthFlow {
    #[must_use]
    pub const fn kind(&self) -> FlowKind {
        match self {
            Self::Token { .. } => FlowKind::Token,
            Self::AuthorizationCode { .. } => FlowKind::AuthorizationCode,
            Self::Password { .. } => FlowKind::Password,
            Self::App { .. } => FlowKind::App,
        }
    }

    /// Pick the first fully configured flow: token, authorization code,
    /// password, then app
    ///
    /// # Errors
    ///
    /// Returns `AuthConfigError` naming the missing variables of every flow
    /// when none is complete
    pub fn resolve(credentials: &Credentials) -> AppResult<Self> {
        let client = client_credentials(credentials);

        if let Some(access_token) = &credentials.access_token {
            let refresh = match (&client, &credentials.refresh_token) {
                (Some(client), Some(refresh_token)) => Some(RefreshGrant {
                    client: client.clone(),
                    refresh_token: refresh_token.clone(),
                }),
                _ => None,
            };
            return Ok(Self::Token {
                access_token: access_token.clone(),
                refresh,
            });
        }

        if let (Some(client), Some(code), Some(redirect_uri)) = (
            &client,
            &credentials.authorization_code,
            &credentials.redirect_uri,
        ) {
            return Ok(Self::AuthorizationCode {
                client: client.clone(),
                code: code.clone(),
                redirect_uri: redirect_uri.clone(),
            });
        }

        if let (Some(client), Some(username), Some(password)) =
            (&client, &credentials.username, &credentials.password)
        {
            return Ok(Self::Password {
                client: client.clone(),
                username: username.clone(),
                password: password.clone(),
            });
        }

        if let (Some(client), Some(app_id), Some(app_token)) =
            (&client, credentials.app_id, &credentials.app_token)
        {
            return Ok(Self::App {
                client: client.clone(),
                app_id,
                app_token: app_token.clone(),
            });
        }

        Err(AppError::auth_config(missing_report(credentials)))
    }
}

fn client_credentials(credentials: &Credentials) -> Option<ClientCredentials> {
    match (&credentials.client_id, &credentials.client_secret) {
        (Some(client_id), Some(client_secret)) => Some(ClientCredentials {
            client_id: client_id.clone(),
            client_secret: client_secret.clone(),
        }),
        _ => None,
    }
}

/// Missing variables for each flow, in precedence order
#[must_use]
pub fn missing_by_flow(credentials: &Credentials) -> Vec<(FlowKind, Vec<&'static str>)> {
    let c = credentials;
    let client = [
        (env_vars::CLIENT_ID, c.client_id.is_some()),
        (env_vars::CLIENT_SECRET, c.client_secret.is_some()),
    ];
    let missing = |fields: &[(&'static str, bool)]| -> Vec<&'static str> {
        fields
            .iter()
            .filter(|(_, present)| !present)
            .map(|(name, _)| *name)
            .collect()
    };

    vec![
        (
            FlowKind::Token,
            missing(&[(env_vars::ACCESS_TOKEN, c.access_token.is_some())]),
        ),
        (
            FlowKind::AuthorizationCode,
            missing(&[
                (
                    env_vars::AUTHORIZATION_CODE,
                    c.authorization_code.is_some(),
                ),
                (env_vars::REDIRECT_URI, c.redirect_uri.is_some()),
                client[0],
                client[1],
            ]),
        ),
        (
            FlowKind::Password,
            missing(&[
                (env_vars::USERNAME, c.username.is_some()),
                (env_vars::PASSWORD, c.password.is_some()),
                client[0],
                client[1],
            ]),
        ),
        (
            FlowKind::App,
            missing(&[
                (env_vars::APP_ID, c.app_id.is_some()),
                (env_vars::APP_TOKEN, c.app_token.is_some()),
                client[0],
                client[1],
            ]),
        ),
    ]
}

fn missing_report(credentials: &Credentials) -> String {
    let lines: Vec<String> = missing_by_flow(credentials)
        .into_iter()
        .map(|(kind, missing)| format!("  {kind}: missing {}", missing.join(", ")))
        .collect();
    format!(
        "No authentication method is fully configured. Set one of:\n{}",
        lines.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    fn with_client() -> Credentials {
        Credentials {
            client_id: Some("cid".into()),
            client_secret: Some("csecret".into()),
            ..Credentials::default()
        }
    }

    #[test]
    fn test_token_flow_with_refresh() {
        let creds = Credentials {
            access_token: Some("a1".into()),
            refresh_token: Some("r1".into()),
            ..with_client()
        };
        let flow = AuthFlow::resolve(&creds).unwrap();
        match flow {
            AuthFlow::Token {
                access_token,
                refresh: Some(refresh),
            } => {
                assert_eq!(access_token, "a1");
                assert_eq!(refresh.refresh_token, "r1");
                assert_eq!(refresh.client.client_id, "cid");
            }
            other => panic!("unexpected flow {other:?}"),
        }
    }

    #[test]
    fn test_token_flow_without_client_is_not_refreshable() {
        let creds = Credentials {
            access_token: Some("a1".into()),
            refresh_token: Some("r1".into()),
            ..Credentials::default()
        };
        assert_eq!(
            AuthFlow::resolve(&creds).unwrap(),
            AuthFlow::Token {
                access_token: "a1".into(),
                refresh: None
            }
        );
    }

    #[test]
    fn test_precedence_prefers_token_over_password() {
        let creds = Credentials {
            access_token: Some("a1".into()),
            username: Some("u".into()),
            password: Some("p".into()),
            ..with_client()
        };
        assert_eq!(AuthFlow::resolve(&creds).unwrap().kind(), FlowKind::Token);
    }

    #[test]
    fn test_authorization_code_beats_password() {
        let creds = Credentials {
            authorization_code: Some("code".into()),
            redirect_uri: Some("https://example.com/cb".into()),
            username: Some("u".into()),
            password: Some("p".into()),
            ..with_client()
        };
        assert_eq!(
            AuthFlow::resolve(&creds).unwrap().kind(),
            FlowKind::AuthorizationCode
        );
    }

    #[test]
    fn test_password_without_secret_does_not_fall_back() {
        let creds = Credentials {
            client_id: Some("cid".into()),
            username: Some("u".into()),
            password: Some("p".into()),
            ..Credentials::default()
        };
        let err = AuthFlow::resolve(&creds).unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthConfig);
        assert!(err.message.contains(env_vars::CLIENT_SECRET));
    }

    #[test]
    fn test_app_flow() {
        let creds = Credentials {
            app_id: Some(42),
            app_token: Some("apptok".into()),
            ..with_client()
        };
        assert_eq!(
            AuthFlow::resolve(&creds).unwrap(),
            AuthFlow::App {
                client: ClientCredentials {
                    client_id: "cid".into(),
                    client_secret: "csecret".into()
                },
                app_id: 42,
                app_token: "apptok".into()
            }
        );
    }

    #[test]
    fn test_missing_report_lists_every_flow() {
        let err = AuthFlow::resolve(&Credentials::default()).unwrap_err();
        for flow in ["token", "authorization_code", "password", "app"] {
            assert!(err.message.contains(flow), "{flow} missing from report");
        }
        assert!(err.message.contains(env_vars::ACCESS_TOKEN));
        assert!(err.message.contains(env_vars::APP_TOKEN));

        let partial = missing_by_flow(&with_client());
        let (_, password_missing) = &partial[2];
        assert_eq!(password_missing, &vec![env_vars::USERNAME, env_vars::PASSWORD]);
    }

    #[test]
    fn test_debug_hides_secrets() {
        let grant = RefreshGrant {
            client: ClientCredentials {
                client_id: "cid".into(),
                client_secret: "shh".into(),
            },
            refresh_token: "refresh-secret".into(),
        };
        let rendered = format!("{grant:?}");
        assert!(!rendered.contains("shh"));
        assert!(!rendered.contains("refresh-secret"));
    }
}
