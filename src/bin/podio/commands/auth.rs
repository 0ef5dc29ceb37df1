// ABOUTME: Authentication commands: status, login, url, logout, save, parse-callback and refresh
// ABOUTME: Inspects configured flows, builds authorize URLs and manages stored tokens
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::Context;
use crate::helpers::input::confirm;
use crate::helpers::output::{print_info, print_json, print_success};
use chrono::Utc;
use clap::{Subcommand, ValueEnum};
use podio_cli::auth::{missing_by_flow, parse_callback, AuthFlow, CallbackParams};
use podio_cli::config::credentials::mask_secret;
use podio_cli::constants::{defaults, endpoints, env_vars, exit_codes};
use podio_cli::errors::{AppError, AppResult};
use podio_cli::oauth2_client::{ResponseType, TokenGrant};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

/// Which OAuth flow the authorize URL starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FlowType {
    /// Client-side: tokens come back in the URL fragment
    Client,
    /// Server-side: an authorization code comes back in the query
    Server,
}

impl FlowType {
    const fn response_type(self) -> ResponseType {
        match self {
            Self::Client => ResponseType::Token,
            Self::Server => ResponseType::Code,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Server => "server",
        }
    }
}

#[non_exhaustive]
#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Show which authentication flow is configured
    Status {
        /// Skip the live credential check against the API
        #[arg(long)]
        no_verify: bool,
    },

    /// Print instructions and the authorize URL to start an OAuth login
    Login {
        /// OAuth flow to start
        #[arg(long = "type", value_enum, default_value_t = FlowType::Client)]
        flow_type: FlowType,

        /// Redirect URI registered for the API key
        #[arg(long)]
        redirect_uri: Option<String>,

        /// Requested scope
        #[arg(long)]
        scope: Option<String>,
    },

    /// Print only the authorize URL
    Url {
        /// OAuth flow to start
        #[arg(long = "type", value_enum, default_value_t = FlowType::Client)]
        flow_type: FlowType,

        /// Redirect URI registered for the API key
        #[arg(long)]
        redirect_uri: Option<String>,

        /// Requested scope
        #[arg(long)]
        scope: Option<String>,
    },

    /// Remove stored tokens and authorization code
    Logout {
        /// Do not ask for confirmation
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Store an access and refresh token pair
    Save {
        /// Access token
        access_token: String,

        /// Refresh token
        refresh_token: String,
    },

    /// Extract tokens or a code from the URL the browser was redirected to
    ParseCallback {
        /// Full redirect URL
        url: String,

        /// Print the values without storing them
        #[arg(long)]
        no_save: bool,
    },

    /// Exchange the stored refresh token for a new pair
    Refresh,
}

/// Run an auth subcommand and return the process exit code
pub async fn run(ctx: &Context, action: AuthCommand) -> AppResult<u8> {
    match action {
        AuthCommand::Status { no_verify } => status(ctx, no_verify).await,
        AuthCommand::Login {
            flow_type,
            redirect_uri,
            scope,
        } => {
            login(ctx, flow_type, redirect_uri, scope.as_deref())?;
            Ok(exit_codes::SUCCESS)
        }
        AuthCommand::Url {
            flow_type,
            redirect_uri,
            scope,
        } => {
            let (url, _) = authorization_url(ctx, flow_type, redirect_uri, scope.as_deref())?;
            println!("{url}");
            Ok(exit_codes::SUCCESS)
        }
        AuthCommand::Logout { force } => logout(ctx, force).await,
        AuthCommand::Save {
            access_token,
            refresh_token,
        } => {
            save(ctx, &access_token, &refresh_token)?;
            Ok(exit_codes::SUCCESS)
        }
        AuthCommand::ParseCallback { url, no_save } => {
            callback(ctx, &url, no_save)?;
            Ok(exit_codes::SUCCESS)
        }
        AuthCommand::Refresh => {
            refresh(ctx).await?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

async fn status(ctx: &Context, no_verify: bool) -> AppResult<u8> {
    let credentials = &ctx.settings().credentials;
    let mut report = Map::new();

    let authenticated = match AuthFlow::resolve(credentials) {
        Ok(flow) => {
            report.insert("authenticated".into(), json!(true));
            report.insert("auth_method".into(), json!(flow.kind().as_str()));
            report.extend(flow_details(&flow));
            true
        }
        Err(e) => {
            report.insert("authenticated".into(), json!(false));
            report.insert("auth_method".into(), Value::Null);
            report.insert("error".into(), json!(e.message));
            let missing: Map<String, Value> = missing_by_flow(credentials)
                .into_iter()
                .map(|(kind, vars)| (kind.as_str().to_owned(), json!(vars)))
                .collect();
            report.insert("missing".into(), Value::Object(missing));
            false
        }
    };

    report.insert(
        "organization_id".into(),
        credentials
            .organization_id
            .map_or_else(|| json!("not set"), |id| json!(id)),
    );
    report.insert(
        "workspace_id".into(),
        credentials
            .workspace_id
            .map_or_else(|| json!("not set"), |id| json!(id)),
    );
    report.insert(
        "env_file".into(),
        json!(ctx.store().env_file_path().display().to_string()),
    );

    if authenticated && !no_verify {
        verify(ctx, &mut report).await;
    }

    print_json(&report)?;
    Ok(if authenticated {
        exit_codes::SUCCESS
    } else {
        exit_codes::AUTH_ERROR
    })
}

fn flow_details(flow: &AuthFlow) -> Map<String, Value> {
    let details = match flow {
        AuthFlow::Token {
            access_token,
            refresh,
        } => json!({
            "access_token": mask_secret(access_token),
            "refresh_capable": refresh.is_some(),
        }),
        AuthFlow::AuthorizationCode {
            client,
            redirect_uri,
            ..
        } => json!({
            "client_id": client.client_id,
            "redirect_uri": redirect_uri,
        }),
        AuthFlow::Password {
            client, username, ..
        } => json!({
            "client_id": client.client_id,
            "username": username,
        }),
        AuthFlow::App { client, app_id, .. } => json!({
            "client_id": client.client_id,
            "app_id": app_id,
        }),
    };
    match details {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

// Verification failure is reported in the output, not as an exit code.
async fn verify(ctx: &Context, report: &mut Map<String, Value>) {
    let outcome = match ctx.client().await {
        Ok(mut client) => client.get(endpoints::USER_STATUS).await,
        Err(e) => Err(e),
    };
    match outcome {
        Ok(user_status) => {
            report.insert("verified".into(), json!(true));
            let user = &user_status["user"];
            report.insert("user_id".into(), user["user_id"].clone());
            report.insert("email".into(), user["mail"].clone());
        }
        Err(e) => {
            warn!("Credential verification failed: {e}");
            report.insert("verified".into(), json!(false));
            report.insert("verification_error".into(), json!(e.to_string()));
        }
    }
}

fn authorization_url(
    ctx: &Context,
    flow_type: FlowType,
    redirect_uri: Option<String>,
    scope: Option<&str>,
) -> AppResult<(String, String)> {
    let credentials = &ctx.settings().credentials;
    let client_id = credentials.client_id.as_deref().ok_or_else(|| {
        AppError::auth_config(format!(
            "{} is required to build an authorization URL",
            env_vars::CLIENT_ID
        ))
    })?;
    let redirect_uri = redirect_uri
        .or_else(|| credentials.redirect_uri.clone())
        .unwrap_or_else(|| defaults::REDIRECT_URI.to_owned());

    let url = ctx.oauth()?.get_authorization_url(
        client_id,
        &redirect_uri,
        flow_type.response_type(),
        scope,
    );
    Ok((url.to_string(), redirect_uri))
}

fn login(
    ctx: &Context,
    flow_type: FlowType,
    redirect_uri: Option<String>,
    scope: Option<&str>,
) -> AppResult<()> {
    let (url, redirect_uri) = authorization_url(ctx, flow_type, redirect_uri, scope)?;

    print_info("Open this URL in a browser and approve access:");
    print_info(&format!("  {url}"));
    print_info("");
    match flow_type {
        FlowType::Client => print_info(
            "You will be redirected to a URL with the tokens after '#'. Copy that URL and run:",
        ),
        FlowType::Server => print_info(
            "You will be redirected to a URL with a code after '?'. Copy that URL and run:",
        ),
    }
    print_info("  podio auth parse-callback '<redirect url>'");

    print_json(&json!({
        "authorization_url": url,
        "flow_type": flow_type.as_str(),
        "redirect_uri": redirect_uri,
    }))
}

async fn logout(ctx: &Context, force: bool) -> AppResult<u8> {
    if !force && !confirm("Remove stored Podio tokens?").await? {
        print_info("Aborted!");
        return Ok(exit_codes::GENERAL_ERROR);
    }

    let credentials = &ctx.settings().credentials;
    let cleared: Vec<&str> = [
        (env_vars::ACCESS_TOKEN, credentials.access_token.is_some()),
        (env_vars::REFRESH_TOKEN, credentials.refresh_token.is_some()),
        (
            env_vars::AUTHORIZATION_CODE,
            credentials.authorization_code.is_some(),
        ),
    ]
    .into_iter()
    .filter_map(|(key, set)| set.then_some(key))
    .collect();

    if !cleared.is_empty() {
        let entries: Vec<(&str, &str)> = cleared.iter().map(|key| (*key, "")).collect();
        ctx.store().update(&entries)?;
        print_success("Logged out");
    }

    print_json(&json!({
        "cleared": cleared,
        "env_file": ctx.store().env_file_path().display().to_string(),
    }))?;
    Ok(exit_codes::SUCCESS)
}

fn save(ctx: &Context, access_token: &str, refresh_token: &str) -> AppResult<()> {
    ctx.store().persist(access_token, refresh_token)?;
    print_success("Tokens saved");
    print_json(&json!({
        "saved": true,
        "env_file": ctx.store().env_file_path().display().to_string(),
    }))
}

fn callback(ctx: &Context, url: &str, no_save: bool) -> AppResult<()> {
    let params = parse_callback(url)?;
    let save = !no_save;

    match &params {
        CallbackParams::Tokens {
            access_token,
            refresh_token,
            expires_in,
        } => {
            if save {
                let mut entries = vec![(env_vars::ACCESS_TOKEN, access_token.as_str())];
                if let Some(refresh_token) = refresh_token {
                    entries.push((env_vars::REFRESH_TOKEN, refresh_token.as_str()));
                }
                ctx.store().update(&entries)?;
                print_success("Tokens saved");
            }
            print_json(&json!({
                "access_token": access_token,
                "refresh_token": refresh_token,
                "expires_in": expires_in,
                "saved": save,
            }))
        }
        CallbackParams::Code { authorization_code } => {
            if save {
                ctx.store()
                    .update(&[(env_vars::AUTHORIZATION_CODE, authorization_code.as_str())])?;
                print_success("Authorization code saved");
            }
            print_json(&json!({
                "authorization_code": authorization_code,
                "saved": save,
            }))
        }
    }
}

async fn refresh(ctx: &Context) -> AppResult<()> {
    let credentials = &ctx.settings().credentials;
    let (Some(refresh_token), Some(client_id), Some(client_secret)) = (
        credentials.refresh_token.as_deref(),
        credentials.client_id.as_deref(),
        credentials.client_secret.as_deref(),
    ) else {
        return Err(AppError::auth_config(format!(
            "Refreshing needs {}, {} and {}",
            env_vars::REFRESH_TOKEN,
            env_vars::CLIENT_ID,
            env_vars::CLIENT_SECRET
        )));
    };

    let tokens = ctx
        .oauth()?
        .exchange(&TokenGrant::RefreshToken {
            client_id,
            client_secret,
            refresh_token,
        })
        .await
        .map_err(|e| AppError::authentication(format!("Token refresh failed: {}", e.message)))?;

    let new_refresh = tokens.refresh_token.as_deref().unwrap_or(refresh_token);
    ctx.store().persist(&tokens.access_token, new_refresh)?;
    info!("Refreshed access token");
    print_success("Token refreshed");

    let expires_in = tokens.expires_in.or_else(|| {
        tokens
            .expires_at
            .map(|at| (at - Utc::now()).num_seconds())
    });
    print_json(&json!({
        "access_token": mask_secret(&tokens.access_token),
        "refresh_token": if new_refresh == refresh_token { "unchanged" } else { "updated" },
        "expires_in": expires_in,
    }))
}
