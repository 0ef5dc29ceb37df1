// ABOUTME: Extracts tokens or an authorization code from an OAuth redirect URL
// ABOUTME: Fragment parameters carry client-side tokens, query parameters carry server-side codes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::{AppError, AppResult, ErrorCode};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashMap;
use url::{form_urlencoded, Url};

/// What the authorize page sent back
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CallbackParams {
    /// Client-side flow
    Tokens {
        access_token: String,
        refresh_token: Option<String>,
        expires_in: Option<String>,
    },
    /// Server-side flow
    Code { authorization_code: String },
}

/// Parse a redirect URL pasted by the user
///
/// # Errors
///
/// Returns an error when the URL is malformed, carries an OAuth `error`, or
/// has neither an access token in its fragment nor a code in its query
pub fn parse_callback(callback_url: &str) -> AppResult<CallbackParams> {
    let url = Url::parse(callback_url.trim()).map_err(|e| {
        AppError::new(
            ErrorCode::InvalidRequest,
            format!("Failed to parse callback URL: {e}"),
        )
    })?;

    if let Some(fragment) = url.fragment().filter(|f| !f.is_empty()) {
        let mut params = to_map(form_urlencoded::parse(fragment.as_bytes()));
        reject_oauth_error(&params)?;
        let access_token = params.remove("access_token").ok_or_else(|| {
            AppError::new(
                ErrorCode::InvalidRequest,
                "No access_token found in URL fragment",
            )
        })?;
        return Ok(CallbackParams::Tokens {
            access_token,
            refresh_token: params.remove("refresh_token"),
            expires_in: params.remove("expires_in"),
        });
    }

    if url.query().is_some_and(|q| !q.is_empty()) {
        let mut params = to_map(url.query_pairs());
        reject_oauth_error(&params)?;
        return params.remove("code").map_or_else(
            || {
                Err(AppError::new(
                    ErrorCode::InvalidRequest,
                    "No authorization code found in query string",
                ))
            },
            |authorization_code| Ok(CallbackParams::Code { authorization_code }),
        );
    }

    Err(AppError::new(
        ErrorCode::InvalidRequest,
        "Invalid callback URL format: expected a query (?code=...) or fragment (#access_token=...)",
    ))
}

fn to_map<'a>(
    pairs: impl Iterator<Item = (Cow<'a, str>, Cow<'a, str>)>,
) -> HashMap<String, String> {
    pairs
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

fn reject_oauth_error(params: &HashMap<String, String>) -> AppResult<()> {
    match params.get("error") {
        Some(error) => {
            let detail = params.get("error_description").unwrap_or(error);
            Err(AppError::new(
                ErrorCode::InvalidRequest,
                format!("Authorization error: {detail}"),
            ))
        }
        None => Ok(()),
    }
}
