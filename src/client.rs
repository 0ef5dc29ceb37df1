// ABOUTME: Request dispatcher that sends authenticated calls to the Podio REST API
// ABOUTME: Classifies responses for the retry policy and refreshes the session once on a 401
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Podio API client
//!
//! [`PodioClient::send`] runs one logical call: it refreshes a session that is
//! known to be expired, then drives the request through the [`RetryPolicy`].
//! A 401 triggers at most one token refresh per call, after which the request
//! is re-sent immediately.

use crate::auth::{Session, TokenRefresher};
use crate::config::{ApiConfig, RetryConfig};
use crate::constants::http;
use crate::errors::AppResult;
use crate::retry::{AttemptOutcome, RetryPolicy, RetryableCall, Sleeper, TokioSleeper};
use crate::utils::http_client;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, RETRY_AFTER};
use reqwest::{Method, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

/// Longest raw body excerpt quoted in an error message
const MAX_ERROR_BODY_CHARS: usize = 300;

/// One API call as built by a command handler
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter
    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }

    /// Append a query parameter when `value` is present
    #[must_use]
    pub fn query_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Set the JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Authenticated client for the Podio REST API
pub struct PodioClient<S = TokioSleeper> {
    http: reqwest::Client,
    api: ApiConfig,
    policy: RetryPolicy<S>,
    refresher: TokenRefresher,
    session: Session,
}

impl PodioClient<TokioSleeper> {
    #[must_use]
    pub fn new(
        api: ApiConfig,
        retry: RetryConfig,
        session: Session,
        refresher: TokenRefresher,
    ) -> Self {
        Self::with_policy(api, RetryPolicy::new(retry), session, refresher)
    }
}

impl<S: Sleeper> PodioClient<S> {
    /// Client with an explicit retry policy, e.g. one with a recording sleeper
    #[must_use]
    pub fn with_policy(
        api: ApiConfig,
        policy: RetryPolicy<S>,
        session: Session,
        refresher: TokenRefresher,
    ) -> Self {
        Self {
            http: http_client::api_client(api.timeout_secs),
            api,
            policy,
            refresher,
            session,
        }
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy<S> {
        &self.policy
    }

    /// Run `request` to completion
    ///
    /// # Errors
    ///
    /// Returns the error the retry policy settles on, or `AuthenticationError`
    /// when the token is rejected and refreshing does not help
    pub async fn send(&mut self, request: &ApiRequest) -> AppResult<Value> {
        self.refresher.ensure_valid(&mut self.session).await?;

        let mut call = DispatchCall {
            http: &self.http,
            api: &self.api,
            refresher: &self.refresher,
            session: &mut self.session,
            request,
            refreshed: false,
        };
        self.policy.execute(&mut call).await
    }

    /// `GET path`
    ///
    /// # Errors
    ///
    /// See [`Self::send`]
    pub async fn get(&mut self, path: impl Into<String>) -> AppResult<Value> {
        self.send(&ApiRequest::get(path)).await
    }
}

struct DispatchCall<'a> {
    http: &'a reqwest::Client,
    api: &'a ApiConfig,
    refresher: &'a TokenRefresher,
    session: &'a mut Session,
    request: &'a ApiRequest,
    refreshed: bool,
}

impl DispatchCall<'_> {
    async fn send_once(&self) -> AppResult<AttemptOutcome<Value>> {
        let url = self.api.endpoint(&self.request.path)?;
        let mut builder = self.http.request(self.request.method.clone(), url).header(
            AUTHORIZATION,
            format!("{} {}", http::AUTH_SCHEME, self.session.access_token()),
        );
        if !self.request.query.is_empty() {
            builder = builder.query(&self.request.query);
        }
        if let Some(body) = &self.request.body {
            builder = builder.json(body);
        }

        debug!(method = %self.request.method, path = %self.request.path, "Sending request");
        match builder.send().await {
            Ok(response) => Ok(classify(response).await),
            Err(e) => Ok(AttemptOutcome::NetworkError(e.to_string())),
        }
    }
}

#[async_trait]
impl RetryableCall<Value> for DispatchCall<'_> {
    async fn attempt(&mut self) -> AppResult<AttemptOutcome<Value>> {
        let outcome = self.send_once().await?;
        if !matches!(outcome, AttemptOutcome::AuthExpired) || self.refreshed {
            return Ok(outcome);
        }

        self.refreshed = true;
        info!("Access token rejected, refreshing and retrying once");
        self.refresher.refresh(self.session).await?;
        self.send_once().await
    }
}

/// Map an HTTP response onto an attempt outcome
pub async fn classify(response: Response) -> AttemptOutcome<Value> {
    let status = response.status().as_u16();
    let retry_after = retry_after(&response);
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => return AttemptOutcome::NetworkError(format!("Failed to read response: {e}")),
    };
    debug!("Received HTTP {status}");
    classify_parts(status, retry_after, &body)
}

/// Pure part of [`classify`]
#[must_use]
pub fn classify_parts(
    status: u16,
    retry_after: Option<Duration>,
    body: &str,
) -> AttemptOutcome<Value> {
    match status {
        200..=299 => {
            if body.trim().is_empty() {
                return AttemptOutcome::Success(json!({}));
            }
            serde_json::from_str(body).map_or_else(
                |_| AttemptOutcome::Success(Value::String(body.to_owned())),
                AttemptOutcome::Success,
            )
        }
        401 => AttemptOutcome::AuthExpired,
        http::TOO_MANY_REQUESTS | http::ENHANCE_YOUR_CALM => {
            AttemptOutcome::RateLimited { retry_after }
        }
        500..=599 => AttemptOutcome::ServerError {
            status,
            message: error_message(status, body),
        },
        _ => AttemptOutcome::ClientError {
            status,
            message: error_message(status, body),
        },
    }
}

fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn error_message(status: u16, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = parsed.error_description.or(parsed.error) {
            return format!("HTTP {status}: {message}");
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return format!("HTTP {status}");
    }
    let excerpt: String = trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect();
    format!("HTTP {status}: {excerpt}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_bodies() {
        assert_eq!(
            classify_parts(200, None, r#"{"item_id": 1}"#),
            AttemptOutcome::Success(json!({"item_id": 1}))
        );
        assert_eq!(
            classify_parts(204, None, ""),
            AttemptOutcome::Success(json!({}))
        );
    }

    #[test]
    fn test_rate_limit_statuses() {
        let wait = Some(Duration::from_secs(3));
        assert_eq!(
            classify_parts(429, wait, ""),
            AttemptOutcome::RateLimited { retry_after: wait }
        );
        assert_eq!(
            classify_parts(420, None, r#"{"error":"rate_limit"}"#),
            AttemptOutcome::RateLimited { retry_after: None }
        );
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(classify_parts(401, None, ""), AttemptOutcome::AuthExpired);
        assert_eq!(
            classify_parts(
                404,
                None,
                r#"{"error":"not_found","error_description":"Object not found"}"#
            ),
            AttemptOutcome::ClientError {
                status: 404,
                message: "HTTP 404: Object not found".into()
            }
        );
        assert_eq!(
            classify_parts(502, None, "<html>bad gateway</html>"),
            AttemptOutcome::ServerError {
                status: 502,
                message: "HTTP 502: <html>bad gateway</html>".into()
            }
        );
    }

    #[test]
    fn test_request_builder() {
        let request = ApiRequest::get("/item/app/1/")
            .query("limit", 30)
            .query_opt("offset", None::<u32>)
            .query_opt("sort_by", Some("created_on"));
        assert_eq!(
            request.query,
            vec![
                ("limit".to_owned(), "30".to_owned()),
                ("sort_by".to_owned(), "created_on".to_owned())
            ]
        );
        assert_eq!(request.method, Method::GET);
    }
}
