// ABOUTME: Integration tests for the authenticated request dispatcher
// ABOUTME: Drives refresh-on-401, rate-limit retries and error mapping against a mock Podio API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{deterministic_retry, mock_client, store_in};
use podio_cli::client::ApiRequest;
use podio_cli::config::RetryConfig;
use podio_cli::errors::ErrorCode;
use serde_json::json;
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_expired_token_is_refreshed_once_and_request_resent() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/item/42"))
        .and(header("authorization", "OAuth2 stale-token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_token",
            "error_description": "expired_token"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth/token/v2"))
        .and(body_partial_json(json!({
            "grant_type": "refresh_token",
            "refresh_token": "refresh-1",
            "client_id": "test-client"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh-token",
            "refresh_token": "refresh-2",
            "expires_in": 28800,
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/item/42"))
        .and(header("authorization", "OAuth2 fresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"item_id": 42})))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_in(dir.path(), &server.uri());
    let mut client = mock_client(&server.uri(), store, "stale-token", deterministic_retry());

    let item = client.get("/item/42").await.unwrap();
    assert_eq!(item, json!({"item_id": 42}));
    assert_eq!(client.session().access_token(), "fresh-token");
    assert_eq!(client.session().refresh_token(), Some("refresh-2"));
    assert!(client.policy().sleeper().recorded_secs().is_empty());

    let saved = fs::read_to_string(dir.path().join(".env")).unwrap();
    assert!(saved.contains("PODIO_ACCESS_TOKEN=fresh-token"));
    assert!(saved.contains("PODIO_REFRESH_TOKEN=refresh-2"));
}

#[tokio::test]
async fn test_second_401_after_refresh_is_an_authentication_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/org/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth/token/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "still-rejected",
            "expires_in": 28800
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_in(dir.path(), &server.uri());
    let mut client = mock_client(&server.uri(), store, "stale-token", deterministic_retry());

    let err = client.get("/org/").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Authentication);
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_failed_refresh_is_reported_as_authentication_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/org/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth/token/v2"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Refresh token is no longer valid"
        })))
        .mount(&server)
        .await;

    let store = store_in(dir.path(), &server.uri());
    let mut client = mock_client(&server.uri(), store, "stale-token", deterministic_retry());

    let err = client.get("/org/").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Authentication);
    assert!(err.message.starts_with("Token refresh failed"));
    assert!(!dir.path().join(".env").exists());
}

#[tokio::test]
async fn test_rate_limit_honours_retry_after_then_succeeds() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/app/7"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "4"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/app/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"app_id": 7})))
        .mount(&server)
        .await;

    let store = store_in(dir.path(), &server.uri());
    let mut client = mock_client(&server.uri(), store, "token", deterministic_retry());

    let app = client.get("/app/7").await.unwrap();
    assert_eq!(app["app_id"], 7);
    assert_eq!(client.policy().sleeper().recorded_secs(), vec![4.0]);
}

#[tokio::test]
async fn test_server_errors_exhaust_attempts() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/space/3"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(3)
        .mount(&server)
        .await;

    let store = store_in(dir.path(), &server.uri());
    let mut client = mock_client(&server.uri(), store, "token", deterministic_retry());

    let err = client.get("/space/3").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ServerError);
    assert_eq!(err.status, Some(503));
    assert_eq!(err.attempts, Some(3));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(client.policy().sleeper().recorded_secs(), vec![1.0, 2.0]);
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/task/9"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "not_found",
            "error_description": "Object not found"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_in(dir.path(), &server.uri());
    let mut client = mock_client(&server.uri(), store, "token", deterministic_retry());

    let err = client.get("/task/9").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
    assert!(err.message.contains("Object not found"));
    assert!(client.policy().sleeper().recorded_secs().is_empty());
}

#[tokio::test]
async fn test_rate_limit_without_retry_fails_immediately() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/org/"))
        .respond_with(ResponseTemplate::new(420))
        .expect(1)
        .mount(&server)
        .await;

    let retry = RetryConfig::new(5, 1.0, 10.0, 2.0, false, false).unwrap();
    let store = store_in(dir.path(), &server.uri());
    let mut client = mock_client(&server.uri(), store, "token", retry);

    let err = client.get("/org/").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::RateLimitExceeded);
}

#[tokio::test]
async fn test_request_carries_query_body_and_headers() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/item/app/5/"))
        .and(query_param("silent", "true"))
        .and(header("authorization", "OAuth2 token"))
        .and(header(
            "user-agent",
            concat!("podio-cli/", env!("CARGO_PKG_VERSION")),
        ))
        .and(body_partial_json(json!({"fields": {"title": "Hello"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"item_id": 100})))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_in(dir.path(), &server.uri());
    let mut client = mock_client(&server.uri(), store, "token", deterministic_retry());

    let request = ApiRequest::post("/item/app/5/")
        .query("silent", true)
        .json(json!({"fields": {"title": "Hello"}}));
    let created = client.send(&request).await.unwrap();
    assert_eq!(created["item_id"], 100);
}

#[tokio::test]
async fn test_empty_success_body_becomes_empty_object() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("DELETE"))
        .and(path("/item/8"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let store = store_in(dir.path(), &server.uri());
    let mut client = mock_client(&server.uri(), store, "token", deterministic_retry());

    let response = client.send(&ApiRequest::delete("/item/8")).await.unwrap();
    assert_eq!(response, json!({}));
}
