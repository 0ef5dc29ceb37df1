// ABOUTME: End-to-end tests for field-level webhook commands of the podio binary
// ABOUTME: Drives the binary against a mock Podio API with a pre-issued access token
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::env;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn podio(home: &TempDir, api_url: &str) -> Command {
    let mut cmd = Command::cargo_bin("podio").unwrap();
    cmd.env_clear()
        .env("HOME", home.path())
        .env("PATH", env::var_os("PATH").unwrap_or_default())
        .env("PODIO_ACCESS_TOKEN", "token")
        .env("PODIO_API_URL", api_url)
        .env("PODIO_RETRY_MAX_ATTEMPTS", "1")
        .current_dir(home.path())
        .write_stdin("");
    cmd
}

#[tokio::test]
async fn test_update_field_recreates_hook_with_same_event_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/hook/app_field/77/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"hook_id": 4, "type": "item.update", "url": "https://other"},
            {"hook_id": 5, "type": "item.create", "url": "https://old"}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/hook/5"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/hook/app_field/77/"))
        .and(body_json(json!({"url": "https://new", "type": "item.create"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hook_id": 6})))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let output = podio(&home, &server.uri())
        .args(["webhook", "update-field", "5", "77", "--url", "https://new"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let created: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(created["hook_id"], 6);
}

#[tokio::test]
async fn test_update_field_of_unknown_hook_deletes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/hook/app_field/77/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    podio(&home, &server.uri())
        .args(["webhook", "update-field", "5", "77", "-u", "https://new"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Webhook 5 not found on field 77"));
}

#[tokio::test]
async fn test_create_field_targets_app_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook/app_field/77/"))
        .and(body_json(json!({"url": "https://hook", "type": "item.update"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hook_id": 9})))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    podio(&home, &server.uri())
        .args(["webhook", "create-field", "77", "--url", "https://hook"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"hook_id\": 9"));
}
