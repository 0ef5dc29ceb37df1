// ABOUTME: Webhook commands
// ABOUTME: Registers, lists, verifies, validates and removes hooks on apps, fields and spaces
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::Context;
use clap::Subcommand;
use podio_cli::client::ApiRequest;
use crate::helpers::output::{print_info, print_json, print_success};
use podio_cli::errors::{AppError, AppResult};
use serde_json::{json, Value};

const FIELD_REF_TYPE: &str = "app_field";
const DEFAULT_EVENT_TYPE: &str = "item.update";

#[non_exhaustive]
#[derive(Debug, Subcommand)]
pub enum WebhookCommand {
    /// Register a webhook
    Create {
        /// Hookable type: `app`, `app_field` or `space`
        ref_type: String,

        /// Hookable id
        ref_id: u64,

        /// Endpoint that receives the events
        #[arg(long, short = 'u')]
        url: String,

        /// Event type
        #[arg(long = "type", default_value = DEFAULT_EVENT_TYPE)]
        event_type: String,
    },
    /// Register a webhook that fires only when one app field changes
    CreateField {
        /// Field id
        field_id: u64,

        /// Endpoint that receives the events
        #[arg(long, short = 'u')]
        url: String,

        /// Event type
        #[arg(long = "type", default_value = DEFAULT_EVENT_TYPE)]
        event_type: String,
    },
    /// List webhooks on an object
    List {
        /// Hookable type
        ref_type: String,

        /// Hookable id
        ref_id: u64,
    },
    /// List webhooks on one app field
    ListField {
        /// Field id
        field_id: u64,
    },
    /// Point a field webhook at a new URL
    ///
    /// Hooks cannot be edited in place, so the hook is deleted and created
    /// again with the same event type. The new hook has a new id and must be
    /// verified again.
    UpdateField {
        /// Hook id
        hook_id: u64,

        /// Field the hook is attached to
        field_id: u64,

        /// New endpoint
        #[arg(long, short = 'u')]
        url: String,
    },
    /// Ask Podio to send a verification code to the endpoint
    Verify {
        /// Hook id
        hook_id: u64,
    },
    /// Activate a hook with the code its endpoint received
    Validate {
        /// Hook id
        hook_id: u64,

        /// Verification code
        code: String,
    },
    /// Remove a webhook
    Delete {
        /// Hook id
        hook_id: u64,
    },
}

pub async fn run(ctx: &Context, action: WebhookCommand) -> AppResult<()> {
    match action {
        WebhookCommand::Create {
            ref_type,
            ref_id,
            url,
            event_type,
        } => {
            ctx.execute_reporting(
                create_request(&ref_type, ref_id, &url, &event_type),
                "Webhook created; run `podio webhook verify` to activate it",
            )
            .await
        }
        WebhookCommand::CreateField {
            field_id,
            url,
            event_type,
        } => {
            ctx.execute_reporting(
                create_request(FIELD_REF_TYPE, field_id, &url, &event_type),
                "Field webhook created; run `podio webhook verify` to activate it",
            )
            .await
        }
        WebhookCommand::ListField { field_id } => {
            ctx.execute(ApiRequest::get(format!("/hook/{FIELD_REF_TYPE}/{field_id}/")))
                .await
        }
        WebhookCommand::UpdateField {
            hook_id,
            field_id,
            url,
        } => update_field(ctx, hook_id, field_id, &url).await,
        WebhookCommand::List { ref_type, ref_id } => {
            ctx.execute(ApiRequest::get(format!("/hook/{ref_type}/{ref_id}/")))
                .await
        }
        WebhookCommand::Verify { hook_id } => {
            ctx.acknowledge(
                ApiRequest::post(format!("/hook/{hook_id}/verify/request")),
                &format!("Verification requested for hook {hook_id}"),
                json!({"hook_id": hook_id, "verification_requested": true}),
            )
            .await
        }
        WebhookCommand::Validate { hook_id, code } => {
            ctx.acknowledge(
                ApiRequest::post(format!("/hook/{hook_id}/verify/validate"))
                    .json(json!({"code": code})),
                &format!("Hook {hook_id} validated"),
                json!({"hook_id": hook_id, "validated": true}),
            )
            .await
        }
        WebhookCommand::Delete { hook_id } => {
            ctx.acknowledge(
                ApiRequest::delete(format!("/hook/{hook_id}")),
                &format!("Hook {hook_id} deleted"),
                json!({"hook_id": hook_id, "deleted": true}),
            )
            .await
        }
    }
}

fn create_request(ref_type: &str, ref_id: u64, url: &str, event_type: &str) -> ApiRequest {
    ApiRequest::post(format!("/hook/{ref_type}/{ref_id}/"))
        .json(json!({"url": url, "type": event_type}))
}

/// Event type of `hook_id` among the hooks listed for a field
fn existing_event_type(hooks: &Value, hook_id: u64) -> Option<String> {
    hooks
        .as_array()?
        .iter()
        .find(|hook| hook["hook_id"].as_u64() == Some(hook_id))
        .map(|hook| {
            hook["type"]
                .as_str()
                .unwrap_or(DEFAULT_EVENT_TYPE)
                .to_owned()
        })
}

async fn update_field(ctx: &Context, hook_id: u64, field_id: u64, url: &str) -> AppResult<()> {
    let mut client = ctx.client().await?;

    let hooks = client
        .send(&ApiRequest::get(format!("/hook/{FIELD_REF_TYPE}/{field_id}/")))
        .await?;
    let event_type = existing_event_type(&hooks, hook_id).ok_or_else(|| {
        AppError::not_found(format!("Webhook {hook_id} not found on field {field_id}"))
    })?;

    print_info(&format!("Deleting webhook {hook_id} ({event_type})"));
    client
        .send(&ApiRequest::delete(format!("/hook/{hook_id}")))
        .await?;

    let created = client
        .send(&create_request(FIELD_REF_TYPE, field_id, url, &event_type))
        .await?;
    print_success(&format!(
        "Webhook {hook_id} replaced; run `podio webhook verify` on the new hook"
    ));
    print_json(&created)
}
