// ABOUTME: Comment commands
// ABOUTME: Adds, lists, reads, edits and deletes comments on Podio objects
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{Context, WriteFlags};
use crate::helpers::input::JsonInput;
use clap::Subcommand;
use podio_cli::client::ApiRequest;
use podio_cli::errors::{AppError, AppResult};
use serde_json::{json, Map, Value};

#[non_exhaustive]
#[derive(Debug, Subcommand)]
pub enum CommentCommand {
    /// Comment on an object
    Create {
        /// Object type, e.g. `item` or `task`
        ref_type: String,

        /// Object id
        ref_id: u64,

        /// Comment text
        #[arg(long)]
        text: Option<String>,

        /// Invite users mentioned in the comment
        #[arg(long)]
        alert_invite: bool,

        #[command(flatten)]
        input: JsonInput,

        #[command(flatten)]
        flags: WriteFlags,
    },
    /// List comments on an object
    List {
        /// Object type
        ref_type: String,

        /// Object id
        ref_id: u64,

        /// Maximum number of comments
        #[arg(long, default_value_t = 100)]
        limit: u32,

        /// Number of comments to skip
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Show a comment
    Get {
        /// Comment id
        comment_id: u64,
    },
    /// Replace the text of a comment
    Update {
        /// Comment id
        comment_id: u64,

        /// New text
        #[arg(long)]
        text: Option<String>,

        #[command(flatten)]
        input: JsonInput,
    },
    /// Delete a comment
    Delete {
        /// Comment id
        comment_id: u64,

        /// Do not fire webhooks for this change
        #[arg(long)]
        no_hook: bool,
    },
}

pub async fn run(ctx: &Context, action: CommentCommand) -> AppResult<()> {
    match action {
        CommentCommand::Create {
            ref_type,
            ref_id,
            text,
            alert_invite,
            input,
            flags,
        } => {
            let body = comment_body(&input, text)?;
            let mut request = flags
                .apply(ApiRequest::post(format!("/comment/{ref_type}/{ref_id}/")).json(body));
            if alert_invite {
                request = request.query("alert_invite", true);
            }
            ctx.execute_reporting(request, &format!("Comment added to {ref_type} {ref_id}"))
                .await
        }
        CommentCommand::List {
            ref_type,
            ref_id,
            limit,
            offset,
        } => {
            ctx.execute(
                ApiRequest::get(format!("/comment/{ref_type}/{ref_id}/"))
                    .query("limit", limit)
                    .query("offset", offset),
            )
            .await
        }
        CommentCommand::Get { comment_id } => {
            ctx.execute(ApiRequest::get(format!("/comment/{comment_id}")))
                .await
        }
        CommentCommand::Update {
            comment_id,
            text,
            input,
        } => {
            let body = comment_body(&input, text)?;
            ctx.execute_reporting(
                ApiRequest::put(format!("/comment/{comment_id}")).json(body),
                &format!("Comment {comment_id} updated"),
            )
            .await
        }
        CommentCommand::Delete {
            comment_id,
            no_hook,
        } => {
            let flags = WriteFlags {
                silent: false,
                no_hook,
            };
            ctx.acknowledge(
                flags.apply(ApiRequest::delete(format!("/comment/{comment_id}"))),
                &format!("Comment {comment_id} deleted"),
                json!({"comment_id": comment_id, "deleted": true}),
            )
            .await
        }
    }
}

fn comment_body(input: &JsonInput, text: Option<String>) -> AppResult<Value> {
    let mut fields = Map::new();
    if let Some(text) = text {
        fields.insert("value".into(), json!(text));
    }
    let body = input.merge(fields)?;
    if body.get("value").is_none() {
        return Err(AppError::validation(
            "Either --text or a JSON body with 'value' is required",
        ));
    }
    Ok(body)
}
