// ABOUTME: Conversation commands
// ABOUTME: Private messaging: listing, starting, replying, searching and per-user flags
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::Context;
use crate::helpers::input::{parse_id_list, JsonInput};
use clap::{Args, Subcommand};
use podio_cli::client::ApiRequest;
use podio_cli::errors::{AppError, AppResult};
use serde_json::{json, Map, Value};

/// Subject, text and participants of a new conversation
#[derive(Debug, Clone, Args)]
pub struct NewConversation {
    /// Conversation subject
    #[arg(long)]
    subject: Option<String>,

    /// First message
    #[arg(long)]
    text: Option<String>,

    /// Comma-separated user ids
    #[arg(long)]
    participants: Option<String>,

    #[command(flatten)]
    input: JsonInput,
}

impl NewConversation {
    fn body(&self) -> AppResult<Value> {
        let mut fields = Map::new();
        if let Some(subject) = &self.subject {
            fields.insert("subject".into(), json!(subject));
        }
        if let Some(text) = &self.text {
            fields.insert("text".into(), json!(text));
        }
        if let Some(participants) = &self.participants {
            fields.insert("participants".into(), json!(parse_id_list(participants)?));
        }
        let body = self.input.merge(fields)?;
        let missing: Vec<&str> = ["subject", "text", "participants"]
            .into_iter()
            .filter(|key| body.get(key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(AppError::validation(format!(
                "Missing {}: pass the flags or a JSON body",
                missing.join(", ")
            )));
        }
        Ok(body)
    }
}

#[non_exhaustive]
#[derive(Debug, Subcommand)]
pub enum ConversationCommand {
    /// List conversations
    List {
        /// Maximum number of results
        #[arg(long, default_value_t = 10)]
        limit: u32,

        /// Number of results to skip
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Show a conversation with its messages
    Get {
        /// Conversation id
        conversation_id: u64,
    },
    /// Start a conversation
    Create {
        #[command(flatten)]
        message: NewConversation,
    },
    /// Reply to a conversation
    Reply {
        /// Conversation id
        conversation_id: u64,

        /// Reply text
        #[arg(long)]
        text: Option<String>,

        #[command(flatten)]
        input: JsonInput,
    },
    /// Add users to a conversation
    AddParticipants {
        /// Conversation id
        conversation_id: u64,

        /// Comma-separated user ids
        #[arg(long)]
        participants: String,
    },
    /// Search conversations by text
    Search {
        /// Search text
        query: String,

        /// Maximum number of results
        #[arg(long, default_value_t = 10)]
        limit: u32,

        /// Number of results to skip
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// List the events of a conversation
    Events {
        /// Conversation id
        conversation_id: u64,

        /// Maximum number of results
        #[arg(long, default_value_t = 10)]
        limit: u32,

        /// Number of results to skip
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Conversations attached to an object
    OnObject {
        /// Object type, e.g. `item`
        ref_type: String,

        /// Object id
        ref_id: u64,
    },
    /// Start a conversation attached to an object
    CreateOnObject {
        /// Object type
        ref_type: String,

        /// Object id
        ref_id: u64,

        #[command(flatten)]
        message: NewConversation,
    },
    /// Mark a conversation as read
    MarkRead {
        /// Conversation id
        conversation_id: u64,
    },
    /// Mark a conversation as unread
    MarkUnread {
        /// Conversation id
        conversation_id: u64,
    },
    /// Star a conversation
    Star {
        /// Conversation id
        conversation_id: u64,
    },
    /// Remove the star from a conversation
    Unstar {
        /// Conversation id
        conversation_id: u64,
    },
    /// Leave a conversation
    Leave {
        /// Conversation id
        conversation_id: u64,
    },
}

pub async fn run(ctx: &Context, action: ConversationCommand) -> AppResult<()> {
    match action {
        ConversationCommand::List { limit, offset } => {
            ctx.execute(
                ApiRequest::get("/conversation/")
                    .query("limit", limit)
                    .query("offset", offset),
            )
            .await
        }
        ConversationCommand::Get { conversation_id } => {
            ctx.execute(ApiRequest::get(format!("/conversation/{conversation_id}")))
                .await
        }
        ConversationCommand::Create { message } => {
            ctx.execute_reporting(
                ApiRequest::post("/conversation/").json(message.body()?),
                "Conversation created",
            )
            .await
        }
        ConversationCommand::Reply {
            conversation_id,
            text,
            input,
        } => {
            let mut fields = Map::new();
            if let Some(text) = text {
                fields.insert("text".into(), json!(text));
            }
            let body = input.merge(fields)?;
            if body.get("text").is_none() {
                return Err(AppError::validation(
                    "Either --text or a JSON body with 'text' is required",
                ));
            }
            ctx.execute_reporting(
                ApiRequest::post(format!("/conversation/{conversation_id}/reply/v2")).json(body),
                &format!("Reply sent to conversation {conversation_id}"),
            )
            .await
        }
        ConversationCommand::AddParticipants {
            conversation_id,
            participants,
        } => {
            let ids = parse_id_list(&participants)?;
            ctx.execute_reporting(
                ApiRequest::post(format!("/conversation/{conversation_id}/participant/v2/"))
                    .json(json!({"participants": ids})),
                &format!("Participants added to conversation {conversation_id}"),
            )
            .await
        }
        ConversationCommand::Search {
            query,
            limit,
            offset,
        } => {
            ctx.execute(
                ApiRequest::get("/conversation/search/")
                    .query("text", query)
                    .query("limit", limit)
                    .query("offset", offset),
            )
            .await
        }
        ConversationCommand::Events {
            conversation_id,
            limit,
            offset,
        } => {
            ctx.execute(
                ApiRequest::get(format!("/conversation/{conversation_id}/event/"))
                    .query("limit", limit)
                    .query("offset", offset),
            )
            .await
        }
        ConversationCommand::OnObject { ref_type, ref_id } => {
            ctx.execute(ApiRequest::get(format!(
                "/conversation/{ref_type}/{ref_id}/"
            )))
            .await
        }
        ConversationCommand::CreateOnObject {
            ref_type,
            ref_id,
            message,
        } => {
            ctx.execute_reporting(
                ApiRequest::post(format!("/conversation/{ref_type}/{ref_id}/"))
                    .json(message.body()?),
                &format!("Conversation created on {ref_type} {ref_id}"),
            )
            .await
        }
        ConversationCommand::MarkRead { conversation_id } => {
            let request = ApiRequest::post(read_path(conversation_id));
            flag(ctx, request, conversation_id, "marked as read", ("marked_read", true)).await
        }
        ConversationCommand::MarkUnread { conversation_id } => {
            let request = ApiRequest::delete(read_path(conversation_id));
            flag(ctx, request, conversation_id, "marked as unread", ("marked_unread", true)).await
        }
        ConversationCommand::Star { conversation_id } => {
            let request = ApiRequest::post(star_path(conversation_id));
            flag(ctx, request, conversation_id, "starred", ("starred", true)).await
        }
        ConversationCommand::Unstar { conversation_id } => {
            let request = ApiRequest::delete(star_path(conversation_id));
            flag(ctx, request, conversation_id, "unstarred", ("starred", false)).await
        }
        ConversationCommand::Leave { conversation_id } => {
            let request = ApiRequest::post(format!("/conversation/{conversation_id}/leave"));
            flag(ctx, request, conversation_id, "left", ("left", true)).await
        }
    }
}

fn read_path(conversation_id: u64) -> String {
    format!("/conversation/{conversation_id}/read")
}

fn star_path(conversation_id: u64) -> String {
    format!("/conversation/{conversation_id}/star")
}

async fn flag(
    ctx: &Context,
    request: ApiRequest,
    conversation_id: u64,
    verb: &str,
    (key, value): (&str, bool),
) -> AppResult<()> {
    let mut ack = Map::new();
    ack.insert("conversation_id".into(), json!(conversation_id));
    ack.insert(key.to_owned(), json!(value));
    ctx.acknowledge(
        request,
        &format!("Conversation {conversation_id} {verb}"),
        Value::Object(ack),
    )
    .await
}
