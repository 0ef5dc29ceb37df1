// ABOUTME: Item commands
// ABOUTME: Reads, filters, creates, updates and deletes app items
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
pub enum ItemCommand {
    /// Show an item
    Get {
        /// Item id
        item_id: u64,

        /// Return the lighter basic representation
        #[arg(long)]
        basic: bool,
    },
    /// Filter the items of an app
    Filter {
        /// App id
        app_id: u64,

        /// Filters as a JSON object, e.g. '{"status": "active"}'
        #[arg(long)]
        filters: Option<String>,

        /// Maximum number of items
        #[arg(long, default_value_t = 30)]
        limit: u32,

        /// Number of items to skip
        #[arg(long, default_value_t = 0)]
        offset: u32,

        /// Field or attribute to sort by
        #[arg(long)]
        sort_by: Option<String>,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },
    /// Create an item from a JSON body with a `fields` object
    Create {
        /// App id
        app_id: u64,

        #[command(flatten)]
        input: JsonInput,

        #[command(flatten)]
        flags: WriteFlags,
    },
    /// Update an item from a JSON body
    Update {
        /// Item id
        item_id: u64,

        #[command(flatten)]
        input: JsonInput,

        #[command(flatten)]
        flags: WriteFlags,
    },
    /// Delete an item
    Delete {
        /// Item id
        item_id: u64,

        #[command(flatten)]
        flags: WriteFlags,
    },
    /// Show the field values of an item
    Values {
        /// Item id
        item_id: u64,
    },
}

pub async fn run(ctx: &Context, action: ItemCommand) -> AppResult<()> {
    let request = match action {
        ItemCommand::Get { item_id, basic } => {
            if basic {
                ApiRequest::get(format!("/item/{item_id}/basic"))
            } else {
                ApiRequest::get(format!("/item/{item_id}"))
            }
        }
        ItemCommand::Filter {
            app_id,
            filters,
            limit,
            offset,
            sort_by,
            desc,
        } => ApiRequest::post(format!("/item/app/{app_id}/filter/")).json(filter_body(
            filters.as_deref(),
            limit,
            offset,
            sort_by,
            desc,
        )?),
        ItemCommand::Create {
            app_id,
            input,
            flags,
        } => {
            let body = input.require()?;
            if body.get("fields").is_none() {
                return Err(AppError::validation(
                    "Item body must contain a 'fields' object",
                ));
            }
            flags.apply(ApiRequest::post(format!("/item/app/{app_id}/")).json(body))
        }
        ItemCommand::Update {
            item_id,
            input,
            flags,
        } => flags.apply(ApiRequest::put(format!("/item/{item_id}")).json(input.require()?)),
        ItemCommand::Delete { item_id, flags } => {
            flags.apply(ApiRequest::delete(format!("/item/{item_id}")))
        }
        ItemCommand::Values { item_id } => ApiRequest::get(format!("/item/{item_id}/value")),
    };
    ctx.execute(request).await
}

fn filter_body(
    filters: Option<&str>,
    limit: u32,
    offset: u32,
    sort_by: Option<String>,
    desc: bool,
) -> AppResult<Value> {
    let mut body = Map::new();
    body.insert("limit".into(), json!(limit));
    body.insert("offset".into(), json!(offset));
    if let Some(raw) = filters {
        let parsed: Value = serde_json::from_str(raw)
            .map_err(|e| AppError::validation(format!("Invalid JSON in --filters: {e}")))?;
        body.insert("filters".into(), parsed);
    }
    if let Some(sort_by) = sort_by {
        body.insert("sort_by".into(), json!(sort_by));
        body.insert("sort_desc".into(), json!(desc));
    }
    Ok(Value::Object(body))
}
