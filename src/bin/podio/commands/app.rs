// ABOUTME: App commands
// ABOUTME: Reads app definitions, lists apps and items, and toggles app activation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::Context;
use clap::Subcommand;
use podio_cli::client::ApiRequest;
use podio_cli::errors::AppResult;

#[non_exhaustive]
#[derive(Debug, Subcommand)]
pub enum AppCommand {
    /// Show an app definition
    Get {
        /// App id
        app_id: u64,
    },
    /// List the apps of a space
    List {
        /// Space id (defaults to PODIO_WORKSPACE_ID)
        #[arg(long, short = 's')]
        space_id: Option<u64>,
    },
    /// List items of an app
    Items {
        /// App id
        app_id: u64,

        /// Maximum number of items
        #[arg(long, default_value_t = 30)]
        limit: u32,

        /// Number of items to skip
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Activate a deactivated app
    Activate {
        /// App id
        app_id: u64,
    },
    /// Deactivate an app
    Deactivate {
        /// App id
        app_id: u64,
    },
}

pub async fn run(ctx: &Context, action: AppCommand) -> AppResult<()> {
    let request = match action {
        AppCommand::Get { app_id } => ApiRequest::get(format!("/app/{app_id}")),
        AppCommand::List { space_id } => {
            ApiRequest::get(format!("/app/space/{}/", ctx.workspace_id(space_id)?))
        }
        AppCommand::Items {
            app_id,
            limit,
            offset,
        } => ApiRequest::get(format!("/item/app/{app_id}/"))
            .query("limit", limit)
            .query("offset", offset),
        AppCommand::Activate { app_id } => ApiRequest::post(format!("/app/{app_id}/activate")),
        AppCommand::Deactivate { app_id } => {
            ApiRequest::post(format!("/app/{app_id}/deactivate"))
        }
    };
    ctx.execute(request).await
}
