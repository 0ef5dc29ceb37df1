// ABOUTME: Webform commands
// ABOUTME: Lists the web forms of an app and shows a single form definition
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::Context;
use clap::Subcommand;
use podio_cli::client::ApiRequest;
use podio_cli::errors::AppResult;

#[non_exhaustive]
#[derive(Debug, Subcommand)]
pub enum WebformCommand {
    /// List the web forms of an app
    List {
        /// App id
        app_id: u64,

        /// Maximum number of forms
        #[arg(long, default_value_t = 100)]
        limit: u32,
    },
    /// Show a web form
    Get {
        /// Form id
        form_id: u64,
    },
}

pub async fn run(ctx: &Context, action: WebformCommand) -> AppResult<()> {
    let request = match action {
        WebformCommand::List { app_id, limit } => {
            ApiRequest::get(format!("/form/app/{app_id}/")).query("limit", limit)
        }
        WebformCommand::Get { form_id } => ApiRequest::get(format!("/form/{form_id}")),
    };
    ctx.execute(request).await
}
