// ABOUTME: Space (workspace) commands
// ABOUTME: Looks spaces up by id, by organization or by URL
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::Context;
use clap::Subcommand;
use podio_cli::client::ApiRequest;
use podio_cli::errors::AppResult;

#[non_exhaustive]
#[derive(Debug, Subcommand)]
pub enum SpaceCommand {
    /// Show one space
    Get {
        /// Space id (defaults to PODIO_WORKSPACE_ID)
        #[arg(long, short = 's')]
        space_id: Option<u64>,
    },
    /// List the spaces of an organization
    List {
        /// Organization id (defaults to PODIO_ORGANIZATION_ID)
        #[arg(long, short = 'o')]
        org_id: Option<u64>,
    },
    /// Resolve a space from its web URL
    FindByUrl {
        /// Space URL as shown in the browser
        url: String,
    },
}

pub async fn run(ctx: &Context, action: SpaceCommand) -> AppResult<()> {
    let request = match action {
        SpaceCommand::Get { space_id } => {
            ApiRequest::get(format!("/space/{}", ctx.workspace_id(space_id)?))
        }
        SpaceCommand::List { org_id } => {
            ApiRequest::get(format!("/space/org/{}/", ctx.organization_id(org_id)?))
        }
        SpaceCommand::FindByUrl { url } => ApiRequest::get("/space/url").query("url", url),
    };
    ctx.execute(request).await
}
