// ABOUTME: Organization commands
// ABOUTME: Lists the organizations the authenticated user belongs to
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::Context;
use clap::Subcommand;
use podio_cli::client::ApiRequest;
use podio_cli::errors::AppResult;

#[non_exhaustive]
#[derive(Debug, Subcommand)]
pub enum OrgCommand {
    /// List organizations with their spaces
    List,
    /// Show one organization
    Get {
        /// Organization id (defaults to PODIO_ORGANIZATION_ID)
        #[arg(long, short = 'o')]
        org_id: Option<u64>,
    },
}

pub async fn run(ctx: &Context, action: OrgCommand) -> AppResult<()> {
    let request = match action {
        OrgCommand::List => ApiRequest::get("/org/"),
        OrgCommand::Get { org_id } => {
            ApiRequest::get(format!("/org/{}", ctx.organization_id(org_id)?))
        }
    };
    ctx.execute(request).await
}
