// ABOUTME: File commands
// ABOUTME: Reads file metadata, copies files and attaches them to objects
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::Context;
use clap::Subcommand;
use podio_cli::client::ApiRequest;
use podio_cli::errors::AppResult;
use serde_json::json;

#[non_exhaustive]
#[derive(Debug, Subcommand)]
pub enum FileCommand {
    /// Show file metadata
    Get {
        /// File id
        file_id: u64,
    },
    /// Copy a file; the copy is unattached
    Copy {
        /// File id
        file_id: u64,
    },
    /// Attach an uploaded file to an object
    Attach {
        /// File id
        file_id: u64,

        /// Object type, e.g. `item`
        #[arg(long)]
        ref_type: String,

        /// Object id
        #[arg(long)]
        ref_id: u64,
    },
}

pub async fn run(ctx: &Context, action: FileCommand) -> AppResult<()> {
    match action {
        FileCommand::Get { file_id } => {
            ctx.execute(ApiRequest::get(format!("/file/{file_id}")))
                .await
        }
        FileCommand::Copy { file_id } => {
            ctx.execute_reporting(
                ApiRequest::post(format!("/file/{file_id}/copy")),
                &format!("File {file_id} copied"),
            )
            .await
        }
        FileCommand::Attach {
            file_id,
            ref_type,
            ref_id,
        } => {
            ctx.acknowledge(
                ApiRequest::post(format!("/file/{file_id}/attach"))
                    .json(json!({"ref_type": &ref_type, "ref_id": ref_id})),
                &format!("File {file_id} attached to {ref_type} {ref_id}"),
                json!({
                    "file_id": file_id,
                    "ref_type": &ref_type,
                    "ref_id": ref_id,
                    "attached": true,
                }),
            )
            .await
        }
    }
}
