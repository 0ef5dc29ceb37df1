// ABOUTME: Podio CLI - command-line access to the Podio REST API
// ABOUTME: Parses arguments, resolves credentials once and dispatches to command handlers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Check which credentials are configured and whether they work
//! podio auth status
//!
//! # Start a browser login and store the tokens from the redirect
//! podio auth login
//! podio auth parse-callback 'https://podio.com/oauth/callback#access_token=...'
//!
//! # List organizations and the apps of the default space
//! podio org list
//! podio app list
//!
//! # Filter items of an app
//! podio item filter 12345 --filters '{"status": "active"}' --limit 10
//!
//! # Create an item from a file or stdin
//! podio item create 12345 --json-file item.json
//! cat item.json | podio item create 12345
//! ```
//!
//! JSON responses go to stdout; progress and errors go to stderr.
//! Exit codes: 0 success, 1 error, 2 authentication error, 130 interrupted.

mod commands;
mod helpers;

use clap::{Parser, Subcommand};
use commands::app::AppCommand;
use commands::auth::AuthCommand;
use commands::comment::CommentCommand;
use commands::conversation::ConversationCommand;
use commands::file::FileCommand;
use commands::item::ItemCommand;
use commands::org::OrgCommand;
use commands::space::SpaceCommand;
use commands::task::TaskCommand;
use commands::webform::WebformCommand;
use commands::webhook::WebhookCommand;
use commands::Context;
use helpers::output::print_error;
use podio_cli::constants::exit_codes;
use podio_cli::errors::AppResult;
use podio_cli::logging;
use std::process::{self, ExitCode};
use tokio::signal;
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "podio",
    version,
    about = "Command-line client for the Podio API",
    long_about = "Command-line client for the Podio API. Credentials are read from the environment, ~/.podio/.env, ./.env and ../.env."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Authentication and stored tokens
    Auth {
        #[command(subcommand)]
        action: AuthCommand,
    },

    /// Organizations
    Org {
        #[command(subcommand)]
        action: OrgCommand,
    },

    /// Spaces (workspaces)
    Space {
        #[command(subcommand)]
        action: SpaceCommand,
    },

    /// Apps
    App {
        #[command(subcommand)]
        action: AppCommand,
    },

    /// Items
    Item {
        #[command(subcommand)]
        action: ItemCommand,
    },

    /// Tasks
    Task {
        #[command(subcommand)]
        action: TaskCommand,
    },

    /// Comments
    Comment {
        #[command(subcommand)]
        action: CommentCommand,
    },

    /// Webhooks
    Webhook {
        #[command(subcommand)]
        action: WebhookCommand,
    },

    /// Conversations
    Conversation {
        #[command(subcommand)]
        action: ConversationCommand,
    },

    /// Files
    File {
        #[command(subcommand)]
        action: FileCommand,
    },

    /// Web forms
    Webform {
        #[command(subcommand)]
        action: WebformCommand,
    },
}

async fn run(command: Command) -> AppResult<u8> {
    let ctx = Context::load()?;

    match command {
        Command::Auth { action } => return commands::auth::run(&ctx, action).await,
        Command::Org { action } => commands::org::run(&ctx, action).await?,
        Command::Space { action } => commands::space::run(&ctx, action).await?,
        Command::App { action } => commands::app::run(&ctx, action).await?,
        Command::Item { action } => commands::item::run(&ctx, action).await?,
        Command::Task { action } => commands::task::run(&ctx, action).await?,
        Command::Comment { action } => commands::comment::run(&ctx, action).await?,
        Command::Webhook { action } => commands::webhook::run(&ctx, action).await?,
        Command::Conversation { action } => commands::conversation::run(&ctx, action).await?,
        Command::File { action } => commands::file::run(&ctx, action).await?,
        Command::Webform { action } => commands::webform::run(&ctx, action).await?,
    }

    Ok(exit_codes::SUCCESS)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init_from_env(cli.verbose) {
        eprintln!("Warning: logging disabled: {e}");
    }
    debug!("podio {}", env!("CARGO_PKG_VERSION"));

    tokio::select! {
        biased;

        _ = signal::ctrl_c() => {
            eprintln!("\nAborted!");
            // A confirmation prompt may still be blocked on stdin, and runtime
            // shutdown would wait for it
            process::exit(i32::from(exit_codes::INTERRUPTED));
        }
        result = run(cli.command) => match result {
            Ok(code) => ExitCode::from(code),
            Err(e) => {
                print_error(&e);
                ExitCode::from(e.exit_code())
            }
        },
    }
}
