// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
// ABOUTME: Output helpers for the podio binary
// ABOUTME: JSON goes to stdout, human-facing messages and errors go to stderr

use podio_cli::errors::{AppError, AppResult};
use serde::Serialize;

/// Pretty-print `value` as JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> AppResult<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

/// Success note on stderr
pub fn print_success(message: &str) {
    eprintln!("✓ {message}");
}

/// Plain informational line on stderr
pub fn print_info(message: &str) {
    eprintln!("{message}");
}

/// Report a failed command
pub fn print_error(error: &AppError) {
    eprintln!("Error: {error}");
}
