// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
// ABOUTME: Request body input for the podio binary
// ABOUTME: Reads JSON from --json, --json-file or piped stdin, and asks for confirmations

use clap::Args;
use podio_cli::errors::{AppError, AppResult};
use serde_json::{Map, Value};
use std::fs;
use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::path::PathBuf;
use tokio::task;

/// JSON request body options shared by create and update commands
#[derive(Debug, Clone, Default, Args)]
pub struct JsonInput {
    /// Request body as an inline JSON string
    #[arg(long, conflicts_with = "json_file")]
    pub json: Option<String>,

    /// Path to a JSON file with the request body (`-` for stdin)
    #[arg(long)]
    pub json_file: Option<PathBuf>,
}

impl JsonInput {
    /// Body from `--json`, `--json-file`, or piped stdin; `None` if none was given
    pub fn read(&self) -> AppResult<Option<Value>> {
        if let Some(raw) = &self.json {
            return parse("--json", raw).map(Some);
        }
        if let Some(path) = &self.json_file {
            if path.as_os_str() == "-" {
                return read_stdin();
            }
            let raw = fs::read_to_string(path).map_err(|e| {
                AppError::validation(format!("Cannot read {}: {e}", path.display()))
            })?;
            return parse(&path.display().to_string(), &raw).map(Some);
        }
        if io::stdin().is_terminal() {
            return Ok(None);
        }
        read_stdin()
    }

    /// Body that must be present
    pub fn require(&self) -> AppResult<Value> {
        self.read()?.ok_or_else(|| {
            AppError::validation("A JSON body is required: pass --json, --json-file or pipe it on stdin")
        })
    }

    /// Body merged over fields built from command-line flags; flags win
    pub fn merge(&self, fields: Map<String, Value>) -> AppResult<Value> {
        let mut body = match self.read()? {
            Some(Value::Object(map)) => map,
            Some(_) => return Err(AppError::validation("The JSON body must be an object")),
            None => Map::new(),
        };
        body.extend(fields);
        Ok(Value::Object(body))
    }
}

fn read_stdin() -> AppResult<Option<Value>> {
    let mut raw = String::new();
    io::stdin().read_to_string(&mut raw)?;
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse("stdin", &raw).map(Some)
}

fn parse(source: &str, raw: &str) -> AppResult<Value> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::validation(format!("Invalid JSON in {source}: {e}")))
}

/// Parse a comma-separated id list such as `1,2, 3`
pub fn parse_id_list(raw: &str) -> AppResult<Vec<u64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u64>()
                .map_err(|_| AppError::validation(format!("'{part}' is not a numeric id")))
        })
        .collect()
}

/// Ask a yes/no question on stderr; anything but `y`/`yes` is a no
pub async fn confirm(prompt: &str) -> AppResult<bool> {
    eprint!("{prompt} [y/N]: ");
    io::stderr().flush()?;
    // Off the runtime thread so the Ctrl-C branch in main stays responsive
    let answer = task::spawn_blocking(|| {
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer).map(|_| answer)
    })
    .await
    .map_err(|e| AppError::internal(format!("Confirmation prompt failed: {e}")))??;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inline_json() {
        let input = JsonInput {
            json: Some(r#"{"text": "hi"}"#.into()),
            json_file: None,
        };
        assert_eq!(input.read().unwrap(), Some(json!({"text": "hi"})));
    }

    #[test]
    fn test_flags_override_body() {
        let input = JsonInput {
            json: Some(r#"{"text": "from body", "private": true}"#.into()),
            json_file: None,
        };
        let mut fields = Map::new();
        fields.insert("text".into(), json!("from flag"));
        assert_eq!(
            input.merge(fields).unwrap(),
            json!({"text": "from flag", "private": true})
        );
    }

    #[test]
    fn test_invalid_json_is_a_validation_error() {
        let input = JsonInput {
            json: Some("{nope".into()),
            json_file: None,
        };
        assert_eq!(input.read().unwrap_err().exit_code(), 1);
    }

    #[test]
    fn test_id_list() {
        assert_eq!(parse_id_list("1, 2,3,").unwrap(), vec![1, 2, 3]);
        assert!(parse_id_list("1,x").is_err());
    }

    #[test]
    fn test_confirmation_answers() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("no\n"));
    }
}
