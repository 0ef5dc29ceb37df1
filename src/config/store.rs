// ABOUTME: Credential store that loads layered settings and persists tokens atomically
// ABOUTME: Rewrites only the touched dotenv lines through a temp file and an atomic rename
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::credentials::Credentials;
use super::environment::EnvSources;
use crate::constants::{env_vars, paths};
use crate::errors::{AppError, AppResult};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Loads credentials and writes token updates back to the credential file
#[derive(Debug, Clone)]
pub struct CredentialStore {
    sources: EnvSources,
    target: PathBuf,
}

impl CredentialStore {
    /// Discover sources from the running process
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory is unavailable or a dotenv file is malformed
    pub fn discover() -> AppResult<Self> {
        let sources = EnvSources::from_process()?;
        let target = Self::default_target(&sources, dirs::home_dir().as_deref());
        Ok(Self::new(sources, target))
    }

    /// Build a store over already-resolved sources and an explicit target file
    #[must_use]
    pub const fn new(sources: EnvSources, target: PathBuf) -> Self {
        Self { sources, target }
    }

    /// Choose the file token updates are written to: `$PODIO_ENV_FILE`, else
    /// the first existing file in lookup order, else the global config file,
    /// else `./.env`
    #[must_use]
    pub fn default_target(sources: &EnvSources, home: Option<&Path>) -> PathBuf {
        if let Some(explicit) = sources.get(env_vars::ENV_FILE) {
            return PathBuf::from(explicit);
        }
        if let Some(existing) = sources.loaded_files().first() {
            return existing.clone();
        }
        home.map_or_else(
            || PathBuf::from(paths::ENV_FILE_NAME),
            |home| {
                home.join(paths::GLOBAL_CONFIG_DIR)
                    .join(paths::ENV_FILE_NAME)
            },
        )
    }

    /// Resolved configuration sources
    #[must_use]
    pub const fn sources(&self) -> &EnvSources {
        &self.sources
    }

    /// File that token updates are written to
    #[must_use]
    pub fn env_file_path(&self) -> &Path {
        &self.target
    }

    /// Snapshot the credentials
    ///
    /// # Errors
    ///
    /// Returns a validation error when a numeric id does not parse
    pub fn load(&self) -> AppResult<Credentials> {
        Credentials::from_sources(&self.sources)
    }

    /// Replace the stored token pair
    ///
    /// # Errors
    ///
    /// Returns a storage error if the credential file cannot be rewritten; the
    /// previous file is left untouched in that case
    pub fn persist(&self, access_token: &str, refresh_token: &str) -> AppResult<()> {
        self.update(&[
            (env_vars::ACCESS_TOKEN, access_token),
            (env_vars::REFRESH_TOKEN, refresh_token),
        ])?;
        info!("Saved refreshed tokens to {}", self.target.display());
        Ok(())
    }

    /// Set `entries` in the credential file, keeping every other line as is
    ///
    /// # Errors
    ///
    /// Returns a storage error if the file cannot be read or atomically replaced
    pub fn update(&self, entries: &[(&str, &str)]) -> AppResult<()> {
        let current = match fs::read_to_string(&self.target) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(AppError::storage(format!(
                    "Failed to read {}: {e}",
                    self.target.display()
                ))
                .with_source(e))
            }
        };

        let rewritten = rewrite_env(&current, entries);
        write_atomically(&self.target, &rewritten)?;
        debug!(
            "Updated {} key(s) in {}",
            entries.len(),
            self.target.display()
        );
        Ok(())
    }
}

/// Replace or append `entries` in dotenv `contents`
#[must_use]
pub fn rewrite_env(contents: &str, entries: &[(&str, &str)]) -> String {
    let mut written = vec![false; entries.len()];
    let mut lines: Vec<String> = Vec::new();

    for line in contents.lines() {
        let position = line_key(line).and_then(|key| entries.iter().position(|(k, _)| *k == key));
        match position {
            Some(index) if written[index] => {}
            Some(index) => {
                let (key, value) = entries[index];
                lines.push(format_entry(key, value));
                written[index] = true;
            }
            None => lines.push(line.to_owned()),
        }
    }

    for (index, (key, value)) in entries.iter().enumerate() {
        if !written[index] {
            lines.push(format_entry(key, value));
        }
    }

    let mut output = lines.join("\n");
    output.push('\n');
    output
}

fn line_key(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        return None;
    }
    let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
    trimmed.split_once('=').map(|(key, _)| key.trim())
}

fn format_entry(key: &str, value: &str) -> String {
    let needs_quotes = value
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '#' | '"' | '\'' | '\\' | '$'));
    if !needs_quotes {
        return format!("{key}={value}");
    }
    // Single quotes are literal in dotenv; double quotes expand `$VAR`
    if value.contains('\'') {
        let escaped = value
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('$', "\\$");
        format!("{key}=\"{escaped}\"")
    } else {
        format!("{key}='{value}'")
    }
}

/// Write `contents` to `path` so readers see either the old or the new file,
/// never a partial one
///
/// # Errors
///
/// Returns a storage error if the temp file cannot be written or renamed
pub fn write_atomically(path: &Path, contents: &str) -> AppResult<()> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|e| {
        AppError::storage(format!("Failed to create directory {}: {e}", dir.display()))
            .with_source(e)
    })?;

    // NamedTempFile is created with mode 0600 on unix and removed on drop if
    // it never gets persisted.
    let mut temp = NamedTempFile::new_in(dir).map_err(|e| {
        AppError::storage(format!("Failed to create temp file in {}: {e}", dir.display()))
            .with_source(e)
    })?;
    temp.write_all(contents.as_bytes())
        .and_then(|()| temp.flush())
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|e| {
            AppError::storage(format!("Failed to write temp credential file: {e}")).with_source(e)
        })?;

    temp.persist(path).map_err(|e| {
        AppError::storage(format!("Failed to replace {}: {}", path.display(), e.error))
            .with_source(e.error)
    })?;
    Ok(())
}
