// ABOUTME: Layered environment lookup across the process environment and dotenv files
// ABOUTME: Resolves each variable from the first source that defines it, even as blank
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Layered configuration sources.
//!
//! Lookup order, first definition wins per variable:
//!
//! 1. the process environment
//! 2. `$PODIO_ENV_FILE` when set
//! 3. `~/.podio/.env`
//! 4. `./.env`
//! 5. `../.env`
//!
//! Later sources never override a value already supplied by an earlier one.
//! A blank definition (`KEY=`) still counts: it masks later files and reads
//! back as unset, which is how `auth logout` clears stored tokens.

use crate::constants::{env_vars, paths};
use crate::errors::{AppError, AppResult};
use std::collections::HashMap;
use std::env;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Resolved variables plus the files that contributed to them
#[derive(Debug, Clone, Default)]
pub struct EnvSources {
    values: HashMap<String, String>,
    searched: Vec<PathBuf>,
    loaded: Vec<PathBuf>,
}

impl EnvSources {
    /// Resolve sources from the running process: its environment, home
    /// directory and working directory
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be determined or a
    /// dotenv file is malformed
    pub fn from_process() -> AppResult<Self> {
        let cwd = env::current_dir()
            .map_err(|e| AppError::config(format!("Cannot determine working directory: {e}")))?;
        let home = dirs::home_dir();
        let process: Vec<(String, String)> = env::vars().collect();
        let explicit = process
            .iter()
            .find(|(key, value)| key == env_vars::ENV_FILE && !value.is_empty())
            .map(|(_, value)| PathBuf::from(value));

        let search = Self::search_paths(home.as_deref(), &cwd, explicit);
        Self::load(process, search)
    }

    /// Ordered list of dotenv files consulted after the process environment
    #[must_use]
    pub fn search_paths(home: Option<&Path>, cwd: &Path, explicit: Option<PathBuf>) -> Vec<PathBuf> {
        let mut search = Vec::with_capacity(4);
        if let Some(path) = explicit {
            search.push(path);
        }
        if let Some(home) = home {
            search.push(
                home.join(paths::GLOBAL_CONFIG_DIR)
                    .join(paths::ENV_FILE_NAME),
            );
        }
        search.push(cwd.join(paths::ENV_FILE_NAME));
        if let Some(parent) = cwd.parent() {
            search.push(parent.join(paths::ENV_FILE_NAME));
        }

        let mut unique = Vec::with_capacity(search.len());
        for path in search {
            if !unique.contains(&path) {
                unique.push(path);
            }
        }
        unique
    }

    /// Merge the given process variables with every existing file in `search`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if an existing dotenv file cannot be parsed
    pub fn load<I>(process: I, search: Vec<PathBuf>) -> AppResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut values: HashMap<String, String> = process
            .into_iter()
            .filter(|(key, _)| key.starts_with("PODIO_"))
            .collect();

        let mut loaded = Vec::new();
        for path in &search {
            if !path.is_file() {
                continue;
            }
            let entries = dotenvy::from_path_iter(path).map_err(|e| {
                AppError::config(format!("Failed to read {}: {e}", path.display()))
            })?;
            for entry in entries {
                let (key, value) = entry.map_err(|e| {
                    AppError::config(format!("Malformed entry in {}: {e}", path.display()))
                })?;
                values.entry(key).or_insert(value);
            }
            debug!("Loaded configuration file {}", path.display());
            loaded.push(path.clone());
        }

        Ok(Self {
            values,
            searched: search,
            loaded,
        })
    }

    /// Build sources from literal key/value pairs, without touching the filesystem
    #[must_use]
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let values = pairs
            .into_iter()
            .map(|(key, value)| (key.to_owned(), value.to_owned()))
            .collect();
        Self {
            values,
            searched: Vec::new(),
            loaded: Vec::new(),
        }
    }

    /// Value for `key`; a blank definition reads as unset
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Whether any source defined `key`, blank or not
    #[must_use]
    pub fn is_defined(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Owned value for `key`
    #[must_use]
    pub fn get_owned(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_owned)
    }

    /// Every file that was consulted, in lookup order
    #[must_use]
    pub fn searched_files(&self) -> &[PathBuf] {
        &self.searched
    }

    /// Files that existed and contributed values, in lookup order
    #[must_use]
    pub fn loaded_files(&self) -> &[PathBuf] {
        &self.loaded
    }
}

/// Parse an optional variable, reporting the variable name on failure
///
/// # Errors
///
/// Returns a validation error when the value is present but does not parse
pub fn parse_var<T>(sources: &EnvSources, key: &str) -> AppResult<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    sources
        .get(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| AppError::validation(format!("Invalid {key} value '{raw}': {e}")))
        })
        .transpose()
}

/// Parse a boolean flag the way dotenv files usually spell them
///
/// # Errors
///
/// Returns a validation error for anything other than true/false/1/0/yes/no/on/off
pub fn parse_flag(sources: &EnvSources, key: &str, default: bool) -> AppResult<bool> {
    let Some(raw) = sources.get(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(AppError::validation(format!(
            "Invalid {key} value '{raw}': expected true or false"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_search_order() {
        let search = EnvSources::search_paths(
            Some(Path::new("/home/u")),
            Path::new("/work/project"),
            None,
        );
        assert_eq!(
            search,
            vec![
                PathBuf::from("/home/u/.podio/.env"),
                PathBuf::from("/work/project/.env"),
                PathBuf::from("/work/.env"),
            ]
        );
    }

    #[test]
    fn test_explicit_file_comes_first() {
        let search = EnvSources::search_paths(
            None,
            Path::new("/work"),
            Some(PathBuf::from("/etc/podio.env")),
        );
        assert_eq!(search[0], PathBuf::from("/etc/podio.env"));
        assert_eq!(search.len(), 3);
    }

    #[test]
    fn test_flag_parsing() {
        let sources = EnvSources::from_pairs([("A", "YES"), ("B", "0"), ("C", "maybe")]);
        assert!(parse_flag(&sources, "A", false).unwrap());
        assert!(!parse_flag(&sources, "B", true).unwrap());
        assert!(parse_flag(&sources, "MISSING", true).unwrap());
        assert!(parse_flag(&sources, "C", true).is_err());
    }

    #[test]
    fn test_empty_values_are_unset() {
        let sources = EnvSources::from_pairs([("PODIO_ACCESS_TOKEN", "")]);
        assert!(sources.get("PODIO_ACCESS_TOKEN").is_none());
        assert!(sources.is_defined("PODIO_ACCESS_TOKEN"));
    }

    #[test]
    fn test_blank_process_variable_masks_files() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join(".env");
        fs::write(&file, "PODIO_ACCESS_TOKEN=from-file\n").unwrap();

        let process = vec![("PODIO_ACCESS_TOKEN".to_owned(), String::new())];
        let sources = EnvSources::load(process, vec![file]).unwrap();
        assert!(sources.get("PODIO_ACCESS_TOKEN").is_none());
    }
}
