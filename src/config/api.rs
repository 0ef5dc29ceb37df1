// ABOUTME: API endpoint and HTTP timeout configuration
// ABOUTME: Lets tests and staging setups point the client at another Podio host
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::environment::{parse_var, EnvSources};
use crate::constants::{defaults, env_vars};
use crate::errors::{AppError, AppResult};
use serde::Serialize;
use url::Url;

/// Where and how the client talks to Podio
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiConfig {
    /// REST API base URL
    pub api_url: Url,
    /// OAuth authorize page
    pub auth_url: Url,
    /// API request timeout in seconds
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Load from `PODIO_API_URL`, `PODIO_AUTH_URL` and `PODIO_HTTP_TIMEOUT_SECS`
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed URLs or timeouts
    pub fn from_sources(sources: &EnvSources) -> AppResult<Self> {
        let api_url = parse_url(
            env_vars::API_URL,
            sources.get(env_vars::API_URL).unwrap_or(defaults::API_URL),
        )?;
        let auth_url = parse_url(
            env_vars::AUTH_URL,
            sources.get(env_vars::AUTH_URL).unwrap_or(defaults::AUTH_URL),
        )?;
        let timeout_secs = parse_var(sources, env_vars::HTTP_TIMEOUT_SECS)?
            .unwrap_or(defaults::HTTP_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(AppError::validation(format!(
                "{} must be greater than 0",
                env_vars::HTTP_TIMEOUT_SECS
            )));
        }

        Ok(Self {
            api_url,
            auth_url,
            timeout_secs,
        })
    }

    /// Absolute URL for an API path such as `/item/42`
    ///
    /// # Errors
    ///
    /// Returns a validation error if the joined URL is malformed
    pub fn endpoint(&self, path: &str) -> AppResult<Url> {
        let base = self.api_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{base}/{path}"))
            .map_err(|e| AppError::validation(format!("Invalid API path '{path}': {e}")))
    }
}

fn parse_url(key: &str, raw: &str) -> AppResult<Url> {
    Url::parse(raw).map_err(|e| AppError::validation(format!("Invalid {key} value '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_podio() {
        let config = ApiConfig::from_sources(&EnvSources::default()).unwrap();
        assert_eq!(config.api_url.as_str(), "https://api.podio.com/");
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let sources = EnvSources::from_pairs([(env_vars::API_URL, "http://127.0.0.1:8080/")]);
        let config = ApiConfig::from_sources(&sources).unwrap();
        assert_eq!(
            config.endpoint("/item/42").unwrap().as_str(),
            "http://127.0.0.1:8080/item/42"
        );
        assert_eq!(
            config.endpoint("org/").unwrap().as_str(),
            "http://127.0.0.1:8080/org/"
        );
    }

    #[test]
    fn test_rejects_malformed_url() {
        let sources = EnvSources::from_pairs([(env_vars::API_URL, "not a url")]);
        assert!(ApiConfig::from_sources(&sources).is_err());
    }
}
