// ABOUTME: Retry and backoff configuration validated eagerly at startup
// ABOUTME: Owns the pure backoff formula so delays can be tested without sleeping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::environment::{parse_flag, parse_var, EnvSources};
use crate::constants::{defaults, env_vars};
use crate::errors::{AppError, AppResult};
use serde::Serialize;
use std::time::Duration;

/// Exponential backoff settings for API calls
///
/// Only constructible through [`RetryConfig::new`] or
/// [`RetryConfig::from_sources`], so every instance is valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RetryConfig {
    max_attempts: u32,
    base_delay: f64,
    max_delay: f64,
    exponential_base: f64,
    jitter: bool,
    retry_on_rate_limit: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::RETRY_MAX_ATTEMPTS,
            base_delay: defaults::RETRY_BASE_DELAY_SECS,
            max_delay: defaults::RETRY_MAX_DELAY_SECS,
            exponential_base: defaults::RETRY_EXPONENTIAL_BASE,
            jitter: defaults::RETRY_JITTER,
            retry_on_rate_limit: defaults::RETRY_ON_RATE_LIMIT,
        }
    }
}

impl RetryConfig {
    /// Validate and build a retry configuration. Delays are in seconds.
    ///
    /// # Errors
    ///
    /// Returns a validation error when `max_attempts` is negative, a delay is
    /// not a positive finite number, `max_delay < base_delay`, or
    /// `exponential_base <= 1`
    pub fn new(
        max_attempts: i64,
        base_delay: f64,
        max_delay: f64,
        exponential_base: f64,
        jitter: bool,
        retry_on_rate_limit: bool,
    ) -> AppResult<Self> {
        let max_attempts = u32::try_from(max_attempts).map_err(|_| {
            AppError::validation(format!(
                "max_attempts must be between 0 and {}, got {max_attempts}",
                u32::MAX
            ))
        })?;
        if !base_delay.is_finite() || base_delay <= 0.0 {
            return Err(AppError::validation(format!(
                "base_delay must be a positive number of seconds, got {base_delay}"
            )));
        }
        if !max_delay.is_finite() || max_delay < base_delay {
            return Err(AppError::validation(format!(
                "max_delay ({max_delay}) must be finite and at least base_delay ({base_delay})"
            )));
        }
        if !exponential_base.is_finite() || exponential_base <= 1.0 {
            return Err(AppError::validation(format!(
                "exponential_base must be greater than 1, got {exponential_base}"
            )));
        }

        Ok(Self {
            max_attempts,
            base_delay,
            max_delay,
            exponential_base,
            jitter,
            retry_on_rate_limit,
        })
    }

    /// Load from `PODIO_RETRY_*` variables, falling back to defaults
    ///
    /// # Errors
    ///
    /// Returns a validation error for unparsable or out-of-range values
    pub fn from_sources(sources: &EnvSources) -> AppResult<Self> {
        Self::new(
            parse_var(sources, env_vars::RETRY_MAX_ATTEMPTS)?
                .unwrap_or_else(|| i64::from(defaults::RETRY_MAX_ATTEMPTS)),
            parse_var(sources, env_vars::RETRY_BASE_DELAY)?
                .unwrap_or(defaults::RETRY_BASE_DELAY_SECS),
            parse_var(sources, env_vars::RETRY_MAX_DELAY)?
                .unwrap_or(defaults::RETRY_MAX_DELAY_SECS),
            parse_var(sources, env_vars::RETRY_EXPONENTIAL_BASE)?
                .unwrap_or(defaults::RETRY_EXPONENTIAL_BASE),
            parse_flag(sources, env_vars::RETRY_JITTER, defaults::RETRY_JITTER)?,
            parse_flag(
                sources,
                env_vars::RETRY_ON_RATE_LIMIT,
                defaults::RETRY_ON_RATE_LIMIT,
            )?,
        )
    }

    /// Configured attempt budget; `0` disables retries
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Attempts actually made for a call that keeps failing transiently
    #[must_use]
    pub const fn total_attempts(&self) -> u32 {
        if self.max_attempts == 0 {
            1
        } else {
            self.max_attempts
        }
    }

    /// Initial backoff delay in seconds
    #[must_use]
    pub const fn base_delay(&self) -> f64 {
        self.base_delay
    }

    /// Backoff cap in seconds
    #[must_use]
    pub const fn max_delay(&self) -> f64 {
        self.max_delay
    }

    /// Backoff growth factor
    #[must_use]
    pub const fn exponential_base(&self) -> f64 {
        self.exponential_base
    }

    /// Whether delays are randomized
    #[must_use]
    pub const fn jitter(&self) -> bool {
        self.jitter
    }

    /// Whether rate-limited calls are retried
    #[must_use]
    pub const fn retry_on_rate_limit(&self) -> bool {
        self.retry_on_rate_limit
    }

    /// Un-jittered delay after the `attempt`-th failure (0-based):
    /// `min(max_delay, base_delay * exponential_base^attempt)`, saturating at
    /// `Duration::MAX`
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let grown = self.base_delay * self.exponential_base.powf(f64::from(attempt));
        // powf overflows to infinity for large attempts; min() folds that back
        Duration::try_from_secs_f64(grown.min(self.max_delay)).unwrap_or(Duration::MAX)
    }
}
