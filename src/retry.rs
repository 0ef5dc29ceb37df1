// ABOUTME: Bounded exponential-backoff retry loop for Podio API calls
// ABOUTME: Classifies attempt outcomes and sleeps through an injectable Sleeper
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Retry Policy
//!
//! A call is modelled as a [`RetryableCall`] that reports an
//! [`AttemptOutcome`] per attempt. [`RetryPolicy::execute`] retries
//! rate-limited, server and network outcomes with capped exponential backoff
//! and returns client and auth failures immediately. Sleeping goes through a
//! [`Sleeper`] so tests can record delays instead of waiting for them.

use crate::config::RetryConfig;
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tokio::time;
use tracing::{debug, warn};

/// Classified result of a single attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome<T> {
    /// The call produced its payload
    Success(T),
    /// HTTP 429 or 420, with the server's `Retry-After` when present
    RateLimited {
        /// Minimum wait requested by the server
        retry_after: Option<Duration>,
    },
    /// HTTP 5xx
    ServerError {
        /// Response status
        status: u16,
        /// Message from the error body
        message: String,
    },
    /// HTTP 401: the access token is no longer accepted
    AuthExpired,
    /// Any other 4xx; never retried
    ClientError {
        /// Response status
        status: u16,
        /// Message from the error body
        message: String,
    },
    /// The request never produced a response
    NetworkError(String),
}

/// One logical API call that may be attempted several times
#[async_trait]
pub trait RetryableCall<T: Send>: Send {
    /// Run one attempt
    ///
    /// # Errors
    ///
    /// An `Err` is fatal and aborts the retry loop immediately
    async fn attempt(&mut self) -> AppResult<AttemptOutcome<T>>;
}

/// Waits between attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        time::sleep(duration).await;
    }
}

/// Scale `delay` by `fraction`, clamped to `[0, 1]`
#[must_use]
pub fn jittered(delay: Duration, fraction: f64) -> Duration {
    if fraction.is_nan() {
        return delay;
    }
    // as_secs_f64 rounds Duration::MAX up, so the product can exceed it
    Duration::try_from_secs_f64(delay.as_secs_f64() * fraction.clamp(0.0, 1.0))
        .map_or(delay, |scaled| scaled.min(delay))
}

/// Retry loop parameterised by configuration and sleeper
#[derive(Debug, Clone)]
pub struct RetryPolicy<S = TokioSleeper> {
    config: RetryConfig,
    sleeper: S,
}

impl RetryPolicy<TokioSleeper> {
    #[must_use]
    pub const fn new(config: RetryConfig) -> Self {
        Self {
            config,
            sleeper: TokioSleeper,
        }
    }
}

impl<S: Sleeper> RetryPolicy<S> {
    #[must_use]
    pub const fn with_sleeper(config: RetryConfig, sleeper: S) -> Self {
        Self { config, sleeper }
    }

    #[must_use]
    pub const fn config(&self) -> &RetryConfig {
        &self.config
    }

    #[must_use]
    pub const fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Delay before the next attempt after the `failed`-th failure (0-based).
    /// `retry_after` is a floor and is never jittered away.
    #[must_use]
    pub fn delay_for(&self, failed: u32, retry_after: Option<Duration>) -> Duration {
        let backoff = self.config.backoff_delay(failed);
        let delay = if self.config.jitter() {
            jittered(backoff, rand::thread_rng().gen_range(0.0..=1.0))
        } else {
            backoff
        };
        retry_after.map_or(delay, |floor| delay.max(floor))
    }

    /// Drive `call` until it succeeds, fails permanently, or runs out of attempts
    ///
    /// # Errors
    ///
    /// - `RateLimitExceeded`, `ServerError` or `NetworkError` once every attempt
    ///   failed transiently, with the attempt count recorded
    /// - `RateLimitExceeded` immediately when rate-limit retries are disabled
    /// - `AuthenticationError` on `AuthExpired`
    /// - the mapped client error on any other 4xx
    /// - whatever fatal error the call itself returns
    pub async fn execute<T, C>(&self, call: &mut C) -> AppResult<T>
    where
        T: Send,
        C: RetryableCall<T> + ?Sized,
    {
        let total = self.config.total_attempts();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let outcome = call.attempt().await?;

            let (error, retry_after) = match outcome {
                AttemptOutcome::Success(value) => {
                    if attempt > 1 {
                        debug!("Call succeeded on attempt {attempt}/{total}");
                    }
                    return Ok(value);
                }
                AttemptOutcome::AuthExpired => {
                    return Err(AppError::authentication(
                        "Access token was rejected by the API",
                    )
                    .with_status(401));
                }
                AttemptOutcome::ClientError { status, message } => {
                    return Err(AppError::from_client_status(status, message));
                }
                AttemptOutcome::RateLimited { retry_after } => {
                    let error = AppError::rate_limited(rate_limit_message(retry_after));
                    if !self.config.retry_on_rate_limit() {
                        return Err(error);
                    }
                    (error, retry_after)
                }
                AttemptOutcome::ServerError { status, message } => {
                    (AppError::server(status, message), None)
                }
                AttemptOutcome::NetworkError(message) => (AppError::network(message), None),
            };

            if attempt >= total {
                return Err(error.with_attempts(attempt));
            }

            let delay = self.delay_for(attempt - 1, retry_after);
            warn!(
                "Attempt {attempt}/{total} failed ({}); retrying in {:.2}s",
                error.message,
                delay.as_secs_f64()
            );
            self.sleeper.sleep(delay).await;
        }
    }
}

fn rate_limit_message(retry_after: Option<Duration>) -> String {
    retry_after.map_or_else(
        || "Podio API rate limit hit".to_owned(),
        |wait| {
            format!(
                "Podio API rate limit hit, server asked to wait {}s",
                wait.as_secs()
            )
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingSleeper {
        slept: Arc<Mutex<Vec<Duration>>>,
    }

    impl RecordingSleeper {
        fn recorded(&self) -> Vec<f64> {
            self.slept
                .lock()
                .unwrap()
                .iter()
                .map(Duration::as_secs_f64)
                .collect()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.slept.lock().unwrap().push(duration);
        }
    }

    struct Scripted {
        outcomes: VecDeque<AttemptOutcome<&'static str>>,
        attempts: u32,
    }

    impl Scripted {
        fn new(outcomes: Vec<AttemptOutcome<&'static str>>) -> Self {
            Self {
                outcomes: outcomes.into(),
                attempts: 0,
            }
        }
    }

    #[async_trait]
    impl RetryableCall<&'static str> for Scripted {
        async fn attempt(&mut self) -> AppResult<AttemptOutcome<&'static str>> {
            self.attempts += 1;
            Ok(self
                .outcomes
                .pop_front()
                .unwrap_or_else(|| AttemptOutcome::ServerError {
                    status: 503,
                    message: "unavailable".into(),
                }))
        }
    }

    fn policy(config: RetryConfig) -> RetryPolicy<RecordingSleeper> {
        RetryPolicy::with_sleeper(config, RecordingSleeper::default())
    }

    fn rate_limited() -> AttemptOutcome<&'static str> {
        AttemptOutcome::RateLimited { retry_after: None }
    }

    #[tokio::test]
    async fn test_rate_limited_twice_then_success() {
        let policy = policy(RetryConfig::new(3, 1.0, 10.0, 2.0, false, true).unwrap());
        let mut call = Scripted::new(vec![
            rate_limited(),
            rate_limited(),
            AttemptOutcome::Success("payload"),
        ]);

        let result = policy.execute(&mut call).await.unwrap();

        assert_eq!(result, "payload");
        assert_eq!(call.attempts, 3);
        assert_eq!(policy.sleeper().recorded(), vec![1.0, 2.0]);
    }

    #[tokio::test]
    async fn test_server_errors_exhaust_attempts() {
        let policy = policy(RetryConfig::new(4, 1.0, 3.0, 2.0, false, true).unwrap());
        let mut call = Scripted::new(vec![]);

        let err = policy.execute(&mut call).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ServerError);
        assert_eq!(err.attempts, Some(4));
        assert_eq!(call.attempts, 4);
        assert_eq!(policy.sleeper().recorded(), vec![1.0, 2.0, 3.0]);
        assert!(err.to_string().contains("gave up after 4 attempts"));
    }

    #[tokio::test]
    async fn test_zero_max_attempts_tries_once() {
        let policy = policy(RetryConfig::new(0, 1.0, 3.0, 2.0, false, true).unwrap());
        let mut call = Scripted::new(vec![]);

        let err = policy.execute(&mut call).await.unwrap_err();

        assert_eq!(call.attempts, 1);
        assert_eq!(err.attempts, Some(1));
        assert!(policy.sleeper().recorded().is_empty());
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let policy = policy(RetryConfig::default());
        let mut call = Scripted::new(vec![AttemptOutcome::ClientError {
            status: 404,
            message: "No item with id 9".into(),
        }]);

        let err = policy.execute(&mut call).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.attempts, None);
        assert_eq!(call.attempts, 1);
    }

    #[tokio::test]
    async fn test_auth_expired_is_not_retried() {
        let policy = policy(RetryConfig::default());
        let mut call = Scripted::new(vec![AttemptOutcome::AuthExpired]);

        let err = policy.execute(&mut call).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::Authentication);
        assert_eq!(call.attempts, 1);
    }

    #[tokio::test]
    async fn test_rate_limit_without_retry_fails_fast() {
        let policy = policy(RetryConfig::new(5, 1.0, 10.0, 2.0, false, false).unwrap());
        let mut call = Scripted::new(vec![rate_limited(), AttemptOutcome::Success("late")]);

        let err = policy.execute(&mut call).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::RateLimitExceeded);
        assert_eq!(call.attempts, 1);
        assert!(policy.sleeper().recorded().is_empty());
    }

    #[tokio::test]
    async fn test_retry_after_is_a_floor() {
        let policy = policy(RetryConfig::new(3, 1.0, 10.0, 2.0, false, true).unwrap());
        let mut call = Scripted::new(vec![
            AttemptOutcome::RateLimited {
                retry_after: Some(Duration::from_secs(7)),
            },
            AttemptOutcome::NetworkError("connection reset".into()),
            AttemptOutcome::Success("ok"),
        ]);

        policy.execute(&mut call).await.unwrap();

        assert_eq!(policy.sleeper().recorded(), vec![7.0, 2.0]);
    }

    #[tokio::test]
    async fn test_fatal_attempt_error_propagates() {
        struct Fatal;

        #[async_trait]
        impl RetryableCall<()> for Fatal {
            async fn attempt(&mut self) -> AppResult<AttemptOutcome<()>> {
                Err(AppError::authentication("refresh rejected"))
            }
        }

        let policy = policy(RetryConfig::default());
        let err = policy.execute(&mut Fatal).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Authentication);
        assert!(policy.sleeper().recorded().is_empty());
    }

    #[test]
    fn test_jitter_stays_within_backoff() {
        let delay = Duration::from_secs(4);
        assert_eq!(jittered(delay, 0.0), Duration::ZERO);
        assert_eq!(jittered(delay, 0.5), Duration::from_secs(2));
        assert_eq!(jittered(delay, 1.0), delay);
        assert_eq!(jittered(delay, 3.0), delay);
        assert_eq!(jittered(Duration::MAX, 1.0), Duration::MAX);

        let huge = RetryPolicy::new(RetryConfig::new(5, 1e20, 1e20, 2.0, true, true).unwrap());
        assert!(huge.delay_for(0, Some(Duration::from_secs(4))) >= Duration::from_secs(4));

        let policy = RetryPolicy::new(RetryConfig::new(5, 1.0, 8.0, 2.0, true, true).unwrap());
        for failed in 0..6 {
            let cap = policy.config().backoff_delay(failed);
            assert!(policy.delay_for(failed, None) <= cap);
        }
    }
}
