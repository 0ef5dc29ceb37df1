// ABOUTME: Unified error type and error codes for the Podio command-line client
// ABOUTME: Maps every failure class onto a stable code and a process exit code
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling
//!
//! Every failure surfaced to the CLI layer is an [`AppError`]. The attached
//! [`ErrorCode`] decides the process exit code: authentication problems exit
//! with `2`, everything else with `1`.

use crate::constants::exit_codes;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::{fmt, io};
use thiserror::Error;

/// Standard error codes used throughout the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Authentication
    /// No authentication flow has all of its required fields
    #[serde(rename = "AUTH_CONFIG_ERROR")]
    AuthConfig,
    /// Token invalid or expired and it could not be refreshed
    #[serde(rename = "AUTHENTICATION_ERROR")]
    Authentication,

    // Transient remote failures
    /// Retries exhausted on 429/420 responses
    #[serde(rename = "RATE_LIMIT_EXCEEDED")]
    RateLimitExceeded,
    /// Retries exhausted on 5xx responses
    #[serde(rename = "SERVER_ERROR")]
    ServerError,
    /// Retries exhausted on connection-level failures
    #[serde(rename = "NETWORK_ERROR")]
    NetworkError,

    // Client-side problems
    /// Malformed configuration detected at startup
    #[serde(rename = "VALIDATION_ERROR")]
    Validation,
    /// Remote resource does not exist
    #[serde(rename = "NOT_FOUND")]
    NotFound,
    /// Remote resource exists but access is denied
    #[serde(rename = "PERMISSION_DENIED")]
    PermissionDenied,
    /// Remote API rejected the request as malformed
    #[serde(rename = "INVALID_REQUEST")]
    InvalidRequest,
    /// Any other non-retryable API error
    #[serde(rename = "API_ERROR")]
    ApiError,

    // Local failures
    /// Missing or unusable local configuration
    #[serde(rename = "CONFIG_ERROR")]
    Config,
    /// Reading or writing the credential file failed
    #[serde(rename = "STORAGE_ERROR")]
    Storage,
    /// JSON encoding or decoding failed
    #[serde(rename = "SERIALIZATION_ERROR")]
    Serialization,
    /// Unexpected internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    Internal,
}

impl ErrorCode {
    /// Process exit code reported for this error
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::AuthConfig | Self::Authentication => exit_codes::AUTH_ERROR,
            Self::RateLimitExceeded
            | Self::ServerError
            | Self::NetworkError
            | Self::Validation
            | Self::NotFound
            | Self::PermissionDenied
            | Self::InvalidRequest
            | Self::ApiError
            | Self::Config
            | Self::Storage
            | Self::Serialization
            | Self::Internal => exit_codes::GENERAL_ERROR,
        }
    }

    /// Short human-readable description of this error class
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::AuthConfig => "Authentication is not configured",
            Self::Authentication => "Authentication failed",
            Self::RateLimitExceeded => "Rate limit exceeded",
            Self::ServerError => "Podio server error",
            Self::NetworkError => "Network error",
            Self::Validation => "Invalid configuration",
            Self::NotFound => "Resource not found",
            Self::PermissionDenied => "Permission denied",
            Self::InvalidRequest => "Invalid request",
            Self::ApiError => "API error",
            Self::Config => "Configuration error",
            Self::Storage => "Credential storage error",
            Self::Serialization => "Serialization error",
            Self::Internal => "Internal error",
        }
    }

    /// Whether this code belongs to the authentication family
    #[must_use]
    pub const fn is_auth(self) -> bool {
        matches!(self, Self::AuthConfig | Self::Authentication)
    }
}

/// Unified error type for the client
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// HTTP status of the response that caused the error, if any
    pub status: Option<u16>,
    /// Number of attempts made before giving up, if the call was retried
    pub attempts: Option<u32>,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            attempts: None,
            source: None,
        }
    }

    /// Attach the HTTP status that produced this error
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Record how many attempts were made before giving up
    #[must_use]
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = Some(attempts);
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Process exit code for this error
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.code.exit_code()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)?;
        match self.attempts {
            Some(1) => write!(f, " (gave up after 1 attempt)")?,
            Some(attempts) => write!(f, " (gave up after {attempts} attempts)")?,
            None => {}
        }
        Ok(())
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Convenience functions for creating common errors
impl AppError {
    /// No authentication flow could be satisfied
    pub fn auth_config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthConfig, message)
    }

    /// Credentials were rejected and could not be refreshed
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Authentication, message)
    }

    /// Rate limiting persisted through every retry
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RateLimitExceeded, message)
    }

    /// Server kept failing through every retry
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServerError, message).with_status(status)
    }

    /// Connection-level failure
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkError, message)
    }

    /// Malformed configuration value
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, message)
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, resource)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Config, message)
    }

    /// Credential file could not be read or written
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Storage, message)
    }

    /// JSON could not be encoded or decoded
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Serialization, message)
    }

    /// Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    /// Map a non-retryable 4xx response onto the matching error code
    pub fn from_client_status(status: u16, message: impl Into<String>) -> Self {
        let code = match status {
            400 => ErrorCode::InvalidRequest,
            401 => ErrorCode::Authentication,
            403 => ErrorCode::PermissionDenied,
            404 => ErrorCode::NotFound,
            _ => ErrorCode::ApiError,
        };
        Self::new(code, message).with_status(status)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::internal(format!("{error:#}"))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization(error.to_string()).with_source(error)
    }
}

impl From<io::Error> for AppError {
    fn from(error: io::Error) -> Self {
        Self::storage(error.to_string()).with_source(error)
    }
}
