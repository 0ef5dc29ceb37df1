// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Environment variable names, defaults, endpoints and exit codes for the Podio client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped by domain rather than kept in a single flat list.

/// Process exit codes shared by every command
pub mod exit_codes {
    /// Command completed successfully
    pub const SUCCESS: u8 = 0;
    /// Any non-authentication failure
    pub const GENERAL_ERROR: u8 = 1;
    /// Missing, invalid or expired credentials
    pub const AUTH_ERROR: u8 = 2;
    /// Interrupted by the user (SIGINT)
    pub const INTERRUPTED: u8 = 130;
}

/// Environment variable names
pub mod env_vars {
    /// OAuth access token (client-side flow)
    pub const ACCESS_TOKEN: &str = "PODIO_ACCESS_TOKEN";
    /// OAuth refresh token
    pub const REFRESH_TOKEN: &str = "PODIO_REFRESH_TOKEN";
    /// API client id
    pub const CLIENT_ID: &str = "PODIO_CLIENT_ID";
    /// API client secret
    pub const CLIENT_SECRET: &str = "PODIO_CLIENT_SECRET";
    /// Authorization code (server-side flow)
    pub const AUTHORIZATION_CODE: &str = "PODIO_AUTHORIZATION_CODE";
    /// Redirect URI registered for the API key
    pub const REDIRECT_URI: &str = "PODIO_REDIRECT_URI";
    /// Username (password flow)
    pub const USERNAME: &str = "PODIO_USERNAME";
    /// Password (password flow)
    pub const PASSWORD: &str = "PODIO_PASSWORD";
    /// App id (app flow)
    pub const APP_ID: &str = "PODIO_APP_ID";
    /// App token (app flow)
    pub const APP_TOKEN: &str = "PODIO_APP_TOKEN";
    /// Default organization for org-scoped commands
    pub const ORGANIZATION_ID: &str = "PODIO_ORGANIZATION_ID";
    /// Default workspace (space) for space-scoped commands
    pub const WORKSPACE_ID: &str = "PODIO_WORKSPACE_ID";

    /// Maximum number of attempts per API call
    pub const RETRY_MAX_ATTEMPTS: &str = "PODIO_RETRY_MAX_ATTEMPTS";
    /// Initial backoff delay in seconds
    pub const RETRY_BASE_DELAY: &str = "PODIO_RETRY_BASE_DELAY";
    /// Backoff delay cap in seconds
    pub const RETRY_MAX_DELAY: &str = "PODIO_RETRY_MAX_DELAY";
    /// Backoff growth factor
    pub const RETRY_EXPONENTIAL_BASE: &str = "PODIO_RETRY_EXPONENTIAL_BASE";
    /// Randomize backoff delays
    pub const RETRY_JITTER: &str = "PODIO_RETRY_JITTER";
    /// Retry rate-limited responses
    pub const RETRY_ON_RATE_LIMIT: &str = "PODIO_RETRY_ON_RATE_LIMIT";

    /// API base URL override
    pub const API_URL: &str = "PODIO_API_URL";
    /// OAuth authorize page override
    pub const AUTH_URL: &str = "PODIO_AUTH_URL";
    /// HTTP request timeout in seconds
    pub const HTTP_TIMEOUT_SECS: &str = "PODIO_HTTP_TIMEOUT_SECS";
    /// Explicit credential file location
    pub const ENV_FILE: &str = "PODIO_ENV_FILE";

    /// Every variable the credential store resolves through the layered sources
    pub const ALL: &[&str] = &[
        ACCESS_TOKEN,
        REFRESH_TOKEN,
        CLIENT_ID,
        CLIENT_SECRET,
        AUTHORIZATION_CODE,
        REDIRECT_URI,
        USERNAME,
        PASSWORD,
        APP_ID,
        APP_TOKEN,
        ORGANIZATION_ID,
        WORKSPACE_ID,
        RETRY_MAX_ATTEMPTS,
        RETRY_BASE_DELAY,
        RETRY_MAX_DELAY,
        RETRY_EXPONENTIAL_BASE,
        RETRY_JITTER,
        RETRY_ON_RATE_LIMIT,
        API_URL,
        AUTH_URL,
        HTTP_TIMEOUT_SECS,
    ];
}

/// Default values for optional settings
pub mod defaults {
    /// Attempts per API call
    pub const RETRY_MAX_ATTEMPTS: u32 = 5;
    /// Initial backoff delay in seconds
    pub const RETRY_BASE_DELAY_SECS: f64 = 2.0;
    /// Backoff delay cap in seconds
    pub const RETRY_MAX_DELAY_SECS: f64 = 60.0;
    /// Backoff growth factor
    pub const RETRY_EXPONENTIAL_BASE: f64 = 2.0;
    /// Jitter enabled by default
    pub const RETRY_JITTER: bool = true;
    /// Rate-limited calls are retried by default
    pub const RETRY_ON_RATE_LIMIT: bool = true;

    /// Public API base URL
    pub const API_URL: &str = "https://api.podio.com";
    /// OAuth authorize page
    pub const AUTH_URL: &str = "https://podio.com/oauth/authorize";
    /// Redirect used when none is configured
    pub const REDIRECT_URI: &str = "https://podio.com/oauth/callback";
    /// API request timeout in seconds
    pub const HTTP_TIMEOUT_SECS: u64 = 60;
    /// Token endpoint request timeout in seconds
    pub const OAUTH_TIMEOUT_SECS: u64 = 15;
    /// Connect timeout in seconds
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;
}

/// Configuration file locations
pub mod paths {
    /// Directory under the user's home holding the global config
    pub const GLOBAL_CONFIG_DIR: &str = ".podio";
    /// Dotenv file name used at every level
    pub const ENV_FILE_NAME: &str = ".env";
}

/// API endpoint paths
pub mod endpoints {
    /// OAuth token endpoint (JSON body)
    pub const OAUTH_TOKEN: &str = "/oauth/token/v2";
    /// Current user status, used to verify credentials
    pub const USER_STATUS: &str = "/user/status";
}

/// Wire-level constants
pub mod http {
    /// Authorization scheme used by the Podio API
    pub const AUTH_SCHEME: &str = "OAuth2";
    /// Non-standard rate-limit status used by Podio
    pub const ENHANCE_YOUR_CALM: u16 = 420;
    /// Standard rate-limit status
    pub const TOO_MANY_REQUESTS: u16 = 429;
}
