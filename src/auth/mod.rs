// ABOUTME: Authentication for the Podio API: flow selection, sessions and token refresh
// ABOUTME: Also parses OAuth redirect URLs for the interactive login helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Authentication
//!
//! [`AuthFlow::resolve`] picks one of four grant flows from the configured
//! [`Credentials`](crate::config::Credentials). [`authenticate`] turns it into
//! a [`Session`], and [`TokenRefresher`] keeps that session valid when the API
//! rejects its access token.

/// OAuth redirect URL parsing
pub mod callback;
/// Grant flow selection
pub mod flow;
/// Token refresh
pub mod refresher;
/// Session state
pub mod session;

pub use callback::{parse_callback, CallbackParams};
pub use flow::{missing_by_flow, AuthFlow, ClientCredentials, FlowKind, RefreshGrant};
pub use refresher::TokenRefresher;
pub use session::{authenticate, establish, Session};
