// ABOUTME: Core types and constants for the Podio command-line client
// ABOUTME: Foundation crate with error handling, exit codes, and environment constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Podio Core
//!
//! Foundation crate providing the error taxonomy and shared constants for the
//! Podio command-line client. It changes rarely, which keeps incremental builds
//! of the main crate fast.
//!
//! ## Modules
//!
//! - **errors**: `AppError`, `ErrorCode` and the exit-code mapping
//! - **constants**: environment variable names, defaults, endpoints

/// Unified error handling with stable error codes and exit codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;
