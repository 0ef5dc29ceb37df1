// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
// ABOUTME: Re-exports helper modules for the podio binary
// ABOUTME: Provides request body input and stdout/stderr output utilities

pub mod input;
pub mod output;
