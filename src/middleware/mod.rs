// ABOUTME: HTTP middleware for the recipe API
// ABOUTME: Request authentication and CORS layer construction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Bearer-token request authentication
pub mod auth;

/// CORS layer configured from `CORS_ORIGINS`
pub mod cors;

pub use auth::RequestAuthenticator;
pub use cors::setup_cors;
