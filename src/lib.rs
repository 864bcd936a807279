// ABOUTME: Main library entry point for the recipe API server
// ABOUTME: Owner-scoped recipes, tags, and ingredients with filtering and image uploads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Recipe API Server
//!
//! A REST API where each authenticated user manages their own recipes, tags
//! and ingredients.
//!
//! ## Features
//!
//! - **Owner scoping**: every query is restricted to the caller's entities
//! - **Filtering**: recipes by any of several tags and/or ingredients
//! - **Get-or-create**: tags and ingredients are unique per owner by name
//! - **Image uploads**: validated by content, stored behind an [`storage::ImageStore`]
//!
//! ## Architecture
//!
//! - **Routes**: thin axum handlers that authenticate and delegate
//! - **Services**: recipe queries and image attachment
//! - **Database**: SQLite repository through `sqlx`
//! - **Storage**: local filesystem or in-memory image blobs
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use recipe_api_server::config::environment::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Recipe API configured on port {}", config.http_port);
//!     Ok(())
//! }
//! ```

/// JWT issuing and validation
pub mod auth;

/// Environment-driven configuration
pub mod config;

/// Application constants
pub mod constants;

/// SQLite repository
pub mod database;

/// Versioned wire DTOs
pub mod dto;

/// Structured logging setup
pub mod logging;

/// Request authentication and CORS
pub mod middleware;

/// Shared resource container
pub mod resources;

/// HTTP route handlers
pub mod routes;

/// HTTP server bootstrap
pub mod server;

/// Recipe and image services
pub mod services;

/// Image blob storage
pub mod storage;

/// Error types shared across the workspace
pub use recipe_core::errors;
/// Domain models shared across the workspace
pub use recipe_core::models;
