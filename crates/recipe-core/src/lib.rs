// ABOUTME: Core types for the recipe API server
// ABOUTME: Foundation crate with error handling, domain models, and filter resolution
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Recipe Core
//!
//! Foundation crate providing shared types for the recipe API. It has no
//! knowledge of HTTP routing or storage engines, which keeps it cheap to
//! compile and easy to test.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **models**: Users, recipes, tags, ingredients and image references
//! - **filter**: Query-parameter parsing into a `RecipeFilter`

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Core data models (Recipe, Tag, Ingredient, User)
pub mod models;

/// Recipe list filter resolution
pub mod filter;
