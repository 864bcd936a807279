// ABOUTME: Domain service layer for business logic extracted from route handlers
// ABOUTME: Recipe querying and mutation, plus image attachment orchestration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Domain service layer
//!
//! Services take the caller's [`crate::auth::AuthResult`] explicitly and
//! never look identity up from ambient state.

/// Image validation, storage, and reference replacement
pub mod images;

/// Owner-scoped recipe listing, retrieval, and mutation
pub mod recipes;

pub use images::{ImageAttachmentService, ImageTarget, OwnedTarget};
pub use recipes::{RecipeQueryService, UpdateMode};
