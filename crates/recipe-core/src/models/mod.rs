// ABOUTME: Domain models for users, recipes, tags, and ingredients
// ABOUTME: Storage-facing entities shared by the repository and service layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Core data models.
//!
//! These are the repository's view of the world. HTTP responses are built from
//! them through the versioned DTOs in the server crate, never serialized as-is.

mod recipe;

pub use recipe::{validate_price, Recipe, MAX_PRICE};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reference to a blob held by the image store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Store-assigned stable identifier
    pub key: String,
    /// Location the image can be retrieved from
    pub url: String,
}

impl ImageRef {
    /// Build a reference from optional key/url columns; both must be present
    #[must_use]
    pub fn from_columns(key: Option<String>, url: Option<String>) -> Option<Self> {
        match (key, url) {
            (Some(key), Some(url)) => Some(Self { key, url }),
            _ => None,
        }
    }
}

/// Account identity that owns recipes, tags and ingredients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: Uuid,
    /// Email address, unique case-insensitively
    pub email: String,
    /// Optional display name
    pub display_name: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a fresh identifier
    #[must_use]
    pub fn new(email: String, display_name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.trim().to_lowercase(),
            display_name,
            created_at: Utc::now(),
        }
    }
}

/// A label attached to recipes, unique per owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Unique identifier
    pub id: i64,
    /// Owning user
    pub user_id: Uuid,
    /// Display name as first written
    pub name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// An ingredient, unique per owner, optionally carrying an image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Unique identifier
    pub id: i64,
    /// Owning user
    pub user_id: Uuid,
    /// Display name as first written
    pub name: String,
    /// Current image, if one was uploaded
    pub image: Option<ImageRef>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Normalize a tag or ingredient name for uniqueness comparison.
///
/// Names compare equal when they match after trimming surrounding whitespace,
/// collapsing inner whitespace runs and Unicode lowercasing.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Clean a display name: trimmed with inner whitespace collapsed, casing kept.
#[must_use]
pub fn clean_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}
