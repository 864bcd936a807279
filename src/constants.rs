// ABOUTME: System-wide constants and configuration defaults for the recipe API
// ABOUTME: Ports, limits, token settings, and entity labels used across modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Constants Module
//!
//! Hardcoded defaults. Anything an operator may want to change is read
//! through [`crate::config::environment::ServerConfig`] instead.

/// Service identity used in logs and health responses
pub mod service_names {
    /// Server service name
    pub const RECIPE_API_SERVER: &str = "recipe-api-server";
    /// Admin CLI name
    pub const RECIPE_ADMIN: &str = "recipe-admin";
}

/// Network defaults
pub mod ports {
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 8081;
}

/// Storage defaults
pub mod storage {
    /// Default `SQLite` database location
    pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/recipes.db";
    /// Default directory for locally stored images
    pub const DEFAULT_MEDIA_ROOT: &str = "./data/media";
    /// Default URL prefix under which stored images are served
    pub const DEFAULT_MEDIA_URL_PREFIX: &str = "/media";
    /// Default upper bound on an uploaded image in bytes (5 MiB)
    pub const DEFAULT_MAX_IMAGE_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
    /// Multipart field name carrying the image payload
    pub const IMAGE_FIELD_NAME: &str = "image";
}

/// Token settings
pub mod auth {
    /// Default token lifetime in hours
    pub const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24;
    /// Issuer embedded in and required of every token
    pub const JWT_ISSUER: &str = "recipe-api-server";
    /// Minimum accepted secret length in bytes
    pub const MIN_JWT_SECRET_LEN: usize = 32;
    /// Scheme prefix of the Authorization header
    pub const BEARER_PREFIX: &str = "Bearer ";
}

/// Entity labels used in error messages and log fields
pub mod entities {
    /// Recipe
    pub const RECIPE: &str = "Recipe";
    /// Tag
    pub const TAG: &str = "Tag";
    /// Ingredient
    pub const INGREDIENT: &str = "Ingredient";
    /// User
    pub const USER: &str = "User";
}

/// Field limits
pub mod limits {
    /// Longest accepted recipe title
    pub const MAX_TITLE_LEN: usize = 255;
    /// Longest accepted tag or ingredient name
    pub const MAX_NAME_LEN: usize = 255;
    /// Longest accepted recipe link
    pub const MAX_LINK_LEN: usize = 255;
    /// Largest accepted preparation time in minutes (one week)
    pub const MAX_TIME_MINUTES: i64 = 7 * 24 * 60;
}
