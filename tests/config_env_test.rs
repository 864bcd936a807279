// ABOUTME: Tests for environment-driven server configuration
// ABOUTME: Serialized because they mutate process environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use recipe_api_server::config::environment::{
    DatabaseUrl, Environment, ImageStoreKind, ServerConfig,
};
use serial_test::serial;
use std::env;

const VARS: &[&str] = &[
    "ENVIRONMENT",
    "HTTP_PORT",
    "DATABASE_URL",
    "JWT_SECRET",
    "JWT_EXPIRY_HOURS",
    "IMAGE_STORE",
    "MEDIA_ROOT",
    "MEDIA_URL_PREFIX",
    "MAX_IMAGE_UPLOAD_BYTES",
    "CORS_ORIGINS",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_without_environment() {
    clear_env();

    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config.http_port, 8081);
    assert_eq!(config.environment, Environment::Development);
    assert_eq!(
        config.database.url,
        DatabaseUrl::parse_url("sqlite:./data/recipes.db").unwrap()
    );
    assert!(config.auth.ephemeral_secret);
    assert_eq!(config.auth.jwt_expiry_hours, 24);
    assert_eq!(config.images.store, ImageStoreKind::Local);
    assert_eq!(config.images.url_prefix, "/media");
    assert_eq!(config.images.max_upload_bytes, 5 * 1024 * 1024);
    assert!(config.security.cors_origins.is_empty());
}

#[test]
#[serial]
fn test_values_from_environment() {
    clear_env();
    env::set_var("HTTP_PORT", "9000");
    env::set_var("DATABASE_URL", "sqlite::memory:");
    env::set_var("JWT_SECRET", "an-operator-provided-secret-of-sufficient-length");
    env::set_var("JWT_EXPIRY_HOURS", "2");
    env::set_var("IMAGE_STORE", "memory");
    env::set_var("MEDIA_URL_PREFIX", "static/images/");
    env::set_var("MAX_IMAGE_UPLOAD_BYTES", "1024");
    env::set_var("CORS_ORIGINS", "https://a.example, https://b.example");

    let config = ServerConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.http_port, 9000);
    assert!(config.database.url.is_memory());
    assert!(!config.auth.ephemeral_secret);
    assert_eq!(config.auth.jwt_expiry_hours, 2);
    assert_eq!(config.images.store, ImageStoreKind::Memory);
    assert_eq!(config.images.url_prefix, "/static/images");
    assert_eq!(config.images.max_upload_bytes, 1024);
    assert_eq!(
        config.security.cors_origins,
        ["https://a.example", "https://b.example"]
    );
    assert!(!config.summary().contains("operator-provided"));
}

#[test]
#[serial]
fn test_production_requires_secret() {
    clear_env();
    env::set_var("ENVIRONMENT", "production");

    let result = ServerConfig::from_env();
    clear_env();

    assert!(result.is_err());
}

#[test]
#[serial]
fn test_malformed_values_are_errors() {
    clear_env();
    env::set_var("HTTP_PORT", "eighty");
    assert!(ServerConfig::from_env().is_err());

    clear_env();
    env::set_var("DATABASE_URL", "postgres://localhost/recipes");
    assert!(ServerConfig::from_env().is_err());

    clear_env();
    env::set_var("MAX_IMAGE_UPLOAD_BYTES", "0");
    assert!(ServerConfig::from_env().is_err());

    clear_env();
    env::set_var("IMAGE_STORE", "s3");
    assert!(ServerConfig::from_env().is_err());

    clear_env();
}
