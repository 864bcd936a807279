// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory resources, users with bearer tokens, and the assembled router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `recipe_api_server`

use anyhow::Result;
use axum::Router;
use recipe_api_server::{
    config::environment::{DatabaseUrl, ServerConfig},
    database::Database,
    models::User,
    resources::ServerResources,
    routes::build_router,
    storage::create_image_store,
};
use std::sync::{Arc, Once};
use tempfile::TempDir;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        // Another test binary harness may already have installed a subscriber
        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// Fresh in-memory database with the schema applied
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    Ok(Database::in_memory().await?)
}

/// Fresh WAL-mode database file under a temporary directory.
///
/// Unlike the in-memory database this pool holds several connections, so
/// concurrent callers really contend for the write lock. Keep the returned
/// directory alive for as long as the database is used.
pub async fn create_file_test_database() -> Result<(Database, TempDir)> {
    init_test_logging();
    let dir = tempfile::tempdir()?;
    let url = DatabaseUrl::SQLite {
        path: dir.path().join("recipes.db"),
    };
    Ok((Database::new(&url).await?, dir))
}

/// Resources over an in-memory database and image store
pub async fn create_test_resources() -> Result<Arc<ServerResources>> {
    create_test_resources_with_config(ServerConfig::for_testing()).await
}

/// Resources over an in-memory database with a custom configuration
pub async fn create_test_resources_with_config(
    config: ServerConfig,
) -> Result<Arc<ServerResources>> {
    let database = create_test_database().await?;
    let image_store = create_image_store(&config.images);
    Ok(Arc::new(ServerResources::new(
        Arc::new(config),
        database,
        image_store,
    )))
}

/// The complete application router over `resources`
pub fn create_test_router(resources: &Arc<ServerResources>) -> Router {
    build_router(resources.clone())
}

/// A persisted user together with a valid bearer token
pub struct TestUser {
    pub user: User,
    pub token: String,
}

/// Create a user and issue a token for them
pub async fn create_test_user_with_token(
    resources: &ServerResources,
    email: &str,
) -> Result<TestUser> {
    let user = User::new(email.to_owned(), Some("Test Cook".to_owned()));
    resources.database.users().create(&user).await?;
    let token = resources.auth_manager.generate_token(&user)?;
    Ok(TestUser { user, token })
}
