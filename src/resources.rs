// ABOUTME: Centralized resource container shared by every HTTP handler
// ABOUTME: Builds the auth manager, authenticator, and services once per process
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Server Resources
//!
//! Handlers receive `Arc<ServerResources>` as axum state. Everything inside
//! is either immutable or internally synchronized.

use crate::auth::AuthManager;
use crate::config::environment::ServerConfig;
use crate::database::Database;
use crate::middleware::RequestAuthenticator;
use crate::services::{ImageAttachmentService, RecipeQueryService};
use crate::storage::ImageStore;
use std::fmt;
use std::sync::Arc;

/// Shared server resources
#[derive(Clone)]
pub struct ServerResources {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// Repository
    pub database: Arc<Database>,
    /// Token issuing and validation
    pub auth_manager: Arc<AuthManager>,
    /// Bearer token authenticator
    pub authenticator: RequestAuthenticator,
    /// Image blob store
    pub image_store: Arc<dyn ImageStore>,
    /// Recipe operations
    pub recipes: RecipeQueryService,
    /// Image upload operations
    pub images: ImageAttachmentService,
}

impl ServerResources {
    /// Wire resources together from a loaded configuration
    #[must_use]
    pub fn new(
        config: Arc<ServerConfig>,
        database: Database,
        image_store: Arc<dyn ImageStore>,
    ) -> Self {
        let database = Arc::new(database);
        let auth_manager = Arc::new(AuthManager::new(
            config.auth.jwt_secret.as_bytes(),
            config.auth.jwt_expiry_hours,
        ));
        let authenticator = RequestAuthenticator::new(auth_manager.clone(), database.clone());
        let recipes = RecipeQueryService::new(database.clone());
        let images = ImageAttachmentService::new(
            database.clone(),
            image_store.clone(),
            config.images.max_upload_bytes,
        );

        Self {
            config,
            database,
            auth_manager,
            authenticator,
            image_store,
            recipes,
            images,
        }
    }
}

impl fmt::Debug for ServerResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerResources")
            .field("environment", &self.config.environment)
            .field("image_store", &self.image_store.backend())
            .finish_non_exhaustive()
    }
}
