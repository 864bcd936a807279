// ABOUTME: Request authentication for the recipe API
// ABOUTME: Resolves a bearer token into an AuthResult for an existing user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::auth::{AuthManager, AuthResult};
use crate::constants::auth::BEARER_PREFIX;
use crate::database::Database;
use recipe_core::errors::{AppError, AppResult};
use std::sync::Arc;

/// Authenticates requests from their `Authorization` header
#[derive(Clone, Debug)]
pub struct RequestAuthenticator {
    auth_manager: Arc<AuthManager>,
    database: Arc<Database>,
}

impl RequestAuthenticator {
    /// Create a new authenticator
    #[must_use]
    pub const fn new(auth_manager: Arc<AuthManager>, database: Arc<Database>) -> Self {
        Self {
            auth_manager,
            database,
        }
    }

    /// Authenticate a request from its raw `Authorization` header value
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `AUTH_REQUIRED` when no header is present
    /// - `AUTH_INVALID` when the header is not a bearer token, the token does
    ///   not verify, or its user no longer exists
    /// - `AUTH_EXPIRED` when the token has expired
    #[tracing::instrument(
        skip(self, auth_header),
        fields(user_id = tracing::field::Empty, success = tracing::field::Empty)
    )]
    pub async fn authenticate_request(&self, auth_header: Option<&str>) -> AppResult<AuthResult> {
        let Some(header) = auth_header else {
            tracing::Span::current().record("success", false);
            tracing::debug!("Authentication failed: missing authorization header");
            return Err(AppError::auth_required());
        };

        // Security: never log the header value
        let Some(token) = header.strip_prefix(BEARER_PREFIX).map(str::trim) else {
            tracing::Span::current().record("success", false);
            tracing::warn!("Authentication failed: authorization header is not a bearer token");
            return Err(AppError::auth_invalid(
                "Invalid authorization header format - must be 'Bearer <token>'",
            ));
        };

        let claims = self.auth_manager.validate_token(token).map_err(|e| {
            tracing::Span::current().record("success", false);
            tracing::warn!("JWT authentication failed: {}", e);
            AppError::from(e)
        })?;
        let user_id = claims.user_id().map_err(AppError::from)?;

        if self.database.users().get(user_id).await?.is_none() {
            tracing::Span::current().record("success", false);
            tracing::warn!(user.id = %user_id, "Authentication failed: user no longer exists");
            return Err(AppError::auth_invalid("User account no longer exists"));
        }

        tracing::Span::current()
            .record("user_id", user_id.to_string())
            .record("success", true);
        tracing::debug!(user.id = %user_id, "JWT authentication successful");

        Ok(AuthResult {
            user_id,
            email: claims.email,
        })
    }
}
