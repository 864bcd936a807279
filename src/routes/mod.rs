// ABOUTME: Route module organization for the recipe API HTTP endpoints
// ABOUTME: Assembles domain routers and shares request helpers between them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module for the recipe API
//!
//! Each domain module contains only route definitions and thin handler
//! functions that authenticate and then delegate to services or managers.

/// Health check and readiness routes
pub mod health;
/// Ingredient routes, including image upload
pub mod ingredients;
/// Recipe routes, including filtering and image upload
pub mod recipes;
/// Tag routes
pub mod tags;

/// Health check route handlers
pub use health::HealthRoutes;
/// Ingredient route handlers
pub use ingredients::IngredientRoutes;
/// Recipe route handlers
pub use recipes::RecipeRoutes;
/// Tag route handlers
pub use tags::TagRoutes;

use crate::auth::AuthResult;
use crate::config::environment::ImageStoreKind;
use crate::constants::storage::IMAGE_FIELD_NAME;
use crate::middleware::setup_cors;
use crate::resources::ServerResources;
use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::extract::DefaultBodyLimit;
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::{Json, Router};
use bytes::{Bytes, BytesMut};
use recipe_core::errors::{AppError, AppResult};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Allowance for multipart boundaries and part headers above the image limit
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the complete application router
#[must_use]
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let images = &resources.config.images;
    let body_limit = images.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES);

    let mut router = Router::new()
        .merge(HealthRoutes::routes(resources.clone()))
        .merge(RecipeRoutes::routes(resources.clone()))
        .merge(TagRoutes::routes(resources.clone()))
        .merge(IngredientRoutes::routes(resources.clone()));

    if images.store == ImageStoreKind::Local {
        router = router.nest_service(&images.url_prefix, ServeDir::new(&images.media_root));
    }

    let router = router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http());

    match setup_cors(&resources.config.security) {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

/// Authenticate a request from its `Authorization` header
pub(crate) async fn authenticate(
    headers: &HeaderMap,
    resources: &ServerResources,
) -> AppResult<AuthResult> {
    let header = headers.get(AUTHORIZATION).map(|value| {
        value
            .to_str()
            .map_err(|_| AppError::auth_invalid("Authorization header is not valid ASCII"))
    });
    let header = header.transpose()?;
    resources.authenticator.authenticate_request(header).await
}

/// Unwrap a JSON body, reporting malformed payloads in the API error format
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::invalid_input(rejection.body_text()))
}

/// Unwrap a numeric path id; extracted after authentication so anonymous
/// callers always see 401
pub(crate) fn path_id(path: Result<Path<i64>, PathRejection>) -> AppResult<i64> {
    path.map(|Path(id)| id)
        .map_err(|rejection| AppError::invalid_input(rejection.body_text()))
}

/// Unwrap query parameters, reporting malformed ones in the API error format
pub(crate) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> AppResult<T> {
    query
        .map(|Query(value)| value)
        .map_err(|rejection| AppError::invalid_input(rejection.body_text()))
}

/// Read the `image` part of a multipart upload, rejecting it once it grows
/// past `max_bytes`
pub(crate) async fn read_image_field(
    multipart: Result<Multipart, MultipartRejection>,
    max_bytes: usize,
) -> AppResult<Bytes> {
    let mut multipart =
        multipart.map_err(|rejection| AppError::invalid_input(rejection.body_text()))?;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD_NAME) {
            continue;
        }

        let mut buffer = BytesMut::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            if buffer.len() + chunk.len() > max_bytes {
                return Err(AppError::invalid_image(format!(
                    "Upload exceeds the {max_bytes} byte limit"
                ))
                .with_details(serde_json::json!({ "max_bytes": max_bytes })));
            }
            buffer.extend_from_slice(&chunk);
        }
        return Ok(buffer.freeze());
    }

    Err(AppError::missing_field(IMAGE_FIELD_NAME))
}

fn multipart_error(error: MultipartError) -> AppError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::invalid_image("Upload exceeds the request size limit")
    } else {
        AppError::invalid_input(error.body_text())
    }
}
