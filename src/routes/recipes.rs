// ABOUTME: Route handlers for the recipes REST API
// ABOUTME: Filtered listing, CRUD, and image upload for the authenticated owner's recipes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Recipe routes
//!
//! All endpoints require a bearer token. Recipes of other owners are reported
//! as not found.

use super::{authenticate, json_body, path_id, query_params, read_image_field};
use crate::dto::v1::{ImageUploadResponse, RecipeBody};
use crate::resources::ServerResources;
use crate::services::{ImageTarget, UpdateMode};
use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use recipe_core::errors::AppError;
use recipe_core::filter::RecipeFilter;
use std::sync::Arc;

/// Recipe routes
pub struct RecipeRoutes;

impl RecipeRoutes {
    /// Create all recipe routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/recipes",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/recipes/:id",
                get(Self::handle_get)
                    .put(Self::handle_replace)
                    .patch(Self::handle_patch)
                    .delete(Self::handle_delete),
            )
            .route("/api/recipes/:id/image", post(Self::handle_upload_image))
            .with_state(resources)
    }

    /// GET /api/recipes?tags=1,2&ingredients=3
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        params: Result<Query<Vec<(String, String)>>, QueryRejection>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let filter = RecipeFilter::from_params(query_params(params)?);
        let recipes = resources.recipes.list(&auth, &filter).await?;
        Ok((StatusCode::OK, Json(recipes)).into_response())
    }

    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Result<Json<RecipeBody>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let recipe = resources.recipes.create(&auth, json_body(body)?).await?;
        Ok((StatusCode::CREATED, Json(recipe)).into_response())
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        recipe_id: Result<Path<i64>, PathRejection>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let recipe_id = path_id(recipe_id)?;
        let recipe = resources.recipes.get(&auth, recipe_id).await?;
        Ok((StatusCode::OK, Json(recipe)).into_response())
    }

    async fn handle_replace(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        recipe_id: Result<Path<i64>, PathRejection>,
        body: Result<Json<RecipeBody>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let recipe_id = path_id(recipe_id)?;
        let recipe = resources
            .recipes
            .update(&auth, recipe_id, json_body(body)?, UpdateMode::Full)
            .await?;
        Ok((StatusCode::OK, Json(recipe)).into_response())
    }

    async fn handle_patch(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        recipe_id: Result<Path<i64>, PathRejection>,
        body: Result<Json<RecipeBody>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let recipe_id = path_id(recipe_id)?;
        let recipe = resources
            .recipes
            .update(&auth, recipe_id, json_body(body)?, UpdateMode::Partial)
            .await?;
        Ok((StatusCode::OK, Json(recipe)).into_response())
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        recipe_id: Result<Path<i64>, PathRejection>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let recipe_id = path_id(recipe_id)?;
        resources.recipes.delete(&auth, recipe_id).await?;
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    /// POST /api/recipes/:id/image (multipart field `image`)
    async fn handle_upload_image(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        recipe_id: Result<Path<i64>, PathRejection>,
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let recipe_id = path_id(recipe_id)?;
        let target = ImageTarget::Recipe(recipe_id);
        let owned = resources.images.ensure_target(&auth, target).await?;

        let payload = read_image_field(multipart, resources.images.max_upload_bytes()).await?;
        let image = resources.images.attach(&auth, owned, payload).await?;
        Ok((
            StatusCode::OK,
            Json(ImageUploadResponse {
                id: recipe_id,
                image: image.url,
            }),
        )
            .into_response())
    }
}
