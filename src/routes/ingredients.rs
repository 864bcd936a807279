// ABOUTME: Route handlers for the ingredients REST API
// ABOUTME: Listing, get-or-create by name, rename, delete, and image upload
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{authenticate, json_body, path_id, query_params, read_image_field};
use crate::constants::entities::INGREDIENT;
use crate::dto::v1::{ImageUploadResponse, Ingredient, ListNamedQuery, NameBody};
use crate::resources::ServerResources;
use crate::services::ImageTarget;
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
use std::sync::Arc;
use tracing::info;

/// Ingredient routes
pub struct IngredientRoutes;

impl IngredientRoutes {
    /// Create all ingredient routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/ingredients",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/ingredients/:id",
                get(Self::handle_get)
                    .put(Self::handle_rename)
                    .patch(Self::handle_rename)
                    .delete(Self::handle_delete),
            )
            .route(
                "/api/ingredients/:id/image",
                post(Self::handle_upload_image),
            )
            .with_state(resources)
    }

    fn not_found(ingredient_id: i64) -> AppError {
        AppError::not_found(format!("{INGREDIENT} {ingredient_id}"))
    }

    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        query: Result<Query<ListNamedQuery>, QueryRejection>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let query = query_params(query)?;
        let ingredients: Vec<Ingredient> = resources
            .database
            .ingredients()
            .list(auth.user_id, query.assigned_only())
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
        Ok((StatusCode::OK, Json(ingredients)).into_response())
    }

    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Result<Json<NameBody>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let body = json_body(body)?;
        let (ingredient, created) = resources
            .database
            .ingredients()
            .get_or_create(auth.user_id, &body.name)
            .await?;

        let status = if created {
            info!(user.id = %auth.user_id, ingredient.id = ingredient.id, "Created ingredient");
            StatusCode::CREATED
        } else {
            StatusCode::OK
        };
        Ok((status, Json(Ingredient::from(ingredient))).into_response())
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        ingredient_id: Result<Path<i64>, PathRejection>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let ingredient_id = path_id(ingredient_id)?;
        let ingredient = resources
            .database
            .ingredients()
            .get(ingredient_id, auth.user_id)
            .await?
            .ok_or_else(|| Self::not_found(ingredient_id))?;
        Ok((StatusCode::OK, Json(Ingredient::from(ingredient))).into_response())
    }

    async fn handle_rename(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        ingredient_id: Result<Path<i64>, PathRejection>,
        body: Result<Json<NameBody>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let ingredient_id = path_id(ingredient_id)?;
        let body = json_body(body)?;
        let ingredient = resources
            .database
            .ingredients()
            .rename(ingredient_id, auth.user_id, &body.name)
            .await?
            .ok_or_else(|| Self::not_found(ingredient_id))?;
        Ok((StatusCode::OK, Json(Ingredient::from(ingredient))).into_response())
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        ingredient_id: Result<Path<i64>, PathRejection>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let ingredient_id = path_id(ingredient_id)?;
        if !resources
            .database
            .ingredients()
            .delete(ingredient_id, auth.user_id)
            .await?
        {
            return Err(Self::not_found(ingredient_id));
        }
        info!(user.id = %auth.user_id, ingredient.id = ingredient_id, "Deleted ingredient");
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    /// POST /api/ingredients/:id/image (multipart field `image`)
    async fn handle_upload_image(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        ingredient_id: Result<Path<i64>, PathRejection>,
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let ingredient_id = path_id(ingredient_id)?;
        let target = ImageTarget::Ingredient(ingredient_id);
        let owned = resources.images.ensure_target(&auth, target).await?;

        let payload = read_image_field(multipart, resources.images.max_upload_bytes()).await?;
        let image = resources.images.attach(&auth, owned, payload).await?;
        Ok((
            StatusCode::OK,
            Json(ImageUploadResponse {
                id: ingredient_id,
                image: image.url,
            }),
        )
            .into_response())
    }
}
