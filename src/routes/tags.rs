// ABOUTME: Route handlers for the tags REST API
// ABOUTME: Listing, get-or-create by name, rename, and delete for the owner's tags
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{authenticate, json_body, path_id, query_params};
use crate::constants::entities::TAG;
use crate::dto::v1::{ListNamedQuery, NameBody, Tag};
use crate::resources::ServerResources;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use recipe_core::errors::AppError;
use std::sync::Arc;
use tracing::info;

/// Tag routes
pub struct TagRoutes;

impl TagRoutes {
    /// Create all tag routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/tags", get(Self::handle_list).post(Self::handle_create))
            .route(
                "/api/tags/:id",
                get(Self::handle_get)
                    .put(Self::handle_rename)
                    .patch(Self::handle_rename)
                    .delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        query: Result<Query<ListNamedQuery>, QueryRejection>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let query = query_params(query)?;
        let tags: Vec<Tag> = resources
            .database
            .tags()
            .list(auth.user_id, query.assigned_only())
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
        Ok((StatusCode::OK, Json(tags)).into_response())
    }

    /// POST /api/tags: 201 when created, 200 when the name already existed
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Result<Json<NameBody>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let body = json_body(body)?;
        let (tag, created) = resources
            .database
            .tags()
            .get_or_create(auth.user_id, &body.name)
            .await?;

        let status = if created {
            info!(user.id = %auth.user_id, tag.id = tag.id, "Created tag");
            StatusCode::CREATED
        } else {
            StatusCode::OK
        };
        Ok((status, Json(Tag::from(tag))).into_response())
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        tag_id: Result<Path<i64>, PathRejection>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let tag_id = path_id(tag_id)?;
        let tag = resources
            .database
            .tags()
            .get(tag_id, auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("{TAG} {tag_id}")))?;
        Ok((StatusCode::OK, Json(Tag::from(tag))).into_response())
    }

    async fn handle_rename(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        tag_id: Result<Path<i64>, PathRejection>,
        body: Result<Json<NameBody>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let tag_id = path_id(tag_id)?;
        let body = json_body(body)?;
        let tag = resources
            .database
            .tags()
            .rename(tag_id, auth.user_id, &body.name)
            .await?
            .ok_or_else(|| AppError::not_found(format!("{TAG} {tag_id}")))?;
        Ok((StatusCode::OK, Json(Tag::from(tag))).into_response())
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        tag_id: Result<Path<i64>, PathRejection>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let tag_id = path_id(tag_id)?;
        if !resources.database.tags().delete(tag_id, auth.user_id).await? {
            return Err(AppError::not_found(format!("{TAG} {tag_id}")));
        }
        info!(user.id = %auth.user_id, tag.id = tag_id, "Deleted tag");
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }
}
