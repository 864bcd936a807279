// ABOUTME: Integration tests for the tag and ingredient route handlers
// ABOUTME: Covers get-or-create status codes, assigned-only listing, rename conflicts, and delete
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use axum::Router;
use common::{create_test_resources, create_test_router, create_test_user_with_token};
use helpers::axum_test::AxumTestRequest;
use recipe_api_server::dto::v1::{Ingredient, RecipeDetail, Tag};
use serde_json::json;

async fn setup() -> (Router, String, String) {
    let resources = create_test_resources().await.unwrap();
    let owner = create_test_user_with_token(&resources, "owner@example.com")
        .await
        .unwrap();
    let other = create_test_user_with_token(&resources, "other@example.com")
        .await
        .unwrap();
    (create_test_router(&resources), owner.token, other.token)
}

async fn create_tag(router: &Router, token: &str, name: &str) -> (StatusCode, Tag) {
    let response = AxumTestRequest::post("/api/tags")
        .bearer(token)
        .json(&json!({ "name": name }))
        .send(router.clone())
        .await;
    let status = response.status_code();
    (status, response.json())
}

#[tokio::test]
async fn test_tag_get_or_create_status_codes() {
    let (router, token, _) = setup().await;

    let (status, created) = create_tag(&router, &token, "Breakfast").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, existing) = create_tag(&router, &token, "  breakfast ").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(existing, created);
    assert_eq!(existing.name, "Breakfast");
}

#[tokio::test]
async fn test_bad_path_and_query_are_rejected_after_auth() {
    let (router, token, _) = setup().await;

    for path in [
        "/api/tags/abc",
        "/api/ingredients/abc",
        "/api/tags?assigned_only=1&assigned_only=0",
    ] {
        AxumTestRequest::get(path)
            .send(router.clone())
            .await
            .assert_status(StatusCode::UNAUTHORIZED)
            .assert_error_code("AUTH_REQUIRED");

        AxumTestRequest::get(path)
            .bearer(&token)
            .send(router.clone())
            .await
            .assert_status(StatusCode::BAD_REQUEST)
            .assert_error_code("INVALID_INPUT");
    }

    AxumTestRequest::post("/api/ingredients/abc/image")
        .multipart_file("image", "a.png", "image/png", b"not used")
        .send(router.clone())
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_error_code("AUTH_REQUIRED");
}

#[tokio::test]
async fn test_tag_names_are_scoped_per_owner() {
    let (router, token, other_token) = setup().await;

    let (_, mine) = create_tag(&router, &token, "Lunch").await;
    let (status, theirs) = create_tag(&router, &other_token, "Lunch").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(mine.id, theirs.id);

    let tags: Vec<Tag> = AxumTestRequest::get("/api/tags")
        .bearer(&token)
        .send(router.clone())
        .await
        .json();
    assert_eq!(tags, vec![mine]);
}

#[tokio::test]
async fn test_empty_tag_name_is_rejected() {
    let (router, token, _) = setup().await;

    AxumTestRequest::post("/api/tags")
        .bearer(&token)
        .json(&json!({ "name": "   " }))
        .send(router.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_code("MISSING_REQUIRED_FIELD");
}

#[tokio::test]
async fn test_tags_list_name_descending() {
    let (router, token, _) = setup().await;
    for name in ["Apple", "Cherry", "Banana"] {
        create_tag(&router, &token, name).await;
    }

    let tags: Vec<Tag> = AxumTestRequest::get("/api/tags")
        .bearer(&token)
        .send(router.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["Cherry", "Banana", "Apple"]);
}

#[tokio::test]
async fn test_assigned_only_lists_each_tag_once() {
    let (router, token, _) = setup().await;
    create_tag(&router, &token, "Unused").await;

    for title in ["One", "Two"] {
        AxumTestRequest::post("/api/recipes")
            .bearer(&token)
            .json(&json!({
                "title": title, "time_minutes": 1, "price": "1.00",
                "tags": [{ "name": "Shared" }]
            }))
            .send(router.clone())
            .await
            .assert_status(StatusCode::CREATED);
    }

    let assigned: Vec<Tag> = AxumTestRequest::get("/api/tags?assigned_only=1")
        .bearer(&token)
        .send(router.clone())
        .await
        .json();
    let names: Vec<_> = assigned.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["Shared"]);

    let all: Vec<Tag> = AxumTestRequest::get("/api/tags?assigned_only=0")
        .bearer(&token)
        .send(router.clone())
        .await
        .json();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_rename_tag_and_conflict() {
    let (router, token, _) = setup().await;
    let (_, dinner) = create_tag(&router, &token, "Dinner").await;
    create_tag(&router, &token, "Supper").await;

    let renamed: Tag = AxumTestRequest::patch(&format!("/api/tags/{}", dinner.id))
        .bearer(&token)
        .json(&json!({ "name": "Evening meal" }))
        .send(router.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(renamed.id, dinner.id);
    assert_eq!(renamed.name, "Evening meal");

    AxumTestRequest::put(&format!("/api/tags/{}", dinner.id))
        .bearer(&token)
        .json(&json!({ "name": "SUPPER" }))
        .send(router.clone())
        .await
        .assert_status(StatusCode::CONFLICT)
        .assert_error_code("RESOURCE_ALREADY_EXISTS");
}

#[tokio::test]
async fn test_rename_changes_case_of_same_tag() {
    let (router, token, _) = setup().await;
    let (_, tag) = create_tag(&router, &token, "bbq").await;

    let renamed: Tag = AxumTestRequest::put(&format!("/api/tags/{}", tag.id))
        .bearer(&token)
        .json(&json!({ "name": "BBQ" }))
        .send(router.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(renamed.name, "BBQ");
}

#[tokio::test]
async fn test_delete_tag_detaches_from_recipes() {
    let (router, token, other_token) = setup().await;
    let recipe: RecipeDetail = AxumTestRequest::post("/api/recipes")
        .bearer(&token)
        .json(&json!({
            "title": "Ribs", "time_minutes": 120, "price": "12.00",
            "tags": [{ "name": "Grill" }]
        }))
        .send(router.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    let tag_id = recipe.summary.tags[0].id;

    AxumTestRequest::delete(&format!("/api/tags/{tag_id}"))
        .bearer(&other_token)
        .send(router.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    AxumTestRequest::delete(&format!("/api/tags/{tag_id}"))
        .bearer(&token)
        .send(router.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let fetched: RecipeDetail = AxumTestRequest::get(&format!("/api/recipes/{}", recipe.summary.id))
        .bearer(&token)
        .send(router.clone())
        .await
        .json();
    assert!(fetched.summary.tags.is_empty());
}

#[tokio::test]
async fn test_ingredient_crud() {
    let (router, token, other_token) = setup().await;

    let response = AxumTestRequest::post("/api/ingredients")
        .bearer(&token)
        .json(&json!({ "name": "Garlic" }))
        .send(router.clone())
        .await
        .assert_status(StatusCode::CREATED);
    let garlic: Ingredient = response.json();
    assert!(garlic.image.is_none());

    AxumTestRequest::post("/api/ingredients")
        .bearer(&token)
        .json(&json!({ "name": "GARLIC" }))
        .send(router.clone())
        .await
        .assert_status(StatusCode::OK);

    AxumTestRequest::get(&format!("/api/ingredients/{}", garlic.id))
        .bearer(&other_token)
        .send(router.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let renamed: Ingredient = AxumTestRequest::patch(&format!("/api/ingredients/{}", garlic.id))
        .bearer(&token)
        .json(&json!({ "name": "Black garlic" }))
        .send(router.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(renamed.name, "Black garlic");

    AxumTestRequest::delete(&format!("/api/ingredients/{}", garlic.id))
        .bearer(&token)
        .send(router.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let remaining: Vec<Ingredient> = AxumTestRequest::get("/api/ingredients")
        .bearer(&token)
        .send(router.clone())
        .await
        .json();
    assert!(remaining.is_empty());
}

#[tokio::test]
async fn test_ingredients_assigned_only() {
    let (router, token, _) = setup().await;
    AxumTestRequest::post("/api/ingredients")
        .bearer(&token)
        .json(&json!({ "name": "Saffron" }))
        .send(router.clone())
        .await;
    AxumTestRequest::post("/api/recipes")
        .bearer(&token)
        .json(&json!({
            "title": "Paella", "time_minutes": 60, "price": "15.00",
            "ingredients": [{ "name": "Rice" }, { "name": "Prawns" }]
        }))
        .send(router.clone())
        .await
        .assert_status(StatusCode::CREATED);

    let assigned: Vec<Ingredient> = AxumTestRequest::get("/api/ingredients?assigned_only=true")
        .bearer(&token)
        .send(router.clone())
        .await
        .json();
    let names: Vec<_> = assigned.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, ["Rice", "Prawns"]);
}
