// ABOUTME: Recipe query service applying ownership scoping, filtering, and validation
// ABOUTME: Converts request bodies into repository operations and repository rows into DTOs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::auth::AuthResult;
use crate::constants::entities::RECIPE;
use crate::constants::limits::{MAX_LINK_LEN, MAX_TIME_MINUTES, MAX_TITLE_LEN};
use crate::database::{Database, NewRecipe, RecipeChanges};
use crate::dto::v1::{NameBody, RecipeBody, RecipeDetail, RecipeSummary};
use recipe_core::errors::{AppError, AppResult};
use recipe_core::filter::RecipeFilter;
use recipe_core::models::validate_price;
use std::sync::Arc;
use tracing::{debug, info};

/// How an update body is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// PUT: title, time and price are required; omitted description and
    /// link are reset
    Full,
    /// PATCH: only the fields present are changed
    Partial,
}

/// Owner-scoped recipe operations
#[derive(Clone, Debug)]
pub struct RecipeQueryService {
    database: Arc<Database>,
}

impl RecipeQueryService {
    /// Create the service over a shared database
    #[must_use]
    pub const fn new(database: Arc<Database>) -> Self {
        Self { database }
    }

    /// List the caller's recipes matching `filter`, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails
    pub async fn list(
        &self,
        auth: &AuthResult,
        filter: &RecipeFilter,
    ) -> AppResult<Vec<RecipeSummary>> {
        let records = self.database.recipes().list(auth.user_id, filter).await?;
        debug!(
            user.id = %auth.user_id,
            filter.tags = ?filter.tag_ids,
            filter.ingredients = ?filter.ingredient_ids,
            result.count = records.len(),
            "Listed recipes"
        );
        Ok(records.into_iter().map(Into::into).collect())
    }

    /// Get one of the caller's recipes
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` if the recipe is missing or not owned by
    /// the caller
    pub async fn get(&self, auth: &AuthResult, recipe_id: i64) -> AppResult<RecipeDetail> {
        self.database
            .recipes()
            .get(recipe_id, auth.user_id)
            .await?
            .map(Into::into)
            .ok_or_else(|| not_found(recipe_id))
    }

    /// Create a recipe owned by the caller
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad body, or a repository error
    pub async fn create(&self, auth: &AuthResult, body: RecipeBody) -> AppResult<RecipeDetail> {
        let new = new_recipe_from_body(body)?;
        let record = self.database.recipes().create(auth.user_id, &new).await?;
        info!(
            user.id = %auth.user_id,
            recipe.id = record.recipe.id,
            recipe.tags = record.tags.len(),
            recipe.ingredients = record.ingredients.len(),
            "Created recipe"
        );
        Ok(record.into())
    }

    /// Update one of the caller's recipes
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad body, `RESOURCE_NOT_FOUND` if the
    /// recipe is missing or foreign, or a repository error
    pub async fn update(
        &self,
        auth: &AuthResult,
        recipe_id: i64,
        body: RecipeBody,
        mode: UpdateMode,
    ) -> AppResult<RecipeDetail> {
        let changes = changes_from_body(body, mode)?;
        let record = self
            .database
            .recipes()
            .update(recipe_id, auth.user_id, &changes)
            .await?
            .ok_or_else(|| not_found(recipe_id))?;
        info!(user.id = %auth.user_id, recipe.id = recipe_id, mode = ?mode, "Updated recipe");
        Ok(record.into())
    }

    /// Delete one of the caller's recipes
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` if the recipe is missing or foreign
    pub async fn delete(&self, auth: &AuthResult, recipe_id: i64) -> AppResult<()> {
        if !self.database.recipes().delete(recipe_id, auth.user_id).await? {
            return Err(not_found(recipe_id));
        }
        info!(user.id = %auth.user_id, recipe.id = recipe_id, "Deleted recipe");
        Ok(())
    }
}

fn not_found(recipe_id: i64) -> AppError {
    AppError::not_found(format!("{RECIPE} {recipe_id}"))
}

fn validate_title(title: &str) -> AppResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::missing_field("title"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::invalid_input(format!(
            "Title cannot exceed {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(title.to_owned())
}

fn validate_time(time_minutes: i64) -> AppResult<i64> {
    if !(0..=MAX_TIME_MINUTES).contains(&time_minutes) {
        return Err(AppError::out_of_range(
            "time_minutes",
            format!("time_minutes must be between 0 and {MAX_TIME_MINUTES}"),
        ));
    }
    Ok(time_minutes)
}

fn validate_link(link: &str) -> AppResult<String> {
    let link = link.trim();
    if link.chars().count() > MAX_LINK_LEN {
        return Err(AppError::invalid_input(format!(
            "Link cannot exceed {MAX_LINK_LEN} characters"
        )));
    }
    Ok(link.to_owned())
}

fn names(list: Vec<NameBody>) -> Vec<String> {
    list.into_iter().map(|body| body.name).collect()
}

/// Validate a create body
fn new_recipe_from_body(body: RecipeBody) -> AppResult<NewRecipe> {
    let title = validate_title(body.title.as_deref().unwrap_or_default())?;
    let time_minutes = validate_time(
        body.time_minutes
            .ok_or_else(|| AppError::missing_field("time_minutes"))?,
    )?;
    let price = validate_price(body.price.ok_or_else(|| AppError::missing_field("price"))?)?;
    let link = body
        .link
        .as_deref()
        .map(validate_link)
        .transpose()?
        .filter(|link| !link.is_empty());

    Ok(NewRecipe {
        title,
        description: body.description.unwrap_or_default(),
        time_minutes,
        price,
        link,
        tags: body.tags.map(names).unwrap_or_default(),
        ingredients: body.ingredients.map(names).unwrap_or_default(),
    })
}

/// Validate an update body for the given mode
fn changes_from_body(body: RecipeBody, mode: UpdateMode) -> AppResult<RecipeChanges> {
    if mode == UpdateMode::Full {
        let new = new_recipe_from_body(RecipeBody {
            tags: None,
            ingredients: None,
            ..body.clone()
        })?;
        return Ok(RecipeChanges {
            title: Some(new.title),
            description: Some(new.description),
            time_minutes: Some(new.time_minutes),
            price: Some(new.price),
            link: Some(new.link.unwrap_or_default()),
            tags: body.tags.map(names),
            ingredients: body.ingredients.map(names),
        });
    }

    Ok(RecipeChanges {
        title: body.title.as_deref().map(validate_title).transpose()?,
        description: body.description,
        time_minutes: body.time_minutes.map(validate_time).transpose()?,
        price: body.price.map(validate_price).transpose()?,
        link: body.link.as_deref().map(validate_link).transpose()?,
        tags: body.tags.map(names),
        ingredients: body.ingredients.map(names),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipe_core::errors::ErrorCode;
    use rust_decimal::Decimal;

    fn body() -> RecipeBody {
        RecipeBody {
            title: Some("  Pancakes ".to_owned()),
            time_minutes: Some(15),
            price: Some(Decimal::new(35, 1)),
            ..RecipeBody::default()
        }
    }

    #[test]
    fn test_new_recipe_defaults() {
        let new = new_recipe_from_body(body()).unwrap();
        assert_eq!(new.title, "Pancakes");
        assert_eq!(new.description, "");
        assert_eq!(new.price.to_string(), "3.50");
        assert!(new.link.is_none());
        assert!(new.tags.is_empty());
    }

    #[test]
    fn test_create_requires_fields() {
        let missing_title = RecipeBody {
            title: None,
            ..body()
        };
        assert_eq!(
            new_recipe_from_body(missing_title).unwrap_err().code,
            ErrorCode::MissingRequiredField
        );

        let missing_price = RecipeBody {
            price: None,
            ..body()
        };
        let err = new_recipe_from_body(missing_price).unwrap_err();
        assert_eq!(err.details["field"], "price");
    }

    #[test]
    fn test_negative_time_is_out_of_range() {
        let negative = RecipeBody {
            time_minutes: Some(-1),
            ..body()
        };
        assert_eq!(
            new_recipe_from_body(negative).unwrap_err().code,
            ErrorCode::ValueOutOfRange
        );
    }

    #[test]
    fn test_partial_changes_only_touch_present_fields() {
        let changes = changes_from_body(
            RecipeBody {
                title: Some("New".to_owned()),
                tags: Some(Vec::new()),
                ..RecipeBody::default()
            },
            UpdateMode::Partial,
        )
        .unwrap();

        assert_eq!(changes.title.as_deref(), Some("New"));
        assert!(changes.price.is_none());
        assert!(changes.link.is_none());
        assert_eq!(changes.tags, Some(Vec::new()));
        assert!(changes.ingredients.is_none());
    }

    #[test]
    fn test_full_update_resets_optional_fields() {
        let changes = changes_from_body(body(), UpdateMode::Full).unwrap();
        assert_eq!(changes.description.as_deref(), Some(""));
        assert_eq!(changes.link.as_deref(), Some(""));
        assert!(changes.tags.is_none());

        let incomplete = RecipeBody {
            title: Some("Only title".to_owned()),
            ..RecipeBody::default()
        };
        assert!(changes_from_body(incomplete, UpdateMode::Full).is_err());
    }
}
