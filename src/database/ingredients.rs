// ABOUTME: Ingredient database operations scoped to the owning user
// ABOUTME: Listing, get-or-create by normalized name, rename, delete, and image replacement
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::named::{self, NamedTable};
use super::{
    begin_write, database_error, format_timestamp, parse_timestamp, parse_uuid, ImageSwap,
};
use crate::constants::limits::MAX_NAME_LEN;
use chrono::Utc;
use recipe_core::errors::AppResult;
use recipe_core::models::{ImageRef, Ingredient};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

const INGREDIENT_COLUMNS: &str =
    "i.id, i.user_id, i.name, i.image_key, i.image_url, i.created_at, i.updated_at";

/// Ingredient persistence
#[derive(Clone, Debug)]
pub struct IngredientsManager {
    pool: SqlitePool,
}

impl IngredientsManager {
    /// Create a manager over the shared pool
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List the owner's ingredients, name descending.
    ///
    /// With `assigned_only`, only ingredients used by at least one recipe are
    /// returned, each once.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list(&self, user_id: Uuid, assigned_only: bool) -> AppResult<Vec<Ingredient>> {
        let assigned = if assigned_only {
            "AND EXISTS (SELECT 1 FROM recipe_ingredients ri WHERE ri.ingredient_id = i.id)"
        } else {
            ""
        };
        let query = format!(
            "SELECT {INGREDIENT_COLUMNS} FROM ingredients i
             WHERE i.user_id = $1 {assigned}
             ORDER BY i.name DESC, i.id DESC"
        );

        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database_error("Failed to list ingredients", e))?;

        rows.iter().map(row_to_ingredient).collect()
    }

    /// Get one of the owner's ingredients
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get(&self, ingredient_id: i64, user_id: Uuid) -> AppResult<Option<Ingredient>> {
        let query = format!(
            "SELECT {INGREDIENT_COLUMNS} FROM ingredients i WHERE i.id = $1 AND i.user_id = $2"
        );
        let row = sqlx::query(&query)
            .bind(ingredient_id)
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("Failed to get ingredient", e))?;

        row.map(|r| row_to_ingredient(&r)).transpose()
    }

    /// Return the owner's ingredient with this name, creating it if needed.
    ///
    /// The boolean is true when the ingredient was created by this call.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty or overlong name, or a
    /// database error
    pub async fn get_or_create(&self, user_id: Uuid, name: &str) -> AppResult<(Ingredient, bool)> {
        let (name, normalized) = named::prepare_name(name, MAX_NAME_LEN)?;

        let mut tx = begin_write(&self.pool).await?;
        let (id, created) = named::get_or_create_id(
            &mut tx,
            NamedTable::Ingredients,
            user_id,
            &name,
            &normalized,
        )
        .await?;
        let query = format!("SELECT {INGREDIENT_COLUMNS} FROM ingredients i WHERE i.id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| database_error("Failed to load ingredient", e))?;
        tx.commit()
            .await
            .map_err(|e| database_error("Failed to commit ingredient", e))?;

        Ok((row_to_ingredient(&row)?, created))
    }

    /// Rename one of the owner's ingredients
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` if another of the owner's
    /// ingredients has the same normalized name, or a database error
    pub async fn rename(
        &self,
        ingredient_id: i64,
        user_id: Uuid,
        name: &str,
    ) -> AppResult<Option<Ingredient>> {
        let (name, normalized) = named::prepare_name(name, MAX_NAME_LEN)?;

        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| database_error("Failed to acquire connection", e))?;
        let renamed = named::rename(
            &mut conn,
            NamedTable::Ingredients,
            ingredient_id,
            user_id,
            &name,
            &normalized,
        )
        .await?;
        drop(conn);

        if !renamed {
            return Ok(None);
        }
        self.get(ingredient_id, user_id).await
    }

    /// Delete one of the owner's ingredients, detaching it from every recipe
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn delete(&self, ingredient_id: i64, user_id: Uuid) -> AppResult<bool> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| database_error("Failed to acquire connection", e))?;
        named::delete(&mut conn, NamedTable::Ingredients, ingredient_id, user_id).await
    }

    /// Replace the ingredient's image reference.
    ///
    /// Returns `None` when the ingredient does not exist for this owner,
    /// otherwise the reference that was replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn replace_image(
        &self,
        ingredient_id: i64,
        user_id: Uuid,
        image: &ImageRef,
    ) -> AppResult<Option<ImageSwap>> {
        let mut tx = begin_write(&self.pool).await?;

        let previous = sqlx::query(
            "SELECT image_key, image_url FROM ingredients WHERE id = $1 AND user_id = $2",
        )
        .bind(ingredient_id)
        .bind(user_id.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| database_error("Failed to load ingredient image", e))?;

        let Some(previous) = previous else {
            return Ok(None);
        };

        sqlx::query(
            r"
            UPDATE ingredients SET image_key = $1, image_url = $2, updated_at = $3
            WHERE id = $4 AND user_id = $5
            ",
        )
        .bind(&image.key)
        .bind(&image.url)
        .bind(format_timestamp(Utc::now()))
        .bind(ingredient_id)
        .bind(user_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| database_error("Failed to update ingredient image", e))?;

        tx.commit()
            .await
            .map_err(|e| database_error("Failed to commit ingredient image", e))?;

        Ok(Some(ImageSwap {
            previous: ImageRef::from_columns(previous.get("image_key"), previous.get("image_url")),
        }))
    }
}

pub(super) fn row_to_ingredient(row: &SqliteRow) -> AppResult<Ingredient> {
    let user_id: String = row.get("user_id");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");
    Ok(Ingredient {
        id: row.get("id"),
        user_id: parse_uuid(&user_id)?,
        name: row.get("name"),
        image: ImageRef::from_columns(row.get("image_key"), row.get("image_url")),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}
