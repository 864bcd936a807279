// ABOUTME: Tag database operations scoped to the owning user
// ABOUTME: Listing, get-or-create by normalized name, rename, and delete
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::named::{self, NamedTable};
use super::{begin_write, database_error, parse_timestamp, parse_uuid};
use crate::constants::limits::MAX_NAME_LEN;
use recipe_core::errors::AppResult;
use recipe_core::models::Tag;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Tag persistence
#[derive(Clone, Debug)]
pub struct TagsManager {
    pool: SqlitePool,
}

impl TagsManager {
    /// Create a manager over the shared pool
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List the owner's tags, name descending.
    ///
    /// With `assigned_only`, only tags attached to at least one recipe are
    /// returned; each tag appears once regardless of how many recipes use it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list(&self, user_id: Uuid, assigned_only: bool) -> AppResult<Vec<Tag>> {
        let query = if assigned_only {
            r"
            SELECT t.id, t.user_id, t.name, t.created_at
            FROM tags t
            WHERE t.user_id = $1
              AND EXISTS (SELECT 1 FROM recipe_tags rt WHERE rt.tag_id = t.id)
            ORDER BY t.name DESC, t.id DESC
            "
        } else {
            r"
            SELECT t.id, t.user_id, t.name, t.created_at
            FROM tags t
            WHERE t.user_id = $1
            ORDER BY t.name DESC, t.id DESC
            "
        };

        let rows = sqlx::query(query)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database_error("Failed to list tags", e))?;

        rows.iter().map(row_to_tag).collect()
    }

    /// Get one of the owner's tags
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get(&self, tag_id: i64, user_id: Uuid) -> AppResult<Option<Tag>> {
        let row = sqlx::query(
            "SELECT id, user_id, name, created_at FROM tags WHERE id = $1 AND user_id = $2",
        )
        .bind(tag_id)
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("Failed to get tag", e))?;

        row.map(|r| row_to_tag(&r)).transpose()
    }

    /// Return the owner's tag with this name, creating it if needed.
    ///
    /// The boolean is true when the tag was created by this call.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty or overlong name, or a
    /// database error
    pub async fn get_or_create(&self, user_id: Uuid, name: &str) -> AppResult<(Tag, bool)> {
        let (name, normalized) = named::prepare_name(name, MAX_NAME_LEN)?;

        let mut tx = begin_write(&self.pool).await?;
        let (id, created) =
            named::get_or_create_id(&mut tx, NamedTable::Tags, user_id, &name, &normalized).await?;
        let row = sqlx::query("SELECT id, user_id, name, created_at FROM tags WHERE id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| database_error("Failed to load tag", e))?;
        tx.commit()
            .await
            .map_err(|e| database_error("Failed to commit tag", e))?;

        Ok((row_to_tag(&row)?, created))
    }

    /// Rename one of the owner's tags
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` if another of the owner's tags has
    /// the same normalized name, or a database error
    pub async fn rename(&self, tag_id: i64, user_id: Uuid, name: &str) -> AppResult<Option<Tag>> {
        let (name, normalized) = named::prepare_name(name, MAX_NAME_LEN)?;

        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| database_error("Failed to acquire connection", e))?;
        let renamed =
            named::rename(&mut conn, NamedTable::Tags, tag_id, user_id, &name, &normalized).await?;
        drop(conn);

        if !renamed {
            return Ok(None);
        }
        self.get(tag_id, user_id).await
    }

    /// Delete one of the owner's tags, detaching it from every recipe
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn delete(&self, tag_id: i64, user_id: Uuid) -> AppResult<bool> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| database_error("Failed to acquire connection", e))?;
        named::delete(&mut conn, NamedTable::Tags, tag_id, user_id).await
    }
}

pub(super) fn row_to_tag(row: &SqliteRow) -> AppResult<Tag> {
    let user_id: String = row.get("user_id");
    let created_at: String = row.get("created_at");
    Ok(Tag {
        id: row.get("id"),
        user_id: parse_uuid(&user_id)?,
        name: row.get("name"),
        created_at: parse_timestamp(&created_at)?,
    })
}
