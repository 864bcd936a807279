// ABOUTME: Shared get-or-create and rename logic for per-owner named entities
// ABOUTME: Tags and ingredients are unique on (user_id, normalized_name)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{database_error, format_timestamp};
use chrono::Utc;
use recipe_core::errors::{AppError, AppResult};
use recipe_core::models::{clean_name, normalize_name};
use sqlx::SqliteConnection;
use uuid::Uuid;

/// Tables holding owner-scoped, name-unique entities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum NamedTable {
    Tags,
    Ingredients,
}

impl NamedTable {
    const fn table(self) -> &'static str {
        match self {
            Self::Tags => "tags",
            Self::Ingredients => "ingredients",
        }
    }

    const fn has_updated_at(self) -> bool {
        matches!(self, Self::Ingredients)
    }
}

/// Validate a display name and derive its uniqueness key
pub(super) fn prepare_name(raw: &str, max_len: usize) -> AppResult<(String, String)> {
    let name = clean_name(raw);
    if name.is_empty() {
        return Err(AppError::missing_field("name"));
    }
    if name.chars().count() > max_len {
        return Err(AppError::invalid_input(format!(
            "Name cannot exceed {max_len} characters"
        )));
    }
    let normalized = normalize_name(&name);
    Ok((name, normalized))
}

/// Return the id of the owner's entity with this name, inserting it if absent.
///
/// Runs on the caller's connection so it can take part in an enclosing
/// transaction. The boolean is true when this call inserted the row.
pub(super) async fn get_or_create_id(
    conn: &mut SqliteConnection,
    table: NamedTable,
    user_id: Uuid,
    name: &str,
    normalized: &str,
) -> AppResult<(i64, bool)> {
    let now = format_timestamp(Utc::now());
    let insert = if table.has_updated_at() {
        format!(
            "INSERT INTO {} (user_id, name, normalized_name, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $4)
             ON CONFLICT (user_id, normalized_name) DO NOTHING",
            table.table()
        )
    } else {
        format!(
            "INSERT INTO {} (user_id, name, normalized_name, created_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id, normalized_name) DO NOTHING",
            table.table()
        )
    };

    let inserted = sqlx::query(&insert)
        .bind(user_id.to_string())
        .bind(name)
        .bind(normalized)
        .bind(&now)
        .execute(&mut *conn)
        .await
        .map_err(|e| database_error(&format!("Failed to insert into {}", table.table()), e))?
        .rows_affected()
        == 1;

    let select = format!(
        "SELECT id FROM {} WHERE user_id = $1 AND normalized_name = $2",
        table.table()
    );
    let id: i64 = sqlx::query_scalar(&select)
        .bind(user_id.to_string())
        .bind(normalized)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| database_error(&format!("Failed to resolve {} id", table.table()), e))?;

    Ok((id, inserted))
}

/// Rename an owner's entity. Returns false when it does not exist.
///
/// A name colliding with another of the owner's entities surfaces as
/// `RESOURCE_ALREADY_EXISTS` through the unique constraint.
pub(super) async fn rename(
    conn: &mut SqliteConnection,
    table: NamedTable,
    id: i64,
    user_id: Uuid,
    name: &str,
    normalized: &str,
) -> AppResult<bool> {
    let statement = format!(
        "UPDATE {} SET name = $1, normalized_name = $2 WHERE id = $3 AND user_id = $4",
        table.table()
    );
    let result = sqlx::query(&statement)
        .bind(name)
        .bind(normalized)
        .bind(id)
        .bind(user_id.to_string())
        .execute(&mut *conn)
        .await
        .map_err(|e| database_error(&format!("Failed to rename {} row", table.table()), e))?;

    if result.rows_affected() > 0 && table.has_updated_at() {
        let touch = format!("UPDATE {} SET updated_at = $1 WHERE id = $2", table.table());
        sqlx::query(&touch)
            .bind(format_timestamp(Utc::now()))
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(|e| database_error(&format!("Failed to touch {} row", table.table()), e))?;
    }

    Ok(result.rows_affected() > 0)
}

/// Delete an owner's entity; relation rows cascade
pub(super) async fn delete(
    conn: &mut SqliteConnection,
    table: NamedTable,
    id: i64,
    user_id: Uuid,
) -> AppResult<bool> {
    let statement = format!("DELETE FROM {} WHERE id = $1 AND user_id = $2", table.table());
    let result = sqlx::query(&statement)
        .bind(id)
        .bind(user_id.to_string())
        .execute(&mut *conn)
        .await
        .map_err(|e| database_error(&format!("Failed to delete {} row", table.table()), e))?;

    Ok(result.rows_affected() > 0)
}
