// ABOUTME: User account database operations
// ABOUTME: Creates, looks up, and deletes owners; deletion cascades to owned entities

use super::{database_error, format_timestamp, parse_timestamp, parse_uuid};
use recipe_core::errors::{AppError, AppResult};
use recipe_core::models::User;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// User persistence
#[derive(Clone, Debug)]
pub struct UsersManager {
    pool: SqlitePool,
}

impl UsersManager {
    /// Create a manager over the shared pool
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new user
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` if the email is taken, or a database
    /// error
    pub async fn create(&self, user: &User) -> AppResult<()> {
        if user.email.is_empty() || !user.email.contains('@') {
            return Err(AppError::invalid_input("A valid email address is required"));
        }

        sqlx::query(
            r"
            INSERT INTO users (id, email, display_name, created_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(format_timestamp(user.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("Failed to create user", e))?;

        Ok(())
    }

    /// Get a user by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, display_name, created_at FROM users WHERE id = $1",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("Failed to get user", e))?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    /// Get a user by email (case-insensitive)
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, display_name, created_at FROM users WHERE email = $1",
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("Failed to get user by email", e))?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    /// Delete a user and everything they own
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn delete(&self, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("Failed to delete user", e))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_user(row: &SqliteRow) -> AppResult<User> {
    let id: String = row.get("id");
    let created_at: String = row.get("created_at");
    Ok(User {
        id: parse_uuid(&id)?,
        email: row.get("email"),
        display_name: row.get("display_name"),
        created_at: parse_timestamp(&created_at)?,
    })
}
