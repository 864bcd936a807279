// ABOUTME: Conversion from sqlx errors into AppError
// ABOUTME: Separates transient repository failures from constraint violations and hard failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{AppError, ErrorCode};
use sqlx::error::DatabaseError;

/// `SQLITE_BUSY`
const SQLITE_BUSY: i32 = 5;
/// `SQLITE_LOCKED`
const SQLITE_LOCKED: i32 = 6;

/// Whether a driver error is lock contention rather than a hard failure.
///
/// SQLite reports extended result codes (`SQLITE_BUSY_SNAPSHOT` is 517);
/// the primary code lives in the low byte.
fn is_lock_contention(db_error: &dyn DatabaseError) -> bool {
    db_error
        .code()
        .and_then(|code| code.parse::<i32>().ok())
        .is_some_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        let code = match &error {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                ErrorCode::ResourceUnavailable
            }
            sqlx::Error::RowNotFound => ErrorCode::ResourceNotFound,
            sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
                ErrorCode::ResourceAlreadyExists
            }
            sqlx::Error::Database(db_error) if is_lock_contention(&**db_error) => {
                ErrorCode::ResourceUnavailable
            }
            _ => ErrorCode::DatabaseError,
        };

        Self::new(code, format!("Database operation failed: {error}")).with_source(error)
    }
}
