// ABOUTME: Recipe entity and its field validation rules
// ABOUTME: Prices are fixed-point decimals with two fractional digits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::ImageRef;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Largest accepted price (five significant digits, two of them fractional)
pub const MAX_PRICE: Decimal = Decimal::from_parts(99_999, 0, 0, false, 2);

/// A recipe owned by exactly one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique identifier
    pub id: i64,
    /// Owning user
    pub user_id: Uuid,
    /// Title
    pub title: String,
    /// Free-form description, empty when not provided
    pub description: String,
    /// Preparation time in minutes
    pub time_minutes: i64,
    /// Price with two fractional digits
    pub price: Decimal,
    /// Optional external link
    pub link: Option<String>,
    /// Current image, if one was uploaded
    pub image: Option<ImageRef>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Validate and canonicalize a price.
///
/// # Errors
///
/// Returns `ValueOutOfRange` when the price is negative, has more than two
/// fractional digits, or exceeds [`MAX_PRICE`].
pub fn validate_price(price: Decimal) -> AppResult<Decimal> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(AppError::out_of_range("price", "Price cannot be negative"));
    }
    if price.normalize().scale() > 2 {
        return Err(AppError::out_of_range(
            "price",
            "Price cannot have more than 2 decimal places",
        ));
    }
    if price > MAX_PRICE {
        return Err(AppError::out_of_range(
            "price",
            format!("Price cannot exceed {MAX_PRICE}"),
        ));
    }

    let mut canonical = price;
    canonical.rescale(2);
    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_price_is_rescaled_to_cents() {
        assert_eq!(validate_price(dec("5")).unwrap().to_string(), "5.00");
        assert_eq!(validate_price(dec("5.05")).unwrap().to_string(), "5.05");
        assert_eq!(validate_price(dec("5.500")).unwrap().to_string(), "5.50");
    }

    #[test]
    fn test_price_bounds() {
        assert_eq!(validate_price(dec("999.99")).unwrap(), dec("999.99"));
        assert_eq!(
            validate_price(dec("1000.00")).unwrap_err().code,
            ErrorCode::ValueOutOfRange
        );
        assert_eq!(
            validate_price(dec("-0.01")).unwrap_err().code,
            ErrorCode::ValueOutOfRange
        );
        assert_eq!(
            validate_price(dec("1.234")).unwrap_err().code,
            ErrorCode::ValueOutOfRange
        );
    }
}
