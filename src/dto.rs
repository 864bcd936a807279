// ABOUTME: Versioned request and response bodies for the HTTP API
// ABOUTME: Decouples the wire format from storage rows and domain models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Data-transfer types.
//!
//! Each API version gets its own module. Handlers only ever serialize these
//! types, so a schema change in storage cannot leak onto the wire.

/// Version 1 of the wire format
pub mod v1 {
    use crate::database::RecipeRecord;
    use recipe_core::models;
    use rust_decimal::Decimal;
    use serde::{Deserialize, Serialize};

    /// A tag as seen by clients
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Tag {
        /// Identifier
        pub id: i64,
        /// Display name
        pub name: String,
    }

    impl From<models::Tag> for Tag {
        fn from(tag: models::Tag) -> Self {
            Self {
                id: tag.id,
                name: tag.name,
            }
        }
    }

    /// An ingredient as seen by clients
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Ingredient {
        /// Identifier
        pub id: i64,
        /// Display name
        pub name: String,
        /// Image URL, if an image was uploaded
        pub image: Option<String>,
    }

    impl From<models::Ingredient> for Ingredient {
        fn from(ingredient: models::Ingredient) -> Self {
            Self {
                id: ingredient.id,
                name: ingredient.name,
                image: ingredient.image.map(|image| image.url),
            }
        }
    }

    /// Recipe fields returned by the list endpoint
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct RecipeSummary {
        /// Identifier
        pub id: i64,
        /// Title
        pub title: String,
        /// Preparation time in minutes
        pub time_minutes: i64,
        /// Price, serialized as a decimal string
        pub price: Decimal,
        /// External link
        pub link: Option<String>,
        /// Attached tags
        pub tags: Vec<Tag>,
        /// Attached ingredients, in recipe order
        pub ingredients: Vec<Ingredient>,
    }

    /// Full recipe returned by the detail and write endpoints
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct RecipeDetail {
        /// Summary fields
        #[serde(flatten)]
        pub summary: RecipeSummary,
        /// Description
        pub description: String,
        /// Image URL, if an image was uploaded
        pub image: Option<String>,
    }

    impl From<RecipeRecord> for RecipeSummary {
        fn from(record: RecipeRecord) -> Self {
            Self {
                id: record.recipe.id,
                title: record.recipe.title,
                time_minutes: record.recipe.time_minutes,
                price: record.recipe.price,
                link: record.recipe.link,
                tags: record.tags.into_iter().map(Into::into).collect(),
                ingredients: record.ingredients.into_iter().map(Into::into).collect(),
            }
        }
    }

    impl From<RecipeRecord> for RecipeDetail {
        fn from(mut record: RecipeRecord) -> Self {
            let description = std::mem::take(&mut record.recipe.description);
            let image = record.recipe.image.take().map(|image| image.url);
            Self {
                summary: record.into(),
                description,
                image,
            }
        }
    }

    /// Response of an image upload
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ImageUploadResponse {
        /// Target entity identifier
        pub id: i64,
        /// URL of the new image
        pub image: String,
    }

    /// A `{ "name": ... }` body used for tags and ingredients
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct NameBody {
        /// Display name
        #[serde(default)]
        pub name: String,
    }

    /// Create or update body for a recipe.
    ///
    /// Every field is optional at the wire level; which ones are required
    /// depends on the operation. Unknown fields, including any attempt to set
    /// the owner, are ignored.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct RecipeBody {
        /// Title
        pub title: Option<String>,
        /// Description
        pub description: Option<String>,
        /// Preparation time in minutes
        pub time_minutes: Option<i64>,
        /// Price, as a number or decimal string
        pub price: Option<Decimal>,
        /// External link; an empty string clears it
        pub link: Option<String>,
        /// Tags by name; replaces the current set when present
        pub tags: Option<Vec<NameBody>>,
        /// Ingredients by name; replaces the current list when present
        pub ingredients: Option<Vec<NameBody>>,
    }

    /// Query for the tag and ingredient list endpoints
    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct ListNamedQuery {
        /// `1`/`true` restricts to entities attached to a recipe
        pub assigned_only: Option<String>,
    }

    impl ListNamedQuery {
        /// Interpret `assigned_only`; anything but `1` or `true` is false
        #[must_use]
        pub fn assigned_only(&self) -> bool {
            self.assigned_only
                .as_deref()
                .map(str::trim)
                .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        }
    }
}
