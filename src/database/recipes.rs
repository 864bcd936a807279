// ABOUTME: Recipe database operations with tag and ingredient relations
// ABOUTME: Owner-scoped filtered listing, transactional create/update, and image replacement
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::ingredients::row_to_ingredient;
use super::named::{self, NamedTable};
use super::tags::row_to_tag;
use super::{
    begin_write, database_error, format_timestamp, parse_timestamp, parse_uuid, ImageSwap,
};
use crate::constants::limits::MAX_NAME_LEN;
use chrono::Utc;
use recipe_core::errors::{AppError, AppResult};
use recipe_core::filter::RecipeFilter;
use recipe_core::models::{ImageRef, Ingredient, Recipe, Tag};
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use uuid::Uuid;

const RECIPE_COLUMNS: &str = "r.id, r.user_id, r.title, r.description, r.time_minutes, r.price, \
                              r.link, r.image_key, r.image_url, r.created_at, r.updated_at";

/// Validated fields for a new recipe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipe {
    /// Title
    pub title: String,
    /// Description, possibly empty
    pub description: String,
    /// Preparation time in minutes
    pub time_minutes: i64,
    /// Price, already rescaled to two fractional digits
    pub price: Decimal,
    /// Optional external link
    pub link: Option<String>,
    /// Tag names to get-or-create and attach
    pub tags: Vec<String>,
    /// Ingredient names to get-or-create and attach, in order
    pub ingredients: Vec<String>,
}

/// Validated changes to an existing recipe; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeChanges {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New preparation time
    pub time_minutes: Option<i64>,
    /// New price
    pub price: Option<Decimal>,
    /// New link; an empty string clears it
    pub link: Option<String>,
    /// Replacement tag set; `Some(vec![])` clears it
    pub tags: Option<Vec<String>>,
    /// Replacement ingredient list; `Some(vec![])` clears it
    pub ingredients: Option<Vec<String>>,
}

/// A recipe together with its related tags and ingredients
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeRecord {
    /// The recipe row
    pub recipe: Recipe,
    /// Attached tags, name ascending
    pub tags: Vec<Tag>,
    /// Attached ingredients, in the order they were given
    pub ingredients: Vec<Ingredient>,
}

/// Recipe persistence
#[derive(Clone, Debug)]
pub struct RecipesManager {
    pool: SqlitePool,
}

impl RecipesManager {
    /// Create a manager over the shared pool
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List the owner's recipes matching `filter`, newest first.
    ///
    /// Ties on `created_at` are broken by id descending. Within a filter
    /// dimension any listed id matches; both dimensions must match when both
    /// are given. Each dimension binds as a single JSON array, so the length
    /// of an id list never reaches the statement's variable limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list(&self, user_id: Uuid, filter: &RecipeFilter) -> AppResult<Vec<RecipeRecord>> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.user_id = "));
        query.push_bind(user_id.to_string());

        if !filter.tag_ids.is_empty() {
            query.push(
                " AND EXISTS (SELECT 1 FROM recipe_tags rt WHERE rt.recipe_id = r.id AND rt.tag_id IN (",
            );
            push_id_array(&mut query, &filter.tag_ids)?;
            query.push("))");
        }

        if !filter.ingredient_ids.is_empty() {
            query.push(
                " AND EXISTS (SELECT 1 FROM recipe_ingredients ri WHERE ri.recipe_id = r.id AND ri.ingredient_id IN (",
            );
            push_id_array(&mut query, &filter.ingredient_ids)?;
            query.push("))");
        }

        query.push(" ORDER BY r.created_at DESC, r.id DESC");

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database_error("Failed to list recipes", e))?;

        let recipes = rows
            .iter()
            .map(row_to_recipe)
            .collect::<AppResult<Vec<_>>>()?;

        self.with_relations(recipes).await
    }

    /// Get one of the owner's recipes with its relations
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get(&self, recipe_id: i64, user_id: Uuid) -> AppResult<Option<RecipeRecord>> {
        let query = format!("SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.id = $1 AND r.user_id = $2");
        let row = sqlx::query(&query)
            .bind(recipe_id)
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("Failed to get recipe", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let recipe = row_to_recipe(&row)?;
        Ok(self.with_relations(vec![recipe]).await?.pop())
    }

    /// Insert a recipe, get-or-creating its tags and ingredients, in one
    /// transaction
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad relation names, or a database error
    pub async fn create(&self, user_id: Uuid, new: &NewRecipe) -> AppResult<RecipeRecord> {
        let now = format_timestamp(Utc::now());
        let mut tx = begin_write(&self.pool).await?;

        let recipe_id = sqlx::query(
            r"
            INSERT INTO recipes (user_id, title, description, time_minutes, price, link, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            ",
        )
        .bind(user_id.to_string())
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.time_minutes)
        .bind(new.price.to_string())
        .bind(&new.link)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| database_error("Failed to create recipe", e))?
        .last_insert_rowid();

        attach_tags(&mut tx, recipe_id, user_id, &new.tags).await?;
        attach_ingredients(&mut tx, recipe_id, user_id, &new.ingredients).await?;

        tx.commit()
            .await
            .map_err(|e| database_error("Failed to commit recipe", e))?;

        self.get(recipe_id, user_id)
            .await?
            .ok_or_else(|| AppError::internal(format!("Recipe {recipe_id} missing after insert")))
    }

    /// Apply changes to one of the owner's recipes.
    ///
    /// Returns `None` when the recipe does not exist for this owner.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad relation names, or a database error
    pub async fn update(
        &self,
        recipe_id: i64,
        user_id: Uuid,
        changes: &RecipeChanges,
    ) -> AppResult<Option<RecipeRecord>> {
        let mut tx = begin_write(&self.pool).await?;

        let query = format!("SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.id = $1 AND r.user_id = $2");
        let current = sqlx::query(&query)
            .bind(recipe_id)
            .bind(user_id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| database_error("Failed to load recipe", e))?;
        let Some(current) = current else {
            return Ok(None);
        };
        let current = row_to_recipe(&current)?;

        sqlx::query(
            r"
            UPDATE recipes
            SET title = $1, description = $2, time_minutes = $3, price = $4, link = $5, updated_at = $6
            WHERE id = $7 AND user_id = $8
            ",
        )
        .bind(changes.title.as_ref().unwrap_or(&current.title))
        .bind(changes.description.as_ref().unwrap_or(&current.description))
        .bind(changes.time_minutes.unwrap_or(current.time_minutes))
        .bind(changes.price.unwrap_or(current.price).to_string())
        .bind(match &changes.link {
            Some(link) if link.is_empty() => None,
            Some(link) => Some(link.clone()),
            None => current.link,
        })
        .bind(format_timestamp(Utc::now()))
        .bind(recipe_id)
        .bind(user_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| database_error("Failed to update recipe", e))?;

        if let Some(tags) = &changes.tags {
            sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
                .bind(recipe_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| database_error("Failed to clear recipe tags", e))?;
            attach_tags(&mut tx, recipe_id, user_id, tags).await?;
        }

        if let Some(ingredients) = &changes.ingredients {
            sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
                .bind(recipe_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| database_error("Failed to clear recipe ingredients", e))?;
            attach_ingredients(&mut tx, recipe_id, user_id, ingredients).await?;
        }

        tx.commit()
            .await
            .map_err(|e| database_error("Failed to commit recipe update", e))?;

        self.get(recipe_id, user_id).await
    }

    /// Delete one of the owner's recipes; relation rows cascade
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn delete(&self, recipe_id: i64, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
            .bind(recipe_id)
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("Failed to delete recipe", e))?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether the owner has a recipe with this id
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn exists(&self, recipe_id: i64, user_id: Uuid) -> AppResult<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT id FROM recipes WHERE id = $1 AND user_id = $2")
                .bind(recipe_id)
                .bind(user_id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| database_error("Failed to check recipe", e))?;
        Ok(found.is_some())
    }

    /// Replace the recipe's image reference.
    ///
    /// Returns `None` when the recipe does not exist for this owner,
    /// otherwise the reference that was replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn replace_image(
        &self,
        recipe_id: i64,
        user_id: Uuid,
        image: &ImageRef,
    ) -> AppResult<Option<ImageSwap>> {
        let mut tx = begin_write(&self.pool).await?;

        let previous =
            sqlx::query("SELECT image_key, image_url FROM recipes WHERE id = $1 AND user_id = $2")
                .bind(recipe_id)
                .bind(user_id.to_string())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| database_error("Failed to load recipe image", e))?;

        let Some(previous) = previous else {
            return Ok(None);
        };

        sqlx::query(
            r"
            UPDATE recipes SET image_key = $1, image_url = $2, updated_at = $3
            WHERE id = $4 AND user_id = $5
            ",
        )
        .bind(&image.key)
        .bind(&image.url)
        .bind(format_timestamp(Utc::now()))
        .bind(recipe_id)
        .bind(user_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| database_error("Failed to update recipe image", e))?;

        tx.commit()
            .await
            .map_err(|e| database_error("Failed to commit recipe image", e))?;

        Ok(Some(ImageSwap {
            previous: ImageRef::from_columns(previous.get("image_key"), previous.get("image_url")),
        }))
    }

    /// Load tags and ingredients for a batch of recipes, preserving order
    async fn with_relations(&self, recipes: Vec<Recipe>) -> AppResult<Vec<RecipeRecord>> {
        if recipes.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = recipes.iter().map(|r| r.id).collect();

        let mut tags_query: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT rt.recipe_id, t.id, t.user_id, t.name, t.created_at
             FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id
             WHERE rt.recipe_id IN (",
        );
        push_id_array(&mut tags_query, &ids)?;
        tags_query.push(") ORDER BY t.name ASC, t.id ASC");
        let tag_rows = tags_query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database_error("Failed to load recipe tags", e))?;

        let mut tags: HashMap<i64, Vec<Tag>> = HashMap::new();
        for row in &tag_rows {
            tags.entry(row.get("recipe_id"))
                .or_default()
                .push(row_to_tag(row)?);
        }

        let mut ingredients_query: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT ri.recipe_id, i.id, i.user_id, i.name, i.image_key, i.image_url,
                    i.created_at, i.updated_at
             FROM recipe_ingredients ri JOIN ingredients i ON i.id = ri.ingredient_id
             WHERE ri.recipe_id IN (",
        );
        push_id_array(&mut ingredients_query, &ids)?;
        ingredients_query.push(") ORDER BY ri.position ASC");
        let ingredient_rows = ingredients_query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database_error("Failed to load recipe ingredients", e))?;

        let mut ingredients: HashMap<i64, Vec<Ingredient>> = HashMap::new();
        for row in &ingredient_rows {
            ingredients
                .entry(row.get("recipe_id"))
                .or_default()
                .push(row_to_ingredient(row)?);
        }

        Ok(recipes
            .into_iter()
            .map(|recipe| RecipeRecord {
                tags: tags.remove(&recipe.id).unwrap_or_default(),
                ingredients: ingredients.remove(&recipe.id).unwrap_or_default(),
                recipe,
            })
            .collect())
    }
}

/// Push `SELECT value FROM json_each(?)` with the ids bound as one JSON array
fn push_id_array<'a, I>(query: &mut QueryBuilder<'_, Sqlite>, ids: I) -> AppResult<()>
where
    I: IntoIterator<Item = &'a i64>,
{
    let ids: Vec<i64> = ids.into_iter().copied().collect();
    query.push("SELECT value FROM json_each(");
    query.push_bind(serde_json::to_string(&ids)?);
    query.push(")");
    Ok(())
}

/// Resolve names to the owner's entity ids, keeping first-occurrence order
/// and collapsing names that normalize to the same key
async fn resolve_names(
    conn: &mut SqliteConnection,
    table: NamedTable,
    user_id: Uuid,
    names: &[String],
) -> AppResult<Vec<i64>> {
    let mut seen = HashSet::new();
    let mut ids = Vec::with_capacity(names.len());
    for raw in names {
        let (name, normalized) = named::prepare_name(raw, MAX_NAME_LEN)?;
        if !seen.insert(normalized.clone()) {
            continue;
        }
        let (id, _) = named::get_or_create_id(conn, table, user_id, &name, &normalized).await?;
        ids.push(id);
    }
    Ok(ids)
}

async fn attach_tags(
    conn: &mut SqliteConnection,
    recipe_id: i64,
    user_id: Uuid,
    names: &[String],
) -> AppResult<()> {
    for tag_id in resolve_names(conn, NamedTable::Tags, user_id, names).await? {
        sqlx::query("INSERT OR IGNORE INTO recipe_tags (recipe_id, tag_id) VALUES ($1, $2)")
            .bind(recipe_id)
            .bind(tag_id)
            .execute(&mut *conn)
            .await
            .map_err(|e| database_error("Failed to attach tag", e))?;
    }
    Ok(())
}

async fn attach_ingredients(
    conn: &mut SqliteConnection,
    recipe_id: i64,
    user_id: Uuid,
    names: &[String],
) -> AppResult<()> {
    let ids = resolve_names(conn, NamedTable::Ingredients, user_id, names).await?;
    for (position, ingredient_id) in (0_i64..).zip(ids) {
        sqlx::query(
            "INSERT OR IGNORE INTO recipe_ingredients (recipe_id, ingredient_id, position) VALUES ($1, $2, $3)",
        )
        .bind(recipe_id)
        .bind(ingredient_id)
        .bind(position)
        .execute(&mut *conn)
        .await
        .map_err(|e| database_error("Failed to attach ingredient", e))?;
    }
    Ok(())
}

fn row_to_recipe(row: &SqliteRow) -> AppResult<Recipe> {
    let user_id: String = row.get("user_id");
    let price: String = row.get("price");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");
    Ok(Recipe {
        id: row.get("id"),
        user_id: parse_uuid(&user_id)?,
        title: row.get("title"),
        description: row.get("description"),
        time_minutes: row.get("time_minutes"),
        price: Decimal::from_str(&price)
            .map_err(|e| AppError::database(format!("Invalid stored price '{price}': {e}")))?,
        link: row.get("link"),
        image: ImageRef::from_columns(row.get("image_key"), row.get("image_url")),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}
