//! Database query functions for the `categories` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Category;

/// List categories visible to a user: shared defaults plus their own.
pub async fn list_visible(pool: &PgPool, user_id: Uuid) -> Result<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT * FROM categories \
         WHERE user_id IS NULL OR user_id = $1 \
         ORDER BY name ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("failed to list categories")?;

    Ok(categories)
}

/// Insert a category, scoped to a user when `user_id` is set and shared
/// otherwise. Fails if the name is already taken.
pub async fn insert_category(
    pool: &PgPool,
    user_id: Option<Uuid>,
    name: &str,
    color: &str,
) -> Result<Category> {
    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (name, color, user_id) \
         VALUES ($1, $2, $3) \
         RETURNING *",
    )
    .bind(name)
    .bind(color)
    .bind(user_id)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert category {name:?}"))?;

    Ok(category)
}
