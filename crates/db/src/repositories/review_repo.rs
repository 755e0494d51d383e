//! Repository for the `reviews` table.

use agency_core::types::DbId;
use sqlx::PgPool;

use crate::models::review::{CreateReview, Review, ReviewWithAuthor};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, rating, comment, is_approved, created_at, updated_at";

/// Provides CRUD operations for reviews.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Insert a new (unapproved) review, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateReview) -> Result<Review, sqlx::Error> {
        let query = format!(
            "INSERT INTO reviews (user_id, rating, comment)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(input.user_id)
            .bind(input.rating)
            .bind(&input.comment)
            .fetch_one(pool)
            .await
    }

    /// List all reviews, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Review>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reviews ORDER BY created_at DESC");
        sqlx::query_as::<_, Review>(&query).fetch_all(pool).await
    }

    /// List one user's reviews, newest first.
    pub async fn list_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Review>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM reviews WHERE user_id = $1 ORDER BY created_at DESC");
        sqlx::query_as::<_, Review>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Approved reviews with the author's display name (or username) and avatar.
    pub async fn list_approved_with_authors(
        pool: &PgPool,
    ) -> Result<Vec<ReviewWithAuthor>, sqlx::Error> {
        sqlx::query_as::<_, ReviewWithAuthor>(
            "SELECT r.id, r.rating, r.comment, r.created_at,
                    COALESCE(u.display_name, u.username) AS author_name,
                    u.avatar_url AS author_avatar
             FROM reviews r
             JOIN users u ON u.id = r.user_id
             WHERE r.is_approved = true
             ORDER BY r.created_at DESC",
        )
        .fetch_all(pool)
        .await
    }

    /// Mark a review approved. Returns `None` if no row with the given `id` exists.
    pub async fn approve(pool: &PgPool, id: DbId) -> Result<Option<Review>, sqlx::Error> {
        let query =
            format!("UPDATE reviews SET is_approved = true WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a review by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
