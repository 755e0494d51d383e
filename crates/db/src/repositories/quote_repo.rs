//! Repository for the `quotes` table.

use agency_core::types::DbId;
use sqlx::PgPool;

use crate::models::quote::{CreateQuote, Quote};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, first_name, last_name, email, phone, country_code, \
                        service_type, business_segment, additionals, project_description, \
                        status, created_at, updated_at";

/// Provides CRUD operations for quote requests.
pub struct QuoteRepo;

impl QuoteRepo {
    /// Insert a new quote with status `pending`, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateQuote) -> Result<Quote, sqlx::Error> {
        let query = format!(
            "INSERT INTO quotes (user_id, first_name, last_name, email, phone, country_code,
                                 service_type, business_segment, additionals, project_description,
                                 status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'pending')
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Quote>(&query)
            .bind(input.user_id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.country_code)
            .bind(&input.service_type)
            .bind(&input.business_segment)
            .bind(&input.additionals)
            .bind(&input.project_description)
            .fetch_one(pool)
            .await
    }

    /// Find a quote by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Quote>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM quotes WHERE id = $1");
        sqlx::query_as::<_, Quote>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all quotes, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Quote>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM quotes ORDER BY created_at DESC");
        sqlx::query_as::<_, Quote>(&query).fetch_all(pool).await
    }

    /// List a user's quotes, newest first.
    pub async fn list_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Quote>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM quotes WHERE user_id = $1 ORDER BY created_at DESC");
        sqlx::query_as::<_, Quote>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Set a quote's status. Returns `None` if no row with the given `id` exists.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<Quote>, sqlx::Error> {
        let query = format!("UPDATE quotes SET status = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Quote>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }
}
