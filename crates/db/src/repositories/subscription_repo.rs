//! Repository for the `subscriptions` table.

use agency_core::types::DbId;
use sqlx::PgPool;

use crate::models::subscription::{Subscription, SubscriptionWithUser, UpsertSubscription};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, subscription_ref, customer_ref, plan_type, amount_cents, \
                        status, current_period_start, current_period_end, created_at, updated_at";

/// Provides CRUD operations for maintenance subscriptions.
pub struct SubscriptionRepo;

impl SubscriptionRepo {
    /// Insert a subscription or refresh the existing row with the same reference.
    pub async fn upsert_by_ref(
        pool: &PgPool,
        input: &UpsertSubscription,
    ) -> Result<Subscription, sqlx::Error> {
        let query = format!(
            "INSERT INTO subscriptions (user_id, subscription_ref, customer_ref, plan_type,
                                        amount_cents, status, current_period_start,
                                        current_period_end)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT ON CONSTRAINT uq_subscriptions_subscription_ref DO UPDATE SET
                customer_ref = COALESCE(EXCLUDED.customer_ref, subscriptions.customer_ref),
                plan_type = EXCLUDED.plan_type,
                amount_cents = EXCLUDED.amount_cents,
                status = EXCLUDED.status,
                current_period_start = COALESCE(EXCLUDED.current_period_start,
                                                subscriptions.current_period_start),
                current_period_end = COALESCE(EXCLUDED.current_period_end,
                                              subscriptions.current_period_end)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(input.user_id)
            .bind(&input.subscription_ref)
            .bind(&input.customer_ref)
            .bind(&input.plan_type)
            .bind(input.amount_cents)
            .bind(&input.status)
            .bind(input.current_period_start)
            .bind(input.current_period_end)
            .fetch_one(pool)
            .await
    }

    /// List all subscriptions, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Subscription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscriptions ORDER BY created_at DESC");
        sqlx::query_as::<_, Subscription>(&query).fetch_all(pool).await
    }

    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<Subscription>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM subscriptions WHERE user_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Admin list joined with the owner's e-mail and display name.
    pub async fn list_with_users(pool: &PgPool) -> Result<Vec<SubscriptionWithUser>, sqlx::Error> {
        sqlx::query_as::<_, SubscriptionWithUser>(
            "SELECT s.id, s.user_id, s.subscription_ref, s.plan_type, s.amount_cents, s.status,
                    s.current_period_end, s.created_at,
                    u.email AS user_email,
                    COALESCE(u.display_name, u.username) AS user_name
             FROM subscriptions s
             JOIN users u ON u.id = s.user_id
             ORDER BY s.created_at DESC",
        )
        .fetch_all(pool)
        .await
    }

    /// Set a subscription's status. Returns `None` if no row with the given `id` exists.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query =
            format!("UPDATE subscriptions SET status = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Subscription>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Set the status of the subscription with the provider's reference.
    pub async fn update_status_by_ref(
        pool: &PgPool,
        subscription_ref: &str,
        status: &str,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!(
            "UPDATE subscriptions SET status = $2 WHERE subscription_ref = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(subscription_ref)
            .bind(status)
            .fetch_optional(pool)
            .await
    }
}
