//! Repository for the `payments` table.

use agency_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::payment::{CreatePayment, Payment};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, payment_ref, amount_cents, currency, status, \
                        payment_type, payment_code_id, created_at, updated_at";

/// Provides CRUD operations for the payment ledger.
pub struct PaymentRepo;

impl PaymentRepo {
    /// Insert a payment. Accepts a pool or an open transaction.
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        input: &CreatePayment,
    ) -> Result<Payment, sqlx::Error> {
        let query = format!(
            "INSERT INTO payments (user_id, payment_ref, amount_cents, currency, status,
                                   payment_type, payment_code_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(input.user_id)
            .bind(&input.payment_ref)
            .bind(input.amount_cents)
            .bind(input.currency())
            .bind(&input.status)
            .bind(&input.payment_type)
            .bind(input.payment_code_id)
            .fetch_one(executor)
            .await
    }

    /// Insert a provider charge unless one with the same `payment_ref` exists.
    ///
    /// Relies on the partial unique index `uq_payments_payment_ref`, so concurrent
    /// redeliveries of one charge record it once. Returns `None` for a duplicate.
    /// Code payments are outside the index and must go through
    /// [`PaymentCodeRepo::redeem`](super::PaymentCodeRepo::redeem).
    pub async fn create_once(
        pool: &PgPool,
        input: &CreatePayment,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!(
            "INSERT INTO payments (user_id, payment_ref, amount_cents, currency, status,
                                   payment_type, payment_code_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (payment_ref) WHERE payment_type <> 'code_payment' DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(input.user_id)
            .bind(&input.payment_ref)
            .bind(input.amount_cents)
            .bind(input.currency())
            .bind(&input.status)
            .bind(&input.payment_type)
            .bind(input.payment_code_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a payment by the provider's reference.
    pub async fn find_by_ref(
        pool: &PgPool,
        payment_ref: &str,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payments WHERE payment_ref = $1 LIMIT 1");
        sqlx::query_as::<_, Payment>(&query)
            .bind(payment_ref)
            .fetch_optional(pool)
            .await
    }

    /// List all payments, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Payment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payments ORDER BY created_at DESC");
        sqlx::query_as::<_, Payment>(&query).fetch_all(pool).await
    }

    pub async fn list_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Payment>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM payments WHERE user_id = $1 ORDER BY created_at DESC");
        sqlx::query_as::<_, Payment>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Set a payment's status. Returns `None` if no row with the given `id` exists.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!("UPDATE payments SET status = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }
}
