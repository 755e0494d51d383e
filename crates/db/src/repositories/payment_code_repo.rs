//! Repository for the `payment_codes` table.

use agency_core::payment::{PaymentStatus, PaymentType};
use agency_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::payment::{CreatePayment, Payment};
use crate::models::payment_code::{CreatePaymentCode, PaymentCode, Redemption};
use crate::repositories::PaymentRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, code, amount_cents, description, is_used, used_by_email, \
                        used_by_name, payment_ref, used_at, created_at, updated_at";

/// Provides CRUD operations for payment codes.
pub struct PaymentCodeRepo;

impl PaymentCodeRepo {
    /// Insert a new unused code, returning the created row.
    ///
    /// A duplicate `code` fails with a unique violation on `uq_payment_codes_code`.
    pub async fn create(
        pool: &PgPool,
        input: &CreatePaymentCode,
    ) -> Result<PaymentCode, sqlx::Error> {
        let query = format!(
            "INSERT INTO payment_codes (code, amount_cents, description)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PaymentCode>(&query)
            .bind(&input.code)
            .bind(input.amount_cents)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_code(
        pool: &PgPool,
        code: &str,
    ) -> Result<Option<PaymentCode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payment_codes WHERE code = $1");
        sqlx::query_as::<_, PaymentCode>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// List all codes, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<PaymentCode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payment_codes ORDER BY created_at DESC");
        sqlx::query_as::<_, PaymentCode>(&query).fetch_all(pool).await
    }

    /// List redeemed codes, most recently used first.
    pub async fn list_used(pool: &PgPool) -> Result<Vec<PaymentCode>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM payment_codes WHERE is_used = true
             ORDER BY used_at DESC NULLS LAST"
        );
        sqlx::query_as::<_, PaymentCode>(&query).fetch_all(pool).await
    }

    /// Redeem a code.
    ///
    /// The update only matches an unused code, so concurrent webhook deliveries
    /// redeem it at most once. Returns `None` when the code is unknown or already used.
    pub async fn mark_used<'e, E: PgExecutor<'e>>(
        executor: E,
        code: &str,
        redemption: &Redemption,
    ) -> Result<Option<PaymentCode>, sqlx::Error> {
        let query = format!(
            "UPDATE payment_codes SET
                is_used = true,
                used_by_email = $2,
                used_by_name = $3,
                payment_ref = $4,
                used_at = NOW()
             WHERE code = $1 AND is_used = false
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PaymentCode>(&query)
            .bind(code)
            .bind(&redemption.email)
            .bind(&redemption.name)
            .bind(&redemption.payment_ref)
            .fetch_optional(executor)
            .await
    }

    /// Redeem a code and record its succeeded `code_payment` in one transaction.
    ///
    /// If the payment insert fails the code stays unused, so a redelivered
    /// webhook can redeem it again. Returns `None` when the code is unknown or
    /// already used.
    pub async fn redeem(
        pool: &PgPool,
        code: &str,
        redemption: &Redemption,
        payer_id: Option<DbId>,
    ) -> Result<Option<(PaymentCode, Payment)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(redeemed) = Self::mark_used(&mut *tx, code, redemption).await? else {
            return Ok(None);
        };
        let payment = PaymentRepo::create(
            &mut *tx,
            &CreatePayment {
                user_id: payer_id,
                payment_ref: redemption.payment_ref.clone(),
                amount_cents: redeemed.amount_cents,
                currency: None,
                status: PaymentStatus::Succeeded.as_str().to_string(),
                payment_type: PaymentType::CodePayment.as_str().to_string(),
                payment_code_id: Some(redeemed.id),
            },
        )
        .await?;

        tx.commit().await?;
        Ok(Some((redeemed, payment)))
    }

    /// Delete a code by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM payment_codes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
