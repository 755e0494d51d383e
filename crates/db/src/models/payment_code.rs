//! Payment code model and DTOs.

use agency_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `payment_codes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PaymentCode {
    pub id: DbId,
    pub code: String,
    pub amount_cents: Cents,
    pub description: Option<String>,
    pub is_used: bool,
    pub used_by_email: Option<String>,
    pub used_by_name: Option<String>,
    pub payment_ref: Option<String>,
    pub used_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePaymentCode {
    pub code: String,
    pub amount_cents: Cents,
    pub description: Option<String>,
}

/// Who redeemed a code, as reported by the checkout provider.
#[derive(Debug, Clone, Default)]
pub struct Redemption {
    pub email: Option<String>,
    pub name: Option<String>,
    pub payment_ref: String,
}
