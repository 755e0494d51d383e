//! Payment ledger model and DTOs.

use agency_core::payment::DEFAULT_CURRENCY;
use agency_core::stats::PaymentFact;
use agency_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Payment {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub payment_ref: String,
    pub amount_cents: Cents,
    pub currency: String,
    pub status: String,
    pub payment_type: String,
    pub payment_code_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Payment {
    pub fn fact(&self) -> PaymentFact {
        PaymentFact {
            user_id: self.user_id,
            amount_cents: self.amount_cents,
            status: self.status.clone(),
            payment_type: self.payment_type.clone(),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePayment {
    pub user_id: Option<DbId>,
    pub payment_ref: String,
    pub amount_cents: Cents,
    /// Defaults to `EUR` if omitted.
    pub currency: Option<String>,
    pub status: String,
    pub payment_type: String,
    pub payment_code_id: Option<DbId>,
}

impl CreatePayment {
    pub fn currency(&self) -> &str {
        self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY)
    }
}
