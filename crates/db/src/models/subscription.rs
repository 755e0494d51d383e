//! Maintenance subscription model and DTOs.

use agency_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscription {
    pub id: DbId,
    pub user_id: DbId,
    pub subscription_ref: String,
    pub customer_ref: Option<String>,
    pub plan_type: String,
    pub amount_cents: Cents,
    pub status: String,
    pub current_period_start: Option<Timestamp>,
    pub current_period_end: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Subscription joined with its owner for the admin list.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SubscriptionWithUser {
    pub id: DbId,
    pub user_id: DbId,
    pub subscription_ref: String,
    pub plan_type: String,
    pub amount_cents: Cents,
    pub status: String,
    pub current_period_end: Option<Timestamp>,
    pub created_at: Timestamp,
    pub user_email: String,
    pub user_name: String,
}

/// Insert-or-refresh payload keyed by `subscription_ref`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertSubscription {
    pub user_id: DbId,
    pub subscription_ref: String,
    pub customer_ref: Option<String>,
    pub plan_type: String,
    pub amount_cents: Cents,
    pub status: String,
    pub current_period_start: Option<Timestamp>,
    pub current_period_end: Option<Timestamp>,
}
