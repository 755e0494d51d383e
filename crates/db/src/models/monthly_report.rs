//! Monthly report model.

use agency_core::types::{Cents, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MonthlyReport {
    pub id: DbId,
    pub year: i32,
    pub month: i32,
    pub total_revenue_cents: Cents,
    pub total_clients: i64,
    pub active_subscriptions: i64,
    pub past_due_subscriptions: i64,
    pub new_quotes: i64,
    pub completed_projects: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
