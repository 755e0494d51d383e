//! Monthly report snapshot.
//!
//! Revenue, clients and quotes are computed for the given month. Subscription
//! counts reflect the statuses at snapshot time since status history is not kept.

use serde::Serialize;

use crate::quote::QuoteStatus;
use crate::stats::{clients_in, revenue_in, PaymentFact, QuoteFact, YearMonth};
use crate::subscription::SubscriptionStatus;
use crate::types::Cents;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlySnapshot {
    pub year: i32,
    pub month: u32,
    pub total_revenue_cents: Cents,
    pub total_clients: i64,
    pub active_subscriptions: i64,
    pub past_due_subscriptions: i64,
    pub new_quotes: i64,
    /// Quotes created in the month that are now completed.
    pub completed_projects: i64,
}

pub fn monthly_snapshot(
    month: YearMonth,
    payments: &[PaymentFact],
    quotes: &[QuoteFact],
    subscription_statuses: &[String],
) -> MonthlySnapshot {
    let sub_count = |wanted: SubscriptionStatus| {
        subscription_statuses
            .iter()
            .filter(|s| SubscriptionStatus::parse(s).ok() == Some(wanted))
            .count() as i64
    };
    let in_month: Vec<&QuoteFact> = quotes
        .iter()
        .filter(|q| month.contains(q.created_at))
        .collect();

    MonthlySnapshot {
        year: month.year,
        month: month.month,
        total_revenue_cents: revenue_in(payments, month),
        total_clients: clients_in(payments, month),
        active_subscriptions: sub_count(SubscriptionStatus::Active),
        past_due_subscriptions: sub_count(SubscriptionStatus::PastDue),
        new_quotes: in_month.len() as i64,
        completed_projects: in_month
            .iter()
            .filter(|q| QuoteStatus::parse(&q.status).ok() == Some(QuoteStatus::Completed))
            .count() as i64,
    }
}
