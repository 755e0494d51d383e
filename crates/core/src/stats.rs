//! Admin dashboard statistics.
//!
//! Pure aggregation over rows the API layer has already loaded. Revenue only
//! counts payments with status `succeeded`; months are calendar months in UTC.

use std::collections::HashSet;

use chrono::Datelike;
use serde::Serialize;

use crate::payment::{PaymentStatus, PaymentType};
use crate::quote::{QuoteStatus, ServiceType};
use crate::subscription::SubscriptionStatus;
use crate::types::{Cents, DbId, Timestamp};

/// Number of months shown in the revenue chart.
pub const MONTHLY_SERIES_LEN: i32 = 6;

/// Short Portuguese month names used as chart labels.
const MONTH_LABELS: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

// ---------------------------------------------------------------------------
// Calendar month
// ---------------------------------------------------------------------------

/// A calendar month (`month` is 1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Build a month, returning `None` when `month` is outside 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The month a timestamp falls in.
    pub fn of(ts: Timestamp) -> Self {
        Self {
            year: ts.year(),
            month: ts.month(),
        }
    }

    /// Move forwards (positive) or backwards (negative) by whole months.
    pub fn shift(self, delta: i32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) + delta;
        Self {
            year: index.div_euclid(12),
            month: (index.rem_euclid(12) + 1) as u32,
        }
    }

    pub fn previous(self) -> Self {
        self.shift(-1)
    }

    pub fn contains(self, ts: Timestamp) -> bool {
        Self::of(ts) == self
    }

    pub fn label(self) -> &'static str {
        MONTH_LABELS[(self.month - 1) as usize]
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// The slice of a payment row the aggregation needs.
#[derive(Debug, Clone)]
pub struct PaymentFact {
    pub user_id: Option<DbId>,
    pub amount_cents: Cents,
    pub status: String,
    pub payment_type: String,
    pub created_at: Timestamp,
}

impl PaymentFact {
    fn succeeded(&self) -> bool {
        PaymentStatus::parse(&self.status) == Some(PaymentStatus::Succeeded)
    }
}

#[derive(Debug, Clone)]
pub struct QuoteFact {
    pub status: String,
    pub service_type: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct ReviewFact {
    pub rating: i32,
    pub is_approved: bool,
}

/// Everything [`dashboard_stats`] aggregates over.
#[derive(Debug, Clone, Copy)]
pub struct StatsInput<'a> {
    pub total_users: i64,
    pub payments: &'a [PaymentFact],
    pub quotes: &'a [QuoteFact],
    pub reviews: &'a [ReviewFact],
    pub subscription_statuses: &'a [String],
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RevenueByService {
    pub site: Cents,
    pub app: Cents,
    pub code: Cents,
    pub custom: Cents,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuotesByService {
    pub website: i64,
    pub app: i64,
}

/// One bar of the monthly chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPoint {
    pub year: i32,
    pub month: u32,
    pub label: &'static str,
    pub revenue_cents: Cents,
    /// Distinct identified users with a succeeded payment in the month.
    pub clients: i64,
    pub new_quotes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_quotes: i64,
    pub pending_quotes: i64,
    pub completed_quotes: i64,
    pub active_subscriptions: i64,
    pub past_due_subscriptions: i64,
    pub total_revenue_cents: Cents,
    pub current_month_revenue_cents: Cents,
    pub last_month_revenue_cents: Cents,
    /// Month-over-month change in percent; `0.0` when last month had no revenue.
    pub revenue_change_pct: f64,
    pub revenue_by_service: RevenueByService,
    pub quotes_by_service: QuotesByService,
    pub monthly: Vec<MonthlyPoint>,
    pub average_rating: f64,
    pub total_reviews: i64,
    pub approved_reviews: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewTrends {
    /// Counts for ratings 1 through 5 (index 0 is one star).
    pub rating_distribution: [i64; 5],
    pub average_rating: f64,
    pub total_reviews: i64,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Sum of succeeded payments in `month`.
pub fn revenue_in(payments: &[PaymentFact], month: YearMonth) -> Cents {
    payments
        .iter()
        .filter(|p| p.succeeded() && month.contains(p.created_at))
        .map(|p| p.amount_cents)
        .sum()
}

/// Distinct identified payers in `month`. Anonymous (code) payments are not clients.
pub fn clients_in(payments: &[PaymentFact], month: YearMonth) -> i64 {
    payments
        .iter()
        .filter(|p| p.succeeded() && month.contains(p.created_at))
        .filter_map(|p| p.user_id)
        .collect::<HashSet<_>>()
        .len() as i64
}

/// Percentage change from `previous` to `current`.
pub fn percent_change(current: Cents, previous: Cents) -> f64 {
    if previous > 0 {
        (current - previous) as f64 / previous as f64 * 100.0
    } else {
        0.0
    }
}

/// Mean rating, `0.0` for no reviews.
pub fn average_rating(ratings: impl IntoIterator<Item = i32>) -> f64 {
    let (sum, count) = ratings
        .into_iter()
        .fold((0i64, 0i64), |(s, c), r| (s + i64::from(r), c + 1));
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

fn revenue_by_service(payments: &[PaymentFact]) -> RevenueByService {
    let mut out = RevenueByService::default();
    for p in payments.iter().filter(|p| p.succeeded()) {
        match PaymentType::parse(&p.payment_type) {
            Some(PaymentType::MaintenanceSite) => out.site += p.amount_cents,
            Some(PaymentType::MaintenanceApp) => out.app += p.amount_cents,
            Some(PaymentType::CodePayment) => out.code += p.amount_cents,
            Some(PaymentType::Custom) => out.custom += p.amount_cents,
            None => {}
        }
    }
    out
}

fn quotes_by_service(quotes: &[QuoteFact]) -> QuotesByService {
    let mut out = QuotesByService::default();
    for q in quotes {
        match ServiceType::parse(&q.service_type) {
            Some(ServiceType::Website) => out.website += 1,
            Some(ServiceType::App) => out.app += 1,
            None => {}
        }
    }
    out
}

fn count_status<T>(items: &[T], status: impl Fn(&T) -> bool) -> i64 {
    items.iter().filter(|i| status(i)).count() as i64
}

/// Compute the admin dashboard numbers as of `now`.
pub fn dashboard_stats(input: StatsInput<'_>, now: Timestamp) -> DashboardStats {
    let current = YearMonth::of(now);
    let last = current.previous();

    let quote_status = |q: &QuoteFact| QuoteStatus::parse(&q.status).ok();
    let sub_status = |s: &String| SubscriptionStatus::parse(s).ok();

    let total_revenue_cents = input
        .payments
        .iter()
        .filter(|p| p.succeeded())
        .map(|p| p.amount_cents)
        .sum();
    let current_month_revenue_cents = revenue_in(input.payments, current);
    let last_month_revenue_cents = revenue_in(input.payments, last);

    let monthly = (0..MONTHLY_SERIES_LEN)
        .rev()
        .map(|back| {
            let month = current.shift(-back);
            MonthlyPoint {
                year: month.year,
                month: month.month,
                label: month.label(),
                revenue_cents: revenue_in(input.payments, month),
                clients: clients_in(input.payments, month),
                new_quotes: count_status(input.quotes, |q| month.contains(q.created_at)),
            }
        })
        .collect();

    DashboardStats {
        total_users: input.total_users,
        total_quotes: input.quotes.len() as i64,
        pending_quotes: count_status(input.quotes, |q| {
            quote_status(q) == Some(QuoteStatus::Pending)
        }),
        completed_quotes: count_status(input.quotes, |q| {
            quote_status(q) == Some(QuoteStatus::Completed)
        }),
        active_subscriptions: count_status(input.subscription_statuses, |s| {
            sub_status(s) == Some(SubscriptionStatus::Active)
        }),
        past_due_subscriptions: count_status(input.subscription_statuses, |s| {
            sub_status(s) == Some(SubscriptionStatus::PastDue)
        }),
        total_revenue_cents,
        current_month_revenue_cents,
        last_month_revenue_cents,
        revenue_change_pct: percent_change(current_month_revenue_cents, last_month_revenue_cents),
        revenue_by_service: revenue_by_service(input.payments),
        quotes_by_service: quotes_by_service(input.quotes),
        monthly,
        average_rating: average_rating(input.reviews.iter().map(|r| r.rating)),
        total_reviews: input.reviews.len() as i64,
        approved_reviews: count_status(input.reviews, |r| r.is_approved),
    }
}

/// Rating distribution and average for the review-trends panel.
pub fn review_trends(reviews: &[ReviewFact]) -> ReviewTrends {
    let mut rating_distribution = [0i64; 5];
    for r in reviews {
        if (1..=5).contains(&r.rating) {
            rating_distribution[(r.rating - 1) as usize] += 1;
        }
    }
    ReviewTrends {
        rating_distribution,
        average_rating: average_rating(reviews.iter().map(|r| r.rating)),
        total_reviews: reviews.len() as i64,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
