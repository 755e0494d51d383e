//! Handlers for the `/admin` dashboard. Every route requires the admin role.

use agency_core::error::CoreError;
use agency_core::payment::PaymentStatus;
use agency_core::stats::{
    dashboard_stats, review_trends, DashboardStats, ReviewTrends, StatsInput, YearMonth,
};
use agency_core::subscription::SubscriptionStatus;
use agency_core::types::{DbId, Timestamp};
use agency_db::models::chat_message::ChatMessage;
use agency_db::models::monthly_report::MonthlyReport;
use agency_db::models::payment::Payment;
use agency_db::models::payment_code::PaymentCode;
use agency_db::models::review::Review;
use agency_db::models::subscription::{Subscription, SubscriptionWithUser};
use agency_db::repositories::{
    ChatMessageRepo, MonthlyReportRepo, PaymentCodeRepo, PaymentRepo, QuoteRepo, ReviewRepo,
    SubscriptionRepo, UserRepo,
};
use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::background::monthly_reports;
use crate::error::{AppError, AppResult};
use crate::handlers::auth::UserInfo;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// How many reviews the trends panel lists.
const RECENT_REVIEWS: usize = 10;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ReviewTrendsResponse {
    #[serde(flatten)]
    pub trends: ReviewTrends,
    pub recent_reviews: Vec<Review>,
}

#[derive(Debug, Serialize)]
pub struct AdminUser {
    #[serde(flatten)]
    pub info: UserInfo,
    pub created_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct SetAdminRequest {
    pub is_admin: bool,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/stats
pub async fn stats(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> AppResult<Json<DashboardStats>> {
    let total_users = UserRepo::count(&state.pool).await?;
    let payments: Vec<_> = PaymentRepo::list(&state.pool)
        .await?
        .iter()
        .map(|p| p.fact())
        .collect();
    let quotes: Vec<_> = QuoteRepo::list(&state.pool)
        .await?
        .iter()
        .map(|q| q.fact())
        .collect();
    let reviews: Vec<_> = ReviewRepo::list(&state.pool)
        .await?
        .iter()
        .map(|r| r.fact())
        .collect();
    let subscription_statuses: Vec<String> = SubscriptionRepo::list(&state.pool)
        .await?
        .into_iter()
        .map(|s| s.status)
        .collect();

    let input = StatsInput {
        total_users,
        payments: &payments,
        quotes: &quotes,
        reviews: &reviews,
        subscription_statuses: &subscription_statuses,
    };
    Ok(Json(dashboard_stats(input, Utc::now())))
}

/// GET /api/v1/admin/review-trends
pub async fn review_trends_panel(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> AppResult<Json<ReviewTrendsResponse>> {
    let mut reviews = ReviewRepo::list(&state.pool).await?;
    let facts: Vec<_> = reviews.iter().map(|r| r.fact()).collect();
    reviews.truncate(RECENT_REVIEWS);

    Ok(Json(ReviewTrendsResponse {
        trends: review_trends(&facts),
        recent_reviews: reviews,
    }))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/users
pub async fn users(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> AppResult<Json<Vec<AdminUser>>> {
    let admin_email = state.config.admin_email.as_deref();
    let users = UserRepo::list(&state.pool)
        .await?
        .iter()
        .map(|u| AdminUser {
            info: UserInfo::from_user(u, admin_email),
            created_at: u.created_at,
        })
        .collect();
    Ok(Json(users))
}

/// PATCH /api/v1/admin/users/{id}/admin
pub async fn set_user_admin(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<SetAdminRequest>,
) -> AppResult<Json<AdminUser>> {
    if id == admin.user_id && !input.is_admin {
        return Err(AppError::BadRequest(
            "Admins cannot remove their own admin role".into(),
        ));
    }
    let user = UserRepo::set_admin(&state.pool, id, input.is_admin)
        .await?
        .ok_or_else(|| CoreError::not_found("User", id))?;
    tracing::info!(user_id = id, is_admin = input.is_admin, "Admin flag changed");

    Ok(Json(AdminUser {
        info: UserInfo::from_user(&user, state.config.admin_email.as_deref()),
        created_at: user.created_at,
    }))
}

// ---------------------------------------------------------------------------
// Subscriptions and payments
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/subscriptions
pub async fn subscriptions(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> AppResult<Json<Vec<SubscriptionWithUser>>> {
    Ok(Json(SubscriptionRepo::list_with_users(&state.pool).await?))
}

/// PATCH /api/v1/admin/subscriptions/{id}/status
pub async fn update_subscription_status(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateStatusRequest>,
) -> AppResult<Json<Subscription>> {
    let status = SubscriptionStatus::parse(&input.status).map_err(CoreError::Validation)?;
    let sub = SubscriptionRepo::update_status(&state.pool, id, status.as_str())
        .await?
        .ok_or_else(|| CoreError::not_found("Subscription", id))?;
    Ok(Json(sub))
}

/// GET /api/v1/admin/payment-codes/used
pub async fn used_payment_codes(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> AppResult<Json<Vec<PaymentCode>>> {
    Ok(Json(PaymentCodeRepo::list_used(&state.pool).await?))
}

/// GET /api/v1/admin/payments
pub async fn payments(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> AppResult<Json<Vec<Payment>>> {
    Ok(Json(PaymentRepo::list(&state.pool).await?))
}

/// PATCH /api/v1/admin/payments/{id}/status
pub async fn update_payment_status(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateStatusRequest>,
) -> AppResult<Json<Payment>> {
    let status = PaymentStatus::parse(&input.status).ok_or_else(|| {
        CoreError::Validation(format!(
            "Invalid payment status '{}'. Must be one of: pending, succeeded, failed",
            input.status
        ))
    })?;
    let payment = PaymentRepo::update_status(&state.pool, id, status.as_str())
        .await?
        .ok_or_else(|| CoreError::not_found("Payment", id))?;
    Ok(Json(payment))
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/reports
pub async fn reports(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> AppResult<Json<Vec<MonthlyReport>>> {
    Ok(Json(MonthlyReportRepo::list(&state.pool).await?))
}

/// POST /api/v1/admin/reports/{year}/{month}
///
/// Recompute a month's snapshot from current data.
pub async fn regenerate_report(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path((year, month)): Path<(i32, u32)>,
) -> AppResult<Json<MonthlyReport>> {
    let month = YearMonth::new(year, month)
        .ok_or_else(|| AppError::BadRequest("Month must be between 1 and 12".into()))?;
    let report = monthly_reports::generate(&state.pool, month).await?;
    tracing::info!(year = report.year, month = report.month, "Monthly report regenerated");
    Ok(Json(report))
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/chat/{session_id}
pub async fn chat_transcript(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(session_id): Path<String>,
) -> AppResult<Json<Vec<ChatMessage>>> {
    Ok(Json(
        ChatMessageRepo::list_by_session(&state.pool, &session_id).await?,
    ))
}
