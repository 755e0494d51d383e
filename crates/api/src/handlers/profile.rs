//! Handlers for `/profile`: the signed-in client's own records.

use agency_db::models::payment::Payment;
use agency_db::models::quote::Quote;
use agency_db::models::review::Review;
use agency_db::models::subscription::Subscription;
use agency_db::repositories::{PaymentRepo, QuoteRepo, ReviewRepo, SubscriptionRepo};
use axum::extract::State;
use axum::Json;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/v1/profile/quotes
pub async fn quotes(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<Vec<Quote>>> {
    Ok(Json(QuoteRepo::list_by_user(&state.pool, auth.user_id).await?))
}

/// GET /api/v1/profile/subscriptions
pub async fn subscriptions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<Subscription>>> {
    Ok(Json(
        SubscriptionRepo::list_by_user(&state.pool, auth.user_id).await?,
    ))
}

/// GET /api/v1/profile/reviews
pub async fn reviews(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<Review>>> {
    Ok(Json(ReviewRepo::list_by_user(&state.pool, auth.user_id).await?))
}

/// GET /api/v1/profile/payments
pub async fn payments(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<Payment>>> {
    Ok(Json(PaymentRepo::list_by_user(&state.pool, auth.user_id).await?))
}
