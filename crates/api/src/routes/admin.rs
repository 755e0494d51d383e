//! Route definitions for the `/admin` dashboard. Every handler requires admin.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET   /stats                     -> stats
/// GET   /review-trends             -> review_trends_panel
/// GET   /users                     -> users
/// PATCH /users/{id}/admin          -> set_user_admin
/// GET   /subscriptions             -> subscriptions
/// PATCH /subscriptions/{id}/status -> update_subscription_status
/// GET   /payment-codes/used        -> used_payment_codes
/// GET   /payments                  -> payments
/// PATCH /payments/{id}/status      -> update_payment_status
/// GET   /reports                   -> reports
/// POST  /reports/{year}/{month}    -> regenerate_report
/// GET   /chat/{session_id}         -> chat_transcript
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(admin::stats))
        .route("/review-trends", get(admin::review_trends_panel))
        .route("/users", get(admin::users))
        .route("/users/{id}/admin", patch(admin::set_user_admin))
        .route("/subscriptions", get(admin::subscriptions))
        .route(
            "/subscriptions/{id}/status",
            patch(admin::update_subscription_status),
        )
        .route("/payment-codes/used", get(admin::used_payment_codes))
        .route("/payments", get(admin::payments))
        .route("/payments/{id}/status", patch(admin::update_payment_status))
        .route("/reports", get(admin::reports))
        .route("/reports/{year}/{month}", post(admin::regenerate_report))
        .route("/chat/{session_id}", get(admin::chat_transcript))
}
