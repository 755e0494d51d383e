//! Route definitions for hosted checkout and its webhook.

use axum::routing::post;
use axum::Router;

use crate::handlers::checkout;
use crate::state::AppState;

/// Routes mounted at `/subscriptions`.
///
/// ```text
/// POST /create-checkout  -> create_subscription_checkout (requires auth)
/// ```
pub fn subscription_router() -> Router<AppState> {
    Router::new().route(
        "/create-checkout",
        post(checkout::create_subscription_checkout),
    )
}

/// Routes mounted at `/whop`.
///
/// ```text
/// POST /webhook  -> webhook
/// ```
pub fn webhook_router() -> Router<AppState> {
    Router::new().route("/webhook", post(checkout::webhook))
}
