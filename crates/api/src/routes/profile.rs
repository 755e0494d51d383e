//! Route definitions for `/profile`.

use axum::routing::get;
use axum::Router;

use crate::handlers::profile;
use crate::state::AppState;

/// Routes mounted at `/profile`. All require auth.
///
/// ```text
/// GET /quotes         -> quotes
/// GET /subscriptions  -> subscriptions
/// GET /reviews        -> reviews
/// GET /payments       -> payments
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/quotes", get(profile::quotes))
        .route("/subscriptions", get(profile::subscriptions))
        .route("/reviews", get(profile::reviews))
        .route("/payments", get(profile::payments))
}
