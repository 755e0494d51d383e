//! Route definitions for the `/reviews` resource.

use axum::routing::{delete, get, patch};
use axum::Router;

use crate::handlers::review;
use crate::state::AppState;

/// Routes mounted at `/reviews`.
///
/// ```text
/// GET    /              -> list (admin)
/// POST   /              -> create (requires auth)
/// GET    /approved      -> list_approved
/// PATCH  /{id}/approve  -> approve (admin)
/// DELETE /{id}          -> delete (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(review::list).post(review::create))
        .route("/approved", get(review::list_approved))
        .route("/{id}/approve", patch(review::approve))
        .route("/{id}", delete(review::delete))
}
