//! Route definitions for the `/quotes` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::quote;
use crate::state::AppState;

/// Routes mounted at `/quotes`.
///
/// ```text
/// GET   /                        -> list (admin)
/// POST  /                        -> create (optional auth)
/// GET   /catalog                 -> catalog
/// POST  /steps/{step}/validate   -> validate_wizard_step
/// PATCH /{id}/status             -> update_status (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(quote::list).post(quote::create))
        .route("/catalog", get(quote::catalog))
        .route("/steps/{step}/validate", post(quote::validate_wizard_step))
        .route("/{id}/status", patch(quote::update_status))
}
