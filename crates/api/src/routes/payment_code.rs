//! Route definitions for the `/payment-codes` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::payment_code;
use crate::state::AppState;

/// Routes mounted at `/payment-codes`.
///
/// ```text
/// GET    /         -> list (admin)
/// POST   /         -> create (admin)
/// POST   /verify   -> verify
/// POST   /process  -> process
/// DELETE /{id}     -> delete (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(payment_code::list).post(payment_code::create))
        .route("/verify", post(payment_code::verify))
        .route("/process", post(payment_code::process))
        .route("/{id}", delete(payment_code::delete))
}
