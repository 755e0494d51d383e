//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// GET  /google           -> google_redirect
/// GET  /google/callback  -> google_callback
/// GET  /me               -> me (requires auth)
/// POST /refresh          -> refresh
/// POST /logout           -> logout (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/google", get(auth::google_redirect))
        .route("/google/callback", get(auth::google_callback))
        .route("/me", get(auth::me))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
}
