//! Route definitions for the `/projects` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::project;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /        -> list
/// POST   /        -> create (admin)
/// GET    /active  -> list_active
/// PATCH  /{id}    -> update (admin)
/// DELETE /{id}    -> delete (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route("/active", get(project::list_active))
        .route("/{id}", patch(project::update).delete(project::delete))
}
