pub mod admin;
pub mod auth;
pub mod checkout;
pub mod health;
pub mod payment_code;
pub mod profile;
pub mod project;
pub mod quote;
pub mod review;

use axum::routing::post;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/google                                     Google consent redirect
/// /auth/google/callback                            OAuth callback
/// /auth/me                                         current user (auth)
/// /auth/refresh                                    rotate tokens
/// /auth/logout                                     revoke sessions (auth)
///
/// /profile/{quotes,subscriptions,reviews,payments} own records (auth)
///
/// /quotes                                          submit, list (admin)
/// /quotes/catalog                                  form choices
/// /quotes/steps/{step}/validate                    wizard step check
/// /quotes/{id}/status                              update status (admin)
///
/// /projects                                        list, create (admin)
/// /projects/active                                 visible portfolio
/// /projects/{id}                                   update, delete (admin)
///
/// /reviews                                         list (admin), create (auth)
/// /reviews/approved                                public testimonials
/// /reviews/{id}                                    delete (admin)
/// /reviews/{id}/approve                            approve (admin)
///
/// /payment-codes                                   list, create (admin)
/// /payment-codes/verify                            check a code
/// /payment-codes/process                           open checkout for a code
/// /payment-codes/{id}                              delete (admin)
///
/// /subscriptions/create-checkout                   maintenance checkout (auth)
/// /whop/webhook                                    provider webhook
///
/// /admin/...                                       dashboard (admin)
///
/// /chat                                            scripted assistant
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/profile", profile::router())
        .nest("/quotes", quote::router())
        .nest("/projects", project::router())
        .nest("/reviews", review::router())
        .nest("/payment-codes", payment_code::router())
        .nest("/subscriptions", checkout::subscription_router())
        .nest("/whop", checkout::webhook_router())
        .nest("/admin", admin::router())
        .route("/chat", post(handlers::chat::send))
}
