#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use agency_api::auth::google::{GoogleConfig, GoogleProfile, IdentityProvider, OAuthError};
use agency_api::auth::jwt::{generate_access_token, JwtConfig};
use agency_api::config::ServerConfig;
use agency_api::router::build_app_router;
use agency_api::state::AppState;
use agency_checkout::{
    CheckoutError, CheckoutProvider, CheckoutRequest, CheckoutSession, WhopConfig,
};
use agency_core::roles::{ROLE_ADMIN, ROLE_CLIENT};
use agency_db::models::user::{CreateUser, User};
use agency_db::repositories::UserRepo;
use agency_events::EventBus;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_WEBHOOK_SECRET: &str = "whsec_test";
pub const ADMIN_EMAIL: &str = "owner@agency.test";

/// Build a test `ServerConfig` with safe defaults.
///
/// Whop is configured with every plan and a webhook secret; Google and
/// WhatsApp are off unless a test swaps them in.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        public_base_url: "http://site.test".to_string(),
        admin_email: Some(ADMIN_EMAIL.to_string()),
        monthly_report_interval_secs: 3600,
        jwt: JwtConfig {
            secret: "test-secret-do-not-use-in-production".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        google: Some(GoogleConfig {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            callback_url: "http://site.test/api/v1/auth/google/callback".to_string(),
        }),
        whop: Some(WhopConfig {
            api_key: "whop-key".to_string(),
            api_base: "http://whop.invalid".to_string(),
            code_plan_id: Some("plan_code".to_string()),
            site_plan_id: Some("plan_site".to_string()),
            app_plan_id: Some("plan_app".to_string()),
            webhook_secret: Some(TEST_WEBHOOK_SECRET.to_string()),
        }),
        whatsapp: None,
    }
}

/// Router with no external integrations wired in.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, None, None)
}

/// Router with the given fakes standing in for Whop and Google.
pub fn build_test_app_with(
    pool: PgPool,
    checkout: Option<Arc<dyn CheckoutProvider>>,
    identity: Option<Arc<dyn IdentityProvider>>,
) -> Router {
    build_test_app_from(pool, test_config(), checkout, identity, Arc::new(EventBus::default()))
}

pub fn build_test_app_from(
    pool: PgPool,
    config: ServerConfig,
    checkout: Option<Arc<dyn CheckoutProvider>>,
    identity: Option<Arc<dyn IdentityProvider>>,
    event_bus: Arc<EventBus>,
) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus,
        checkout,
        identity,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Records every checkout request and answers with a fixed URL.
#[derive(Default)]
pub struct FakeCheckout {
    pub requests: Mutex<Vec<CheckoutRequest>>,
}

#[async_trait]
impl CheckoutProvider for FakeCheckout {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, CheckoutError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(CheckoutSession {
            id: "ch_test".to_string(),
            checkout_url: "https://whop.test/checkout/ch_test".to_string(),
        })
    }
}

/// Returns the same profile for any code except `"bad"`.
pub struct FakeIdentity {
    pub profile: GoogleProfile,
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn exchange_code(&self, code: &str) -> Result<GoogleProfile, OAuthError> {
        if code == "bad" {
            return Err(OAuthError::Api {
                status: 400,
                body: "invalid_grant".to_string(),
            });
        }
        Ok(self.profile.clone())
    }
}

// ---------------------------------------------------------------------------
// Users and tokens
// ---------------------------------------------------------------------------

pub async fn create_user(pool: &PgPool, email: &str, is_admin: bool) -> User {
    let username = email.split('@').next().unwrap_or(email).to_string();
    UserRepo::create(
        pool,
        &CreateUser {
            google_id: None,
            email: email.to_string(),
            username,
            display_name: Some("Cliente Teste".to_string()),
            avatar_url: None,
            is_admin,
        },
    )
    .await
    .expect("user creation should succeed")
}

pub fn token_for(user: &User) -> String {
    let role = if user.is_admin { ROLE_ADMIN } else { ROLE_CLIENT };
    generate_access_token(user.id, role, &test_config().jwt).expect("token generation")
}

/// Create an admin and return `(user, access_token)`.
pub async fn admin_token(pool: &PgPool) -> (User, String) {
    let user = create_user(pool, "admin@agency.test", true).await;
    let token = token_for(&user);
    (user, token)
}

/// Create a client and return `(user, access_token)`.
pub async fn client_token(pool: &PgPool) -> (User, String) {
    let user = create_user(pool, "cliente@example.com", false).await;
    let token = token_for(&user);
    (user, token)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// POST a raw webhook body with an optional signature header.
pub async fn post_webhook(app: Router, body: &[u8], signature: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/whop/webhook")
        .header("content-type", "application/json");
    if let Some(sig) = signature {
        builder = builder.header(agency_checkout::webhook::SIGNATURE_HEADER, sig);
    }
    app.oneshot(builder.body(Body::from(body.to_vec())).unwrap())
        .await
        .unwrap()
}
