//! HTTP-level integration tests for the quote wizard endpoints.

mod common;

use std::sync::Arc;

use agency_events::bus::QUOTE_SUBMITTED;
use agency_events::EventBus;
use axum::http::StatusCode;
use common::{body_json, get, get_auth, patch_json_auth, post_json, post_json_auth};
use serde_json::json;
use sqlx::PgPool;

fn complete_quote() -> serde_json::Value {
    json!({
        "first_name": "Ana",
        "last_name": "Silva",
        "email": "ana@example.com",
        "phone": "912345678",
        "country_code": "+351",
        "service_type": "website",
        "business_segment": "Loja / E-commerce",
        "additionals": ["payment_online", "chat"],
        "project_description": "Loja online para a minha marca de roupa."
    })
}

// ---------------------------------------------------------------------------
// Catalogue and step validation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn catalog_lists_form_choices(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/quotes/catalog").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["service_types"].as_array().unwrap().len(), 2);
    assert_eq!(json["service_types"][0]["value"], "website");
    assert_eq!(json["additionals"].as_array().unwrap().len(), 4);
    assert_eq!(json["default_country_code"], "+351");
    assert!(!json["business_segments"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn step_one_reports_field_errors(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = json!({ "first_name": "A", "email": "not-an-email" });
    let response = post_json(app, "/api/v1/quotes/steps/1/validate", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["fields"]["first_name"].is_string());
    assert!(json["fields"]["last_name"].is_string());
    assert_eq!(json["fields"]["email"], "Invalid email");
    assert!(json["fields"]["phone"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn valid_step_points_to_the_next_one(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/quotes/steps/1/validate", complete_quote()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["step"], 1);
    assert_eq!(json["next_step"], 2);
    assert_eq!(json["progress_percent"], 20);

    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/quotes/steps/5/validate", complete_quote()).await;
    let json = body_json(response).await;
    assert_eq!(json["next_step"], serde_json::Value::Null);
    assert_eq!(json["progress_percent"], 100);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn out_of_range_step_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/quotes/steps/6/validate", complete_quote()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn anonymous_quote_is_stored_as_pending(pool: PgPool) {
    let bus = Arc::new(EventBus::default());
    let mut events = bus.subscribe();
    let app = common::build_test_app_from(pool, common::test_config(), None, None, bus);

    let mut body = complete_quote();
    body["status"] = json!("completed");
    let response = post_json(app, "/api/v1/quotes", body).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["status"], "pending");
    assert_eq!(json["user_id"], serde_json::Value::Null);
    assert_eq!(json["additionals"], json!(["payment_online", "chat"]));

    let event = events.try_recv().expect("quote.submitted should be published");
    assert_eq!(event.event_type, QUOTE_SUBMITTED);
    assert!(event.message.unwrap().contains("Ana Silva"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn signed_in_quote_is_linked_to_the_user(pool: PgPool) {
    let (user, token) = common::client_token(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/quotes", complete_quote(), &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["user_id"], user.id);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/profile/quotes", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn incomplete_quote_is_rejected_with_all_errors(pool: PgPool) {
    let app = common::build_test_app(pool);
    let mut body = complete_quote();
    body["service_type"] = json!("");
    body["additionals"] = json!(["teleport"]);

    let response = post_json(app, "/api/v1/quotes", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["fields"]["service_type"].is_string());
    assert!(json["fields"]["additionals"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_bearer_token_is_rejected_even_on_public_submit(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json_auth(app, "/api/v1/quotes", complete_quote(), "garbage").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_lists_and_updates_quotes(pool: PgPool) {
    let (_admin, token) = common::admin_token(&pool).await;

    let app = common::build_test_app(pool.clone());
    let created = body_json(post_json(app, "/api/v1/quotes", complete_quote()).await).await;
    let id = created["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/quotes", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/quotes/{id}/status");
    let response = patch_json_auth(app, &uri, json!({ "status": "in_progress" }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "in_progress");

    let app = common::build_test_app(pool);
    let response = patch_json_auth(app, &uri, json!({ "status": "archived" }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn clients_cannot_list_quotes(pool: PgPool) {
    let (_user, token) = common::client_token(&pool).await;

    let app = common::build_test_app(pool.clone());
    assert_eq!(
        get_auth(app, "/api/v1/quotes", &token).await.status(),
        StatusCode::FORBIDDEN
    );

    let app = common::build_test_app(pool);
    assert_eq!(
        get(app, "/api/v1/quotes").await.status(),
        StatusCode::UNAUTHORIZED
    );
}
