//! HTTP-level integration tests for portfolio projects and reviews.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get, get_auth, patch_json_auth, post_json, post_json_auth};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_manages_projects(pool: PgPool) {
    let (_admin, token) = common::admin_token(&pool).await;

    let app = common::build_test_app(pool.clone());
    let body = json!({ "title": "Clínica Sorriso", "display_order": 2 });
    let response = post_json_auth(app, "/api/v1/projects", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let first = body_json(response).await;
    assert_eq!(first["media_type"], "image");
    assert_eq!(first["is_active"], true);

    let app = common::build_test_app(pool.clone());
    let body = json!({ "title": "App Delivery", "media_type": "video", "display_order": 1 });
    let second = body_json(post_json_auth(app, "/api/v1/projects", body, &token).await).await;

    // Hide the first one.
    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/projects/{}", first["id"]);
    let response = patch_json_auth(app, &uri, json!({ "is_active": false }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["title"], "Clínica Sorriso");

    let app = common::build_test_app(pool.clone());
    let all = body_json(get(app, "/api/v1/projects").await).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
    assert_eq!(all[0]["id"], second["id"], "lower display_order comes first");

    let app = common::build_test_app(pool.clone());
    let active = body_json(get(app, "/api/v1/projects/active").await).await;
    assert_eq!(active.as_array().unwrap().len(), 1);
    assert_eq!(active[0]["title"], "App Delivery");

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    let app = common::build_test_app(pool);
    let response = delete_auth(app, &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn project_validation_and_access(pool: PgPool) {
    let (_admin, admin) = common::admin_token(&pool).await;
    let (_client, client) = common::client_token(&pool).await;

    let app = common::build_test_app(pool.clone());
    let body = json!({ "title": "", "media_type": "gif" });
    let response = post_json_auth(app, "/api/v1/projects", body, &admin).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["fields"]["title"].is_string());
    assert!(json["fields"]["media_type"].is_string());

    let app = common::build_test_app(pool.clone());
    let body = json!({ "title": "X" });
    let response = post_json_auth(app, "/api/v1/projects", body, &client).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool);
    let body = json!({ "title": "Y" });
    let response = patch_json_auth(app, "/api/v1/projects/999", body, &admin).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn reviews_are_hidden_until_approved(pool: PgPool) {
    let (_client, client) = common::client_token(&pool).await;
    let (_admin, admin) = common::admin_token(&pool).await;

    let app = common::build_test_app(pool.clone());
    let body = json!({ "rating": 5, "comment": "Site entregue antes do prazo!" });
    let response = post_json_auth(app, "/api/v1/reviews", body, &client).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let review = body_json(response).await;
    assert_eq!(review["is_approved"], false);

    let app = common::build_test_app(pool.clone());
    let approved = body_json(get(app, "/api/v1/reviews/approved").await).await;
    assert!(approved.as_array().unwrap().is_empty());

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/reviews/{}/approve", review["id"]);
    let response = patch_json_auth(app, &uri, json!({}), &admin).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let approved = body_json(get(app, "/api/v1/reviews/approved").await).await;
    assert_eq!(approved.as_array().unwrap().len(), 1);
    assert_eq!(approved[0]["author_name"], "Cliente Teste");

    let app = common::build_test_app(pool);
    let mine = body_json(get_auth(app, "/api/v1/profile/reviews", &client).await).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn review_rules_are_enforced(pool: PgPool) {
    let (_client, client) = common::client_token(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/reviews", json!({ "rating": 5 })).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let app = common::build_test_app(pool.clone());
    let body = json!({ "rating": 6, "comment": "curto" });
    let response = post_json_auth(app, "/api/v1/reviews", body, &client).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["fields"]["rating"].is_string());
    assert!(json["fields"]["comment"].is_string());

    // A blank comment is treated as no comment.
    let app = common::build_test_app(pool);
    let body = json!({ "rating": 4, "comment": "   " });
    let response = post_json_auth(app, "/api/v1/reviews", body, &client).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["comment"], serde_json::Value::Null);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_deletes_reviews(pool: PgPool) {
    let (_client, client) = common::client_token(&pool).await;
    let (_admin, admin) = common::admin_token(&pool).await;

    let app = common::build_test_app(pool.clone());
    let body = json!({ "rating": 3 });
    let review = body_json(post_json_auth(app, "/api/v1/reviews", body, &client).await).await;

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/reviews/{}", review["id"]);
    assert_eq!(delete_auth(app, &uri, &client).await.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    assert_eq!(delete_auth(app, &uri, &admin).await.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let all = body_json(get_auth(app, "/api/v1/reviews", &admin).await).await;
    assert!(all.as_array().unwrap().is_empty());
}
