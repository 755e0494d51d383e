//! HTTP-level integration tests for payment codes, hosted checkout and the
//! Whop webhook.

mod common;

use std::sync::Arc;

use agency_checkout::webhook::sign;
use agency_db::models::payment_code::CreatePaymentCode;
use agency_db::repositories::{PaymentCodeRepo, PaymentRepo, SubscriptionRepo};
use axum::http::StatusCode;
use common::{
    body_json, delete_auth, get_auth, post_json, post_json_auth, post_webhook, FakeCheckout,
    TEST_WEBHOOK_SECRET,
};
use serde_json::json;
use sqlx::PgPool;
use tokio::task::JoinSet;

const CHECKOUT_URI: &str = "/api/v1/subscriptions/create-checkout";

async fn seed_code(pool: &PgPool, code: &str, amount_cents: i64) {
    PaymentCodeRepo::create(
        pool,
        &CreatePaymentCode {
            code: code.to_string(),
            amount_cents,
            description: None,
        },
    )
    .await
    .expect("code creation should succeed");
}

fn signed(body: &serde_json::Value) -> (Vec<u8>, String) {
    let bytes = serde_json::to_vec(body).unwrap();
    let signature = sign(TEST_WEBHOOK_SECRET, &bytes).unwrap();
    (bytes, signature)
}

fn membership_valid(user_id: i64) -> serde_json::Value {
    json!({
        "action": "membership.went_valid",
        "data": {
            "id": "mem_1",
            "user_id": "whop_user_9",
            "renewal_period_start": 1_767_225_600,
            "renewal_period_end": 1_769_904_000,
            "metadata": { "userId": user_id.to_string(), "planType": "site" }
        }
    })
}

fn membership_paid(user_id: i64) -> serde_json::Value {
    json!({
        "action": "payment.succeeded",
        "data": {
            "id": "pay_sub_1",
            "membership_id": "mem_1",
            "metadata": { "userId": user_id.to_string(), "planType": "site" }
        }
    })
}

fn code_paid(code: &str, payment_id: &str) -> serde_json::Value {
    json!({
        "action": "payment.succeeded",
        "data": {
            "id": payment_id,
            "metadata": { "code": code, "name": "Ana Silva", "email": "ana@example.com" }
        }
    })
}

// ---------------------------------------------------------------------------
// Payment codes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_creates_lists_and_deletes_codes(pool: PgPool) {
    let (_admin, token) = common::admin_token(&pool).await;

    let app = common::build_test_app(pool.clone());
    let body = json!({ "amount": "150,50", "description": "Landing page" });
    let response = post_json_auth(app, "/api/v1/payment-codes", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let code = created["code"].as_str().unwrap();
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(created["amount_cents"], 15_050);
    assert_eq!(created["is_used"], false);

    let app = common::build_test_app(pool.clone());
    let listed = body_json(get_auth(app, "/api/v1/payment-codes", &token).await).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/payment-codes/{}", created["id"]);
    assert_eq!(delete_auth(app, &uri, &token).await.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    assert_eq!(delete_auth(app, &uri, &token).await.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn code_amount_must_be_a_positive_number(pool: PgPool) {
    let (_admin, token) = common::admin_token(&pool).await;

    for amount in [json!("abc"), json!("-5"), json!("1.234")] {
        let app = common::build_test_app(pool.clone());
        let body = json!({ "amount": amount });
        let response = post_json_auth(app, "/api/v1/payment-codes", body, &token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "amount {amount}");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn verify_reports_unknown_and_redeemable_codes(pool: PgPool) {
    seed_code(&pool, "482913", 15_000).await;

    let app = common::build_test_app(pool.clone());
    let body = json!({ "code": "000000" });
    let response = post_json(app, "/api/v1/payment-codes/verify", body).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool);
    let body = json!({ "code": " 482913 " });
    let response = post_json(app, "/api/v1/payment-codes/verify", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["code"], "482913");
    assert_eq!(json["amount"], "150.00");
    assert_eq!(json["amount_cents"], 15_000);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn process_opens_checkout_with_code_metadata(pool: PgPool) {
    seed_code(&pool, "482913", 15_000).await;
    let checkout = Arc::new(FakeCheckout::default());

    let app = common::build_test_app_with(pool, Some(checkout.clone()), None);
    let body = json!({ "name": "Ana Silva", "email": "ana@example.com", "code": "482913" });
    let response = post_json(app, "/api/v1/payment-codes/process", body).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["checkout_url"], "https://whop.test/checkout/ch_test");

    let requests = checkout.requests.lock().unwrap();
    let request = &requests[0];
    assert_eq!(request.plan_id, "plan_code");
    assert_eq!(request.redirect_url, "http://site.test/payment/success?code=482913");
    assert_eq!(request.metadata["code"], "482913");
    assert_eq!(request.metadata["email"], "ana@example.com");
    assert_eq!(request.metadata["amount"], "150.00");
    assert_eq!(request.metadata["description"], "Pagamento BragaWork - Código 482913");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn process_rejects_bad_input_and_missing_checkout(pool: PgPool) {
    seed_code(&pool, "482913", 15_000).await;

    let app = common::build_test_app(pool.clone());
    let body = json!({ "name": "A", "email": "nope", "code": "12" });
    let response = post_json(app, "/api/v1/payment-codes/process", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool.clone());
    let body = json!({ "name": "Ana", "email": "ana@example.com", "code": "999999" });
    let response = post_json(app, "/api/v1/payment-codes/process", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Valid code, but no checkout provider.
    let app = common::build_test_app(pool);
    let body = json!({ "name": "Ana", "email": "ana@example.com", "code": "482913" });
    let response = post_json(app, "/api/v1/payment-codes/process", body).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// ---------------------------------------------------------------------------
// Webhook: payment codes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn webhook_requires_a_valid_signature(pool: PgPool) {
    let (bytes, _) = signed(&code_paid("482913", "pay_1"));

    let app = common::build_test_app(pool.clone());
    assert_eq!(post_webhook(app, &bytes, None).await.status(), StatusCode::UNAUTHORIZED);

    let app = common::build_test_app(pool);
    let response = post_webhook(app, &bytes, Some("deadbeef")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_webhook_is_a_bad_request(pool: PgPool) {
    let bytes = b"{not json".to_vec();
    let signature = sign(TEST_WEBHOOK_SECRET, &bytes).unwrap();

    let app = common::build_test_app(pool);
    let response = post_webhook(app, &bytes, Some(&signature)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn paid_code_is_redeemed_once(pool: PgPool) {
    seed_code(&pool, "482913", 15_000).await;
    let payer = common::create_user(&pool, "ana@example.com", false).await;
    let (bytes, signature) = signed(&code_paid("482913", "pay_1"));

    for _ in 0..2 {
        let app = common::build_test_app(pool.clone());
        let response = post_webhook(app, &bytes, Some(&signature)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["received"], true);
    }

    let code = PaymentCodeRepo::find_by_code(&pool, "482913").await.unwrap().unwrap();
    assert!(code.is_used);
    assert_eq!(code.used_by_email.as_deref(), Some("ana@example.com"));
    assert_eq!(code.payment_ref.as_deref(), Some("pay_1"));

    let payments = PaymentRepo::list(&pool).await.unwrap();
    assert_eq!(payments.len(), 1, "redelivery must not record a second payment");
    assert_eq!(payments[0].payment_type, "code_payment");
    assert_eq!(payments[0].amount_cents, 15_000);
    assert_eq!(payments[0].payment_code_id, Some(code.id));
    assert_eq!(payments[0].user_id, Some(payer.id));

    // Now used: verify says 400, process refuses.
    let app = common::build_test_app(pool.clone());
    let body = json!({ "code": "482913" });
    let response = post_json(app, "/api/v1/payment-codes/verify", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (_admin, token) = common::admin_token(&pool).await;
    let app = common::build_test_app(pool);
    let used = body_json(get_auth(app, "/api/v1/admin/payment-codes/used", &token).await).await;
    assert_eq!(used.as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_redemption_leaves_the_code_redeemable(pool: PgPool) {
    seed_code(&pool, "482913", 15_000).await;
    sqlx::query(
        "CREATE FUNCTION reject_payment() RETURNS trigger LANGUAGE plpgsql AS $$
         BEGIN RAISE EXCEPTION 'payments unavailable'; END $$",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "CREATE TRIGGER reject_payment BEFORE INSERT ON payments
         FOR EACH ROW EXECUTE FUNCTION reject_payment()",
    )
    .execute(&pool)
    .await
    .unwrap();
    let (bytes, signature) = signed(&code_paid("482913", "pay_1"));

    let app = common::build_test_app(pool.clone());
    let response = post_webhook(app, &bytes, Some(&signature)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let code = PaymentCodeRepo::find_by_code(&pool, "482913").await.unwrap().unwrap();
    assert!(!code.is_used, "the failed insert must roll the redemption back");

    sqlx::query("DROP TRIGGER reject_payment ON payments")
        .execute(&pool)
        .await
        .unwrap();

    // The provider retries the delivery.
    let app = common::build_test_app(pool.clone());
    let response = post_webhook(app, &bytes, Some(&signature)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let code = PaymentCodeRepo::find_by_code(&pool, "482913").await.unwrap().unwrap();
    assert!(code.is_used);
    let payments = PaymentRepo::list(&pool).await.unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].payment_code_id, Some(code.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unsigned_webhooks_are_accepted_without_a_secret(pool: PgPool) {
    seed_code(&pool, "482913", 15_000).await;
    let mut config = common::test_config();
    if let Some(whop) = config.whop.as_mut() {
        whop.webhook_secret = None;
    }
    let bytes = serde_json::to_vec(&code_paid("482913", "pay_2")).unwrap();

    let app = common::build_test_app_from(
        pool.clone(),
        config,
        None,
        None,
        Arc::new(agency_events::EventBus::default()),
    );
    assert_eq!(post_webhook(app, &bytes, None).await.status(), StatusCode::OK);

    let payments = PaymentRepo::list(&pool).await.unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].user_id, None);
}

// ---------------------------------------------------------------------------
// Subscriptions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn subscription_checkout_carries_the_user(pool: PgPool) {
    let (user, token) = common::client_token(&pool).await;
    let checkout = Arc::new(FakeCheckout::default());

    let app = common::build_test_app_with(pool.clone(), Some(checkout.clone()), None);
    let body = json!({ "plan_type": "app" });
    let response = post_json_auth(app, CHECKOUT_URI, body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["checkout_url"].is_string());

    {
        let requests = checkout.requests.lock().unwrap();
        assert_eq!(requests[0].plan_id, "plan_app");
        assert_eq!(requests[0].redirect_url, "http://site.test/maintenance?success=true");
        assert_eq!(requests[0].metadata["userId"], user.id.to_string());
        assert_eq!(requests[0].metadata["planType"], "app");
    }

    // Request bodies are snake_case only.
    let app = common::build_test_app_with(pool.clone(), Some(checkout.clone()), None);
    let body = json!({ "planType": "app" });
    let response = post_json_auth(app, CHECKOUT_URI, body, &token).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let app = common::build_test_app_with(pool.clone(), Some(checkout), None);
    let body = json!({ "plan_type": "enterprise" });
    let response = post_json_auth(app, CHECKOUT_URI, body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let body = json!({ "plan_type": "site" });
    let response = post_json(app, CHECKOUT_URI, body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn membership_lifecycle_updates_the_subscription(pool: PgPool) {
    let (user, token) = common::client_token(&pool).await;
    let went_valid = membership_valid(user.id);
    let paid = membership_paid(user.id);

    for event in [&went_valid, &paid, &paid] {
        let (bytes, signature) = signed(event);
        let app = common::build_test_app(pool.clone());
        let response = post_webhook(app, &bytes, Some(&signature)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let subs = SubscriptionRepo::list_by_user(&pool, user.id).await.unwrap();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].status, "active");
    assert_eq!(subs[0].plan_type, "site_maintenance");
    assert_eq!(subs[0].amount_cents, 5_000);
    assert_eq!(subs[0].customer_ref.as_deref(), Some("whop_user_9"));

    let payments = PaymentRepo::list_by_user(&pool, user.id).await.unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].payment_type, "maintenance_site");
    assert_eq!(payments[0].amount_cents, 5_000);

    let (bytes, signature) = signed(&json!({
        "action": "membership.went_invalid",
        "data": { "id": "mem_1" }
    }));
    let app = common::build_test_app(pool.clone());
    let response = post_webhook(app, &bytes, Some(&signature)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let mine = body_json(get_auth(app, "/api/v1/profile/subscriptions", &token).await).await;
    assert_eq!(mine[0]["status"], "canceled");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_charge_redeliveries_record_one_payment(pool: PgPool) {
    let (user, _token) = common::client_token(&pool).await;
    let (bytes, signature) = signed(&membership_valid(user.id));
    let app = common::build_test_app(pool.clone());
    assert_eq!(post_webhook(app, &bytes, Some(&signature)).await.status(), StatusCode::OK);

    let (bytes, signature) = signed(&membership_paid(user.id));
    let mut deliveries = JoinSet::new();
    for _ in 0..16 {
        let app = common::build_test_app(pool.clone());
        let (bytes, signature) = (bytes.clone(), signature.clone());
        deliveries.spawn(async move {
            post_webhook(app, &bytes, Some(&signature)).await.status()
        });
    }
    while let Some(status) = deliveries.join_next().await {
        assert_eq!(status.unwrap(), StatusCode::OK);
    }

    let payments = PaymentRepo::list_by_user(&pool, user.id).await.unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].payment_ref, "pay_sub_1");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unrelated_webhooks_are_acknowledged(pool: PgPool) {
    let (bytes, signature) = signed(&json!({ "action": "refund.created", "data": {} }));

    let app = common::build_test_app(pool.clone());
    let response = post_webhook(app, &bytes, Some(&signature)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(PaymentRepo::list(&pool).await.unwrap().is_empty());
}
