//! Hosted checkout: maintenance subscription checkout and the provider webhook.

use std::collections::BTreeMap;

use agency_checkout::webhook::{
    meta, verify_signature, WebhookAction, WebhookEvent, SIGNATURE_HEADER,
};
use agency_checkout::CheckoutRequest;
use agency_core::error::CoreError;
use agency_core::money::format_cents;
use agency_core::payment::PaymentStatus;
use agency_core::subscription::{PlanType, SubscriptionStatus};
use agency_core::types::{DbId, Timestamp};
use agency_db::models::payment::CreatePayment;
use agency_db::models::payment_code::Redemption;
use agency_db::models::subscription::UpsertSubscription;
use agency_db::repositories::{PaymentCodeRepo, PaymentRepo, SubscriptionRepo, UserRepo};
use agency_events::bus::{PAYMENT_CODE_REDEEMED, SUBSCRIPTION_ACTIVATED, SUBSCRIPTION_CANCELED};
use agency_events::SiteEvent;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::ReceivedResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubscriptionCheckoutRequest {
    /// `site` or `app`.
    pub plan_type: String,
}

#[derive(Debug, Serialize)]
pub struct CheckoutUrlResponse {
    pub checkout_url: String,
}

/// POST /api/v1/subscriptions/create-checkout
pub async fn create_subscription_checkout(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<SubscriptionCheckoutRequest>,
) -> AppResult<Json<CheckoutUrlResponse>> {
    let plan = PlanType::parse(input.plan_type.trim())
        .ok_or_else(|| AppError::BadRequest("Invalid plan type".into()))?;

    let (Some(checkout), Some(whop)) = (state.checkout.as_ref(), state.config.whop.as_ref())
    else {
        return Err(AppError::InternalError("Checkout is not configured".into()));
    };
    let plan_id = whop
        .plan_for(plan)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", auth.user_id))?;

    let metadata = BTreeMap::from([
        (meta::USER_ID.to_string(), user.id.to_string()),
        (meta::EMAIL.to_string(), user.email.clone()),
        (meta::PLAN_TYPE.to_string(), plan.key().to_string()),
    ]);
    let session = checkout
        .create_checkout_session(&CheckoutRequest {
            plan_id: plan_id.to_string(),
            redirect_url: state.config.public_url("/maintenance?success=true"),
            metadata,
        })
        .await
        .map_err(|e| AppError::InternalError(format!("Checkout session failed: {e}")))?;

    tracing::info!(user_id = user.id, plan = plan.as_str(), "Subscription checkout opened");
    Ok(Json(CheckoutUrlResponse {
        checkout_url: session.checkout_url,
    }))
}

/// POST /api/v1/whop/webhook
///
/// The raw body is needed for signature verification, so it is parsed here
/// rather than by the `Json` extractor.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<ReceivedResponse>> {
    if let Some(secret) = state
        .config
        .whop
        .as_ref()
        .and_then(|w| w.webhook_secret.as_deref())
    {
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !verify_signature(secret, &body, signature) {
            tracing::warn!("Rejected webhook with invalid signature");
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid webhook signature".into(),
            )));
        }
    }

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Malformed webhook payload: {e}")))?;
    tracing::info!(action = %event.action, "Webhook received");

    match event.classify() {
        WebhookAction::RedeemCode {
            code,
            name,
            email,
            payment_ref,
        } => redeem_code(&state, &code, name, email, payment_ref).await?,
        WebhookAction::ActivateSubscription {
            user_id,
            plan,
            subscription_ref,
            customer_ref,
            period_start,
            period_end,
            payment_ref,
        } => {
            activate_subscription(
                &state,
                Activation {
                    user_id,
                    plan,
                    subscription_ref,
                    customer_ref,
                    period_start,
                    period_end,
                    payment_ref,
                },
            )
            .await?
        }
        WebhookAction::CancelSubscription { subscription_ref } => {
            let canceled = SubscriptionRepo::update_status_by_ref(
                &state.pool,
                &subscription_ref,
                SubscriptionStatus::Canceled.as_str(),
            )
            .await?;
            match canceled {
                Some(sub) => {
                    tracing::info!(subscription_id = sub.id, "Subscription canceled");
                    state.event_bus.publish(
                        SiteEvent::new(SUBSCRIPTION_CANCELED)
                            .with_source("subscription", sub.id)
                            .with_actor(Some(sub.user_id)),
                    );
                }
                None => tracing::warn!(%subscription_ref, "Cancel for unknown subscription"),
            }
        }
        WebhookAction::Ignore(action) => {
            tracing::debug!(%action, "Webhook ignored");
        }
    }

    Ok(Json(ReceivedResponse { received: true }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Mark the code used and record the payment in one transaction. A redelivered
/// webhook finds the code already used and records nothing.
async fn redeem_code(
    state: &AppState,
    code: &str,
    name: Option<String>,
    email: Option<String>,
    payment_ref: String,
) -> AppResult<()> {
    let payer = match email.as_deref() {
        Some(email) => UserRepo::find_by_email(&state.pool, email).await?,
        None => None,
    };
    let redemption = Redemption {
        email,
        name,
        payment_ref,
    };
    let redeemed =
        PaymentCodeRepo::redeem(&state.pool, code, &redemption, payer.map(|u| u.id)).await?;
    let Some((redeemed, payment)) = redeemed else {
        tracing::warn!(%code, "Payment code unknown or already redeemed");
        return Ok(());
    };
    tracing::info!(code_id = redeemed.id, payment_id = payment.id, "Payment code redeemed");

    state.event_bus.publish(
        SiteEvent::new(PAYMENT_CODE_REDEEMED)
            .with_source("payment_code", redeemed.id)
            .with_actor(payment.user_id)
            .with_message(redemption_message(
                &redeemed.code,
                redeemed.amount_cents,
                redemption.name.as_deref(),
                redemption.email.as_deref(),
            )),
    );
    Ok(())
}

struct Activation {
    user_id: DbId,
    plan: PlanType,
    subscription_ref: String,
    customer_ref: Option<String>,
    period_start: Option<Timestamp>,
    period_end: Option<Timestamp>,
    payment_ref: Option<String>,
}

async fn activate_subscription(state: &AppState, a: Activation) -> AppResult<()> {
    if UserRepo::find_by_id(&state.pool, a.user_id).await?.is_none() {
        tracing::warn!(user_id = a.user_id, "Subscription webhook for unknown user");
        return Ok(());
    }

    let sub = SubscriptionRepo::upsert_by_ref(
        &state.pool,
        &UpsertSubscription {
            user_id: a.user_id,
            subscription_ref: a.subscription_ref,
            customer_ref: a.customer_ref,
            plan_type: a.plan.as_str().to_string(),
            amount_cents: a.plan.monthly_price_cents(),
            status: SubscriptionStatus::Active.as_str().to_string(),
            current_period_start: a.period_start,
            current_period_end: a.period_end,
        },
    )
    .await?;
    tracing::info!(subscription_id = sub.id, plan = %sub.plan_type, "Subscription active");

    if let Some(payment_ref) = a.payment_ref {
        let recorded = PaymentRepo::create_once(
            &state.pool,
            &CreatePayment {
                user_id: Some(a.user_id),
                payment_ref,
                amount_cents: a.plan.monthly_price_cents(),
                currency: None,
                status: PaymentStatus::Succeeded.as_str().to_string(),
                payment_type: a.plan.payment_type().as_str().to_string(),
                payment_code_id: None,
            },
        )
        .await?;
        if recorded.is_none() {
            tracing::debug!(subscription_id = sub.id, "Subscription charge already recorded");
        }
    }

    state.event_bus.publish(
        SiteEvent::new(SUBSCRIPTION_ACTIVATED)
            .with_source("subscription", sub.id)
            .with_actor(Some(a.user_id)),
    );
    Ok(())
}

/// WhatsApp text for a redeemed code.
fn redemption_message(code: &str, cents: i64, name: Option<&str>, email: Option<&str>) -> String {
    format!(
        "*Pagamento Recebido!*\n\n\
         *Código:* {code}\n\
         *Valor:* €{}\n\
         *Nome:* {}\n\
         *Email:* {}",
        format_cents(cents),
        name.unwrap_or("-"),
        email.unwrap_or("-"),
    )
}
