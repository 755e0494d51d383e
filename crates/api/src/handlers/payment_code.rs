//! Handlers for the `/payment-codes` resource.
//!
//! Admins issue six-digit codes for custom work. A client verifies a code,
//! then `process` opens a hosted checkout for its amount. The code is only
//! marked used when the provider's webhook confirms payment.

use std::collections::BTreeMap;

use agency_checkout::webhook::meta;
use agency_checkout::CheckoutRequest;
use agency_core::error::CoreError;
use agency_core::money::{format_cents, parse_amount};
use agency_core::payment_code::{
    default_description, generate_code, is_valid_code_format, RedemptionCheck,
    MAX_GENERATION_ATTEMPTS,
};
use agency_core::types::{Cents, DbId};
use agency_db::models::payment_code::{CreatePaymentCode, PaymentCode};
use agency_db::repositories::PaymentCodeRepo;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::SuccessResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

fn validate_code(code: &str) -> Result<(), ValidationError> {
    if is_valid_code_format(code.trim()) {
        Ok(())
    } else {
        Err(ValidationError::new("code").with_message("Code must be 6 digits".into()))
    }
}

#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct VerifiedCode {
    pub id: DbId,
    pub code: String,
    pub amount_cents: Cents,
    /// Decimal euros, e.g. `"150.00"`.
    pub amount: String,
    pub description: Option<String>,
}

/// Request body for `POST /payment-codes/process`.
#[derive(Debug, Deserialize, Validate)]
pub struct ProcessCodeRequest {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(custom(function = "validate_code"))]
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct ProcessCodeResponse {
    pub success: bool,
    pub checkout_url: String,
}

/// Admins type the amount as `"150,50"` or send a JSON number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Text(String),
    Number(serde_json::Number),
}

impl AmountInput {
    fn to_cents(&self) -> Result<Cents, AppError> {
        let text = match self {
            AmountInput::Text(s) => s.clone(),
            AmountInput::Number(n) => n.to_string(),
        };
        parse_amount(&text).map_err(|e| CoreError::Validation(e.to_string()).into())
    }
}

/// Request body for `POST /payment-codes`.
#[derive(Debug, Deserialize)]
pub struct CreateCodeRequest {
    pub amount: AmountInput,
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Public handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/payment-codes/verify
///
/// 404 for an unknown code, 400 for one already used.
pub async fn verify(
    State(state): State<AppState>,
    Json(input): Json<VerifyCodeRequest>,
) -> AppResult<Json<VerifiedCode>> {
    let code = input.code.trim();
    let found = PaymentCodeRepo::find_by_code(&state.pool, code).await?;
    RedemptionCheck::from_lookup(found.as_ref().map(|c| c.is_used)).for_verify(code)?;

    let found = found.ok_or_else(|| CoreError::not_found("PaymentCode", code))?;
    Ok(Json(VerifiedCode {
        id: found.id,
        amount: format_cents(found.amount_cents),
        amount_cents: found.amount_cents,
        code: found.code,
        description: found.description,
    }))
}

/// POST /api/v1/payment-codes/process
///
/// Open a hosted checkout for a redeemable code.
pub async fn process(
    State(state): State<AppState>,
    Json(input): Json<ProcessCodeRequest>,
) -> AppResult<Json<ProcessCodeResponse>> {
    input.validate()?;
    let code = input.code.trim();

    let found = PaymentCodeRepo::find_by_code(&state.pool, code).await?;
    RedemptionCheck::from_lookup(found.as_ref().map(|c| c.is_used)).for_checkout()?;
    let found = found.ok_or_else(|| CoreError::not_found("PaymentCode", code))?;

    let (Some(checkout), Some(whop)) = (state.checkout.as_ref(), state.config.whop.as_ref())
    else {
        return Err(AppError::InternalError("Checkout is not configured".into()));
    };
    let plan_id = whop
        .code_plan()
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    let description = found
        .description
        .clone()
        .unwrap_or_else(|| default_description(code));
    let metadata = BTreeMap::from([
        (meta::CODE.to_string(), code.to_string()),
        (meta::NAME.to_string(), input.name.trim().to_string()),
        (meta::EMAIL.to_string(), input.email.trim().to_string()),
        (meta::AMOUNT.to_string(), format_cents(found.amount_cents)),
        (meta::DESCRIPTION.to_string(), description),
    ]);

    let session = checkout
        .create_checkout_session(&CheckoutRequest {
            plan_id: plan_id.to_string(),
            redirect_url: state
                .config
                .public_url(&format!("/payment/success?code={code}")),
            metadata,
        })
        .await
        .map_err(|e| AppError::InternalError(format!("Checkout session failed: {e}")))?;

    tracing::info!(
        code_id = found.id,
        session_id = %session.id,
        "Checkout opened for payment code"
    );
    Ok(Json(ProcessCodeResponse {
        success: true,
        checkout_url: session.checkout_url,
    }))
}

// ---------------------------------------------------------------------------
// Admin handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/payment-codes (admin)
pub async fn list(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> AppResult<Json<Vec<PaymentCode>>> {
    Ok(Json(PaymentCodeRepo::list(&state.pool).await?))
}

/// POST /api/v1/payment-codes (admin)
///
/// Draws random codes until one is unused.
pub async fn create(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Json(input): Json<CreateCodeRequest>,
) -> AppResult<(StatusCode, Json<PaymentCode>)> {
    let amount_cents = input.amount.to_cents()?;
    let description = input
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    for _ in 0..MAX_GENERATION_ATTEMPTS {
        let code = generate_code();
        if PaymentCodeRepo::find_by_code(&state.pool, &code).await?.is_some() {
            continue;
        }
        let created = PaymentCodeRepo::create(
            &state.pool,
            &CreatePaymentCode {
                code,
                amount_cents,
                description,
            },
        )
        .await?;
        tracing::info!(code_id = created.id, amount_cents, "Payment code created");
        return Ok((StatusCode::CREATED, Json(created)));
    }

    Err(AppError::InternalError(format!(
        "No unused payment code found after {MAX_GENERATION_ATTEMPTS} attempts"
    )))
}

/// DELETE /api/v1/payment-codes/{id} (admin)
pub async fn delete(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<SuccessResponse>> {
    if !PaymentCodeRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("PaymentCode", id).into());
    }
    Ok(Json(SuccessResponse::ok()))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn amount_accepts_text_and_numbers() {
        let text: CreateCodeRequest =
            serde_json::from_value(serde_json::json!({ "amount": "150,50" })).unwrap();
        assert_eq!(text.amount.to_cents().unwrap(), 15_050);

        let number: CreateCodeRequest =
            serde_json::from_value(serde_json::json!({ "amount": 99.9 })).unwrap();
        assert_eq!(number.amount.to_cents().unwrap(), 9_990);
    }

    #[test]
    fn amount_rejects_garbage() {
        let input: CreateCodeRequest =
            serde_json::from_value(serde_json::json!({ "amount": "abc" })).unwrap();
        assert_matches!(
            input.amount.to_cents(),
            Err(AppError::Core(CoreError::Validation(_)))
        );
    }

    #[test]
    fn process_request_checks_every_field() {
        let input = ProcessCodeRequest {
            name: "A".into(),
            email: "not-an-email".into(),
            code: "12345".into(),
        };
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("code"));
    }
}
