//! Handlers for the `/quotes` resource.

use agency_core::error::CoreError;
use agency_core::quote::{
    notification_message, validate_all, validate_step, QuoteDraft, QuoteStatus, QuoteStep,
    ServiceType, ADDITIONALS, BUSINESS_SEGMENTS, COUNTRY_CODES, DEFAULT_COUNTRY_CODE, STEP_COUNT,
};
use agency_core::types::DbId;
use agency_db::models::quote::{CreateQuote, Quote};
use agency_db::repositories::QuoteRepo;
use agency_events::bus::QUOTE_SUBMITTED;
use agency_events::SiteEvent;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::MaybeAuth;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct UpdateQuoteStatus {
    pub status: String,
}

/// Result of validating one wizard step.
#[derive(Debug, Serialize)]
pub struct StepValidation {
    pub step: u8,
    pub title: &'static str,
    /// `None` after the last step: the form is ready to submit.
    pub next_step: Option<u8>,
    pub progress_percent: u8,
}

#[derive(Debug, Serialize)]
pub struct LabeledOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// Choices the quote form offers.
#[derive(Debug, Serialize)]
pub struct QuoteCatalog {
    pub service_types: Vec<LabeledOption>,
    pub business_segments: &'static [&'static str],
    pub additionals: Vec<LabeledOption>,
    pub country_codes: Vec<LabeledOption>,
    pub default_country_code: &'static str,
}

fn labeled(pairs: &'static [(&'static str, &'static str)]) -> Vec<LabeledOption> {
    pairs
        .iter()
        .map(|&(value, label)| LabeledOption { value, label })
        .collect()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/quotes/catalog
pub async fn catalog() -> Json<QuoteCatalog> {
    Json(QuoteCatalog {
        service_types: [ServiceType::Website, ServiceType::App]
            .into_iter()
            .map(|s| LabeledOption {
                value: s.as_str(),
                label: s.label(),
            })
            .collect(),
        business_segments: BUSINESS_SEGMENTS,
        additionals: labeled(ADDITIONALS),
        country_codes: labeled(COUNTRY_CODES),
        default_country_code: DEFAULT_COUNTRY_CODE,
    })
}

/// POST /api/v1/quotes/steps/{step}/validate
///
/// Validate the fields of a single wizard step (1-5) so the form can show
/// errors before the final submit.
pub async fn validate_wizard_step(
    Path(step): Path<u8>,
    Json(draft): Json<QuoteDraft>,
) -> AppResult<Json<StepValidation>> {
    let step = QuoteStep::from_number(step)
        .filter(|s| *s != QuoteStep::Submitted)
        .ok_or_else(|| {
            AppError::BadRequest(format!("Step must be between 1 and {STEP_COUNT}"))
        })?;

    validate_step(step, &draft.normalized())?;

    let n = step.number();
    Ok(Json(StepValidation {
        step: n,
        title: step.title(),
        next_step: (n < STEP_COUNT).then_some(n + 1),
        progress_percent: (u16::from(n) * 100 / u16::from(STEP_COUNT)) as u8,
    }))
}

/// POST /api/v1/quotes
///
/// Open to visitors; a signed-in client's quote is linked to their account.
/// New quotes always start as `pending`.
pub async fn create(
    State(state): State<AppState>,
    auth: MaybeAuth,
    Json(draft): Json<QuoteDraft>,
) -> AppResult<(StatusCode, Json<Quote>)> {
    let draft = draft.normalized();
    validate_all(&draft)?;

    let quote = QuoteRepo::create(&state.pool, &CreateQuote::from_draft(&draft, auth.user_id()))
        .await?;
    tracing::info!(quote_id = quote.id, service_type = %quote.service_type, "Quote submitted");

    state.event_bus.publish(
        SiteEvent::new(QUOTE_SUBMITTED)
            .with_source("quote", quote.id)
            .with_actor(auth.user_id())
            .with_message(notification_message(&draft)),
    );

    Ok((StatusCode::CREATED, Json(quote)))
}

/// GET /api/v1/quotes (admin)
pub async fn list(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> AppResult<Json<Vec<Quote>>> {
    Ok(Json(QuoteRepo::list(&state.pool).await?))
}

/// PATCH /api/v1/quotes/{id}/status (admin)
pub async fn update_status(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateQuoteStatus>,
) -> AppResult<Json<Quote>> {
    let status = QuoteStatus::parse(&input.status).map_err(CoreError::Validation)?;
    let quote = QuoteRepo::update_status(&state.pool, id, status.as_str())
        .await?
        .ok_or_else(|| CoreError::not_found("Quote", id))?;
    Ok(Json(quote))
}
