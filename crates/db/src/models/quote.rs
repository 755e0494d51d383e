//! Quote request model and DTOs.

use agency_core::quote::QuoteDraft;
use agency_core::stats::QuoteFact;
use agency_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `quotes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Quote {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub country_code: String,
    pub service_type: String,
    pub business_segment: String,
    pub additionals: Vec<String>,
    pub project_description: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Quote {
    pub fn fact(&self) -> QuoteFact {
        QuoteFact {
            status: self.status.clone(),
            service_type: self.service_type.clone(),
            created_at: self.created_at,
        }
    }
}

/// DTO for inserting a validated quote. Status always starts as `pending`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuote {
    pub user_id: Option<DbId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub country_code: String,
    pub service_type: String,
    pub business_segment: String,
    pub additionals: Vec<String>,
    pub project_description: Option<String>,
}

impl CreateQuote {
    /// Build the insert DTO from a normalized, validated draft.
    pub fn from_draft(draft: &QuoteDraft, user_id: Option<DbId>) -> Self {
        let description = draft.project_description.trim();
        Self {
            user_id,
            first_name: draft.first_name.clone(),
            last_name: draft.last_name.clone(),
            email: draft.email.clone(),
            phone: draft.phone.clone(),
            country_code: draft.country_code.clone(),
            service_type: draft.service_type.clone(),
            business_segment: draft.business_segment.clone(),
            additionals: draft.additionals.clone(),
            project_description: (!description.is_empty()).then(|| description.to_string()),
        }
    }
}
