//! Provider-agnostic checkout types.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Checkout provider returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("No plan configured for {0}")]
    MissingPlan(String),
}

/// What to sell and where to send the buyer afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutRequest {
    pub plan_id: String,
    pub redirect_url: String,
    /// Echoed back verbatim in webhook payloads.
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub checkout_url: String,
}

#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, CheckoutError>;
}
