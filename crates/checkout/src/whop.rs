//! Whop checkout client.

use std::time::Duration;

use agency_core::subscription::PlanType;
use async_trait::async_trait;

use crate::provider::{CheckoutError, CheckoutProvider, CheckoutRequest, CheckoutSession};

pub const DEFAULT_WHOP_API_BASE: &str = "https://api.whop.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct WhopConfig {
    pub api_key: String,
    pub api_base: String,
    /// Plan charged for one-off payment codes.
    pub code_plan_id: Option<String>,
    pub site_plan_id: Option<String>,
    pub app_plan_id: Option<String>,
    /// Shared secret for webhook signatures; unsigned webhooks are accepted when unset.
    pub webhook_secret: Option<String>,
}

impl WhopConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `WHOP_API_KEY` is not set, which disables checkout.
    ///
    /// | Variable              | Required | Default                |
    /// |-----------------------|----------|------------------------|
    /// | `WHOP_API_KEY`        | yes      |                        |
    /// | `WHOP_API_BASE`       | no       | `https://api.whop.com` |
    /// | `WHOP_PLAN_ID`        | no       | (code payments off)    |
    /// | `WHOP_PLAN_SITE_ID`   | no       | (site plan off)        |
    /// | `WHOP_PLAN_APP_ID`    | no       | (app plan off)         |
    /// | `WHOP_WEBHOOK_SECRET` | no       | (signatures unchecked) |
    pub fn from_env() -> Option<Self> {
        let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Some(Self {
            api_key: non_empty("WHOP_API_KEY")?,
            api_base: non_empty("WHOP_API_BASE")
                .unwrap_or_else(|| DEFAULT_WHOP_API_BASE.to_string()),
            code_plan_id: non_empty("WHOP_PLAN_ID"),
            site_plan_id: non_empty("WHOP_PLAN_SITE_ID"),
            app_plan_id: non_empty("WHOP_PLAN_APP_ID"),
            webhook_secret: non_empty("WHOP_WEBHOOK_SECRET"),
        })
    }

    /// Plan id for a maintenance subscription.
    pub fn plan_for(&self, plan: PlanType) -> Result<&str, CheckoutError> {
        let id = match plan {
            PlanType::SiteMaintenance => self.site_plan_id.as_deref(),
            PlanType::AppMaintenance => self.app_plan_id.as_deref(),
        };
        id.ok_or_else(|| CheckoutError::MissingPlan(plan.as_str().to_string()))
    }

    /// Plan id for payment-code checkouts.
    pub fn code_plan(&self) -> Result<&str, CheckoutError> {
        self.code_plan_id
            .as_deref()
            .ok_or_else(|| CheckoutError::MissingPlan("code_payment".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct WhopClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl WhopClient {
    pub fn new(config: &WhopConfig) -> Result<Self, CheckoutError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            endpoint: format!(
                "{}/api/v5/checkout_sessions",
                config.api_base.trim_end_matches('/')
            ),
        })
    }
}

#[async_trait]
impl CheckoutProvider for WhopClient {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, CheckoutError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), %body, "Whop checkout session request failed");
            return Err(CheckoutError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let session = response.json::<CheckoutSession>().await?;
        tracing::info!(session_id = %session.id, plan_id = %request.plan_id, "Checkout session created");
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn config() -> WhopConfig {
        WhopConfig {
            api_key: "k".into(),
            api_base: "https://whop.test/".into(),
            site_plan_id: Some("plan_site".into()),
            ..WhopConfig::default()
        }
    }

    #[test]
    fn plan_lookup_reports_missing_plans() {
        let cfg = config();
        assert_eq!(cfg.plan_for(PlanType::SiteMaintenance).unwrap(), "plan_site");
        assert_matches!(
            cfg.plan_for(PlanType::AppMaintenance),
            Err(CheckoutError::MissingPlan(p)) if p == "app_maintenance"
        );
        assert_matches!(cfg.code_plan(), Err(CheckoutError::MissingPlan(_)));
    }

    #[test]
    fn endpoint_joins_base_without_double_slash() {
        let client = WhopClient::new(&config()).unwrap();
        assert_eq!(client.endpoint, "https://whop.test/api/v5/checkout_sessions");
    }

    #[test]
    fn request_serializes_provider_fields() {
        let request = CheckoutRequest {
            plan_id: "plan_1".into(),
            redirect_url: "http://localhost:5000/payment/success?code=123456".into(),
            metadata: [("code".to_string(), "123456".to_string())].into(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["plan_id"], "plan_1");
        assert_eq!(json["metadata"]["code"], "123456");
    }
}
