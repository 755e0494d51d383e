//! Checkout webhook handling: signature check and event classification.
//!
//! Payment events carry the metadata we attached when creating the checkout
//! session, which tells us whether the purchase redeemed a payment code or
//! started a maintenance subscription.

use std::collections::HashMap;

use agency_core::subscription::PlanType;
use agency_core::types::{DbId, Timestamp};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the hex HMAC-SHA256 of the raw request body.
pub const SIGNATURE_HEADER: &str = "x-whop-signature";

pub const PAYMENT_SUCCEEDED: &str = "payment.succeeded";
pub const MEMBERSHIP_WENT_VALID: &str = "membership.went_valid";
pub const MEMBERSHIP_WENT_INVALID: &str = "membership.went_invalid";

/// Metadata keys set on checkout sessions.
pub mod meta {
    pub const CODE: &str = "code";
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const AMOUNT: &str = "amount";
    pub const DESCRIPTION: &str = "description";
    pub const USER_ID: &str = "userId";
    pub const PLAN_TYPE: &str = "planType";
}

/// Fallback payment reference when the provider omits an id.
const FALLBACK_PAYMENT_REF: &str = "whop_payment";

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// Check `signature` (hex, optionally prefixed `sha256=`) against the body.
///
/// Comparison is constant time.
pub fn verify_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let signature = signature.trim();
    let signature = signature.strip_prefix("sha256=").unwrap_or(signature);
    let Ok(expected) = hex::decode(signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Hex HMAC-SHA256 of `body`, as the provider would sign it.
pub fn sign(secret: &str, body: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(body);
    Some(hex::encode(mac.finalize().into_bytes()))
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub action: String,
    #[serde(default)]
    pub data: WebhookData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookData {
    pub id: Option<String>,
    /// Present on payment events that belong to a membership.
    pub membership_id: Option<String>,
    /// Provider-side customer id.
    pub user_id: Option<String>,
    /// Unix seconds.
    pub renewal_period_start: Option<i64>,
    pub renewal_period_end: Option<i64>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl WebhookData {
    /// Metadata value as a trimmed, non-empty string. Numbers are stringified.
    pub fn metadata_str(&self, key: &str) -> Option<String> {
        let value = match self.metadata.get(key)? {
            serde_json::Value::String(s) => s.trim().to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => return None,
        };
        (!value.is_empty()).then_some(value)
    }
}

fn from_unix(secs: Option<i64>) -> Option<Timestamp> {
    secs.and_then(|s| DateTime::<Utc>::from_timestamp(s, 0))
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// What the API should do in response to a webhook.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookAction {
    /// Redeem a payment code and record a `code_payment`.
    RedeemCode {
        code: String,
        name: Option<String>,
        email: Option<String>,
        payment_ref: String,
    },
    /// Activate (or refresh) a maintenance subscription.
    ActivateSubscription {
        user_id: DbId,
        plan: PlanType,
        subscription_ref: String,
        customer_ref: Option<String>,
        period_start: Option<Timestamp>,
        period_end: Option<Timestamp>,
        /// Set for `payment.succeeded`; membership events carry no charge.
        payment_ref: Option<String>,
    },
    CancelSubscription { subscription_ref: String },
    /// Event type we do not act on, or one missing the metadata we need.
    Ignore(String),
}

impl WebhookEvent {
    pub fn classify(&self) -> WebhookAction {
        let data = &self.data;
        match self.action.as_str() {
            PAYMENT_SUCCEEDED | MEMBERSHIP_WENT_VALID => {
                let is_payment = self.action == PAYMENT_SUCCEEDED;
                if let Some(code) = data.metadata_str(meta::CODE) {
                    return WebhookAction::RedeemCode {
                        code,
                        name: data.metadata_str(meta::NAME),
                        email: data.metadata_str(meta::EMAIL),
                        payment_ref: data
                            .id
                            .clone()
                            .unwrap_or_else(|| FALLBACK_PAYMENT_REF.to_string()),
                    };
                }

                let user_id = data
                    .metadata_str(meta::USER_ID)
                    .and_then(|v| v.parse::<DbId>().ok());
                let plan = data
                    .metadata_str(meta::PLAN_TYPE)
                    .and_then(|v| PlanType::parse(&v));
                let subscription_ref = if is_payment {
                    data.membership_id.clone().or_else(|| data.id.clone())
                } else {
                    data.id.clone()
                };

                match (user_id, plan, subscription_ref) {
                    (Some(user_id), Some(plan), Some(subscription_ref)) => {
                        WebhookAction::ActivateSubscription {
                            user_id,
                            plan,
                            subscription_ref,
                            customer_ref: data.user_id.clone(),
                            period_start: from_unix(data.renewal_period_start),
                            period_end: from_unix(data.renewal_period_end),
                            payment_ref: if is_payment { data.id.clone() } else { None },
                        }
                    }
                    _ => WebhookAction::Ignore(self.action.clone()),
                }
            }
            MEMBERSHIP_WENT_INVALID => match &data.id {
                Some(id) => WebhookAction::CancelSubscription {
                    subscription_ref: id.clone(),
                },
                None => WebhookAction::Ignore(self.action.clone()),
            },
            other => WebhookAction::Ignore(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn event(value: serde_json::Value) -> WebhookEvent {
        serde_json::from_value(value).unwrap()
    }

    // -- Signature ---------------------------------------------------------

    #[test]
    fn signature_round_trip_and_tamper() {
        let body = br#"{"action":"payment.succeeded"}"#;
        let sig = sign("s3cret", body).unwrap();
        assert!(verify_signature("s3cret", body, &sig));
        assert!(verify_signature("s3cret", body, &format!("sha256={sig}")));
        assert!(!verify_signature("other", body, &sig));
        assert!(!verify_signature("s3cret", b"{}", &sig));
        assert!(!verify_signature("s3cret", body, "not-hex"));
    }

    // -- Classification ----------------------------------------------------

    #[test]
    fn code_metadata_redeems_code() {
        let e = event(json!({
            "action": "payment.succeeded",
            "data": {
                "id": "pay_1",
                "metadata": {"code": "123456", "name": "Ana", "email": "ana@example.com", "amount": 150.5}
            }
        }));
        assert_eq!(
            e.classify(),
            WebhookAction::RedeemCode {
                code: "123456".into(),
                name: Some("Ana".into()),
                email: Some("ana@example.com".into()),
                payment_ref: "pay_1".into(),
            }
        );
        assert_eq!(e.data.metadata_str(meta::AMOUNT).as_deref(), Some("150.5"));
    }

    #[test]
    fn missing_payment_id_uses_fallback_ref() {
        let e = event(json!({
            "action": "membership.went_valid",
            "data": {"metadata": {"code": "654321"}}
        }));
        assert_matches!(
            e.classify(),
            WebhookAction::RedeemCode { payment_ref, .. } if payment_ref == "whop_payment"
        );
    }

    #[test]
    fn plan_metadata_activates_subscription() {
        let e = event(json!({
            "action": "payment.succeeded",
            "data": {
                "id": "pay_9",
                "membership_id": "mem_3",
                "user_id": "user_x",
                "renewal_period_start": 1767225600,
                "renewal_period_end": 1769904000,
                "metadata": {"userId": "42", "planType": "app", "email": "c@example.com"}
            }
        }));
        assert_matches!(
            e.classify(),
            WebhookAction::ActivateSubscription {
                user_id: 42,
                plan: PlanType::AppMaintenance,
                subscription_ref,
                customer_ref: Some(customer),
                period_start: Some(_),
                period_end: Some(_),
                payment_ref: Some(payment),
            } if subscription_ref == "mem_3" && customer == "user_x" && payment == "pay_9"
        );
    }

    #[test]
    fn membership_valid_records_no_payment() {
        let e = event(json!({
            "action": "membership.went_valid",
            "data": {"id": "mem_3", "metadata": {"userId": 42, "planType": "site"}}
        }));
        assert_matches!(
            e.classify(),
            WebhookAction::ActivateSubscription { subscription_ref, payment_ref: None, .. }
                if subscription_ref == "mem_3"
        );
    }

    #[test]
    fn went_invalid_cancels() {
        let e = event(json!({"action": "membership.went_invalid", "data": {"id": "mem_3"}}));
        assert_eq!(
            e.classify(),
            WebhookAction::CancelSubscription { subscription_ref: "mem_3".into() }
        );
    }

    #[test]
    fn unknown_or_incomplete_events_are_ignored() {
        let e = event(json!({"action": "refund.created"}));
        assert_eq!(e.classify(), WebhookAction::Ignore("refund.created".into()));

        let e = event(json!({
            "action": "payment.succeeded",
            "data": {"id": "pay_1", "metadata": {"userId": "abc", "planType": "site"}}
        }));
        assert_matches!(e.classify(), WebhookAction::Ignore(_));
    }

    #[test]
    fn missing_action_fails_to_parse() {
        assert!(serde_json::from_value::<WebhookEvent>(json!({"data": {}})).is_err());
    }
}
