//! Maintenance subscription plans and statuses.

use serde::{Deserialize, Serialize};

use crate::payment::PaymentType;
use crate::types::Cents;

/// Monthly maintenance plans sold through hosted checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    SiteMaintenance,
    AppMaintenance,
}

impl PlanType {
    /// Parse the short key sent by the maintenance page (`site` / `app`).
    ///
    /// The stored names (`site_maintenance` / `app_maintenance`) are accepted too,
    /// since checkout metadata round-trips whichever the client sent.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "site" | "site_maintenance" => Some(Self::SiteMaintenance),
            "app" | "app_maintenance" => Some(Self::AppMaintenance),
            _ => None,
        }
    }

    /// Value stored in `subscriptions.plan_type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SiteMaintenance => "site_maintenance",
            Self::AppMaintenance => "app_maintenance",
        }
    }

    /// Short key used in checkout requests and metadata.
    pub fn key(&self) -> &'static str {
        match self {
            Self::SiteMaintenance => "site",
            Self::AppMaintenance => "app",
        }
    }

    /// Monthly price: 50 EUR for sites, 100 EUR for apps.
    pub fn monthly_price_cents(&self) -> Cents {
        match self {
            Self::SiteMaintenance => 5_000,
            Self::AppMaintenance => 10_000,
        }
    }

    /// Payment type recorded when a plan is charged.
    pub fn payment_type(&self) -> PaymentType {
        match self {
            Self::SiteMaintenance => PaymentType::MaintenanceSite,
            Self::AppMaintenance => PaymentType::MaintenanceApp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    PastDue,
    Canceled,
    Unpaid,
}

pub const VALID_SUBSCRIPTION_STATUSES: &[&str] = &["active", "past_due", "canceled", "unpaid"];

impl SubscriptionStatus {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "active" => Ok(Self::Active),
            "past_due" => Ok(Self::PastDue),
            "canceled" => Ok(Self::Canceled),
            "unpaid" => Ok(Self::Unpaid),
            _ => Err(format!(
                "Invalid subscription status '{s}'. Must be one of: {}",
                VALID_SUBSCRIPTION_STATUSES.join(", ")
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::PastDue => "past_due",
            Self::Canceled => "canceled",
            Self::Unpaid => "unpaid",
        }
    }
}
