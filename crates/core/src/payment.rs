//! Payment type and status vocabularies.

use serde::{Deserialize, Serialize};

pub const DEFAULT_CURRENCY: &str = "EUR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    MaintenanceSite,
    MaintenanceApp,
    CodePayment,
    Custom,
}

impl PaymentType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "maintenance_site" => Some(Self::MaintenanceSite),
            "maintenance_app" => Some(Self::MaintenanceApp),
            "code_payment" => Some(Self::CodePayment),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MaintenanceSite => "maintenance_site",
            Self::MaintenanceApp => "maintenance_app",
            Self::CodePayment => "code_payment",
            Self::Custom => "custom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Failed,
}

impl PaymentStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "succeeded" => Some(Self::Succeeded),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}
