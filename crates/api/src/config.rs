use std::str::FromStr;

use agency_checkout::WhopConfig;
use agency_events::WhatsAppConfig;

use crate::auth::google::GoogleConfig;
use crate::auth::jwt::JwtConfig;

/// Raised at startup when a required variable is missing or malformed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// Integrations (Google, Whop, WhatsApp) are `None` when their credentials
/// are absent; the endpoints that need them degrade instead of failing startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Public URL of the site; checkout and OAuth redirects point here.
    pub public_base_url: String,
    /// Account that is always treated as admin.
    pub admin_email: Option<String>,
    /// How often the monthly report job wakes up (default: `3600`).
    pub monthly_report_interval_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    pub google: Option<GoogleConfig>,
    pub whop: Option<WhopConfig>,
    pub whatsapp: Option<WhatsAppConfig>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                 |
    /// |--------------------------------|-------------------------|
    /// | `HOST`                         | `0.0.0.0`               |
    /// | `PORT`                         | `3000`                  |
    /// | `CORS_ORIGINS`                 | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`         | `30`                    |
    /// | `PUBLIC_BASE_URL`              | `http://localhost:5000` |
    /// | `ADMIN_EMAIL`                  | unset                   |
    /// | `MONTHLY_REPORT_INTERVAL_SECS` | `3600`                  |
    ///
    /// JWT, Google, Whop and CallMeBot variables are read by their own
    /// config types.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = parse_var("PORT", 3000)?;

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs = parse_secs("REQUEST_TIMEOUT_SECS", 30)?;
        let monthly_report_interval_secs = parse_secs("MONTHLY_REPORT_INTERVAL_SECS", 3600)?;

        let public_base_url = optional_var("PUBLIC_BASE_URL")
            .unwrap_or_else(|| "http://localhost:5000".into())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            public_base_url,
            admin_email: optional_var("ADMIN_EMAIL"),
            monthly_report_interval_secs,
            jwt: JwtConfig::from_env()?,
            google: GoogleConfig::from_env(),
            whop: WhopConfig::from_env(),
            whatsapp: WhatsAppConfig::from_env(),
        })
    }

    /// Absolute URL on the public site, e.g. `public_url("/maintenance")`.
    pub fn public_url(&self, path: &str) -> String {
        format!("{}{path}", self.public_base_url)
    }
}

/// Read a variable, treating unset and blank the same.
pub(crate) fn optional_var(var: &'static str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a period in seconds. Zero is rejected: a zero timeout fails every
/// request and a zero interval panics the job timer.
fn parse_secs(var: &'static str, default: u64) -> Result<u64, ConfigError> {
    non_zero(var, parse_var(var, default)?)
}

fn non_zero(var: &'static str, secs: u64) -> Result<u64, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Invalid {
            var,
            value: secs.to_string(),
        });
    }
    Ok(secs)
}

/// Parse a variable, falling back to `default` when it is unset.
pub(crate) fn parse_var<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match optional_var(var) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}
