//! Google OAuth 2.0 authorization-code flow.
//!
//! [`GoogleConfig::authorize_url`] builds the consent redirect; the callback
//! hands the returned `code` to an [`IdentityProvider`], which exchanges it
//! for the user's profile. [`GoogleClient`] talks to Google; tests substitute
//! their own provider.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::optional_var;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const SCOPES: &str = "profile email";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Must match a redirect URI registered with Google.
    pub callback_url: String,
}

impl GoogleConfig {
    /// `None` unless `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET` and
    /// `GOOGLE_CALLBACK_URL` are all set.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            client_id: optional_var("GOOGLE_CLIENT_ID")?,
            client_secret: optional_var("GOOGLE_CLIENT_SECRET")?,
            callback_url: optional_var("GOOGLE_CALLBACK_URL")?,
        })
    }

    /// Consent screen URL carrying our signed `state`.
    pub fn authorize_url(&self, state: &str) -> Result<String, OAuthError> {
        let url = reqwest::Url::parse_with_params(
            AUTHORIZE_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.callback_url.as_str()),
                ("response_type", "code"),
                ("scope", SCOPES),
                ("state", state),
            ],
        )
        .map_err(|e| OAuthError::Url(e.to_string()))?;
        Ok(url.into())
    }
}

/// The profile fields we keep from the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GoogleProfile {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Identity provider returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid authorize URL: {0}")]
    Url(String),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Trade an authorization code for the signed-in user's profile.
    async fn exchange_code(&self, code: &str) -> Result<GoogleProfile, OAuthError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

pub struct GoogleClient {
    client: reqwest::Client,
    config: GoogleConfig,
}

impl GoogleClient {
    pub fn new(config: GoogleConfig) -> Result<Self, OAuthError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, OAuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(OAuthError::Api {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl IdentityProvider for GoogleClient {
    async fn exchange_code(&self, code: &str) -> Result<GoogleProfile, OAuthError> {
        let response = self
            .client
            .post(TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.callback_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;
        let token: TokenResponse = ensure_success(response).await?.json().await?;

        let response = self
            .client
            .get(USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await?;
        let profile: GoogleProfile = ensure_success(response).await?.json().await?;
        tracing::debug!(google_id = %profile.id, "Fetched Google profile");
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorize_url_carries_state_and_callback() {
        let config = GoogleConfig {
            client_id: "client-123".into(),
            client_secret: "secret".into(),
            callback_url: "http://localhost:3000/api/v1/auth/google/callback".into(),
        };
        let url = config.authorize_url("abc.def").unwrap();
        assert!(url.starts_with(AUTHORIZE_URL));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("state=abc.def"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fapi%2Fv1%2Fauth%2Fgoogle%2Fcallback"
        ));
        assert!(url.contains("scope=profile+email"));
    }
}
