//! Handlers for the `/auth` resource (Google sign-in, refresh, logout).
//!
//! Sign-in is a browser redirect flow, so its failures end in a redirect back
//! to the site (`?auth=failed`) rather than a JSON error. Tokens are handed
//! over in the URL fragment, which browsers never send to a server.

use agency_core::error::CoreError;
use agency_core::roles::role_for;
use agency_db::models::session::CreateSession;
use agency_db::models::user::{CreateUser, User};
use agency_db::repositories::{SessionRepo, UserRepo};
use axum::extract::{Query, State};
use axum::response::Redirect;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::google::GoogleProfile;
use crate::auth::jwt::{
    generate_access_token, generate_refresh_token, generate_state_token, hash_refresh_token,
    verify_state_token,
};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::SuccessResponse;
use crate::state::AppState;

/// Display name for Google accounts that do not share one.
const DEFAULT_DISPLAY_NAME: &str = "Usuário";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query string Google appends to the callback URL.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set instead of `code` when the user declines consent.
    pub error: Option<String>,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token pair returned by refresh (and encoded into the sign-in redirect).
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Public user info, also the body of `GET /auth/me`.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: agency_core::types::DbId,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: String,
}

impl UserInfo {
    pub fn from_user(user: &User, admin_email: Option<&str>) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            avatar_url: user.avatar_url.clone(),
            role: role_for(user.is_admin, &user.email, admin_email).to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/auth/google
///
/// Redirect to the Google consent screen with a signed `state`.
pub async fn google_redirect(State(state): State<AppState>) -> Redirect {
    let config = &state.config;
    let Some(google) = config.google.as_ref().filter(|_| state.identity.is_some()) else {
        return Redirect::to(&config.public_url("/?auth=unavailable"));
    };

    let url = generate_state_token(&config.jwt)
        .map_err(|e| e.to_string())
        .and_then(|token| google.authorize_url(&token).map_err(|e| e.to_string()));
    match url {
        Ok(url) => Redirect::to(&url),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build Google authorize URL");
            Redirect::to(&config.public_url("/?auth=failed"))
        }
    }
}

/// GET /api/v1/auth/google/callback
///
/// Verify `state`, exchange `code`, upsert the user and redirect back to the
/// site with the token pair in the fragment.
pub async fn google_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Redirect {
    match complete_sign_in(&state, params).await {
        Ok(auth) => {
            tracing::info!(user_id = auth.user.id, "User signed in with Google");
            Redirect::to(&state.config.public_url(&format!(
                "/?auth=success#access_token={}&refresh_token={}&expires_in={}",
                auth.access_token, auth.refresh_token, auth.expires_in
            )))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Google sign-in failed");
            Redirect::to(&state.config.public_url("/?auth=failed"))
        }
    }
}

/// GET /api/v1/auth/me
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<UserInfo>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", auth.user_id))?;
    Ok(Json(UserInfo::from_user(
        &user,
        state.config.admin_email.as_deref(),
    )))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for new access + refresh tokens.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_hash = hash_refresh_token(&input.refresh_token);

    let session = SessionRepo::find_by_refresh_token_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    // Rotation: the presented token is single-use.
    SessionRepo::revoke(&state.pool, session.id).await?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    Ok(Json(create_auth_response(&state, &user).await?))
}

/// POST /api/v1/auth/logout
///
/// Revoke all sessions for the authenticated user.
pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<SuccessResponse>> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    tracing::debug!(user_id = auth_user.user_id, revoked, "User logged out");
    Ok(Json(SuccessResponse::ok()))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn complete_sign_in(state: &AppState, params: CallbackParams) -> AppResult<AuthResponse> {
    if let Some(error) = params.error {
        return Err(AppError::Core(CoreError::Unauthorized(format!(
            "Consent denied: {error}"
        ))));
    }

    let identity = state
        .identity
        .as_ref()
        .ok_or_else(|| AppError::BadRequest("Google sign-in is not configured".into()))?;

    let state_ok = params
        .state
        .as_deref()
        .is_some_and(|s| verify_state_token(s, &state.config.jwt));
    if !state_ok {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid OAuth state".into(),
        )));
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".into()))?;

    let profile = identity
        .exchange_code(&code)
        .await
        .map_err(|e| AppError::InternalError(format!("Google code exchange failed: {e}")))?;

    let user = upsert_google_user(state, &profile).await?;
    create_auth_response(state, &user).await
}

/// Find the account for a Google profile: by Google id, else by e-mail
/// (linking the id), else create one.
async fn upsert_google_user(state: &AppState, profile: &GoogleProfile) -> AppResult<User> {
    if let Some(user) = UserRepo::find_by_google_id(&state.pool, &profile.id).await? {
        return Ok(user);
    }

    let email = profile
        .email
        .as_deref()
        .filter(|e| !e.is_empty())
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Google account has no e-mail address".into(),
            ))
        })?;

    if let Some(existing) = UserRepo::find_by_email(&state.pool, email).await? {
        let linked = UserRepo::link_google_id(
            &state.pool,
            existing.id,
            &profile.id,
            profile.name.as_deref(),
            profile.picture.as_deref(),
        )
        .await?
        .ok_or_else(|| CoreError::not_found("User", existing.id))?;
        tracing::info!(user_id = linked.id, "Linked Google account to existing user");
        return Ok(linked);
    }

    let admin_email = state.config.admin_email.as_deref();
    let input = CreateUser {
        google_id: Some(profile.id.clone()),
        email: email.to_string(),
        username: generated_username(email),
        display_name: Some(
            profile
                .name
                .clone()
                .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
        ),
        avatar_url: profile.picture.clone(),
        is_admin: admin_email.is_some_and(|a| a.eq_ignore_ascii_case(email)),
    };
    let user = UserRepo::create(&state.pool, &input).await?;
    tracing::info!(user_id = user.id, is_admin = user.is_admin, "Created user from Google profile");
    Ok(user)
}

/// `<local-part>_<unix-millis>`, unique enough for a first sign-in.
fn generated_username(email: &str) -> String {
    let local = email.split('@').next().unwrap_or(email);
    format!("{local}_{}", Utc::now().timestamp_millis())
}

/// Generate access + refresh tokens, persist a session row, and build the response.
async fn create_auth_response(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let info = UserInfo::from_user(user, state.config.admin_email.as_deref());

    let access_token = generate_access_token(user.id, &info.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();
    let expires_at =
        Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days);

    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: refresh_hash,
            expires_at,
        },
    )
    .await?;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user: info,
    })
}
