//! User entity model and DTOs.

use agency_core::roles::{ROLE_ADMIN, ROLE_CLIENT};
use agency_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub google_id: Option<String>,
    pub email: String,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub is_admin: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    pub fn role(&self) -> &'static str {
        if self.is_admin {
            ROLE_ADMIN
        } else {
            ROLE_CLIENT
        }
    }
}

/// DTO for creating a new user from an identity-provider profile.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub google_id: Option<String>,
    pub email: String,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub is_admin: bool,
}
