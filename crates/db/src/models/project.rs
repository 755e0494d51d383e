//! Portfolio project model and DTOs.

use agency_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const MEDIA_TYPES: &[&str] = &["image", "video"];

/// A portfolio entry from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub project_url: Option<String>,
    pub media_type: String,
    pub is_active: bool,
    pub display_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub project_url: Option<String>,
    /// Defaults to `image` if omitted.
    pub media_type: Option<String>,
    /// Defaults to `true` if omitted.
    pub is_active: Option<bool>,
    /// Defaults to 0 if omitted.
    pub display_order: Option<i32>,
}

/// DTO for updating an existing project. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub project_url: Option<String>,
    pub media_type: Option<String>,
    pub is_active: Option<bool>,
    pub display_order: Option<i32>,
}
