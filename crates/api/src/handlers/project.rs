//! Handlers for the `/projects` resource (portfolio entries).

use agency_core::error::CoreError;
use agency_core::types::DbId;
use agency_db::models::project::{CreateProject, Project, UpdateProject, MEDIA_TYPES};
use agency_db::repositories::ProjectRepo;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::SuccessResponse;
use crate::state::AppState;

fn validate_media_type(value: &str) -> Result<(), ValidationError> {
    if MEDIA_TYPES.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new("media_type")
            .with_message(format!("Media type must be one of: {}", MEDIA_TYPES.join(", ")).into()))
    }
}

/// Request body for `POST /projects`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required (max 200 characters)"))]
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub project_url: Option<String>,
    #[validate(custom(function = "validate_media_type"))]
    pub media_type: Option<String>,
    pub is_active: Option<bool>,
    pub display_order: Option<i32>,
}

impl From<CreateProjectRequest> for CreateProject {
    fn from(r: CreateProjectRequest) -> Self {
        Self {
            title: r.title.trim().to_string(),
            description: r.description,
            image_url: r.image_url,
            project_url: r.project_url,
            media_type: r.media_type,
            is_active: r.is_active,
            display_order: r.display_order,
        }
    }
}

/// Request body for `PATCH /projects/{id}`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub project_url: Option<String>,
    #[validate(custom(function = "validate_media_type"))]
    pub media_type: Option<String>,
    pub is_active: Option<bool>,
    pub display_order: Option<i32>,
}

impl From<UpdateProjectRequest> for UpdateProject {
    fn from(r: UpdateProjectRequest) -> Self {
        Self {
            title: r.title.map(|t| t.trim().to_string()),
            description: r.description,
            image_url: r.image_url,
            project_url: r.project_url,
            media_type: r.media_type,
            is_active: r.is_active,
            display_order: r.display_order,
        }
    }
}

/// GET /api/v1/projects
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Project>>> {
    Ok(Json(ProjectRepo::list(&state.pool).await?))
}

/// GET /api/v1/projects/active
pub async fn list_active(State(state): State<AppState>) -> AppResult<Json<Vec<Project>>> {
    Ok(Json(ProjectRepo::list_active(&state.pool).await?))
}

/// POST /api/v1/projects (admin)
pub async fn create(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Json(input): Json<CreateProjectRequest>,
) -> AppResult<(StatusCode, Json<Project>)> {
    input.validate()?;
    let project = ProjectRepo::create(&state.pool, &input.into()).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// PATCH /api/v1/projects/{id} (admin)
pub async fn update(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProjectRequest>,
) -> AppResult<Json<Project>> {
    input.validate()?;
    let project = ProjectRepo::update(&state.pool, id, &input.into())
        .await?
        .ok_or_else(|| CoreError::not_found("Project", id))?;
    Ok(Json(project))
}

/// DELETE /api/v1/projects/{id} (admin)
pub async fn delete(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<SuccessResponse>> {
    if !ProjectRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Project", id).into());
    }
    Ok(Json(SuccessResponse::ok()))
}
