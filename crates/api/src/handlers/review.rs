//! Handlers for the `/reviews` resource.
//!
//! Clients post reviews; they stay hidden until an admin approves them.

use agency_core::error::CoreError;
use agency_core::types::DbId;
use agency_db::models::review::{CreateReview, Review, ReviewWithAuthor};
use agency_db::repositories::ReviewRepo;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::SuccessResponse;
use crate::state::AppState;

/// Request body for `POST /reviews`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
    #[validate(length(min = 10, max = 500, message = "Comment must be 10-500 characters"))]
    pub comment: Option<String>,
}

/// GET /api/v1/reviews/approved
pub async fn list_approved(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ReviewWithAuthor>>> {
    Ok(Json(ReviewRepo::list_approved_with_authors(&state.pool).await?))
}

/// GET /api/v1/reviews (admin)
pub async fn list(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> AppResult<Json<Vec<Review>>> {
    Ok(Json(ReviewRepo::list(&state.pool).await?))
}

/// POST /api/v1/reviews
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(mut input): Json<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<Review>)> {
    // A blank comment means "no comment", not a too-short one.
    input.comment = input
        .comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    input.validate()?;

    let review = ReviewRepo::create(
        &state.pool,
        &CreateReview {
            user_id: auth.user_id,
            rating: input.rating,
            comment: input.comment,
        },
    )
    .await?;
    tracing::info!(review_id = review.id, user_id = auth.user_id, "Review submitted");
    Ok((StatusCode::CREATED, Json(review)))
}

/// PATCH /api/v1/reviews/{id}/approve (admin)
pub async fn approve(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<Review>> {
    let review = ReviewRepo::approve(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Review", id))?;
    Ok(Json(review))
}

/// DELETE /api/v1/reviews/{id} (admin)
pub async fn delete(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<SuccessResponse>> {
    if !ReviewRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Review", id).into());
    }
    Ok(Json(SuccessResponse::ok()))
}
