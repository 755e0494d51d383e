//! Client review model and DTOs.

use agency_core::stats::ReviewFact;
use agency_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Review {
    pub id: DbId,
    pub user_id: DbId,
    pub rating: i32,
    pub comment: Option<String>,
    pub is_approved: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Review {
    pub fn fact(&self) -> ReviewFact {
        ReviewFact {
            rating: self.rating,
            is_approved: self.is_approved,
        }
    }
}

/// An approved review joined with its author for the public site.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReviewWithAuthor {
    pub id: DbId,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: Timestamp,
    pub author_name: String,
    pub author_avatar: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReview {
    pub user_id: DbId,
    pub rating: i32,
    pub comment: Option<String>,
}
