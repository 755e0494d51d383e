//! Chat transcript model.

use agency_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChatMessage {
    pub id: DbId,
    pub session_id: String,
    pub user_message: Option<String>,
    pub bot_response: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateChatMessage {
    pub session_id: String,
    pub user_message: Option<String>,
    pub bot_response: Option<String>,
}
