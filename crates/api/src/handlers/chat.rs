//! Handler for the scripted chat widget.

use agency_core::chatbot::{reply, BotResponse};
use agency_db::models::chat_message::CreateChatMessage;
use agency_db::repositories::ChatMessageRepo;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Request body for `POST /chat`. Either `message` (free text) or `action`
/// (an option the bot offered) must be present; `action` wins when both are.
#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 100, message = "Session id must be 1-100 characters"))]
    pub session_id: String,
    #[validate(length(max = 1000, message = "Message must be at most 1000 characters"))]
    pub message: Option<String>,
    pub action: Option<String>,
}

/// POST /api/v1/chat
pub async fn send(
    State(state): State<AppState>,
    Json(input): Json<ChatRequest>,
) -> AppResult<Json<BotResponse>> {
    input.validate()?;
    let response = reply(input.message.as_deref(), input.action.as_deref())
        .ok_or_else(|| AppError::BadRequest("Either message or action is required".into()))?;

    let user_message = input
        .action
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .or_else(|| input.message.as_deref().map(str::trim))
        .map(str::to_string);
    ChatMessageRepo::create(
        &state.pool,
        &CreateChatMessage {
            session_id: input.session_id,
            user_message,
            bot_response: Some(response.text.to_string()),
        },
    )
    .await?;

    Ok(Json(response))
}
