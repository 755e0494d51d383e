//! Repository for the `chat_messages` table.

use sqlx::PgPool;

use crate::models::chat_message::{ChatMessage, CreateChatMessage};

const COLUMNS: &str = "id, session_id, user_message, bot_response, created_at, updated_at";

pub struct ChatMessageRepo;

impl ChatMessageRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateChatMessage,
    ) -> Result<ChatMessage, sqlx::Error> {
        let query = format!(
            "INSERT INTO chat_messages (session_id, user_message, bot_response)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ChatMessage>(&query)
            .bind(&input.session_id)
            .bind(&input.user_message)
            .bind(&input.bot_response)
            .fetch_one(pool)
            .await
    }

    /// A session's transcript in the order it happened.
    pub async fn list_by_session(
        pool: &PgPool,
        session_id: &str,
    ) -> Result<Vec<ChatMessage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM chat_messages WHERE session_id = $1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, ChatMessage>(&query)
            .bind(session_id)
            .fetch_all(pool)
            .await
    }
}
