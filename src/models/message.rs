//! Messaging domain models
//! Pass-through DTOs only; delivery semantics live on the server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Conversation between platform users
#[derive(Debug, Clone, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub conversation_type: String,
    pub status: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub last_message_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message_count: u32,
    pub created_at: DateTime<Utc>,
}

/// Single message within a conversation
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation: Uuid,
    pub sender: Uuid,
    #[serde(default)]
    pub sender_name: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Send message request
#[derive(Debug, Serialize)]
pub struct SendMessageRequest {
    pub content: String,
}
