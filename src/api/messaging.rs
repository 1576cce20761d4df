//! Messaging resource API

use crate::error::Result;
use crate::models::message::{Conversation, Message, SendMessageRequest};
use crate::session::SessionManager;
use std::sync::Arc;
use uuid::Uuid;

/// Client for the messaging endpoints.
pub struct MessagingApi {
    session: Arc<SessionManager>,
}

impl MessagingApi {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    pub async fn conversations(&self) -> Result<Vec<Conversation>> {
        self.session.get("/messaging/conversations/").await
    }

    pub async fn messages(&self, conversation_id: Uuid) -> Result<Vec<Message>> {
        self.session
            .get(&format!("/messaging/conversations/{}/messages/", conversation_id))
            .await
    }

    pub async fn send(&self, conversation_id: Uuid, content: &str) -> Result<Message> {
        let request = SendMessageRequest {
            content: content.to_string(),
        };
        self.session
            .post(
                &format!("/messaging/conversations/{}/messages/", conversation_id),
                &request,
            )
            .await
    }
}
