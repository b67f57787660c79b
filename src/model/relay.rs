use log::{error, info};
use std::sync::Arc;

use super::GroqClient;
use crate::web::error::RelayError;
use crate::web::models::{ChatReply, ChatRequest, Message, Role};

pub const NO_CONTENT_REPLY: &str = "(No content returned from Groq API.)";

/// Turns one `/chat` body into one upstream call. Holds no per-request state;
/// the caller resends the conversation every time.
pub struct ChatRelay {
    client: Option<GroqClient>,
    system_prompt: Arc<str>,
}

impl ChatRelay {
    /// `client` is `None` when no credential is configured; every chat request
    /// then fails before any network traffic.
    pub fn new(client: Option<GroqClient>, system_prompt: impl Into<Arc<str>>) -> Self {
        Self {
            client,
            system_prompt: system_prompt.into(),
        }
    }

    /// `body` is the raw payload, or the reason it could not be read. A read
    /// failure is only reported once the credential check has passed.
    pub async fn handle<B>(&self, body: Result<B, RelayError>) -> Result<ChatReply, RelayError>
    where
        B: AsRef<[u8]>,
    {
        let client = self.client.as_ref().ok_or(RelayError::MissingCredential)?;
        let body = body?;
        let request = ChatRequest::parse(body.as_ref())?;

        info!(
            "Chat request: {} bytes, {} history turns",
            request.message.len(),
            request.conversation.len()
        );

        let messages = self.build_messages(request);
        let content = client.complete(&messages).await.map_err(|e| {
            error!("Groq error: {}", e);
            RelayError::from(e)
        })?;

        Ok(ChatReply {
            reply: content.unwrap_or_else(|| NO_CONTENT_REPLY.to_string()),
        })
    }

    /// System prompt, then the trimmed history, then the new user turn.
    pub fn build_messages(&self, request: ChatRequest) -> Vec<Message> {
        let history = request.conversation.into_turns();
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::new(Role::System, &*self.system_prompt));
        messages.extend(history);
        messages.push(Message::new(Role::User, request.message));
        messages
    }
}
