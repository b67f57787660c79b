use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::web::error::RelayError;

/// How many prior turns are forwarded upstream. Older turns are dropped.
pub const MAX_TURNS: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    /// Any other role string the client sent, forwarded as-is.
    #[serde(untagged)]
    Other(String),
}

impl From<&str> for Role {
    fn from(role: &str) -> Self {
        match role {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            "system" => Role::System,
            other => Role::Other(other.to_string()),
        }
    }
}

/// A single chat turn as sent to the completion API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Extra fields a client attached to a history entry; passed through untouched.
    #[serde(flatten, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            extra: Map::new(),
        }
    }

    /// Keeps any entry whose `role` and `content` are both strings, along with
    /// whatever other fields it carries.
    fn from_entry(entry: &Value) -> Option<Self> {
        let fields = entry.as_object()?;
        let role = fields.get("role").and_then(Value::as_str)?;
        let content = fields.get("content").and_then(Value::as_str)?;

        let mut extra = fields.clone();
        extra.remove("role");
        extra.remove("content");

        Some(Self {
            role: Role::from(role),
            content: content.to_string(),
            extra,
        })
    }
}

/// Client-supplied history, already filtered and cut down to the last [`MAX_TURNS`] turns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationWindow {
    turns: Vec<Message>,
}

impl ConversationWindow {
    /// Builds a window from the raw `conversation` field. Anything that is not an
    /// array yields an empty window; malformed entries are dropped before trimming.
    pub fn from_value(value: Option<&Value>) -> Self {
        let Some(entries) = value.and_then(Value::as_array) else {
            return Self::default();
        };

        let mut turns: Vec<Message> = entries.iter().filter_map(Message::from_entry).collect();
        let excess = turns.len().saturating_sub(MAX_TURNS);
        turns.drain(..excess);

        Self { turns }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn into_turns(self) -> Vec<Message> {
        self.turns
    }
}

/// A validated `/chat` request body.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub message: String,
    pub conversation: ConversationWindow,
}

impl ChatRequest {
    /// Parses a raw body. An empty body is treated as `{}`, so it fails on the
    /// missing message rather than as malformed JSON.
    pub fn parse(body: &[u8]) -> Result<Self, RelayError> {
        let data: Value = if body.is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_slice(body).map_err(RelayError::MalformedInput)?
        };

        let message = data
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .ok_or(RelayError::MissingMessage)?;

        Ok(Self {
            message: message.to_string(),
            conversation: ConversationWindow::from_value(data.get("conversation")),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
