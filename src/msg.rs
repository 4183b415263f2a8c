use serde::Deserialize;

/// Identifies the chat session a message belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One part of an inbound chat message. Only text parts carry commands.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessagePart {
    Text { text: String },
    #[serde(other)]
    Other,
}

/// An inbound chat message as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(rename = "sessionID", alias = "sessionId")]
    pub session_id: SessionId,
    #[serde(default)]
    pub parts: Vec<MessagePart>,
}

impl ChatMessage {
    /// A message made of a single text part.
    pub fn text(session_id: SessionId, text: impl Into<String>) -> Self {
        Self {
            session_id,
            parts: vec![MessagePart::Text { text: text.into() }],
        }
    }

    /// Concatenated text parts, trimmed.
    pub fn command_text(&self) -> String {
        let joined: String = self
            .parts
            .iter()
            .filter_map(|part| match part {
                MessagePart::Text { text } => Some(text.as_str()),
                MessagePart::Other => None,
            })
            .collect();
        joined.trim().to_string()
    }
}
