use std::time::{SystemTime, UNIX_EPOCH};
use tandem_core::MessageId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSender {
    Local,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub text: String,
    pub sender: MessageSender,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl ChatMessage {
    pub fn local(text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            text: text.into(),
            sender: MessageSender::Local,
            timestamp: now_millis(),
        }
    }

    pub fn remote(id: MessageId, text: impl Into<String>, timestamp: u64) -> Self {
        Self {
            id,
            text: text.into(),
            sender: MessageSender::Remote,
            timestamp,
        }
    }
}

/// Append-only chat log. Survives disconnects; only a new session clears it.
#[derive(Debug, Default)]
pub struct SessionHistory {
    messages: Vec<ChatMessage>,
}

impl SessionHistory {
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
