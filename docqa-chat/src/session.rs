//! In-memory conversation state for the current chat session.
//!
//! Turns live only as long as the process; nothing is persisted.

use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// The chat history for the current session, in order.
#[derive(Debug, Default)]
pub struct ConversationSession {
    turns: Vec<Turn>,
}

impl ConversationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user question.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(Turn { role: Role::User, content: content.into() });
    }

    /// Append an assistant answer.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.turns.push(Turn { role: Role::Assistant, content: content.into() });
    }

    /// All turns so far, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }
}
