//! UI-agnostic session state
//!
//! The chat history and role selection for one session. Both the TUI and the
//! one-shot `ask` command drive the same [`ChatSession`], so nothing here
//! depends on a UI framework.

use serde::{Deserialize, Serialize};

use crate::orchestrator::OrchestratorClient;
use crate::role::UserRole;

/// A chat message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// Append-only turn list plus the currently selected user role.
///
/// Turns are never edited or reordered; the only way to remove them is
/// [`ChatSession::clear`], which drops all of them at once.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    turns: Vec<ChatMessage>,
    role: UserRole,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: ChatMessage) {
        self.turns.push(turn);
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn turns(&self) -> &[ChatMessage] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn set_role(&mut self, role: UserRole) {
        self.role = role;
    }

    /// Run one full submission cycle: user turn, orchestrator call, assistant turn.
    /// Returns the assistant's reply.
    pub async fn exchange(&mut self, client: &OrchestratorClient, query: &str) -> &ChatMessage {
        self.append(ChatMessage::user(query));
        let reply = client.call(query, self.role).await;
        self.append(ChatMessage::assistant(reply));
        &self.turns[self.turns.len() - 1]
    }
}
