use reqwest::StatusCode;
use thiserror::Error;

/// Shown when the orchestrator answers with valid JSON that lacks a `response` field.
pub const FALLBACK_REPLY: &str = "An unexpected error occurred.";

/// Shown when the orchestrator answers with a body that is not JSON.
pub const UNREADABLE_REPLY: &str = "Sorry, I received an unreadable response from the service.";

/// Every way a single orchestrator call can fail. None of them is fatal:
/// each one degrades to an assistant reply via [`OrchestratorError::user_message`].
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(StatusCode),

    #[error("invalid JSON in response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response body has no `response` field")]
    MissingField,
}

impl OrchestratorError {
    /// The text appended to the chat in place of an answer.
    pub fn user_message(&self) -> String {
        match self {
            OrchestratorError::Transport(_) | OrchestratorError::Status(_) => format!(
                "Sorry, I'm having trouble connecting to the service. Please try again later. (Error: {})",
                self
            ),
            OrchestratorError::Decode(_) => UNREADABLE_REPLY.to_string(),
            OrchestratorError::MissingField => FALLBACK_REPLY.to_string(),
        }
    }

    /// One-line notice for the UI status line. `None` for a missing field.
    pub fn notice(&self) -> Option<String> {
        match self {
            OrchestratorError::Transport(_) | OrchestratorError::Status(_) => {
                Some(format!("Error communicating with the chatbot backend: {}", self))
            }
            OrchestratorError::Decode(_) => {
                Some("Received an invalid response from the chatbot backend.".to_string())
            }
            OrchestratorError::MissingField => None,
        }
    }
}
