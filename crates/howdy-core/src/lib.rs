pub mod config;
pub mod error;
pub mod orchestrator;
pub mod role;
pub mod state;

// Re-export main types for convenience
pub use config::Config;
pub use error::OrchestratorError;
pub use orchestrator::OrchestratorClient;
pub use role::UserRole;
pub use state::{ChatMessage, ChatRole, ChatSession};
