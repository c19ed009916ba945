//! 核心层：错误类型、会话状态与编排器

pub mod error;
pub mod orchestrator;
pub mod state;

pub use error::AgentError;
pub use orchestrator::{create_agent, Command, StudioRequest};
pub use state::{
    AgentPhase, AgentSession, Artifact, ConversationEntry, EntryKind, Role, StudioState, UiState,
};
