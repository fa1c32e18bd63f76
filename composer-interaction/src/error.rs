//! Error types for interaction operations.

use thiserror::Error;

/// Result type for interaction operations.
pub type InteractionResult<T> = Result<T, InteractionError>;

/// Errors surfaced by the interaction subsystems.
///
/// These stop at the coordinator boundary: delegated command failures become
/// transient notifications, never uncaught propagation into the mode state
/// machine.
#[derive(Debug, Error)]
pub enum InteractionError {
    /// Data-model error.
    #[error(transparent)]
    Core(#[from] composer_core::CoreError),

    /// Remote client error.
    #[error(transparent)]
    Mcp(#[from] composer_mcp::McpError),

    /// Execution submission was rejected by the backend.
    #[error("Execution submission failed: {0}")]
    Submit(String),

    /// A collaborator service call failed.
    #[error("Service error: {0}")]
    Service(#[from] anyhow::Error),
}
