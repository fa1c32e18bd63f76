//! Error types for composer operations.

use thiserror::Error;

/// Result type for composer-core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in the composer data model.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Element not found in the diagram.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// No diagram is currently loaded.
    #[error("No diagram loaded")]
    NoDiagram,

    /// Invalid operation on an element.
    #[error("Invalid operation on element: {0}")]
    InvalidOperation(String),

    /// Element/diagram serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Interfaces cannot be connected.
    #[error("Incompatible interfaces: {0}")]
    IncompatibleInterfaces(String),
}
