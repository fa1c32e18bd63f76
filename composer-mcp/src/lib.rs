//! # Composer MCP
//!
//! MCP (Model Context Protocol) contracts between the composer and its
//! backend: the abstract tool/resource client, typed tool payloads, and
//! `wasm://` resource URI helpers.
//!
//! ## MCP Tools
//!
//! - `get_component_wit_info` - Extract WIT interfaces from a component
//! - `update_element` - Persist element properties
//! - `delete_element` - Remove an element
//! - `execute_wasm_component` - Run a component with resource limits
//! - `cancel_execution` - Best-effort server-side cancellation
//!
//! ## MCP Resources
//!
//! - `wasm://executions/{id}/progress` - Live execution progress
//! - `wasm://executions/{id}/result` - Final execution result

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod execution;
pub mod tools;
pub mod wit;

pub use execution::{ExecuteAck, ExecuteParams, ExecutionProgress, ExecutionResultPayload, ExecutionStage};
pub use wit::WitInfoReport;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for MCP client operations.
pub type McpResult<T> = Result<T, McpError>;

/// Errors that can occur while talking to the backend.
#[derive(Debug, Error)]
pub enum McpError {
    /// Transport-level failure (connection lost, request failed).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The requested resource does not exist.
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// Payload serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// MCP tool response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResponse {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Result data (if successful).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Error message (if failed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResponse {
    /// Create a success response.
    #[must_use]
    pub fn success(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// The error message, or an empty string for success responses.
    #[must_use]
    pub fn error_message(&self) -> &str {
        self.error.as_deref().unwrap_or_default()
    }
}

/// MCP resource content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "content")]
pub enum ResourceContent {
    /// Text content (UTF-8).
    Text(String),
    /// JSON content.
    Json(serde_json::Value),
}

impl ResourceContent {
    /// Deserialize the content into a typed value.
    ///
    /// # Errors
    ///
    /// Returns [`McpError::Serialization`] if the content does not parse.
    pub fn parse<T: serde::de::DeserializeOwned>(&self) -> McpResult<T> {
        match self {
            Self::Text(text) => Ok(serde_json::from_str(text)?),
            Self::Json(value) => Ok(serde_json::from_value(value.clone())?),
        }
    }
}

/// Abstract request/response and resource-read client.
///
/// The application shell supplies the transport; the interaction core only
/// depends on this trait.
#[async_trait]
pub trait McpClient: Send + Sync {
    /// Invoke a named tool with JSON arguments.
    ///
    /// # Errors
    ///
    /// Returns [`McpError::Transport`] when the call cannot be delivered.
    /// Tool-level failures come back as an unsuccessful [`ToolResponse`].
    async fn call_tool(&self, name: &str, args: serde_json::Value) -> McpResult<ToolResponse>;

    /// Read a resource by URI.
    ///
    /// # Errors
    ///
    /// Returns [`McpError::ResourceNotFound`] for unknown URIs and
    /// [`McpError::Transport`] for delivery failures.
    async fn read_resource(&self, uri: &str) -> McpResult<ResourceContent>;
}
