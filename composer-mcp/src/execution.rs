//! Execution tool payloads, progress/result resources, and URI helpers.

use serde::{Deserialize, Serialize};

/// Default per-execution time budget passed to the backend, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Default per-execution memory budget passed to the backend, in megabytes.
pub const DEFAULT_MAX_MEMORY_MB: u32 = 64;

/// Parameters for `execute_wasm_component`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteParams {
    /// Name of the component to execute.
    #[serde(rename = "componentName")]
    pub component_name: String,
    /// Method to invoke.
    pub method: String,
    /// Arguments passed to the method.
    pub args: serde_json::Value,
    /// Execution time budget in milliseconds.
    pub timeout_ms: u64,
    /// Memory budget in megabytes.
    pub max_memory_mb: u32,
}

impl ExecuteParams {
    /// Create parameters invoking `main` with no arguments and the default
    /// resource limits.
    #[must_use]
    pub fn new(component_name: impl Into<String>) -> Self {
        Self {
            component_name: component_name.into(),
            method: "main".to_string(),
            args: serde_json::json!({}),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_memory_mb: DEFAULT_MAX_MEMORY_MB,
        }
    }
}

/// Acknowledgement returned by a successful `execute_wasm_component` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteAck {
    /// The assigned execution ID, used for progress/result resource reads.
    #[serde(alias = "execution_id")]
    pub execution_id: String,
}

/// Stage of a remote execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStage {
    /// Request accepted, sandbox not yet set up.
    Preparing,
    /// Component binary loading.
    Loading,
    /// Component running.
    Executing,
    /// Output post-processing.
    Processing,
    /// Finished successfully.
    Complete,
    /// Finished with an error.
    Error,
}

impl ExecutionStage {
    /// Whether this stage ends the execution.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }

    /// Stage name as reported by the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Preparing => "Preparing",
            Self::Loading => "Loading",
            Self::Executing => "Executing",
            Self::Processing => "Processing",
            Self::Complete => "Complete",
            Self::Error => "Error",
        }
    }
}

/// One progress report read from `wasm://executions/{id}/progress`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionProgress {
    /// Execution this report belongs to.
    #[serde(alias = "execution_id")]
    pub execution_id: String,
    /// Current stage.
    pub stage: ExecutionStage,
    /// Completion fraction, 0.0 - 1.0.
    pub progress: f32,
    /// Human-readable stage description.
    #[serde(default)]
    pub message: String,
    /// Error detail when the stage is `Error`.
    #[serde(default)]
    pub error: Option<String>,
}

impl ExecutionProgress {
    /// Completion as a whole percentage.
    #[must_use]
    pub fn percent(&self) -> u8 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            (self.progress.clamp(0.0, 1.0) * 100.0).round() as u8
        }
    }
}

/// Final payload read from `wasm://executions/{id}/result`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResultPayload {
    /// Execution this result belongs to.
    #[serde(alias = "execution_id")]
    pub execution_id: String,
    /// Whether the component finished successfully.
    pub success: bool,
    /// Output value, when present.
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    /// Error message, when present.
    #[serde(default)]
    pub error: Option<String>,
    /// Wall-clock duration in milliseconds.
    #[serde(default)]
    pub execution_time_ms: u64,
    /// Peak memory usage in megabytes.
    #[serde(default)]
    pub memory_usage_mb: u32,
}

/// Resource URI helpers for the `wasm://` scheme.
pub mod uri {
    /// Progress resource for an execution.
    #[must_use]
    pub fn execution_progress(execution_id: &str) -> String {
        format!("wasm://executions/{execution_id}/progress")
    }

    /// Result resource for an execution.
    #[must_use]
    pub fn execution_result(execution_id: &str) -> String {
        format!("wasm://executions/{execution_id}/result")
    }

    /// Parsed execution resource URI.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ExecutionUri {
        /// `wasm://executions/{id}/progress`
        Progress(String),
        /// `wasm://executions/{id}/result`
        Result(String),
    }

    /// Parse a `wasm://executions/...` URI.
    #[must_use]
    pub fn parse(uri: &str) -> Option<ExecutionUri> {
        let path = uri.strip_prefix("wasm://executions/")?;
        let (id, kind) = path.split_once('/')?;
        if id.is_empty() {
            return None;
        }
        match kind {
            "progress" => Some(ExecutionUri::Progress(id.to_string())),
            "result" => Some(ExecutionUri::Result(id.to_string())),
            _ => None,
        }
    }
}
