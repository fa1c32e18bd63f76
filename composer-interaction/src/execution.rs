//! Remote execution lifecycle: submit, poll progress, retrieve result.
//!
//! One [`ExecutionSession`] exists per execution, owned by the caller. The
//! session's background task is the only place that polls; it stops itself
//! on a terminal stage, on the wall-clock deadline, or on cancellation, and
//! resolves exactly once.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;

use composer_mcp::execution::uri;
use composer_mcp::tools::{CancelExecutionParams, CANCEL_EXECUTION, EXECUTE_WASM_COMPONENT};
use composer_mcp::{
    ExecuteAck, ExecuteParams, ExecutionProgress, ExecutionResultPayload, ExecutionStage,
    McpClient,
};

use crate::error::{InteractionError, InteractionResult};
use crate::surfaces::UiSurface;

/// Configuration for execution monitoring.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionConfig {
    /// Progress poll interval.
    pub poll_interval: Duration,
    /// Hard wall-clock ceiling for the whole execution, independent of the
    /// per-call budget passed to the backend.
    pub deadline: Duration,
    /// Time budget handed to the backend, in milliseconds.
    pub timeout_ms: u64,
    /// Memory budget handed to the backend, in megabytes.
    pub max_memory_mb: u32,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            deadline: Duration::from_secs(45),
            timeout_ms: composer_mcp::execution::DEFAULT_TIMEOUT_MS,
            max_memory_mb: composer_mcp::execution::DEFAULT_MAX_MEMORY_MB,
        }
    }
}

/// How an execution session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// The component finished and reported `Complete`.
    Completed,
    /// The component reported `Error`.
    Failed,
    /// The wall-clock deadline elapsed before a terminal stage.
    TimedOut,
    /// The session was stopped by its owner.
    Cancelled,
}

/// Final outcome of one execution session.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    /// Execution ID assigned by the backend.
    pub execution_id: String,
    /// How the session ended.
    pub status: ExecutionStatus,
    /// Result payload, when the result resource was present and parsable.
    pub result: Option<ExecutionResultPayload>,
    /// Error detail, when the execution failed.
    pub error: Option<String>,
}

/// Live progress snapshot, readable at any time through
/// [`ExecutionSession::inspect`].
#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
    /// Current stage.
    pub stage: ExecutionStage,
    /// Completion percentage.
    pub percent: u8,
    /// Latest stage message.
    pub message: String,
}

/// Handle to one running execution, owned by the caller.
///
/// Dropping the session without calling [`ExecutionSession::wait`] leaves
/// the monitor running to completion in the background.
pub struct ExecutionSession {
    execution_id: String,
    cancel: Arc<Notify>,
    snapshot: Arc<Mutex<ProgressSnapshot>>,
    task: JoinHandle<ExecutionOutcome>,
}

impl ExecutionSession {
    /// The backend-assigned execution ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.execution_id
    }

    /// Request cancellation: the polling loop and the deadline timer are
    /// both cleared, and the session resolves with `Cancelled`.
    ///
    /// Calling this after the session finished is a no-op.
    pub fn stop(&self) {
        self.cancel.notify_one();
    }

    /// Current stage and percentage.
    #[must_use]
    pub fn inspect(&self) -> ProgressSnapshot {
        self.snapshot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Whether the monitor has resolved.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the session to resolve.
    pub async fn wait(self) -> ExecutionOutcome {
        let execution_id = self.execution_id.clone();
        self.task.await.unwrap_or(ExecutionOutcome {
            execution_id,
            status: ExecutionStatus::Cancelled,
            result: None,
            error: None,
        })
    }
}

/// Submits executions and spawns their monitors.
pub struct ExecutionMonitor {
    client: Arc<dyn McpClient>,
    ui: Arc<dyn UiSurface>,
    config: ExecutionConfig,
}

impl ExecutionMonitor {
    /// Create a monitor factory.
    #[must_use]
    pub fn new(client: Arc<dyn McpClient>, ui: Arc<dyn UiSurface>, config: ExecutionConfig) -> Self {
        Self { client, ui, config }
    }

    /// Submit one execution and start monitoring it.
    ///
    /// # Errors
    ///
    /// Returns [`InteractionError::Submit`] when the backend rejects the
    /// submission (no polling begins) and [`InteractionError::Mcp`] when the
    /// submission cannot be delivered at all.
    pub async fn submit(&self, component_name: &str) -> InteractionResult<ExecutionSession> {
        let params = ExecuteParams::new(component_name);
        let params = ExecuteParams {
            timeout_ms: self.config.timeout_ms,
            max_memory_mb: self.config.max_memory_mb,
            ..params
        };
        let args = serde_json::to_value(&params).map_err(composer_mcp::McpError::from)?;

        let response = self.client.call_tool(EXECUTE_WASM_COMPONENT, args).await?;
        if !response.success {
            return Err(InteractionError::Submit(
                response.error_message().to_string(),
            ));
        }
        let ack: ExecuteAck = response
            .data
            .ok_or_else(|| InteractionError::Submit("no execution id assigned".to_string()))
            .and_then(|data| {
                serde_json::from_value(data)
                    .map_err(|e| InteractionError::Submit(format!("bad execution ack: {e}")))
            })?;

        tracing::info!(execution_id = %ack.execution_id, component = component_name, "Execution submitted");

        let snapshot = Arc::new(Mutex::new(ProgressSnapshot {
            stage: ExecutionStage::Preparing,
            percent: 0,
            message: String::new(),
        }));
        let cancel = Arc::new(Notify::new());
        let task = tokio::spawn(monitor(
            Arc::clone(&self.client),
            Arc::clone(&self.ui),
            self.config,
            ack.execution_id.clone(),
            Arc::clone(&snapshot),
            Arc::clone(&cancel),
        ));

        Ok(ExecutionSession {
            execution_id: ack.execution_id,
            cancel,
            snapshot,
            task,
        })
    }
}

enum LoopEnd {
    Complete,
    Failed(Option<String>),
    TimedOut,
}

async fn monitor(
    client: Arc<dyn McpClient>,
    ui: Arc<dyn UiSurface>,
    config: ExecutionConfig,
    execution_id: String,
    snapshot: Arc<Mutex<ProgressSnapshot>>,
    cancel: Arc<Notify>,
) -> ExecutionOutcome {
    let deadline = tokio::time::sleep(config.deadline);
    tokio::pin!(deadline);
    let mut interval = tokio::time::interval(config.poll_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let ended = loop {
        tokio::select! {
            () = cancel.notified() => {
                tracing::info!(%execution_id, "Execution cancelled by caller");
                cancel_remote(client.as_ref(), &execution_id).await;
                return ExecutionOutcome {
                    execution_id,
                    status: ExecutionStatus::Cancelled,
                    result: None,
                    error: None,
                };
            }
            () = &mut deadline => {
                tracing::warn!(%execution_id, "Execution deadline reached");
                break LoopEnd::TimedOut;
            }
            _ = interval.tick() => {
                let Some(progress) = read_progress(client.as_ref(), &execution_id).await else {
                    continue;
                };
                {
                    let mut guard = snapshot
                        .lock()
                        .unwrap_or_else(std::sync::PoisonError::into_inner);
                    guard.stage = progress.stage;
                    guard.percent = progress.percent();
                    guard.message.clone_from(&progress.message);
                }
                ui.show_execution_progress(
                    &execution_id,
                    progress.stage.as_str(),
                    progress.percent(),
                );
                match progress.stage {
                    ExecutionStage::Complete => break LoopEnd::Complete,
                    ExecutionStage::Error => {
                        let detail = progress.error.or_else(|| {
                            (!progress.message.is_empty()).then(|| progress.message.clone())
                        });
                        break LoopEnd::Failed(detail);
                    }
                    _ => {}
                }
            }
        }
    };

    // The polling loop is over; its interval and the deadline timer die
    // here. Read the result resource exactly once.
    let result = read_result(client.as_ref(), &execution_id).await;
    match ended {
        LoopEnd::Complete => ExecutionOutcome {
            execution_id,
            status: ExecutionStatus::Completed,
            error: result.as_ref().and_then(|r| r.error.clone()),
            result,
        },
        LoopEnd::Failed(detail) => ExecutionOutcome {
            execution_id,
            status: ExecutionStatus::Failed,
            error: detail.or_else(|| result.as_ref().and_then(|r| r.error.clone())),
            result,
        },
        LoopEnd::TimedOut => ExecutionOutcome {
            execution_id,
            status: ExecutionStatus::TimedOut,
            error: Some("execution timed out".to_string()),
            result,
        },
    }
}

async fn read_progress(client: &dyn McpClient, execution_id: &str) -> Option<ExecutionProgress> {
    match client.read_resource(&uri::execution_progress(execution_id)).await {
        Ok(content) => match content.parse::<ExecutionProgress>() {
            Ok(progress) => Some(progress),
            Err(e) => {
                tracing::warn!(%execution_id, "Unparsable progress report: {e}");
                None
            }
        },
        Err(e) => {
            tracing::warn!(%execution_id, "Progress read failed: {e}");
            None
        }
    }
}

/// A missing or unparsable result resource is "no result", not an error.
async fn read_result(client: &dyn McpClient, execution_id: &str) -> Option<ExecutionResultPayload> {
    match client.read_resource(&uri::execution_result(execution_id)).await {
        Ok(content) => content.parse::<ExecutionResultPayload>().ok(),
        Err(e) => {
            tracing::debug!(%execution_id, "No execution result available: {e}");
            None
        }
    }
}

async fn cancel_remote(client: &dyn McpClient, execution_id: &str) {
    let params = CancelExecutionParams {
        execution_id: execution_id.to_string(),
    };
    let Ok(args) = serde_json::to_value(params) else {
        return;
    };
    if let Err(e) = client.call_tool(CANCEL_EXECUTION, args).await {
        tracing::debug!(%execution_id, "Remote cancellation failed: {e}");
    }
}
