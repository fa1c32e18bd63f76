//! Debounced auto-save of element positions after drag gestures.
//!
//! Each drag end replaces the pending batch and restarts the debounce
//! timer: bursts collapse into a single commit carrying the geometry from
//! the last event only.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use composer_core::{DiagramId, MovedElement};

use crate::surfaces::{DiagramService, NoticeLevel, SyncStatus, UiSurface};

/// Configuration for the auto-save scheduler.
#[derive(Debug, Clone, Copy)]
pub struct AutoSaveConfig {
    /// Quiet period before a pending batch commits.
    pub debounce: Duration,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
        }
    }
}

/// Debounced background committer for position updates.
pub struct AutoSaveScheduler {
    service: Arc<dyn DiagramService>,
    ui: Arc<dyn UiSurface>,
    config: AutoSaveConfig,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl AutoSaveScheduler {
    /// Create a scheduler committing through the given service.
    #[must_use]
    pub fn new(
        service: Arc<dyn DiagramService>,
        ui: Arc<dyn UiSurface>,
        config: AutoSaveConfig,
    ) -> Self {
        Self {
            service,
            ui,
            config,
            pending: Mutex::new(None),
        }
    }

    /// Schedule a batch for committing after the debounce window.
    ///
    /// A batch scheduled while an earlier one is still waiting replaces it
    /// entirely (last-write-wins) and restarts the timer. An empty batch is
    /// a no-op.
    pub fn schedule(&self, diagram_id: DiagramId, batch: Vec<MovedElement>) {
        if batch.is_empty() {
            return;
        }

        let service = Arc::clone(&self.service);
        let ui = Arc::clone(&self.ui);
        let debounce = self.config.debounce;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            commit(service.as_ref(), ui.as_ref(), diagram_id, &batch).await;
        });

        let mut guard = self
            .pending
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(previous) = guard.replace(handle) {
            // The superseded batch is dropped, not queued.
            previous.abort();
            tracing::debug!("Auto-save batch superseded");
        }
    }

    /// Drop any batch still waiting on its debounce timer.
    pub fn cancel_pending(&self) {
        let mut guard = self
            .pending
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(handle) = guard.take() {
            handle.abort();
        }
    }
}

impl Drop for AutoSaveScheduler {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

async fn commit(
    service: &dyn DiagramService,
    ui: &dyn UiSurface,
    diagram_id: DiagramId,
    batch: &[MovedElement],
) {
    ui.set_sync_status(SyncStatus::Saving);

    let result = async {
        service.update_element_positions(diagram_id, batch).await?;
        service.save_diagram(diagram_id).await
    }
    .await;

    match result {
        Ok(()) => {
            tracing::debug!(count = batch.len(), "Auto-saved element positions");
            ui.set_sync_status(SyncStatus::Saved);
        }
        Err(e) => {
            tracing::warn!("Auto-save failed: {e}");
            ui.set_sync_status(SyncStatus::Error);
            ui.notify(NoticeLevel::Error, &format!("Auto-save failed: {e}"));
        }
    }
}
