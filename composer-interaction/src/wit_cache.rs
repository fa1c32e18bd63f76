//! Per-element interface metadata loading and caching.
//!
//! `ensure_interfaces` issues at most one remote request per element at a
//! time: a click while a fetch is in flight is a no-op, not a queued
//! duplicate. Successful fetches overwrite the element's cached interface
//! data atomically and persist it back to the owning store.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use composer_core::{ComponentStatus, DiagramStore, ElementId};
use composer_mcp::tools::{UpdateElementParams, GET_COMPONENT_WIT_INFO, UPDATE_ELEMENT};
use composer_mcp::wit::WitInfoReport;
use composer_mcp::{McpClient, ToolResponse};

use crate::surfaces::RenderingSurface;

/// Configuration for interface fetching.
#[derive(Debug, Clone, Copy)]
pub struct WitFetchConfig {
    /// Per-request network timeout.
    pub request_timeout: Duration,
}

impl Default for WitFetchConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Outcome of an `ensure_interfaces` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WitFetchOutcome {
    /// Interface data was fetched and cached.
    Loaded,
    /// The element already had interface data; nothing was fetched.
    AlreadyLoaded,
    /// A fetch for this element was already in flight; nothing was issued.
    InFlight,
    /// The element does not exist in the current diagram.
    ElementNotFound,
    /// The element is not a WASM component. Expected and silent.
    NotAComponent,
    /// The component's backing file is gone. Status set to `missing`.
    Missing,
    /// The fetch failed. Status set to `error` with the message retained.
    Failed(String),
}

/// Asynchronous per-element interface loader.
pub struct InterfaceCache {
    client: Arc<dyn McpClient>,
    store: DiagramStore,
    renderer: Arc<dyn RenderingSurface>,
    in_flight: Mutex<HashSet<ElementId>>,
    config: WitFetchConfig,
}

impl InterfaceCache {
    /// Create a cache over the shared diagram store.
    #[must_use]
    pub fn new(
        client: Arc<dyn McpClient>,
        store: DiagramStore,
        renderer: Arc<dyn RenderingSurface>,
        config: WitFetchConfig,
    ) -> Self {
        Self {
            client,
            store,
            renderer,
            in_flight: Mutex::new(HashSet::new()),
            config,
        }
    }

    /// Fetch and cache interface metadata for one element, if needed.
    ///
    /// Preconditions (checked here, all no-ops): the element exists, is a
    /// component, has no cached interfaces, and has no fetch in flight.
    pub async fn ensure_interfaces(&self, element_id: ElementId) -> WitFetchOutcome {
        self.ensure_inner(element_id, true).await
    }

    /// Fetch interface metadata for every component lacking it.
    ///
    /// Individual failures do not abort sibling fetches; exactly one
    /// re-render happens after all of them settle. Returns the number of
    /// components that loaded successfully.
    pub async fn preload_all(&self) -> usize {
        let Some(diagram) = self.store.snapshot() else {
            return 0;
        };
        let targets: Vec<ElementId> = diagram
            .components()
            .filter(|c| !c.has_interfaces())
            .map(|c| c.id)
            .collect();
        if targets.is_empty() {
            return 0;
        }

        tracing::debug!(count = targets.len(), "Preloading component interfaces");
        let outcomes =
            futures::future::join_all(targets.iter().map(|id| self.ensure_inner(*id, false)))
                .await;
        self.renderer.render();
        outcomes
            .iter()
            .filter(|o| matches!(o, WitFetchOutcome::Loaded))
            .count()
    }

    async fn ensure_inner(&self, element_id: ElementId, render: bool) -> WitFetchOutcome {
        let Some(element) = self.store.element(element_id) else {
            return WitFetchOutcome::ElementNotFound;
        };
        if !element.is_component() {
            return WitFetchOutcome::NotAComponent;
        }
        if element.has_interfaces() {
            return WitFetchOutcome::AlreadyLoaded;
        }

        {
            let mut guard = self
                .in_flight
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if !guard.insert(element_id) {
                tracing::debug!(%element_id, "Interface fetch already in flight");
                return WitFetchOutcome::InFlight;
            }
        }

        let component_name = element.component_name().to_string();
        let outcome = self.fetch_and_apply(element_id, &component_name).await;

        self.in_flight
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(&element_id);

        // "Not a component" is expected-absence: no status change, no render.
        if render
            && !matches!(
                outcome,
                WitFetchOutcome::NotAComponent | WitFetchOutcome::AlreadyLoaded
            )
        {
            self.renderer.render();
        }
        outcome
    }

    async fn fetch_and_apply(&self, element_id: ElementId, component_name: &str) -> WitFetchOutcome {
        let args = match serde_json::to_value(composer_mcp::tools::WitInfoParams::new(
            component_name,
        )) {
            Ok(args) => args,
            Err(e) => return self.apply_failure(element_id, &e.to_string()),
        };

        let call = self.client.call_tool(GET_COMPONENT_WIT_INFO, args);
        let response = match tokio::time::timeout(self.config.request_timeout, call).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return self.apply_failure(element_id, &e.to_string()),
            Err(_) => {
                return self.apply_failure(
                    element_id,
                    &format!(
                        "interface fetch timed out after {:?}",
                        self.config.request_timeout
                    ),
                )
            }
        };

        if !response.success {
            return self.apply_tool_error(element_id, response.error_message());
        }

        let Some(data) = response.data else {
            // An empty success body means the analyzer had nothing to say;
            // treated like a non-component response.
            return WitFetchOutcome::NotAComponent;
        };
        let report: WitInfoReport = match serde_json::from_value(data) {
            Ok(report) => report,
            Err(e) => {
                tracing::debug!(%element_id, "Unparsable WIT info response: {e}");
                return WitFetchOutcome::NotAComponent;
            }
        };

        let interfaces = report.normalize();
        let summary = report.summary();
        if self
            .store
            .update_element(element_id, |element| {
                element.replace_interfaces(&interfaces, summary);
            })
            .is_err()
        {
            return WitFetchOutcome::ElementNotFound;
        }
        tracing::info!(
            %element_id,
            imports = summary.imports,
            exports = summary.exports,
            "Cached WIT interfaces"
        );

        self.persist(element_id).await;
        WitFetchOutcome::Loaded
    }

    fn apply_tool_error(&self, element_id: ElementId, message: &str) -> WitFetchOutcome {
        match classify_tool_error(message) {
            ToolErrorKind::NotAComponent => WitFetchOutcome::NotAComponent,
            ToolErrorKind::Missing => {
                let _ = self.store.update_element(element_id, |element| {
                    element.set_status(ComponentStatus::Missing);
                });
                WitFetchOutcome::Missing
            }
            ToolErrorKind::Other => self.apply_failure(element_id, message),
        }
    }

    fn apply_failure(&self, element_id: ElementId, message: &str) -> WitFetchOutcome {
        tracing::warn!(%element_id, "Interface fetch failed: {message}");
        let _ = self.store.update_element(element_id, |element| {
            element.set_error(message);
        });
        WitFetchOutcome::Failed(message.to_string())
    }

    /// Persist the freshly cached interface properties to the owning store
    /// so future sessions see them without re-fetching.
    async fn persist(&self, element_id: ElementId) {
        let Some(element) = self.store.element(element_id) else {
            return;
        };
        let params = UpdateElementParams {
            element_id,
            properties: element.properties,
        };
        let args = match serde_json::to_value(params) {
            Ok(args) => args,
            Err(e) => {
                tracing::warn!(%element_id, "Could not encode element update: {e}");
                return;
            }
        };
        match self.client.call_tool(UPDATE_ELEMENT, args).await {
            Ok(ToolResponse { success: true, .. }) => {}
            Ok(response) => {
                tracing::warn!(
                    %element_id,
                    "Element update rejected: {}",
                    response.error_message()
                );
            }
            Err(e) => tracing::warn!(%element_id, "Element update failed: {e}"),
        }
    }
}

enum ToolErrorKind {
    NotAComponent,
    Missing,
    Other,
}

fn classify_tool_error(message: &str) -> ToolErrorKind {
    let lower = message.to_lowercase();
    if lower.contains("not a wasm component") {
        ToolErrorKind::NotAComponent
    } else if lower.contains("not found") || lower.contains("no such file") {
        ToolErrorKind::Missing
    } else {
        ToolErrorKind::Other
    }
}
