//! Shared mock collaborators for interaction tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use composer_core::{
    Bounds, Diagram, DiagramElement, DiagramId, ElementId, InteractionMode, InterfaceDirection,
    InterfaceMatch, InterfaceSummary, MovedElement, Position, WitFunction, WitInterface, WitParam,
    WitType, COMPONENT_NODE_TYPE,
};
use composer_interaction::{
    CoordinatorConfig, DiagramService, InteractionCoordinator, NoticeLevel, RenderingSurface,
    SyncStatus, UiSurface,
};
use composer_mcp::tools;
use composer_mcp::{McpClient, McpError, McpResult, ResourceContent, ToolResponse};

/// Install a test subscriber once; repeated calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Rendering surface
// ============================================================================

#[derive(Default)]
pub struct MockRenderer {
    pub modes: Mutex<Vec<InteractionMode>>,
    pub renders: AtomicUsize,
    pub edge_starts: Mutex<Vec<(ElementId, String)>>,
    pub zooms: Mutex<Vec<f64>>,
    pub fits: AtomicUsize,
    pub resets: AtomicUsize,
}

impl MockRenderer {
    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }
}

impl RenderingSurface for MockRenderer {
    fn set_interaction_mode(&self, mode: InteractionMode) {
        self.modes.lock().expect("lock").push(mode);
    }

    fn start_edge_creation(&self, source: ElementId, edge_type: &str) {
        self.edge_starts
            .lock()
            .expect("lock")
            .push((source, edge_type.to_string()));
    }

    fn render(&self) {
        self.renders.fetch_add(1, Ordering::SeqCst);
    }

    fn render_immediate(&self) {
        self.renders.fetch_add(1, Ordering::SeqCst);
    }

    fn zoom(&self, factor: f64) {
        self.zooms.lock().expect("lock").push(factor);
    }

    fn fit_to_content(&self) {
        self.fits.fetch_add(1, Ordering::SeqCst);
    }

    fn reset_view(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Diagram service
// ============================================================================

#[derive(Default)]
pub struct MockService {
    pub diagrams_created: AtomicUsize,
    pub saves: AtomicUsize,
    pub fail_create_node: AtomicBool,
    pub fail_save: AtomicBool,
    pub fail_positions: AtomicBool,
    pub nodes_created: Mutex<Vec<(String, Position)>>,
    pub edges_created: Mutex<Vec<(String, ElementId, ElementId, Option<String>)>>,
    pub position_commits: Mutex<Vec<Vec<MovedElement>>>,
    pub layouts: Mutex<Vec<String>>,
}

#[async_trait]
impl DiagramService for MockService {
    async fn current_diagram_id(&self) -> Option<DiagramId> {
        None
    }

    async fn create_diagram(&self, diagram_type: &str, name: &str) -> anyhow::Result<Diagram> {
        self.diagrams_created.fetch_add(1, Ordering::SeqCst);
        Ok(Diagram::new(diagram_type, name))
    }

    async fn load_diagram(&self, _id: DiagramId) -> anyhow::Result<Diagram> {
        Ok(Diagram::new("wasm-composition", "loaded"))
    }

    async fn save_diagram(&self, _id: DiagramId) -> anyhow::Result<()> {
        if self.fail_save.load(Ordering::SeqCst) {
            anyhow::bail!("disk full");
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn create_node(
        &self,
        _diagram_id: DiagramId,
        node_type: &str,
        position: Position,
        label: &str,
    ) -> anyhow::Result<DiagramElement> {
        if self.fail_create_node.load(Ordering::SeqCst) {
            anyhow::bail!("node rejected");
        }
        self.nodes_created
            .lock()
            .expect("lock")
            .push((node_type.to_string(), position));
        Ok(DiagramElement::node(node_type, Bounds::at(position), label))
    }

    async fn create_edge(
        &self,
        _diagram_id: DiagramId,
        edge_type: &str,
        source_id: ElementId,
        target_id: ElementId,
        label: Option<&str>,
    ) -> anyhow::Result<DiagramElement> {
        self.edges_created.lock().expect("lock").push((
            edge_type.to_string(),
            source_id,
            target_id,
            label.map(ToString::to_string),
        ));
        Ok(DiagramElement::edge(
            edge_type,
            source_id,
            target_id,
            label.unwrap_or_default(),
        ))
    }

    async fn update_element_positions(
        &self,
        _diagram_id: DiagramId,
        moved: &[MovedElement],
    ) -> anyhow::Result<()> {
        if self.fail_positions.load(Ordering::SeqCst) {
            anyhow::bail!("position update rejected");
        }
        self.position_commits
            .lock()
            .expect("lock")
            .push(moved.to_vec());
        Ok(())
    }

    async fn apply_layout(&self, _diagram_id: DiagramId, layout: &str) -> anyhow::Result<()> {
        self.layouts.lock().expect("lock").push(layout.to_string());
        Ok(())
    }
}

// ============================================================================
// UI surface
// ============================================================================

#[derive(Default)]
pub struct MockUi {
    pub notices: Mutex<Vec<(NoticeLevel, String)>>,
    pub sync_statuses: Mutex<Vec<SyncStatus>>,
    pub panel_refreshes: Mutex<Vec<ElementId>>,
    pub connection_choices: Mutex<Vec<(ElementId, String, Vec<InterfaceMatch>)>>,
    pub progress_updates: Mutex<Vec<(String, String, u8)>>,
}

impl MockUi {
    pub fn notices_at(&self, level: NoticeLevel) -> Vec<String> {
        self.notices
            .lock()
            .expect("lock")
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl UiSurface for MockUi {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.notices
            .lock()
            .expect("lock")
            .push((level, message.to_string()));
    }

    fn set_sync_status(&self, status: SyncStatus) {
        self.sync_statuses.lock().expect("lock").push(status);
    }

    fn update_properties_panel(
        &self,
        element_id: ElementId,
        _kind: &str,
        _properties: &Map<String, Value>,
    ) {
        self.panel_refreshes.lock().expect("lock").push(element_id);
    }

    fn show_connection_choices(
        &self,
        source_element: ElementId,
        source_interface: &str,
        matches: &[InterfaceMatch],
    ) {
        self.connection_choices.lock().expect("lock").push((
            source_element,
            source_interface.to_string(),
            matches.to_vec(),
        ));
    }

    fn show_execution_progress(&self, execution_id: &str, stage: &str, percent: u8) {
        self.progress_updates.lock().expect("lock").push((
            execution_id.to_string(),
            stage.to_string(),
            percent,
        ));
    }
}

// ============================================================================
// MCP client
// ============================================================================

#[derive(Default)]
pub struct MockClient {
    pub calls: Mutex<Vec<(String, Value)>>,
    /// Component name -> canned `get_component_wit_info` response.
    pub wit_responses: Mutex<HashMap<String, ToolResponse>>,
    /// Delay applied to WIT info calls, for in-flight tests.
    pub wit_delay: Mutex<Option<Duration>>,
    /// Canned `execute_wasm_component` response.
    pub execute_response: Mutex<Option<ToolResponse>>,
    /// Progress payloads served in order; the last one repeats.
    pub progress_feed: Mutex<VecDeque<Value>>,
    last_progress: Mutex<Option<Value>>,
    pub progress_reads: AtomicUsize,
    /// Canned result resource payload; absent means "not found".
    pub result_payload: Mutex<Option<Value>>,
    pub fail_delete: AtomicBool,
}

impl MockClient {
    pub fn tool_calls(&self, name: &str) -> usize {
        self.calls
            .lock()
            .expect("lock")
            .iter()
            .filter(|(n, _)| n == name)
            .count()
    }

    pub fn set_wit_response(&self, component: &str, response: ToolResponse) {
        self.wit_responses
            .lock()
            .expect("lock")
            .insert(component.to_string(), response);
    }

    pub fn push_progress(&self, stage: &str, progress: f32) {
        self.progress_feed.lock().expect("lock").push_back(json!({
            "executionId": "exec-1",
            "stage": stage,
            "progress": progress,
            "message": format!("{stage}..."),
        }));
    }
}

#[async_trait]
impl McpClient for MockClient {
    async fn call_tool(&self, name: &str, args: Value) -> McpResult<ToolResponse> {
        self.calls
            .lock()
            .expect("lock")
            .push((name.to_string(), args.clone()));
        match name {
            tools::GET_COMPONENT_WIT_INFO => {
                let delay = *self.wit_delay.lock().expect("lock");
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                let component = args["componentName"].as_str().unwrap_or_default();
                Ok(self
                    .wit_responses
                    .lock()
                    .expect("lock")
                    .get(component)
                    .cloned()
                    .unwrap_or_else(|| {
                        ToolResponse::error(format!("{component} is not a WASM component"))
                    }))
            }
            tools::EXECUTE_WASM_COMPONENT => Ok(self
                .execute_response
                .lock()
                .expect("lock")
                .clone()
                .unwrap_or_else(|| ToolResponse::success(json!({"executionId": "exec-1"})))),
            tools::DELETE_ELEMENT => {
                if self.fail_delete.load(Ordering::SeqCst) {
                    Ok(ToolResponse::error("element is referenced by an edge"))
                } else {
                    Ok(ToolResponse::success(json!({"deleted": true})))
                }
            }
            tools::UPDATE_ELEMENT | tools::CANCEL_EXECUTION => {
                Ok(ToolResponse::success(json!({})))
            }
            _ => Ok(ToolResponse::error(format!("unknown tool {name}"))),
        }
    }

    async fn read_resource(&self, uri: &str) -> McpResult<ResourceContent> {
        if uri.ends_with("/progress") {
            self.progress_reads.fetch_add(1, Ordering::SeqCst);
            let mut feed = self.progress_feed.lock().expect("lock");
            let payload = feed
                .pop_front()
                .or_else(|| self.last_progress.lock().expect("lock").clone());
            if let Some(payload) = payload {
                *self.last_progress.lock().expect("lock") = Some(payload.clone());
                return Ok(ResourceContent::Json(payload));
            }
            return Err(McpError::ResourceNotFound(uri.to_string()));
        }
        if uri.ends_with("/result") {
            return self
                .result_payload
                .lock()
                .expect("lock")
                .clone()
                .map(ResourceContent::Json)
                .ok_or_else(|| McpError::ResourceNotFound(uri.to_string()));
        }
        Err(McpError::ResourceNotFound(uri.to_string()))
    }
}

// ============================================================================
// Harness and fixtures
// ============================================================================

pub struct Harness {
    pub renderer: Arc<MockRenderer>,
    pub service: Arc<MockService>,
    pub ui: Arc<MockUi>,
    pub client: Arc<MockClient>,
    pub coordinator: InteractionCoordinator,
}

pub fn harness() -> Harness {
    harness_with(CoordinatorConfig::default())
}

pub fn harness_with(config: CoordinatorConfig) -> Harness {
    let renderer = Arc::new(MockRenderer::default());
    let service = Arc::new(MockService::default());
    let ui = Arc::new(MockUi::default());
    let client = Arc::new(MockClient::default());
    let coordinator = InteractionCoordinator::new(
        Arc::clone(&renderer) as Arc<dyn RenderingSurface>,
        Arc::clone(&service) as Arc<dyn DiagramService>,
        Arc::clone(&ui) as Arc<dyn UiSurface>,
        Arc::clone(&client) as Arc<dyn McpClient>,
        config,
    );
    Harness {
        renderer,
        service,
        ui,
        client,
        coordinator,
    }
}

/// An interface with one function `{fn_name}(input: string)`.
pub fn interface_with_function(
    name: &str,
    direction: InterfaceDirection,
    fn_name: &str,
) -> WitInterface {
    WitInterface::new(name, direction).with_function(WitFunction {
        name: fn_name.to_string(),
        params: vec![WitParam {
            name: "input".to_string(),
            param_type: WitType {
                name: "string".to_string(),
            },
        }],
        results: Vec::new(),
    })
}

/// A component node with pre-cached interfaces.
pub fn component_with_interfaces(name: &str, interfaces: &[WitInterface]) -> DiagramElement {
    let mut element = DiagramElement::node(COMPONENT_NODE_TYPE, Bounds::default(), name);
    element.replace_interfaces(interfaces, InterfaceSummary::from_interfaces(interfaces, 0));
    element
}

/// A component node with no interface data yet.
pub fn bare_component(name: &str) -> DiagramElement {
    DiagramElement::node(COMPONENT_NODE_TYPE, Bounds::default(), name)
}

/// A successful WIT info payload with one exported interface.
pub fn wit_info_response(component: &str, export: &str) -> ToolResponse {
    ToolResponse::success(json!({
        "componentName": component,
        "exports": [{
            "name": export,
            "functions": [{
                "name": export,
                "params": [{"name": "input", "paramType": "string"}],
                "results": []
            }]
        }],
        "imports": [],
        "dependencies": ["wasi:io"]
    }))
}
