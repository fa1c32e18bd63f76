//! The interaction coordinator: routes pointer and keyboard events through
//! the mode state machine into diagram mutations.
//!
//! Command failures are caught here and surfaced as transient
//! notifications; the mode state machine is orthogonal to command success.

use std::sync::{Arc, Mutex};

use composer_core::{
    find_compatible, CompatibilityResult, DiagramId, DiagramStore, ElementId, InteractionMode,
    InterfaceCandidate, KeyEvent, ModeState, Position, ShortcutAction, SignatureOverlap,
    WitInterface, INTERFACE_LINK_EDGE_TYPE,
};
use composer_mcp::tools::{DeleteElementParams, UpdateElementParams, DELETE_ELEMENT, UPDATE_ELEMENT};
use composer_mcp::McpClient;

use crate::autosave::{AutoSaveConfig, AutoSaveScheduler};
use crate::execution::{ExecutionConfig, ExecutionMonitor, ExecutionSession};
use crate::surfaces::{DiagramService, NoticeLevel, RenderingSurface, SyncStatus, UiSurface};
use crate::wit_cache::{InterfaceCache, WitFetchConfig};

/// Coordinator configuration.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Node type used by canvas clicks in `create-node` mode until the
    /// toolbar selects another.
    pub default_node_type: String,
    /// Edge type used when none is set.
    pub default_edge_type: String,
    /// Diagram type for newly created diagrams.
    pub diagram_type: String,
    /// Zoom factor per zoom-in step.
    pub zoom_step: f64,
    /// Auto-save tuning.
    pub autosave: AutoSaveConfig,
    /// Interface fetch tuning.
    pub wit_fetch: WitFetchConfig,
    /// Execution monitoring tuning.
    pub execution: ExecutionConfig,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            default_node_type: composer_core::COMPONENT_NODE_TYPE.to_string(),
            default_edge_type: "flow".to_string(),
            diagram_type: "wasm-composition".to_string(),
            zoom_step: 1.2,
            autosave: AutoSaveConfig::default(),
            wit_fetch: WitFetchConfig::default(),
            execution: ExecutionConfig::default(),
        }
    }
}

/// Owns the mode state machine and routes interaction events to the
/// interface cache, auto-save scheduler, execution monitor, and diagram
/// service.
///
/// All collaborators are injected at construction; the coordinator holds no
/// global state.
pub struct InteractionCoordinator {
    store: DiagramStore,
    renderer: Arc<dyn RenderingSurface>,
    service: Arc<dyn DiagramService>,
    ui: Arc<dyn UiSurface>,
    client: Arc<dyn McpClient>,
    cache: InterfaceCache,
    autosave: AutoSaveScheduler,
    executions: ExecutionMonitor,
    mode: Mutex<ModeState>,
    node_type: Mutex<String>,
    edge_type: Mutex<Option<String>>,
    scoring: SignatureOverlap,
    config: CoordinatorConfig,
}

impl InteractionCoordinator {
    /// Wire up a coordinator from its collaborators.
    #[must_use]
    pub fn new(
        renderer: Arc<dyn RenderingSurface>,
        service: Arc<dyn DiagramService>,
        ui: Arc<dyn UiSurface>,
        client: Arc<dyn McpClient>,
        config: CoordinatorConfig,
    ) -> Self {
        let store = DiagramStore::new();
        let cache = InterfaceCache::new(
            Arc::clone(&client),
            store.clone(),
            Arc::clone(&renderer),
            config.wit_fetch,
        );
        let autosave =
            AutoSaveScheduler::new(Arc::clone(&service), Arc::clone(&ui), config.autosave);
        let executions =
            ExecutionMonitor::new(Arc::clone(&client), Arc::clone(&ui), config.execution);

        Self {
            node_type: Mutex::new(config.default_node_type.clone()),
            edge_type: Mutex::new(None),
            store,
            renderer,
            service,
            ui,
            client,
            cache,
            autosave,
            executions,
            mode: Mutex::new(ModeState::new()),
            scoring: SignatureOverlap::default(),
            config,
        }
    }

    /// The shared diagram store.
    #[must_use]
    pub fn store(&self) -> &DiagramStore {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Mode state machine
    // -----------------------------------------------------------------------

    /// The active interaction mode.
    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        self.mode_state().mode()
    }

    /// Explicitly change the interaction mode. Always succeeds.
    pub fn set_mode(&self, mode: InteractionMode) {
        let active = {
            let mut state = self.mode_state();
            state.set_mode(mode);
            state.mode()
        };
        tracing::debug!(%active, "Interaction mode set");
        self.renderer.set_interaction_mode(active);
    }

    /// Space pressed: transient pan override.
    pub fn space_pressed(&self) {
        let active = {
            let mut state = self.mode_state();
            state.space_pressed();
            state.mode()
        };
        self.renderer.set_interaction_mode(active);
    }

    /// Space released: restore the remembered mode.
    pub fn space_released(&self) {
        let active = {
            let mut state = self.mode_state();
            state.space_released();
            state.mode()
        };
        self.renderer.set_interaction_mode(active);
    }

    /// Select the node type used in `create-node` mode.
    pub fn set_node_type(&self, node_type: impl Into<String>) {
        *self
            .node_type
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = node_type.into();
    }

    /// Select the edge type used in `create-edge` mode, or `None` to fall
    /// back to the default.
    pub fn set_edge_type(&self, edge_type: Option<String>) {
        *self
            .edge_type
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = edge_type;
    }

    // -----------------------------------------------------------------------
    // Pointer events
    // -----------------------------------------------------------------------

    /// Click on empty canvas.
    ///
    /// Creates a node in `create-node` mode (creating and loading a fresh
    /// diagram first if none exists); a no-op in every other mode.
    pub async fn handle_canvas_click(&self, position: Position) {
        if self.mode() != InteractionMode::CreateNode {
            return;
        }

        if !self.store.is_loaded() {
            match self
                .service
                .create_diagram(&self.config.diagram_type, "Untitled Composition")
                .await
            {
                Ok(diagram) => {
                    tracing::info!(diagram_id = %diagram.id, "Created diagram for first node");
                    self.store.set_diagram(diagram);
                }
                Err(e) => {
                    self.ui
                        .notify(NoticeLevel::Error, &format!("Could not create diagram: {e}"));
                    return;
                }
            }
        }
        let Some(diagram_id) = self.store.diagram_id() else {
            return;
        };

        let node_type = self
            .node_type
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();
        match self
            .service
            .create_node(diagram_id, &node_type, position, &node_type)
            .await
        {
            Ok(element) => {
                let _ = self.store.update(|d| d.add_element(element));
                self.renderer.render();
            }
            Err(e) => {
                self.ui
                    .notify(NoticeLevel::Error, &format!("Could not create node: {e}"));
            }
        }
    }

    /// Click on an element.
    ///
    /// `on_load_toggle` reports whether the hit landed on a component's
    /// load-switch region (hit-testing belongs to the rendering surface).
    pub async fn handle_element_click(&self, element_id: ElementId, on_load_toggle: bool) {
        if self.mode() == InteractionMode::CreateEdge {
            let edge_type = self.active_edge_type();
            self.renderer.start_edge_creation(element_id, &edge_type);
            return;
        }

        let Some(element) = self.store.element(element_id) else {
            return;
        };

        if element.is_component() && on_load_toggle {
            self.toggle_load_switch(element_id).await;
            return;
        }

        // Normal selection, then a properties-panel refresh which kicks off
        // the interface fetch when data is absent.
        if !matches!(self.store.update(|d| d.select(element_id)), Ok(Ok(()))) {
            return;
        }
        self.renderer.render();
        self.refresh_properties_panel(element_id).await;
    }

    /// Pointer released over a target element after edge creation started.
    pub async fn handle_edge_end(&self, source_id: ElementId, target_id: ElementId) {
        let Some(diagram_id) = self.store.diagram_id() else {
            return;
        };
        let edge_type = self.active_edge_type();
        match self
            .service
            .create_edge(diagram_id, &edge_type, source_id, target_id, None)
            .await
        {
            Ok(edge) => {
                let _ = self.store.update(|d| d.add_element(edge));
                self.renderer.render();
            }
            Err(e) => {
                self.ui
                    .notify(NoticeLevel::Error, &format!("Could not create edge: {e}"));
            }
        }
    }

    /// Drag gesture finished: hand the selected elements' geometry to the
    /// auto-save scheduler. Unselected elements are never saved.
    pub fn handle_drag_end(&self) {
        let Some(diagram_id) = self.store.diagram_id() else {
            return;
        };
        let batch: Vec<_> = self
            .store
            .selected_elements()
            .iter()
            .filter_map(|element| {
                element.bounds().map(|bounds| composer_core::MovedElement {
                    id: element.id,
                    bounds,
                })
            })
            .collect();
        self.autosave.schedule(diagram_id, batch);
    }

    /// Double-click on an element: open an execution session for a
    /// component, no-op otherwise.
    ///
    /// The returned session is owned by the caller; dropping it leaves the
    /// monitor running in the background.
    pub async fn run_component(&self, element_id: ElementId) -> Option<ExecutionSession> {
        let element = self.store.element(element_id)?;
        if !element.is_component() {
            return None;
        }
        match self.executions.submit(element.component_name()).await {
            Ok(session) => Some(session),
            Err(e) => {
                self.ui
                    .notify(NoticeLevel::Error, &format!("Execution failed to start: {e}"));
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Interface linking
    // -----------------------------------------------------------------------

    /// Click on an interface port of a component.
    ///
    /// Runs the compatibility matcher over every other component and either
    /// opens the connection-selection affordance or reports that nothing is
    /// compatible (a valid outcome, distinct from an error).
    pub fn handle_interface_click(&self, element_id: ElementId, interface_name: &str) {
        let Some(source) = self.find_interface(element_id, interface_name) else {
            self.ui.notify(
                NoticeLevel::Warning,
                &format!("Interface `{interface_name}` is not available on this component"),
            );
            return;
        };

        let candidates = self.candidates_excluding(element_id);
        let matches = find_compatible(&source, &candidates, &self.scoring);
        if matches.is_empty() {
            self.ui.notify(
                NoticeLevel::Info,
                &format!("No compatible interfaces found for `{interface_name}`"),
            );
        } else {
            tracing::debug!(
                count = matches.len(),
                interface = interface_name,
                "Compatible interfaces found"
            );
            self.ui
                .show_connection_choices(element_id, interface_name, &matches);
        }
    }

    /// User confirmed a connection choice.
    ///
    /// Re-validates against the live diagram before committing; the diagram
    /// may have changed since matching. Returns whether an edge was created.
    pub async fn confirm_connection(
        &self,
        source_element: ElementId,
        source_interface: &str,
        target_element: ElementId,
        target_interface: &str,
    ) -> bool {
        let (Some(source), Some(target)) = (
            self.find_interface(source_element, source_interface),
            self.find_interface(target_element, target_interface),
        ) else {
            self.ui.notify(
                NoticeLevel::Error,
                "Cannot connect: one of the interfaces no longer exists",
            );
            return false;
        };

        let result: CompatibilityResult =
            composer_core::check_connection(&source, &target, &self.scoring);
        if !result.is_valid {
            let reason = result
                .issues
                .first()
                .cloned()
                .unwrap_or_else(|| "interfaces are incompatible".to_string());
            self.ui
                .notify(NoticeLevel::Error, &format!("Cannot connect: {reason}"));
            return false;
        }

        let Some(diagram_id) = self.store.diagram_id() else {
            return false;
        };
        let label = format!("{source_interface} → {target_interface}");
        match self
            .service
            .create_edge(
                diagram_id,
                INTERFACE_LINK_EDGE_TYPE,
                source_element,
                target_element,
                Some(&label),
            )
            .await
        {
            Ok(edge) => {
                let _ = self.store.update(|d| d.add_element(edge));
                self.renderer.render();
                true
            }
            Err(e) => {
                self.ui
                    .notify(NoticeLevel::Error, &format!("Could not create connection: {e}"));
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Keyboard
    // -----------------------------------------------------------------------

    /// Route a key press through the shortcut table.
    ///
    /// Keys from text controls and unmapped keys are ignored.
    pub async fn handle_key(&self, event: &KeyEvent) {
        let Some(action) = ShortcutAction::from_event(event) else {
            return;
        };
        tracing::debug!(?action, "Keyboard shortcut");
        match action {
            ShortcutAction::NewDiagram => self.new_diagram().await,
            ShortcutAction::SaveDiagram => self.save_diagram().await,
            ShortcutAction::ZoomIn => self.renderer.zoom(self.config.zoom_step),
            ShortcutAction::ZoomOut => self.renderer.zoom(1.0 / self.config.zoom_step),
            ShortcutAction::FitToContent => self.renderer.fit_to_content(),
            ShortcutAction::ResetView => self.renderer.reset_view(),
            ShortcutAction::SelectAll => {
                if self.store.update(|d| d.select_all()).is_ok() {
                    self.renderer.render();
                }
            }
            ShortcutAction::CloseDiagram => {
                self.autosave.cancel_pending();
                self.store.clear();
                self.renderer.render();
            }
            ShortcutAction::DeleteSelection => self.delete_selection().await,
            ShortcutAction::ClearSelection => {
                if self.store.update(|d| d.deselect_all()).is_ok() {
                    self.renderer.render();
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Diagram lifecycle
    // -----------------------------------------------------------------------

    /// Create and load a fresh diagram.
    pub async fn new_diagram(&self) {
        match self
            .service
            .create_diagram(&self.config.diagram_type, "Untitled Composition")
            .await
        {
            Ok(diagram) => {
                self.store.set_diagram(diagram);
                self.renderer.render_immediate();
            }
            Err(e) => {
                self.ui
                    .notify(NoticeLevel::Error, &format!("Could not create diagram: {e}"));
            }
        }
    }

    /// Re-open the diagram the persistence service considers current, if
    /// any. Typically called once at startup.
    pub async fn resume_last_diagram(&self) {
        if let Some(id) = self.service.current_diagram_id().await {
            self.open_diagram(id).await;
        }
    }

    /// Load an existing diagram.
    pub async fn open_diagram(&self, id: DiagramId) {
        match self.service.load_diagram(id).await {
            Ok(diagram) => {
                self.store.set_diagram(diagram);
                self.renderer.render_immediate();
            }
            Err(e) => {
                self.ui
                    .notify(NoticeLevel::Error, &format!("Could not load diagram: {e}"));
            }
        }
    }

    /// Save the current diagram, updating the sync indicator.
    pub async fn save_diagram(&self) {
        let Some(diagram_id) = self.store.diagram_id() else {
            return;
        };
        self.ui.set_sync_status(SyncStatus::Saving);
        match self.service.save_diagram(diagram_id).await {
            Ok(()) => self.ui.set_sync_status(SyncStatus::Saved),
            Err(e) => {
                self.ui.set_sync_status(SyncStatus::Error);
                self.ui
                    .notify(NoticeLevel::Error, &format!("Save failed: {e}"));
            }
        }
    }

    /// Apply a named layout to the current diagram.
    pub async fn apply_layout(&self, layout: &str) {
        let Some(diagram_id) = self.store.diagram_id() else {
            return;
        };
        match self.service.apply_layout(diagram_id, layout).await {
            Ok(()) => self.renderer.render(),
            Err(e) => {
                self.ui
                    .notify(NoticeLevel::Error, &format!("Layout failed: {e}"));
            }
        }
    }

    /// Fetch interface metadata for every component lacking it.
    pub async fn preload_interfaces(&self) -> usize {
        self.cache.preload_all().await
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn mode_state(&self) -> std::sync::MutexGuard<'_, ModeState> {
        self.mode
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn active_edge_type(&self) -> String {
        self.edge_type
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
            .unwrap_or_else(|| self.config.default_edge_type.clone())
    }

    async fn refresh_properties_panel(&self, element_id: ElementId) {
        let Some(element) = self.store.element(element_id) else {
            return;
        };
        self.ui
            .update_properties_panel(element_id, element.kind_name(), &element.properties);
        if element.is_component() && !element.has_interfaces() {
            self.cache.ensure_interfaces(element_id).await;
        }
    }

    async fn toggle_load_switch(&self, element_id: ElementId) {
        let mut loaded = false;
        if self
            .store
            .update_element(element_id, |element| loaded = element.toggle_loaded())
            .is_err()
        {
            return;
        }
        tracing::debug!(%element_id, loaded, "Component load switch toggled");
        self.persist_element(element_id).await;
        self.renderer.render();
    }

    /// Best-effort persistence of one element's properties.
    async fn persist_element(&self, element_id: ElementId) {
        let Some(element) = self.store.element(element_id) else {
            return;
        };
        let params = UpdateElementParams {
            element_id,
            properties: element.properties,
        };
        let Ok(args) = serde_json::to_value(params) else {
            return;
        };
        match self.client.call_tool(UPDATE_ELEMENT, args).await {
            Ok(response) if response.success => {}
            Ok(response) => {
                tracing::warn!(%element_id, "Element update rejected: {}", response.error_message());
            }
            Err(e) => tracing::warn!(%element_id, "Element update failed: {e}"),
        }
    }

    async fn delete_selection(&self) {
        let selected: Vec<ElementId> = self
            .store
            .selected_elements()
            .iter()
            .map(|element| element.id)
            .collect();
        if selected.is_empty() {
            return;
        }

        for element_id in selected {
            let Ok(args) = serde_json::to_value(DeleteElementParams { element_id }) else {
                continue;
            };
            match self.client.call_tool(DELETE_ELEMENT, args).await {
                Ok(response) if response.success => {
                    let _ = self.store.update(|d| d.remove_element(element_id));
                }
                Ok(response) => {
                    self.ui.notify(
                        NoticeLevel::Error,
                        &format!("Could not delete element: {}", response.error_message()),
                    );
                }
                Err(e) => {
                    self.ui
                        .notify(NoticeLevel::Error, &format!("Could not delete element: {e}"));
                }
            }
        }
        self.renderer.render();
    }

    fn find_interface(&self, element_id: ElementId, name: &str) -> Option<WitInterface> {
        self.store
            .element(element_id)?
            .interfaces()
            .into_iter()
            .find(|i| i.name == name)
    }

    /// Candidate interfaces from every other component, in diagram order.
    fn candidates_excluding(&self, source_element: ElementId) -> Vec<InterfaceCandidate> {
        let Some(diagram) = self.store.snapshot() else {
            return Vec::new();
        };
        diagram
            .components()
            .filter(|c| c.id != source_element)
            .flat_map(|c| {
                let component_id = c.id;
                c.interfaces()
                    .into_iter()
                    .map(move |interface| InterfaceCandidate {
                        component_id,
                        interface,
                    })
            })
            .collect()
    }
}
