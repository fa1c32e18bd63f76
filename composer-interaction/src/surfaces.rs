//! Collaborator traits supplied by the application shell.
//!
//! The interaction core never draws, persists, or shows UI itself; it talks
//! to these surfaces. All of them are explicitly constructed and passed into
//! the coordinator at startup.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use composer_core::{
    Diagram, DiagramElement, DiagramId, ElementId, InteractionMode, InterfaceMatch, MovedElement,
    Position,
};

/// The drawing surface: hit-testing, zoom/pan mechanics, and visual
/// edge-creation feedback live behind it.
pub trait RenderingSurface: Send + Sync {
    /// Mirror the active interaction mode (cursor, hover affordances).
    fn set_interaction_mode(&self, mode: InteractionMode);

    /// Begin interactive edge creation from a source element.
    fn start_edge_creation(&self, source: ElementId, edge_type: &str);

    /// Request a render on the next frame.
    fn render(&self);

    /// Render synchronously, skipping frame scheduling.
    fn render_immediate(&self);

    /// Zoom by a factor around the viewport center.
    fn zoom(&self, factor: f64);

    /// Fit the whole diagram into the viewport.
    fn fit_to_content(&self);

    /// Reset zoom and pan to defaults.
    fn reset_view(&self);
}

/// Diagram persistence service.
#[async_trait]
pub trait DiagramService: Send + Sync {
    /// ID of the most recently opened diagram, if any.
    async fn current_diagram_id(&self) -> Option<DiagramId>;

    /// Create a new diagram.
    async fn create_diagram(&self, diagram_type: &str, name: &str) -> anyhow::Result<Diagram>;

    /// Load a diagram by ID.
    async fn load_diagram(&self, id: DiagramId) -> anyhow::Result<Diagram>;

    /// Save a diagram.
    async fn save_diagram(&self, id: DiagramId) -> anyhow::Result<()>;

    /// Create a node element.
    async fn create_node(
        &self,
        diagram_id: DiagramId,
        node_type: &str,
        position: Position,
        label: &str,
    ) -> anyhow::Result<DiagramElement>;

    /// Create an edge element.
    async fn create_edge(
        &self,
        diagram_id: DiagramId,
        edge_type: &str,
        source_id: ElementId,
        target_id: ElementId,
        label: Option<&str>,
    ) -> anyhow::Result<DiagramElement>;

    /// Persist the geometry of moved elements.
    async fn update_element_positions(
        &self,
        diagram_id: DiagramId,
        moved: &[MovedElement],
    ) -> anyhow::Result<()>;

    /// Apply a named layout algorithm.
    async fn apply_layout(&self, diagram_id: DiagramId, layout: &str) -> anyhow::Result<()>;
}

/// Persistence sync indicator states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// A save is in flight.
    Saving,
    /// The last save succeeded.
    Saved,
    /// The last save failed.
    Error,
}

/// Severity of a transient notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// Informational.
    Info,
    /// Something degraded but recoverable.
    Warning,
    /// An action failed.
    Error,
}

/// Status, notification, and panel surfaces.
pub trait UiSurface: Send + Sync {
    /// Show a transient notification.
    fn notify(&self, level: NoticeLevel, message: &str);

    /// Update the global sync-status indicator.
    fn set_sync_status(&self, status: SyncStatus);

    /// Refresh the properties panel for an element.
    fn update_properties_panel(
        &self,
        element_id: ElementId,
        kind: &str,
        properties: &Map<String, Value>,
    );

    /// Offer the user a choice among compatible interfaces.
    fn show_connection_choices(
        &self,
        source_element: ElementId,
        source_interface: &str,
        matches: &[InterfaceMatch],
    );

    /// Display live execution progress (stage and percentage).
    fn show_execution_progress(&self, execution_id: &str, stage: &str, percent: u8);
}
