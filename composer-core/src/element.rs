//! Diagram elements - the building blocks of compositions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::wit::{InterfaceSummary, WitInterface};

/// Unique identifier for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiagramId(Uuid);

impl DiagramId {
    /// Create a new unique diagram ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for DiagramId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DiagramId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A point in diagram coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Position {
    /// Create a position.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned geometry of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// X position of the top-left corner.
    pub x: f64,
    /// Y position of the top-left corner.
    pub y: f64,
    /// Width in diagram units.
    pub width: f64,
    /// Height in diagram units.
    pub height: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 160.0,
            height: 80.0,
        }
    }
}

impl Bounds {
    /// Create bounds at a position with the default node size.
    #[must_use]
    pub fn at(position: Position) -> Self {
        Self {
            x: position.x,
            y: position.y,
            ..Self::default()
        }
    }

    /// The top-left corner as a position.
    #[must_use]
    pub const fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// Availability of a component's backing artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    /// Not yet checked.
    #[default]
    Unknown,
    /// Interface metadata loaded successfully.
    Available,
    /// Metadata fetch failed.
    Error,
    /// Backing file is gone.
    Missing,
}

/// The shape of content an element contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    /// A node with geometry.
    Node {
        /// Node type identifier (e.g. `wasm-component`, `task`).
        node_type: String,
        /// Position and size.
        bounds: Bounds,
    },
    /// An edge between two elements.
    Edge {
        /// Edge type identifier (e.g. `flow`, `interface-link`).
        edge_type: String,
        /// Source element ID.
        source_id: ElementId,
        /// Target element ID.
        target_id: ElementId,
    },
}

/// Node type identifying a WASM component.
pub const COMPONENT_NODE_TYPE: &str = "wasm-component";

/// Edge type for connections created from interface matches.
pub const INTERFACE_LINK_EDGE_TYPE: &str = "interface-link";

/// Property key holding the cached interface list.
pub const PROP_INTERFACES: &str = "interfaces";
/// Property key holding the component status.
pub const PROP_STATUS: &str = "status";
/// Property key holding the interface summary counts.
pub const PROP_SUMMARY: &str = "summary";
/// Property key holding the component name used for remote lookups.
pub const PROP_COMPONENT_NAME: &str = "componentName";
/// Property key holding the component load switch state.
pub const PROP_LOADED: &str = "loaded";
/// Property key holding the message attached to an `error` status.
pub const PROP_STATUS_MESSAGE: &str = "statusMessage";

/// A geometry snapshot taken at drag end, handed to the auto-save batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovedElement {
    /// Element that moved.
    pub id: ElementId,
    /// Its geometry after the drag.
    pub bounds: Bounds,
}

/// A diagram element with content, label, and an open properties map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramElement {
    /// Unique identifier.
    pub id: ElementId,
    /// Node or edge content.
    pub kind: ElementKind,
    /// Display label.
    pub label: String,
    /// Open property bag (interfaces, status, counts for components).
    pub properties: Map<String, Value>,
}

impl DiagramElement {
    /// Create a node element.
    #[must_use]
    pub fn node(node_type: impl Into<String>, bounds: Bounds, label: impl Into<String>) -> Self {
        Self {
            id: ElementId::new(),
            kind: ElementKind::Node {
                node_type: node_type.into(),
                bounds,
            },
            label: label.into(),
            properties: Map::new(),
        }
    }

    /// Create an edge element.
    #[must_use]
    pub fn edge(
        edge_type: impl Into<String>,
        source_id: ElementId,
        target_id: ElementId,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: ElementId::new(),
            kind: ElementKind::Edge {
                edge_type: edge_type.into(),
                source_id,
                target_id,
            },
            label: label.into(),
            properties: Map::new(),
        }
    }

    /// A short name for the element's kind (`node` or `edge`).
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self.kind {
            ElementKind::Node { .. } => "node",
            ElementKind::Edge { .. } => "edge",
        }
    }

    /// The node geometry, if this element is a node.
    #[must_use]
    pub const fn bounds(&self) -> Option<Bounds> {
        match self.kind {
            ElementKind::Node { bounds, .. } => Some(bounds),
            ElementKind::Edge { .. } => None,
        }
    }

    /// Replace the node geometry. No-op for edges.
    pub fn set_bounds(&mut self, new_bounds: Bounds) {
        if let ElementKind::Node { ref mut bounds, .. } = self.kind {
            *bounds = new_bounds;
        }
    }

    /// Whether this element is a WASM component node.
    #[must_use]
    pub fn is_component(&self) -> bool {
        matches!(&self.kind, ElementKind::Node { node_type, .. } if node_type == COMPONENT_NODE_TYPE)
    }

    /// The component name used for remote lookups.
    ///
    /// Falls back to the label when the property is absent.
    #[must_use]
    pub fn component_name(&self) -> &str {
        self.properties
            .get(PROP_COMPONENT_NAME)
            .and_then(Value::as_str)
            .unwrap_or(&self.label)
    }

    /// The cached interface list, if any.
    #[must_use]
    pub fn interfaces(&self) -> Vec<WitInterface> {
        self.properties
            .get(PROP_INTERFACES)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }

    /// Whether interface metadata has been loaded.
    #[must_use]
    pub fn has_interfaces(&self) -> bool {
        !self.interfaces().is_empty()
    }

    /// The component status.
    #[must_use]
    pub fn status(&self) -> ComponentStatus {
        self.properties
            .get(PROP_STATUS)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }

    /// Set the component status, replacing any previous value.
    pub fn set_status(&mut self, status: ComponentStatus) {
        if let Ok(value) = serde_json::to_value(status) {
            self.properties.insert(PROP_STATUS.to_string(), value);
        }
    }

    /// Overwrite the cached interface data in one step.
    ///
    /// Interfaces, summary counts, and status are replaced together so a
    /// reader never observes a half-updated component.
    pub fn replace_interfaces(&mut self, interfaces: &[WitInterface], summary: InterfaceSummary) {
        let Ok(list) = serde_json::to_value(interfaces) else {
            return;
        };
        let Ok(counts) = serde_json::to_value(summary) else {
            return;
        };
        self.properties.insert(PROP_INTERFACES.to_string(), list);
        self.properties.insert(PROP_SUMMARY.to_string(), counts);
        self.set_status(ComponentStatus::Available);
    }

    /// Mark the component failed, retaining the error message.
    pub fn set_error(&mut self, message: &str) {
        self.set_status(ComponentStatus::Error);
        self.properties.insert(
            PROP_STATUS_MESSAGE.to_string(),
            Value::String(message.to_string()),
        );
    }

    /// The message attached to an `error` status, if any.
    #[must_use]
    pub fn status_message(&self) -> Option<&str> {
        self.properties
            .get(PROP_STATUS_MESSAGE)
            .and_then(Value::as_str)
    }

    /// The cached interface summary counts, if present.
    #[must_use]
    pub fn interface_summary(&self) -> Option<InterfaceSummary> {
        self.properties
            .get(PROP_SUMMARY)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Whether the component's load switch is on.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.properties
            .get(PROP_LOADED)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Flip the load switch, returning the new state.
    pub fn toggle_loaded(&mut self) -> bool {
        let loaded = !self.is_loaded();
        self.properties
            .insert(PROP_LOADED.to_string(), Value::Bool(loaded));
        loaded
    }
}
