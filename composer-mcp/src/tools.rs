//! Tool names and parameter payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use composer_core::ElementId;

/// Tool extracting WIT interfaces from a component binary.
pub const GET_COMPONENT_WIT_INFO: &str = "get_component_wit_info";
/// Tool persisting element properties to the diagram store.
pub const UPDATE_ELEMENT: &str = "update_element";
/// Tool removing an element from the diagram store.
pub const DELETE_ELEMENT: &str = "delete_element";
/// Tool executing a component with resource limits.
pub const EXECUTE_WASM_COMPONENT: &str = "execute_wasm_component";
/// Tool cancelling a running execution server-side.
pub const CANCEL_EXECUTION: &str = "cancel_execution";

/// Parameters for `get_component_wit_info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WitInfoParams {
    /// Name of the component to analyze.
    pub component_name: String,
}

impl WitInfoParams {
    /// Create parameters for a component.
    #[must_use]
    pub fn new(component_name: impl Into<String>) -> Self {
        Self {
            component_name: component_name.into(),
        }
    }
}

/// Parameters for `update_element`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateElementParams {
    /// Element to update.
    pub element_id: ElementId,
    /// Properties to write.
    pub properties: Map<String, Value>,
}

/// Parameters for `delete_element`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteElementParams {
    /// Element to delete.
    pub element_id: ElementId,
}

/// Parameters for `cancel_execution`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelExecutionParams {
    /// Execution to cancel.
    pub execution_id: String,
}
