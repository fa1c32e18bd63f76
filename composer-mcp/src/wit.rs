//! Wire format of `get_component_wit_info` responses and normalization into
//! the core interface model.
//!
//! The backend reports imports and exports as separate lists without a
//! direction field; normalization folds them into one uniform
//! [`WitInterface`] list with the direction set.

use serde::{Deserialize, Serialize};

use composer_core::{
    InterfaceDirection, InterfaceSummary, WitFunction, WitInterface, WitParam, WitType,
};

/// One interface as reported by the backend analyzer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawInterface {
    /// Interface name.
    pub name: String,
    /// Functions declared by the interface.
    #[serde(default)]
    pub functions: Vec<RawFunction>,
    /// Types declared by the interface.
    #[serde(default)]
    pub types: Vec<String>,
}

/// One function as reported by the backend analyzer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFunction {
    /// Function name.
    pub name: String,
    /// Parameter slots.
    #[serde(default)]
    pub params: Vec<RawParam>,
    /// Result slots.
    #[serde(default)]
    pub results: Vec<RawParam>,
}

/// One parameter/result slot as reported by the backend analyzer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawParam {
    /// Slot name.
    #[serde(default)]
    pub name: String,
    /// Type name.
    pub param_type: String,
}

/// Complete WIT analysis payload for one component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WitInfoReport {
    /// Component name.
    pub component_name: String,
    /// World name, when the component declares one.
    #[serde(default)]
    pub world_name: Option<String>,
    /// Imported interfaces.
    #[serde(default)]
    pub imports: Vec<RawInterface>,
    /// Exported interfaces.
    #[serde(default)]
    pub exports: Vec<RawInterface>,
    /// Package dependencies.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl WitInfoReport {
    /// Normalize into the uniform core interface list.
    ///
    /// Imports become `direction=import`, exports `direction=export`; report
    /// order is preserved.
    #[must_use]
    pub fn normalize(&self) -> Vec<WitInterface> {
        let convert = |raw: &RawInterface, direction: InterfaceDirection| WitInterface {
            name: raw.name.clone(),
            direction,
            functions: raw
                .functions
                .iter()
                .map(|f| WitFunction {
                    name: f.name.clone(),
                    params: convert_params(&f.params),
                    results: convert_params(&f.results),
                })
                .collect(),
            types: raw
                .types
                .iter()
                .map(|t| WitType { name: t.clone() })
                .collect(),
        };

        self.imports
            .iter()
            .map(|i| convert(i, InterfaceDirection::Import))
            .chain(
                self.exports
                    .iter()
                    .map(|e| convert(e, InterfaceDirection::Export)),
            )
            .collect()
    }

    /// Summary counts for the normalized interface list.
    #[must_use]
    pub fn summary(&self) -> InterfaceSummary {
        InterfaceSummary::from_interfaces(&self.normalize(), self.dependencies.len())
    }
}

fn convert_params(raw: &[RawParam]) -> Vec<WitParam> {
    raw.iter()
        .map(|p| WitParam {
            name: p.name.clone(),
            param_type: WitType {
                name: p.param_type.clone(),
            },
        })
        .collect()
}
