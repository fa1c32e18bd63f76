//! WIT interface model for WASM components.
//!
//! A component node carries the interfaces extracted from its binary:
//! imports (what it requires) and exports (what it provides). The list is
//! replaced wholesale on every successful fetch, never partially merged.

use serde::{Deserialize, Serialize};

/// Whether an interface is required or provided by its component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceDirection {
    /// The component requires this interface.
    Import,
    /// The component provides this interface.
    Export,
}

impl InterfaceDirection {
    /// The direction a counterpart interface must have to connect.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Import => Self::Export,
            Self::Export => Self::Import,
        }
    }
}

impl std::fmt::Display for InterfaceDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Import => write!(f, "import"),
            Self::Export => write!(f, "export"),
        }
    }
}

/// A named WIT type referenced by a function signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitType {
    /// Type name as it appears in the interface definition.
    pub name: String,
}

/// A parameter or result slot of a WIT function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitParam {
    /// Parameter name.
    pub name: String,
    /// Type of the parameter.
    pub param_type: WitType,
}

/// A function declared by a WIT interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitFunction {
    /// Function name.
    pub name: String,
    /// Parameters in declaration order.
    pub params: Vec<WitParam>,
    /// Result slots in declaration order.
    pub results: Vec<WitParam>,
}

impl WitFunction {
    /// Check whether another function has the same name and signature.
    ///
    /// Signatures match when parameter and result types agree position by
    /// position; slot names are ignored.
    #[must_use]
    pub fn signature_matches(&self, other: &Self) -> bool {
        fn types_match(a: &[WitParam], b: &[WitParam]) -> bool {
            a.len() == b.len()
                && a.iter()
                    .zip(b)
                    .all(|(x, y)| x.param_type.name == y.param_type.name)
        }

        self.name == other.name
            && types_match(&self.params, &other.params)
            && types_match(&self.results, &other.results)
    }
}

/// A complete interface owned by one component element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitInterface {
    /// Interface name.
    pub name: String,
    /// Import or export.
    pub direction: InterfaceDirection,
    /// Functions declared by the interface.
    pub functions: Vec<WitFunction>,
    /// Types declared by the interface.
    pub types: Vec<WitType>,
}

impl WitInterface {
    /// Create an interface with no functions or types.
    #[must_use]
    pub fn new(name: impl Into<String>, direction: InterfaceDirection) -> Self {
        Self {
            name: name.into(),
            direction,
            functions: Vec::new(),
            types: Vec::new(),
        }
    }

    /// Add a function.
    #[must_use]
    pub fn with_function(mut self, function: WitFunction) -> Self {
        self.functions.push(function);
        self
    }
}

/// Cached summary counts for a component's interface list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceSummary {
    /// Number of imported interfaces.
    pub imports: usize,
    /// Number of exported interfaces.
    pub exports: usize,
    /// Total functions across all interfaces.
    pub functions: usize,
    /// Number of package dependencies.
    pub dependencies: usize,
}

impl InterfaceSummary {
    /// Compute summary counts from an interface list.
    #[must_use]
    pub fn from_interfaces(interfaces: &[WitInterface], dependencies: usize) -> Self {
        let imports = interfaces
            .iter()
            .filter(|i| i.direction == InterfaceDirection::Import)
            .count();
        Self {
            imports,
            exports: interfaces.len() - imports,
            functions: interfaces.iter().map(|i| i.functions.len()).sum(),
            dependencies,
        }
    }
}
