//! # Composer Core
//!
//! Data model and pure algorithms for the WASM component composer.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               composer-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Diagram Model    │  Interaction State      │
//! │  - Elements       │  - Mode machine         │
//! │  - WIT interfaces │  - Space-pan override   │
//! │  - Shared store   │  - Shortcut mapping     │
//! ├─────────────────────────────────────────────┤
//! │  Compatibility Matcher                      │
//! │  - Connectivity rule (import ↔ export)      │
//! │  - Pluggable scoring, stable ordering       │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod compat;
pub mod diagram;
pub mod element;
pub mod error;
pub mod event;
pub mod mode;
pub mod store;
pub mod wit;

pub use compat::{
    check_connection, find_compatible, CompatibilityResult, InterfaceCandidate, InterfaceMatch,
    ScoringStrategy, SignatureOverlap,
};
pub use diagram::Diagram;
pub use element::{
    Bounds, ComponentStatus, DiagramElement, DiagramId, ElementId, ElementKind, MovedElement,
    Position, COMPONENT_NODE_TYPE, INTERFACE_LINK_EDGE_TYPE,
};
pub use error::{CoreError, CoreResult};
pub use event::{KeyEvent, KeyModifiers, ShortcutAction};
pub use mode::{InteractionMode, ModeState};
pub use store::DiagramStore;
pub use wit::{
    InterfaceDirection, InterfaceSummary, WitFunction, WitInterface, WitParam, WitType,
};

/// Composer core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
