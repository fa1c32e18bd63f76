//! # Composer Interaction
//!
//! The canvas interaction coordinator for the WASM component composer:
//! turns pointer/keyboard events and cross-component interface metadata
//! into diagram mutations while juggling concurrent, cancellable,
//! time-bounded background work.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │            InteractionCoordinator               │
//! │   mode state machine + event routing            │
//! ├────────────┬────────────┬───────────────────────┤
//! │ Interface  │ Auto-Save  │ Execution Monitor     │
//! │ Cache      │ Scheduler  │ - submit/poll/result  │
//! │ - fetch    │ - debounce │ - deadline + cancel   │
//! │ - classify │ - batch    │ - session per run     │
//! ├────────────┴────────────┴───────────────────────┤
//! │ Collaborator traits: RenderingSurface,          │
//! │ DiagramService, UiSurface, McpClient            │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! The coordinator is a library: the application shell supplies the
//! rendering surface, persistence service, UI surfaces, and transport, all
//! injected at construction.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod autosave;
pub mod coordinator;
pub mod error;
pub mod execution;
pub mod surfaces;
pub mod wit_cache;

pub use autosave::{AutoSaveConfig, AutoSaveScheduler};
pub use coordinator::{CoordinatorConfig, InteractionCoordinator};
pub use error::{InteractionError, InteractionResult};
pub use execution::{
    ExecutionConfig, ExecutionMonitor, ExecutionOutcome, ExecutionSession, ExecutionStatus,
    ProgressSnapshot,
};
pub use surfaces::{DiagramService, NoticeLevel, RenderingSurface, SyncStatus, UiSurface};
pub use wit_cache::{InterfaceCache, WitFetchConfig, WitFetchOutcome};

/// Composer interaction version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
