//! Interaction mode state machine.
//!
//! Exactly one mode is active at a time. Explicit mode changes always
//! succeed; the space-bar pan override is transient and restores the prior
//! mode on release.

use serde::{Deserialize, Serialize};

/// The active canvas interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InteractionMode {
    /// Default mode - select and manipulate elements.
    Select,
    /// Pan the canvas.
    Pan,
    /// Click on empty canvas creates a node.
    CreateNode,
    /// Click on an element begins edge creation.
    CreateEdge,
    /// Interface clicks match and link component interfaces.
    CreateInterfaceLink,
}

impl std::fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Select => "select",
            Self::Pan => "pan",
            Self::CreateNode => "create-node",
            Self::CreateEdge => "create-edge",
            Self::CreateInterfaceLink => "create-interface-link",
        };
        write!(f, "{name}")
    }
}

/// Mode state with the single-slot memory for the space-bar pan override.
///
/// While space is held the active mode is `Pan` and the slot remembers what
/// to restore. An explicit mode change during the hold retargets the slot,
/// so releasing space lands on the user's most recent choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeState {
    mode: InteractionMode,
    remembered: Option<InteractionMode>,
}

impl ModeState {
    /// Create mode state starting in `Select`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mode: InteractionMode::Select,
            remembered: None,
        }
    }

    /// The currently active mode.
    #[must_use]
    pub const fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Whether the space-bar pan override is active.
    #[must_use]
    pub const fn is_pan_override(&self) -> bool {
        self.remembered.is_some()
    }

    /// Explicitly set the mode. Never fails.
    ///
    /// During a space-bar hold the new mode goes into the restore slot and
    /// `Pan` stays active until release.
    pub fn set_mode(&mut self, mode: InteractionMode) {
        if self.remembered.is_some() {
            self.remembered = Some(mode);
        } else {
            self.mode = mode;
        }
    }

    /// Space pressed: switch to `Pan`, remembering the current mode.
    ///
    /// Repeated presses without a release (key auto-repeat) keep the
    /// originally remembered mode.
    pub fn space_pressed(&mut self) {
        if self.remembered.is_none() {
            self.remembered = Some(self.mode);
            self.mode = InteractionMode::Pan;
        }
    }

    /// Space released: restore the remembered mode verbatim.
    pub fn space_released(&mut self) {
        if let Some(prior) = self.remembered.take() {
            self.mode = prior;
        }
    }
}

impl Default for ModeState {
    fn default() -> Self {
        Self::new()
    }
}
