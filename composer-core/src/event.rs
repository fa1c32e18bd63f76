//! Keyboard input events and shortcut mapping.

use serde::{Deserialize, Serialize};

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyModifiers {
    /// Shift key pressed.
    pub shift: bool,
    /// Control key pressed.
    pub ctrl: bool,
    /// Alt/Option key pressed.
    pub alt: bool,
    /// Meta/Command key pressed.
    pub meta: bool,
}

impl KeyModifiers {
    /// Whether the platform command modifier (ctrl or cmd) is held.
    #[must_use]
    pub const fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A key press delivered to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Key name (`"s"`, `"Delete"`, `"Escape"`, ...).
    pub key: String,
    /// Active modifier keys.
    pub modifiers: KeyModifiers,
    /// Whether focus was inside a text input, textarea, or select when the
    /// key was pressed. Shortcuts are ignored in that case.
    pub from_text_input: bool,
}

impl KeyEvent {
    /// Create a plain key event with no modifiers.
    #[must_use]
    pub fn plain(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: KeyModifiers::default(),
            from_text_input: false,
        }
    }

    /// Create a ctrl/cmd-modified key event.
    #[must_use]
    pub fn command(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: KeyModifiers {
                ctrl: true,
                ..KeyModifiers::default()
            },
            from_text_input: false,
        }
    }
}

/// Actions reachable through keyboard shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShortcutAction {
    /// Create and load a fresh diagram.
    NewDiagram,
    /// Save the current diagram.
    SaveDiagram,
    /// Zoom in one step.
    ZoomIn,
    /// Zoom out one step.
    ZoomOut,
    /// Fit the diagram into the viewport.
    FitToContent,
    /// Reset zoom and pan.
    ResetView,
    /// Select every element.
    SelectAll,
    /// Close the current diagram.
    CloseDiagram,
    /// Delete the current selection.
    DeleteSelection,
    /// Clear the current selection.
    ClearSelection,
}

impl ShortcutAction {
    /// Map a key event to its shortcut action.
    ///
    /// Returns `None` for unmapped keys and for any key originating from a
    /// text control.
    #[must_use]
    pub fn from_event(event: &KeyEvent) -> Option<Self> {
        if event.from_text_input {
            return None;
        }
        if event.modifiers.command() {
            return match event.key.as_str() {
                "n" => Some(Self::NewDiagram),
                "s" => Some(Self::SaveDiagram),
                "=" | "+" => Some(Self::ZoomIn),
                "-" => Some(Self::ZoomOut),
                "f" => Some(Self::FitToContent),
                "0" => Some(Self::ResetView),
                "a" => Some(Self::SelectAll),
                "w" => Some(Self::CloseDiagram),
                _ => None,
            };
        }
        match event.key.as_str() {
            "Delete" | "Backspace" => Some(Self::DeleteSelection),
            "Escape" => Some(Self::ClearSelection),
            _ => None,
        }
    }
}
