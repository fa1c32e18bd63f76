//! Shared in-memory diagram storage.
//!
//! The coordinator and the interface cache both mutate the current diagram;
//! [`DiagramStore`] gives them a cloneable handle over the same state.
//! Execution is cooperative and single-threaded in practice, but the lock
//! keeps the handle `Send + Sync` for spawned tasks.

use std::sync::{Arc, RwLock};

use crate::diagram::Diagram;
use crate::element::{Bounds, DiagramElement, DiagramId, ElementId};
use crate::error::{CoreError, CoreResult};

/// Cloneable handle to the currently loaded diagram, if any.
#[derive(Debug, Clone, Default)]
pub struct DiagramStore {
    inner: Arc<RwLock<Option<Diagram>>>,
}

impl DiagramStore {
    /// Create an empty store with no diagram loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a diagram is currently loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .is_some()
    }

    /// ID of the current diagram.
    #[must_use]
    pub fn diagram_id(&self) -> Option<DiagramId> {
        self.inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_ref()
            .map(|d| d.id)
    }

    /// Replace the current diagram.
    pub fn set_diagram(&self, diagram: Diagram) {
        tracing::debug!(diagram_id = %diagram.id, "Diagram loaded into store");
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = Some(diagram);
    }

    /// Unload the current diagram.
    pub fn clear(&self) {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if guard.take().is_some() {
            tracing::debug!("Diagram unloaded");
        }
    }

    /// Clone of the current diagram.
    #[must_use]
    pub fn snapshot(&self) -> Option<Diagram> {
        self.inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Mutate the current diagram through a closure.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoDiagram`] if no diagram is loaded.
    pub fn update<F, R>(&self, f: F) -> CoreResult<R>
    where
        F: FnOnce(&mut Diagram) -> R,
    {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let diagram = guard.as_mut().ok_or(CoreError::NoDiagram)?;
        Ok(f(diagram))
    }

    /// Clone of one element.
    #[must_use]
    pub fn element(&self, id: ElementId) -> Option<DiagramElement> {
        self.inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_ref()
            .and_then(|d| d.get_element(id).cloned())
    }

    /// Mutate one element through a closure.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoDiagram`] if no diagram is loaded and
    /// [`CoreError::ElementNotFound`] if the element does not exist.
    pub fn update_element<F>(&self, id: ElementId, f: F) -> CoreResult<()>
    where
        F: FnOnce(&mut DiagramElement),
    {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let diagram = guard.as_mut().ok_or(CoreError::NoDiagram)?;
        let element = diagram
            .get_element_mut(id)
            .ok_or_else(|| CoreError::ElementNotFound(id.to_string()))?;
        f(element);
        Ok(())
    }

    /// Move a node to new bounds.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoDiagram`] or [`CoreError::ElementNotFound`].
    pub fn move_element(&self, id: ElementId, bounds: Bounds) -> CoreResult<()> {
        self.update_element(id, |element| element.set_bounds(bounds))
    }

    /// Clones of the currently selected elements, in selection order.
    #[must_use]
    pub fn selected_elements(&self) -> Vec<DiagramElement> {
        self.inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_ref()
            .map(|d| d.selected_elements().cloned().collect())
            .unwrap_or_default()
    }
}
