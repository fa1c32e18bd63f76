//! Diagram graph holding elements and selection state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::element::{DiagramElement, DiagramId, ElementId};
use crate::error::{CoreError, CoreResult};

/// A diagram containing all composition elements.
///
/// Insertion order is preserved separately from the element map: the
/// compatibility matcher breaks score ties by diagram order, and renderers
/// want a stable iteration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagram {
    /// Unique identifier.
    pub id: DiagramId,
    /// Diagram type identifier (e.g. `wasm-composition`).
    pub diagram_type: String,
    /// Display name.
    pub name: String,
    /// All elements, indexed by ID.
    elements: HashMap<ElementId, DiagramElement>,
    /// Element IDs in insertion order.
    order: Vec<ElementId>,
    /// Currently selected element IDs.
    selection: Vec<ElementId>,
    /// Bumped on every mutation.
    revision: u64,
}

impl Diagram {
    /// Create a new empty diagram.
    #[must_use]
    pub fn new(diagram_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: DiagramId::new(),
            diagram_type: diagram_type.into(),
            name: name.into(),
            elements: HashMap::new(),
            order: Vec::new(),
            selection: Vec::new(),
            revision: 0,
        }
    }

    /// Add an element, returning its ID.
    pub fn add_element(&mut self, element: DiagramElement) -> ElementId {
        let id = element.id;
        if !self.elements.contains_key(&id) {
            self.order.push(id);
        }
        self.elements.insert(id, element);
        self.revision += 1;
        id
    }

    /// Remove an element.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ElementNotFound`] if the element does not exist.
    pub fn remove_element(&mut self, id: ElementId) -> CoreResult<DiagramElement> {
        self.order.retain(|&eid| eid != id);
        self.selection.retain(|&eid| eid != id);
        self.revision += 1;
        self.elements
            .remove(&id)
            .ok_or_else(|| CoreError::ElementNotFound(id.to_string()))
    }

    /// Get an element by ID.
    #[must_use]
    pub fn get_element(&self, id: ElementId) -> Option<&DiagramElement> {
        self.elements.get(&id)
    }

    /// Get a mutable reference to an element by ID.
    pub fn get_element_mut(&mut self, id: ElementId) -> Option<&mut DiagramElement> {
        self.revision += 1;
        self.elements.get_mut(&id)
    }

    /// All elements in insertion order.
    pub fn elements(&self) -> impl Iterator<Item = &DiagramElement> {
        self.order.iter().filter_map(|id| self.elements.get(id))
    }

    /// Component elements in insertion order.
    pub fn components(&self) -> impl Iterator<Item = &DiagramElement> {
        self.elements().filter(|e| e.is_component())
    }

    /// Select a single element, clearing any previous selection.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ElementNotFound`] if the element does not exist.
    pub fn select(&mut self, id: ElementId) -> CoreResult<()> {
        if !self.elements.contains_key(&id) {
            return Err(CoreError::ElementNotFound(id.to_string()));
        }
        self.selection.clear();
        self.selection.push(id);
        Ok(())
    }

    /// Add an element to the selection without clearing it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ElementNotFound`] if the element does not exist.
    pub fn select_additional(&mut self, id: ElementId) -> CoreResult<()> {
        if !self.elements.contains_key(&id) {
            return Err(CoreError::ElementNotFound(id.to_string()));
        }
        if !self.selection.contains(&id) {
            self.selection.push(id);
        }
        Ok(())
    }

    /// Select every element.
    pub fn select_all(&mut self) {
        self.selection = self.order.clone();
    }

    /// Clear the selection.
    pub fn deselect_all(&mut self) {
        self.selection.clear();
    }

    /// Currently selected element IDs in selection order.
    #[must_use]
    pub fn selection(&self) -> &[ElementId] {
        &self.selection
    }

    /// Currently selected elements.
    pub fn selected_elements(&self) -> impl Iterator<Item = &DiagramElement> {
        self.selection.iter().filter_map(|id| self.elements.get(id))
    }

    /// Number of elements in the diagram.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Whether the diagram has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Current mutation revision.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }
}
