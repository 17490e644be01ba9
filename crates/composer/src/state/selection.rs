use shared::{ObjectId, SceneDescription};

/// Object selection state (supports multi-select)
#[derive(Debug, Default)]
pub struct SelectionState {
    /// Selected object IDs (in order of selection)
    selected: Vec<ObjectId>,
}

impl SelectionState {
    /// Primary (first) selected object
    pub fn primary(&self) -> Option<&ObjectId> {
        self.selected.first()
    }

    /// All selected objects
    pub fn all(&self) -> &[ObjectId] {
        &self.selected
    }

    /// Check if an object is selected
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s == id)
    }

    /// Select a single object (clears previous selection)
    pub fn select(&mut self, id: ObjectId) {
        self.selected.clear();
        self.selected.push(id);
    }

    /// Toggle selection (Ctrl+click behavior)
    pub fn toggle(&mut self, id: ObjectId) {
        if let Some(pos) = self.selected.iter().position(|s| s == &id) {
            self.selected.remove(pos);
        } else {
            self.selected.push(id);
        }
    }

    /// Clear all selection
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Number of selected objects
    pub fn count(&self) -> usize {
        self.selected.len()
    }

    /// Drop IDs that no longer exist in `scene`
    pub fn retain_existing(&mut self, scene: &SceneDescription) {
        self.selected.retain(|id| scene.contains(id));
    }
}
