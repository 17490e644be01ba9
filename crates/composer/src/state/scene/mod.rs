//! Scene state management
//!
//! This module provides the authoritative scene: a linear history of immutable
//! snapshots plus the editor intents that produce new ones.

mod display;
mod history;
mod object_ops;
mod transform_ops;

pub use display::{object_display_name, shape_icon, short_id};
pub use history::History;
pub use object_ops::ObjectPatch;

use std::sync::Arc;

use shared::{SceneDescription, SceneObject};

/// Scene state backed by the edit history
#[derive(Debug, Default)]
pub struct SceneState {
    pub(crate) history: History,
}

impl SceneState {
    /// Start an editing session from `initial`. Repeated ids get fresh ones.
    pub fn new(mut initial: SceneDescription) -> Self {
        object_ops::remint_duplicate_ids(&mut initial);
        Self {
            history: History::new(initial),
        }
    }

    /// The authoritative, currently displayed scene
    pub fn current(&self) -> &SceneDescription {
        self.history.current()
    }

    /// Shared handle to the current snapshot (for the renderer and snapping)
    pub fn current_shared(&self) -> Arc<SceneDescription> {
        self.history.current_shared()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Current scene version (increments on every commit, undo and redo)
    pub fn version(&self) -> u64 {
        self.history.version()
    }

    /// Get an object by ID
    pub fn get_object(&self, id: &str) -> Option<&SceneObject> {
        self.current().get(id)
    }

    pub fn object_count(&self) -> usize {
        self.current().len()
    }

    /// Commit a complete new snapshot
    pub fn commit(&mut self, snapshot: SceneDescription) {
        self.history.commit(snapshot);
    }

    /// Copy the current snapshot, let `edit` change it and commit the copy.
    ///
    /// Nothing is committed when `edit` returns false.
    pub(crate) fn edit<F>(&mut self, edit: F) -> bool
    where
        F: FnOnce(&mut SceneDescription) -> bool,
    {
        let mut next = self.current().clone();
        if !edit(&mut next) {
            return false;
        }
        self.history.commit(next);
        true
    }

    /// Undo last change
    pub fn undo(&mut self) -> bool {
        self.history.undo()
    }

    /// Redo last undone change
    pub fn redo(&mut self) -> bool {
        self.history.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
}
