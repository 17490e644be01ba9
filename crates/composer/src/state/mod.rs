pub mod generation;
pub mod scene;
pub mod selection;
pub mod settings;

use std::sync::Arc;

use shared::{MaterialKind, ObjectId, SceneDescription, ShapeKind, Transform};

use crate::viewport::gizmo::GizmoState;
use generation::{GenerationState, HttpGenerator, SceneGenerator};
pub use scene::{ObjectPatch, SceneState};
use selection::SelectionState;
pub use settings::{AppSettings, DimensionSettings, SnapOrder, SnapSettings, Units};

/// Combined application state.
///
/// Routes editor intents to the scene history and keeps the drag gizmo and
/// selection consistent with whatever snapshot is current.
pub struct AppState {
    pub scene: SceneState,
    pub selection: SelectionState,
    pub gizmo: GizmoState,
    pub generation: GenerationState,
    pub settings: AppSettings,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppSettings::load())
    }
}

impl AppState {
    /// State with the HTTP generator pointed at `settings.server_url`
    pub fn new(settings: AppSettings) -> Self {
        let generator = Arc::new(HttpGenerator::new(&settings.server_url));
        Self::with_generator(settings, generator)
    }

    pub fn with_generator(settings: AppSettings, generator: Arc<dyn SceneGenerator>) -> Self {
        Self {
            scene: SceneState::default(),
            selection: SelectionState::default(),
            gizmo: GizmoState::default(),
            generation: GenerationState::new(generator),
            settings,
        }
    }

    // ── Intents ───────────────────────────────────────────────

    /// Add a new object and select it
    pub fn add_object(&mut self, shape: ShapeKind, material: MaterialKind) -> ObjectId {
        let id = self.scene.add_object(shape, material);
        self.selection.select(id.clone());
        id
    }

    pub fn delete_object(&mut self, id: &str) -> bool {
        let removed = self.scene.delete_object(id);
        if removed {
            self.after_scene_change();
        }
        removed
    }

    /// Duplicate an object and select the copy
    pub fn duplicate_object(&mut self, id: &str) -> Option<ObjectId> {
        let copy = self.scene.duplicate_object(id)?;
        self.selection.select(copy.clone());
        Some(copy)
    }

    pub fn update_object(&mut self, id: &str, patch: &ObjectPatch) -> bool {
        self.scene.update_object(id, patch)
    }

    pub fn set_visibility(&mut self, id: &str, visible: bool) -> bool {
        self.scene.set_visibility(id, visible)
    }

    pub fn undo(&mut self) -> bool {
        let moved = self.scene.undo();
        if moved {
            self.after_scene_change();
        }
        moved
    }

    pub fn redo(&mut self) -> bool {
        let moved = self.scene.redo();
        if moved {
            self.after_scene_change();
        }
        moved
    }

    /// Clear the scene (undoable)
    pub fn clear(&mut self) {
        self.gizmo.cancel_drag();
        self.scene.clear();
        self.selection.clear();
    }

    /// Replace the scene with loaded data (undoable). Returns false if the
    /// scene was rejected.
    pub fn load_scene(&mut self, scene: SceneDescription) -> bool {
        if !self.scene.set_scene(scene) {
            return false;
        }
        self.gizmo.cancel_drag();
        self.selection.clear();
        true
    }

    /// Commit finished generation requests
    pub fn poll_generation(&mut self) -> Option<Vec<ObjectId>> {
        let added = self.generation.poll_results(&mut self.scene)?;
        self.after_scene_change();
        Some(added)
    }

    /// Start a generation request from the chat input
    pub fn send_prompt(&mut self) -> bool {
        self.generation.send_message(self.scene.current())
    }

    // ── Drag (transform sync) ─────────────────────────────────

    /// Press on an object's handle
    pub fn begin_drag(&mut self, id: &str) -> bool {
        match self.scene.get_object(id) {
            Some(object) => self.gizmo.begin_drag(object),
            None => {
                tracing::warn!(%id, "drag start ignored: unknown object");
                false
            }
        }
    }

    /// One frame of handle movement. Returns the transform to display.
    pub fn drag_to(&mut self, live: Transform) -> Option<Transform> {
        self.gizmo
            .drag_change(live, self.scene.current(), &self.settings.snap)
            .cloned()
    }

    /// Release the handle and commit its final transform once
    pub fn end_drag(&mut self) -> bool {
        let Some(commit) = self.gizmo.end_drag() else {
            return false;
        };
        self.scene.set_transform(&commit.object_id, commit.transform)
    }

    /// Abandon the current drag without committing
    pub fn cancel_drag(&mut self) -> bool {
        self.gizmo.cancel_drag()
    }

    /// Transform the renderer should use for `id` right now
    pub fn displayed_transform(&self, id: &str) -> Option<Transform> {
        let object = self.scene.get_object(id)?;
        Some(self.gizmo.displayed_transform(object).clone())
    }

    /// Drop stale selection and cancel a drag whose object disappeared
    fn after_scene_change(&mut self) {
        let current = self.scene.current();
        let stale_drag = self
            .gizmo
            .drag_object_id()
            .is_some_and(|id| !current.contains(id));
        if stale_drag {
            self.gizmo.cancel_drag();
        }
        self.selection.retain_existing(current);
    }
}
