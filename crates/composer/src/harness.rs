//! Headless test harness for programmatic scene manipulation.
//!
//! Drives the same `AppState` the editor uses, without a window or renderer.

use std::sync::Arc;
use std::time::Duration;

use shared::{MaterialKind, ObjectId, SceneDescription, SceneObject, ShapeKind, Transform, Vector3};

use crate::state::generation::SceneGenerator;
use crate::state::scene::{ObjectPatch, SceneState};
use crate::state::settings::{AppSettings, Units};
use crate::state::AppState;
use crate::viewport::overlays::{dimension_labels, DimensionLabel};

const GENERATION_WAIT: Duration = Duration::from_secs(10);

/// Headless test harness. Owns the full editor state
pub struct TestHarness {
    pub state: AppState,
    /// How long `generate` blocks before giving up on the request
    pub generation_wait: Duration,
}

impl TestHarness {
    /// Create a new empty harness with default settings (nothing read from disk).
    pub fn new() -> Self {
        Self::with_settings(AppSettings::default())
    }

    pub fn with_settings(settings: AppSettings) -> Self {
        Self {
            state: AppState::new(settings),
            generation_wait: GENERATION_WAIT,
        }
    }

    /// Harness whose AI generation is served by `generator`
    pub fn with_generator(generator: Arc<dyn SceneGenerator>) -> Self {
        Self {
            state: AppState::with_generator(AppSettings::default(), generator),
            generation_wait: GENERATION_WAIT,
        }
    }

    /// Start a fresh session whose initial snapshot is `scene`
    pub fn with_scene(scene: SceneDescription) -> Self {
        let mut h = Self::new();
        h.state.scene = SceneState::new(scene);
        h
    }

    // ── Scene manipulation ────────────────────────────────────

    /// Add an object of `shape` with the standard material and return its ID
    pub fn add(&mut self, shape: ShapeKind) -> ObjectId {
        self.state.add_object(shape, MaterialKind::Standard)
    }

    /// Create a box with an explicit placement and return its ID
    pub fn create_box(&mut self, name: &str, pos: Vector3, scale: Vector3) -> ObjectId {
        let id = uuid::Uuid::new_v4().to_string();
        self.state.scene.insert_object(SceneObject {
            id: id.clone(),
            name: name.to_string(),
            shape: ShapeKind::Box,
            transform: Transform::at(pos).with_scale(scale),
            color_hex: MaterialKind::Standard.default_color().to_string(),
            material: MaterialKind::Standard,
            visible: true,
        });
        id
    }

    pub fn delete(&mut self, id: &str) -> bool {
        self.state.delete_object(id)
    }

    pub fn duplicate(&mut self, id: &str) -> Option<ObjectId> {
        self.state.duplicate_object(id)
    }

    pub fn update(&mut self, id: &str, patch: ObjectPatch) -> bool {
        self.state.update_object(id, &patch)
    }

    pub fn rename(&mut self, id: &str, name: &str) -> bool {
        self.state.scene.rename_object(id, name.to_string())
    }

    /// Hide an object
    pub fn hide(&mut self, id: &str) -> bool {
        self.state.set_visibility(id, false)
    }

    /// Show an object
    pub fn show(&mut self, id: &str) -> bool {
        self.state.set_visibility(id, true)
    }

    /// Undo the last operation
    pub fn undo(&mut self) -> bool {
        self.state.undo()
    }

    /// Redo the last undone operation
    pub fn redo(&mut self) -> bool {
        self.state.redo()
    }

    /// Clear the entire scene
    pub fn clear(&mut self) {
        self.state.clear();
    }

    /// Load a scene (replaces current, undoable)
    pub fn load_scene(&mut self, scene: SceneDescription) -> bool {
        self.state.load_scene(scene)
    }

    /// Load a scene from JSON string
    pub fn load_scene_json(&mut self, json: &str) -> Result<(), String> {
        let scene: SceneDescription =
            serde_json::from_str(json).map_err(|e| format!("JSON parse error: {e}"))?;
        if !self.load_scene(scene) {
            return Err("Scene rejected: duplicate object ids".to_string());
        }
        Ok(())
    }

    /// Export the current scene as JSON
    pub fn export_scene_json(&self) -> String {
        serde_json::to_string_pretty(self.scene()).unwrap_or_default()
    }

    // ── Dragging ──────────────────────────────────────────────

    pub fn drag_start(&mut self, id: &str) -> bool {
        self.state.begin_drag(id)
    }

    /// Move the live handle to `pos`, keeping its rotation and scale.
    /// Returns the displayed position after snapping.
    pub fn drag_move(&mut self, pos: Vector3) -> Option<Vector3> {
        let mut live = self.state.gizmo.active()?.live.clone();
        live.position = pos;
        self.state.drag_to(live).map(|t| t.position)
    }

    /// Replace the whole live transform for one frame
    pub fn drag_transform(&mut self, live: Transform) -> Option<Transform> {
        self.state.drag_to(live)
    }

    pub fn drag_end(&mut self) -> bool {
        self.state.end_drag()
    }

    pub fn drag_cancel(&mut self) -> bool {
        self.state.cancel_drag()
    }

    /// Full gesture: press, one frame per position, release
    pub fn drag(&mut self, id: &str, path: &[Vector3]) -> bool {
        if !self.drag_start(id) {
            return false;
        }
        for pos in path {
            self.drag_move(*pos);
        }
        self.drag_end()
    }

    // ── Settings ──────────────────────────────────────────────

    pub fn set_snap_enabled(&mut self, enabled: bool) {
        self.state.settings.snap.enabled = enabled;
    }

    pub fn set_units(&mut self, units: Units) {
        self.state.settings.units = units;
    }

    // ── Generation ────────────────────────────────────────────

    /// Send a prompt and wait for it to be committed (or rejected).
    /// The request may still be in flight when this returns; check
    /// `state.generation.is_loading()`.
    pub fn generate(&mut self, prompt: &str) -> Vec<ObjectId> {
        self.state
            .generation
            .send_prompt(prompt.to_string(), self.state.scene.current());
        self.state
            .generation
            .wait_for_results(&mut self.state.scene, self.generation_wait)
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn scene(&self) -> &SceneDescription {
        self.state.scene.current()
    }

    pub fn object(&self, id: &str) -> Option<&SceneObject> {
        self.state.scene.get_object(id)
    }

    pub fn position_of(&self, id: &str) -> Option<Vector3> {
        self.object(id).map(|o| o.transform.position)
    }

    /// Number of objects in the current snapshot
    pub fn object_count(&self) -> usize {
        self.scene().len()
    }

    /// Number of visible objects
    pub fn visible_object_count(&self) -> usize {
        self.scene().visible().count()
    }

    /// Number of snapshots in history
    pub fn history_len(&self) -> usize {
        self.state.scene.history().len()
    }

    pub fn dimensions(&self) -> Vec<DimensionLabel> {
        dimension_labels(
            self.scene(),
            self.state.settings.units,
            &self.state.settings.dimensions,
        )
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_harness_empty() {
        let h = TestHarness::new();
        assert_eq!(h.object_count(), 0);
        assert_eq!(h.history_len(), 1);
    }

    #[test]
    fn test_add_selects() {
        let mut h = TestHarness::new();
        let id = h.add(ShapeKind::Torus);
        assert_eq!(h.state.selection.primary(), Some(&id));
    }

    #[test]
    fn test_undo_redo_cycle() {
        let mut h = TestHarness::new();
        h.create_box("Box", [0.0; 3], [1.0; 3]);
        assert_eq!(h.object_count(), 1);
        assert!(h.undo());
        assert_eq!(h.object_count(), 0);
        assert!(h.redo());
        assert_eq!(h.object_count(), 1);
    }

    #[test]
    fn test_load_export_json() {
        let mut h = TestHarness::new();
        h.create_box("Box", [1.0, 0.0, 0.0], [1.0; 3]);
        let json = h.export_scene_json();

        let mut h2 = TestHarness::new();
        h2.load_scene_json(&json).unwrap();
        assert_eq!(h2.object_count(), 1);
        assert_eq!(h2.scene(), h.scene());
    }

    #[test]
    fn test_load_scene_json_rejects_duplicate_ids() {
        let mut h = TestHarness::new();
        h.create_box("Keep", [0.0; 3], [1.0; 3]);
        let before = h.history_len();

        let json = r##"{"objects": [
            {"id": "x", "name": "One", "shape": {"type": "box"},
             "transform": {"position": [0, 0, 0], "rotation": [0, 0, 0], "scale": [1, 1, 1]},
             "color_hex": "#ffffff"},
            {"id": "x", "name": "Two", "shape": {"type": "sphere"},
             "transform": {"position": [2, 0, 0], "rotation": [0, 0, 0], "scale": [1, 1, 1]},
             "color_hex": "#ffffff"}
        ]}"##;
        let err = h.load_scene_json(json).unwrap_err();
        assert!(err.contains("duplicate"));
        assert_eq!(h.history_len(), before);
        assert_eq!(h.object_count(), 1);
    }

    #[test]
    fn test_drag_gesture_commits_once() {
        let mut h = TestHarness::new();
        let id = h.create_box("Box", [0.0; 3], [1.0; 3]);
        let before = h.history_len();
        assert!(h.drag(&id, &[[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [3.0, 1.0, 0.0]]));
        assert_eq!(h.history_len(), before + 1);
        assert_eq!(h.position_of(&id), Some([3.0, 1.0, 0.0]));
    }

    #[test]
    fn test_hide_show() {
        let mut h = TestHarness::new();
        let id = h.create_box("Box", [0.0; 3], [1.0; 3]);
        assert!(h.hide(&id));
        assert_eq!(h.visible_object_count(), 0);
        assert!(h.dimensions().is_empty());
        assert!(h.show(&id));
        assert_eq!(h.dimensions().len(), 3);
    }
}
