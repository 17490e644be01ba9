//! JSON command protocol for scripted/agent control of the editor.

use serde::{Deserialize, Serialize};
use shared::{MaterialKind, SceneDescription, SceneObject, ShapeKind, Transform, Vector3};

use crate::harness::TestHarness;
use crate::state::scene::{object_display_name, shape_icon, ObjectPatch};
use crate::state::settings::{SnapOrder, Units};
use crate::viewport::gizmo::GizmoMode;

/// A command the agent can execute.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum AgentCommand {
    /// Add a new object with default placement
    AddObject {
        shape: ShapeKind,
        #[serde(default)]
        material: MaterialKind,
    },
    /// Insert a fully specified object
    InsertObject { object: SceneObject },
    /// Delete an object by ID
    DeleteObject { id: String },
    /// Duplicate an object
    DuplicateObject { id: String },
    /// Partially update an object
    UpdateObject {
        id: String,
        #[serde(flatten)]
        patch: ObjectPatch,
    },
    /// Show or hide an object
    SetVisibility { id: String, visible: bool },
    /// Undo the last operation.
    Undo,
    /// Redo the last undone operation.
    Redo,
    /// Clear the entire scene.
    Clear,
    /// Select objects by IDs.
    Select { ids: Vec<String> },
    /// Clear selection.
    ClearSelection,
    /// Press on an object's gizmo handle.
    DragStart { id: String },
    /// One frame of handle movement.
    DragMove {
        position: Vector3,
        #[serde(default)]
        rotation: Option<Vector3>,
        #[serde(default)]
        scale: Option<Vector3>,
    },
    /// Release the handle (commits once).
    DragEnd,
    /// Abandon the drag.
    DragCancel,
    /// Switch the gizmo between translate, rotate and scale.
    SetGizmoMode { mode: GizmoMode },
    /// Change display units.
    SetUnits { units: Units },
    /// Configure snapping.
    SetSnap {
        #[serde(default)]
        enabled: Option<bool>,
        #[serde(default)]
        threshold: Option<f64>,
        #[serde(default)]
        order: Option<SnapOrder>,
    },
    /// Inspect the scene: list all objects.
    Inspect,
    /// Dimension labels of visible objects in display units.
    Dimensions,
    /// History cursor and length.
    History,
    /// Export the scene as JSON.
    ExportScene,
    /// Replace the scene.
    LoadScene { scene: SceneDescription },
    /// Ask the generation service for objects and wait for the result.
    Generate { prompt: String },
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }
}

/// Execute a single command on the harness.
pub fn execute_command(harness: &mut TestHarness, cmd: AgentCommand) -> CommandResponse {
    match cmd {
        AgentCommand::AddObject { shape, material } => {
            let id = harness.state.add_object(shape, material);
            CommandResponse::ok_with_data(serde_json::json!({ "id": id }))
        }

        AgentCommand::InsertObject { object } => {
            let id = object.id.clone();
            if harness.state.scene.insert_object(object) {
                CommandResponse::ok_with_data(serde_json::json!({ "id": id }))
            } else {
                CommandResponse::err(format!("object id '{id}' already exists"))
            }
        }

        AgentCommand::DeleteObject { id } => {
            let removed = harness.delete(&id);
            CommandResponse::ok_with_data(serde_json::json!({ "removed": removed }))
        }

        AgentCommand::DuplicateObject { id } => match harness.duplicate(&id) {
            Some(copy) => CommandResponse::ok_with_data(serde_json::json!({ "id": copy })),
            None => CommandResponse::err(format!("unknown object '{id}'")),
        },

        AgentCommand::UpdateObject { id, patch } => {
            let updated = harness.update(&id, patch);
            CommandResponse::ok_with_data(serde_json::json!({ "updated": updated }))
        }

        AgentCommand::SetVisibility { id, visible } => {
            let changed = harness.state.set_visibility(&id, visible);
            CommandResponse::ok_with_data(serde_json::json!({ "changed": changed }))
        }

        AgentCommand::Undo => {
            let success = harness.undo();
            CommandResponse::ok_with_data(serde_json::json!({ "undone": success }))
        }

        AgentCommand::Redo => {
            let success = harness.redo();
            CommandResponse::ok_with_data(serde_json::json!({ "redone": success }))
        }

        AgentCommand::Clear => {
            harness.clear();
            CommandResponse::ok()
        }

        AgentCommand::Select { ids } => {
            harness.state.selection.clear();
            for id in &ids {
                // Use toggle to add to selection without clearing
                harness.state.selection.toggle(id.clone());
            }
            CommandResponse::ok_with_data(serde_json::json!({ "selected": ids }))
        }

        AgentCommand::ClearSelection => {
            harness.state.selection.clear();
            CommandResponse::ok()
        }

        AgentCommand::DragStart { id } => {
            if harness.drag_start(&id) {
                CommandResponse::ok()
            } else {
                CommandResponse::err(format!("cannot start drag on '{id}'"))
            }
        }

        AgentCommand::DragMove {
            position,
            rotation,
            scale,
        } => {
            let Some(active) = harness.state.gizmo.active() else {
                return CommandResponse::err("no drag in progress");
            };
            let live = Transform {
                position,
                rotation: rotation.unwrap_or(active.live.rotation),
                scale: scale.unwrap_or(active.live.scale),
            };
            match harness.drag_transform(live) {
                Some(shown) => {
                    let snapped = harness
                        .state
                        .gizmo
                        .active()
                        .and_then(|d| d.last_snap.as_ref())
                        .map(|s| s.is_snapped())
                        .unwrap_or(false);
                    CommandResponse::ok_with_data(serde_json::json!({
                        "position": shown.position,
                        "snapped": snapped,
                    }))
                }
                None => CommandResponse::err("no drag in progress"),
            }
        }

        AgentCommand::DragEnd => {
            let committed = harness.drag_end();
            CommandResponse::ok_with_data(serde_json::json!({ "committed": committed }))
        }

        AgentCommand::DragCancel => {
            let cancelled = harness.drag_cancel();
            CommandResponse::ok_with_data(serde_json::json!({ "cancelled": cancelled }))
        }

        AgentCommand::SetGizmoMode { mode } => {
            if harness.state.gizmo.is_dragging() {
                return CommandResponse::err("cannot change gizmo mode during a drag");
            }
            harness.state.gizmo.mode = mode;
            CommandResponse::ok()
        }

        AgentCommand::SetUnits { units } => {
            harness.set_units(units);
            CommandResponse::ok()
        }

        AgentCommand::SetSnap {
            enabled,
            threshold,
            order,
        } => {
            let snap = &mut harness.state.settings.snap;
            if let Some(threshold) = threshold {
                if !(threshold.is_finite() && threshold >= 0.0) {
                    return CommandResponse::err(format!("invalid snap threshold {threshold}"));
                }
                snap.threshold = threshold;
            }
            if let Some(enabled) = enabled {
                snap.enabled = enabled;
            }
            if let Some(order) = order {
                snap.order = order;
            }
            CommandResponse::ok()
        }

        AgentCommand::Inspect => {
            let objects: Vec<serde_json::Value> = harness
                .scene()
                .objects
                .iter()
                .map(|object| {
                    serde_json::json!({
                        "id": object.id,
                        "name": object.name,
                        "display_name": object_display_name(object),
                        "icon": shape_icon(&object.shape),
                        "shape": object.shape.label(),
                        "visible": object.visible,
                        "position": object.transform.position,
                    })
                })
                .collect();
            CommandResponse::ok_with_data(serde_json::json!({
                "object_count": objects.len(),
                "objects": objects,
                "selected": harness.state.selection.all(),
            }))
        }

        AgentCommand::Dimensions => {
            let labels: Vec<serde_json::Value> = harness
                .dimensions()
                .into_iter()
                .map(|l| {
                    serde_json::json!({
                        "id": l.object_id,
                        "axis": l.axis,
                        "text": l.text,
                    })
                })
                .collect();
            CommandResponse::ok_with_data(serde_json::json!({ "labels": labels }))
        }

        AgentCommand::History => {
            let history = harness.state.scene.history();
            CommandResponse::ok_with_data(serde_json::json!({
                "length": history.len(),
                "cursor": history.cursor(),
                "can_undo": history.can_undo(),
                "can_redo": history.can_redo(),
            }))
        }

        AgentCommand::ExportScene => {
            let json = harness.export_scene_json();
            CommandResponse::ok_with_data(serde_json::json!({ "scene_json": json }))
        }

        AgentCommand::LoadScene { scene } => {
            if harness.load_scene(scene) {
                CommandResponse::ok()
            } else {
                CommandResponse::err("scene rejected: duplicate object ids")
            }
        }

        AgentCommand::Generate { prompt } => {
            let added = harness.generate(&prompt);
            if harness.state.generation.is_loading() {
                return CommandResponse::err(format!(
                    "generation still pending after {:?}; results will be committed on a later poll",
                    harness.generation_wait
                ));
            }
            let failed = harness
                .state
                .generation
                .messages
                .last()
                .is_some_and(|m| m.is_error);
            if failed {
                let msg = harness
                    .state
                    .generation
                    .messages
                    .last()
                    .map(|m| m.text.clone())
                    .unwrap_or_default();
                CommandResponse::err(msg)
            } else {
                CommandResponse::ok_with_data(serde_json::json!({ "added": added }))
            }
        }
    }
}

/// Parse and execute a single JSON command string.
pub fn execute_json(harness: &mut TestHarness, json: &str) -> Result<CommandResponse, String> {
    let cmd: AgentCommand =
        serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(harness, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch(
    harness: &mut TestHarness,
    json: &str,
) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<AgentCommand> =
        serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    Ok(cmds
        .into_iter()
        .map(|cmd| execute_command(harness, cmd))
        .collect())
}
