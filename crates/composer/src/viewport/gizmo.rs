//! Transform gizmo drag state.
//!
//! While a drag is active the live handle transform is the single source of
//! truth for the dragged object's displayed transform. The committed scene is
//! not touched until the drag ends, which yields exactly one [`DragCommit`].

use serde::{Deserialize, Serialize};
use shared::{ObjectId, SceneDescription, SceneObject, Transform};

use super::snap::{try_snap, SnapResult};
use crate::state::settings::SnapSettings;

/// Which kind of manipulation the gizmo performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GizmoMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

/// Live, uncommitted handle state of one drag gesture
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveDrag {
    /// ID of the object being manipulated
    pub object_id: ObjectId,
    /// Committed transform when the drag started
    pub start: Transform,
    /// Current handle transform (provisional)
    pub live: Transform,
    /// Number of change events received
    pub frames: u32,
    /// Snap outcome of the most recent frame
    pub last_snap: Option<SnapResult>,
}

/// Final transform of a completed drag, ready to be committed
#[derive(Debug, Clone, PartialEq)]
pub struct DragCommit {
    pub object_id: ObjectId,
    pub transform: Transform,
}

/// State of the transform gizmo
#[derive(Debug, Default)]
pub struct GizmoState {
    pub mode: GizmoMode,
    drag: Option<ActiveDrag>,
}

impl GizmoState {
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn active(&self) -> Option<&ActiveDrag> {
        self.drag.as_ref()
    }

    /// ID of the object being moved
    pub fn drag_object_id(&self) -> Option<&str> {
        self.drag.as_ref().map(|d| d.object_id.as_str())
    }

    /// Press on the handle of `object`. Returns false if a drag is already active.
    pub fn begin_drag(&mut self, object: &SceneObject) -> bool {
        if let Some(active) = &self.drag {
            tracing::warn!(
                active = %active.object_id,
                requested = %object.id,
                "drag start ignored: another drag is active"
            );
            return false;
        }
        tracing::debug!(id = %object.id, mode = ?self.mode, "drag started");
        self.drag = Some(ActiveDrag {
            object_id: object.id.clone(),
            start: object.transform.clone(),
            live: object.transform.clone(),
            frames: 0,
            last_snap: None,
        });
        true
    }

    /// One frame of handle movement.
    ///
    /// Stores `live` as the provisional transform. In translate mode with
    /// snapping enabled the live position is corrected against the committed
    /// `candidates`. Returns the transform to display, or `None` when idle.
    pub fn drag_change(
        &mut self,
        live: Transform,
        candidates: &SceneDescription,
        snap: &SnapSettings,
    ) -> Option<&Transform> {
        let mode = self.mode;
        let drag = self.drag.as_mut()?;
        drag.live = live;
        drag.frames += 1;
        drag.last_snap = None;

        if mode == GizmoMode::Translate && snap.enabled {
            let result = try_snap(
                &drag.object_id,
                drag.live.position,
                drag.live.scale,
                &candidates.objects,
                snap,
            );
            drag.live.position = result.position;
            drag.last_snap = Some(result);
        }
        Some(&drag.live)
    }

    /// Release the handle: hand back the final transform and return to idle
    pub fn end_drag(&mut self) -> Option<DragCommit> {
        let drag = self.drag.take()?;
        tracing::debug!(id = %drag.object_id, frames = drag.frames, "drag finished");
        Some(DragCommit {
            object_id: drag.object_id,
            transform: drag.live,
        })
    }

    /// Abandon the drag without committing anything
    pub fn cancel_drag(&mut self) -> bool {
        match self.drag.take() {
            Some(drag) => {
                tracing::debug!(id = %drag.object_id, "drag cancelled");
                true
            }
            None => false,
        }
    }

    /// Transform to render for `object`: the live handle while it is being
    /// dragged, its committed transform otherwise
    pub fn displayed_transform<'a>(&'a self, object: &'a SceneObject) -> &'a Transform {
        match &self.drag {
            Some(drag) if drag.object_id == object.id => &drag.live,
            _ => &object.transform,
        }
    }
}
