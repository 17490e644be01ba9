//! Object CRUD operations

use serde::{Deserialize, Serialize};
use shared::{
    normalize_hex_color, GeneratedObject, MaterialKind, ObjectId, SceneDescription, SceneObject,
    ShapeKind, Transform, Vector3,
};

use super::SceneState;

/// Offset applied to a duplicated object so it does not overlap its source
pub const DUPLICATE_OFFSET: Vector3 = [0.5, 0.0, 0.5];

/// Partial update of an object. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<ShapeKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vector3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Vector3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Vector3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_hex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<MaterialKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
}

impl ObjectPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply to `object`. Returns `Err` for an invalid colour, otherwise
    /// whether anything actually changed.
    fn apply(&self, object: &mut SceneObject) -> Result<bool, String> {
        let color = match &self.color_hex {
            Some(c) => Some(normalize_hex_color(c).ok_or_else(|| format!("invalid color '{c}'"))?),
            None => None,
        };

        let before = object.clone();
        if let Some(name) = &self.name {
            object.name = name.clone();
        }
        if let Some(shape) = &self.shape {
            object.shape = shape.clone();
        }
        if let Some(position) = self.position {
            object.transform.position = position;
        }
        if let Some(rotation) = self.rotation {
            object.transform.rotation = rotation;
        }
        if let Some(scale) = self.scale {
            object.transform.scale = scale;
        }
        if let Some(color) = color {
            object.color_hex = color;
        }
        if let Some(material) = self.material {
            object.material = material;
        }
        if let Some(visible) = self.visible {
            object.visible = visible;
        }
        Ok(*object != before)
    }
}

fn new_object_id() -> ObjectId {
    uuid::Uuid::new_v4().to_string()
}

/// "<Label> <n>" where n is one more than the number of same-label objects
fn default_name(scene: &SceneDescription, shape: &ShapeKind) -> String {
    let count = scene
        .objects
        .iter()
        .filter(|o| o.shape.label() == shape.label())
        .count();
    format!("{} {}", shape.label(), count + 1)
}

impl SceneState {
    /// Add a new object with defaults for its shape and material
    pub fn add_object(&mut self, shape: ShapeKind, material: MaterialKind) -> ObjectId {
        let id = new_object_id();
        let object = SceneObject {
            id: id.clone(),
            name: default_name(self.current(), &shape),
            transform: Transform::new().with_scale(shape.default_scale()),
            shape,
            color_hex: material.default_color().to_string(),
            material,
            visible: true,
        };

        self.edit(|scene| {
            scene.objects.push(object);
            true
        });
        tracing::debug!(%id, "object added");
        id
    }

    /// Insert a fully built object. Rejected when the id is already taken.
    pub fn insert_object(&mut self, object: SceneObject) -> bool {
        if self.current().contains(&object.id) {
            tracing::warn!(id = %object.id, "insert rejected: duplicate id");
            return false;
        }
        self.edit(|scene| {
            scene.objects.push(object);
            true
        })
    }

    /// Remove an object by ID
    pub fn delete_object(&mut self, id: &str) -> bool {
        if !self.current().contains(id) {
            tracing::warn!(%id, "delete ignored: unknown object");
            return false;
        }
        self.edit(|scene| {
            scene.objects.retain(|o| o.id != id);
            true
        })
    }

    /// Clone an object next to the original. Returns the new ID.
    pub fn duplicate_object(&mut self, id: &str) -> Option<ObjectId> {
        let index = self.current().position_of(id)?;
        let mut copy = self.current().objects[index].clone();
        copy.id = new_object_id();
        copy.name = format!("{} copy", copy.name);
        for (p, offset) in copy.transform.position.iter_mut().zip(DUPLICATE_OFFSET) {
            *p += offset;
        }

        let new_id = copy.id.clone();
        self.edit(|scene| {
            scene.objects.insert(index + 1, copy);
            true
        });
        Some(new_id)
    }

    /// Apply a partial update. Unknown IDs, invalid colours and patches that
    /// change nothing leave history untouched.
    pub fn update_object(&mut self, id: &str, patch: &ObjectPatch) -> bool {
        self.edit(|scene| {
            let Some(object) = scene.get_mut(id) else {
                tracing::warn!(%id, "update ignored: unknown object");
                return false;
            };
            match patch.apply(object) {
                Ok(changed) => changed,
                Err(e) => {
                    tracing::warn!(%id, "update ignored: {e}");
                    false
                }
            }
        })
    }

    /// Rename an object
    pub fn rename_object(&mut self, id: &str, name: String) -> bool {
        self.update_object(
            id,
            &ObjectPatch {
                name: Some(name),
                ..Default::default()
            },
        )
    }

    /// Set object visibility
    pub fn set_visibility(&mut self, id: &str, visible: bool) -> bool {
        self.update_object(
            id,
            &ObjectPatch {
                visible: Some(visible),
                ..Default::default()
            },
        )
    }

    /// Append a generated batch as one commit. Returns the new IDs.
    pub fn apply_generated(&mut self, batch: Vec<GeneratedObject>) -> Vec<ObjectId> {
        if batch.is_empty() {
            return Vec::new();
        }

        let objects: Vec<SceneObject> = batch
            .into_iter()
            .map(|g| SceneObject {
                id: new_object_id(),
                name: g.name,
                shape: g.shape,
                transform: Transform {
                    position: g.position,
                    rotation: g.rotation,
                    scale: g.scale,
                },
                color_hex: normalize_hex_color(&g.color_hex).unwrap_or(g.color_hex),
                material: MaterialKind::Standard,
                visible: true,
            })
            .collect();
        let ids: Vec<ObjectId> = objects.iter().map(|o| o.id.clone()).collect();

        self.edit(|scene| {
            scene.objects.extend(objects);
            true
        });
        tracing::info!(count = ids.len(), "generated objects committed");
        ids
    }

    /// Clear the scene
    pub fn clear(&mut self) {
        self.commit(SceneDescription::default());
    }

    /// Replace the whole scene (e.g. loaded data) as one undoable step.
    ///
    /// A scene that repeats an object id is rejected without a commit.
    pub fn set_scene(&mut self, scene: SceneDescription) -> bool {
        if !scene.has_unique_ids() {
            tracing::warn!(objects = scene.len(), "scene load rejected: duplicate object ids");
            return false;
        }
        self.commit(scene);
        true
    }
}

/// Give every repeated id after its first occurrence a fresh one
pub(super) fn remint_duplicate_ids(scene: &mut SceneDescription) {
    let mut seen = std::collections::HashSet::with_capacity(scene.objects.len());
    for object in &mut scene.objects {
        if !seen.insert(object.id.clone()) {
            let fresh = new_object_id();
            tracing::warn!(old = %object.id, new = %fresh, "duplicate object id re-minted");
            object.id = fresh.clone();
            seen.insert(fresh);
        }
    }
}
