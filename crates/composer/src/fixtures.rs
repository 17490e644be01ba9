//! Factory functions for creating test data.
//!
//! Provides convenient helpers to construct `SceneObject`, `SceneDescription`
//! and stub generators used in tests and by the command interface.

use shared::*;

use crate::state::generation::{GenerationFuture, GenerationResult, SceneGenerator};

// ── Object factories ────────────────────────────────────────────

/// Create an object of any shape at a position with a given scale.
pub fn object_at(id: &str, name: &str, shape: ShapeKind, pos: Vector3, scale: Vector3) -> SceneObject {
    SceneObject {
        id: id.to_string(),
        name: name.to_string(),
        shape,
        transform: Transform::at(pos).with_scale(scale),
        color_hex: MaterialKind::Standard.default_color().to_string(),
        material: MaterialKind::Standard,
        visible: true,
    }
}

/// Create a box at a specific position.
pub fn box_at(id: &str, name: &str, pos: Vector3, scale: Vector3) -> SceneObject {
    object_at(id, name, ShapeKind::Box, pos, scale)
}

/// Create a unit box at the origin.
pub fn unit_box(id: &str) -> SceneObject {
    box_at(id, "Box", [0.0; 3], [1.0; 3])
}

/// Create a hidden unit box.
pub fn hidden_box(id: &str, pos: Vector3) -> SceneObject {
    SceneObject {
        visible: false,
        ..box_at(id, "Hidden", pos, [1.0; 3])
    }
}

/// Create a text object.
pub fn text_object(id: &str, text: &str) -> SceneObject {
    object_at(
        id,
        "Text",
        ShapeKind::Text {
            text: text.to_string(),
        },
        [0.0; 3],
        ShapeKind::Text {
            text: String::new(),
        }
        .default_scale(),
    )
}

// ── SceneDescription factories ──────────────────────────────────

/// Wrap objects into a SceneDescription.
pub fn scene(objects: Vec<SceneObject>) -> SceneDescription {
    SceneDescription::new(objects)
}

/// Empty scene.
pub fn empty_scene() -> SceneDescription {
    SceneDescription::default()
}

/// A thin sheet at the origin and a plank parked away from it.
pub fn scene_sheet_and_plank() -> SceneDescription {
    scene(vec![
        box_at("sheet", "Sheet", [0.0, 0.0, 0.0], [2.0, 2.0, 0.1]),
        box_at("plank", "Plank", [5.0, 5.0, 5.0], [1.0, 0.3, 0.1]),
    ])
}

/// Two unit boxes whose faces touch along X.
pub fn scene_touching_boxes() -> SceneDescription {
    scene(vec![
        box_at("left", "Left", [0.0, 0.0, 0.0], [1.0; 3]),
        box_at("right", "Right", [1.0, 0.0, 0.0], [1.0; 3]),
    ])
}

// ── Generated batches ───────────────────────────────────────────

/// A generated object with sane defaults.
pub fn generated(name: &str, shape: ShapeKind, pos: Vector3, scale: Vector3) -> GeneratedObject {
    GeneratedObject {
        name: name.to_string(),
        shape,
        position: pos,
        rotation: [0.0; 3],
        scale,
        color_hex: "#8b5a2b".to_string(),
    }
}

/// A small table: top plus four legs.
pub fn generated_table() -> Vec<GeneratedObject> {
    let mut objects = vec![generated("Table Top", ShapeKind::Box, [0.0, 0.75, 0.0], [1.2, 0.05, 0.8])];
    for (i, (x, z)) in [(-0.55, -0.35), (0.55, -0.35), (-0.55, 0.35), (0.55, 0.35)]
        .into_iter()
        .enumerate()
    {
        objects.push(generated(
            &format!("Leg {}", i + 1),
            ShapeKind::Cylinder,
            [x, 0.36, z],
            [0.05, 0.72, 0.05],
        ));
    }
    objects
}

/// Generator that always resolves to the same result.
pub struct StubGenerator {
    result: GenerationResult,
}

impl StubGenerator {
    pub fn ok(objects: Vec<GeneratedObject>) -> Self {
        Self {
            result: Ok(GenerateResponse {
                text: String::new(),
                objects,
            }),
        }
    }

    pub fn err(err: crate::state::generation::GenerationError) -> Self {
        Self { result: Err(err) }
    }
}

impl SceneGenerator for StubGenerator {
    fn generate(&self, _request: GenerateRequest) -> GenerationFuture {
        Box::pin(std::future::ready(self.result.clone()))
    }
}

/// Generator whose requests never finish.
pub struct PendingGenerator;

impl SceneGenerator for PendingGenerator {
    fn generate(&self, _request: GenerateRequest) -> GenerationFuture {
        Box::pin(std::future::pending::<GenerationResult>())
    }
}
