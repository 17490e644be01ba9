//! Display helper functions for scene objects

use shared::{SceneObject, ShapeKind};

/// Get display name for an object
pub fn object_display_name(object: &SceneObject) -> String {
    let mut name = format!("{} ({})", object.name, short_id(&object.id));
    if !object.visible {
        name.push_str(" [hidden]");
    }
    name
}

/// Get icon for a shape
pub fn shape_icon(shape: &ShapeKind) -> &'static str {
    match shape {
        ShapeKind::Box => "[B]",
        ShapeKind::Sphere => "[S]",
        ShapeKind::Cylinder => "[Y]",
        ShapeKind::Torus => "[O]",
        ShapeKind::Plane => "[_]",
        ShapeKind::Icosahedron => "[I]",
        ShapeKind::Heart => "[H]",
        ShapeKind::Text { .. } => "[T]",
    }
}

/// Get shortened ID (first 8 characters)
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_marks_hidden() {
        let object = SceneObject {
            id: "0123456789abcdef".to_string(),
            name: "Lamp".to_string(),
            shape: ShapeKind::Sphere,
            transform: shared::Transform::new(),
            color_hex: "#ffffff".to_string(),
            material: shared::MaterialKind::Standard,
            visible: false,
        };
        assert_eq!(object_display_name(&object), "Lamp (01234567) [hidden]");
        assert_eq!(shape_icon(&object.shape), "[S]");
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("1234567890"), "12345678");
        assert_eq!(short_id("abc"), "abc");
    }
}
