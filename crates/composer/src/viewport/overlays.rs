//! Viewport overlay data (dimension labels).
//!
//! Only produces what to draw; placing text on screen is up to the renderer.

use shared::{Axis, ObjectId, SceneDescription};

use crate::state::settings::{DimensionSettings, Units};

/// One dimension label for one axis of one object
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionLabel {
    pub object_id: ObjectId,
    pub axis: Axis,
    /// Size along the axis in meters
    pub meters: f64,
    /// Formatted value in display units
    pub text: String,
}

/// Width/height/depth labels for every visible object
pub fn dimension_labels(
    scene: &SceneDescription,
    units: Units,
    settings: &DimensionSettings,
) -> Vec<DimensionLabel> {
    if !settings.visible {
        return Vec::new();
    }

    scene
        .visible()
        .flat_map(|object| {
            let extents = object.extents();
            Axis::ALL.into_iter().map(move |axis| {
                let meters = extents[axis.index()];
                DimensionLabel {
                    object_id: object.id.clone(),
                    axis,
                    meters,
                    text: settings.format_length(meters, units),
                }
            })
        })
        .collect()
}
