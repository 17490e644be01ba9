//! Face-to-face snapping for translate drags.
//!
//! Every object is treated as an axis-aligned box whose size along each axis is
//! its scale (the rendered geometry is unit sized). While an object is dragged,
//! each axis of its proposed position is locked independently when it comes
//! within the threshold of a neighbour's face, so boxes can be butted flush
//! while still sliding freely along the other axes.

use glam::DVec3;
use shared::{Axis, ObjectId, SceneObject, Vector3};

use crate::state::settings::{SnapOrder, SnapSettings};

/// Default capture distance in meters
pub const SNAP_THRESHOLD: f64 = 0.25;

/// One axis locked to a neighbour's face
#[derive(Debug, Clone, PartialEq)]
pub struct AxisSnap {
    pub axis: Axis,
    /// Object whose face was matched
    pub target_id: ObjectId,
    /// Coordinate the axis was locked to
    pub value: f64,
}

/// Adjusted position plus the axes that were snapped
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    pub position: Vector3,
    pub snapped: Vec<AxisSnap>,
}

impl SnapResult {
    fn unchanged(position: Vector3) -> Self {
        Self {
            position,
            snapped: Vec::new(),
        }
    }

    pub fn is_snapped(&self) -> bool {
        !self.snapped.is_empty()
    }

    pub fn snapped_on(&self, axis: Axis) -> Option<&AxisSnap> {
        self.snapped.iter().find(|s| s.axis == axis)
    }
}

/// Face value `coord` should lock to, if either face of `center ± combined`
/// is within `threshold`. The nearer face wins, positive on a tie.
fn match_face(coord: f64, center: f64, combined: f64, threshold: f64) -> Option<f64> {
    let positive = center + combined;
    let negative = center - combined;
    let dp = (coord - positive).abs();
    let dn = (coord - negative).abs();

    match (dp <= threshold, dn <= threshold) {
        (true, true) if dn < dp => Some(negative),
        (true, _) => Some(positive),
        (false, true) => Some(negative),
        (false, false) => None,
    }
}

/// Adjust `proposed` so the moving object's faces lock onto nearby faces.
///
/// Invisible candidates and the moving object itself are ignored. Candidates
/// whose center is further than `max(moving.x, candidate.x) + threshold` are
/// rejected outright. Rotation and scale are never affected.
pub fn try_snap<'a, I>(
    moving_id: &str,
    proposed: Vector3,
    moving_extents: Vector3,
    candidates: I,
    settings: &SnapSettings,
) -> SnapResult
where
    I: IntoIterator<Item = &'a SceneObject>,
{
    let threshold = settings.threshold;
    let origin = DVec3::from_array(proposed);

    let mut in_range: Vec<(f64, &SceneObject)> = candidates
        .into_iter()
        .filter(|c| c.visible && c.id != moving_id)
        .filter_map(|c| {
            let distance = origin.distance(DVec3::from_array(c.position()));
            let reach = moving_extents[0].max(c.extents()[0]) + threshold;
            (distance <= reach).then_some((distance, c))
        })
        .collect();

    if in_range.is_empty() {
        return SnapResult::unchanged(proposed);
    }
    if settings.order == SnapOrder::Nearest {
        in_range.sort_by(|a, b| a.0.total_cmp(&b.0));
    }

    let mut result = SnapResult::unchanged(proposed);
    for (_, candidate) in &in_range {
        let center = candidate.position();
        let extents = candidate.extents();

        for axis in Axis::ALL {
            let i = axis.index();
            let existing = result.snapped.iter().position(|s| s.axis == axis);
            if existing.is_some() && settings.order == SnapOrder::Nearest {
                continue;
            }

            let combined = (moving_extents[i] + extents[i]) / 2.0;
            let Some(value) = match_face(proposed[i], center[i], combined, threshold) else {
                continue;
            };

            result.position[i] = value;
            let snap = AxisSnap {
                axis,
                target_id: candidate.id.clone(),
                value,
            };
            match existing {
                Some(idx) => result.snapped[idx] = snap,
                None => result.snapped.push(snap),
            }
        }
    }

    if result.is_snapped() {
        tracing::trace!(
            moving = %moving_id,
            axes = result.snapped.len(),
            "snapped to neighbour faces"
        );
    }
    result
}
