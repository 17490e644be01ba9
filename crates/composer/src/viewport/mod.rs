//! Viewport-side logic that does not need a GPU: gizmo drag state, face
//! snapping and overlay data.

pub mod gizmo;
pub mod overlays;
pub mod snap;
