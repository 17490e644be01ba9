//! Transform commits (end of a drag, numeric edits)

use shared::Transform;

use super::SceneState;

impl SceneState {
    /// Commit `transform` for one object as a single history entry.
    ///
    /// Returns false if the object no longer exists in the current snapshot.
    pub fn set_transform(&mut self, id: &str, transform: Transform) -> bool {
        self.edit(|scene| match scene.get_mut(id) {
            Some(object) => {
                object.transform = transform;
                true
            }
            None => {
                tracing::warn!(%id, "transform commit ignored: unknown object");
                false
            }
        })
    }
}
