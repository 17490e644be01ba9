//! Linear undo/redo history of scene snapshots

use std::sync::Arc;

use shared::SceneDescription;

/// Append-only snapshot history with a cursor.
///
/// `snapshots[0]` is the session's initial scene and `cursor` always points at a
/// valid entry. Committing after an undo drops the redo branch for good.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<Arc<SceneDescription>>,
    cursor: usize,
    /// Monotonically increasing version counter for cache invalidation
    version: u64,
}

impl Default for History {
    fn default() -> Self {
        Self::new(SceneDescription::default())
    }
}

impl History {
    /// Start a session with a single initial snapshot
    pub fn new(initial: SceneDescription) -> Self {
        Self {
            snapshots: vec![Arc::new(initial)],
            cursor: 0,
            version: 0,
        }
    }

    /// Currently displayed snapshot
    pub fn current(&self) -> &SceneDescription {
        &self.snapshots[self.cursor]
    }

    /// Shared handle to the current snapshot
    pub fn current_shared(&self) -> Arc<SceneDescription> {
        Arc::clone(&self.snapshots[self.cursor])
    }

    /// Truncate any redo branch, append `snapshot` and make it current
    pub fn commit(&mut self, snapshot: SceneDescription) {
        let discarded = self.snapshots.len() - 1 - self.cursor;
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(Arc::new(snapshot));
        self.cursor = self.snapshots.len() - 1;
        self.version += 1;
        tracing::debug!(
            cursor = self.cursor,
            discarded,
            objects = self.current().len(),
            "history commit"
        );
    }

    /// Step back one snapshot. Returns false when already at the start.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.cursor -= 1;
        self.version += 1;
        tracing::debug!(cursor = self.cursor, "undo");
        true
    }

    /// Step forward one snapshot. Returns false when nothing was undone.
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.cursor += 1;
        self.version += 1;
        tracing::debug!(cursor = self.cursor, "redo");
        true
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of stored snapshots, including the initial one
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Snapshot at `index`, if it is still reachable
    pub fn snapshot(&self, index: usize) -> Option<&SceneDescription> {
        self.snapshots.get(index).map(|s| s.as_ref())
    }

    /// Throw away all history and start over from `initial`
    pub fn reset(&mut self, initial: SceneDescription) {
        self.snapshots = vec![Arc::new(initial)];
        self.cursor = 0;
        self.version += 1;
    }
}
