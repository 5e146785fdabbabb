//! Linear undo/redo history of generated image snapshots.
//!
//! Each snapshot is a full data URL produced by one AI edit. The cursor
//! points at the snapshot currently shown; `None` means the original
//! upload is shown. Applying a new edit after an undo discards every
//! snapshot past the cursor, so the history never branches.

/// Ordered snapshots plus a cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditHistory {
    snapshots: Vec<String>,
    cursor: Option<usize>,
}

impl EditHistory {
    /// Empty history showing the original image.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a history from persisted snapshots.
    ///
    /// The cursor is not persisted; it defaults to the last snapshot
    /// (or the original when there are none).
    pub fn from_snapshots(snapshots: Vec<String>) -> Self {
        let cursor = snapshots.len().checked_sub(1);
        Self { snapshots, cursor }
    }

    /// Truncate everything past the cursor, append `snapshot` and move
    /// the cursor onto it.
    pub fn apply_edit(&mut self, snapshot: String) {
        let keep = self.cursor.map_or(0, |i| i + 1);
        self.snapshots.truncate(keep);
        self.snapshots.push(snapshot);
        self.cursor = Some(self.snapshots.len() - 1);
    }

    /// Step back one snapshot. No-op when the original is already shown.
    pub fn undo(&mut self) {
        self.cursor = match self.cursor {
            Some(0) | None => None,
            Some(i) => Some(i - 1),
        };
    }

    /// Step forward one snapshot. No-op at the newest snapshot.
    pub fn redo(&mut self) {
        if self.can_redo() {
            self.cursor = Some(self.cursor.map_or(0, |i| i + 1));
        }
    }

    /// Drop all snapshots and show the original again.
    pub fn reset(&mut self) {
        self.snapshots.clear();
        self.cursor = None;
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn can_redo(&self) -> bool {
        let next = self.cursor.map_or(0, |i| i + 1);
        next < self.snapshots.len()
    }

    /// Cursor in the `-1 ..= len - 1` convention, `-1` meaning "original".
    pub fn index(&self) -> isize {
        self.cursor.map_or(-1, |i| i as isize)
    }

    /// The snapshot under the cursor, if any.
    pub fn current_snapshot(&self) -> Option<&str> {
        self.cursor.map(|i| self.snapshots[i].as_str())
    }

    /// The image to display: the snapshot under the cursor, else the
    /// original image data, else nothing.
    pub fn current_image<'a>(&'a self, original: Option<&'a str>) -> Option<&'a str> {
        self.current_snapshot().or(original)
    }

    pub fn snapshots(&self) -> &[String] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
