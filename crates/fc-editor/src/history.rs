//! Undo/Redo over full diagram snapshots.
//!
//! History is a linear list of snapshots with a cursor pointing at the
//! entry that matches the live diagram. Recording a change truncates any
//! redo entries past the cursor and appends. Undo and redo only move the
//! cursor; they never record.
//!
//! Drag gestures use **batching**: changes inside `begin_batch()` /
//! `end_batch()` are applied live but produce a single entry when the
//! outermost batch closes.

use fc_core::Diagram;

pub struct History {
    entries: Vec<Diagram>,
    /// Index of the entry matching the live diagram.
    cursor: usize,
    /// Maximum number of entries kept.
    max_depth: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    /// Whether any change was recorded during the current batch.
    batch_dirty: bool,
}

impl History {
    /// Start a history whose only entry is `initial`.
    pub fn new(initial: &Diagram, max_depth: usize) -> Self {
        Self {
            entries: vec![initial.clone()],
            cursor: 0,
            max_depth: max_depth.max(1),
            batch_depth: 0,
            batch_dirty: false,
        }
    }

    /// Discard everything and start over from `current`.
    pub fn reset(&mut self, current: &Diagram) {
        self.entries.clear();
        self.entries.push(current.clone());
        self.cursor = 0;
        self.batch_depth = 0;
        self.batch_dirty = false;
    }

    /// Record `current` as the newest state.
    ///
    /// Inside a batch this only marks the batch dirty. Returns `true` when an
    /// entry was appended.
    pub fn record(&mut self, current: &Diagram) -> bool {
        if self.batch_depth > 0 {
            self.batch_dirty = true;
            return false;
        }
        self.push(current)
    }

    /// Start a batch group.
    pub fn begin_batch(&mut self) {
        if self.batch_depth == 0 {
            self.batch_dirty = false;
        }
        self.batch_depth += 1;
    }

    /// End a batch group. When the outermost batch closes and something
    /// changed, `current` is recorded as one entry.
    pub fn end_batch(&mut self, current: &Diagram) -> bool {
        if self.batch_depth == 0 {
            return false;
        }
        self.batch_depth -= 1;
        if self.batch_depth > 0 {
            return false;
        }
        let dirty = std::mem::take(&mut self.batch_dirty);
        dirty && self.push(current)
    }

    pub fn in_batch(&self) -> bool {
        self.batch_depth > 0
    }

    /// Step back one entry and return the snapshot to restore.
    ///
    /// An open batch is closed first so the gesture can itself be undone.
    pub fn undo(&mut self, current: &Diagram) -> Option<&Diagram> {
        self.flush_batch(current);
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        log::debug!("undo → entry {}/{}", self.cursor + 1, self.entries.len());
        Some(&self.entries[self.cursor])
    }

    /// Step forward one entry and return the snapshot to restore.
    pub fn redo(&mut self, current: &Diagram) -> Option<&Diagram> {
        self.flush_batch(current);
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        log::debug!("redo → entry {}/{}", self.cursor + 1, self.entries.len());
        Some(&self.entries[self.cursor])
    }

    /// Whether [`undo`](Self::undo) would restore something. An open batch
    /// counts only if `current` has moved away from the entry it started at.
    pub fn can_undo(&self, current: &Diagram) -> bool {
        self.cursor > 0 || (self.batch_dirty && self.entries.get(self.cursor) != Some(current))
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Number of entries, including the initial state.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn flush_batch(&mut self, current: &Diagram) {
        if self.batch_depth > 0 {
            self.batch_depth = 1;
            self.end_batch(current);
        }
    }

    fn push(&mut self, current: &Diagram) -> bool {
        if self.entries.get(self.cursor) == Some(current) {
            return false;
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push(current.clone());
        if self.entries.len() > self.max_depth {
            self.entries.remove(0);
        }
        self.cursor = self.entries.len() - 1;
        true
    }
}
