//! Linear undo/redo over full `EditState` snapshots
//!
//! The entry under the cursor is always the state currently applied.
//! Recording after an undo discards the redo branch.

use super::edit::EditState;

#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<EditState>,
    index: usize,
    max_depth: usize,
}

impl History {
    /// Start a history holding only `initial`
    pub fn new(initial: EditState, max_depth: usize) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
            max_depth: max_depth.max(1),
        }
    }

    /// Record a snapshot after the cursor. Returns false when it equals the
    /// entry under the cursor (nothing is appended then, and the redo
    /// branch is kept).
    pub fn record(&mut self, state: &EditState) -> bool {
        if self.entries[self.index] == *state {
            return false;
        }

        self.entries.truncate(self.index + 1);
        self.entries.push(state.clone());

        if self.entries.len() > self.max_depth {
            let excess = self.entries.len() - self.max_depth;
            self.entries.drain(..excess);
        }
        self.index = self.entries.len() - 1;
        true
    }

    /// Step back one entry and return it, or `None` at the oldest entry
    pub fn undo(&mut self) -> Option<&EditState> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        Some(&self.entries[self.index])
    }

    /// Step forward one entry and return it, or `None` at the newest entry
    pub fn redo(&mut self) -> Option<&EditState> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        Some(&self.entries[self.index])
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn current(&self) -> &EditState {
        &self.entries[self.index]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cursor position
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn entries(&self) -> &[EditState] {
        &self.entries
    }

    /// Forget every entry except the current one
    pub fn clear(&mut self) {
        let current = self.entries.swap_remove(self.index);
        self.entries.clear();
        self.entries.push(current);
        self.index = 0;
    }
}
