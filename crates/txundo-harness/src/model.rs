#![forbid(unsafe_code)]

//! Reference model of linear undo history over a single value.
//!
//! Property tests and the fuzz target drive a real manager and this model
//! side by side and compare the observable state after every step.

/// Expected value sequence with a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryModel {
    states: Vec<i64>,
    cursor: usize,
}

impl HistoryModel {
    /// History holding only the initial value.
    #[must_use]
    pub fn new(initial: i64) -> Self {
        Self {
            states: vec![initial],
            cursor: 0,
        }
    }

    /// A new transaction leaving `value` behind. Drops redoable states.
    pub fn commit(&mut self, value: i64) {
        self.states.truncate(self.cursor + 1);
        self.states.push(value);
        self.cursor += 1;
    }

    /// A joined segment: the newest entry now ends at `value`.
    ///
    /// Only valid when nothing is redoable and there is an entry to join.
    pub fn join(&mut self, value: i64) {
        assert!(self.cursor > 0 && self.cursor + 1 == self.states.len());
        self.states[self.cursor] = value;
    }

    /// Forget redoable states, as opening a transaction does.
    pub fn discard_redo(&mut self) {
        self.states.truncate(self.cursor + 1);
    }

    /// Step back; returns the restored value.
    pub fn undo(&mut self) -> Option<i64> {
        self.cursor = self.cursor.checked_sub(1)?;
        Some(self.current())
    }

    /// Step forward; returns the restored value.
    pub fn redo(&mut self) -> Option<i64> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    /// Keep at most `depth` undoable entries, dropping the oldest.
    pub fn truncate_front(&mut self, depth: usize) {
        if self.cursor > depth {
            let excess = self.cursor - depth;
            self.states.drain(..excess);
            self.cursor -= excess;
        }
    }

    /// Value currently in effect.
    #[must_use]
    pub fn current(&self) -> i64 {
        self.states[self.cursor]
    }

    /// Whether [`undo`](Self::undo) would move.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether [`redo`](Self::redo) would move.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.states.len()
    }

    /// Number of undoable entries.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.cursor
    }

    /// Number of redoable entries.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.states.len() - self.cursor - 1
    }
}
