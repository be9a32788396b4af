// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Undo/redo boundary.
//!
//! Structural edits report their outermost transaction to an
//! [`UndoStack`]. Rollback is always triggered from outside: the caller
//! takes a snapshot from the log and hands it back to the parts
//! manager, which rebuilds its view from it.

use std::collections::VecDeque;

use crate::store::EntityStore;

/// Default number of transactions kept by [`UndoHistory`]
pub const DEFAULT_HISTORY_DEPTH: usize = 100;

/// Transaction log the mutation engine reports to
pub trait UndoStack {
    /// An outermost transaction is about to change `before`
    fn begin(&mut self, before: &EntityStore);

    /// The outermost transaction finished, leaving `after`
    fn commit(&mut self, after: &EntityStore);
}

/// Undo stack that records nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoUndo;

impl UndoStack for NoUndo {
    fn begin(&mut self, _before: &EntityStore) {}

    fn commit(&mut self, _after: &EntityStore) {}
}

/// One committed transaction
#[derive(Debug, Clone)]
struct Entry {
    before: EntityStore,
    after: EntityStore,
}

/// In-memory snapshot log with undo and redo
#[derive(Debug, Clone)]
pub struct UndoHistory {
    /// Committed transactions, oldest first
    entries: VecDeque<Entry>,
    /// Number of entries currently applied (entries past it are redoable)
    current_index: usize,
    /// Maximum number of entries kept
    max_size: usize,
    /// Snapshot taken by `begin` for the open transaction
    open: Option<EntityStore>,
}

impl UndoHistory {
    /// Create a history keeping at most `max_size` transactions
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            current_index: 0,
            max_size: max_size.max(1),
            open: None,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.current_index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current_index < self.entries.len()
    }

    /// Number of committed transactions that can be undone
    pub fn undo_depth(&self) -> usize {
        self.current_index
    }

    /// Step back, returning the snapshot to restore
    pub fn undo(&mut self) -> Option<EntityStore> {
        if !self.can_undo() {
            return None;
        }
        self.current_index -= 1;
        self.entries.get(self.current_index).map(|e| e.before.clone())
    }

    /// Step forward, returning the snapshot to restore
    pub fn redo(&mut self) -> Option<EntityStore> {
        if !self.can_redo() {
            return None;
        }
        let entry = self.entries.get(self.current_index)?;
        self.current_index += 1;
        Some(entry.after.clone())
    }

    /// Forget every transaction
    pub fn clear(&mut self) {
        self.entries.clear();
        self.current_index = 0;
        self.open = None;
    }
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl UndoStack for UndoHistory {
    fn begin(&mut self, before: &EntityStore) {
        self.open = Some(before.clone());
    }

    fn commit(&mut self, after: &EntityStore) {
        let Some(before) = self.open.take() else {
            return;
        };
        // A new edit discards the redo branch
        self.entries.truncate(self.current_index);
        self.entries.push_back(Entry { before, after: after.clone() });
        if self.entries.len() > self.max_size {
            self.entries.pop_front();
        }
        self.current_index = self.entries.len();
    }
}
