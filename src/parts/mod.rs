// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Structural editing of a score's parts, instruments and staves.
//!
//! [`NotationParts`] owns the entity store, the notification router and
//! the undo adapter. Every public edit runs as one transaction: nested
//! edits join the outermost one, which alone reports to the undo stack
//! and flushes change notifications. Validation happens before a
//! transaction opens, so a rejected call leaves nothing behind.

mod instruments;
mod roster;
mod staves;

use tracing::{debug, error};

use crate::error::{PartsError, Result};
use crate::model::{
    Fraction, Instrument, InstrumentId, InstrumentKey, Interval, Part, PartId, SharpFlat, Staff,
    StaffId,
};
use crate::notify::{InstrumentList, NotificationRouter, Subscription};
use crate::store::EntityStore;
use crate::undo::{NoUndo, UndoHistory, UndoStack};

/// Where moved entities land relative to the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertMode {
    Before,
    After,
}

impl Default for InsertMode {
    fn default() -> Self {
        InsertMode::Before
    }
}

/// Parts manager for one open score
pub struct NotationParts<U: UndoStack = NoUndo> {
    store: EntityStore,
    router: NotificationRouter,
    undo_stack: U,
    /// Open transaction nesting
    depth: usize,
}

impl NotationParts<NoUndo> {
    /// Manage `store` without recording undo history
    pub fn new(store: EntityStore) -> Self {
        Self::with_undo(store, NoUndo)
    }
}

impl<U: UndoStack> NotationParts<U> {
    /// Manage `store`, reporting transactions to `undo_stack`
    pub fn with_undo(store: EntityStore, undo_stack: U) -> Self {
        Self {
            store,
            router: NotificationRouter::new(),
            undo_stack,
            depth: 0,
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn undo_stack(&self) -> &U {
        &self.undo_stack
    }

    pub fn undo_stack_mut(&mut self) -> &mut U {
        &mut self.undo_stack
    }

    /// Parts in roster order
    pub fn part_list(&self) -> Vec<&Part> {
        self.store.part_list()
    }

    /// Parts usable in the current (possibly excerpt-filtered) view
    pub fn available_parts(&self) -> Vec<&Part> {
        self.store.available_parts()
    }

    pub fn part(&self, part_id: PartId) -> Result<&Part> {
        self.store.part(part_id)
    }

    pub fn staff(&self, staff_id: StaffId) -> Result<&Staff> {
        self.store.staff(staff_id)
    }

    /// Instrument timeline of a part
    pub fn instrument_list(&self, part_id: PartId) -> Result<InstrumentList> {
        self.store.instrument_list(part_id)
    }

    /// Staves of a part in display order
    pub fn staff_list(&self, part_id: PartId) -> Result<Vec<&Staff>> {
        self.store.staff_list(part_id)
    }

    /// Payload-free signal fired once after every committed change
    pub fn subscribe_structure(&mut self) -> Subscription<()> {
        self.router.subscribe_structure()
    }

    /// Observe the roster
    pub fn subscribe_part_list(&mut self) -> Subscription<Vec<Part>> {
        self.router.subscribe_parts()
    }

    /// Observe one part's instrument timeline
    pub fn subscribe_instrument_list(
        &mut self,
        part_id: PartId,
    ) -> Result<Subscription<InstrumentList>> {
        self.router.subscribe_instruments(&self.store, part_id)
    }

    /// Observe the staves under one instrument of a part
    pub fn subscribe_staff_list(
        &mut self,
        part_id: PartId,
        instrument_id: impl Into<InstrumentId>,
    ) -> Result<Subscription<Vec<Staff>>> {
        let key = InstrumentKey::new(part_id, instrument_id.into());
        self.router.subscribe_staves(&self.store, key)
    }

    /// Observe one staff
    pub fn subscribe_staff(&mut self, staff_id: StaffId) -> Result<Subscription<Staff>> {
        self.router.subscribe_staff(&self.store, staff_id)
    }

    /// Enter a transaction; only the outermost one reaches the undo stack
    fn start_edit(&mut self) {
        if self.depth == 0 {
            self.undo_stack.begin(&self.store);
        }
        self.depth += 1;
    }

    /// Leave a transaction; the outermost one commits and notifies
    fn apply(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        if self.depth > 0 {
            return;
        }
        self.undo_stack.commit(&self.store);
        if let Err(problem) = self.store.check_invariants() {
            error!(%problem, "score structure inconsistent after edit");
        }
        self.router.release_missing(&self.store);
        self.router.flush(&self.store);
    }

    /// Replace the whole store with a snapshot taken by the undo log.
    ///
    /// Scopes of entities missing from the snapshot are torn down and
    /// every remaining scope is notified.
    pub fn restore(&mut self, snapshot: EntityStore) {
        self.store = snapshot;
        self.router.discard_pending();
        self.router.release_missing(&self.store);
        self.router.mark_all(&self.store);
        self.router.flush(&self.store);
        debug!(parts = self.store.len(), "score structure restored");
    }

    /// Filter the view by an excerpt, or show the full score with None
    pub fn set_active_excerpt(&mut self, index: Option<usize>) -> Result<()> {
        if self.store.active_excerpt_index() == index {
            return Ok(());
        }
        if let Some(i) = index.filter(|i| *i >= self.store.excerpts().len()) {
            return Err(PartsError::InvalidInput(format!("no excerpt at index {}", i)));
        }

        self.start_edit();
        let result = self.store.set_active_excerpt(index);
        self.router.pending().parts_changed();
        self.apply();
        result
    }

    /// Apply `update` to a copy of a part and commit it if anything changed
    fn update_part<F>(&mut self, part_id: PartId, update: F) -> Result<()>
    where
        F: FnOnce(&mut Part),
    {
        let current = self.store.part(part_id)?;
        let mut part = current.clone();
        update(&mut part);
        if *current == part {
            return Ok(());
        }

        self.start_edit();
        if let Ok(slot) = self.store.part_mut(part_id) {
            *slot = part;
        }
        self.router.pending().parts_changed();
        self.apply();
        Ok(())
    }

    pub fn set_part_visible(&mut self, part_id: PartId, visible: bool) -> Result<()> {
        self.update_part(part_id, |part| part.set_visible(visible))?;
        debug!(part = %part_id, visible, "part visibility set");
        Ok(())
    }

    /// Pin a part title; an empty name returns to the derived title
    pub fn set_part_name(&mut self, part_id: PartId, name: &str) -> Result<()> {
        self.update_part(part_id, |part| part.set_name(name))?;
        debug!(part = %part_id, name, "part renamed");
        Ok(())
    }

    pub fn set_part_sharp_flat(&mut self, part_id: PartId, sharp_flat: SharpFlat) -> Result<()> {
        self.update_part(part_id, |part| part.set_sharp_flat(sharp_flat))
    }

    /// Change the part transposition; notated content is left alone
    pub fn set_part_transposition(
        &mut self,
        part_id: PartId,
        transposition: Interval,
    ) -> Result<()> {
        self.update_part(part_id, |part| part.set_transposition(transposition))
    }
}

impl NotationParts<UndoHistory> {
    /// Manage `store` with an in-memory undo history
    pub fn with_history(store: EntityStore) -> Self {
        Self::with_undo(store, UndoHistory::default())
    }

    /// Roll back the last transaction
    pub fn undo(&mut self) -> bool {
        match self.undo_stack.undo() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    /// Re-apply the last rolled back transaction
    pub fn redo(&mut self) -> bool {
        match self.undo_stack.redo() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }
}

/// Marker of the primary instrument of a part
fn primary_slot(part: &Part) -> Fraction {
    part.instruments().keys().next().copied().unwrap_or(Fraction::ZERO)
}

/// Keep `instrument`'s soloist flag in line with the part it joins
fn adopt_soloist(part: &Part, mut instrument: Instrument) -> Instrument {
    instrument.set_soloist(part.is_soloist());
    instrument
}
