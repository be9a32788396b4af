// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Roster edits: replacing, ordering, removing and moving parts.

use std::collections::HashSet;

use tracing::{debug, error, info, warn};

use super::{primary_slot, InsertMode, NotationParts};
use crate::catalog::InstrumentsRepository;
use crate::error::{PartsError, Result};
use crate::model::{Instrument, Part, PartId, PartInstrument};
use crate::order::ScoreOrder;
use crate::undo::UndoStack;

impl<U: UndoStack> NotationParts<U> {
    /// Replace the whole roster.
    ///
    /// Entries naming an existing part keep it and reconcile its primary
    /// instrument; other entries create parts. Existing parts missing
    /// from `entries` are removed. The roster ends up in entry order.
    pub fn set_parts(&mut self, entries: Vec<PartInstrument>) -> Result<()> {
        if entries.is_empty() {
            return Err(PartsError::InvalidInput("part list is empty".into()));
        }
        let mut kept = HashSet::new();
        for part_id in entries.iter().filter_map(|entry| entry.part_id) {
            self.store.part(part_id)?;
            if !kept.insert(part_id) {
                return Err(PartsError::InvalidInput(format!("{} listed twice", part_id)));
            }
        }
        let removed: Vec<PartId> = self
            .store
            .part_ids()
            .iter()
            .copied()
            .filter(|id| !kept.contains(id))
            .collect();

        self.start_edit();
        self.remove_parts(&removed);

        let mut order = Vec::with_capacity(entries.len());
        for entry in entries {
            let instrument = entry.instrument.with_soloist(entry.soloist);
            match entry.part_id {
                Some(part_id) => {
                    self.reconcile_primary(part_id, instrument, entry.soloist);
                    order.push(part_id);
                }
                None => {
                    let (part, staves) = Part::from_instrument(instrument);
                    match self.store.insert_part(part, staves) {
                        Ok(part_id) => order.push(part_id),
                        Err(e) => error!(error = %e, "failed to add part"),
                    }
                }
            }
        }
        self.store.set_part_order(order);
        self.refresh_order_customized();
        self.router.pending().parts_changed();
        self.apply();

        debug!(parts = self.store.len(), removed = removed.len(), "roster replaced");
        Ok(())
    }

    /// Put `instrument` at the primary slot of an existing part
    fn reconcile_primary(&mut self, part_id: PartId, instrument: Instrument, soloist: bool) {
        let Ok(part) = self.store.part(part_id) else { return };
        let slot = primary_slot(part);
        let previous = part.primary_instrument().cloned();
        if previous.as_ref() == Some(&instrument) && part.is_soloist() == soloist {
            return;
        }

        if let Ok(part) = self.store.part_mut(part_id) {
            part.set_soloist(soloist);
            if previous.as_ref() != Some(&instrument) {
                part.set_instrument(slot, instrument.clone());
            }
        }
        if let Some(previous) = previous {
            self.retype_staves(part_id, &previous, &instrument);
        }
        self.router.pending().instruments_changed(part_id);
    }

    /// Reorder the roster by a score order.
    ///
    /// Re-applying the order the roster already follows is not an edit.
    pub fn set_score_order(&mut self, order: ScoreOrder) -> Result<()> {
        let sorted = order.sort(self.store.part_list());
        let unchanged = sorted.as_slice() == self.store.part_ids()
            && self
                .store
                .score_order()
                .map(|current| current.id() == order.id() && !current.is_customized())
                .unwrap_or(false);
        if unchanged {
            debug!(order = order.id(), "score order already applied");
            return Ok(());
        }

        let mut order = order;
        order.set_customized(false);
        info!(order = order.id(), parts = sorted.len(), "applying score order");

        self.start_edit();
        self.store.set_part_order(sorted);
        self.store.set_score_order(Some(order));
        self.router.pending().parts_changed();
        self.apply();
        Ok(())
    }

    /// Reorder the roster by a preset resolved through `repository`
    pub fn set_score_order_by_id(
        &mut self,
        repository: &dyn InstrumentsRepository,
        order_id: &str,
    ) -> Result<()> {
        let meta = repository.instruments_meta().map_err(|e| {
            error!(error = %e, "failed to load score orders");
            PartsError::UnknownOrder(order_id.to_string())
        })?;
        let order = meta
            .score_order(order_id)
            .cloned()
            .ok_or_else(|| PartsError::UnknownOrder(order_id.to_string()))?;
        self.set_score_order(order)
    }

    /// Remove parts with their staves, skipping unknown ids.
    ///
    /// Returns the ids actually removed.
    pub fn remove_parts(&mut self, part_ids: &[PartId]) -> Vec<PartId> {
        let mut targets = Vec::new();
        for part_id in part_ids {
            if !self.store.contains_part(*part_id) {
                warn!(part = %part_id, "skipping unknown part");
            } else if !targets.contains(part_id) {
                targets.push(*part_id);
            }
        }
        if targets.is_empty() {
            return targets;
        }

        self.start_edit();
        for part_id in &targets {
            if let Some((_, staves)) = self.store.take_part(*part_id) {
                for staff in &staves {
                    self.router.release_staff(staff.id());
                }
            }
            self.router.release_part(*part_id);
        }
        self.router.pending().parts_changed();
        self.apply();

        debug!(removed = targets.len(), "parts removed");
        targets
    }

    /// Move parts next to `destination`, keeping their roster order.
    ///
    /// Unknown source ids are skipped; the destination itself never moves.
    pub fn move_parts(
        &mut self,
        part_ids: &[PartId],
        destination: PartId,
        mode: InsertMode,
    ) -> Result<()> {
        self.store.part(destination)?;
        let moving: HashSet<PartId> = part_ids
            .iter()
            .copied()
            .filter(|id| {
                let known = self.store.contains_part(*id);
                if !known {
                    warn!(part = %id, "skipping unknown part");
                }
                known && *id != destination
            })
            .collect();
        if moving.is_empty() {
            return Ok(());
        }

        let (moved, mut order): (Vec<PartId>, Vec<PartId>) =
            self.store.part_ids().iter().copied().partition(|id| moving.contains(id));
        let anchor = order.iter().position(|id| *id == destination).unwrap_or(order.len());
        let at = match mode {
            InsertMode::Before => anchor,
            InsertMode::After => anchor + 1,
        };
        order.splice(at..at, moved);
        if order.as_slice() == self.store.part_ids() {
            return Ok(());
        }

        self.start_edit();
        self.store.set_part_order(order);
        self.refresh_order_customized();
        self.router.pending().parts_changed();
        self.apply();

        debug!(moved = moving.len(), destination = %destination, ?mode, "parts moved");
        Ok(())
    }

    /// Flag the applied score order as customized once the roster leaves it
    fn refresh_order_customized(&mut self) {
        let conforms = match self.store.score_order() {
            Some(order) => order.is_sorted(self.store.part_list()),
            None => return,
        };
        if let Some(order) = self.store.score_order_mut() {
            order.set_customized(!conforms);
        }
    }
}
