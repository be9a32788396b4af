// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Instrument edits inside a part's timeline.

use tracing::debug;

use super::{adopt_soloist, primary_slot, NotationParts};
use crate::error::{PartsError, Result};
use crate::model::{initial_staff_type, Drumset, Instrument, InstrumentId, PartId, StaffTypeGroup};
use crate::undo::UndoStack;

impl<U: UndoStack> NotationParts<U> {
    /// Apply `update` to a copy of the part holding `instrument_id`, committing any change
    fn update_instrument<F>(
        &mut self,
        part_id: PartId,
        instrument_id: &InstrumentId,
        update: F,
    ) -> Result<()>
    where
        F: FnOnce(&mut Instrument),
    {
        let slot = self.store.instrument_slot(part_id, instrument_id)?;
        let current = self.store.part(part_id)?;
        let mut part = current.clone();
        if let Some(instrument) = part.instrument_mut(slot) {
            update(instrument);
        }
        part.refresh_title();
        if *current == part {
            return Ok(());
        }

        self.start_edit();
        if let Ok(existing) = self.store.part_mut(part_id) {
            *existing = part;
        }
        let changes = self.router.pending();
        changes.instruments_changed(part_id);
        changes.parts_changed();
        self.apply();
        Ok(())
    }

    pub fn set_instrument_name(
        &mut self,
        part_id: PartId,
        instrument_id: &InstrumentId,
        name: &str,
    ) -> Result<()> {
        self.update_instrument(part_id, instrument_id, |instrument| instrument.set_name(name))
    }

    pub fn set_instrument_abbreviature(
        &mut self,
        part_id: PartId,
        instrument_id: &InstrumentId,
        abbreviature: &str,
    ) -> Result<()> {
        self.update_instrument(part_id, instrument_id, |instrument| {
            instrument.set_abbreviation(abbreviature)
        })
    }

    /// Swap the instrument occupying `instrument_id`'s slot, keeping its marker.
    ///
    /// When the primary instrument gains or loses a drumset the part's
    /// staves switch between percussion and pitched presets.
    pub fn replace_instrument(
        &mut self,
        part_id: PartId,
        instrument_id: &InstrumentId,
        instrument: Instrument,
    ) -> Result<()> {
        let slot = self.store.instrument_slot(part_id, instrument_id)?;
        let part = self.store.part(part_id)?;
        let taken = part
            .instruments()
            .iter()
            .any(|(tick, existing)| *tick != slot && existing.id() == instrument.id());
        if taken {
            return Err(PartsError::InvalidInput(format!(
                "{} already plays {}",
                part_id,
                instrument.id()
            )));
        }
        let instrument = adopt_soloist(part, instrument);
        let is_primary = slot == primary_slot(part);
        let previous = part.instruments().get(&slot).cloned();
        if previous.as_ref() == Some(&instrument) {
            return Ok(());
        }

        self.start_edit();
        if let Ok(part) = self.store.part_mut(part_id) {
            part.set_instrument(slot, instrument.clone());
        }
        if let (true, Some(previous)) = (is_primary, previous.as_ref()) {
            self.retype_staves(part_id, previous, &instrument);
        }
        let changes = self.router.pending();
        changes.instruments_changed(part_id);
        changes.parts_changed();
        self.apply();

        debug!(
            part = %part_id,
            from = %instrument_id,
            to = %instrument.id(),
            "instrument replaced"
        );
        Ok(())
    }

    /// Give the instrument at `instrument_id`'s slot a new percussion mapping
    pub fn replace_drumset(
        &mut self,
        part_id: PartId,
        instrument_id: &InstrumentId,
        drumset: Drumset,
    ) -> Result<()> {
        self.update_instrument(part_id, instrument_id, |instrument| {
            instrument.set_drumset(Some(drumset))
        })
    }

    /// Move staves between percussion and pitched presets when the primary instrument changes kind
    pub(super) fn retype_staves(
        &mut self,
        part_id: PartId,
        previous: &Instrument,
        next: &Instrument,
    ) {
        if previous.is_percussion() == next.is_percussion() {
            return;
        }
        let staff_type = initial_staff_type(next);
        let wanted = staff_type.group();
        let Ok(part) = self.store.part(part_id) else { return };
        let staves = part.staves().to_vec();

        for staff_id in staves {
            let Ok(staff) = self.store.staff_mut(staff_id) else { continue };
            let group = staff.staff_type().group();
            let mismatched = if wanted == StaffTypeGroup::Percussion {
                group != StaffTypeGroup::Percussion
            } else {
                group == StaffTypeGroup::Percussion
            };
            if mismatched {
                staff.config_mut().staff_type = staff_type;
                self.router.pending().staff_changed(staff_id);
            }
        }
        self.router.pending().staff_list_changed(part_id);
    }
}
