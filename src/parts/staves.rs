// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Staff edits: rendering configuration, removal, moves and ownership transfer.

use std::collections::HashSet;

use tracing::{debug, warn};

use super::{InsertMode, NotationParts};
use crate::error::{PartsError, Result};
use crate::model::{PartId, Staff, StaffConfig, StaffId, StaffType, VOICES};
use crate::undo::UndoStack;

impl<U: UndoStack> NotationParts<U> {
    /// Apply `update` to a copy of a staff's configuration and commit it if anything changed
    fn update_staff<F>(&mut self, staff_id: StaffId, update: F) -> Result<()>
    where
        F: FnOnce(&mut StaffConfig),
    {
        let staff = self.store.staff(staff_id)?;
        let mut config = staff.config().clone();
        update(&mut config);
        config.normalize();
        if *staff.config() == config {
            return Ok(());
        }
        let owner = staff.part();

        self.start_edit();
        if let Ok(staff) = self.store.staff_mut(staff_id) {
            *staff.config_mut() = config;
        }
        let changes = self.router.pending();
        changes.staff_changed(staff_id);
        if let Some(part_id) = owner {
            changes.staff_list_changed(part_id);
        }
        self.apply();
        Ok(())
    }

    /// Show or hide a staff; showing a staff whose voices are all hidden shows them again
    pub fn set_staff_visible(&mut self, staff_id: StaffId, visible: bool) -> Result<()> {
        self.update_staff(staff_id, |config| {
            config.visible = visible;
            if visible && !config.any_voice_visible() {
                config.voices_visible = [true; VOICES];
            }
        })
    }

    /// Show or hide one voice.
    ///
    /// Hiding the last visible voice hides the staff; showing a voice on a
    /// hidden staff shows the staff.
    pub fn set_voice_visible(
        &mut self,
        staff_id: StaffId,
        voice: usize,
        visible: bool,
    ) -> Result<()> {
        if voice >= VOICES {
            return Err(PartsError::InvalidInput(format!("voice {} out of range", voice)));
        }
        self.update_staff(staff_id, |config| {
            config.voices_visible[voice] = visible;
            if visible {
                config.visible = true;
            } else if !config.any_voice_visible() {
                config.visible = false;
            }
        })
    }

    pub fn set_staff_type(&mut self, staff_id: StaffId, staff_type: StaffType) -> Result<()> {
        self.update_staff(staff_id, |config| config.staff_type = staff_type)
    }

    pub fn set_cutaway_enabled(&mut self, staff_id: StaffId, enabled: bool) -> Result<()> {
        self.update_staff(staff_id, |config| config.cutaway = enabled)
    }

    pub fn set_small_staff(&mut self, staff_id: StaffId, small: bool) -> Result<()> {
        self.update_staff(staff_id, |config| config.small = small)
    }

    /// Replace a staff's whole rendering configuration
    pub fn set_staff_config(&mut self, staff_id: StaffId, config: StaffConfig) -> Result<()> {
        self.update_staff(staff_id, |current| *current = config)
    }

    /// Remove staves, skipping unknown ids.
    ///
    /// Returns the ids actually removed.
    pub fn remove_staves(&mut self, staff_ids: &[StaffId]) -> Vec<StaffId> {
        let mut targets = Vec::new();
        for staff_id in staff_ids {
            if !self.store.contains_staff(*staff_id) {
                warn!(staff = %staff_id, "skipping unknown staff");
            } else if !targets.contains(staff_id) {
                targets.push(*staff_id);
            }
        }
        if targets.is_empty() {
            return targets;
        }

        self.start_edit();
        for staff_id in &targets {
            if let Some(owner) = self.store.staff(*staff_id).ok().and_then(Staff::part) {
                self.router.pending().staff_list_changed(owner);
            }
            self.store.detach_staff(*staff_id);
            self.router.release_staff(*staff_id);
        }
        self.apply();

        debug!(removed = targets.len(), "staves removed");
        targets
    }

    /// Move staves next to `destination`, possibly into another part.
    ///
    /// Moved staves keep their score order; unknown source ids are
    /// skipped and the destination itself never moves.
    pub fn move_staves(
        &mut self,
        staff_ids: &[StaffId],
        destination: StaffId,
        mode: InsertMode,
    ) -> Result<()> {
        let target_part = self
            .store
            .staff(destination)?
            .part()
            .ok_or(PartsError::StaffNotFound(destination))?;
        let requested: HashSet<StaffId> = staff_ids
            .iter()
            .copied()
            .filter(|id| {
                let known = self.store.contains_staff(*id);
                if !known {
                    warn!(staff = %id, "skipping unknown staff");
                }
                known && *id != destination
            })
            .collect();
        if requested.is_empty() {
            return Ok(());
        }

        let moving: Vec<StaffId> = self
            .store
            .staff_ids()
            .into_iter()
            .filter(|id| requested.contains(id))
            .collect();
        let sources: Vec<PartId> = moving
            .iter()
            .filter_map(|id| self.store.staff(*id).ok().and_then(Staff::part))
            .collect();

        // Staff order of the destination part once the move is done
        let mut target: Vec<StaffId> = self
            .store
            .part(target_part)?
            .staves()
            .iter()
            .copied()
            .filter(|id| !requested.contains(id))
            .collect();
        let anchor = target.iter().position(|id| *id == destination).unwrap_or(target.len());
        let at = match mode {
            InsertMode::Before => anchor,
            InsertMode::After => anchor + 1,
        };
        target.splice(at..at, moving.iter().copied());
        let in_place = sources.iter().all(|p| *p == target_part);
        if in_place && target.as_slice() == self.store.part(target_part)?.staves() {
            return Ok(());
        }

        self.start_edit();
        let detached: Vec<Staff> = moving
            .iter()
            .filter_map(|id| self.store.detach_staff(*id))
            .collect();
        for (offset, staff) in detached.into_iter().enumerate() {
            let staff_id = staff.id();
            if let Err(e) = self.store.attach_staff(staff, target_part, at + offset) {
                warn!(staff = %staff_id, error = %e, "failed to reattach staff");
            }
            self.router.pending().staff_changed(staff_id);
        }
        let changes = self.router.pending();
        for part_id in sources {
            changes.staff_list_changed(part_id);
        }
        changes.staff_list_changed(target_part);
        self.apply();

        debug!(moved = moving.len(), destination = %destination, ?mode, "staves moved");
        Ok(())
    }

    /// Take ownership of a detached staff and append it to a part
    pub fn append_staff(&mut self, mut staff: Staff, part_id: PartId) -> Result<StaffId> {
        self.store.part(part_id)?;
        if self.store.contains_staff(staff.id()) || staff.part().is_some() {
            return Err(PartsError::InvalidInput(format!("{} is not detached", staff.id())));
        }
        staff.config_mut().normalize();

        self.start_edit();
        let appended = self.store.attach_staff(staff, part_id, usize::MAX);
        self.router.pending().staff_list_changed(part_id);
        self.apply();

        if let Ok(staff_id) = &appended {
            debug!(staff = %staff_id, part = %part_id, "staff appended");
        }
        appended
    }

    /// Copy the rendering configuration of `source` onto `destination`
    pub fn clone_staff(&mut self, source: StaffId, destination: StaffId) -> Result<()> {
        let config = self.store.staff(source)?.config().clone();
        self.store.staff(destination)?;
        self.set_staff_config(destination, config)
    }
}
