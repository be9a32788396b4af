// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Entity store for one open score.
//!
//! The store is an arena: parts and staves live in id-keyed maps and
//! refer to each other by id. The roster order is a vector of part ids
//! and each part's staff order is its own vector of staff ids.
//!
//! # Invariants
//! - Every staff's owning part lists it exactly once, and no other part does.
//! - Roster and staff orders contain no duplicates.
//! - A clone of the store is a complete undo snapshot.

use std::collections::{HashMap, HashSet};

use crate::error::{PartsError, Result};
use crate::model::{Fraction, Instrument, InstrumentId, Part, PartId, Staff, StaffId};
use crate::order::ScoreOrder;

/// A linked-part view: a named subset of the roster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Excerpt {
    /// Excerpt name (e.g. "Violin I")
    name: String,
    /// Parts shown in this excerpt
    parts: Vec<PartId>,
}

impl Excerpt {
    pub fn new(name: impl Into<String>, parts: Vec<PartId>) -> Self {
        Self { name: name.into(), parts }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parts(&self) -> &[PartId] {
        &self.parts
    }

    pub fn contains(&self, part_id: PartId) -> bool {
        self.parts.contains(&part_id)
    }
}

/// In-memory ownership of parts, instruments and staves
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityStore {
    /// Parts by id
    parts: HashMap<PartId, Part>,
    /// Roster order
    order: Vec<PartId>,
    /// Staves by id
    staves: HashMap<StaffId, Staff>,
    /// Linked-part views
    excerpts: Vec<Excerpt>,
    /// Excerpt the current view is filtered by
    active_excerpt: Option<usize>,
    /// Last applied score order
    score_order: Option<ScoreOrder>,
}

impl EntityStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of parts
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Look up a part
    pub fn part(&self, id: PartId) -> Result<&Part> {
        self.parts.get(&id).ok_or(PartsError::PartNotFound(id))
    }

    pub(crate) fn part_mut(&mut self, id: PartId) -> Result<&mut Part> {
        self.parts.get_mut(&id).ok_or(PartsError::PartNotFound(id))
    }

    /// Look up a staff
    pub fn staff(&self, id: StaffId) -> Result<&Staff> {
        self.staves.get(&id).ok_or(PartsError::StaffNotFound(id))
    }

    pub(crate) fn staff_mut(&mut self, id: StaffId) -> Result<&mut Staff> {
        self.staves.get_mut(&id).ok_or(PartsError::StaffNotFound(id))
    }

    pub fn contains_part(&self, id: PartId) -> bool {
        self.parts.contains_key(&id)
    }

    pub fn contains_staff(&self, id: StaffId) -> bool {
        self.staves.contains_key(&id)
    }

    /// Roster order
    pub fn part_ids(&self) -> &[PartId] {
        &self.order
    }

    /// Parts in roster order
    pub fn part_list(&self) -> Vec<&Part> {
        self.order.iter().filter_map(|id| self.parts.get(id)).collect()
    }

    /// Roster position of a part
    pub fn part_index(&self, id: PartId) -> Option<usize> {
        self.order.iter().position(|p| *p == id)
    }

    /// Instrument timeline of a part, earliest marker first
    pub fn instrument_list(&self, part_id: PartId) -> Result<Vec<(Fraction, Instrument)>> {
        let part = self.part(part_id)?;
        Ok(part
            .instruments()
            .iter()
            .map(|(tick, instrument)| (*tick, instrument.clone()))
            .collect())
    }

    /// Locate an instrument slot inside a part
    pub fn instrument_slot(
        &self,
        part_id: PartId,
        instrument_id: &InstrumentId,
    ) -> Result<Fraction> {
        self.part(part_id)?
            .instrument_slot(instrument_id)
            .ok_or_else(|| PartsError::InstrumentNotFound {
                part: part_id,
                instrument: instrument_id.clone(),
            })
    }

    /// Staves of a part in display order
    pub fn staff_list(&self, part_id: PartId) -> Result<Vec<&Staff>> {
        let part = self.part(part_id)?;
        Ok(part.staves().iter().filter_map(|id| self.staves.get(id)).collect())
    }

    /// All staves in score order (roster order, then part staff order)
    pub fn staff_ids(&self) -> Vec<StaffId> {
        self.part_list()
            .into_iter()
            .flat_map(|part| part.staves().iter().copied())
            .collect()
    }

    /// Total number of staves
    pub fn staff_count(&self) -> usize {
        self.staves.len()
    }

    /// Take ownership of a detached part and its staves, appending it to the roster
    pub fn insert_part(&mut self, part: Part, staves: Vec<Staff>) -> Result<PartId> {
        let index = self.order.len();
        self.insert_part_at(index, part, staves)
    }

    pub(crate) fn insert_part_at(
        &mut self,
        index: usize,
        mut part: Part,
        staves: Vec<Staff>,
    ) -> Result<PartId> {
        let part_id = part.id();
        if self.parts.contains_key(&part_id) {
            return Err(PartsError::InvalidInput(format!("{} is already in the score", part_id)));
        }
        let mut seen = HashSet::new();
        for staff in &staves {
            if self.staves.contains_key(&staff.id()) || !seen.insert(staff.id()) {
                return Err(PartsError::InvalidInput(format!("{} is already owned", staff.id())));
            }
            if staff.part().is_some() {
                return Err(PartsError::InvalidInput(format!("{} is not detached", staff.id())));
            }
        }

        part.staves_mut().clear();
        for mut staff in staves {
            staff.set_part(Some(part_id));
            part.staves_mut().push(staff.id());
            self.staves.insert(staff.id(), staff);
        }
        self.parts.insert(part_id, part);
        self.order.insert(index.min(self.order.len()), part_id);
        Ok(part_id)
    }

    /// Detach a part and its staves from the store
    pub(crate) fn take_part(&mut self, id: PartId) -> Option<(Part, Vec<Staff>)> {
        let part = self.parts.remove(&id)?;
        self.order.retain(|p| *p != id);
        for excerpt in &mut self.excerpts {
            excerpt.parts.retain(|p| *p != id);
        }
        let staves = part
            .staves()
            .iter()
            .filter_map(|staff_id| self.staves.remove(staff_id))
            .map(|mut staff| {
                staff.set_part(None);
                staff
            })
            .collect();
        Some((part, staves))
    }

    /// Give a detached staff to `part_id` at `index` within its staff list
    pub(crate) fn attach_staff(
        &mut self,
        mut staff: Staff,
        part_id: PartId,
        index: usize,
    ) -> Result<StaffId> {
        if self.staves.contains_key(&staff.id()) {
            return Err(PartsError::InvalidInput(format!("{} is already owned", staff.id())));
        }
        let staff_id = staff.id();
        let part = self.part_mut(part_id)?;
        let index = index.min(part.staves().len());
        part.staves_mut().insert(index, staff_id);
        staff.set_part(Some(part_id));
        self.staves.insert(staff_id, staff);
        Ok(staff_id)
    }

    /// Remove a staff from its part and the arena
    pub(crate) fn detach_staff(&mut self, id: StaffId) -> Option<Staff> {
        let mut staff = self.staves.remove(&id)?;
        if let Some(part) = staff.part().and_then(|p| self.parts.get_mut(&p)) {
            part.staves_mut().retain(|s| *s != id);
        }
        staff.set_part(None);
        Some(staff)
    }

    /// Replace the roster order; `order` must be a permutation of the current roster
    pub(crate) fn set_part_order(&mut self, order: Vec<PartId>) {
        debug_assert_eq!(order.len(), self.order.len());
        self.order = order;
    }

    /// Last applied score order
    pub fn score_order(&self) -> Option<&ScoreOrder> {
        self.score_order.as_ref()
    }

    pub(crate) fn score_order_mut(&mut self) -> Option<&mut ScoreOrder> {
        self.score_order.as_mut()
    }

    pub(crate) fn set_score_order(&mut self, order: Option<ScoreOrder>) {
        self.score_order = order;
    }

    /// Register a linked-part view, returning its index
    pub fn add_excerpt(&mut self, excerpt: Excerpt) -> usize {
        self.excerpts.push(excerpt);
        self.excerpts.len() - 1
    }

    pub fn excerpts(&self) -> &[Excerpt] {
        &self.excerpts
    }

    /// Filter the view by an excerpt, or show the full score with None
    pub fn set_active_excerpt(&mut self, index: Option<usize>) -> Result<()> {
        if let Some(i) = index {
            if i >= self.excerpts.len() {
                return Err(PartsError::InvalidInput(format!("no excerpt at index {}", i)));
            }
        }
        self.active_excerpt = index;
        Ok(())
    }

    pub fn active_excerpt_index(&self) -> Option<usize> {
        self.active_excerpt
    }

    pub fn active_excerpt(&self) -> Option<&Excerpt> {
        self.active_excerpt.and_then(|i| self.excerpts.get(i))
    }

    /// Parts usable in the current view, in roster order
    pub fn available_parts(&self) -> Vec<&Part> {
        match self.active_excerpt() {
            Some(excerpt) => self
                .part_list()
                .into_iter()
                .filter(|part| excerpt.contains(part.id()))
                .collect(),
            None => self.part_list(),
        }
    }

    /// Verify ownership and ordering invariants
    pub fn check_invariants(&self) -> std::result::Result<(), String> {
        let roster: HashSet<PartId> = self.order.iter().copied().collect();
        if roster.len() != self.order.len() {
            return Err("duplicate part in roster".into());
        }
        if roster.len() != self.parts.len() || self.parts.keys().any(|id| !roster.contains(id)) {
            return Err("roster and part map disagree".into());
        }

        let mut owned = HashSet::new();
        for part in self.part_list() {
            for staff_id in part.staves() {
                if !owned.insert(*staff_id) {
                    return Err(format!("{} listed twice", staff_id));
                }
                match self.staves.get(staff_id) {
                    Some(staff) if staff.part() == Some(part.id()) => {}
                    Some(_) => return Err(format!("{} points to a different part", staff_id)),
                    None => return Err(format!("{} is dangling in {}", staff_id, part.id())),
                }
            }
        }
        if owned.len() != self.staves.len() {
            return Err("staff without an owning part".into());
        }
        for excerpt in &self.excerpts {
            if let Some(id) = excerpt.parts.iter().find(|id| !roster.contains(id)) {
                return Err(format!("excerpt {} references removed {}", excerpt.name, id));
            }
        }
        Ok(())
    }
}
