// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Parts: named playable roster entries.
//!
//! A Part owns an ordered list of staves (by id) and an instrument
//! timeline keyed by start marker. At most one instrument starts at a
//! given marker, which the map key enforces.

use std::collections::BTreeMap;

use super::{Fraction, Instrument, InstrumentId, Interval, PartId, SharpFlat, Staff, StaffId};
use super::{StaffType, StaffTypeGroup};

/// Separator between instrument names in a composite part title
pub const TITLE_SEPARATOR: &str = " & ";

/// A roster entry
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    /// Part id
    id: PartId,
    /// Display title
    name: String,
    /// Title was set by the user and survives instrument changes
    custom_name: bool,
    /// Part is shown in the score
    visible: bool,
    /// Accidental preference
    sharp_flat: SharpFlat,
    /// Written-to-sounding transposition
    transposition: Interval,
    /// Instrument timeline (start marker -> instrument)
    instruments: BTreeMap<Fraction, Instrument>,
    /// Owned staves in display order
    staves: Vec<StaffId>,
}

impl Part {
    /// Create a new detached part playing `instrument` from the score start
    pub fn new(instrument: Instrument) -> Self {
        let mut instruments = BTreeMap::new();
        instruments.insert(Fraction::ZERO, instrument);
        let mut part = Self {
            id: PartId::generate(),
            name: String::new(),
            custom_name: false,
            visible: true,
            sharp_flat: SharpFlat::default(),
            transposition: Interval::default(),
            instruments,
            staves: Vec::new(),
        };
        part.refresh_title();
        part
    }

    /// Create a detached part plus the staves its instrument asks for
    pub fn from_instrument(instrument: Instrument) -> (Self, Vec<Staff>) {
        let staff_type = initial_staff_type(&instrument);
        let count = instrument.staff_count().max(1);
        let staves = (0..count).map(|_| Staff::new().with_type(staff_type)).collect();
        (Self::new(instrument), staves)
    }

    /// Get part id
    pub fn id(&self) -> PartId {
        self.id
    }

    /// Get display title
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if the title is pinned by the user
    pub fn has_custom_name(&self) -> bool {
        self.custom_name
    }

    /// Pin a user title; an empty title unpins and re-derives it
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if name.is_empty() {
            self.custom_name = false;
            self.refresh_title();
        } else {
            self.custom_name = true;
            self.name = name;
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn sharp_flat(&self) -> SharpFlat {
        self.sharp_flat
    }

    pub fn set_sharp_flat(&mut self, sharp_flat: SharpFlat) {
        self.sharp_flat = sharp_flat;
    }

    pub fn transposition(&self) -> Interval {
        self.transposition
    }

    pub fn set_transposition(&mut self, transposition: Interval) {
        self.transposition = transposition;
    }

    /// Get instrument timeline
    pub fn instruments(&self) -> &BTreeMap<Fraction, Instrument> {
        &self.instruments
    }

    /// Instrument active from the earliest marker
    pub fn primary_instrument(&self) -> Option<&Instrument> {
        self.instruments.values().next()
    }

    /// Instrument sounding at `tick`
    pub fn instrument_at(&self, tick: Fraction) -> Option<&Instrument> {
        self.instruments
            .range(..=tick)
            .next_back()
            .map(|(_, instrument)| instrument)
            .or_else(|| self.primary_instrument())
    }

    /// Find the timeline slot of an instrument id
    pub fn instrument_slot(&self, instrument_id: &InstrumentId) -> Option<Fraction> {
        self.instruments
            .iter()
            .find(|(_, instrument)| instrument.id() == instrument_id)
            .map(|(tick, _)| *tick)
    }

    pub(crate) fn instrument_mut(&mut self, tick: Fraction) -> Option<&mut Instrument> {
        self.instruments.get_mut(&tick)
    }

    /// Place an instrument at `tick`, returning the one it displaced
    pub fn set_instrument(&mut self, tick: Fraction, instrument: Instrument) -> Option<Instrument> {
        let previous = self.instruments.insert(tick, instrument);
        self.refresh_title();
        previous
    }

    /// Soloist flag of the primary instrument
    pub fn is_soloist(&self) -> bool {
        self.primary_instrument().map(|i| i.is_soloist()).unwrap_or(false)
    }

    pub(crate) fn set_soloist(&mut self, soloist: bool) {
        for instrument in self.instruments.values_mut() {
            instrument.set_soloist(soloist);
        }
    }

    /// Owned staves in display order
    pub fn staves(&self) -> &[StaffId] {
        &self.staves
    }

    pub(crate) fn staves_mut(&mut self) -> &mut Vec<StaffId> {
        &mut self.staves
    }

    /// Title derived from the instrument timeline
    pub fn derived_title(&self) -> String {
        let mut names: Vec<&str> = Vec::new();
        for instrument in self.instruments.values() {
            if !names.contains(&instrument.name()) {
                names.push(instrument.name());
            }
        }
        names.join(TITLE_SEPARATOR)
    }

    /// Re-derive the title unless the user pinned one
    pub fn refresh_title(&mut self) {
        if !self.custom_name {
            self.name = self.derived_title();
        }
    }

    /// Builder: pin a custom title
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.set_name(name);
        self
    }

    /// Builder: add an instrument change
    pub fn with_instrument_at(mut self, tick: Fraction, instrument: Instrument) -> Self {
        self.set_instrument(tick, instrument);
        self
    }

    /// Builder: set visibility
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }
}

/// Staff type for fresh staves of `instrument`
pub fn initial_staff_type(instrument: &Instrument) -> StaffType {
    let preset = instrument.staff_type();
    if instrument.is_percussion() && preset.group() != StaffTypeGroup::Percussion {
        StaffType::Percussion5Line
    } else {
        preset
    }
}

/// One roster entry passed to `set_parts`
#[derive(Debug, Clone, PartialEq)]
pub struct PartInstrument {
    /// Existing part to keep, or None to create one
    pub part_id: Option<PartId>,
    /// Primary instrument of the entry
    pub instrument: Instrument,
    /// Part is played by a soloist
    pub soloist: bool,
}

impl PartInstrument {
    /// Keep an existing part, reconciling its primary instrument
    pub fn existing(part_id: PartId, instrument: Instrument) -> Self {
        let soloist = instrument.is_soloist();
        Self { part_id: Some(part_id), instrument, soloist }
    }

    /// Create a new part from an instrument
    pub fn new(instrument: Instrument) -> Self {
        let soloist = instrument.is_soloist();
        Self { part_id: None, instrument, soloist }
    }

    /// Builder: set soloist flag
    pub fn with_soloist(mut self, soloist: bool) -> Self {
        self.soloist = soloist;
        self
    }
}
