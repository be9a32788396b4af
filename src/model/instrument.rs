// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Instrument assignments and percussion mappings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{InstrumentId, StaffType};

/// One entry of a drumset (MIDI pitch -> drawn instrument)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrumPitch {
    /// Display name (e.g. "Snare")
    pub name: String,
    /// Staff line the note is drawn on
    #[serde(default)]
    pub line: i32,
    /// Default voice
    #[serde(default)]
    pub voice: usize,
    /// Note entry shortcut
    #[serde(default)]
    pub shortcut: Option<char>,
}

/// Percussion mapping of an unpitched instrument
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Drumset {
    pitches: BTreeMap<u8, DrumPitch>,
}

impl Drumset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: map a pitch
    pub fn with_pitch(mut self, pitch: u8, drum: DrumPitch) -> Self {
        self.pitches.insert(pitch, drum);
        self
    }

    /// Get mapping for a pitch
    pub fn pitch(&self, pitch: u8) -> Option<&DrumPitch> {
        self.pitches.get(&pitch)
    }

    /// All mapped pitches in ascending order
    pub fn pitches(&self) -> &BTreeMap<u8, DrumPitch> {
        &self.pitches
    }

    pub fn len(&self) -> usize {
        self.pitches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }
}

/// An instrument assignment inside a part's timeline
#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    id: InstrumentId,
    name: String,
    abbreviation: String,
    family: String,
    soloist: bool,
    staff_count: usize,
    staff_type: StaffType,
    drumset: Option<Drumset>,
}

impl Instrument {
    /// Create a pitched single-staff instrument
    pub fn new(id: impl Into<InstrumentId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            abbreviation: String::new(),
            family: String::new(),
            soloist: false,
            staff_count: 1,
            staff_type: StaffType::Standard,
            drumset: None,
        }
    }

    pub fn id(&self) -> &InstrumentId {
        &self.id
    }

    /// Long name, used for part titles
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn abbreviation(&self) -> &str {
        &self.abbreviation
    }

    pub fn set_abbreviation(&mut self, abbreviation: impl Into<String>) {
        self.abbreviation = abbreviation.into();
    }

    /// Family key used by score orders (e.g. "violins")
    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn is_soloist(&self) -> bool {
        self.soloist
    }

    pub fn set_soloist(&mut self, soloist: bool) {
        self.soloist = soloist;
    }

    /// Number of staves a new part of this instrument gets
    pub fn staff_count(&self) -> usize {
        self.staff_count
    }

    /// Staff type preset for new staves
    pub fn staff_type(&self) -> StaffType {
        self.staff_type
    }

    pub fn drumset(&self) -> Option<&Drumset> {
        self.drumset.as_ref()
    }

    pub fn set_drumset(&mut self, drumset: Option<Drumset>) {
        self.drumset = drumset;
    }

    /// Check if the instrument is unpitched
    pub fn is_percussion(&self) -> bool {
        self.drumset.is_some()
    }

    /// Builder: set abbreviation
    pub fn with_abbreviation(mut self, abbreviation: impl Into<String>) -> Self {
        self.abbreviation = abbreviation.into();
        self
    }

    /// Builder: set family
    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = family.into();
        self
    }

    /// Builder: flag as soloist
    pub fn with_soloist(mut self, soloist: bool) -> Self {
        self.soloist = soloist;
        self
    }

    /// Builder: set staff count (at least one)
    pub fn with_staff_count(mut self, count: usize) -> Self {
        self.staff_count = count.max(1);
        self
    }

    /// Builder: set staff type preset
    pub fn with_staff_type(mut self, staff_type: StaffType) -> Self {
        self.staff_type = staff_type;
        self
    }

    /// Builder: attach a drumset
    pub fn with_drumset(mut self, drumset: Drumset) -> Self {
        self.drumset = Some(drumset);
        self
    }
}
