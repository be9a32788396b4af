// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Staff records and their rendering configuration bundle.

use serde::{Deserialize, Serialize};

use super::{PartId, StaffId};

/// Number of voices a staff can carry
pub const VOICES: usize = 4;

/// Staff type preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffType {
    /// Five-line pitched staff
    Standard,
    /// Single-line percussion staff
    Percussion1Line,
    /// Three-line percussion staff
    Percussion3Line,
    /// Five-line percussion staff
    Percussion5Line,
    /// Six-string tablature, simple rhythm
    Tab6Simple,
    /// Six-string tablature, common rhythm
    Tab6Common,
    /// Four-string tablature, simple rhythm
    Tab4Simple,
}

/// Family a staff type preset belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffTypeGroup {
    Standard,
    Percussion,
    Tablature,
}

impl StaffType {
    /// Get the preset family
    pub fn group(&self) -> StaffTypeGroup {
        match self {
            StaffType::Standard => StaffTypeGroup::Standard,
            StaffType::Percussion1Line
            | StaffType::Percussion3Line
            | StaffType::Percussion5Line => {
                StaffTypeGroup::Percussion
            }
            StaffType::Tab6Simple | StaffType::Tab6Common | StaffType::Tab4Simple => {
                StaffTypeGroup::Tablature
            }
        }
    }

    /// Number of staff lines drawn
    pub fn lines(&self) -> u8 {
        match self {
            StaffType::Percussion1Line => 1,
            StaffType::Percussion3Line => 3,
            StaffType::Tab6Simple | StaffType::Tab6Common => 6,
            StaffType::Tab4Simple => 4,
            StaffType::Standard | StaffType::Percussion5Line => 5,
        }
    }
}

impl Default for StaffType {
    fn default() -> Self {
        StaffType::Standard
    }
}

/// When an empty staff is hidden in a system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HideMode {
    /// Follow the score-wide "hide empty staves" setting
    Auto,
    /// Always hide when empty
    Always,
    /// Never hide
    Never,
    /// Hide only when every staff of the instrument is empty
    Instrument,
}

impl Default for HideMode {
    fn default() -> Self {
        HideMode::Auto
    }
}

/// Rendering configuration of one staff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffConfig {
    /// Staff is drawn
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Staff type preset
    #[serde(default)]
    pub staff_type: StaffType,
    /// Per-voice visibility
    #[serde(default = "default_voices")]
    pub voices_visible: [bool; VOICES],
    /// Only measures with content are drawn
    #[serde(default)]
    pub cutaway: bool,
    /// Drawn at reduced size
    #[serde(default)]
    pub small: bool,
    /// Shown even when the system would hide it
    #[serde(default)]
    pub show_if_empty: bool,
    /// No barline joining this staff at the system start
    #[serde(default)]
    pub hide_system_barline: bool,
    /// Rests common to all voices are merged
    #[serde(default)]
    pub merge_matching_rests: bool,
    /// Extra space above the staff in spatium units
    #[serde(default)]
    pub user_distance: f64,
    /// Empty staff hiding policy
    #[serde(default)]
    pub hide_mode: HideMode,
}

fn default_true() -> bool {
    true
}
fn default_voices() -> [bool; VOICES] {
    [true; VOICES]
}

impl Default for StaffConfig {
    fn default() -> Self {
        Self {
            visible: default_true(),
            staff_type: StaffType::default(),
            voices_visible: default_voices(),
            cutaway: false,
            small: false,
            show_if_empty: false,
            hide_system_barline: false,
            merge_matching_rests: false,
            user_distance: 0.0,
            hide_mode: HideMode::default(),
        }
    }
}

impl StaffConfig {
    /// Check if any voice is visible
    pub fn any_voice_visible(&self) -> bool {
        self.voices_visible.iter().any(|v| *v)
    }

    /// Hide the staff when none of its voices are visible
    pub fn normalize(&mut self) {
        if !self.any_voice_visible() {
            self.visible = false;
        }
    }
}

/// A notated line owned by exactly one part once attached to a store
#[derive(Debug, Clone, PartialEq)]
pub struct Staff {
    id: StaffId,
    part: Option<PartId>,
    config: StaffConfig,
}

impl Staff {
    /// Create a new detached staff with default configuration
    pub fn new() -> Self {
        Self::with_config(StaffConfig::default())
    }

    /// Create a detached staff with the given configuration
    pub fn with_config(config: StaffConfig) -> Self {
        Self {
            id: StaffId::generate(),
            part: None,
            config,
        }
    }

    /// Get staff id
    pub fn id(&self) -> StaffId {
        self.id
    }

    /// Get owning part (None while detached)
    pub fn part(&self) -> Option<PartId> {
        self.part
    }

    pub(crate) fn set_part(&mut self, part: Option<PartId>) {
        self.part = part;
    }

    /// Get configuration bundle
    pub fn config(&self) -> &StaffConfig {
        &self.config
    }

    pub(crate) fn config_mut(&mut self) -> &mut StaffConfig {
        &mut self.config
    }

    pub fn is_visible(&self) -> bool {
        self.config.visible
    }

    pub fn staff_type(&self) -> StaffType {
        self.config.staff_type
    }

    /// Check voice visibility; out-of-range voices read as hidden
    pub fn is_voice_visible(&self, voice: usize) -> bool {
        self.config.voices_visible.get(voice).copied().unwrap_or(false)
    }

    /// Builder: set staff type
    pub fn with_type(mut self, staff_type: StaffType) -> Self {
        self.config.staff_type = staff_type;
        self
    }

    /// Builder: set visibility
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.config.visible = visible;
        self
    }

    /// Builder: set small staff flag
    pub fn with_small(mut self, small: bool) -> Self {
        self.config.small = small;
        self
    }

    /// Builder: set cutaway flag
    pub fn with_cutaway(mut self, cutaway: bool) -> Self {
        self.config.cutaway = cutaway;
        self
    }
}

impl Default for Staff {
    fn default() -> Self {
        Self::new()
    }
}
