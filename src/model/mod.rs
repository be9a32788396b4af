// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Score structure records.
//!
//! This module provides the plain data kept by the entity store:
//! - Parts: roster entries owning staves and an instrument timeline
//! - Instruments: assignments valid from a time marker onward
//! - Staves: notated lines with their configuration bundle
//!
//! Records reference each other through identifiers only.

pub mod instrument;
pub mod part;
pub mod staff;

pub use instrument::{DrumPitch, Drumset, Instrument};
pub use part::{initial_staff_type, Part, PartInstrument, TITLE_SEPARATOR};
pub use staff::{HideMode, Staff, StaffConfig, StaffType, StaffTypeGroup, VOICES};

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

macro_rules! entity_id {
    ($name:ident, $prefix:literal) => {
        /// Stable arena identifier
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(u64);

        impl $name {
            /// Allocate a fresh identifier
            pub fn generate() -> Self {
                Self(next_id())
            }

            /// Wrap a raw value (e.g. one parsed from a command argument)
            pub fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            /// Get the raw value
            pub fn raw(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let digits = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                digits
                    .parse::<u64>()
                    .map(Self)
                    .map_err(|_| format!("invalid {} id: {}", $prefix, s))
            }
        }
    };
}

entity_id!(PartId, "part");
entity_id!(StaffId, "staff");

/// Catalog identifier of an instrument (e.g. "violin")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentId(String);

impl InstrumentId {
    /// Create an instrument id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstrumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for InstrumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Address of a per-(part, instrument) staff list subscription
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstrumentKey {
    pub part_id: PartId,
    pub instrument_id: InstrumentId,
}

impl InstrumentKey {
    pub fn new(part_id: PartId, instrument_id: InstrumentId) -> Self {
        Self { part_id, instrument_id }
    }
}

/// Time marker inside a part's instrument timeline.
///
/// Always stored reduced with a positive denominator, so derived equality
/// agrees with the value ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fraction {
    numerator: i32,
    denominator: i32,
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    a = a.abs();
    b = b.abs();
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

impl Fraction {
    /// Score start
    pub const ZERO: Fraction = Fraction { numerator: 0, denominator: 1 };

    /// Create a reduced fraction.
    ///
    /// `None` for a zero denominator or when the reduced value does not fit in `i32`.
    pub fn new(numerator: i32, denominator: i32) -> Option<Self> {
        if denominator == 0 {
            return None;
        }
        let (numerator, denominator) = (i64::from(numerator), i64::from(denominator));
        let sign = if denominator < 0 { -1 } else { 1 };
        let divisor = gcd(numerator, denominator).max(1);
        Some(Self {
            numerator: i32::try_from(sign * numerator / divisor).ok()?,
            denominator: i32::try_from(sign * denominator / divisor).ok()?,
        })
    }

    /// Whole number of measures-style marker
    pub fn whole(value: i32) -> Self {
        Self { numerator: value, denominator: 1 }
    }

    pub fn numerator(&self) -> i32 {
        self.numerator
    }

    pub fn denominator(&self) -> i32 {
        self.denominator
    }
}

impl Default for Fraction {
    fn default() -> Self {
        Fraction::ZERO
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        let lhs = self.numerator as i64 * other.denominator as i64;
        let rhs = other.numerator as i64 * self.denominator as i64;
        lhs.cmp(&rhs)
    }
}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl FromStr for Fraction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (num, den) = match s.split_once('/') {
            Some((num, den)) => (num.trim(), den.trim()),
            None => (s, "1"),
        };
        let num: i32 = num.parse().map_err(|_| format!("invalid fraction: {}", s))?;
        let den: i32 = den.parse().map_err(|_| format!("invalid fraction: {}", s))?;
        if den == 0 {
            return Err(format!("zero denominator: {}", s));
        }
        Fraction::new(num, den).ok_or_else(|| format!("fraction out of range: {}", s))
    }
}

impl TryFrom<String> for Fraction {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Fraction> for String {
    fn from(fraction: Fraction) -> Self {
        fraction.to_string()
    }
}

/// Accidental preference used for note entry and key display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SharpFlat {
    /// Follow the key signature
    Auto,
    /// Prefer sharps
    Sharps,
    /// Prefer flats
    Flats,
}

impl Default for SharpFlat {
    fn default() -> Self {
        SharpFlat::Auto
    }
}

/// Written-to-sounding transposition of a part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Interval {
    /// Steps on the staff (e.g. -1 for a B-flat instrument)
    #[serde(default)]
    pub diatonic: i8,
    /// Semitones (e.g. -2 for a B-flat instrument)
    #[serde(default)]
    pub chromatic: i8,
}

impl Interval {
    pub fn new(diatonic: i8, chromatic: i8) -> Self {
        Self { diatonic, chromatic }
    }

    /// Check if the interval is concert pitch
    pub fn is_zero(&self) -> bool {
        self.diatonic == 0 && self.chromatic == 0
    }
}
