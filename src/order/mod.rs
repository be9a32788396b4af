// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Score orders: named conventions for ranking parts.
//!
//! An order lists instrument families (and optionally a soloist slot).
//! Parts are ranked by the family of their primary instrument and
//! stably sorted, so parts whose family the order does not list keep
//! their prior relative position after every listed family.

use std::collections::BTreeMap;

use crate::model::{Instrument, InstrumentId, Part, PartId};

/// One slot of a score order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreGroup {
    /// Instruments of this family
    Family(String),
    /// Every soloist part, regardless of family
    Soloists,
}

/// Position of a part under an order: (group index, soloist-first tiebreak)
pub type Rank = (usize, u8);

const UNRANKED: Rank = (usize::MAX, 1);

/// A named ordering preset supplied by the instrument repository
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreOrder {
    /// Preset id (e.g. "orchestral")
    id: String,
    /// Display name
    name: String,
    /// Groups in display order
    groups: Vec<ScoreGroup>,
    /// Instrument -> family remapping specific to this order
    family_overrides: BTreeMap<InstrumentId, String>,
    /// Parts were moved manually after the order was applied
    customized: bool,
}

impl ScoreOrder {
    /// Create an empty order
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            groups: Vec::new(),
            family_overrides: BTreeMap::new(),
            customized: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn groups(&self) -> &[ScoreGroup] {
        &self.groups
    }

    /// Check if the roster was rearranged by hand after applying this order
    pub fn is_customized(&self) -> bool {
        self.customized
    }

    pub fn set_customized(&mut self, customized: bool) {
        self.customized = customized;
    }

    /// Builder: append a family group
    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.groups.push(ScoreGroup::Family(family.into()));
        self
    }

    /// Builder: append the soloist slot
    pub fn with_soloists(mut self) -> Self {
        self.groups.push(ScoreGroup::Soloists);
        self
    }

    /// Builder: remap an instrument to another family
    pub fn with_override(
        mut self,
        instrument: impl Into<InstrumentId>,
        family: impl Into<String>,
    ) -> Self {
        self.family_overrides.insert(instrument.into(), family.into());
        self
    }

    /// Family an instrument is ranked under
    pub fn family_of<'a>(&'a self, instrument: &'a Instrument) -> &'a str {
        self.family_overrides
            .get(instrument.id())
            .map(String::as_str)
            .unwrap_or_else(|| instrument.family())
    }

    fn family_index(&self, family: &str) -> Option<usize> {
        self.groups
            .iter()
            .position(|g| matches!(g, ScoreGroup::Family(f) if f == family))
    }

    fn soloists_index(&self) -> Option<usize> {
        self.groups.iter().position(|g| *g == ScoreGroup::Soloists)
    }

    /// Rank of a part; unresolved families rank after every group
    pub fn rank(&self, part: &Part) -> Rank {
        let Some(instrument) = part.primary_instrument() else {
            return UNRANKED;
        };
        let soloist = part.is_soloist();
        if soloist {
            if let Some(index) = self.soloists_index() {
                return (index, 0);
            }
        }
        match self.family_index(self.family_of(instrument)) {
            Some(index) => (index, if soloist { 0 } else { 1 }),
            None => UNRANKED,
        }
    }

    /// Stable sort of `parts` (given in current roster order)
    pub fn sort<'a>(&self, parts: impl IntoIterator<Item = &'a Part>) -> Vec<PartId> {
        let mut ranked: Vec<(Rank, PartId)> =
            parts.into_iter().map(|part| (self.rank(part), part.id())).collect();
        ranked.sort_by_key(|(rank, _)| *rank);
        ranked.into_iter().map(|(_, id)| id).collect()
    }

    /// Check if `parts` (in roster order) already conform to this order
    pub fn is_sorted<'a>(&self, parts: impl IntoIterator<Item = &'a Part>) -> bool {
        let ranks: Vec<Rank> = parts.into_iter().map(|part| self.rank(part)).collect();
        ranks.windows(2).all(|pair| pair[0] <= pair[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(id: &str, family: &str) -> Part {
        Part::new(Instrument::new(id, id).with_family(family))
    }

    fn orchestral() -> ScoreOrder {
        ScoreOrder::new("orchestral", "Orchestral")
            .with_family("flutes")
            .with_family("horns")
            .with_soloists()
            .with_family("violins")
            .with_family("violoncellos")
    }

    #[test]
    fn test_sort_by_family() {
        let cello = part("cello", "violoncellos");
        let violin = part("violin", "violins");
        let flute = part("flute", "flutes");

        let order = orchestral();
        let sorted = order.sort([&cello, &violin, &flute]);
        assert_eq!(sorted, vec![flute.id(), violin.id(), cello.id()]);
        assert!(!order.is_sorted([&cello, &violin, &flute]));
        assert!(order.is_sorted([&flute, &violin, &cello]));
    }

    #[test]
    fn test_unknown_families_keep_prior_order() {
        let kazoo = part("kazoo", "novelty");
        let cello = part("cello", "violoncellos");
        let theremin = part("theremin", "electronic");

        let sorted = orchestral().sort([&kazoo, &cello, &theremin]);
        assert_eq!(sorted, vec![cello.id(), kazoo.id(), theremin.id()]);
    }

    #[test]
    fn test_ties_keep_original_index() {
        let first = part("violin", "violins");
        let second = part("violin", "violins");
        let sorted = orchestral().sort([&second, &first]);
        assert_eq!(sorted, vec![second.id(), first.id()]);
    }

    #[test]
    fn test_soloist_slot() {
        let violin = part("violin", "violins");
        let solo = Part::new(
            Instrument::new("violin", "Violin")
                .with_family("violins")
                .with_soloist(true),
        );
        let horn = part("horn", "horns");

        // Order with a soloist slot pins soloists between horns and violins
        let sorted = orchestral().sort([&violin, &solo, &horn]);
        assert_eq!(sorted, vec![horn.id(), solo.id(), violin.id()]);

        // Without the slot soloists lead their own family
        let plain = ScoreOrder::new("plain", "Plain").with_family("horns").with_family("violins");
        let sorted = plain.sort([&violin, &horn, &solo]);
        assert_eq!(sorted, vec![horn.id(), solo.id(), violin.id()]);
    }

    #[test]
    fn test_family_override() {
        let piano = part("piano", "keyboards");
        let violin = part("violin", "violins");

        let order = ScoreOrder::new("custom", "Custom")
            .with_family("violins")
            .with_family("flutes")
            .with_override("piano", "flutes");
        assert_eq!(order.family_of(piano.primary_instrument().unwrap()), "flutes");
        assert_eq!(order.sort([&piano, &violin]), vec![violin.id(), piano.id()]);
    }
}
