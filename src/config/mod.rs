// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration files for scoreparts.
//!
//! This module provides data structures for loading the instrument
//! catalog (instruments and score order presets) and score rosters
//! from YAML, plus TOML for catalogs.

pub mod watcher;

pub use watcher::{validate_config, ConfigEvent, ConfigWatcher};

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::InstrumentsMeta;
use crate::model::{Drumset, Fraction, Instrument, Interval, Part, SharpFlat, StaffType};
use crate::order::ScoreOrder;
use crate::store::{EntityStore, Excerpt};

/// Group keyword standing for the soloist slot of an order
pub const SOLOISTS_GROUP: &str = "soloists";

/// Instrument catalog with score order presets
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CatalogFile {
    /// Known instruments
    #[serde(default)]
    pub instruments: Vec<InstrumentDef>,
    /// Score order presets
    #[serde(default)]
    pub orders: Vec<OrderDef>,
}

impl CatalogFile {
    /// Load a catalog from a YAML file (or TOML when the extension is `.toml`)
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {:?}", path))?;
        if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
            Self::from_toml(&contents)
        } else {
            Self::from_yaml(&contents)
        }
    }

    /// Parse a catalog from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse catalog YAML")
    }

    /// Parse a catalog from TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse catalog TOML")
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize catalog to YAML")
    }

    /// Save catalog to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write catalog file: {:?}", path.as_ref()))
    }

    /// Build the instrument records
    pub fn instruments(&self) -> Vec<Instrument> {
        self.instruments.iter().map(InstrumentDef::to_instrument).collect()
    }

    /// Build the score order presets
    pub fn score_orders(&self) -> Vec<ScoreOrder> {
        self.orders.iter().map(OrderDef::to_order).collect()
    }

    /// Resolve the catalog into instrument and order records
    pub fn to_meta(&self) -> InstrumentsMeta {
        InstrumentsMeta::new(self.instruments(), self.score_orders())
    }
}

/// Catalog entry for one instrument
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstrumentDef {
    /// Catalog id (e.g. "violin")
    pub id: String,
    /// Long name
    pub name: String,
    /// Short name
    #[serde(default)]
    pub abbreviation: String,
    /// Family used by score orders
    #[serde(default)]
    pub family: String,
    /// Staves a new part gets
    #[serde(default = "default_staves")]
    pub staves: usize,
    /// Staff type preset for new staves
    #[serde(default)]
    pub staff_type: StaffType,
    /// Percussion mapping (unpitched instruments only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drumset: Option<Drumset>,
}

fn default_staves() -> usize {
    1
}

impl InstrumentDef {
    /// Build the instrument record
    pub fn to_instrument(&self) -> Instrument {
        let mut instrument = Instrument::new(self.id.as_str(), self.name.as_str())
            .with_abbreviation(self.abbreviation.as_str())
            .with_family(self.family.as_str())
            .with_staff_count(self.staves)
            .with_staff_type(self.staff_type);
        instrument.set_drumset(self.drumset.clone());
        instrument
    }
}

/// Catalog entry for one score order preset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDef {
    /// Preset id (e.g. "orchestral")
    pub id: String,
    /// Display name
    pub name: String,
    /// Families in display order; "soloists" marks the soloist slot
    #[serde(default)]
    pub groups: Vec<String>,
    /// Instrument id -> family remapping
    #[serde(default)]
    pub overrides: BTreeMap<String, String>,
}

impl OrderDef {
    /// Build the score order
    pub fn to_order(&self) -> ScoreOrder {
        let mut order = ScoreOrder::new(self.id.as_str(), self.name.as_str());
        for group in &self.groups {
            order = if group == SOLOISTS_GROUP {
                order.with_soloists()
            } else {
                order.with_family(group.as_str())
            };
        }
        for (instrument, family) in &self.overrides {
            order = order.with_override(instrument.as_str(), family.as_str());
        }
        order
    }
}

/// Score roster file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreFile {
    /// Score-level settings
    pub score: ScoreConfig,
    /// Parts in roster order
    #[serde(default)]
    pub parts: Vec<PartDef>,
    /// Linked-part views
    #[serde(default)]
    pub excerpts: Vec<ExcerptDef>,
}

impl ScoreFile {
    /// Load a score roster from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read score file: {:?}", path.as_ref()))?;
        Self::from_yaml(&contents)
    }

    /// Parse a score roster from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse score YAML")
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize score to YAML")
    }

    /// Build an entity store, resolving instruments and the order against the catalog
    pub fn build_store(&self, meta: &InstrumentsMeta) -> Result<EntityStore> {
        let lookup = |id: &str| {
            meta.instrument(id)
                .cloned()
                .ok_or_else(|| anyhow!("Unknown instrument in score: {}", id))
        };

        let mut store = EntityStore::new();
        let mut ids = Vec::with_capacity(self.parts.len());
        for def in &self.parts {
            let instrument = lookup(&def.instrument)?.with_soloist(def.soloist);
            let (mut part, staves) = Part::from_instrument(instrument);
            for change in &def.changes {
                if change.at <= Fraction::ZERO {
                    bail!("Instrument change at {} must come after the score start", change.at);
                }
                let next = lookup(&change.instrument)?.with_soloist(def.soloist);
                if part.instrument_slot(next.id()).is_some_and(|tick| tick != change.at) {
                    bail!("Instrument {} appears twice in one part", next.id());
                }
                part.set_instrument(change.at, next);
            }
            if let Some(name) = &def.name {
                part.set_name(name.as_str());
            }
            part.set_visible(def.visible);
            part.set_sharp_flat(def.sharp_flat);
            part.set_transposition(def.transposition);
            ids.push(store.insert_part(part, staves)?);
        }

        for excerpt in &self.excerpts {
            let parts = excerpt
                .parts
                .iter()
                .map(|index| {
                    ids.get(*index).copied().ok_or_else(|| {
                        anyhow!("Excerpt {} references part {}", excerpt.name, index)
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            store.add_excerpt(Excerpt::new(excerpt.name.as_str(), parts));
        }

        if let Some(order_id) = &self.score.order {
            let order = meta
                .score_order(order_id)
                .cloned()
                .ok_or_else(|| anyhow!("Unknown score order: {}", order_id))?;
            let sorted = order.sort(store.part_list());
            store.set_part_order(sorted);
            store.set_score_order(Some(order));
        }

        Ok(store)
    }
}

/// Score-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreConfig {
    /// Score title
    #[serde(default = "default_title")]
    pub title: String,
    /// Score order preset applied on load (if any)
    #[serde(default)]
    pub order: Option<String>,
}

fn default_title() -> String {
    "Untitled".to_string()
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            order: None,
        }
    }
}

/// One part of a score roster
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartDef {
    /// Catalog instrument at the score start
    pub instrument: String,
    /// Custom title (derived from instruments when absent)
    #[serde(default)]
    pub name: Option<String>,
    /// Played by a soloist
    #[serde(default)]
    pub soloist: bool,
    /// Shown in the score
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Accidental preference
    #[serde(default)]
    pub sharp_flat: SharpFlat,
    /// Written-to-sounding transposition
    #[serde(default)]
    pub transposition: Interval,
    /// Instrument changes after the start
    #[serde(default)]
    pub changes: Vec<InstrumentChangeDef>,
}

fn default_visible() -> bool {
    true
}

/// Instrument change inside a part
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstrumentChangeDef {
    /// Marker the change takes effect at ("n/d")
    pub at: Fraction,
    /// Catalog instrument
    pub instrument: String,
}

/// Linked-part view of a roster
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExcerptDef {
    /// Excerpt name
    pub name: String,
    /// Indices into the score's part list
    #[serde(default)]
    pub parts: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::ScoreGroup;

    const CATALOG: &str = r#"
instruments:
  - id: violin
    name: Violin
    abbreviation: Vln.
    family: violins
  - id: violoncello
    name: Violoncello
    abbreviation: Vc.
    family: violoncellos
  - id: piano
    name: Piano
    family: keyboards
    staves: 2
  - id: snare
    name: Snare Drum
    family: percussion
    staff_type: percussion1_line
    drumset:
      38:
        name: Snare
        line: 4

orders:
  - id: orchestral
    name: Orchestral
    groups: [keyboards, soloists, violins, violoncellos]
  - id: custom
    name: Custom
    groups: [violoncellos, violins]
    overrides:
      piano: violoncellos
"#;

    #[test]
    fn test_parse_catalog() {
        let catalog = CatalogFile::from_yaml(CATALOG).unwrap();
        assert_eq!(catalog.instruments.len(), 4);
        assert_eq!(catalog.instruments[2].staves, 2);
        assert_eq!(catalog.instruments[0].staves, 1);

        let instruments = catalog.instruments();
        assert_eq!(instruments[0].abbreviation(), "Vln.");
        assert!(instruments[3].is_percussion());
        assert_eq!(instruments[3].staff_type(), StaffType::Percussion1Line);
        assert_eq!(instruments[3].drumset().unwrap().pitch(38).unwrap().line, 4);
    }

    #[test]
    fn test_parse_orders() {
        let catalog = CatalogFile::from_yaml(CATALOG).unwrap();
        let orders = catalog.score_orders();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].groups()[1], ScoreGroup::Soloists);
        assert_eq!(orders[0].groups()[2], ScoreGroup::Family("violins".into()));

        let piano = catalog.instruments()[2].clone();
        assert_eq!(orders[1].family_of(&piano), "violoncellos");
    }

    #[test]
    fn test_parse_toml_catalog() {
        let text = r#"
[[instruments]]
id = "flute"
name = "Flute"
family = "flutes"

[[orders]]
id = "winds"
name = "Winds"
groups = ["flutes"]
"#;
        let catalog = CatalogFile::from_toml(text).unwrap();
        assert_eq!(catalog.instruments[0].name, "Flute");
        assert_eq!(catalog.orders[0].groups, vec!["flutes".to_string()]);
    }

    #[test]
    fn test_build_store() {
        let catalog = CatalogFile::from_yaml(CATALOG).unwrap();
        let yaml = r#"
score:
  title: "Duo"
parts:
  - instrument: violoncello
  - instrument: violin
    name: "Violin I"
    sharp_flat: flats
    transposition:
      diatonic: 0
      chromatic: 12
    changes:
      - at: "8/1"
        instrument: piano
excerpts:
  - name: "Violin"
    parts: [1]
"#;
        let score = ScoreFile::from_yaml(yaml).unwrap();
        let store = score.build_store(&catalog.to_meta()).unwrap();

        let parts = store.part_list();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].name(), "Violoncello");
        assert_eq!(parts[1].name(), "Violin I");
        assert!(parts[1].has_custom_name());
        assert_eq!(parts[1].sharp_flat(), SharpFlat::Flats);
        assert_eq!(parts[1].transposition().chromatic, 12);
        assert_eq!(parts[1].instruments().len(), 2);
        assert_eq!(store.excerpts()[0].parts(), &[parts[1].id()]);
        assert!(store.check_invariants().is_ok());
    }

    #[test]
    fn test_build_store_applies_order() {
        let catalog = CatalogFile::from_yaml(CATALOG).unwrap();
        let yaml = r#"
score:
  order: orchestral
parts:
  - instrument: violoncello
  - instrument: violin
  - instrument: piano
"#;
        let store = ScoreFile::from_yaml(yaml).unwrap().build_store(&catalog.to_meta()).unwrap();
        let names: Vec<&str> = store.part_list().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["Piano", "Violin", "Violoncello"]);
        assert_eq!(store.score_order().unwrap().id(), "orchestral");
    }

    #[test]
    fn test_build_store_unknown_instrument() {
        let catalog = CatalogFile::from_yaml(CATALOG).unwrap();
        let score = ScoreFile::from_yaml("score: {}\nparts:\n  - instrument: kazoo\n").unwrap();
        assert!(score.build_store(&catalog.to_meta()).is_err());
    }

    fn score_with_change(at: &str) -> String {
        format!(
            concat!(
                "score: {{}}\n",
                "parts:\n",
                "  - instrument: violin\n",
                "    changes:\n",
                "      - at: \"{}\"\n",
                "        instrument: violoncello\n",
            ),
            at
        )
    }

    #[test]
    fn test_build_store_rejects_early_changes() {
        let meta = CatalogFile::from_yaml(CATALOG).unwrap().to_meta();
        for at in ["0/1", "-1/1"] {
            let score = ScoreFile::from_yaml(&score_with_change(at)).unwrap();
            assert!(score.build_store(&meta).is_err(), "change at {} accepted", at);
        }
        let score = ScoreFile::from_yaml(&score_with_change("1/4")).unwrap();
        assert!(score.build_store(&meta).is_ok());

        let repeated =
            score_with_change("1/4").replace("instrument: violoncello", "instrument: violin");
        let score = ScoreFile::from_yaml(&repeated).unwrap();
        assert!(score.build_store(&meta).is_err());
    }

    #[test]
    fn test_out_of_range_marker_is_a_parse_error() {
        assert!(ScoreFile::from_yaml(&score_with_change("1/-2147483648")).is_err());
        assert!(ScoreFile::from_yaml(&score_with_change("-2147483648/2")).is_ok());
    }

    #[test]
    fn test_default_values() {
        let score = ScoreFile::from_yaml("score: {}\nparts:\n  - instrument: violin\n").unwrap();
        assert_eq!(score.score.title, "Untitled");
        assert!(score.score.order.is_none());
        assert!(score.parts[0].visible);
        assert_eq!(score.parts[0].sharp_flat, SharpFlat::Auto);
        assert!(score.parts[0].transposition.is_zero());
    }

    #[test]
    fn test_round_trip() {
        let original = CatalogFile::from_yaml(CATALOG).unwrap();
        let yaml = original.to_yaml().unwrap();
        let parsed = CatalogFile::from_yaml(&yaml).unwrap();
        assert_eq!(original, parsed);
    }
}
