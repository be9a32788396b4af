// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Instrument repository.
//!
//! The repository supplies the known instruments and the named score
//! order presets. It is queried synchronously and injected wherever it
//! is needed; a failing repository means "no orders available".

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::error;

use crate::config::CatalogFile;
use crate::model::Instrument;
use crate::order::ScoreOrder;

/// Catalog loading failures
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog: {0}")]
    Parse(String),

    #[error("catalog defines no instruments and no orders")]
    Empty,
}

/// Resolved catalog contents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstrumentsMeta {
    pub instruments: Vec<Instrument>,
    pub score_orders: Vec<ScoreOrder>,
}

impl InstrumentsMeta {
    pub fn new(instruments: Vec<Instrument>, score_orders: Vec<ScoreOrder>) -> Self {
        Self { instruments, score_orders }
    }

    /// Look up an instrument by catalog id
    pub fn instrument(&self, id: &str) -> Option<&Instrument> {
        self.instruments.iter().find(|i| i.id().as_str() == id)
    }

    /// Look up a score order preset by id
    pub fn score_order(&self, id: &str) -> Option<&ScoreOrder> {
        self.score_orders.iter().find(|o| o.id() == id)
    }
}

/// Source of instruments and score order presets
pub trait InstrumentsRepository {
    fn instruments_meta(&self) -> Result<InstrumentsMeta, CatalogError>;
}

/// Repository over an in-memory catalog
#[derive(Debug, Clone, Default)]
pub struct StaticInstrumentsRepository {
    meta: InstrumentsMeta,
}

impl StaticInstrumentsRepository {
    pub fn new(meta: InstrumentsMeta) -> Self {
        Self { meta }
    }
}

impl InstrumentsRepository for StaticInstrumentsRepository {
    fn instruments_meta(&self) -> Result<InstrumentsMeta, CatalogError> {
        Ok(self.meta.clone())
    }
}

/// Repository backed by a catalog file, re-read on every query
#[derive(Debug, Clone)]
pub struct FileInstrumentsRepository {
    path: PathBuf,
}

impl FileInstrumentsRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_catalog(&self) -> Result<CatalogFile, CatalogError> {
        let text = fs::read_to_string(&self.path).map_err(|source| CatalogError::Io {
            path: self.path.clone(),
            source,
        })?;
        let is_toml = self.path.extension().map(|ext| ext == "toml").unwrap_or(false);
        if is_toml {
            toml::from_str(&text).map_err(|e| CatalogError::Parse(e.to_string()))
        } else {
            serde_yaml::from_str(&text).map_err(|e| CatalogError::Parse(e.to_string()))
        }
    }
}

impl InstrumentsRepository for FileInstrumentsRepository {
    fn instruments_meta(&self) -> Result<InstrumentsMeta, CatalogError> {
        let catalog = self.read_catalog()?;
        if catalog.instruments.is_empty() && catalog.orders.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(catalog.to_meta())
    }
}

/// Score order presets, or none when the repository fails
pub fn load_orders(repository: &dyn InstrumentsRepository) -> Vec<ScoreOrder> {
    match repository.instruments_meta() {
        Ok(meta) => meta.score_orders,
        Err(e) => {
            error!(error = %e, "failed to load score orders");
            Vec::new()
        }
    }
}
