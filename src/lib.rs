// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Structural model of a multi-instrument score.
//!
//! This crate provides:
//! - An arena of parts, instruments and staves with stable ids
//! - Structural edits running as reentrant undo transactions
//! - Scoped change notifications delivered over channels
//! - Score order presets loaded from an instrument catalog

pub mod catalog;
pub mod command;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod notify;
pub mod order;
pub mod parts;
pub mod store;
pub mod undo;

pub use catalog::{
    FileInstrumentsRepository, InstrumentsMeta, InstrumentsRepository, StaticInstrumentsRepository,
};
pub use error::{PartsError, Result};
pub use model::{Instrument, InstrumentId, Part, PartId, PartInstrument, Staff, StaffId};
pub use notify::Subscription;
pub use order::ScoreOrder;
pub use parts::{InsertMode, NotationParts};
pub use store::EntityStore;
pub use undo::{NoUndo, UndoHistory, UndoStack};
