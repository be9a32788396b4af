// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Inbound commands from the presentation layer.
//!
//! A command arrives as an action code plus string arguments whose shape
//! was already checked by the caller. Only semantic validity (existence
//! of ids and presets) is decided here.

use tracing::debug;

use crate::catalog::{load_orders, InstrumentsRepository};
use crate::error::{PartsError, Result};
use crate::model::PartId;
use crate::order::ScoreOrder;
use crate::parts::NotationParts;
use crate::undo::UndoStack;

/// Action code applying a score order preset
pub const SET_ORDER: &str = "set-order";
/// Action code removing parts
pub const REMOVE_PARTS: &str = "remove-parts";
/// Action code flipping a part's visibility
pub const TOGGLE_PART_VISIBLE: &str = "toggle-part-visible";

/// Action that can be triggered from the parts panel
#[derive(Debug, Clone, PartialEq)]
pub enum PartsAction {
    /// Apply the score order preset with this id
    SetOrder(String),
    /// Remove these parts
    RemoveParts(Vec<PartId>),
    /// Show a hidden part or hide a shown one
    TogglePartVisible(PartId),
}

impl PartsAction {
    /// Build an action from its code and arguments
    pub fn parse(code: &str, args: &[&str]) -> Result<Self> {
        match code {
            SET_ORDER => match args {
                [order_id] => Ok(PartsAction::SetOrder(order_id.to_string())),
                _ => Err(PartsError::InvalidInput(format!("{} takes one order id", SET_ORDER))),
            },
            REMOVE_PARTS => args
                .iter()
                .map(|arg| parse_part_id(arg))
                .collect::<Result<Vec<_>>>()
                .map(PartsAction::RemoveParts),
            TOGGLE_PART_VISIBLE => match args {
                [part_id] => parse_part_id(part_id).map(PartsAction::TogglePartVisible),
                _ => Err(PartsError::InvalidInput(format!(
                    "{} takes one part id",
                    TOGGLE_PART_VISIBLE
                ))),
            },
            other => Err(PartsError::InvalidInput(format!("unknown action: {}", other))),
        }
    }

    /// Action code this action is sent under
    pub fn code(&self) -> &'static str {
        match self {
            PartsAction::SetOrder(_) => SET_ORDER,
            PartsAction::RemoveParts(_) => REMOVE_PARTS,
            PartsAction::TogglePartVisible(_) => TOGGLE_PART_VISIBLE,
        }
    }

    /// Check if the action changes the roster membership or order
    pub fn is_roster(&self) -> bool {
        matches!(self, PartsAction::SetOrder(_) | PartsAction::RemoveParts(_))
    }
}

fn parse_part_id(arg: &str) -> Result<PartId> {
    arg.parse()
        .map_err(|_| PartsError::InvalidInput(format!("not a part id: {}", arg)))
}

/// Run an action against the parts manager
pub fn dispatch<U: UndoStack>(
    parts: &mut NotationParts<U>,
    repository: &dyn InstrumentsRepository,
    action: &PartsAction,
) -> Result<()> {
    debug!(action = action.code(), "dispatching parts action");
    match action {
        PartsAction::SetOrder(order_id) => parts.set_score_order_by_id(repository, order_id),
        PartsAction::RemoveParts(part_ids) => {
            parts.remove_parts(part_ids);
            Ok(())
        }
        PartsAction::TogglePartVisible(part_id) => {
            let visible = parts.part(*part_id)?.is_visible();
            parts.set_part_visible(*part_id, !visible)
        }
    }
}

/// One entry of the score order menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderChoice {
    pub id: String,
    pub title: String,
    /// Preset currently applied to the score
    pub checked: bool,
}

/// Score order menu entries; empty when the repository fails
pub fn order_choices(
    repository: &dyn InstrumentsRepository,
    current: Option<&ScoreOrder>,
) -> Vec<OrderChoice> {
    let current_id = current.map(ScoreOrder::id);
    load_orders(repository)
        .into_iter()
        .map(|order| OrderChoice {
            checked: current_id == Some(order.id()),
            id: order.id().to_string(),
            title: order.name().to_string(),
        })
        .collect()
}
