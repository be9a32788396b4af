// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Error taxonomy for structural edits.

use thiserror::Error;

use crate::model::{InstrumentId, PartId, StaffId};

/// Failure of a structural operation.
///
/// Every variant is raised before the undo transaction opens, so a
/// failed call leaves the score untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartsError {
    /// The referenced part is not in the store
    #[error("part not found: {0}")]
    PartNotFound(PartId),
    /// The referenced staff is not in the store
    #[error("staff not found: {0}")]
    StaffNotFound(StaffId),
    /// The part has no instrument with this id in its timeline
    #[error("instrument {instrument} not found in {part}")]
    InstrumentNotFound { part: PartId, instrument: InstrumentId },
    /// Structurally empty or contradictory argument
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Ordering identifier the instrument repository does not know
    #[error("unknown score order: {0}")]
    UnknownOrder(String),
}

impl PartsError {
    /// Check if the error is one of the not-found variants
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PartsError::PartNotFound(_)
                | PartsError::StaffNotFound(_)
                | PartsError::InstrumentNotFound { .. }
        )
    }
}

/// Result alias for structural operations
pub type Result<T> = std::result::Result<T, PartsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PartsError::PartNotFound(PartId::from_raw(3));
        assert_eq!(err.to_string(), "part not found: part-3");
        assert!(err.is_not_found());

        let err = PartsError::InstrumentNotFound {
            part: PartId::from_raw(1),
            instrument: InstrumentId::new("tuba"),
        };
        assert_eq!(err.to_string(), "instrument tuba not found in part-1");

        let err = PartsError::UnknownOrder("jazz".into());
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "unknown score order: jazz");
    }
}
