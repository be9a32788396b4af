// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Log output setup for the command line tool.
//!
//! The library only emits `tracing` events; installing a subscriber is
//! left to the binary. Initialization is idempotent and never panics.

use tracing::Level;

/// Maximum level written when `verbose` is requested
pub const VERBOSE_LEVEL: Level = Level::DEBUG;
/// Maximum level written otherwise
pub const DEFAULT_LEVEL: Level = Level::INFO;

/// Level selected by the verbose flag
pub fn log_level(verbose: bool) -> Level {
    if verbose {
        VERBOSE_LEVEL
    } else {
        DEFAULT_LEVEL
    }
}

/// Install a formatted stderr subscriber.
///
/// Returns false when a global subscriber was already installed.
pub fn init_logging(verbose: bool) -> bool {
    tracing_subscriber::fmt()
        .with_max_level(log_level(verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
