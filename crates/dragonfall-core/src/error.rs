//! Error taxonomy for the combat core.
//!
//! Only initialization problems are hard errors; everything at tick
//! time is recovered locally (re-acquisition, heuristic fallbacks,
//! cache eviction) and never propagates to the host.

use thiserror::Error;

/// Fatal configuration problems detected at engine construction.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("difficulty ladder is empty")]
    EmptyLadder,

    #[error("increase threshold {increase} must exceed decrease threshold {decrease}")]
    InvertedThresholds { increase: f64, decrease: f64 },

    #[error("malformed configuration: {0}")]
    Malformed(#[from] serde_json::Error),
}
