//! Combat AI for DRAGONFALL.
//!
//! Pure decision logic with no ECS dependency: player-behavior
//! profiling, cached tactical decisions, target prediction, and the
//! generic enemy state machine. The sim crate feeds these functions
//! plain data and applies their outputs to the world.

pub mod cache;
pub mod decision;
pub mod enemy;
pub mod prediction;
pub mod profile;
