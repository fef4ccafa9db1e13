//! Simulation engine for DRAGONFALL.
//!
//! Owns the hecs ECS world, runs the combat-AI systems at a fixed tick
//! rate, and produces `TickSnapshot`s for the host. Completely
//! headless, enabling deterministic testing.

pub mod engine;
pub mod systems;
pub mod timers;
pub mod world_setup;

pub use engine::{SimConfig, SimulationEngine};

#[cfg(test)]
mod tests;
