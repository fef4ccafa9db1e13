//! Core types and definitions for the DRAGONFALL combat-AI decision core.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, commands, configuration, events, and constants.
//! It has no dependency on any runtime framework or ECS.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod types;

#[cfg(test)]
mod tests;
