//! Commands sent from the host simulation loop to the combat core.
//!
//! Queued and processed at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::enums::AgentKind;
use crate::types::{Position, Velocity};

/// All host-facing operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HostCommand {
    // --- World feed ---
    /// Latest player pose from the host physics/flight layer.
    SetPlayerPose { position: Position, velocity: Velocity },

    // --- Agent interaction ---
    /// Apply raw damage to an agent (armor reduction happens inside).
    DamageAgent { agent: u32, amount: f64 },
    /// External status effect: hold the boss in Stunned.
    StunBoss { agent: u32 },
    /// Release the boss from Stunned.
    ReleaseBoss { agent: u32 },

    // --- Performance reporting ---
    /// The player destroyed an agent of the given kind.
    ReportKill { kind: AgentKind },
    ReportDamageReceived { amount: f64 },
    /// Player hit accuracy, 0-1.
    ReportAccuracy { value: f64 },
    /// Player damage avoidance, 0-1.
    ReportEvasion { value: f64 },

    // --- Session control ---
    /// Spawn the initial encounter for the current rung and go live.
    StartEncounter,
    /// Reset the per-level difficulty change budget and survival clock.
    StartNewLevel,
    Pause,
    Resume,
}
