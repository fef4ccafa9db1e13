//! Events emitted by the simulation toward host collaborators.
//!
//! The host drains these each tick and forwards them to its projectile,
//! effect, audio, and animation subsystems.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::Position;

/// One outward-facing effect requested by the combat core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CombatEvent {
    /// Spawn a projectile flying along `direction` at `speed`.
    ProjectileSpawned {
        owner: u32,
        origin: Position,
        direction: DVec3,
        speed: f64,
        damage: f64,
    },
    /// Melee strike that connected; the host applies the damage.
    MeleeHit { owner: u32, damage: f64 },
    /// Spawn a visual effect.
    EffectSpawned { kind: EffectKind, position: Position },
    /// Play one clip from the agent's cue set.
    AudioPlayed { owner: u32, cue: AudioCue, clip_index: u32 },
    /// Update an animation parameter on the agent's rig.
    AnimationParam { owner: u32, param: AnimParam, value: f64 },
    /// Boss state machine transition.
    BossStateChanged { owner: u32, from: BossState, to: BossState },
    /// Enemy state machine transition.
    EnemyStateChanged { owner: u32, from: EnemyState, to: EnemyState },
    /// The decision layer settled on a tactic.
    TacticChosen {
        owner: u32,
        tactic: BossTactic,
        from_cache: bool,
    },
    /// An agent died. Fired exactly once per agent.
    AgentDefeated { owner: u32, kind: AgentKind },
    /// The difficulty ladder moved to a new rung.
    DifficultyChanged {
        from_index: usize,
        to_index: usize,
        name: String,
    },
}
