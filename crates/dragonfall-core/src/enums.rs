//! Enumeration types used throughout the combat core.

use serde::{Deserialize, Serialize};

/// Agent category, used for identity and kill reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    Boss,
    Enemy,
    Tower,
}

/// Boss behavior archetype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossType {
    /// Rushes the target, high damage.
    Aggressive,
    /// Cover and strategic positioning.
    #[default]
    Tactical,
    /// Shields, healing, area denial.
    Defensive,
    /// Changes strategy based on observed behavior.
    Adaptive,
}

/// Boss state machine states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossState {
    /// One-shot entrance.
    #[default]
    Spawning,
    /// Looking for the target.
    Hunting,
    /// Active combat.
    Engaging,
    /// Low health, moving to a fallback point.
    Retreating,
    /// Casting the special ability; movement suspended.
    Channeling,
    /// Disabled by an external status effect.
    Stunned,
    /// Terminal.
    Defeated,
}

/// Tactics the boss decision layer can choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossTactic {
    AggressiveAttack,
    DefensiveRetreat,
    SpecialAbility,
    TacticalReposition,
    AreaDenial,
}

impl BossTactic {
    /// Stable name used for tactic-frequency bookkeeping.
    pub fn name(&self) -> &'static str {
        match self {
            BossTactic::AggressiveAttack => "aggressive_attack",
            BossTactic::DefensiveRetreat => "defensive_retreat",
            BossTactic::SpecialAbility => "special_ability",
            BossTactic::TacticalReposition => "tactical_reposition",
            BossTactic::AreaDenial => "area_denial",
        }
    }
}

/// Generic enemy behavioral variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyType {
    /// Melee combat, closes to attack range.
    #[default]
    Soldier,
    /// Ranged combat, holds a preferred-distance band.
    Archer,
    /// Stationary, rotates to face and shoots in range.
    Guard,
}

/// Enemy state machine states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyState {
    /// No target, no patrol route.
    #[default]
    Idle,
    /// Cycling waypoints.
    Patrol,
    /// Target acquired, maneuvering.
    Tracking,
    /// In combat.
    Attacking,
    /// Backing off to preferred distance.
    Retreating,
    /// Terminal.
    Dead,
}

/// Smart tower behavioral archetype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerAiType {
    /// Fire rate and prediction scale with observed behavior.
    #[default]
    Adaptive,
    /// Staggers fire against nearby peers.
    Coordinator,
    /// Maximum prediction accuracy and horizon.
    Predictor,
    /// Trades fire rate for damage, fires on non-evasive targets.
    Ambusher,
}

/// Top-level engine phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Constructed, waiting for StartEncounter.
    #[default]
    Idle,
    Active,
    Paused,
}

/// Audio cue sets an agent can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioCue {
    Alert,
    Attack,
    Special,
    Damage,
    Death,
    Taunt,
    Adaptation,
    TowerFire,
}

/// Visual effect kinds spawned by agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    MuzzleFlash,
    SpecialCast,
    LearningPulse,
    DespawnFlash,
}

/// Animation parameters exposed to the host's animation collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimParam {
    /// Continuous movement speed.
    Speed,
    /// Primary attack trigger.
    Attack,
    /// Special ability trigger.
    Special,
    /// Hit reaction trigger.
    Hit,
    /// Death flag.
    Dead,
}
