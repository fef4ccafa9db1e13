//! ECS components for hecs entities.
//!
//! Components are plain data structs with no game logic.
//! Behavior lives in systems and in the dragonfall-ai crate.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::*;
use crate::types::{Position, Velocity};

/// Marks the tracked player entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlayerShip;

/// Marks a boss entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BossUnit;

/// Marks a generic enemy entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnemyUnit;

/// Marks a plain tower entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TowerUnit;

/// Marks a smart (networked) tower entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmartTowerUnit;

/// Stable identity handed to the host; hecs entities are not stable
/// across despawn/respawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u32);

/// Navigation request state. The movement system advances the entity
/// toward `destination` at `speed` and clears it on arrival.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavAgent {
    pub destination: Option<Position>,
    pub speed: f64,
    /// Distance to destination as of the last movement pass.
    pub remaining: f64,
}

impl NavAgent {
    pub fn request(&mut self, destination: Position, speed: f64) {
        self.remaining = f64::MAX;
        self.destination = Some(destination);
        self.speed = speed;
    }

    pub fn cancel(&mut self) {
        self.destination = None;
        self.remaining = 0.0;
    }

    pub fn pending(&self) -> bool {
        self.destination.is_some()
    }
}

/// Boss configuration. Loaded at spawn; mutated in place only by
/// difficulty modifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossStats {
    pub name: String,
    pub boss_type: BossType,
    pub max_health: f64,
    pub armor: f64,
    pub regeneration_rate: f64,
    pub decision_interval: f64,
    pub emergency_decision_interval: f64,
    pub move_speed: f64,
    pub combat_speed: f64,
    pub retreat_speed: f64,
    pub primary_damage: f64,
    pub special_damage: f64,
    pub primary_cooldown: f64,
    pub special_cooldown: f64,
    pub detection_range: f64,
    pub attack_range: f64,
    pub projectile_speed: f64,
}

impl Default for BossStats {
    fn default() -> Self {
        Self {
            name: "Lord Drakmoor".to_string(),
            boss_type: BossType::default(),
            max_health: BOSS_MAX_HEALTH,
            armor: BOSS_ARMOR,
            regeneration_rate: BOSS_REGEN_RATE,
            decision_interval: BOSS_DECISION_INTERVAL,
            emergency_decision_interval: BOSS_EMERGENCY_DECISION_INTERVAL,
            move_speed: BOSS_MOVE_SPEED,
            combat_speed: BOSS_COMBAT_SPEED,
            retreat_speed: BOSS_RETREAT_SPEED,
            primary_damage: BOSS_PRIMARY_DAMAGE,
            special_damage: BOSS_SPECIAL_DAMAGE,
            primary_cooldown: BOSS_PRIMARY_COOLDOWN,
            special_cooldown: BOSS_SPECIAL_COOLDOWN,
            detection_range: BOSS_DETECTION_RANGE,
            attack_range: BOSS_ATTACK_RANGE,
            projectile_speed: BOSS_PROJECTILE_SPEED,
        }
    }
}

/// Boss runtime state, owned exclusively by the boss systems.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossRuntime {
    pub state: BossState,
    pub health: f64,
    /// Seconds-of-sim-time of the last primary attack (f64::MIN = never).
    pub last_primary_secs: f64,
    pub last_special_secs: f64,
    pub last_decision_secs: f64,
    pub current_tactic: Option<BossTactic>,
}

impl BossRuntime {
    pub fn new(max_health: f64) -> Self {
        Self {
            state: BossState::Spawning,
            health: max_health,
            last_primary_secs: f64::MIN,
            last_special_secs: f64::MIN,
            last_decision_secs: f64::MIN,
            current_tactic: None,
        }
    }

    pub fn health_fraction(&self, max_health: f64) -> f64 {
        (self.health / max_health).clamp(0.0, 1.0)
    }

    pub fn special_ready(&self, now_secs: f64, cooldown: f64) -> bool {
        now_secs - self.last_special_secs >= cooldown
    }
}

/// Tactical layout assigned to a boss at spawn: candidate positions in
/// world space and projectile fire points relative to the boss.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BossArena {
    pub attack_positions: Vec<Position>,
    pub retreat_positions: Vec<Position>,
    /// Muzzle offsets relative to the boss position.
    pub fire_points: Vec<Position>,
}

/// Enemy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyStats {
    pub name: String,
    pub enemy_type: EnemyType,
    pub max_health: f64,
    pub armor: f64,
    pub detection_range: f64,
    pub lose_target_range: f64,
    pub move_speed: f64,
    pub run_speed: f64,
    pub attack_range: f64,
    pub preferred_distance: f64,
    pub attack_damage: f64,
    pub attack_cooldown: f64,
    pub projectile_speed: f64,
}

impl Default for EnemyStats {
    fn default() -> Self {
        Self {
            name: "Enemy Soldier".to_string(),
            enemy_type: EnemyType::default(),
            max_health: ENEMY_MAX_HEALTH,
            armor: ENEMY_ARMOR,
            detection_range: ENEMY_DETECTION_RANGE,
            lose_target_range: ENEMY_LOSE_TARGET_RANGE,
            move_speed: ENEMY_MOVE_SPEED,
            run_speed: ENEMY_RUN_SPEED,
            attack_range: ENEMY_ATTACK_RANGE,
            preferred_distance: ENEMY_PREFERRED_DISTANCE,
            attack_damage: ENEMY_ATTACK_DAMAGE,
            attack_cooldown: ENEMY_ATTACK_COOLDOWN,
            projectile_speed: ENEMY_PROJECTILE_SPEED,
        }
    }
}

impl EnemyStats {
    /// Preset for a ranged kiter.
    pub fn archer() -> Self {
        Self {
            name: "Enemy Archer".to_string(),
            enemy_type: EnemyType::Archer,
            ..Self::default()
        }
    }

    /// Preset for a stationary shooter.
    pub fn guard() -> Self {
        Self {
            name: "Enemy Guard".to_string(),
            enemy_type: EnemyType::Guard,
            attack_range: ENEMY_PREFERRED_DISTANCE,
            ..Self::default()
        }
    }
}

/// Enemy runtime state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyRuntime {
    pub state: EnemyState,
    pub health: f64,
    pub last_attack_secs: f64,
    pub patrol_index: usize,
    pub last_patrol_secs: f64,
}

impl EnemyRuntime {
    pub fn new(max_health: f64) -> Self {
        Self {
            state: EnemyState::Idle,
            health: max_health,
            last_attack_secs: f64::MIN,
            patrol_index: 0,
            last_patrol_secs: 0.0,
        }
    }
}

/// Optional patrol route for an enemy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatrolRoute {
    pub points: Vec<Position>,
    pub wait_secs: f64,
    /// Cycle waypoints in order; otherwise pick randomly.
    pub in_order: bool,
}

/// Plain tower configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TowerStats {
    pub detection_range: f64,
    pub fire_rate: f64,
    pub projectile_speed: f64,
    pub damage: f64,
    pub max_turn_speed: f64,
    /// Lead-predict the target instead of aiming at its current position.
    pub lead_target: bool,
}

impl Default for TowerStats {
    fn default() -> Self {
        Self {
            detection_range: TOWER_DETECTION_RANGE,
            fire_rate: TOWER_FIRE_RATE,
            projectile_speed: TOWER_PROJECTILE_SPEED,
            damage: TOWER_DAMAGE,
            max_turn_speed: TOWER_MAX_TURN_SPEED,
            lead_target: true,
        }
    }
}

/// Plain tower runtime state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TowerRuntime {
    /// Current aim direction (unit vector).
    pub aim: DVec3,
    pub health: f64,
    pub last_fire_secs: f64,
    pub engaged: bool,
}

impl Default for TowerRuntime {
    fn default() -> Self {
        Self {
            aim: DVec3::Z,
            health: TOWER_MAX_HEALTH,
            last_fire_secs: f64::MIN,
            engaged: false,
        }
    }
}

/// Smart tower configuration. `fire_rate`, `damage`,
/// `prediction_accuracy`, `max_prediction_time`, and
/// `adaptation_interval` are live parameters the adaptation pass and
/// difficulty modifiers adjust; `base_fire_rate`/`base_damage` stay
/// fixed so adjustments never compound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmartTowerStats {
    pub ai_type: TowerAiType,
    pub detection_range: f64,
    pub fire_rate: f64,
    pub base_fire_rate: f64,
    pub projectile_speed: f64,
    pub damage: f64,
    pub base_damage: f64,
    pub max_turn_speed: f64,
    pub learning_rate: f64,
    pub adaptation_interval: f64,
    pub coordination_range: f64,
    pub communication_interval: f64,
    pub prediction_accuracy: f64,
    pub max_prediction_time: f64,
    pub use_intercept_course: bool,
}

impl Default for SmartTowerStats {
    fn default() -> Self {
        Self {
            ai_type: TowerAiType::default(),
            detection_range: SMART_TOWER_DETECTION_RANGE,
            fire_rate: SMART_TOWER_FIRE_RATE,
            base_fire_rate: SMART_TOWER_FIRE_RATE,
            projectile_speed: SMART_TOWER_PROJECTILE_SPEED,
            damage: SMART_TOWER_DAMAGE,
            base_damage: SMART_TOWER_DAMAGE,
            max_turn_speed: SMART_TOWER_MAX_TURN_SPEED,
            learning_rate: SMART_TOWER_LEARNING_RATE,
            adaptation_interval: SMART_TOWER_ADAPTATION_INTERVAL,
            coordination_range: SMART_TOWER_COORDINATION_RANGE,
            communication_interval: SMART_TOWER_COMMUNICATION_INTERVAL,
            prediction_accuracy: SMART_TOWER_PREDICTION_ACCURACY,
            max_prediction_time: SMART_TOWER_MAX_PREDICTION_TIME,
            use_intercept_course: true,
        }
    }
}

impl SmartTowerStats {
    pub fn with_type(ai_type: TowerAiType) -> Self {
        Self {
            ai_type,
            ..Self::default()
        }
    }

    /// Aim-alignment cosine required before firing.
    pub fn aim_threshold(&self) -> f64 {
        match self.ai_type {
            TowerAiType::Ambusher => AMBUSHER_AIM_THRESHOLD,
            _ => SMART_TOWER_AIM_THRESHOLD,
        }
    }
}

/// One observed target movement sample.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MovementSample {
    pub position: Position,
    pub velocity: Velocity,
    pub altitude: f64,
    pub timestamp_secs: f64,
    pub was_evasive: bool,
}

/// Aggregates derived from a movement-history window.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BehaviorSummary {
    pub average_speed: f64,
    pub preferred_altitude: f64,
    /// Normalized dominant travel direction, zero when unknown.
    pub dominant_heading: DVec3,
    /// Fraction of samples flagged evasive, in [0, 1].
    pub evasion_ratio: f64,
}

/// A peer tower's broadcast snapshot, rebuilt each coordination cycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TowerCoordinationRecord {
    pub agent: AgentId,
    pub position: Position,
    pub is_engaged: bool,
}

/// Smart tower runtime state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmartTowerRuntime {
    pub aim: DVec3,
    pub health: f64,
    pub last_fire_secs: f64,
    pub engaged: bool,
    /// Bounded movement-history window of the target.
    pub history: Vec<MovementSample>,
    pub predicted_target: Position,
    pub behavior: BehaviorSummary,
    pub last_adaptation_secs: f64,
    pub last_coordination_secs: f64,
    /// Peer records within coordination range.
    pub peers: Vec<TowerCoordinationRecord>,
}

impl Default for SmartTowerRuntime {
    fn default() -> Self {
        Self {
            aim: DVec3::Z,
            health: SMART_TOWER_MAX_HEALTH,
            last_fire_secs: f64::MIN,
            engaged: false,
            history: Vec::new(),
            predicted_target: Position::default(),
            behavior: BehaviorSummary::default(),
            last_adaptation_secs: 0.0,
            last_coordination_secs: 0.0,
            peers: Vec::new(),
        }
    }
}

/// Apply the armored damage formula shared by every agent type.
pub fn armored_damage(raw: f64, armor: f64) -> f64 {
    (raw - armor).max(crate::constants::MIN_DAMAGE)
}
