//! Difficulty ladder and adaptation configuration.
//!
//! Supplied externally (deserialized from JSON) or built from defaults.
//! The ladder is validated once at engine construction; a bad ladder
//! disables adaptive difficulty rather than crashing the host.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ConfigError;

/// One rung on the difficulty ladder. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifficultyLevel {
    pub name: String,
    /// 1-10 scale.
    pub rating: u32,

    // Spawn budgets.
    pub max_enemies: u32,
    pub max_towers: u32,
    /// Seconds between staggered enemy respawns.
    pub spawn_delay: f64,
    pub enable_smart_towers: bool,

    // Multiplicative modifiers applied to live agents.
    pub enemy_health_multiplier: f64,
    pub enemy_damage_multiplier: f64,
    pub enemy_speed_multiplier: f64,
    /// 0-1 scale, added to tower accuracy / fire rate.
    pub tower_accuracy_bonus: f64,
    /// Seconds shaved off AI decision cadences (floored downstream).
    pub ai_cadence_bonus: f64,
}

impl DifficultyLevel {
    fn rung(name: &str, rating: u32) -> Self {
        Self {
            name: name.to_string(),
            rating,
            max_enemies: 10,
            max_towers: 3,
            spawn_delay: 2.0,
            enable_smart_towers: false,
            enemy_health_multiplier: 1.0,
            enemy_damage_multiplier: 1.0,
            enemy_speed_multiplier: 1.0,
            tower_accuracy_bonus: 0.0,
            ai_cadence_bonus: 0.0,
        }
    }
}

/// Full adaptation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifficultyConfig {
    pub levels: Vec<DifficultyLevel>,
    pub starting_index: usize,
    pub enabled: bool,
    pub adaptation_interval: f64,
    pub increase_threshold: f64,
    pub decrease_threshold: f64,
    pub max_changes_per_level: u32,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            levels: default_ladder(),
            starting_index: 1,
            enabled: true,
            adaptation_interval: DIFFICULTY_ADAPTATION_INTERVAL,
            increase_threshold: DIFFICULTY_INCREASE_THRESHOLD,
            decrease_threshold: DIFFICULTY_DECREASE_THRESHOLD,
            max_changes_per_level: MAX_DIFFICULTY_CHANGES_PER_LEVEL,
        }
    }
}

impl DifficultyConfig {
    /// Validate the ladder. The starting index is clamped, not rejected.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.levels.is_empty() {
            return Err(ConfigError::EmptyLadder);
        }
        if self.increase_threshold <= self.decrease_threshold {
            return Err(ConfigError::InvertedThresholds {
                increase: self.increase_threshold,
                decrease: self.decrease_threshold,
            });
        }
        Ok(())
    }

    pub fn clamped_start(&self) -> usize {
        self.starting_index.min(self.levels.len().saturating_sub(1))
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

/// Default four-rung ladder.
pub fn default_ladder() -> Vec<DifficultyLevel> {
    vec![
        DifficultyLevel {
            max_enemies: 5,
            max_towers: 2,
            enemy_health_multiplier: 0.8,
            enemy_damage_multiplier: 0.8,
            ..DifficultyLevel::rung("Easy", 3)
        },
        DifficultyLevel::rung("Normal", 5),
        DifficultyLevel {
            max_enemies: 14,
            max_towers: 4,
            enable_smart_towers: true,
            enemy_health_multiplier: 1.3,
            enemy_damage_multiplier: 1.2,
            enemy_speed_multiplier: 1.1,
            tower_accuracy_bonus: 0.1,
            ai_cadence_bonus: 2.0,
            ..DifficultyLevel::rung("Hard", 7)
        },
        DifficultyLevel {
            max_enemies: 20,
            max_towers: 5,
            spawn_delay: 1.0,
            enable_smart_towers: true,
            enemy_health_multiplier: 1.6,
            enemy_damage_multiplier: 1.5,
            enemy_speed_multiplier: 1.25,
            tower_accuracy_bonus: 0.15,
            ai_cadence_bonus: 4.0,
            ..DifficultyLevel::rung("Nightmare", 9)
        },
    ]
}

/// Cumulative player-performance sample for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerPerformance {
    pub survival_time: f64,
    pub enemies_defeated: u32,
    pub towers_destroyed: u32,
    pub bosses_defeated: u32,
    pub damage_received: f64,
    /// Host-reported hit accuracy, 0-1.
    pub accuracy_rating: f64,
    /// Host-reported damage avoidance, 0-1.
    pub evasion_rating: f64,
    pub session_start_secs: f64,
    pub level_completion_times: Vec<f64>,
}

impl PlayerPerformance {
    pub fn new(session_start_secs: f64) -> Self {
        Self {
            survival_time: 0.0,
            enemies_defeated: 0,
            towers_destroyed: 0,
            bosses_defeated: 0,
            damage_received: 0.0,
            accuracy_rating: 0.0,
            evasion_rating: 0.0,
            session_start_secs,
            level_completion_times: Vec::new(),
        }
    }

    /// Weighted overall performance score, clamped to [0, 1].
    pub fn overall_score(&self) -> f64 {
        let survival = (self.survival_time / PERFORMANCE_SURVIVAL_CAP).clamp(0.0, 1.0);
        let combat = (self.enemies_defeated as f64 * PERFORMANCE_KILL_WEIGHT
            + self.towers_destroyed as f64 * PERFORMANCE_TOWER_WEIGHT
            + self.bosses_defeated as f64 * PERFORMANCE_BOSS_WEIGHT)
            / PERFORMANCE_COMBAT_CAP;

        let score = survival * PERFORMANCE_SURVIVAL_WEIGHT
            + combat.clamp(0.0, 1.0) * PERFORMANCE_COMBAT_WEIGHT
            + self.accuracy_rating * PERFORMANCE_ACCURACY_WEIGHT
            + self.evasion_rating * PERFORMANCE_EVASION_WEIGHT;

        score.clamp(0.0, 1.0)
    }

    /// Close out a level: record its completion time and reset the
    /// survival clock.
    pub fn start_new_level(&mut self) {
        self.level_completion_times.push(self.survival_time);
        self.survival_time = 0.0;
    }
}
