use crate::components::{armored_damage, BossRuntime, EnemyStats, SmartTowerStats};
use crate::config::{default_ladder, DifficultyConfig, PlayerPerformance};
use crate::constants::*;
use crate::enums::{EnemyType, TowerAiType};
use crate::error::ConfigError;
use crate::types::{Position, Velocity};

#[test]
fn test_armored_damage_floor() {
    // Armor can never reduce a hit below the minimum.
    assert_eq!(armored_damage(40.0, 25.0), 15.0);
    assert_eq!(armored_damage(10.0, 25.0), MIN_DAMAGE);
    assert_eq!(armored_damage(26.0, 25.0), MIN_DAMAGE);
}

#[test]
fn test_health_fraction_clamped() {
    let mut runtime = BossRuntime::new(BOSS_MAX_HEALTH);
    assert!((runtime.health_fraction(BOSS_MAX_HEALTH) - 1.0).abs() < 1e-9);

    runtime.health = -50.0;
    assert_eq!(runtime.health_fraction(BOSS_MAX_HEALTH), 0.0);

    runtime.health = BOSS_MAX_HEALTH * 2.0;
    assert_eq!(runtime.health_fraction(BOSS_MAX_HEALTH), 1.0);
}

#[test]
fn test_position_distance_and_direction() {
    let a = Position::new(0.0, 0.0, 0.0);
    let b = Position::new(3.0, 4.0, 0.0);
    assert!((a.distance_to(&b) - 5.0).abs() < 1e-9);

    let dir = a.direction_to(&b).unwrap();
    assert!((dir.length() - 1.0).abs() < 1e-9);
    assert!(a.direction_to(&a).is_none(), "coincident positions have no direction");
}

#[test]
fn test_velocity_speed() {
    let v = Velocity::new(0.0, 3.0, 4.0);
    assert!((v.speed() - 5.0).abs() < 1e-9);
    assert!(Velocity::default().direction().is_none());
}

#[test]
fn test_default_ladder_is_valid() {
    let config = DifficultyConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.levels.len(), 4);
    assert_eq!(config.clamped_start(), 1);
}

#[test]
fn test_empty_ladder_rejected() {
    let config = DifficultyConfig {
        levels: Vec::new(),
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::EmptyLadder)));
}

#[test]
fn test_inverted_thresholds_rejected() {
    let config = DifficultyConfig {
        increase_threshold: 0.3,
        decrease_threshold: 0.7,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvertedThresholds { .. })
    ));
}

#[test]
fn test_config_round_trips_through_json() {
    let config = DifficultyConfig::default();
    let json = serde_json::to_string(&config).unwrap();
    let parsed = DifficultyConfig::from_json(&json).unwrap();
    assert_eq!(parsed.levels.len(), config.levels.len());
    assert_eq!(parsed.levels[2].name, "Hard");
}

#[test]
fn test_starting_index_clamped() {
    let config = DifficultyConfig {
        starting_index: 99,
        ..Default::default()
    };
    assert_eq!(config.clamped_start(), default_ladder().len() - 1);
}

#[test]
fn test_performance_score_weights() {
    let mut perf = PlayerPerformance::new(0.0);
    assert_eq!(perf.overall_score(), 0.0);

    // Saturate every component: score clamps to 1.0.
    perf.survival_time = PERFORMANCE_SURVIVAL_CAP * 2.0;
    perf.bosses_defeated = 20;
    perf.accuracy_rating = 1.0;
    perf.evasion_rating = 1.0;
    assert!((perf.overall_score() - 1.0).abs() < 1e-9);

    // Partial credit: only survival, capped at 300s.
    let mut survivor = PlayerPerformance::new(0.0);
    survivor.survival_time = 150.0;
    assert!((survivor.overall_score() - 0.15).abs() < 1e-9);
}

#[test]
fn test_performance_new_level_resets_clock() {
    let mut perf = PlayerPerformance::new(0.0);
    perf.survival_time = 42.0;
    perf.start_new_level();
    assert_eq!(perf.survival_time, 0.0);
    assert_eq!(perf.level_completion_times, vec![42.0]);
}

#[test]
fn test_enemy_presets() {
    assert_eq!(EnemyStats::default().enemy_type, EnemyType::Soldier);
    assert_eq!(EnemyStats::archer().enemy_type, EnemyType::Archer);
    // Guards shoot at range; their attack range matches the archer band.
    assert_eq!(EnemyStats::guard().attack_range, ENEMY_PREFERRED_DISTANCE);
}

#[test]
fn test_smart_tower_aim_thresholds() {
    let ambusher = SmartTowerStats::with_type(TowerAiType::Ambusher);
    let adaptive = SmartTowerStats::with_type(TowerAiType::Adaptive);
    assert!(ambusher.aim_threshold() > adaptive.aim_threshold());
}

#[test]
fn test_hysteresis_band_is_open() {
    // The acquisition band must be strictly wider on exit.
    assert!(ENEMY_LOSE_TARGET_RANGE > ENEMY_DETECTION_RANGE);
}
