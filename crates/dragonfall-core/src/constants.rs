//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 30;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Boss ---

/// Boss starting health.
pub const BOSS_MAX_HEALTH: f64 = 500.0;

/// Boss armor (flat damage reduction).
pub const BOSS_ARMOR: f64 = 25.0;

/// Health regenerated per second while below max health.
pub const BOSS_REGEN_RATE: f64 = 2.0;

/// Normal tactical-decision interval (seconds).
pub const BOSS_DECISION_INTERVAL: f64 = 12.0;

/// Decision interval when health drops below the emergency fraction.
pub const BOSS_EMERGENCY_DECISION_INTERVAL: f64 = 5.0;

/// Health fraction below which the emergency cadence applies.
pub const BOSS_EMERGENCY_HEALTH_FRACTION: f64 = 0.25;

/// Floor for the decision interval after difficulty modifiers (seconds).
pub const BOSS_DECISION_INTERVAL_FLOOR: f64 = 3.0;

/// Ticks between requesting tactic synthesis and its result landing.
/// Models a decision backend that may take longer than one tick.
pub const BOSS_DECISION_LATENCY_TICKS: u64 = 3;

/// Boss movement speeds (units/s).
pub const BOSS_MOVE_SPEED: f64 = 8.0;
pub const BOSS_COMBAT_SPEED: f64 = 12.0;
pub const BOSS_RETREAT_SPEED: f64 = 15.0;

/// Boss combat tuning.
pub const BOSS_PRIMARY_DAMAGE: f64 = 40.0;
pub const BOSS_SPECIAL_DAMAGE: f64 = 80.0;
pub const BOSS_PRIMARY_COOLDOWN: f64 = 3.0;
pub const BOSS_SPECIAL_COOLDOWN: f64 = 8.0;
pub const BOSS_DETECTION_RANGE: f64 = 60.0;
pub const BOSS_ATTACK_RANGE: f64 = 25.0;
pub const BOSS_PROJECTILE_SPEED: f64 = 30.0;

/// Duration of the special-ability channel (seconds).
pub const BOSS_CHANNEL_DURATION: f64 = 2.0;

/// Stagger between successive area-denial attacks (seconds).
pub const BOSS_AREA_ATTACK_STAGGER: f64 = 0.3;

/// Remaining-distance threshold at which a retreat counts as arrived.
pub const BOSS_RETREAT_ARRIVE_DISTANCE: f64 = 2.0;

/// Fraction of attack range treated as the optimal firing distance
/// when scoring candidate attack positions.
pub const BOSS_OPTIMAL_RANGE_FRACTION: f64 = 0.8;

/// Score bonus for an attack position above the target's altitude.
pub const BOSS_HEIGHT_ADVANTAGE_BONUS: f64 = 0.2;

// --- Decision cache ---

/// Maximum cached decisions; the oldest entry is evicted beyond this.
pub const DECISION_CACHE_CAPACITY: usize = 50;

// --- Player profile ---

/// Rolling-window capacity for boss behavior tracking.
pub const PROFILE_PATH_CAPACITY: usize = 20;

/// Rolling-window capacity for tower movement learning.
pub const TOWER_HISTORY_CAPACITY: usize = 100;

/// Direction-change variance over the last 3 samples above which the
/// target counts as evasive.
pub const EVASION_VARIANCE_THRESHOLD: f64 = 0.5;

/// Samples below this speed are ignored for dominant-heading analysis.
pub const HEADING_MIN_SPEED: f64 = 1.0;

// --- Enemy ---

pub const ENEMY_MAX_HEALTH: f64 = 100.0;
pub const ENEMY_ARMOR: f64 = 0.0;
pub const ENEMY_DETECTION_RANGE: f64 = 30.0;
/// Strictly larger than detection range to prevent acquisition flicker.
pub const ENEMY_LOSE_TARGET_RANGE: f64 = 50.0;
pub const ENEMY_MOVE_SPEED: f64 = 3.5;
pub const ENEMY_RUN_SPEED: f64 = 5.5;
pub const ENEMY_ATTACK_RANGE: f64 = 2.0;
pub const ENEMY_PREFERRED_DISTANCE: f64 = 15.0;
pub const ENEMY_ATTACK_DAMAGE: f64 = 20.0;
pub const ENEMY_ATTACK_COOLDOWN: f64 = 2.0;
pub const ENEMY_PROJECTILE_SPEED: f64 = 20.0;
pub const ENEMY_PATROL_WAIT: f64 = 2.0;
pub const ENEMY_PATROL_ARRIVE_DISTANCE: f64 = 0.5;
/// Archers retreat when closer than this fraction of preferred distance.
pub const ENEMY_CLOSE_FRACTION: f64 = 0.7;
/// Distance an archer backs off per retreat leg.
pub const ENEMY_RETREAT_STEP: f64 = 10.0;

// --- Plain tower ---

pub const TOWER_MAX_HEALTH: f64 = 80.0;
pub const TOWER_DETECTION_RANGE: f64 = 50.0;
pub const TOWER_FIRE_RATE: f64 = 1.0;
pub const TOWER_PROJECTILE_SPEED: f64 = 25.0;
pub const TOWER_DAMAGE: f64 = 10.0;
/// Turret angular rate (radians/s). 90 deg/s.
pub const TOWER_MAX_TURN_SPEED: f64 = std::f64::consts::FRAC_PI_2;
/// Cosine alignment required before firing.
pub const TOWER_AIM_THRESHOLD: f64 = 0.95;

// --- Smart tower ---

pub const SMART_TOWER_MAX_HEALTH: f64 = 100.0;
pub const SMART_TOWER_DETECTION_RANGE: f64 = 45.0;
pub const SMART_TOWER_FIRE_RATE: f64 = 1.2;
pub const SMART_TOWER_PROJECTILE_SPEED: f64 = 30.0;
pub const SMART_TOWER_DAMAGE: f64 = 15.0;
/// Turret angular rate (radians/s). 120 deg/s.
pub const SMART_TOWER_MAX_TURN_SPEED: f64 = std::f64::consts::PI * 2.0 / 3.0;
pub const SMART_TOWER_LEARNING_RATE: f64 = 0.1;
/// Seconds between behavior-analysis passes.
pub const SMART_TOWER_ADAPTATION_INTERVAL: f64 = 5.0;
/// Floor for the adaptation interval after difficulty modifiers.
pub const SMART_TOWER_ADAPTATION_FLOOR: f64 = 1.0;
/// Minimum history samples before adaptation runs.
pub const SMART_TOWER_MIN_SAMPLES: usize = 10;
pub const SMART_TOWER_COORDINATION_RANGE: f64 = 60.0;
/// Seconds between coordination-record refreshes.
pub const SMART_TOWER_COMMUNICATION_INTERVAL: f64 = 2.0;
pub const SMART_TOWER_PREDICTION_ACCURACY: f64 = 0.8;
pub const SMART_TOWER_MAX_PREDICTION_TIME: f64 = 3.0;
/// Alignment thresholds by archetype.
pub const SMART_TOWER_AIM_THRESHOLD: f64 = 0.92;
pub const AMBUSHER_AIM_THRESHOLD: f64 = 0.98;
/// Ambusher trades fire rate for damage (relative to base stats).
pub const AMBUSHER_FIRE_RATE_FACTOR: f64 = 0.7;
pub const AMBUSHER_DAMAGE_FACTOR: f64 = 1.3;
/// Adaptive archetype caps.
pub const ADAPTIVE_ACCURACY_CAP: f64 = 0.95;
/// Adaptive prediction horizon: seconds per unit of target speed,
/// clamped to [min, max].
pub const ADAPTIVE_HORIZON_PER_SPEED: f64 = 0.1;
pub const ADAPTIVE_HORIZON_MIN: f64 = 1.0;
pub const ADAPTIVE_HORIZON_MAX: f64 = 4.0;
pub const PREDICTOR_ACCURACY_CAP: f64 = 0.98;
pub const PREDICTOR_MAX_PREDICTION_TIME: f64 = 5.0;

// --- Prediction ---

/// Lateral offset scale applied per unit of evasion score.
pub const PREDICTION_EVASION_OFFSET: f64 = 5.0;

/// Evasion score above which the lateral bias is applied.
pub const PREDICTION_EVASION_CUTOFF: f64 = 0.5;

/// Jitter radius at zero accuracy (world units).
pub const PREDICTION_JITTER_SCALE: f64 = 3.0;

// --- Difficulty adaptation ---

/// Seconds between difficulty evaluations.
pub const DIFFICULTY_ADAPTATION_INTERVAL: f64 = 30.0;

pub const DIFFICULTY_INCREASE_THRESHOLD: f64 = 0.75;
pub const DIFFICULTY_DECREASE_THRESHOLD: f64 = 0.35;

/// Maximum rung changes before the next level reset.
pub const MAX_DIFFICULTY_CHANGES_PER_LEVEL: u32 = 2;

/// Pause before despawning encounters on a rung change (seconds).
pub const DIFFICULTY_DESPAWN_DELAY: f64 = 1.0;

/// Further pause before respawning per the new rung (seconds).
pub const DIFFICULTY_RESPAWN_DELAY: f64 = 0.5;

/// Survival time that saturates the survival component of the score.
pub const PERFORMANCE_SURVIVAL_CAP: f64 = 300.0;

/// Performance score weights.
pub const PERFORMANCE_SURVIVAL_WEIGHT: f64 = 0.3;
pub const PERFORMANCE_COMBAT_WEIGHT: f64 = 0.4;
pub const PERFORMANCE_ACCURACY_WEIGHT: f64 = 0.15;
pub const PERFORMANCE_EVASION_WEIGHT: f64 = 0.15;

/// Combat-effectiveness kill weights and saturation divisor.
pub const PERFORMANCE_KILL_WEIGHT: f64 = 0.1;
pub const PERFORMANCE_TOWER_WEIGHT: f64 = 0.3;
pub const PERFORMANCE_BOSS_WEIGHT: f64 = 1.0;
pub const PERFORMANCE_COMBAT_CAP: f64 = 10.0;

// --- Damage model ---

/// Minimum damage dealt regardless of armor.
pub const MIN_DAMAGE: f64 = 1.0;
