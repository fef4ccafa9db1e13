//! Entity spawn factories and encounter layout.
//!
//! All stats start from the constants in dragonfall-core; rung
//! modifiers are applied here at spawn so they never compound across
//! difficulty transitions.

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use dragonfall_core::components::{
    AgentId, BossArena, BossRuntime, BossStats, BossUnit, EnemyRuntime, EnemyStats, EnemyUnit,
    NavAgent, PatrolRoute, PlayerShip, SmartTowerRuntime, SmartTowerStats, SmartTowerUnit,
    TowerRuntime, TowerStats, TowerUnit,
};
use dragonfall_core::config::DifficultyLevel;
use dragonfall_core::constants::*;
use dragonfall_core::enums::TowerAiType;
use dragonfall_core::types::{Position, Velocity};

/// Ground ring radius for enemy spawns.
const ENEMY_SPAWN_RADIUS: f64 = 60.0;
/// Ring radius for tower placements.
const TOWER_SPAWN_RADIUS: f64 = 80.0;
/// Patrol square half-extent around each enemy spawn point.
const PATROL_EXTENT: f64 = 8.0;

pub fn spawn_player(world: &mut World) -> Entity {
    world.spawn((
        PlayerShip,
        Position::new(0.0, 30.0, 0.0),
        Velocity::default(),
    ))
}

/// Tactical layout handed to the boss at spawn.
pub fn default_arena() -> BossArena {
    BossArena {
        attack_positions: vec![
            Position::new(30.0, 25.0, 30.0),
            Position::new(-30.0, 25.0, 30.0),
            Position::new(30.0, 15.0, -30.0),
            Position::new(-30.0, 15.0, -30.0),
            Position::new(0.0, 40.0, 0.0),
        ],
        retreat_positions: vec![
            Position::new(0.0, 45.0, 140.0),
            Position::new(120.0, 45.0, -80.0),
            Position::new(-120.0, 45.0, -80.0),
        ],
        fire_points: vec![
            Position::new(2.5, -1.0, 3.0),
            Position::new(-2.5, -1.0, 3.0),
        ],
    }
}

/// Health, damage, and decision cadences scaled for the rung, from
/// base values.
pub fn boss_stats_for(rung: &DifficultyLevel) -> BossStats {
    let mut stats = BossStats::default();
    stats.max_health = BOSS_MAX_HEALTH * rung.enemy_health_multiplier;
    stats.decision_interval =
        (BOSS_DECISION_INTERVAL - rung.ai_cadence_bonus).max(BOSS_DECISION_INTERVAL_FLOOR);
    stats.emergency_decision_interval = (BOSS_EMERGENCY_DECISION_INTERVAL
        - rung.ai_cadence_bonus * 0.5)
        .max(BOSS_DECISION_INTERVAL_FLOOR);
    stats.primary_damage = BOSS_PRIMARY_DAMAGE * rung.enemy_damage_multiplier;
    stats.special_damage = BOSS_SPECIAL_DAMAGE * rung.enemy_damage_multiplier;
    stats
}

pub fn spawn_boss(world: &mut World, next_agent_id: &mut u32, rung: &DifficultyLevel) -> u32 {
    let id = alloc_id(next_agent_id);
    let stats = boss_stats_for(rung);
    let runtime = BossRuntime::new(stats.max_health);
    world.spawn((
        BossUnit,
        AgentId(id),
        Position::new(0.0, 20.0, 120.0),
        Velocity::default(),
        NavAgent::default(),
        default_arena(),
        stats,
        runtime,
    ));
    id
}

pub fn enemy_stats_for(index: usize, rung: &DifficultyLevel) -> EnemyStats {
    // Every third spawn is an archer, every fifth a guard.
    let mut stats = if index % 5 == 4 {
        EnemyStats::guard()
    } else if index % 3 == 2 {
        EnemyStats::archer()
    } else {
        EnemyStats::default()
    };
    stats.max_health *= rung.enemy_health_multiplier;
    stats.attack_damage *= rung.enemy_damage_multiplier;
    stats.move_speed *= rung.enemy_speed_multiplier;
    stats.run_speed *= rung.enemy_speed_multiplier;
    stats
}

pub fn spawn_enemy(
    world: &mut World,
    next_agent_id: &mut u32,
    stats: EnemyStats,
    position: Position,
    route: Option<PatrolRoute>,
) -> u32 {
    let id = alloc_id(next_agent_id);
    let runtime = EnemyRuntime::new(stats.max_health);
    let entity = world.spawn((
        EnemyUnit,
        AgentId(id),
        position,
        Velocity::default(),
        NavAgent::default(),
        stats,
        runtime,
    ));
    if let Some(route) = route {
        let _ = world.insert_one(entity, route);
    }
    id
}

pub fn tower_stats_for(rung: &DifficultyLevel) -> TowerStats {
    let mut stats = TowerStats::default();
    stats.fire_rate = TOWER_FIRE_RATE * (1.0 + rung.tower_accuracy_bonus);
    stats
}

pub fn spawn_tower(
    world: &mut World,
    next_agent_id: &mut u32,
    position: Position,
    rung: &DifficultyLevel,
) -> u32 {
    let id = alloc_id(next_agent_id);
    world.spawn((
        TowerUnit,
        AgentId(id),
        position,
        tower_stats_for(rung),
        TowerRuntime::default(),
    ));
    id
}

pub fn smart_tower_stats_for(ai_type: TowerAiType, rung: &DifficultyLevel) -> SmartTowerStats {
    let mut stats = SmartTowerStats::with_type(ai_type);
    stats.prediction_accuracy =
        (stats.prediction_accuracy + rung.tower_accuracy_bonus).min(PREDICTOR_ACCURACY_CAP);
    stats.fire_rate = stats.base_fire_rate * (1.0 + rung.tower_accuracy_bonus);
    stats.adaptation_interval =
        (SMART_TOWER_ADAPTATION_INTERVAL - rung.ai_cadence_bonus).max(SMART_TOWER_ADAPTATION_FLOOR);
    stats
}

pub fn spawn_smart_tower(
    world: &mut World,
    next_agent_id: &mut u32,
    stats: SmartTowerStats,
    position: Position,
) -> u32 {
    let id = alloc_id(next_agent_id);
    world.spawn((
        SmartTowerUnit,
        AgentId(id),
        position,
        stats,
        SmartTowerRuntime::default(),
    ));
    id
}

/// Populate enemies and towers for a rung. The boss is spawned
/// separately because it persists across difficulty transitions.
pub fn spawn_encounter(
    world: &mut World,
    next_agent_id: &mut u32,
    rng: &mut ChaCha8Rng,
    rung: &DifficultyLevel,
) {
    for i in 0..rung.max_enemies as usize {
        spawn_encounter_enemy(world, next_agent_id, rng, rung, i);
    }
    spawn_towers(world, next_agent_id, rung);
}

/// Spawn the `index`-th enemy of a rung on the ground ring, with a 50%
/// chance of a patrol square around its spawn point.
pub fn spawn_encounter_enemy(
    world: &mut World,
    next_agent_id: &mut u32,
    rng: &mut ChaCha8Rng,
    rung: &DifficultyLevel,
    index: usize,
) -> u32 {
    let angle = std::f64::consts::TAU * index as f64 / rung.max_enemies.max(1) as f64;
    let spawn = Position::new(
        ENEMY_SPAWN_RADIUS * angle.cos(),
        0.0,
        ENEMY_SPAWN_RADIUS * angle.sin(),
    );
    let stats = enemy_stats_for(index, rung);
    let route = (rng.gen_bool(0.5)).then(|| patrol_square(spawn));
    spawn_enemy(world, next_agent_id, stats, spawn, route)
}

pub fn spawn_towers(world: &mut World, next_agent_id: &mut u32, rung: &DifficultyLevel) {
    let archetypes = [
        TowerAiType::Adaptive,
        TowerAiType::Coordinator,
        TowerAiType::Predictor,
        TowerAiType::Ambusher,
    ];

    for i in 0..rung.max_towers as usize {
        let angle = std::f64::consts::TAU * (i as f64 + 0.5) / rung.max_towers.max(1) as f64;
        let spawn = Position::new(
            TOWER_SPAWN_RADIUS * angle.cos(),
            0.0,
            TOWER_SPAWN_RADIUS * angle.sin(),
        );
        if rung.enable_smart_towers {
            let ai_type = archetypes[i % archetypes.len()];
            let stats = smart_tower_stats_for(ai_type, rung);
            spawn_smart_tower(world, next_agent_id, stats, spawn);
        } else {
            spawn_tower(world, next_agent_id, spawn, rung);
        }
    }
}

fn patrol_square(center: Position) -> PatrolRoute {
    PatrolRoute {
        points: vec![
            Position::new(center.x - PATROL_EXTENT, center.y, center.z - PATROL_EXTENT),
            Position::new(center.x + PATROL_EXTENT, center.y, center.z - PATROL_EXTENT),
            Position::new(center.x + PATROL_EXTENT, center.y, center.z + PATROL_EXTENT),
            Position::new(center.x - PATROL_EXTENT, center.y, center.z + PATROL_EXTENT),
        ],
        wait_secs: ENEMY_PATROL_WAIT,
        in_order: true,
    }
}

fn alloc_id(next_agent_id: &mut u32) -> u32 {
    let id = *next_agent_id;
    *next_agent_id += 1;
    id
}
