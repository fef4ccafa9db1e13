//! Smart tower network.
//!
//! Each tower learns the target's movement from its own history
//! window, adapts its parameters on a fixed cadence per archetype, and
//! exchanges coordination records with peers in range. Firing runs
//! through the prediction engine instead of aiming at the current
//! position.

use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use dragonfall_core::components::{
    AgentId, MovementSample, SmartTowerRuntime, SmartTowerStats, SmartTowerUnit,
    TowerCoordinationRecord,
};
use dragonfall_core::constants::*;
use dragonfall_core::enums::{AudioCue, EffectKind, TowerAiType};
use dragonfall_core::events::CombatEvent;
use dragonfall_core::types::{Position, SimTime, Velocity};

use dragonfall_ai::prediction;
use dragonfall_ai::profile;

use crate::systems::player_pose;
use crate::systems::tower::rotate_toward;

pub fn run(world: &mut World, time: &SimTime, rng: &mut ChaCha8Rng, events: &mut Vec<CombatEvent>) {
    let now = time.elapsed_secs;
    let target = player_pose(world);

    // Broadcast pass: every tower's record as of the previous tick.
    let records: Vec<TowerCoordinationRecord> = world
        .query::<(&SmartTowerUnit, &AgentId, &Position, &SmartTowerRuntime)>()
        .iter()
        .map(|(_, (_unit, id, pos, runtime))| TowerCoordinationRecord {
            agent: *id,
            position: *pos,
            is_engaged: runtime.engaged,
        })
        .collect();

    let Some((target_position, target_velocity)) = target else {
        for (_e, (_unit, runtime)) in
            world.query_mut::<(&SmartTowerUnit, &mut SmartTowerRuntime)>()
        {
            runtime.engaged = false;
        }
        return;
    };

    for (_entity, (_unit, id, pos, stats, runtime)) in world.query_mut::<(
        &SmartTowerUnit,
        &AgentId,
        &Position,
        &mut SmartTowerStats,
        &mut SmartTowerRuntime,
    )>() {
        if runtime.health <= 0.0 {
            continue;
        }

        observe_target(runtime, target_position, target_velocity, now);

        if now - runtime.last_coordination_secs >= stats.communication_interval {
            runtime.peers = records
                .iter()
                .filter(|r| {
                    r.agent.0 != id.0 && pos.distance_to(&r.position) <= stats.coordination_range
                })
                .copied()
                .collect();
            runtime.last_coordination_secs = now;
        }

        if now - runtime.last_adaptation_secs >= stats.adaptation_interval
            && runtime.history.len() >= SMART_TOWER_MIN_SAMPLES
        {
            adapt(stats, runtime, id.0, pos, events);
            runtime.last_adaptation_secs = now;
        }

        if pos.distance_to(&target_position) > stats.detection_range {
            runtime.engaged = false;
            continue;
        }
        runtime.engaged = true;

        let base_aim = if stats.use_intercept_course {
            prediction::intercept_point(pos, &target_position, &target_velocity, stats.projectile_speed)
        } else {
            prediction::lead_point(
                pos,
                &target_position,
                &target_velocity,
                stats.projectile_speed,
                stats.max_prediction_time,
            )
        };
        runtime.predicted_target = prediction::refine_aim(
            base_aim,
            &target_velocity,
            runtime.behavior.evasion_ratio,
            stats.prediction_accuracy,
            rng,
        );

        let Some(desired) = pos.direction_to(&runtime.predicted_target) else {
            continue;
        };
        runtime.aim = rotate_toward(runtime.aim, desired, stats.max_turn_speed * DT);

        let period = 1.0 / stats.fire_rate;
        let aligned = runtime.aim.dot(desired) >= stats.aim_threshold();
        let cooled = now - runtime.last_fire_secs >= period;
        if aligned && cooled && archetype_clear_to_fire(stats, runtime) {
            events.push(CombatEvent::ProjectileSpawned {
                owner: id.0,
                origin: *pos,
                direction: runtime.aim,
                speed: stats.projectile_speed,
                damage: stats.damage,
            });
            events.push(CombatEvent::AudioPlayed {
                owner: id.0,
                cue: AudioCue::TowerFire,
                clip_index: rng.gen_range(0..2),
            });
            runtime.last_fire_secs = now;
        }
    }
}

fn observe_target(
    runtime: &mut SmartTowerRuntime,
    position: Position,
    velocity: Velocity,
    now: f64,
) {
    let sample = MovementSample {
        position,
        velocity,
        altitude: position.altitude(),
        timestamp_secs: now,
        was_evasive: false,
    };
    profile::push_bounded(&mut runtime.history, sample, TOWER_HISTORY_CAPACITY);
    let evasive = profile::is_evasive(&runtime.history);
    if let Some(last) = runtime.history.last_mut() {
        last.was_evasive = evasive;
    }
}

/// Archetype-specific parameter adjustment. Every adjustment derives
/// from the base stats so repeated passes never compound.
pub(crate) fn adapt(
    stats: &mut SmartTowerStats,
    runtime: &mut SmartTowerRuntime,
    agent: u32,
    position: &Position,
    events: &mut Vec<CombatEvent>,
) {
    runtime.behavior = profile::analyze(&runtime.history);
    let evasion = runtime.behavior.evasion_ratio;

    match stats.ai_type {
        TowerAiType::Adaptive => {
            stats.prediction_accuracy =
                (stats.prediction_accuracy + stats.learning_rate).min(ADAPTIVE_ACCURACY_CAP);
            // Faster targets need a longer prediction horizon.
            stats.max_prediction_time = (runtime.behavior.average_speed
                * ADAPTIVE_HORIZON_PER_SPEED)
                .clamp(ADAPTIVE_HORIZON_MIN, ADAPTIVE_HORIZON_MAX);
            stats.fire_rate = stats.base_fire_rate * (1.0 + stats.learning_rate * evasion);
        }
        TowerAiType::Predictor => {
            stats.prediction_accuracy =
                (stats.prediction_accuracy + stats.learning_rate).min(PREDICTOR_ACCURACY_CAP);
            stats.max_prediction_time = PREDICTOR_MAX_PREDICTION_TIME;
        }
        TowerAiType::Ambusher => {
            stats.fire_rate = stats.base_fire_rate * AMBUSHER_FIRE_RATE_FACTOR;
            stats.damage = stats.base_damage * AMBUSHER_DAMAGE_FACTOR;
        }
        TowerAiType::Coordinator => {
            // Coordinators adapt through the peer exchange, not params.
        }
    }

    events.push(CombatEvent::EffectSpawned {
        kind: EffectKind::LearningPulse,
        position: *position,
    });
    events.push(CombatEvent::AudioPlayed {
        owner: agent,
        cue: AudioCue::Adaptation,
        clip_index: 0,
    });
}

pub(crate) fn archetype_clear_to_fire(
    stats: &SmartTowerStats,
    runtime: &SmartTowerRuntime,
) -> bool {
    match stats.ai_type {
        // Ambushers wait for a stable flight path.
        TowerAiType::Ambusher => !profile::is_evasive(&runtime.history),
        // Coordinators hold fire while any peer is engaged.
        TowerAiType::Coordinator => !runtime.peers.iter().any(|p| p.is_engaged),
        _ => true,
    }
}
