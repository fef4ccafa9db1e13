//! Plain tower fire control.
//!
//! Rate-limited turret rotation toward a lead-predicted aim point,
//! with an alignment gate before firing.

use glam::{DQuat, DVec3};
use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use dragonfall_core::components::{AgentId, TowerRuntime, TowerStats, TowerUnit};
use dragonfall_core::constants::{DT, TOWER_AIM_THRESHOLD};
use dragonfall_core::enums::AudioCue;
use dragonfall_core::events::CombatEvent;
use dragonfall_core::types::{Position, SimTime};

use dragonfall_ai::prediction;

use crate::systems::player_pose;

/// Lead horizon for dumb towers; smart towers carry their own.
const TOWER_LEAD_CLAMP: f64 = 2.0;

pub fn run(world: &mut World, time: &SimTime, rng: &mut ChaCha8Rng, events: &mut Vec<CombatEvent>) {
    let Some((target, target_velocity)) = player_pose(world) else {
        for (_e, (_unit, runtime)) in world.query_mut::<(&TowerUnit, &mut TowerRuntime)>() {
            runtime.engaged = false;
        }
        return;
    };
    let now = time.elapsed_secs;

    for (_entity, (_unit, id, pos, stats, runtime)) in
        world.query_mut::<(&TowerUnit, &AgentId, &Position, &TowerStats, &mut TowerRuntime)>()
    {
        if runtime.health <= 0.0 {
            continue;
        }
        if pos.distance_to(&target) > stats.detection_range {
            runtime.engaged = false;
            continue;
        }
        runtime.engaged = true;

        let aim_point = if stats.lead_target {
            prediction::lead_point(
                pos,
                &target,
                &target_velocity,
                stats.projectile_speed,
                TOWER_LEAD_CLAMP,
            )
        } else {
            target
        };
        let Some(desired) = pos.direction_to(&aim_point) else {
            continue;
        };
        runtime.aim = rotate_toward(runtime.aim, desired, stats.max_turn_speed * DT);

        let aligned = runtime.aim.dot(desired) >= TOWER_AIM_THRESHOLD;
        let cooled = now - runtime.last_fire_secs >= 1.0 / stats.fire_rate;
        if aligned && cooled {
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

/// Rotate `current` toward `desired` by at most `max_angle` radians.
/// Both inputs are unit vectors.
pub fn rotate_toward(current: DVec3, desired: DVec3, max_angle: f64) -> DVec3 {
    let angle = current.angle_between(desired);
    if !angle.is_finite() || angle <= max_angle {
        return desired;
    }
    let axis = current
        .cross(desired)
        .try_normalize()
        .unwrap_or_else(|| current.any_orthonormal_vector());
    DQuat::from_axis_angle(axis, max_angle) * current
}
