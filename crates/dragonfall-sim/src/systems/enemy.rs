//! Enemy AI system.
//!
//! Builds an `EnemyContext` per enemy, runs the pure state machine
//! from dragonfall-ai, and applies the resulting transitions and
//! actions back to the world.

use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use dragonfall_core::components::{
    AgentId, EnemyRuntime, EnemyStats, EnemyUnit, NavAgent, PatrolRoute,
};
use dragonfall_core::enums::{AnimParam, AudioCue, EnemyState, EnemyType};
use dragonfall_core::events::CombatEvent;
use dragonfall_core::types::{Position, SimTime, Velocity};

use dragonfall_ai::enemy::{evaluate, EnemyAction, EnemyContext, EnemyUpdate};
use dragonfall_ai::prediction;

use crate::systems::player_pose;

/// Ranged ground units only lead a short distance ahead.
const ENEMY_LEAD_CLAMP: f64 = 1.0;

struct EnemyWork {
    entity: hecs::Entity,
    agent: u32,
    update: EnemyUpdate,
    previous: EnemyState,
}

pub fn run(world: &mut World, time: &SimTime, rng: &mut ChaCha8Rng, events: &mut Vec<CombatEvent>) {
    let target = player_pose(world);
    let target_position = target.map(|(pos, _)| pos);
    let now = time.elapsed_secs;

    // Evaluate first, apply second; the FSM only reads the world.
    let mut work: Vec<EnemyWork> = Vec::new();
    {
        let mut query = world.query::<(
            &EnemyUnit,
            &AgentId,
            &Position,
            &EnemyStats,
            &EnemyRuntime,
            &NavAgent,
            Option<&PatrolRoute>,
        )>();
        for (entity, (_unit, id, pos, stats, runtime, nav, route)) in query.iter() {
            if runtime.state == EnemyState::Dead {
                continue;
            }
            let waypoint = route.and_then(|r| r.points.get(runtime.patrol_index).copied());
            let ctx = EnemyContext {
                stats,
                state: runtime.state,
                position: *pos,
                target: target_position,
                has_patrol_route: route.is_some_and(|r| !r.points.is_empty()),
                patrol_waypoint: waypoint,
                patrol_wait_secs: route.map_or(0.0, |r| r.wait_secs),
                nav_pending: nav.pending(),
                now_secs: now,
                last_attack_secs: runtime.last_attack_secs,
                last_patrol_secs: runtime.last_patrol_secs,
            };
            work.push(EnemyWork {
                entity,
                agent: id.0,
                update: evaluate(&ctx),
                previous: runtime.state,
            });
        }
    }

    for item in work {
        apply(world, rng, events, target, item, now);
    }
}

fn apply(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<CombatEvent>,
    target: Option<(Position, Velocity)>,
    item: EnemyWork,
    now: f64,
) {
    for action in &item.update.actions {
        match *action {
            EnemyAction::Navigate { destination, speed } => {
                if let Ok(mut nav) = world.get::<&mut NavAgent>(item.entity) {
                    nav.request(destination, speed);
                }
            }
            EnemyAction::StopNavigation => {
                if let Ok(mut nav) = world.get::<&mut NavAgent>(item.entity) {
                    nav.cancel();
                }
            }
            EnemyAction::FaceTarget => {
                // Rotation is cosmetic; the host turns the rig.
            }
            EnemyAction::Attack => {
                perform_attack(world, rng, events, target, item.entity, item.agent, now);
            }
            EnemyAction::ArriveAtWaypoint => {
                if let Ok(mut runtime) = world.get::<&mut EnemyRuntime>(item.entity) {
                    runtime.last_patrol_secs = now;
                }
            }
            EnemyAction::AdvancePatrol => {
                advance_patrol(world, rng, item.entity, now);
            }
        }
    }

    if item.update.changed {
        if let Ok(mut runtime) = world.get::<&mut EnemyRuntime>(item.entity) {
            runtime.state = item.update.next_state;
        }
        events.push(CombatEvent::EnemyStateChanged {
            owner: item.agent,
            from: item.previous,
            to: item.update.next_state,
        });
        // Acquisition out of a passive state announces itself.
        if item.update.next_state == EnemyState::Tracking
            && matches!(item.previous, EnemyState::Idle | EnemyState::Patrol)
        {
            events.push(CombatEvent::AudioPlayed {
                owner: item.agent,
                cue: AudioCue::Alert,
                clip_index: rng.gen_range(0..2),
            });
        }
    }
}

fn perform_attack(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<CombatEvent>,
    target: Option<(Position, Velocity)>,
    entity: hecs::Entity,
    agent: u32,
    now: f64,
) {
    let Some((target_position, target_velocity)) = target else {
        return;
    };
    let Ok(stats) = world.get::<&EnemyStats>(entity).map(|s| (*s).clone()) else {
        return;
    };
    let Ok(origin) = world.get::<&Position>(entity).map(|p| *p) else {
        return;
    };

    match stats.enemy_type {
        EnemyType::Soldier => {
            events.push(CombatEvent::MeleeHit {
                owner: agent,
                damage: stats.attack_damage,
            });
        }
        EnemyType::Archer | EnemyType::Guard => {
            let aim = prediction::lead_point(
                &origin,
                &target_position,
                &target_velocity,
                stats.projectile_speed,
                ENEMY_LEAD_CLAMP,
            );
            if let Some(direction) = origin.direction_to(&aim) {
                events.push(CombatEvent::ProjectileSpawned {
                    owner: agent,
                    origin,
                    direction,
                    speed: stats.projectile_speed,
                    damage: stats.attack_damage,
                });
            }
        }
    }

    events.push(CombatEvent::AudioPlayed {
        owner: agent,
        cue: AudioCue::Attack,
        clip_index: rng.gen_range(0..2),
    });
    events.push(CombatEvent::AnimationParam {
        owner: agent,
        param: AnimParam::Attack,
        value: 1.0,
    });

    if let Ok(mut runtime) = world.get::<&mut EnemyRuntime>(entity) {
        runtime.last_attack_secs = now;
    }
}

fn advance_patrol(world: &mut World, rng: &mut ChaCha8Rng, entity: hecs::Entity, now: f64) {
    let next = {
        let Ok(route) = world.get::<&PatrolRoute>(entity) else {
            return;
        };
        if route.points.is_empty() {
            return;
        }
        let Ok(runtime) = world.get::<&EnemyRuntime>(entity) else {
            return;
        };
        if route.in_order {
            (runtime.patrol_index + 1) % route.points.len()
        } else {
            rng.gen_range(0..route.points.len())
        }
    };
    if let Ok(mut runtime) = world.get::<&mut EnemyRuntime>(entity) {
        runtime.patrol_index = next;
        runtime.last_patrol_secs = now;
    }
}
