//! Boss AI system.
//!
//! Runs the boss state machine and the cached tactical decision layer:
//! on each decision deadline the boss fingerprints its situation, asks
//! the cache first, and only pays the synthesis latency on a miss.
//! Committed tactics translate into navigation requests, channel
//! timers, and staggered area volleys.

use std::collections::HashMap;

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use dragonfall_core::components::{
    AgentId, BossArena, BossRuntime, BossStats, BossUnit, NavAgent,
};
use dragonfall_core::constants::*;
use dragonfall_core::enums::{AnimParam, AudioCue, BossState, BossTactic, EffectKind};
use dragonfall_core::events::CombatEvent;
use dragonfall_core::types::{Position, SimTime, Velocity};

use dragonfall_ai::cache::DecisionCache;
use dragonfall_ai::decision::{fingerprint, PendingDecision, SituationContext};
use dragonfall_ai::prediction;
use dragonfall_ai::profile::PlayerProfile;

use crate::systems::player_pose;
use crate::timers::{TimerAction, TimerQueue};

/// Volleys in one area-denial sequence.
const AREA_ATTACK_COUNT: u32 = 3;

enum NavOp {
    Request(Position, f64),
    Cancel,
}

pub fn run(
    world: &mut World,
    time: &SimTime,
    profile: &mut PlayerProfile,
    cache: &mut DecisionCache,
    pending: &mut HashMap<u32, PendingDecision>,
    timers: &mut TimerQueue,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<CombatEvent>,
) {
    let player = player_pose(world);
    let bosses: Vec<(Entity, u32)> = world
        .query::<(&BossUnit, &AgentId)>()
        .iter()
        .map(|(entity, (_unit, id))| (entity, id.0))
        .collect();

    for (entity, agent) in bosses {
        update_boss(
            world, entity, agent, player, time, profile, cache, pending, timers, rng, events,
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn update_boss(
    world: &mut World,
    entity: Entity,
    agent: u32,
    player: Option<(Position, Velocity)>,
    time: &SimTime,
    profile: &mut PlayerProfile,
    cache: &mut DecisionCache,
    pending: &mut HashMap<u32, PendingDecision>,
    timers: &mut TimerQueue,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<CombatEvent>,
) {
    // Clone the component values out so the world is free for writes;
    // `hecs::Ref` is itself Clone, so deref before cloning.
    let Ok(stats) = world.get::<&BossStats>(entity).map(|s| (*s).clone()) else {
        return;
    };
    let Ok(arena) = world.get::<&BossArena>(entity).map(|a| (*a).clone()) else {
        return;
    };
    let Ok(mut runtime) = world.get::<&BossRuntime>(entity).map(|r| (*r).clone()) else {
        return;
    };
    let Ok(position) = world.get::<&Position>(entity).map(|p| *p) else {
        return;
    };
    let Ok((nav_pending, nav_remaining)) = world
        .get::<&NavAgent>(entity)
        .map(|n| (n.pending(), n.remaining))
    else {
        return;
    };

    if runtime.state == BossState::Defeated {
        pending.remove(&agent);
        return;
    }

    let now = time.elapsed_secs;
    let from_state = runtime.state;
    let mut nav_op: Option<NavOp> = None;

    // No regeneration while fleeing.
    if runtime.state != BossState::Retreating && runtime.health < stats.max_health {
        runtime.health = (runtime.health + stats.regeneration_rate * DT).min(stats.max_health);
    }

    match runtime.state {
        BossState::Spawning => {
            runtime.state = BossState::Hunting;
            events.push(CombatEvent::AudioPlayed {
                owner: agent,
                cue: AudioCue::Taunt,
                clip_index: rng.gen_range(0..2),
            });
        }
        BossState::Hunting => {
            if let Some((target, _)) = player {
                if position.distance_to(&target) <= stats.detection_range {
                    runtime.state = BossState::Engaging;
                    nav_op = Some(NavOp::Cancel);
                } else {
                    nav_op = Some(NavOp::Request(target, stats.move_speed));
                }
            } else if nav_pending {
                nav_op = Some(NavOp::Cancel);
            }
        }
        BossState::Engaging => {
            nav_op = engage(
                &stats, &arena, &mut runtime, position, player, time, profile, cache, pending,
                timers, events, agent, now,
            );
        }
        BossState::Retreating => {
            if !nav_pending || nav_remaining <= BOSS_RETREAT_ARRIVE_DISTANCE {
                runtime.current_tactic = None;
                runtime.state = match player {
                    Some((target, _))
                        if position.distance_to(&target) <= stats.detection_range =>
                    {
                        BossState::Engaging
                    }
                    _ => BossState::Hunting,
                };
            }
        }
        BossState::Channeling => {
            // Held in place until the channel timer fires.
        }
        BossState::Stunned => {
            if nav_pending {
                nav_op = Some(NavOp::Cancel);
            }
        }
        BossState::Defeated => {}
    }

    if runtime.state != from_state {
        events.push(CombatEvent::BossStateChanged {
            owner: agent,
            from: from_state,
            to: runtime.state,
        });
    }

    if let Ok(mut stored) = world.get::<&mut BossRuntime>(entity) {
        *stored = runtime;
    }
    if let Some(op) = nav_op {
        if let Ok(mut nav) = world.get::<&mut NavAgent>(entity) {
            match op {
                NavOp::Request(destination, speed) => nav.request(destination, speed),
                NavOp::Cancel => nav.cancel(),
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn engage(
    stats: &BossStats,
    arena: &BossArena,
    runtime: &mut BossRuntime,
    position: Position,
    player: Option<(Position, Velocity)>,
    time: &SimTime,
    profile: &mut PlayerProfile,
    cache: &mut DecisionCache,
    pending: &mut HashMap<u32, PendingDecision>,
    timers: &mut TimerQueue,
    events: &mut Vec<CombatEvent>,
    agent: u32,
    now: f64,
) -> Option<NavOp> {
    let Some((target, target_velocity)) = player else {
        runtime.state = BossState::Hunting;
        return None;
    };
    let distance = position.distance_to(&target);
    if distance > stats.detection_range {
        runtime.state = BossState::Hunting;
        return None;
    }

    let mut nav_op = None;

    // A pending synthesis that has come due lands first.
    let resolved = match pending.get(&agent) {
        Some(p) if p.ready(time.tick) => pending.remove(&agent),
        _ => None,
    };
    if let Some(p) = resolved {
        let tactic = p.resolve();
        cache.insert(p.fingerprint, tactic, time.tick);
        nav_op = commit_tactic(
            tactic, false, stats, arena, runtime, position, target, profile, timers, events,
            agent, now, time.tick,
        );
    } else {
        let interval = if runtime.health_fraction(stats.max_health) < BOSS_EMERGENCY_HEALTH_FRACTION
        {
            stats.emergency_decision_interval
        } else {
            stats.decision_interval
        };
        if now - runtime.last_decision_secs >= interval && !pending.contains_key(&agent) {
            let ctx = SituationContext {
                health_fraction: runtime.health_fraction(stats.max_health),
                distance_to_target: distance,
                target_altitude: target.altitude(),
                state: runtime.state,
                special_ready: runtime.special_ready(now, stats.special_cooldown),
                attack_range: stats.attack_range,
            };
            runtime.last_decision_secs = now;
            let key = fingerprint(&ctx);
            if let Some(tactic) = cache.lookup(&key) {
                nav_op = commit_tactic(
                    tactic, true, stats, arena, runtime, position, target, profile, timers,
                    events, agent, now, time.tick,
                );
            } else {
                pending.insert(agent, PendingDecision::new(ctx, time.tick));
            }
        }
    }

    // Continuous execution of the standing tactic.
    if runtime.state == BossState::Engaging {
        match runtime.current_tactic {
            Some(BossTactic::AggressiveAttack) | None => {
                if distance > stats.attack_range {
                    nav_op = Some(NavOp::Request(target, stats.combat_speed));
                } else if nav_op.is_none() {
                    nav_op = Some(NavOp::Cancel);
                }
            }
            // Repositioning keeps its committed destination; area
            // denial fires from the timers.
            _ => {}
        }

        if distance <= stats.attack_range
            && now - runtime.last_primary_secs >= stats.primary_cooldown
        {
            fire_volley(
                stats.primary_damage,
                stats,
                arena,
                position,
                target,
                target_velocity,
                events,
                agent,
            );
            events.push(CombatEvent::AudioPlayed {
                owner: agent,
                cue: AudioCue::Attack,
                clip_index: 0,
            });
            events.push(CombatEvent::AnimationParam {
                owner: agent,
                param: AnimParam::Attack,
                value: 1.0,
            });
            runtime.last_primary_secs = now;
        }
    }

    nav_op
}

#[allow(clippy::too_many_arguments)]
fn commit_tactic(
    tactic: BossTactic,
    from_cache: bool,
    stats: &BossStats,
    arena: &BossArena,
    runtime: &mut BossRuntime,
    position: Position,
    target: Position,
    profile: &mut PlayerProfile,
    timers: &mut TimerQueue,
    events: &mut Vec<CombatEvent>,
    agent: u32,
    now: f64,
    tick: u64,
) -> Option<NavOp> {
    runtime.current_tactic = Some(tactic);
    profile.record_tactic(tactic.name());
    events.push(CombatEvent::TacticChosen {
        owner: agent,
        tactic,
        from_cache,
    });

    match tactic {
        BossTactic::AggressiveAttack => Some(NavOp::Request(target, stats.combat_speed)),
        BossTactic::DefensiveRetreat => {
            match nearest_position(&arena.retreat_positions, &position) {
                Some(dest) => {
                    runtime.state = BossState::Retreating;
                    Some(NavOp::Request(dest, stats.retreat_speed))
                }
                None => {
                    // Fallback: keep engaging on the default approach/fire loop.
                    tracing::warn!(agent, "no retreat positions configured, holding engagement");
                    runtime.current_tactic = None;
                    None
                }
            }
        }
        BossTactic::SpecialAbility => {
            runtime.state = BossState::Channeling;
            runtime.last_special_secs = now;
            timers.schedule_in(tick, BOSS_CHANNEL_DURATION, TimerAction::FinishChannel { agent });
            events.push(CombatEvent::EffectSpawned {
                kind: EffectKind::SpecialCast,
                position,
            });
            events.push(CombatEvent::AudioPlayed {
                owner: agent,
                cue: AudioCue::Special,
                clip_index: 0,
            });
            events.push(CombatEvent::AnimationParam {
                owner: agent,
                param: AnimParam::Special,
                value: 1.0,
            });
            Some(NavOp::Cancel)
        }
        BossTactic::TacticalReposition => match best_attack_position(arena, stats, &target) {
            Some(dest) => Some(NavOp::Request(dest, stats.move_speed)),
            None => {
                tracing::warn!(agent, "no attack positions configured, holding engagement");
                runtime.current_tactic = None;
                None
            }
        },
        BossTactic::AreaDenial => {
            timers.schedule_in(
                tick,
                BOSS_AREA_ATTACK_STAGGER,
                TimerAction::AreaAttack {
                    agent,
                    remaining: AREA_ATTACK_COUNT,
                },
            );
            Some(NavOp::Cancel)
        }
    }
}

/// One projectile per configured fire point, each solved for intercept
/// independently so spread muzzles converge on the target.
pub fn fire_volley(
    damage: f64,
    stats: &BossStats,
    arena: &BossArena,
    position: Position,
    target: Position,
    target_velocity: Velocity,
    events: &mut Vec<CombatEvent>,
    agent: u32,
) {
    let origins: Vec<Position> = if arena.fire_points.is_empty() {
        vec![position]
    } else {
        arena
            .fire_points
            .iter()
            .map(|offset| Position::from_dvec3(position.as_dvec3() + offset.as_dvec3()))
            .collect()
    };

    for origin in origins {
        let aim = prediction::intercept_point(
            &origin,
            &target,
            &target_velocity,
            stats.projectile_speed,
        );
        if let Some(direction) = origin.direction_to(&aim) {
            events.push(CombatEvent::EffectSpawned {
                kind: EffectKind::MuzzleFlash,
                position: origin,
            });
            events.push(CombatEvent::ProjectileSpawned {
                owner: agent,
                origin,
                direction,
                speed: stats.projectile_speed,
                damage,
            });
        }
    }
}

fn nearest_position(candidates: &[Position], from: &Position) -> Option<Position> {
    candidates.iter().copied().min_by(|a, b| {
        from.distance_to(a)
            .total_cmp(&from.distance_to(b))
    })
}

/// Score candidate positions by closeness to the optimal firing
/// distance, with a bonus for height advantage over the target.
fn best_attack_position(
    arena: &BossArena,
    stats: &BossStats,
    target: &Position,
) -> Option<Position> {
    let optimal = stats.attack_range * BOSS_OPTIMAL_RANGE_FRACTION;
    arena
        .attack_positions
        .iter()
        .copied()
        .max_by(|a, b| {
            position_score(a, target, optimal).total_cmp(&position_score(b, target, optimal))
        })
}

fn position_score(candidate: &Position, target: &Position, optimal: f64) -> f64 {
    let range_error = (candidate.distance_to(target) - optimal).abs();
    let mut score = 1.0 / (1.0 + range_error);
    if candidate.altitude() > target.altitude() {
        score += BOSS_HEIGHT_ADVANTAGE_BONUS;
    }
    score
}
