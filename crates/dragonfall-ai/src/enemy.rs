//! Generic enemy state machine.
//!
//! Pure transition logic: the caller builds an [`EnemyContext`] from
//! world state each tick, and applies the returned [`EnemyUpdate`]
//! (state change plus requested side effects) back to the entity.

use dragonfall_core::components::EnemyStats;
use dragonfall_core::constants::*;
use dragonfall_core::enums::{EnemyState, EnemyType};
use dragonfall_core::types::Position;

use glam::DVec3;

/// World state visible to one enemy for one evaluation.
#[derive(Debug, Clone)]
pub struct EnemyContext<'a> {
    pub stats: &'a EnemyStats,
    pub state: EnemyState,
    pub position: Position,
    /// Target position, when a live target exists in the world.
    pub target: Option<Position>,
    pub has_patrol_route: bool,
    /// Current patrol waypoint, when a route exists.
    pub patrol_waypoint: Option<Position>,
    /// Dwell time at each waypoint.
    pub patrol_wait_secs: f64,
    /// Whether a navigation request is in flight.
    pub nav_pending: bool,
    pub now_secs: f64,
    pub last_attack_secs: f64,
    pub last_patrol_secs: f64,
}

/// Side effects a state handler asks the caller to perform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyAction {
    Navigate { destination: Position, speed: f64 },
    StopNavigation,
    /// Rotate in place toward the target (stationary shooters).
    FaceTarget,
    /// Fire the attack appropriate to the enemy type.
    Attack,
    /// Waypoint reached; start the dwell clock.
    ArriveAtWaypoint,
    /// Dwell elapsed; move to the next waypoint.
    AdvancePatrol,
}

/// Result of one FSM evaluation.
#[derive(Debug, Clone)]
pub struct EnemyUpdate {
    pub next_state: EnemyState,
    pub changed: bool,
    pub actions: Vec<EnemyAction>,
}

/// Run one tick of the state machine.
pub fn evaluate(ctx: &EnemyContext) -> EnemyUpdate {
    if ctx.state == EnemyState::Dead {
        return EnemyUpdate {
            next_state: EnemyState::Dead,
            changed: false,
            actions: Vec::new(),
        };
    }

    let mut actions = Vec::new();
    let mut next = run_state(ctx, &mut actions);

    // Acquisition runs after the state handler. The lose range sits
    // strictly outside the detection range, so a target hovering at
    // the boundary cannot flicker the state.
    match ctx.target {
        Some(target) => {
            let distance = ctx.position.distance_to(&target);
            match next {
                EnemyState::Idle | EnemyState::Patrol => {
                    if distance <= ctx.stats.detection_range {
                        next = EnemyState::Tracking;
                    }
                }
                EnemyState::Tracking | EnemyState::Attacking | EnemyState::Retreating => {
                    if distance > ctx.stats.lose_target_range {
                        next = fallback_state(ctx);
                    }
                }
                _ => {}
            }
        }
        None => {
            if matches!(
                next,
                EnemyState::Tracking | EnemyState::Attacking | EnemyState::Retreating
            ) {
                next = fallback_state(ctx);
            }
        }
    }

    EnemyUpdate {
        changed: next != ctx.state,
        next_state: next,
        actions,
    }
}

fn fallback_state(ctx: &EnemyContext) -> EnemyState {
    if ctx.has_patrol_route {
        EnemyState::Patrol
    } else {
        EnemyState::Idle
    }
}

fn run_state(ctx: &EnemyContext, actions: &mut Vec<EnemyAction>) -> EnemyState {
    match ctx.state {
        EnemyState::Idle => idle(ctx, actions),
        EnemyState::Patrol => patrol(ctx, actions),
        EnemyState::Tracking => tracking(ctx, actions),
        EnemyState::Attacking => attacking(ctx, actions),
        EnemyState::Retreating => retreating(ctx, actions),
        EnemyState::Dead => EnemyState::Dead,
    }
}

fn idle(ctx: &EnemyContext, actions: &mut Vec<EnemyAction>) -> EnemyState {
    if ctx.nav_pending {
        actions.push(EnemyAction::StopNavigation);
    }
    if ctx.has_patrol_route {
        return EnemyState::Patrol;
    }
    EnemyState::Idle
}

fn patrol(ctx: &EnemyContext, actions: &mut Vec<EnemyAction>) -> EnemyState {
    let Some(waypoint) = ctx.patrol_waypoint else {
        return EnemyState::Idle;
    };
    let distance = ctx.position.distance_to(&waypoint);
    if distance <= ENEMY_PATROL_ARRIVE_DISTANCE {
        if ctx.nav_pending {
            actions.push(EnemyAction::StopNavigation);
            actions.push(EnemyAction::ArriveAtWaypoint);
        } else if ctx.now_secs - ctx.last_patrol_secs >= ctx.patrol_wait_secs {
            actions.push(EnemyAction::AdvancePatrol);
        }
    } else if !ctx.nav_pending {
        actions.push(EnemyAction::Navigate {
            destination: waypoint,
            speed: ctx.stats.move_speed,
        });
    }
    EnemyState::Patrol
}

fn tracking(ctx: &EnemyContext, actions: &mut Vec<EnemyAction>) -> EnemyState {
    let Some(target) = ctx.target else {
        return fallback_state(ctx);
    };
    let distance = ctx.position.distance_to(&target);

    match ctx.stats.enemy_type {
        EnemyType::Soldier => {
            if distance <= ctx.stats.attack_range {
                actions.push(EnemyAction::StopNavigation);
                return EnemyState::Attacking;
            }
            actions.push(EnemyAction::Navigate {
                destination: ground_beneath(&target, &ctx.position),
                speed: ctx.stats.run_speed,
            });
        }
        EnemyType::Archer => {
            if distance < close_distance(ctx.stats) {
                return EnemyState::Retreating;
            }
            if distance <= ctx.stats.preferred_distance {
                actions.push(EnemyAction::StopNavigation);
                return EnemyState::Attacking;
            }
            actions.push(EnemyAction::Navigate {
                destination: ground_beneath(&target, &ctx.position),
                speed: ctx.stats.move_speed,
            });
        }
        EnemyType::Guard => {
            // Guards never move; they rotate until the band is entered.
            actions.push(EnemyAction::FaceTarget);
            if distance <= ctx.stats.attack_range {
                return EnemyState::Attacking;
            }
        }
    }
    EnemyState::Tracking
}

fn attacking(ctx: &EnemyContext, actions: &mut Vec<EnemyAction>) -> EnemyState {
    let Some(target) = ctx.target else {
        return fallback_state(ctx);
    };
    if ctx.nav_pending {
        actions.push(EnemyAction::StopNavigation);
    }
    actions.push(EnemyAction::FaceTarget);

    let distance = ctx.position.distance_to(&target);
    match ctx.stats.enemy_type {
        EnemyType::Soldier | EnemyType::Guard => {
            if distance > ctx.stats.attack_range {
                return EnemyState::Tracking;
            }
        }
        EnemyType::Archer => {
            if distance < close_distance(ctx.stats) {
                return EnemyState::Retreating;
            }
            if distance > ctx.stats.preferred_distance {
                return EnemyState::Tracking;
            }
        }
    }

    if ctx.now_secs - ctx.last_attack_secs >= ctx.stats.attack_cooldown {
        actions.push(EnemyAction::Attack);
    }
    EnemyState::Attacking
}

fn retreating(ctx: &EnemyContext, actions: &mut Vec<EnemyAction>) -> EnemyState {
    let Some(target) = ctx.target else {
        return fallback_state(ctx);
    };
    let distance = ctx.position.distance_to(&target);
    if distance >= ctx.stats.preferred_distance {
        actions.push(EnemyAction::StopNavigation);
        return EnemyState::Tracking;
    }
    if !ctx.nav_pending {
        // Back off horizontally; ground units keep their footing.
        let mut away = ctx.position.as_dvec3() - target.as_dvec3();
        away.y = 0.0;
        let away = away.try_normalize().unwrap_or(DVec3::Z);
        let destination =
            Position::from_dvec3(ctx.position.as_dvec3() + away * ENEMY_RETREAT_STEP);
        actions.push(EnemyAction::Navigate {
            destination,
            speed: ctx.stats.run_speed,
        });
    }
    EnemyState::Retreating
}

fn close_distance(stats: &EnemyStats) -> f64 {
    stats.preferred_distance * ENEMY_CLOSE_FRACTION
}

/// Ground projection of an airborne target at the walker's elevation.
fn ground_beneath(target: &Position, walker: &Position) -> Position {
    Position::new(target.x, walker.y, target.z)
}
