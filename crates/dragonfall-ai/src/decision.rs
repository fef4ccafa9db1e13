//! Boss situation fingerprinting and tactic synthesis.
//!
//! Synthesis is a pure function of the [`SituationContext`], so the
//! same quantized situation always produces the same tactic and cached
//! results stay interchangeable with fresh ones.

use dragonfall_core::constants::*;
use dragonfall_core::enums::{BossState, BossTactic};

/// Distance beyond this multiple of attack range forces a reposition.
const REPOSITION_RANGE_FACTOR: f64 = 1.5;

/// Health fraction below which a ready special ability is spent.
const SPECIAL_HEALTH_FRACTION: f64 = 0.5;

/// Everything tactic synthesis looks at, captured at request time.
#[derive(Debug, Clone, PartialEq)]
pub struct SituationContext {
    pub health_fraction: f64,
    pub distance_to_target: f64,
    pub target_altitude: f64,
    pub state: BossState,
    pub special_ready: bool,
    pub attack_range: f64,
}

/// Quantized situation key: one decimal of health fraction, whole-unit
/// distance and altitude, plus the current state.
pub fn fingerprint(ctx: &SituationContext) -> String {
    format!(
        "{:.1}_{:.0}_{:.0}_{:?}",
        ctx.health_fraction, ctx.distance_to_target, ctx.target_altitude, ctx.state
    )
}

/// Choose a tactic for the situation. Checks run in priority order;
/// survival outranks positioning, which outranks offense.
pub fn synthesize(ctx: &SituationContext) -> BossTactic {
    if ctx.health_fraction < BOSS_EMERGENCY_HEALTH_FRACTION {
        return BossTactic::DefensiveRetreat;
    }
    if ctx.distance_to_target > ctx.attack_range * REPOSITION_RANGE_FACTOR {
        return BossTactic::TacticalReposition;
    }
    if ctx.special_ready && ctx.health_fraction < SPECIAL_HEALTH_FRACTION {
        return BossTactic::SpecialAbility;
    }
    if ctx.distance_to_target <= ctx.attack_range {
        return BossTactic::AggressiveAttack;
    }
    BossTactic::AreaDenial
}

/// An in-flight synthesis request. Results land a fixed number of
/// ticks after the request, modeling a decision backend that is slower
/// than the simulation loop.
#[derive(Debug, Clone)]
pub struct PendingDecision {
    pub context: SituationContext,
    pub fingerprint: String,
    pub ready_tick: u64,
}

impl PendingDecision {
    pub fn new(context: SituationContext, now_tick: u64) -> Self {
        let fingerprint = fingerprint(&context);
        Self {
            context,
            fingerprint,
            ready_tick: now_tick + BOSS_DECISION_LATENCY_TICKS,
        }
    }

    pub fn ready(&self, now_tick: u64) -> bool {
        now_tick >= self.ready_tick
    }

    pub fn resolve(&self) -> BossTactic {
        synthesize(&self.context)
    }
}
