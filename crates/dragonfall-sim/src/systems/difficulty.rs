//! Difficulty adaptation controller.
//!
//! Evaluates the player-performance score on a fixed cadence and, when
//! a threshold is crossed, schedules the two-step despawn/respawn
//! transition through the timer queue. Rung changes are budgeted per
//! level so one hot streak cannot sweep the whole ladder.

use dragonfall_core::config::{default_ladder, DifficultyConfig, DifficultyLevel, PlayerPerformance};
use dragonfall_core::constants::DIFFICULTY_DESPAWN_DELAY;
use dragonfall_core::types::SimTime;

use crate::timers::{TimerAction, TimerQueue};

#[derive(Debug, Clone)]
pub struct DifficultyState {
    pub config: DifficultyConfig,
    pub enabled: bool,
    pub current_index: usize,
    pub changes_this_level: u32,
    pub last_evaluation_secs: f64,
    /// Target rung while a despawn/respawn sequence is in flight.
    pub transition_target: Option<usize>,
}

impl DifficultyState {
    /// Build from an already-validated config. `enabled` may still be
    /// forced off by the engine when validation failed.
    pub fn new(mut config: DifficultyConfig, enabled: bool) -> Self {
        // A rejected ladder disables adaptation, but the engine still
        // needs a rung to spawn and report from.
        if config.levels.is_empty() {
            tracing::warn!("empty difficulty ladder, substituting defaults");
            config.levels = default_ladder();
        }
        let current_index = config.clamped_start();
        Self {
            enabled: enabled && config.enabled,
            config,
            current_index,
            changes_this_level: 0,
            last_evaluation_secs: 0.0,
            transition_target: None,
        }
    }

    pub fn current(&self) -> &DifficultyLevel {
        // current_index is clamped at construction and on every change.
        &self.config.levels[self.current_index.min(self.config.levels.len() - 1)]
    }
}

pub fn run(
    state: &mut DifficultyState,
    performance: &PlayerPerformance,
    time: &SimTime,
    timers: &mut TimerQueue,
) {
    if !state.enabled {
        return;
    }
    let now = time.elapsed_secs;
    if now - state.last_evaluation_secs < state.config.adaptation_interval {
        return;
    }
    state.last_evaluation_secs = now;

    if state.transition_target.is_some() {
        return;
    }
    if state.changes_this_level >= state.config.max_changes_per_level {
        return;
    }

    let score = performance.overall_score();
    let top = state.config.levels.len() - 1;
    let target = if score >= state.config.increase_threshold {
        (state.current_index + 1).min(top)
    } else if score <= state.config.decrease_threshold {
        state.current_index.saturating_sub(1)
    } else {
        state.current_index
    };

    if target != state.current_index {
        state.changes_this_level += 1;
        state.transition_target = Some(target);
        tracing::info!(
            score,
            from = state.current_index,
            to = target,
            "difficulty transition scheduled"
        );
        timers.schedule_in(
            time.tick,
            DIFFICULTY_DESPAWN_DELAY,
            TimerAction::DifficultyDespawn { to_index: target },
        );
    }
}
