//! Tick-based timer queue.
//!
//! Replaces wall-clock delays with deterministic, serializable timers:
//! channel completion, staggered area attacks, and the two-step
//! despawn/respawn sequence of a difficulty transition.

use serde::{Deserialize, Serialize};

use dragonfall_core::constants::DT;

/// What to do when a timer fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TimerAction {
    /// End a boss special-ability channel and release the payload.
    FinishChannel { agent: u32 },
    /// Fire one area-denial volley; reschedules while `remaining` > 0.
    AreaAttack { agent: u32, remaining: u32 },
    /// Clear the current encounter ahead of a difficulty change.
    DifficultyDespawn { to_index: usize },
    /// Rebuild the encounter on the new rung.
    DifficultyRespawn { to_index: usize },
    /// One enemy of a staggered respawn wave.
    SpawnEnemy { index: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledTimer {
    pub due_tick: u64,
    pub action: TimerAction,
}

/// FIFO-within-tick timer queue. Timers due on the same tick fire in
/// the order they were scheduled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimerQueue {
    timers: Vec<ScheduledTimer>,
}

impl TimerQueue {
    pub fn schedule_at(&mut self, due_tick: u64, action: TimerAction) {
        self.timers.push(ScheduledTimer { due_tick, action });
    }

    /// Schedule `secs` of sim time from `now_tick`, rounded up to a
    /// whole tick so an action never fires early.
    pub fn schedule_in(&mut self, now_tick: u64, secs: f64, action: TimerAction) {
        let ticks = (secs / DT).ceil().max(1.0) as u64;
        self.schedule_at(now_tick + ticks, action);
    }

    /// Remove and return every action due at or before `now_tick`.
    pub fn drain_due(&mut self, now_tick: u64) -> Vec<TimerAction> {
        let mut due = Vec::new();
        let mut remaining = Vec::with_capacity(self.timers.len());
        for timer in self.timers.drain(..) {
            if timer.due_tick <= now_tick {
                due.push(timer.action);
            } else {
                remaining.push(timer);
            }
        }
        self.timers = remaining;
        due
    }

    /// Drop all timers owned by one agent.
    pub fn cancel_for_agent(&mut self, agent: u32) {
        self.timers.retain(|t| {
            !matches!(
                t.action,
                TimerAction::FinishChannel { agent: a } | TimerAction::AreaAttack { agent: a, .. }
                    if a == agent
            )
        });
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
