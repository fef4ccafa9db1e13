//! Player-behavior profiling.
//!
//! The boss decision layer reads the rolling [`PlayerProfile`]; smart
//! towers keep their own per-tower [`MovementSample`] windows and use
//! the free functions here to analyze them.

use std::collections::HashMap;

use glam::DVec3;

use dragonfall_core::components::{BehaviorSummary, MovementSample};
use dragonfall_core::constants::*;
use dragonfall_core::types::{Position, Velocity};

/// Smoothing factor for the aggression/evasion running scores.
const SCORE_SMOOTHING: f64 = 0.1;

/// Rolling profile of the tracked player, updated once per tick by the
/// engine and shared read-only with every decision consumer.
#[derive(Debug, Clone)]
pub struct PlayerProfile {
    pub last_position: Position,
    pub last_velocity: Velocity,
    pub average_position: Position,
    pub average_altitude: f64,
    pub average_speed: f64,
    /// How often each tactic has been used against this player.
    pub tactic_counts: HashMap<&'static str, u32>,
    /// Observed willingness to close distance, in [0, 1].
    pub aggression_score: f64,
    /// Observed evasiveness, in [0, 1].
    pub evasion_score: f64,
    pub last_update_secs: f64,
    window: Vec<MovementSample>,
    last_observer_distance: Option<f64>,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerProfile {
    pub fn new() -> Self {
        Self {
            last_position: Position::default(),
            last_velocity: Velocity::default(),
            average_position: Position::default(),
            average_altitude: 0.0,
            average_speed: 0.0,
            tactic_counts: HashMap::new(),
            aggression_score: 0.5,
            evasion_score: 0.5,
            last_update_secs: 0.0,
            window: Vec::new(),
            last_observer_distance: None,
        }
    }

    /// Record one observation of the player. `observer` is the boss
    /// position when a boss is alive; approach toward it feeds the
    /// aggression score.
    pub fn observe(
        &mut self,
        position: Position,
        velocity: Velocity,
        observer: Option<Position>,
        now_secs: f64,
    ) {
        self.last_position = position;
        self.last_velocity = velocity;
        self.last_update_secs = now_secs;

        let sample = MovementSample {
            position,
            velocity,
            altitude: position.altitude(),
            timestamp_secs: now_secs,
            was_evasive: false,
        };
        push_bounded(&mut self.window, sample, PROFILE_PATH_CAPACITY);
        // The evasive flag looks at the window including this sample.
        let evasive = is_evasive(&self.window);
        if let Some(last) = self.window.last_mut() {
            last.was_evasive = evasive;
        }

        let summary = analyze(&self.window);
        self.average_speed = summary.average_speed;
        self.average_altitude = summary.preferred_altitude;
        self.average_position = mean_position(&self.window);

        let evasive_target = if evasive { 1.0 } else { 0.0 };
        self.evasion_score += (evasive_target - self.evasion_score) * SCORE_SMOOTHING;

        if let Some(observer) = observer {
            let distance = position.distance_to(&observer);
            if let Some(previous) = self.last_observer_distance {
                let closing = if distance < previous { 1.0 } else { 0.0 };
                self.aggression_score += (closing - self.aggression_score) * SCORE_SMOOTHING;
            }
            self.last_observer_distance = Some(distance);
        } else {
            self.last_observer_distance = None;
        }
    }

    /// Bump the frequency count for a tactic that was just committed.
    pub fn record_tactic(&mut self, name: &'static str) {
        *self.tactic_counts.entry(name).or_insert(0) += 1;
    }

    /// The tactic used most often so far, if any.
    pub fn preferred_tactic(&self) -> Option<&'static str> {
        self.tactic_counts
            .iter()
            .max_by_key(|(_, count)| **count)
            .map(|(name, _)| *name)
    }

    pub fn sample_count(&self) -> usize {
        self.window.len()
    }

    pub fn samples(&self) -> &[MovementSample] {
        &self.window
    }
}

/// Append a sample, dropping the oldest once the window is full.
pub fn push_bounded(history: &mut Vec<MovementSample>, sample: MovementSample, capacity: usize) {
    history.push(sample);
    while history.len() > capacity {
        history.remove(0);
    }
}

/// Direction-change variance over the last three samples: the sum of
/// (1 - cos) between consecutive headings. Zero when fewer than three
/// samples carry a usable heading.
pub fn direction_variance(samples: &[MovementSample]) -> f64 {
    if samples.len() < 3 {
        return 0.0;
    }
    let tail = &samples[samples.len() - 3..];
    let mut variance = 0.0;
    for pair in tail.windows(2) {
        if let (Some(a), Some(b)) = (pair[0].velocity.direction(), pair[1].velocity.direction()) {
            variance += 1.0 - a.dot(b);
        }
    }
    variance
}

/// Whether the window's most recent motion counts as evasive.
pub fn is_evasive(samples: &[MovementSample]) -> bool {
    direction_variance(samples) > EVASION_VARIANCE_THRESHOLD
}

/// Derive window aggregates for prediction and tower adaptation.
pub fn analyze(samples: &[MovementSample]) -> BehaviorSummary {
    if samples.is_empty() {
        return BehaviorSummary::default();
    }
    let count = samples.len() as f64;
    let average_speed = samples.iter().map(|s| s.velocity.speed()).sum::<f64>() / count;
    let preferred_altitude = samples.iter().map(|s| s.altitude).sum::<f64>() / count;
    let evasive = samples.iter().filter(|s| s.was_evasive).count() as f64;

    // Slow samples carry no meaningful heading.
    let mut heading_sum = DVec3::ZERO;
    for sample in samples {
        if sample.velocity.speed() >= HEADING_MIN_SPEED {
            if let Some(direction) = sample.velocity.direction() {
                heading_sum += direction;
            }
        }
    }
    let dominant_heading = heading_sum.try_normalize().unwrap_or(DVec3::ZERO);

    BehaviorSummary {
        average_speed,
        preferred_altitude,
        dominant_heading,
        evasion_ratio: evasive / count,
    }
}

fn mean_position(samples: &[MovementSample]) -> Position {
    if samples.is_empty() {
        return Position::default();
    }
    let sum = samples
        .iter()
        .fold(DVec3::ZERO, |acc, s| acc + s.position.as_dvec3());
    Position::from_dvec3(sum / samples.len() as f64)
}
