//! Target prediction for turret fire control.
//!
//! Three layers, used separately or together: a clamped linear lead, a
//! lateral bias against evasive targets, and an accuracy-scaled jitter
//! so imperfect gunners miss believably.

use glam::DVec3;
use rand::Rng;

use dragonfall_core::constants::*;
use dragonfall_core::types::{Position, Velocity};

const EPSILON: f64 = 1e-9;

/// Linear lead point: estimate time-of-flight from the current
/// distance and project the target forward, clamped to
/// `max_prediction_time`.
pub fn lead_point(
    shooter: &Position,
    target: &Position,
    velocity: &Velocity,
    projectile_speed: f64,
    max_prediction_time: f64,
) -> Position {
    if projectile_speed <= EPSILON {
        return *target;
    }
    let time = (shooter.distance_to(target) / projectile_speed).min(max_prediction_time);
    Position::from_dvec3(target.as_dvec3() + velocity.as_dvec3() * time)
}

/// Full behavioral prediction: linear lead, a sideways offset when the
/// target has been flying evasively, and jitter inversely proportional
/// to the gunner's accuracy.
pub fn predict_target<R: Rng>(
    shooter: &Position,
    target: &Position,
    velocity: &Velocity,
    projectile_speed: f64,
    max_prediction_time: f64,
    evasion_score: f64,
    accuracy: f64,
    rng: &mut R,
) -> Position {
    let led = lead_point(shooter, target, velocity, projectile_speed, max_prediction_time);
    refine_aim(led, velocity, evasion_score, accuracy, rng)
}

/// Apply the behavioral layers to an already-computed aim point: the
/// lateral evasion bias and the accuracy jitter.
pub fn refine_aim<R: Rng>(
    aim: Position,
    velocity: &Velocity,
    evasion_score: f64,
    accuracy: f64,
    rng: &mut R,
) -> Position {
    let mut predicted = aim.as_dvec3();

    if evasion_score > PREDICTION_EVASION_CUTOFF {
        if let Some(heading) = velocity.direction() {
            let lateral = heading.cross(DVec3::Y);
            predicted += lateral * evasion_score * PREDICTION_EVASION_OFFSET;
        }
    }

    let error = (1.0 - accuracy.clamp(0.0, 1.0)) * PREDICTION_JITTER_SCALE;
    if error > EPSILON {
        predicted += random_in_unit_sphere(rng) * error;
    }

    Position::from_dvec3(predicted)
}

/// Exact intercept of a constant-speed projectile with a
/// constant-velocity target: the least positive root of
/// (|v|^2 - s^2) t^2 + 2 (v . d) t + |d|^2 = 0.
/// Falls back to the target's current position when the target
/// outruns the projectile with no forward-in-time solution.
pub fn intercept_point(
    shooter: &Position,
    target: &Position,
    velocity: &Velocity,
    projectile_speed: f64,
) -> Position {
    let d = target.as_dvec3() - shooter.as_dvec3();
    let v = velocity.as_dvec3();
    let a = v.length_squared() - projectile_speed * projectile_speed;
    let b = 2.0 * v.dot(d);
    let c = d.length_squared();

    let time = if a.abs() < EPSILON {
        // Equal speeds degrade the quadratic to b*t + c = 0.
        if b < -EPSILON {
            Some(-c / b)
        } else {
            None
        }
    } else {
        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            None
        } else {
            let root = discriminant.sqrt();
            least_positive((-b - root) / (2.0 * a), (-b + root) / (2.0 * a))
        }
    };

    match time {
        Some(t) => Position::from_dvec3(target.as_dvec3() + v * t),
        None => *target,
    }
}

fn least_positive(t1: f64, t2: f64) -> Option<f64> {
    let lo = t1.min(t2);
    let hi = t1.max(t2);
    if lo > EPSILON {
        Some(lo)
    } else if hi > EPSILON {
        Some(hi)
    } else {
        None
    }
}

/// Uniform point in the unit sphere via rejection sampling.
fn random_in_unit_sphere<R: Rng>(rng: &mut R) -> DVec3 {
    loop {
        let v = DVec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        if v.length_squared() <= 1.0 {
            return v;
        }
    }
}
