//! Navigation integration.
//!
//! Advances every entity with a pending `NavAgent` request toward its
//! destination at the requested speed, updating `Velocity` so other
//! systems can read the agent's heading. Speed changes are forwarded
//! to the host's animation rig.

use hecs::World;

use dragonfall_core::components::{AgentId, NavAgent};
use dragonfall_core::constants::DT;
use dragonfall_core::enums::AnimParam;
use dragonfall_core::events::CombatEvent;
use dragonfall_core::types::{Position, Velocity};

const SPEED_EPSILON: f64 = 1e-6;

pub fn run(world: &mut World, events: &mut Vec<CombatEvent>) {
    for (_entity, (pos, vel, nav, id)) in world.query_mut::<(
        &mut Position,
        &mut Velocity,
        &mut NavAgent,
        Option<&AgentId>,
    )>() {
        let previous_speed = vel.speed();

        match nav.destination {
            None => {
                *vel = Velocity::default();
            }
            Some(destination) => {
                let step = nav.speed * DT;
                let distance = pos.distance_to(&destination);
                if distance <= step {
                    *pos = destination;
                    *vel = Velocity::default();
                    nav.cancel();
                } else if let Some(direction) = pos.direction_to(&destination) {
                    // distance > step > 0 here, so a direction always exists.
                    *pos = Position::from_dvec3(pos.as_dvec3() + direction * step);
                    *vel = Velocity::from_dvec3(direction * nav.speed);
                    nav.remaining = distance - step;
                }
            }
        }

        if let Some(id) = id {
            let speed = vel.speed();
            if (speed - previous_speed).abs() > SPEED_EPSILON {
                events.push(CombatEvent::AnimationParam {
                    owner: id.0,
                    param: AnimParam::Speed,
                    value: speed,
                });
            }
        }
    }
}
