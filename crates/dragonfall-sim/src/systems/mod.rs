//! ECS systems that run on the simulation world each tick.
//!
//! Systems are free functions over `&mut World` plus whatever shared
//! state they need. They own no state of their own.

pub mod boss;
pub mod cleanup;
pub mod difficulty;
pub mod enemy;
pub mod movement;
pub mod player_tracking;
pub mod smart_tower;
pub mod snapshot;
pub mod tower;

use hecs::World;

use dragonfall_core::components::{AgentId, PlayerShip};
use dragonfall_core::types::{Position, Velocity};

/// Current player pose, if a player entity exists.
pub fn player_pose(world: &World) -> Option<(Position, Velocity)> {
    world
        .query::<(&PlayerShip, &Position, &Velocity)>()
        .iter()
        .next()
        .map(|(_, (_, pos, vel))| (*pos, *vel))
}

/// Resolve a stable agent id to its current entity.
pub fn find_agent(world: &World, agent: u32) -> Option<hecs::Entity> {
    world
        .query::<&AgentId>()
        .iter()
        .find(|(_, id)| id.0 == agent)
        .map(|(entity, _)| entity)
}
