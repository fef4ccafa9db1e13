//! Player observation feed.
//!
//! Updates the shared behavior profile from the player entity's pose
//! (fed by the host each tick) and advances the survival clock.

use hecs::World;

use dragonfall_core::components::{BossRuntime, BossUnit};
use dragonfall_core::config::PlayerPerformance;
use dragonfall_core::constants::DT;
use dragonfall_core::enums::BossState;
use dragonfall_core::types::Position;

use dragonfall_ai::profile::PlayerProfile;

use crate::systems::player_pose;

pub fn run(
    world: &World,
    profile: &mut PlayerProfile,
    performance: &mut PlayerPerformance,
    now_secs: f64,
) {
    performance.survival_time += DT;

    let Some((position, velocity)) = player_pose(world) else {
        return;
    };

    // Aggression is measured against the live boss, when there is one.
    let boss_position: Option<Position> = world
        .query::<(&BossUnit, &Position, &BossRuntime)>()
        .iter()
        .find(|(_, (_, _, runtime))| runtime.state != BossState::Defeated)
        .map(|(_, (_, pos, _))| *pos);

    profile.observe(position, velocity, boss_position, now_secs);
}
