//! Cleanup system: removes dead enemies and destroyed towers.
//!
//! Defeat events are emitted at damage time; this pass only reclaims
//! the entities. The boss entity is kept after defeat so the host can
//! play out its death sequence.

use hecs::{Entity, World};

use dragonfall_core::components::{
    EnemyRuntime, EnemyUnit, SmartTowerRuntime, SmartTowerUnit, TowerRuntime, TowerUnit,
};
use dragonfall_core::enums::EnemyState;

pub fn run(world: &mut World, despawn_buffer: &mut Vec<Entity>) {
    despawn_buffer.clear();

    for (entity, (_unit, runtime)) in world.query_mut::<(&EnemyUnit, &EnemyRuntime)>() {
        if runtime.state == EnemyState::Dead {
            despawn_buffer.push(entity);
        }
    }
    for (entity, (_unit, runtime)) in world.query_mut::<(&TowerUnit, &TowerRuntime)>() {
        if runtime.health <= 0.0 {
            despawn_buffer.push(entity);
        }
    }
    for (entity, (_unit, runtime)) in world.query_mut::<(&SmartTowerUnit, &SmartTowerRuntime)>() {
        if runtime.health <= 0.0 {
            despawn_buffer.push(entity);
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
