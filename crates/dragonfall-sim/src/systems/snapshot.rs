//! Snapshot construction.
//!
//! One serializable `TickSnapshot` per tick is the engine's whole
//! outward surface besides the drained event list it carries.

use hecs::World;
use serde::{Deserialize, Serialize};

use dragonfall_core::components::{
    AgentId, BossRuntime, BossUnit, EnemyRuntime, EnemyUnit, PlayerShip, SmartTowerRuntime,
    SmartTowerUnit, TowerRuntime, TowerUnit,
};
use dragonfall_core::enums::{AgentKind, BossState, EnemyState, GamePhase};
use dragonfall_core::events::CombatEvent;
use dragonfall_core::types::{Position, SimTime, Velocity};

use crate::systems::difficulty::DifficultyState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub position: Position,
    pub velocity: Velocity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub agent: u32,
    pub kind: AgentKind,
    pub position: Position,
    pub health: f64,
    pub boss_state: Option<BossState>,
    pub enemy_state: Option<EnemyState>,
    pub engaged: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickSnapshot {
    pub tick: u64,
    pub elapsed_secs: f64,
    pub phase: GamePhase,
    pub difficulty_index: usize,
    pub difficulty_name: String,
    pub performance_score: f64,
    pub player: Option<PlayerSnapshot>,
    pub agents: Vec<AgentSnapshot>,
    pub events: Vec<CombatEvent>,
}

pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    phase: GamePhase,
    difficulty: &DifficultyState,
    performance_score: f64,
    events: Vec<CombatEvent>,
) -> TickSnapshot {
    let player = world
        .query::<(&PlayerShip, &Position, &Velocity)>()
        .iter()
        .next()
        .map(|(_, (_, pos, vel))| PlayerSnapshot {
            position: *pos,
            velocity: *vel,
        });

    let mut agents = Vec::new();
    for (_e, (_unit, id, pos, runtime)) in world
        .query::<(&BossUnit, &AgentId, &Position, &BossRuntime)>()
        .iter()
    {
        agents.push(AgentSnapshot {
            agent: id.0,
            kind: AgentKind::Boss,
            position: *pos,
            health: runtime.health,
            boss_state: Some(runtime.state),
            enemy_state: None,
            engaged: None,
        });
    }
    for (_e, (_unit, id, pos, runtime)) in world
        .query::<(&EnemyUnit, &AgentId, &Position, &EnemyRuntime)>()
        .iter()
    {
        agents.push(AgentSnapshot {
            agent: id.0,
            kind: AgentKind::Enemy,
            position: *pos,
            health: runtime.health,
            boss_state: None,
            enemy_state: Some(runtime.state),
            engaged: None,
        });
    }
    for (_e, (_unit, id, pos, runtime)) in world
        .query::<(&TowerUnit, &AgentId, &Position, &TowerRuntime)>()
        .iter()
    {
        agents.push(AgentSnapshot {
            agent: id.0,
            kind: AgentKind::Tower,
            position: *pos,
            health: runtime.health,
            boss_state: None,
            enemy_state: None,
            engaged: Some(runtime.engaged),
        });
    }
    for (_e, (_unit, id, pos, runtime)) in world
        .query::<(&SmartTowerUnit, &AgentId, &Position, &SmartTowerRuntime)>()
        .iter()
    {
        agents.push(AgentSnapshot {
            agent: id.0,
            kind: AgentKind::Tower,
            position: *pos,
            health: runtime.health,
            boss_state: None,
            enemy_state: None,
            engaged: Some(runtime.engaged),
        });
    }

    // hecs iteration order is not part of the contract; agent ids are.
    agents.sort_by_key(|a| a.agent);

    TickSnapshot {
        tick: time.tick,
        elapsed_secs: time.elapsed_secs,
        phase,
        difficulty_index: difficulty.current_index,
        difficulty_name: difficulty.current().name.clone(),
        performance_score,
        player,
        agents,
        events,
    }
}
