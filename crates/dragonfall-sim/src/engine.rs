//! Simulation engine, the combat core's single entry point.
//!
//! `SimulationEngine` owns the hecs world, the shared player profile,
//! the decision cache, and the timer queue. The host feeds it
//! `HostCommand`s, calls `tick()` at a fixed rate, and drains the
//! returned `TickSnapshot`s. Completely headless and deterministic for
//! a given seed and command stream.

use std::collections::{HashMap, VecDeque};

use hecs::World;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use dragonfall_core::commands::HostCommand;
use dragonfall_core::components::{
    armored_damage, BossArena, BossRuntime, BossStats, EnemyRuntime, EnemyStats, EnemyUnit,
    PlayerShip, SmartTowerRuntime, SmartTowerUnit, TowerRuntime, TowerUnit,
};
use dragonfall_core::config::{DifficultyConfig, PlayerPerformance};
use dragonfall_core::constants::*;
use dragonfall_core::enums::{
    AgentKind, AnimParam, AudioCue, BossState, EffectKind, EnemyState, GamePhase,
};
use dragonfall_core::events::CombatEvent;
use dragonfall_core::types::{Position, SimTime, Velocity};

use dragonfall_ai::cache::DecisionCache;
use dragonfall_ai::decision::PendingDecision;
use dragonfall_ai::profile::PlayerProfile;

use crate::systems;
use crate::systems::boss::fire_volley;
use crate::systems::difficulty::DifficultyState;
use crate::systems::snapshot::{build_snapshot, TickSnapshot};
use crate::timers::{TimerAction, TimerQueue};
use crate::world_setup;

/// Horizontal scatter of an area-denial volley (world units).
const AREA_ATTACK_SPREAD: f64 = 4.0;

/// Configuration for starting a new simulation.
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    pub difficulty: DifficultyConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            difficulty: DifficultyConfig::default(),
        }
    }
}

/// The simulation engine. Owns the ECS world and all shared AI state.
pub struct SimulationEngine {
    world: World,
    time: SimTime,
    phase: GamePhase,
    rng: ChaCha8Rng,
    next_agent_id: u32,
    command_queue: VecDeque<HostCommand>,
    events: Vec<CombatEvent>,
    despawn_buffer: Vec<hecs::Entity>,
    timers: TimerQueue,
    profile: PlayerProfile,
    decision_cache: DecisionCache,
    pending_decisions: HashMap<u32, PendingDecision>,
    difficulty: DifficultyState,
    performance: PlayerPerformance,
}

impl SimulationEngine {
    /// Create a new engine. A difficulty config that fails validation
    /// disables adaptation instead of failing construction; the host
    /// keeps a playable (static) encounter either way.
    pub fn new(config: SimConfig) -> Self {
        let enabled = match config.difficulty.validate() {
            Ok(()) => true,
            Err(error) => {
                tracing::error!(%error, "difficulty config rejected, adaptation disabled");
                false
            }
        };
        Self {
            world: World::new(),
            time: SimTime::default(),
            phase: GamePhase::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            next_agent_id: 0,
            command_queue: VecDeque::new(),
            events: Vec::new(),
            despawn_buffer: Vec::new(),
            timers: TimerQueue::default(),
            profile: PlayerProfile::new(),
            decision_cache: DecisionCache::default(),
            pending_decisions: HashMap::new(),
            difficulty: DifficultyState::new(config.difficulty, enabled),
            performance: PlayerPerformance::new(0.0),
        }
    }

    /// Queue a host command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: HostCommand) {
        self.command_queue.push_back(command);
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = HostCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the snapshot.
    pub fn tick(&mut self) -> TickSnapshot {
        self.process_commands();

        if self.phase == GamePhase::Active {
            self.run_systems();
            self.time.advance();
        }

        let events = std::mem::take(&mut self.events);
        build_snapshot(
            &self.world,
            &self.time,
            self.phase,
            &self.difficulty,
            self.performance.overall_score(),
            events,
        )
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn difficulty(&self) -> &DifficultyState {
        &self.difficulty
    }

    pub fn performance(&self) -> &PlayerPerformance {
        &self.performance
    }

    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    #[cfg(test)]
    pub fn decision_cache(&self) -> &DecisionCache {
        &self.decision_cache
    }

    #[cfg(test)]
    pub fn pending_decision_count(&self) -> usize {
        self.pending_decisions.len()
    }

    #[cfg(test)]
    pub fn timer_count(&self) -> usize {
        self.timers.len()
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: HostCommand) {
        match command {
            HostCommand::SetPlayerPose { position, velocity } => {
                self.set_player_pose(position, velocity);
            }
            HostCommand::DamageAgent { agent, amount } => {
                self.apply_damage(agent, amount);
            }
            HostCommand::StunBoss { agent } => {
                self.set_boss_stun(agent, true);
            }
            HostCommand::ReleaseBoss { agent } => {
                self.set_boss_stun(agent, false);
            }
            HostCommand::ReportKill { kind } => match kind {
                AgentKind::Boss => self.performance.bosses_defeated += 1,
                AgentKind::Enemy => self.performance.enemies_defeated += 1,
                AgentKind::Tower => self.performance.towers_destroyed += 1,
            },
            HostCommand::ReportDamageReceived { amount } => {
                self.performance.damage_received += amount;
            }
            HostCommand::ReportAccuracy { value } => {
                self.performance.accuracy_rating = value.clamp(0.0, 1.0);
            }
            HostCommand::ReportEvasion { value } => {
                self.performance.evasion_rating = value.clamp(0.0, 1.0);
            }
            HostCommand::StartEncounter => {
                if self.phase == GamePhase::Idle {
                    if systems::player_pose(&self.world).is_none() {
                        world_setup::spawn_player(&mut self.world);
                    }
                    let rung = self.difficulty.current().clone();
                    world_setup::spawn_boss(&mut self.world, &mut self.next_agent_id, &rung);
                    world_setup::spawn_encounter(
                        &mut self.world,
                        &mut self.next_agent_id,
                        &mut self.rng,
                        &rung,
                    );
                    self.performance = PlayerPerformance::new(self.time.elapsed_secs);
                    self.phase = GamePhase::Active;
                }
            }
            HostCommand::StartNewLevel => {
                self.performance.start_new_level();
                self.difficulty.changes_this_level = 0;
            }
            HostCommand::Pause => {
                if self.phase == GamePhase::Active {
                    self.phase = GamePhase::Paused;
                }
            }
            HostCommand::Resume => {
                if self.phase == GamePhase::Paused {
                    self.phase = GamePhase::Active;
                }
            }
        }
    }

    fn set_player_pose(&mut self, position: Position, velocity: Velocity) {
        let player = self
            .world
            .query::<&PlayerShip>()
            .iter()
            .next()
            .map(|(entity, _)| entity);
        match player {
            Some(entity) => {
                if let Ok(mut pos) = self.world.get::<&mut Position>(entity) {
                    *pos = position;
                }
                if let Ok(mut vel) = self.world.get::<&mut Velocity>(entity) {
                    *vel = velocity;
                }
            }
            None => {
                self.world.spawn((PlayerShip, position, velocity));
            }
        }
    }

    fn apply_damage(&mut self, agent: u32, amount: f64) {
        let Some(entity) = systems::find_agent(&self.world, agent) else {
            return;
        };

        // Boss.
        if let Ok((armor, max_health)) = self
            .world
            .get::<&BossStats>(entity)
            .map(|s| (s.armor, s.max_health))
        {
            let damage = armored_damage(amount, armor);
            let mut died_from = None;
            if let Ok(mut runtime) = self.world.get::<&mut BossRuntime>(entity) {
                if runtime.state == BossState::Defeated {
                    return;
                }
                runtime.health -= damage;
                if runtime.health <= 0.0 {
                    runtime.health = 0.0;
                    died_from = Some(runtime.state);
                    runtime.state = BossState::Defeated;
                } else if runtime.health / max_health < BOSS_EMERGENCY_HEALTH_FRACTION {
                    // Heavy damage demands an immediate rethink.
                    runtime.last_decision_secs = f64::MIN;
                }
            }
            self.push_hit_feedback(agent);
            if let Some(from) = died_from {
                self.pending_decisions.remove(&agent);
                self.timers.cancel_for_agent(agent);
                self.performance.bosses_defeated += 1;
                self.events.push(CombatEvent::BossStateChanged {
                    owner: agent,
                    from,
                    to: BossState::Defeated,
                });
                self.push_death_feedback(agent, AgentKind::Boss);
            }
            return;
        }

        // Enemy.
        if let Ok(armor) = self.world.get::<&EnemyStats>(entity).map(|s| s.armor) {
            let damage = armored_damage(amount, armor);
            let mut died_from = None;
            let mut aggro_from = None;
            if let Ok(mut runtime) = self.world.get::<&mut EnemyRuntime>(entity) {
                if runtime.state == EnemyState::Dead {
                    return;
                }
                runtime.health -= damage;
                if runtime.health <= 0.0 {
                    runtime.health = 0.0;
                    died_from = Some(runtime.state);
                    runtime.state = EnemyState::Dead;
                } else if matches!(runtime.state, EnemyState::Idle | EnemyState::Patrol) {
                    // Taking fire reveals the attacker.
                    aggro_from = Some(runtime.state);
                    runtime.state = EnemyState::Tracking;
                }
            }
            self.push_hit_feedback(agent);
            if let Some(from) = died_from {
                self.performance.enemies_defeated += 1;
                self.events.push(CombatEvent::EnemyStateChanged {
                    owner: agent,
                    from,
                    to: EnemyState::Dead,
                });
                self.push_death_feedback(agent, AgentKind::Enemy);
            } else if let Some(from) = aggro_from {
                self.events.push(CombatEvent::EnemyStateChanged {
                    owner: agent,
                    from,
                    to: EnemyState::Tracking,
                });
            }
            return;
        }

        // Towers take unreduced damage.
        let mut tower_died = false;
        if let Ok(mut runtime) = self.world.get::<&mut TowerRuntime>(entity) {
            if runtime.health <= 0.0 {
                return;
            }
            runtime.health -= amount;
            tower_died = runtime.health <= 0.0;
        } else if let Ok(mut runtime) = self.world.get::<&mut SmartTowerRuntime>(entity) {
            if runtime.health <= 0.0 {
                return;
            }
            runtime.health -= amount;
            tower_died = runtime.health <= 0.0;
        } else {
            return;
        }
        self.push_hit_feedback(agent);
        if tower_died {
            self.performance.towers_destroyed += 1;
            self.push_death_feedback(agent, AgentKind::Tower);
        }
    }

    fn push_hit_feedback(&mut self, agent: u32) {
        self.events.push(CombatEvent::AnimationParam {
            owner: agent,
            param: AnimParam::Hit,
            value: 1.0,
        });
        self.events.push(CombatEvent::AudioPlayed {
            owner: agent,
            cue: AudioCue::Damage,
            clip_index: self.rng.gen_range(0..2),
        });
    }

    fn push_death_feedback(&mut self, agent: u32, kind: AgentKind) {
        self.events.push(CombatEvent::AgentDefeated { owner: agent, kind });
        self.events.push(CombatEvent::AnimationParam {
            owner: agent,
            param: AnimParam::Dead,
            value: 1.0,
        });
        self.events.push(CombatEvent::AudioPlayed {
            owner: agent,
            cue: AudioCue::Death,
            clip_index: 0,
        });
    }

    fn set_boss_stun(&mut self, agent: u32, stunned: bool) {
        let Some(entity) = systems::find_agent(&self.world, agent) else {
            return;
        };
        let mut change = None;
        if let Ok(mut runtime) = self.world.get::<&mut BossRuntime>(entity) {
            if stunned && !matches!(runtime.state, BossState::Defeated | BossState::Stunned) {
                change = Some((runtime.state, BossState::Stunned));
                runtime.state = BossState::Stunned;
            } else if !stunned && runtime.state == BossState::Stunned {
                change = Some((BossState::Stunned, BossState::Hunting));
                runtime.state = BossState::Hunting;
            }
        }
        if let Some((from, to)) = change {
            if to == BossState::Stunned {
                // A stun invalidates whatever the boss was deciding.
                self.pending_decisions.remove(&agent);
                self.timers.cancel_for_agent(agent);
            }
            self.events.push(CombatEvent::BossStateChanged {
                owner: agent,
                from,
                to,
            });
        }
    }

    /// Run all systems in deterministic order.
    fn run_systems(&mut self) {
        // 1. Player observation feed.
        systems::player_tracking::run(
            &self.world,
            &mut self.profile,
            &mut self.performance,
            self.time.elapsed_secs,
        );
        // 2. Boss decision layer and state machine.
        systems::boss::run(
            &mut self.world,
            &self.time,
            &mut self.profile,
            &mut self.decision_cache,
            &mut self.pending_decisions,
            &mut self.timers,
            &mut self.rng,
            &mut self.events,
        );
        // 3. Generic enemies.
        systems::enemy::run(&mut self.world, &self.time, &mut self.rng, &mut self.events);
        // 4. Plain towers.
        systems::tower::run(&mut self.world, &self.time, &mut self.rng, &mut self.events);
        // 5. Smart tower network.
        systems::smart_tower::run(&mut self.world, &self.time, &mut self.rng, &mut self.events);
        // 6. Due timers (channels, volleys, difficulty transitions).
        for action in self.timers.drain_due(self.time.tick) {
            self.apply_timer_action(action);
        }
        // 7. Navigation integration.
        systems::movement::run(&mut self.world, &mut self.events);
        // 8. Difficulty evaluation.
        systems::difficulty::run(
            &mut self.difficulty,
            &self.performance,
            &self.time,
            &mut self.timers,
        );
        // 9. Corpse and rubble reclamation.
        systems::cleanup::run(&mut self.world, &mut self.despawn_buffer);
    }

    fn apply_timer_action(&mut self, action: TimerAction) {
        match action {
            TimerAction::FinishChannel { agent } => self.finish_channel(agent),
            TimerAction::AreaAttack { agent, remaining } => self.area_attack(agent, remaining),
            TimerAction::DifficultyDespawn { to_index } => self.difficulty_despawn(to_index),
            TimerAction::DifficultyRespawn { to_index } => self.difficulty_respawn(to_index),
            TimerAction::SpawnEnemy { index } => {
                let rung = self.difficulty.current().clone();
                world_setup::spawn_encounter_enemy(
                    &mut self.world,
                    &mut self.next_agent_id,
                    &mut self.rng,
                    &rung,
                    index,
                );
            }
        }
    }

    /// Channel complete: release the special payload and rejoin combat.
    fn finish_channel(&mut self, agent: u32) {
        let Some(entity) = systems::find_agent(&self.world, agent) else {
            return;
        };
        let Ok(stats) = self.world.get::<&BossStats>(entity).map(|s| (*s).clone()) else {
            return;
        };
        let Ok(arena) = self.world.get::<&BossArena>(entity).map(|a| (*a).clone()) else {
            return;
        };
        let Ok(position) = self.world.get::<&Position>(entity).map(|p| *p) else {
            return;
        };

        let mut released = false;
        if let Ok(mut runtime) = self.world.get::<&mut BossRuntime>(entity) {
            if runtime.state == BossState::Channeling {
                runtime.state = BossState::Engaging;
                released = true;
            }
        }
        if !released {
            return;
        }

        self.events.push(CombatEvent::BossStateChanged {
            owner: agent,
            from: BossState::Channeling,
            to: BossState::Engaging,
        });
        if let Some((target, velocity)) = systems::player_pose(&self.world) {
            fire_volley(
                stats.special_damage,
                &stats,
                &arena,
                position,
                target,
                velocity,
                &mut self.events,
                agent,
            );
        }
    }

    /// One area-denial volley at the target's current whereabouts.
    fn area_attack(&mut self, agent: u32, remaining: u32) {
        let Some(entity) = systems::find_agent(&self.world, agent) else {
            return;
        };
        let Ok(state) = self.world.get::<&BossRuntime>(entity).map(|r| r.state) else {
            return;
        };
        if matches!(state, BossState::Defeated | BossState::Stunned) {
            return;
        }
        let Ok(stats) = self.world.get::<&BossStats>(entity).map(|s| (*s).clone()) else {
            return;
        };
        let Ok(arena) = self.world.get::<&BossArena>(entity).map(|a| (*a).clone()) else {
            return;
        };
        let Ok(position) = self.world.get::<&Position>(entity).map(|p| *p) else {
            return;
        };

        if let Some((target, _)) = systems::player_pose(&self.world) {
            // Saturate the area around the target, not the target itself.
            let scattered = Position::new(
                target.x + self.rng.gen_range(-AREA_ATTACK_SPREAD..=AREA_ATTACK_SPREAD),
                target.y,
                target.z + self.rng.gen_range(-AREA_ATTACK_SPREAD..=AREA_ATTACK_SPREAD),
            );
            fire_volley(
                stats.primary_damage,
                &stats,
                &arena,
                position,
                scattered,
                Velocity::default(),
                &mut self.events,
                agent,
            );
        }

        if remaining > 1 {
            self.timers.schedule_in(
                self.time.tick,
                BOSS_AREA_ATTACK_STAGGER,
                TimerAction::AreaAttack {
                    agent,
                    remaining: remaining - 1,
                },
            );
        }
    }

    /// Step one of a difficulty transition: clear the encounter.
    fn difficulty_despawn(&mut self, to_index: usize) {
        self.despawn_buffer.clear();
        for (entity, _) in self.world.query::<&EnemyUnit>().iter() {
            self.despawn_buffer.push(entity);
        }
        for (entity, _) in self.world.query::<&TowerUnit>().iter() {
            self.despawn_buffer.push(entity);
        }
        for (entity, _) in self.world.query::<&SmartTowerUnit>().iter() {
            self.despawn_buffer.push(entity);
        }
        for entity in std::mem::take(&mut self.despawn_buffer) {
            if let Ok(position) = self.world.get::<&Position>(entity).map(|p| *p) {
                self.events.push(CombatEvent::EffectSpawned {
                    kind: EffectKind::DespawnFlash,
                    position,
                });
            }
            let _ = self.world.despawn(entity);
        }
        self.timers.schedule_in(
            self.time.tick,
            DIFFICULTY_RESPAWN_DELAY,
            TimerAction::DifficultyRespawn { to_index },
        );
    }

    /// Step two: land on the new rung and rebuild the encounter.
    fn difficulty_respawn(&mut self, to_index: usize) {
        let from = self.difficulty.current_index;
        let to = to_index.min(self.difficulty.config.levels.len() - 1);
        self.difficulty.current_index = to;
        self.difficulty.transition_target = None;

        let rung = self.difficulty.current().clone();
        self.events.push(CombatEvent::DifficultyChanged {
            from_index: from,
            to_index: to,
            name: rung.name.clone(),
        });
        tracing::info!(from, to, name = %rung.name, "difficulty changed");

        // The boss persists; retune its health pool, cadences, and
        // damage from base values so transitions never compound.
        let retuned = world_setup::boss_stats_for(&rung);
        for (_e, stats) in self.world.query_mut::<&mut BossStats>() {
            stats.max_health = retuned.max_health;
            stats.decision_interval = retuned.decision_interval;
            stats.emergency_decision_interval = retuned.emergency_decision_interval;
            stats.primary_damage = retuned.primary_damage;
            stats.special_damage = retuned.special_damage;
        }

        world_setup::spawn_towers(&mut self.world, &mut self.next_agent_id, &rung);
        for index in 0..rung.max_enemies as usize {
            self.timers.schedule_in(
                self.time.tick,
                index as f64 * rung.spawn_delay,
                TimerAction::SpawnEnemy { index },
            );
        }
    }
}
