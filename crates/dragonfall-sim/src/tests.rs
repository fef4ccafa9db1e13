use glam::DVec3;

use dragonfall_core::commands::HostCommand;
use dragonfall_core::components::{
    AgentId, MovementSample, SmartTowerRuntime, SmartTowerStats, TowerCoordinationRecord,
};
use dragonfall_core::config::DifficultyConfig;
use dragonfall_core::constants::*;
use dragonfall_core::enums::{
    AgentKind, BossState, BossTactic, EffectKind, EnemyState, GamePhase, TowerAiType,
};
use dragonfall_core::events::CombatEvent;
use dragonfall_core::types::{Position, Velocity};

use crate::engine::{SimConfig, SimulationEngine};
use crate::systems::smart_tower;
use crate::systems::snapshot::TickSnapshot;

const BOSS_AGENT: u32 = 0;

fn engine_with_seed(seed: u64) -> SimulationEngine {
    SimulationEngine::new(SimConfig {
        seed,
        ..Default::default()
    })
}

fn pose(x: f64, y: f64, z: f64) -> HostCommand {
    HostCommand::SetPlayerPose {
        position: Position::new(x, y, z),
        velocity: Velocity::default(),
    }
}

/// Run `ticks` ticks, accumulating every emitted event.
fn run_collecting(engine: &mut SimulationEngine, ticks: usize) -> Vec<CombatEvent> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        events.extend(engine.tick().events);
    }
    events
}

fn tactic_choices(events: &[CombatEvent]) -> Vec<(BossTactic, bool)> {
    events
        .iter()
        .filter_map(|e| match e {
            CombatEvent::TacticChosen {
                tactic, from_cache, ..
            } => Some((*tactic, *from_cache)),
            _ => None,
        })
        .collect()
}

fn boss_snapshot_state(snapshot: &TickSnapshot) -> Option<BossState> {
    snapshot
        .agents
        .iter()
        .find(|a| a.agent == BOSS_AGENT)
        .and_then(|a| a.boss_state)
}

fn boss_snapshot_health(snapshot: &TickSnapshot) -> f64 {
    snapshot
        .agents
        .iter()
        .find(|a| a.agent == BOSS_AGENT)
        .map(|a| a.health)
        .unwrap_or(f64::NAN)
}

// --- Engine lifecycle ---

#[test]
fn test_engine_starts_idle() {
    let mut engine = engine_with_seed(1);
    assert_eq!(engine.phase(), GamePhase::Idle);

    let snapshot = engine.tick();
    assert_eq!(snapshot.tick, 0);
    assert!(snapshot.agents.is_empty());
}

#[test]
fn test_start_encounter_spawns_current_rung() {
    let mut engine = engine_with_seed(1);
    engine.queue_command(HostCommand::StartEncounter);
    let snapshot = engine.tick();

    assert_eq!(engine.phase(), GamePhase::Active);
    // Normal rung: one boss, 10 enemies, 3 towers.
    assert_eq!(snapshot.agents.len(), 14);
    assert!(snapshot.player.is_some());
    assert_eq!(snapshot.difficulty_name, "Normal");
}

#[test]
fn test_pause_freezes_time() {
    let mut engine = engine_with_seed(1);
    engine.queue_command(HostCommand::StartEncounter);
    engine.tick();
    engine.tick();
    let before = engine.time().tick;

    engine.queue_command(HostCommand::Pause);
    engine.tick();
    engine.tick();
    assert_eq!(engine.time().tick, before);

    engine.queue_command(HostCommand::Resume);
    engine.tick();
    assert_eq!(engine.time().tick, before + 1);
}

#[test]
fn test_snapshot_round_trips_through_json() {
    let mut engine = engine_with_seed(1);
    engine.queue_command(HostCommand::StartEncounter);
    engine.queue_command(pose(0.0, 25.0, 110.0));
    let snapshot = engine.tick();

    let json = serde_json::to_string(&snapshot).unwrap();
    let parsed: TickSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.agents.len(), snapshot.agents.len());
}

// --- Determinism ---

#[test]
fn test_same_seed_same_simulation() {
    let script = |engine: &mut SimulationEngine| -> String {
        engine.queue_command(HostCommand::StartEncounter);
        let mut last = String::new();
        for i in 0..400u64 {
            let t = i as f64 * DT;
            engine.queue_command(pose(
                40.0 * (t * 0.8).sin(),
                22.0 + 6.0 * (t * 0.5).cos(),
                100.0 - t * 2.0,
            ));
            if i == 120 {
                engine.queue_command(HostCommand::DamageAgent {
                    agent: BOSS_AGENT,
                    amount: 150.0,
                });
            }
            let snapshot = engine.tick();
            last = serde_json::to_string(&snapshot).unwrap();
        }
        last
    };

    let mut a = engine_with_seed(7);
    let mut b = engine_with_seed(7);
    assert_eq!(script(&mut a), script(&mut b));
}

// --- Boss behavior ---

#[test]
fn test_boss_acquires_and_commits_tactic() {
    let mut engine = engine_with_seed(3);
    engine.queue_command(HostCommand::StartEncounter);
    // Parked right in the boss's face: attack range, full health.
    engine.queue_command(pose(0.0, 25.0, 110.0));

    let events = run_collecting(&mut engine, 30);
    let choices = tactic_choices(&events);
    assert_eq!(choices.len(), 1);
    assert_eq!(choices[0], (BossTactic::AggressiveAttack, false));
    assert_eq!(engine.decision_cache().len(), 1);

    let snapshot = engine.tick();
    assert_eq!(boss_snapshot_state(&snapshot), Some(BossState::Engaging));

    // In range with a cold cooldown: the primary fires, flash and all.
    assert!(events.iter().any(|e| matches!(
        e,
        CombatEvent::ProjectileSpawned { owner, .. } if *owner == BOSS_AGENT
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        CombatEvent::EffectSpawned { kind: EffectKind::MuzzleFlash, .. }
    )));
}

#[test]
fn test_repeat_situation_hits_cache() {
    let mut engine = engine_with_seed(3);
    engine.queue_command(HostCommand::StartEncounter);
    engine.queue_command(pose(0.0, 25.0, 110.0));

    // Hold still through two decision deadlines (12s cadence).
    let events = run_collecting(&mut engine, 30 * 13);
    let choices = tactic_choices(&events);
    assert!(choices.len() >= 2, "expected two decisions, got {choices:?}");
    assert_eq!(choices[0], (BossTactic::AggressiveAttack, false));
    assert_eq!(choices[1], (BossTactic::AggressiveAttack, true));
    // Same fingerprint both times: one entry, reused.
    assert_eq!(engine.decision_cache().len(), 1);
}

#[test]
fn test_area_denial_fires_staggered_volleys() {
    let mut engine = engine_with_seed(3);
    engine.queue_command(HostCommand::StartEncounter);
    // Mid-band: outside attack range, inside the reposition radius.
    engine.queue_command(pose(0.0, 20.0, 90.0));

    let events = run_collecting(&mut engine, 90);
    let choices = tactic_choices(&events);
    assert_eq!(choices.first(), Some(&(BossTactic::AreaDenial, false)));

    // Three volleys, two fire points each.
    let boss_shots = events
        .iter()
        .filter(|e| {
            matches!(e, CombatEvent::ProjectileSpawned { owner, .. } if *owner == BOSS_AGENT)
        })
        .count();
    assert_eq!(boss_shots, 6);
}

#[test]
fn test_wounded_boss_channels_special() {
    let mut engine = engine_with_seed(3);
    engine.queue_command(HostCommand::StartEncounter);
    engine.queue_command(pose(0.0, 20.0, 90.0));
    engine.tick();
    // Down to 40% before the first decision is taken.
    engine.queue_command(HostCommand::DamageAgent {
        agent: BOSS_AGENT,
        amount: 325.0,
    });

    let events = run_collecting(&mut engine, 150);
    let choices = tactic_choices(&events);
    assert_eq!(choices.first(), Some(&(BossTactic::SpecialAbility, false)));

    assert!(events.iter().any(|e| matches!(
        e,
        CombatEvent::BossStateChanged { to: BossState::Channeling, .. }
    )));
    // The channel completes and releases the heavy payload.
    assert!(events.iter().any(|e| matches!(
        e,
        CombatEvent::BossStateChanged {
            from: BossState::Channeling,
            to: BossState::Engaging,
            ..
        }
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        CombatEvent::ProjectileSpawned { damage, .. } if *damage == BOSS_SPECIAL_DAMAGE
    )));
}

#[test]
fn test_desperate_boss_retreats() {
    let mut engine = engine_with_seed(3);
    engine.queue_command(HostCommand::StartEncounter);
    engine.queue_command(pose(0.0, 20.0, 90.0));
    engine.tick();
    // Below the emergency fraction.
    engine.queue_command(HostCommand::DamageAgent {
        agent: BOSS_AGENT,
        amount: 450.0,
    });

    let events = run_collecting(&mut engine, 30);
    let choices = tactic_choices(&events);
    assert_eq!(choices.first(), Some(&(BossTactic::DefensiveRetreat, false)));
    let snapshot = engine.tick();
    assert_eq!(boss_snapshot_state(&snapshot), Some(BossState::Retreating));
}

#[test]
fn test_retreating_boss_does_not_regenerate() {
    let mut engine = engine_with_seed(3);
    engine.queue_command(HostCommand::StartEncounter);
    engine.queue_command(pose(0.0, 20.0, 90.0));
    engine.tick();
    engine.queue_command(HostCommand::DamageAgent {
        agent: BOSS_AGENT,
        amount: 450.0,
    });
    run_collecting(&mut engine, 30);

    let snapshot = engine.tick();
    assert_eq!(boss_snapshot_state(&snapshot), Some(BossState::Retreating));
    let wounded = boss_snapshot_health(&snapshot);

    // Health holds exactly flat for the flight out.
    run_collecting(&mut engine, 10);
    let snapshot = engine.tick();
    assert_eq!(boss_snapshot_state(&snapshot), Some(BossState::Retreating));
    assert_eq!(boss_snapshot_health(&snapshot), wounded);
}

#[test]
fn test_death_discards_pending_decision() {
    let mut engine = engine_with_seed(3);
    engine.queue_command(HostCommand::StartEncounter);
    engine.queue_command(pose(0.0, 25.0, 110.0));

    // Tick until a synthesis is in flight.
    let mut events = Vec::new();
    for _ in 0..6 {
        events.extend(engine.tick().events);
        if engine.pending_decision_count() > 0 {
            break;
        }
    }
    assert_eq!(engine.pending_decision_count(), 1);

    // Killed inside the synthesis latency window.
    engine.queue_command(HostCommand::DamageAgent {
        agent: BOSS_AGENT,
        amount: 10_000.0,
    });
    events.extend(run_collecting(&mut engine, 10));

    assert_eq!(engine.pending_decision_count(), 0);
    assert!(tactic_choices(&events).is_empty());
    assert_eq!(engine.decision_cache().len(), 0);
}

#[test]
fn test_boss_defeat_is_terminal() {
    let mut engine = engine_with_seed(3);
    engine.queue_command(HostCommand::StartEncounter);
    engine.queue_command(pose(0.0, 25.0, 110.0));
    engine.tick();

    engine.queue_command(HostCommand::DamageAgent {
        agent: BOSS_AGENT,
        amount: 10_000.0,
    });
    let events = run_collecting(&mut engine, 5);

    assert!(events.iter().any(|e| matches!(
        e,
        CombatEvent::AgentDefeated { owner: BOSS_AGENT, kind: AgentKind::Boss }
    )));
    assert_eq!(engine.performance().bosses_defeated, 1);
    assert_eq!(engine.pending_decision_count(), 0);

    let snapshot = engine.tick();
    assert_eq!(boss_snapshot_state(&snapshot), Some(BossState::Defeated));
}

#[test]
fn test_stun_and_release() {
    let mut engine = engine_with_seed(3);
    engine.queue_command(HostCommand::StartEncounter);
    engine.queue_command(pose(0.0, 25.0, 110.0));
    engine.tick();

    engine.queue_command(HostCommand::StunBoss { agent: BOSS_AGENT });
    engine.tick();
    let snapshot = engine.tick();
    assert_eq!(boss_snapshot_state(&snapshot), Some(BossState::Stunned));

    engine.queue_command(HostCommand::ReleaseBoss { agent: BOSS_AGENT });
    engine.tick();
    let snapshot = engine.tick();
    // Re-acquires on its own from Hunting.
    assert!(matches!(
        boss_snapshot_state(&snapshot),
        Some(BossState::Hunting | BossState::Engaging)
    ));
}

// --- Enemies ---

#[test]
fn test_enemy_aggros_when_shot() {
    let mut engine = engine_with_seed(3);
    engine.queue_command(HostCommand::StartEncounter);
    // Player far away from the ground ring.
    engine.queue_command(pose(0.0, 200.0, 0.0));
    engine.tick();

    engine.queue_command(HostCommand::DamageAgent {
        agent: 1,
        amount: 10.0,
    });
    let events = run_collecting(&mut engine, 1);
    assert!(events.iter().any(|e| matches!(
        e,
        CombatEvent::EnemyStateChanged { owner: 1, to: EnemyState::Tracking, .. }
    )));
}

#[test]
fn test_dead_enemy_is_reclaimed() {
    let mut engine = engine_with_seed(3);
    engine.queue_command(HostCommand::StartEncounter);
    let before = engine.tick().agents.len();

    engine.queue_command(HostCommand::DamageAgent {
        agent: 1,
        amount: 10_000.0,
    });
    let events = run_collecting(&mut engine, 2);

    assert!(events.iter().any(|e| matches!(
        e,
        CombatEvent::AgentDefeated { owner: 1, kind: AgentKind::Enemy }
    )));
    assert_eq!(engine.performance().enemies_defeated, 1);
    assert_eq!(engine.tick().agents.len(), before - 1);
}

// --- Towers ---

#[test]
fn test_smart_towers_engage_and_learn() {
    let mut engine = SimulationEngine::new(SimConfig {
        seed: 5,
        difficulty: DifficultyConfig {
            // Hard rung: smart towers enabled.
            starting_index: 2,
            ..Default::default()
        },
    });
    engine.queue_command(HostCommand::StartEncounter);
    // Hovering near a tower on the outer ring.
    engine.queue_command(pose(56.0, 10.0, 56.0));

    let events = run_collecting(&mut engine, 120);

    assert!(events.iter().any(|e| matches!(
        e,
        CombatEvent::ProjectileSpawned { speed, owner, .. }
            if *speed == SMART_TOWER_PROJECTILE_SPEED && *owner != BOSS_AGENT
    )));
    // The adaptation pass announces itself.
    assert!(events.iter().any(|e| matches!(
        e,
        CombatEvent::EffectSpawned { kind: EffectKind::LearningPulse, .. }
    )));
}

#[test]
fn test_adaptive_tower_scales_horizon_with_target_speed() {
    let mut stats = SmartTowerStats::with_type(TowerAiType::Adaptive);
    let mut runtime = SmartTowerRuntime::default();
    // A fast, straight-line target: no evasion in the window.
    for i in 0..20 {
        let t = i as f64 * DT;
        runtime.history.push(MovementSample {
            position: Position::new(30.0 * t, 10.0, 0.0),
            velocity: Velocity::from_dvec3(DVec3::new(30.0, 0.0, 0.0)),
            altitude: 10.0,
            timestamp_secs: t,
            was_evasive: false,
        });
    }
    let accuracy_before = stats.prediction_accuracy;
    let mut events = Vec::new();
    smart_tower::adapt(&mut stats, &mut runtime, 9, &Position::default(), &mut events);

    // 30 units/s of average speed maps to a 3 s prediction horizon.
    assert!((stats.max_prediction_time - 3.0).abs() < 1e-9);
    // Accuracy improves every pass, evasive target or not.
    assert!(stats.prediction_accuracy > accuracy_before);
    assert!(stats.prediction_accuracy <= ADAPTIVE_ACCURACY_CAP);
}

#[test]
fn test_coordinator_holds_fire_while_peer_engaged() {
    let stats = SmartTowerStats::with_type(TowerAiType::Coordinator);
    let mut runtime = SmartTowerRuntime::default();
    runtime.peers.push(TowerCoordinationRecord {
        agent: AgentId(9),
        position: Position::new(20.0, 0.0, 0.0),
        is_engaged: true,
    });
    assert!(!smart_tower::archetype_clear_to_fire(&stats, &runtime));

    runtime.peers[0].is_engaged = false;
    assert!(smart_tower::archetype_clear_to_fire(&stats, &runtime));
}

// --- Difficulty adaptation ---

#[test]
fn test_difficulty_raises_capped_by_budget() {
    let mut engine = SimulationEngine::new(SimConfig {
        seed: 5,
        difficulty: DifficultyConfig {
            starting_index: 0,
            ..Default::default()
        },
    });
    engine.queue_command(HostCommand::StartEncounter);
    engine.queue_command(pose(0.0, 200.0, 0.0));
    // Saturate the combat component and both ratings.
    for _ in 0..10 {
        engine.queue_command(HostCommand::ReportKill {
            kind: AgentKind::Boss,
        });
    }
    engine.queue_command(HostCommand::ReportAccuracy { value: 1.0 });
    engine.queue_command(HostCommand::ReportEvasion { value: 1.0 });

    let events = run_collecting(&mut engine, 30 * 135);

    let changes = events
        .iter()
        .filter(|e| matches!(e, CombatEvent::DifficultyChanged { .. }))
        .count();
    // Two raises allowed per level, even though the ladder goes higher.
    assert_eq!(changes, 2);
    assert_eq!(engine.difficulty().current_index, 2);
    assert_eq!(engine.difficulty().changes_this_level, 2);
}

#[test]
fn test_difficulty_drops_on_poor_performance() {
    let mut engine = engine_with_seed(5);
    engine.queue_command(HostCommand::StartEncounter);
    engine.queue_command(pose(0.0, 200.0, 0.0));

    // No kills, no ratings: the score stays under the floor. The extra
    // seconds let the staggered Easy respawn wave finish.
    let events = run_collecting(&mut engine, 30 * 45);

    assert!(events.iter().any(|e| matches!(
        e,
        CombatEvent::DifficultyChanged { from_index: 1, to_index: 0, .. }
    )));
    assert_eq!(engine.difficulty().current_index, 0);

    // Easy rung rebuilt: one boss, 5 enemies, 2 towers.
    let snapshot = engine.tick();
    assert_eq!(snapshot.agents.len(), 8);
    assert_eq!(snapshot.difficulty_name, "Easy");
}

#[test]
fn test_new_level_resets_change_budget() {
    let mut engine = engine_with_seed(5);
    engine.queue_command(HostCommand::StartEncounter);
    engine.queue_command(pose(0.0, 200.0, 0.0));
    run_collecting(&mut engine, 30 * 40);
    assert_eq!(engine.difficulty().changes_this_level, 1);

    engine.queue_command(HostCommand::StartNewLevel);
    engine.tick();
    assert_eq!(engine.difficulty().changes_this_level, 0);
    assert_eq!(engine.performance().level_completion_times.len(), 1);
    assert!(engine.performance().survival_time < 1.0);
}

#[test]
fn test_invalid_ladder_disables_adaptation() {
    let mut engine = SimulationEngine::new(SimConfig {
        seed: 5,
        difficulty: DifficultyConfig {
            increase_threshold: 0.2,
            decrease_threshold: 0.8,
            ..Default::default()
        },
    });
    assert!(!engine.difficulty().enabled);

    engine.queue_command(HostCommand::StartEncounter);
    engine.queue_command(pose(0.0, 200.0, 0.0));
    let events = run_collecting(&mut engine, 30 * 40);
    assert!(!events
        .iter()
        .any(|e| matches!(e, CombatEvent::DifficultyChanged { .. })));
}

#[test]
fn test_empty_ladder_disables_adaptation() {
    let mut engine = SimulationEngine::new(SimConfig {
        seed: 5,
        difficulty: DifficultyConfig {
            levels: Vec::new(),
            ..Default::default()
        },
    });
    assert!(!engine.difficulty().enabled);

    // The default ladder stands in, so the encounter still spawns and
    // every tick reports a rung without the score ever moving it.
    engine.queue_command(HostCommand::StartEncounter);
    engine.queue_command(pose(0.0, 200.0, 0.0));
    let events = run_collecting(&mut engine, 30 * 31);
    assert!(!events
        .iter()
        .any(|e| matches!(e, CombatEvent::DifficultyChanged { .. })));
    assert_eq!(engine.tick().difficulty_name, "Normal");
}

// --- Reporting ---

#[test]
fn test_performance_reports_accumulate() {
    let mut engine = engine_with_seed(5);
    engine.queue_command(HostCommand::StartEncounter);
    engine.queue_command(HostCommand::ReportDamageReceived { amount: 35.0 });
    engine.queue_command(HostCommand::ReportAccuracy { value: 1.4 });
    engine.queue_command(HostCommand::ReportEvasion { value: 0.6 });
    engine.queue_command(HostCommand::ReportKill {
        kind: AgentKind::Tower,
    });
    engine.tick();

    let perf = engine.performance();
    assert_eq!(perf.damage_received, 35.0);
    // Ratings clamp to [0, 1].
    assert_eq!(perf.accuracy_rating, 1.0);
    assert_eq!(perf.evasion_rating, 0.6);
    assert_eq!(perf.towers_destroyed, 1);
}
