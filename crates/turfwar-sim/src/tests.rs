//! Engine-level integration tests: full kill-to-capture flows against the
//! deterministic sim world.

use std::path::PathBuf;

use glam::Vec3;

use turfwar_core::commands::HostCommand;
use turfwar_core::constants::KILL_TRIGGER_THRESHOLD;
use turfwar_core::enums::{WarEndReason, WarPhase};
use turfwar_core::events::WarEvent;
use turfwar_core::state::EngineSnapshot;
use turfwar_core::types::{FactionId, TerritoryId};
use turfwar_world::{GameWorld, SimWorld};

use crate::engine::{EngineConfig, WarEngine};
use crate::persistence::FileMode;

const DEFENDER: FactionId = FactionId(2);
const PLAYER_FACTION: FactionId = FactionId(4);
const TERRITORY: TerritoryId = TerritoryId(1001);

const DEFS: &str = "\
# id,minX,minY,maxX,maxY,owner,underAttack,defense
1001,-80,-80,80,80,2,0,0
1002,200,200,260,260,3,0,1
";

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("turfwar_it_{name}"))
}

fn setup(name: &str, seed: u64) -> (SimWorld, WarEngine) {
    let defs = temp_path(&format!("{name}.txt"));
    std::fs::write(&defs, DEFS).unwrap();

    let mut world = SimWorld::flat(500.0, 10.0);
    world.set_player_position(Vec3::ZERO);
    world.set_player_on_foot(true);

    let engine = WarEngine::new(EngineConfig {
        seed,
        definition_path: defs,
        persistence_dir: temp_path(&format!("{name}_saves")),
        player_faction: PLAYER_FACTION,
    });
    (world, engine)
}

fn cleanup(name: &str) {
    let _ = std::fs::remove_file(temp_path(&format!("{name}.txt")));
    let _ = std::fs::remove_dir_all(temp_path(&format!("{name}_saves")));
}

/// Kill `n` defenders inside the territory, crediting the player.
fn credited_kills(world: &mut SimWorld, engine: &mut WarEngine, n: usize) {
    for i in 0..n {
        let victim = world.spawn_character(
            DEFENDER,
            "synd_soldier_a",
            Vec3::new(5.0 + i as f32, 5.0, 0.0),
        );
        engine.report_damage(victim, true, 100.0);
        world.kill_character(victim);
        engine.report_death(world, victim);
    }
}

/// Run ticks, killing live attackers each tick, until the predicate holds.
fn run_war<F>(
    world: &mut SimWorld,
    engine: &mut WarEngine,
    max_ticks: u32,
    mut done: F,
) -> Vec<WarEvent>
where
    F: FnMut(&EngineSnapshot) -> bool,
{
    let mut all_events = Vec::new();
    for _ in 0..max_ticks {
        let snapshot = engine.tick(world);
        all_events.extend(snapshot.events.iter().cloned());
        if snapshot.war.phase == WarPhase::Combat {
            for id in world.living_members(DEFENDER) {
                world.kill_character(id);
            }
        }
        if done(&snapshot) {
            break;
        }
    }
    all_events
}

#[test]
fn three_credited_kills_start_and_win_a_war() {
    let (mut world, mut engine) = setup("full_war", 9);

    // Settle the clock, then provoke.
    engine.tick(&mut world);
    credited_kills(&mut world, &mut engine, KILL_TRIGGER_THRESHOLD);

    let events = run_war(&mut world, &mut engine, 2000, |s| {
        !s.war_active() && s.events.iter().any(|e| matches!(e, WarEvent::WarWon { .. }))
    });

    assert!(events.iter().any(|e| matches!(
        e,
        WarEvent::WarStarted { territory: TERRITORY, defender: DEFENDER }
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        WarEvent::WarWon { territory: TERRITORY, new_owner: PLAYER_FACTION }
    )));
    assert_eq!(
        engine.store().get(TERRITORY).unwrap().owner,
        Some(PLAYER_FACTION)
    );
    // The neighboring territory was never touched.
    assert_eq!(
        engine.store().get(TerritoryId(1002)).unwrap().owner,
        Some(FactionId(3))
    );

    cleanup("full_war");
}

#[test]
fn driving_off_after_the_kills_never_starts_a_war() {
    let (mut world, mut engine) = setup("drive_off", 9);

    engine.tick(&mut world);
    credited_kills(&mut world, &mut engine, KILL_TRIGGER_THRESHOLD);

    // Before the next trigger poll the player mounts up and leaves the
    // territory. The threshold was reached but the war must not start.
    world.set_player_on_foot(false);
    world.set_player_position(Vec3::new(400.0, 400.0, 0.0));

    for _ in 0..40 {
        let snapshot = engine.tick(&mut world);
        assert!(
            !snapshot
                .events
                .iter()
                .any(|e| matches!(e, WarEvent::WarStarted { .. })),
            "war started despite the player driving away"
        );
    }
    assert!(!engine.war_active());

    // Back on foot inside the territory the pending kills still count.
    world.set_player_on_foot(true);
    world.set_player_position(Vec3::ZERO);
    let events = run_war(&mut world, &mut engine, 40, |s| s.war_active());
    assert!(events.iter().any(|e| matches!(
        e,
        WarEvent::WarStarted { territory: TERRITORY, defender: DEFENDER }
    )));

    cleanup("drive_off");
}

#[test]
fn assist_kills_never_provoke() {
    let (mut world, mut engine) = setup("assists", 9);
    engine.tick(&mut world);

    for i in 0..KILL_TRIGGER_THRESHOLD * 2 {
        let victim = world.spawn_character(
            DEFENDER,
            "synd_soldier_a",
            Vec3::new(5.0 + i as f32, 5.0, 0.0),
        );
        // The player chips in well under both credit thresholds.
        engine.report_damage(victim, true, 5.0);
        engine.report_damage(victim, false, 95.0);
        world.kill_character(victim);
        engine.report_death(&world, victim);
    }

    for _ in 0..40 {
        let snapshot = engine.tick(&mut world);
        assert!(!snapshot.war_active(), "assists must not start a war");
    }

    cleanup("assists");
}

#[test]
fn kills_outside_territories_never_provoke() {
    let (mut world, mut engine) = setup("outside", 9);
    engine.tick(&mut world);

    for i in 0..KILL_TRIGGER_THRESHOLD {
        let victim = world.spawn_character(
            DEFENDER,
            "synd_soldier_a",
            Vec3::new(400.0, 400.0 + i as f32, 0.0),
        );
        engine.report_damage(victim, true, 100.0);
        world.kill_character(victim);
        engine.report_death(&world, victim);
    }

    for _ in 0..40 {
        let snapshot = engine.tick(&mut world);
        assert!(!snapshot.war_active());
    }

    cleanup("outside");
}

#[test]
fn same_seed_same_snapshot_stream() {
    let (mut world_a, mut engine_a) = setup("det_a", 777);
    let (mut world_b, mut engine_b) = setup("det_b", 777);

    engine_a.tick(&mut world_a);
    engine_b.tick(&mut world_b);
    credited_kills(&mut world_a, &mut engine_a, KILL_TRIGGER_THRESHOLD);
    credited_kills(&mut world_b, &mut engine_b, KILL_TRIGGER_THRESHOLD);

    for tick in 0..1200 {
        let snap_a = engine_a.tick(&mut world_a);
        let snap_b = engine_b.tick(&mut world_b);

        let json_a = serde_json::to_string(&snap_a).unwrap();
        let json_b = serde_json::to_string(&snap_b).unwrap();
        assert_eq!(json_a, json_b, "snapshots diverged at tick {tick}");

        if snap_a.war.phase == WarPhase::Combat {
            for id in world_a.living_members(DEFENDER) {
                world_a.kill_character(id);
            }
            for id in world_b.living_members(DEFENDER) {
                world_b.kill_character(id);
            }
        }
    }

    cleanup("det_a");
    cleanup("det_b");
}

#[test]
fn reload_during_a_war_cancels_it() {
    let (mut world, mut engine) = setup("reload_cancel", 5);
    engine.tick(&mut world);
    credited_kills(&mut world, &mut engine, KILL_TRIGGER_THRESHOLD);

    // Wait for the war to start, then force a definition reload.
    let mut started = false;
    for _ in 0..40 {
        if engine.tick(&mut world).war_active() {
            started = true;
            break;
        }
    }
    assert!(started, "war should have started");

    engine.queue_command(HostCommand::ForceReloadTerritories);
    let snapshot = engine.tick(&mut world);

    assert!(!snapshot.war_active());
    assert!(snapshot.events.iter().any(|e| matches!(
        e,
        WarEvent::WarCancelled { reason: WarEndReason::DefinitionsReloaded }
    )));
    assert!(snapshot
        .events
        .iter()
        .any(|e| matches!(e, WarEvent::TerritoriesReloaded { count: 2 })));
    assert!(
        !engine.store().get(TERRITORY).unwrap().under_attack,
        "transient flags cleared by the teardown"
    );

    cleanup("reload_cancel");
}

#[test]
fn cancel_command_ends_a_war_without_capture() {
    let (mut world, mut engine) = setup("cancel_cmd", 5);
    engine.tick(&mut world);
    credited_kills(&mut world, &mut engine, KILL_TRIGGER_THRESHOLD);
    for _ in 0..40 {
        if engine.tick(&mut world).war_active() {
            break;
        }
    }

    engine.queue_command(HostCommand::CancelWar);
    let snapshot = engine.tick(&mut world);
    assert!(!snapshot.war_active());
    assert!(snapshot.events.iter().any(|e| matches!(
        e,
        WarEvent::WarCancelled { reason: WarEndReason::Cancelled }
    )));
    assert_eq!(engine.store().get(TERRITORY).unwrap().owner, Some(DEFENDER));

    cleanup("cancel_cmd");
}

#[test]
fn save_then_load_roundtrips_ownership() {
    let (mut world, mut engine) = setup("save_load", 9);
    engine.tick(&mut world);

    // Host writes save slot 3: the sidecar lands on disk.
    engine.report_file_opened(1, 3, FileMode::Write);
    engine.report_file_closed(1);
    let snapshot = engine.tick(&mut world);
    assert!(snapshot
        .events
        .iter()
        .any(|e| matches!(e, WarEvent::OwnershipSaved { slot: 3 })));

    // Host reads the slot back while still in a menu: deferred.
    engine.report_file_opened(2, 3, FileMode::Read);
    engine.report_file_closed(2);
    world.set_in_menu(true);
    let snapshot = engine.tick(&mut world);
    assert!(
        !snapshot
            .events
            .iter()
            .any(|e| matches!(e, WarEvent::OwnershipApplied { .. })),
        "loads never apply inside a menu"
    );

    world.set_in_menu(false);
    let snapshot = engine.tick(&mut world);
    assert!(snapshot
        .events
        .iter()
        .any(|e| matches!(e, WarEvent::OwnershipApplied { slot: 3, entries: 2 })));
    assert_eq!(engine.store().get(TERRITORY).unwrap().owner, Some(DEFENDER));

    cleanup("save_load");
}

#[test]
fn loading_a_slot_cancels_an_active_war() {
    let (mut world, mut engine) = setup("load_cancels", 5);
    engine.tick(&mut world);

    engine.report_file_opened(1, 0, FileMode::Write);
    engine.report_file_closed(1);
    engine.tick(&mut world);

    credited_kills(&mut world, &mut engine, KILL_TRIGGER_THRESHOLD);
    for _ in 0..40 {
        if engine.tick(&mut world).war_active() {
            break;
        }
    }
    assert!(engine.war_active());

    engine.queue_command(HostCommand::NotifyLoadComplete { slot: 0 });
    let snapshot = engine.tick(&mut world);
    assert!(!snapshot.war_active());
    assert!(snapshot.events.iter().any(|e| matches!(
        e,
        WarEvent::WarCancelled { reason: WarEndReason::SaveLoad }
    )));

    cleanup("load_cancels");
}

#[test]
fn overlay_toggle_shows_in_snapshots() {
    let (mut world, mut engine) = setup("overlay", 9);

    let snapshot = engine.tick(&mut world);
    assert!(!snapshot.overlay_enabled);

    engine.queue_command(HostCommand::ToggleOverlay);
    let snapshot = engine.tick(&mut world);
    assert!(snapshot.overlay_enabled);

    engine.queue_command(HostCommand::ToggleOverlay);
    let snapshot = engine.tick(&mut world);
    assert!(!snapshot.overlay_enabled);

    cleanup("overlay");
}

#[test]
fn editor_commands_are_locked_during_a_war() {
    let (mut world, mut engine) = setup("editor_lock", 5);
    engine.tick(&mut world);
    credited_kills(&mut world, &mut engine, KILL_TRIGGER_THRESHOLD);
    for _ in 0..40 {
        if engine.tick(&mut world).war_active() {
            break;
        }
    }

    let before = engine.store().territories().len();
    engine.queue_commands([
        HostCommand::EditorPlaceCornerA,
        HostCommand::EditorPlaceCornerB,
        HostCommand::EditorCommit { owner_code: -1 },
    ]);
    let snapshot = engine.tick(&mut world);
    assert_eq!(engine.store().territories().len(), before);
    assert!(!snapshot
        .events
        .iter()
        .any(|e| matches!(e, WarEvent::TerritoryCreated { .. })));

    cleanup("editor_lock");
}

#[test]
fn snapshot_war_view_tracks_the_fight() {
    let (mut world, mut engine) = setup("war_view", 21);
    engine.tick(&mut world);
    credited_kills(&mut world, &mut engine, KILL_TRIGGER_THRESHOLD);

    let mut saw_combat_view = false;
    for _ in 0..2000 {
        let snapshot = engine.tick(&mut world);
        if snapshot.war.phase == WarPhase::Combat {
            assert_eq!(snapshot.war.territory, Some(TERRITORY));
            assert_eq!(snapshot.war.defender, Some(DEFENDER));
            assert!(snapshot.war.flee_radius > 0.0);
            assert!(snapshot.war.center.is_some());
            assert!(snapshot.war.alive_count > 0);
            saw_combat_view = true;
            break;
        }
    }
    assert!(saw_combat_view);

    cleanup("war_view");
}
