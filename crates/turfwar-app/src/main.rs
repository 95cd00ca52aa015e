//! turfwar-demo: headless scripted run of the war engine.
//!
//! Builds a deterministic sim world, provokes a war by scripting three
//! credited kills inside an owned territory, fights all three waves with
//! scripted player damage, and prints the event feed. Useful for eyeballing
//! the full flow without a host game attached.
//!
//! Usage:
//!   turfwar-demo [--seed <n>] [--realtime] [--defs <path>]

use std::path::PathBuf;
use std::process;
use std::time::{Duration, Instant};

use glam::Vec3;
use tracing_subscriber::EnvFilter;

use turfwar_core::commands::HostCommand;
use turfwar_core::constants::TICK_RATE;
use turfwar_core::enums::WarPhase;
use turfwar_core::events::WarEvent;
use turfwar_core::types::FactionId;
use turfwar_sim::engine::{EngineConfig, WarEngine};
use turfwar_world::sim_world::Aabb;
use turfwar_world::SimWorld;

const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

/// Player damage per tick against each attacker during combat.
const SCRIPTED_DPS_PER_TICK: f32 = 4.0;

const DEMO_DEFENDER: FactionId = FactionId(2);
const PLAYER_FACTION: FactionId = FactionId(4);

const DEMO_DEFS: &str = "\
# id,minX,minY,maxX,maxY,owner,underAttack,defense
1001,-80,-80,80,80,2,0,1
1002,200,200,300,300,3,0,0
";

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return;
    }
    let seed = parse_seed(&args[1..]).unwrap_or(42);
    let realtime = args.iter().any(|a| a == "--realtime");

    let defs = match parse_defs(&args[1..]) {
        Some(path) => path,
        None => {
            let path = std::env::temp_dir().join("turfwar_demo_territories.txt");
            if let Err(e) = std::fs::write(&path, DEMO_DEFS) {
                eprintln!("Failed to write demo definitions: {e}");
                process::exit(1);
            }
            path
        }
    };

    run_demo(seed, realtime, defs);
}

fn print_usage() {
    eprintln!(
        "turfwar-demo: scripted headless run of the territory war engine\n\
         \n\
         Options:\n\
           --seed <n>     RNG seed (default: 42)\n\
           --realtime     Pace at the engine tick rate instead of flat out\n\
           --defs <path>  Territory definition file (default: built-in demo set)\n"
    );
}

fn parse_seed(args: &[String]) -> Option<u64> {
    for i in 0..args.len() {
        if args[i] == "--seed" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

fn parse_defs(args: &[String]) -> Option<PathBuf> {
    for i in 0..args.len() {
        if args[i] == "--defs" && i + 1 < args.len() {
            return Some(PathBuf::from(&args[i + 1]));
        }
    }
    None
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn build_world() -> SimWorld {
    let mut world = SimWorld::flat(500.0, 10.0);
    // A couple of buildings so placement has something to route around.
    world.add_obstacle(Aabb::block(
        glam::Vec2::new(-30.0, 20.0),
        glam::Vec2::new(-10.0, 45.0),
        0.0,
        12.0,
    ));
    world.add_obstacle(Aabb::block(
        glam::Vec2::new(25.0, -40.0),
        glam::Vec2::new(50.0, -25.0),
        0.0,
        8.0,
    ));
    world.set_player_position(Vec3::ZERO);
    world.set_player_on_foot(true);
    world
}

fn run_demo(seed: u64, realtime: bool, defs: PathBuf) {
    tracing::info!(seed, defs = %defs.display(), "starting demo run");

    let mut world = build_world();
    let mut engine = WarEngine::new(EngineConfig {
        seed,
        definition_path: defs,
        persistence_dir: std::env::temp_dir().join("turfwar_demo_saves"),
        player_faction: PLAYER_FACTION,
    });
    engine.queue_command(HostCommand::ToggleOverlay);

    let mut next_tick_time = Instant::now();
    let mut provoked = false;
    let mut won_at_tick = None;

    for tick in 0..6000u64 {
        // Script: three credited kills a second in, once.
        if !provoked && tick == TICK_RATE as u64 {
            provoked = true;
            for i in 0..3 {
                let victim = world.spawn_character(
                    DEMO_DEFENDER,
                    "synd_soldier_a",
                    Vec3::new(4.0 + i as f32, 6.0, 0.0),
                );
                engine.report_damage(victim, true, 100.0);
                world.kill_character(victim);
                engine.report_death(&world, victim);
            }
            tracing::info!("scripted provocation delivered");
        }

        let snapshot = engine.tick(&mut world);

        for event in snapshot.events.iter().filter(|e| e.is_player_facing()) {
            println!("[tick {:>5}] {}", snapshot.tick, describe(event));
        }

        // Script: the player grinds down every attacker during combat.
        if snapshot.war.phase == WarPhase::Combat {
            for id in world.living_members(DEMO_DEFENDER) {
                engine.report_damage(id, true, SCRIPTED_DPS_PER_TICK);
                world.damage_character(id, SCRIPTED_DPS_PER_TICK);
                if world.living_members(DEMO_DEFENDER).iter().all(|l| *l != id) {
                    engine.report_death(&world, id);
                }
            }
        }

        if won_at_tick.is_none()
            && snapshot
                .events
                .iter()
                .any(|e| matches!(e, WarEvent::WarWon { .. }))
        {
            won_at_tick = Some(snapshot.tick);
        }
        // Give the post-war despawn timer a moment, then stop.
        if let Some(won) = won_at_tick {
            if snapshot.tick > won + TICK_RATE as u64 * 2 {
                break;
            }
        }

        if realtime {
            next_tick_time += TICK_DURATION;
            let now = Instant::now();
            if next_tick_time > now {
                std::thread::sleep(next_tick_time - now);
            } else if now - next_tick_time > TICK_DURATION * 2 {
                // Too far behind, skip ahead instead of spiraling.
                next_tick_time = now;
            }
        }
    }

    match won_at_tick {
        Some(tick) => {
            let owner = engine
                .store()
                .territories()
                .first()
                .and_then(|t| t.owner)
                .map(|f| f.0.to_string())
                .unwrap_or_else(|| "neutral".to_string());
            println!("War won at tick {tick}; territory now owned by faction {owner}.");
        }
        None => {
            eprintln!("Demo ended without a victory; something is off.");
            process::exit(1);
        }
    }
}

fn describe(event: &WarEvent) -> String {
    match event {
        WarEvent::WarStarted { territory, defender } => {
            format!("War started over territory {territory} against faction {defender}")
        }
        WarEvent::WaveStarted { wave, headcount } => {
            format!("Wave {} incoming: {headcount} attackers", wave + 1)
        }
        WarEvent::WaveSurvived { wave } => format!("Wave {} survived", wave + 1),
        WarEvent::WarWon { territory, new_owner } => {
            format!("Territory {territory} captured by faction {new_owner}")
        }
        WarEvent::WarCancelled { reason } => format!("War called off ({reason:?})"),
        WarEvent::TerritoryNeutralized { territory } => {
            format!("Territory {territory} has gone neutral")
        }
        WarEvent::TerritoryCreated { territory } => format!("Territory {territory} created"),
        WarEvent::TerritoryDeleted { territory } => format!("Territory {territory} deleted"),
        other => format!("{other:?}"),
    }
}
