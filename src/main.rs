//! Brawl Sim entry point
//!
//! Headless demo match: two scripted players fight in the default arena
//! (or one loaded from JSON) while monsters spawn around them.
//!
//! Run with `--help` for options.

#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

#[cfg(not(target_arch = "wasm32"))]
use brawl_sim::{
    Tuning, TuningError,
    sim::{Arena, ArenaLayout, CombatInput, TickInput, World, WorldEvent, tick},
};
#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;

/// Headless two-player brawl with scripted bots
#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser, Debug)]
#[command(name = "brawl-sim")]
#[command(about = "Headless two-player brawl with scripted bots")]
#[command(version)]
struct Args {
    /// Match seed
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Maximum number of ticks to simulate
    #[arg(long, default_value_t = 30 * 90)]
    ticks: u64,

    /// Tuning JSON file (defaults are used when omitted)
    #[arg(long, value_name = "TUNING_FILE")]
    tuning: Option<PathBuf>,

    /// Arena layout JSON file (the default arena is used when omitted)
    #[arg(long, value_name = "ARENA_FILE")]
    arena: Option<PathBuf>,
}

/// Walk at the opponent, swing when close, throw skills on a rhythm
#[cfg(not(target_arch = "wasm32"))]
fn scripted_input(world: &World, me: usize, step: u64) -> CombatInput {
    let mine = &world.players[me];
    let theirs = &world.players[1 - me];
    let dx = theirs.center().x - mine.center().x;
    let dy = theirs.center().y - mine.center().y;

    let mut input = CombatInput {
        right: dx > 40.0,
        left: dx < -40.0,
        jump: dy < -40.0 && step % 20 == 0,
        ..Default::default()
    };
    if dx.abs() < 80.0 {
        input.attack = true;
    }
    match (step + me as u64 * 7) % 90 {
        0 => input.skill1 = true,
        30 => input.skill2 = true,
        60 => input.skill3 = true,
        _ => {}
    }
    if step % 300 == 150 {
        input.ult = true;
    }
    if mine.energy == 0 && step % 120 == 0 {
        input = CombatInput {
            meditate: true,
            ..Default::default()
        };
    }
    input
}

#[cfg(not(target_arch = "wasm32"))]
fn build_world(args: &Args) -> Result<World, TuningError> {
    let tuning = match &args.tuning {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    let layout = match &args.arena {
        Some(path) => ArenaLayout::load(path)?,
        None => ArenaLayout::default(),
    };
    let mut world = World::new(args.seed, Arena::from_layout(&layout), tuning);

    // Demo loadouts
    let loadouts = [[100, 102, 108, 1000], [101, 104, 107, 1002]];
    for (p, [s1, s2, s3, ult]) in world.players.iter_mut().zip(loadouts) {
        p.loadout.skill1 = s1;
        p.loadout.skill2 = s2;
        p.loadout.skill3 = s3;
        p.loadout.ult = ult;
    }
    Ok(world)
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let args = Args::parse();
    let mut world = match build_world(&args) {
        Ok(world) => world,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };
    log::info!("Brawl Sim starting (seed {}, {} ticks)", args.seed, args.ticks);

    let mut hits = 0usize;
    let mut kills = 0usize;
    for step in 0..args.ticks {
        let input = TickInput {
            players: [
                scripted_input(&world, 0, step),
                scripted_input(&world, 1, step),
            ],
        };
        tick(&mut world, &input);

        for event in &world.events {
            log::debug!("[{}] {:?}", world.clock, event);
            match event {
                WorldEvent::Hit { .. } => hits += 1,
                WorldEvent::MonsterDied { .. } => kills += 1,
                _ => {}
            }
        }
        for (who, text) in world.drain_scrolling_text() {
            log::trace!("{:?}: {}", who, text.text);
        }
        if world.is_over() {
            break;
        }
    }

    for (i, p) in world.players.iter().enumerate() {
        log::info!(
            "Player {}: {}/{} HP, {}/{} energy",
            i + 1,
            p.hit_points,
            p.hit_points_max,
            p.energy,
            p.energy_max
        );
    }
    match world.winner() {
        Some(i) => println!("Player {} wins at {}", i + 1, world.clock),
        None => println!("No winner after {}", world.clock),
    }
    println!(
        "{} hits landed, {} monsters slain, {} still alive",
        hits,
        kills,
        world.monsters.len()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Headless runner is native-only
}
