//! Demo runner: build a small wasteland, run it deterministically, report.
//!
//! ```text
//! cw-run --seed 42 --until 172800 --trace trace.csv
//! cw-run --load world.json --until 259200 --save world.json
//! ```

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cw_actor::{Commodity, Segment, SegmentKind};
use cw_core::{ActorId, Coord, PlaceKind, Terrain, TimePoint};
use cw_trace::CsvTraceWriter;
use cw_world::{HeadlessUi, NoopObserver, World, WorldConfig, DEFAULT_SEED};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "cw-run", about = "Deterministic crawler-world demo runner")]
struct Cli {
    /// Root RNG seed.  Omitted: a fixed default, for reproducibility.
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated horizon, in seconds.
    #[arg(long, default_value_t = 172_800)]
    until: i64,

    /// Settlements on the demo ring.
    #[arg(long, default_value_t = 6)]
    places: u32,

    /// Crawlers seeded onto the ring.
    #[arg(long, default_value_t = 8)]
    crawlers: u32,

    /// Write the event trace as CSV.
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Save the world on exit.
    #[arg(long)]
    save: Option<PathBuf>,

    /// Load a previously saved world instead of building the demo.
    #[arg(long)]
    load: Option<PathBuf>,
}

// ── Demo world ────────────────────────────────────────────────────────────────

const RING_NAMES: [&str; 8] = [
    "rusthaven", "gearford", "ashpit", "saltrow", "dunewatch", "crankhill", "tarpool", "mirefen",
];

const TERRAINS: [Terrain; 5] = [
    Terrain::Flats,
    Terrain::Dunes,
    Terrain::Ridge,
    Terrain::Saltpan,
    Terrain::Ruins,
];

fn build_wasteland(config: WorldConfig, places: u32, crawlers: u32) -> World {
    let mut world = World::new(config);

    // A ring of settlements and crossroads, roughly 40 km apart, with one
    // chord so routes are not unique.
    let count = places.clamp(3, RING_NAMES.len() as u32) as usize;
    let mut ids = Vec::with_capacity(count);
    for (i, name) in RING_NAMES.iter().take(count).enumerate() {
        let angle = std::f64::consts::TAU * i as f64 / count as f64;
        let kind = if i % 3 == 2 {
            PlaceKind::Crossroads
        } else {
            PlaceKind::Settlement
        };
        let id = world.add_place(
            name,
            Coord::new(40.0 * angle.cos(), 40.0 * angle.sin()),
            TERRAINS[i % TERRAINS.len()],
            kind,
            0.4 + 0.1 * (i % 5) as f32,
            40 + 20 * (i % 4) as u32,
        );
        ids.push(id);
    }
    for i in 0..count {
        let a = ids[i];
        let b = ids[(i + 1) % count];
        let len = {
            let ca = world.places.get(a).map(|p| p.coord).unwrap_or_default();
            let cb = world.places.get(b).map(|p| p.coord).unwrap_or_default();
            ca.distance_km(cb).max(1.0)
        };
        world.connect(a, b, len);
    }
    world.connect(ids[0], ids[count / 2], 80.0);

    // Crawlers, cycling through the standard roles.
    let roles = ["wanderer", "freighter", "bandit"];
    let mut first_freighter: Option<ActorId> = None;
    for i in 0..crawlers {
        let role = roles[i as usize % roles.len()];
        let name = format!("{}-{}", role, i);
        let home = ids[i as usize % ids.len()];
        let Ok(id) = world.spawn_actor(&name, role, home) else {
            continue;
        };
        outfit_crawler(&mut world, id, role);
        if role == "freighter" {
            match first_freighter {
                None => {
                    first_freighter = Some(id);
                    world.convoys.found(id, home);
                }
                Some(leader) => {
                    if let Some(convoy) = world.convoys.of_actor(leader) {
                        let convoy = convoy.id;
                        world.convoys.join(convoy, id);
                    }
                }
            }
        }
    }
    world
}

fn outfit_crawler(world: &mut World, id: ActorId, role: &str) {
    let Some(actor) = world.actors.get_mut(id) else {
        return;
    };
    let mut draws = actor.rng.derive("outfit");
    actor.segments.push(Segment::new(SegmentKind::Traction, 12, 40));
    actor.segments.push(Segment::new(SegmentKind::Storage, 10, 120));
    actor.segments.push(Segment::new(SegmentKind::Habitat, 8, 1));
    actor.segments.push(Segment::new(SegmentKind::Power, 10, 20));
    if role == "bandit" {
        actor.segments.push(Segment::new(SegmentKind::Offense, 10, 6));
    }
    if role == "freighter" {
        actor.segments.push(Segment::new(SegmentKind::Defense, 10, 4));
    }
    actor
        .supplies
        .credit(Commodity::Fuel, 60 + draws.next_bounded(120) as i64);
    actor
        .supplies
        .credit(Commodity::Rations, 20 + draws.next_bounded(40) as i64);
    actor
        .supplies
        .credit(Commodity::Scrap, draws.next_bounded(300) as i64);
    actor
        .cargo
        .credit(Commodity::Parts, draws.next_bounded(20) as i64);
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let seed = cli.seed.unwrap_or(DEFAULT_SEED);

    let mut world = match &cli.load {
        Some(path) => {
            info!(?path, "loading world");
            World::load_from_path(path)?
        }
        None => {
            let config = WorldConfig {
                seed,
                ..WorldConfig::default()
            };
            build_wasteland(config, cli.places, cli.crawlers)
        }
    };

    let until = TimePoint(world.global_time.0 + cli.until);
    info!(seed, until = %until, "running");

    let mut ui = HeadlessUi;
    let exit = match &cli.trace {
        Some(path) => {
            let mut sink = CsvTraceWriter::create(path)?;
            let exit = world.run(until, &mut ui, &mut sink)?;
            sink.flush()?;
            exit
        }
        None => {
            let mut sink = NoopObserver;
            world.run(until, &mut ui, &mut sink)?
        }
    };

    if let Some(path) = &cli.save {
        world.save_to_path(path)?;
        info!(?path, "world saved");
    }

    println!(
        "ran to {} ({:?}): {} actors, {} places, {} in transit, {} convoys",
        world.global_time,
        exit,
        world.actors.len(),
        world.places.len(),
        world.in_transit(),
        world.convoys.len(),
    );
    Ok(())
}
