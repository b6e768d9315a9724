//! Menagerie Simulation Driver
//!
//! Headless runner: seeds a world, spawns a starting population, runs the
//! tick loop, streams events to JSONL, and writes a final snapshot.

use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use menagerie_core::components::GenderState;
use menagerie_core::events::EventLogger;
use menagerie_core::{AgentWorld, SimConfig};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "menagerie_sim")]
#[command(about = "A tick-driven agent world simulation")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 1000)]
    ticks: u64,

    /// Simulated seconds per tick
    #[arg(long, default_value_t = 60.0)]
    delta: f32,

    /// Number of agents to spawn
    #[arg(long, default_value_t = 24)]
    agents: usize,

    /// Fraction of agents created with a fluid gender identity
    #[arg(long, default_value_t = 0.2)]
    fluid_fraction: f32,

    /// Tuning file path (falls back to built-in defaults)
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Output directory for events and snapshots
    #[arg(long, default_value = "output")]
    out_dir: PathBuf,
}

const SPIRITS: &[&str] = &["fox", "wolf", "otter", "eagle", "lion", "tiger", "dragon"];
const STYLES: &[&str] = &["foundation", "exo", "cyberpunk", "hybrid"];

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = match &args.tuning {
        Some(path) => match SimConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("could not load {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => SimConfig::load_or_default(),
    };

    if let Err(e) = fs::create_dir_all(&args.out_dir) {
        eprintln!("could not create {}: {e}", args.out_dir.display());
        std::process::exit(1);
    }

    let mut logger = match EventLogger::new(args.out_dir.join("events.jsonl")) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("could not open event log: {e}");
            std::process::exit(1);
        }
    };

    let mut world = AgentWorld::new(config, args.seed);

    tracing::info!(seed = args.seed, ticks = args.ticks, agents = args.agents, "starting run");

    // Starting population, cycling through the stock spirits and styles.
    let fluid_count = (args.agents as f32 * args.fluid_fraction).round() as usize;
    for i in 0..args.agents {
        let spirit = SPIRITS[i % SPIRITS.len()];
        let style = STYLES[i % STYLES.len()];
        let agent_id = format!("agent_{i:04}");

        if let Err(e) = world.create_agent(&agent_id, Some(spirit), Some(style), None) {
            tracing::warn!(agent_id, "could not create agent: {e}");
            continue;
        }

        if i < fluid_count {
            if let Some(mut gender) = world.component_mut::<GenderState>(&agent_id) {
                gender.profile.is_fluid = true;
                gender.profile.fluidity_rate = 0.5;
            }
        }
    }

    // Main simulation loop
    for tick in 0..args.ticks {
        world.update(args.delta);

        let events = world.drain_events();
        if let Err(e) = logger.log_batch(&events) {
            tracing::warn!("could not write events at tick {tick}: {e}");
        }

        let dead = world.prune_dead();
        for agent_id in dead {
            tracing::info!(agent_id, tick, "agent reached max age");
        }

        if tick > 0 && tick % 100 == 0 {
            let stats = world.system_stats();
            tracing::info!(
                tick,
                agents = stats.total_agents,
                interactions = stats.interactions_processed,
                groups = stats.groups_live,
                transfers = stats.knowledge_transfers,
                "progress"
            );
        }
    }

    if let Err(e) = logger.flush() {
        tracing::warn!("could not flush event log: {e}");
    }

    let snapshot = world.snapshot();
    let snapshot_path = args.out_dir.join("final_snapshot.json");
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => {
            if let Err(e) = fs::write(&snapshot_path, json) {
                eprintln!("could not write snapshot: {e}");
            }
        }
        Err(e) => eprintln!("could not serialize snapshot: {e}"),
    }

    let stats = world.system_stats();
    println!("Run complete after {} ticks.", stats.tick);
    println!("  agents:             {}", stats.total_agents);
    println!("  interactions:       {}", stats.interactions_processed);
    println!("  connections formed: {}", stats.connections_formed);
    println!(
        "  groups:             {} live / {} created / {} dissolved",
        stats.groups_live, stats.groups_created, stats.groups_dissolved
    );
    println!("  knowledge moved:    {}", stats.knowledge_transfers);
    println!("  identity changes:   {}", stats.identity_changes);
    println!("  events logged:      {}", logger.event_count());
    println!("  snapshot:           {}", snapshot_path.display());
}
