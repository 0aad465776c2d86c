//! Run a seeded match without a browser and report the standings.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use conquest_sim::{ScenarioConfig, SimulationLogic};

/// Headless territory conquest runner
#[derive(Parser, Debug)]
#[command(name = "conquest-headless")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario JSON file (default: the builtin 14x14 map)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Random seed (default: the scenario's seed)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of frames to simulate
    #[arg(short, long, default_value = "36000")]
    frames: u64,

    /// Frame length in milliseconds
    #[arg(long, default_value = "16.0")]
    step: f64,

    /// Print the final standings as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut scenario = match &args.scenario {
        Some(path) => match ScenarioConfig::from_file(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("error: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => ScenarioConfig::builtin(),
    };
    if let Some(seed) = args.seed {
        scenario.simulation.seed = seed;
    }

    let mut sim = match SimulationLogic::new(scenario) {
        Ok(sim) => sim,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    sim.start_auto_spin();
    for frame in 0..args.frames {
        sim.tick(args.step);
        sim.drain_events();
        if let Some(winner) = sim.winner() {
            info!(
                target: "conquest::headless",
                frame,
                winner = %sim.data().roster().name_of(winner),
                "match.decided"
            );
            break;
        }
    }

    let metrics = *sim.data().metrics();
    info!(
        target: "conquest::headless",
        ticks = sim.tick_count(),
        time_ms = sim.now_ms(),
        shots = metrics.shots_fired,
        captures = metrics.captures,
        cannons = metrics.cannons_built,
        spins = metrics.spins_resolved,
        "match.finished"
    );

    let standings = sim.standings();
    if args.json {
        match serde_json::to_string_pretty(&standings) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("error: {err}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        for standing in &standings {
            println!(
                "{:<12} cells={:<4} cannons={}",
                standing.name, standing.cells, standing.cannons
            );
        }
    }
    ExitCode::SUCCESS
}
