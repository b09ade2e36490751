//! Microgrid simulator entry point: CLI wiring and config-driven episode runs.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::info;

use microgrid_sim::config::ScenarioConfig;
use microgrid_sim::io::export::export_csv;
use microgrid_sim::runner::{policy_for, run_episode};
use microgrid_sim::sim::engine::MicrogridEnv;
use microgrid_sim::telemetry::init_tracing;

/// Microgrid operator simulator: TCL fleet, households, battery, wind and market
#[derive(Parser, Debug)]
#[command(name = "microgrid-sim")]
#[command(about = "Run microgrid control episodes and report rewards")]
struct Args {
    /// Load scenario from TOML config file
    #[arg(long, conflicts_with = "preset")]
    scenario: Option<PathBuf>,

    /// Use a built-in preset (baseline, compact)
    #[arg(long)]
    preset: Option<String>,

    /// Override random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the action policy (random, idle)
    #[arg(long)]
    policy: Option<String>,

    /// Directory holding the CSV series; synthetic series are used otherwise
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Number of episodes to run
    #[arg(long, default_value_t = 1)]
    episodes: usize,

    /// Export the step trace of every episode to CSV
    #[arg(long)]
    trace_out: Option<PathBuf>,

    /// Print each step as a JSON line instead of text
    #[arg(long)]
    json: bool,
}

fn load_scenario(args: &Args) -> ScenarioConfig {
    let loaded = match (&args.scenario, &args.preset) {
        (Some(path), _) => ScenarioConfig::from_toml_file(path),
        (None, Some(name)) => ScenarioConfig::from_preset(name),
        (None, None) => Ok(ScenarioConfig::baseline()),
    };
    let mut scenario = loaded.unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    if let Some(seed) = args.seed {
        scenario.simulation.seed = seed;
    }
    if let Some(policy) = &args.policy {
        scenario.simulation.policy = policy.clone();
    }
    if let Some(dir) = &args.data_dir {
        scenario.data.dir = Some(dir.clone());
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    scenario
}

fn main() {
    init_tracing("info");
    let args = Args::parse();
    let scenario = load_scenario(&args);

    let num_tiers = scenario.load.price_tiers.len();
    let mut policy = policy_for(&scenario.simulation, num_tiers).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(1);
    });
    let mut env = MicrogridEnv::from_config(scenario).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(1);
    });

    let mut traces = Vec::with_capacity(args.episodes);
    for episode in 0..args.episodes {
        let result = run_episode(&mut env, policy.as_mut(), |step| {
            if args.json {
                match serde_json::to_string(step) {
                    Ok(line) => println!("{line}"),
                    Err(e) => eprintln!("error: failed to encode step: {e}"),
                }
            } else {
                println!("{step}");
            }
        });
        let result = result.unwrap_or_else(|e| {
            eprintln!("error: episode {episode} failed: {e}");
            process::exit(1);
        });
        info!(episode, total_reward = result.summary.total_reward, "episode finished");
        if !args.json {
            println!("\n{}\n", result.summary);
        }
        traces.push(result.trace);
    }

    if let Some(path) = &args.trace_out {
        if let Err(e) = export_csv(&traces, path) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Trace written to {}", path.display());
    }
}
