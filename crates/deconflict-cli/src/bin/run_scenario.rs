//! Demo runner: build a named scenario, register its traffic, and check the
//! primary mission through the full pipeline.
//!
//! Usage:
//!   cargo run -p deconflict-cli --bin run_scenario -- --scenario straight
//!   cargo run -p deconflict-cli --bin run_scenario -- --list

use anyhow::Context;
use clap::Parser;
use deconflict_cli::sim::scenarios::{build_scenario, SCENARIOS};
use deconflict_core::{generate_report, DeconflictionEngine};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Run a deconfliction demo scenario")]
struct Args {
    /// Scenario name (see --list)
    #[arg(long, default_value = "straight")]
    scenario: String,

    /// List available scenarios and exit
    #[arg(long)]
    list: bool,

    /// Override the number of traffic drones
    #[arg(long)]
    traffic: Option<usize>,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Emit the JSON result instead of the text report
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    if args.list {
        println!("Available scenarios:");
        for spec in &SCENARIOS {
            println!(
                "  {:<10} {} ({} drones, seed {})",
                spec.name, spec.description, spec.default_traffic, spec.default_seed
            );
        }
        return Ok(());
    }

    let scenario = build_scenario(&args.scenario, args.seed, args.traffic)
        .with_context(|| format!("unknown scenario '{}' (try --list)", args.scenario))?;

    tracing::info!(
        scenario = scenario.name,
        seed = scenario.seed,
        traffic = scenario.traffic.len(),
        "building airspace"
    );

    let engine = DeconflictionEngine::new();
    for mission in scenario.traffic {
        engine
            .register_mission(mission)
            .context("failed to register traffic mission")?;
    }

    let outcome = engine
        .check_mission(&scenario.primary)
        .context("deconfliction check failed")?;

    let reductions = engine.last_filter_stats();
    tracing::info!(
        cleared = outcome.cleared,
        conflicts = outcome.conflicts.len(),
        total_ms = outcome.metrics.total_ms,
        "check complete"
    );
    tracing::debug!(
        initial = reductions.initial,
        after_temporal = reductions.after_temporal,
        after_bbox = reductions.after_bbox,
        after_coarse = reductions.after_coarse,
        "stage 1 reductions"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print!(
            "{}",
            generate_report(&scenario.primary, &outcome, engine.traffic_count())
        );
    }

    Ok(())
}
