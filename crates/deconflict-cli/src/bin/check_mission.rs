//! File-driven checker: load mission JSON files and run one deconfliction
//! check.
//!
//! Usage:
//!   cargo run -p deconflict-cli --bin check_mission -- \
//!       --primary primary.json --traffic t1.json --traffic t2.json

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use deconflict_core::{generate_report, DeconflictionEngine, Mission};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Check a mission JSON file against traffic")]
struct Args {
    /// Primary mission JSON file
    #[arg(long)]
    primary: PathBuf,

    /// Traffic mission JSON files (repeatable)
    #[arg(long)]
    traffic: Vec<PathBuf>,

    /// Emit the JSON result instead of the text report
    #[arg(long)]
    json: bool,
}

fn load_mission(path: &Path) -> anyhow::Result<Mission> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let primary = load_mission(&args.primary)?;

    let engine = DeconflictionEngine::new();
    for path in &args.traffic {
        let mission = load_mission(path)?;
        engine
            .register_mission(mission)
            .with_context(|| format!("failed to register {}", path.display()))?;
    }

    let outcome = engine
        .check_mission(&primary)
        .context("deconfliction check failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print!(
            "{}",
            generate_report(&primary, &outcome, engine.traffic_count())
        );
    }

    // Non-zero exit mirrors the clearance decision for scripting.
    if !outcome.cleared {
        std::process::exit(1);
    }
    Ok(())
}
