use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use signet::{Engine, EngineConfig};

#[derive(Debug, Parser)]
#[command(author, version, about = "Runs the signet reference frame loop")]
struct Cli {
    /// Path to the run configuration YAML file (defaults apply when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override tick count
    #[arg(long)]
    ticks: Option<u64>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_yaml(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(ticks) = cli.ticks {
        config.ticks = ticks;
    }
    if let Some(seed) = cli.seed {
        config.random_seed = seed;
    }

    let level_name = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    let level = Level::from_str(level_name)
        .with_context(|| format!("unknown log level '{level_name}'"))?;
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install log subscriber")?;

    let ticks = config.ticks;
    info!(run = %config.name, ticks, seed = config.random_seed, "starting run");
    let mut engine = Engine::new(config)?;
    let summary = engine.run(ticks)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Run '{}' completed for {} ticks. Live entities: {} (spawned {}, despawned {}).",
            summary.name, summary.ticks, summary.live_entities, summary.spawned, summary.despawned
        );
    }
    Ok(())
}
