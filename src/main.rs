use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use cartoglyph::scenario::ScenarioLoader;

#[derive(Debug, Parser)]
#[command(author, version, about = "Procedural coastal map generator")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/coastal_mountains.yaml")]
    scenario: PathBuf,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the map dimension (must be 2^k + 1)
    #[arg(long)]
    dimension: Option<usize>,

    /// Log filter, e.g. `debug` or `cartoglyph=trace` (defaults to the scenario's level)
    #[arg(long)]
    log_level: Option<String>,

    /// Print the map summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let mut scenario = loader.load(&cli.scenario)?;

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| scenario.logging.level.clone());
    env_logger::Builder::new().parse_filters(&level).init();

    if let Some(seed) = cli.seed {
        scenario.seed = seed;
    }
    if let Some(dimension) = cli.dimension {
        scenario.map.dimension = dimension;
        scenario.map.feature_size = scenario.map.feature_size.min(dimension.saturating_sub(1));
    }
    scenario.validate().context("Invalid command-line overrides")?;

    let mut engine = scenario.build_engine();
    let generated = match engine.generate() {
        Ok(generated) => generated,
        Err(err) if err.is_recoverable() => {
            return Err(err).with_context(|| {
                format!(
                    "Seed {} produced no valid settlement sites; try another --seed",
                    scenario.seed
                )
            })
        }
        Err(err) => return Err(err.into()),
    };
    let summary = generated.summary();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "Scenario '{}' (seed {}): {}x{} map, elevation {:.3}..{:.3}",
        summary.scenario,
        summary.seed,
        summary.dimension,
        summary.dimension,
        summary.min_elevation,
        summary.max_elevation
    );
    let terrain = &summary.terrain;
    println!(
        "  terrain: {} water, {} sand, {} forest, {} rock, {} glacier, {} structures",
        terrain.water,
        terrain.sand,
        terrain.forest,
        terrain.rock,
        terrain.glacier,
        terrain.structure
    );
    println!(
        "  rivers: {} ({} carved tiles, longest {})",
        summary.rivers.count, summary.rivers.carved_tiles, summary.rivers.longest
    );
    for (index, settlement) in summary.settlements.iter().enumerate() {
        println!(
            "  settlement {}: centre ({}, {}), {} occupants",
            index + 1,
            settlement.center.row,
            settlement.center.col,
            settlement.placements.len()
        );
    }
    Ok(())
}
