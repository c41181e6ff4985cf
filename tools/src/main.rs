//! impact-runner: headless state-credit impact run.
//!
//! Usage:
//!   impact-runner --engine-root exports --output-dir data
//!   impact-runner --config pipeline.json --engine-root exports --db impacts.db --household

use anyhow::Result;
use credit_impact_core::{
    config::PipelineConfig,
    engine::ExportedEngine,
    household::{household_impacts, ReferenceHousehold},
    output::{write_csv, write_outcome, HOUSEHOLD_FILE},
    pipeline::{ImpactPipeline, PipelineOutcome},
    store::ImpactStore,
};
use std::env;
use std::path::PathBuf;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let config_path = string_arg(&args, "--config");
    let engine_root = string_arg(&args, "--engine-root").unwrap_or("./exports");
    let db = string_arg(&args, "--db").unwrap_or(":memory:");
    let with_household = args.iter().any(|a| a == "--household");

    let mut config = match config_path {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = string_arg(&args, "--output-dir") {
        config.output_dir = PathBuf::from(dir);
    }

    let started = chrono::Local::now();
    println!("State credit impact: impact-runner");
    println!("  year:        {}", config.year);
    println!("  states:      {}", config.states.len());
    println!("  scenarios:   {}", config.reform_types().join(", "));
    println!("  engine root: {engine_root}");
    println!("  output dir:  {}", config.output_dir.display());
    println!("  db:          {db}");
    println!();

    let engine = ExportedEngine::new(engine_root);
    let pipeline = ImpactPipeline::new(&engine, &config);

    let mut store = ImpactStore::open(db)?;
    store.migrate()?;
    store.insert_run(pipeline.run_id(), config.year, env!("CARGO_PKG_VERSION"))?;

    let outcome = pipeline.run();
    if outcome.district_impacts.is_empty() {
        log::error!("No results generated");
    } else {
        write_outcome(&config.output_dir, &outcome)?;
    }
    store.save_outcome(&outcome)?;

    if with_household {
        let household = ReferenceHousehold::default();
        let impacts = household_impacts(&engine, &household, &config.states);
        write_csv(&config.output_dir.join(HOUSEHOLD_FILE), &impacts)?;
        println!("Reference household: {} states", impacts.len());
    }

    print_summary(&outcome, started);
    Ok(())
}

fn print_summary(outcome: &PipelineOutcome, started: chrono::DateTime<chrono::Local>) {
    let elapsed = chrono::Local::now() - started;
    println!("=== RUN SUMMARY ===");
    println!("  run_id:        {}", outcome.run_id);
    println!("  elapsed:       {}s", elapsed.num_seconds());
    println!("  states ok:     {}", outcome.completed.len());
    println!("  states failed: {}", outcome.failed.len());
    println!("  district rows: {}", outcome.district_impacts.len());
    println!("  state rows:    {}", outcome.state_summaries.len());
    for failure in &outcome.failed {
        println!("    {} at {}: {}", failure.state, failure.stage, failure.error);
    }
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
