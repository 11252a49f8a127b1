//! Lattice - demo driver for the Lattice ECS
//!
//! Spawns a population of particles, runs the movement/expiry/clock systems
//! until the clock stops the engine, and reports what happened.

mod settings;
mod sim;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use lattice_core::IdAllocator;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::settings::Settings;

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    info!("Starting Lattice demo...");

    let settings = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => Settings::load_from(&path),
        None => Settings::load(),
    };

    let ids = IdAllocator::new();
    let mut engine = sim::build_engine(&settings, &ids);

    engine.setup();
    let started = Instant::now();
    let summary = engine.run();
    let elapsed = started.elapsed();
    engine.teardown();

    info!(
        "Ran {} ticks in {:.2?} ({:?}), {} entities left",
        summary.ticks,
        elapsed,
        summary.reason,
        engine.store().len()
    );
    Ok(())
}
