//! Application entry point for the bristle-stroke viewer.
//!
//! This binary parses the command line, sets up logging and eframe/egui,
//! and delegates all interactive logic and rendering to [`Viewer`] from
//! the `viewer` module.

mod viewer;

use std::path::PathBuf;

use anyhow::Context as _;
use bristle_core::config::Config;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use viewer::Viewer;

/// Paints random bristle-brush strokes in a window.
#[derive(Parser, Debug)]
#[command(name = "bristle-view", version, about)]
struct Args {
    /// TOML file overriding brush, trace and sketch settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for every stroke's randomness. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,
}

/// Starts the native eframe application.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if the config cannot be loaded or eframe fails to create the
///   native window or event loop.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let cfg = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, "starting viewer");

    let viewer = Viewer::new(cfg, seed).context("creating canvas")?;

    eframe::run_native(
        "Bristle Strokes",
        eframe::NativeOptions::default(),
        Box::new(|_cc| Ok(Box::new(viewer))),
    )
    .map_err(|e| anyhow::anyhow!("eframe failed: {e}"))
}
