//! nfer-finder: finds places covered by the activation zones of several
//! sites at once and writes them out as KML and/or JSON.
//!
//! ```bash
//! nfer-finder bunkers.csv --kml output.kml
//! nfer-finder bunkers.csv --min-layer 2 --json overlaps.json --cache-dir .nfer-cache
//! ```

mod cache;
mod export;
mod loader;
mod settings;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use nfer_core::{BritishNationalGrid, Pipeline};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use settings::Settings;

#[derive(Parser)]
#[command(name = "nfer-finder")]
#[command(version)]
#[command(about = "Find N-fers: places inside the activation zones of several sites at once")]
struct Cli {
    /// Entity list (.csv with Name, Description, Latitude, Longitude columns, or .json)
    input: PathBuf,

    /// Settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// KML output file; no KML is written without it
    #[arg(long)]
    kml: Option<PathBuf>,

    /// JSON output file
    #[arg(long)]
    json: Option<PathBuf>,

    /// Reuse parsed entities and the overlap arrangement stored here
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Activation radius in meters for CSV input
    #[arg(long)]
    radius: Option<f64>,

    /// Report only places covered by at least this many zones
    #[arg(long)]
    min_layer: Option<usize>,

    /// Vertices per circle
    #[arg(long)]
    circle_points: Option<usize>,

    /// Boundary buffer in meters
    #[arg(long)]
    tolerance: Option<f64>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        if let Some(r) = self.radius {
            settings.radius_metres = r;
        }
        if let Some(n) = self.min_layer {
            settings.overlap.min_layer = n;
        }
        if let Some(n) = self.circle_points {
            settings.overlap.circle_points = n;
        }
        if let Some(t) = self.tolerance {
            settings.overlap.tolerance = t;
        }
        Ok(settings)
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let start = Instant::now();
    let settings = cli.settings()?;
    let cache_dir = cli.cache_dir.as_deref();

    if cli.kml.is_none() && cli.json.is_none() {
        warn!("Neither --kml nor --json given, overlaps will only be counted");
    }

    let pipeline = Pipeline::new(BritishNationalGrid::new(), settings.overlap)?;

    let entities = loader::load_entities_cached(&cli.input, settings.radius_metres, cache_dir)?;
    let zones = pipeline.build_zones(&entities)?;
    let arrangement = cache::arrangement_cached(&pipeline, &zones, cache_dir)?;
    let records = pipeline.resolve(&arrangement, &zones);
    let results = pipeline.assemble(records);

    if let Some(path) = &cli.kml {
        export::write_to(path, &results, export::kml::render).context("KML export failed")?;
    }
    if let Some(path) = &cli.json {
        export::write_to(path, &results, export::json::render).context("JSON export failed")?;
    }

    info!("Done: {} overlaps in {:.3}s", results.len(), start.elapsed().as_secs_f64());
    Ok(())
}
