//! Entity loading from CSV or JSON, with an optional parsed-entity cache.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use nfer_core::Entity;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// File name of the parsed-entity cache inside the cache directory.
pub const ENTITY_CACHE_FILE: &str = "entities.json";

/// Parsed entities together with what they were parsed from.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityCache {
    source: String,
    radius_metres: f64,
    entities: Vec<Entity>,
}

/// One CSV row. Extra columns are ignored.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Description")]
    reference: String,
    #[serde(rename = "Latitude")]
    latitude: f64,
    #[serde(rename = "Longitude")]
    longitude: f64,
}

/// Parse CSV text. Every row is given `radius_metres`.
pub fn parse_csv(text: &str, radius_metres: f64) -> Result<Vec<Entity>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = csv::Reader::from_reader(text.as_bytes());

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(i, row)| {
            let row = row.with_context(|| format!("CSV record {}", i + 1))?;
            Ok(Entity::new(row.reference, row.name, row.latitude, row.longitude, radius_metres))
        })
        .collect()
}

pub fn parse_json(text: &str) -> Result<Vec<Entity>> {
    serde_json::from_str(text).context("invalid entity JSON")
}

/// Load entities from `path`, choosing the format by extension.
pub fn load_entities(path: &Path, radius_metres: f64) -> Result<Vec<Entity>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let entities = match ext.as_deref() {
        Some("csv") => parse_csv(&text, radius_metres)?,
        Some("json") => parse_json(&text)?,
        _ => bail!("unsupported input {} (expected .csv or .json)", path.display()),
    };

    info!("Loaded {} entities from {}", entities.len(), path.display());
    Ok(entities)
}

/// Load entities, preferring `cache_dir/entities.json` when it was parsed
/// from the same input with the same radius, and rewriting it otherwise.
pub fn load_entities_cached(path: &Path, radius_metres: f64, cache_dir: Option<&Path>) -> Result<Vec<Entity>> {
    let Some(dir) = cache_dir else {
        return load_entities(path, radius_metres);
    };

    let source = path.display().to_string();
    let cache = dir.join(ENTITY_CACHE_FILE);
    if cache.is_file() {
        let text = fs::read_to_string(&cache).with_context(|| format!("reading {}", cache.display()))?;
        match serde_json::from_str::<EntityCache>(&text) {
            Ok(stored) if stored.source == source && stored.radius_metres == radius_metres => {
                info!("Loaded {} cached entities from {}", stored.entities.len(), cache.display());
                return Ok(stored.entities);
            }
            Ok(stored) => warn!(
                "{} holds {} at {} m, reloading {} at {} m",
                cache.display(),
                stored.source,
                stored.radius_metres,
                source,
                radius_metres
            ),
            Err(e) => warn!("Ignoring unreadable {}: {}", cache.display(), e),
        }
    }

    let entities = load_entities(path, radius_metres)?;
    let stored = EntityCache { source, radius_metres, entities };
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    fs::write(&cache, serde_json::to_string(&stored)?)
        .with_context(|| format!("writing {}", cache.display()))?;
    Ok(stored.entities)
}
