//! Persisted arrangements. Building the arrangement dominates run time, so a
//! stored one is reused while it still matches the zones and settings.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use nfer_core::{Arrangement, CoordinateProjector, Pipeline, Zone};
use tracing::{info, warn};

pub const ARRANGEMENT_CACHE_FILE: &str = "arrangement.json";

/// The arrangement for `zones`, read from `cache_dir` when a matching one is
/// stored there, otherwise built and stored.
pub fn arrangement_cached<P: CoordinateProjector>(
    pipeline: &Pipeline<P>,
    zones: &[Zone],
    cache_dir: Option<&Path>,
) -> Result<Arrangement> {
    let Some(dir) = cache_dir else {
        return Ok(pipeline.build_arrangement(zones)?);
    };

    let path = dir.join(ARRANGEMENT_CACHE_FILE);
    if path.is_file() {
        let text = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        match serde_json::from_str::<Arrangement>(&text) {
            Ok(stored) if stored.matches(pipeline.config(), zones) => {
                info!("Loaded {} cached cells from {}", stored.cells.len(), path.display());
                return Ok(stored);
            }
            Ok(_) => warn!("{} was built from other zones or settings, rebuilding", path.display()),
            Err(e) => warn!("Ignoring unreadable {}: {}", path.display(), e),
        }
    }

    let arrangement = pipeline.build_arrangement(zones)?;
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    fs::write(&path, serde_json::to_string(&arrangement)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(arrangement)
}
