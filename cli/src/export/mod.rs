//! Output writers for resolved overlaps.

pub mod json;
pub mod kml;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use nfer_core::ResolvedOverlap;
use tracing::info;

/// Render `results` with `render` and write them to `path`.
pub fn write_to(
    path: &Path,
    results: &[ResolvedOverlap],
    render: fn(&[ResolvedOverlap]) -> Result<String>,
) -> Result<()> {
    let text = render(results)?;
    fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    info!("Wrote {} overlaps to {}", results.len(), path.display());
    Ok(())
}

#[cfg(test)]
pub(crate) fn sample_overlap(piece: usize, refs: &[&str]) -> ResolvedOverlap {
    use nfer_core::{assemble::overlap_id, Contributor, GeoPoint};

    let contributors: Vec<Contributor> = refs
        .iter()
        .map(|r| Contributor { name: format!("Site {}", r), reference: r.to_string() })
        .collect();
    ResolvedOverlap {
        id: overlap_id(piece, &contributors),
        piece,
        layer: refs.len(),
        point: GeoPoint::new(51.5, -1.0),
        boundary: vec![
            GeoPoint::new(51.5, -1.0),
            GeoPoint::new(51.6, -1.0),
            GeoPoint::new(51.6, -0.9),
            GeoPoint::new(51.5, -1.0),
        ],
        contributors,
    }
}
