//! Entities and the circular zones derived from them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{OverlapError, OverlapResult, ZoneDefect};
use crate::geometry::utils_2d::{self, distance_squared};
use crate::geometry::Bounds2;
use crate::projection::CoordinateProjector;

/// A source entity: a named point with an activation radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    #[serde(rename = "ref")]
    pub reference: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub radius_metres: f64,
}

impl Entity {
    pub fn new(reference: impl Into<String>, name: impl Into<String>, lat: f64, lon: f64, radius_metres: f64) -> Self {
        Self {
            reference: reference.into(),
            name: name.into(),
            lat,
            lon,
            radius_metres,
        }
    }

    pub fn label(&self) -> String {
        display_label(&self.reference, &self.name)
    }
}

/// "REF Name", as shown to users; just the name when there is no reference.
pub fn display_label(reference: &str, name: &str) -> String {
    if reference.is_empty() {
        name.to_string()
    } else {
        format!("{} {}", reference, name)
    }
}

/// An entity's circle in planar coordinates together with its polygon
/// approximation.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    /// Position of the source entity in the input list.
    pub entity: usize,
    pub name: String,
    pub reference: String,
    pub center: [f64; 2],
    pub radius: f64,
    /// Counter-clockwise open ring, every vertex on the circle.
    pub polygon: Vec<[f64; 2]>,
    pub bounds: Bounds2,
}

impl Zone {
    /// Project an entity and approximate its circle with `point_count`
    /// vertices.
    pub fn from_entity<P: CoordinateProjector + ?Sized>(
        index: usize,
        entity: &Entity,
        projector: &P,
        point_count: usize,
    ) -> OverlapResult<Zone> {
        let invalid = |defect| OverlapError::InvalidZone {
            name: entity.label(),
            defect,
        };

        if !entity.lat.is_finite() || !entity.lon.is_finite() {
            return Err(invalid(ZoneDefect::NonFiniteCenter(entity.lat, entity.lon)));
        }

        let center = projector.to_planar(entity.lat, entity.lon);
        let polygon = build_polygon(center, entity.radius_metres, point_count).map_err(invalid)?;

        Ok(Zone {
            entity: index,
            name: entity.name.clone(),
            reference: entity.reference.clone(),
            center,
            radius: entity.radius_metres,
            bounds: Bounds2::from_points(&polygon),
            polygon,
        })
    }

    /// Exact membership: planar distance to the center strictly less than the
    /// radius.
    pub fn contains(&self, point: [f64; 2]) -> bool {
        distance_squared(point, self.center) < self.radius * self.radius
    }
}

/// Regular `point_count`-gon with every vertex on the circle, ordered
/// counter-clockwise.
pub fn build_polygon(center: [f64; 2], radius: f64, point_count: usize) -> Result<Vec<[f64; 2]>, ZoneDefect> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(ZoneDefect::InvalidRadius(radius));
    }
    if !center[0].is_finite() || !center[1].is_finite() {
        return Err(ZoneDefect::NonFiniteCenter(center[0], center[1]));
    }
    if point_count < 3 {
        return Err(ZoneDefect::TooFewPoints(point_count));
    }
    Ok(utils_2d::regular_polygon(center, radius, point_count))
}

/// Digest of every zone's center and radius, in order. Two zone lists with
/// the same fingerprint produce the same arrangement for a given config.
pub fn fingerprint(zones: &[Zone]) -> Uuid {
    let mut bytes = Vec::with_capacity(zones.len() * 24);
    for zone in zones {
        for v in [zone.center[0], zone.center[1], zone.radius] {
            bytes.extend_from_slice(&v.to_bits().to_le_bytes());
        }
    }
    Uuid::new_v5(&Uuid::NAMESPACE_OID, &bytes)
}

/// Build every zone, failing on the first invalid entity.
pub fn build_zones<P: CoordinateProjector + ?Sized>(
    entities: &[Entity],
    projector: &P,
    point_count: usize,
) -> OverlapResult<Vec<Zone>> {
    entities
        .iter()
        .enumerate()
        .map(|(i, e)| Zone::from_entity(i, e, projector, point_count))
        .collect()
}
