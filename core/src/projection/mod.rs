//! Coordinate projection between geographic and planar coordinates.
//!
//! The pipeline binds one projector at startup and passes it to every stage
//! that needs it. Inputs far outside a projector's valid region are not
//! rejected; the output is silently distorted. `in_domain` lets callers warn.

mod osgb;

pub use osgb::{BritishNationalGrid, Ellipsoid, Helmert};

use serde::{Deserialize, Serialize};

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Bidirectional mapping between geographic and planar metric coordinates.
pub trait CoordinateProjector: Send + Sync {
    /// Project latitude/longitude (degrees) to planar `[x, y]` meters.
    fn to_planar(&self, lat: f64, lon: f64) -> [f64; 2];

    /// Inverse of [`to_planar`](Self::to_planar).
    fn to_geographic(&self, x: f64, y: f64) -> GeoPoint;

    /// Whether the projection is accurate at this position.
    fn in_domain(&self, _lat: f64, _lon: f64) -> bool {
        true
    }
}

/// Treats latitude as `y` and longitude as `x` unchanged. For inputs that are
/// already planar meters.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityProjector;

impl CoordinateProjector for IdentityProjector {
    fn to_planar(&self, lat: f64, lon: f64) -> [f64; 2] {
        [lon, lat]
    }

    fn to_geographic(&self, x: f64, y: f64) -> GeoPoint {
        GeoPoint::new(y, x)
    }
}
