//! Tunable parameters of the overlap engine.

use serde::{Deserialize, Serialize};

use crate::error::{OverlapError, OverlapResult};

/// Default number of vertices used to approximate each circle.
pub const DEFAULT_CIRCLE_POINTS: usize = 128;

/// Default minimum layer count for a cell to be resolved and reported.
pub const DEFAULT_MIN_LAYER: usize = 3;

/// Default boundary buffer, in projected meters.
pub const DEFAULT_TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlapConfig {
    /// Vertices per zone polygon. More points is more accurate and slower.
    pub circle_points: usize,
    /// Cells covered by fewer zones than this are never resolved.
    pub min_layer: usize,
    /// Outward buffer applied to zone boundaries while building the
    /// arrangement, and removed again from the resulting cells.
    pub tolerance: f64,
}

impl Default for OverlapConfig {
    fn default() -> Self {
        Self {
            circle_points: DEFAULT_CIRCLE_POINTS,
            min_layer: DEFAULT_MIN_LAYER,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl OverlapConfig {
    pub fn validate(&self) -> OverlapResult<()> {
        if self.circle_points < 3 {
            return Err(OverlapError::InvalidConfig(format!(
                "circle_points must be at least 3, got {}",
                self.circle_points
            )));
        }
        if self.min_layer == 0 {
            return Err(OverlapError::InvalidConfig(
                "min_layer must be at least 1".to_string(),
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(OverlapError::InvalidConfig(format!(
                "tolerance must be positive and finite, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}
