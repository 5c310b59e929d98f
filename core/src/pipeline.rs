//! Runs the overlap stages in order with one projector and one configuration.

use tracing::{info, warn};

use crate::arrangement::{Arrangement, ArrangementBuilder};
use crate::assemble::{ResolvedOverlap, ResultAssembler};
use crate::config::OverlapConfig;
use crate::error::OverlapResult;
use crate::projection::CoordinateProjector;
use crate::resolve::{OverlapRecord, OverlapResolver};
use crate::zone::{self, Entity, Zone};

/// The overlap finder.
///
/// Callers that persist arrangements run the stages one by one and skip
/// [`build_arrangement`](Self::build_arrangement) when a matching
/// arrangement is already at hand. [`run`](Self::run) does everything.
pub struct Pipeline<P: CoordinateProjector> {
    projector: P,
    config: OverlapConfig,
}

impl<P: CoordinateProjector> Pipeline<P> {
    pub fn new(projector: P, config: OverlapConfig) -> OverlapResult<Self> {
        config.validate()?;
        Ok(Self { projector, config })
    }

    pub fn config(&self) -> &OverlapConfig {
        &self.config
    }

    pub fn projector(&self) -> &P {
        &self.projector
    }

    /// Project and polygonize every entity. Fails on the first invalid one.
    pub fn build_zones(&self, entities: &[Entity]) -> OverlapResult<Vec<Zone>> {
        for e in entities {
            if e.lat.is_finite() && e.lon.is_finite() && !self.projector.in_domain(e.lat, e.lon) {
                warn!("'{}' at ({}, {}) is outside the projection's valid region", e.label(), e.lat, e.lon);
            }
        }

        let zones = zone::build_zones(entities, &self.projector, self.config.circle_points)?;
        info!("Built {} zones with {} points each", zones.len(), self.config.circle_points);
        Ok(zones)
    }

    pub fn build_arrangement(&self, zones: &[Zone]) -> OverlapResult<Arrangement> {
        ArrangementBuilder::new(self.config).build(zones)
    }

    pub fn resolve(&self, arrangement: &Arrangement, zones: &[Zone]) -> Vec<OverlapRecord> {
        OverlapResolver::new(self.config.min_layer).resolve(arrangement, zones)
    }

    pub fn assemble(&self, records: Vec<OverlapRecord>) -> Vec<ResolvedOverlap> {
        ResultAssembler::new(&self.projector).assemble(records)
    }

    /// Entities in, ordered overlaps out.
    pub fn run(&self, entities: &[Entity]) -> OverlapResult<Vec<ResolvedOverlap>> {
        let zones = self.build_zones(entities)?;
        let arrangement = self.build_arrangement(&zones)?;
        let records = self.resolve(&arrangement, &zones);
        Ok(self.assemble(records))
    }
}
