pub mod arrangement;
pub mod assemble;
pub mod config;
pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod projection;
pub mod resolve;
pub mod zone;

pub use arrangement::{Arrangement, ArrangementBuilder, Cell};
pub use assemble::{ResolvedOverlap, ResultAssembler};
pub use config::OverlapConfig;
pub use error::{OverlapError, OverlapResult, ZoneDefect};
pub use pipeline::Pipeline;
pub use projection::{BritishNationalGrid, CoordinateProjector, GeoPoint, IdentityProjector};
pub use resolve::{Contributor, OverlapRecord, OverlapResolver};
pub use zone::{Entity, Zone};
