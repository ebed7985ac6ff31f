//! Shared types for the ocean tile and zonal analysis services.
//!
//! Pure geometry and configuration types with no I/O. Everything downstream
//! (upstream client, time resolution, sampler, HTTP service) builds on these.

pub mod bbox;
pub mod error;
pub mod geometry;
pub mod layer;
pub mod tile;
pub mod time;

pub use bbox::BoundingBox;
pub use error::{OceanError, OceanResult};
pub use geometry::Polygon;
pub use layer::{AuthMode, AxisOrder, LayerId, LayerSpec, LayerTable, UnitConversion, UpstreamProtocol};
pub use tile::{TileCoord, TilePixel};
pub use time::{ResolvedTime, TimeSelector};
