//! Authenticated client for upstream WMTS/WMS ocean-data providers.
//!
//! Builds provider-specific request URLs (GetTile, GetMap, GetFeatureInfo),
//! attaches credentials, and classifies every response into a
//! [`FetchOutcome`]. Upstreams are assumed unreliable and are never trusted
//! to characterize their own failures; classification happens here.

pub mod client;
pub mod featureinfo;
pub mod request;

pub use client::{ClientConfig, FetchOutcome, UpstreamClient};

use async_trait::async_trait;
use ocean_common::{LayerSpec, OceanResult, TileCoord, TilePixel};

/// Minimal-cost availability check used by the time resolution engine.
///
/// Implementations answer "does the upstream have data for this layer at
/// this time token", probing a single representative pixel rather than the
/// full requested area.
#[async_trait]
pub trait AvailabilityProbe: Send + Sync {
    async fn probe(&self, spec: &LayerSpec, point: &TilePixel, time_token: &str)
        -> OceanResult<bool>;
}

/// Source of tile image payloads. Implemented by the upstream client;
/// mocked in handler tests. Infallible by construction: every failure mode
/// is a [`FetchOutcome`] variant.
#[async_trait]
pub trait TileFetcher: Send + Sync {
    async fn tile_image(&self, spec: &LayerSpec, tile: &TileCoord, time_token: &str)
        -> FetchOutcome;
}
