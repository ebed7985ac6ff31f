//! Zonal statistics over upstream rasters.
//!
//! Given a polygon, lays a deterministic sampling grid over its bounding
//! box, keeps the points inside the polygon, fetches the raster value at
//! each point concurrently, and aggregates into [`ZonalStats`]. The grid is
//! deterministic on purpose: the same polygon always samples the same
//! pixels, so results are reproducible and upstream-cacheable.

pub mod stats;

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use ocean_common::tile::{lonlat_to_pixel, optimal_zoom_for_span};
use ocean_common::{LayerSpec, OceanError, OceanResult, Polygon, ResolvedTime, TilePixel};
use serde::Serialize;
use tracing::{debug, warn};
use upstream_client::UpstreamClient;

pub use stats::ZonalStats;

/// Sampling grid dimension; the grid is GRID_SIZE x GRID_SIZE cell centers.
pub const GRID_SIZE: usize = 16;

/// In-flight upstream point queries per zone.
pub const MAX_CONCURRENT: usize = 8;

/// Source of single-point raster values. Implemented by the upstream
/// client; mocked in tests.
#[async_trait]
pub trait PointSource: Send + Sync {
    /// `Ok(None)` means no data at this pixel (land, cloud gap).
    async fn value_at(
        &self,
        spec: &LayerSpec,
        point: &TilePixel,
        time_token: &str,
    ) -> OceanResult<Option<f64>>;
}

#[async_trait]
impl PointSource for UpstreamClient {
    async fn value_at(
        &self,
        spec: &LayerSpec,
        point: &TilePixel,
        time_token: &str,
    ) -> OceanResult<Option<f64>> {
        self.fetch_point_value(spec, point, time_token).await
    }
}

/// Outcome of sampling one zone for one layer.
#[derive(Debug, Clone, Serialize)]
pub struct SampleReport {
    pub stats: ZonalStats,
    /// Grid points that fell inside the polygon
    pub n_points: usize,
    /// Fraction of the bbox grid covered by the polygon
    pub coverage: f64,
    /// Zoom level the samples were taken at
    pub zoom: u32,
}

pub struct ZonalSampler<S: PointSource> {
    source: Arc<S>,
}

impl<S: PointSource> ZonalSampler<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    /// Sample one layer over one polygon at an already-resolved time.
    ///
    /// Individual point failures are tolerated and counted as missing; only
    /// a zone with zero valid samples is an error, because there is nothing
    /// to aggregate.
    pub async fn sample_zone(
        &self,
        spec: &LayerSpec,
        polygon: &Polygon,
        time: &ResolvedTime,
    ) -> OceanResult<SampleReport> {
        polygon.validate()?;

        let bbox = polygon.bbox();
        let zoom = optimal_zoom_for_span(bbox.max_degree_span());
        let points: Vec<(f64, f64)> = grid_points(polygon);

        if points.is_empty() {
            // A valid polygon so thin the grid misses it entirely
            return Err(OceanError::NoDataAvailable(
                "polygon too narrow for the sampling grid".to_string(),
            ));
        }

        let n_points = points.len();
        debug!(
            layer = %spec.id,
            n_points = n_points,
            zoom = zoom,
            time = %time.token,
            "sampling zone"
        );

        let source = &self.source;
        let results: Vec<OceanResult<Option<f64>>> = stream::iter(points)
            .map(|(lon, lat)| {
                let pixel = lonlat_to_pixel(lon, lat, zoom, 256);
                async move { source.value_at(spec, &pixel, &time.token).await }
            })
            .buffer_unordered(MAX_CONCURRENT)
            .collect()
            .await;

        let mut valid = Vec::with_capacity(results.len());
        let mut n_nodata = 0usize;
        let mut n_errors = 0usize;
        for result in results {
            match result {
                Ok(Some(v)) => valid.push(v),
                Ok(None) => n_nodata += 1,
                Err(e) => {
                    n_errors += 1;
                    n_nodata += 1;
                    debug!(layer = %spec.id, error = %e, "point sample failed");
                }
            }
        }

        if n_errors > 0 {
            warn!(
                layer = %spec.id,
                n_errors = n_errors,
                n_valid = valid.len(),
                "some point samples failed"
            );
        }

        let stats = ZonalStats::from_samples(&valid, n_nodata, spec.conversion, &spec.display_units)
            .ok_or_else(|| {
                OceanError::NoDataAvailable("no valid samples inside the polygon".to_string())
            })?;

        Ok(SampleReport {
            stats,
            n_points,
            coverage: n_points as f64 / (GRID_SIZE * GRID_SIZE) as f64,
            zoom,
        })
    }
}

/// The deterministic sampling grid: cell centers of a GRID_SIZE x GRID_SIZE
/// lattice over the polygon's bbox, filtered to points inside the polygon.
pub fn grid_points(polygon: &Polygon) -> Vec<(f64, f64)> {
    let bbox = polygon.bbox();
    let dx = bbox.width() / GRID_SIZE as f64;
    let dy = bbox.height() / GRID_SIZE as f64;

    let mut points = Vec::new();
    for row in 0..GRID_SIZE {
        for col in 0..GRID_SIZE {
            let lon = bbox.west + (col as f64 + 0.5) * dx;
            let lat = bbox.south + (row as f64 + 0.5) * dy;
            if polygon.contains(lon, lat) {
                points.push((lon, lat));
            }
        }
    }
    points
}
