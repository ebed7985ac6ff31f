//! Time resolution for daily ocean rasters.
//!
//! Upstream providers publish one raster per UTC day, hours behind the
//! calendar: at 06:00 UTC "today" often does not exist yet. This crate
//! turns an abstract [`TimeSelector`] into a concrete [`ResolvedTime`] by
//! probing upstream availability, walking back up to two days for the
//! `latest`/`today` selectors and never walking back for explicit ones.

pub mod cache;

use std::sync::Arc;

use ocean_common::tile::lonlat_to_pixel;
use ocean_common::time::{time_token, utc_days_ago, utc_today};
use ocean_common::{LayerSpec, OceanError, OceanResult, ResolvedTime, TilePixel, TimeSelector};
use tracing::{debug, info, warn};
use upstream_client::AvailabilityProbe;

pub use cache::ResolutionCache;

/// Zoom level for availability probes. Coarse enough that one tile covers a
/// wide area, fine enough that the upstream actually serves it.
pub const PROBE_ZOOM: u32 = 6;

/// How many days the latest/today fallback chain walks back past today.
const MAX_FALLBACK_DAYS: u8 = 2;

/// Resolves selectors to concrete dates by probing upstream availability.
///
/// Generic over the probe so resolution logic is testable without a live
/// upstream.
pub struct TimeResolver<P: AvailabilityProbe> {
    probe: Arc<P>,
    cache: ResolutionCache,
}

impl<P: AvailabilityProbe> TimeResolver<P> {
    pub fn new(probe: Arc<P>, cache_ttl_secs: u64) -> Self {
        Self {
            probe,
            cache: ResolutionCache::new(cache_ttl_secs),
        }
    }

    /// Resolve a selector against one layer, probing at the given point.
    ///
    /// `latest`/`today` walk the chain today, -1d, -2d and never fail: if
    /// every probe misses, the -2d date is returned with depth 2 so callers
    /// still have a concrete time to request (the upstream may simply be
    /// refusing probes while still serving tiles). Explicit selectors probe
    /// once and surface `NoDataAvailable` on a miss.
    pub async fn resolve(
        &self,
        selector: &TimeSelector,
        spec: &LayerSpec,
        probe_point: &TilePixel,
    ) -> OceanResult<ResolvedTime> {
        let key = cache_key(spec, selector);
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let resolved = if selector.allows_fallback() {
            self.resolve_with_fallback(spec, probe_point).await
        } else {
            self.resolve_exact(selector, spec, probe_point).await?
        };

        self.cache.set(key, resolved.clone()).await;
        Ok(resolved)
    }

    /// Probe today, yesterday, two days ago; first hit wins.
    async fn resolve_with_fallback(&self, spec: &LayerSpec, point: &TilePixel) -> ResolvedTime {
        for depth in 0..=MAX_FALLBACK_DAYS {
            let date = utc_days_ago(depth);
            match self.probe.probe(spec, point, &time_token(date)).await {
                Ok(true) => {
                    debug!(layer = %spec.id, date = %date, depth = depth, "time resolved");
                    return ResolvedTime::new(date, depth);
                }
                Ok(false) => {
                    debug!(layer = %spec.id, date = %date, "no raster for date, falling back");
                }
                Err(e) => {
                    warn!(layer = %spec.id, date = %date, error = %e, "probe failed, falling back");
                }
            }
        }

        // Fail soft: hand back the oldest chain date rather than erroring.
        let date = utc_days_ago(MAX_FALLBACK_DAYS);
        info!(layer = %spec.id, date = %date, "all probes missed, assuming oldest fallback date");
        ResolvedTime::new(date, MAX_FALLBACK_DAYS)
    }

    /// A single probe for an explicit date or fixed offset.
    async fn resolve_exact(
        &self,
        selector: &TimeSelector,
        spec: &LayerSpec,
        point: &TilePixel,
    ) -> OceanResult<ResolvedTime> {
        let date = match selector {
            TimeSelector::DaysAgo(n) => utc_days_ago(*n),
            TimeSelector::Date(d) => *d,
            // allows_fallback() routed Latest/Today elsewhere
            _ => return Err(OceanError::Internal("selector routing error".to_string())),
        };

        match self.probe.probe(spec, point, &time_token(date)).await {
            Ok(true) => Ok(ResolvedTime::new(date, 0)),
            Ok(false) => Err(OceanError::NoDataAvailable(format!(
                "no raster published for {}",
                date
            ))),
            Err(e) => {
                warn!(layer = %spec.id, date = %date, error = %e, "probe for explicit date failed");
                Err(OceanError::NoDataAvailable(format!(
                    "availability unknown for {}",
                    date
                )))
            }
        }
    }

    pub async fn invalidate_cache(&self) {
        self.cache.invalidate().await;
    }
}

/// Cache key: layer, selector, UTC day. The day component keeps relative
/// selectors from surviving a midnight rollover.
fn cache_key(spec: &LayerSpec, selector: &TimeSelector) -> String {
    format!("{}:{}:{}", spec.id, selector.cache_key(), utc_today())
}

/// The representative probe pixel for a geographic point, at probe zoom.
pub fn probe_pixel(lon: f64, lat: f64) -> TilePixel {
    lonlat_to_pixel(lon, lat, PROBE_ZOOM, 256)
}
