//! Tile proxy handler.
//!
//! `GET /tiles/:layer/:z/:x/:y?time=...`
//!
//! The contract with map clients: once a request is well formed, this
//! endpoint always returns HTTP 200 with an `image/png` body. When the
//! upstream has no data or errors out, the body is a 1x1 transparent PNG
//! and the real story moves into response headers, so a slippy map never
//! renders a broken-tile placeholder over the ocean. Malformed requests
//! (unknown layer, impossible tile index, unparseable time) are the only
//! 4xx cases, rejected before any upstream call.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Extension, Path, Query};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use bytes::Bytes;
use metrics::counter;
use ocean_common::tile::tile_bbox;
use ocean_common::{LayerId, LayerSpec, ResolvedTime, TileCoord, TimeSelector};
use serde::Deserialize;
use serde_json::json;
use time_resolve::{probe_pixel, TimeResolver};
use tracing::{instrument, warn};
use upstream_client::{AvailabilityProbe, FetchOutcome, TileFetcher};

use crate::state::AppState;

/// Pre-encoded 1x1 fully transparent PNG.
const TRANSPARENT_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x04, 0x00, 0x00, 0x00, 0xb5,
    0x1c, 0x0c, 0x02, 0x00, 0x00, 0x00, 0x0b, 0x49, 0x44, 0x41, 0x54, 0x78, 0xda, 0x63, 0xfc,
    0xff, 0x1f, 0x00, 0x03, 0x00, 0x01, 0xfd, 0xab, 0xab, 0x1f, 0xc9, 0x00, 0x00, 0x00, 0x00,
    0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

/// Header reporting what actually happened upstream.
const UPSTREAM_STATUS_HEADER: &str = "x-upstream-status";
/// Header reporting the upstream time parameter the tile was fetched for.
const TILE_TIME_HEADER: &str = "x-tile-time";

/// Deepest zoom the proxy will pass through.
const MAX_TILE_ZOOM: u32 = 18;

#[derive(Debug, Deserialize)]
pub struct TileQuery {
    pub time: Option<String>,
}

/// What a well-formed tile request resolved to.
#[derive(Debug)]
enum TileOutcome {
    Image {
        bytes: Bytes,
        content_type: String,
        time: ResolvedTime,
    },
    NoTile {
        time_label: String,
    },
    Failed {
        status_tag: String,
    },
}

#[instrument(skip(state), fields(layer = %layer, z = z, x = x, y = y))]
pub async fn tile_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((layer, z, x, y)): Path<(String, u32, u32, u32)>,
    Query(query): Query<TileQuery>,
) -> Response {
    // Request validation is the only path that may refuse a tile
    let (spec, tile, selector) = match validate(&state, &layer, z, x, y, query.time.as_deref()) {
        Ok(validated) => validated,
        Err(rejection) => {
            counter!("ocean_tiles_total", "layer" => layer, "status" => "rejected").increment(1);
            return rejection;
        }
    };

    let outcome =
        fetch_tile(&state.resolver, state.client.as_ref(), spec, &tile, &selector).await;

    let status_tag = match &outcome {
        TileOutcome::Image { .. } => "ok".to_string(),
        TileOutcome::NoTile { .. } => "no-data".to_string(),
        TileOutcome::Failed { status_tag } => status_tag.clone(),
    };
    counter!("ocean_tiles_total", "layer" => layer, "status" => status_tag).increment(1);

    tile_response(outcome)
}

/// Turn a tile outcome into the wire response. Always a 200 image.
fn tile_response(outcome: TileOutcome) -> Response {
    match outcome {
        TileOutcome::Image { bytes, content_type, time } => {
            // Fallback tiles cache shorter: the real day may appear any hour
            let max_age = if time.fallback_depth == 0 { 600 } else { 300 };
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE.as_str(), content_type),
                    (
                        header::CACHE_CONTROL.as_str(),
                        format!("public, max-age={}", max_age),
                    ),
                    (UPSTREAM_STATUS_HEADER, "ok".to_string()),
                    (TILE_TIME_HEADER, time.token),
                ],
                bytes,
            )
                .into_response()
        }
        TileOutcome::NoTile { time_label } => transparent_tile("no-data", &time_label),
        TileOutcome::Failed { status_tag } => transparent_tile(&status_tag, "(no tile)"),
    }
}

/// Reject malformed requests with a real error before any upstream call.
fn validate<'a>(
    state: &'a AppState,
    layer: &str,
    z: u32,
    x: u32,
    y: u32,
    time: Option<&str>,
) -> Result<(&'a LayerSpec, TileCoord, TimeSelector), Response> {
    let spec = LayerId::from_str(layer)
        .ok()
        .and_then(|id| state.layers.get(id).ok())
        .ok_or_else(|| {
            error_json(
                StatusCode::NOT_FOUND,
                &format!("unknown layer: {}", layer),
            )
        })?;

    let tile = TileCoord::new(z, x, y);
    if z > MAX_TILE_ZOOM || !tile.is_valid() {
        return Err(error_json(
            StatusCode::BAD_REQUEST,
            &format!("tile index out of range: {}/{}/{}", z, x, y),
        ));
    }

    let selector = TimeSelector::parse(time.unwrap_or(""))
        .map_err(|e| error_json(StatusCode::BAD_REQUEST, &e.to_string()))?;

    Ok((spec, tile, selector))
}

/// The always-succeeds half: from here on every outcome is a 200 image.
///
/// Generic over the resolver's probe and the tile source so the whole path
/// is testable against scripted upstreams.
async fn fetch_tile<P, F>(
    resolver: &TimeResolver<P>,
    client: &F,
    spec: &LayerSpec,
    tile: &TileCoord,
    selector: &TimeSelector,
) -> TileOutcome
where
    P: AvailabilityProbe,
    F: TileFetcher + ?Sized,
{
    // Probe availability at the tile's own center so the answer reflects
    // the part of the world actually being viewed.
    let (lon, lat) = tile_bbox(tile).center();
    let probe_point = probe_pixel(lon, lat);

    let resolved = match resolver.resolve(selector, spec, &probe_point).await {
        Ok(resolved) => resolved,
        Err(_) => {
            // Explicit date the upstream never published
            return TileOutcome::NoTile {
                time_label: "(no tile)".to_string(),
            };
        }
    };

    match client.tile_image(spec, tile, &resolved.token).await {
        FetchOutcome::Ok { bytes, content_type } => TileOutcome::Image {
            bytes,
            content_type,
            time: resolved,
        },
        FetchOutcome::NoData => TileOutcome::NoTile {
            time_label: resolved.token,
        },
        FetchOutcome::UpstreamError { status, message } => {
            warn!(status = ?status, message = %message, "upstream tile fetch failed");
            let tag = match status {
                Some(code) => format!("error:{}", code),
                None => "error:timeout".to_string(),
            };
            TileOutcome::Failed { status_tag: tag }
        }
    }
}

/// The degraded response: still 200, still a PNG, headers tell the truth.
fn transparent_tile(status_tag: &str, time_label: &str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE.as_str(), "image/png".to_string()),
            (
                header::CACHE_CONTROL.as_str(),
                "public, max-age=300".to_string(),
            ),
            (UPSTREAM_STATUS_HEADER, status_tag.to_string()),
            (TILE_TIME_HEADER, time_label.to_string()),
        ],
        Bytes::from_static(TRANSPARENT_PNG),
    )
        .into_response()
}

fn error_json(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "error": {
                "code": status.as_u16(),
                "message": message,
            }
        })),
    )
        .into_response()
}
