//! Web Mercator tile coordinate math.
//!
//! Conversions between (z, x, y) tile indices, WGS84 bounding boxes, and
//! intra-tile pixel offsets. Pure functions, no I/O; the correctness
//! foundation for the proxy and the sampler.

use serde::{Deserialize, Serialize};

use crate::BoundingBox;

/// Latitude clamp to keep the Mercator projection away from the poles.
const MAX_LAT: f64 = 89.999999;

/// Finest zoom the sampler will probe at.
const FINEST_SAMPLE_ZOOM: u32 = 10;

/// A tile coordinate (z/x/y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level (TileMatrix identifier)
    pub z: u32,
    /// Column (x)
    pub x: u32,
    /// Row (y)
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Whether x and y fall inside the 2^z grid.
    pub fn is_valid(&self) -> bool {
        if self.z >= 32 {
            return false;
        }
        let n = 1u64 << self.z;
        (self.x as u64) < n && (self.y as u64) < n
    }

    /// Generate a cache key string.
    pub fn cache_key(&self) -> String {
        format!("{}/{}/{}", self.z, self.x, self.y)
    }
}

/// A geographic point located within a tile: the tile plus pixel offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePixel {
    pub tile: TileCoord,
    /// Pixel column within the tile, clamped to [0, tile_size - 1]
    pub i: u32,
    /// Pixel row within the tile, clamped to [0, tile_size - 1]
    pub j: u32,
}

/// Convert lat/lon to the containing Web Mercator tile.
pub fn latlon_to_tile(lat: f64, lon: f64, zoom: u32) -> TileCoord {
    let n = 2u32.pow(zoom) as f64;
    let lat = lat.clamp(-MAX_LAT, MAX_LAT);

    let x = (((lon + 180.0) / 360.0 * n).floor() as i64).clamp(0, n as i64 - 1) as u32;
    let lat_rad = lat.to_radians();
    let y_raw = (1.0 - lat_rad.tan().asinh() / std::f64::consts::PI) / 2.0 * n;
    let y = (y_raw.floor() as i64).clamp(0, n as i64 - 1) as u32;

    TileCoord { z: zoom, x, y }
}

/// Convert a Web Mercator tile to its WGS84 bounds.
///
/// Latitudes come from the Gudermannian inverse
/// `atan(sinh(pi * (1 - 2y / 2^z)))`, clamped to avoid poles-at-infinity.
pub fn tile_bbox(coord: &TileCoord) -> BoundingBox {
    let n = 2u32.pow(coord.z) as f64;

    let west = coord.x as f64 / n * 360.0 - 180.0;
    let east = (coord.x + 1) as f64 / n * 360.0 - 180.0;

    let north = (std::f64::consts::PI * (1.0 - 2.0 * coord.y as f64 / n))
        .sinh()
        .atan()
        .to_degrees()
        .clamp(-MAX_LAT, MAX_LAT);
    let south = (std::f64::consts::PI * (1.0 - 2.0 * (coord.y + 1) as f64 / n))
        .sinh()
        .atan()
        .to_degrees()
        .clamp(-MAX_LAT, MAX_LAT);

    BoundingBox::new(west, south, east, north)
}

/// Locate a geographic point as a tile plus intra-tile pixel offset.
///
/// The offsets are clamped to `[0, tile_size - 1]` so a point on the shared
/// edge of two tiles always resolves to a real pixel of the returned tile.
pub fn lonlat_to_pixel(lon: f64, lat: f64, zoom: u32, tile_size: u32) -> TilePixel {
    let tile = latlon_to_tile(lat, lon, zoom);
    let bbox = tile_bbox(&tile);

    let x_frac = ((lon - bbox.west) / bbox.width()).clamp(0.0, 1.0);
    // Row 0 is the top of the tile; latitude decreases with j.
    let y_frac = ((bbox.north - lat) / bbox.height()).clamp(0.0, 1.0);

    let max_px = (tile_size - 1) as f64;
    let i = (x_frac * tile_size as f64).floor().min(max_px) as u32;
    let j = (y_frac * tile_size as f64).floor().min(max_px) as u32;

    TilePixel { tile, i, j }
}

/// Pick a sensible sampling zoom for a polygon extent.
///
/// Larger extents sample coarser so the covering tile count stays sane.
/// A zero or degenerate span returns the finest configured zoom rather
/// than dividing by anything.
pub fn optimal_zoom_for_span(max_degree_span: f64) -> u32 {
    if !max_degree_span.is_finite() || max_degree_span <= 0.0 {
        return FINEST_SAMPLE_ZOOM;
    }
    if max_degree_span > 10.0 {
        5
    } else if max_degree_span > 5.0 {
        6
    } else if max_degree_span > 2.0 {
        7
    } else if max_degree_span > 1.0 {
        8
    } else if max_degree_span > 0.5 {
        9
    } else {
        FINEST_SAMPLE_ZOOM
    }
}

/// Enumerate the tiles covering a bounding box at the given zoom.
pub fn tiles_covering_bbox(bbox: &BoundingBox, zoom: u32) -> Vec<TileCoord> {
    let top_left = latlon_to_tile(bbox.north, bbox.west, zoom);
    let bottom_right = latlon_to_tile(bbox.south, bbox.east, zoom);

    let mut tiles = Vec::new();
    for y in top_left.y..=bottom_right.y {
        for x in top_left.x..=bottom_right.x {
            tiles.push(TileCoord { z: zoom, x, y });
        }
    }
    tiles
}
