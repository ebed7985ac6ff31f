//! Geographic bounding box type and operations.

use serde::{Deserialize, Serialize};

use crate::error::OceanError;

/// A WGS84 bounding box in degrees.
///
/// Invariant: `west < east` and `south < north`. Constructors that accept
/// untrusted input go through [`BoundingBox::validated`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Create a bounding box, rejecting degenerate or inverted extents.
    pub fn validated(west: f64, south: f64, east: f64, north: f64) -> Result<Self, OceanError> {
        if !west.is_finite() || !south.is_finite() || !east.is_finite() || !north.is_finite() {
            return Err(OceanError::Geometry("bbox contains non-finite values".into()));
        }
        if west >= east || south >= north {
            return Err(OceanError::Geometry(format!(
                "inverted bbox: [{}, {}, {}, {}]",
                west, south, east, north
            )));
        }
        if south < -90.0 || north > 90.0 {
            return Err(OceanError::Geometry(format!(
                "latitude out of range: [{}, {}]",
                south, north
            )));
        }
        Ok(Self::new(west, south, east, north))
    }

    /// Width in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Height in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// The larger of the two degree spans. Drives probe zoom selection.
    pub fn max_degree_span(&self) -> f64 {
        self.width().max(self.height())
    }

    /// Center point as (lon, lat).
    pub fn center(&self) -> (f64, f64) {
        (
            (self.west + self.east) / 2.0,
            (self.south + self.north) / 2.0,
        )
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, lon: f64, lat: f64) -> bool {
        lon >= self.west && lon <= self.east && lat >= self.south && lat <= self.north
    }

    /// Check if this bbox intersects another.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.west < other.east
            && self.east > other.west
            && self.south < other.north
            && self.north > other.south
    }

    /// Serialize in the provider's declared axis order: "a,b,c,d".
    ///
    /// `CRS:84`-style providers expect lon/lat (west,south,east,north); some
    /// WMS 1.3.0 providers expect lat/lon. Getting this wrong silently
    /// mirrors the rendered image, so the order comes from the LayerSpec.
    pub fn to_axis_ordered_string(&self, lat_first: bool) -> String {
        if lat_first {
            format!("{},{},{},{}", self.south, self.west, self.north, self.east)
        } else {
            format!("{},{},{},{}", self.west, self.south, self.east, self.north)
        }
    }
}
