//! Polygon geometry for zonal sampling.
//!
//! A small GeoJSON-compatible polygon type with the two operations the
//! sampler needs: bounding box and point-in-polygon.

use serde::{Deserialize, Serialize};

use crate::error::OceanError;
use crate::BoundingBox;

/// A polygon as GeoJSON linear rings: the first ring is the exterior,
/// any further rings are holes. Each ring is a closed list of [lon, lat].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub rings: Vec<Vec<[f64; 2]>>,
}

/// Wire shape of a GeoJSON Polygon geometry.
#[derive(Debug, Deserialize)]
struct GeoJsonGeometry {
    #[serde(rename = "type")]
    geometry_type: String,
    coordinates: Vec<Vec<[f64; 2]>>,
}

impl Polygon {
    pub fn new(rings: Vec<Vec<[f64; 2]>>) -> Self {
        Self { rings }
    }

    /// Parse a GeoJSON Polygon geometry object (not a Feature wrapper).
    pub fn from_geojson(value: &serde_json::Value) -> Result<Self, OceanError> {
        // Accept a Feature wrapper too; clients send both shapes.
        let geometry = value.get("geometry").unwrap_or(value);
        let parsed: GeoJsonGeometry = serde_json::from_value(geometry.clone())
            .map_err(|e| OceanError::Geometry(format!("invalid GeoJSON polygon: {}", e)))?;

        if !parsed.geometry_type.eq_ignore_ascii_case("polygon") {
            return Err(OceanError::Geometry(format!(
                "expected Polygon geometry, got {}",
                parsed.geometry_type
            )));
        }

        let polygon = Polygon::new(parsed.coordinates);
        polygon.validate()?;
        Ok(polygon)
    }

    /// Reject degenerate polygons before any upstream call is attempted.
    pub fn validate(&self) -> Result<(), OceanError> {
        let exterior = self
            .rings
            .first()
            .ok_or_else(|| OceanError::Geometry("polygon has no rings".into()))?;

        if exterior.len() < 4 {
            return Err(OceanError::Geometry(format!(
                "exterior ring has {} points, need at least 4",
                exterior.len()
            )));
        }

        for &[lon, lat] in self.rings.iter().flatten() {
            if !lon.is_finite() || !lat.is_finite() {
                return Err(OceanError::Geometry("non-finite coordinate".into()));
            }
            if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
                return Err(OceanError::Geometry(format!(
                    "coordinate out of range: [{}, {}]",
                    lon, lat
                )));
            }
        }

        if ring_area(exterior).abs() < f64::EPSILON {
            return Err(OceanError::Geometry("degenerate polygon: zero area".into()));
        }

        Ok(())
    }

    /// Axis-aligned bounding box of the exterior ring.
    pub fn bbox(&self) -> BoundingBox {
        let mut west = f64::INFINITY;
        let mut south = f64::INFINITY;
        let mut east = f64::NEG_INFINITY;
        let mut north = f64::NEG_INFINITY;

        for &[lon, lat] in self.rings.first().into_iter().flatten() {
            west = west.min(lon);
            east = east.max(lon);
            south = south.min(lat);
            north = north.max(lat);
        }

        BoundingBox::new(west, south, east, north)
    }

    /// Ray-casting point-in-polygon test; holes are honored.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        let Some(exterior) = self.rings.first() else {
            return false;
        };
        if !point_in_ring(exterior, lon, lat) {
            return false;
        }
        for hole in self.rings.iter().skip(1) {
            if point_in_ring(hole, lon, lat) {
                return false;
            }
        }
        true
    }
}

/// Signed area of a ring via the shoelace formula (degrees squared).
fn ring_area(ring: &[[f64; 2]]) -> f64 {
    let mut sum = 0.0;
    for pair in ring.windows(2) {
        let [x1, y1] = pair[0];
        let [x2, y2] = pair[1];
        sum += x1 * y2 - x2 * y1;
    }
    sum / 2.0
}

fn point_in_ring(ring: &[[f64; 2]], lon: f64, lat: f64) -> bool {
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut j = n - 1;
    for i in 0..n {
        let [xi, yi] = ring[i];
        let [xj, yj] = ring[j];
        if ((yi > lat) != (yj > lat))
            && (lon < (xj - xi) * (lat - yi) / (yj - yi) + xi)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square() -> Polygon {
        Polygon::new(vec![vec![
            [-75.0, 35.0],
            [-74.0, 35.0],
            [-74.0, 36.0],
            [-75.0, 36.0],
            [-75.0, 35.0],
        ]])
    }

    #[test]
    fn test_parse_geojson_polygon() {
        let value = json!({
            "type": "Polygon",
            "coordinates": [[[-75.0, 35.0], [-74.0, 35.0], [-74.0, 36.0], [-75.0, 36.0], [-75.0, 35.0]]]
        });
        let polygon = Polygon::from_geojson(&value).unwrap();
        assert_eq!(polygon.rings.len(), 1);
    }

    #[test]
    fn test_parse_geojson_feature_wrapper() {
        let value = json!({
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[-75.0, 35.0], [-74.0, 35.0], [-74.0, 36.0], [-75.0, 36.0], [-75.0, 35.0]]]
            }
        });
        assert!(Polygon::from_geojson(&value).is_ok());
    }

    #[test]
    fn test_rejects_non_polygon() {
        let value = json!({ "type": "Point", "coordinates": [0.0, 0.0] });
        assert!(Polygon::from_geojson(&value).is_err());
    }

    #[test]
    fn test_rejects_degenerate() {
        // All points on a line: zero area
        let line = Polygon::new(vec![vec![
            [-75.0, 35.0],
            [-74.0, 35.0],
            [-73.0, 35.0],
            [-75.0, 35.0],
        ]]);
        assert!(line.validate().is_err());

        let too_few = Polygon::new(vec![vec![[-75.0, 35.0], [-74.0, 35.0], [-75.0, 35.0]]]);
        assert!(too_few.validate().is_err());
    }

    #[test]
    fn test_bbox() {
        let bbox = square().bbox();
        assert_eq!(bbox.west, -75.0);
        assert_eq!(bbox.south, 35.0);
        assert_eq!(bbox.east, -74.0);
        assert_eq!(bbox.north, 36.0);
    }

    #[test]
    fn test_contains() {
        let poly = square();
        assert!(poly.contains(-74.5, 35.5));
        assert!(!poly.contains(-76.0, 35.5));
        assert!(!poly.contains(-74.5, 37.0));
    }

    #[test]
    fn test_contains_honors_holes() {
        let with_hole = Polygon::new(vec![
            vec![
                [-75.0, 35.0],
                [-74.0, 35.0],
                [-74.0, 36.0],
                [-75.0, 36.0],
                [-75.0, 35.0],
            ],
            vec![
                [-74.7, 35.3],
                [-74.3, 35.3],
                [-74.3, 35.7],
                [-74.7, 35.7],
                [-74.7, 35.3],
            ],
        ]);
        assert!(with_hole.contains(-74.9, 35.1));
        assert!(!with_hole.contains(-74.5, 35.5));
    }
}
