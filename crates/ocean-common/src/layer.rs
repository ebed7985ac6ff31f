//! Layer specifications for upstream ocean-data providers.
//!
//! A `LayerSpec` is static configuration: which upstream product backs a
//! layer, how to authenticate, and how to interpret the values it returns.
//! The full set is built once at startup into an immutable [`LayerTable`]
//! and injected by reference everywhere downstream; nothing re-reads the
//! environment per request.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::OceanError;

/// The layers this service exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerId {
    /// Sea-surface temperature
    Sst,
    /// Chlorophyll-a concentration
    Chl,
}

impl LayerId {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerId::Sst => "sst",
            LayerId::Chl => "chl",
        }
    }

    pub fn all() -> &'static [LayerId] {
        &[LayerId::Sst, LayerId::Chl]
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LayerId {
    type Err = OceanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sst" => Ok(LayerId::Sst),
            "chl" => Ok(LayerId::Chl),
            other => Err(OceanError::LayerNotFound(other.to_string())),
        }
    }
}

/// How requests to the upstream are authenticated.
///
/// Credentials are read once at startup and must never appear in logs;
/// `Debug` is intentionally redacted.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMode {
    None,
    Basic { user: String, pass: String },
    Bearer { token: String },
}

impl std::fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMode::None => write!(f, "None"),
            AuthMode::Basic { .. } => write!(f, "Basic(<redacted>)"),
            AuthMode::Bearer { .. } => write!(f, "Bearer(<redacted>)"),
        }
    }
}

/// Which request shape the upstream speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamProtocol {
    /// WMTS GetTile by tile index
    Wmts,
    /// WMS GetMap by bounding box
    Wms,
}

/// Axis order the provider expects for bbox parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisOrder {
    /// lon/lat (CRS:84 convention)
    #[default]
    LonLat,
    /// lat/lon (some WMS 1.3.0 providers)
    LatLon,
}

/// Unit conversion applied once at the aggregation boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitConversion {
    /// Kelvin to Fahrenheit: F = (K - 273.15) * 9/5 + 32
    KelvinToFahrenheit,
    /// Kelvin to Celsius: C = K - 273.15
    KelvinToCelsius,
    /// No conversion needed
    None,
}

impl UnitConversion {
    /// Apply the conversion to a single value.
    pub fn apply(&self, value: f64) -> f64 {
        match self {
            Self::KelvinToFahrenheit => (value - 273.15) * 9.0 / 5.0 + 32.0,
            Self::KelvinToCelsius => value - 273.15,
            Self::None => value,
        }
    }

    /// The linear scale factor of the conversion, used for spread-type
    /// quantities (stddev, gradient) that are invariant to the offset.
    pub fn scale(&self) -> f64 {
        match self {
            Self::KelvinToFahrenheit => 9.0 / 5.0,
            Self::KelvinToCelsius | Self::None => 1.0,
        }
    }
}

/// Static configuration for one upstream layer.
#[derive(Debug, Clone)]
pub struct LayerSpec {
    pub id: LayerId,
    /// Upstream service endpoint (e.g. the WMTS base URL)
    pub endpoint: String,
    /// Full upstream layer path (e.g. "SST_GLO_PHY_L4_NRT_010_043/.../analysed_sst")
    pub layer_path: String,
    /// Style name passed to the provider
    pub style: String,
    /// Image format for tile requests
    pub format: String,
    /// Tile matrix set identifier
    pub matrix_set: String,
    pub protocol: UpstreamProtocol,
    pub axis_order: AxisOrder,
    pub auth: AuthMode,
    /// Some products require an elevation dimension on every request
    pub supports_elevation: bool,
    pub default_elevation: Option<f64>,
    /// Conversion from the provider's native unit to display units
    pub conversion: UnitConversion,
    /// Display units after conversion ("°F", "mg/m³")
    pub display_units: String,
    /// Physically plausible value range in native units; outside is nodata
    pub valid_range: (f64, f64),
    /// Sentinel values the provider uses for missing data
    pub nodata_values: Vec<f64>,
}

impl LayerSpec {
    /// Whether a raw value from the provider is usable.
    pub fn is_valid_value(&self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        if self.nodata_values.iter().any(|&nd| (value - nd).abs() < 1e-9) {
            return false;
        }
        value >= self.valid_range.0 && value <= self.valid_range.1
    }
}

/// The immutable per-process table of configured layers.
#[derive(Debug, Clone, Default)]
pub struct LayerTable {
    layers: HashMap<LayerId, LayerSpec>,
}

impl LayerTable {
    pub fn new(specs: Vec<LayerSpec>) -> Self {
        Self {
            layers: specs.into_iter().map(|s| (s.id, s)).collect(),
        }
    }

    pub fn get(&self, id: LayerId) -> Result<&LayerSpec, OceanError> {
        self.layers
            .get(&id)
            .ok_or_else(|| OceanError::LayerNotFound(id.to_string()))
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.layers.contains_key(&id)
    }

    pub fn ids(&self) -> Vec<LayerId> {
        let mut ids: Vec<_> = self.layers.keys().copied().collect();
        ids.sort_by_key(|id| id.as_str());
        ids
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sst_spec() -> LayerSpec {
        LayerSpec {
            id: LayerId::Sst,
            endpoint: "https://upstream.example/wmts".to_string(),
            layer_path: "SST/analysed_sst".to_string(),
            style: "default".to_string(),
            format: "image/png".to_string(),
            matrix_set: "EPSG:3857".to_string(),
            protocol: UpstreamProtocol::Wmts,
            axis_order: AxisOrder::LonLat,
            auth: AuthMode::None,
            supports_elevation: false,
            default_elevation: None,
            conversion: UnitConversion::KelvinToFahrenheit,
            display_units: "°F".to_string(),
            valid_range: (271.15, 313.15),
            nodata_values: vec![-32768.0, -9999.0],
        }
    }

    #[test]
    fn test_layer_id_parse() {
        assert_eq!("sst".parse::<LayerId>().unwrap(), LayerId::Sst);
        assert_eq!("CHL".parse::<LayerId>().unwrap(), LayerId::Chl);
        assert!("wind".parse::<LayerId>().is_err());
    }

    #[test]
    fn test_unit_conversion() {
        let conv = UnitConversion::KelvinToFahrenheit;
        assert!((conv.apply(273.15) - 32.0).abs() < 1e-9);
        assert!((conv.apply(293.15) - 68.0).abs() < 1e-9);
        assert!((conv.scale() - 1.8).abs() < 1e-9);
        assert_eq!(UnitConversion::None.apply(0.25), 0.25);
    }

    #[test]
    fn test_valid_value_filtering() {
        let spec = sst_spec();
        assert!(spec.is_valid_value(290.0));
        assert!(!spec.is_valid_value(-9999.0));
        assert!(!spec.is_valid_value(500.0));
        assert!(!spec.is_valid_value(f64::NAN));
    }

    #[test]
    fn test_auth_debug_is_redacted() {
        let auth = AuthMode::Basic {
            user: "alice".to_string(),
            pass: "hunter2".to_string(),
        };
        let debug = format!("{:?}", auth);
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("alice"));
    }

    #[test]
    fn test_layer_table_lookup() {
        let table = LayerTable::new(vec![sst_spec()]);
        assert!(table.get(LayerId::Sst).is_ok());
        assert!(table.get(LayerId::Chl).is_err());
        assert_eq!(table.ids(), vec![LayerId::Sst]);
    }
}
