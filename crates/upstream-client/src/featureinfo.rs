//! GetFeatureInfo response parsing.
//!
//! Providers disagree on the JSON shape for point queries. The two shapes
//! seen in practice are a flat `{"value": 293.4}` object and a GeoJSON-like
//! `{"features": [{"properties": {...}}]}` envelope where the value hides
//! under a provider-chosen property name. Both are handled; anything else
//! is an upstream error, not a silent None.

use ocean_common::{OceanError, OceanResult};
use serde_json::Value;

/// Property names tried, in order, when extracting a value from a GeoJSON
/// feature's properties.
const VALUE_KEYS: &[&str] = &["value", "analysed_sst", "CHL", "chl", "GRAY_INDEX"];

/// Extract the sampled value from a GetFeatureInfo JSON body.
///
/// Returns `Ok(None)` when the response is well formed but carries no value
/// (empty feature list, null value). Nodata sentinel filtering happens in
/// the caller against the layer's spec; this function only parses.
pub fn parse_point_value(body: &[u8]) -> OceanResult<Option<f64>> {
    let json: Value = serde_json::from_slice(body).map_err(|e| OceanError::Upstream {
        status: None,
        message: format!("unparseable feature info response: {}", e),
    })?;

    // Flat shape: {"value": 293.4}
    if let Some(v) = json.get("value") {
        return Ok(as_number(v));
    }

    // GeoJSON shape: {"features": [{"properties": {...}}]}
    if let Some(features) = json.get("features").and_then(Value::as_array) {
        let properties = match features.first().and_then(|f| f.get("properties")) {
            Some(p) => p,
            None => return Ok(None),
        };

        for key in VALUE_KEYS {
            if let Some(v) = properties.get(*key) {
                if let Some(n) = as_number(v) {
                    return Ok(Some(n));
                }
            }
        }

        // Fall back to the first numeric property of any name
        if let Some(map) = properties.as_object() {
            for v in map.values() {
                if let Some(n) = as_number(v) {
                    return Ok(Some(n));
                }
            }
        }

        return Ok(None);
    }

    Err(OceanError::Upstream {
        status: None,
        message: "feature info response in unrecognized shape".to_string(),
    })
}

/// Numbers may arrive as JSON numbers or as numeric strings.
fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}
