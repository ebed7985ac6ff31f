//! Environment-driven configuration.
//!
//! The layer table is built once at startup from environment variables and
//! never re-read. A missing upstream endpoint is fatal; there is nothing
//! useful this service can do without one. Defaults point at the Copernicus
//! Marine NRT products the service was built against.

use std::env;
use std::path::PathBuf;

use ocean_common::{
    AuthMode, AxisOrder, LayerId, LayerSpec, LayerTable, OceanError, OceanResult, UnitConversion,
    UpstreamProtocol,
};
use outlook::Thresholds;
use tracing::info;

const DEFAULT_SST_LAYER_PATH: &str =
    "SST_GLO_PHY_L4_NRT_010_043/cmems_obs-sst_glo_phy_l4_nrt_0.05deg_P1D-m/analysed_sst";
const DEFAULT_CHL_LAYER_PATH: &str =
    "OCEANCOLOUR_GLO_BGC_L4_NRT_009_102/cmems_obs-oc_glo_bgc-plankton_nrt_l4-gapfree-multi-4km_P1D/CHL";

/// Everything the service reads from the environment, resolved at startup.
#[derive(Debug)]
pub struct ServiceConfig {
    pub layers: LayerTable,
    pub thresholds: Thresholds,
    pub time_cache_ttl_secs: u64,
}

impl ServiceConfig {
    pub fn from_env() -> OceanResult<Self> {
        let endpoint = env::var("UPSTREAM_WMTS_ENDPOINT").map_err(|_| {
            OceanError::Config("UPSTREAM_WMTS_ENDPOINT must be set".to_string())
        })?;

        let auth = match (env::var("UPSTREAM_USERNAME"), env::var("UPSTREAM_PASSWORD")) {
            (Ok(user), Ok(pass)) => AuthMode::Basic { user, pass },
            (Err(_), Err(_)) => AuthMode::None,
            _ => {
                return Err(OceanError::Config(
                    "UPSTREAM_USERNAME and UPSTREAM_PASSWORD must be set together".to_string(),
                ))
            }
        };

        let sst = LayerSpec {
            id: LayerId::Sst,
            endpoint: endpoint.clone(),
            layer_path: env::var("SST_LAYER_PATH")
                .unwrap_or_else(|_| DEFAULT_SST_LAYER_PATH.to_string()),
            style: "cmap:thermal".to_string(),
            format: "image/png".to_string(),
            matrix_set: "EPSG:3857".to_string(),
            protocol: UpstreamProtocol::Wmts,
            axis_order: AxisOrder::LonLat,
            auth: auth.clone(),
            supports_elevation: false,
            default_elevation: None,
            conversion: UnitConversion::KelvinToFahrenheit,
            display_units: "°F".to_string(),
            // Physically plausible ocean temperatures: -2..40 °C in Kelvin
            valid_range: (271.15, 313.15),
            nodata_values: vec![-32768.0, -9999.0],
        };

        let chl = LayerSpec {
            id: LayerId::Chl,
            endpoint,
            layer_path: env::var("CHL_LAYER_PATH")
                .unwrap_or_else(|_| DEFAULT_CHL_LAYER_PATH.to_string()),
            style: "cmap:algae".to_string(),
            format: "image/png".to_string(),
            matrix_set: "EPSG:3857".to_string(),
            protocol: UpstreamProtocol::Wmts,
            axis_order: AxisOrder::LonLat,
            auth,
            supports_elevation: true,
            default_elevation: Some(-0.494_025),
            conversion: UnitConversion::None,
            display_units: "mg/m³".to_string(),
            valid_range: (0.001, 100.0),
            nodata_values: vec![-32768.0, -9999.0, 255.0],
        };

        let thresholds = match env::var("OUTLOOK_THRESHOLDS_PATH") {
            Ok(path) => {
                let path = PathBuf::from(path);
                info!(path = %path.display(), "loading outlook thresholds");
                Thresholds::from_yaml_file(&path)?
            }
            Err(_) => Thresholds::default(),
        };

        let time_cache_ttl_secs = env::var("TIME_CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300);

        Ok(Self {
            layers: LayerTable::new(vec![sst, chl]),
            thresholds,
            time_cache_ttl_secs,
        })
    }
}
