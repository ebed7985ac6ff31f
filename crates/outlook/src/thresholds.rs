//! Classification thresholds.
//!
//! Every number the classifier compares against lives here, loadable from
//! a YAML file so bands can be retuned without touching classification
//! logic. The defaults are the shipped tuning.

use std::path::Path;

use ocean_common::{OceanError, OceanResult};
use serde::{Deserialize, Serialize};

/// A species' preferred SST window in °F: a good band inside a wider
/// possible band.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TempWindow {
    pub good_min_f: f64,
    pub good_max_f: f64,
    pub possible_min_f: f64,
    pub possible_max_f: f64,
}

impl TempWindow {
    pub fn new(good_min_f: f64, good_max_f: f64, possible_min_f: f64, possible_max_f: f64) -> Self {
        Self {
            good_min_f,
            good_max_f,
            possible_min_f,
            possible_max_f,
        }
    }
}

/// All classifier tuning in one place.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Temperature spread (°C) at or above which a front reads "moderate"
    pub front_moderate_c: f64,
    /// Temperature spread (°C) at or above which a front reads "strong"
    pub front_strong_c: f64,
    /// Chlorophyll (mg/m³) at or below which water counts as clear
    pub clear_chl_max: f64,
    /// Chlorophyll (mg/m³) at or above which water counts as green
    pub green_chl_min: f64,
    pub tuna: TempWindow,
    pub mahi: TempWindow,
    pub billfish: TempWindow,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            front_moderate_c: 0.6,
            front_strong_c: 1.2,
            clear_chl_max: 0.20,
            green_chl_min: 0.80,
            tuna: TempWindow::new(68.0, 76.0, 64.0, 80.0),
            mahi: TempWindow::new(74.0, 86.0, 70.0, 90.0),
            billfish: TempWindow::new(78.0, 86.0, 74.0, 90.0),
        }
    }
}

impl Thresholds {
    /// Load thresholds from a YAML file. Unspecified fields keep their
    /// defaults, so a tuning file only needs the values it changes.
    pub fn from_yaml_file(path: &Path) -> OceanResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            OceanError::Config(format!("cannot read thresholds file {}: {}", path.display(), e))
        })?;
        serde_yaml::from_str(&raw).map_err(|e| {
            OceanError::Config(format!("invalid thresholds file {}: {}", path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_ordered() {
        let t = Thresholds::default();
        assert!(t.front_moderate_c < t.front_strong_c);
        assert!(t.clear_chl_max < t.green_chl_min);
        for w in [t.tuna, t.mahi, t.billfish] {
            assert!(w.possible_min_f <= w.good_min_f);
            assert!(w.good_min_f < w.good_max_f);
            assert!(w.good_max_f <= w.possible_max_f);
        }
    }

    #[test]
    fn test_partial_yaml_overrides_defaults() {
        let t: Thresholds = serde_yaml::from_str("front_strong_c: 1.5\n").unwrap();
        assert_eq!(t.front_strong_c, 1.5);
        assert_eq!(t.front_moderate_c, 0.6);
        assert_eq!(t.tuna.good_min_f, 68.0);
    }

    #[test]
    fn test_round_trips_through_yaml() {
        let t = Thresholds::default();
        let yaml = serde_yaml::to_string(&t).unwrap();
        let back: Thresholds = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.front_strong_c, t.front_strong_c);
        assert_eq!(back.billfish.possible_max_f, t.billfish.possible_max_f);
    }
}
