//! Aggregate statistics over a set of sampled raster values.
//!
//! All aggregation runs in the provider's native units; the layer's unit
//! conversion is applied exactly once, here, when the final stats are
//! assembled. Location-type aggregates (mean, percentiles, extremes) get
//! the full affine conversion; spread-type aggregates (stddev, gradient)
//! only get its scale factor, since spreads are offset-invariant.

use ocean_common::UnitConversion;
use serde::Serialize;

/// Zonal statistics in display units.
#[derive(Debug, Clone, Serialize)]
pub struct ZonalStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
    pub std_dev: f64,
    /// Robust spread, p90 - p10. High values over a small area indicate a
    /// front passing through the zone.
    pub gradient: f64,
    pub n_valid: usize,
    pub n_nodata: usize,
    pub units: String,
}

impl ZonalStats {
    /// Aggregate raw samples. Returns `None` when no valid samples exist;
    /// statistics over an empty set are meaningless, not zero.
    pub fn from_samples(
        valid: &[f64],
        n_nodata: usize,
        conversion: UnitConversion,
        units: &str,
    ) -> Option<Self> {
        if valid.is_empty() {
            return None;
        }

        let mut sorted = valid.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        let p10 = nearest_rank(&sorted, 10.0);
        let p50 = nearest_rank(&sorted, 50.0);
        let p90 = nearest_rank(&sorted, 90.0);

        Some(Self {
            mean: conversion.apply(mean),
            min: conversion.apply(sorted[0]),
            max: conversion.apply(sorted[sorted.len() - 1]),
            p10: conversion.apply(p10),
            p50: conversion.apply(p50),
            p90: conversion.apply(p90),
            std_dev: variance.sqrt() * conversion.scale(),
            gradient: (p90 - p10) * conversion.scale(),
            n_valid: valid.len(),
            n_nodata,
            units: units.to_string(),
        })
    }
}

/// Nearest-rank percentile on a pre-sorted slice.
fn nearest_rank(sorted: &[f64], percentile: f64) -> f64 {
    let n = sorted.len();
    let rank = ((percentile / 100.0) * n as f64).ceil() as usize;
    sorted[rank.clamp(1, n) - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_samples_yield_none() {
        assert!(ZonalStats::from_samples(&[], 5, UnitConversion::None, "°F").is_none());
    }

    #[test]
    fn test_single_sample() {
        let stats = ZonalStats::from_samples(&[293.15], 0, UnitConversion::None, "K").unwrap();
        assert_eq!(stats.mean, 293.15);
        assert_eq!(stats.min, 293.15);
        assert_eq!(stats.max, 293.15);
        assert_eq!(stats.p50, 293.15);
        assert_eq!(stats.gradient, 0.0);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.n_valid, 1);
    }

    #[test]
    fn test_percentile_ordering() {
        let samples: Vec<f64> = (1..=100).map(|i| i as f64).collect();
        let stats = ZonalStats::from_samples(&samples, 0, UnitConversion::None, "x").unwrap();

        assert_eq!(stats.p10, 10.0);
        assert_eq!(stats.p50, 50.0);
        assert_eq!(stats.p90, 90.0);
        assert!(stats.min <= stats.p10);
        assert!(stats.p10 <= stats.p50);
        assert!(stats.p50 <= stats.p90);
        assert!(stats.p90 <= stats.max);
        assert!(stats.p10 <= stats.mean && stats.mean <= stats.p90);
        assert_eq!(stats.gradient, 80.0);
    }

    #[test]
    fn test_kelvin_to_fahrenheit_applied_once() {
        // 283.15 K = 50 °F, 293.15 K = 68 °F
        let stats = ZonalStats::from_samples(
            &[283.15, 293.15],
            0,
            UnitConversion::KelvinToFahrenheit,
            "°F",
        )
        .unwrap();

        assert!((stats.min - 50.0).abs() < 1e-9);
        assert!((stats.max - 68.0).abs() < 1e-9);
        assert!((stats.mean - 59.0).abs() < 1e-9);
        // Spread converts by scale only: 10 K spread = 18 °F, not 18 + 32
        assert!((stats.gradient - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_gradient_is_robust_to_outliers() {
        // One wild sample should barely move p90 - p10
        let mut samples: Vec<f64> = (0..99).map(|i| 290.0 + (i as f64) * 0.01).collect();
        samples.push(400.0);
        let stats = ZonalStats::from_samples(&samples, 0, UnitConversion::None, "K").unwrap();

        assert!(stats.gradient < 1.0, "gradient {} not robust", stats.gradient);
        assert!(stats.max == 400.0);
    }

    #[test]
    fn test_nodata_count_carried_through() {
        let stats =
            ZonalStats::from_samples(&[1.0, 2.0], 14, UnitConversion::None, "mg/m³").unwrap();
        assert_eq!(stats.n_valid, 2);
        assert_eq!(stats.n_nodata, 14);
    }
}
