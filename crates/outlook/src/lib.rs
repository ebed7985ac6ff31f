//! Threshold-based ocean condition classification.
//!
//! Pure functions from zonal statistics to categorical outlooks: front
//! strength from the SST spread, per-species likelihood bands from mean
//! SST windows with chlorophyll as a secondary modifier. The rules are
//! deliberately simple and explainable; every band can be traced to one
//! threshold comparison.
//!
//! `classify` is total: any combination of inputs, including missing
//! layers and pathological values, maps to exactly one assessment and
//! never panics.

pub mod thresholds;

use serde::Serialize;
use zonal_sampler::ZonalStats;

pub use thresholds::{TempWindow, Thresholds};

/// How sharp a temperature break the zone shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrontStrength {
    None,
    Moderate,
    Strong,
}

/// Likelihood band for a species. Ordered so promote/demote is comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outlook {
    Unlikely,
    Possible,
    Good,
}

impl Outlook {
    fn promote(self) -> Self {
        match self {
            Outlook::Unlikely => Outlook::Possible,
            _ => Outlook::Good,
        }
    }

    fn demote(self) -> Self {
        match self {
            Outlook::Good => Outlook::Possible,
            _ => Outlook::Unlikely,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Outlook::Unlikely => "unlikely",
            Outlook::Possible => "possible",
            Outlook::Good => "good",
        }
    }
}

/// Per-species likelihood bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpeciesBands {
    pub tuna: Outlook,
    pub mahi: Outlook,
    pub billfish: Outlook,
}

/// The classifier's answer for one zone.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConditionOutlook {
    /// No SST statistics; nothing can be said about the zone.
    InsufficientData,
    Assessed {
        front: FrontStrength,
        species: SpeciesBands,
        summary: String,
    },
}

/// Classify a zone from its sampled statistics.
///
/// SST drives everything; without it the answer is an explicit
/// `InsufficientData`, never a default "unlikely". Chlorophyll is optional
/// and only ever shifts a band by one step.
pub fn classify(
    sst: Option<&ZonalStats>,
    chl: Option<&ZonalStats>,
    thresholds: &Thresholds,
) -> ConditionOutlook {
    let Some(sst) = sst else {
        return ConditionOutlook::InsufficientData;
    };
    if sst.n_valid == 0 || !sst.mean.is_finite() {
        return ConditionOutlook::InsufficientData;
    }

    let gradient_c = gradient_celsius(sst);
    let front = if gradient_c >= thresholds.front_strong_c {
        FrontStrength::Strong
    } else if gradient_c >= thresholds.front_moderate_c {
        FrontStrength::Moderate
    } else {
        FrontStrength::None
    };

    let chl_mean = chl.filter(|s| s.n_valid > 0 && s.mean.is_finite()).map(|s| s.mean);
    let clear = chl_mean.is_some_and(|c| c <= thresholds.clear_chl_max);
    let green = chl_mean.is_some_and(|c| c >= thresholds.green_chl_min);

    let mean_f = sst.mean;
    let mut tuna = band_for(mean_f, &thresholds.tuna);
    let mut mahi = band_for(mean_f, &thresholds.mahi);
    let mut billfish = band_for(mean_f, &thresholds.billfish);

    // Clear blue water favors the sight-feeders; a single-band bump, only
    // out of "possible" so clarity alone never manufactures a bite.
    if clear {
        if mahi == Outlook::Possible {
            mahi = mahi.promote();
        }
        if billfish == Outlook::Possible {
            billfish = billfish.promote();
        }
    }
    if green {
        mahi = mahi.demote();
        billfish = billfish.demote();
        if tuna == Outlook::Good {
            tuna = tuna.demote();
        }
    }

    let species = SpeciesBands { tuna, mahi, billfish };
    let summary = summarize(front, gradient_c, &species, chl_mean, clear, green, sst);

    ConditionOutlook::Assessed { front, species, summary }
}

/// The SST spread in °C regardless of the display unit the stats carry.
/// Fahrenheit spreads divide by 9/5; Celsius and Kelvin spreads are equal.
fn gradient_celsius(sst: &ZonalStats) -> f64 {
    let g = sst.gradient;
    if !g.is_finite() {
        return 0.0;
    }
    if sst.units.contains('F') {
        g / 1.8
    } else {
        g
    }
}

fn band_for(mean_f: f64, window: &TempWindow) -> Outlook {
    // NaN fails every comparison, landing in Unlikely
    if mean_f >= window.good_min_f && mean_f <= window.good_max_f {
        Outlook::Good
    } else if mean_f >= window.possible_min_f && mean_f <= window.possible_max_f {
        Outlook::Possible
    } else {
        Outlook::Unlikely
    }
}

fn summarize(
    front: FrontStrength,
    gradient_c: f64,
    species: &SpeciesBands,
    chl_mean: Option<f64>,
    clear: bool,
    green: bool,
    sst: &ZonalStats,
) -> String {
    let front_text = match front {
        FrontStrength::Strong => format!("Strong temperature break ({:.1}°C spread)", gradient_c),
        FrontStrength::Moderate => {
            format!("Moderate temperature break ({:.1}°C spread)", gradient_c)
        }
        FrontStrength::None => "Uniform water temperature".to_string(),
    };

    let water_text = match chl_mean {
        Some(c) if clear => format!("clear water ({:.2} mg/m³)", c),
        Some(c) if green => format!("green water ({:.2} mg/m³)", c),
        Some(c) => format!("mixed water ({:.2} mg/m³)", c),
        None => "water clarity unknown".to_string(),
    };

    format!(
        "{}, mean {:.1}{}, {}. Tuna {}, mahi {}, billfish {}.",
        front_text,
        sst.mean,
        sst.units,
        water_text,
        species.tuna.as_str(),
        species.mahi.as_str(),
        species.billfish.as_str()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::Lcg;

    fn stats(mean: f64, gradient: f64, units: &str) -> ZonalStats {
        ZonalStats {
            mean,
            min: mean - gradient,
            max: mean + gradient,
            p10: mean - gradient / 2.0,
            p50: mean,
            p90: mean + gradient / 2.0,
            std_dev: gradient / 3.0,
            gradient,
            n_valid: 200,
            n_nodata: 56,
            units: units.to_string(),
        }
    }

    #[test]
    fn test_strong_front_good_tuna_scenario() {
        // 70°F mean with a 1.5°C spread (2.7°F) and clear 0.15 mg/m³ water
        let sst = stats(70.0, 2.7, "°F");
        let chl = stats(0.15, 0.05, "mg/m³");

        let ConditionOutlook::Assessed { front, species, summary } =
            classify(Some(&sst), Some(&chl), &Thresholds::default())
        else {
            panic!("expected an assessment");
        };

        assert_eq!(front, FrontStrength::Strong);
        assert_eq!(species.tuna, Outlook::Good);
        assert!(summary.contains("Strong"));
        assert!(summary.contains("tuna good"));
    }

    #[test]
    fn test_front_bands() {
        let t = Thresholds::default();
        // Spreads in °F: 0.5°C = 0.9, 0.8°C = 1.44, 1.3°C = 2.34
        let weak = classify(Some(&stats(70.0, 0.9, "°F")), None, &t);
        let moderate = classify(Some(&stats(70.0, 1.44, "°F")), None, &t);
        let strong = classify(Some(&stats(70.0, 2.34, "°F")), None, &t);

        assert!(matches!(weak, ConditionOutlook::Assessed { front: FrontStrength::None, .. }));
        assert!(matches!(
            moderate,
            ConditionOutlook::Assessed { front: FrontStrength::Moderate, .. }
        ));
        assert!(matches!(
            strong,
            ConditionOutlook::Assessed { front: FrontStrength::Strong, .. }
        ));
    }

    #[test]
    fn test_missing_sst_is_insufficient_not_unlikely() {
        let chl = stats(0.3, 0.1, "mg/m³");
        assert!(matches!(
            classify(None, Some(&chl), &Thresholds::default()),
            ConditionOutlook::InsufficientData
        ));
        assert!(matches!(
            classify(None, None, &Thresholds::default()),
            ConditionOutlook::InsufficientData
        ));
    }

    #[test]
    fn test_clear_water_promotes_possible_mahi_one_band() {
        // 72°F: mahi possible (70-90), good band starts at 74
        let sst = stats(72.0, 0.5, "°F");
        let clear = stats(0.10, 0.02, "mg/m³");
        let murky = stats(0.40, 0.02, "mg/m³");

        let ConditionOutlook::Assessed { species: with_clear, .. } =
            classify(Some(&sst), Some(&clear), &Thresholds::default())
        else {
            panic!()
        };
        let ConditionOutlook::Assessed { species: with_mixed, .. } =
            classify(Some(&sst), Some(&murky), &Thresholds::default())
        else {
            panic!()
        };

        assert_eq!(with_mixed.mahi, Outlook::Possible);
        assert_eq!(with_clear.mahi, Outlook::Good);
        // Clarity never lifts an out-of-window species from unlikely
        assert_eq!(with_mixed.billfish, Outlook::Unlikely);
        assert_eq!(with_clear.billfish, Outlook::Unlikely);
    }

    #[test]
    fn test_green_water_demotes_one_band() {
        // 80°F: mahi good, billfish good, tuna outside possible window
        let sst = stats(80.0, 0.5, "°F");
        let green = stats(1.2, 0.1, "mg/m³");

        let ConditionOutlook::Assessed { species, .. } =
            classify(Some(&sst), Some(&green), &Thresholds::default())
        else {
            panic!()
        };

        assert_eq!(species.mahi, Outlook::Possible);
        assert_eq!(species.billfish, Outlook::Possible);
        assert_eq!(species.tuna, Outlook::Unlikely);
    }

    #[test]
    fn test_modifier_never_skips_two_bands() {
        let t = Thresholds::default();
        for mean in [40.0, 60.0, 66.0, 70.0, 72.0, 75.0, 80.0, 85.0, 95.0] {
            let sst = stats(mean, 0.5, "°F");
            let base = classify(Some(&sst), None, &t);
            let clear = classify(Some(&sst), Some(&stats(0.05, 0.01, "mg/m³")), &t);
            let green = classify(Some(&sst), Some(&stats(2.0, 0.1, "mg/m³")), &t);

            let bands = |c: &ConditionOutlook| match c {
                ConditionOutlook::Assessed { species, .. } => *species,
                _ => panic!("expected assessment"),
            };
            let (b, c, g) = (bands(&base), bands(&clear), bands(&green));

            for (before, after) in [
                (b.tuna, c.tuna),
                (b.mahi, c.mahi),
                (b.billfish, c.billfish),
                (b.tuna, g.tuna),
                (b.mahi, g.mahi),
                (b.billfish, g.billfish),
            ] {
                let distance = (before as i32 - after as i32).abs();
                assert!(distance <= 1, "band moved {} steps at mean {}", distance, mean);
            }
        }
    }

    #[test]
    fn test_classify_is_total_over_generated_inputs() {
        let t = Thresholds::default();
        let mut rng = Lcg::new(20260830);

        for i in 0..10_000 {
            let mut sst = stats(
                rng.next_range(-100.0, 150.0),
                rng.next_range(-5.0, 20.0),
                if i % 2 == 0 { "°F" } else { "°C" },
            );
            // Sprinkle in pathological values
            match i % 7 {
                0 => sst.mean = f64::NAN,
                1 => sst.gradient = f64::INFINITY,
                2 => sst.n_valid = 0,
                _ => {}
            }
            let chl = if i % 3 == 0 {
                None
            } else {
                Some(stats(rng.next_range(-1.0, 50.0), 0.1, "mg/m³"))
            };

            // Must return exactly one assessment without panicking
            let outcome = classify(Some(&sst), chl.as_ref(), &t);
            if sst.n_valid == 0 || !sst.mean.is_finite() {
                assert!(matches!(outcome, ConditionOutlook::InsufficientData));
            } else {
                assert!(matches!(outcome, ConditionOutlook::Assessed { .. }));
            }
        }
    }

    #[test]
    fn test_summary_mentions_every_species() {
        let sst = stats(75.0, 1.0, "°F");
        let ConditionOutlook::Assessed { summary, .. } =
            classify(Some(&sst), None, &Thresholds::default())
        else {
            panic!()
        };
        assert!(summary.contains("tuna") || summary.contains("Tuna"));
        assert!(summary.contains("mahi"));
        assert!(summary.contains("billfish"));
    }
}
