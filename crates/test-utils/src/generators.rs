//! Deterministic generators for synthetic ocean sample data.
//!
//! The generators create predictable, verifiable value sets resembling
//! real sea-surface temperature and chlorophyll samples, without pulling a
//! random-number crate into the workspace.

/// A small linear congruential generator (Numerical Recipes constants).
///
/// Not a statistical PRNG; exists so property-style tests get varied,
/// reproducible inputs from a printable seed.
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    /// Uniform in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in [lo, hi).
    pub fn next_range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_f64() * (hi - lo)
    }

    /// Uniform integer in [0, n).
    pub fn next_below(&mut self, n: u64) -> u64 {
        self.next_u64() % n.max(1)
    }
}

/// Synthetic SST samples in Kelvin: a base temperature plus noise, with a
/// warm band at the end simulating a front edge crossing the zone.
pub fn sst_samples_with_front(seed: u64, n: usize, base_kelvin: f64, front_jump: f64) -> Vec<f64> {
    let mut rng = Lcg::new(seed);
    (0..n)
        .map(|i| {
            let noise = rng.next_range(-0.2, 0.2);
            if i >= n * 3 / 4 {
                base_kelvin + front_jump + noise
            } else {
                base_kelvin + noise
            }
        })
        .collect()
}

/// Uniform SST samples in Kelvin with small noise, no front.
pub fn sst_samples_uniform(seed: u64, n: usize, base_kelvin: f64) -> Vec<f64> {
    let mut rng = Lcg::new(seed);
    (0..n).map(|_| base_kelvin + rng.next_range(-0.1, 0.1)).collect()
}

/// Synthetic chlorophyll samples in mg/m³, log-uniform over the plausible
/// open-ocean range.
pub fn chl_samples(seed: u64, n: usize) -> Vec<f64> {
    let mut rng = Lcg::new(seed);
    (0..n)
        .map(|_| 10f64.powf(rng.next_range(-2.0, 1.0)))
        .collect()
}
