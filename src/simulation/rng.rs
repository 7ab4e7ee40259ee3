//! Random source shared by every event of a run.
//!
//! A run is either seeded (reproducible: same seed, same configuration,
//! same horizon gives the same event trace) or draws from the thread RNG.

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use super::types::SimTime;

#[derive(Debug, Default)]
pub struct SimRng {
    /// Optional seeded RNG for reproducible simulations
    seeded: Option<StdRng>,
}

impl SimRng {
    /// Unseeded: every draw comes from `rand::rng()`
    pub fn from_entropy() -> Self {
        Self { seeded: None }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            seeded: Some(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded.is_some()
    }

    /// Uniform draw in `[0, 1)`
    pub fn unit(&mut self) -> f64 {
        match &mut self.seeded {
            Some(rng) => rng.random::<f64>(),
            None => rand::rng().random::<f64>(),
        }
    }

    /// `floor(span * U)` for `U` in `[0, 1)`; zero span never advances the stream
    pub fn scaled(&mut self, span: SimTime) -> SimTime {
        if span <= 0 {
            return 0;
        }
        (span as f64 * self.unit()) as SimTime
    }
}
