//! Vehicles: occupancy units moved between lanes by events.

use super::rng::SimRng;
use super::types::{VEHICLE_BASE_SIZE, VEHICLE_SIZE_VARIATION};

/// A vehicle in the simulation
///
/// Only its footprint matters to the engine. The size is fixed when the
/// vehicle is created; a vehicle is owned by exactly one lane queue at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vehicle {
    size: u32,
}

impl Vehicle {
    pub fn new(size: u32) -> Self {
        Self { size }
    }

    /// Base size plus a floored uniform share of the size variation
    pub fn random(rng: &mut SimRng) -> Self {
        let extra = (VEHICLE_SIZE_VARIATION as f64 * rng.unit()) as u32;
        Self::new(VEHICLE_BASE_SIZE + extra)
    }

    pub fn size(&self) -> u32 {
        self.size
    }
}
