//! Core types for the intersection simulation
//!
//! Identifiers, the simulated clock type, and the fixed constants the
//! event engine is built around.

use std::fmt;

/// Simulated time, in whole time units. Never tied to the wall clock.
pub type SimTime = i64;

/// A unique identifier for a lane in the network
/// This is a simple wrapper around the lane's index for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LaneId(pub usize);

/// A wrapper type for signal ring IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RingId(pub usize);

/// A single signal: a member position inside a ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignalId {
    pub ring: RingId,
    pub position: usize,
}

impl SignalId {
    pub fn new(ring: RingId, position: usize) -> Self {
        Self { ring, position }
    }
}

impl fmt::Display for LaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lane#{}", self.0)
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ring#{}[{}]", self.ring.0, self.position)
    }
}

/// Direction a vehicle takes when it leaves a lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Turn {
    Left,
    Straight,
    Right,
}

/// Delay before a failed creation or advance is attempted again
pub const RETRY_DELAY: SimTime = 5;

/// Smallest vehicle footprint
pub const VEHICLE_BASE_SIZE: u32 = 5;

/// Spread added on top of the base footprint (uniform, floored)
pub const VEHICLE_SIZE_VARIATION: u32 = 4;

/// Unit conversion applied to occupied-length / velocity in travel time
pub const TRAVEL_TIME_UNIT: f64 = 3.6;
