//! Lanes: capacity-bounded FIFO queues of vehicles.
//!
//! A lane is a source (creates vehicles), a through lane, or an exit
//! (vehicles popped from it leave the system). The role is fixed when the
//! lane is built. Two invariants hold after every operation:
//!
//! - `capacity_remaining + sum(queued sizes) == capacity`
//! - `entered - left == queue length`

use std::collections::VecDeque;

use super::counters::SimulationCounters;
use super::error::LaneError;
use super::rng::SimRng;
use super::types::{LaneId, SignalId, SimTime, Turn, TRAVEL_TIME_UNIT};
use super::vehicle::Vehicle;

/// Interarrival law of a source: `fixed + floor(variable * U)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrivalLaw {
    pub fixed: SimTime,
    pub variable: SimTime,
}

impl ArrivalLaw {
    pub fn new(fixed: SimTime, variable: SimTime) -> Self {
        Self { fixed, variable }
    }

    /// Arrivals spread evenly over `mean - spread .. mean + spread`
    pub fn around_mean(mean: SimTime, spread: SimTime) -> Self {
        Self::new(mean - spread, 2 * spread)
    }

    pub fn next_arrival(&self, now: SimTime, rng: &mut SimRng) -> SimTime {
        now + self.fixed + rng.scaled(self.variable)
    }
}

/// Where a source or through lane sends its vehicles
#[derive(Debug, Clone, PartialEq)]
pub struct Routing {
    /// Signal that must be open for the lane to release a vehicle
    pub signal: SignalId,
    pub left: LaneId,
    pub straight: LaneId,
    pub right: LaneId,
    pub prob_left: f64,
    pub prob_right: f64,
}

impl Routing {
    /// Pick a turn for a uniform draw `r` in `[0, 1)`
    ///
    /// `[0, prob_left)` turns left, `[1 - prob_right, 1)` turns right and
    /// the mass in between goes straight.
    pub fn choose(&self, r: f64) -> (Turn, LaneId) {
        if r < self.prob_left {
            (Turn::Left, self.left)
        } else if r >= 1.0 - self.prob_right {
            (Turn::Right, self.right)
        } else {
            (Turn::Straight, self.straight)
        }
    }

    pub fn destinations(&self) -> [(Turn, LaneId); 3] {
        [
            (Turn::Left, self.left),
            (Turn::Straight, self.straight),
            (Turn::Right, self.right),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LaneKind {
    Source { arrivals: ArrivalLaw, routing: Routing },
    Through { routing: Routing },
    Exit,
}

impl LaneKind {
    pub fn label(&self) -> &'static str {
        match self {
            LaneKind::Source { .. } => "source",
            LaneKind::Through { .. } => "through",
            LaneKind::Exit => "exit",
        }
    }
}

/// A lane in the intersection network
#[derive(Debug, Clone)]
pub struct Lane {
    id: LaneId,
    name: String,
    kind: LaneKind,
    capacity: u32,
    capacity_remaining: u32,
    velocity: u32,
    queue: VecDeque<Vehicle>,
    entered: u64,
    left: u64,
}

impl Lane {
    pub fn new(id: LaneId, name: impl Into<String>, kind: LaneKind, capacity: u32, velocity: u32) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            capacity,
            capacity_remaining: capacity,
            velocity,
            queue: VecDeque::new(),
            entered: 0,
            left: 0,
        }
    }

    pub fn id(&self) -> LaneId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &LaneKind {
        &self.kind
    }

    pub fn is_exit(&self) -> bool {
        matches!(self.kind, LaneKind::Exit)
    }

    pub fn is_source(&self) -> bool {
        matches!(self.kind, LaneKind::Source { .. })
    }

    /// Routing of a source or through lane; `None` for exits
    pub fn routing(&self) -> Option<&Routing> {
        match &self.kind {
            LaneKind::Source { routing, .. } | LaneKind::Through { routing } => Some(routing),
            LaneKind::Exit => None,
        }
    }

    pub fn arrivals(&self) -> Option<&ArrivalLaw> {
        match &self.kind {
            LaneKind::Source { arrivals, .. } => Some(arrivals),
            _ => None,
        }
    }

    /// Time of the next creation at a source; `None` for other lanes
    pub fn next_interarrival(&self, now: SimTime, rng: &mut SimRng) -> Option<SimTime> {
        self.arrivals().map(|law| law.next_arrival(now, rng))
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn capacity_remaining(&self) -> u32 {
        self.capacity_remaining
    }

    pub fn velocity(&self) -> u32 {
        self.velocity
    }

    /// Length currently taken by queued vehicles
    pub fn occupied(&self) -> u32 {
        self.capacity - self.capacity_remaining
    }

    pub fn fits(&self, vehicle: &Vehicle) -> bool {
        vehicle.size() <= self.capacity_remaining
    }

    pub fn front(&self) -> Option<&Vehicle> {
        self.queue.front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Enqueue a vehicle at the back of the lane
    ///
    /// Nothing changes when the vehicle does not fit.
    pub fn add(&mut self, vehicle: Vehicle, counters: &mut SimulationCounters) -> Result<(), LaneError> {
        if !self.fits(&vehicle) {
            return Err(LaneError::CapacityExceeded {
                lane: self.id,
                size: vehicle.size(),
                remaining: self.capacity_remaining,
            });
        }

        self.capacity_remaining -= vehicle.size();
        self.entered += 1;
        counters.record_entry();
        self.queue.push_back(vehicle);
        Ok(())
    }

    /// Dequeue the vehicle at the front of the lane
    pub fn pop(&mut self, counters: &mut SimulationCounters) -> Result<Vehicle, LaneError> {
        let vehicle = self
            .queue
            .pop_front()
            .ok_or(LaneError::Empty { lane: self.id })?;

        self.capacity_remaining += vehicle.size();
        self.left += 1;
        counters.record_exit();
        Ok(vehicle)
    }

    /// Time to traverse the lane in its current state
    ///
    /// Occupied length over velocity in integer arithmetic, then divided by
    /// the unit constant and truncated. Light traffic on a fast lane gives 0,
    /// which the engine treats as instant transit.
    pub fn travel_time(&self) -> SimTime {
        let per_velocity = self.occupied() / self.velocity.max(1);
        (per_velocity as f64 / TRAVEL_TIME_UNIT) as SimTime
    }

    /// Number of vehicles that ever entered this lane
    pub fn entered(&self) -> u64 {
        self.entered
    }

    /// Number of vehicles that ever left this lane
    pub fn left(&self) -> u64 {
        self.left
    }

    /// Number of vehicles currently in this lane
    pub fn are_in(&self) -> u64 {
        self.entered - self.left
    }
}
