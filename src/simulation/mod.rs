//! Discrete-event intersection simulation
//!
//! This module contains the event engine and the state it mutates: lanes,
//! signal rings, run counters and the time-ordered event queue. Time only
//! moves when the driver pops the next event.

mod config;
mod counters;
mod error;
mod event;
mod event_queue;
mod lane;
mod network;
mod rng;
mod signal;
mod types;
mod vehicle;
mod world;

pub use config::{
    LaneConfig, LaneRole, NetworkConfig, RingConfig, RoutesConfig, RunParameters, SignalConfig,
};
pub use counters::SimulationCounters;
pub use error::{ConfigError, LaneError, SimError};
pub use event::{Event, EventContext, EventKind};
pub use event_queue::EventQueue;
pub use lane::{ArrivalLaw, Lane, LaneKind, Routing};
pub use network::{OverflowPolicy, RouteOutcome, SimLaneNetwork};
pub use rng::SimRng;
pub use signal::{SignalRing, SignalRings};
pub use types::{
    LaneId, RingId, SignalId, SimTime, Turn, RETRY_DELAY, TRAVEL_TIME_UNIT, VEHICLE_BASE_SIZE,
    VEHICLE_SIZE_VARIATION,
};
pub use vehicle::Vehicle;
pub use world::{RunSummary, SimWorld, StopReason, TraceEntry};
