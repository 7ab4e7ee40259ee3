//! Error types for the simulation engine.
//!
//! `LaneError` covers per-lane operations; the driver turns the recoverable
//! ones into retry events. `ConfigError` is setup-time only. `SimError` is
//! fatal: reaching it means an event contract was broken.

use thiserror::Error;

use super::types::{LaneId, SignalId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaneError {
    #[error("{lane} is full: vehicle of size {size} does not fit in {remaining} remaining")]
    CapacityExceeded {
        lane: LaneId,
        size: u32,
        remaining: u32,
    },

    #[error("{lane} is empty")]
    Empty { lane: LaneId },

    #[error("signal {signal} gating {lane} is closed")]
    SignalClosed { lane: LaneId, signal: SignalId },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("total time must be at least 1, got {0}")]
    InvalidTotalTime(i64),

    #[error("semaphore frequency must be at least 1, got {0}")]
    InvalidSemaphoreFrequency(i64),

    #[error("lane '{0}' is defined more than once")]
    DuplicateLane(String),

    #[error("signal '{0}' is defined more than once")]
    DuplicateSignal(String),

    #[error("lane '{lane}' references unknown lane '{target}'")]
    UnknownLane { lane: String, target: String },

    #[error("lane '{lane}' references unknown signal '{signal}'")]
    UnknownSignal { lane: String, signal: String },

    #[error("ring '{0}' has no signals")]
    EmptyRing(String),

    #[error("lane '{0}' must have a capacity of at least 1")]
    ZeroCapacity(String),

    #[error("lane '{0}' must have a velocity of at least 1")]
    ZeroVelocity(String),

    #[error("lane '{lane}' has invalid turn probabilities left={left} right={right}")]
    InvalidProbabilities { lane: String, left: f64, right: f64 },

    #[error("lane '{lane}' needs 0 <= interarrival spread < mean, got spread {spread} and mean {mean}")]
    InvalidInterarrival { lane: String, mean: i64, spread: i64 },

    #[error("lane '{lane}' must wait at least 1 between arrivals, got fixed={fixed} variable={variable}")]
    InvalidArrivalLaw { lane: String, fixed: i64, variable: i64 },

    #[error("lane '{0}' cannot reach any exit lane")]
    NoRouteToExit(String),

    #[error("network has no source lanes")]
    NoSources,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error(transparent)]
    Lane(#[from] LaneError),

    #[error("{lane} is not a {expected} lane")]
    WrongLaneKind { lane: LaneId, expected: &'static str },

    #[error("unknown {0}")]
    UnknownLane(LaneId),

    #[error("unknown signal {0}")]
    UnknownSignal(SignalId),
}
