//! Events: one-shot, time-stamped state transitions
//!
//! Executing an event mutates lanes or signals and returns the events it
//! spawns, in the order they must be inserted into the queue. An event never
//! runs another event directly.

use log::{debug, trace, warn};

use super::counters::SimulationCounters;
use super::error::{LaneError, SimError};
use super::network::{OverflowPolicy, RouteOutcome, SimLaneNetwork};
use super::rng::SimRng;
use super::types::{LaneId, SignalId, SimTime, RETRY_DELAY};
use super::vehicle::Vehicle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Create a vehicle at a source lane
    CreateVehicle { source: LaneId },
    /// Release the front vehicle of a source or through lane
    AdvanceVehicle { lane: LaneId },
    /// Take the front vehicle out of an exit lane
    RemoveVehicle { exit: LaneId },
    /// Advance a signal ring, then reschedule itself
    ToggleSignal { signal: SignalId, frequency: SimTime },
}

impl EventKind {
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::CreateVehicle { .. } => "create",
            EventKind::AdvanceVehicle { .. } => "advance",
            EventKind::RemoveVehicle { .. } => "remove",
            EventKind::ToggleSignal { .. } => "toggle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub time: SimTime,
    pub kind: EventKind,
}

/// Everything an event may touch while it executes
pub struct EventContext<'a> {
    pub network: &'a mut SimLaneNetwork,
    pub counters: &'a mut SimulationCounters,
    pub rng: &'a mut SimRng,
    pub overflow: OverflowPolicy,
}

impl Event {
    pub fn new(time: SimTime, kind: EventKind) -> Self {
        Self { time, kind }
    }

    pub fn create_vehicle(time: SimTime, source: LaneId) -> Self {
        Self::new(time, EventKind::CreateVehicle { source })
    }

    pub fn advance_vehicle(time: SimTime, lane: LaneId) -> Self {
        Self::new(time, EventKind::AdvanceVehicle { lane })
    }

    pub fn remove_vehicle(time: SimTime, exit: LaneId) -> Self {
        Self::new(time, EventKind::RemoveVehicle { exit })
    }

    pub fn toggle_signal(time: SimTime, signal: SignalId, frequency: SimTime) -> Self {
        Self::new(time, EventKind::ToggleSignal { signal, frequency })
    }

    /// Run the event at its scheduled time and return the events it spawns
    ///
    /// Only contract violations (an empty lane where a vehicle was promised,
    /// a lane of the wrong kind) are returned as errors; a full source or a
    /// closed signal becomes a retry event.
    pub fn execute(&self, ctx: &mut EventContext<'_>) -> Result<Vec<Event>, SimError> {
        match self.kind {
            EventKind::CreateVehicle { source } => self.create(source, ctx),
            EventKind::AdvanceVehicle { lane } => self.advance(lane, ctx),
            EventKind::RemoveVehicle { exit } => self.remove(exit, ctx),
            EventKind::ToggleSignal { signal, frequency } => self.toggle(signal, frequency, ctx),
        }
    }

    fn create(&self, source: LaneId, ctx: &mut EventContext<'_>) -> Result<Vec<Event>, SimError> {
        let now = self.time;
        let lane = ctx
            .network
            .lane_mut(source)
            .ok_or(SimError::UnknownLane(source))?;
        if !lane.is_source() {
            return Err(SimError::WrongLaneKind {
                lane: source,
                expected: "source",
            });
        }

        let vehicle = Vehicle::random(ctx.rng);
        match lane.add(vehicle, ctx.counters) {
            Ok(()) => {
                ctx.counters.vehicles_created += 1;
                let next = lane
                    .next_interarrival(now, ctx.rng)
                    .ok_or(SimError::WrongLaneKind {
                        lane: source,
                        expected: "source",
                    })?;
                debug!("t={now} created vehicle at {}; next arrival at t={next}", lane.name());
                Ok(vec![
                    Event::create_vehicle(next, source),
                    Event::advance_vehicle(next, source),
                ])
            }
            Err(LaneError::CapacityExceeded { size, remaining, .. }) => {
                ctx.counters.source_full_retries += 1;
                trace!(
                    "t={now} {} full (size {size}, {remaining} left); retrying creation",
                    lane.name()
                );
                Ok(vec![Event::create_vehicle(now + RETRY_DELAY, source)])
            }
            Err(err) => Err(err.into()),
        }
    }

    fn advance(&self, lane: LaneId, ctx: &mut EventContext<'_>) -> Result<Vec<Event>, SimError> {
        let now = self.time;
        let outcome = ctx
            .network
            .route_vehicle(lane, ctx.overflow, ctx.rng, ctx.counters);

        match outcome {
            Ok(RouteOutcome::Moved { turn, destination }) => {
                let target = ctx
                    .network
                    .lane(destination)
                    .ok_or(SimError::UnknownLane(destination))?;
                let arrival = now + target.travel_time();
                debug!("t={now} {lane} -> {} ({turn:?}), arrives t={arrival}", target.name());
                if target.is_exit() {
                    Ok(vec![Event::remove_vehicle(arrival, destination)])
                } else {
                    Ok(vec![Event::advance_vehicle(arrival, destination)])
                }
            }
            Ok(RouteOutcome::Dropped {
                turn,
                destination,
                vehicle,
            }) => {
                ctx.counters.vehicles_dropped += 1;
                warn!(
                    "t={now} dropped vehicle of size {} from {lane}: {destination} ({turn:?}) is full",
                    vehicle.size()
                );
                Ok(Vec::new())
            }
            Err(SimError::Lane(LaneError::SignalClosed { signal, .. })) => {
                ctx.counters.signal_closed_retries += 1;
                trace!("t={now} signal {signal} closed for {lane}; retrying advance");
                Ok(vec![Event::advance_vehicle(now + RETRY_DELAY, lane)])
            }
            Err(SimError::Lane(LaneError::CapacityExceeded { lane: destination, .. }))
                if ctx.overflow == OverflowPolicy::Retry =>
            {
                ctx.counters.destination_full_retries += 1;
                trace!("t={now} {destination} full for {lane}; retrying advance");
                Ok(vec![Event::advance_vehicle(now + RETRY_DELAY, lane)])
            }
            Err(err) => Err(err),
        }
    }

    fn remove(&self, exit: LaneId, ctx: &mut EventContext<'_>) -> Result<Vec<Event>, SimError> {
        let lane = ctx.network.lane_mut(exit).ok_or(SimError::UnknownLane(exit))?;
        if !lane.is_exit() {
            return Err(SimError::WrongLaneKind {
                lane: exit,
                expected: "exit",
            });
        }

        let vehicle = lane.pop(ctx.counters)?;
        ctx.counters.vehicles_removed += 1;
        debug!("t={} vehicle of size {} left through {}", self.time, vehicle.size(), lane.name());
        Ok(Vec::new())
    }

    fn toggle(
        &self,
        signal: SignalId,
        frequency: SimTime,
        ctx: &mut EventContext<'_>,
    ) -> Result<Vec<Event>, SimError> {
        if !ctx.network.signals_mut().advance_ring(signal) {
            return Err(SimError::UnknownSignal(signal));
        }
        debug!("t={} advanced ring of {signal}", self.time);
        Ok(vec![Event::toggle_signal(self.time + frequency, signal, frequency)])
    }
}
