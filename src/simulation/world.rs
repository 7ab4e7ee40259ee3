//! Main simulation world that ties everything together
//!
//! `SimWorld` is the driver: it owns the lane network, the run counters, the
//! RNG and the event queue, and repeatedly executes the earliest pending
//! event until the horizon is passed or nothing is left to do.

use log::{debug, info};

use super::counters::SimulationCounters;
use super::error::SimError;
use super::event::{Event, EventContext, EventKind};
use super::event_queue::EventQueue;
use super::network::{OverflowPolicy, SimLaneNetwork};
use super::rng::SimRng;
use super::types::{RingId, SignalId, SimTime};

/// One executed event, as recorded by the trace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEntry {
    pub time: SimTime,
    pub kind: EventKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The earliest pending event lies beyond the horizon
    Horizon,
    /// No events left
    QueueEmpty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub events_executed: u64,
    /// Time of the last executed event
    pub current_time: SimTime,
    pub pending_events: usize,
    pub stop_reason: StopReason,
}

/// The main simulation world
pub struct SimWorld {
    /// Lanes and signal rings
    pub network: SimLaneNetwork,

    /// Run-wide totals
    pub counters: SimulationCounters,

    /// Pending events
    queue: EventQueue,

    /// Seeded or entropy-backed RNG
    rng: SimRng,

    /// What to do when a routing destination is full
    overflow: OverflowPolicy,

    /// Simulation time: timestamp of the event executed last
    pub time: SimTime,

    events_executed: u64,

    /// Executed events, when tracing is enabled
    trace: Option<Vec<TraceEntry>>,
}

impl SimWorld {
    fn new_internal(network: SimLaneNetwork, rng: SimRng) -> Self {
        Self {
            network,
            counters: SimulationCounters::new(),
            queue: EventQueue::new(),
            rng,
            overflow: OverflowPolicy::default(),
            time: 0,
            events_executed: 0,
            trace: None,
        }
    }

    pub fn new(network: SimLaneNetwork) -> Self {
        Self::new_internal(network, SimRng::from_entropy())
    }

    /// Create a new SimWorld with a seeded RNG for reproducible simulations
    pub fn new_with_seed(network: SimLaneNetwork, seed: u64) -> Self {
        Self::new_internal(network, SimRng::seeded(seed))
    }

    pub fn with_overflow_policy(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    /// Record every executed event
    pub fn with_trace(mut self) -> Self {
        self.trace = Some(Vec::new());
        self
    }

    pub fn overflow_policy(&self) -> OverflowPolicy {
        self.overflow
    }

    pub fn trace(&self) -> Option<&[TraceEntry]> {
        self.trace.as_deref()
    }

    pub fn events_executed(&self) -> u64 {
        self.events_executed
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    pub fn next_event_time(&self) -> Option<SimTime> {
        self.queue.peek_time()
    }

    pub fn schedule(&mut self, event: Event) {
        self.queue.push(event);
    }

    /// Seed a creation at t=0 for every source and one toggle per listed ring
    ///
    /// Each ring is toggled through its first member every
    /// `semaphore_frequency`, starting at `t = semaphore_frequency`.
    pub fn seed_initial_events(
        &mut self,
        semaphore_frequency: SimTime,
        toggled_rings: impl IntoIterator<Item = RingId>,
    ) {
        let sources: Vec<_> = self.network.sources().map(|lane| lane.id()).collect();
        for source in sources {
            self.schedule(Event::create_vehicle(0, source));
        }
        for ring in toggled_rings {
            let signal = SignalId::new(ring, 0);
            self.schedule(Event::toggle_signal(
                semaphore_frequency,
                signal,
                semaphore_frequency,
            ));
        }
        debug!("Seeded {} initial events", self.queue.len());
    }

    /// Execute the earliest pending event regardless of any horizon
    ///
    /// Returns the executed event, or `None` when the queue is empty.
    pub fn step(&mut self) -> Result<Option<Event>, SimError> {
        let Some(event) = self.queue.pop() else {
            return Ok(None);
        };

        self.time = event.time;
        let mut ctx = EventContext {
            network: &mut self.network,
            counters: &mut self.counters,
            rng: &mut self.rng,
            overflow: self.overflow,
        };
        let spawned = event.execute(&mut ctx)?;

        self.events_executed += 1;
        if let Some(trace) = &mut self.trace {
            trace.push(TraceEntry {
                time: event.time,
                kind: event.kind,
            });
        }
        self.queue.extend(spawned);
        Ok(Some(event))
    }

    /// Run until the earliest pending event is later than `horizon`
    ///
    /// An event scheduled exactly at the horizon still executes. Events it
    /// spawns beyond the horizon stay pending.
    pub fn run(&mut self, horizon: SimTime) -> Result<RunSummary, SimError> {
        info!(
            "Running simulation to t={} ({} lanes, {} pending events)",
            horizon,
            self.network.lane_count(),
            self.queue.len()
        );

        let stop_reason = loop {
            match self.queue.peek_time() {
                None => break StopReason::QueueEmpty,
                Some(time) if time > horizon => break StopReason::Horizon,
                Some(_) => {}
            }
            self.step()?;
        };

        let summary = RunSummary {
            events_executed: self.events_executed,
            current_time: self.time,
            pending_events: self.queue.len(),
            stop_reason,
        };
        info!(
            "Stopped at t={} after {} events ({:?}, {} pending)",
            summary.current_time, summary.events_executed, summary.stop_reason, summary.pending_events
        );
        Ok(summary)
    }
}
