//! Lane network: the shared mutable state events act on
//!
//! Holds every lane and signal ring of a run. Lanes reference each other by
//! `LaneId` (an index into the lane table) and signals by `SignalId`, so the
//! topology is a plain table with no ownership cycles. The petgraph view is
//! only used at setup time to check that every lane can drain to an exit.

use log::debug;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use std::collections::HashMap;

use super::counters::SimulationCounters;
use super::error::{ConfigError, LaneError, SimError};
use super::lane::{Lane, LaneKind};
use super::rng::SimRng;
use super::signal::SignalRings;
use super::types::{LaneId, SignalId, Turn};
use super::vehicle::Vehicle;

/// What happens to a vehicle whose routing destination is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OverflowPolicy {
    /// Pop the vehicle, discard it and count it as dropped
    #[default]
    Drop,
    /// Leave the vehicle in place and try the advance again later
    Retry,
}

/// Result of a successful routing step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The vehicle now sits at the back of `destination`
    Moved { turn: Turn, destination: LaneId },
    /// The destination was full and the vehicle left the system
    Dropped {
        turn: Turn,
        destination: LaneId,
        vehicle: Vehicle,
    },
}

#[derive(Debug, Clone, Default)]
pub struct SimLaneNetwork {
    lanes: Vec<Lane>,
    signals: SignalRings,
    names: HashMap<String, LaneId>,
}

impl SimLaneNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next added lane will receive
    pub fn next_lane_id(&self) -> LaneId {
        LaneId(self.lanes.len())
    }

    /// Adds a lane; routing may point at lanes that are added later
    pub fn add_lane(
        &mut self,
        name: impl Into<String>,
        kind: LaneKind,
        capacity: u32,
        velocity: u32,
    ) -> Result<LaneId, ConfigError> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(ConfigError::DuplicateLane(name));
        }

        let id = self.next_lane_id();
        self.names.insert(name.clone(), id);
        self.lanes.push(Lane::new(id, name, kind, capacity, velocity));
        Ok(id)
    }

    pub fn add_ring(&mut self, name: impl Into<String>, members: Vec<(String, bool)>) -> Result<Vec<SignalId>, ConfigError> {
        let name = name.into();
        if members.is_empty() {
            return Err(ConfigError::EmptyRing(name));
        }
        for (i, (member, _)) in members.iter().enumerate() {
            if members[..i].iter().any(|(other, _)| other == member) {
                return Err(ConfigError::DuplicateSignal(format!("{name}.{member}")));
            }
        }
        if self.signals.rings().any(|ring| ring.name() == name) {
            return Err(ConfigError::DuplicateSignal(name));
        }

        let len = members.len();
        let ring = self.signals.add_ring(name, members);
        Ok((0..len).map(|position| SignalId::new(ring, position)).collect())
    }

    pub fn lane(&self, id: LaneId) -> Option<&Lane> {
        self.lanes.get(id.0)
    }

    pub fn lane_mut(&mut self, id: LaneId) -> Option<&mut Lane> {
        self.lanes.get_mut(id.0)
    }

    pub fn lane_by_name(&self, name: &str) -> Option<&Lane> {
        self.names.get(name).and_then(|id| self.lane(*id))
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn sources(&self) -> impl Iterator<Item = &Lane> {
        self.lanes.iter().filter(|lane| lane.is_source())
    }

    pub fn signals(&self) -> &SignalRings {
        &self.signals
    }

    pub fn signals_mut(&mut self) -> &mut SignalRings {
        &mut self.signals
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Sum of `entered` and `left` over all lanes
    pub fn lane_totals(&self) -> (u64, u64) {
        self.lanes.iter().fold((0, 0), |(entered, left), lane| {
            (entered + lane.entered(), left + lane.left())
        })
    }

    /// Vehicles currently queued in any lane
    pub fn vehicles_in_lanes(&self) -> u64 {
        self.lanes.iter().map(Lane::are_in).sum()
    }

    /// Checks every reference and that all lanes can drain into an exit
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sources().next().is_none() {
            return Err(ConfigError::NoSources);
        }

        for lane in &self.lanes {
            if lane.capacity() == 0 {
                return Err(ConfigError::ZeroCapacity(lane.name().to_string()));
            }
            if lane.velocity() == 0 {
                return Err(ConfigError::ZeroVelocity(lane.name().to_string()));
            }
            if let Some(law) = lane.arrivals() {
                if law.fixed < 1 || law.variable < 0 {
                    return Err(ConfigError::InvalidArrivalLaw {
                        lane: lane.name().to_string(),
                        fixed: law.fixed,
                        variable: law.variable,
                    });
                }
            }
            let Some(routing) = lane.routing() else {
                continue;
            };
            if !self.signals.contains(routing.signal) {
                return Err(ConfigError::UnknownSignal {
                    lane: lane.name().to_string(),
                    signal: routing.signal.to_string(),
                });
            }
            for (_, target) in routing.destinations() {
                if self.lane(target).is_none() {
                    return Err(ConfigError::UnknownLane {
                        lane: lane.name().to_string(),
                        target: target.to_string(),
                    });
                }
            }
            let (left, right) = (routing.prob_left, routing.prob_right);
            let in_range = (0.0..=1.0).contains(&left) && (0.0..=1.0).contains(&right);
            if !in_range || left + right > 1.0 {
                return Err(ConfigError::InvalidProbabilities {
                    lane: lane.name().to_string(),
                    left,
                    right,
                });
            }
        }

        let (graph, nodes) = self.topology();
        for lane in self.lanes.iter().filter(|lane| !lane.is_exit()) {
            let mut dfs = Dfs::new(&graph, nodes[lane.id().0]);
            let mut reaches_exit = false;
            while let Some(node) = dfs.next(&graph) {
                if self.lanes[graph[node].0].is_exit() {
                    reaches_exit = true;
                    break;
                }
            }
            if !reaches_exit {
                return Err(ConfigError::NoRouteToExit(lane.name().to_string()));
            }
        }

        debug!(
            "Validated network: {} lanes, {} rings, {} routes",
            self.lanes.len(),
            self.signals.rings().count(),
            graph.edge_count()
        );
        Ok(())
    }

    /// Directed graph of lanes with one edge per possible turn
    fn topology(&self) -> (DiGraph<LaneId, Turn>, Vec<NodeIndex>) {
        let mut graph = DiGraph::new();
        let nodes: Vec<NodeIndex> = self.lanes.iter().map(|lane| graph.add_node(lane.id())).collect();

        for lane in &self.lanes {
            if let Some(routing) = lane.routing() {
                for (turn, target) in routing.destinations() {
                    if let Some(&to) = nodes.get(target.0) {
                        graph.add_edge(nodes[lane.id().0], to, turn);
                    }
                }
            }
        }

        (graph, nodes)
    }

    /// Releases the vehicle at the front of `lane` into one of its destinations
    ///
    /// Fails with `SignalClosed` (nothing changes) when the gating signal is
    /// closed. Otherwise draws one uniform number to pick the turn. A full
    /// destination either drops the popped vehicle or, under
    /// `OverflowPolicy::Retry`, fails with `CapacityExceeded` before anything
    /// is popped.
    pub fn route_vehicle(
        &mut self,
        lane: LaneId,
        policy: OverflowPolicy,
        rng: &mut SimRng,
        counters: &mut SimulationCounters,
    ) -> Result<RouteOutcome, SimError> {
        let source = self.lane(lane).ok_or(SimError::UnknownLane(lane))?;
        let routing = source.routing().ok_or(SimError::WrongLaneKind {
            lane,
            expected: "routable",
        })?;

        let signal = routing.signal;
        match self.signals.is_open(signal) {
            Some(true) => {}
            Some(false) => return Err(LaneError::SignalClosed { lane, signal }.into()),
            None => return Err(SimError::UnknownSignal(signal)),
        }

        let (turn, destination) = routing.choose(rng.unit());
        let target = self.lane(destination).ok_or(SimError::UnknownLane(destination))?;

        if policy == OverflowPolicy::Retry {
            let front = source.front().ok_or(LaneError::Empty { lane })?;
            if !target.fits(front) {
                return Err(LaneError::CapacityExceeded {
                    lane: destination,
                    size: front.size(),
                    remaining: target.capacity_remaining(),
                }
                .into());
            }
        }

        let vehicle = self.lanes[lane.0].pop(counters)?;
        if !self.lanes[destination.0].fits(&vehicle) {
            return Ok(RouteOutcome::Dropped {
                turn,
                destination,
                vehicle,
            });
        }
        self.lanes[destination.0].add(vehicle, counters)?;

        Ok(RouteOutcome::Moved { turn, destination })
    }
}
