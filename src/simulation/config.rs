//! Startup configuration
//!
//! `RunParameters` carries the horizon, the signal toggle period and the
//! RNG seed. `NetworkConfig` describes lanes and signal rings by name and is
//! read from JSON or taken from the built-in two-intersection layout.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::error::ConfigError;
use super::lane::{ArrivalLaw, LaneKind, Routing};
use super::network::{OverflowPolicy, SimLaneNetwork};
use super::types::{LaneId, RingId, SignalId, SimTime};
use super::world::SimWorld;

/// Parameters of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunParameters {
    pub total_time: SimTime,
    pub semaphore_frequency: SimTime,
    pub seed: Option<u64>,
    pub overflow: OverflowPolicy,
}

impl RunParameters {
    pub fn new(total_time: SimTime, semaphore_frequency: SimTime) -> Result<Self, ConfigError> {
        if total_time < 1 {
            return Err(ConfigError::InvalidTotalTime(total_time));
        }
        if semaphore_frequency < 1 {
            return Err(ConfigError::InvalidSemaphoreFrequency(semaphore_frequency));
        }
        Ok(Self {
            total_time,
            semaphore_frequency,
            seed: None,
            overflow: OverflowPolicy::default(),
        })
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalConfig {
    pub name: String,
    #[serde(default)]
    pub open: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingConfig {
    pub name: String,
    /// Members in ring order
    pub signals: Vec<SignalConfig>,
    /// Whether the driver toggles this ring every semaphore period
    #[serde(default = "default_toggles")]
    pub toggles: bool,
}

fn default_toggles() -> bool {
    true
}

/// Gating signal plus the three destinations of a lane, all by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutesConfig {
    /// `ring.member`, e.g. `S1.west`
    pub signal: String,
    pub left: String,
    pub straight: String,
    pub right: String,
    pub prob_left: f64,
    pub prob_right: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum LaneRole {
    Source {
        #[serde(flatten)]
        routes: RoutesConfig,
        mean_interarrival: SimTime,
        interarrival_spread: SimTime,
    },
    Through {
        #[serde(flatten)]
        routes: RoutesConfig,
    },
    Exit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneConfig {
    pub name: String,
    pub capacity: u32,
    pub velocity: u32,
    #[serde(flatten)]
    pub role: LaneRole,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub rings: Vec<RingConfig>,
    pub lanes: Vec<LaneConfig>,
}

impl NetworkConfig {
    /// Read a network description from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read network file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid network file {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse network JSON")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize network")
    }

    /// Resolve names and build a validated lane network
    ///
    /// Also returns the rings the driver should toggle.
    pub fn build(&self) -> Result<(SimLaneNetwork, Vec<RingId>), ConfigError> {
        let mut network = SimLaneNetwork::new();
        let mut signals: HashMap<String, SignalId> = HashMap::new();
        let mut toggled = Vec::new();

        for ring in &self.rings {
            let members = ring
                .signals
                .iter()
                .map(|signal| (signal.name.clone(), signal.open))
                .collect();
            let ids = network.add_ring(ring.name.clone(), members)?;
            if let Some(first) = ids.first() {
                if ring.toggles {
                    toggled.push(first.ring);
                }
            }
            for (signal, id) in ring.signals.iter().zip(ids) {
                signals.insert(format!("{}.{}", ring.name, signal.name), id);
            }
        }

        let mut lane_ids: HashMap<&str, LaneId> = HashMap::new();
        for (index, lane) in self.lanes.iter().enumerate() {
            if lane_ids.insert(lane.name.as_str(), LaneId(index)).is_some() {
                return Err(ConfigError::DuplicateLane(lane.name.clone()));
            }
        }

        for lane in &self.lanes {
            let kind = match &lane.role {
                LaneRole::Source {
                    routes,
                    mean_interarrival,
                    interarrival_spread,
                } => {
                    let (mean, spread) = (*mean_interarrival, *interarrival_spread);
                    if mean < 1 || spread < 0 || spread >= mean {
                        return Err(ConfigError::InvalidInterarrival {
                            lane: lane.name.clone(),
                            mean,
                            spread,
                        });
                    }
                    LaneKind::Source {
                        arrivals: ArrivalLaw::around_mean(mean, spread),
                        routing: resolve_routes(&lane.name, routes, &lane_ids, &signals)?,
                    }
                }
                LaneRole::Through { routes } => LaneKind::Through {
                    routing: resolve_routes(&lane.name, routes, &lane_ids, &signals)?,
                },
                LaneRole::Exit => LaneKind::Exit,
            };
            network.add_lane(lane.name.clone(), kind, lane.capacity, lane.velocity)?;
        }

        network.validate()?;
        Ok((network, toggled))
    }

    /// Build the network and a world with its initial events scheduled
    pub fn build_world(&self, params: &RunParameters) -> Result<SimWorld, ConfigError> {
        let (network, toggled) = self.build()?;
        let world = match params.seed {
            Some(seed) => SimWorld::new_with_seed(network, seed),
            None => SimWorld::new(network),
        };
        let mut world = world.with_overflow_policy(params.overflow);
        world.seed_initial_events(params.semaphore_frequency, toggled);
        Ok(world)
    }

    /// The two-intersection layout: two four-way rings, six sources, two
    /// connecting through lanes and six exits
    pub fn two_intersections() -> Self {
        let ring = |name: &str| RingConfig {
            name: name.to_string(),
            signals: ["west", "south", "east", "north"]
                .iter()
                .map(|member| SignalConfig {
                    name: member.to_string(),
                    open: *member == "west",
                })
                .collect(),
            toggles: true,
        };

        let exit = |name: &str, capacity, velocity| LaneConfig {
            name: name.to_string(),
            capacity,
            velocity,
            role: LaneRole::Exit,
        };

        // Destinations are listed right, straight, left, with the share of
        // traffic turning right and left.
        let routes = |signal: &str, [right, straight, left]: [&str; 3], turn_share: f64| RoutesConfig {
            signal: signal.to_string(),
            left: left.to_string(),
            straight: straight.to_string(),
            right: right.to_string(),
            prob_left: turn_share,
            prob_right: turn_share,
        };

        let through = |name: &str, capacity, velocity, routes| LaneConfig {
            name: name.to_string(),
            capacity,
            velocity,
            role: LaneRole::Through { routes },
        };

        let source = |name: &str, capacity, velocity, mean, spread, routes| LaneConfig {
            name: name.to_string(),
            capacity,
            velocity,
            role: LaneRole::Source {
                routes,
                mean_interarrival: mean,
                interarrival_spread: spread,
            },
        };

        Self {
            rings: vec![ring("S1"), ring("S2")],
            lanes: vec![
                source("W1east", 2000, 80, 10, 2, routes("S1.west", ["S1south", "C1east", "N1north"], 0.1)),
                source("N1south", 500, 60, 20, 5, routes("S1.north", ["W1west", "S1south", "C1east"], 0.1)),
                source("S1north", 500, 60, 30, 7, routes("S1.south", ["C1east", "N1north", "W1west"], 0.1)),
                source("E2west", 400, 30, 10, 2, routes("S2.east", ["N2north", "C1west", "S2south"], 0.3)),
                source("N2south", 500, 40, 20, 5, routes("S2.north", ["C1west", "S2south", "E2east"], 0.3)),
                source("S2north", 500, 40, 60, 15, routes("S2.south", ["E2east", "N2north", "C1west"], 0.3)),
                through("C1west", 300, 60, routes("S1.east", ["N1north", "W1west", "S1south"], 0.3)),
                through("C1east", 300, 60, routes("S2.west", ["S2south", "E2east", "N2north"], 0.3)),
                exit("W1west", 2000, 80),
                exit("N1north", 500, 60),
                exit("S1south", 500, 60),
                exit("E2east", 400, 30),
                exit("N2north", 500, 40),
                exit("S2south", 500, 40),
            ],
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::two_intersections()
    }
}

fn resolve_routes(
    lane: &str,
    routes: &RoutesConfig,
    lane_ids: &HashMap<&str, LaneId>,
    signals: &HashMap<String, SignalId>,
) -> Result<Routing, ConfigError> {
    let find_lane = |target: &str| {
        lane_ids
            .get(target)
            .copied()
            .ok_or_else(|| ConfigError::UnknownLane {
                lane: lane.to_string(),
                target: target.to_string(),
            })
    };

    let signal = signals
        .get(&routes.signal)
        .copied()
        .ok_or_else(|| ConfigError::UnknownSignal {
            lane: lane.to_string(),
            signal: routes.signal.clone(),
        })?;

    Ok(Routing {
        signal,
        left: find_lane(&routes.left)?,
        straight: find_lane(&routes.straight)?,
        right: find_lane(&routes.right)?,
        prob_left: routes.prob_left,
        prob_right: routes.prob_right,
    })
}
