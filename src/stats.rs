use log::info;
use std::fmt;

use crate::simulation::{LaneKind, SimTime, SimWorld, SimulationCounters};

/// Per-lane figures at the end of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneStats {
    pub name: String,
    pub entered: u64,
    pub left: u64,
    pub are_in: u64,
}

/// Final report of a simulation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationReport {
    pub sources: Vec<LaneStats>,
    pub through: Vec<LaneStats>,
    pub exits: Vec<LaneStats>,
    pub counters: SimulationCounters,
    pub final_time: SimTime,
    pub events_executed: u64,
}

impl SimulationReport {
    pub fn from_world(world: &SimWorld) -> Self {
        let mut report = Self {
            sources: Vec::new(),
            through: Vec::new(),
            exits: Vec::new(),
            counters: world.counters.clone(),
            final_time: world.time,
            events_executed: world.events_executed(),
        };

        for lane in world.network.lanes() {
            let stats = LaneStats {
                name: lane.name().to_string(),
                entered: lane.entered(),
                left: lane.left(),
                are_in: lane.are_in(),
            };
            match lane.kind() {
                LaneKind::Source { .. } => report.sources.push(stats),
                LaneKind::Through { .. } => report.through.push(stats),
                LaneKind::Exit => report.exits.push(stats),
            }
        }

        report
    }

    /// Log the completion summary
    pub fn log_summary(&self) {
        let counters = &self.counters;
        info!("=== SIMULATION COMPLETE ===");
        info!("Final time: {}", self.final_time);
        info!("Events executed: {}", self.events_executed);
        info!("Vehicles created: {}", counters.vehicles_created);
        info!("Vehicles removed: {}", counters.vehicles_removed);
        info!("Vehicles dropped: {}", counters.vehicles_dropped);
        info!("Vehicles in system: {}", counters.in_system());
        info!(
            "Retries: {} source full, {} signal closed, {} destination full",
            counters.source_full_retries,
            counters.signal_closed_retries,
            counters.destination_full_retries
        );
    }
}

fn write_group(f: &mut fmt::Formatter<'_>, title: &str, lanes: &[LaneStats]) -> fmt::Result {
    if lanes.is_empty() {
        return Ok(());
    }
    writeln!(f, "\n{title}")?;
    for lane in lanes {
        writeln!(
            f,
            "  {:<10} entered: {:>6}  left: {:>6}  inside: {:>6}",
            lane.name, lane.entered, lane.left, lane.are_in
        )?;
    }
    Ok(())
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counters = &self.counters;
        writeln!(f, "--------------------")?;
        writeln!(f, "    FINAL REPORT")?;
        writeln!(f, "Entered: {}", counters.grand_total_entered)?;
        writeln!(f, "Left: {}", counters.grand_total_left)?;
        writeln!(f, "Still inside: {}", counters.in_transit())?;
        writeln!(f, "--------------------")?;

        write_group(f, "Sources", &self.sources)?;
        write_group(f, "Through lanes", &self.through)?;
        write_group(f, "Exits", &self.exits)?;

        writeln!(f)?;
        writeln!(
            f,
            "Total      entered: {:>6}  left: {:>6}  inside: {:>6}",
            counters.grand_total_entered,
            counters.grand_total_left,
            counters.in_transit()
        )?;
        writeln!(f, "{}", counters.summary())
    }
}
