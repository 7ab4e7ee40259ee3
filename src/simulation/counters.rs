//! Run-wide counters
//!
//! One instance per simulation run, owned by the driver and passed by
//! reference into every lane operation that moves a vehicle. Two runs in
//! the same process never share totals.

/// Totals shared across every lane of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationCounters {
    /// Vehicles added to any lane (a vehicle counts once per lane it enters)
    pub grand_total_entered: u64,

    /// Vehicles popped from any lane
    pub grand_total_left: u64,

    /// Vehicles created at a source
    pub vehicles_created: u64,

    /// Vehicles that left the system through an exit lane
    pub vehicles_removed: u64,

    /// Vehicles discarded because their routing destination was full
    pub vehicles_dropped: u64,

    /// Creation attempts rescheduled because the source was full
    pub source_full_retries: u64,

    /// Advances rescheduled because the gating signal was closed
    pub signal_closed_retries: u64,

    /// Advances rescheduled because the destination was full (retry policy)
    pub destination_full_retries: u64,
}

impl SimulationCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a vehicle entering a lane
    pub fn record_entry(&mut self) {
        self.grand_total_entered += 1;
    }

    /// Record a vehicle leaving a lane
    pub fn record_exit(&mut self) {
        self.grand_total_left += 1;
    }

    /// Vehicles currently held by some lane
    pub fn in_transit(&self) -> u64 {
        self.grand_total_entered.saturating_sub(self.grand_total_left)
    }

    /// Vehicles created and not yet removed or dropped
    pub fn in_system(&self) -> u64 {
        self.vehicles_created
            .saturating_sub(self.vehicles_removed)
            .saturating_sub(self.vehicles_dropped)
    }

    pub fn total_retries(&self) -> u64 {
        self.source_full_retries + self.signal_closed_retries + self.destination_full_retries
    }

    /// Get a summary string for display
    pub fn summary(&self) -> String {
        format!(
            "Created: {} | Removed: {} | Dropped: {} | In system: {} | Retries: {}",
            self.vehicles_created,
            self.vehicles_removed,
            self.vehicles_dropped,
            self.in_system(),
            self.total_retries()
        )
    }
}
