//! Intersection Simulation Library
//!
//! A discrete-event simulator of traffic through signal-controlled
//! intersections. Runs headless; the binary wraps it with a CLI and a report.

pub mod simulation;
pub mod stats;
