//! Holo Test Harness - scenario simulation for the presenter
//!
//! This crate provides:
//! - Snapshot scripts with automatic update ids
//! - Delivery chaos (reordering, duplication, fetch latency)
//! - A scenario simulator that runs a director against a fake orchestrator
//!   and records the phase trace

pub mod chaos;
pub mod scenario;
pub mod script;

pub use chaos::*;
pub use scenario::*;
pub use script::*;

#[cfg(test)]
mod properties;
