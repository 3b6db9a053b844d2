//! Holo Feed - everything that talks to the orchestrator
//!
//! - [`GestureFeed`]: push interface for state snapshots, with a scripted
//!   implementation for deterministic runs and an HTTP polling one
//! - [`OrchestratorClient`]: the poll, reset, goodbye and viseme requests

pub mod client;
pub mod feed;
pub mod polling;

pub use client::*;
pub use feed::*;
pub use polling::*;
