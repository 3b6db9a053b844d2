//! Holo Time - clocks and timers for the presenter
//!
//! This crate implements:
//! - Frame clock: monotonic scene time, clamped frame deltas
//! - Viewer clock: the speech audio playback position and status
//! - Phase timer: one cancellable single-shot deadline per active phase

pub mod clock;
pub mod playback;
pub mod timer;

pub use clock::*;
pub use playback::*;
pub use timer::*;
