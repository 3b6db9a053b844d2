//! Time primitives for the presenter
//!
//! Scene time is monotonic, local-driven and only advanced by the frame loop.
//! Audio playback positions are plain `f64` seconds, matching cue documents.

use std::ops::{Add, Sub};
use std::time::Duration;

use serde::Serialize;

/// Scene time - monotonic, frame-driven
/// Represented as microseconds since director start
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct SceneTime(pub u64);

impl SceneTime {
    pub const ZERO: SceneTime = SceneTime(0);

    #[inline]
    pub fn from_micros(micros: u64) -> Self {
        SceneTime(micros)
    }

    #[inline]
    pub fn from_millis(millis: u64) -> Self {
        SceneTime(millis * 1000)
    }

    #[inline]
    pub fn from_secs_f64(secs: f64) -> Self {
        SceneTime((secs.max(0.0) * 1_000_000.0).round() as u64)
    }

    #[inline]
    pub fn as_micros(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn as_millis(self) -> u64 {
        self.0 / 1000
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    #[inline]
    pub fn saturating_add(self, duration: Duration) -> Self {
        SceneTime(self.0.saturating_add(duration.as_micros() as u64))
    }

    /// Elapsed since an earlier time, zero if `earlier` is in the future
    #[inline]
    pub fn since(self, earlier: SceneTime) -> Duration {
        Duration::from_micros(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for SceneTime {
    type Output = SceneTime;

    #[inline]
    fn add(self, rhs: Duration) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl Sub<SceneTime> for SceneTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: SceneTime) -> Self::Output {
        self.since(rhs)
    }
}

impl std::fmt::Debug for SceneTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t({:.3}s)", self.as_secs_f64())
    }
}
