//! Frame clock for the presenter loop

use std::time::{Duration, Instant};

use holo_core::SceneTime;

/// Largest animation delta applied in one tick
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(100);

/// Frame clock - monotonic, frame-driven
/// INVARIANT: scene time never goes backwards and follows elapsed time
/// exactly; only the animation delta is clamped to `max_delta`
pub struct FrameClock {
    /// Current scene time
    value: SceneTime,
    /// Last real-time update
    last_update: Instant,
    /// Per-tick animation clamp
    max_delta: Duration,
    /// Clamped delta of the last tick
    last_delta: Duration,
}

impl FrameClock {
    /// Create a new frame clock starting at zero
    pub fn new() -> Self {
        Self::with_max_delta(MAX_FRAME_DELTA)
    }

    pub fn with_max_delta(max_delta: Duration) -> Self {
        FrameClock {
            value: SceneTime::ZERO,
            last_update: Instant::now(),
            max_delta,
            last_delta: Duration::ZERO,
        }
    }

    /// Advance by the real time elapsed since the previous tick
    pub fn tick(&mut self) -> SceneTime {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update);
        self.last_update = now;
        self.advance(elapsed)
    }

    /// Advance by an explicit delta
    ///
    /// Scene time moves by the full delta so phase deadlines stay on wall
    /// time; the animation delta is clamped (e.g., after the window was hidden)
    pub fn advance(&mut self, dt: Duration) -> SceneTime {
        self.value = self.value.saturating_add(dt);
        self.last_delta = dt.min(self.max_delta);
        self.value
    }

    /// Current scene time without advancing
    pub fn now(&self) -> SceneTime {
        self.value
    }

    /// Clamped delta of the most recent tick, for animation and playback
    pub fn last_delta(&self) -> Duration {
        self.last_delta
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_clock_monotonic() {
        let mut clock = FrameClock::new();

        let t1 = clock.tick();
        std::thread::sleep(Duration::from_millis(5));
        let t2 = clock.tick();

        assert!(t2 > t1);
    }

    #[test]
    fn test_large_jump_clamps_only_animation_delta() {
        let mut clock = FrameClock::new();

        clock.advance(Duration::from_secs(10));
        assert_eq!(clock.now(), SceneTime::from_millis(10_000));
        assert_eq!(clock.last_delta(), MAX_FRAME_DELTA);

        clock.advance(Duration::from_millis(16));
        assert_eq!(clock.last_delta(), Duration::from_millis(16));
    }

    #[test]
    fn test_frame_clock_accumulates() {
        let mut clock = FrameClock::new();
        for _ in 0..60 {
            clock.advance(Duration::from_micros(16_667));
        }

        let ms = clock.now().as_millis();
        assert!((999..=1001).contains(&ms));
    }
}
