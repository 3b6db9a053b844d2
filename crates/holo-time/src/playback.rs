//! Viewer clock - the speech audio playback position
//!
//! The presenter never decodes audio. Whatever plays the sound reports its
//! position through [`ViewerClock`]; the headless [`SimulatedPlayback`]
//! advances with the frame loop instead.

use std::time::Duration;

use tracing::trace;

/// Playback status of the speech audio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    /// No source loaded
    #[default]
    Empty,
    /// Source loaded, not playing
    Paused,
    Playing,
    /// Reached the end of the source
    Ended,
}

/// Audio playback clock owned by the utterance lifecycle
pub trait ViewerClock: Send {
    /// Load a new source, replacing the current one; starts paused at zero
    fn load(&mut self, source: &str, duration: f64);

    fn play(&mut self);

    fn pause(&mut self);

    /// Drop the current source
    fn stop(&mut self);

    /// Advance by one frame
    fn advance(&mut self, dt: Duration);

    /// Current playback position in seconds
    fn position(&self) -> f64;

    fn status(&self) -> PlaybackStatus;

    fn source(&self) -> Option<&str>;

    /// Is the mouth allowed to move?
    fn is_playing(&self) -> bool {
        self.status() == PlaybackStatus::Playing
    }
}

/// Playback clock driven by frame deltas
#[derive(Debug, Clone)]
pub struct SimulatedPlayback {
    source: Option<String>,
    duration: f64,
    position: f64,
    status: PlaybackStatus,
}

impl SimulatedPlayback {
    pub fn new() -> Self {
        SimulatedPlayback {
            source: None,
            duration: 0.0,
            position: 0.0,
            status: PlaybackStatus::Empty,
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }
}

impl Default for SimulatedPlayback {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewerClock for SimulatedPlayback {
    fn load(&mut self, source: &str, duration: f64) {
        trace!(source, duration, "playback load");
        self.source = Some(source.to_string());
        self.duration = duration.max(0.0);
        self.position = 0.0;
        self.status = PlaybackStatus::Paused;
    }

    fn play(&mut self) {
        if self.status == PlaybackStatus::Paused {
            self.status = PlaybackStatus::Playing;
        }
    }

    fn pause(&mut self) {
        if self.status == PlaybackStatus::Playing {
            self.status = PlaybackStatus::Paused;
        }
    }

    fn stop(&mut self) {
        self.source = None;
        self.duration = 0.0;
        self.position = 0.0;
        self.status = PlaybackStatus::Empty;
    }

    fn advance(&mut self, dt: Duration) {
        if self.status != PlaybackStatus::Playing {
            return;
        }
        self.position += dt.as_secs_f64();
        if self.position >= self.duration {
            self.position = self.duration;
            self.status = PlaybackStatus::Ended;
        }
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn status(&self) -> PlaybackStatus {
        self.status
    }

    fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}
