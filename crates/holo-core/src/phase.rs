//! Presentation phases
//!
//! Exactly one phase is active at any instant. Phases only ever change inside
//! the choreography machine.

use std::fmt;

use serde::Serialize;

/// Discrete mode of the presentation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Avatar at home, free to speak
    #[default]
    Idle,
    /// Avatar walks out of frame
    WalkOff,
    /// Camera settles on the product stage
    PreCarousel,
    /// Product carousel is browsable
    Carousel,
    /// Carousel slides away while the goodbye line is generated
    Goodbye,
    /// Avatar reappears
    PostGoodbye,
    /// Avatar walks back to its mark
    WalkOn,
    /// A single product is shown up close
    Inspection,
}

impl Phase {
    pub const ALL: [Phase; 8] = [
        Phase::Idle,
        Phase::WalkOff,
        Phase::PreCarousel,
        Phase::Carousel,
        Phase::Goodbye,
        Phase::PostGoodbye,
        Phase::WalkOn,
        Phase::Inspection,
    ];

    /// Phases in which gestures can have an effect
    #[inline]
    pub fn accepts_gestures(self) -> bool {
        matches!(self, Phase::Carousel | Phase::Inspection)
    }

    /// Is the avatar drawn in this phase?
    #[inline]
    pub fn avatar_visible(self) -> bool {
        matches!(
            self,
            Phase::Idle | Phase::WalkOff | Phase::WalkOn | Phase::PostGoodbye
        )
    }

    /// Is the avatar allowed to start speaking?
    #[inline]
    pub fn permits_speech(self) -> bool {
        self == Phase::Idle
    }

    /// Is the carousel mounted? (it stays mounted while sliding away)
    #[inline]
    pub fn carousel_mounted(self) -> bool {
        matches!(self, Phase::Carousel | Phase::Goodbye)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "IDLE",
            Phase::WalkOff => "WALK_OFF",
            Phase::PreCarousel => "PRE_CAROUSEL",
            Phase::Carousel => "CAROUSEL",
            Phase::Goodbye => "GOODBYE",
            Phase::PostGoodbye => "POST_GOODBYE",
            Phase::WalkOn => "WALK_ON",
            Phase::Inspection => "INSPECTION",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
