//! Gestures and gesture events
//!
//! The gesture recognizer relays free-form labels. Only a handful of them
//! drive navigation; the rest (talk styles, unknown labels) are carried as
//! `Other` so the update id is still consumed.

use serde::Serialize;

use crate::UpdateId;

/// Direction of a swipe
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Semantic gesture
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Gesture {
    Swipe(Direction),
    Grab,
    Expand,
    /// Any label without navigation meaning
    Other(String),
}

impl Gesture {
    /// Parse a relayed gesture label
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "left" | "swipe_left" => Gesture::Swipe(Direction::Left),
            "right" | "swipe_right" => Gesture::Swipe(Direction::Right),
            "up" | "swipe_up" => Gesture::Swipe(Direction::Up),
            "down" | "swipe_down" => Gesture::Swipe(Direction::Down),
            "grab" => Gesture::Grab,
            "expand" => Gesture::Expand,
            _ => Gesture::Other(label.to_string()),
        }
    }
}

/// A dedup-keyed, totally ordered gesture input
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GestureEvent {
    pub update_id: UpdateId,
    pub gesture: Gesture,
}

impl GestureEvent {
    pub fn new(update_id: UpdateId, gesture: Gesture) -> Self {
        Self { update_id, gesture }
    }

    pub fn from_label(update_id: UpdateId, label: &str) -> Self {
        Self::new(update_id, Gesture::from_label(label))
    }
}

/// Body animation hint that accompanies a speech request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TalkStyle {
    #[default]
    Talk,
    Transition,
    Confused,
}

impl TalkStyle {
    pub fn from_hint(hint: &str) -> Self {
        match hint {
            "confused" => TalkStyle::Confused,
            "transition" => TalkStyle::Transition,
            _ => TalkStyle::Talk,
        }
    }
}
