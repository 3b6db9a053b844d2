//! Orchestrator snapshots
//!
//! The orchestrator exposes its whole state as one payload. `last_update_id`
//! is the dedup key for everything in it, not just the gesture field.

use serde::Deserialize;

use crate::{GestureEvent, ItemId, TalkStyle, UpdateId};

/// Orchestrator status
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum OrchestratorStatus {
    Booting,
    #[default]
    Idle,
    Speaking,
    Other(String),
}

impl OrchestratorStatus {
    pub fn from_label(label: &str) -> Self {
        match label {
            "BOOTING" => OrchestratorStatus::Booting,
            "IDLE" => OrchestratorStatus::Idle,
            "SPEAKING" => OrchestratorStatus::Speaking,
            other => OrchestratorStatus::Other(other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for OrchestratorStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(OrchestratorStatus::from_label(&label))
    }
}

fn default_gesture() -> String {
    "talk".to_string()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_talk<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_gesture))
}

/// One poll payload
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StateSnapshot {
    #[serde(default)]
    pub status: OrchestratorStatus,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub viseme_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub trigger_carousel: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub asins: Vec<ItemId>,
    #[serde(default = "default_gesture", deserialize_with = "null_as_talk")]
    pub gesture: String,
    #[serde(rename = "last_update_id")]
    pub update_id: UpdateId,
}

impl StateSnapshot {
    /// An idle snapshot with no speech and no items
    pub fn idle(update_id: UpdateId) -> Self {
        Self {
            status: OrchestratorStatus::Idle,
            audio_url: None,
            viseme_url: None,
            trigger_carousel: false,
            asins: Vec::new(),
            gesture: default_gesture(),
            update_id,
        }
    }

    /// Gesture event carried by this payload
    pub fn gesture_event(&self) -> GestureEvent {
        GestureEvent::from_label(self.update_id, &self.gesture)
    }

    /// Speech request carried by this payload, if any
    pub fn speech_request(&self) -> Option<SpeechRequest> {
        if self.status != OrchestratorStatus::Speaking {
            return None;
        }
        let audio_url = self.audio_url.as_ref().filter(|u| !u.is_empty())?;
        let viseme_url = self.viseme_url.as_ref().filter(|u| !u.is_empty())?;
        Some(SpeechRequest {
            audio_url: audio_url.clone(),
            viseme_url: viseme_url.clone(),
            style: TalkStyle::from_hint(&self.gesture),
        })
    }
}

/// A request to speak one utterance
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeechRequest {
    /// Audio reference; utterance identity is compared on this
    pub audio_url: String,
    pub viseme_url: String,
    pub style: TalkStyle,
}
