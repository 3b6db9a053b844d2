//! Utterance lifecycle
//!
//! One utterance at a time. Identity is the audio reference: the same audio
//! URL is never started twice in a row. A newer request supersedes the active
//! utterance, and any viseme fetch still in flight for the old one is
//! discarded when it lands.

use holo_core::{HoloError, HoloResult, SceneTime, SpeechRequest, TalkStyle, UtteranceId};
use holo_face::VisemeTrack;
use tracing::{debug, info};

/// Where an utterance is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtteranceState {
    /// Waiting for the viseme track
    Fetching,
    /// Track installed, audio playing
    Playing,
}

/// One speech playback cycle
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: UtteranceId,
    pub audio_url: String,
    pub viseme_url: String,
    pub style: TalkStyle,
    pub state: UtteranceState,
    pub requested_at: SceneTime,
}

/// A newly started utterance
#[derive(Debug, Clone, PartialEq)]
pub struct UtteranceStart {
    pub id: UtteranceId,
    pub viseme_url: String,
    /// The utterance this one replaced, if any
    pub superseded: Option<Utterance>,
}

/// Result of a viseme fetch landing
#[derive(Debug)]
pub enum FetchOutcome {
    /// Install the track and start playback of `audio_url`
    Ready {
        track: VisemeTrack,
        audio_url: String,
        style: TalkStyle,
    },
    /// Fetch was for an utterance that is no longer active
    Superseded,
    /// Utterance abandoned
    Failed(HoloError),
}

/// Tracks the active utterance and the last started audio identity
#[derive(Debug, Default)]
pub struct UtteranceLifecycle {
    last_id: UtteranceId,
    last_audio: Option<String>,
    active: Option<Utterance>,
}

impl UtteranceLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&Utterance> {
        self.active.as_ref()
    }

    /// Style of the utterance whose audio is playing
    pub fn playing_style(&self) -> Option<TalkStyle> {
        self.active
            .as_ref()
            .filter(|u| u.state == UtteranceState::Playing)
            .map(|u| u.style)
    }

    pub fn is_playing(&self) -> bool {
        self.playing_style().is_some()
    }

    pub fn last_audio(&self) -> Option<&str> {
        self.last_audio.as_deref()
    }

    /// Offer a speech request; starts an utterance if the audio is new
    pub fn offer(&mut self, request: &SpeechRequest, now: SceneTime) -> Option<UtteranceStart> {
        if self.last_audio.as_deref() == Some(request.audio_url.as_str()) {
            return None;
        }

        self.last_id = self.last_id.next();
        let id = self.last_id;
        self.last_audio = Some(request.audio_url.clone());

        let superseded = self.active.replace(Utterance {
            id,
            audio_url: request.audio_url.clone(),
            viseme_url: request.viseme_url.clone(),
            style: request.style,
            state: UtteranceState::Fetching,
            requested_at: now,
        });
        if let Some(old) = &superseded {
            debug!(old = ?old.id, new = ?id, "utterance superseded");
        }
        info!(utterance = ?id, audio = %request.audio_url, style = ?request.style, "utterance requested");

        Some(UtteranceStart {
            id,
            viseme_url: request.viseme_url.clone(),
            superseded,
        })
    }

    /// A viseme fetch completed
    pub fn on_fetched(&mut self, id: UtteranceId, result: HoloResult<VisemeTrack>) -> FetchOutcome {
        let Some(active) = self.active.as_mut().filter(|u| u.id == id) else {
            return FetchOutcome::Superseded;
        };
        if active.state != UtteranceState::Fetching {
            return FetchOutcome::Superseded;
        }

        match result {
            Ok(track) => {
                active.state = UtteranceState::Playing;
                FetchOutcome::Ready {
                    track,
                    audio_url: active.audio_url.clone(),
                    style: active.style,
                }
            }
            Err(e) => {
                self.active = None;
                // Only transient failures release the identity for a retry;
                // a bad track for the same audio would fail again
                if e.is_transient() {
                    self.last_audio = None;
                }
                FetchOutcome::Failed(e)
            }
        }
    }

    /// Playback reached its end
    pub fn finish(&mut self) -> Option<Utterance> {
        if !self.is_playing() {
            return None;
        }
        let done = self.active.take();
        if let Some(u) = &done {
            info!(utterance = ?u.id, "utterance finished");
        }
        done
    }
}
