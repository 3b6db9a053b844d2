//! Facial animator - samples a viseme track against the playback clock
//!
//! Per frame:
//! 1. Find the cue containing the playback time (none => silence)
//! 2. Ease the progress through the cue into a pulse
//! 3. Map the cue category onto a rig viseme
//! 4. Smooth every viseme weight toward its target (fast)
//! 5. Smooth the jaw toward `jaw_open * pulse` (slow, lags the lips)
//!
//! Without playback every target is zero, so the mouth closes smoothly
//! instead of snapping shut.

use std::collections::BTreeMap;
use std::time::Duration;

use holo_core::{Viseme, JAW_OPEN_TARGET, VISEME_COUNT};
use holo_time::ViewerClock;
use serde::Serialize;

use crate::VisemeTrack;

/// Animator configuration
#[derive(Clone, Debug)]
pub struct AnimatorConfig {
    /// Mouth-shape smoothing rate (1/s), ~50 ms time constant
    pub shape_rate: f32,
    /// Jaw smoothing rate (1/s), ~100 ms time constant
    pub jaw_rate: f32,
    /// Minimum cue span used as the progress divisor (seconds)
    pub min_cue_span: f64,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        AnimatorConfig {
            shape_rate: 20.0,
            jaw_rate: 10.0,
            min_cue_span: 1e-4,
        }
    }
}

/// Symmetric ease-in-out: `2p²` below one half, `1 − 2(1−p)²` above
#[inline]
pub fn ease_in_out(p: f32) -> f32 {
    let p = p.clamp(0.0, 1.0);
    if p < 0.5 {
        2.0 * p * p
    } else {
        let q = 1.0 - p;
        1.0 - 2.0 * q * q
    }
}

/// Exponential smoothing factor for a frame of `dt` at `rate`
#[inline]
pub fn smoothing_factor(dt: Duration, rate: f32) -> f32 {
    1.0 - (-dt.as_secs_f32() * rate).exp()
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Mouth target for one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouthSample {
    /// Active rig viseme (`Sil` when no cue is active)
    pub viseme: Viseme,
    /// Eased progress through the active cue [0.0 - 1.0]
    pub pulse: f32,
}

impl MouthSample {
    pub const SILENCE: MouthSample = MouthSample {
        viseme: Viseme::Sil,
        pulse: 0.0,
    };

    /// Sample a track at playback time `t`
    pub fn at(track: &VisemeTrack, t: f64, min_span: f64) -> Self {
        let Some(cue) = track.cue_at(t) else {
            return Self::SILENCE;
        };
        let span = cue.span().max(min_span);
        let progress = ((t - cue.start) / span).clamp(0.0, 1.0);
        MouthSample {
            viseme: cue.category.viseme(),
            pulse: ease_in_out(progress as f32),
        }
    }

    /// Target weight for one viseme
    #[inline]
    pub fn target(&self, viseme: Viseme) -> f32 {
        if viseme == self.viseme {
            self.pulse
        } else {
            0.0
        }
    }

    /// Target jaw openness
    #[inline]
    pub fn jaw_target(&self) -> f32 {
        self.viseme.jaw_open() * self.pulse
    }
}

/// Smoothed morph weights for one frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnimationWeights {
    visemes: [f32; VISEME_COUNT],
    /// Jaw openness [0.0 - 1.0]
    pub jaw_open: f32,
}

impl AnimationWeights {
    /// Closed mouth
    pub fn neutral() -> Self {
        Self::default()
    }

    #[inline]
    pub fn weight(&self, viseme: Viseme) -> f32 {
        self.visemes[viseme.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Viseme, f32)> + '_ {
        Viseme::ALL.iter().map(move |v| (*v, self.visemes[v.index()]))
    }

    /// Every weight (jaw included) below `epsilon`
    pub fn is_neutral(&self, epsilon: f32) -> bool {
        self.jaw_open < epsilon && self.visemes.iter().all(|w| *w < epsilon)
    }

    /// Morph-target name → weight, jaw included
    pub fn to_morph_map(&self) -> BTreeMap<&'static str, f32> {
        let mut map: BTreeMap<&'static str, f32> =
            self.iter().map(|(v, w)| (v.morph_target(), w)).collect();
        map.insert(JAW_OPEN_TARGET, self.jaw_open);
        map
    }

    /// Step every weight toward `sample`
    fn approach(&mut self, sample: &MouthSample, shape_factor: f32, jaw_factor: f32) {
        for viseme in Viseme::ALL {
            let w = &mut self.visemes[viseme.index()];
            *w = lerp(*w, sample.target(viseme), shape_factor).clamp(0.0, 1.0);
        }
        self.jaw_open = lerp(self.jaw_open, sample.jaw_target(), jaw_factor).clamp(0.0, 1.0);
    }
}

impl Serialize for AnimationWeights {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_morph_map().serialize(serializer)
    }
}

/// Per-frame facial animator
#[derive(Debug, Default)]
pub struct FacialAnimator {
    config: AnimatorConfig,
    track: Option<VisemeTrack>,
    weights: AnimationWeights,
    last_sample: Option<MouthSample>,
}

impl FacialAnimator {
    pub fn new() -> Self {
        Self::with_config(AnimatorConfig::default())
    }

    pub fn with_config(config: AnimatorConfig) -> Self {
        FacialAnimator {
            config,
            track: None,
            weights: AnimationWeights::neutral(),
            last_sample: None,
        }
    }

    /// Install the track for a new utterance, replacing any current one
    pub fn load_track(&mut self, track: VisemeTrack) {
        self.track = Some(track);
    }

    /// Discard the track (utterance ended or superseded)
    pub fn clear_track(&mut self) {
        self.track = None;
    }

    pub fn track(&self) -> Option<&VisemeTrack> {
        self.track.as_ref()
    }

    pub fn has_track(&self) -> bool {
        self.track.is_some()
    }

    pub fn weights(&self) -> &AnimationWeights {
        &self.weights
    }

    /// Sample used by the last update (`None` while decaying)
    pub fn last_sample(&self) -> Option<MouthSample> {
        self.last_sample
    }

    /// Advance one frame against a playback clock
    pub fn update(&mut self, clock: &dyn ViewerClock, dt: Duration) -> &AnimationWeights {
        let position = clock.is_playing().then(|| clock.position());
        self.update_at(position, dt)
    }

    /// Advance one frame; `position` is `None` when audio is paused, ended or absent
    pub fn update_at(&mut self, position: Option<f64>, dt: Duration) -> &AnimationWeights {
        let sample = match (&self.track, position) {
            (Some(track), Some(t)) => Some(MouthSample::at(track, t, self.config.min_cue_span)),
            _ => None,
        };

        let shape = smoothing_factor(dt, self.config.shape_rate);
        let jaw = smoothing_factor(dt, self.config.jaw_rate);
        self.weights
            .approach(&sample.unwrap_or(MouthSample::SILENCE), shape, jaw);
        self.last_sample = sample;
        &self.weights
    }

    /// Drop straight to a closed mouth
    pub fn reset(&mut self) {
        self.weights = AnimationWeights::neutral();
        self.last_sample = None;
    }
}
