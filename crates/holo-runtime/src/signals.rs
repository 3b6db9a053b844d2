//! Render signals - everything the renderer reads each frame

use std::collections::BTreeMap;

use holo_choreo::{
    CameraPreset, CameraTarget, CarouselSlot, InspectionRotation, MovementIntent,
    PresentationPose,
};
use holo_core::{ItemId, Phase, TalkStyle, UtteranceId};
use serde::Serialize;

/// Body animation clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyClip {
    #[default]
    Idle,
    Talk,
    Transition,
    Confused,
    WalkAway,
    WalkToward,
}

impl BodyClip {
    pub fn for_style(style: TalkStyle) -> Self {
        match style {
            TalkStyle::Talk => BodyClip::Talk,
            TalkStyle::Transition => BodyClip::Transition,
            TalkStyle::Confused => BodyClip::Confused,
        }
    }

    /// Walking always wins over talking
    pub fn select(movement: MovementIntent, speaking: Option<TalkStyle>) -> Self {
        match movement {
            MovementIntent::WalkAway => BodyClip::WalkAway,
            MovementIntent::WalkToward => BodyClip::WalkToward,
            MovementIntent::Stationary => speaking.map(Self::for_style).unwrap_or(BodyClip::Idle),
        }
    }
}

/// Tick counters exposed alongside the frame state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SignalCounters {
    pub ticks: u64,
    pub snapshots_applied: u64,
    pub utterances_started: u64,
    pub utterances_completed: u64,
    pub utterances_abandoned: u64,
}

/// One frame of presentation state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSignals {
    pub phase: Phase,
    /// Scene time of this frame in milliseconds
    pub scene_time_ms: u64,

    // Avatar
    pub avatar_visible: bool,
    pub avatar_offset: f32,
    pub movement: MovementIntent,
    pub body_clip: BodyClip,
    pub camera: CameraPreset,
    pub camera_target: CameraTarget,

    // Face
    pub morph_weights: BTreeMap<&'static str, f32>,
    pub jaw_open: f32,
    pub speaking: bool,
    pub utterance: Option<UtteranceId>,

    // Products
    pub selected_index: Option<usize>,
    pub carousel_mounted: bool,
    /// Carousel is playing its exit animation
    pub carousel_exiting: bool,
    pub carousel_layout: Vec<CarouselSlot>,
    pub inspection_mounted: bool,
    pub inspected_item: Option<ItemId>,
    pub inspection_rotation: InspectionRotation,

    pub last_error: Option<String>,
    pub counters: SignalCounters,
}

impl RenderSignals {
    /// Signals for a phase with nothing else going on
    pub fn for_phase(phase: Phase) -> Self {
        let pose = PresentationPose::for_phase(phase);
        RenderSignals {
            phase,
            scene_time_ms: 0,
            avatar_visible: pose.avatar_visible,
            avatar_offset: pose.avatar_offset,
            movement: pose.movement,
            body_clip: BodyClip::select(pose.movement, None),
            camera: pose.camera,
            camera_target: pose.camera_target(),
            morph_weights: BTreeMap::new(),
            jaw_open: 0.0,
            speaking: false,
            utterance: None,
            selected_index: None,
            carousel_mounted: phase.carousel_mounted(),
            carousel_exiting: phase == Phase::Goodbye,
            carousel_layout: Vec::new(),
            inspection_mounted: phase == Phase::Inspection,
            inspected_item: None,
            inspection_rotation: InspectionRotation::default(),
            last_error: None,
            counters: SignalCounters::default(),
        }
    }
}

impl Default for RenderSignals {
    fn default() -> Self {
        Self::for_phase(Phase::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_overrides_talk() {
        assert_eq!(
            BodyClip::select(MovementIntent::WalkAway, Some(TalkStyle::Talk)),
            BodyClip::WalkAway
        );
        assert_eq!(
            BodyClip::select(MovementIntent::Stationary, Some(TalkStyle::Confused)),
            BodyClip::Confused
        );
        assert_eq!(BodyClip::select(MovementIntent::Stationary, None), BodyClip::Idle);
    }

    #[test]
    fn test_phase_flags() {
        let goodbye = RenderSignals::for_phase(Phase::Goodbye);
        assert!(goodbye.carousel_mounted);
        assert!(goodbye.carousel_exiting);
        assert!(!goodbye.avatar_visible);

        let inspection = RenderSignals::for_phase(Phase::Inspection);
        assert!(inspection.inspection_mounted);
        assert!(!inspection.carousel_mounted);
        assert_eq!(inspection.camera, CameraPreset::InspectionStage);
    }

    #[test]
    fn test_serializes_to_json() {
        let json = serde_json::to_value(RenderSignals::default()).unwrap();
        assert_eq!(json["phase"], "IDLE");
        assert_eq!(json["body_clip"], "idle");
        assert_eq!(json["camera"], "home");
        assert_eq!(json["selected_index"], serde_json::Value::Null);
    }
}
