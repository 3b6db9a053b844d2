//! Presentation poses - a pure function of the phase

use holo_core::Phase;
use serde::Serialize;

/// World-space point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Vec3 { x, y, z }
    }
}

/// Camera eye and look-at point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraTarget {
    pub eye: Vec3,
    pub look: Vec3,
}

/// Fixed camera presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraPreset {
    /// Portrait of the avatar
    Home,
    /// Wide shot of the carousel
    ProductStage,
    /// Close-up of the inspected product
    InspectionStage,
}

impl CameraPreset {
    pub fn target(self) -> CameraTarget {
        match self {
            CameraPreset::Home => CameraTarget {
                eye: Vec3::new(0.0, 1.5, 3.5),
                look: Vec3::new(0.0, 1.6, 0.0),
            },
            CameraPreset::ProductStage => CameraTarget {
                eye: Vec3::new(0.0, 1.8, 6.0),
                look: Vec3::new(3.0, 2.0, 0.0),
            },
            CameraPreset::InspectionStage => CameraTarget {
                eye: Vec3::new(0.0, 1.5, 3.2),
                look: Vec3::new(3.5, 2.0, 0.0),
            },
        }
    }
}

/// What the avatar's legs are doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementIntent {
    #[default]
    Stationary,
    WalkAway,
    WalkToward,
}

/// Avatar offset while walked off stage
pub const OFFSTAGE_OFFSET: f32 = -3.0;
/// Avatar offset while the products have the stage
pub const ASIDE_OFFSET: f32 = -1.2;

/// Everything the renderer needs to place avatar and camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PresentationPose {
    /// Horizontal avatar offset from its home mark
    pub avatar_offset: f32,
    pub avatar_visible: bool,
    pub movement: MovementIntent,
    pub camera: CameraPreset,
}

impl PresentationPose {
    pub fn for_phase(phase: Phase) -> Self {
        let avatar_offset = match phase {
            Phase::Idle | Phase::PostGoodbye | Phase::WalkOn => 0.0,
            Phase::WalkOff => OFFSTAGE_OFFSET,
            _ => ASIDE_OFFSET,
        };
        let movement = match phase {
            Phase::WalkOff => MovementIntent::WalkAway,
            Phase::WalkOn => MovementIntent::WalkToward,
            _ => MovementIntent::Stationary,
        };
        let camera = match phase {
            Phase::Idle | Phase::WalkOff | Phase::PostGoodbye | Phase::WalkOn => CameraPreset::Home,
            Phase::PreCarousel | Phase::Carousel | Phase::Goodbye => CameraPreset::ProductStage,
            Phase::Inspection => CameraPreset::InspectionStage,
        };
        PresentationPose {
            avatar_offset,
            avatar_visible: phase.avatar_visible(),
            movement,
            camera,
        }
    }

    pub fn camera_target(&self) -> CameraTarget {
        self.camera.target()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_phases() {
        assert_eq!(
            PresentationPose::for_phase(Phase::WalkOff).movement,
            MovementIntent::WalkAway
        );
        assert_eq!(
            PresentationPose::for_phase(Phase::WalkOn).movement,
            MovementIntent::WalkToward
        );
        for phase in Phase::ALL {
            if !matches!(phase, Phase::WalkOff | Phase::WalkOn) {
                assert_eq!(
                    PresentationPose::for_phase(phase).movement,
                    MovementIntent::Stationary
                );
            }
        }
    }

    #[test]
    fn test_offsets() {
        assert_eq!(PresentationPose::for_phase(Phase::Idle).avatar_offset, 0.0);
        assert_eq!(PresentationPose::for_phase(Phase::WalkOff).avatar_offset, -3.0);
        assert_eq!(PresentationPose::for_phase(Phase::Carousel).avatar_offset, -1.2);
        assert_eq!(PresentationPose::for_phase(Phase::PostGoodbye).avatar_offset, 0.0);
    }

    #[test]
    fn test_camera_presets() {
        assert_eq!(PresentationPose::for_phase(Phase::Idle).camera, CameraPreset::Home);
        assert_eq!(
            PresentationPose::for_phase(Phase::PreCarousel).camera,
            CameraPreset::ProductStage
        );
        assert_eq!(
            PresentationPose::for_phase(Phase::Inspection).camera,
            CameraPreset::InspectionStage
        );
        assert_eq!(CameraPreset::ProductStage.target().look, Vec3::new(3.0, 2.0, 0.0));
    }

    #[test]
    fn test_visibility_follows_phase() {
        for phase in Phase::ALL {
            assert_eq!(
                PresentationPose::for_phase(phase).avatar_visible,
                phase.avatar_visible()
            );
        }
    }
}
