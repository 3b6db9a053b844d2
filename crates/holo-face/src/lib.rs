//! Holo Face - lip sync as state
//!
//! A viseme track is loaded once per utterance. Every frame the animator
//! samples it against the audio playback clock and produces a plain weight
//! map; a rig adapter applies that map to whatever morph buffers the renderer
//! owns. Animation math never touches the scene graph.

pub mod animator;
pub mod rig;
pub mod track;

pub use animator::*;
pub use rig::*;
pub use track::*;
