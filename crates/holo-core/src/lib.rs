//! Holo Core - Fundamental types and primitives
//!
//! This crate defines the core types shared by the presenter crates:
//! - Identifiers (UpdateId, UtteranceId, ItemId)
//! - Time primitive (SceneTime)
//! - Presentation phases
//! - Gestures and gesture events
//! - Visemes and viseme categories
//! - Orchestrator snapshots
//! - Error taxonomy

pub mod id;
pub mod time;
pub mod phase;
pub mod gesture;
pub mod viseme;
pub mod snapshot;
pub mod error;

pub use id::*;
pub use time::*;
pub use phase::*;
pub use gesture::*;
pub use viseme::*;
pub use snapshot::*;
pub use error::*;
