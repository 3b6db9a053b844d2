//! Holo Runtime - the presentation director
//!
//! This crate wires the choreography machine, navigation, the facial
//! animator and the utterance lifecycle into one tick loop:
//! - [`PresentationDirector`]: synchronous, non-blocking, deterministic
//! - [`Driver`]: tokio frame ticker, orchestrator polling, command execution
//! - [`RenderSignals`]: what the renderer reads each frame, also served over
//!   HTTP

pub mod config;
pub mod director;
pub mod driver;
pub mod logging;
pub mod server;
pub mod signals;
pub mod utterance;

pub use config::*;
pub use director::*;
pub use driver::*;
pub use logging::*;
pub use server::*;
pub use signals::*;
pub use utterance::*;
