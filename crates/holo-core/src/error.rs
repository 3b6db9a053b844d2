//! Error types for the presenter
//!
//! None of these are fatal to the frame loop. Stale or duplicate input is not
//! an error at all and never reaches this type.

use thiserror::Error;

use crate::UtteranceId;

/// Core presenter errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HoloError {
    // Transient I/O
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    // Asset data
    #[error("Invalid viseme track: {0}")]
    InvalidTrack(String),

    #[error("Viseme fetch failed for {utterance:?}: {reason}")]
    VisemeFetch { utterance: UtteranceId, reason: String },

    // Runtime plumbing
    #[error("Channel closed")]
    ChannelClosed,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl HoloError {
    /// Transient failures are retried on the next poll or fetch opportunity
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            HoloError::Transport(_)
                | HoloError::HttpStatus { .. }
                | HoloError::MalformedPayload(_)
                | HoloError::VisemeFetch { .. }
        )
    }
}

/// Result type for presenter operations
pub type HoloResult<T> = Result<T, HoloError>;
