//! Identity types for the presenter
//!
//! Update ids come from the orchestrator and are the only ordering key for
//! external input. Utterance ids are allocated locally.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Orchestrator update id - monotonic, dedup key for a whole poll payload
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UpdateId(pub u64);

impl UpdateId {
    pub const ZERO: UpdateId = UpdateId(0);

    #[inline]
    pub fn new(id: u64) -> Self {
        UpdateId(id)
    }

    #[inline]
    pub fn next(self) -> Self {
        UpdateId(self.0.saturating_add(1))
    }

    /// True if `self` is strictly newer than `other`
    #[inline]
    pub fn is_newer_than(self, other: UpdateId) -> bool {
        self.0 > other.0
    }
}

impl fmt::Debug for UpdateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Update({})", self.0)
    }
}

impl fmt::Display for UpdateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Utterance identity - one speech playback cycle
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct UtteranceId(pub u64);

impl UtteranceId {
    pub const ZERO: UtteranceId = UtteranceId(0);

    #[inline]
    pub fn new(id: u64) -> Self {
        UtteranceId(id)
    }

    #[inline]
    pub fn next(self) -> Self {
        UtteranceId(self.0 + 1)
    }
}

impl fmt::Debug for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Utterance({})", self.0)
    }
}

/// Opaque catalog item identifier (an ASIN upstream)
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        ItemId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Item({})", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId(s.to_string())
    }
}
