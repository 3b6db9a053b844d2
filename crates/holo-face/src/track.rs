//! Viseme tracks - timed mouth cues for one utterance

use holo_core::{HoloError, HoloResult, VisemeCategory};
use serde::Deserialize;

/// Slack allowed between adjacent cues when checking for overlap
const OVERLAP_TOLERANCE: f64 = 1e-6;

/// One timed mouth cue
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct VisemeCue {
    /// Start in seconds
    pub start: f64,
    /// End in seconds
    pub end: f64,
    #[serde(rename = "value")]
    pub category: VisemeCategory,
}

impl VisemeCue {
    pub fn new(start: f64, end: f64, category: VisemeCategory) -> Self {
        Self { start, end, category }
    }

    #[inline]
    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    /// Inclusive on both ends
    #[inline]
    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }
}

#[derive(Deserialize)]
struct CueDocument {
    #[serde(rename = "mouthCues", default)]
    mouth_cues: Vec<VisemeCue>,
}

/// Ordered, immutable cue list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisemeTrack {
    cues: Vec<VisemeCue>,
}

impl VisemeTrack {
    /// Build a track, checking ordering and spans
    pub fn new(cues: Vec<VisemeCue>) -> HoloResult<Self> {
        for (i, cue) in cues.iter().enumerate() {
            if !cue.start.is_finite() || !cue.end.is_finite() {
                return Err(HoloError::InvalidTrack(format!("cue {i} has a non-finite bound")));
            }
            if cue.end <= cue.start {
                return Err(HoloError::InvalidTrack(format!(
                    "cue {i} does not end after it starts ({} >= {})",
                    cue.start, cue.end
                )));
            }
            if i > 0 {
                let prev = &cues[i - 1];
                if cue.start + OVERLAP_TOLERANCE < prev.end {
                    return Err(HoloError::InvalidTrack(format!(
                        "cue {i} starts at {} before cue {} ends at {}",
                        cue.start,
                        i - 1,
                        prev.end
                    )));
                }
            }
        }
        Ok(Self { cues })
    }

    /// A track with no cues (permanent silence)
    pub fn silent() -> Self {
        Self { cues: Vec::new() }
    }

    /// Parse a cue document: `{"mouthCues": [{"start", "end", "value"}]}`
    pub fn from_json(json: &str) -> HoloResult<Self> {
        let doc: CueDocument =
            serde_json::from_str(json).map_err(|e| HoloError::MalformedPayload(e.to_string()))?;
        Self::new(doc.mouth_cues)
    }

    pub fn from_slice(bytes: &[u8]) -> HoloResult<Self> {
        let doc: CueDocument =
            serde_json::from_slice(bytes).map_err(|e| HoloError::MalformedPayload(e.to_string()))?;
        Self::new(doc.mouth_cues)
    }

    pub fn cues(&self) -> &[VisemeCue] {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// End of the last cue (zero for an empty track)
    pub fn duration(&self) -> f64 {
        self.cues.last().map(|c| c.end).unwrap_or(0.0)
    }

    /// First cue containing `t`
    ///
    /// Cues are sorted and non-overlapping, so ends are sorted too; the first
    /// cue ending at or after `t` is the only candidate for a first match.
    pub fn cue_at(&self, t: f64) -> Option<&VisemeCue> {
        let idx = self.cues.partition_point(|c| c.end < t);
        self.cues.get(idx).filter(|c| c.contains(t))
    }
}
