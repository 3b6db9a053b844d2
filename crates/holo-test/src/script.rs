//! Snapshot scripts
//!
//! Builds orchestrator payloads the way the real service would emit them:
//! every payload gets the next update id.

use holo_core::{ItemId, OrchestratorStatus, StateSnapshot, UpdateId};

/// Stateful builder for a snapshot sequence
#[derive(Debug, Clone, Default)]
pub struct SnapshotScript {
    last_id: u64,
    items: Vec<ItemId>,
}

impl SnapshotScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog carried by every following payload
    pub fn with_items(mut self, items: &[&str]) -> Self {
        self.items = items.iter().map(|s| ItemId::from(*s)).collect();
        self
    }

    pub fn set_items(&mut self, items: &[&str]) {
        self.items = items.iter().map(|s| ItemId::from(*s)).collect();
    }

    pub fn last_id(&self) -> UpdateId {
        UpdateId::new(self.last_id)
    }

    fn next(&mut self) -> StateSnapshot {
        self.last_id += 1;
        let mut snapshot = StateSnapshot::idle(UpdateId::new(self.last_id));
        snapshot.asins = self.items.clone();
        snapshot
    }

    /// Idle payload carrying a gesture label
    pub fn gesture(&mut self, label: &str) -> StateSnapshot {
        let mut snapshot = self.next();
        snapshot.gesture = label.to_string();
        snapshot
    }

    /// Speaking payload; the viseme document lives at `{audio}.json`
    pub fn speak(&mut self, audio: &str, carousel: bool) -> StateSnapshot {
        let mut snapshot = self.next();
        snapshot.status = OrchestratorStatus::Speaking;
        snapshot.audio_url = Some(audio.to_string());
        snapshot.viseme_url = Some(viseme_url_for(audio));
        snapshot.trigger_carousel = carousel;
        snapshot
    }
}

/// Viseme document URL used by scripted speech
pub fn viseme_url_for(audio: &str) -> String {
    format!("{audio}.json")
}
