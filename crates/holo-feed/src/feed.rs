//! Snapshot feeds
//!
//! A feed pushes orchestrator snapshots to its subscribers. Payloads are
//! delivered at most once and in increasing `update_id` order; anything not
//! newer than the last delivered payload is swallowed here.

use std::collections::VecDeque;

use holo_core::{StateSnapshot, UpdateId};
use tracing::trace;

/// Subscriber callback
pub type SnapshotCallback = Box<dyn FnMut(StateSnapshot) + Send>;

/// Source of orchestrator snapshots
pub trait GestureFeed {
    /// Register a callback invoked for every delivered snapshot
    fn subscribe(&mut self, callback: SnapshotCallback);
}

/// Tracks the last delivered update id
#[derive(Debug, Clone, Copy, Default)]
pub struct DeliveryFilter {
    last_delivered: Option<UpdateId>,
}

impl DeliveryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Should a payload with `id` be delivered? Records it if so.
    pub fn admit(&mut self, id: UpdateId) -> bool {
        match self.last_delivered {
            Some(last) if !id.is_newer_than(last) => false,
            _ => {
                self.last_delivered = Some(id);
                true
            }
        }
    }

    pub fn last_delivered(&self) -> Option<UpdateId> {
        self.last_delivered
    }
}

/// Fan-out to registered callbacks
#[derive(Default)]
pub struct Subscribers {
    callbacks: Vec<SnapshotCallback>,
}

impl Subscribers {
    pub fn push(&mut self, callback: SnapshotCallback) {
        self.callbacks.push(callback);
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn deliver(&mut self, snapshot: &StateSnapshot) {
        for callback in self.callbacks.iter_mut() {
            callback(snapshot.clone());
        }
    }
}

/// Deterministic feed driven by a script
///
/// Snapshots are emitted on demand, so a test decides exactly when each one
/// reaches the subscribers.
#[derive(Default)]
pub struct ScriptedFeed {
    script: VecDeque<StateSnapshot>,
    filter: DeliveryFilter,
    subscribers: Subscribers,
    delivered: u64,
    suppressed: u64,
}

impl ScriptedFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(script: impl IntoIterator<Item = StateSnapshot>) -> Self {
        ScriptedFeed {
            script: script.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Append to the end of the script
    pub fn enqueue(&mut self, snapshot: StateSnapshot) {
        self.script.push_back(snapshot);
    }

    /// Snapshots not yet emitted
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    /// Emit the next scripted snapshot; `false` once the script is exhausted
    pub fn emit_next(&mut self) -> bool {
        match self.script.pop_front() {
            Some(snapshot) => {
                self.push(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn emit_all(&mut self) {
        while self.emit_next() {}
    }

    /// Deliver a snapshot immediately, bypassing the script
    pub fn push(&mut self, snapshot: StateSnapshot) {
        if self.filter.admit(snapshot.update_id) {
            self.subscribers.deliver(&snapshot);
            self.delivered += 1;
        } else {
            trace!(id = %snapshot.update_id, "scripted snapshot suppressed");
            self.suppressed += 1;
        }
    }

    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }
}

impl GestureFeed for ScriptedFeed {
    fn subscribe(&mut self, callback: SnapshotCallback) {
        self.subscribers.push(callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn collector(feed: &mut impl GestureFeed) -> Arc<Mutex<Vec<u64>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        feed.subscribe(Box::new(move |s: StateSnapshot| {
            sink.lock().unwrap().push(s.update_id.0);
        }));
        seen
    }

    #[test]
    fn test_filter_admits_strictly_newer() {
        let mut filter = DeliveryFilter::new();
        assert!(filter.admit(UpdateId::new(0)));
        assert!(!filter.admit(UpdateId::new(0)));
        assert!(filter.admit(UpdateId::new(3)));
        assert!(!filter.admit(UpdateId::new(2)));
        assert_eq!(filter.last_delivered(), Some(UpdateId::new(3)));
    }

    #[test]
    fn test_scripted_feed_delivers_in_order() {
        let script = [1, 2, 2, 5, 4, 6].map(|id| StateSnapshot::idle(UpdateId::new(id)));
        let mut feed = ScriptedFeed::with_script(script);
        let seen = collector(&mut feed);

        assert!(feed.emit_next());
        assert_eq!(feed.remaining(), 5);
        feed.emit_all();

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 5, 6]);
        assert_eq!(feed.delivered(), 4);
        assert_eq!(feed.suppressed(), 2);
        assert!(!feed.emit_next());
    }

    #[test]
    fn test_every_subscriber_sees_each_snapshot() {
        let mut feed = ScriptedFeed::new();
        let a = collector(&mut feed);
        let b = collector(&mut feed);

        feed.push(StateSnapshot::idle(UpdateId::new(10)));

        assert_eq!(*a.lock().unwrap(), vec![10]);
        assert_eq!(*b.lock().unwrap(), vec![10]);
    }
}
