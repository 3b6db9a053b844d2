//! HTTP polling feed
//!
//! Polls `GET /poll_state` on a fixed cadence and pushes every payload with a
//! new `last_update_id` to the subscribers. Failed polls are logged and
//! skipped; the next tick simply tries again.

use std::sync::Arc;
use std::time::Duration;

use holo_core::StateSnapshot;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, trace, warn};

use crate::{DeliveryFilter, GestureFeed, OrchestratorClient, SnapshotCallback, Subscribers};

/// Default poll cadence
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Counters shared with the poll task
#[derive(Clone, Debug, Default)]
pub struct PollStats {
    pub polls: u64,
    pub delivered: u64,
    pub unchanged: u64,
    pub failures: u64,
}

struct Shared {
    subscribers: Subscribers,
    filter: DeliveryFilter,
    stats: PollStats,
}

/// Feed backed by the orchestrator's poll endpoint
pub struct PollingFeed {
    client: OrchestratorClient,
    interval: Duration,
    shared: Arc<Mutex<Shared>>,
    task: Option<JoinHandle<()>>,
}

impl PollingFeed {
    pub fn new(client: OrchestratorClient) -> Self {
        Self::with_interval(client, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_interval(client: OrchestratorClient, interval: Duration) -> Self {
        PollingFeed {
            client,
            interval,
            shared: Arc::new(Mutex::new(Shared {
                subscribers: Subscribers::default(),
                filter: DeliveryFilter::new(),
                stats: PollStats::default(),
            })),
            task: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn stats(&self) -> PollStats {
        self.shared.lock().stats.clone()
    }

    /// Spawn the poll loop on the current tokio runtime
    ///
    /// Calling this while already running is a no-op.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }

        let client = self.client.clone();
        let shared = Arc::clone(&self.shared);
        let period = self.interval;
        info!(base = %client.base_url(), ?period, "starting state poll");

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut failing = false;

            loop {
                ticker.tick().await;
                let result = client.poll_state().await;
                let mut shared = shared.lock();
                shared.stats.polls += 1;

                match result {
                    Ok(snapshot) => {
                        if failing {
                            info!("state poll recovered");
                            failing = false;
                        }
                        deliver(&mut shared, snapshot);
                    }
                    Err(e) => {
                        shared.stats.failures += 1;
                        // One warning per outage, not one per tick
                        if !e.is_transient() {
                            error!(error = %e, "state poll failed");
                        } else if failing {
                            debug!(error = %e, "state poll still failing");
                        } else {
                            warn!(error = %e, "state poll failed");
                            failing = true;
                        }
                    }
                }
            }
        }));
    }

    /// Abort the poll loop
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("state poll stopped");
        }
    }
}

fn deliver(shared: &mut Shared, snapshot: StateSnapshot) {
    if shared.filter.admit(snapshot.update_id) {
        trace!(id = %snapshot.update_id, "delivering snapshot");
        shared.subscribers.deliver(&snapshot);
        shared.stats.delivered += 1;
    } else {
        shared.stats.unchanged += 1;
    }
}

impl GestureFeed for PollingFeed {
    fn subscribe(&mut self, callback: SnapshotCallback) {
        self.shared.lock().subscribers.push(callback);
    }
}

impl Drop for PollingFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    use axum::extract::State;
    use axum::routing::get;
    use axum::Router;
    use tokio::sync::mpsc;

    /// Mock orchestrator whose update id advances every third poll
    async fn mock_orchestrator() -> String {
        let polls = Arc::new(AtomicU64::new(0));
        let router = Router::new()
            .route(
                "/poll_state",
                get(|State(polls): State<Arc<AtomicU64>>| async move {
                    let n = polls.fetch_add(1, Ordering::SeqCst);
                    format!(r#"{{"status":"IDLE","last_update_id":{}}}"#, n / 3)
                }),
            )
            .with_state(polls);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_polling_feed_delivers_each_id_once() {
        let client = OrchestratorClient::new(mock_orchestrator().await).unwrap();
        let mut feed = PollingFeed::with_interval(client, Duration::from_millis(5));

        let (tx, mut rx) = mpsc::unbounded_channel();
        feed.subscribe(Box::new(move |s: StateSnapshot| {
            let _ = tx.send(s.update_id.0);
        }));
        feed.start();
        assert!(feed.is_running());

        let mut ids = Vec::new();
        while ids.len() < 4 {
            let id = tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .unwrap()
                .unwrap();
            ids.push(id);
        }
        feed.stop();

        assert_eq!(ids, vec![0, 1, 2, 3]);
        let stats = feed.stats();
        assert!(stats.unchanged >= 6);
        assert_eq!(stats.failures, 0);
    }

    #[tokio::test]
    async fn test_unreachable_orchestrator_counts_failures() {
        // Bind then drop to get a port nothing listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = OrchestratorClient::with_timeout(
            format!("http://{addr}"),
            Duration::from_millis(200),
        )
        .unwrap();
        let mut feed = PollingFeed::with_interval(client, Duration::from_millis(5));
        feed.start();

        tokio::time::sleep(Duration::from_millis(100)).await;
        feed.stop();

        let stats = feed.stats();
        assert!(stats.failures >= 1);
        assert_eq!(stats.delivered, 0);
    }
}
