//! Async driver
//!
//! Runs the director on a tokio frame ticker. Feed snapshots and I/O
//! completions arrive on one mpsc channel and are queued before each tick;
//! outgoing commands are executed on spawned tasks so a slow orchestrator
//! never stalls a frame.

use std::future::Future;

use holo_core::{HoloError, HoloResult};
use holo_feed::{GestureFeed, OrchestratorClient, PollingFeed};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::{shared_signals, Command, DirectorStats, DriverConfig, Input, PresentationDirector, SharedSignals};

pub struct Driver {
    config: DriverConfig,
    client: OrchestratorClient,
    director: PresentationDirector,
    signals: SharedSignals,
}

impl Driver {
    pub fn new(config: DriverConfig) -> HoloResult<Self> {
        let client =
            OrchestratorClient::with_timeout(config.orchestrator_url.clone(), config.request_timeout)?;
        let director = PresentationDirector::with_config(config.director.clone());
        Ok(Driver {
            config,
            client,
            director,
            signals: shared_signals(),
        })
    }

    /// Handle to the published render signals
    pub fn signals(&self) -> SharedSignals {
        SharedSignals::clone(&self.signals)
    }

    /// Run until `shutdown` resolves
    pub async fn run<F>(mut self, shutdown: F) -> HoloResult<DirectorStats>
    where
        F: Future<Output = ()>,
    {
        let (tx, mut rx) = mpsc::channel::<Input>(self.config.channel_capacity);

        let mut feed = PollingFeed::with_interval(self.client.clone(), self.config.poll_interval);
        let feed_tx = tx.clone();
        feed.subscribe(Box::new(move |snapshot| {
            if let Err(TrySendError::Full(_)) = feed_tx.try_send(Input::Snapshot(snapshot)) {
                warn!("input channel full, snapshot dropped");
            }
        }));
        feed.start();

        let mut ticker = tokio::time::interval(self.config.frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);
        info!(
            orchestrator = %self.client.base_url(),
            frame = ?self.config.frame_interval,
            "director running"
        );

        let result = loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown requested");
                    break Ok(());
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.frame(&mut rx, &tx) {
                        break Err(e);
                    }
                }
            }
        };

        feed.stop();
        result.map(|()| self.director.stats().clone())
    }

    fn frame(&mut self, rx: &mut mpsc::Receiver<Input>, tx: &mpsc::Sender<Input>) -> HoloResult<()> {
        loop {
            match rx.try_recv() {
                Ok(input) => self.director.queue_input(input),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Err(HoloError::ChannelClosed),
            }
        }

        self.director.tick_realtime();

        while let Some(command) = self.director.pop_command() {
            spawn_command(self.client.clone(), command, tx.clone());
        }

        *self.signals.write() = self.director.signals().clone();
        Ok(())
    }
}

/// Execute one command off the frame loop
fn spawn_command(client: OrchestratorClient, command: Command, tx: mpsc::Sender<Input>) {
    tokio::spawn(async move {
        match command {
            Command::Reset => {
                if let Err(e) = client.reset_state().await {
                    report_failure("reset", &e);
                }
            }
            Command::Goodbye(update_id) => {
                if let Err(e) = client.generate_goodbye().await {
                    debug!(update = %update_id, "goodbye request not delivered");
                    report_failure("goodbye", &e);
                }
            }
            Command::FetchVisemes { utterance, url } => {
                let result = client.fetch_visemes(&url).await.map_err(|e| match e {
                    HoloError::InvalidTrack(_) => e,
                    other => HoloError::VisemeFetch {
                        utterance,
                        reason: other.to_string(),
                    },
                });
                if tx
                    .send(Input::VisemesLoaded { utterance, result })
                    .await
                    .is_err()
                {
                    debug!(utterance = ?utterance, "driver gone, viseme result dropped");
                }
            }
        }
    });
}

/// Fire-and-forget requests are not retried; only the log level differs
fn report_failure(request: &'static str, e: &HoloError) {
    if e.is_transient() {
        warn!(request, error = %e, "orchestrator request failed");
    } else {
        error!(request, error = %e, "orchestrator request rejected");
    }
}
