//! Scenario simulator
//!
//! Runs a [`PresentationDirector`] against an in-process orchestrator: viseme
//! documents come from a table, commands are recorded, and every phase change
//! lands in a trace that runs can be compared on.

use std::collections::HashMap;
use std::time::Duration;

use holo_choreo::PhaseChange;
use holo_core::{
    HoloError, HoloResult, Phase, SceneTime, StateSnapshot, UtteranceId, VisemeCategory,
};
use holo_face::{VisemeCue, VisemeTrack};
use holo_runtime::{Command, DirectorConfig, Input, PresentationDirector};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::trace;

use crate::{viseme_url_for, ChaosConfig};

/// Default simulated frame
pub const SIM_FRAME: Duration = Duration::from_millis(10);

#[derive(Clone, Debug)]
pub struct ScenarioConfig {
    pub director: DirectorConfig,
    pub chaos: ChaosConfig,
    pub frame: Duration,
    pub seed: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        ScenarioConfig {
            director: DirectorConfig::default(),
            chaos: ChaosConfig::good(),
            frame: SIM_FRAME,
            seed: 0,
        }
    }
}

struct PendingFetch {
    due_tick: u64,
    utterance: UtteranceId,
    result: HoloResult<VisemeTrack>,
}

/// Director plus fake orchestrator
pub struct ScenarioSimulator {
    config: ScenarioConfig,
    director: PresentationDirector,
    rng: StdRng,
    /// Viseme documents by URL
    tracks: HashMap<String, VisemeTrack>,
    pending: Vec<PendingFetch>,
    commands: Vec<Command>,
    trace: Vec<PhaseChange>,
    ticks: u64,
}

impl ScenarioSimulator {
    pub fn new(config: ScenarioConfig) -> Self {
        ScenarioSimulator {
            director: PresentationDirector::with_config(config.director.clone()),
            rng: StdRng::seed_from_u64(config.seed),
            tracks: HashMap::new(),
            pending: Vec::new(),
            commands: Vec::new(),
            trace: Vec::new(),
            ticks: 0,
            config,
        }
    }

    /// Good delivery, default timings
    pub fn good(seed: u64) -> Self {
        Self::new(ScenarioConfig {
            seed,
            ..Default::default()
        })
    }

    /// Reordered and duplicated delivery
    pub fn chaotic(seed: u64) -> Self {
        Self::new(ScenarioConfig {
            seed,
            chaos: ChaosConfig::hostile(),
            ..Default::default()
        })
    }

    /// Serve `track` for speech with the given audio reference
    pub fn with_track(mut self, audio: &str, track: VisemeTrack) -> Self {
        self.tracks.insert(viseme_url_for(audio), track);
        self
    }

    /// Deliver a batch before the next tick
    pub fn deliver(&mut self, batch: Vec<StateSnapshot>) {
        let batch = self.config.chaos.disturb(batch, &mut self.rng);
        for snapshot in batch {
            self.director.queue_input(Input::Snapshot(snapshot));
        }
    }

    /// Advance one frame
    pub fn step(&mut self) {
        self.ticks += 1;
        let ticks = self.ticks;

        let (due, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| p.due_tick <= ticks);
        self.pending = waiting;
        for fetch in due {
            self.director.queue_input(Input::VisemesLoaded {
                utterance: fetch.utterance,
                result: fetch.result,
            });
        }

        let report = self.director.tick(self.config.frame);
        self.trace.extend(report.phase_changes);

        while let Some(command) = self.director.pop_command() {
            self.execute(command);
        }
    }

    /// Advance by at least `duration`
    pub fn run_for(&mut self, duration: Duration) {
        let frames = duration.as_micros().div_ceil(self.config.frame.as_micros().max(1));
        for _ in 0..frames {
            self.step();
        }
    }

    /// Step until `phase` is reached or `limit` elapses; returns whether it was reached
    pub fn run_until(&mut self, phase: Phase, limit: Duration) -> bool {
        let start = self.director.now();
        while self.director.phase() != phase {
            if self.director.now().since(start) >= limit {
                return false;
            }
            self.step();
        }
        true
    }

    fn execute(&mut self, command: Command) {
        trace!(?command, "simulated orchestrator command");
        if let Command::FetchVisemes { utterance, url } = &command {
            let result = self.tracks.get(url).cloned().ok_or_else(|| HoloError::VisemeFetch {
                utterance: *utterance,
                reason: format!("404 {url}"),
            });
            let latency = self.config.chaos.fetch_latency(&mut self.rng);
            self.pending.push(PendingFetch {
                due_tick: self.ticks + u64::from(latency),
                utterance: *utterance,
                result,
            });
        }
        self.commands.push(command);
    }

    pub fn director(&self) -> &PresentationDirector {
        &self.director
    }

    pub fn phase(&self) -> Phase {
        self.director.phase()
    }

    pub fn now(&self) -> SceneTime {
        self.director.now()
    }

    /// Every phase change so far
    pub fn trace(&self) -> &[PhaseChange] {
        &self.trace
    }

    /// Phases entered, in order
    pub fn phases(&self) -> Vec<Phase> {
        self.trace.iter().map(|c| c.to).collect()
    }

    /// Every command the director issued
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn selection(&self) -> Option<usize> {
        self.director.navigation().selected()
    }
}

/// A short two-cue track, 0.1 s long
pub fn short_track() -> VisemeTrack {
    VisemeTrack::new(vec![
        VisemeCue::new(0.0, 0.05, VisemeCategory::A),
        VisemeCue::new(0.05, 0.1, VisemeCategory::D),
    ])
    .unwrap_or_default()
}
