//! Presentation director - runtime loop implementation
//!
//! The director owns every piece of presentation state and advances it in a
//! single non-blocking tick. I/O never happens here: requests leave through
//! [`PresentationDirector::pop_command`] and their results come back through
//! [`PresentationDirector::queue_input`].

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use holo_choreo::{
    ChoreographyMachine, Effect, MachineInput, NavigationController, PhaseChange, PhaseTimings,
    PresentationPose, Step,
};
use holo_core::{HoloError, HoloResult, Phase, SceneTime, StateSnapshot, UpdateId, UtteranceId};
use holo_face::{AnimatorConfig, FacialAnimator, VisemeTrack};
use holo_time::{FrameClock, PlaybackStatus, SimulatedPlayback, ViewerClock, MAX_FRAME_DELTA};
use tracing::{debug, error, info, trace, warn};

use crate::{BodyClip, FetchOutcome, RenderSignals, SignalCounters, UtteranceLifecycle};

/// Director configuration
#[derive(Clone, Debug)]
pub struct DirectorConfig {
    pub timings: PhaseTimings,
    pub animator: AnimatorConfig,
    /// Largest animation and playback delta applied in one tick
    pub max_frame_delta: Duration,
    /// Maximum queued inputs between ticks
    pub max_queued_inputs: usize,
    /// Maximum outgoing commands awaiting the driver
    pub max_queued_commands: usize,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        DirectorConfig {
            timings: PhaseTimings::default(),
            animator: AnimatorConfig::default(),
            max_frame_delta: MAX_FRAME_DELTA,
            max_queued_inputs: 256,
            max_queued_commands: 64,
        }
    }
}

impl DirectorConfig {
    /// Compressed phase timings for demos
    pub fn fast() -> Self {
        DirectorConfig {
            timings: PhaseTimings::fast(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct DirectorStats {
    pub ticks: u64,
    pub inputs_queued: u64,
    pub inputs_dropped: u64,
    pub snapshots_applied: u64,
    pub snapshots_stale: u64,
    pub phase_changes: u64,
    pub utterances_started: u64,
    pub utterances_completed: u64,
    pub utterances_abandoned: u64,
    pub utterances_superseded: u64,
    pub fetches_discarded: u64,
    pub commands_issued: u64,
    pub commands_dropped: u64,
    pub commands_popped: u64,
    pub last_tick_duration: Duration,
}

/// Input delivered to the director between ticks
#[derive(Debug)]
pub enum Input {
    /// Orchestrator poll payload
    Snapshot(StateSnapshot),
    /// A [`Command::FetchVisemes`] completed
    VisemesLoaded {
        utterance: UtteranceId,
        result: HoloResult<VisemeTrack>,
    },
}

/// Outgoing request for the driver to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `POST /reset_state`
    Reset,
    /// `POST /generate_goodbye`, once per GOODBYE entry
    Goodbye(UpdateId),
    /// `GET url`, reply with [`Input::VisemesLoaded`]
    FetchVisemes { utterance: UtteranceId, url: String },
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub now: SceneTime,
    pub phase_changes: Vec<PhaseChange>,
}

/// The presentation director
pub struct PresentationDirector {
    config: DirectorConfig,
    clock: FrameClock,
    machine: ChoreographyMachine,
    navigation: NavigationController,
    animator: FacialAnimator,
    playback: Box<dyn ViewerClock>,
    utterances: UtteranceLifecycle,
    /// Last applied snapshot
    latest: Option<StateSnapshot>,
    last_applied: Option<UpdateId>,
    /// Incoming inputs
    incoming: VecDeque<Input>,
    /// Outgoing commands
    outgoing: VecDeque<Command>,
    signals: RenderSignals,
    last_error: Option<HoloError>,
    stats: DirectorStats,
}

impl PresentationDirector {
    pub fn new() -> Self {
        Self::with_config(DirectorConfig::default())
    }

    pub fn with_config(config: DirectorConfig) -> Self {
        Self::with_playback(config, Box::new(SimulatedPlayback::new()))
    }

    /// Use an external playback clock (a real audio sink)
    pub fn with_playback(config: DirectorConfig, playback: Box<dyn ViewerClock>) -> Self {
        PresentationDirector {
            clock: FrameClock::with_max_delta(config.max_frame_delta),
            machine: ChoreographyMachine::with_timings(config.timings.clone()),
            navigation: NavigationController::new(),
            animator: FacialAnimator::with_config(config.animator.clone()),
            playback,
            utterances: UtteranceLifecycle::new(),
            latest: None,
            last_applied: None,
            incoming: VecDeque::new(),
            outgoing: VecDeque::new(),
            signals: RenderSignals::default(),
            last_error: None,
            stats: DirectorStats::default(),
            config,
        }
    }

    pub fn config(&self) -> &DirectorConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    pub fn now(&self) -> SceneTime {
        self.clock.now()
    }

    pub fn machine(&self) -> &ChoreographyMachine {
        &self.machine
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    pub fn animator(&self) -> &FacialAnimator {
        &self.animator
    }

    pub fn playback(&self) -> &dyn ViewerClock {
        self.playback.as_ref()
    }

    pub fn utterances(&self) -> &UtteranceLifecycle {
        &self.utterances
    }

    pub fn signals(&self) -> &RenderSignals {
        &self.signals
    }

    pub fn last_error(&self) -> Option<&HoloError> {
        self.last_error.as_ref()
    }

    pub fn stats(&self) -> &DirectorStats {
        &self.stats
    }

    /// Queue an input for the next tick
    pub fn queue_input(&mut self, input: Input) {
        if self.incoming.len() < self.config.max_queued_inputs {
            self.incoming.push_back(input);
            self.stats.inputs_queued += 1;
        } else {
            self.stats.inputs_dropped += 1;
            warn!(limit = self.config.max_queued_inputs, "input queue full, dropping input");
        }
    }

    /// Get next outgoing command (if any)
    pub fn pop_command(&mut self) -> Option<Command> {
        let command = self.outgoing.pop_front();
        if command.is_some() {
            self.stats.commands_popped += 1;
        }
        command
    }

    /// Execute one tick with an explicit frame delta
    pub fn tick(&mut self, dt: Duration) -> TickReport {
        let now = self.clock.advance(dt);
        self.run(now)
    }

    /// Execute one tick against the wall clock
    pub fn tick_realtime(&mut self) -> TickReport {
        let now = self.clock.tick();
        self.run(now)
    }

    fn run(&mut self, now: SceneTime) -> TickReport {
        let start = Instant::now();
        self.stats.ticks += 1;
        let dt = self.clock.last_delta();
        let mut report = TickReport {
            now,
            phase_changes: Vec::new(),
        };

        // Stage 1: Advance clocks (done by the caller)

        // Stage 2: Drain inputs
        let (snapshots, completions) = self.drain_inputs();

        // Stage 3: Fire timers already due, so gestures see the current phase
        self.fire_due_timers(now, &mut report);

        // Stage 4: Apply snapshots in update-id order
        let applied_any = self.apply_snapshots(snapshots, now, &mut report);

        // Stage 5: Viseme fetch completions
        for (utterance, result) in completions {
            self.on_visemes_loaded(utterance, result);
        }

        // Stage 6: Start speech if the latest snapshot asks for it
        if applied_any {
            self.evaluate_speech(now);
        }

        // Stage 7: Advance playback, detect speech end
        self.playback.advance(dt);
        self.check_speech_end(now, &mut report);

        // Stage 8: Fire timers armed or due since stage 3
        self.fire_due_timers(now, &mut report);
        if report
            .phase_changes
            .iter()
            .any(|c| c.to == Phase::Idle && c.from != Phase::Idle)
        {
            // Speech held back while away is picked up from the latest state
            self.evaluate_speech(now);
        }

        // Stage 9: Sample the face
        self.animator.update(self.playback.as_ref(), dt);

        // Stage 10: Publish render signals
        self.publish(now);

        self.stats.last_tick_duration = start.elapsed();
        report
    }

    /// Stage 2: split queued inputs, sort and dedup the snapshots
    fn drain_inputs(
        &mut self,
    ) -> (Vec<StateSnapshot>, Vec<(UtteranceId, HoloResult<VisemeTrack>)>) {
        let mut snapshots = Vec::new();
        let mut completions = Vec::new();
        for input in self.incoming.drain(..) {
            match input {
                Input::Snapshot(s) => snapshots.push(s),
                Input::VisemesLoaded { utterance, result } => completions.push((utterance, result)),
            }
        }
        snapshots.sort_by_key(|s| s.update_id);
        snapshots.dedup_by_key(|s| s.update_id);
        (snapshots, completions)
    }

    /// Run every timer due at `now`, chained deadlines included
    fn fire_due_timers(&mut self, now: SceneTime, report: &mut TickReport) {
        loop {
            let step = self.machine.poll_timer(now);
            if step.is_noop() {
                break;
            }
            self.apply_step(step, report);
        }
    }

    /// Stage 4: apply snapshots; returns whether any was new
    fn apply_snapshots(
        &mut self,
        snapshots: Vec<StateSnapshot>,
        now: SceneTime,
        report: &mut TickReport,
    ) -> bool {
        let mut applied = false;
        for snapshot in snapshots {
            let id = snapshot.update_id;
            if self.last_applied.is_some_and(|last| !id.is_newer_than(last)) {
                self.stats.snapshots_stale += 1;
                trace!(id = %id, "stale snapshot dropped");
                continue;
            }
            self.last_applied = Some(id);
            self.stats.snapshots_applied += 1;
            applied = true;

            self.navigation.update_items(snapshot.asins.clone());
            let step = self
                .machine
                .handle(MachineInput::Gesture(snapshot.gesture_event()), now);
            self.apply_step(step, report);
            self.latest = Some(snapshot);
        }
        applied
    }

    fn on_visemes_loaded(&mut self, utterance: UtteranceId, result: HoloResult<VisemeTrack>) {
        match self.utterances.on_fetched(utterance, result) {
            FetchOutcome::Ready {
                track,
                audio_url,
                style,
            } => {
                let duration = track.duration();
                self.animator.load_track(track);
                self.playback.load(&audio_url, duration);
                self.playback.play();
                self.stats.utterances_started += 1;
                info!(utterance = ?utterance, duration, ?style, "utterance playing");
            }
            FetchOutcome::Superseded => {
                self.stats.fetches_discarded += 1;
                debug!(utterance = ?utterance, "viseme track for superseded utterance discarded");
            }
            FetchOutcome::Failed(e) => {
                self.stats.utterances_abandoned += 1;
                error!(utterance = ?utterance, error = %e, "utterance abandoned");
                self.last_error = Some(e);
            }
        }
    }

    /// Stage 6: start an utterance from the latest snapshot
    fn evaluate_speech(&mut self, now: SceneTime) {
        if !self.machine.phase().permits_speech() {
            return;
        }
        let Some(request) = self.latest.as_ref().and_then(|s| s.speech_request()) else {
            return;
        };
        let Some(start) = self.utterances.offer(&request, now) else {
            return;
        };

        if let Some(old) = start.superseded {
            self.stats.utterances_superseded += 1;
            if self.playback.source() == Some(old.audio_url.as_str()) {
                self.playback.stop();
            }
            self.animator.clear_track();
        }
        self.push_command(Command::FetchVisemes {
            utterance: start.id,
            url: start.viseme_url,
        });
    }

    /// Stage 7: raise speech-ended once playback reaches its end
    fn check_speech_end(&mut self, now: SceneTime, report: &mut TickReport) {
        if !self.utterances.is_playing() || self.playback.status() != PlaybackStatus::Ended {
            return;
        }
        let Some(done) = self.utterances.finish() else {
            return;
        };
        self.stats.utterances_completed += 1;
        self.animator.clear_track();
        self.playback.stop();

        let carousel_requested = self
            .latest
            .as_ref()
            .is_some_and(|s| s.trigger_carousel);
        debug!(utterance = ?done.id, carousel_requested, "speech ended");
        let step = self
            .machine
            .handle(MachineInput::SpeechEnded { carousel_requested }, now);
        self.apply_step(step, report);
    }

    fn apply_step(&mut self, step: Step, report: &mut TickReport) {
        if let Some(change) = step.change {
            self.navigation.on_phase_change(change.from, change.to);
            self.stats.phase_changes += 1;
            report.phase_changes.push(change);
        }
        for effect in step.effects {
            match effect {
                Effect::RequestReset => self.push_command(Command::Reset),
                Effect::RequestGoodbye(id) => self.push_command(Command::Goodbye(id)),
                Effect::Select(select) => {
                    self.navigation.select(select);
                }
                Effect::Rotate(direction) => self.navigation.rotate(direction),
                Effect::ScheduleTimer { deadline, .. } => {
                    trace!(deadline = ?deadline, "phase timer armed");
                }
            }
        }
    }

    fn push_command(&mut self, command: Command) {
        if self.outgoing.len() < self.config.max_queued_commands {
            trace!(?command, "command queued");
            self.outgoing.push_back(command);
            self.stats.commands_issued += 1;
        } else {
            self.stats.commands_dropped += 1;
            warn!(?command, "command queue full, dropping command");
        }
    }

    /// Stage 10: rebuild the render signals
    fn publish(&mut self, now: SceneTime) {
        let phase = self.machine.phase();
        let pose = PresentationPose::for_phase(phase);
        let weights = self.animator.weights();
        let playing = self.utterances.playing_style();

        let mut signals = RenderSignals::for_phase(phase);
        signals.scene_time_ms = now.as_millis();
        signals.body_clip = BodyClip::select(pose.movement, playing);
        signals.morph_weights = weights.to_morph_map();
        signals.jaw_open = weights.jaw_open;
        signals.speaking = playing.is_some();
        signals.utterance = self.utterances.active().map(|u| u.id);
        signals.selected_index = self.navigation.selected();
        if signals.carousel_mounted {
            signals.carousel_layout = self.navigation.carousel_layout();
        }
        if signals.inspection_mounted {
            signals.inspected_item = self.navigation.selected_item().cloned();
            signals.inspection_rotation = self.navigation.rotation();
        }
        signals.last_error = self.last_error.as_ref().map(|e| e.to_string());
        signals.counters = SignalCounters {
            ticks: self.stats.ticks,
            snapshots_applied: self.stats.snapshots_applied,
            utterances_started: self.stats.utterances_started,
            utterances_completed: self.stats.utterances_completed,
            utterances_abandoned: self.stats.utterances_abandoned,
        };
        self.signals = signals;
    }
}

impl Default for PresentationDirector {
    fn default() -> Self {
        Self::new()
    }
}
