//! Choreography state machine
//!
//! Inputs are serialized through [`ChoreographyMachine::handle`]. The
//! transition function [`transition`] is pure; the machine wraps it with the
//! update-id dedup, the goodbye guard and the single phase timer.

use std::time::Duration;

use holo_core::{Direction, Gesture, GestureEvent, Phase, SceneTime, UpdateId};
use holo_time::{PhaseTimer, TimerExpiry, TimerToken};
use tracing::{debug, info, trace};

use crate::SelectStep;

/// Phase timer durations
///
/// Tuned by eye against the walk animations; kept as named values rather than
/// derived from anything.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseTimings {
    pub walk_off: Duration,
    pub pre_carousel: Duration,
    pub goodbye: Duration,
    pub post_goodbye: Duration,
    pub walk_on: Duration,
}

impl PhaseTimings {
    pub const WALK_OFF: Duration = Duration::from_millis(3000);
    pub const PRE_CAROUSEL: Duration = Duration::from_millis(1000);
    pub const GOODBYE: Duration = Duration::from_millis(2000);
    pub const POST_GOODBYE: Duration = Duration::from_millis(1800);
    pub const WALK_ON: Duration = Duration::from_millis(100);

    /// Timer started on entering `phase`, if any
    pub fn duration_of(&self, phase: Phase) -> Option<Duration> {
        match phase {
            Phase::WalkOff => Some(self.walk_off),
            Phase::PreCarousel => Some(self.pre_carousel),
            Phase::Goodbye => Some(self.goodbye),
            Phase::PostGoodbye => Some(self.post_goodbye),
            Phase::WalkOn => Some(self.walk_on),
            Phase::Idle | Phase::Carousel | Phase::Inspection => None,
        }
    }

    /// Everything compressed, for demos and tests on a wall clock
    pub fn fast() -> Self {
        PhaseTimings {
            walk_off: Duration::from_millis(300),
            pre_carousel: Duration::from_millis(100),
            goodbye: Duration::from_millis(200),
            post_goodbye: Duration::from_millis(180),
            walk_on: Duration::from_millis(10),
        }
    }
}

impl Default for PhaseTimings {
    fn default() -> Self {
        PhaseTimings {
            walk_off: Self::WALK_OFF,
            pre_carousel: Self::PRE_CAROUSEL,
            goodbye: Self::GOODBYE,
            post_goodbye: Self::POST_GOODBYE,
            walk_on: Self::WALK_ON,
        }
    }
}

/// Machine input
#[derive(Clone, Debug, PartialEq)]
pub enum MachineInput {
    Gesture(GestureEvent),
    /// The active utterance finished playing
    SpeechEnded { carousel_requested: bool },
    TimerFired(TimerToken),
}

/// Trigger seen by the pure transition function
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    Swipe(Direction),
    Grab,
    Expand,
    SpeechEnded { carousel_requested: bool },
    TimerElapsed,
}

impl Trigger {
    fn from_gesture(gesture: &Gesture) -> Option<Self> {
        match gesture {
            Gesture::Swipe(d) => Some(Trigger::Swipe(*d)),
            Gesture::Grab => Some(Trigger::Grab),
            Gesture::Expand => Some(Trigger::Expand),
            Gesture::Other(_) => None,
        }
    }
}

/// Side effect requested by a transition
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Return the orchestrator to IDLE
    RequestReset,
    /// Ask the orchestrator for the goodbye line (fire-and-forget)
    RequestGoodbye(UpdateId),
    Select(SelectStep),
    Rotate(Direction),
    /// The phase timer was (re)armed; hosts with their own scheduler echo
    /// the token back as [`MachineInput::TimerFired`] at `deadline`
    ScheduleTimer {
        token: TimerToken,
        deadline: SceneTime,
    },
}

/// Output row of the transition table
#[derive(Clone, Debug, PartialEq)]
pub struct Outcome {
    /// New phase (`None` = stay)
    pub next: Option<Phase>,
    pub effect: Option<Effect>,
}

impl Outcome {
    fn stay(effect: Effect) -> Self {
        Outcome {
            next: None,
            effect: Some(effect),
        }
    }

    fn go(next: Phase) -> Self {
        Outcome {
            next: Some(next),
            effect: None,
        }
    }
}

/// The transition table
///
/// `None` means the trigger is ignored in this phase.
pub fn transition(phase: Phase, trigger: Trigger) -> Option<Outcome> {
    use Phase::*;
    use Trigger::*;

    match (phase, trigger) {
        (Idle, SpeechEnded { carousel_requested: true }) => Some(Outcome::go(WalkOff)),
        (Idle, SpeechEnded { carousel_requested: false }) => {
            Some(Outcome::stay(Effect::RequestReset))
        }
        (WalkOff, TimerElapsed) => Some(Outcome::go(PreCarousel)),
        (PreCarousel, TimerElapsed) => Some(Outcome::go(Carousel)),
        (Carousel, Swipe(Direction::Left)) => Some(Outcome::stay(Effect::Select(SelectStep::Prev))),
        (Carousel, Swipe(Direction::Right)) => {
            Some(Outcome::stay(Effect::Select(SelectStep::Next)))
        }
        (Carousel, Grab) => Some(Outcome::go(Inspection)),
        // The goodbye effect needs the triggering update id; the machine fills it in
        (Carousel, Expand) => Some(Outcome::go(Goodbye)),
        (Inspection, Expand) => Some(Outcome::go(Carousel)),
        (Inspection, Swipe(d)) => Some(Outcome::stay(Effect::Rotate(d))),
        (Goodbye, TimerElapsed) => Some(Outcome::go(PostGoodbye)),
        (PostGoodbye, TimerElapsed) => Some(Outcome::go(WalkOn)),
        (WalkOn, TimerElapsed) => Some(Outcome::go(Idle)),
        _ => None,
    }
}

/// A phase change
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseChange {
    pub from: Phase,
    pub to: Phase,
    pub at: SceneTime,
}

/// Result of one input
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Step {
    pub change: Option<PhaseChange>,
    pub effects: Vec<Effect>,
}

impl Step {
    pub fn is_noop(&self) -> bool {
        self.change.is_none() && self.effects.is_empty()
    }
}

/// Machine statistics
#[derive(Clone, Debug, Default)]
pub struct MachineStats {
    pub gestures_applied: u64,
    pub gestures_ignored: u64,
    pub stale_dropped: u64,
    pub timers_fired: u64,
    pub stale_timers: u64,
    pub transitions: u64,
}

/// The phase controller
pub struct ChoreographyMachine {
    phase: Phase,
    /// When the current phase was entered
    entered_at: SceneTime,
    last_processed: UpdateId,
    last_goodbye: Option<UpdateId>,
    timer: PhaseTimer,
    timings: PhaseTimings,
    stats: MachineStats,
}

impl ChoreographyMachine {
    pub fn new() -> Self {
        Self::with_timings(PhaseTimings::default())
    }

    pub fn with_timings(timings: PhaseTimings) -> Self {
        ChoreographyMachine {
            phase: Phase::Idle,
            entered_at: SceneTime::ZERO,
            last_processed: UpdateId::ZERO,
            last_goodbye: None,
            timer: PhaseTimer::new(),
            timings,
            stats: MachineStats::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn entered_at(&self) -> SceneTime {
        self.entered_at
    }

    pub fn last_processed(&self) -> UpdateId {
        self.last_processed
    }

    pub fn timings(&self) -> &PhaseTimings {
        &self.timings
    }

    pub fn stats(&self) -> &MachineStats {
        &self.stats
    }

    /// Deadline of the pending phase timer
    pub fn timer_deadline(&self) -> Option<SceneTime> {
        self.timer.deadline()
    }

    /// Token of the pending phase timer, for hosts that schedule callbacks
    /// themselves and feed back [`MachineInput::TimerFired`]
    pub fn pending_timer(&self) -> Option<(TimerToken, SceneTime)> {
        self.timer.pending()
    }

    /// Process one input at scene time `now`
    pub fn handle(&mut self, input: MachineInput, now: SceneTime) -> Step {
        match input {
            MachineInput::Gesture(event) => self.on_gesture(event, now),
            MachineInput::SpeechEnded { carousel_requested } => {
                self.apply(Trigger::SpeechEnded { carousel_requested }, now, None)
            }
            MachineInput::TimerFired(token) => {
                if !self.timer.is_current(token) {
                    self.stats.stale_timers += 1;
                    trace!(?token, phase = %self.phase, "stale timer ignored");
                    return Step::default();
                }
                let deadline = self.timer.deadline().unwrap_or(now);
                self.timer.cancel();
                self.on_timer(TimerExpiry { token, deadline })
            }
        }
    }

    /// Fire the phase timer if it is due at `now`
    pub fn poll_timer(&mut self, now: SceneTime) -> Step {
        match self.timer.poll(now) {
            Some(expiry) => self.on_timer(expiry),
            None => Step::default(),
        }
    }

    fn on_timer(&mut self, expiry: TimerExpiry) -> Step {
        self.stats.timers_fired += 1;
        // Chain from the deadline, not the observation time, so a sequence of
        // timers does not drift with the frame rate
        self.apply(Trigger::TimerElapsed, expiry.deadline, None)
    }

    fn on_gesture(&mut self, event: GestureEvent, now: SceneTime) -> Step {
        if !event.update_id.is_newer_than(self.last_processed) {
            self.stats.stale_dropped += 1;
            trace!(id = %event.update_id, last = %self.last_processed, "stale gesture dropped");
            return Step::default();
        }
        self.last_processed = event.update_id;

        if !self.phase.accepts_gestures() {
            self.stats.gestures_ignored += 1;
            trace!(gesture = ?event.gesture, phase = %self.phase, "gesture outside interactive phase");
            return Step::default();
        }

        let Some(trigger) = Trigger::from_gesture(&event.gesture) else {
            self.stats.gestures_ignored += 1;
            return Step::default();
        };

        if trigger == Trigger::Expand && self.phase == Phase::Carousel {
            if self.last_goodbye == Some(event.update_id) {
                self.stats.gestures_ignored += 1;
                return Step::default();
            }
            self.last_goodbye = Some(event.update_id);
        }

        let step = self.apply(trigger, now, Some(event.update_id));
        if step.is_noop() {
            self.stats.gestures_ignored += 1;
            trace!(gesture = ?event.gesture, phase = %self.phase, "gesture ignored");
        } else {
            self.stats.gestures_applied += 1;
        }
        step
    }

    fn apply(&mut self, trigger: Trigger, at: SceneTime, update_id: Option<UpdateId>) -> Step {
        let Some(outcome) = transition(self.phase, trigger) else {
            return Step::default();
        };

        let mut step = Step::default();
        if let Some(effect) = outcome.effect {
            step.effects.push(effect);
        }

        if let Some(next) = outcome.next {
            if next == Phase::Goodbye {
                if let Some(id) = update_id {
                    step.effects.push(Effect::RequestGoodbye(id));
                }
            }
            step.change = Some(self.enter(next, at));
            if let Some((token, deadline)) = self.timer.pending() {
                step.effects.push(Effect::ScheduleTimer { token, deadline });
            }
        }
        step
    }

    fn enter(&mut self, next: Phase, at: SceneTime) -> PhaseChange {
        let from = self.phase;
        self.timer.cancel();
        self.phase = next;
        self.entered_at = at;
        self.stats.transitions += 1;

        if let Some(after) = self.timings.duration_of(next) {
            self.timer.schedule(at, after);
        }

        if next == Phase::Idle || from == Phase::Idle {
            info!(%from, to = %next, at = ?at, "phase change");
        } else {
            debug!(%from, to = %next, at = ?at, "phase change");
        }
        PhaseChange { from, to: next, at }
    }
}

impl Default for ChoreographyMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gesture(id: u64, label: &str) -> MachineInput {
        MachineInput::Gesture(GestureEvent::from_label(UpdateId::new(id), label))
    }

    fn ms(v: u64) -> SceneTime {
        SceneTime::from_millis(v)
    }

    /// Drive the machine into the carousel at t = 4000 ms
    fn in_carousel() -> ChoreographyMachine {
        let mut m = ChoreographyMachine::new();
        m.handle(MachineInput::SpeechEnded { carousel_requested: true }, ms(0));
        m.poll_timer(ms(3000));
        m.poll_timer(ms(4000));
        assert_eq!(m.phase(), Phase::Carousel);
        m
    }

    #[test]
    fn test_carousel_walk_timings() {
        let mut m = ChoreographyMachine::new();
        let step = m.handle(MachineInput::SpeechEnded { carousel_requested: true }, ms(500));
        assert_eq!(step.change.map(|c| c.to), Some(Phase::WalkOff));
        assert!(matches!(step.effects[..], [Effect::ScheduleTimer { .. }]));
        assert_eq!(m.timer_deadline(), Some(ms(3500)));

        assert!(m.poll_timer(ms(3499)).is_noop());
        assert_eq!(m.phase(), Phase::WalkOff);

        let step = m.poll_timer(ms(3500));
        assert_eq!(step.change.map(|c| c.to), Some(Phase::PreCarousel));

        m.poll_timer(ms(4500));
        assert_eq!(m.phase(), Phase::Carousel);
        assert_eq!(m.timer_deadline(), None);
    }

    #[test]
    fn test_late_poll_does_not_drift() {
        let mut m = ChoreographyMachine::new();
        m.handle(MachineInput::SpeechEnded { carousel_requested: true }, ms(0));

        // Observed 40 ms late; the next deadline still chains from 3000
        let step = m.poll_timer(ms(3040));
        assert_eq!(step.change.map(|c| c.at), Some(ms(3000)));
        assert_eq!(m.timer_deadline(), Some(ms(4000)));
    }

    #[test]
    fn test_speech_end_without_carousel_resets() {
        let mut m = ChoreographyMachine::new();
        let step = m.handle(MachineInput::SpeechEnded { carousel_requested: false }, ms(0));
        assert_eq!(step.change, None);
        assert_eq!(step.effects, vec![Effect::RequestReset]);
        assert_eq!(m.phase(), Phase::Idle);
    }

    #[test]
    fn test_speech_end_outside_idle_ignored() {
        let mut m = in_carousel();
        let step = m.handle(MachineInput::SpeechEnded { carousel_requested: true }, ms(5000));
        assert!(step.is_noop());
        assert_eq!(m.phase(), Phase::Carousel);
    }

    #[test]
    fn test_gestures_ignored_outside_interactive_phases() {
        let mut m = ChoreographyMachine::new();
        for (i, label) in ["swipe_left", "grab", "expand", "wave"].iter().enumerate() {
            let step = m.handle(gesture(i as u64 + 1, label), ms(0));
            assert!(step.is_noop());
        }
        assert_eq!(m.phase(), Phase::Idle);
        // Ignored gestures still consume their update id
        assert_eq!(m.last_processed(), UpdateId::new(4));
    }

    #[test]
    fn test_carousel_selection_effects() {
        let mut m = in_carousel();
        let step = m.handle(gesture(1, "swipe_right"), ms(4100));
        assert_eq!(step.effects, vec![Effect::Select(SelectStep::Next)]);
        let step = m.handle(gesture(2, "swipe_left"), ms(4200));
        assert_eq!(step.effects, vec![Effect::Select(SelectStep::Prev)]);
        // Vertical swipes do nothing on the carousel
        assert!(m.handle(gesture(3, "swipe_up"), ms(4300)).is_noop());
    }

    #[test]
    fn test_inspection_round_trip() {
        let mut m = in_carousel();
        let step = m.handle(gesture(1, "grab"), ms(4100));
        assert_eq!(step.change.map(|c| c.to), Some(Phase::Inspection));

        let step = m.handle(gesture(2, "swipe_up"), ms(4200));
        assert_eq!(step.effects, vec![Effect::Rotate(Direction::Up)]);

        // Grab again does nothing while inspecting
        assert!(m.handle(gesture(3, "grab"), ms(4300)).is_noop());

        let step = m.handle(gesture(4, "expand"), ms(4400));
        assert_eq!(step.change.map(|c| c.to), Some(Phase::Carousel));
    }

    #[test]
    fn test_goodbye_sequence() {
        let mut m = in_carousel();
        let step = m.handle(gesture(7, "expand"), ms(5000));
        assert_eq!(step.change.map(|c| c.to), Some(Phase::Goodbye));
        assert_eq!(step.effects[0], Effect::RequestGoodbye(UpdateId::new(7)));
        assert!(matches!(
            step.effects[1],
            Effect::ScheduleTimer { deadline, .. } if deadline == ms(7000)
        ));

        // A second expand while saying goodbye is ignored
        assert!(m.handle(gesture(8, "expand"), ms(5500)).is_noop());

        m.poll_timer(ms(7000));
        assert_eq!(m.phase(), Phase::PostGoodbye);
        m.poll_timer(ms(8800));
        assert_eq!(m.phase(), Phase::WalkOn);
        m.poll_timer(ms(8900));
        assert_eq!(m.phase(), Phase::Idle);
        assert_eq!(m.stats().transitions, 7);
    }

    #[test]
    fn test_duplicate_update_id_is_noop() {
        let mut m = in_carousel();
        m.handle(gesture(3, "swipe_right"), ms(4100));

        assert!(m.handle(gesture(3, "swipe_right"), ms(4200)).is_noop());
        assert!(m.handle(gesture(2, "expand"), ms(4300)).is_noop());
        assert_eq!(m.phase(), Phase::Carousel);
        assert_eq!(m.stats().stale_dropped, 2);
    }

    #[test]
    fn test_stale_timer_token_ignored() {
        let mut m = ChoreographyMachine::new();
        m.handle(MachineInput::SpeechEnded { carousel_requested: true }, ms(0));
        let (walk_off_token, _) = m.pending_timer().unwrap();

        m.handle(MachineInput::TimerFired(walk_off_token), ms(3000));
        assert_eq!(m.phase(), Phase::PreCarousel);

        // Redelivering the old token must not skip PRE_CAROUSEL
        let step = m.handle(MachineInput::TimerFired(walk_off_token), ms(3001));
        assert!(step.is_noop());
        assert_eq!(m.phase(), Phase::PreCarousel);
        assert_eq!(m.stats().stale_timers, 1);
    }

    #[test]
    fn test_transition_table_rejects_unknown_pairs() {
        for phase in Phase::ALL {
            if !matches!(phase, Phase::Carousel) {
                assert_eq!(transition(phase, Trigger::Grab), None);
            }
        }
        assert_eq!(transition(Phase::Carousel, Trigger::TimerElapsed), None);
        assert_eq!(transition(Phase::Inspection, Trigger::TimerElapsed), None);
    }

    proptest::proptest! {
        #[test]
        fn test_every_gesture_accounted_once(
            inputs in proptest::collection::vec(
                (1u64..40, proptest::sample::select(vec!["left", "right", "grab", "up", "expand", "talk"])),
                1..60,
            ),
        ) {
            let mut m = in_carousel();
            let mut newest = 0;
            for (id, label) in &inputs {
                m.handle(gesture(*id, label), ms(5000));
                newest = newest.max(*id);
            }

            let s = m.stats();
            proptest::prop_assert_eq!(
                s.gestures_applied + s.gestures_ignored + s.stale_dropped,
                inputs.len() as u64
            );
            proptest::prop_assert_eq!(m.last_processed(), UpdateId::new(newest));
        }
    }
}
