//! Property tests across the presenter stack

use std::time::Duration;

use holo_choreo::{ChoreographyMachine, MachineInput, NavigationController, SelectStep};
use holo_core::{GestureEvent, ItemId, Phase, SceneTime, UpdateId, VisemeCategory};
use holo_face::{FacialAnimator, VisemeCue, VisemeTrack};
use proptest::prelude::*;

use crate::{short_track, ChaosConfig, ScenarioConfig, ScenarioSimulator, SnapshotScript};

const LABELS: [&str; 8] = ["left", "right", "up", "down", "grab", "expand", "talk", ""];

fn label() -> impl Strategy<Value = &'static str> {
    prop::sample::select(LABELS.to_vec())
}

fn category() -> impl Strategy<Value = VisemeCategory> {
    prop::sample::select(vec![
        VisemeCategory::A,
        VisemeCategory::B,
        VisemeCategory::C,
        VisemeCategory::D,
        VisemeCategory::E,
        VisemeCategory::F,
        VisemeCategory::G,
        VisemeCategory::H,
        VisemeCategory::X,
    ])
}

/// Drive one session into the carousel, then deliver `batches` of gestures
fn session(
    chaos: ChaosConfig,
    seed: u64,
    batches: &[Vec<&'static str>],
) -> (Vec<Phase>, Option<usize>, UpdateId) {
    let mut sim = ScenarioSimulator::new(ScenarioConfig {
        chaos,
        seed,
        ..Default::default()
    })
    .with_track("intro.wav", short_track());
    let mut script = SnapshotScript::new().with_items(&["B1", "B2", "B3"]);

    sim.deliver(vec![script.speak("intro.wav", true)]);
    sim.run_until(Phase::Carousel, Duration::from_secs(10));
    for batch in batches {
        let batch = batch.iter().map(|l| script.gesture(l)).collect();
        sim.deliver(batch);
        sim.step();
    }
    sim.run_for(Duration::from_secs(5));
    (
        sim.phases(),
        sim.selection(),
        sim.director().machine().last_processed(),
    )
}

/// Phases where the avatar is scripted and gestures must not land
fn scripted_phase() -> impl Strategy<Value = Phase> {
    prop::sample::select(vec![
        Phase::WalkOff,
        Phase::PreCarousel,
        Phase::Goodbye,
        Phase::PostGoodbye,
        Phase::WalkOn,
    ])
}

/// Drive a fresh session until it enters `target`
fn session_in(target: Phase) -> (ScenarioSimulator, SnapshotScript) {
    let mut sim = ScenarioSimulator::good(0).with_track("intro.wav", short_track());
    let mut script = SnapshotScript::new().with_items(&["B1", "B2", "B3"]);

    sim.deliver(vec![script.speak("intro.wav", true)]);
    if matches!(target, Phase::Goodbye | Phase::PostGoodbye | Phase::WalkOn) {
        assert!(sim.run_until(Phase::Carousel, Duration::from_secs(10)));
        sim.deliver(vec![script.gesture("expand")]);
    }
    assert!(sim.run_until(target, Duration::from_secs(10)));
    (sim, script)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_gestures_inert_in_scripted_phases(
        target in scripted_phase(),
        labels in prop::collection::vec(label(), 1..8),
    ) {
        let (mut sim, mut script) = session_in(target);
        let trace_len = sim.trace().len();
        let selection = sim.selection();

        let batch = labels.iter().map(|l| script.gesture(l)).collect();
        sim.deliver(batch);
        sim.step();

        prop_assert_eq!(sim.phase(), target);
        prop_assert_eq!(sim.trace().len(), trace_len);
        prop_assert_eq!(sim.selection(), selection);
        prop_assert_eq!(sim.director().machine().last_processed(), script.last_id());
    }

    #[test]
    fn test_delivery_order_does_not_matter(
        batches in prop::collection::vec(prop::collection::vec(label(), 1..5), 1..6),
        seed in any::<u64>(),
    ) {
        let calm = session(ChaosConfig::good(), 0, &batches);
        let rough = session(ChaosConfig::hostile(), seed, &batches);
        prop_assert_eq!(rough, calm);
    }

    #[test]
    fn test_gestures_ignored_outside_interactive_phases(
        labels in prop::collection::vec(label(), 1..20),
    ) {
        let mut machine = ChoreographyMachine::new();
        let now = SceneTime::from_millis(10);
        for (i, l) in labels.iter().enumerate() {
            let event = GestureEvent::from_label(UpdateId::new(i as u64 + 1), l);
            let step = machine.handle(MachineInput::Gesture(event), now);
            prop_assert!(step.is_noop());
            prop_assert_eq!(machine.phase(), Phase::Idle);
        }
        prop_assert_eq!(machine.last_processed(), UpdateId::new(labels.len() as u64));
    }

    #[test]
    fn test_selection_stays_in_range(
        item_counts in prop::collection::vec(0usize..6, 1..8),
        steps in prop::collection::vec(any::<bool>(), 0..40),
    ) {
        let mut nav = NavigationController::new();
        nav.on_phase_change(Phase::PreCarousel, Phase::Carousel);
        for (round, count) in item_counts.iter().enumerate() {
            let items = (0..*count).map(|i| ItemId::new(format!("R{round}-{i}"))).collect();
            nav.update_items(items);
            for next in &steps {
                let step = if *next { SelectStep::Next } else { SelectStep::Prev };
                let selected = nav.select(step);
                match nav.selected() {
                    Some(i) => prop_assert!(i < *count),
                    None => prop_assert_eq!(*count, 0),
                }
                prop_assert_eq!(selected, nav.selected());
            }
        }
    }

    #[test]
    fn test_weights_stay_normalized(
        cues in prop::collection::vec((1u32..30, category()), 1..20),
        frames in prop::collection::vec(1u64..100, 1..60),
    ) {
        let mut start = 0.0;
        let cues = cues
            .into_iter()
            .map(|(len, c)| {
                let end = start + f64::from(len) * 0.01;
                let cue = VisemeCue::new(start, end, c);
                start = end;
                cue
            })
            .collect();
        let track = VisemeTrack::new(cues).unwrap();
        let mut animator = FacialAnimator::new();
        animator.load_track(track);

        let mut t = 0.0;
        for ms in frames {
            t += ms as f64 / 1000.0;
            let weights = animator.update_at(Some(t), Duration::from_millis(ms));
            for (viseme, w) in weights.iter() {
                prop_assert!((0.0..=1.0).contains(&w), "{:?} = {}", viseme, w);
            }
        }
    }
}
