//! Step sequencing: the only stateful piece of the walkthrough.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::steps::LAST_STEP;

/// Default wait between two autoplay advances.
pub const AUTOPLAY_DELAY: Duration = Duration::from_millis(3500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SequencerState {
    pub current_index: usize,
    pub is_playing: bool,
}

/// Outcome of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Changed { from: SequencerState, to: SequencerState },
    Unchanged,
}

impl Transition {
    pub fn changed(&self) -> bool {
        matches!(self, Transition::Changed { .. })
    }
}

impl SequencerState {
    pub fn at_start(&self) -> bool {
        self.current_index == 0
    }

    pub fn at_end(&self) -> bool {
        self.current_index >= LAST_STEP
    }
}

/// Owns `SequencerState` and applies the transitions to it.
#[derive(Debug, Default)]
pub struct Sequencer {
    state: SequencerState,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn reset(&mut self) -> Transition {
        self.set(SequencerState {
            current_index: 0,
            is_playing: false,
        })
    }

    pub fn step_back(&mut self) -> Transition {
        if self.state.at_start() {
            return Transition::Unchanged;
        }
        self.set(SequencerState {
            current_index: self.state.current_index - 1,
            is_playing: false,
        })
    }

    pub fn step_forward(&mut self) -> Transition {
        if self.state.at_end() {
            return Transition::Unchanged;
        }
        self.set(SequencerState {
            current_index: self.state.current_index + 1,
            ..self.state
        })
    }

    /// Play / pause, or replay from the start when sitting on the last step.
    pub fn toggle_auto_play(&mut self) -> Transition {
        if self.state.at_end() {
            return self.set(SequencerState {
                current_index: 0,
                is_playing: true,
            });
        }
        self.set(SequencerState {
            is_playing: !self.state.is_playing,
            ..self.state
        })
    }

    pub fn jump_to(&mut self, index: usize) -> Transition {
        self.set(SequencerState {
            current_index: index.min(LAST_STEP),
            is_playing: false,
        })
    }

    /// One autoplay advance. Stops playback instead of moving past the end.
    pub fn tick(&mut self) -> Transition {
        if !self.state.is_playing {
            return Transition::Unchanged;
        }
        if self.state.at_end() {
            return self.set(SequencerState {
                is_playing: false,
                ..self.state
            });
        }
        self.set(SequencerState {
            current_index: self.state.current_index + 1,
            ..self.state
        })
    }

    fn set(&mut self, to: SequencerState) -> Transition {
        let from = self.state;
        self.state = to;
        if from == to {
            Transition::Unchanged
        } else {
            Transition::Changed { from, to }
        }
    }
}

/// A single cancellable deferred tick.
///
/// Holds at most one deadline. Scheduling replaces whatever was pending, so two
/// ticks can never be outstanding for the same timer.
#[derive(Debug, Clone)]
pub struct AutoplayTimer {
    delay: Duration,
    pending: Option<Instant>,
}

impl AutoplayTimer {
    pub fn new(delay: Duration) -> Self {
        AutoplayTimer {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule(&mut self, now: Instant) {
        self.pending = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Consumes the pending tick if its deadline has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(deadline) if now >= deadline => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for AutoplayTimer {
    fn default() -> Self {
        Self::new(AUTOPLAY_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(index: usize, is_playing: bool) -> Sequencer {
        Sequencer {
            state: SequencerState {
                current_index: index,
                is_playing,
            },
        }
    }

    fn state(index: usize, is_playing: bool) -> SequencerState {
        SequencerState {
            current_index: index,
            is_playing,
        }
    }

    #[test]
    fn starts_paused_on_the_first_step() {
        assert_eq!(Sequencer::new().state(), state(0, false));
    }

    #[test]
    fn step_back_at_start_is_a_noop() {
        let mut seq = at(0, true);
        assert_eq!(seq.step_back(), Transition::Unchanged);
        assert_eq!(seq.state(), state(0, true));
    }

    #[test]
    fn step_back_pauses() {
        let mut seq = at(4, true);
        assert!(seq.step_back().changed());
        assert_eq!(seq.state(), state(3, false));
    }

    #[test]
    fn step_forward_at_end_is_a_noop() {
        let mut seq = at(LAST_STEP, false);
        assert_eq!(seq.step_forward(), Transition::Unchanged);
        assert_eq!(seq.state(), state(LAST_STEP, false));
    }

    #[test]
    fn step_forward_keeps_playing_flag() {
        let mut seq = at(2, true);
        seq.step_forward();
        assert_eq!(seq.state(), state(3, true));

        let mut seq = at(2, false);
        seq.step_forward();
        assert_eq!(seq.state(), state(3, false));
    }

    #[test]
    fn toggle_flips_before_the_end() {
        let mut seq = at(3, false);
        seq.toggle_auto_play();
        assert_eq!(seq.state(), state(3, true));
        seq.toggle_auto_play();
        assert_eq!(seq.state(), state(3, false));
    }

    #[test]
    fn toggle_at_end_replays() {
        for playing in [false, true] {
            let mut seq = at(LAST_STEP, playing);
            seq.toggle_auto_play();
            assert_eq!(seq.state(), state(0, true));
        }
    }

    #[test]
    fn jump_clamps_and_pauses() {
        let mut seq = at(2, true);
        seq.jump_to(100);
        assert_eq!(seq.state(), state(LAST_STEP, false));
    }

    #[test]
    fn tick_advances_then_stops_at_the_end() {
        let mut seq = at(LAST_STEP - 1, true);
        seq.tick();
        assert_eq!(seq.state(), state(LAST_STEP, true));
        seq.tick();
        assert_eq!(seq.state(), state(LAST_STEP, false));
        assert_eq!(seq.tick(), Transition::Unchanged);
    }

    #[test]
    fn tick_while_paused_does_nothing() {
        let mut seq = at(1, false);
        assert_eq!(seq.tick(), Transition::Unchanged);
        assert_eq!(seq.state(), state(1, false));
    }

    #[test]
    fn timer_holds_one_deadline() {
        let t0 = Instant::now();
        let mut timer = AutoplayTimer::new(Duration::from_millis(100));
        timer.schedule(t0);
        timer.schedule(t0 + Duration::from_millis(50));
        assert_eq!(timer.deadline(), Some(t0 + Duration::from_millis(150)));

        assert!(!timer.fire_if_due(t0 + Duration::from_millis(100)));
        assert!(timer.fire_if_due(t0 + Duration::from_millis(150)));
        assert!(!timer.is_pending());
        assert!(!timer.fire_if_due(t0 + Duration::from_secs(10)));
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let t0 = Instant::now();
        let mut timer = AutoplayTimer::default();
        timer.schedule(t0);
        timer.cancel();
        assert!(!timer.fire_if_due(t0 + AUTOPLAY_DELAY * 2));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Reset,
        Back,
        Forward,
        Toggle,
        Jump(usize),
        Tick,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Reset),
            Just(Op::Back),
            Just(Op::Forward),
            Just(Op::Toggle),
            (0usize..20).prop_map(Op::Jump),
            Just(Op::Tick),
        ]
    }

    fn apply(seq: &mut Sequencer, op: &Op) -> Transition {
        match op {
            Op::Reset => seq.reset(),
            Op::Back => seq.step_back(),
            Op::Forward => seq.step_forward(),
            Op::Toggle => seq.toggle_auto_play(),
            Op::Jump(i) => seq.jump_to(*i),
            Op::Tick => seq.tick(),
        }
    }

    proptest! {
        #[test]
        fn index_stays_in_range(ops in proptest::collection::vec(op(), 0..64)) {
            let mut seq = Sequencer::new();
            for op in &ops {
                apply(&mut seq, op);
                prop_assert!(seq.state().current_index <= LAST_STEP);
            }
        }

        #[test]
        fn reset_from_anywhere(ops in proptest::collection::vec(op(), 0..64)) {
            let mut seq = Sequencer::new();
            for op in &ops {
                apply(&mut seq, op);
            }
            seq.reset();
            prop_assert_eq!(seq.state(), SequencerState::default());
        }

        #[test]
        fn jump_then_back(i in 0..=LAST_STEP, playing in any::<bool>()) {
            let mut seq = at(0, playing);
            seq.jump_to(i);
            if i > 0 {
                seq.step_back();
                prop_assert_eq!(seq.state(), state(i - 1, false));
            } else {
                prop_assert_eq!(seq.state(), state(0, false));
            }
        }

        #[test]
        fn transition_reports_change(ops in proptest::collection::vec(op(), 1..32)) {
            let mut seq = Sequencer::new();
            for op in &ops {
                let before = seq.state();
                let t = apply(&mut seq, op);
                prop_assert_eq!(t.changed(), before != seq.state());
            }
        }
    }
}
