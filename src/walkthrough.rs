//! The walkthrough view: sequencer, autoplay timer and the derived snapshot.
//!
//! Every mutation goes through [`Walkthrough::apply`] or [`Walkthrough::poll`],
//! and both rebuild the snapshot before returning. Readers never observe a
//! state whose narration or highlight is stale.

use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, trace};

use crate::controls::{progress, Controls, Marker};
use crate::error::Error;
use crate::highlight::{direction_banner, highlight, node_sublabel, GraphHighlight, NodeId, NODES};
use crate::model::ScalarModel;
use crate::narration::{narrate, summary_line, Narration};
use crate::sequencer::{AutoplayTimer, Sequencer, SequencerState, Transition};
use crate::steps::{step_at, Step};

/// A user action on the walkthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Reset,
    Back,
    Forward,
    TogglePlay,
    JumpTo(usize),
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "reset" => Ok(Command::Reset),
            "back" | "prev" => Ok(Command::Back),
            "next" | "forward" => Ok(Command::Forward),
            "play" | "pause" | "toggle" => Ok(Command::TogglePlay),
            _ => {
                let index = s
                    .strip_prefix("jump:")
                    .and_then(|i| i.parse::<usize>().ok())
                    .ok_or_else(|| Error::UnknownCommand(s.to_string()))?;
                Ok(Command::JumpTo(index))
            }
        }
    }
}

/// A graph node as drawn: symbol, rounded value and whether it is lit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub id: NodeId,
    pub label: &'static str,
    pub value: String,
    pub active: bool,
}

/// Everything a front end needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub state: SequencerState,
    pub step: &'static Step,
    pub narration: Narration,
    pub graph: GraphHighlight,
    pub nodes: Vec<NodeView>,
    pub controls: Controls,
    pub progress: Vec<Marker>,
    pub banner: Option<&'static str>,
    pub summary: String,
}

impl Snapshot {
    pub fn build(model: &ScalarModel, state: SequencerState) -> Snapshot {
        let step = step_at(state.current_index);
        let graph = highlight(step.highlight);
        let nodes = NODES
            .iter()
            .map(|&id| NodeView {
                id,
                label: id.label(),
                value: node_sublabel(id, model),
                active: graph.is_active(id),
            })
            .collect();
        Snapshot {
            state,
            step,
            narration: narrate(step, model),
            graph,
            nodes,
            controls: Controls::for_state(&state),
            progress: progress(&state),
            banner: direction_banner(state.current_index, step.phase()),
            summary: summary_line(model),
        }
    }
}

pub struct Walkthrough {
    model: ScalarModel,
    sequencer: Sequencer,
    timer: AutoplayTimer,
    snapshot: Snapshot,
    torn_down: bool,
}

impl Walkthrough {
    pub fn new(model: ScalarModel, autoplay_delay: Duration) -> Walkthrough {
        let sequencer = Sequencer::new();
        let snapshot = Snapshot::build(&model, sequencer.state());
        Walkthrough {
            model,
            sequencer,
            timer: AutoplayTimer::new(autoplay_delay),
            snapshot,
            torn_down: false,
        }
    }

    pub fn model(&self) -> &ScalarModel {
        &self.model
    }

    pub fn state(&self) -> SequencerState {
        self.sequencer.state()
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn autoplay_delay(&self) -> Duration {
        self.timer.delay()
    }

    /// When the pending autoplay tick is due, if one is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Applies a user command. When the state changes, any pending tick is
    /// dropped and, if the new state is playing, a fresh one is scheduled from
    /// `now`. No-op commands leave the timer alone.
    pub fn apply(&mut self, command: Command, now: Instant) -> Transition {
        if self.torn_down {
            return Transition::Unchanged;
        }
        let transition = match command {
            Command::Reset => self.sequencer.reset(),
            Command::Back => self.sequencer.step_back(),
            Command::Forward => self.sequencer.step_forward(),
            Command::TogglePlay => self.sequencer.toggle_auto_play(),
            Command::JumpTo(i) => self.sequencer.jump_to(i),
        };
        if let Transition::Changed { from, to } = transition {
            debug!(?command, ?from, ?to, "walkthrough transition");
            self.refresh(now);
        }
        transition
    }

    /// Fires the autoplay tick if it is due. Returns whether the state changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.torn_down || !self.timer.fire_if_due(now) {
            return false;
        }
        let transition = self.sequencer.tick();
        trace!(state = ?self.sequencer.state(), "autoplay tick");
        self.refresh(now);
        transition.changed()
    }

    /// Cancels any pending tick. The walkthrough ignores input afterwards.
    pub fn teardown(&mut self) {
        self.timer.cancel();
        self.torn_down = true;
    }

    fn refresh(&mut self, now: Instant) {
        let state = self.sequencer.state();
        self.timer.cancel();
        if state.is_playing {
            self.timer.schedule(now);
        }
        self.snapshot = Snapshot::build(&self.model, state);
    }
}

impl Drop for Walkthrough {
    fn drop(&mut self) {
        self.teardown();
    }
}
