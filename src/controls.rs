use serde::Serialize;

use crate::sequencer::SequencerState;
use crate::steps::{Phase, STEPS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayLabel {
    Play,
    Pause,
    Replay,
}

impl PlayLabel {
    pub fn text(self) -> &'static str {
        match self {
            PlayLabel::Play => "▶ Play",
            PlayLabel::Pause => "⏸ Pause",
            PlayLabel::Replay => "↻ Replay",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Controls {
    pub back_enabled: bool,
    pub next_enabled: bool,
    pub play: PlayLabel,
}

impl Controls {
    pub fn for_state(state: &SequencerState) -> Controls {
        let play = if state.is_playing {
            PlayLabel::Pause
        } else if state.at_end() {
            PlayLabel::Replay
        } else {
            PlayLabel::Play
        };
        Controls {
            back_enabled: !state.at_start(),
            next_enabled: !state.at_end(),
            play,
        }
    }
}

/// Look of one marker on the progress strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    Pending,
    Visited,
    Current,
    Backward,
    Update,
}

pub fn progress(state: &SequencerState) -> Vec<Marker> {
    STEPS
        .iter()
        .enumerate()
        .map(|(i, step)| {
            if i > state.current_index {
                return Marker::Pending;
            }
            match step.phase() {
                Phase::Backward => Marker::Backward,
                Phase::Update => Marker::Update,
                _ if i == state.current_index => Marker::Current,
                _ => Marker::Visited,
            }
        })
        .collect()
}
