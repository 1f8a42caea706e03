//! A step-by-step walk through backpropagation's chain rule for one weight of
//! one sigmoid neuron.

pub mod activation;
pub mod config;
pub mod controls;
pub mod error;
pub mod highlight;
pub mod logging;
pub mod model;
pub mod narration;
pub mod sequencer;
pub mod steps;
pub mod text;
pub mod tui;
pub mod walkthrough;

pub use error::{Error, Result};
pub use model::{NetworkInputs, ScalarModel, LEARNING_RATE};
pub use sequencer::{AutoplayTimer, Sequencer, SequencerState, Transition, AUTOPLAY_DELAY};
pub use steps::{Highlight, Phase, Step, StepKey, LAST_STEP, STEPS};
pub use walkthrough::{Command, Snapshot, Walkthrough};
