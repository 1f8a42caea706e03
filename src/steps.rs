use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "&'static str")]
pub enum StepKey {
    Overview,
    ForwardZ,
    ForwardA,
    Loss,
    DlDa,
    DaDz,
    DzDw,
    Chain,
    Update,
}

/// Which derived quantity a step is about. Drives the graph highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "&'static str")]
pub enum Highlight {
    All,
    Z,
    A,
    Loss,
    DlDa,
    DaDz,
    DzDw,
    Chain,
    Update,
}

/// Coarse grouping of steps, used for colouring and the direction banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Setup,
    Forward,
    Backward,
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Step {
    pub key: StepKey,
    pub title: &'static str,
    pub highlight: Highlight,
}

impl Step {
    pub fn phase(&self) -> Phase {
        self.key.phase()
    }
}

pub const STEPS: [Step; 9] = [
    Step {
        key: StepKey::Overview,
        title: "The Setup",
        highlight: Highlight::All,
    },
    Step {
        key: StepKey::ForwardZ,
        title: "Step 1: Compute Weighted Sum (zⱼ)",
        highlight: Highlight::Z,
    },
    Step {
        key: StepKey::ForwardA,
        title: "Step 2: Apply Activation (aⱼ)",
        highlight: Highlight::A,
    },
    Step {
        key: StepKey::Loss,
        title: "Step 3: Compute Loss",
        highlight: Highlight::Loss,
    },
    Step {
        key: StepKey::DlDa,
        title: "Step 4: ∂L/∂aⱼ — How does loss change with activation?",
        highlight: Highlight::DlDa,
    },
    Step {
        key: StepKey::DaDz,
        title: "Step 5: ∂aⱼ/∂zⱼ — How does activation change with z?",
        highlight: Highlight::DaDz,
    },
    Step {
        key: StepKey::DzDw,
        title: "Step 6: ∂zⱼ/∂wᵢⱼ — How does z change with this weight?",
        highlight: Highlight::DzDw,
    },
    Step {
        key: StepKey::Chain,
        title: "Step 7: Multiply — The Chain Rule",
        highlight: Highlight::Chain,
    },
    Step {
        key: StepKey::Update,
        title: "Step 8: Update the Weight",
        highlight: Highlight::Update,
    },
];

pub const LAST_STEP: usize = STEPS.len() - 1;

/// The step at `index`, clamped to the table.
pub fn step_at(index: usize) -> &'static Step {
    &STEPS[index.min(LAST_STEP)]
}

impl StepKey {
    pub const ALL: [StepKey; 9] = [
        StepKey::Overview,
        StepKey::ForwardZ,
        StepKey::ForwardA,
        StepKey::Loss,
        StepKey::DlDa,
        StepKey::DaDz,
        StepKey::DzDw,
        StepKey::Chain,
        StepKey::Update,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StepKey::Overview => "overview",
            StepKey::ForwardZ => "forward_z",
            StepKey::ForwardA => "forward_a",
            StepKey::Loss => "loss",
            StepKey::DlDa => "dL_da",
            StepKey::DaDz => "da_dz",
            StepKey::DzDw => "dz_dw",
            StepKey::Chain => "chain",
            StepKey::Update => "update",
        }
    }

    pub fn phase(self) -> Phase {
        match self {
            StepKey::Overview => Phase::Setup,
            StepKey::ForwardZ | StepKey::ForwardA | StepKey::Loss => Phase::Forward,
            StepKey::DlDa | StepKey::DaDz | StepKey::DzDw | StepKey::Chain => Phase::Backward,
            StepKey::Update => Phase::Update,
        }
    }

    /// Position of this key in `STEPS`.
    pub fn index(self) -> usize {
        STEPS
            .iter()
            .position(|s| s.key == self)
            .unwrap_or_default()
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<StepKey> for &'static str {
    fn from(key: StepKey) -> Self {
        key.as_str()
    }
}

impl FromStr for StepKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StepKey::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownStep(s.to_string()))
    }
}

impl Highlight {
    pub fn as_str(self) -> &'static str {
        match self {
            Highlight::All => "all",
            Highlight::Z => "z",
            Highlight::A => "a",
            Highlight::Loss => "loss",
            Highlight::DlDa => "dL_da",
            Highlight::DaDz => "da_dz",
            Highlight::DzDw => "dz_dw",
            Highlight::Chain => "chain",
            Highlight::Update => "update",
        }
    }
}

impl From<Highlight> for &'static str {
    fn from(tag: Highlight) -> Self {
        tag.as_str()
    }
}

/// Resolves a CLI step argument: either an index or a step key.
pub fn parse_step(arg: &str) -> Result<usize, Error> {
    match arg.trim().parse::<usize>() {
        Ok(i) => Ok(i.min(LAST_STEP)),
        Err(_) => arg.parse::<StepKey>().map(StepKey::index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nine_steps_in_walkthrough_order() {
        let keys: Vec<&str> = STEPS.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(
            keys,
            [
                "overview", "forward_z", "forward_a", "loss", "dL_da", "da_dz", "dz_dw", "chain",
                "update"
            ]
        );
        assert_eq!(LAST_STEP, 8);
    }

    #[test]
    fn keys_are_unique_and_indexed() {
        for (i, step) in STEPS.iter().enumerate() {
            assert_eq!(step.key.index(), i);
            assert_eq!(StepKey::ALL[i], step.key);
        }
    }

    #[test]
    fn phases() {
        let phases: Vec<Phase> = STEPS.iter().map(Step::phase).collect();
        assert_eq!(phases[0], Phase::Setup);
        assert!(phases[1..4].iter().all(|p| *p == Phase::Forward));
        assert!(phases[4..8].iter().all(|p| *p == Phase::Backward));
        assert_eq!(phases[8], Phase::Update);
    }

    #[test]
    fn step_at_clamps() {
        assert_eq!(step_at(0).key, StepKey::Overview);
        assert_eq!(step_at(99).key, StepKey::Update);
    }

    #[test]
    fn parse_step_accepts_index_or_key() {
        assert_eq!(parse_step("3").unwrap(), 3);
        assert_eq!(parse_step("42").unwrap(), LAST_STEP);
        assert_eq!(parse_step("chain").unwrap(), 7);
        assert_eq!(parse_step("DL_DA").unwrap(), 4);
        assert!(matches!(parse_step("backprop"), Err(Error::UnknownStep(_))));
    }

    #[test]
    fn serializes_keys_by_name() {
        let json = serde_json::to_value(STEPS[4]).unwrap();
        assert_eq!(json["key"], "dL_da");
        assert_eq!(json["highlight"], "dL_da");
    }
}
