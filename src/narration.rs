//! What the walkthrough says at each step.

use serde::Serialize;

use crate::model::ScalarModel;
use crate::steps::{Step, StepKey};

/// Colour family of a piece of narration. Front ends pick the actual colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Input,
    Weight,
    Muted,
    Target,
    WeightedSum,
    Activation,
    Loss,
    DlDa,
    DaDz,
    DzDw,
    Gradient,
    Update,
}

/// A labelled number shown as a badge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub label: &'static str,
    pub value: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Narration {
    pub title: &'static str,
    pub lead: String,
    pub formula: Option<String>,
    pub computation: Option<String>,
    pub tone: Tone,
    pub figures: Vec<Figure>,
    pub note: String,
}

fn f4(x: f64) -> String {
    format!("{x:.4}")
}

fn figure(label: &'static str, value: f64, tone: Tone) -> Figure {
    Figure {
        label,
        value: f4(value),
        tone,
    }
}

/// Narration for `step`, filled in with `model`'s numbers.
pub fn narrate(step: &Step, model: &ScalarModel) -> Narration {
    let inputs = model.inputs();
    let base = Narration {
        title: step.title,
        lead: String::new(),
        formula: None,
        computation: None,
        tone: Tone::Muted,
        figures: Vec::new(),
        note: String::new(),
    };

    match step.key {
        StepKey::Overview => Narration {
            lead: "We'll trace one weight through the entire forward and backward pass with real numbers."
                .into(),
            figures: vec![
                figure("Input aᵢ", inputs.a_i, Tone::Input),
                figure("Weight wᵢⱼ", inputs.w_ij, Tone::Weight),
                figure("Bias bⱼ", inputs.b_j, Tone::Muted),
                figure("Target", inputs.target, Tone::Target),
            ],
            note: format!(
                "Other inputs to neuron j contribute {} to the weighted sum.",
                inputs.other_inputs
            ),
            ..base
        },
        StepKey::ForwardZ => Narration {
            lead: "Neuron j computes its weighted sum from all incoming connections:".into(),
            formula: Some("zⱼ = wᵢⱼ · aᵢ + (other inputs) + bⱼ".into()),
            computation: Some(format!(
                "zⱼ = {} × {} + {} + {} = {}",
                inputs.w_ij,
                inputs.a_i,
                inputs.other_inputs,
                inputs.b_j,
                f4(model.z_j())
            )),
            tone: Tone::WeightedSum,
            note: "This is just a linear combination — without an activation function, this is all the neuron could do."
                .into(),
            ..base
        },
        StepKey::ForwardA => Narration {
            lead: "Now we squash zⱼ through the sigmoid activation:".into(),
            formula: Some("aⱼ = σ(zⱼ) = 1 / (1 + e⁻ᶻ)".into()),
            computation: Some(format!(
                "aⱼ = σ({}) = {}",
                f4(model.z_j()),
                f4(model.a_j())
            )),
            tone: Tone::Activation,
            note: "Sigmoid maps any value to (0, 1). This is the nonlinearity that gives hidden layers their power."
                .into(),
            ..base
        },
        StepKey::Loss => Narration {
            lead: "How far off is our prediction? Using MSE loss:".into(),
            formula: Some("L = ½(aⱼ − target)²".into()),
            computation: Some(format!(
                "L = ½({} − {})² = {}",
                f4(model.a_j()),
                inputs.target,
                f4(model.loss())
            )),
            tone: Tone::Loss,
            note: "Now we need to figure out: how should we change wᵢⱼ to make this loss smaller?"
                .into(),
            ..base
        },
        StepKey::DlDa => Narration {
            lead: "Starting from the loss, how sensitive is it to neuron j's output?".into(),
            formula: Some("∂L/∂aⱼ = aⱼ − target".into()),
            computation: Some(format!(
                "∂L/∂aⱼ = {} − {} = {}",
                f4(model.a_j()),
                inputs.target,
                f4(model.dl_da_j())
            )),
            tone: Tone::DlDa,
            note: if model.dl_da_j() < 0.0 {
                "Negative value → our prediction was too low → we need to increase aⱼ to reduce loss."
                    .into()
            } else {
                "Positive value → our prediction was too high → we need to decrease aⱼ to reduce loss."
                    .into()
            },
            ..base
        },
        StepKey::DaDz => Narration {
            lead: "How sensitive is the activation to changes in the pre-activation z?".into(),
            formula: Some("∂aⱼ/∂zⱼ = σ(z) · (1 − σ(z)) = aⱼ · (1 − aⱼ)".into()),
            computation: Some(format!(
                "∂aⱼ/∂zⱼ = {a} × (1 − {a}) = {}",
                f4(model.da_j_dz_j()),
                a = f4(model.a_j())
            )),
            tone: Tone::DaDz,
            note: "This is the sigmoid's derivative. Notice: at extreme values (near 0 or 1), this approaches 0 — the vanishing gradient problem."
                .into(),
            ..base
        },
        StepKey::DzDw => Narration {
            lead: "How sensitive is the weighted sum to this specific weight?".into(),
            formula: Some("zⱼ = wᵢⱼ · aᵢ + ...  →  ∂zⱼ/∂wᵢⱼ = aᵢ".into()),
            computation: Some(format!("∂zⱼ/∂wᵢⱼ = aᵢ = {}", f4(model.dz_j_dw_ij()))),
            tone: Tone::DzDw,
            note: "It's just the input activation! The gradient of a weight is always the upstream neuron's value times the downstream error."
                .into(),
            ..base
        },
        StepKey::Chain => Narration {
            lead: "Now multiply all three terms together:".into(),
            formula: Some("∂L/∂wᵢⱼ = ∂L/∂aⱼ · ∂aⱼ/∂zⱼ · ∂zⱼ/∂wᵢⱼ".into()),
            computation: Some(format!(
                "{} × {} × {} = {}",
                f4(model.dl_da_j()),
                f4(model.da_j_dz_j()),
                f4(model.dz_j_dw_ij()),
                f4(model.dl_dw_ij())
            )),
            tone: Tone::Gradient,
            note: format!(
                "This gradient tells us: nudging wᵢⱼ up slightly will change the loss by ≈ {}.",
                f4(model.dl_dw_ij())
            ),
            ..base
        },
        StepKey::Update => Narration {
            lead: "Finally, step in the direction that reduces loss:".into(),
            formula: Some("wᵢⱼⁿᵉʷ = wᵢⱼ − η · ∂L/∂wᵢⱼ".into()),
            computation: Some(format!(
                "wᵢⱼⁿᵉʷ = {} − {} × ({}) = {}",
                inputs.w_ij,
                model.learning_rate(),
                f4(model.dl_dw_ij()),
                f4(model.w_new())
            )),
            tone: Tone::Update,
            figures: vec![
                figure("Old weight", inputs.w_ij, Tone::Muted),
                figure("New weight", model.w_new(), Tone::Update),
            ],
            note: format!(
                "The weight {} (since gradient was {}) — pushing the prediction closer to the target. Learning rate η = {} controls the step size.",
                if model.w_new() >= inputs.w_ij { "increased" } else { "decreased" },
                if model.dl_dw_ij() < 0.0 { "negative" } else { "positive" },
                model.learning_rate()
            ),
            ..base
        },
    }
}

/// The "Full chain" line shown under every step.
pub fn summary_line(model: &ScalarModel) -> String {
    format!(
        "Full chain: ({:.3}) × ({:.3}) × ({:.3}) = {} → w = {}",
        model.dl_da_j(),
        model.da_j_dz_j(),
        model.dz_j_dw_ij(),
        f4(model.dl_dw_ij()),
        f4(model.w_new())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::STEPS;

    fn narrated(key: StepKey) -> Narration {
        narrate(&STEPS[key.index()], &ScalarModel::reference())
    }

    #[test]
    fn overview_lists_the_inputs() {
        let n = narrated(StepKey::Overview);
        let values: Vec<&str> = n.figures.iter().map(|f| f.value.as_str()).collect();
        assert_eq!(values, ["0.8000", "0.5000", "0.1000", "0.9000"]);
        assert!(n.note.contains("0.3"));
        assert_eq!(n.computation, None);
    }

    #[test]
    fn forward_steps_use_four_decimals() {
        assert_eq!(
            narrated(StepKey::ForwardZ).computation.unwrap(),
            "zⱼ = 0.5 × 0.8 + 0.3 + 0.1 = 0.8000"
        );
        assert_eq!(
            narrated(StepKey::ForwardA).computation.unwrap(),
            "aⱼ = σ(0.8000) = 0.6900"
        );
        assert_eq!(
            narrated(StepKey::Loss).computation.unwrap(),
            "L = ½(0.6900 − 0.9)² = 0.0221"
        );
    }

    #[test]
    fn backward_steps() {
        assert_eq!(
            narrated(StepKey::DlDa).computation.unwrap(),
            "∂L/∂aⱼ = 0.6900 − 0.9 = -0.2100"
        );
        assert!(narrated(StepKey::DlDa).note.starts_with("Negative value"));
        assert_eq!(
            narrated(StepKey::DaDz).computation.unwrap(),
            "∂aⱼ/∂zⱼ = 0.6900 × (1 − 0.6900) = 0.2139"
        );
        assert_eq!(
            narrated(StepKey::DzDw).computation.unwrap(),
            "∂zⱼ/∂wᵢⱼ = aᵢ = 0.8000"
        );
        assert_eq!(
            narrated(StepKey::Chain).computation.unwrap(),
            "-0.2100 × 0.2139 × 0.8000 = -0.0359"
        );
    }

    #[test]
    fn update_step() {
        let n = narrated(StepKey::Update);
        assert_eq!(
            n.computation.unwrap(),
            "wᵢⱼⁿᵉʷ = 0.5 − 0.5 × (-0.0359) = 0.5180"
        );
        assert_eq!(n.figures[1].value, "0.5180");
        assert!(n.note.starts_with("The weight increased (since gradient was negative)"));
    }

    #[test]
    fn every_step_carries_its_title() {
        let model = ScalarModel::reference();
        for step in &STEPS {
            let n = narrate(step, &model);
            assert_eq!(n.title, step.title);
            assert!(!n.lead.is_empty());
            assert!(!n.note.is_empty());
        }
    }

    #[test]
    fn narration_is_deterministic() {
        let model = ScalarModel::reference();
        for step in &STEPS {
            assert_eq!(narrate(step, &model), narrate(step, &model));
        }
    }

    #[test]
    fn summary() {
        assert_eq!(
            summary_line(&ScalarModel::reference()),
            "Full chain: (-0.210) × (0.214) × (0.800) = -0.0359 → w = 0.5180"
        );
    }
}
