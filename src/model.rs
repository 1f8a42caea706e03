use serde::Serialize;

use crate::activation::{
    half_squared_error, half_squared_error_deriv, sigmoid, sigmoid_deriv_from_output,
};

/// Step size of the single gradient descent update.
pub const LEARNING_RATE: f64 = 0.5;

/// The fixed numbers the walkthrough is built around.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NetworkInputs {
    /// Activation of the upstream neuron i.
    pub a_i: f64,
    /// Weight on the connection i -> j.
    pub w_ij: f64,
    /// Bias of neuron j.
    pub b_j: f64,
    /// Summed `w * a` contribution of every other input into neuron j.
    pub other_inputs: f64,
    pub target: f64,
}

impl NetworkInputs {
    pub const REFERENCE: NetworkInputs = NetworkInputs {
        a_i: 0.8,
        w_ij: 0.5,
        b_j: 0.1,
        other_inputs: 0.3,
        target: 0.9,
    };
}

impl Default for NetworkInputs {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// Forward and backward values for one weight, computed once.
///
/// Every derived field is a pure function of the inputs and the learning rate.
/// There are no setters; build a new model instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScalarModel {
    inputs: NetworkInputs,
    learning_rate: f64,
    z_j: f64,
    a_j: f64,
    loss: f64,
    dl_da_j: f64,
    da_j_dz_j: f64,
    dz_j_dw_ij: f64,
    dl_dw_ij: f64,
    w_new: f64,
}

impl ScalarModel {
    pub fn compute(inputs: NetworkInputs, learning_rate: f64) -> ScalarModel {
        // forward pass
        let z_j = inputs.w_ij * inputs.a_i + inputs.other_inputs + inputs.b_j;
        let a_j = sigmoid(z_j);
        let loss = half_squared_error(a_j, inputs.target);

        // local derivatives along the path w_ij -> z_j -> a_j -> L
        let dl_da_j = half_squared_error_deriv(a_j, inputs.target);
        let da_j_dz_j = sigmoid_deriv_from_output(a_j);
        let dz_j_dw_ij = inputs.a_i;
        let dl_dw_ij = dl_da_j * da_j_dz_j * dz_j_dw_ij;

        let w_new = inputs.w_ij - learning_rate * dl_dw_ij;

        ScalarModel {
            inputs,
            learning_rate,
            z_j,
            a_j,
            loss,
            dl_da_j,
            da_j_dz_j,
            dz_j_dw_ij,
            dl_dw_ij,
            w_new,
        }
    }

    /// The compiled-in example.
    pub fn reference() -> ScalarModel {
        Self::compute(NetworkInputs::REFERENCE, LEARNING_RATE)
    }

    pub fn inputs(&self) -> &NetworkInputs {
        &self.inputs
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn z_j(&self) -> f64 {
        self.z_j
    }

    pub fn a_j(&self) -> f64 {
        self.a_j
    }

    pub fn loss(&self) -> f64 {
        self.loss
    }

    pub fn dl_da_j(&self) -> f64 {
        self.dl_da_j
    }

    pub fn da_j_dz_j(&self) -> f64 {
        self.da_j_dz_j
    }

    pub fn dz_j_dw_ij(&self) -> f64 {
        self.dz_j_dw_ij
    }

    /// The chain rule product `dL/da_j * da_j/dz_j * dz_j/dw_ij`.
    pub fn dl_dw_ij(&self) -> f64 {
        self.dl_dw_ij
    }

    pub fn w_new(&self) -> f64 {
        self.w_new
    }
}

impl Default for ScalarModel {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TOLERANCE: f64 = 1e-3;

    #[test]
    fn reference_forward_pass() {
        let m = ScalarModel::reference();
        assert_relative_eq!(m.z_j(), 0.8, epsilon = 1e-12);
        assert_relative_eq!(m.a_j(), 0.6900, epsilon = TOLERANCE);
        assert_relative_eq!(m.loss(), 0.0221, epsilon = TOLERANCE);
    }

    #[test]
    fn reference_backward_pass() {
        let m = ScalarModel::reference();
        assert_relative_eq!(m.dl_da_j(), -0.2100, epsilon = TOLERANCE);
        assert_relative_eq!(m.da_j_dz_j(), 0.2139, epsilon = TOLERANCE);
        assert_relative_eq!(m.dz_j_dw_ij(), 0.8, epsilon = 1e-12);
        assert_relative_eq!(m.dl_dw_ij(), -0.0359, epsilon = TOLERANCE);
        assert_relative_eq!(m.w_new(), 0.5180, epsilon = TOLERANCE);
    }

    #[test]
    fn chain_rule_product_is_the_product_of_local_terms() {
        let m = ScalarModel::reference();
        let product = m.dl_da_j() * m.da_j_dz_j() * m.dz_j_dw_ij();
        assert_eq!(m.dl_dw_ij(), product);
    }

    #[test]
    fn chain_rule_matches_finite_difference_on_the_weight() {
        let eps = 1e-6;
        let loss_at = |w: f64| {
            let inputs = NetworkInputs {
                w_ij: w,
                ..NetworkInputs::REFERENCE
            };
            ScalarModel::compute(inputs, LEARNING_RATE).loss()
        };
        let w = NetworkInputs::REFERENCE.w_ij;
        let fd = (loss_at(w + eps) - loss_at(w - eps)) / (2.0 * eps);
        assert_relative_eq!(fd, ScalarModel::reference().dl_dw_ij(), epsilon = 1e-8);
    }

    #[test]
    fn update_moves_the_weight_against_the_gradient() {
        let m = ScalarModel::reference();
        // negative gradient, so the weight goes up
        assert!(m.dl_dw_ij() < 0.0);
        assert!(m.w_new() > m.inputs().w_ij);

        let stepped = ScalarModel::compute(
            NetworkInputs {
                w_ij: m.w_new(),
                ..*m.inputs()
            },
            m.learning_rate(),
        );
        assert!(stepped.loss() < m.loss());
    }

    #[test]
    fn compute_is_deterministic() {
        assert_eq!(ScalarModel::reference(), ScalarModel::reference());
        assert_eq!(ScalarModel::default(), ScalarModel::reference());
    }

    #[test]
    fn serializes_every_derived_field() {
        let json = serde_json::to_value(ScalarModel::reference()).unwrap();
        for key in [
            "z_j", "a_j", "loss", "dl_da_j", "da_j_dz_j", "dz_j_dw_ij", "dl_dw_ij", "w_new",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["inputs"]["target"], 0.9);
    }
}
