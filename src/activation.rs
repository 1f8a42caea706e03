use num_traits::Float;

/// Logistic sigmoid, `1 / (1 + e^-x)`.
pub fn sigmoid<T: Float>(x: T) -> T {
    T::one() / (T::one() + (-x).exp())
}

/// Derivative of the sigmoid written in terms of its output `a = sigmoid(z)`.
pub fn sigmoid_deriv_from_output<T: Float>(a: T) -> T {
    a * (T::one() - a)
}

/// Half squared error, `0.5 * (prediction - target)^2`.
pub fn half_squared_error<T: Float>(prediction: T, target: T) -> T {
    let half = T::one() / (T::one() + T::one());
    let diff = prediction - target;
    half * diff * diff
}

/// d/dprediction of `half_squared_error`. The half cancels the square's 2.
pub fn half_squared_error_deriv<T: Float>(prediction: T, target: T) -> T {
    prediction - target
}
