//! Activation functions.
//!
//! Every transition layer computes a pre-activation `z = W a + b` and then applies the
//! logistic sigmoid element-wise. Backprop needs the derivative evaluated at `z`, so the
//! training loop caches both `z` and `a` per layer.

use crate::Matrix;

/// Logistic sigmoid `1 / (1 + e^-x)`.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    // Numerically stable sigmoid.
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

/// `sigmoid(x) * (1 - sigmoid(x))`.
#[inline]
pub fn sigmoid_derivative(x: f64) -> f64 {
    let s = sigmoid(x);
    s * (1.0 - s)
}

pub fn sigmoid_matrix(m: &Matrix) -> Matrix {
    m.map(sigmoid)
}

pub fn sigmoid_derivative_matrix(m: &Matrix) -> Matrix {
    m.map(sigmoid_derivative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_basic_values() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(10.0) > 0.999);
        assert!(sigmoid(-10.0) < 0.001);
        assert!((sigmoid(2.0) + sigmoid(-2.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn sigmoid_stays_finite_for_extreme_inputs() {
        assert_eq!(sigmoid(1e4), 1.0);
        assert_eq!(sigmoid(-1e4), 0.0);
    }

    #[test]
    fn derivative_peaks_at_zero() {
        assert!((sigmoid_derivative(0.0) - 0.25).abs() < 1e-12);
        assert!(sigmoid_derivative(3.0) < 0.25);
        assert!((sigmoid_derivative(3.0) - sigmoid_derivative(-3.0)).abs() < 1e-12);
    }

    #[test]
    fn matrix_forms_apply_elementwise() {
        let m = Matrix::column(&[0.0, 1.0]).unwrap();
        let s = sigmoid_matrix(&m);
        assert_eq!(s.shape(), (2, 1));
        assert!((s.get(0, 0) - 0.5).abs() < 1e-12);
        assert!((s.get(1, 0) - sigmoid(1.0)).abs() < 1e-12);

        let d = sigmoid_derivative_matrix(&m);
        assert!((d.get(0, 0) - 0.25).abs() < 1e-12);
    }
}
