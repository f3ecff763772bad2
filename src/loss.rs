//! Cost functions.
//!
//! Both costs operate on a single example: `y` is the network output and `t` the target,
//! and both must be column vectors of the same height. The training loop uses:
//!
//! - `Loss::forward` to accumulate the epoch cost
//! - `Loss::derivative` as the error signal fed into the output layer

use crate::{Error, Matrix, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Cost function used while fitting.
pub enum Loss {
    /// Binary cross-entropy averaged over the output cells.
    #[default]
    CrossEntropy,
    /// Mean squared error.
    Mse,
}

impl Loss {
    #[inline]
    pub fn forward(self, y: &Matrix, t: &Matrix) -> Result<f64> {
        match self {
            Loss::CrossEntropy => cross_entropy(y, t),
            Loss::Mse => mse(y, t),
        }
    }

    #[inline]
    pub fn derivative(self, y: &Matrix, t: &Matrix) -> Result<Matrix> {
        match self {
            Loss::CrossEntropy => cross_entropy_derivative(y, t),
            Loss::Mse => mse_derivative(y, t),
        }
    }
}

/// `mean((y - t)^2)`.
pub fn mse(y: &Matrix, t: &Matrix) -> Result<f64> {
    check_columns(y, t)?;
    Ok(y.sub(t)?.powf(2.0).mean())
}

/// `2 (y - t)`.
pub fn mse_derivative(y: &Matrix, t: &Matrix) -> Result<Matrix> {
    check_columns(y, t)?;
    Ok(y.sub(t)?.mul_scalar(2.0))
}

/// `mean(-(t ln(y) + (1 - t) ln(1 - y)))`.
///
/// Saturated outputs (`y` exactly 0 or 1) produce infinite cost.
pub fn cross_entropy(y: &Matrix, t: &Matrix) -> Result<f64> {
    check_columns(y, t)?;
    let t_ln_y = t.mul(&y.ln())?;
    let one_minus_t = t.mul_scalar(-1.0).add_scalar(1.0);
    let ln_one_minus_y = y.mul_scalar(-1.0).add_scalar(1.0).ln();
    Ok(t_ln_y
        .add(&one_minus_t.mul(&ln_one_minus_y)?)?
        .mul_scalar(-1.0)
        .mean())
}

/// `((1 - t) / (1 - y) - t / y) / len(t)`.
pub fn cross_entropy_derivative(y: &Matrix, t: &Matrix) -> Result<Matrix> {
    check_columns(y, t)?;
    let one_minus_t = t.mul_scalar(-1.0).add_scalar(1.0);
    let one_minus_y = y.mul_scalar(-1.0).add_scalar(1.0);
    let t_over_y = t.div(y)?;
    Ok(one_minus_t
        .div(&one_minus_y)?
        .sub(&t_over_y)?
        .div_scalar(t.height() as f64))
}

fn check_columns(y: &Matrix, t: &Matrix) -> Result<()> {
    if !y.is_column() || !t.is_column() {
        return Err(Error::ShapeMismatch(format!(
            "cost inputs must be column vectors, got {}x{} and {}x{}",
            y.height(),
            y.width(),
            t.height(),
            t.width()
        )));
    }
    Ok(())
}
