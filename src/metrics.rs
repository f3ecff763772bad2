//! Metrics.
//!
//! Metrics score predictions; they do not participate in backprop. Scores are
//! per-example, averaging over a batch is up to the caller.

use crate::{Error, Matrix, Result};

/// 1 if the arg-max cell of `y` is the arg-max cell of `t` (row and column), else 0.
pub fn classification_accuracy(y: &Matrix, t: &Matrix) -> Result<u8> {
    if !y.is_column() || !t.is_column() {
        return Err(Error::ShapeMismatch(format!(
            "accuracy inputs must be column vectors, got {}x{} and {}x{}",
            y.height(),
            y.width(),
            t.height(),
            t.width()
        )));
    }
    Ok(u8::from(y.argmax() == t.argmax()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_compares_argmax_cells() {
        let prediction = Matrix::column(&[0.5, 0.2]).unwrap();
        let label0 = Matrix::column(&[1.0, 0.0]).unwrap();
        let label1 = Matrix::column(&[0.0, 1.0]).unwrap();

        assert_eq!(classification_accuracy(&prediction, &label0).unwrap(), 1);
        assert_eq!(classification_accuracy(&prediction, &label1).unwrap(), 0);
    }

    #[test]
    fn accuracy_requires_column_vectors() {
        let row = Matrix::zeros(1, 2).unwrap();
        let c = Matrix::column(&[1.0, 0.0]).unwrap();
        assert!(classification_accuracy(&row, &c).is_err());
        assert!(classification_accuracy(&c, &row).is_err());
    }
}
