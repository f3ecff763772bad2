//! Key and slot encoders.
//!
//! Keys become fixed-height column vectors of per-character values scaled into `[0, 1)`
//! by a character window `[min_char, max_char]`. Cells past the end of the key stay 0.
//! The encoding is lossy: keys sharing a prefix sit close together, which is what makes
//! some key sets hard to separate.

use crate::{Error, Matrix, Result};

/// Column vector of height `size` with a single 1 at `index`.
pub fn one_hot(index: usize, size: usize) -> Result<Matrix> {
    let mut m = Matrix::zeros(size, 1)?;
    if index >= size {
        return Err(Error::InvalidDimension(format!(
            "one-hot index {index} out of range for size {size}"
        )));
    }
    m.set(index, 0, 1.0);
    Ok(m)
}

/// Column vector of height `size`; cell `i` is
/// `(key[i] - min_char) / (max_char - min_char + 1)` for each character of `key`.
///
/// Characters are Unicode scalar values. Keys longer than `size` are rejected.
pub fn string_norm(key: &str, size: usize, min_char: u32, max_char: u32) -> Result<Matrix> {
    let mut m = Matrix::zeros(size, 1)?;
    if max_char < min_char {
        return Err(Error::InvalidConfig(format!(
            "character window [{min_char}, {max_char}] is empty"
        )));
    }

    let span = f64::from(max_char - min_char) + 1.0;
    for (i, c) in key.chars().enumerate() {
        if i >= size {
            return Err(Error::InvalidKey(format!(
                "{key:?} does not fit an encoding of {size} characters"
            )));
        }
        let code = f64::from(u32::from(c));
        m.set(i, 0, (code - f64::from(min_char)) / span);
    }
    Ok(m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_hot_sets_single_cell() {
        let m = one_hot(2, 4).unwrap();
        assert_eq!(m, Matrix::column(&[0.0, 0.0, 1.0, 0.0]).unwrap());
        assert!(one_hot(4, 4).is_err());
        assert!(one_hot(0, 0).is_err());
    }

    #[test]
    fn string_norm_scales_and_pads() {
        let m = string_norm("ab", 4, 0, 127).unwrap();
        assert_eq!(m.shape(), (4, 1));
        assert!((m.get(0, 0) - 97.0 / 128.0).abs() < 1e-12);
        assert!((m.get(1, 0) - 98.0 / 128.0).abs() < 1e-12);
        assert_eq!(m.get(2, 0), 0.0);
        assert_eq!(m.get(3, 0), 0.0);
    }

    #[test]
    fn string_norm_values_lie_in_unit_interval() {
        let m = string_norm("0z~", 3, 48, 126).unwrap();
        assert_eq!(m.get(0, 0), 0.0);
        for &v in m.as_slice() {
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn string_norm_is_position_sensitive() {
        let ab = string_norm("ab", 3, 0, 128).unwrap();
        let ba = string_norm("ba", 3, 0, 128).unwrap();
        assert_ne!(ab, ba);
    }

    #[test]
    fn string_norm_rejects_overlong_keys() {
        assert!(matches!(
            string_norm("abc", 2, 0, 128),
            Err(Error::InvalidKey(_))
        ));
    }
}
