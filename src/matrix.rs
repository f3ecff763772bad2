//! Dense 2-D matrix.
//!
//! `Matrix` is the numeric container used by the network and the encoders. Values are
//! `f64` and stored row-major. Operations return new matrices; the only public in-place
//! mutations are [`Matrix::add_into`] / [`Matrix::sub_into`] (gradient accumulation and
//! the descent step). Cell writes stay inside the crate.
//!
//! Binary element-wise operations require identical shapes, `product` requires
//! `lhs.width == rhs.height`; both report [`Error::ShapeMismatch`] otherwise.

use std::fmt;

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    height: usize,
    width: usize,
    /// Row-major, `height * width` entries.
    values: Vec<f64>,
}

impl Matrix {
    /// Zero-filled matrix.
    pub fn zeros(height: usize, width: usize) -> Result<Self> {
        Self::constant(height, width, 0.0)
    }

    /// Matrix with every cell set to `value`.
    pub fn constant(height: usize, width: usize, value: f64) -> Result<Self> {
        check_dims(height, width)?;
        Ok(Self {
            height,
            width,
            values: vec![value; height * width],
        })
    }

    /// Matrix of independent draws from the standard normal distribution.
    pub fn random<R: Rng + ?Sized>(height: usize, width: usize, rng: &mut R) -> Result<Self> {
        check_dims(height, width)?;
        let values = (0..height * width)
            .map(|_| -> f64 { StandardNormal.sample(&mut *rng) })
            .collect();
        Ok(Self {
            height,
            width,
            values,
        })
    }

    pub fn identity(size: usize) -> Result<Self> {
        let mut m = Self::zeros(size, size)?;
        for i in 0..size {
            m.set(i, i, 1.0);
        }
        Ok(m)
    }

    /// Column vector (`values.len() x 1`).
    pub fn column(values: &[f64]) -> Result<Self> {
        Self::from_vec(values.len(), 1, values.to_vec())
    }

    /// Build from a flat row-major buffer.
    pub fn from_vec(height: usize, width: usize, values: Vec<f64>) -> Result<Self> {
        check_dims(height, width)?;
        if values.len() != height * width {
            return Err(Error::ShapeMismatch(format!(
                "{} values do not fill a {height}x{width} matrix",
                values.len()
            )));
        }
        Ok(Self {
            height,
            width,
            values,
        })
    }

    /// Build from literal rows. Every row must have the same length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        check_dims(height, width)?;

        let mut values = Vec::with_capacity(height * width);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(Error::ShapeMismatch(format!(
                    "row {i} has len {}, expected {width}",
                    row.len()
                )));
            }
            values.extend_from_slice(row);
        }
        Self::from_vec(height, width, values)
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// `(height, width)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    #[inline]
    pub fn is_column(&self) -> bool {
        self.width == 1
    }

    #[inline]
    pub fn same_shape(&self, other: &Matrix) -> bool {
        self.shape() == other.shape()
    }

    /// Value at row `i`, column `j`.
    ///
    /// Panics if the position is out of bounds.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(
            i < self.height && j < self.width,
            "index ({i}, {j}) out of bounds for {}x{} matrix",
            self.height,
            self.width
        );
        self.values[i * self.width + j]
    }

    /// Panics if the position is out of bounds.
    #[inline]
    pub(crate) fn set(&mut self, i: usize, j: usize, value: f64) {
        assert!(
            i < self.height && j < self.width,
            "index ({i}, {j}) out of bounds for {}x{} matrix",
            self.height,
            self.width
        );
        self.values[i * self.width + j] = value;
    }

    /// Overwrite every cell with `value`.
    pub(crate) fn fill(&mut self, value: f64) {
        self.values.fill(value);
    }

    /// Row-major view of all cells.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn add(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "add", |a, b| a + b)
    }

    pub fn sub(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "subtract", |a, b| a - b)
    }

    /// Element-wise (Hadamard) product.
    pub fn mul(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "multiply", |a, b| a * b)
    }

    pub fn div(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "divide", |a, b| a / b)
    }

    pub fn add_scalar(&self, scalar: f64) -> Matrix {
        self.map(|v| v + scalar)
    }

    pub fn sub_scalar(&self, scalar: f64) -> Matrix {
        self.map(|v| v - scalar)
    }

    pub fn mul_scalar(&self, scalar: f64) -> Matrix {
        self.map(|v| v * scalar)
    }

    pub fn div_scalar(&self, scalar: f64) -> Matrix {
        self.map(|v| v / scalar)
    }

    /// Matrix product `self · rhs` with shape `(self.height, rhs.width)`.
    pub fn product(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.width != rhs.height {
            return Err(Error::ShapeMismatch(format!(
                "cannot multiply {}x{} by {}x{}",
                self.height, self.width, rhs.height, rhs.width
            )));
        }

        let mut out = vec![0.0; self.height * rhs.width];
        for i in 0..self.height {
            let row = i * self.width;
            for j in 0..rhs.width {
                let mut acc = 0.0;
                for k in 0..self.width {
                    acc += self.values[row + k] * rhs.values[k * rhs.width + j];
                }
                out[i * rhs.width + j] = acc;
            }
        }

        Ok(Matrix {
            height: self.height,
            width: rhs.width,
            values: out,
        })
    }

    /// In-place `self += rhs`.
    pub fn add_into(&mut self, rhs: &Matrix) -> Result<()> {
        self.check_same_shape(rhs, "add into")?;
        for (a, &b) in self.values.iter_mut().zip(&rhs.values) {
            *a += b;
        }
        Ok(())
    }

    /// In-place `self -= rhs`.
    pub fn sub_into(&mut self, rhs: &Matrix) -> Result<()> {
        self.check_same_shape(rhs, "subtract into")?;
        for (a, &b) in self.values.iter_mut().zip(&rhs.values) {
            *a -= b;
        }
        Ok(())
    }

    pub fn transpose(&self) -> Matrix {
        let mut values = Vec::with_capacity(self.values.len());
        for j in 0..self.width {
            for i in 0..self.height {
                values.push(self.values[i * self.width + j]);
            }
        }
        Matrix {
            height: self.width,
            width: self.height,
            values,
        }
    }

    /// Arithmetic mean over all cells.
    pub fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// `(row, column)` of the first largest cell in row-major order.
    pub fn argmax(&self) -> (usize, usize) {
        self.extreme_position(|candidate, best| candidate > best)
    }

    /// `(row, column)` of the first smallest cell in row-major order.
    pub fn argmin(&self) -> (usize, usize) {
        self.extreme_position(|candidate, best| candidate < best)
    }

    pub fn maximum(&self) -> f64 {
        let (i, j) = self.argmax();
        self.get(i, j)
    }

    pub fn minimum(&self) -> f64 {
        let (i, j) = self.argmin();
        self.get(i, j)
    }

    /// Element-wise `powf`.
    pub fn powf(&self, power: f64) -> Matrix {
        self.map(|v| v.powf(power))
    }

    /// Element-wise natural logarithm. Non-positive cells yield `NaN` / `-inf`.
    pub fn ln(&self) -> Matrix {
        self.map(f64::ln)
    }

    /// Apply `f` to every cell.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Matrix {
        Matrix {
            height: self.height,
            width: self.width,
            values: self.values.iter().map(|&v| f(v)).collect(),
        }
    }

    fn zip_with(&self, rhs: &Matrix, op: &str, f: impl Fn(f64, f64) -> f64) -> Result<Matrix> {
        self.check_same_shape(rhs, op)?;
        Ok(Matrix {
            height: self.height,
            width: self.width,
            values: self
                .values
                .iter()
                .zip(&rhs.values)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }

    fn check_same_shape(&self, rhs: &Matrix, op: &str) -> Result<()> {
        if !self.same_shape(rhs) {
            return Err(Error::ShapeMismatch(format!(
                "cannot {op} {}x{} and {}x{}",
                self.height, self.width, rhs.height, rhs.width
            )));
        }
        Ok(())
    }

    // Strict comparison keeps the first occurrence on ties. A NaN cell never wins.
    fn extreme_position(&self, better: impl Fn(f64, f64) -> bool) -> (usize, usize) {
        let mut best_idx = 0;
        let mut best = self.values[0];
        for (idx, &v) in self.values.iter().enumerate().skip(1) {
            if v.is_nan() {
                continue;
            }
            if best.is_nan() || better(v, best) {
                best = v;
                best_idx = idx;
            }
        }
        (best_idx / self.width, best_idx % self.width)
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for i in 0..self.height {
            write!(f, "[")?;
            for j in 0..self.width {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", self.get(i, j))?;
            }
            write!(f, "]")?;
            if i + 1 < self.height {
                writeln!(f)?;
            }
        }
        write!(f, "]")
    }
}

#[inline]
fn check_dims(height: usize, width: usize) -> Result<()> {
    if height == 0 || width == 0 {
        return Err(Error::InvalidDimension(format!(
            "matrix dims must be > 0, got {height}x{width}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn m(rows: &[&[f64]]) -> Matrix {
        Matrix::from_rows(&rows.iter().map(|r| r.to_vec()).collect::<Vec<_>>()).unwrap()
    }

    #[test]
    fn zero_sized_construction_is_rejected() {
        assert!(matches!(
            Matrix::zeros(0, 3),
            Err(Error::InvalidDimension(_))
        ));
        assert!(matches!(
            Matrix::constant(2, 0, 1.0),
            Err(Error::InvalidDimension(_))
        ));
        assert!(matches!(Matrix::column(&[]), Err(Error::InvalidDimension(_))));
        assert!(matches!(Matrix::identity(0), Err(Error::InvalidDimension(_))));
    }

    #[test]
    fn elementwise_ops_require_identical_shapes() {
        let a = m(&[&[1.0, 2.0], &[3.0, 4.0]]);
        let b = m(&[&[1.0, 2.0]]);
        assert!(matches!(a.add(&b), Err(Error::ShapeMismatch(_))));
        assert!(matches!(a.sub(&b), Err(Error::ShapeMismatch(_))));
        assert!(matches!(a.mul(&b), Err(Error::ShapeMismatch(_))));
        assert!(matches!(a.div(&b), Err(Error::ShapeMismatch(_))));

        let c = m(&[&[2.0, 4.0], &[6.0, 8.0]]);
        assert_eq!(a.add(&c).unwrap(), m(&[&[3.0, 6.0], &[9.0, 12.0]]));
        assert_eq!(c.sub(&a).unwrap(), a);
        assert_eq!(a.mul(&c).unwrap(), m(&[&[2.0, 8.0], &[18.0, 32.0]]));
        assert_eq!(c.div(&a).unwrap(), Matrix::constant(2, 2, 2.0).unwrap());
    }

    #[test]
    fn scalar_ops_broadcast_to_every_cell() {
        let a = m(&[&[1.0, -2.0]]);
        assert_eq!(a.add_scalar(1.0), m(&[&[2.0, -1.0]]));
        assert_eq!(a.sub_scalar(1.0), m(&[&[0.0, -3.0]]));
        assert_eq!(a.mul_scalar(-1.0), m(&[&[-1.0, 2.0]]));
        assert_eq!(a.div_scalar(2.0), m(&[&[0.5, -1.0]]));
    }

    #[test]
    fn product_checks_inner_dims_and_computes_shape() {
        let a = m(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]);
        let b = m(&[&[7.0], &[8.0], &[9.0]]);
        let p = a.product(&b).unwrap();
        assert_eq!(p.shape(), (2, 1));
        assert_eq!(p, m(&[&[50.0], &[122.0]]));

        assert!(matches!(b.product(&b), Err(Error::ShapeMismatch(_))));

        let id = Matrix::identity(3).unwrap();
        assert_eq!(a.product(&id).unwrap(), a);
    }

    #[test]
    fn transpose_swaps_axes() {
        let a = m(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]);
        let t = a.transpose();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t, m(&[&[1.0, 4.0], &[2.0, 5.0], &[3.0, 6.0]]));
        assert_eq!(t.transpose(), a);
    }

    #[test]
    fn accumulation_mutates_in_place() {
        let mut acc = Matrix::zeros(2, 1).unwrap();
        let d = Matrix::column(&[1.0, 2.0]).unwrap();
        acc.add_into(&d).unwrap();
        acc.add_into(&d).unwrap();
        assert_eq!(acc, Matrix::column(&[2.0, 4.0]).unwrap());
        acc.sub_into(&d).unwrap();
        assert_eq!(acc, d);

        let wrong = Matrix::zeros(1, 2).unwrap();
        assert!(acc.add_into(&wrong).is_err());
        assert!(acc.sub_into(&wrong).is_err());
    }

    #[test]
    fn reductions_and_extremes() {
        let a = m(&[&[1.0, 5.0, -2.0], &[5.0, -2.0, 0.0]]);
        assert!((a.mean() - 7.0 / 6.0).abs() < 1e-12);
        // Ties resolve to the first occurrence in row-major order.
        assert_eq!(a.argmax(), (0, 1));
        assert_eq!(a.argmin(), (0, 2));
        assert_eq!(a.maximum(), 5.0);
        assert_eq!(a.minimum(), -2.0);
    }

    #[test]
    fn pow_and_ln_are_elementwise() {
        let a = Matrix::column(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(a.powf(2.0), Matrix::column(&[1.0, 4.0, 9.0]).unwrap());

        let l = Matrix::column(&[1.0, std::f64::consts::E]).unwrap().ln();
        assert!((l.get(0, 0)).abs() < 1e-12);
        assert!((l.get(1, 0) - 1.0).abs() < 1e-12);
        assert!(Matrix::column(&[-1.0]).unwrap().ln().get(0, 0).is_nan());
    }

    #[test]
    fn seeded_random_is_deterministic() {
        let a = Matrix::random(3, 4, &mut StdRng::seed_from_u64(7)).unwrap();
        let b = Matrix::random(3, 4, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
        assert!(a.as_slice().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn display_renders_rows() {
        let a = m(&[&[1.0, 2.0], &[3.0, 4.0]]);
        assert_eq!(a.to_string(), "[[1 2]\n[3 4]]");
    }
}
