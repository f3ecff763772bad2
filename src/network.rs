use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::activation::{sigmoid_derivative_matrix, sigmoid_matrix};
use crate::{Error, Loss, Matrix, Result, metrics};

#[derive(Debug, Clone)]
/// Fully connected feed-forward network with sigmoid activations on every layer.
///
/// For layer sizes `[n0, n1, ..., nd]` the network holds `d` weight matrices of shape
/// `(n[i+1], n[i])` and `d` bias columns of shape `(n[i+1], 1)`. Shapes never change
/// after construction; only `fit` mutates the values.
pub struct DenseNetwork {
    weights: Vec<Matrix>,
    biases: Vec<Matrix>,
}

/// Parameter gradients summed over a batch (accumulate semantics).
///
/// Allocate once via `Gradients::new` and `reset` between epochs.
#[derive(Debug, Clone)]
pub(crate) struct Gradients {
    d_weights: Vec<Matrix>,
    d_biases: Vec<Matrix>,
}

/// Pre-activations and activations recorded by a forward pass.
///
/// `zs[l]` is the pre-activation of transition `l`; `activations[0]` is the input and
/// `activations[l + 1] = sigmoid(zs[l])`.
#[derive(Debug, Clone)]
pub(crate) struct ForwardCache {
    zs: Vec<Matrix>,
    activations: Vec<Matrix>,
}

impl DenseNetwork {
    /// Build with parameters drawn from an entropy-seeded RNG.
    pub fn new(layers: &[usize]) -> Result<Self> {
        let mut rng = StdRng::from_entropy();
        Self::new_with_rng(layers, &mut rng)
    }

    pub fn new_with_seed(layers: &[usize], seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::new_with_rng(layers, &mut rng)
    }

    /// Build with every weight and bias drawn from the standard normal distribution.
    pub fn new_with_rng<R: Rng + ?Sized>(layers: &[usize], rng: &mut R) -> Result<Self> {
        if layers.len() < 2 {
            return Err(Error::InvalidConfig(
                "layers must include input and output widths".to_owned(),
            ));
        }
        if layers.contains(&0) {
            return Err(Error::InvalidDimension(format!(
                "all layer widths must be > 0, got {layers:?}"
            )));
        }

        let depth = layers.len() - 1;
        let mut weights = Vec::with_capacity(depth);
        let mut biases = Vec::with_capacity(depth);
        for w in layers.windows(2) {
            let (in_dim, out_dim) = (w[0], w[1]);
            weights.push(Matrix::random(out_dim, in_dim, rng)?);
            biases.push(Matrix::random(out_dim, 1, rng)?);
        }
        Ok(Self { weights, biases })
    }

    /// Build from explicit parameters.
    ///
    /// `weights[i]` must be `(n[i+1], n[i])` and `biases[i]` must be `(n[i+1], 1)`, with
    /// consecutive layers agreeing on their widths.
    pub fn from_parts(weights: Vec<Matrix>, biases: Vec<Matrix>) -> Result<Self> {
        if weights.is_empty() {
            return Err(Error::InvalidConfig(
                "network must have at least one layer".to_owned(),
            ));
        }
        if weights.len() != biases.len() {
            return Err(Error::ShapeMismatch(format!(
                "{} weight matrices but {} bias vectors",
                weights.len(),
                biases.len()
            )));
        }
        for (l, (w, b)) in weights.iter().zip(&biases).enumerate() {
            if b.shape() != (w.height(), 1) {
                return Err(Error::ShapeMismatch(format!(
                    "layer {l} bias is {}x{}, expected {}x1",
                    b.height(),
                    b.width(),
                    w.height()
                )));
            }
            if l > 0 && w.width() != weights[l - 1].height() {
                return Err(Error::ShapeMismatch(format!(
                    "layer {l} takes {} inputs but layer {} produces {}",
                    w.width(),
                    l - 1,
                    weights[l - 1].height()
                )));
            }
        }
        Ok(Self { weights, biases })
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.weights[0].width()
    }

    #[inline]
    pub fn output_dim(&self) -> usize {
        self.weights[self.weights.len() - 1].height()
    }

    /// Number of transition layers.
    #[inline]
    pub fn depth(&self) -> usize {
        self.weights.len()
    }

    /// Layer widths including the input, e.g. `[2, 3, 2]`.
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.depth() + 1);
        sizes.push(self.input_dim());
        sizes.extend(self.weights.iter().map(Matrix::height));
        sizes
    }

    #[inline]
    pub fn weights(&self) -> &[Matrix] {
        &self.weights
    }

    #[inline]
    pub fn biases(&self) -> &[Matrix] {
        &self.biases
    }

    /// Forward inference for one example.
    ///
    /// `x` must be a column vector of height `input_dim()`. Returns the output layer's
    /// sigmoid activations; the arg-max row is the predicted class.
    pub fn predict(&self, x: &Matrix) -> Result<Matrix> {
        self.check_input(x)?;
        let mut activation = x.clone();
        for (w, b) in self.weights.iter().zip(&self.biases) {
            activation = sigmoid_matrix(&w.product(&activation)?.add(b)?);
        }
        Ok(activation)
    }

    /// Forward pass keeping every layer's `z` and activation for backprop.
    pub(crate) fn forward_cached(&self, x: &Matrix) -> Result<ForwardCache> {
        self.check_input(x)?;
        let mut zs = Vec::with_capacity(self.depth());
        let mut activations = Vec::with_capacity(self.depth() + 1);
        activations.push(x.clone());

        for (l, (w, b)) in self.weights.iter().zip(&self.biases).enumerate() {
            let z = w.product(&activations[l])?.add(b)?;
            activations.push(sigmoid_matrix(&z));
            zs.push(z);
        }
        Ok(ForwardCache { zs, activations })
    }

    /// Forward + backward for one example, adding its gradients into `grads`.
    ///
    /// Returns the example's cost and its 0/1 accuracy score.
    pub(crate) fn accumulate_gradients(
        &self,
        x: &Matrix,
        y: &Matrix,
        loss: Loss,
        grads: &mut Gradients,
    ) -> Result<(f64, u8)> {
        debug_assert_eq!(grads.d_weights.len(), self.depth());

        let cache = self.forward_cached(x)?;
        let output = cache.output();
        let cost = loss.forward(output, y)?;
        let hit = metrics::classification_accuracy(output, y)?;

        // Output layer: dC/da * sigmoid'(z).
        let last = self.depth() - 1;
        let error = loss.derivative(output, y)?;
        let mut delta = error.mul(&sigmoid_derivative_matrix(&cache.zs[last]))?;

        for l in (0..self.depth()).rev() {
            grads.d_weights[l].add_into(&delta.product(&cache.activations[l].transpose())?)?;
            grads.d_biases[l].add_into(&delta)?;

            if l > 0 {
                delta = self.weights[l]
                    .transpose()
                    .product(&delta)?
                    .mul(&sigmoid_derivative_matrix(&cache.zs[l - 1]))?;
            }
        }

        Ok((cost, hit))
    }

    /// Steepest-descent step: `param -= scale * grad` for every weight and bias.
    pub(crate) fn descend(&mut self, grads: &Gradients, scale: f64) -> Result<()> {
        for l in 0..self.depth() {
            self.weights[l].sub_into(&grads.d_weights[l].mul_scalar(scale))?;
            self.biases[l].sub_into(&grads.d_biases[l].mul_scalar(scale))?;
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn weights_mut(&mut self) -> &mut [Matrix] {
        &mut self.weights
    }

    #[cfg(test)]
    pub(crate) fn biases_mut(&mut self) -> &mut [Matrix] {
        &mut self.biases
    }

    fn check_input(&self, x: &Matrix) -> Result<()> {
        if x.shape() != (self.input_dim(), 1) {
            return Err(Error::ShapeMismatch(format!(
                "input must be a {}x1 column vector, got {}x{}",
                self.input_dim(),
                x.height(),
                x.width()
            )));
        }
        Ok(())
    }
}

impl ForwardCache {
    #[inline]
    pub(crate) fn output(&self) -> &Matrix {
        &self.activations[self.activations.len() - 1]
    }
}

impl Gradients {
    pub(crate) fn new(network: &DenseNetwork) -> Result<Self> {
        let mut d_weights = Vec::with_capacity(network.depth());
        let mut d_biases = Vec::with_capacity(network.depth());
        for (w, b) in network.weights.iter().zip(&network.biases) {
            d_weights.push(Matrix::zeros(w.height(), w.width())?);
            d_biases.push(Matrix::zeros(b.height(), 1)?);
        }
        Ok(Self {
            d_weights,
            d_biases,
        })
    }

    /// Zero every accumulator.
    pub(crate) fn reset(&mut self) {
        for m in self.d_weights.iter_mut().chain(self.d_biases.iter_mut()) {
            m.fill(0.0);
        }
    }

    #[inline]
    pub(crate) fn d_weights(&self, layer_idx: usize) -> &Matrix {
        &self.d_weights[layer_idx]
    }

    #[inline]
    pub(crate) fn d_biases(&self, layer_idx: usize) -> &Matrix {
        &self.d_biases[layer_idx]
    }
}
