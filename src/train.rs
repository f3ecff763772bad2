use tracing::{debug, trace, warn};

use crate::network::Gradients;
use crate::{DenseNetwork, Error, Loss, Matrix, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
/// Hyperparameters for [`DenseNetwork::fit`].
pub struct FitConfig {
    /// Batch accuracy in `(0, 1]` that counts as converged.
    pub target_accuracy: f64,
    /// Upper bound on full-batch epochs. A zero budget runs no epoch and fails with
    /// [`Error::ConvergenceFailure`].
    pub max_steps: usize,
    /// Extra on-target epochs required after the first one before stopping early.
    pub buffer_steps: usize,
    pub learning_rate: f64,
    pub loss: Loss,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            target_accuracy: 1.0,
            max_steps: 10_000,
            buffer_steps: 0,
            learning_rate: 1.0,
            loss: Loss::CrossEntropy,
        }
    }
}

impl FitConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.target_accuracy > 0.0 && self.target_accuracy <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "target_accuracy must be in (0, 1], got {}",
                self.target_accuracy
            )));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning_rate must be finite and > 0, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Metrics for one full-batch epoch.
pub struct EpochReport {
    /// Zero-based epoch index.
    pub step: usize,
    /// Mean cost over the batch.
    pub cost: f64,
    /// Mean 0/1 accuracy over the batch.
    pub accuracy: f64,
}

/// Outcome of a successful fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitReport {
    /// Number of epochs run.
    pub steps: usize,
    pub final_cost: f64,
    pub final_accuracy: f64,
}

/// Receives per-epoch progress from the fit loop.
pub trait TrainObserver {
    fn on_epoch(&mut self, report: &EpochReport);
}

impl<F> TrainObserver for F
where
    F: FnMut(&EpochReport),
{
    fn on_epoch(&mut self, report: &EpochReport) {
        self(report)
    }
}

impl TrainObserver for () {
    fn on_epoch(&mut self, _report: &EpochReport) {}
}

impl DenseNetwork {
    /// Full-batch gradient descent on `(xs[i], ys[i])` pairs until the batch accuracy
    /// holds at `target_accuracy` for `buffer_steps + 1` consecutive epochs.
    ///
    /// Fails with [`Error::ConvergenceFailure`] if `max_steps` runs out while the last
    /// epoch is still below target. Parameters keep whatever values the last step left.
    pub fn fit(&mut self, xs: &[Matrix], ys: &[Matrix], cfg: &FitConfig) -> Result<FitReport> {
        self.fit_with_observer(xs, ys, cfg, &mut ())
    }

    /// Same as [`DenseNetwork::fit`], reporting every epoch to `observer`.
    pub fn fit_with_observer(
        &mut self,
        xs: &[Matrix],
        ys: &[Matrix],
        cfg: &FitConfig,
        observer: &mut dyn TrainObserver,
    ) -> Result<FitReport> {
        if xs.len() != ys.len() {
            return Err(Error::MalformedInput(format!(
                "inputs/targets length mismatch: {} vs {}",
                xs.len(),
                ys.len()
            )));
        }
        if xs.is_empty() {
            return Err(Error::MalformedInput(
                "training set must not be empty".to_owned(),
            ));
        }
        cfg.validate()?;
        self.check_batch(xs, ys)?;

        let batch_size = xs.len();
        let scale = cfg.learning_rate / batch_size as f64;
        let mut grads = Gradients::new(self)?;

        let mut steps = 0;
        let mut cost = f64::NAN;
        let mut accuracy = 0.0;
        let mut settled = 0;

        for step in 0..cfg.max_steps {
            grads.reset();
            let mut cost_sum = 0.0;
            let mut hits = 0usize;
            for (x, y) in xs.iter().zip(ys) {
                let (c, hit) = self.accumulate_gradients(x, y, cfg.loss, &mut grads)?;
                cost_sum += c;
                hits += usize::from(hit);
            }
            self.descend(&grads, scale)?;

            steps = step + 1;
            cost = cost_sum / batch_size as f64;
            accuracy = hits as f64 / batch_size as f64;
            trace!(step, cost, accuracy, "epoch");
            observer.on_epoch(&EpochReport {
                step,
                cost,
                accuracy,
            });

            if accuracy >= cfg.target_accuracy {
                debug!(step, remaining = cfg.buffer_steps - settled, "on target");
                settled += 1;
                if settled > cfg.buffer_steps {
                    break;
                }
            } else {
                settled = 0;
            }
        }

        if accuracy < cfg.target_accuracy {
            warn!(
                steps,
                cost,
                accuracy,
                target = cfg.target_accuracy,
                "failed to converge"
            );
            return Err(Error::ConvergenceFailure {
                steps,
                accuracy,
                target: cfg.target_accuracy,
            });
        }

        debug!(steps, cost, accuracy, "converged");
        Ok(FitReport {
            steps,
            final_cost: cost,
            final_accuracy: accuracy,
        })
    }

    fn check_batch(&self, xs: &[Matrix], ys: &[Matrix]) -> Result<()> {
        for (i, (x, y)) in xs.iter().zip(ys).enumerate() {
            if x.shape() != (self.input_dim(), 1) {
                return Err(Error::ShapeMismatch(format!(
                    "input {i} is {}x{}, expected {}x1",
                    x.height(),
                    x.width(),
                    self.input_dim()
                )));
            }
            if y.shape() != (self.output_dim(), 1) {
                return Err(Error::ShapeMismatch(format!(
                    "target {i} is {}x{}, expected {}x1",
                    y.height(),
                    y.width(),
                    self.output_dim()
                )));
            }
        }
        Ok(())
    }
}
