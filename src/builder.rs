//! Table builder.
//!
//! `TableBuilder` is the recommended way to configure a table. It makes the training
//! hyperparameters explicit and lets tests pin the parameter initialization with a seed:
//!
//! ```rust
//! use nn_hashtable::{NnHashTable, TableBuilder};
//!
//! # fn main() -> nn_hashtable::Result<()> {
//! let mut table: NnHashTable<u32> = TableBuilder::new(8, 4)?
//!     .max_steps(5_000)
//!     .buffer_steps(2)
//!     .build_with_seed(0)?;
//! table.put("alpha", 1)?;
//! assert_eq!(*table.get("alpha")?, 1);
//! # Ok(())
//! # }
//! ```

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{DenseNetwork, Error, FitConfig, Loss, NnHashTable, Result, TrainObserver};

/// Builder for an [`NnHashTable`].
pub struct TableBuilder {
    key_limit: usize,
    capacity: usize,
    hidden: Vec<usize>,
    fit: FitConfig,
    observer: Option<Box<dyn TrainObserver + Send>>,
}

impl TableBuilder {
    /// Start a table for keys of at most `key_limit` characters and up to `capacity`
    /// records.
    pub fn new(key_limit: usize, capacity: usize) -> Result<Self> {
        if key_limit == 0 || capacity == 0 {
            return Err(Error::InvalidDimension(format!(
                "key_limit and capacity must be > 0, got key_limit={key_limit} capacity={capacity}"
            )));
        }
        Ok(Self {
            key_limit,
            capacity,
            hidden: Vec::new(),
            fit: FitConfig::default(),
            observer: None,
        })
    }

    /// Epoch budget for each retrain.
    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.fit.max_steps = max_steps;
        self
    }

    /// Extra on-target epochs before a retrain stops early.
    pub fn buffer_steps(mut self, buffer_steps: usize) -> Self {
        self.fit.buffer_steps = buffer_steps;
        self
    }

    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.fit.learning_rate = learning_rate;
        self
    }

    pub fn loss(mut self, loss: Loss) -> Self {
        self.fit.loss = loss;
        self
    }

    /// Insert a hidden sigmoid layer between the key encoding and the slot outputs.
    ///
    /// Layers are stacked in call order. Without any, keys map straight to slots.
    pub fn hidden_layer(mut self, width: usize) -> Result<Self> {
        if width == 0 {
            return Err(Error::InvalidConfig(
                "hidden layer width must be > 0".to_owned(),
            ));
        }
        self.hidden.push(width);
        Ok(self)
    }

    /// Receive per-epoch progress from every retrain.
    pub fn observer(mut self, observer: impl TrainObserver + Send + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Build with an entropy-seeded RNG.
    pub fn build<V>(self) -> Result<NnHashTable<V>> {
        let mut rng = StdRng::from_entropy();
        self.build_with_rng(&mut rng)
    }

    /// Build using a deterministic seed.
    pub fn build_with_seed<V>(self, seed: u64) -> Result<NnHashTable<V>> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.build_with_rng(&mut rng)
    }

    /// Build using the provided RNG for parameter initialization.
    pub fn build_with_rng<V, R: Rng + ?Sized>(self, rng: &mut R) -> Result<NnHashTable<V>> {
        self.fit.validate()?;

        let mut layers = Vec::with_capacity(self.hidden.len() + 2);
        layers.push(self.key_limit);
        layers.extend_from_slice(&self.hidden);
        layers.push(self.capacity);
        let network = DenseNetwork::new_with_rng(&layers, rng)?;

        Ok(NnHashTable::from_parts(
            self.key_limit,
            self.capacity,
            network,
            self.fit,
            self.observer,
        ))
    }
}

impl fmt::Debug for TableBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableBuilder")
            .field("key_limit", &self.key_limit)
            .field("capacity", &self.capacity)
            .field("hidden", &self.hidden)
            .field("fit", &self.fit)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
