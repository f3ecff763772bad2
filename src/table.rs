//! Learned-index key-value table.
//!
//! Records occupy contiguous slots `0..len`. A [`DenseNetwork`] maps the encoded key to
//! a slot; the stored key at that slot is then compared exactly, so the network only
//! proposes a candidate. Every insert of a new key and every delete retrains the
//! network on the whole key set, which makes mutations expensive (a full fit per call)
//! and lookups cheap (one forward pass).

use std::fmt;

use tracing::debug;

use crate::encoding::{one_hot, string_norm};
use crate::{DenseNetwork, Error, FitConfig, Result, TableBuilder, TrainObserver};

/// Initial character window; it widens to cover every inserted key and never narrows.
const INITIAL_MIN_CHAR: u32 = 0;
const INITIAL_MAX_CHAR: u32 = 128;

#[derive(Debug, Clone)]
struct Record<V> {
    key: String,
    value: V,
}

/// Key-value table indexed by a neural network.
///
/// Keys are non-empty strings of at most `key_limit` characters.
pub struct NnHashTable<V> {
    records: Vec<Record<V>>,
    capacity: usize,
    key_limit: usize,
    min_char: u32,
    max_char: u32,
    network: DenseNetwork,
    fit: FitConfig,
    observer: Option<Box<dyn TrainObserver + Send>>,
}

impl<V> NnHashTable<V> {
    /// Table with the default training parameters (`max_steps = 10_000`,
    /// `buffer_steps = 0`, `learning_rate = 1.0`) and entropy-seeded initialization.
    pub fn new(key_limit: usize, capacity: usize) -> Result<Self> {
        TableBuilder::new(key_limit, capacity)?.build()
    }

    pub fn with_params(
        key_limit: usize,
        capacity: usize,
        max_steps: usize,
        buffer_steps: usize,
        learning_rate: f64,
    ) -> Result<Self> {
        TableBuilder::new(key_limit, capacity)?
            .max_steps(max_steps)
            .buffer_steps(buffer_steps)
            .learning_rate(learning_rate)
            .build()
    }

    pub(crate) fn from_parts(
        key_limit: usize,
        capacity: usize,
        network: DenseNetwork,
        fit: FitConfig,
        observer: Option<Box<dyn TrainObserver + Send>>,
    ) -> Self {
        debug_assert_eq!(network.input_dim(), key_limit);
        debug_assert_eq!(network.output_dim(), capacity);
        Self {
            records: Vec::with_capacity(capacity),
            capacity,
            key_limit,
            min_char: INITIAL_MIN_CHAR,
            max_char: INITIAL_MAX_CHAR,
            network,
            fit,
            observer,
        }
    }

    /// Insert `key`, or overwrite its value if it is already stored.
    ///
    /// Overwrites leave the network untouched. A new key is appended at the next free
    /// slot and the network is retrained; if that retrain fails with
    /// [`Error::ConvergenceFailure`] the record stays inserted but lookups may
    /// mis-resolve until a later retrain succeeds.
    pub fn put(&mut self, key: &str, value: V) -> Result<()> {
        let slot = self.hash(key)?;
        if let Some(record) = self.records.get_mut(slot).filter(|r| r.key == key) {
            record.value = value;
            debug!(key, slot, "overwrote value");
            return Ok(());
        }

        if self.records.len() == self.capacity {
            return Err(Error::TableFull {
                key: key.to_owned(),
                capacity: self.capacity,
            });
        }

        self.records.push(Record {
            key: key.to_owned(),
            value,
        });
        self.widen_char_window(key);
        debug!(key, slot = self.records.len() - 1, "inserted record");

        self.retrain()
    }

    pub fn get(&self, key: &str) -> Result<&V> {
        let slot = self.slot_of(key)?;
        Ok(&self.records[slot].value)
    }

    /// Mutable access to a stored value. Does not retrain.
    pub fn get_mut(&mut self, key: &str) -> Result<&mut V> {
        let slot = self.slot_of(key)?;
        Ok(&mut self.records[slot].value)
    }

    /// Remove `key`, shifting every later record one slot down, then retrain.
    ///
    /// Returns the removed value. On [`Error::ConvergenceFailure`] the record is
    /// already gone and its value dropped; to keep the option of restoring it, use
    /// [`NnHashTable::slot_of`], [`NnHashTable::remove_at`] and
    /// [`NnHashTable::retrain`] instead.
    pub fn delete(&mut self, key: &str) -> Result<V> {
        let slot = self.slot_of(key)?;
        let record = self.records.remove(slot);
        debug!(key, slot, remaining = self.records.len(), "deleted record");

        self.retrain()?;
        Ok(record.value)
    }

    /// Candidate slot for `key`: the arg-max row of the network's prediction.
    ///
    /// The slot is not verified against the stored key.
    pub fn hash(&self, key: &str) -> Result<usize> {
        self.check_key(key)?;
        let prediction = self.network.predict(&self.encode(key)?)?;
        Ok(prediction.argmax().0)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        !self.records.is_empty() && self.slot_of(key).is_ok()
    }

    /// Remove and return the last record without retraining.
    ///
    /// Undoes a `put` of a new key whose retrain failed.
    pub fn pop(&mut self) -> Option<(String, V)> {
        let record = self.records.pop()?;
        debug!(key = record.key.as_str(), slot = self.records.len(), "popped record");
        Some((record.key, record.value))
    }

    /// Remove the record at `slot` without consulting or retraining the network.
    ///
    /// Later records shift one slot down.
    pub fn remove_at(&mut self, slot: usize) -> Result<(String, V)> {
        if slot >= self.records.len() {
            return Err(Error::SlotOutOfRange {
                slot,
                len: self.records.len(),
            });
        }
        let record = self.records.remove(slot);
        debug!(key = record.key.as_str(), slot, "removed record");
        Ok((record.key, record.value))
    }

    /// Insert a record at `slot` without consulting or retraining the network.
    ///
    /// Records from `slot` on shift one slot up; `slot == len()` appends. The character
    /// window widens as it does for `put`.
    pub fn insert_at(&mut self, slot: usize, key: &str, value: V) -> Result<()> {
        self.check_key(key)?;
        if self.records.len() == self.capacity {
            return Err(Error::TableFull {
                key: key.to_owned(),
                capacity: self.capacity,
            });
        }
        if slot > self.records.len() {
            return Err(Error::SlotOutOfRange {
                slot,
                len: self.records.len(),
            });
        }
        if let Some(existing) = self.records.iter().position(|r| r.key == key) {
            return Err(Error::DuplicateKey {
                key: key.to_owned(),
                slot: existing,
            });
        }

        self.records.insert(
            slot,
            Record {
                key: key.to_owned(),
                value,
            },
        );
        self.widen_char_window(key);
        debug!(key, slot, "inserted record at slot");
        Ok(())
    }

    /// Swap in `network`, returning the previous one.
    ///
    /// Paired with a clone of [`NnHashTable::network`] taken before a mutation, this
    /// restores the last converged index once the mutation is rolled back.
    pub fn replace_network(&mut self, network: DenseNetwork) -> Result<DenseNetwork> {
        if network.input_dim() != self.key_limit || network.output_dim() != self.capacity {
            return Err(Error::ShapeMismatch(format!(
                "network maps {} inputs to {} outputs, table needs {} to {}",
                network.input_dim(),
                network.output_dim(),
                self.key_limit,
                self.capacity
            )));
        }
        Ok(std::mem::replace(&mut self.network, network))
    }

    /// Rebuild the training set from every record and fit the network to it.
    ///
    /// Input `i` is the encoding of the key in slot `i`, target `i` its one-hot slot.
    /// Called by `put` and `delete`; call it directly to retry after a
    /// [`Error::ConvergenceFailure`], e.g. following [`NnHashTable::set_fit_config`].
    pub fn retrain(&mut self) -> Result<()> {
        if self.records.is_empty() {
            debug!("no records, skipping retrain");
            return Ok(());
        }

        let mut xs = Vec::with_capacity(self.records.len());
        let mut ys = Vec::with_capacity(self.records.len());
        for (slot, record) in self.records.iter().enumerate() {
            xs.push(self.encode(&record.key)?);
            ys.push(one_hot(slot, self.capacity)?);
        }

        let report = match self.observer.as_mut() {
            Some(observer) => {
                self.network
                    .fit_with_observer(&xs, &ys, &self.fit, &mut **observer)?
            }
            None => self.network.fit(&xs, &ys, &self.fit)?,
        };
        debug!(
            records = self.records.len(),
            steps = report.steps,
            cost = report.final_cost,
            "retrained index"
        );
        Ok(())
    }

    /// Number of stored records.
    #[inline]
    pub fn total_records(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn key_limit(&self) -> usize {
        self.key_limit
    }

    /// Current normalization window `(min_char, max_char)`.
    #[inline]
    pub fn char_window(&self) -> (u32, u32) {
        (self.min_char, self.max_char)
    }

    #[inline]
    pub fn network(&self) -> &DenseNetwork {
        &self.network
    }

    #[inline]
    pub fn fit_config(&self) -> &FitConfig {
        &self.fit
    }

    /// Replace the training parameters used by later retrains.
    ///
    /// The target accuracy must stay at 1.0: every key has to land on its own slot.
    pub fn set_fit_config(&mut self, fit: FitConfig) -> Result<()> {
        fit.validate()?;
        if fit.target_accuracy < 1.0 {
            return Err(Error::InvalidConfig(format!(
                "table retrains require target_accuracy 1.0, got {}",
                fit.target_accuracy
            )));
        }
        self.fit = fit;
        Ok(())
    }

    pub fn set_observer(&mut self, observer: impl TrainObserver + Send + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Keys in slot order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.records.iter().map(|r| r.key.as_str())
    }

    /// `(key, value)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> + '_ {
        self.records.iter().map(|r| (r.key.as_str(), &r.value))
    }

    /// Slot of `key`, confirmed by exact comparison with the stored key.
    pub fn slot_of(&self, key: &str) -> Result<usize> {
        if self.records.is_empty() {
            return Err(Error::EmptyTable {
                key: key.to_owned(),
            });
        }
        let slot = self.hash(key)?;
        match self.records.get(slot) {
            Some(record) if record.key == key => Ok(slot),
            _ => Err(Error::KeyNotFound {
                key: key.to_owned(),
                slot,
            }),
        }
    }

    fn check_key(&self, key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(Error::InvalidKey("key must not be empty".to_owned()));
        }
        let len = key.chars().count();
        if len > self.key_limit {
            return Err(Error::InvalidKey(format!(
                "{key:?} has {len} characters, more than the key limit {}",
                self.key_limit
            )));
        }
        Ok(())
    }

    fn encode(&self, key: &str) -> Result<crate::Matrix> {
        string_norm(key, self.key_limit, self.min_char, self.max_char)
    }

    fn widen_char_window(&mut self, key: &str) {
        for c in key.chars().map(u32::from) {
            self.min_char = self.min_char.min(c);
            self.max_char = self.max_char.max(c);
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for NnHashTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NnHashTable")
            .field("records", &self.records)
            .field("capacity", &self.capacity)
            .field("key_limit", &self.key_limit)
            .field("char_window", &(self.min_char, self.max_char))
            .field("fit", &self.fit)
            .finish_non_exhaustive()
    }
}
