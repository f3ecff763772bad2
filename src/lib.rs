//! A key-value table whose index function is a small neural network.
//!
//! `nn-hashtable` replaces the hash function of a table with a dense feed-forward
//! network trained to map every stored key onto its own slot. The network is retrained
//! after every structural change, and each lookup verifies the predicted slot against
//! the stored key.
//!
//! # Design
//!
//! - The learned index is only a candidate generator: `get` compares the stored key at
//!   the predicted slot and reports [`Error::KeyNotFound`] on mismatch.
//! - Records occupy contiguous slots `0..len`; a delete shifts later records down.
//! - Inserting a new key or deleting one refits the network on the full key set to
//!   100% accuracy. Mutations cost a full fit; lookups are a single forward pass.
//! - Some key sets cannot be separated within the step budget. The retrain then fails
//!   with [`Error::ConvergenceFailure`] and the mutation is left in place.
//!
//! # Data layout and shapes
//!
//! - Scalars are `f64`; [`Matrix`] stores them row-major.
//! - Network inputs and outputs are column vectors (`n x 1`).
//! - Layer weights have shape `(out_dim, in_dim)`, biases `(out_dim, 1)`.
//! - Keys encode to a `key_limit x 1` column, slots to a `capacity x 1` one-hot column.
//!
//! # Quick start
//!
//! ```rust
//! use nn_hashtable::{NnHashTable, TableBuilder};
//!
//! # fn main() -> nn_hashtable::Result<()> {
//! let mut table: NnHashTable<&str> = TableBuilder::new(20, 4)?.build_with_seed(7)?;
//! table.put("emu", "over")?;
//! table.put("gddog", "jumped")?;
//!
//! assert_eq!(*table.get("emu")?, "over");
//! assert_eq!(table.total_records(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! # Training a network directly
//!
//! ```rust
//! use nn_hashtable::{DenseNetwork, FitConfig, Matrix};
//! use nn_hashtable::encoding::one_hot;
//!
//! # fn main() -> nn_hashtable::Result<()> {
//! let xs = vec![Matrix::column(&[1.0, 0.0])?, Matrix::column(&[0.0, 1.0])?];
//! let ys = vec![one_hot(0, 2)?, one_hot(1, 2)?];
//!
//! let mut net = DenseNetwork::new_with_seed(&[2, 2], 0)?;
//! let report = net.fit(&xs, &ys, &FitConfig::default())?;
//! assert_eq!(report.final_accuracy, 1.0);
//! assert_eq!(net.predict(&xs[1])?.argmax().0, 1);
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod builder;
pub mod encoding;
pub mod error;
pub mod loss;
pub mod matrix;
pub mod metrics;
pub mod network;
pub mod table;
pub mod train;

pub use builder::TableBuilder;
pub use error::{Error, Result};
pub use loss::Loss;
pub use matrix::Matrix;
pub use network::DenseNetwork;
pub use table::NnHashTable;
pub use train::{EpochReport, FitConfig, FitReport, TrainObserver};
