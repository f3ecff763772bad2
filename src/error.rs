use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error("could not insert {key:?}: table is full ({capacity} records)")]
    TableFull { key: String, capacity: usize },
    #[error("could not find {key:?}: table is empty")]
    EmptyTable { key: String },
    #[error("could not find {key:?} at slot {slot}")]
    KeyNotFound { key: String, slot: usize },
    #[error("{key:?} is already stored at slot {slot}")]
    DuplicateKey { key: String, slot: usize },
    #[error("slot {slot} is out of range for {len} records")]
    SlotOutOfRange { slot: usize, len: usize },
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error(
        "failed to converge after {steps} steps: accuracy {accuracy} is below target {target}"
    )]
    ConvergenceFailure {
        steps: usize,
        accuracy: f64,
        target: f64,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
