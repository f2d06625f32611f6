use thiserror::Error;

/// Error taxonomy shared across the warehouse crates.
///
/// Every variant is fatal for the current run; callers propagate it unchanged.
#[derive(Debug, Error)]
pub enum Error {
    /// A range was supplied with its lower bound above its upper bound.
    #[error("invalid range: {0}")]
    InvalidRange(String),
    /// A foreign key was requested from an empty set of parent keys.
    #[error("empty reference set: {0}")]
    EmptyReferenceSet(String),
    /// The sink rejected a record because of an integrity rule.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    /// The sink or source could not be reached or failed while serving a call.
    #[error("sink unavailable: {0}")]
    SinkUnavailable(String),
}

/// Convenience alias for results returned by warehouse crates.
pub type Result<T> = std::result::Result<T, Error>;
