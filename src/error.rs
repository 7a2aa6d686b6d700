//! Engine error taxonomy.
//!
//! All engine errors are local and non-retryable: the decision core is a
//! pure computation over already-fetched inputs, so there is no transient
//! failure mode here. Retry and backoff belong to the data and model layers
//! upstream of this crate.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    /// A caller-supplied value failed validation. Business inputs are never
    /// silently clamped into range; the only internal clipping happens in
    /// the calibrator's numerically-safe logit transform.
    #[error("invalid input `{field}`: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// Market statistics were missing or unusable. The engine never guesses
    /// a market regime.
    #[error("insufficient market context: {0}")]
    InsufficientContext(String),

    /// An internal invariant was violated after planning. This indicates a
    /// defect in the engine, not a recoverable user-facing condition.
    #[error("internal invariant violated: {0}")]
    Invariant(String),

    #[error("config error: {0}")]
    Config(String),
}

impl EngineError {
    pub fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}
