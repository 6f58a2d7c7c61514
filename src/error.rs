//! Error types for the breath analysis engine.
//!
//! Every error is a precondition violation detected before any computation
//! starts. Nothing is retried and no partial result is produced.

use thiserror::Error;

/// Errors returned by the engine's public operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// An argument was rejected outright (e.g. an empty license key).
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        name: &'static str,
        reason: &'static str,
    },

    /// A required input array was not supplied.
    #[error("missing input: `{0}` was not supplied")]
    MissingInput(&'static str),

    /// The CO and temperature arrays have different lengths.
    #[error("array lengths must match (co: {co}, temperature: {temperature})")]
    LengthMismatch { co: usize, temperature: usize },

    /// The sample period is zero, negative, or not finite.
    #[error("sample period must be a positive finite number of seconds, got {0}")]
    InvalidSamplePeriod(f64),

    /// A raw sensor word is absent or not exactly two bytes long.
    #[error("raw CO word {index} must be exactly 2 bytes (big-endian), got {}", describe_len(.len))]
    InvalidInput { index: usize, len: Option<usize> },
}

fn describe_len(len: &Option<usize>) -> String {
    match len {
        Some(n) => format!("{n} byte(s)"),
        None => "no word".to_string(),
    }
}

/// Category of an [`EngineError`], without the attached context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    MissingInput,
    LengthMismatch,
    InvalidSamplePeriod,
    InvalidInput,
}

impl EngineError {
    /// Get the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            EngineError::MissingInput(_) => ErrorKind::MissingInput,
            EngineError::LengthMismatch { .. } => ErrorKind::LengthMismatch,
            EngineError::InvalidSamplePeriod(_) => ErrorKind::InvalidSamplePeriod,
            EngineError::InvalidInput { .. } => ErrorKind::InvalidInput,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;
