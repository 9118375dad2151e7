//! # World Error Types
//!
//! Recoverable failures of the world layer. Contract violations (overflow,
//! buffer underrun, access to an unloaded window) are panics, not errors.

use thiserror::Error;

/// Errors that can occur while configuring or loading the world.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// Object type id outside the fixed type space.
    #[error("object type {type_id} out of range (max {max})")]
    TypeOutOfRange {
        /// The rejected id.
        type_id: u32,
        /// Largest valid id.
        max: u32,
    },

    /// Model dimension is zero or too large.
    #[error("invalid model dimension {dim} for type {type_id} (1..={max})")]
    InvalidModelDim {
        /// Type the model was set on.
        type_id: u16,
        /// Requested dimension.
        dim: u32,
        /// Largest supported dimension.
        max: u32,
    },

    /// Model block list does not hold `dim³` entries.
    #[error("model for type {type_id} needs {expected} blocks, got {actual}")]
    ModelSizeMismatch {
        /// Type the model was set on.
        type_id: u16,
        /// `dim³`.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },

    /// Configuration text could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Compressed chunk data could not be decoded.
    #[error("corrupt chunk data: {0}")]
    CorruptChunk(String),
}

/// Result type for world operations.
pub type WorldResult<T> = Result<T, WorldError>;
