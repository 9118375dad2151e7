//! # Volume Error Types

use thiserror::Error;

/// Errors that can occur while allocating a canvas.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VolumeError {
    /// A canvas needs at least one cell per axis.
    #[error("canvas size must be at least 1")]
    ZeroSize,

    /// The canvas would not fit in memory sensibly.
    #[error("canvas size {size} exceeds maximum {max}")]
    TooLarge {
        /// Requested edge length.
        size: usize,
        /// Largest supported edge length.
        max: usize,
    },
}

/// Result type for volume operations.
pub type VolumeResult<T> = Result<T, VolumeError>;
