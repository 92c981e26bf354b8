// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for candle-traj.

/// Errors that can occur during trajectory extraction or analysis.
#[derive(Debug, thiserror::Error)]
pub enum TrajError {
    /// Trajectory shape mismatch: ragged rows, mixed dimensionality or
    /// layer counts within one call, or an invalid component count.
    #[error("shape error: {0}")]
    Shape(String),

    /// Tensor extraction or forward pass error (wraps candle).
    #[error("model error: {0}")]
    Model(#[from] candle_core::Error),

    /// Safety-protocol configuration parse error.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Result type alias for candle-traj operations.
pub type Result<T> = std::result::Result<T, TrajError>;
