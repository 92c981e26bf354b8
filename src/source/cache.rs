// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capture buffer for hidden-state vectors collected during extraction.

use candle_core::Tensor;

use crate::error::Result;
use crate::trajectory::Trajectory;

/// Stores hidden-state vectors captured from forward passes.
///
/// Each tensor has shape `[d_model]` — the residual stream at the final
/// sequence position. Entries are indexed by layer in single-pass mode
/// and by generation step in rollout mode.
///
/// # Example
///
/// ```
/// use candle_traj::HiddenTrace;
/// use candle_core::{Device, Tensor};
///
/// let mut trace = HiddenTrace::with_capacity(32);
/// trace.push(Tensor::zeros(128, candle_core::DType::F32, &Device::Cpu).unwrap());
/// trace.push(Tensor::zeros(128, candle_core::DType::F32, &Device::Cpu).unwrap());
/// assert_eq!(trace.len(), 2);
///
/// let traj = trace.into_trajectory().unwrap();
/// assert_eq!(traj.dim(), 128);
/// ```
#[derive(Debug, Default)]
pub struct HiddenTrace {
    /// Captured vectors in layer/step order, each shape `[d_model]`.
    vectors: Vec<Tensor>,
}

impl HiddenTrace {
    /// Create an empty trace with capacity for `n` vectors.
    #[must_use]
    pub fn with_capacity(n: usize) -> Self {
        Self {
            vectors: Vec::with_capacity(n),
        }
    }

    /// Add a captured vector to the trace.
    pub fn push(&mut self, tensor: Tensor) {
        self.vectors.push(tensor);
    }

    /// Get the vector at a specific layer/step index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Tensor> {
        self.vectors.get(index)
    }

    /// Number of captured vectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the trace is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// All captured vectors as a slice.
    #[must_use]
    pub fn vectors(&self) -> &[Tensor] {
        &self.vectors
    }

    /// Convert the trace into a [`Trajectory`] of `f32` rows.
    ///
    /// This is the handoff point between extraction and geometry: from
    /// here on, no tensor or device resource is referenced.
    ///
    /// # Errors
    ///
    /// Returns [`TrajError::Model`](crate::TrajError::Model) if dtype
    /// conversion fails, or [`TrajError::Shape`](crate::TrajError::Shape)
    /// if the captured vectors disagree on size.
    pub fn into_trajectory(self) -> Result<Trajectory> {
        Trajectory::from_tensors(&self.vectors)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};

    #[test]
    fn trace_basic() {
        let device = Device::Cpu;
        let mut trace = HiddenTrace::with_capacity(2);

        assert!(trace.is_empty());

        trace.push(Tensor::zeros(64, DType::F32, &device).unwrap());
        trace.push(Tensor::zeros(64, DType::F32, &device).unwrap());

        assert_eq!(trace.len(), 2);
        assert!(trace.get(0).is_some());
        assert!(trace.get(2).is_none());
    }

    #[test]
    fn into_trajectory_preserves_order() {
        let device = Device::Cpu;
        let mut trace = HiddenTrace::with_capacity(2);
        trace.push(Tensor::new(&[1.0f32, 2.0], &device).unwrap());
        trace.push(Tensor::new(&[3.0f32, 4.0], &device).unwrap());

        let traj = trace.into_trajectory().unwrap();
        assert_eq!(traj.len(), 2);
        assert_eq!(traj.row(0).unwrap(), &[1.0, 2.0]);
        assert_eq!(traj.row(1).unwrap(), &[3.0, 4.0]);
    }

    #[test]
    fn mismatched_sizes_fail() {
        let device = Device::Cpu;
        let mut trace = HiddenTrace::with_capacity(2);
        trace.push(Tensor::new(&[1.0f32, 2.0], &device).unwrap());
        trace.push(Tensor::new(&[3.0f32], &device).unwrap());

        assert!(trace.into_trajectory().is_err());
    }
}
