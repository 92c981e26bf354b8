// SPDX-License-Identifier: MIT OR Apache-2.0

//! The [`Trajectory`] value type shared by the extraction and geometry layers.

use candle_core::{DType, Tensor};

use crate::error::{Result, TrajError};

/// An ordered sequence of fixed-dimension `f32` vectors.
///
/// Rows are indexed by layer (one forward pass) or by generation step
/// (one autoregressive rollout). Every row shares the same dimensionality;
/// construction fails with [`TrajError::Shape`] on ragged input.
///
/// Trajectories are immutable value objects: the geometry engines never
/// mutate their inputs, so one trajectory can be passed to any number of
/// calls, concurrently if desired.
///
/// # Example
///
/// ```
/// use candle_traj::Trajectory;
///
/// let traj = Trajectory::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
/// assert_eq!(traj.len(), 2);
/// assert_eq!(traj.dim(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    /// Vectors in layer/step order, each of length `dim`.
    rows: Vec<Vec<f32>>,
    /// Shared vector dimensionality (0 for an empty trajectory).
    dim: usize,
}

impl Trajectory {
    /// Create a trajectory from raw rows.
    ///
    /// # Errors
    ///
    /// Returns [`TrajError::Shape`] if the rows do not all share the same
    /// length.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let dim = rows.first().map_or(0, Vec::len);
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != dim) {
            return Err(TrajError::Shape(format!(
                "row {idx} has dimension {}, expected {dim}",
                row.len()
            )));
        }
        Ok(Self { rows, dim })
    }

    /// Create a trajectory from per-layer (or per-step) `[d]` tensors.
    ///
    /// Each tensor is flattened and converted to `f32`, matching the
    /// float32-by-convention contract of the geometry engines.
    ///
    /// # Errors
    ///
    /// Returns [`TrajError::Model`] if dtype conversion or flattening
    /// fails, and [`TrajError::Shape`] if the tensors disagree on size.
    pub fn from_tensors(tensors: &[Tensor]) -> Result<Self> {
        let rows = tensors
            .iter()
            .map(|t| {
                let flat = t.flatten_all()?;
                let data: Vec<f32> = flat.to_dtype(DType::F32)?.to_vec1()?;
                Ok(data)
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_rows(rows)
    }

    /// Number of rows (layers or steps).
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the trajectory has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Shared vector dimensionality. Zero for an empty trajectory.
    #[must_use]
    pub const fn dim(&self) -> usize {
        self.dim
    }

    /// All rows as a slice.
    #[must_use]
    pub fn rows(&self) -> &[Vec<f32>] {
        &self.rows
    }

    /// The row at `index`, or `None` if out of range.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// View a 2-dimensional trajectory as a path of 2D points.
    ///
    /// This is the seam between the projection and curvature engines:
    /// [`project_pca`](crate::project_pca) with `n_components = 2` produces
    /// trajectories this method accepts.
    ///
    /// # Errors
    ///
    /// Returns [`TrajError::Shape`] if the trajectory is non-empty and its
    /// dimensionality is not 2.
    pub fn to_points_2d(&self) -> Result<Vec<[f32; 2]>> {
        self.rows
            .iter()
            .map(|row| match row.as_slice() {
                [x, y] => Ok([*x, *y]),
                other => Err(TrajError::Shape(format!(
                    "expected 2D points, found dimension {}",
                    other.len()
                ))),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use candle_core::Device;

    #[test]
    fn from_rows_basic() {
        let traj = Trajectory::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(traj.len(), 2);
        assert_eq!(traj.dim(), 2);
        assert_eq!(traj.row(1).unwrap(), &[3.0, 4.0]);
        assert!(traj.row(2).is_none());
    }

    #[test]
    fn from_rows_empty() {
        let traj = Trajectory::from_rows(Vec::new()).unwrap();
        assert!(traj.is_empty());
        assert_eq!(traj.dim(), 0);
    }

    #[test]
    fn from_rows_ragged() {
        let err = Trajectory::from_rows(vec![vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(err, Err(TrajError::Shape(_))));
    }

    #[test]
    fn from_tensors_flattens() {
        let device = Device::Cpu;
        let t1 = Tensor::new(&[1.0f32, 2.0, 3.0], &device).unwrap();
        let t2 = Tensor::new(&[4.0f32, 5.0, 6.0], &device).unwrap();

        let traj = Trajectory::from_tensors(&[t1, t2]).unwrap();
        assert_eq!(traj.len(), 2);
        assert_eq!(traj.dim(), 3);
        assert_eq!(traj.row(0).unwrap(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn to_points_2d_requires_dim_2() {
        let traj = Trajectory::from_rows(vec![vec![0.0, 1.0], vec![1.0, 1.0]]).unwrap();
        let points = traj.to_points_2d().unwrap();
        assert_eq!(points, vec![[0.0, 1.0], [1.0, 1.0]]);

        let traj = Trajectory::from_rows(vec![vec![0.0, 1.0, 2.0]]).unwrap();
        assert!(matches!(traj.to_points_2d(), Err(TrajError::Shape(_))));
    }
}
