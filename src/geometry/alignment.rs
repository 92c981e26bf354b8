// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layer-wise semantic alignment A(ℓ) and the alignment delta ΔA
//! between two prompt groups.
//!
//! Given N trajectories of shape `(L, D)` — one per prompt — the profile
//! at layer ℓ is the average pairwise cosine similarity among the N layer
//! vectors, rescaled from `[-1, 1]` to `[0, 1]`. A single scalar per layer,
//! robust to the number of prompts.

use crate::error::{Result, TrajError};
use crate::trajectory::Trajectory;

/// Epsilon added to L2 norms so all-zero vectors normalize to zero
/// instead of dividing by zero.
const NORM_EPS: f32 = 1e-8;

/// Alignment profiles for two prompt groups and their signed difference.
///
/// All four sequences share the same length: the minimum of the two
/// groups' layer counts. Comparing models or configurations with different
/// depths truncates to the common prefix rather than failing.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentDelta {
    /// Layer indices `0..L` for the common prefix.
    pub layers: Vec<usize>,
    /// Alignment profile of the tight (semantically clustered) group.
    pub tight: Vec<f32>,
    /// Alignment profile of the sparse (semantically scattered) group.
    pub sparse: Vec<f32>,
    /// Elementwise `tight - sparse`. Signed, unclamped.
    pub delta: Vec<f32>,
}

/// Compute the layer-wise alignment profile for a group of trajectories.
///
/// Each trajectory must have the same layer count and vector dimension.
/// For every layer the N layer vectors are L2-normalized, all `i < j`
/// pairwise cosine similarities are taken once, mapped through
/// `(s + 1) / 2`, and averaged.
///
/// Degenerate inputs are defined, non-failing cases:
/// - an empty group yields an empty profile;
/// - a single-trajectory group (no pairs) yields `0.0` at every layer;
/// - an all-zero layer vector normalizes to zero rather than erroring.
///
/// # Example
///
/// ```
/// use candle_traj::{compute_alignment_profile, Trajectory};
///
/// // Two prompts pointing the same way at layer 0, opposite at layer 1.
/// let a = Trajectory::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
/// let b = Trajectory::from_rows(vec![vec![3.0, 0.0], vec![0.0, -2.0]]).unwrap();
///
/// let profile = compute_alignment_profile(&[a, b]).unwrap();
/// assert_eq!(profile, vec![1.0, 0.0]);
/// ```
///
/// # Errors
///
/// Returns [`TrajError::Shape`] if the trajectories do not share a layer
/// count and dimension.
pub fn compute_alignment_profile(trajectories: &[Trajectory]) -> Result<Vec<f32>> {
    let Some(first) = trajectories.first() else {
        return Ok(Vec::new());
    };
    let n_layers = first.len();
    let dim = first.dim();
    for (idx, traj) in trajectories.iter().enumerate() {
        if traj.len() != n_layers || traj.dim() != dim {
            return Err(TrajError::Shape(format!(
                "trajectory {idx} has shape ({}, {}), expected ({n_layers}, {dim})",
                traj.len(),
                traj.dim()
            )));
        }
    }

    let mut profile = Vec::with_capacity(n_layers);
    for layer in 0..n_layers {
        let normed = trajectories
            .iter()
            .map(|traj| {
                traj.row(layer)
                    .map(normalize)
                    .ok_or_else(|| TrajError::Shape(format!("missing layer {layer}")))
            })
            .collect::<Result<Vec<_>>>()?;
        profile.push(mean_pairwise_agreement(&normed));
    }
    Ok(profile)
}

/// Compute both profiles and their signed delta for a tight vs. sparse
/// prompt-group comparison.
///
/// The two profiles are computed independently, then truncated to the
/// shorter length along with the layer-index sequence. If either group
/// yields an empty profile, all four outputs are empty.
///
/// # Errors
///
/// Returns [`TrajError::Shape`] if either group has internally
/// inconsistent shapes.
pub fn compute_alignment_delta(
    tight: &[Trajectory],
    sparse: &[Trajectory],
) -> Result<AlignmentDelta> {
    let mut a_tight = compute_alignment_profile(tight)?;
    let mut a_sparse = compute_alignment_profile(sparse)?;

    let n_layers = a_tight.len().min(a_sparse.len());
    a_tight.truncate(n_layers);
    a_sparse.truncate(n_layers);

    let delta = a_tight
        .iter()
        .zip(a_sparse.iter())
        .map(|(t, s)| t - s)
        .collect();

    Ok(AlignmentDelta {
        layers: (0..n_layers).collect(),
        tight: a_tight,
        sparse: a_sparse,
        delta,
    })
}

/// L2-normalize a vector with [`NORM_EPS`] on the denominator.
fn normalize(v: &[f32]) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt() + NORM_EPS;
    v.iter().map(|x| x / norm).collect()
}

/// Average `(cos + 1) / 2` over all unordered pairs of unit vectors.
///
/// Returns `0.0` when there are fewer than two vectors.
fn mean_pairwise_agreement(normed: &[Vec<f32>]) -> f32 {
    let mut sum = 0.0f32;
    let mut pairs = 0usize;
    for (i, a) in normed.iter().enumerate() {
        for b in normed.iter().skip(i + 1) {
            let cos: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
            sum += (cos + 1.0) / 2.0;
            pairs += 1;
        }
    }
    if pairs == 0 {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
        let count = pairs as f32;
        sum / count
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn traj(rows: Vec<Vec<f32>>) -> Trajectory {
        Trajectory::from_rows(rows).unwrap()
    }

    #[test]
    fn empty_group_empty_profile() {
        let profile = compute_alignment_profile(&[]).unwrap();
        assert!(profile.is_empty());
    }

    #[test]
    fn single_trajectory_is_zero() {
        let t = traj(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]);
        let profile = compute_alignment_profile(&[t]).unwrap();
        assert_eq!(profile, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn identical_direction_is_one() {
        // Same direction, different positive scales.
        let a = traj(vec![vec![1.0, 0.0, 0.0]]);
        let b = traj(vec![vec![4.0, 0.0, 0.0]]);
        let profile = compute_alignment_profile(&[a, b]).unwrap();
        assert_eq!(profile, vec![1.0]);
    }

    #[test]
    fn opposite_direction_is_zero() {
        let a = traj(vec![vec![0.0, 2.0]]);
        let b = traj(vec![vec![0.0, -2.0]]);
        let profile = compute_alignment_profile(&[a, b]).unwrap();
        assert_eq!(profile, vec![0.0]);
    }

    #[test]
    fn orthogonal_direction_is_half() {
        let a = traj(vec![vec![1.0, 0.0]]);
        let b = traj(vec![vec![0.0, 1.0]]);
        let profile = compute_alignment_profile(&[a, b]).unwrap();
        assert!((profile.first().unwrap() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn zero_vectors_do_not_fail() {
        let a = traj(vec![vec![0.0, 0.0]]);
        let b = traj(vec![vec![0.0, 0.0]]);
        let profile = compute_alignment_profile(&[a, b]).unwrap();
        // Zero vectors normalize to zero: cos = 0, mapped to 0.5.
        assert!((profile.first().unwrap() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn profile_length_and_range() {
        let a = traj(vec![vec![1.0, 2.0], vec![-1.0, 0.5], vec![0.3, 0.3]]);
        let b = traj(vec![vec![2.0, -1.0], vec![0.1, 0.9], vec![-0.3, 0.3]]);
        let c = traj(vec![vec![0.5, 0.5], vec![1.0, 1.0], vec![0.0, -1.0]]);

        let profile = compute_alignment_profile(&[a, b, c]).unwrap();
        assert_eq!(profile.len(), 3);
        assert!(profile.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn mismatched_layer_count_fails() {
        let a = traj(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        let b = traj(vec![vec![1.0, 0.0]]);
        let err = compute_alignment_profile(&[a, b]);
        assert!(matches!(err, Err(TrajError::Shape(_))));
    }

    #[test]
    fn mismatched_dim_fails() {
        let a = traj(vec![vec![1.0, 0.0]]);
        let b = traj(vec![vec![1.0, 0.0, 0.0]]);
        let err = compute_alignment_profile(&[a, b]);
        assert!(matches!(err, Err(TrajError::Shape(_))));
    }

    #[test]
    fn delta_truncates_to_shorter_profile() {
        let tight_a = traj(vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![1.0, 0.0]]);
        let tight_b = traj(vec![vec![2.0, 0.0], vec![2.0, 0.0], vec![2.0, 0.0]]);
        let sparse_a = traj(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        let sparse_b = traj(vec![vec![-1.0, 0.0], vec![0.0, -1.0]]);

        let result = compute_alignment_delta(&[tight_a, tight_b], &[sparse_a, sparse_b]).unwrap();
        assert_eq!(result.layers, vec![0, 1]);
        assert_eq!(result.tight.len(), 2);
        assert_eq!(result.sparse.len(), 2);
        assert_eq!(result.delta.len(), 2);

        for ((t, s), d) in result
            .tight
            .iter()
            .zip(result.sparse.iter())
            .zip(result.delta.iter())
        {
            assert!((t - s - d).abs() < 1e-6);
        }
    }

    #[test]
    fn delta_can_be_negative() {
        // Sparse group more aligned than tight group.
        let tight_a = traj(vec![vec![1.0, 0.0]]);
        let tight_b = traj(vec![vec![-1.0, 0.0]]);
        let sparse_a = traj(vec![vec![0.0, 1.0]]);
        let sparse_b = traj(vec![vec![0.0, 3.0]]);

        let result = compute_alignment_delta(&[tight_a, tight_b], &[sparse_a, sparse_b]).unwrap();
        assert!(result.delta.first().unwrap() < &0.0);
    }

    #[test]
    fn delta_empty_when_either_group_empty() {
        let a = traj(vec![vec![1.0, 0.0]]);
        let result = compute_alignment_delta(&[a], &[]).unwrap();
        assert!(result.layers.is_empty());
        assert!(result.tight.is_empty());
        assert!(result.sparse.is_empty());
        assert!(result.delta.is_empty());
    }
}
