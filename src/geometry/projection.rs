// SPDX-License-Identifier: MIT OR Apache-2.0

//! Joint PCA projection of trajectories into a shared low-dimensional frame.
//!
//! All trajectories passed to one [`project_pca`] call are pooled into a
//! single matrix and reduced with one PCA fit, so every returned trajectory
//! lives in the *same* coordinate frame. The fit is an in-process SVD of
//! the mean-centered pooled matrix; no external solver is involved.

use nalgebra::{DMatrix, DVector};

use crate::error::{Result, TrajError};
use crate::trajectory::Trajectory;

/// Project trajectories into a shared `n_components`-dimensional space.
///
/// Vectors from all trajectories are concatenated in input order, a single
/// PCA basis is fitted on the pooled matrix, and the projected rows are
/// split back into per-trajectory chunks preserving original lengths and
/// order. Trajectory lengths may vary; dimensions must agree.
///
/// The coordinate frame is **call-scoped**: fitting depends on the pooled
/// set, so projecting the same trajectories in two separate calls (with
/// different companions) generally yields different coordinates. Pass
/// everything you intend to compare in one call. Component signs are an
/// arbitrary (but deterministic) artifact of the SVD.
///
/// # Example
///
/// ```
/// use candle_traj::{project_pca, Trajectory};
///
/// let a = Trajectory::from_rows(vec![vec![0.0, 0.0, 1.0], vec![1.0, 0.1, 0.9]]).unwrap();
/// let b = Trajectory::from_rows(vec![vec![2.0, 0.2, 1.1], vec![3.0, 0.3, 1.0], vec![4.0, 0.4, 0.9]]).unwrap();
///
/// let projected = project_pca(&[a, b], 2).unwrap();
/// assert_eq!(projected.len(), 2);
/// assert_eq!(projected[0].len(), 2);
/// assert_eq!(projected[1].len(), 3);
/// assert_eq!(projected[0].dim(), 2);
/// ```
///
/// # Errors
///
/// Returns [`TrajError::Shape`] if the trajectories disagree on vector
/// dimensionality, or if `n_components` exceeds the pooled row count or
/// the dimension (the fit is undefined there).
pub fn project_pca(trajectories: &[Trajectory], n_components: usize) -> Result<Vec<Trajectory>> {
    if trajectories.is_empty() {
        return Ok(Vec::new());
    }

    // Zero-length trajectories contribute no rows and carry no dimension;
    // they pass through as empty outputs.
    let dim = trajectories
        .iter()
        .find(|t| !t.is_empty())
        .map_or(0, Trajectory::dim);
    for (idx, traj) in trajectories.iter().enumerate() {
        if !traj.is_empty() && traj.dim() != dim {
            return Err(TrajError::Shape(format!(
                "trajectory {idx} has dimension {}, expected {dim}",
                traj.dim()
            )));
        }
    }

    let total_rows: usize = trajectories.iter().map(Trajectory::len).sum();
    if n_components > total_rows.min(dim) {
        return Err(TrajError::Shape(format!(
            "cannot fit {n_components} components on {total_rows} pooled rows of dimension {dim}"
        )));
    }
    if total_rows == 0 || n_components == 0 {
        return trajectories
            .iter()
            .map(|t| Trajectory::from_rows(vec![Vec::new(); t.len()]))
            .collect();
    }

    let pooled = DMatrix::from_row_iterator(
        total_rows,
        dim,
        trajectories
            .iter()
            .flat_map(|t| t.rows().iter().flatten().copied()),
    );

    // Center, then project onto the top right-singular vectors.
    let mean = pooled.row_mean();
    let ones = DVector::from_element(total_rows, 1.0f32);
    let centered = &pooled - &ones * &mean;

    let svd = centered.clone().svd(false, true);
    let v_t = svd
        .v_t
        .ok_or_else(|| TrajError::Shape("SVD did not produce right-singular vectors".into()))?;
    let basis = v_t.rows(0, n_components).transpose();
    let projected = &centered * &basis;

    let mut out = Vec::with_capacity(trajectories.len());
    let mut offset = 0;
    for traj in trajectories {
        let rows = (offset..offset + traj.len())
            .map(|i| projected.row(i).iter().copied().collect::<Vec<f32>>())
            .collect();
        out.push(Trajectory::from_rows(rows)?);
        offset += traj.len();
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    fn traj(rows: Vec<Vec<f32>>) -> Trajectory {
        Trajectory::from_rows(rows).unwrap()
    }

    #[test]
    fn empty_input_empty_output() {
        let projected = project_pca(&[], 2).unwrap();
        assert!(projected.is_empty());
    }

    #[test]
    fn preserves_lengths_and_order() {
        let a = traj(vec![vec![1.0, 0.0, 0.0], vec![2.0, 0.1, 0.0]]);
        let b = traj(vec![
            vec![3.0, 0.2, 0.1],
            vec![4.0, 0.1, 0.2],
            vec![5.0, 0.0, 0.1],
        ]);
        let c = traj(vec![vec![6.0, 0.3, 0.0]]);

        let projected = project_pca(&[a, b, c], 2).unwrap();
        assert_eq!(projected.len(), 3);
        assert_eq!(projected[0].len(), 2);
        assert_eq!(projected[1].len(), 3);
        assert_eq!(projected[2].len(), 1);
        assert!(projected.iter().all(|t| t.dim() == 2));

        // Re-pooling the chunks reconstructs the input row count.
        let total: usize = projected.iter().map(Trajectory::len).sum();
        assert_eq!(total, 6);
    }

    #[test]
    fn dominant_axis_maps_to_first_component() {
        // Points spread along one axis with slight noise on another: the
        // first component must carry (much) more variance than the second.
        let a = traj(vec![
            vec![0.0, 0.01, 0.0],
            vec![1.0, -0.02, 0.0],
            vec![2.0, 0.015, 0.0],
            vec![3.0, -0.01, 0.0],
        ]);
        let projected = project_pca(&[a], 2).unwrap();

        let var = |idx: usize| -> f32 {
            let vals: Vec<f32> = projected[0].rows().iter().map(|r| r[idx]).collect();
            let mean = vals.iter().sum::<f32>() / 4.0;
            vals.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / 4.0
        };
        assert!(var(0) > 10.0 * var(1));
    }

    #[test]
    fn frame_is_call_scoped() {
        // A and B spread along x; C spreads along y and shifts the pooled
        // distribution, so A's coordinates must differ between the calls.
        let a = traj(vec![
            vec![0.0, 0.1, 0.0],
            vec![1.0, 0.0, 0.1],
            vec![2.0, 0.1, 0.0],
        ]);
        let b = traj(vec![vec![3.0, 0.0, 0.1], vec![4.0, 0.1, 0.0]]);
        let c = traj(vec![
            vec![0.0, 10.0, 0.0],
            vec![0.0, 20.0, 0.0],
            vec![0.0, 30.0, 0.0],
        ]);

        let joint_ab = project_pca(&[a.clone(), b.clone()], 2).unwrap();
        let joint_abc = project_pca(&[a, b, c], 2).unwrap();

        let a_in_ab = &joint_ab[0];
        let a_in_abc = &joint_abc[0];
        let max_diff = a_in_ab
            .rows()
            .iter()
            .zip(a_in_abc.rows().iter())
            .flat_map(|(r1, r2)| r1.iter().zip(r2.iter()).map(|(x, y)| (x - y).abs()))
            .fold(0.0f32, f32::max);
        assert!(max_diff > 1e-3, "frames unexpectedly agree: {max_diff}");
    }

    #[test]
    fn mismatched_dimension_fails() {
        let a = traj(vec![vec![1.0, 0.0]]);
        let b = traj(vec![vec![1.0, 0.0, 0.0]]);
        let err = project_pca(&[a, b], 1);
        assert!(matches!(err, Err(TrajError::Shape(_))));
    }

    #[test]
    fn too_many_components_fails() {
        let a = traj(vec![vec![1.0, 0.0, 0.0]]);
        // One pooled row cannot support a 2-component fit.
        let err = project_pca(&[a], 2);
        assert!(matches!(err, Err(TrajError::Shape(_))));

        let b = traj(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]]);
        // Dimension 2 cannot support a 3-component fit.
        let err = project_pca(&[b], 3);
        assert!(matches!(err, Err(TrajError::Shape(_))));
    }

    #[test]
    fn zero_length_trajectories_pass_through() {
        let empty = traj(Vec::new());
        let a = traj(vec![vec![1.0, 0.0], vec![2.0, 0.5], vec![3.0, 0.2]]);

        let projected = project_pca(&[empty, a], 2).unwrap();
        assert_eq!(projected.len(), 2);
        assert!(projected[0].is_empty());
        assert_eq!(projected[1].len(), 3);
    }
}
