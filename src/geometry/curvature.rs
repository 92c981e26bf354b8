// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discrete curvature (turning angles) along a projected 2D path.

/// Compute the turning angle at every interior point of a 2D path.
///
/// For each interior point the angle between the incoming and outgoing
/// direction vectors is measured in radians: `0` for a straight
/// continuation, `π/2` for a right-angle turn, approaching `π` for a
/// reversal. The cosine is clamped to `[-1, 1]` before `acos` to guard
/// against floating-point overshoot.
///
/// Returns one angle per interior point (`points.len() - 2` values), or an
/// empty vector for paths shorter than three points. Never fails: a
/// repeated point (zero-length segment) contributes an angle of `0.0`.
///
/// # Example
///
/// ```
/// use candle_traj::compute_curvature;
///
/// // Right-angle turn at (1, 0).
/// let angles = compute_curvature(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]);
/// assert_eq!(angles.len(), 1);
/// assert!((angles[0] - std::f32::consts::FRAC_PI_2).abs() < 1e-3);
/// ```
#[must_use]
pub fn compute_curvature(points: &[[f32; 2]]) -> Vec<f32> {
    if points.len() < 3 {
        return Vec::new();
    }

    points
        .windows(3)
        .map(|w| match w {
            [p0, p1, p2] => turning_angle(*p0, *p1, *p2),
            _ => 0.0,
        })
        .collect()
}

/// Angle between the segments `p0 → p1` and `p1 → p2`.
fn turning_angle(p0: [f32; 2], p1: [f32; 2], p2: [f32; 2]) -> f32 {
    let v1 = [p1[0] - p0[0], p1[1] - p0[1]];
    let v2 = [p2[0] - p1[0], p2[1] - p1[1]];

    let norm_prod = v1[0].hypot(v1[1]) * v2[0].hypot(v2[1]);
    if norm_prod == 0.0 {
        return 0.0;
    }

    let cos = v1[0].mul_add(v2[0], v1[1] * v2[1]) / norm_prod;
    cos.clamp(-1.0, 1.0).acos()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn short_paths_are_empty() {
        assert!(compute_curvature(&[]).is_empty());
        assert!(compute_curvature(&[[0.0, 0.0]]).is_empty());
        assert!(compute_curvature(&[[0.0, 0.0], [1.0, 1.0]]).is_empty());
    }

    #[test]
    fn collinear_is_zero() {
        let angles = compute_curvature(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]]);
        assert_eq!(angles.len(), 1);
        assert!(angles[0].abs() < 1e-3);
    }

    #[test]
    fn right_angle_turn() {
        let angles = compute_curvature(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]);
        assert_eq!(angles.len(), 1);
        assert!((angles[0] - FRAC_PI_2).abs() < 1e-3);
    }

    #[test]
    fn reversal_is_pi() {
        let angles = compute_curvature(&[[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]]);
        assert!((angles[0] - PI).abs() < 1e-3);
    }

    #[test]
    fn repeated_point_emits_zero() {
        let angles = compute_curvature(&[[0.0, 0.0], [0.0, 0.0], [1.0, 0.0]]);
        assert_eq!(angles.len(), 1);
        assert_eq!(angles[0], 0.0);
    }

    #[test]
    fn length_is_interior_count() {
        let path: Vec<[f32; 2]> = (0..10).map(|i| [f32::from(i as u8), 0.0]).collect();
        assert_eq!(compute_curvature(&path).len(), 8);
    }

    #[test]
    fn never_panics_on_degenerate_input() {
        let zeros = [[0.0f32, 0.0]; 5];
        let angles = compute_curvature(&zeros);
        assert_eq!(angles.len(), 3);
        assert!(angles.iter().all(|a| *a == 0.0));
    }
}
