// SPDX-License-Identifier: MIT OR Apache-2.0

//! # candle-traj
//!
//! Hidden-state trajectory geometry for language models in Rust, built on
//! [candle](https://github.com/huggingface/candle).
//!
//! candle-traj extracts per-layer and per-step hidden-state trajectories
//! from causal LMs and analyzes their geometry: layer-wise semantic
//! alignment across prompt groups, joint PCA projection into a shared
//! low-dimensional frame, and discrete curvature along the resulting
//! paths.
//!
//! The geometry engines are pure functions over [`Trajectory`] values —
//! no model, device, or file handles anywhere in them. Model access goes
//! through the [`HiddenStateBackend`] trait; any candle model that can
//! report its per-layer hidden states plugs in.
//!
//! ```
//! use candle_traj::{compute_alignment_profile, Trajectory};
//!
//! let a = Trajectory::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
//! let b = Trajectory::from_rows(vec![vec![2.0, 0.0], vec![0.0, 3.0]]).unwrap();
//!
//! let profile = compute_alignment_profile(&[a, b]).unwrap();
//! assert_eq!(profile, vec![1.0, 1.0]);
//! ```

#![deny(warnings)]
#![warn(missing_docs)]

pub mod error;
pub mod geometry;
pub mod protocols;
pub mod source;
mod trajectory;

pub use error::{Result, TrajError};
pub use geometry::alignment::{compute_alignment_delta, compute_alignment_profile, AlignmentDelta};
pub use geometry::curvature::compute_curvature;
pub use geometry::projection::project_pca;
pub use protocols::{compose_prompt, SafetyProtocol};
pub use source::{
    layer_trajectories, rollout_trajectory, sample_token, ForwardRecord, HiddenStateBackend,
    HiddenTrace, Rollout,
};
pub use trajectory::Trajectory;
