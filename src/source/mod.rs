// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trajectory source: the extraction layer feeding the geometry engines.
//!
//! - [`HiddenStateBackend`] — the contract a causal LM fulfils to have
//!   trajectories extracted from it.
//! - [`HiddenTrace`] — capture buffer for hidden-state vectors.
//! - [`layer_trajectories`] — one forward pass per prompt, the last-token
//!   vector at every layer.
//! - [`rollout_trajectory`] — autoregressive rollout recording the
//!   final-layer last-token vector at every step.

mod backend;
mod cache;
mod extract;

pub use backend::{sample_token, ForwardRecord, HiddenStateBackend};
pub use cache::HiddenTrace;
pub use extract::{layer_trajectories, rollout_trajectory, Rollout};
