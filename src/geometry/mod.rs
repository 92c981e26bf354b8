// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trajectory geometry: alignment, projection, curvature.
//!
//! - [`alignment`] — layer-wise semantic alignment profiles and their
//!   signed delta between two prompt groups.
//! - [`projection`] — joint PCA of variable-length trajectories into a
//!   shared low-dimensional frame.
//! - [`curvature`] — discrete turning angles along a projected 2D path.
//!
//! All three engines are pure, synchronous functions over immutable
//! inputs: no shared state, no mutation of arguments, safe to call from
//! multiple threads.

pub mod alignment;
pub mod curvature;
pub mod projection;
