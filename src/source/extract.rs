// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trajectory extraction: single-pass per-layer and autoregressive per-step.
//!
//! Both entry points are generic over [`HiddenStateBackend`]; they build
//! input tensors on the backend's device, run its forward pass, and slice
//! out last-token vectors. Everything downstream operates on plain
//! [`Trajectory`] values.

use candle_core::Tensor;
use tracing::{debug, info};

use crate::error::{Result, TrajError};
use crate::source::backend::{sample_token, HiddenStateBackend};
use crate::source::cache::HiddenTrace;
use crate::trajectory::Trajectory;

/// One autoregressive rollout: the hidden-state trajectory plus the
/// tokens that were emitted along the way.
#[derive(Debug, Clone)]
pub struct Rollout {
    /// Final-layer last-token hidden state at each step, shape
    /// `(num_steps, d_model)`.
    pub trajectory: Trajectory,
    /// Token IDs generated during the rollout, one per step.
    pub tokens: Vec<u32>,
}

/// Extract one per-layer trajectory per prompt.
///
/// For each prompt (already-tokenized IDs), runs a single forward pass and
/// collects the last-token hidden state at every layer, yielding one
/// trajectory of shape `(num_layers, d_model)` per prompt. All trajectories
/// from one call share the backend's layer count, so they can be fed
/// directly to [`compute_alignment_profile`](crate::compute_alignment_profile).
///
/// # Errors
///
/// Returns [`TrajError::Shape`] for an empty prompt and
/// [`TrajError::Model`] on tensor failures in the backend.
pub fn layer_trajectories<B>(backend: &B, prompts: &[Vec<u32>]) -> Result<Vec<Trajectory>>
where
    B: HiddenStateBackend + ?Sized,
{
    info!(n_prompts = prompts.len(), "extracting layer trajectories");

    prompts
        .iter()
        .enumerate()
        .map(|(idx, prompt)| {
            if prompt.is_empty() {
                return Err(TrajError::Shape(format!("prompt {idx} is empty")));
            }
            let input = Tensor::new(prompt.as_slice(), backend.device())?.unsqueeze(0)?;
            let record = backend.forward(&input)?;

            let mut trace = HiddenTrace::with_capacity(record.hidden_states.len());
            for hidden in &record.hidden_states {
                trace.push(last_token_vector(hidden)?);
            }
            trace.into_trajectory()
        })
        .collect()
}

/// Autoregressively generate `num_steps` tokens, recording the final-layer
/// last-token hidden state before each one is appended.
///
/// Decoding is greedy (argmax) when `temperature <= 0.0`, otherwise
/// temperature-scaled sampling. The full sequence is re-run every step;
/// with a step budget of tens of tokens this keeps the backend contract
/// minimal (no KV cache required).
///
/// # Errors
///
/// Returns [`TrajError::Shape`] for an empty prompt or a backend that
/// reports no hidden states, and [`TrajError::Model`] on tensor failures.
pub fn rollout_trajectory<B>(
    backend: &B,
    prompt_ids: &[u32],
    num_steps: usize,
    temperature: f32,
) -> Result<Rollout>
where
    B: HiddenStateBackend + ?Sized,
{
    if prompt_ids.is_empty() {
        return Err(TrajError::Shape("rollout prompt is empty".into()));
    }
    info!(
        prompt_len = prompt_ids.len(),
        num_steps, "extracting rollout trajectory"
    );

    let mut current = prompt_ids.to_vec();
    let mut trace = HiddenTrace::with_capacity(num_steps);
    let mut tokens = Vec::with_capacity(num_steps);

    for step in 0..num_steps {
        let input = Tensor::new(current.as_slice(), backend.device())?.unsqueeze(0)?;
        let record = backend.forward(&input)?;

        let final_hidden = record
            .hidden_states
            .last()
            .ok_or_else(|| TrajError::Shape("backend returned no hidden states".into()))?;
        trace.push(last_token_vector(final_hidden)?);

        let next = sample_token(&last_token_vector(&record.logits)?, temperature)?;
        debug!(step, token = next, "rollout step");
        tokens.push(next);
        current.push(next);
    }

    Ok(Rollout {
        trajectory: trace.into_trajectory()?,
        tokens,
    })
}

/// Slice the final-position vector out of a `[batch, seq, d]` tensor.
///
/// Uses the first batch element, matching the single-prompt extraction
/// contract.
fn last_token_vector(tensor: &Tensor) -> Result<Tensor> {
    let seq_len = tensor.dim(1)?;
    if seq_len == 0 {
        return Err(TrajError::Shape("zero-length sequence".into()));
    }
    Ok(tensor.get(0)?.get(seq_len - 1)?)
}
