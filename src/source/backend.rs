// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend trait for models that expose per-layer hidden states.

use candle_core::{DType, Device, Tensor};

use crate::error::{Result, TrajError};

/// Per-layer hidden states and output logits from one forward pass.
#[derive(Debug)]
pub struct ForwardRecord {
    /// Hidden states per layer, each `[batch, seq, d_model]`, ordered
    /// from the first block's output to the last.
    pub hidden_states: Vec<Tensor>,
    /// Output logits, `[batch, seq, vocab_size]`.
    pub logits: Tensor,
}

/// Unified interface for causal LMs that expose per-layer hidden states.
///
/// Implementing this trait is the only requirement for extracting
/// trajectories from a model. This crate never loads, downloads, or frees
/// model resources itself: weight and device lifecycles stay with the
/// implementor, acquired and released in whatever scope the caller
/// chooses. The extraction functions only ever see already-materialized
/// tensors through [`forward`](Self::forward).
pub trait HiddenStateBackend: Send + Sync {
    /// Number of layers (transformer blocks).
    fn num_layers(&self) -> usize;

    /// Hidden dimension (`d_model`).
    fn hidden_size(&self) -> usize;

    /// Vocabulary size.
    fn vocab_size(&self) -> usize;

    /// Device the model's tensors live on.
    fn device(&self) -> &Device;

    /// Forward pass recording the hidden state after every block.
    ///
    /// # Shapes
    /// - `input_ids`: `[batch, seq]` -- token IDs
    /// - returns: [`ForwardRecord`] with one `[batch, seq, d_model]`
    ///   tensor per layer plus `[batch, seq, vocab_size]` logits
    ///
    /// # Errors
    ///
    /// Returns [`TrajError::Model`] on tensor operation failures.
    fn forward(&self, input_ids: &Tensor) -> Result<ForwardRecord>;
}

// ---------------------------------------------------------------------------
// Sampling helpers
// ---------------------------------------------------------------------------

/// Sample a token from logits using the given temperature.
///
/// When `temperature <= 0.0`, performs greedy (argmax) decoding.
///
/// # Shapes
/// - `logits`: `[vocab_size]` -- logit scores for each vocabulary token
///
/// # Errors
///
/// Returns [`TrajError::Model`] if the logits tensor is empty or
/// cannot be converted to `f32`.
pub fn sample_token(logits: &Tensor, temperature: f32) -> Result<u32> {
    if temperature <= 0.0 {
        argmax(logits)
    } else {
        sample_with_temperature(logits, temperature)
    }
}

/// Greedy (argmax) sampling.
fn argmax(logits: &Tensor) -> Result<u32> {
    let logits_f32 = logits.to_dtype(DType::F32)?;
    let logits_vec: Vec<f32> = logits_f32.flatten_all()?.to_vec1()?;

    let (max_idx, _) = logits_vec
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .ok_or_else(|| TrajError::Model(candle_core::Error::Msg("empty logits".into())))?;

    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    Ok(max_idx as u32)
}

/// Temperature-scaled softmax sampling.
fn sample_with_temperature(logits: &Tensor, temperature: f32) -> Result<u32> {
    use rand::Rng;

    let logits_f32 = logits.to_dtype(DType::F32)?;
    let logits_vec: Vec<f32> = logits_f32.flatten_all()?.to_vec1()?;

    // Scale by temperature.
    let scaled: Vec<f32> = logits_vec.iter().map(|x| x / temperature).collect();

    // Numerically stable softmax.
    let max_val = scaled.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp_vals: Vec<f32> = scaled.iter().map(|x| (x - max_val).exp()).collect();
    let sum: f32 = exp_vals.iter().sum();
    let probs: Vec<f32> = exp_vals.iter().map(|x| x / sum).collect();

    // Sample from the categorical distribution.
    let mut rng = rand::thread_rng();
    let r: f32 = rng.r#gen();
    let mut cumsum = 0.0;
    for (idx, &p) in probs.iter().enumerate() {
        cumsum += p;
        if r < cumsum {
            #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
            return Ok(idx as u32);
        }
    }

    // Fallback to last token (floating-point rounding edge case).
    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    Ok((probs.len() - 1) as u32)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use candle_core::Device;

    #[test]
    fn greedy_picks_argmax() {
        let device = Device::Cpu;
        let logits = Tensor::new(&[0.1f32, 2.0, 0.3, -1.0], &device).unwrap();
        assert_eq!(sample_token(&logits, 0.0).unwrap(), 1);
        assert_eq!(sample_token(&logits, -1.0).unwrap(), 1);
    }

    #[test]
    fn temperature_sampling_in_range() {
        let device = Device::Cpu;
        let logits = Tensor::new(&[0.5f32, 0.5, 0.5], &device).unwrap();
        for _ in 0..20 {
            let token = sample_token(&logits, 0.8).unwrap();
            assert!(token < 3);
        }
    }

    #[test]
    fn peaked_distribution_samples_peak() {
        let device = Device::Cpu;
        // One overwhelming logit: even with temperature, the peak wins.
        let logits = Tensor::new(&[0.0f32, 100.0, 0.0], &device).unwrap();
        assert_eq!(sample_token(&logits, 0.5).unwrap(), 1);
    }
}
