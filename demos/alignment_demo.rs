// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layer-wise alignment A(ℓ) and ΔA(ℓ) for a tight vs. sparse prompt group.
//!
//! ```bash
//! cargo run --release --example alignment_demo
//! ```
//!
//! Uses synthetic trajectories so the demo runs without model weights: the
//! tight group clusters around one direction per layer, the sparse group
//! scatters uniformly. With a real model, build the groups with
//! `layer_trajectories()` over paraphrases vs. random topics instead.

use candle_traj::{compute_alignment_delta, Trajectory};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const N_LAYERS: usize = 16;
const DIM: usize = 128;
const N_PROMPTS: usize = 10;

fn main() -> candle_traj::Result<()> {
    let mut rng = StdRng::seed_from_u64(42);

    // Tight group: paraphrase-like, one shared direction per layer.
    let bases: Vec<Vec<f32>> = (0..N_LAYERS)
        .map(|_| (0..DIM).map(|_| rng.gen_range(-1.0..1.0)).collect())
        .collect();
    let tight: Vec<Trajectory> = (0..N_PROMPTS)
        .map(|_| {
            let rows = bases
                .iter()
                .map(|base| {
                    base.iter()
                        .map(|b| b + 0.1 * rng.gen_range(-1.0..1.0))
                        .collect()
                })
                .collect();
            Trajectory::from_rows(rows)
        })
        .collect::<candle_traj::Result<_>>()?;

    // Sparse group: unrelated topics, uncorrelated directions.
    let sparse: Vec<Trajectory> = (0..N_PROMPTS)
        .map(|_| {
            let rows = (0..N_LAYERS)
                .map(|_| (0..DIM).map(|_| rng.gen_range(-1.0..1.0)).collect())
                .collect();
            Trajectory::from_rows(rows)
        })
        .collect::<candle_traj::Result<_>>()?;

    let result = compute_alignment_delta(&tight, &sparse)?;

    println!("=== Layer-wise alignment ===");
    println!("{:>5} {:>10} {:>10} {:>10}", "layer", "A_tight", "A_sparse", "dA");
    for ((layer, tight), (sparse, delta)) in result
        .layers
        .iter()
        .zip(result.tight.iter())
        .zip(result.sparse.iter().zip(result.delta.iter()))
    {
        println!("{layer:>5} {tight:>10.4} {sparse:>10.4} {delta:>+10.4}");
    }

    Ok(())
}
