//! Feed-forward policy network — a pure function of (genome, observation).
//!
//! Single hidden layer: `input → hidden` linear with bias, tanh activation,
//! `hidden → output` linear with bias, raw logits out. No hidden state, no
//! randomness: identical inputs always produce identical outputs.
//!
//! Weights are read sequentially from the genome in a fixed order:
//! 1. hidden weights, row-major per hidden unit (`HIDDEN × INPUT`)
//! 2. hidden biases (`HIDDEN`)
//! 3. output weights, row-major per output unit (`OUTPUT × HIDDEN`)
//! 4. output biases (`OUTPUT`)
//!
//! Output layout: indices `0..6` are action logits in [`crate::decision::Action`]
//! order; indices `6..10` are movement direction logits in
//! [`crate::decision::Direction`] order.

use crate::genome::Genome;

/// Observation vector width.
pub const INPUT_SIZE: usize = 24;
/// Hidden layer width.
pub const HIDDEN_SIZE: usize = 10;
/// Output logit count (6 actions + 4 directions).
pub const OUTPUT_SIZE: usize = 10;

/// Total parameter count encoded by one genome.
pub const GENOME_LEN: usize =
    INPUT_SIZE * HIDDEN_SIZE + HIDDEN_SIZE + HIDDEN_SIZE * OUTPUT_SIZE + OUTPUT_SIZE;

/// Run the forward pass, producing raw output logits.
pub fn forward(genome: &Genome, observation: &[f32; INPUT_SIZE]) -> [f32; OUTPUT_SIZE] {
    let p = genome.params();
    debug_assert_eq!(p.len(), GENOME_LEN);

    let hidden_bias_base = INPUT_SIZE * HIDDEN_SIZE;
    let output_weight_base = hidden_bias_base + HIDDEN_SIZE;
    let output_bias_base = output_weight_base + HIDDEN_SIZE * OUTPUT_SIZE;

    let mut hidden = [0.0_f32; HIDDEN_SIZE];
    for (h, unit) in hidden.iter_mut().enumerate() {
        let row = h * INPUT_SIZE;
        let mut sum = p[hidden_bias_base + h];
        for (i, obs) in observation.iter().enumerate() {
            sum += p[row + i] * obs;
        }
        *unit = sum.tanh();
    }

    let mut output = [0.0_f32; OUTPUT_SIZE];
    for (o, logit) in output.iter_mut().enumerate() {
        let row = output_weight_base + o * HIDDEN_SIZE;
        let mut sum = p[output_bias_base + o];
        for (h, act) in hidden.iter().enumerate() {
            sum += p[row + h] * act;
        }
        *logit = sum;
    }

    output
}
