//! The genome — a fixed-length parameter vector encoding one policy network.
//!
//! Genomes are owned values: every live agent holds its own independent
//! copy, and new genomes are only ever derived by explicit clone-then-mutate
//! in the evolution engine. Mutation and random initialization live in the
//! core crate (they need a random stream); this crate only defines the
//! container and its bounds.

use serde::{Deserialize, Serialize};

use crate::network::GENOME_LEN;

/// Lower clamp bound for every genome parameter.
pub const PARAM_MIN: f32 = -4.0;
/// Upper clamp bound for every genome parameter.
pub const PARAM_MAX: f32 = 4.0;

/// Fixed-length parameter vector for one policy network.
///
/// Layout (read sequentially by the network): hidden weights, hidden
/// biases, output weights, output biases. See [`crate::network`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    params: Vec<f32>,
}

impl Genome {
    /// Wrap a parameter vector. Returns `None` if the length is wrong.
    pub fn from_params(params: Vec<f32>) -> Option<Self> {
        if params.len() == GENOME_LEN {
            Some(Self { params })
        } else {
            None
        }
    }

    /// All-zero genome (useful as a neutral baseline in tests and harnesses).
    pub fn zeroed() -> Self {
        Self {
            params: vec![0.0; GENOME_LEN],
        }
    }

    pub fn params(&self) -> &[f32] {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut [f32] {
        &mut self.params
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Whether every parameter sits inside the clamp range.
    pub fn in_bounds(&self) -> bool {
        self.params
            .iter()
            .all(|p| (PARAM_MIN..=PARAM_MAX).contains(p))
    }
}
