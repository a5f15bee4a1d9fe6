//! Temperature-scaled masked softmax sampling.
//!
//! The engine owns the random stream; this module is a pure function of the
//! logits, the feasibility mask, and one uniform draw in `[0, 1)`. That
//! keeps the choice reproducible and lets tests pin the draw.

/// Temperature applied to the six action logits.
pub const ACTION_TEMPERATURE: f32 = 0.8;
/// Temperature applied to the four direction logits.
pub const DIRECTION_TEMPERATURE: f32 = 0.75;

/// Sample one index from the feasible subset of `logits`.
///
/// Algorithm: scale each feasible logit by `1/temperature`, subtract the
/// maximum feasible scaled logit (numerical stability), exponentiate, scale
/// the uniform draw by the exponential sum, then walk candidates in index
/// order subtracting weights until the remainder drops to zero or below.
///
/// Returns `None` when no candidate is feasible; the caller maps that to
/// its safe default (Idle for actions, index 0 for directions).
pub fn masked_softmax_sample(
    logits: &[f32],
    mask: &[bool],
    temperature: f32,
    u01: f32,
) -> Option<usize> {
    debug_assert_eq!(logits.len(), mask.len());
    let inv_temp = 1.0 / temperature;

    let mut max_scaled = f32::NEG_INFINITY;
    for (logit, feasible) in logits.iter().zip(mask) {
        if *feasible {
            max_scaled = max_scaled.max(logit * inv_temp);
        }
    }
    if max_scaled == f32::NEG_INFINITY {
        return None;
    }

    let weight = |i: usize| (logits[i] * inv_temp - max_scaled).exp();

    let mut sum = 0.0_f32;
    for i in 0..logits.len() {
        if mask[i] {
            sum += weight(i);
        }
    }

    let mut remaining = u01.clamp(0.0, 1.0 - f32::EPSILON) * sum;
    let mut last_feasible = None;
    for i in 0..logits.len() {
        if !mask[i] {
            continue;
        }
        last_feasible = Some(i);
        remaining -= weight(i);
        if remaining <= 0.0 {
            return Some(i);
        }
    }

    // Floating-point dust can leave a sliver of `remaining`; the walk has
    // still covered every candidate, so the last feasible index is correct.
    last_feasible
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_infeasible_returns_none() {
        let logits = [1.0, 2.0, 3.0];
        assert_eq!(
            masked_softmax_sample(&logits, &[false, false, false], 1.0, 0.5),
            None
        );
    }

    #[test]
    fn test_single_feasible_always_chosen() {
        let logits = [0.0, -5.0, 9.0, 0.0];
        let mask = [false, true, false, false];
        for u in [0.0, 0.25, 0.5, 0.999] {
            assert_eq!(masked_softmax_sample(&logits, &mask, 0.8, u), Some(1));
        }
    }

    #[test]
    fn test_never_returns_infeasible() {
        let logits = [10.0, 0.1, -3.0, 10.0];
        let mask = [false, true, true, false];
        for step in 0..100 {
            let u = step as f32 / 100.0;
            let chosen = masked_softmax_sample(&logits, &mask, 0.8, u).unwrap();
            assert!(mask[chosen]);
        }
    }

    #[test]
    fn test_uniform_draw_partitions_by_weight() {
        // Equal logits → equal weights → the draw partitions index space evenly.
        let logits = [0.0, 0.0];
        let mask = [true, true];
        assert_eq!(masked_softmax_sample(&logits, &mask, 1.0, 0.2), Some(0));
        assert_eq!(masked_softmax_sample(&logits, &mask, 1.0, 0.49), Some(0));
        assert_eq!(masked_softmax_sample(&logits, &mask, 1.0, 0.51), Some(1));
        assert_eq!(masked_softmax_sample(&logits, &mask, 1.0, 0.99), Some(1));
    }

    #[test]
    fn test_temperature_sharpens_distribution() {
        // With a dominant logit and low temperature, even a large draw picks it.
        let logits = [4.0, 0.0];
        let mask = [true, true];
        assert_eq!(masked_softmax_sample(&logits, &mask, 0.25, 0.999), Some(0));
        // At a very high temperature the weights flatten toward uniform.
        assert_eq!(masked_softmax_sample(&logits, &mask, 100.0, 0.9), Some(1));
    }

    #[test]
    fn test_draw_edge_values_stay_feasible() {
        let logits = [1.0, 2.0, 3.0];
        let mask = [true, false, true];
        let at_zero = masked_softmax_sample(&logits, &mask, 0.8, 0.0).unwrap();
        let near_one = masked_softmax_sample(&logits, &mask, 0.8, 1.0).unwrap();
        assert!(mask[at_zero]);
        assert!(mask[near_one]);
    }
}
