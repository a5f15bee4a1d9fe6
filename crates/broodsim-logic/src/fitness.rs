//! Generation-end fitness scoring — pure functions of final accumulators.
//!
//! The queen is rewarded for building; workers are rewarded for feeding
//! themselves, provisioning the queen, and staying alive, and penalized
//! for tearing the terrain apart. The shared `queen_nests` term gives
//! every worker a stake in the queen's output.

/// Queen fitness weight per nest built.
const QUEEN_NEST_WEIGHT: f32 = 95.0;
/// Queen fitness weight per step survived.
const QUEEN_STEP_WEIGHT: f32 = 0.08;
/// Queen fitness weight per unit of final health.
const QUEEN_HEALTH_WEIGHT: f32 = 0.35;

/// Worker fitness weight per mulch block eaten.
const WORKER_MULCH_WEIGHT: f32 = 4.0;
/// Worker fitness weight per health unit shared.
const WORKER_SHARE_WEIGHT: f32 = 6.0;
/// Worker fitness weight per step survived.
const WORKER_STEP_WEIGHT: f32 = 0.05;
/// Worker fitness weight per nest the queen built this generation.
const WORKER_QUEEN_NEST_WEIGHT: f32 = 4.0;
/// Worker fitness penalty per block dug.
const WORKER_DIG_PENALTY: f32 = 0.45;

/// Final per-agent accumulators, read once at generation end.
/// Dead agents are scored with whatever they accumulated before dying.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgentTally {
    pub steps_alive: u32,
    pub mulch_eaten: u32,
    pub blocks_dug: u32,
    pub nests_built: u32,
    pub health_shared: f32,
    pub final_health: f32,
}

pub fn queen_fitness(tally: &AgentTally) -> f32 {
    QUEEN_NEST_WEIGHT * tally.nests_built as f32
        + QUEEN_STEP_WEIGHT * tally.steps_alive as f32
        + QUEEN_HEALTH_WEIGHT * tally.final_health
}

pub fn worker_fitness(tally: &AgentTally, queen_nests: u32) -> f32 {
    WORKER_MULCH_WEIGHT * tally.mulch_eaten as f32
        + WORKER_SHARE_WEIGHT * tally.health_shared
        + WORKER_STEP_WEIGHT * tally.steps_alive as f32
        + WORKER_QUEEN_NEST_WEIGHT * queen_nests as f32
        - WORKER_DIG_PENALTY * tally.blocks_dug as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queen_fitness_formula() {
        let tally = AgentTally {
            steps_alive: 100,
            nests_built: 2,
            final_health: 20.0,
            ..Default::default()
        };
        let expected = 95.0 * 2.0 + 0.08 * 100.0 + 0.35 * 20.0;
        assert!((queen_fitness(&tally) - expected).abs() < 1e-4);
    }

    #[test]
    fn test_worker_fitness_formula() {
        let tally = AgentTally {
            steps_alive: 200,
            mulch_eaten: 3,
            blocks_dug: 4,
            health_shared: 2.5,
            ..Default::default()
        };
        let expected = 4.0 * 3.0 + 6.0 * 2.5 + 0.05 * 200.0 + 4.0 * 1.0 - 0.45 * 4.0;
        assert!((worker_fitness(&tally, 1) - expected).abs() < 1e-4);
    }

    #[test]
    fn test_idle_worker_scores_steps_only() {
        // A worker that never acted: fitness is exactly 0.05 × steps alive.
        let tally = AgentTally {
            steps_alive: 340,
            ..Default::default()
        };
        assert!((worker_fitness(&tally, 0) - 0.05 * 340.0).abs() < 1e-4);
    }

    #[test]
    fn test_digging_can_go_negative() {
        let tally = AgentTally {
            blocks_dug: 10,
            ..Default::default()
        };
        assert!(worker_fitness(&tally, 0) < 0.0);
    }

    #[test]
    fn test_fitness_deterministic() {
        let tally = AgentTally {
            steps_alive: 57,
            mulch_eaten: 1,
            blocks_dug: 2,
            nests_built: 1,
            health_shared: 0.5,
            final_health: 12.0,
        };
        assert_eq!(queen_fitness(&tally), queen_fitness(&tally));
        assert_eq!(worker_fitness(&tally, 3), worker_fitness(&tally, 3));
    }
}
