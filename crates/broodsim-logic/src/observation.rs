//! Observation vector assembly — the fixed 24-value view a policy sees.
//!
//! The engine gathers everything world-side into a plain
//! [`ObservationInput`]; this module turns it into the network's input
//! vector. Keeping the layout in one place means the network dimensions
//! and the observation definition cannot drift apart.

use crate::decision::{Direction, Feasibility};
use crate::network::INPUT_SIZE;
use crate::terrain::CellKind;

/// Co-located-agent counts saturate at this many others.
const COLOCATION_SATURATION: f32 = 5.0;

/// World-side facts about one agent at decision time.
#[derive(Debug, Clone, Copy)]
pub struct ObservationInput {
    pub health_ratio: f32,
    pub is_queen: bool,
    /// Other live agents on this agent's cell.
    pub colocated_others: u32,
    /// A live queen shares the cell and is below full health.
    pub queen_needs_care: bool,
    /// Kind of the cell the agent stands on.
    pub standing_kind: CellKind,
    pub feasibility: Feasibility,
    /// Cell position normalized by world bounds, each in `[0, 1]`.
    pub normalized_pos: [f32; 3],
    /// `health / nest_cost` before clamping; encodes nest affordability.
    pub nest_affordability: f32,
    /// Fraction of the generation's evaluation steps already elapsed.
    pub step_fraction: f32,
}

/// Build the observation vector.
///
/// Layout:
/// - `0` — constant 1.0
/// - `1` — health ratio
/// - `2` — is-queen flag
/// - `3` — co-located live others, saturated at 5 and normalized
/// - `4` — queen-needs-care flag
/// - `5..11` — standing-cell kind one-hot ([`CellKind::index`] order)
/// - `11..15` — per-direction move feasibility ([`Direction::index`] order)
/// - `15..18` — normalized x/y/z position
/// - `18..22` — feasibility of Dig, Eat, ShareHealth, BuildNest
/// - `22` — nest affordability, clamped to `[0, 2]` and halved
/// - `23` — step fraction
pub fn build_observation(input: &ObservationInput) -> [f32; INPUT_SIZE] {
    let mut obs = [0.0_f32; INPUT_SIZE];

    obs[0] = 1.0;
    obs[1] = input.health_ratio.clamp(0.0, 1.0);
    obs[2] = if input.is_queen { 1.0 } else { 0.0 };
    obs[3] = (input.colocated_others as f32).min(COLOCATION_SATURATION) / COLOCATION_SATURATION;
    obs[4] = if input.queen_needs_care { 1.0 } else { 0.0 };

    obs[5 + input.standing_kind.index()] = 1.0;

    for dir in Direction::ALL {
        if input.feasibility.move_dirs[dir.index()] {
            obs[11 + dir.index()] = 1.0;
        }
    }

    obs[15] = input.normalized_pos[0].clamp(0.0, 1.0);
    obs[16] = input.normalized_pos[1].clamp(0.0, 1.0);
    obs[17] = input.normalized_pos[2].clamp(0.0, 1.0);

    obs[18] = if input.feasibility.dig { 1.0 } else { 0.0 };
    obs[19] = if input.feasibility.eat { 1.0 } else { 0.0 };
    obs[20] = if input.feasibility.share { 1.0 } else { 0.0 };
    obs[21] = if input.feasibility.build { 1.0 } else { 0.0 };

    obs[22] = input.nest_affordability.clamp(0.0, 2.0) / 2.0;
    obs[23] = input.step_fraction.clamp(0.0, 1.0);

    obs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_input() -> ObservationInput {
        ObservationInput {
            health_ratio: 0.5,
            is_queen: false,
            colocated_others: 0,
            queen_needs_care: false,
            standing_kind: CellKind::Soil,
            feasibility: Feasibility::default(),
            normalized_pos: [0.25, 0.5, 0.75],
            nest_affordability: 1.0,
            step_fraction: 0.1,
        }
    }

    #[test]
    fn test_layout_width() {
        let obs = build_observation(&base_input());
        assert_eq!(obs.len(), INPUT_SIZE);
        assert_eq!(obs[0], 1.0);
    }

    #[test]
    fn test_one_hot_standing_kind() {
        let mut input = base_input();
        input.standing_kind = CellKind::Mulch;
        let obs = build_observation(&input);
        let one_hot = &obs[5..11];
        assert_eq!(one_hot.iter().filter(|v| **v == 1.0).count(), 1);
        assert_eq!(one_hot[CellKind::Mulch.index()], 1.0);
    }

    #[test]
    fn test_colocation_saturates() {
        let mut input = base_input();
        input.colocated_others = 3;
        assert!((build_observation(&input)[3] - 0.6).abs() < 1e-6);
        input.colocated_others = 50;
        assert!((build_observation(&input)[3] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_move_feasibility_block() {
        let mut input = base_input();
        input.feasibility.move_dirs = [true, false, true, false];
        let obs = build_observation(&input);
        assert_eq!(&obs[11..15], &[1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_affordability_clamped() {
        let mut input = base_input();
        input.nest_affordability = 5.0;
        assert!((build_observation(&input)[22] - 1.0).abs() < 1e-6);
        input.nest_affordability = 1.0;
        assert!((build_observation(&input)[22] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_range_inputs_clamped() {
        let mut input = base_input();
        input.health_ratio = 1.7;
        input.normalized_pos = [-0.5, 2.0, 0.5];
        input.step_fraction = 3.0;
        let obs = build_observation(&input);
        assert_eq!(obs[1], 1.0);
        assert_eq!(obs[15], 0.0);
        assert_eq!(obs[16], 1.0);
        assert_eq!(obs[23], 1.0);
    }
}
