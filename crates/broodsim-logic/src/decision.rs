//! Actions, directions, feasibility masks, and heuristic overrides.
//!
//! The decision pipeline runs in two stages: deterministic role-specific
//! overrides first (they bootstrap visible colony behavior before the
//! learned policies converge), then masked sampling over the policy
//! network's logits. Both stages only ever select feasible choices.

use serde::{Deserialize, Serialize};

/// One of the six things an agent can do in a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Idle,
    Move,
    Dig,
    Eat,
    ShareHealth,
    BuildNest,
}

impl Action {
    /// Number of actions, and the width of the action logit block.
    pub const COUNT: usize = 6;

    /// Stable index into the action logit block (`output[0..6]`).
    pub fn index(self) -> usize {
        match self {
            Self::Idle => 0,
            Self::Move => 1,
            Self::Dig => 2,
            Self::Eat => 3,
            Self::ShareHealth => 4,
            Self::BuildNest => 5,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Idle),
            1 => Some(Self::Move),
            2 => Some(Self::Dig),
            3 => Some(Self::Eat),
            4 => Some(Self::ShareHealth),
            5 => Some(Self::BuildNest),
            _ => None,
        }
    }
}

/// Cardinal movement direction on the terrain grid (y is up).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// +X
    East,
    /// -X
    West,
    /// +Z
    North,
    /// -Z
    South,
}

impl Direction {
    /// Number of directions, and the width of the direction logit block.
    pub const COUNT: usize = 4;

    pub const ALL: [Self; 4] = [Self::East, Self::West, Self::North, Self::South];

    /// Stable index into the direction logit block (`output[6..10]`).
    pub fn index(self) -> usize {
        match self {
            Self::East => 0,
            Self::West => 1,
            Self::North => 2,
            Self::South => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::East),
            1 => Some(Self::West),
            2 => Some(Self::North),
            3 => Some(Self::South),
            _ => None,
        }
    }

    /// Grid offset `(dx, dz)`.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Self::East => (1, 0),
            Self::West => (-1, 0),
            Self::North => (0, 1),
            Self::South => (0, -1),
        }
    }
}

/// Per-tick feasibility of every non-idle choice, gathered from the world
/// by the engine before deciding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Feasibility {
    /// Per-direction movement feasibility, indexed by [`Direction::index`].
    pub move_dirs: [bool; Direction::COUNT],
    pub dig: bool,
    pub eat: bool,
    pub share: bool,
    pub build: bool,
}

impl Feasibility {
    pub fn any_move(&self) -> bool {
        self.move_dirs.iter().any(|d| *d)
    }

    /// Boolean mask over the six actions, in [`Action::index`] order.
    /// Idle is always feasible.
    pub fn action_mask(&self) -> [bool; Action::COUNT] {
        [
            true,
            self.any_move(),
            self.dig,
            self.eat,
            self.share,
            self.build,
        ]
    }
}

/// Queen eats when her health ratio drops below this.
pub const QUEEN_EAT_THRESHOLD: f32 = 0.7;
/// Workers eat when their health ratio drops below this.
pub const WORKER_EAT_THRESHOLD: f32 = 0.62;
/// Queen only builds when health covers the nest cost with this margin.
pub const NEST_AFFORD_MARGIN: f32 = 1.1;

/// Plain inputs for the heuristic override stage.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicInput {
    pub is_queen: bool,
    pub health: f32,
    pub max_health: f32,
    /// `max_health × clamp01(nest_cost_fraction)`; irrelevant for workers.
    pub nest_cost: f32,
    /// A live queen shares this agent's cell and is below full health.
    pub queen_needs_care: bool,
}

/// Deterministic role-specific override, evaluated before the learned
/// policy. Returns `None` when no rule fires and the policy should decide.
///
/// Every rule is gated on feasibility so an override never selects an
/// action the executor would refuse.
pub fn heuristic_override(input: &HeuristicInput, feasibility: &Feasibility) -> Option<Action> {
    let ratio = if input.max_health > 0.0 {
        input.health / input.max_health
    } else {
        0.0
    };

    if input.is_queen {
        if feasibility.build && input.health >= NEST_AFFORD_MARGIN * input.nest_cost {
            return Some(Action::BuildNest);
        }
        if feasibility.eat && ratio < QUEEN_EAT_THRESHOLD {
            return Some(Action::Eat);
        }
    } else {
        if feasibility.share && input.queen_needs_care {
            return Some(Action::ShareHealth);
        }
        if feasibility.eat && ratio < WORKER_EAT_THRESHOLD {
            return Some(Action::Eat);
        }
    }

    None
}
