//! Terrain cell classification — a closed variant set with capability predicates.
//!
//! The colony core never owns terrain storage; it only asks "what kind of
//! cell is this" and "what can be done to it". Everything else (chunk
//! layout, generation, rendering) lives behind the terrain provider.

use serde::{Deserialize, Serialize};

/// Classification of a single terrain cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Passable air.
    Empty,
    /// Default solid ground.
    Soil,
    /// Edible, health-restoring block.
    Mulch,
    /// Solid but caustic — doubles health drain while stood on.
    Acid,
    /// Indestructible container block. Cannot be dug, built over, or stood on.
    Husk,
    /// Built nest block.
    Nest,
}

impl CellKind {
    /// Number of variants, used for one-hot observation encoding.
    pub const COUNT: usize = 6;

    /// Stable index for one-hot encoding.
    pub fn index(self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Soil => 1,
            Self::Mulch => 2,
            Self::Acid => 3,
            Self::Husk => 4,
            Self::Nest => 5,
        }
    }

    /// Whether the cell is solid (occupies space, can support an agent above it).
    pub fn is_solid(self) -> bool {
        !matches!(self, Self::Empty)
    }

    /// Whether an agent may stand on this cell as its support.
    pub fn is_standable(self) -> bool {
        self.is_solid() && self != Self::Husk
    }

    /// Whether a worker may dig this cell out.
    /// Solid, but not a container, nest, or mulch block.
    pub fn is_diggable(self) -> bool {
        matches!(self, Self::Soil | Self::Acid)
    }

    /// Whether the queen may convert this cell into a nest.
    /// Solid, but not a container or an existing nest.
    pub fn is_buildable(self) -> bool {
        matches!(self, Self::Soil | Self::Mulch | Self::Acid)
    }
}
