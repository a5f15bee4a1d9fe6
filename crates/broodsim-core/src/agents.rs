//! Agent components — the ECS pieces that make up one colony member.
//!
//! Agents are spawned fresh at generation start and despawned at generation
//! end; only their genome survives, via explicit clone-and-mutate in the
//! evolution step. Each agent exclusively owns its genome copy.

use serde::{Deserialize, Serialize};

use broodsim_logic::genome::Genome;

/// Marker component identifying an entity as a colony member.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Colonist;

/// Colony role. Exactly zero or one queen exists during a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Queen,
    Worker,
}

impl Role {
    pub fn is_queen(self) -> bool {
        matches!(self, Self::Queen)
    }
}

/// Integer cell position. The agent stands on (occupies) the solid cell at
/// this position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CellPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn same_cell(&self, other: &Self) -> bool {
        self == other
    }
}

/// Health state, clamped to `[0, max_health]`. Reaching zero is permanent
/// death for the remainder of the generation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Vitals {
    pub health: f32,
    pub max_health: f32,
    pub alive: bool,
}

impl Vitals {
    /// Fresh agent at full health.
    pub fn new(max_health: f32) -> Self {
        Self {
            health: max_health,
            max_health,
            alive: true,
        }
    }

    pub fn ratio(&self) -> f32 {
        if self.max_health > 0.0 {
            self.health / self.max_health
        } else {
            0.0
        }
    }

    /// Subtract health; reaching zero kills the agent.
    pub fn damage(&mut self, amount: f32) {
        self.health = (self.health - amount).clamp(0.0, self.max_health);
        if self.health <= 0.0 {
            self.health = 0.0;
            self.alive = false;
        }
    }

    /// Add health, capped at max. Does not resurrect.
    pub fn restore(&mut self, amount: f32) {
        if self.alive {
            self.health = (self.health + amount).clamp(0.0, self.max_health);
        }
    }

    /// Immediate death regardless of remaining health (falls, etc.).
    pub fn kill(&mut self) {
        self.health = 0.0;
        self.alive = false;
    }
}

/// Per-generation accumulators, read once by the fitness scorer.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LifeStats {
    pub steps_alive: u32,
    pub mulch_eaten: u32,
    pub blocks_dug: u32,
    pub nests_built: u32,
    pub health_shared: f32,
}

/// The agent's exclusively-owned policy genome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brain(pub Genome);
