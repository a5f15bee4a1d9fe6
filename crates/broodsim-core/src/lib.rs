//! Broodsim simulation engine.
//!
//! Owns the live side of the colony: ECS agent storage, the terrain
//! provider, the per-tick decision/execution loop, spawn placement, and
//! the generation-boundary evolution step. All randomness flows through
//! one seeded stream held by the engine, so a fixed seed and configuration
//! reproduce an entire multi-generation run.

pub mod actions;
pub mod agents;
pub mod config;
pub mod decision;
pub mod engine;
pub mod evolution;
pub mod spawn;
pub mod terrain;

pub use config::{ConfigError, SimConfig};
pub use engine::{Readout, SimulationEngine};
pub use terrain::{Terrain, VoxelTerrain};
