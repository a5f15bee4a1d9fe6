//! Simulation configuration — every tunable in one serde-friendly struct.
//!
//! The engine takes a `SimConfig` at construction and never reaches for
//! ambient state. Configs load from JSON (same shape the harness uses) and
//! are validated before a simulation will accept them.

use serde::{Deserialize, Serialize};

/// All tunables for a colony run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Seed for the engine's single random stream.
    pub seed: u64,
    /// Worker population size; constant across generations.
    pub worker_count: usize,
    /// Ticks per generation (unless the colony dies out first).
    pub evaluation_steps: u32,
    /// Simulated seconds per tick for the fixed-timestep driver.
    pub tick_seconds: f32,
    pub queen_max_health: f32,
    pub worker_max_health: f32,
    /// Health drained per tick; doubled while standing on acid.
    pub health_drain: f32,
    /// Health restored by eating one mulch block (capped at max health).
    pub mulch_restore: f32,
    /// Health units moved per ShareHealth action (before donor/receiver caps).
    pub share_amount: f32,
    /// Fraction of queen max health consumed per nest, clamped to `[0, 1]`.
    pub nest_cost_fraction: f32,
    /// Standard deviation of large mutation perturbations.
    pub mutation_strength: f32,
    /// Worker genomes carried unmodified into the next generation.
    pub elite_count: usize,
    /// Regenerate the terrain to its initial state between generations.
    pub reset_terrain_per_generation: bool,
    pub world_size_x: i32,
    pub world_size_y: i32,
    pub world_size_z: i32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 1337,
            worker_count: 12,
            evaluation_steps: 600,
            tick_seconds: 0.05,
            queen_max_health: 48.0,
            worker_max_health: 24.0,
            health_drain: 0.02,
            mulch_restore: 6.0,
            share_amount: 3.0,
            nest_cost_fraction: 1.0 / 3.0,
            mutation_strength: 0.6,
            elite_count: 3,
            reset_terrain_per_generation: true,
            world_size_x: 24,
            world_size_y: 12,
            world_size_z: 24,
        }
    }
}

impl SimConfig {
    /// Parse a config from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the tunables describe a runnable simulation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::Invalid("worker_count must be at least 1"));
        }
        if self.evaluation_steps == 0 {
            return Err(ConfigError::Invalid("evaluation_steps must be at least 1"));
        }
        if self.tick_seconds <= 0.0 {
            return Err(ConfigError::Invalid("tick_seconds must be positive"));
        }
        if self.queen_max_health <= 0.0 || self.worker_max_health <= 0.0 {
            return Err(ConfigError::Invalid("max health values must be positive"));
        }
        if self.health_drain < 0.0 {
            return Err(ConfigError::Invalid("health_drain must not be negative"));
        }
        if self.mulch_restore < 0.0 || self.share_amount < 0.0 {
            return Err(ConfigError::Invalid(
                "mulch_restore and share_amount must not be negative",
            ));
        }
        if !(0.0..=1.0).contains(&self.nest_cost_fraction) {
            return Err(ConfigError::Invalid(
                "nest_cost_fraction must be within [0, 1]",
            ));
        }
        if self.mutation_strength <= 0.0 {
            return Err(ConfigError::Invalid("mutation_strength must be positive"));
        }
        if self.elite_count == 0 {
            return Err(ConfigError::Invalid("elite_count must be at least 1"));
        }
        if self.world_size_x < 2 || self.world_size_y < 2 || self.world_size_z < 2 {
            return Err(ConfigError::Invalid("world dimensions must be at least 2"));
        }
        Ok(())
    }

    /// Health cost of one nest: `queen_max_health × clamp01(nest_cost_fraction)`.
    pub fn nest_cost(&self) -> f32 {
        self.queen_max_health * self.nest_cost_fraction.clamp(0.0, 1.0)
    }
}

/// Errors from loading or validating a configuration.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    Invalid(&'static str),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Parse(e) => write!(f, "config parse error: {}", e),
            ConfigError::Invalid(reason) => write!(f, "invalid config: {}", reason),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_nest_cost() {
        let config = SimConfig {
            queen_max_health: 48.0,
            nest_cost_fraction: 1.0 / 3.0,
            ..Default::default()
        };
        assert!((config.nest_cost() - 16.0).abs() < 1e-4);
    }

    #[test]
    fn test_nest_cost_fraction_clamped() {
        let mut config = SimConfig::default();
        config.nest_cost_fraction = 1.0;
        assert!((config.nest_cost() - config.queen_max_health).abs() < 1e-4);
    }

    #[test]
    fn test_rejects_zero_workers() {
        let config = SimConfig {
            worker_count: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_tiny_world() {
        let config = SimConfig {
            world_size_y: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = SimConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed = SimConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed.seed, config.seed);
        assert_eq!(parsed.worker_count, config.worker_count);
    }

    #[test]
    fn test_json_rejects_invalid() {
        let json = r#"{"seed":1,"worker_count":0,"evaluation_steps":10,
            "tick_seconds":0.05,"queen_max_health":48.0,"worker_max_health":24.0,
            "health_drain":0.02,"mulch_restore":6.0,"share_amount":3.0,
            "nest_cost_fraction":0.33,"mutation_strength":0.6,"elite_count":3,
            "reset_terrain_per_generation":true,
            "world_size_x":24,"world_size_y":12,"world_size_z":24}"#;
        assert!(SimConfig::from_json_str(json).is_err());
    }
}
