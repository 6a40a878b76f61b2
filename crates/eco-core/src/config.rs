//! Configuration types for the simulation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Extinction guard: re-seed the world from the survivors' genomes when the
/// population drops to a threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RevivalConfig {
    pub enabled: bool,
    /// Living population that triggers a revival
    pub population_threshold: usize,
    /// How many times a revival may fire over the whole run
    pub max_revivals: u32,
}

impl Default for RevivalConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            population_threshold: 5,
            max_revivals: 3,
        }
    }
}

/// World configuration parameters, fixed for the lifetime of a world
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Width of the world grid
    pub width: i32,
    /// Height of the world grid
    pub height: i32,
    /// Animals placed when the world is created
    pub initial_animals: usize,
    /// Grass placed when the world is created
    pub initial_grass: usize,
    /// Energy of a freshly placed animal
    pub start_energy: i32,
    /// Energy spent per movement step
    pub move_energy: i32,
    /// Energy gained from one grass unit
    pub plant_energy: i32,
    /// Jungle size relative to the map, per axis (0.0 to 1.0)
    pub jungle_ratio: f64,
    /// Number of genes per genome
    pub genome_length: usize,
    /// Fraction of start energy both parents need before breeding
    pub reproduction_energy_factor: f64,
    /// Grass placed per day in the jungle and again in the steppe
    pub daily_grass_per_region: usize,
    pub revival: RevivalConfig,
    /// Random seed for reproducibility
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 15,
            height: 15,
            initial_animals: 70,
            initial_grass: 100,
            start_energy: 80,
            move_energy: 10,
            plant_energy: 50,
            jungle_ratio: 0.5,
            genome_length: 32,
            reproduction_energy_factor: 0.8,
            daily_grass_per_region: 1,
            revival: RevivalConfig::default(),
            seed: 0,
        }
    }
}

impl WorldConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width <= 0 || self.height <= 0 {
            return Err(Error::InvalidConfig(format!(
                "map size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.start_energy <= 0 {
            return Err(Error::InvalidConfig(format!(
                "start_energy must be positive, got {}",
                self.start_energy
            )));
        }
        if self.move_energy < 0 || self.plant_energy < 0 {
            return Err(Error::InvalidConfig(
                "move_energy and plant_energy must not be negative".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.jungle_ratio) {
            return Err(Error::InvalidConfig(format!(
                "jungle_ratio must be within [0, 1], got {}",
                self.jungle_ratio
            )));
        }
        if self.genome_length == 0 {
            return Err(Error::InvalidConfig(
                "genome_length must be at least 1".to_string(),
            ));
        }
        if !self.reproduction_energy_factor.is_finite() || self.reproduction_energy_factor < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "reproduction_energy_factor must be a non-negative number, got {}",
                self.reproduction_energy_factor
            )));
        }
        Ok(())
    }

    /// Energy each parent hands over to a child
    pub fn reproduction_cost(&self) -> i32 {
        self.start_energy / 2
    }

    /// Minimum energy a parent needs before breeding, never below the
    /// per-parent cost
    pub fn reproduction_threshold(&self) -> i32 {
        // Energies are integral; the epsilon absorbs float noise in the product
        let scaled = (self.start_energy as f64 * self.reproduction_energy_factor - 1e-9).ceil() as i32;
        scaled.max(self.reproduction_cost())
    }

    pub fn area(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }
}

/// Headless runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Settings shared by the wrapped and the bordered world
    pub world: WorldConfig,
    /// Delay between days (milliseconds)
    pub tick_interval_ms: u64,
    /// Stop after this many days; run until told to stop when unset
    pub max_days: Option<u64>,
    /// Start paused and wait for a resume command
    pub start_paused: bool,
    /// Emit logs as JSON lines
    pub json_logs: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            tick_interval_ms: 300,
            max_days: None,
            start_paused: false,
            json_logs: false,
        }
    }
}

impl RunnerConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: RunnerConfig = serde_json::from_str(&raw)?;
        config.world.validate()?;
        Ok(config)
    }
}
