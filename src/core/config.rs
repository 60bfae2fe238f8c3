//! Simulation configuration with documented constants
//!
//! All tunables are collected here. Every field has a default so a TOML file
//! only needs to name the values it overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{Result, SimError};

/// What an in-progress action does when its actor is no longer adjacent to
/// the target it started next to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StallPolicy {
    /// Keep counting down and apply the effect regardless of adjacency
    #[default]
    Continue,
    /// Complete the action early without applying the effect
    AbortWhenDetached,
}

/// Configuration for the simulation systems
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === SCHEDULER ===
    /// Wall-clock period between ticks of the driver loop (milliseconds)
    pub tick_period_ms: u64,

    /// Simulated seconds per real second
    ///
    /// Must be strictly positive. 2.0 runs the world twice as fast;
    /// 0.5 runs it at half speed.
    pub speed_multiplier: f64,

    /// Number of worker threads updating zones in parallel
    ///
    /// 0 means "one per available host core".
    pub worker_count: usize,

    /// Seed for every per-zone random stream
    ///
    /// Each zone derives its own stream from this seed and its zone id, so
    /// a run is reproducible regardless of worker count.
    pub seed: u64,

    // === WORLD LAYOUT ===
    /// Width of a single zone in tiles
    pub zone_width: i32,

    /// Height of a single zone in tiles
    pub zone_height: i32,

    /// Number of zone columns in the static world grid
    pub zone_columns: u32,

    /// Number of zone rows in the static world grid
    pub zone_rows: u32,

    /// Side length (tiles) of a spatial index cell
    ///
    /// Smaller = more cells and fewer entities to scan per cell.
    /// Larger = cheaper bookkeeping on movement.
    pub spatial_cell_size: i32,

    // === ACTIONS ===
    /// Behaviour of timed actions whose actor drifted away from the target
    pub stall_policy: StallPolicy,

    /// Entries kept by an activity log before the oldest is dropped
    pub activity_log_capacity: usize,

    /// Entity kinds counted as hostile by the zone threat metric
    pub hostile_kinds: Vec<String>,

    /// Manhattan radius within which buff consumers pick up provider buffs
    pub buff_scan_range: i32,

    // === DEMO POPULATION ===
    pub population: PopulationConfig,
}

/// How many of each template the demo populator places per zone
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub agents_per_zone: usize,
    pub hostiles_per_zone: usize,
    pub berry_bushes_per_zone: usize,
    pub trees_per_zone: usize,
    pub boulders_per_zone: usize,
    pub altars_per_zone: usize,
    pub shops_per_zone: usize,
    pub portals_per_zone: usize,

    /// Fraction of tiles turned into obstacles (0.0 - 0.5)
    pub obstacle_density: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            agents_per_zone: 6,
            hostiles_per_zone: 2,
            berry_bushes_per_zone: 4,
            trees_per_zone: 4,
            boulders_per_zone: 3,
            altars_per_zone: 1,
            shops_per_zone: 1,
            portals_per_zone: 1,
            obstacle_density: 0.03,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            // Scheduler
            tick_period_ms: 1000,
            speed_multiplier: 1.0,
            worker_count: 0,
            seed: 42,

            // World layout (2x2 zones of 64x64 tiles)
            zone_width: 64,
            zone_height: 64,
            zone_columns: 2,
            zone_rows: 2,
            spatial_cell_size: 8,

            // Actions
            stall_policy: StallPolicy::Continue,
            activity_log_capacity: 3,
            hostile_kinds: vec!["lickquidator".to_string()],
            buff_scan_range: 5,

            population: PopulationConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(text)?;
        config.validate().map_err(SimError::InvalidConfig)?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(self.speed_multiplier.is_finite() && self.speed_multiplier > 0.0) {
            return Err(format!(
                "speed_multiplier ({}) must be a positive number",
                self.speed_multiplier
            ));
        }

        if self.tick_period_ms == 0 {
            return Err("tick_period_ms must be at least 1".into());
        }

        if self.zone_width <= 0 || self.zone_height <= 0 {
            return Err(format!(
                "zone size ({}x{}) must be positive",
                self.zone_width, self.zone_height
            ));
        }

        // An empty zone grid is caught by the world manager at startup
        if self.spatial_cell_size <= 0 {
            return Err(format!(
                "spatial_cell_size ({}) must be positive",
                self.spatial_cell_size
            ));
        }

        if self.activity_log_capacity == 0 {
            return Err("activity_log_capacity must be at least 1".into());
        }

        if !(0.0..=0.5).contains(&self.population.obstacle_density) {
            return Err(format!(
                "obstacle_density ({}) should be within 0.0 - 0.5",
                self.population.obstacle_density
            ));
        }

        Ok(())
    }

    /// Scheduler tick period as a duration
    pub fn tick_period(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_period_ms)
    }
}
