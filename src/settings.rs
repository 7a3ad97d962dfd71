//! Simulation tunables
//!
//! Every constant in [`crate::consts`] can be overridden from a JSON file.
//! Missing keys fall back to the compiled defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Rect;
use crate::consts::*;

/// Errors raised while loading or validating tunables
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value that would break a simulation invariant (e.g. zero capacity)
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Data-driven simulation balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === World ===
    pub world_width: f32,
    pub world_height: f32,

    // === Spatial index ===
    /// Items a node holds before it subdivides
    pub node_capacity: usize,
    pub max_depth: u32,

    // === Entities ===
    pub entity_radius: f32,
    /// Query square side as a multiple of the querying entity's radius
    pub query_scale: f32,
    pub speed_scale: f32,

    // === Fusion ===
    pub fusion_threshold: f32,
    pub max_fusion_stage: u8,

    // === Arcade ===
    pub max_enemies: usize,
    pub initial_enemies: usize,
    pub spawn_interval: f32,
    pub safe_radius: f32,
    pub arcade_velocity_range: f32,
    pub player_radius_scale: f32,
    pub player_speed: f32,
    pub player_query_side: f32,

    // === Debug mode ===
    pub debug_entity_count: usize,
    pub debug_velocity_range: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,

            node_capacity: NODE_CAPACITY,
            max_depth: MAX_DEPTH,

            entity_radius: ENTITY_RADIUS,
            query_scale: QUERY_SCALE,
            speed_scale: SPEED_SCALE,

            fusion_threshold: FUSION_THRESHOLD,
            max_fusion_stage: MAX_FUSION_STAGE,

            max_enemies: MAX_ENEMIES,
            initial_enemies: ARCADE_INITIAL_ENEMIES,
            spawn_interval: SPAWN_INTERVAL,
            safe_radius: SAFE_RADIUS,
            arcade_velocity_range: ARCADE_VELOCITY_RANGE,
            player_radius_scale: PLAYER_RADIUS_SCALE,
            player_speed: PLAYER_SPEED,
            player_query_side: PLAYER_QUERY_SIDE,

            debug_entity_count: DEBUG_ENTITY_COUNT,
            debug_velocity_range: DEBUG_VELOCITY_RANGE,
        }
    }
}

impl Tuning {
    /// Parse and validate tunables from a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tunables from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.world_width > 0.0 && self.world_height > 0.0) {
            return Err(ConfigError::Invalid("world dimensions must be positive"));
        }
        if self.node_capacity == 0 {
            return Err(ConfigError::Invalid("node_capacity must be at least 1"));
        }
        if !(self.entity_radius > 0.0) {
            return Err(ConfigError::Invalid("entity_radius must be positive"));
        }
        let player_radius = self.entity_radius * self.player_radius_scale;
        if !(player_radius > 0.0)
            || 2.0 * player_radius > self.world_width.min(self.world_height)
        {
            return Err(ConfigError::Invalid("player must fit inside the world"));
        }
        if 2.0 * self.entity_radius > self.world_width.min(self.world_height) {
            return Err(ConfigError::Invalid("entities must fit inside the world"));
        }
        if !(self.query_scale > 0.0) || !(self.player_query_side > 0.0) {
            return Err(ConfigError::Invalid("query sizes must be positive"));
        }
        if !(self.fusion_threshold > 0.0 && self.fusion_threshold <= 1.0) {
            return Err(ConfigError::Invalid("fusion_threshold must be in (0, 1]"));
        }
        if self.spawn_interval < 0.0 || self.speed_scale < 0.0 || self.player_speed < 0.0 {
            return Err(ConfigError::Invalid("rates must be non-negative"));
        }
        if self.arcade_velocity_range < 0.0 || self.debug_velocity_range < 0.0 {
            return Err(ConfigError::Invalid("velocity ranges must be non-negative"));
        }
        // Rejection sampling needs somewhere outside the safe zone to land
        let half_diag = (self.world_width.powi(2) + self.world_height.powi(2)).sqrt() / 2.0;
        if self.safe_radius < 0.0 || self.safe_radius >= half_diag {
            return Err(ConfigError::Invalid("safe_radius leaves no room to spawn"));
        }
        Ok(())
    }

    /// World rectangle anchored at the origin
    pub fn world(&self) -> Rect {
        Rect::new(0.0, 0.0, self.world_width, self.world_height)
    }

    /// Player radius derived from the base entity radius
    pub fn player_radius(&self) -> f32 {
        self.entity_radius * self.player_radius_scale
    }
}
