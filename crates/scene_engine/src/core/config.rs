//! # Unified Configuration System
//!
//! All editor configuration lives here: engine behavior, the physics bridge,
//! edit history limits and asset lookup. Every structure is serializable so
//! it can be loaded from TOML or RON through the [`Config`] trait.

use serde::{Serialize, Deserialize};

pub use crate::config::{Config, ConfigError};
use crate::foundation::math::Vec2;

/// Iteration count handed to the physics world on every step
pub const DEFAULT_PHYSICS_ITERATIONS: u32 = 8;

/// Longest frame the play loop will simulate (seconds)
pub const DEFAULT_MAX_FRAME_TIME: f32 = 0.25;

/// Most fixed physics steps run in one frame
pub const DEFAULT_MAX_STEPS_PER_FRAME: u32 = 16;

/// # Engine Configuration
///
/// Core editor behavior: logging and debug features.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log filter for the engine (`env_logger` syntax)
    pub log_level: String,
    /// Whether the edit view draws camera gizmos
    pub debug_mode: bool,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            debug_mode: cfg!(debug_assertions),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable debug mode
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug_mode = enabled;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Physics Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// World gravity in units per second squared
    pub gravity: [f32; 2],
    /// Solver iterations per step
    pub iterations: u32,
    /// Fixed timestep used by the editor's play loop (seconds)
    pub fixed_timestep: f32,
    /// Frame times above this are clamped (seconds)
    pub max_frame_time: f32,
    /// Cap on fixed steps per frame; leftover time is dropped
    pub max_steps_per_frame: u32,
}

impl PhysicsConfig {
    /// Create a new physics configuration
    pub fn new() -> Self {
        Self {
            gravity: [0.0, 9.81],
            iterations: DEFAULT_PHYSICS_ITERATIONS,
            fixed_timestep: 1.0 / 60.0,
            max_frame_time: DEFAULT_MAX_FRAME_TIME,
            max_steps_per_frame: DEFAULT_MAX_STEPS_PER_FRAME,
        }
    }

    /// Set gravity
    pub fn with_gravity(mut self, x: f32, y: f32) -> Self {
        self.gravity = [x, y];
        self
    }

    /// Gravity as a vector
    pub fn gravity_vec(&self) -> Vec2 {
        Vec2::new(self.gravity[0], self.gravity[1])
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.iterations == 0 {
            return Err("Physics iterations must be at least 1".to_string());
        }
        if !self.fixed_timestep.is_finite() || self.fixed_timestep <= 0.0 {
            return Err("Fixed timestep must be positive".to_string());
        }
        if !self.max_frame_time.is_finite() || self.max_frame_time <= 0.0 {
            return Err("Max frame time must be positive".to_string());
        }
        if self.max_steps_per_frame == 0 {
            return Err("Max steps per frame must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # History Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of undo events kept (0 = unlimited)
    pub max_undo: usize,
}

impl HistoryConfig {
    /// Set the maximum undo depth
    pub fn with_max_undo(mut self, max_undo: usize) -> Self {
        self.max_undo = max_undo;
        self
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_undo: 256 }
    }
}

/// # Asset Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Base directory for textures and fonts
    pub assets_dir: String,
}

impl AssetConfig {
    /// Set assets directory
    pub fn with_assets_dir(mut self, dir: impl Into<String>) -> Self {
        self.assets_dir = dir.into();
        self
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            assets_dir: "assets".to_string(),
        }
    }
}

/// # Complete Editor Configuration
///
/// Top-level configuration that encompasses all subsystems.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Engine core configuration
    pub engine: EngineConfig,
    /// Physics bridge configuration
    pub physics: PhysicsConfig,
    /// Edit history configuration
    pub history: HistoryConfig,
    /// Asset system configuration
    pub assets: AssetConfig,
}

impl EditorConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.physics.validate().map_err(ConfigError::Invalid)?;
        if self.engine.log_level.trim().is_empty() {
            return Err(ConfigError::Invalid("Log level cannot be empty".to_string()));
        }
        Ok(())
    }
}

impl Config for EditorConfig {}
