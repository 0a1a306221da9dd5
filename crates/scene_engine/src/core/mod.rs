//! # Core Engine Module
//!
//! Shared abstractions used throughout the engine.
//!
//! ## Organization
//!
//! - **Config**: Unified configuration for all editor subsystems
//! - **Foundation**: Low-level utilities (math, arena, logging)

pub mod config;

// Re-export foundation modules for convenience
pub use crate::foundation;

// Re-export commonly used config types
pub use config::{
    AssetConfig,
    Config,
    ConfigError,
    EditorConfig,
    EngineConfig,
    HistoryConfig,
    PhysicsConfig,
};
