//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - 2D math types and helpers
//! - Block-based object arena
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod logging;
