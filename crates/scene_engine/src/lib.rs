//! # Scene Engine
//!
//! The scene object model behind a 2D editor: every placeable thing in an
//! editable world, its identity, hierarchy, paint order and undo history.
//!
//! ## Features
//!
//! - **Stable identities**: random two-part IDs that survive save/load and
//!   are never tied to memory addresses
//! - **Arena storage**: block-based, non-relocating pools per object kind
//! - **Hierarchy and layers**: parent/child links and ten ordered render
//!   buckets, kept consistent by a single registry
//! - **Undo/redo**: whole-object snapshots and hierarchy edges
//! - **Play mode**: a physics and script bridge that restores the scene
//!   when play ends
//! - **JSON scenes**: human-readable scene files
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), EngineError> {
//!     let mut ctx = EngineContext::new(EditorConfig::default())?;
//!
//!     let ship = ctx.create(ObjectKind::Entity);
//!     ctx.history.edit(&mut ctx.scene, ship, |object| {
//!         object.position = Vec2::new(5.0, 5.0);
//!     });
//!     ctx.undo();
//!
//!     ctx.save_scene("level.json")?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;
pub mod config;
pub mod foundation;

// Collaborator bridges
pub mod assets;
pub mod physics;
pub mod scripting;

// Scene model
pub mod scene;
pub mod render;
pub mod history;
pub mod persistence;

mod engine;

#[cfg(test)]
mod tests;

pub use engine::{EngineContext, EngineError, EngineMode};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        EngineContext, EngineError, EngineMode,
        assets::{AssetProvider, DirectoryAssets, FontMetrics, NullAssets, TextureHandle},
        core::{Config, EditorConfig, HistoryConfig, PhysicsConfig},
        foundation::math::Vec2,
        history::{EditEvent, EditHistory, PendingCapture},
        persistence::{load_scene, save_scene, PersistenceError, SceneFile},
        physics::{BodyKind, PhysicsBackend, PhysicsWorld, SimplePhysicsBackend},
        render::{DrawCommand, DrawList, DrawTarget, View, LAYER_COUNT},
        scene::{
            CameraData, EntityData, ObjectId, ObjectKind, SceneError, SceneObject,
            SceneRegistry, TextLabel, Variant,
        },
        scripting::{ScriptError, ScriptHost},
    };
}
