//! Physics bridge
//!
//! The rigid-body simulator is an external collaborator consumed through a
//! narrow contract: a [`PhysicsBackend`] creates worlds, and a
//! [`PhysicsWorld`] creates, steps, queries and destroys bodies. The scene
//! registry keeps bodies in lockstep with entity lifecycle and copies body
//! poses back onto entities while the editor is playing.
//!
//! [`SimplePhysicsBackend`] is a minimal built-in world for headless use.

pub mod simple_world;

pub use simple_world::{SimplePhysicsBackend, SimplePhysicsWorld};

use crate::foundation::math::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Physics errors
#[derive(Debug, Error)]
pub enum PhysicsError {
    /// The backend could not create a world
    #[error("Physics world creation failed: {0}")]
    WorldCreation(String),

    /// A body could not be created
    #[error("Body creation failed: {0}")]
    BodyCreation(String),
}

/// How a body participates in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyKind {
    /// No body is created for the entity
    #[default]
    None,
    /// Immovable body
    Static,
    /// Fully simulated body
    Dynamic,
    /// Moved by velocity only, unaffected by forces
    Kinematic,
}

impl BodyKind {
    /// Whether an entity of this kind needs a body in the world
    pub fn wants_body(self) -> bool {
        self != Self::None
    }
}

/// Opaque handle to a body in a [`PhysicsWorld`]
///
/// Only meaningful for the world that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(u64);

impl BodyHandle {
    /// Wrap a backend-specific raw value
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The backend-specific raw value
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

/// Parameters for creating a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    /// Simulation kind
    pub kind: BodyKind,
    /// Initial center position
    pub position: Vec2,
    /// Initial rotation in degrees
    pub rotation: f32,
    /// Half of the body's box size
    pub half_extents: Vec2,
}

/// A running rigid-body world
pub trait PhysicsWorld {
    /// Create a body and return its handle
    fn create_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle, PhysicsError>;

    /// Destroy a body; returns false if the handle was unknown
    fn destroy_body(&mut self, handle: BodyHandle) -> bool;

    /// Advance the world by `dt` seconds using `iterations` solver iterations
    fn step(&mut self, dt: f32, iterations: u32);

    /// Current center position of a body
    fn body_position(&self, handle: BodyHandle) -> Option<Vec2>;

    /// Current rotation of a body in degrees
    fn body_rotation(&self, handle: BodyHandle) -> Option<f32>;

    /// Number of live bodies
    fn body_count(&self) -> usize;
}

/// Factory for physics worlds
pub trait PhysicsBackend {
    /// Create an empty world with the given gravity
    fn create_world(&self, gravity: Vec2) -> Result<Box<dyn PhysicsWorld>, PhysicsError>;
}
