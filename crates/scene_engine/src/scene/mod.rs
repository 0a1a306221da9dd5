//! Scene object model
//!
//! Everything placeable in an editable 2D world lives here:
//!
//! ```text
//! ObjectId (identity)
//!      ↓
//! SceneObject (base fields + Variant: Object / Entity / Text / Camera)
//!      ↓
//! SceneRegistry (per-kind arenas, hierarchy, physics + renderer mirrors)
//! ```
//!
//! Objects reference each other only by [`ObjectId`]; storage addresses
//! never leave the registry.

mod camera;
mod entity;
mod identity;
mod object;
mod scene_registry;
mod text_label;
pub mod text_layout;

pub use camera::CameraData;
pub use entity::EntityData;
pub use identity::{IdentityError, ObjectId, IDENTITY_SEPARATOR};
pub use object::{ObjectKind, SceneObject, Variant, DEFAULT_OBJECT_SIZE};
pub use scene_registry::{ObjectHandle, SceneError, SceneRegistry};
pub use text_label::{TextLabel, DEFAULT_CHAR_SPACING, DEFAULT_FONT_SIZE};
