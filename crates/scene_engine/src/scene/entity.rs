//! Entity variant: a textured sprite that can carry a physics body

use crate::assets::{texture_or_placeholder, AssetProvider, TextureHandle};
use crate::physics::{BodyHandle, BodyKind};

/// Entity-specific state
///
/// The body handle is only valid while the entity is attached to a running
/// physics world; the scene registry creates and destroys it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityData {
    /// Simulation kind used when a body is created
    pub body_kind: BodyKind,
    /// Script bound to this entity, invoked once per frame during play
    pub script_path: Option<String>,
    texture_path: String,
    texture: TextureHandle,
    body: Option<BodyHandle>,
}

impl EntityData {
    /// Entity with the given body kind and no texture
    pub fn new(body_kind: BodyKind) -> Self {
        Self {
            body_kind,
            ..Self::default()
        }
    }

    /// Path of the assigned texture (empty when none)
    pub fn texture_path(&self) -> &str {
        &self.texture_path
    }

    /// Loaded texture, or the placeholder
    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    /// Assign a texture, keeping the placeholder if loading fails
    pub fn set_texture(&mut self, path: impl Into<String>, assets: &mut dyn AssetProvider) {
        self.texture_path = path.into();
        self.texture = texture_or_placeholder(assets, &self.texture_path);
    }

    /// Physics body while attached to a world
    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    pub(crate) fn attach_body(&mut self, body: BodyHandle) {
        self.body = Some(body);
    }

    pub(crate) fn detach_body(&mut self) -> Option<BodyHandle> {
        self.body.take()
    }

    /// Copy every authored field from `other`, keeping the live body handle
    pub(crate) fn restore_from(&mut self, other: &Self) {
        let body = self.body;
        *self = other.clone();
        self.body = body;
    }
}
