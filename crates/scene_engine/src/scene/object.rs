//! Scene object model
//!
//! A [`SceneObject`] is the uniform shape every placeable thing shares:
//! identity, name, tag, transform, visibility, render layer and hierarchy
//! links. Kind-specific behavior sits in the closed [`Variant`] sum type and
//! is dispatched by `match` for each capability (drawing here, persistence in
//! [`crate::persistence`]).
//!
//! Fields whose changes must be mirrored elsewhere (identity, layer, parent,
//! children, active camera flag, physics body) are private and only the
//! [`SceneRegistry`](crate::scene::SceneRegistry) mutates them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::foundation::math::{normalize_rotation, Rect, Vec2};
use crate::physics::BodyKind;
use crate::render::{DrawCommand, DrawTarget, View};
use crate::scene::{CameraData, EntityData, ObjectId, TextLabel};

/// Default size for new objects
pub const DEFAULT_OBJECT_SIZE: f32 = 64.0;

/// Kind discriminator, also the persisted `"type"` value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Plain grouping object
    Object,
    /// Sprite / physics entity
    Entity,
    /// Text label
    Text,
    /// Camera
    Camera,
}

impl ObjectKind {
    /// All kinds in storage order
    pub const ALL: [ObjectKind; 4] = [Self::Object, Self::Entity, Self::Text, Self::Camera];

    /// Persisted name of the kind
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Entity => "entity",
            Self::Text => "text",
            Self::Camera => "camera",
        }
    }

    /// Default display name for new objects of this kind
    pub fn default_name(self) -> &'static str {
        match self {
            Self::Object => "Object",
            Self::Entity => "Entity",
            Self::Text => "Text",
            Self::Camera => "Camera",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific state
#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
    /// Plain object with only base fields
    Object,
    /// Sprite / physics entity
    Entity(EntityData),
    /// Text label
    Text(TextLabel),
    /// Camera
    Camera(CameraData),
}

impl Variant {
    /// Kind discriminator
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Object => ObjectKind::Object,
            Self::Entity(_) => ObjectKind::Entity,
            Self::Text(_) => ObjectKind::Text,
            Self::Camera(_) => ObjectKind::Camera,
        }
    }

    /// Default state for a kind
    pub fn default_for(kind: ObjectKind) -> Self {
        match kind {
            ObjectKind::Object => Self::Object,
            ObjectKind::Entity => Self::Entity(EntityData::new(BodyKind::None)),
            ObjectKind::Text => Self::Text(TextLabel::default()),
            ObjectKind::Camera => Self::Camera(CameraData::new()),
        }
    }
}

/// A placeable scene object
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    id: ObjectId,
    /// Display name
    pub name: String,
    /// Free-form tag
    pub tag: String,
    /// Center position in world units
    pub position: Vec2,
    /// Full width and height in world units
    pub size: Vec2,
    rotation: f32,
    /// Whether the object is drawn
    pub visible: bool,
    layer: usize,
    parent: Option<ObjectId>,
    children: Vec<ObjectId>,
    variant: Variant,
}

impl SceneObject {
    pub(crate) fn new(id: ObjectId, variant: Variant) -> Self {
        Self {
            id,
            name: variant.kind().default_name().to_string(),
            tag: String::new(),
            position: Vec2::zeros(),
            size: Vec2::new(DEFAULT_OBJECT_SIZE, DEFAULT_OBJECT_SIZE),
            rotation: 0.0,
            visible: true,
            layer: 0,
            parent: None,
            children: Vec::new(),
            variant,
        }
    }

    /// Identity
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Kind discriminator
    pub fn kind(&self) -> ObjectKind {
        self.variant.kind()
    }

    /// Rotation in degrees, always inside (-360, 360)
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Set rotation in degrees; the value is normalized
    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = normalize_rotation(degrees);
    }

    /// Render layer index
    pub fn layer(&self) -> usize {
        self.layer
    }

    /// Parent identity
    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    /// Child identities in order
    pub fn children(&self) -> &[ObjectId] {
        &self.children
    }

    /// Kind-specific state
    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    /// Entity state, if this is an entity
    pub fn as_entity(&self) -> Option<&EntityData> {
        match &self.variant {
            Variant::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    /// Mutable entity state, if this is an entity
    pub fn as_entity_mut(&mut self) -> Option<&mut EntityData> {
        match &mut self.variant {
            Variant::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    /// Text state, if this is a text label
    pub fn as_text(&self) -> Option<&TextLabel> {
        match &self.variant {
            Variant::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Mutable text state, if this is a text label
    pub fn as_text_mut(&mut self) -> Option<&mut TextLabel> {
        match &mut self.variant {
            Variant::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Camera state, if this is a camera
    pub fn as_camera(&self) -> Option<&CameraData> {
        match &self.variant {
            Variant::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    /// Mutable camera state, if this is a camera
    pub fn as_camera_mut(&mut self) -> Option<&mut CameraData> {
        match &mut self.variant {
            Variant::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    /// World-space bounds
    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(self.position, self.size)
    }

    /// Emit this object's draw commands for `view`
    ///
    /// Hidden objects and plain objects emit nothing.
    pub fn draw(&self, view: &View, target: &mut dyn DrawTarget) {
        if !self.visible {
            return;
        }
        match &self.variant {
            Variant::Object => {}
            Variant::Entity(entity) => target.submit(DrawCommand::Sprite {
                id: self.id,
                center: view.world_to_screen(self.position),
                size: view.scale_size(self.size),
                rotation: self.rotation,
                texture: entity.texture(),
            }),
            Variant::Text(text) => target.submit(DrawCommand::Text {
                id: self.id,
                origin: view.world_to_screen(self.position),
                text: text.wrapped().to_string(),
                font_size: text.font_size() * view.zoom,
                spacing: text.char_spacing() * view.zoom,
                color: text.color,
            }),
            Variant::Camera(camera) => {
                if view.show_gizmos {
                    target.submit(DrawCommand::CameraGizmo {
                        id: self.id,
                        center: view.world_to_screen(self.position),
                        size: view.scale_size(self.size),
                        active: camera.is_active(),
                    });
                }
            }
        }
    }

    // ========================================================================
    // Registry-only mutation
    // ========================================================================

    pub(crate) fn set_layer_field(&mut self, layer: usize) {
        self.layer = layer;
    }

    pub(crate) fn set_parent_field(&mut self, parent: Option<ObjectId>) {
        self.parent = parent;
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<ObjectId> {
        &mut self.children
    }

    /// Copy authored fields from a snapshot of the same object
    ///
    /// Identity, layer, hierarchy links, the live physics body and the active
    /// camera flag are left alone; the registry reconciles those itself.
    pub(crate) fn restore_fields(&mut self, snapshot: &SceneObject) {
        self.name.clone_from(&snapshot.name);
        self.tag.clone_from(&snapshot.tag);
        self.position = snapshot.position;
        self.size = snapshot.size;
        self.rotation = snapshot.rotation;
        self.visible = snapshot.visible;
        match (&mut self.variant, &snapshot.variant) {
            (Variant::Object, Variant::Object) => {}
            (Variant::Entity(live), Variant::Entity(saved)) => live.restore_from(saved),
            (Variant::Text(live), Variant::Text(saved)) => *live = saved.clone(),
            (Variant::Camera(live), Variant::Camera(saved)) => live.restore_from(saved),
            (live, saved) => log::error!(
                "Snapshot kind {} does not match live object {} of kind {}",
                saved.kind(),
                self.id,
                live.kind()
            ),
        }
    }

    /// Copy with a new identity and no hierarchy or runtime links
    pub(crate) fn duplicate_as(&self, id: ObjectId) -> SceneObject {
        let mut copy = self.clone();
        copy.id = id;
        copy.parent = None;
        copy.children.clear();
        match &mut copy.variant {
            Variant::Entity(entity) => {
                entity.detach_body();
            }
            Variant::Camera(camera) => camera.set_active(false),
            Variant::Object | Variant::Text(_) => {}
        }
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DrawList;

    #[test]
    fn test_rotation_is_normalized() {
        let mut object = SceneObject::new(ObjectId::generate(), Variant::Object);
        object.set_rotation(725.0);
        assert!((object.rotation() - 5.0).abs() < 1e-4);
        object.set_rotation(-360.0);
        assert_eq!(object.rotation(), 0.0);
    }

    #[test]
    fn test_hidden_objects_do_not_draw() {
        let mut object = SceneObject::new(ObjectId::generate(), Variant::default_for(ObjectKind::Entity));
        let mut list = DrawList::new();
        object.draw(&View::default(), &mut list);
        assert_eq!(list.len(), 1);

        object.visible = false;
        list.clear();
        object.draw(&View::default(), &mut list);
        assert!(list.is_empty());
    }

    #[test]
    fn test_camera_gizmo_only_with_gizmos() {
        let camera = SceneObject::new(ObjectId::generate(), Variant::default_for(ObjectKind::Camera));
        let mut list = DrawList::new();
        camera.draw(&View::default(), &mut list);
        assert!(list.is_empty());
        camera.draw(&View::default().with_gizmos(true), &mut list);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_restore_keeps_runtime_links() {
        let id = ObjectId::generate();
        let mut live = SceneObject::new(id, Variant::default_for(ObjectKind::Entity));
        live.as_entity_mut().unwrap().attach_body(crate::physics::BodyHandle::from_raw(9));
        live.set_parent_field(Some(ObjectId::generate()));

        let mut snapshot = SceneObject::new(id, Variant::default_for(ObjectKind::Entity));
        snapshot.name = "Restored".to_string();
        snapshot.position = Vec2::new(3.0, 4.0);

        live.restore_fields(&snapshot);
        assert_eq!(live.name, "Restored");
        assert_eq!(live.position, Vec2::new(3.0, 4.0));
        assert!(live.parent().is_some());
        assert!(live.as_entity().unwrap().body().is_some());
    }
}
