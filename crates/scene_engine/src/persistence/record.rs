//! Persisted object records
//!
//! One JSON object per scene object. Base fields are shared by every kind;
//! the kind-specific fields are merged into the same object and selected by
//! its `"type"` key.

use serde::{Deserialize, Serialize};

use crate::assets::AssetProvider;
use crate::foundation::math::{from_pair, to_pair};
use crate::physics::BodyKind;
use crate::scene::{
    CameraData, EntityData, ObjectId, ObjectKind, SceneObject, TextLabel, Variant,
};

/// Base fields of a persisted object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// Identity in its text form
    pub uuid: ObjectId,
    /// Display name
    pub name: String,
    /// Free-form tag
    #[serde(default)]
    pub tag: String,
    /// Center position
    pub position: [f32; 2],
    /// Full size
    pub size: [f32; 2],
    /// Rotation in degrees
    #[serde(default)]
    pub rotation: f32,
    /// Visibility flag
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    /// Render layer
    #[serde(default)]
    pub layer: usize,
    /// Parent identity; written as the string `"null"` for roots
    #[serde(with = "parent_field", default)]
    pub parent: Option<ObjectId>,
    /// Kind-specific fields
    #[serde(flatten)]
    pub data: RecordData,
}

fn default_visible() -> bool {
    true
}

/// Kind-specific persisted fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RecordData {
    /// Plain object
    Object,
    /// Entity
    Entity {
        /// Body kind
        body_type: BodyKind,
        /// Texture path, empty for none
        #[serde(default)]
        texture_path: String,
        /// Bound script
        #[serde(default, skip_serializing_if = "Option::is_none")]
        script_path: Option<String>,
    },
    /// Text label
    Text {
        /// Authored content
        text: String,
        /// Font path, empty for the default font
        #[serde(default)]
        font_path: String,
        /// Font size
        font_size: f32,
        /// Spacing between graphemes
        char_spacing: f32,
        /// Wrap width, zero or less for none
        #[serde(default)]
        max_text_width: f32,
        /// RGBA fill color
        color: [u8; 4],
    },
    /// Camera
    Camera {
        /// Whether this is the active view
        #[serde(default)]
        is_active: bool,
        /// Zoom factor
        zoom: f32,
        /// View target
        #[serde(default)]
        target: [f32; 2],
        /// Followed object
        #[serde(default, skip_serializing_if = "Option::is_none")]
        follow: Option<ObjectId>,
    },
}

impl RecordData {
    /// Kind this record describes
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Object => ObjectKind::Object,
            Self::Entity { .. } => ObjectKind::Entity,
            Self::Text { .. } => ObjectKind::Text,
            Self::Camera { .. } => ObjectKind::Camera,
        }
    }
}

impl ObjectRecord {
    /// Record for a live object
    pub fn from_object(object: &SceneObject) -> Self {
        let data = match object.variant() {
            Variant::Object => RecordData::Object,
            Variant::Entity(entity) => RecordData::Entity {
                body_type: entity.body_kind,
                texture_path: entity.texture_path().to_string(),
                script_path: entity.script_path.clone(),
            },
            Variant::Text(text) => RecordData::Text {
                text: text.content().to_string(),
                font_path: text.font_path().to_string(),
                font_size: text.font_size(),
                char_spacing: text.char_spacing(),
                max_text_width: text.max_width(),
                color: text.color,
            },
            Variant::Camera(camera) => RecordData::Camera {
                is_active: camera.is_active(),
                zoom: camera.zoom,
                target: to_pair(camera.target),
                follow: camera.follow,
            },
        };

        Self {
            uuid: object.id(),
            name: object.name.clone(),
            tag: object.tag.clone(),
            position: to_pair(object.position),
            size: to_pair(object.size),
            rotation: object.rotation(),
            is_visible: object.visible,
            layer: object.layer(),
            parent: object.parent(),
            data,
        }
    }

    /// Build the object this record describes, loading assets on the way
    ///
    /// The result is unlinked; the parent is applied by the loader once every
    /// object exists.
    pub fn to_object(&self, assets: &mut dyn AssetProvider) -> SceneObject {
        let variant = match &self.data {
            RecordData::Object => Variant::Object,
            RecordData::Entity {
                body_type,
                texture_path,
                script_path,
            } => {
                let mut entity = EntityData::new(*body_type);
                if !texture_path.is_empty() {
                    entity.set_texture(texture_path.clone(), assets);
                }
                entity.script_path = script_path.clone();
                Variant::Entity(entity)
            }
            RecordData::Text {
                text,
                font_path,
                font_size,
                char_spacing,
                max_text_width,
                color,
            } => {
                let mut label = TextLabel::new(text.clone());
                if !font_path.is_empty() {
                    label.set_font(font_path.clone(), assets);
                }
                label.set_font_size(*font_size);
                label.set_char_spacing(*char_spacing);
                label.set_max_width(*max_text_width);
                label.color = *color;
                Variant::Text(label)
            }
            RecordData::Camera {
                is_active,
                zoom,
                target,
                follow,
            } => {
                let mut camera = CameraData::new();
                camera.zoom = *zoom;
                camera.target = from_pair(*target);
                camera.follow = *follow;
                camera.set_active(*is_active);
                Variant::Camera(camera)
            }
        };

        let mut object = SceneObject::new(self.uuid, variant);
        object.name.clone_from(&self.name);
        object.tag.clone_from(&self.tag);
        object.position = from_pair(self.position);
        object.size = from_pair(self.size);
        object.set_rotation(self.rotation);
        object.visible = self.is_visible;
        object.set_layer_field(self.layer);
        object
    }
}

mod parent_field {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::scene::ObjectId;

    const NO_PARENT: &str = "null";

    pub fn serialize<S: Serializer>(parent: &Option<ObjectId>, serializer: S) -> Result<S::Ok, S::Error> {
        match parent {
            Some(id) => serializer.serialize_str(&id.to_string()),
            None => serializer.serialize_str(NO_PARENT),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<ObjectId>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(text) if text.is_empty() || text == NO_PARENT => Ok(None),
            Some(text) => ObjectId::parse(&text).map(Some).map_err(D::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::NullAssets;
    use serde_json::json;

    #[test]
    fn test_entity_record_layout() {
        let mut object = SceneObject::new(ObjectId::from_parts(1, 2), Variant::Entity(EntityData::new(BodyKind::Dynamic)));
        object.name = "Crate".to_string();
        object.set_layer_field(3);

        let value = serde_json::to_value(ObjectRecord::from_object(&object)).unwrap();
        assert_eq!(value["uuid"], json!("1_2"));
        assert_eq!(value["type"], json!("entity"));
        assert_eq!(value["body_type"], json!("dynamic"));
        assert_eq!(value["texture_path"], json!(""));
        assert_eq!(value["parent"], json!("null"));
        assert_eq!(value["layer"], json!(3));
        assert_eq!(value["is_visible"], json!(true));
        assert!(value.get("script_path").is_none());
    }

    #[test]
    fn test_text_record_restores_wrapping() {
        let value = json!({
            "uuid": "7_8", "type": "text", "name": "Title", "tag": "",
            "position": [10.0, 20.0], "size": [64.0, 64.0], "rotation": 0.0,
            "is_visible": true, "layer": 1, "parent": "3_4",
            "text": "hello world", "font_path": "", "font_size": 20.0,
            "char_spacing": 1.0, "max_text_width": 54.0, "color": [255, 0, 0, 255]
        });
        let record: ObjectRecord = serde_json::from_value(value).unwrap();
        assert_eq!(record.parent, Some(ObjectId::from_parts(3, 4)));

        let object = record.to_object(&mut NullAssets);
        let text = object.as_text().unwrap();
        assert_eq!(text.wrapped(), "hello\nworld");
        assert_eq!(text.color, [255, 0, 0, 255]);
        assert_eq!(object.layer(), 1);
        // Links are applied by the loader
        assert_eq!(object.parent(), None);
    }

    #[test]
    fn test_plain_object_and_null_parent() {
        let value = json!({
            "uuid": "5_6", "type": "object", "name": "Group",
            "position": [0.0, 0.0], "size": [1.0, 1.0], "parent": null
        });
        let record: ObjectRecord = serde_json::from_value(value).unwrap();
        assert_eq!(record.data, RecordData::Object);
        assert_eq!(record.parent, None);
        assert!(record.is_visible);
    }

    #[test]
    fn test_malformed_parent_rejected() {
        let value = json!({
            "uuid": "5_6", "type": "object", "name": "Group",
            "position": [0.0, 0.0], "size": [1.0, 1.0], "parent": "not-an-id"
        });
        assert!(serde_json::from_value::<ObjectRecord>(value).is_err());
    }
}
