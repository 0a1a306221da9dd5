//! Scene persistence
//!
//! A scene is saved as one JSON document:
//!
//! ```text
//! { "settings": { "gravity": [x, y], "version": 1 },
//!   "objects": [ { "uuid": "..", "type": "entity", ... }, ... ] }
//! ```
//!
//! Objects are written parents-first in hierarchy order, so rebuilding child
//! lists from `parent` links in file order reproduces the saved ordering.
//! Identities are written in their text form and come back unchanged.

mod record;

pub use record::{ObjectRecord, RecordData};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use crate::assets::AssetProvider;
use crate::foundation::math::{from_pair, to_pair};
use crate::scene::{ObjectId, SceneError, SceneRegistry};

/// Current scene format version
pub const SCENE_FORMAT_VERSION: u32 = 1;

/// Persistence errors
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Reading or writing the file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid scene JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The scene could not be rebuilt
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// The file was written by an unknown format version
    #[error("Unsupported scene version {found} (supported: {supported})")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Version this build reads
        supported: u32,
    },
}

/// Scene-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSettings {
    /// Physics gravity
    pub gravity: [f32; 2],
    /// Format version
    pub version: u32,
}

/// A whole persisted scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneFile {
    /// Scene-wide settings
    pub settings: SceneSettings,
    /// Object records, parents before children
    pub objects: Vec<ObjectRecord>,
}

impl SceneFile {
    /// Capture the registry's current state
    pub fn capture(registry: &SceneRegistry) -> Self {
        let mut order: Vec<ObjectId> = Vec::with_capacity(registry.len());
        let mut stack: Vec<ObjectId> = registry.roots().into_iter().rev().collect();
        while let Some(id) = stack.pop() {
            if order.contains(&id) {
                continue;
            }
            order.push(id);
            if let Some(children) = registry.children_of(id) {
                stack.extend(children.iter().rev().copied());
            }
        }
        // Anything unreachable from a root still gets saved
        for id in registry.ids() {
            if !order.contains(&id) {
                log::warn!("Object {} is not reachable from a root; saving it anyway", id);
                order.push(id);
            }
        }

        let objects = order
            .into_iter()
            .filter_map(|id| registry.get(id))
            .map(ObjectRecord::from_object)
            .collect();

        Self {
            settings: SceneSettings {
                gravity: to_pair(registry.gravity()),
                version: SCENE_FORMAT_VERSION,
            },
            objects,
        }
    }

    /// Replace the registry's contents with this scene
    ///
    /// Every record is checked before the registry is touched, so a file
    /// that fails leaves the current scene as it was. A record naming an
    /// unknown parent is logged and left at the root. Returns the number of
    /// objects loaded.
    pub fn restore(
        &self,
        registry: &mut SceneRegistry,
        assets: &mut dyn AssetProvider,
    ) -> Result<usize, PersistenceError> {
        self.check_version()?;
        self.check_records(registry.layer_count())?;

        registry.set_gravity(from_pair(self.settings.gravity));
        registry.reset();

        for record in &self.objects {
            registry.insert(record.to_object(assets))?;
        }
        for record in &self.objects {
            let Some(parent) = record.parent else { continue };
            if !registry.contains(parent) {
                log::warn!("Object {} names unknown parent {}; left at the root", record.uuid, parent);
                continue;
            }
            if let Err(e) = registry.reparent(record.uuid, Some(parent)) {
                log::warn!("Object {} could not join parent {}: {}", record.uuid, parent, e);
            }
        }

        log::info!("Loaded scene with {} objects", self.objects.len());
        Ok(self.objects.len())
    }

    fn check_version(&self) -> Result<(), PersistenceError> {
        let found = self.settings.version;
        if found == 0 || found > SCENE_FORMAT_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                found,
                supported: SCENE_FORMAT_VERSION,
            });
        }
        Ok(())
    }

    fn check_records(&self, layer_count: usize) -> Result<(), PersistenceError> {
        let mut seen = HashSet::with_capacity(self.objects.len());
        for record in &self.objects {
            if record.layer >= layer_count {
                return Err(SceneError::LayerOutOfRange {
                    layer: record.layer,
                    count: layer_count,
                }
                .into());
            }
            if !seen.insert(record.uuid) {
                return Err(SceneError::DuplicateIdentity(record.uuid).into());
            }
        }
        Ok(())
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON
    pub fn from_json(text: &str) -> Result<Self, PersistenceError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Serialize the registry to a JSON string
pub fn to_json(registry: &SceneRegistry) -> Result<String, PersistenceError> {
    SceneFile::capture(registry).to_json()
}

/// Replace the registry's contents from a JSON string
pub fn from_json(
    registry: &mut SceneRegistry,
    assets: &mut dyn AssetProvider,
    text: &str,
) -> Result<usize, PersistenceError> {
    SceneFile::from_json(text)?.restore(registry, assets)
}

/// Save the registry to a file
pub fn save_scene(registry: &SceneRegistry, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
    let path = path.as_ref();
    std::fs::write(path, to_json(registry)?)?;
    log::info!("Saved scene to {}", path.display());
    Ok(())
}

/// Replace the registry's contents from a file
pub fn load_scene(
    registry: &mut SceneRegistry,
    assets: &mut dyn AssetProvider,
    path: impl AsRef<Path>,
) -> Result<usize, PersistenceError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    from_json(registry, assets, &text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::NullAssets;
    use crate::foundation::math::Vec2;
    use crate::physics::BodyKind;

    fn registry() -> SceneRegistry {
        SceneRegistry::with_simple_physics(Vec2::new(0.0, 9.81))
    }

    #[test]
    fn test_round_trip_keeps_identities_and_order() {
        let mut scene = registry();
        let root = scene.instantiate_object();
        let second = scene.instantiate_entity(BodyKind::Static);
        let first = scene.instantiate_text("hello");
        scene.reparent(first, Some(root)).unwrap();
        scene.reparent(second, Some(root)).unwrap();
        let camera = scene.instantiate_camera();
        scene.set_active_camera(camera).unwrap();
        scene.set_layer(second, 7).unwrap();

        let json = to_json(&scene).unwrap();
        let mut loaded = registry();
        assert_eq!(from_json(&mut loaded, &mut NullAssets, &json).unwrap(), 4);

        assert_eq!(loaded.children_of(root).unwrap(), &[first, second]);
        assert_eq!(loaded.get(second).unwrap().layer(), 7);
        assert_eq!(loaded.renderer().layer_of(second), Some(7));
        assert_eq!(loaded.active_camera(), Some(camera));
        assert_eq!(to_json(&loaded).unwrap(), json);
    }

    #[test]
    fn test_unknown_parent_left_at_root() {
        let mut scene = registry();
        let child = scene.instantiate_object();
        let mut file = SceneFile::capture(&scene);
        file.objects[0].parent = Some(ObjectId::generate());

        let mut loaded = registry();
        file.restore(&mut loaded, &mut NullAssets).unwrap();
        assert_eq!(loaded.roots(), vec![child]);
    }

    #[test]
    fn test_future_version_rejected() {
        let scene = registry();
        let mut file = SceneFile::capture(&scene);
        file.settings.version = SCENE_FORMAT_VERSION + 1;

        let mut loaded = registry();
        let result = file.restore(&mut loaded, &mut NullAssets);
        assert!(matches!(result, Err(PersistenceError::UnsupportedVersion { .. })));
    }

    #[test]
    fn test_duplicate_identity_in_file_fails() {
        let mut scene = registry();
        scene.instantiate_object();
        let mut file = SceneFile::capture(&scene);
        file.objects.push(file.objects[0].clone());

        let mut loaded = registry();
        let result = file.restore(&mut loaded, &mut NullAssets);
        assert!(matches!(
            result,
            Err(PersistenceError::Scene(SceneError::DuplicateIdentity(_)))
        ));
    }

    #[test]
    fn test_failed_load_keeps_current_scene() {
        let mut live = registry();
        let ids: Vec<ObjectId> = (0..5).map(|_| live.instantiate_entity(BodyKind::None)).collect();
        live.reparent(ids[1], Some(ids[0])).unwrap();
        let before = to_json(&live).unwrap();

        let mut source = registry();
        source.instantiate_object();
        source.instantiate_object();
        let mut value: serde_json::Value = serde_json::from_str(&to_json(&source).unwrap()).unwrap();
        value["objects"][1]["layer"] = serde_json::json!(12);
        value["settings"]["gravity"] = serde_json::json!([0.0, -1.0]);

        let result = from_json(&mut live, &mut NullAssets, &value.to_string());
        assert!(matches!(
            result,
            Err(PersistenceError::Scene(SceneError::LayerOutOfRange { layer: 12, .. }))
        ));
        assert_eq!(live.len(), 5);
        assert_eq!(live.gravity(), Vec2::new(0.0, 9.81));
        assert_eq!(to_json(&live).unwrap(), before);
    }

    #[test]
    fn test_settings_carry_gravity() {
        let mut scene = SceneRegistry::with_simple_physics(Vec2::new(0.0, -3.0));
        scene.instantiate_object();
        let json = to_json(&scene).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["settings"]["version"], serde_json::json!(SCENE_FORMAT_VERSION));

        let mut loaded = registry();
        from_json(&mut loaded, &mut NullAssets, &json).unwrap();
        assert_eq!(loaded.gravity(), Vec2::new(0.0, -3.0));
    }
}
