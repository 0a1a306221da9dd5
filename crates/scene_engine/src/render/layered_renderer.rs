//! Layered renderer
//!
//! Paint order is decided by a small fixed number of buckets. Every live
//! object sits in exactly one bucket, the one matching its `layer` field.
//! Drawing walks buckets in index order and objects in insertion order
//! within a bucket. Moving an object between layers is always
//! remove-then-insert, so it goes to the back of its new bucket.
//!
//! The renderer is a mirror of the scene registry: only the registry adds or
//! removes entries, and the renderer never touches object storage.

use crate::render::{DrawTarget, View};
use crate::scene::{ObjectHandle, ObjectId, SceneError, SceneObject};

/// Number of render layers
pub const LAYER_COUNT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
struct LayerEntry {
    id: ObjectId,
    handle: ObjectHandle,
}

/// Fixed set of ordered draw buckets
#[derive(Debug)]
pub struct LayeredRenderer {
    buckets: Vec<Vec<LayerEntry>>,
}

impl LayeredRenderer {
    /// Create a renderer with [`LAYER_COUNT`] empty buckets
    pub fn new() -> Self {
        Self {
            buckets: vec![Vec::new(); LAYER_COUNT],
        }
    }

    /// Number of buckets
    pub fn layer_count(&self) -> usize {
        self.buckets.len()
    }

    /// Append an object to the back of `layer`
    ///
    /// Fails with `LayerOutOfRange` outside the bucket range and with
    /// `DuplicateIdentity` if the object is already in some bucket.
    pub fn add_to_layer(
        &mut self,
        id: ObjectId,
        handle: ObjectHandle,
        layer: usize,
    ) -> Result<(), SceneError> {
        if layer >= self.buckets.len() {
            return Err(SceneError::LayerOutOfRange {
                layer,
                count: self.buckets.len(),
            });
        }
        if self.layer_of(id).is_some() {
            return Err(SceneError::DuplicateIdentity(id));
        }
        self.buckets[layer].push(LayerEntry { id, handle });
        Ok(())
    }

    /// Remove an object from whichever bucket holds it
    ///
    /// Returns the layer it was removed from.
    pub fn remove_from_layer(&mut self, id: ObjectId) -> Option<usize> {
        for (layer, bucket) in self.buckets.iter_mut().enumerate() {
            if let Some(index) = bucket.iter().position(|entry| entry.id == id) {
                bucket.remove(index);
                return Some(layer);
            }
        }
        None
    }

    /// Layer currently holding `id`
    pub fn layer_of(&self, id: ObjectId) -> Option<usize> {
        self.buckets
            .iter()
            .position(|bucket| bucket.iter().any(|entry| entry.id == id))
    }

    /// Identities in `layer` in paint order
    pub fn layer_ids(&self, layer: usize) -> Vec<ObjectId> {
        self.buckets
            .get(layer)
            .map(|bucket| bucket.iter().map(|entry| entry.id).collect())
            .unwrap_or_default()
    }

    /// Every identity in paint order
    pub fn paint_order(&self) -> Vec<ObjectId> {
        self.buckets
            .iter()
            .flat_map(|bucket| bucket.iter().map(|entry| entry.id))
            .collect()
    }

    /// Total number of indexed objects
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    /// Whether no objects are indexed
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }

    /// Draw every indexed object in paint order
    ///
    /// `resolve` maps a storage handle to the live object; entries that no
    /// longer resolve are skipped with an error log.
    pub fn draw<'a, F>(&self, view: &View, resolve: F, target: &mut dyn DrawTarget)
    where
        F: Fn(ObjectHandle) -> Option<&'a SceneObject>,
    {
        for bucket in &self.buckets {
            for entry in bucket {
                match resolve(entry.handle) {
                    Some(object) => object.draw(view, target),
                    None => log::error!("Renderer entry {} has no live object", entry.id),
                }
            }
        }
    }

    /// Empty every bucket without touching object storage
    pub fn reset(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }
}

impl Default for LayeredRenderer {
    fn default() -> Self {
        Self::new()
    }
}
