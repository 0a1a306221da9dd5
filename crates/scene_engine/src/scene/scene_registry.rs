//! Scene Registry - the live-object directory
//!
//! The registry is the single owner of canonical object state. Objects live
//! in one [`Arena`] per kind and are found by identity through a flat list
//! kept in creation order. The layered renderer and the physics world are
//! downstream mirrors: every lifecycle or layer change goes through this
//! type, which keeps both in step.
//!
//! ## Hierarchy
//!
//! Parent and child links are identities, never addresses. [`SceneRegistry::reparent`]
//! is the only way links change, so `B in A.children <=> B.parent == A`
//! holds after every operation.
//!
//! ## Lookup cost
//!
//! Identity resolution is a linear scan of the flat list. Editor scenes are
//! small; a hash index can be added here without changing callers.

use thiserror::Error;

use crate::foundation::collections::{Arena, SlotAddress};
use crate::foundation::math::Vec2;
use crate::physics::{BodyDesc, BodyKind, PhysicsBackend, PhysicsWorld, SimplePhysicsBackend};
use crate::render::{DrawTarget, LayeredRenderer, View, LAYER_COUNT};
use crate::scene::{
    CameraData, EntityData, ObjectId, ObjectKind, SceneObject, TextLabel, Variant,
};

/// Errors raised at the registry's mutation boundary
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// Layer index outside the renderer's bucket range
    #[error("Layer {layer} is out of range (layer count {count})")]
    LayerOutOfRange {
        /// Requested layer
        layer: usize,
        /// Number of layers
        count: usize,
    },

    /// Identity does not resolve to a live object
    #[error("Object {0} not found")]
    NotFound(ObjectId),

    /// Reparent would make an object its own ancestor
    #[error("Reparenting {child} under {parent} would create a cycle")]
    HierarchyCycle {
        /// Object being moved
        child: ObjectId,
        /// Requested parent
        parent: ObjectId,
    },

    /// Identity is already held by a live object
    #[error("Identity {0} is already in use")]
    DuplicateIdentity(ObjectId),

    /// Object is not of the kind the operation needs
    #[error("Object {id} is a {actual}, expected {expected}")]
    KindMismatch {
        /// Object identity
        id: ObjectId,
        /// Kind the operation needs
        expected: ObjectKind,
        /// Kind of the live object
        actual: ObjectKind,
    },
}

/// Storage location of a live object: its kind's arena and the slot in it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectHandle {
    kind: ObjectKind,
    slot: SlotAddress,
}

impl ObjectHandle {
    /// Create a handle
    pub fn new(kind: ObjectKind, slot: SlotAddress) -> Self {
        Self { kind, slot }
    }

    /// Kind whose arena holds the object
    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Slot inside that arena
    pub fn slot(&self) -> SlotAddress {
        self.slot
    }
}

fn storage_index(kind: ObjectKind) -> usize {
    match kind {
        ObjectKind::Object => 0,
        ObjectKind::Entity => 1,
        ObjectKind::Text => 2,
        ObjectKind::Camera => 3,
    }
}

/// Live-object directory
pub struct SceneRegistry {
    arenas: [Arena<SceneObject>; 4],
    /// Every live object in creation order
    entries: Vec<(ObjectId, ObjectHandle)>,
    renderer: LayeredRenderer,
    backend: Box<dyn PhysicsBackend>,
    world: Option<Box<dyn PhysicsWorld>>,
    gravity: Vec2,
    active_camera: Option<ObjectId>,
    /// Identities freed by deletion; fresh identities never collide with these
    retired: Vec<ObjectId>,
}

impl SceneRegistry {
    /// Create an empty registry using `backend` for physics
    pub fn new(backend: Box<dyn PhysicsBackend>, gravity: Vec2) -> Self {
        let mut registry = Self {
            arenas: std::array::from_fn(|_| Arena::new()),
            entries: Vec::new(),
            renderer: LayeredRenderer::new(),
            backend,
            world: None,
            gravity,
            active_camera: None,
            retired: Vec::new(),
        };
        registry.recreate_world();
        registry
    }

    /// Create an empty registry with the built-in physics world
    pub fn with_simple_physics(gravity: Vec2) -> Self {
        Self::new(Box::new(SimplePhysicsBackend), gravity)
    }

    fn recreate_world(&mut self) {
        self.world = match self.backend.create_world(self.gravity) {
            Ok(world) => Some(world),
            Err(e) => {
                log::warn!("Physics world unavailable, continuing without simulation: {}", e);
                None
            }
        };
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    fn fresh_identity(&self) -> ObjectId {
        loop {
            let id = ObjectId::generate();
            if !self.contains(id) && !self.retired.contains(&id) {
                return id;
            }
        }
    }

    fn store(&mut self, object: SceneObject) -> Result<ObjectId, SceneError> {
        let id = object.id();
        let layer = object.layer();
        let kind = object.kind();
        let slot = self.arenas[storage_index(kind)].insert(object);
        let handle = ObjectHandle::new(kind, slot);
        if let Err(e) = self.renderer.add_to_layer(id, handle, layer) {
            self.arenas[storage_index(kind)].deallocate(slot);
            return Err(e);
        }
        self.entries.push((id, handle));
        log::debug!("Created {} {}", kind, id);
        Ok(id)
    }

    /// Create a default object of `kind` at layer 0 and return its identity
    pub fn instantiate(&mut self, kind: ObjectKind) -> ObjectId {
        self.instantiate_variant(Variant::default_for(kind))
    }

    fn instantiate_variant(&mut self, variant: Variant) -> ObjectId {
        let object = SceneObject::new(self.fresh_identity(), variant);
        let id = object.id();
        // Layer 0 always exists and the identity is fresh
        if let Err(e) = self.store(object) {
            log::error!("Failed to store new object {}: {}", id, e);
        }
        id
    }

    /// Create a plain grouping object
    pub fn instantiate_object(&mut self) -> ObjectId {
        self.instantiate_variant(Variant::Object)
    }

    /// Create an entity with the given body kind
    ///
    /// No physics body is created here; call
    /// [`create_physics_bodies`](Self::create_physics_bodies) once size and
    /// position are set.
    pub fn instantiate_entity(&mut self, body_kind: BodyKind) -> ObjectId {
        self.instantiate_variant(Variant::Entity(EntityData::new(body_kind)))
    }

    /// Create a text label
    pub fn instantiate_text(&mut self, content: impl Into<String>) -> ObjectId {
        self.instantiate_variant(Variant::Text(TextLabel::new(content)))
    }

    /// Create an inactive camera
    pub fn instantiate_camera(&mut self) -> ObjectId {
        self.instantiate_variant(Variant::Camera(CameraData::new()))
    }

    /// Insert a whole object under its own identity
    ///
    /// Used to bring back destroyed objects and to load scenes. The object
    /// arrives unlinked (no parent, no children, no physics body); an active
    /// camera takes over the active view.
    pub fn insert(&mut self, mut object: SceneObject) -> Result<ObjectId, SceneError> {
        let id = object.id();
        if self.contains(id) {
            return Err(SceneError::DuplicateIdentity(id));
        }
        if object.layer() >= self.renderer.layer_count() {
            return Err(SceneError::LayerOutOfRange {
                layer: object.layer(),
                count: self.renderer.layer_count(),
            });
        }
        object.set_parent_field(None);
        object.children_mut().clear();
        if let Some(entity) = object.as_entity_mut() {
            entity.detach_body();
        }
        let wants_active = object.as_camera().map_or(false, CameraData::is_active);
        if let Some(camera) = object.as_camera_mut() {
            camera.set_active(false);
        }

        self.store(object)?;
        self.retired.retain(|retired| *retired != id);
        if wants_active {
            self.set_active_camera(id)?;
        }
        Ok(id)
    }

    /// Destroy an object
    ///
    /// Detaches it from its parent, leaves its children parentless where they
    /// stand, destroys its physics body and removes it from the renderer.
    /// Returns the removed object with its hierarchy links as they were, or
    /// `None` (logged) if the identity does not resolve.
    pub fn destroy(&mut self, id: ObjectId) -> Option<SceneObject> {
        let Some(index) = self.entries.iter().position(|(entry, _)| *entry == id) else {
            log::error!("Cannot destroy {}: object not found", id);
            return None;
        };
        let (_, handle) = self.entries.remove(index);

        let (parent, children) = match self.object(handle) {
            Some(object) => (object.parent(), object.children().to_vec()),
            None => (None, Vec::new()),
        };
        if let Some(parent) = parent.and_then(|p| self.get_mut(p)) {
            parent.children_mut().retain(|child| *child != id);
        }
        for child in children {
            if let Some(child) = self.get_mut(child) {
                child.set_parent_field(None);
            }
        }

        self.renderer.remove_from_layer(id);
        if self.active_camera == Some(id) {
            self.active_camera = None;
        }
        self.retired.push(id);

        let mut removed = self.arenas[storage_index(handle.kind())].deallocate(handle.slot())?;
        if let Some(body) = removed.as_entity_mut().and_then(EntityData::detach_body) {
            if let Some(world) = self.world.as_mut() {
                world.destroy_body(body);
            }
        }
        log::debug!("Destroyed {} {}", removed.kind(), id);
        Some(removed)
    }

    /// Copy an object under a new identity
    ///
    /// The copy keeps every field and the same parent, but has no children
    /// and no physics body. Cameras are copied inactive.
    pub fn duplicate(&mut self, id: ObjectId) -> Option<ObjectId> {
        let Some(source) = self.get(id) else {
            log::error!("Cannot duplicate {}: object not found", id);
            return None;
        };
        let parent = source.parent();
        let copy = source.duplicate_as(self.fresh_identity());
        let copy_id = self.store(copy).ok()?;
        if parent.is_some() {
            if let Err(e) = self.reparent(copy_id, parent) {
                log::error!("Duplicate {} could not join its parent: {}", copy_id, e);
            }
        }
        Some(copy_id)
    }

    /// Destroy every object, clear layer and identity state, and recreate
    /// an empty physics world
    pub fn reset(&mut self) {
        for arena in &mut self.arenas {
            arena.clear();
        }
        self.entries.clear();
        self.renderer.reset();
        self.active_camera = None;
        self.retired.clear();
        self.recreate_world();
        log::info!("Scene reset");
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    fn handle_of(&self, id: ObjectId) -> Option<ObjectHandle> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == id)
            .map(|(_, handle)| *handle)
    }

    fn object(&self, handle: ObjectHandle) -> Option<&SceneObject> {
        self.arenas[storage_index(handle.kind())].get(handle.slot())
    }

    fn object_mut(&mut self, handle: ObjectHandle) -> Option<&mut SceneObject> {
        self.arenas[storage_index(handle.kind())].get_mut(handle.slot())
    }

    /// Resolve an identity to its live object
    pub fn find_by_identity(&self, id: ObjectId) -> Option<&SceneObject> {
        self.handle_of(id).and_then(|handle| self.object(handle))
    }

    /// Same as [`find_by_identity`](Self::find_by_identity)
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.find_by_identity(id)
    }

    /// Mutable access to a live object
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        let handle = self.handle_of(id)?;
        self.object_mut(handle)
    }

    /// Live object that must be of `kind`
    pub fn get_kind_mut(
        &mut self,
        id: ObjectId,
        kind: ObjectKind,
    ) -> Result<&mut SceneObject, SceneError> {
        let object = self.get_mut(id).ok_or(SceneError::NotFound(id))?;
        if object.kind() != kind {
            return Err(SceneError::KindMismatch {
                id,
                expected: kind,
                actual: object.kind(),
            });
        }
        Ok(object)
    }

    /// Whether `id` names a live object
    pub fn contains(&self, id: ObjectId) -> bool {
        self.handle_of(id).is_some()
    }

    /// Storage handle of a live object
    pub fn handle(&self, id: ObjectId) -> Option<ObjectHandle> {
        self.handle_of(id)
    }

    /// Every live object in creation order
    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> + '_ {
        self.entries
            .iter()
            .filter_map(move |(_, handle)| self.object(*handle))
    }

    /// Live objects of one kind in arena order
    pub fn objects_of_kind(&self, kind: ObjectKind) -> impl Iterator<Item = &SceneObject> + '_ {
        self.arenas[storage_index(kind)].iter().map(|(_, object)| object)
    }

    /// Every live identity in creation order
    pub fn ids(&self) -> Vec<ObjectId> {
        self.entries.iter().map(|(id, _)| *id).collect()
    }

    /// Parentless objects in creation order
    pub fn roots(&self) -> Vec<ObjectId> {
        self.objects()
            .filter(|object| object.parent().is_none())
            .map(SceneObject::id)
            .collect()
    }

    /// Children of `id` in order
    pub fn children_of(&self, id: ObjectId) -> Option<&[ObjectId]> {
        self.get(id).map(SceneObject::children)
    }

    /// First object with the given name
    pub fn find_by_name(&self, name: &str) -> Option<&SceneObject> {
        self.objects().find(|object| object.name == name)
    }

    /// Every object carrying `tag`
    pub fn find_by_tag(&self, tag: &str) -> Vec<&SceneObject> {
        self.objects().filter(|object| object.tag == tag).collect()
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the scene is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identities freed by deletion since the last reset
    pub fn retired_ids(&self) -> &[ObjectId] {
        &self.retired
    }

    // ========================================================================
    // Layers and hierarchy
    // ========================================================================

    /// Move an object to another render layer
    ///
    /// The object goes to the back of the new bucket.
    pub fn set_layer(&mut self, id: ObjectId, layer: usize) -> Result<(), SceneError> {
        if layer >= self.renderer.layer_count() {
            return Err(SceneError::LayerOutOfRange {
                layer,
                count: self.renderer.layer_count(),
            });
        }
        let handle = self.handle_of(id).ok_or(SceneError::NotFound(id))?;
        self.renderer.remove_from_layer(id);
        self.renderer.add_to_layer(id, handle, layer)?;
        if let Some(object) = self.object_mut(handle) {
            object.set_layer_field(layer);
        }
        Ok(())
    }

    /// Whether `ancestor` is on the parent chain above `id`
    pub fn is_ancestor(&self, ancestor: ObjectId, id: ObjectId) -> bool {
        let mut current = self.get(id).and_then(SceneObject::parent);
        // The chain is bounded by the object count even if links were corrupt
        for _ in 0..=self.entries.len() {
            match current {
                Some(parent) if parent == ancestor => return true,
                Some(parent) => current = self.get(parent).and_then(SceneObject::parent),
                None => return false,
            }
        }
        false
    }

    /// Move `child` under `new_parent`, or to the root with `None`
    ///
    /// The child is removed from its old parent's list and appended to the
    /// new parent's list. Fails if either object is missing or if the move
    /// would put an object under itself or one of its descendants.
    pub fn reparent(
        &mut self,
        child: ObjectId,
        new_parent: Option<ObjectId>,
    ) -> Result<(), SceneError> {
        self.move_child(child, new_parent, None)
    }

    /// Move `child` under `parent` at position `index` in its child list
    ///
    /// An index past the end appends. Fails like [`reparent`](Self::reparent).
    pub fn reparent_at(
        &mut self,
        child: ObjectId,
        parent: ObjectId,
        index: usize,
    ) -> Result<(), SceneError> {
        self.move_child(child, Some(parent), Some(index))
    }

    fn move_child(
        &mut self,
        child: ObjectId,
        new_parent: Option<ObjectId>,
        index: Option<usize>,
    ) -> Result<(), SceneError> {
        let old_parent = self.get(child).ok_or(SceneError::NotFound(child))?.parent();
        if let Some(parent) = new_parent {
            if !self.contains(parent) {
                return Err(SceneError::NotFound(parent));
            }
            if parent == child || self.is_ancestor(child, parent) {
                return Err(SceneError::HierarchyCycle { child, parent });
            }
        }

        if let Some(old) = old_parent.and_then(|p| self.get_mut(p)) {
            old.children_mut().retain(|c| *c != child);
        }
        if let Some(new) = new_parent.and_then(|p| self.get_mut(p)) {
            let children = new.children_mut();
            let at = index.map_or(children.len(), |i| i.min(children.len()));
            children.insert(at, child);
        }
        if let Some(object) = self.get_mut(child) {
            object.set_parent_field(new_parent);
        }
        Ok(())
    }

    /// Move an object to the root
    pub fn detach(&mut self, id: ObjectId) -> Result<(), SceneError> {
        self.reparent(id, None)
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    /// Overwrite a live object's authored fields from a snapshot of it
    ///
    /// The layer change is routed through the renderer and the active camera
    /// flag through [`set_active_camera`](Self::set_active_camera).
    /// Hierarchy links are left alone.
    pub fn restore(&mut self, snapshot: &SceneObject) -> Result<(), SceneError> {
        let id = snapshot.id();
        let object = self.get_kind_mut(id, snapshot.kind())?;
        object.restore_fields(snapshot);
        let layer_changed = object.layer() != snapshot.layer();
        let was_active = object.as_camera().map_or(false, CameraData::is_active);

        if layer_changed {
            self.set_layer(id, snapshot.layer())?;
        }
        if let Some(camera) = snapshot.as_camera() {
            match (camera.is_active(), was_active) {
                (true, false) => self.set_active_camera(id)?,
                (false, true) => self.deactivate_camera(),
                _ => {}
            }
        }
        Ok(())
    }

    // ========================================================================
    // Cameras
    // ========================================================================

    /// Make `id` the active camera, deactivating any other
    pub fn set_active_camera(&mut self, id: ObjectId) -> Result<(), SceneError> {
        self.get_kind_mut(id, ObjectKind::Camera)?;
        self.deactivate_camera();
        if let Some(camera) = self.get_mut(id).and_then(SceneObject::as_camera_mut) {
            camera.set_active(true);
        }
        self.active_camera = Some(id);
        Ok(())
    }

    /// Deactivate the active camera, if any
    pub fn deactivate_camera(&mut self) {
        if let Some(previous) = self.active_camera.take() {
            if let Some(camera) = self.get_mut(previous).and_then(SceneObject::as_camera_mut) {
                camera.set_active(false);
            }
        }
    }

    /// Identity of the active camera
    pub fn active_camera(&self) -> Option<ObjectId> {
        self.active_camera
    }

    /// View of the active camera, or the default view over `viewport`
    pub fn active_view(&self, viewport: Vec2) -> View {
        self.active_camera
            .and_then(|id| self.get(id))
            .and_then(SceneObject::as_camera)
            .map(|camera| camera.view(viewport))
            .unwrap_or_else(|| View::default().with_viewport(viewport.x, viewport.y))
    }

    // ========================================================================
    // Physics
    // ========================================================================

    /// Whether a physics world is available
    pub fn has_physics_world(&self) -> bool {
        self.world.is_some()
    }

    /// Gravity used for the physics world
    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    /// Change gravity; takes effect when the world is next recreated
    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    /// Number of bodies in the physics world
    pub fn body_count(&self) -> usize {
        self.world.as_ref().map_or(0, |world| world.body_count())
    }

    /// Attach a body to every simulated entity that has none yet
    ///
    /// Returns the number of bodies created. Creation failures are logged
    /// and the entity stays without a body.
    pub fn create_physics_bodies(&mut self) -> usize {
        let Some(world) = self.world.as_mut() else {
            log::warn!("No physics world; entities stay unsimulated");
            return 0;
        };
        let mut created = 0;
        for (_, object) in self.arenas[storage_index(ObjectKind::Entity)].iter_mut() {
            let desc = BodyDesc {
                kind: object.as_entity().map_or(BodyKind::None, |e| e.body_kind),
                position: object.position,
                rotation: object.rotation(),
                half_extents: object.bounds().half_extents,
            };
            let id = object.id();
            let Some(entity) = object.as_entity_mut() else { continue };
            if entity.body().is_some() || !desc.kind.wants_body() {
                continue;
            }
            match world.create_body(&desc) {
                Ok(body) => {
                    entity.attach_body(body);
                    created += 1;
                }
                Err(e) => log::warn!("Entity {} has no physics body: {}", id, e),
            }
        }
        log::debug!("Created {} physics bodies", created);
        created
    }

    /// Detach and destroy every entity's physics body
    pub fn destroy_physics_bodies(&mut self) {
        for (_, object) in self.arenas[storage_index(ObjectKind::Entity)].iter_mut() {
            let body = object.as_entity_mut().and_then(EntityData::detach_body);
            if let (Some(body), Some(world)) = (body, self.world.as_mut()) {
                world.destroy_body(body);
            }
        }
    }

    /// Advance the physics world and copy results back onto entities
    ///
    /// Physics is authoritative for attached entities here. Cameras that
    /// follow an object then move their target onto it.
    pub fn simulation_step(&mut self, dt: f32, iterations: u32) {
        if let Some(world) = self.world.as_mut() {
            world.step(dt, iterations);
            for (_, object) in self.arenas[storage_index(ObjectKind::Entity)].iter_mut() {
                let Some(body) = object.as_entity().and_then(EntityData::body) else { continue };
                if let Some(position) = world.body_position(body) {
                    object.position = position;
                }
                if let Some(rotation) = world.body_rotation(body) {
                    object.set_rotation(rotation);
                }
            }
        }
        self.follow_targets();
    }

    fn follow_targets(&mut self) {
        let follows: Vec<(ObjectId, ObjectId)> = self
            .objects_of_kind(ObjectKind::Camera)
            .filter_map(|object| {
                let target = object.as_camera()?.follow?;
                Some((object.id(), target))
            })
            .collect();
        for (camera_id, target) in follows {
            let Some(position) = self.get(target).map(|object| object.position) else {
                log::warn!("Camera {} follows missing object {}", camera_id, target);
                continue;
            };
            if let Some(camera) = self.get_mut(camera_id).and_then(SceneObject::as_camera_mut) {
                camera.target = position;
            }
        }
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Layered renderer index
    pub fn renderer(&self) -> &LayeredRenderer {
        &self.renderer
    }

    /// Number of render layers
    pub fn layer_count(&self) -> usize {
        LAYER_COUNT
    }

    /// Draw the scene in layer order
    pub fn draw(&self, view: &View, target: &mut dyn DrawTarget) {
        let arenas = &self.arenas;
        self.renderer.draw(
            view,
            |handle| arenas[storage_index(handle.kind())].get(handle.slot()),
            target,
        );
    }
}

impl Default for SceneRegistry {
    fn default() -> Self {
        Self::with_simple_physics(crate::core::PhysicsConfig::default().gravity_vec())
    }
}

impl std::fmt::Debug for SceneRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneRegistry")
            .field("objects", &self.entries.len())
            .field("active_camera", &self.active_camera)
            .field("has_world", &self.world.is_some())
            .finish()
    }
}
