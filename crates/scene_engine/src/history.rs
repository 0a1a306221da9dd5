//! Edit history (undo/redo)
//!
//! Two stacks of [`EditEvent`]s. Events hold whole-object clones or
//! hierarchy edges, never references: applying one re-resolves its target
//! through the [`SceneRegistry`] by identity, since the object may have been
//! destroyed and brought back in between.
//!
//! Whole-object edits follow a capture protocol:
//!
//! ```text
//! Idle --begin_capture--> Capturing --commit_capture--> Idle (event pushed)
//!                             \--------discard--------> Idle
//! ```
//!
//! [`EditHistory::edit`] runs begin, mutate and commit as one call and is the
//! preferred way in. A [`PendingCapture`] dropped without commit records
//! nothing and logs a warning.

use crate::core::HistoryConfig;
use crate::scene::{ObjectId, SceneError, SceneObject, SceneRegistry};

/// One undoable change
#[derive(Debug, Clone, PartialEq)]
pub enum EditEvent {
    /// Field edit of one object
    Modify {
        /// State before the edit
        before: SceneObject,
        /// State after the edit
        after: SceneObject,
    },
    /// Parent change of one object
    Reparent {
        /// Object that moved
        id: ObjectId,
        /// Parent before the move
        old_parent: Option<ObjectId>,
        /// Parent after the move
        new_parent: Option<ObjectId>,
    },
    /// Object creation
    Created {
        /// State right after creation
        snapshot: SceneObject,
    },
    /// Object destruction
    Destroyed {
        /// State right before destruction, hierarchy links included
        snapshot: SceneObject,
        /// Position in the parent's child list, if it had a parent
        sibling_index: Option<usize>,
    },
}

impl EditEvent {
    /// Identity of the object the event is about
    pub fn target(&self) -> ObjectId {
        match self {
            Self::Modify { after, .. } => after.id(),
            Self::Reparent { id, .. } => *id,
            Self::Created { snapshot } | Self::Destroyed { snapshot, .. } => snapshot.id(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Undo,
    Redo,
}

/// "Before" half of a whole-object edit waiting for its commit
#[derive(Debug)]
#[must_use = "commit or discard the capture, otherwise the edit is not recorded"]
pub struct PendingCapture {
    id: ObjectId,
    before: Option<SceneObject>,
}

impl PendingCapture {
    /// Identity of the captured object
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Drop the capture without recording anything
    pub fn discard(mut self) {
        self.before = None;
    }
}

impl Drop for PendingCapture {
    fn drop(&mut self) {
        if self.before.is_some() {
            log::warn!("Edit capture for {} dropped without commit", self.id);
        }
    }
}

/// Undo/redo stacks
#[derive(Debug, Default)]
pub struct EditHistory {
    undo_stack: Vec<EditEvent>,
    redo_stack: Vec<EditEvent>,
    /// Maximum undo depth, 0 = unlimited
    max_undo: usize,
}

impl EditHistory {
    /// Create an empty history with unlimited depth
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty history from configuration
    pub fn with_config(config: &HistoryConfig) -> Self {
        Self {
            max_undo: config.max_undo,
            ..Self::default()
        }
    }

    /// Maximum undo depth, 0 = unlimited
    pub fn max_undo(&self) -> usize {
        self.max_undo
    }

    /// Number of undoable events
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of redoable events
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Whether there is something to undo
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether there is something to redo
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Next event `undo` would apply
    pub fn peek_undo(&self) -> Option<&EditEvent> {
        self.undo_stack.last()
    }

    /// Drop both stacks
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Record an event
    ///
    /// A new edit invalidates every undone future, so the redo stack is
    /// cleared. The oldest event is dropped past the depth limit.
    pub fn push(&mut self, event: EditEvent) {
        log::debug!("Recorded edit on {}", event.target());
        self.undo_stack.push(event);
        self.redo_stack.clear();
        if self.max_undo > 0 && self.undo_stack.len() > self.max_undo {
            self.undo_stack.remove(0);
        }
    }

    // ========================================================================
    // Capture
    // ========================================================================

    /// Clone the current state of `id` as the "before" half of an edit
    pub fn begin_capture(&self, registry: &SceneRegistry, id: ObjectId) -> Option<PendingCapture> {
        match registry.get(id) {
            Some(object) => Some(PendingCapture {
                id,
                before: Some(object.clone()),
            }),
            None => {
                log::error!("Cannot capture {}: object not found", id);
                None
            }
        }
    }

    /// Clone the current state as "after" and record the edit
    ///
    /// Identical before and after states record nothing. Returns whether an
    /// event was pushed.
    pub fn commit_capture(&mut self, mut capture: PendingCapture, registry: &SceneRegistry) -> bool {
        let Some(before) = capture.before.take() else {
            return false;
        };
        let Some(after) = registry.get(capture.id).cloned() else {
            log::error!("Cannot commit edit of {}: object not found", capture.id);
            return false;
        };
        if before == after {
            return false;
        }
        self.push(EditEvent::Modify { before, after });
        true
    }

    /// Run `edit` on a live object and record it as one undoable step
    ///
    /// Returns `None` if the identity does not resolve.
    pub fn edit<R>(
        &mut self,
        registry: &mut SceneRegistry,
        id: ObjectId,
        edit: impl FnOnce(&mut SceneObject) -> R,
    ) -> Option<R> {
        let capture = self.begin_capture(registry, id)?;
        let Some(object) = registry.get_mut(id) else {
            capture.discard();
            return None;
        };
        let result = edit(object);
        self.commit_capture(capture, registry);
        Some(result)
    }

    // ========================================================================
    // Recorded registry operations
    // ========================================================================

    /// Move an object to another layer and record it
    pub fn set_layer(
        &mut self,
        registry: &mut SceneRegistry,
        id: ObjectId,
        layer: usize,
    ) -> Result<(), SceneError> {
        let capture = self.begin_capture(registry, id).ok_or(SceneError::NotFound(id))?;
        match registry.set_layer(id, layer) {
            Ok(()) => {
                self.commit_capture(capture, registry);
                Ok(())
            }
            Err(e) => {
                capture.discard();
                Err(e)
            }
        }
    }

    /// Reparent an object and record the hierarchy edge change
    pub fn reparent(
        &mut self,
        registry: &mut SceneRegistry,
        id: ObjectId,
        new_parent: Option<ObjectId>,
    ) -> Result<(), SceneError> {
        let old_parent = registry.get(id).ok_or(SceneError::NotFound(id))?.parent();
        registry.reparent(id, new_parent)?;
        if old_parent != new_parent {
            self.push(EditEvent::Reparent {
                id,
                old_parent,
                new_parent,
            });
        }
        Ok(())
    }

    /// Record that `id` was just created
    pub fn record_created(&mut self, registry: &SceneRegistry, id: ObjectId) {
        match registry.get(id) {
            Some(object) => self.push(EditEvent::Created {
                snapshot: object.clone(),
            }),
            None => log::error!("Cannot record creation of {}: object not found", id),
        }
    }

    /// Destroy an object and record it
    pub fn destroy(&mut self, registry: &mut SceneRegistry, id: ObjectId) -> bool {
        let sibling_index = registry
            .get(id)
            .and_then(SceneObject::parent)
            .and_then(|parent| registry.children_of(parent))
            .and_then(|siblings| siblings.iter().position(|sibling| *sibling == id));
        match registry.destroy(id) {
            Some(snapshot) => {
                self.push(EditEvent::Destroyed {
                    snapshot,
                    sibling_index,
                });
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // Undo / redo
    // ========================================================================

    /// Revert the most recent event; no-op when there is none
    ///
    /// Returns whether an event was applied.
    pub fn undo(&mut self, registry: &mut SceneRegistry) -> bool {
        let Some(event) = self.undo_stack.pop() else {
            return false;
        };
        match apply(registry, &event, Direction::Undo) {
            Ok(()) => {
                self.redo_stack.push(event);
                true
            }
            Err(e) => {
                log::error!("Undo of edit on {} failed and was dropped: {}", event.target(), e);
                false
            }
        }
    }

    /// Re-apply the most recently undone event; no-op when there is none
    pub fn redo(&mut self, registry: &mut SceneRegistry) -> bool {
        let Some(event) = self.redo_stack.pop() else {
            return false;
        };
        match apply(registry, &event, Direction::Redo) {
            Ok(()) => {
                self.undo_stack.push(event);
                true
            }
            Err(e) => {
                log::error!("Redo of edit on {} failed and was dropped: {}", event.target(), e);
                false
            }
        }
    }
}

fn apply(registry: &mut SceneRegistry, event: &EditEvent, direction: Direction) -> Result<(), SceneError> {
    match (event, direction) {
        (EditEvent::Modify { before, .. }, Direction::Undo) => registry.restore(before),
        (EditEvent::Modify { after, .. }, Direction::Redo) => registry.restore(after),
        (EditEvent::Reparent { id, old_parent, .. }, Direction::Undo) => {
            registry.reparent(*id, *old_parent)
        }
        (EditEvent::Reparent { id, new_parent, .. }, Direction::Redo) => {
            registry.reparent(*id, *new_parent)
        }
        (EditEvent::Created { snapshot }, Direction::Undo)
        | (EditEvent::Destroyed { snapshot, .. }, Direction::Redo) => registry
            .destroy(snapshot.id())
            .map(|_| ())
            .ok_or(SceneError::NotFound(snapshot.id())),
        (EditEvent::Created { snapshot }, Direction::Redo) => reinsert(registry, snapshot, None),
        (EditEvent::Destroyed { snapshot, sibling_index }, Direction::Undo) => {
            reinsert(registry, snapshot, *sibling_index)
        }
    }
}

/// Bring a snapshot back under its own identity and relink it
///
/// It rejoins its old parent if that parent is live, at `sibling_index` when
/// given, and re-adopts former children that are live and still parentless.
fn reinsert(
    registry: &mut SceneRegistry,
    snapshot: &SceneObject,
    sibling_index: Option<usize>,
) -> Result<(), SceneError> {
    let id = registry.insert(snapshot.clone())?;
    if let Some(parent) = snapshot.parent() {
        let joined = match sibling_index {
            Some(index) => registry.reparent_at(id, parent, index),
            None => registry.reparent(id, Some(parent)),
        };
        if let Err(e) = joined {
            log::warn!("Restored {} stays at the root: {}", id, e);
        }
    }
    for &child in snapshot.children() {
        let orphan = registry.get(child).map_or(false, |c| c.parent().is_none());
        if orphan {
            if let Err(e) = registry.reparent(child, Some(id)) {
                log::warn!("Restored {} could not re-adopt {}: {}", id, child, e);
            }
        }
    }
    Ok(())
}
