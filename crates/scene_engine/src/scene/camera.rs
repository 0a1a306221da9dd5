//! Camera variant

use crate::foundation::math::Vec2;
use crate::render::View;
use crate::scene::ObjectId;

/// Camera-specific state
///
/// At most one camera in a scene is active; the flag is only changed by the
/// scene registry so that rule cannot be broken from outside.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraData {
    /// World point the camera looks at
    pub target: Vec2,
    /// Zoom factor
    pub zoom: f32,
    /// Object whose position the target tracks during play
    pub follow: Option<ObjectId>,
    active: bool,
}

impl CameraData {
    /// Inactive camera looking at the origin
    pub fn new() -> Self {
        Self {
            target: Vec2::zeros(),
            zoom: 1.0,
            follow: None,
            active: false,
        }
    }

    /// Whether this camera is the active view
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// View this camera produces for a viewport
    pub fn view(&self, viewport: Vec2) -> View {
        View {
            target: self.target,
            zoom: if self.zoom > 0.0 { self.zoom } else { 1.0 },
            viewport,
            show_gizmos: false,
        }
    }

    /// Copy authored fields from `other`, keeping the active flag
    pub(crate) fn restore_from(&mut self, other: &Self) {
        let active = self.active;
        *self = other.clone();
        self.active = active;
    }
}

impl Default for CameraData {
    fn default() -> Self {
        Self::new()
    }
}
