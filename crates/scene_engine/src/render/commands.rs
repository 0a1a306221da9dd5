//! Draw command stream
//!
//! Scene objects do not talk to a graphics API. Drawing turns each visible
//! object into a [`DrawCommand`] in screen space and hands it to a
//! [`DrawTarget`], which the host application implements on top of its
//! actual renderer.
//!
//! # Design Philosophy
//!
//! The target should be a passive sink that:
//! - Accepts pre-computed screen positions (no transform logic)
//! - Accepts resource handles (no object management)
//! - Only handles drawing (no lifecycle, input, or timing)

use crate::assets::TextureHandle;
use crate::foundation::math::Vec2;
use crate::scene::ObjectId;

/// View used to map world coordinates onto the screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    /// World point shown at the viewport center
    pub target: Vec2,
    /// Scale factor from world units to pixels
    pub zoom: f32,
    /// Viewport size in pixels
    pub viewport: Vec2,
    /// Whether editor-only gizmos (camera frames) are drawn
    pub show_gizmos: bool,
}

impl View {
    /// View centered on `target` with the given zoom
    pub fn new(target: Vec2, zoom: f32) -> Self {
        Self {
            target,
            zoom,
            ..Self::default()
        }
    }

    /// Set the viewport size
    pub fn with_viewport(mut self, width: f32, height: f32) -> Self {
        self.viewport = Vec2::new(width, height);
        self
    }

    /// Enable or disable editor gizmos
    pub fn with_gizmos(mut self, enabled: bool) -> Self {
        self.show_gizmos = enabled;
        self
    }

    /// Map a world position to screen pixels
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.target) * self.zoom + self.viewport * 0.5
    }

    /// Map a world-space size to screen pixels
    pub fn scale_size(&self, size: Vec2) -> Vec2 {
        size * self.zoom
    }
}

impl Default for View {
    fn default() -> Self {
        Self {
            target: Vec2::zeros(),
            zoom: 1.0,
            viewport: Vec2::new(1280.0, 720.0),
            show_gizmos: false,
        }
    }
}

/// A single screen-space draw request
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Textured quad for an entity
    Sprite {
        /// Object that produced the command
        id: ObjectId,
        /// Screen-space center
        center: Vec2,
        /// Screen-space size
        size: Vec2,
        /// Rotation in degrees
        rotation: f32,
        /// Texture to sample
        texture: TextureHandle,
    },
    /// Block of pre-wrapped text
    Text {
        /// Object that produced the command
        id: ObjectId,
        /// Screen-space position of the label object's center
        origin: Vec2,
        /// Already wrapped text, lines separated by `\n`
        text: String,
        /// Scaled font size
        font_size: f32,
        /// Scaled spacing between graphemes
        spacing: f32,
        /// RGBA fill color
        color: [u8; 4],
    },
    /// Editor outline of a camera's view
    CameraGizmo {
        /// Object that produced the command
        id: ObjectId,
        /// Screen-space center
        center: Vec2,
        /// Screen-space size
        size: Vec2,
        /// Whether the camera is the active view
        active: bool,
    },
}

impl DrawCommand {
    /// Object that produced the command
    pub fn id(&self) -> ObjectId {
        match self {
            Self::Sprite { id, .. } | Self::Text { id, .. } | Self::CameraGizmo { id, .. } => *id,
        }
    }
}

/// Sink for draw commands
pub trait DrawTarget {
    /// Submit one command; commands arrive in paint order
    fn submit(&mut self, command: DrawCommand);
}

/// Draw target that records commands for later submission or inspection
#[derive(Debug, Default, Clone)]
pub struct DrawList {
    /// Recorded commands in paint order
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Identities in paint order
    pub fn ids(&self) -> Vec<ObjectId> {
        self.commands.iter().map(DrawCommand::id).collect()
    }

    /// Number of recorded commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop all recorded commands
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl DrawTarget for DrawList {
    fn submit(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_world_to_screen_centers_target() {
        let view = View::new(Vec2::new(10.0, 5.0), 2.0).with_viewport(100.0, 50.0);
        let center = view.world_to_screen(Vec2::new(10.0, 5.0));
        assert_relative_eq!(center.x, 50.0);
        assert_relative_eq!(center.y, 25.0);

        let offset = view.world_to_screen(Vec2::new(11.0, 5.0));
        assert_relative_eq!(offset.x, 52.0);
    }
}
