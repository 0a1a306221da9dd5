//! # Rendering
//!
//! Rendering is split in two:
//! - **Layered renderer**: the paint-order index, a fixed set of buckets the
//!   scene registry keeps in step with every object's layer
//! - **Draw commands**: what objects emit when drawn, handed to a
//!   [`DrawTarget`] supplied by the host (a GPU backend, or a [`DrawList`]
//!   for headless use and tests)

mod commands;
mod layered_renderer;

pub use commands::{DrawCommand, DrawList, DrawTarget, View};
pub use layered_renderer::{LayeredRenderer, LAYER_COUNT};
