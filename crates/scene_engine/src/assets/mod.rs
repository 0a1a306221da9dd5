//! Asset collaborator
//!
//! Texture and font loading are owned by the host application. The scene
//! core only needs a handle for textures and glyph metrics for fonts, so it
//! talks to an [`AssetProvider`]. Failed loads never abort an edit: the
//! object keeps a placeholder texture or default metrics and a warning is
//! logged.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::config::AssetConfig;

/// Asset loading errors
#[derive(Debug, Error)]
pub enum AssetError {
    /// No asset exists at the requested path
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// The asset exists but could not be decoded
    #[error("Asset could not be loaded: {path}: {reason}")]
    LoadFailed {
        /// Requested path
        path: String,
        /// Backend-specific failure description
        reason: String,
    },
}

/// Handle to a loaded texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureHandle(u32);

impl TextureHandle {
    /// Handle used when a texture failed to load or none is assigned
    pub const PLACEHOLDER: Self = Self(0);

    /// Wrap a provider-specific id
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Whether this is the placeholder texture
    pub fn is_placeholder(&self) -> bool {
        *self == Self::PLACEHOLDER
    }
}

/// Fixed-advance glyph metrics for a font
///
/// Every grapheme advances `font_size * advance_ratio`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontMetrics {
    /// Glyph advance relative to the font size
    pub advance_ratio: f32,
}

impl FontMetrics {
    /// Advance of one grapheme at `font_size`
    pub fn advance(&self, font_size: f32) -> f32 {
        font_size * self.advance_ratio
    }
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self { advance_ratio: 0.5 }
    }
}

/// Loads textures and fonts for scene objects
pub trait AssetProvider {
    /// Load (or fetch a cached) texture
    fn load_texture(&mut self, path: &str) -> Result<TextureHandle, AssetError>;

    /// Load (or fetch cached) metrics for a font
    fn load_font(&mut self, path: &str) -> Result<FontMetrics, AssetError>;
}

/// Load a texture, falling back to the placeholder on failure
pub fn texture_or_placeholder(assets: &mut dyn AssetProvider, path: &str) -> TextureHandle {
    if path.is_empty() {
        return TextureHandle::PLACEHOLDER;
    }
    assets.load_texture(path).unwrap_or_else(|e| {
        log::warn!("Using placeholder texture: {}", e);
        TextureHandle::PLACEHOLDER
    })
}

/// Load font metrics, falling back to defaults on failure
pub fn font_or_default(assets: &mut dyn AssetProvider, path: &str) -> FontMetrics {
    if path.is_empty() {
        return FontMetrics::default();
    }
    assets.load_font(path).unwrap_or_else(|e| {
        log::warn!("Using default font metrics: {}", e);
        FontMetrics::default()
    })
}

/// Provider with no backing storage; every load reports `NotFound`
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAssets;

impl AssetProvider for NullAssets {
    fn load_texture(&mut self, path: &str) -> Result<TextureHandle, AssetError> {
        Err(AssetError::NotFound(path.to_string()))
    }

    fn load_font(&mut self, path: &str) -> Result<FontMetrics, AssetError> {
        Err(AssetError::NotFound(path.to_string()))
    }
}

/// Provider resolving asset paths against a root directory
///
/// Texture handles are issued once per path and cached. Font files are only
/// checked for existence; their metrics come from [`FontMetrics::default`].
#[derive(Debug)]
pub struct DirectoryAssets {
    root: PathBuf,
    textures: HashMap<String, TextureHandle>,
    next_texture: u32,
}

impl DirectoryAssets {
    /// Create a provider rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            textures: HashMap::new(),
            next_texture: 1,
        }
    }

    /// Create a provider from the asset configuration
    pub fn from_config(config: &AssetConfig) -> Self {
        Self::new(&config.assets_dir)
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, AssetError> {
        let full = self.root.join(path);
        if full.is_file() {
            Ok(full)
        } else {
            Err(AssetError::NotFound(full.display().to_string()))
        }
    }
}

impl AssetProvider for DirectoryAssets {
    fn load_texture(&mut self, path: &str) -> Result<TextureHandle, AssetError> {
        if let Some(handle) = self.textures.get(path) {
            return Ok(*handle);
        }
        self.resolve(path)?;
        let handle = TextureHandle::new(self.next_texture);
        self.next_texture += 1;
        self.textures.insert(path.to_string(), handle);
        log::debug!("Loaded texture {} as {:?}", path, handle);
        Ok(handle)
    }

    fn load_font(&mut self, path: &str) -> Result<FontMetrics, AssetError> {
        self.resolve(path)?;
        Ok(FontMetrics::default())
    }
}
