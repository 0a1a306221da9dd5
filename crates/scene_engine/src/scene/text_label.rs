//! Text label variant
//!
//! The label keeps both the authored content and its wrapped form. Every
//! setter that changes how text is measured (content, font, size, spacing,
//! width limit) re-wraps immediately, so the wrapped text is always in sync.

use crate::assets::{font_or_default, AssetProvider, FontMetrics};
use crate::scene::text_layout::{columns_for_width, wrap_to_string};

/// Default font size for new labels
pub const DEFAULT_FONT_SIZE: f32 = 20.0;

/// Default spacing between graphemes
pub const DEFAULT_CHAR_SPACING: f32 = 1.0;

/// Text-label-specific state
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    content: String,
    font_path: String,
    metrics: FontMetrics,
    font_size: f32,
    char_spacing: f32,
    max_width: f32,
    /// RGBA fill color
    pub color: [u8; 4],
    wrapped: String,
}

impl TextLabel {
    /// Label showing `content` with the default font and no width limit
    pub fn new(content: impl Into<String>) -> Self {
        let mut label = Self {
            content: content.into(),
            font_path: String::new(),
            metrics: FontMetrics::default(),
            font_size: DEFAULT_FONT_SIZE,
            char_spacing: DEFAULT_CHAR_SPACING,
            max_width: 0.0,
            color: [255, 255, 255, 255],
            wrapped: String::new(),
        };
        label.rewrap();
        label
    }

    /// Authored content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Content after word wrapping
    pub fn wrapped(&self) -> &str {
        &self.wrapped
    }

    /// Wrapped lines
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.wrapped.split('\n')
    }

    /// Font asset path (empty for the default font)
    pub fn font_path(&self) -> &str {
        &self.font_path
    }

    /// Glyph metrics in use
    pub fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    /// Font size
    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Spacing between graphemes
    pub fn char_spacing(&self) -> f32 {
        self.char_spacing
    }

    /// Maximum line width; zero or less disables wrapping
    pub fn max_width(&self) -> f32 {
        self.max_width
    }

    /// Replace the content
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.rewrap();
    }

    /// Load a font through the asset provider, falling back to default metrics
    pub fn set_font(&mut self, path: impl Into<String>, assets: &mut dyn AssetProvider) {
        self.font_path = path.into();
        self.metrics = font_or_default(assets, &self.font_path);
        self.rewrap();
    }

    /// Set font path and metrics directly
    pub fn set_font_metrics(&mut self, path: impl Into<String>, metrics: FontMetrics) {
        self.font_path = path.into();
        self.metrics = metrics;
        self.rewrap();
    }

    /// Set the font size
    pub fn set_font_size(&mut self, font_size: f32) {
        self.font_size = font_size.max(0.0);
        self.rewrap();
    }

    /// Set the spacing between graphemes
    pub fn set_char_spacing(&mut self, spacing: f32) {
        self.char_spacing = spacing;
        self.rewrap();
    }

    /// Set the maximum line width
    pub fn set_max_width(&mut self, max_width: f32) {
        self.max_width = max_width;
        self.rewrap();
    }

    fn rewrap(&mut self) {
        let columns = columns_for_width(
            self.max_width,
            self.metrics.advance(self.font_size),
            self.char_spacing,
        );
        self.wrapped = wrap_to_string(&self.content, columns);
    }
}

impl Default for TextLabel {
    fn default() -> Self {
        Self::new("Text")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_change_rewraps() {
        // advance 10 (20 * 0.5) + spacing 1 → 5 columns need 54 units
        let mut label = TextLabel::new("hello world");
        assert_eq!(label.wrapped(), "hello world");

        label.set_max_width(54.0);
        assert_eq!(label.wrapped(), "hello\nworld");
        assert_eq!(label.content(), "hello world");

        label.set_max_width(0.0);
        assert_eq!(label.wrapped(), "hello world");
    }

    #[test]
    fn test_content_and_font_changes_rewrap() {
        let mut label = TextLabel::new("a b");
        label.set_max_width(54.0);
        label.set_content("aaaaaaa");
        assert_eq!(label.wrapped(), "aaaaa\naa");

        // Narrower glyphs fit the whole word on one line
        label.set_font_metrics("thin.ttf", FontMetrics { advance_ratio: 0.25 });
        assert_eq!(label.wrapped(), "aaaaaaa");
        assert_eq!(label.lines().count(), 1);
    }
}
