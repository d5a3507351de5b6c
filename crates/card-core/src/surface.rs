//! Drawing surface abstraction

use crate::codec::ImageEncoding;
use crate::font::{FontLibrary, FontMetrics, FontSpec, ScaledFont};
use crate::{Color, Result};
use image::RgbaImage;

/// Axis-aligned rectangle in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Inclusive point test (edges count as inside)
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Grow the rectangle by `padding` on every side
    pub fn inflate(&self, padding: f32) -> Self {
        Self::new(
            self.x - padding,
            self.y - padding,
            self.width + padding * 2.0,
            self.height + padding * 2.0,
        )
    }
}

/// Source of fonts for measuring and drawing
pub trait FontProvider {
    type Font: FontMetrics;

    fn font(&self, spec: &FontSpec) -> Result<Self::Font>;
}

impl FontProvider for FontLibrary {
    type Font = ScaledFont;

    fn font(&self, spec: &FontSpec) -> Result<ScaledFont> {
        self.resolve(spec)
    }
}

/// A canvas the template engine can draw a card onto
///
/// Modelled on the handful of 2D-canvas calls card rendering needs. Every
/// call is confined to this surface; there is no shared drawing state.
pub trait Surface: FontProvider + Sized {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Set the pixel size, discarding the current content
    fn resize(&mut self, width: u32, height: u32) -> Result<()>;

    /// Reset every pixel to transparent
    fn clear(&mut self);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draw one line of text with its left edge at `x` and baseline at `baseline`
    fn fill_text(&mut self, font: &Self::Font, text: &str, x: f32, baseline: f32, color: Color);

    /// Draw `image` stretched into `rect`
    fn draw_image(&mut self, image: &RgbaImage, rect: Rect);

    /// Stroke a rectangle outline with a `[on, off]` dash pattern
    fn stroke_dashed_rect(&mut self, rect: Rect, color: Color, line_width: f32, dash: [f32; 2]);

    /// Create a blank surface of the same kind, sharing fonts
    fn create_offscreen(&self, width: u32, height: u32) -> Result<Self>;

    /// Replace this surface's size and content with a copy of `source`
    fn copy_from(&mut self, source: &Self) -> Result<()>;

    /// Encode the current content as a PNG or JPEG file
    fn encode(&self, encoding: ImageEncoding) -> Result<Vec<u8>>;
}
