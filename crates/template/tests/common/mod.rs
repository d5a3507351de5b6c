//! Test doubles: fixed-width fonts and a surface that records draw calls

#![allow(dead_code)]

use card_core::{
    encode_image, CardError, Color, FontMetrics, FontProvider, FontSpec, ImageEncoding, Rect,
    Surface,
};
use image::RgbaImage;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use template::Row;

/// Every character is half an em wide; ascent is 0.8 em
#[derive(Debug, Clone, PartialEq)]
pub struct MonoFont {
    pub size: f32,
}

impl FontMetrics for MonoFont {
    fn measure(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.size * 0.5
    }

    fn ascent(&self) -> f32 {
        self.size * 0.8
    }
}

/// Font families known to the fake surface
#[derive(Debug, Clone)]
pub struct MonoFonts {
    families: HashSet<String>,
}

impl MonoFonts {
    pub fn new(families: &[&str]) -> Self {
        Self {
            families: families.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl Default for MonoFonts {
    fn default() -> Self {
        Self::new(&["Microsoft YaHei"])
    }
}

impl FontProvider for MonoFonts {
    type Font = MonoFont;

    fn font(&self, spec: &FontSpec) -> card_core::Result<MonoFont> {
        if self.families.contains(&spec.family) {
            Ok(MonoFont { size: spec.size })
        } else {
            Err(CardError::FontNotFound(spec.family.clone()))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Resize(u32, u32),
    Clear,
    FillRect(Rect, Color),
    Text {
        text: String,
        x: f32,
        baseline: f32,
        color: Color,
    },
    Image {
        rect: Rect,
        size: (u32, u32),
    },
    DashedRect {
        rect: Rect,
        color: Color,
        line_width: f32,
        dash: [f32; 2],
    },
}

/// Records every call instead of drawing
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    pub width: u32,
    pub height: u32,
    pub ops: Vec<Op>,
    pub fonts: MonoFonts,
    /// Surfaces created through `create_offscreen`, shared between copies
    pub allocations: Arc<AtomicUsize>,
}

impl RecordingSurface {
    pub fn new(fonts: MonoFonts) -> Self {
        Self {
            width: 1,
            height: 1,
            ops: Vec::new(),
            fonts,
            allocations: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn texts(&self) -> Vec<(String, f32, f32)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text {
                    text, x, baseline, ..
                } => Some((text.clone(), *x, *baseline)),
                _ => None,
            })
            .collect()
    }

    pub fn images(&self) -> Vec<Rect> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Image { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect()
    }

    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::SeqCst)
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new(MonoFonts::default())
    }
}

impl FontProvider for RecordingSurface {
    type Font = MonoFont;

    fn font(&self, spec: &FontSpec) -> card_core::Result<MonoFont> {
        self.fonts.font(spec)
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn resize(&mut self, width: u32, height: u32) -> card_core::Result<()> {
        if width == 0 || height == 0 {
            return Err(CardError::SurfaceUnavailable(format!("{width}x{height}")));
        }
        self.width = width;
        self.height = height;
        self.ops.clear();
        self.ops.push(Op::Resize(width, height));
        Ok(())
    }

    fn clear(&mut self) {
        self.ops.clear();
        self.ops.push(Op::Clear);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ops.push(Op::FillRect(rect, color));
    }

    fn fill_text(&mut self, _font: &MonoFont, text: &str, x: f32, baseline: f32, color: Color) {
        self.ops.push(Op::Text {
            text: text.to_string(),
            x,
            baseline,
            color,
        });
    }

    fn draw_image(&mut self, image: &RgbaImage, rect: Rect) {
        self.ops.push(Op::Image {
            rect,
            size: image.dimensions(),
        });
    }

    fn stroke_dashed_rect(&mut self, rect: Rect, color: Color, line_width: f32, dash: [f32; 2]) {
        self.ops.push(Op::DashedRect {
            rect,
            color,
            line_width,
            dash,
        });
    }

    fn create_offscreen(&self, width: u32, height: u32) -> card_core::Result<Self> {
        if width == 0 || height == 0 {
            return Err(CardError::SurfaceUnavailable(format!("{width}x{height}")));
        }
        self.allocations.fetch_add(1, Ordering::SeqCst);
        Ok(Self {
            width,
            height,
            ops: Vec::new(),
            fonts: self.fonts.clone(),
            allocations: Arc::clone(&self.allocations),
        })
    }

    fn copy_from(&mut self, source: &Self) -> card_core::Result<()> {
        self.width = source.width;
        self.height = source.height;
        self.ops = source.ops.clone();
        Ok(())
    }

    fn encode(&self, encoding: ImageEncoding) -> card_core::Result<Vec<u8>> {
        encode_image(&RgbaImage::new(self.width, self.height), encoding)
    }
}

/// Build a row from a JSON object literal
pub fn row(value: serde_json::Value) -> Row {
    match value {
        serde_json::Value::Object(map) => map,
        _ => panic!("row must be an object"),
    }
}

/// PNG bytes of a solid image
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
    encode_image(&image, ImageEncoding::Png).unwrap()
}
