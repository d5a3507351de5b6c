//! RGBA raster surface

use crate::codec::{encode_image, ImageEncoding};
use crate::font::{FontLibrary, FontSpec, ScaledFont};
use crate::surface::{FontProvider, Rect, Surface};
use crate::{CardError, Color, Result};
use ab_glyph::{point, Font, ScaleFont};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::sync::Arc;

/// Largest width or height a surface may have
pub const MAX_DIMENSION: u32 = 16_384;

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(CardError::SurfaceUnavailable(format!(
            "cannot allocate a {width}x{height} surface"
        )));
    }
    Ok(())
}

/// In-memory RGBA canvas backed by `image::RgbaImage`
#[derive(Debug, Clone)]
pub struct RasterSurface {
    image: RgbaImage,
    fonts: Arc<FontLibrary>,
}

impl RasterSurface {
    /// Create a transparent surface
    pub fn new(width: u32, height: u32, fonts: Arc<FontLibrary>) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            image: RgbaImage::new(width, height),
            fonts,
        })
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn fonts(&self) -> &Arc<FontLibrary> {
        &self.fonts
    }

    /// Pixel color, or `None` outside the surface
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.image
            .get_pixel_checked(x, y)
            .map(|p| Color::rgba(p[0], p[1], p[2], p[3]))
    }

    /// Source-over blend of `color` at `coverage` into one pixel
    fn blend_pixel(&mut self, x: i32, y: i32, color: Color, coverage: f32) {
        if x < 0 || y < 0 || x as u32 >= self.image.width() || y as u32 >= self.image.height() {
            return;
        }
        let src_a = color.a as f32 / 255.0 * coverage.clamp(0.0, 1.0);
        if src_a <= 0.0 {
            return;
        }

        let dst = self.image.get_pixel_mut(x as u32, y as u32);
        let dst_a = dst[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);

        let src = [color.r, color.g, color.b];
        for (channel, value) in src.iter().enumerate() {
            let blended = (*value as f32 * src_a + dst[channel] as f32 * dst_a * (1.0 - src_a))
                / out_a;
            dst[channel] = blended.round().clamp(0.0, 255.0) as u8;
        }
        dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    /// Fill the pixel square of side `size` centred on (`cx`, `cy`)
    fn stamp(&mut self, cx: f32, cy: f32, size: f32, color: Color) {
        let half = size / 2.0;
        let x0 = (cx - half).round() as i32;
        let y0 = (cy - half).round() as i32;
        let x1 = (cx + half).round() as i32;
        let y1 = (cy + half).round() as i32;
        for y in y0..y1.max(y0 + 1) {
            for x in x0..x1.max(x0 + 1) {
                self.blend_pixel(x, y, color, 1.0);
            }
        }
    }
}

/// Range of `t` in `0..=length` for which `origin + direction * t` lies
/// within `reach` of `0..=extent`
fn visible_span(
    origin: f64,
    direction: f64,
    extent: f64,
    reach: f64,
    length: f64,
) -> Option<(f64, f64)> {
    let (low, high) = (-reach, extent + reach);
    if direction == 0.0 {
        return (low..=high).contains(&origin).then_some((0.0, length));
    }
    let a = (low - origin) / direction;
    let b = (high - origin) / direction;
    let (t0, t1) = (a.min(b).max(0.0), a.max(b).min(length));
    (t0 <= t1).then_some((t0, t1))
}

impl FontProvider for RasterSurface {
    type Font = ScaledFont;

    fn font(&self, spec: &FontSpec) -> Result<ScaledFont> {
        self.fonts.resolve(spec)
    }
}

impl Surface for RasterSurface {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        check_dimensions(width, height)?;
        self.image = RgbaImage::new(width, height);
        Ok(())
    }

    fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = Color::transparent().to_rgba();
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let x0 = rect.x.round() as i32;
        let y0 = rect.y.round() as i32;
        let x1 = rect.right().round() as i32;
        let y1 = rect.bottom().round() as i32;
        for y in y0.max(0)..y1.min(self.image.height() as i32) {
            for x in x0.max(0)..x1.min(self.image.width() as i32) {
                self.blend_pixel(x, y, color, 1.0);
            }
        }
    }

    fn fill_text(&mut self, font: &ScaledFont, text: &str, x: f32, baseline: f32, color: Color) {
        let scale = font.px_scale();
        let arc = font.font();
        let scaled = arc.as_scaled(scale);

        let mut caret = x;
        let mut previous = None;
        for ch in text.chars() {
            if ch.is_control() {
                continue;
            }
            let glyph_id = scaled.glyph_id(ch);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, glyph_id);
            }

            let glyph = glyph_id.with_scale_and_position(scale, point(caret, baseline));
            if let Some(outlined) = arc.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|px, py, coverage| {
                    self.blend_pixel(
                        bounds.min.x as i32 + px as i32,
                        bounds.min.y as i32 + py as i32,
                        color,
                        coverage,
                    );
                });
            }

            caret += scaled.h_advance(glyph_id);
            previous = Some(glyph_id);
        }
    }

    fn draw_image(&mut self, image: &RgbaImage, rect: Rect) {
        let width = rect.width.round() as u32;
        let height = rect.height.round() as u32;
        if width == 0 || height == 0 || image.width() == 0 || image.height() == 0 {
            return;
        }

        let resized;
        let source = if image.dimensions() == (width, height) {
            image
        } else {
            resized = imageops::resize(image, width, height, FilterType::Triangle);
            &resized
        };

        let left = rect.x.round() as i32;
        let top = rect.y.round() as i32;
        for (sx, sy, pixel) in source.enumerate_pixels() {
            let color = Color::rgba(pixel[0], pixel[1], pixel[2], pixel[3]);
            self.blend_pixel(left + sx as i32, top + sy as i32, color, 1.0);
        }
    }

    fn stroke_dashed_rect(&mut self, rect: Rect, color: Color, line_width: f32, dash: [f32; 2]) {
        let on = f64::from(dash[0]);
        let period = on + f64::from(dash[1]);
        let corners = [
            (rect.x, rect.y),
            (rect.right(), rect.y),
            (rect.right(), rect.bottom()),
            (rect.x, rect.bottom()),
            (rect.x, rect.y),
        ];
        let width = f64::from(self.image.width());
        let height = f64::from(self.image.height());
        let reach = f64::from(line_width.max(1.0));

        // The dash pattern runs continuously around the outline
        let mut travelled = 0.0f64;
        for pair in corners.windows(2) {
            let (ax, ay) = (f64::from(pair[0].0), f64::from(pair[0].1));
            let (bx, by) = (f64::from(pair[1].0), f64::from(pair[1].1));
            let length = (bx - ax).hypot(by - ay);
            if !length.is_finite() || length <= 0.0 {
                continue;
            }
            let (dx, dy) = ((bx - ax) / length, (by - ay) / length);

            // Only the part of the side that can touch a pixel is walked
            let span = visible_span(ax, dx, width, reach, length).and_then(|(x0, x1)| {
                let (y0, y1) = visible_span(ay, dy, height, reach, length)?;
                Some((x0.max(y0), x1.min(y1)))
            });
            if let Some((t0, t1)) = span.filter(|(t0, t1)| t0 <= t1) {
                let steps = length.ceil() as u64;
                let first = t0.ceil() as u64;
                let last = (t1.floor() as u64).min(steps - 1);
                for step in first..=last {
                    let t = step as f64;
                    let dashed_on = period <= 0.0 || (travelled + t) % period < on;
                    if dashed_on {
                        self.stamp((ax + dx * t) as f32, (ay + dy * t) as f32, line_width, color);
                    }
                }
            }
            travelled += length;
        }
    }

    fn create_offscreen(&self, width: u32, height: u32) -> Result<Self> {
        RasterSurface::new(width, height, Arc::clone(&self.fonts))
    }

    fn copy_from(&mut self, source: &Self) -> Result<()> {
        self.image.clone_from(&source.image);
        Ok(())
    }

    fn encode(&self, encoding: ImageEncoding) -> Result<Vec<u8>> {
        encode_image(&self.image, encoding)
    }
}
