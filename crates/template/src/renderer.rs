//! Field rendering

use crate::canvas::HighlightStyle;
use crate::images::{ImageCache, ImageLoader, ImageLookup};
use crate::schema::{Field, ImageField, Row, TextField};
use crate::substitute::{resolve_with, MissingKey};
use card_core::{clamp_to_box, FontMetrics, Rect, Surface};
use card_text::{layout_block, BlockLayout};
use std::fmt;

/// Knobs that change how a frame is produced
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderOptions {
    /// Applied to text, image paths, bounds and output filenames alike
    pub missing_key: MissingKey,
    pub highlight: HighlightStyle,
}

impl RenderOptions {
    /// Missing columns become empty strings instead of hiding the field
    pub fn lenient() -> Self {
        Self {
            missing_key: MissingKey::Empty,
            ..Self::default()
        }
    }

    /// Resolve a field template; `None` when it should not be drawn
    pub fn resolve(&self, template: &str, row: &Row, index: usize) -> Option<String> {
        resolve_with(template, row, index, self.missing_key).filter(|s| !s.is_empty())
    }
}

/// A problem that cost one field (or the background image) its output
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    ImageUnavailable {
        field: usize,
        source: String,
        reason: String,
    },
    BackgroundUnavailable {
        source: String,
        reason: String,
    },
    FontUnavailable {
        field: usize,
        family: String,
        reason: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::ImageUnavailable {
                field,
                source,
                reason,
            } => write!(f, "field {field}: image {source:?} skipped: {reason}"),
            Warning::BackgroundUnavailable { source, reason } => write!(
                f,
                "background image {source:?} unavailable, using background color: {reason}"
            ),
            Warning::FontUnavailable {
                field,
                family,
                reason,
            } => write!(f, "field {field}: font {family:?} unavailable: {reason}"),
        }
    }
}

/// What happened to one field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOutcome {
    /// Drawn; carries the box that was filled
    Drawn(Rect),
    /// Nothing to draw (unresolved or empty template)
    Suppressed,
    /// Could not be drawn
    Skipped(Warning),
}

/// Shared, read-only inputs of rendering and bounds calculation
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub images: &'a ImageCache,
    pub lookup: &'a ImageLookup,
    pub options: &'a RenderOptions,
}

/// Geometry of a resolved text field
///
/// The renderer draws exactly this layout and the bounds calculator reports
/// its box, so the two cannot drift apart.
pub fn layout_text<F: FontMetrics + ?Sized>(field: &TextField, text: &str, font: &F) -> BlockLayout {
    let origin = (field.position.x, field.position.y);
    layout_block(text, origin, &field.text_style(), font.ascent(), |s| {
        font.measure(s)
    })
}

/// Draws single fields onto a surface
pub struct FieldRenderer<'a, L: ?Sized> {
    context: RenderContext<'a>,
    loader: &'a L,
}

impl<'a, L: ImageLoader + ?Sized> FieldRenderer<'a, L> {
    pub fn new(context: RenderContext<'a>, loader: &'a L) -> Self {
        Self { context, loader }
    }

    /// Draw field number `field_index` for row `index`
    pub async fn draw_field<S: Surface>(
        &self,
        surface: &mut S,
        field_index: usize,
        field: &Field,
        row: &Row,
        index: usize,
    ) -> FieldOutcome {
        match field {
            Field::Text(text) => self.draw_text(surface, field_index, text, row, index),
            Field::Image(image) => {
                self.draw_image(surface, field_index, image, row, index)
                    .await
            }
        }
    }

    /// Draw a text field
    pub fn draw_text<S: Surface>(
        &self,
        surface: &mut S,
        field_index: usize,
        field: &TextField,
        row: &Row,
        index: usize,
    ) -> FieldOutcome {
        let Some(text) = self.context.options.resolve(&field.text, row, index) else {
            log::debug!("field {field_index}: {:?} not resolved, skipped", field.text);
            return FieldOutcome::Suppressed;
        };

        let font = match surface.font(&field.font_spec()) {
            Ok(font) => font,
            Err(e) => {
                let warning = Warning::FontUnavailable {
                    field: field_index,
                    family: field.font_family.clone(),
                    reason: e.to_string(),
                };
                log::warn!("{warning}");
                return FieldOutcome::Skipped(warning);
            }
        };

        let layout = layout_text(field, &text, &font);
        let color = field.fill_color();
        let letter_spacing = field.text_style().letter_spacing;

        for line in &layout.lines {
            if letter_spacing == 0.0 {
                surface.fill_text(&font, &line.text, line.x, line.baseline, color);
                continue;
            }

            // Spaced text is drawn one character at a time
            let mut caret = line.x;
            let mut buf = [0u8; 4];
            for ch in line.text.chars() {
                let glyph = ch.encode_utf8(&mut buf);
                surface.fill_text(&font, glyph, caret, line.baseline, color);
                caret += font.measure(glyph) + letter_spacing;
            }
        }

        FieldOutcome::Drawn(Rect::new(layout.x, layout.y, layout.width, layout.height))
    }

    /// Draw an image field, scaled down to its maximum size
    pub async fn draw_image<S: Surface>(
        &self,
        surface: &mut S,
        field_index: usize,
        field: &ImageField,
        row: &Row,
        index: usize,
    ) -> FieldOutcome {
        let Some(path) = self.context.options.resolve(&field.path, row, index) else {
            log::debug!("field {field_index}: {:?} not resolved, skipped", field.path);
            return FieldOutcome::Suppressed;
        };
        let source = self.context.lookup.resolve(&path);

        let image = match self.context.images.load(self.loader, source).await {
            Ok(image) => image,
            Err(e) => {
                let warning = Warning::ImageUnavailable {
                    field: field_index,
                    source: source.to_string(),
                    reason: e.to_string(),
                };
                log::warn!("{warning}");
                return FieldOutcome::Skipped(warning);
            }
        };

        let (width, height) = clamp_to_box(
            image.width() as f32,
            image.height() as f32,
            field.max_width,
            field.max_height,
        );
        let rect = Rect::new(field.position.x, field.position.y, width, height);
        surface.draw_image(&image, rect);

        FieldOutcome::Drawn(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use card_text::Anchor;

    struct Mono;

    impl FontMetrics for Mono {
        fn measure(&self, text: &str) -> f32 {
            text.chars().count() as f32 * 10.0
        }

        fn ascent(&self) -> f32 {
            16.0
        }
    }

    #[test]
    fn test_layout_text_uses_field_style() {
        let field = TextField::new("", 100.0, 100.0)
            .with_font("Any", 20.0)
            .with_anchor(Anchor::MM)
            .with_line_spacing(0.0);

        let layout = layout_text(&field, "abcd\nab", &Mono);

        assert_eq!(layout.width, 40.0);
        assert_eq!(layout.height, 40.0);
        assert_eq!((layout.x, layout.y), (80.0, 80.0));
        assert_eq!(layout.lines[1].x, 90.0);
        assert_eq!(layout.lines[1].baseline, 80.0 + 16.0 + 20.0);
    }

    #[test]
    fn test_layout_text_baseline_anchor() {
        let field = TextField::new("", 10.0, 50.0).with_font("Any", 20.0);
        let layout = layout_text(&field, "hi", &Mono);

        // Default anchor puts the first baseline on the position
        assert_eq!(layout.lines[0].baseline, 50.0);
        assert_eq!(layout.y, 34.0);
    }

    #[test]
    fn test_options_resolve_treats_empty_as_unresolved() {
        let mut row = Row::new();
        row.insert("name".to_string(), serde_json::json!(""));

        let options = RenderOptions::default();
        assert_eq!(options.resolve("{name}", &row, 1), None);
        assert_eq!(options.resolve("{title}", &row, 1), None);

        let lenient = RenderOptions::lenient();
        assert_eq!(lenient.resolve("{title}!", &row, 1), Some("!".to_string()));
    }

    #[test]
    fn test_warning_display() {
        let warning = Warning::ImageUnavailable {
            field: 2,
            source: "a.png".to_string(),
            reason: "gone".to_string(),
        };
        assert_eq!(warning.to_string(), "field 2: image \"a.png\" skipped: gone");
    }
}
