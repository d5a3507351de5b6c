//! Field bounding boxes and hit-testing

use crate::renderer::{layout_text, RenderContext};
use crate::schema::{Field, Row, DEFAULT_IMAGE_SIZE};
use card_core::{clamp_to_box, FontProvider, Rect};
use serde::{Deserialize, Serialize};

/// Box of one drawn field, in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldBounds {
    /// Position of the field in the config's field list
    pub field_index: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl FieldBounds {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Inclusive point test
    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.rect().contains(x, y)
    }
}

/// Bounds of one field, or `None` when the field would not be drawn
///
/// Text boxes come from the same layout the renderer draws. An image that is
/// already decoded gets the box the renderer scales it into; otherwise the box
/// is `max_width × max_height`, with 100 for a missing maximum. No image is
/// ever loaded.
pub fn field_bounds<P: FontProvider + ?Sized>(
    fonts: &P,
    context: RenderContext<'_>,
    field_index: usize,
    field: &Field,
    row: &Row,
    index: usize,
) -> Option<FieldBounds> {
    match field {
        Field::Text(text_field) => {
            let text = context.options.resolve(&text_field.text, row, index)?;
            let font = fonts.font(&text_field.font_spec()).ok()?;
            let layout = layout_text(text_field, &text, &font);
            Some(FieldBounds {
                field_index,
                x: layout.x,
                y: layout.y,
                width: layout.width,
                height: layout.height,
            })
        }
        Field::Image(image_field) => {
            let path = context.options.resolve(&image_field.path, row, index)?;
            let declared = |max: Option<f32>| max.filter(|m| *m > 0.0);
            let (width, height) = match context.images.dimensions(context.lookup.resolve(&path)) {
                Some((w, h)) => clamp_to_box(
                    w as f32,
                    h as f32,
                    image_field.max_width,
                    image_field.max_height,
                ),
                None => (
                    declared(image_field.max_width).unwrap_or(DEFAULT_IMAGE_SIZE),
                    declared(image_field.max_height).unwrap_or(DEFAULT_IMAGE_SIZE),
                ),
            };

            Some(FieldBounds {
                field_index,
                x: image_field.position.x,
                y: image_field.position.y,
                width,
                height,
            })
        }
    }
}

/// Bounds of every field that would be drawn, in field order
pub fn compute_bounds<P: FontProvider + ?Sized>(
    fonts: &P,
    context: RenderContext<'_>,
    fields: &[Field],
    row: &Row,
    index: usize,
) -> Vec<FieldBounds> {
    fields
        .iter()
        .enumerate()
        .filter_map(|(field_index, field)| {
            field_bounds(fonts, context, field_index, field, row, index)
        })
        .collect()
}

/// Topmost field containing the point
///
/// Fields drawn later sit on top, so the scan runs from the end. Edges
/// count as inside.
pub fn find_field_at(bounds: &[FieldBounds], x: f32, y: f32) -> Option<usize> {
    bounds
        .iter()
        .rev()
        .find(|b| b.contains(x, y))
        .map(|b| b.field_index)
}
