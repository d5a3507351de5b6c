//! Canvas orchestration: one frame per call
//!
//! A frame is produced in fixed stages:
//! 1. size the surface to the canvas (previous content is discarded)
//! 2. background image, or the background color if there is none or it fails
//! 3. every field in declaration order, awaiting image loads one at a time
//! 4. optionally, a dashed highlight around the selected field

use crate::bounds::{compute_bounds, FieldBounds};
use crate::images::{ImageCache, ImageLoader, ImageLookup};
use crate::renderer::{FieldOutcome, FieldRenderer, RenderContext, RenderOptions, Warning};
use crate::schema::{CanvasConfig, CardConfig, Row};
use crate::{Result, TemplateError};
use card_core::{CardError, Color, FontProvider, Rect, Surface};
use std::sync::Arc;

/// Selection outline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightStyle {
    pub color: Color,
    pub line_width: f32,
    /// `[on, off]` dash lengths
    pub dash: [f32; 2],
    /// Space between the field box and the outline
    pub padding: f32,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            color: Color::rgb(0x3b, 0x82, 0xf6),
            line_width: 2.0,
            dash: [5.0, 3.0],
            padding: 5.0,
        }
    }
}

/// Result of one render call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderReport {
    /// Recovered problems, in the order they happened
    pub warnings: Vec<Warning>,
    /// Number of fields that put something on the surface
    pub fields_drawn: usize,
    /// Outline drawn around the selected field
    pub highlight: Option<Rect>,
}

fn surface_unavailable(err: CardError) -> TemplateError {
    match err {
        CardError::SurfaceUnavailable(reason) => TemplateError::SurfaceUnavailable(reason),
        other => TemplateError::SurfaceUnavailable(other.to_string()),
    }
}

/// Renders cards onto a surface
///
/// Owns the image loader, the upload lookup and a handle to the decode
/// cache. The cache can be shared with other renderers through
/// [`CardRenderer::with_cache`].
pub struct CardRenderer<L> {
    loader: L,
    images: Arc<ImageCache>,
    lookup: ImageLookup,
    options: RenderOptions,
}

impl<L: ImageLoader> CardRenderer<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            images: Arc::new(ImageCache::new()),
            lookup: ImageLookup::new(),
            options: RenderOptions::default(),
        }
    }

    /// Use a shared decode cache
    pub fn with_cache(mut self, images: Arc<ImageCache>) -> Self {
        self.images = images;
        self
    }

    pub fn with_lookup(mut self, lookup: ImageLookup) -> Self {
        self.lookup = lookup;
        self
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut L {
        &mut self.loader
    }

    pub fn images(&self) -> &Arc<ImageCache> {
        &self.images
    }

    pub fn lookup(&self) -> &ImageLookup {
        &self.lookup
    }

    pub fn lookup_mut(&mut self) -> &mut ImageLookup {
        &mut self.lookup
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: RenderOptions) {
        self.options = options;
    }

    pub fn context(&self) -> RenderContext<'_> {
        RenderContext {
            images: self.images.as_ref(),
            lookup: &self.lookup,
            options: &self.options,
        }
    }

    /// Bounding boxes of every field that would be drawn for this row
    pub fn bounds<P: FontProvider + ?Sized>(
        &self,
        fonts: &P,
        config: &CardConfig,
        row: &Row,
        index: usize,
    ) -> Vec<FieldBounds> {
        compute_bounds(fonts, self.context(), &config.fields, row, index)
    }

    /// Render one card
    ///
    /// `selected` is a field index to outline. Only an unusable surface is an
    /// error; missing images and fonts are reported in the returned warnings.
    pub async fn render_card<S: Surface>(
        &self,
        surface: &mut S,
        config: &CardConfig,
        row: &Row,
        index: usize,
        selected: Option<usize>,
    ) -> Result<RenderReport> {
        log::trace!(
            "render card {index}: {}x{}, {} fields",
            config.canvas.width,
            config.canvas.height,
            config.fields.len()
        );

        size_surface(surface, &config.canvas)?;

        let mut report = RenderReport::default();
        self.draw_background(surface, &config.canvas, &mut report)
            .await;

        let fields = FieldRenderer::new(self.context(), &self.loader);
        for (field_index, field) in config.fields.iter().enumerate() {
            match fields
                .draw_field(surface, field_index, field, row, index)
                .await
            {
                FieldOutcome::Drawn(_) => report.fields_drawn += 1,
                FieldOutcome::Suppressed => {}
                FieldOutcome::Skipped(warning) => report.warnings.push(warning),
            }
        }

        if let Some(selected) = selected {
            report.highlight = self.draw_highlight(surface, config, row, index, selected);
        }

        Ok(report)
    }

    async fn draw_background<S: Surface>(
        &self,
        surface: &mut S,
        canvas: &CanvasConfig,
        report: &mut RenderReport,
    ) {
        let full = Rect::new(0.0, 0.0, canvas.width as f32, canvas.height as f32);

        if let Some(key) = canvas
            .background_image
            .as_deref()
            .filter(|key| !key.is_empty())
        {
            let source = self.lookup.resolve(key);
            match self.images.load(&self.loader, source).await {
                Ok(image) => {
                    surface.draw_image(&image, full);
                    return;
                }
                Err(e) => {
                    let warning = Warning::BackgroundUnavailable {
                        source: source.to_string(),
                        reason: e.to_string(),
                    };
                    log::warn!("{warning}");
                    report.warnings.push(warning);
                }
            }
        }

        surface.fill_rect(full, canvas.fill_color());
    }

    fn draw_highlight<S: Surface>(
        &self,
        surface: &mut S,
        config: &CardConfig,
        row: &Row,
        index: usize,
        selected: usize,
    ) -> Option<Rect> {
        let bounds = self.bounds(&*surface, config, row, index);
        let target = bounds.iter().find(|b| b.field_index == selected)?;

        let style = self.options.highlight;
        let outline = target.rect().inflate(style.padding);
        surface.stroke_dashed_rect(outline, style.color, style.line_width, style.dash);
        Some(outline)
    }

    /// Wrap in a double-buffered renderer
    pub fn into_buffered<S: Surface>(self) -> BufferedCardRenderer<L, S> {
        BufferedCardRenderer::new(self)
    }
}

/// Size the surface to the canvas, reusing it when the size already matches
fn size_surface<S: Surface>(surface: &mut S, canvas: &CanvasConfig) -> Result<()> {
    if (surface.width(), surface.height()) == (canvas.width, canvas.height) {
        surface.clear();
        return Ok(());
    }
    surface
        .resize(canvas.width, canvas.height)
        .map_err(surface_unavailable)
}

/// Renders into an offscreen surface, then copies the finished frame
///
/// The visible surface never shows a half-drawn card. The offscreen surface
/// belongs to this renderer and is only reallocated when the canvas size
/// changes; `&mut self` keeps renders on one instance from overlapping.
pub struct BufferedCardRenderer<L, S> {
    renderer: CardRenderer<L>,
    offscreen: Option<S>,
}

impl<L: ImageLoader, S: Surface> BufferedCardRenderer<L, S> {
    pub fn new(renderer: CardRenderer<L>) -> Self {
        Self {
            renderer,
            offscreen: None,
        }
    }

    pub fn renderer(&self) -> &CardRenderer<L> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut CardRenderer<L> {
        &mut self.renderer
    }

    pub fn offscreen(&self) -> Option<&S> {
        self.offscreen.as_ref()
    }

    /// Render one card into the offscreen buffer and present it on `visible`
    pub async fn render_card(
        &mut self,
        visible: &mut S,
        config: &CardConfig,
        row: &Row,
        index: usize,
        selected: Option<usize>,
    ) -> Result<RenderReport> {
        let (width, height) = (config.canvas.width, config.canvas.height);

        let offscreen = match self.offscreen.take() {
            Some(buffer) if (buffer.width(), buffer.height()) == (width, height) => {
                self.offscreen.insert(buffer)
            }
            _ => {
                let buffer = visible
                    .create_offscreen(width, height)
                    .map_err(surface_unavailable)?;
                self.offscreen.insert(buffer)
            }
        };

        let report = self
            .renderer
            .render_card(offscreen, config, row, index, selected)
            .await?;
        visible.copy_from(offscreen).map_err(surface_unavailable)?;

        Ok(report)
    }
}
