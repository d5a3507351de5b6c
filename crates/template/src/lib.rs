//! Template Engine - card templates and batch rendering
//!
//! This crate provides:
//! - Card configuration types (canvas, output, text and image fields)
//! - Placeholder substitution (`{column}`, `{index}`, `{index:03d}`)
//! - Field rendering onto any [`card_core::Surface`]
//! - Bounding boxes and hit-testing that share the renderer's geometry
//! - A canvas orchestrator with background, highlight and double buffering
//! - Batch export into an archive sink
//! - JSON import/export in the snake_case exchange format
//!
//! # Example
//!
//! ```ignore
//! use card_core::{FontLibrary, RasterSurface};
//! use template::{CardConfig, CardRenderer, FsImageLoader, MemoryArchive};
//! use std::sync::Arc;
//!
//! let config = CardConfig::from_json(config_json)?;
//! let rows: Vec<template::Row> = serde_json::from_str(rows_json)?;
//!
//! let renderer = CardRenderer::new(FsImageLoader::new("assets"));
//! let mut surface = RasterSurface::new(1, 1, Arc::new(fonts))?;
//! let mut archive = MemoryArchive::new();
//! let report = template::export_cards(&renderer, &mut surface, &config, &rows, &mut archive).await?;
//! ```

mod bounds;
mod canvas;
pub mod config_io;
mod export;
mod images;
mod renderer;
mod schema;
pub mod substitute;

pub use bounds::{compute_bounds, field_bounds, find_field_at, FieldBounds};
pub use canvas::{BufferedCardRenderer, CardRenderer, HighlightStyle, RenderReport};
pub use config_io::{export_config, import_config};
pub use export::{
    export_cards, export_cards_with_progress, output_filename, ArchiveSink, DirectoryArchive,
    ExportFailure, ExportReport, MemoryArchive,
};
pub use images::{FsImageLoader, ImageCache, ImageLoader, ImageLookup, MemoryImageLoader};
pub use renderer::{layout_text, FieldOutcome, FieldRenderer, RenderContext, RenderOptions, Warning};
pub use schema::*;
pub use substitute::{column_names, placeholders, resolve, resolve_with, MissingKey};

use thiserror::Error;

/// Errors that can occur during template processing
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Failed to load image {path}: {reason}")]
    ImageLoadError { path: String, reason: String },

    #[error("Surface unavailable: {0}")]
    SurfaceUnavailable(String),

    #[error("Card error: {0}")]
    Core(#[from] card_core::CardError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for template operations
pub type Result<T> = std::result::Result<T, TemplateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TemplateError::ImageLoadError {
            path: "logo.png".to_string(),
            reason: "not found".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to load image logo.png: not found");

        let err: TemplateError = card_core::CardError::FontNotFound("Arial".to_string()).into();
        assert_eq!(err.to_string(), "Card error: Font not found: Arial");
    }
}
