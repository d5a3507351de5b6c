//! Card Core - raster drawing primitives for card rendering
//!
//! This crate provides functionality for:
//! - Parsing CSS-style hex colors
//! - Registering TrueType font families and resolving weight/style variants
//! - Measuring and rasterizing text with `ab_glyph`
//! - Decoding, scaling and encoding images (PNG, JPEG)
//! - An RGBA drawing surface with the small canvas-like API the template
//!   engine needs
//!
//! # Example
//!
//! ```ignore
//! use card_core::{Color, FontLibrary, RasterSurface, Rect, Surface};
//! use std::sync::Arc;
//!
//! let mut fonts = FontLibrary::new();
//! fonts.register_font(std::fs::read("fonts/DejaVuSansMono.ttf")?)?;
//!
//! let mut surface = RasterSurface::new(400, 200, Arc::new(fonts))?;
//! surface.fill_rect(Rect::new(0.0, 0.0, 400.0, 200.0), Color::white());
//! let png = surface.encode(card_core::ImageEncoding::Png)?;
//! ```

mod codec;
mod color;
mod font;
mod raster;
mod surface;

pub use codec::{
    clamp_to_box, decode_data_url, decode_image, detect_format, encode_image, ImageEncoding,
    ImageFormat, JPEG_QUALITY,
};
pub use color::Color;
pub use font::{
    read_face_info, FaceInfo, FontFamily, FontFamilyBuilder, FontLibrary, FontMetrics, FontSpec,
    FontStyle, ScaledFont, BOLD_WEIGHT, REGULAR_WEIGHT,
};
pub use raster::{RasterSurface, MAX_DIMENSION};
pub use surface::{FontProvider, Rect, Surface};

use thiserror::Error;

/// Errors that can occur while drawing cards
#[derive(Debug, Error)]
pub enum CardError {
    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("Failed to encode image: {0}")]
    EncodeError(String),

    #[error("Surface unavailable: {0}")]
    SurfaceUnavailable(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for card drawing operations
pub type Result<T> = std::result::Result<T, CardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CardError::FontNotFound("Noto Sans".to_string());
        assert_eq!(err.to_string(), "Font not found: Noto Sans");

        let err = CardError::SurfaceUnavailable("0x600".to_string());
        assert_eq!(err.to_string(), "Surface unavailable: 0x600");
    }
}
