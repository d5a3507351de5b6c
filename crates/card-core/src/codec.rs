//! Image decoding, scaling and encoding

use crate::{CardError, Result};
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};

impl From<image::ImageError> for CardError {
    fn from(err: image::ImageError) -> Self {
        CardError::ImageError(err.to_string())
    }
}

/// JPEG quality used for lossy output (0.95 on the canvas scale)
pub const JPEG_QUALITY: u8 = 95;

/// Detected image format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

/// Output encoding for rendered cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageEncoding {
    /// Lossless
    #[default]
    Png,
    /// Lossy, quality [`JPEG_QUALITY`]
    Jpeg,
}

impl ImageEncoding {
    /// File extension without the dot
    pub fn extension(self) -> &'static str {
        match self {
            ImageEncoding::Png => "png",
            ImageEncoding::Jpeg => "jpeg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageEncoding::Png => "image/png",
            ImageEncoding::Jpeg => "image/jpeg",
        }
    }
}

/// Detect image format from magic bytes
pub fn detect_format(data: &[u8]) -> Result<ImageFormat> {
    if data.len() < 8 {
        return Err(CardError::ImageError("Image data too short".to_string()));
    }

    // Check for JPEG (starts with FF D8 FF)
    if data[0] == 0xFF && data[1] == 0xD8 && data[2] == 0xFF {
        return Ok(ImageFormat::Jpeg);
    }

    // Check for PNG (starts with 89 50 4E 47 0D 0A 1A 0A)
    if data[0..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
        return Ok(ImageFormat::Png);
    }

    Err(CardError::ImageError("Unknown image format".to_string()))
}

/// Decode PNG or JPEG bytes into an RGBA buffer
pub fn decode_image(data: &[u8]) -> Result<RgbaImage> {
    let format = match detect_format(data)? {
        ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        ImageFormat::Png => image::ImageFormat::Png,
    };
    let decoded = image::load_from_memory_with_format(data, format)?;
    Ok(decoded.to_rgba8())
}

/// Encode an RGBA buffer
///
/// JPEG has no alpha channel; transparent pixels lose their alpha and keep
/// their color channels.
pub fn encode_image(image: &RgbaImage, encoding: ImageEncoding) -> Result<Vec<u8>> {
    let mut bytes: Vec<u8> = Vec::new();
    let (width, height) = image.dimensions();

    let written = match encoding {
        ImageEncoding::Png => PngEncoder::new(&mut bytes).write_image(
            image.as_raw(),
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
        ImageEncoding::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY).write_image(
                rgb.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )
        }
    };
    written.map_err(|e| CardError::EncodeError(e.to_string()))?;

    Ok(bytes)
}

/// Scale `width`×`height` down to fit the given maxima, keeping aspect ratio
///
/// The clamps run one after the other: width first (height follows), then
/// height (width follows). Images are never scaled up. A missing or
/// non-positive maximum is no constraint.
pub fn clamp_to_box(
    width: f32,
    height: f32,
    max_width: Option<f32>,
    max_height: Option<f32>,
) -> (f32, f32) {
    let (mut width, mut height) = (width, height);

    if let Some(max) = max_width.filter(|m| *m > 0.0) {
        if width > max {
            height *= max / width;
            width = max;
        }
    }
    if let Some(max) = max_height.filter(|m| *m > 0.0) {
        if height > max {
            width *= max / height;
            height = max;
        }
    }

    (width, height)
}

/// Decode the payload of a `data:` URL
///
/// Returns `None` when `source` is not a data URL.
pub fn decode_data_url(source: &str) -> Option<Result<Vec<u8>>> {
    let rest = source.strip_prefix("data:")?;

    let Some((meta, payload)) = rest.split_once(',') else {
        return Some(Err(CardError::ImageError(
            "Malformed data URL: missing ','".to_string(),
        )));
    };

    if meta.ends_with(";base64") {
        Some(
            base64::engine::general_purpose::STANDARD
                .decode(payload.trim())
                .map_err(|e| CardError::ImageError(format!("Invalid base64 data URL: {e}"))),
        )
    } else {
        Some(Ok(payload.as_bytes().to_vec()))
    }
}
