//! Card configuration schema types

use crate::{Result, TemplateError};
use card_core::{Color, FontSpec, FontStyle, ImageEncoding};
use card_text::{Anchor, TextStyle};
use serde::{Deserialize, Serialize};

/// One data row: column name to scalar value, in column order
pub type Row = serde_json::Map<String, serde_json::Value>;

pub const DEFAULT_CANVAS_WIDTH: u32 = 1050;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 600;
pub const DEFAULT_BACKGROUND_COLOR: &str = "#F7F8FA";
pub const DEFAULT_FONT_FAMILY: &str = "Microsoft YaHei";
pub const DEFAULT_FONT_STYLE: &str = "Regular";
pub const DEFAULT_FONT_SIZE: f32 = 32.0;
pub const DEFAULT_FONT_WEIGHT: u16 = 400;
pub const DEFAULT_TEXT_COLOR: &str = "#000000";
pub const DEFAULT_LINE_SPACING: f32 = 4.0;
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "output";
pub const DEFAULT_OUTPUT_FILENAME: &str = "{姓名}_{公司}_{index:03d}";

/// Image box side used when neither a maximum nor an intrinsic size is known
pub const DEFAULT_IMAGE_SIZE: f32 = 100.0;

fn default_canvas_width() -> u32 {
    DEFAULT_CANVAS_WIDTH
}

fn default_canvas_height() -> u32 {
    DEFAULT_CANVAS_HEIGHT
}

fn default_background_color() -> String {
    DEFAULT_BACKGROUND_COLOR.to_string()
}

fn default_font_family() -> String {
    DEFAULT_FONT_FAMILY.to_string()
}

fn default_font_style() -> String {
    DEFAULT_FONT_STYLE.to_string()
}

fn default_font_size() -> f32 {
    DEFAULT_FONT_SIZE
}

fn default_font_weight() -> u16 {
    DEFAULT_FONT_WEIGHT
}

fn default_text_color() -> String {
    DEFAULT_TEXT_COLOR.to_string()
}

fn default_output_directory() -> String {
    DEFAULT_OUTPUT_DIRECTORY.to_string()
}

fn default_output_filename() -> String {
    DEFAULT_OUTPUT_FILENAME.to_string()
}

/// Position in canvas pixels, origin top-left
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Text field
///
/// `text` is a template: `{column}` and `{index}` placeholders are filled
/// from the row being rendered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TextField {
    pub text: String,

    pub position: Position,

    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Free-form style label (`Regular`, `Bold`, `Italic`, ...)
    #[serde(default = "default_font_style")]
    pub font_style: String,

    /// Em size in pixels
    #[serde(default = "default_font_size")]
    pub font_size: f32,

    /// Numeric weight, 100 - 900
    #[serde(default = "default_font_weight")]
    pub font_weight: u16,

    /// CSS hex color
    #[serde(default = "default_text_color")]
    pub color: String,

    #[serde(default)]
    pub anchor: Anchor,

    /// Wrap width in pixels; unset or non-positive disables wrapping
    #[serde(default)]
    pub wrap_width: Option<f32>,

    /// Extra space between lines (default 4)
    #[serde(default)]
    pub line_spacing: Option<f32>,

    /// Extra space between characters (default 0)
    #[serde(default)]
    pub letter_spacing: Option<f32>,
}

impl TextField {
    /// Text field with default styling
    pub fn new(text: &str, x: f32, y: f32) -> Self {
        Self {
            text: text.to_string(),
            position: Position::new(x, y),
            font_family: default_font_family(),
            font_style: default_font_style(),
            font_size: DEFAULT_FONT_SIZE,
            font_weight: DEFAULT_FONT_WEIGHT,
            color: default_text_color(),
            anchor: Anchor::default(),
            wrap_width: None,
            line_spacing: None,
            letter_spacing: None,
        }
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_font(mut self, family: &str, size: f32) -> Self {
        self.font_family = family.to_string();
        self.font_size = size;
        self
    }

    pub fn with_weight(mut self, weight: u16) -> Self {
        self.font_weight = weight;
        self
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = color.to_string();
        self
    }

    pub fn with_wrap_width(mut self, wrap_width: f32) -> Self {
        self.wrap_width = Some(wrap_width);
        self
    }

    pub fn with_line_spacing(mut self, line_spacing: f32) -> Self {
        self.line_spacing = Some(line_spacing);
        self
    }

    pub fn with_letter_spacing(mut self, letter_spacing: f32) -> Self {
        self.letter_spacing = Some(letter_spacing);
        self
    }

    /// Font request for this field
    pub fn font_spec(&self) -> FontSpec {
        FontSpec::new(&self.font_family, self.font_size)
            .with_weight(self.font_weight)
            .with_style(FontStyle::from_label(&self.font_style))
    }

    /// Geometry inputs for the layout engine
    pub fn text_style(&self) -> TextStyle {
        TextStyle::new(self.font_size)
            .with_anchor(self.anchor)
            .with_line_spacing(self.line_spacing.unwrap_or(DEFAULT_LINE_SPACING))
            .with_letter_spacing(self.letter_spacing.unwrap_or(0.0))
            .with_wrap_width(self.wrap_width)
    }

    /// Fill color; an unparseable color draws black
    pub fn fill_color(&self) -> Color {
        Color::parse_or(&self.color, Color::black())
    }
}

/// Image field
///
/// `path` is a template as well. The resolved value is either a direct
/// source (file path, `data:` URL) or a key into the uploaded-image lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageField {
    pub path: String,

    pub position: Position,

    #[serde(default)]
    pub max_width: Option<f32>,

    #[serde(default)]
    pub max_height: Option<f32>,
}

impl ImageField {
    pub fn new(path: &str, x: f32, y: f32) -> Self {
        Self {
            path: path.to_string(),
            position: Position::new(x, y),
            max_width: None,
            max_height: None,
        }
    }

    pub fn with_max_size(mut self, max_width: Option<f32>, max_height: Option<f32>) -> Self {
        self.max_width = max_width;
        self.max_height = max_height;
        self
    }
}

/// Card field (tagged union)
///
/// Fields are drawn in declaration order, so later fields sit on top.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Field {
    Text(TextField),
    Image(ImageField),
}

impl Field {
    /// Get the position
    pub fn position(&self) -> Position {
        match self {
            Field::Text(f) => f.position,
            Field::Image(f) => f.position,
        }
    }

    /// Get the template string (`text` or `path`)
    pub fn template(&self) -> &str {
        match self {
            Field::Text(f) => &f.text,
            Field::Image(f) => &f.path,
        }
    }

    /// Move the field
    pub fn set_position(&mut self, position: Position) {
        match self {
            Field::Text(f) => f.position = position,
            Field::Image(f) => f.position = position,
        }
    }
}

impl From<TextField> for Field {
    fn from(field: TextField) -> Self {
        Field::Text(field)
    }
}

impl From<ImageField> for Field {
    fn from(field: ImageField) -> Self {
        Field::Image(field)
    }
}

/// Canvas size and background
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CanvasConfig {
    #[serde(default = "default_canvas_width")]
    pub width: u32,

    #[serde(default = "default_canvas_height")]
    pub height: u32,

    #[serde(default = "default_background_color")]
    pub background_color: String,

    /// Stretched over the whole canvas; the color is used if it fails to load
    #[serde(default)]
    pub background_image: Option<String>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
            background_color: default_background_color(),
            background_image: None,
        }
    }
}

impl CanvasConfig {
    /// Background fill; empty or unparseable colors fill white
    pub fn fill_color(&self) -> Color {
        Color::parse_or(&self.background_color, Color::white())
    }
}

/// Output image format
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

impl OutputFormat {
    pub fn encoding(self) -> ImageEncoding {
        match self {
            OutputFormat::Png => ImageEncoding::Png,
            OutputFormat::Jpeg => ImageEncoding::Jpeg,
        }
    }

    /// Parse `PNG` / `JPEG` (any case, `JPG` accepted)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "PNG" => Some(OutputFormat::Png),
            "JPEG" | "JPG" => Some(OutputFormat::Jpeg),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Png => "PNG",
            OutputFormat::Jpeg => "JPEG",
        }
    }
}

/// Where and how batch output is written
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_output_directory")]
    pub directory: String,

    #[serde(default)]
    pub format: OutputFormat,

    /// Filename template, without extension
    #[serde(default = "default_output_filename")]
    pub filename: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            format: OutputFormat::default(),
            filename: default_output_filename(),
        }
    }
}

/// Complete card configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CardConfig {
    #[serde(default)]
    pub canvas: CanvasConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub fields: Vec<Field>,
}

impl CardConfig {
    /// Parse the camelCase in-memory representation
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| TemplateError::ParseError(e.to_string()))
    }

    /// Serialize to the camelCase in-memory representation
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Append a field on top of the existing ones
    pub fn push_field(&mut self, field: impl Into<Field>) -> &mut Self {
        self.fields.push(field.into());
        self
    }
}
