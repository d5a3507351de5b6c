//! Config import/export in the snake_case exchange format
//!
//! The exchange format is what other tools read and write:
//!
//! ```json
//! {
//!   "canvas": { "width": 1050, "height": 600, "background_color": "#F7F8FA", "background": null },
//!   "output": { "directory": "output", "format": "PNG", "filename": "{姓名}_{index:03d}" },
//!   "fields": [
//!     { "type": "text", "text": "{姓名}", "position": { "x": 80, "y": 120 },
//!       "font_family": "Microsoft YaHei", "font_style": "Bold", "font_size": 48,
//!       "font_weight": 700, "color": "#1F2937", "anchor": "la",
//!       "wrap_width": null, "line_spacing": null, "letter_spacing": null },
//!     { "type": "image", "path": "logo.png", "position": { "x": 900, "y": 40 },
//!       "max_width": 120, "max_height": null }
//!   ]
//! }
//! ```
//!
//! Import never fails on partial data: every missing, null or zero value
//! takes its default. Only text that is not JSON is an error.

use crate::schema::{
    CanvasConfig, CardConfig, Field, ImageField, OutputConfig, OutputFormat, Position, TextField,
    DEFAULT_BACKGROUND_COLOR, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, DEFAULT_FONT_FAMILY,
    DEFAULT_FONT_SIZE, DEFAULT_FONT_STYLE, DEFAULT_FONT_WEIGHT, DEFAULT_OUTPUT_DIRECTORY,
    DEFAULT_TEXT_COLOR,
};
use crate::{Result, TemplateError};
use card_text::Anchor;
use serde_json::{json, Map, Value};

/// Filename template used when an imported config has none
pub const IMPORT_DEFAULT_FILENAME: &str = "{姓名}_{index:03d}";

fn optional_number(value: Option<f32>) -> Value {
    value.map_or(Value::Null, |v| json!(v))
}

/// Convert a config to the exchange format
pub fn export_config(config: &CardConfig) -> Value {
    let canvas = &config.canvas;
    let background = canvas
        .background_image
        .as_deref()
        .filter(|s| !s.is_empty())
        .map_or(Value::Null, |s| json!(s));

    let fields: Vec<Value> = config.fields.iter().map(export_field).collect();

    json!({
        "canvas": {
            "width": canvas.width,
            "height": canvas.height,
            "background_color": canvas.background_color,
            "background": background,
        },
        "output": {
            "directory": config.output.directory,
            "format": config.output.format.name(),
            "filename": config.output.filename,
        },
        "fields": fields,
    })
}

fn export_field(field: &Field) -> Value {
    match field {
        Field::Text(f) => json!({
            "type": "text",
            "text": f.text,
            "position": { "x": f.position.x, "y": f.position.y },
            "font_family": f.font_family,
            "font_style": f.font_style,
            "font_size": f.font_size,
            "font_weight": f.font_weight,
            "color": f.color,
            "anchor": f.anchor.code(),
            "wrap_width": optional_number(f.wrap_width.filter(|w| *w > 0.0)),
            "line_spacing": optional_number(f.line_spacing),
            "letter_spacing": optional_number(f.letter_spacing),
        }),
        Field::Image(f) => json!({
            "type": "image",
            "path": f.path,
            "position": { "x": f.position.x, "y": f.position.y },
            "max_width": optional_number(f.max_width.filter(|w| *w > 0.0)),
            "max_height": optional_number(f.max_height.filter(|h| *h > 0.0)),
        }),
    }
}

/// Exchange format as pretty-printed JSON (two-space indent)
pub fn export_config_string(config: &CardConfig) -> Result<String> {
    Ok(serde_json::to_string_pretty(&export_config(config))?)
}

/// Parse exchange-format JSON, filling defaults
pub fn import_config(json: &str) -> Result<CardConfig> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| TemplateError::ParseError(e.to_string()))?;
    Ok(import_config_value(&value))
}

/// Build a config from an exchange-format value, filling defaults
pub fn import_config_value(value: &Value) -> CardConfig {
    let empty = Map::new();
    let section = |name: &str| value.get(name).and_then(Value::as_object).unwrap_or(&empty);

    let canvas = section("canvas");
    let output = section("output");

    let fields = value
        .get("fields")
        .and_then(Value::as_array)
        .map(|fields| {
            fields
                .iter()
                .filter_map(Value::as_object)
                .map(import_field)
                .collect()
        })
        .unwrap_or_default();

    CardConfig {
        canvas: CanvasConfig {
            width: positive(canvas.get("width"))
                .map_or(DEFAULT_CANVAS_WIDTH, |w| w.round() as u32),
            height: positive(canvas.get("height"))
                .map_or(DEFAULT_CANVAS_HEIGHT, |h| h.round() as u32),
            background_color: text_or(canvas.get("background_color"), DEFAULT_BACKGROUND_COLOR),
            background_image: text(canvas.get("background")).map(str::to_string),
        },
        output: OutputConfig {
            directory: text_or(output.get("directory"), DEFAULT_OUTPUT_DIRECTORY),
            format: text(output.get("format"))
                .and_then(OutputFormat::from_name)
                .unwrap_or_default(),
            filename: text_or(output.get("filename"), IMPORT_DEFAULT_FILENAME),
        },
        fields,
    }
}

fn import_field(field: &Map<String, Value>) -> Field {
    let position = import_position(field.get("position"));

    if field.get("type").and_then(Value::as_str) != Some("text") {
        return Field::Image(ImageField {
            path: text_or(field.get("path"), ""),
            position,
            max_width: positive(field.get("max_width")).map(|v| v as f32),
            max_height: positive(field.get("max_height")).map(|v| v as f32),
        });
    }

    Field::Text(TextField {
        text: text_or(field.get("text"), ""),
        position,
        font_family: text_or(field.get("font_family"), DEFAULT_FONT_FAMILY),
        font_style: text_or(field.get("font_style"), DEFAULT_FONT_STYLE),
        font_size: positive(field.get("font_size")).map_or(DEFAULT_FONT_SIZE, |v| v as f32),
        font_weight: positive(field.get("font_weight"))
            .map_or(DEFAULT_FONT_WEIGHT, |v| v.round().clamp(1.0, 1000.0) as u16),
        color: text_or(field.get("color"), DEFAULT_TEXT_COLOR),
        anchor: text(field.get("anchor"))
            .and_then(|code| code.parse::<Anchor>().ok())
            .unwrap_or_default(),
        wrap_width: positive(field.get("wrap_width")).map(|v| v as f32),
        line_spacing: number(field.get("line_spacing")).map(|v| v as f32),
        letter_spacing: number(field.get("letter_spacing")).map(|v| v as f32),
    })
}

fn import_position(value: Option<&Value>) -> Position {
    let coordinate = |name: &str| {
        number(value.and_then(|p| p.get(name)))
            .map(|v| v as f32)
            .unwrap_or(0.0)
    };
    Position::new(coordinate("x"), coordinate("y"))
}

/// A finite number, also accepted in string form
fn number(value: Option<&Value>) -> Option<f64> {
    let parsed: Option<f64> = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn positive(value: Option<&Value>) -> Option<f64> {
    number(value).filter(|v| *v > 0.0)
}

/// A non-empty string
fn text(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Like [`text`], but numbers are printed and anything else is `default`
fn text_or(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(Value::Number(n)) => n.to_string(),
        other => text(other).unwrap_or(default).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn full_config() -> CardConfig {
        CardConfig {
            canvas: CanvasConfig {
                width: 800,
                height: 500,
                background_color: "#FFFFFF".to_string(),
                background_image: Some("bg.png".to_string()),
            },
            output: OutputConfig {
                directory: "cards".to_string(),
                format: OutputFormat::Jpeg,
                filename: "{name}_{index:02d}".to_string(),
            },
            fields: vec![
                Field::Text(
                    TextField::new("{name}", 40.0, 60.5)
                        .with_font("Noto Sans", 28.0)
                        .with_weight(700)
                        .with_color("#112233")
                        .with_anchor(Anchor::RB)
                        .with_wrap_width(300.0)
                        .with_line_spacing(6.0)
                        .with_letter_spacing(1.5),
                ),
                Field::Image(
                    ImageField::new("{photo}", 10.0, 20.0).with_max_size(Some(120.0), Some(90.0)),
                ),
            ],
        }
    }

    #[test]
    fn test_export_uses_snake_case() {
        let exported = export_config(&full_config());

        assert_eq!(exported["canvas"]["background_color"], json!("#FFFFFF"));
        assert_eq!(exported["canvas"]["background"], json!("bg.png"));
        assert_eq!(exported["output"]["format"], json!("JPEG"));
        assert_eq!(exported["fields"][0]["font_family"], json!("Noto Sans"));
        assert_eq!(exported["fields"][0]["wrap_width"], json!(300.0));
        assert_eq!(exported["fields"][0]["anchor"], json!("rb"));
        assert_eq!(exported["fields"][1]["max_width"], json!(120.0));
    }

    #[test]
    fn test_export_writes_null_for_unset_values() {
        let mut config = CardConfig::default();
        config.push_field(TextField::new("x", 0.0, 0.0));
        config.push_field(ImageField::new("y", 0.0, 0.0));

        let exported = export_config(&config);

        assert_eq!(exported["canvas"]["background"], Value::Null);
        assert_eq!(exported["fields"][0]["wrap_width"], Value::Null);
        assert_eq!(exported["fields"][0]["line_spacing"], Value::Null);
        assert_eq!(exported["fields"][1]["max_height"], Value::Null);
    }

    #[test]
    fn test_roundtrip_is_identity() {
        let config = full_config();
        let json = export_config_string(&config).unwrap();
        assert_eq!(import_config(&json).unwrap(), config);
    }

    #[test]
    fn test_roundtrip_keeps_zero_line_spacing() {
        let mut config = CardConfig::default();
        config.push_field(TextField::new("x", 0.0, 0.0).with_line_spacing(0.0));

        let imported = import_config_value(&export_config(&config));
        assert_eq!(imported, config);
    }

    #[test]
    fn test_import_empty_object_uses_defaults() {
        let config = import_config("{}").unwrap();

        assert_eq!(config.canvas, CanvasConfig::default());
        assert_eq!(config.output.directory, "output");
        assert_eq!(config.output.format, OutputFormat::Png);
        assert_eq!(config.output.filename, "{姓名}_{index:03d}");
        assert!(config.fields.is_empty());
    }

    #[test]
    fn test_import_fills_field_defaults() {
        let config = import_config(
            r#"{
                "canvas": { "width": 0, "height": null, "background_color": "" },
                "fields": [
                    { "type": "text", "text": "{姓名}", "anchor": "zz", "font_size": 0 },
                    { "type": "image" },
                    { "path": "legacy.png", "position": { "x": 5 } },
                    "garbage"
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.canvas.width, 1050);
        assert_eq!(config.canvas.height, 600);
        assert_eq!(config.canvas.background_color, "#F7F8FA");
        assert_eq!(config.fields.len(), 3);

        assert_eq!(
            config.fields[0],
            Field::Text(TextField::new("{姓名}", 0.0, 0.0))
        );
        assert_eq!(config.fields[1], Field::Image(ImageField::new("", 0.0, 0.0)));
        assert_eq!(
            config.fields[2],
            Field::Image(ImageField::new("legacy.png", 5.0, 0.0))
        );
    }

    #[test]
    fn test_import_accepts_numeric_strings() {
        let config = import_config(
            r#"{ "canvas": { "width": "640" }, "output": { "format": "jpeg" } }"#,
        )
        .unwrap();
        assert_eq!(config.canvas.width, 640);
        assert_eq!(config.output.format, OutputFormat::Jpeg);
    }

    #[test]
    fn test_import_rejects_invalid_json() {
        assert!(matches!(
            import_config("{ nope"),
            Err(TemplateError::ParseError(_))
        ));
    }
}
