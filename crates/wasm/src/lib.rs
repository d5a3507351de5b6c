//! WASM bindings for cardgen
//!
//! This crate provides JavaScript-friendly API for:
//! - Loading and saving card configs (in-memory and exchange JSON)
//! - Registering fonts and images
//! - Rendering one card per data row to PNG/JPEG bytes
//! - Field bounds and hit-testing for editors
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { CardGenerator } from 'cardgen-wasm';
//!
//! await init();
//!
//! const generator = CardGenerator.importConfig(configJson);
//! generator.loadFont(fontBytes);
//! generator.registerImage('logo.png', logoBytes);
//!
//! // Preview with the second field highlighted
//! const png = generator.render({ name: "Alice" }, 1, 1);
//!
//! // Every row, as [filename, bytes] pairs
//! const files = generator.exportAll(rows);
//! ```

use card_core::{FontLibrary, RasterSurface, Surface};
use std::future::Future;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use template::{
    column_names, compute_bounds, export_cards, find_field_at, output_filename, CardConfig,
    CardRenderer, FieldBounds, MemoryArchive, MemoryImageLoader, RenderOptions, Row,
};
use wasm_bindgen::prelude::*;

// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Drive a future that never suspends
///
/// All images come from `MemoryImageLoader`, so every await completes on the
/// first poll.
fn block_on<F: Future>(future: F) -> F::Output {
    let mut future = std::pin::pin!(future);
    let mut cx = Context::from_waker(Waker::noop());
    loop {
        if let Poll::Ready(output) = future.as_mut().poll(&mut cx) {
            return output;
        }
    }
}

/// The surface kept in `slot`, or a fresh one on first use
///
/// Rendering resizes it to the canvas, so the initial size does not matter.
fn reuse_surface<'a>(
    slot: &'a mut Option<RasterSurface>,
    fonts: &Arc<FontLibrary>,
) -> card_core::Result<&'a mut RasterSurface> {
    let surface = match slot.take() {
        Some(surface) => surface,
        None => RasterSurface::new(1, 1, Arc::clone(fonts))?,
    };
    Ok(slot.insert(surface))
}

/// Card template with its fonts and images
#[wasm_bindgen]
pub struct CardGenerator {
    config: CardConfig,
    fonts: Arc<FontLibrary>,
    renderer: CardRenderer<MemoryImageLoader>,
    /// Reused between renders; dropped when the font set changes
    surface: Option<RasterSurface>,
    warnings: Vec<String>,
}

#[wasm_bindgen]
impl CardGenerator {
    /// Create a generator with the default config and no fonts
    #[wasm_bindgen(constructor)]
    pub fn new() -> CardGenerator {
        Self::with_config(CardConfig::default())
    }

    /// Create from the in-memory (camelCase) JSON form
    ///
    /// @param json - Config JSON string
    /// @returns CardGenerator instance
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str) -> Result<CardGenerator, JsValue> {
        let config = CardConfig::from_json(json).map_err(js_error)?;
        Ok(Self::with_config(config))
    }

    /// Create from the exchange (snake_case) JSON form, filling defaults
    ///
    /// @param json - Exported config JSON string
    /// @returns CardGenerator instance
    #[wasm_bindgen(js_name = importConfig)]
    pub fn import_config(json: &str) -> Result<CardGenerator, JsValue> {
        let config = template::import_config(json).map_err(js_error)?;
        Ok(Self::with_config(config))
    }

    /// In-memory (camelCase) JSON form of the current config
    #[wasm_bindgen(js_name = toJson)]
    pub fn to_json(&self) -> Result<String, JsValue> {
        self.config.to_json().map_err(js_error)
    }

    /// Exchange (snake_case) JSON form of the current config
    #[wasm_bindgen(js_name = exportConfig)]
    pub fn export_config(&self) -> Result<String, JsValue> {
        template::config_io::export_config_string(&self.config).map_err(js_error)
    }

    /// Load a TTF/OTF font, filed under the family name it declares
    ///
    /// @param data - Font file bytes (Uint8Array)
    /// @returns Family name
    #[wasm_bindgen(js_name = loadFont)]
    pub fn load_font(&mut self, data: &[u8]) -> Result<String, JsValue> {
        self.add_font(data.to_vec()).map_err(js_error)
    }

    /// Family used for fields whose font is not loaded
    ///
    /// @param family - A loaded family name
    #[wasm_bindgen(js_name = setDefaultFont)]
    pub fn set_default_font(&mut self, family: &str) -> Result<(), JsValue> {
        Arc::make_mut(&mut self.fonts)
            .set_default_family(family)
            .map_err(js_error)?;
        self.surface = None;
        Ok(())
    }

    /// Loaded font families, sorted
    #[wasm_bindgen(js_name = fontFamilies)]
    pub fn font_families(&self) -> Vec<String> {
        self.fonts.families().into_iter().map(String::from).collect()
    }

    /// Register image bytes under a source name used by fields
    ///
    /// @param source - Name referenced by image paths and the background
    /// @param data - PNG or JPEG bytes (Uint8Array)
    #[wasm_bindgen(js_name = registerImage)]
    pub fn register_image(&mut self, source: &str, data: &[u8]) {
        self.renderer.loader_mut().insert(source, data.to_vec());
    }

    /// Map an upload key to an image source
    ///
    /// @param key - Value as it appears in data rows
    /// @param source - Registered image source
    #[wasm_bindgen(js_name = setUpload)]
    pub fn set_upload(&mut self, key: &str, source: &str) {
        self.renderer.lookup_mut().insert(key, source);
    }

    /// Draw fields whose columns are missing, with empty values
    ///
    /// @param lenient - `false` hides such fields (default)
    #[wasm_bindgen(js_name = setLenient)]
    pub fn set_lenient(&mut self, lenient: bool) {
        let options = if lenient {
            RenderOptions::lenient()
        } else {
            RenderOptions::default()
        };
        self.renderer.set_options(options);
    }

    /// Render one card
    ///
    /// @param row - Data object for binding
    /// @param index - 1-based row number
    /// @param selected - Field to highlight, if any
    /// @returns Encoded image bytes (Uint8Array) in the output format
    pub fn render(
        &mut self,
        row: JsValue,
        index: usize,
        selected: Option<usize>,
    ) -> Result<Vec<u8>, JsValue> {
        let row: Row = serde_wasm_bindgen::from_value(row)?;
        self.render_row(&row, index, selected).map_err(js_error)
    }

    /// Warnings raised by the last render or export
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.clone()
    }

    /// Bounding box of every drawn field
    ///
    /// @param row - Data object for binding
    /// @param index - 1-based row number
    /// @returns Array of { fieldIndex, x, y, width, height }
    #[wasm_bindgen(js_name = fieldBounds)]
    pub fn field_bounds(&self, row: JsValue, index: usize) -> Result<JsValue, JsValue> {
        let row: Row = serde_wasm_bindgen::from_value(row)?;
        Ok(serde_wasm_bindgen::to_value(&self.bounds(&row, index))?)
    }

    /// Topmost field under a point
    ///
    /// @param row - Data object for binding
    /// @param index - 1-based row number
    /// @param x - Canvas x coordinate
    /// @param y - Canvas y coordinate
    /// @returns Field index, or undefined
    #[wasm_bindgen(js_name = findFieldAt)]
    pub fn find_field_at(
        &self,
        row: JsValue,
        index: usize,
        x: f32,
        y: f32,
    ) -> Result<Option<usize>, JsValue> {
        let row: Row = serde_wasm_bindgen::from_value(row)?;
        Ok(find_field_at(&self.bounds(&row, index), x, y))
    }

    /// File name for a row, with extension
    ///
    /// @param row - Data object for binding
    /// @param index - 1-based row number
    #[wasm_bindgen(js_name = outputFilename)]
    pub fn output_filename(&self, row: JsValue, index: usize) -> Result<String, JsValue> {
        let row: Row = serde_wasm_bindgen::from_value(row)?;
        Ok(self.filename(&row, index))
    }

    /// Column names, taken from the first row
    ///
    /// @param rows - Array of data objects
    #[wasm_bindgen(js_name = columnNames)]
    pub fn column_names(rows: JsValue) -> Result<Vec<String>, JsValue> {
        let rows: Vec<Row> = serde_wasm_bindgen::from_value(rows)?;
        Ok(column_names(&rows))
    }

    /// Render every row
    ///
    /// Rows that fail are left out; see `warnings()`.
    ///
    /// @param rows - Array of data objects
    /// @returns Array of [filename, Uint8Array] pairs
    #[wasm_bindgen(js_name = exportAll)]
    pub fn export_all(&mut self, rows: JsValue) -> Result<js_sys::Array, JsValue> {
        let rows: Vec<Row> = serde_wasm_bindgen::from_value(rows)?;
        let files = js_sys::Array::new();
        for (filename, bytes) in self.export_rows(&rows).map_err(js_error)? {
            let bytes = js_sys::Uint8Array::from(bytes.as_slice());
            files.push(&js_sys::Array::of2(&JsValue::from_str(&filename), &bytes));
        }
        Ok(files)
    }
}

impl CardGenerator {
    fn with_config(config: CardConfig) -> Self {
        CardGenerator {
            config,
            fonts: Arc::new(FontLibrary::new()),
            renderer: CardRenderer::new(MemoryImageLoader::new()),
            surface: None,
            warnings: Vec::new(),
        }
    }

    fn add_font(&mut self, data: Vec<u8>) -> card_core::Result<String> {
        let info = Arc::make_mut(&mut self.fonts).register_font(data)?;
        self.surface = None;
        Ok(info.family)
    }

    fn render_row(
        &mut self,
        row: &Row,
        index: usize,
        selected: Option<usize>,
    ) -> template::Result<Vec<u8>> {
        let surface = reuse_surface(&mut self.surface, &self.fonts)?;
        let report = block_on(
            self.renderer
                .render_card(surface, &self.config, row, index, selected),
        )?;
        self.warnings = report.warnings.iter().map(ToString::to_string).collect();
        Ok(surface.encode(self.config.output.format.encoding())?)
    }

    fn bounds(&self, row: &Row, index: usize) -> Vec<FieldBounds> {
        compute_bounds(
            self.fonts.as_ref(),
            self.renderer.context(),
            &self.config.fields,
            row,
            index,
        )
    }

    fn filename(&self, row: &Row, index: usize) -> String {
        let stem = output_filename(
            &self.config.output.filename,
            row,
            index,
            self.renderer.options().missing_key,
        );
        format!("{stem}.{}", self.config.output.format.encoding().extension())
    }

    fn export_rows(&mut self, rows: &[Row]) -> template::Result<Vec<(String, Vec<u8>)>> {
        let mut archive = MemoryArchive::new();
        let surface = reuse_surface(&mut self.surface, &self.fonts)?;
        let report = block_on(export_cards(
            &self.renderer,
            surface,
            &self.config,
            rows,
            &mut archive,
        ))?;

        self.warnings = report
            .warnings
            .iter()
            .map(|(index, warning)| format!("row {index}: {warning}"))
            .chain(
                report
                    .failures
                    .iter()
                    .map(|f| format!("row {} ({}): {}", f.index, f.filename, f.reason)),
            )
            .chain(
                report
                    .duplicates
                    .iter()
                    .map(|(index, filename)| format!("row {index}: replaced {filename}")),
            )
            .collect();
        Ok(archive.into_entries())
    }
}

impl Default for CardGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use template::TextField;

    fn font() -> Vec<u8> {
        std::fs::read("../../fonts/DejaVuSansMono.ttf").unwrap()
    }

    fn row(value: serde_json::Value) -> Row {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("row must be an object"),
        }
    }

    fn generator() -> CardGenerator {
        let mut config = CardConfig::default();
        config.canvas.width = 300;
        config.canvas.height = 120;
        config.output.filename = "{name}_{index:02d}".to_string();
        config.push_field(TextField::new("{name}", 10.0, 10.0).with_font("DejaVu Sans Mono", 24.0));
        config.push_field(TextField::new("{title}", 10.0, 60.0).with_font("DejaVu Sans Mono", 24.0));

        let mut generator = CardGenerator::with_config(config);
        assert_eq!(generator.add_font(font()).unwrap(), "DejaVu Sans Mono");
        generator
    }

    #[test]
    fn test_block_on_ready_future() {
        assert_eq!(block_on(async { 40 + 2 }), 42);
    }

    #[test]
    fn test_render_row_encodes_png() {
        let mut generator = generator();
        let bytes = generator
            .render_row(&row(json!({ "name": "Alice" })), 1, Some(0))
            .unwrap();

        let image = card_core::decode_image(&bytes).unwrap();
        assert_eq!(image.dimensions(), (300, 120));
        assert!(generator.warnings.is_empty());
    }

    #[test]
    fn test_bounds_skip_missing_columns() {
        let generator = generator();
        let bounds = generator.bounds(&row(json!({ "name": "Alice" })), 1);

        assert_eq!(bounds.len(), 1);
        assert_eq!(bounds[0].field_index, 0);
        assert_eq!(find_field_at(&bounds, 12.0, 12.0), Some(0));
        assert_eq!(find_field_at(&bounds, 290.0, 110.0), None);
    }

    #[test]
    fn test_export_rows_names_files() {
        let mut generator = generator();
        let rows = vec![
            row(json!({ "name": "Al", "title": "CEO" })),
            row(json!({ "title": "CTO" })),
        ];
        let files = generator.export_rows(&rows).unwrap();

        let names: Vec<&str> = files.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["Al_01.png", "card_2.png"]);
        assert_eq!(
            generator.filename(&row(json!({ "name": "Bo" })), 3),
            "Bo_03.png"
        );
    }

    #[test]
    fn test_fonts_survive_surface_reuse() {
        let mut generator = generator();
        generator
            .render_row(&row(json!({ "name": "A" })), 1, None)
            .unwrap();
        generator.add_font(font()).unwrap();
        assert!(generator.surface.is_none());

        generator
            .render_row(&row(json!({ "name": "B" })), 2, None)
            .unwrap();
        assert_eq!(generator.font_families(), vec!["DejaVu Sans Mono"]);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_column_names_from_js_rows() {
        let rows = js_sys::JSON::parse(r#"[{"name":"Al","company":"Acme"}]"#).unwrap();
        assert_eq!(
            CardGenerator::column_names(rows).unwrap(),
            vec!["name".to_string(), "company".to_string()]
        );
    }

    #[wasm_bindgen_test]
    fn test_output_filename_from_js_row() {
        let generator = CardGenerator::new();
        let row = js_sys::JSON::parse(r#"{"姓名":"王","公司":"Acme"}"#).unwrap();
        assert_eq!(
            generator.output_filename(row, 7).unwrap(),
            "王_Acme_007.png"
        );
    }
}
