//! Batch export and config persistence

mod common;

use card_core::{detect_format, ImageFormat};
use common::{row, RecordingSurface};
use pretty_assertions::assert_eq;
use serde_json::json;
use template::config_io::export_config_string;
use template::{
    export_cards, export_cards_with_progress, import_config, CardConfig, CardRenderer,
    MemoryArchive, MemoryImageLoader, OutputFormat, TextField,
};

fn name_card() -> CardConfig {
    let mut config = CardConfig::default();
    config.output.filename = "{name}_{index:03d}".to_string();
    config.push_field(TextField::new("{name}", 40.0, 80.0));
    config
}

#[tokio::test]
async fn test_export_names_every_row() {
    let config = name_card();
    let rows = vec![
        row(json!({ "name": "Alice" })),
        row(json!({ "name": "Bob" })),
        row(json!({})),
    ];
    let renderer = CardRenderer::new(MemoryImageLoader::new());
    let mut surface = RecordingSurface::default();
    let mut archive = MemoryArchive::new();
    let mut progress = Vec::new();

    let report = export_cards_with_progress(
        &renderer,
        &mut surface,
        &config,
        &rows,
        &mut archive,
        |done, total| progress.push((done, total)),
    )
    .await
    .unwrap();

    assert_eq!(
        archive.names(),
        vec!["Alice_001.png", "Bob_002.png", "card_3.png"]
    );
    assert_eq!(report.exported, archive.names());
    assert!(report.failures.is_empty());
    assert_eq!(progress, vec![(1, 3), (2, 3), (3, 3)]);

    let first = archive.get("Alice_001.png").unwrap();
    assert_eq!(detect_format(first).unwrap(), ImageFormat::Png);
}

#[tokio::test]
async fn test_export_jpeg_extension() {
    let mut config = name_card();
    config.output.format = OutputFormat::Jpeg;
    let renderer = CardRenderer::new(MemoryImageLoader::new());
    let mut surface = RecordingSurface::default();
    let mut archive = MemoryArchive::new();

    export_cards(
        &renderer,
        &mut surface,
        &config,
        &[row(json!({ "name": "Cy" }))],
        &mut archive,
    )
    .await
    .unwrap();

    assert_eq!(archive.names(), vec!["Cy_001.jpeg"]);
    let bytes = archive.get("Cy_001.jpeg").unwrap();
    assert_eq!(detect_format(bytes).unwrap(), ImageFormat::Jpeg);
}

#[tokio::test]
async fn test_export_records_failures_and_continues() {
    let mut config = name_card();
    config.canvas.height = 0;
    let rows = vec![row(json!({ "name": "A" })), row(json!({ "name": "B" }))];
    let renderer = CardRenderer::new(MemoryImageLoader::new());
    let mut surface = RecordingSurface::default();
    let mut archive = MemoryArchive::new();

    let report = export_cards(&renderer, &mut surface, &config, &rows, &mut archive)
        .await
        .unwrap();

    assert!(archive.is_empty());
    assert!(report.exported.is_empty());
    assert_eq!(
        report
            .failures
            .iter()
            .map(|f| (f.index, f.filename.as_str()))
            .collect::<Vec<_>>(),
        vec![(1, "A_001.png"), (2, "B_002.png")]
    );
}

#[tokio::test]
async fn test_export_collects_row_warnings() {
    let mut config = name_card();
    config.push_field(template::ImageField::new("{photo}", 0.0, 0.0));
    let rows = vec![
        row(json!({ "name": "A", "photo": "a.png" })),
        row(json!({ "name": "B" })),
    ];
    let renderer = CardRenderer::new(MemoryImageLoader::new());
    let mut surface = RecordingSurface::default();
    let mut archive = MemoryArchive::new();

    let report = export_cards(&renderer, &mut surface, &config, &rows, &mut archive)
        .await
        .unwrap();

    assert_eq!(archive.len(), 2);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].0, 1);
}

#[tokio::test]
async fn test_export_reports_duplicate_names_once() {
    let mut config = name_card();
    config.output.filename = "{name}".to_string();
    let rows = vec![
        row(json!({ "name": "Al" })),
        row(json!({ "name": "Bo" })),
        row(json!({ "name": "Al" })),
    ];
    let renderer = CardRenderer::new(MemoryImageLoader::new());
    let mut surface = RecordingSurface::default();
    let mut archive = MemoryArchive::new();

    let report = export_cards(&renderer, &mut surface, &config, &rows, &mut archive)
        .await
        .unwrap();

    assert_eq!(archive.names(), vec!["Al.png", "Bo.png"]);
    assert_eq!(report.exported, archive.names());
    assert_eq!(report.duplicates, vec![(3, "Al.png".to_string())]);
}

#[test]
fn test_config_roundtrip_through_exchange_format() {
    let mut config = name_card();
    config.canvas.background_image = Some("bg.png".to_string());
    config.fields[0] = TextField::new("{name}", 40.0, 80.0)
        .with_wrap_width(400.0)
        .with_line_spacing(8.0)
        .with_letter_spacing(0.5)
        .into();

    let exported = export_config_string(&config).unwrap();
    assert!(exported.contains("\"font_family\""));
    assert!(exported.contains("\"background_color\""));

    let imported = import_config(&exported).unwrap();
    assert_eq!(imported, config);
    assert_eq!(export_config_string(&imported).unwrap(), exported);
}
