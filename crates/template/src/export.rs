//! Batch export: one encoded image per row

use crate::canvas::CardRenderer;
use crate::images::ImageLoader;
use crate::renderer::Warning;
use crate::schema::{CardConfig, OutputConfig, Row};
use crate::substitute::{resolve_with, MissingKey};
use crate::Result;
use card_core::Surface;
use std::path::{Path, PathBuf};

/// Receives finished files
pub trait ArchiveSink {
    /// Store one file; a file with the same name is replaced
    fn add(&mut self, filename: &str, bytes: Vec<u8>) -> Result<()>;

    /// Called once after the last file
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Keeps files in memory, in the order they were added
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    entries: Vec<(String, Vec<u8>)>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn get(&self, filename: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(name, _)| name == filename)
            .map(|(_, bytes)| bytes.as_slice())
    }

    pub fn into_entries(self) -> Vec<(String, Vec<u8>)> {
        self.entries
    }
}

impl ArchiveSink for MemoryArchive {
    fn add(&mut self, filename: &str, bytes: Vec<u8>) -> Result<()> {
        match self.entries.iter_mut().find(|(name, _)| name == filename) {
            Some(entry) => entry.1 = bytes,
            None => self.entries.push((filename.to_string(), bytes)),
        }
        Ok(())
    }
}

/// Writes files into a directory, creating it on first use
#[derive(Debug, Clone)]
pub struct DirectoryArchive {
    directory: PathBuf,
}

impl DirectoryArchive {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Archive for `output.directory`, relative to `base`
    pub fn for_output(base: &Path, output: &OutputConfig) -> Self {
        Self::new(base.join(&output.directory))
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl ArchiveSink for DirectoryArchive {
    fn add(&mut self, filename: &str, bytes: Vec<u8>) -> Result<()> {
        std::fs::create_dir_all(&self.directory)?;
        std::fs::write(self.directory.join(filename), bytes)?;
        Ok(())
    }
}

/// File stem for row `index`
///
/// The filename template is resolved like any field. An unresolved or empty
/// result falls back to `card_{index}`. Path separators are replaced so every
/// file lands directly in the archive.
pub fn output_filename(template: &str, row: &Row, index: usize, missing: MissingKey) -> String {
    match resolve_with(template, row, index, missing).filter(|s| !s.is_empty()) {
        Some(stem) => stem
            .chars()
            .map(|c| match c {
                '/' | '\\' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect(),
        None => format!("card_{index}"),
    }
}

/// A row that produced no file
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFailure {
    /// 1-based row index
    pub index: usize,
    pub filename: String,
    pub reason: String,
}

/// Outcome of a batch export
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportReport {
    /// Distinct files handed to the archive, in row order
    pub exported: Vec<String>,
    pub failures: Vec<ExportFailure>,
    /// Render warnings, tagged with the 1-based row index
    pub warnings: Vec<(usize, Warning)>,
    /// Rows whose file replaced an earlier row's file of the same name
    pub duplicates: Vec<(usize, String)>,
}

/// Render, encode and archive every row in order
///
/// Rows are strictly serial: each one is fully archived before the next is
/// rendered. A row whose surface cannot be sized or encoded is recorded in
/// [`ExportReport::failures`] and the batch continues. Archive errors stop
/// the batch.
pub async fn export_cards<L, S, A>(
    renderer: &CardRenderer<L>,
    surface: &mut S,
    config: &CardConfig,
    rows: &[Row],
    archive: &mut A,
) -> Result<ExportReport>
where
    L: ImageLoader,
    S: Surface,
    A: ArchiveSink + ?Sized,
{
    export_cards_with_progress(renderer, surface, config, rows, archive, |_, _| {}).await
}

/// [`export_cards`], calling `on_progress(done, total)` after every row
pub async fn export_cards_with_progress<L, S, A>(
    renderer: &CardRenderer<L>,
    surface: &mut S,
    config: &CardConfig,
    rows: &[Row],
    archive: &mut A,
    mut on_progress: impl FnMut(usize, usize),
) -> Result<ExportReport>
where
    L: ImageLoader,
    S: Surface,
    A: ArchiveSink + ?Sized,
{
    let encoding = config.output.format.encoding();
    let missing = renderer.options().missing_key;
    let mut report = ExportReport::default();

    for (i, row) in rows.iter().enumerate() {
        let index = i + 1;
        let stem = output_filename(&config.output.filename, row, index, missing);
        let filename = format!("{stem}.{}", encoding.extension());

        let encoded = match renderer.render_card(surface, config, row, index, None).await {
            Ok(rendered) => {
                report
                    .warnings
                    .extend(rendered.warnings.into_iter().map(|w| (index, w)));
                surface.encode(encoding).map_err(crate::TemplateError::from)
            }
            Err(e) => Err(e),
        };

        match encoded {
            Ok(bytes) => {
                archive.add(&filename, bytes)?;
                if report.exported.contains(&filename) {
                    log::warn!("row {index} replaced the earlier {filename}");
                    report.duplicates.push((index, filename));
                } else {
                    log::debug!("exported row {index} as {filename}");
                    report.exported.push(filename);
                }
            }
            Err(e) => {
                log::warn!("row {index} ({filename}) not exported: {e}");
                report.failures.push(ExportFailure {
                    index,
                    filename,
                    reason: e.to_string(),
                });
            }
        }

        on_progress(index, rows.len());
    }

    archive.finish()?;
    Ok(report)
}
