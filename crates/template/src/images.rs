//! Image sources, loaders and the decode cache

use crate::{Result, TemplateError};
use card_core::{decode_data_url, decode_image};
use image::RgbaImage;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Uploaded images: a key used in templates mapped to the real source
///
/// Keys without an entry resolve to themselves, so a field can use either a
/// direct path or an upload name.
#[derive(Debug, Clone, Default)]
pub struct ImageLookup {
    entries: HashMap<String, String>,
}

impl ImageLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, source: &str) {
        self.entries.insert(key.to_string(), source.to_string());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    /// Source for `key`, falling through to `key` itself
    pub fn resolve<'a>(&'a self, key: &'a str) -> &'a str {
        self.entries.get(key).map(String::as_str).unwrap_or(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fetches the raw bytes of an image source
///
/// This is the one suspending step of rendering. Callers await loads one at
/// a time, in field order.
#[allow(async_fn_in_trait)]
pub trait ImageLoader {
    async fn load(&self, source: &str) -> Result<Vec<u8>>;
}

impl<T: ImageLoader + ?Sized> ImageLoader for &T {
    async fn load(&self, source: &str) -> Result<Vec<u8>> {
        (**self).load(source).await
    }
}

fn load_error(source: &str, reason: impl ToString) -> TemplateError {
    TemplateError::ImageLoadError {
        path: source.to_string(),
        reason: reason.to_string(),
    }
}

/// Loads files relative to a root directory, plus `data:` URLs
#[derive(Debug, Clone)]
pub struct FsImageLoader {
    root: PathBuf,
}

impl FsImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ImageLoader for FsImageLoader {
    async fn load(&self, source: &str) -> Result<Vec<u8>> {
        if let Some(decoded) = decode_data_url(source) {
            return decoded.map_err(|e| load_error(source, e));
        }

        let path = self.root.join(source);
        std::fs::read(&path).map_err(|e| load_error(source, e))
    }
}

/// Loads images registered in memory, plus `data:` URLs
#[derive(Debug, Clone, Default)]
pub struct MemoryImageLoader {
    images: HashMap<String, Vec<u8>>,
}

impl MemoryImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: &str, bytes: Vec<u8>) {
        self.images.insert(source.to_string(), bytes);
    }

    pub fn contains(&self, source: &str) -> bool {
        self.images.contains_key(source)
    }
}

impl ImageLoader for MemoryImageLoader {
    async fn load(&self, source: &str) -> Result<Vec<u8>> {
        if let Some(bytes) = self.images.get(source) {
            return Ok(bytes.clone());
        }
        match decode_data_url(source) {
            Some(decoded) => decoded.map_err(|e| load_error(source, e)),
            None => Err(load_error(source, "image not registered")),
        }
    }
}

/// Decoded images keyed by resolved source
///
/// Entries are only ever added. The cache is shared between renders (and
/// between the renderer and the bounds calculator) through an `Arc`.
#[derive(Debug, Default)]
pub struct ImageCache {
    images: RwLock<HashMap<String, Arc<RgbaImage>>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, source: &str) -> Option<Arc<RgbaImage>> {
        let images = self.images.read().unwrap_or_else(PoisonError::into_inner);
        images.get(source).cloned()
    }

    /// Intrinsic size of an already decoded image
    pub fn dimensions(&self, source: &str) -> Option<(u32, u32)> {
        self.get(source).map(|image| image.dimensions())
    }

    pub fn contains(&self, source: &str) -> bool {
        let images = self.images.read().unwrap_or_else(PoisonError::into_inner);
        images.contains_key(source)
    }

    /// Store a decoded image; an existing entry for `source` is kept
    pub fn insert(&self, source: &str, image: RgbaImage) -> Arc<RgbaImage> {
        let mut images = self.images.write().unwrap_or_else(PoisonError::into_inner);
        images
            .entry(source.to_string())
            .or_insert_with(|| Arc::new(image))
            .clone()
    }

    pub fn len(&self) -> usize {
        let images = self.images.read().unwrap_or_else(PoisonError::into_inner);
        images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached image for `source`, loading and decoding it on a miss
    pub async fn load<L: ImageLoader + ?Sized>(
        &self,
        loader: &L,
        source: &str,
    ) -> Result<Arc<RgbaImage>> {
        if let Some(image) = self.get(source) {
            log::debug!("image cache hit: {source}");
            return Ok(image);
        }

        let bytes = loader.load(source).await?;
        let image = decode_image(&bytes).map_err(|e| load_error(source, e))?;
        Ok(self.insert(source, image))
    }
}
