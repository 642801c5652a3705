use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use rusttype::{Font, Scale, point};

use crate::foundation::error::{EpigramError, EpigramResult};

/// Pixel-measurement seam used by the layout engine.
///
/// The production implementation is [`FontData`]; tests substitute a
/// fixed-advance fake so wrapping and fitting stay deterministic without a
/// font file on disk.
pub trait TextMeasure {
    /// Pixel width of `text` rendered at `size` points.
    fn line_width(&self, text: &str, size: u32) -> f32;
    /// Advance width of a single glyph at `size` points.
    fn glyph_width(&self, c: char, size: u32) -> f32;
}

/// A parsed font file, independent of point size.
///
/// Cheap to share; scaling to a concrete size is free, so one `FontData`
/// backs every [`SizedFont`] derived from the same file.
pub struct FontData {
    font: Font<'static>,
    path: PathBuf,
}

impl std::fmt::Debug for FontData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontData")
            .field("path", &self.path)
            .field("glyph_count", &self.font.glyph_count())
            .finish()
    }
}

impl FontData {
    /// Parse a `.ttf`/`.otf` file. An unreadable or unparsable file is an
    /// unusable asset and reported as [`EpigramError::AssetNotFound`].
    pub fn load(path: &Path) -> EpigramResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            EpigramError::asset_not_found(format!("cannot read font {}: {e}", path.display()))
        })?;
        let font = Font::try_from_vec(bytes).ok_or_else(|| {
            EpigramError::asset_not_found(format!("unusable font data in {}", path.display()))
        })?;
        Ok(Self {
            font,
            path: path.to_path_buf(),
        })
    }

    /// Source path of the font file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn font(&self) -> &Font<'static> {
        &self.font
    }
}

impl TextMeasure for FontData {
    fn line_width(&self, text: &str, size: u32) -> f32 {
        let scale = Scale::uniform(size as f32);
        let mut width = 0.0f32;
        for glyph in self.font.layout(text, scale, point(0.0, 0.0)) {
            width = glyph.position().x + glyph.unpositioned().h_metrics().advance_width;
        }
        width
    }

    fn glyph_width(&self, c: char, size: u32) -> f32 {
        self.font
            .glyph(c)
            .scaled(Scale::uniform(size as f32))
            .h_metrics()
            .advance_width
    }
}

/// Glyph-rendering handle for one (font file, point size) pair.
#[derive(Clone, Debug)]
pub struct SizedFont {
    data: Arc<FontData>,
    size: u32,
}

impl SizedFont {
    /// Bind `data` to a concrete point size.
    pub fn new(data: Arc<FontData>, size: u32) -> Self {
        Self { data, size }
    }

    /// Point size of this handle.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Distance from the top of a line to the baseline.
    pub fn ascent(&self) -> f32 {
        self.data.font.v_metrics(self.scale()).ascent
    }

    /// Full line height (ascent plus descent).
    pub fn line_height(&self) -> f32 {
        let m = self.data.font.v_metrics(self.scale());
        m.ascent - m.descent
    }

    /// Pixel width of `text` at this handle's size.
    pub fn line_width(&self, text: &str) -> f32 {
        self.data.line_width(text, self.size)
    }

    /// The backing parsed font file, usable as a [`TextMeasure`].
    pub fn font_data(&self) -> &FontData {
        &self.data
    }

    pub(crate) fn scale(&self) -> Scale {
        Scale::uniform(self.size as f32)
    }

    pub(crate) fn font(&self) -> &Font<'static> {
        self.data.font()
    }
}

/// Owned font cache: (path, size) → [`SizedFont`] handle, backed by a
/// per-path [`FontData`] cache so each file is read and parsed once.
///
/// Unbounded by policy — the key space is small (one font directory, a
/// handful of derived sizes per render). Lifetime = generator instance.
#[derive(Debug, Default)]
pub struct FontStore {
    data: Mutex<HashMap<PathBuf, Arc<FontData>>>,
    sized: Mutex<HashMap<(PathBuf, u32), Arc<SizedFont>>>,
    parses: AtomicU64,
}

impl FontStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch (or load and cache) the parsed font for `path`.
    pub fn data(&self, path: &Path) -> EpigramResult<Arc<FontData>> {
        let mut cache = self
            .data
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(data) = cache.get(path) {
            return Ok(Arc::clone(data));
        }
        let data = Arc::new(FontData::load(path)?);
        self.parses.fetch_add(1, Ordering::Relaxed);
        cache.insert(path.to_path_buf(), Arc::clone(&data));
        Ok(data)
    }

    /// Fetch (or build and cache) the sized handle for `(path, size)`.
    pub fn sized(&self, path: &Path, size: u32) -> EpigramResult<Arc<SizedFont>> {
        {
            let cache = self
                .sized
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if let Some(handle) = cache.get(&(path.to_path_buf(), size)) {
                return Ok(Arc::clone(handle));
            }
        }
        let data = self.data(path)?;
        let handle = Arc::new(SizedFont::new(data, size));
        let mut cache = self
            .sized
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(Arc::clone(
            cache
                .entry((path.to_path_buf(), size))
                .or_insert_with(|| Arc::clone(&handle)),
        ))
    }

    /// Number of font files parsed so far (cache misses on the path level).
    pub fn parse_count(&self) -> u64 {
        self.parses.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/font.rs"]
mod tests;
