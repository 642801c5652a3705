use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use rand::seq::SliceRandom;

use crate::foundation::error::{EpigramError, EpigramResult};

const BACKGROUND_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];
const FONT_EXTENSIONS: &[&str] = &["ttf", "otf"];

/// Resolves available font and background files from two asset directories.
///
/// The directory listing is computed once and cached for the provider's
/// lifetime; the uniform random pick happens fresh on every call, so
/// consecutive renders can use different assets while never re-reading the
/// directory.
#[derive(Debug)]
pub struct AssetProvider {
    fonts_dir: PathBuf,
    backgrounds_dir: PathBuf,
    fonts: Mutex<Option<Arc<Vec<PathBuf>>>>,
    backgrounds: Mutex<Option<Arc<Vec<PathBuf>>>>,
}

impl AssetProvider {
    /// Create a provider over a font directory and a background directory.
    pub fn new(fonts_dir: impl Into<PathBuf>, backgrounds_dir: impl Into<PathBuf>) -> Self {
        Self {
            fonts_dir: fonts_dir.into(),
            backgrounds_dir: backgrounds_dir.into(),
            fonts: Mutex::new(None),
            backgrounds: Mutex::new(None),
        }
    }

    /// The cached listing of usable background images (`.png/.jpg/.jpeg`).
    pub fn backgrounds(&self) -> EpigramResult<Arc<Vec<PathBuf>>> {
        cached_listing(
            &self.backgrounds,
            &self.backgrounds_dir,
            BACKGROUND_EXTENSIONS,
            "background image",
        )
    }

    /// The cached listing of usable font files (`.ttf/.otf`).
    pub fn fonts(&self) -> EpigramResult<Arc<Vec<PathBuf>>> {
        cached_listing(&self.fonts, &self.fonts_dir, FONT_EXTENSIONS, "font")
    }

    /// Pick a background uniformly at random from the cached listing.
    pub fn pick_background(&self) -> EpigramResult<PathBuf> {
        pick(&self.backgrounds()?, &self.backgrounds_dir, "background image")
    }

    /// Pick a font uniformly at random from the cached listing.
    pub fn pick_font(&self) -> EpigramResult<PathBuf> {
        pick(&self.fonts()?, &self.fonts_dir, "font")
    }
}

fn pick(listing: &[PathBuf], dir: &Path, what: &str) -> EpigramResult<PathBuf> {
    listing
        .choose(&mut rand::thread_rng())
        .cloned()
        .ok_or_else(|| {
            EpigramError::asset_not_found(format!("no {what} files in {}", dir.display()))
        })
}

fn cached_listing(
    slot: &Mutex<Option<Arc<Vec<PathBuf>>>>,
    dir: &Path,
    extensions: &[&str],
    what: &str,
) -> EpigramResult<Arc<Vec<PathBuf>>> {
    let mut guard = slot.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    if let Some(listing) = guard.as_ref() {
        return Ok(Arc::clone(listing));
    }
    let listing = Arc::new(list_dir(dir, extensions, what)?);
    *guard = Some(Arc::clone(&listing));
    Ok(listing)
}

fn list_dir(dir: &Path, extensions: &[&str], what: &str) -> EpigramResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        EpigramError::asset_not_found(format!("cannot read {what} dir {}: {e}", dir.display()))
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            EpigramError::asset_not_found(format!("cannot read {what} dir {}: {e}", dir.display()))
        })?;
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                let ext = ext.to_ascii_lowercase();
                extensions.iter().any(|allowed| *allowed == ext)
            });
        if matches && path.is_file() {
            paths.push(path);
        }
    }
    if paths.is_empty() {
        return Err(EpigramError::asset_not_found(format!(
            "no {what} files in {}",
            dir.display()
        )));
    }
    // Stable order so the uniform pick is over a deterministic set.
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/provider.rs"]
mod tests;
