use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use anyhow::Context;

use crate::assets::font::{FontData, FontStore};
use crate::assets::provider::AssetProvider;
use crate::cache::gradient::GradientCache;
use crate::foundation::error::{EpigramError, EpigramResult};
use crate::layout::engine;
use crate::render::{background, effects};
use crate::style::StyleSpec;

/// Default output size when a request does not name one.
const DEFAULT_OUTPUT_SIZE: (u32, u32) = (1080, 1080);
/// Workers in the generator's bounded drawing pool.
const DEFAULT_WORKERS: usize = 4;
/// Rounded-corner radius as a fraction of the smaller canvas dimension.
const CORNER_RADIUS_FRACTION: f32 = 0.05;

/// Construction options for a [`Generator`].
#[derive(Clone, Debug)]
pub struct GeneratorOptions {
    fonts_dir: PathBuf,
    backgrounds_dir: PathBuf,
    workers: usize,
}

impl GeneratorOptions {
    /// Options over a font directory (`.ttf/.otf`) and a background image
    /// directory (`.png/.jpg/.jpeg`).
    pub fn new(fonts_dir: impl Into<PathBuf>, backgrounds_dir: impl Into<PathBuf>) -> Self {
        Self {
            fonts_dir: fonts_dir.into(),
            backgrounds_dir: backgrounds_dir.into(),
            workers: DEFAULT_WORKERS,
        }
    }

    /// Override the worker pool size (default 4, minimum 1).
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }
}

/// One quote-image request.
///
/// Only the quote text is mandatory; everything else has a default or is
/// resolved from the style and the generator's asset directories.
#[derive(Clone, Debug)]
pub struct QuoteRequest {
    quote: String,
    author: Option<String>,
    width: u32,
    height: u32,
    font_path: Option<PathBuf>,
    font_size: Option<u32>,
    text_color: Option<[u8; 3]>,
    background: Option<PathBuf>,
    style: StyleSpec,
}

impl QuoteRequest {
    /// A request for `quote` at the default 1080×1080 size in the `modern`
    /// style.
    pub fn new(quote: impl Into<String>) -> Self {
        Self {
            quote: quote.into(),
            author: None,
            width: DEFAULT_OUTPUT_SIZE.0,
            height: DEFAULT_OUTPUT_SIZE.1,
            font_path: None,
            font_size: None,
            text_color: None,
            background: None,
            style: StyleSpec::default(),
        }
    }

    /// Attribute the quote; rendered as `— author` below the quote block.
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Output size in pixels.
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Use a specific font file instead of a random pick.
    pub fn font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_path = Some(path.into());
        self
    }

    /// Override the style's initial font size.
    pub fn font_size(mut self, size: u32) -> Self {
        self.font_size = Some(size);
        self
    }

    /// Override the style's text color.
    pub fn text_color(mut self, color: [u8; 3]) -> Self {
        self.text_color = Some(color);
        self
    }

    /// Use a specific background image instead of a random pick.
    pub fn background(mut self, path: impl Into<PathBuf>) -> Self {
        self.background = Some(path.into());
        self
    }

    /// Style preset name or explicit configuration.
    pub fn style(mut self, style: impl Into<StyleSpec>) -> Self {
        self.style = style.into();
        self
    }

    /// The quote text.
    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// The requested output size.
    pub fn output_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn validate(&self) -> EpigramResult<()> {
        if self.quote.split_whitespace().next().is_none() {
            return Err(EpigramError::layout("quote text must be non-empty"));
        }
        if self.width == 0 || self.height == 0 {
            return Err(EpigramError::layout(format!(
                "output size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Quote-image generator: owns the asset directories, the font and
/// gradient caches, and a bounded drawing pool shared by every render.
///
/// Dropping the generator drops the pool, which joins its workers after
/// queued tasks drain — in-flight drawing is never silently discarded.
pub struct Generator {
    assets: AssetProvider,
    fonts: FontStore,
    gradients: Mutex<GradientCache>,
    pool: rayon::ThreadPool,
}

impl Generator {
    /// Build a generator. Fails with [`EpigramError::Render`] when the
    /// worker pool cannot be constructed.
    pub fn new(options: GeneratorOptions) -> EpigramResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.workers)
            .build()
            .context("build drawing worker pool")
            .map_err(EpigramError::render)?;
        Ok(Self {
            assets: AssetProvider::new(options.fonts_dir, options.backgrounds_dir),
            fonts: FontStore::new(),
            gradients: Mutex::new(GradientCache::new()),
            pool,
        })
    }

    /// The provider over this generator's asset directories.
    pub fn assets(&self) -> &AssetProvider {
        &self.assets
    }

    /// Render a finished quote image.
    ///
    /// Pipeline: resolve style → pick assets → background and font
    /// preparation as two concurrent pool tasks, joined before layout →
    /// fit/wrap/place the quote → compose all text blocks on the pool →
    /// optional rounded-corner mask. Fail-fast: the first stage error
    /// aborts the render and no partial image is returned. The result's
    /// dimensions always equal the requested output size.
    #[tracing::instrument(skip(self, request), fields(width = request.width, height = request.height))]
    pub fn create(&self, request: &QuoteRequest) -> EpigramResult<image::RgbaImage> {
        request.validate()?;
        let style = request.style.resolve();
        style.validate()?;

        let font_path = match &request.font_path {
            Some(path) => path.clone(),
            None => self.assets.pick_font()?,
        };
        let background_path = match &request.background {
            Some(path) => path.clone(),
            None => self.assets.pick_background()?,
        };
        let initial_size = request.font_size.unwrap_or(style.font_size);
        let fill = request.text_color.unwrap_or(style.text_color);
        let (width, height) = (request.width, request.height);

        let (background, font_data) = self.pool.install(|| {
            rayon::join(
                || -> EpigramResult<image::RgbaImage> {
                    let source = background::open_background(&background_path)?;
                    background::prepare(source, width, height, &style, &self.gradients)
                },
                || -> EpigramResult<Arc<FontData>> { self.fonts.data(&font_path) },
            )
        });
        let mut canvas = background?;
        let font_data = font_data?;

        let layout = engine::plan_quote(
            font_data.as_ref(),
            &request.quote,
            width,
            height,
            initial_size,
        )?;
        tracing::debug!(font_size = layout.font_size, lines = layout.lines.len(), "layout fitted");

        let fonts = effects::ComposeFonts {
            quote: self.fonts.sized(&font_path, layout.font_size)?,
            author: self
                .fonts
                .sized(&font_path, effects::author_font_size(layout.font_size))?,
            mark: self
                .fonts
                .sized(&font_path, effects::quote_mark_font_size(layout.font_size))?,
            watermark: self
                .fonts
                .sized(&font_path, effects::watermark_font_size(layout.font_size))?,
        };
        let blocks = effects::quote_blocks(
            &layout,
            &fonts,
            request.author.as_deref(),
            width,
            height,
            &style,
            fill,
        );
        effects::compose(&mut canvas, &blocks, &self.pool)?;

        if style.rounded_corners {
            let radius = (width.min(height) as f32 * CORNER_RADIUS_FRACTION) as u32;
            background::apply_rounded_corners(&mut canvas, radius);
        }
        Ok(canvas)
    }

    /// Render and write a quote image to `path`, returning the path.
    ///
    /// A `.jpg`/`.jpeg` extension flattens the image to three channels
    /// (alpha dropped); any other extension keeps the alpha channel
    /// produced by rounded-corner masking. Nothing is written when
    /// rendering fails.
    #[tracing::instrument(skip(self, request, path))]
    pub fn save(&self, request: &QuoteRequest, path: impl AsRef<Path>) -> EpigramResult<PathBuf> {
        let image = self.create(request)?;
        let path = path.as_ref();
        let flatten = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                let ext = ext.to_ascii_lowercase();
                ext == "jpg" || ext == "jpeg"
            });
        let write_result = if flatten {
            image::DynamicImage::ImageRgba8(image).to_rgb8().save(path)
        } else {
            image.save(path)
        };
        write_result
            .with_context(|| format!("write image to {}", path.display()))
            .map_err(EpigramError::render)?;
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
#[path = "../tests/unit/generator.rs"]
mod tests;
