//! Epigram is a quote-image compositing engine.
//!
//! Given a text quote, an optional author and a style configuration, the
//! engine produces a finished raster image: an enhanced, blurred and
//! overlaid background, fitted typography with shadow/outline effects, and
//! a watermark.
//!
//! # Pipeline overview
//!
//! 1. **Resolve**: a [`StyleSpec`] (preset name or explicit config) becomes
//!    a concrete [`StyleConfig`]
//! 2. **Prepare**: background and font preparation run as two concurrent
//!    tasks on the generator's worker pool, joined before layout
//! 3. **Layout**: greedy word wrap plus a linear font-size descent picks the
//!    largest size that fits the canvas
//! 4. **Compose**: each text block (quote mark, wrapped lines, author,
//!    watermark) is rendered into a private tile on the pool, then merged
//!    onto the canvas by a single sequential compositing step
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic composition**: tile merge order is block order, so the
//!   final image is independent of worker scheduling.
//! - **Fail-fast**: the first stage failure aborts the render; no partial
//!   image or output file is ever produced.
//! - **Owned caches**: font handles, gradient overlays and directory
//!   listings are memoized in fields owned by the [`Generator`] instance,
//!   never in globals.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod cache;
mod foundation;
mod generator;
mod layout;
mod render;
mod style;

pub use assets::font::{FontData, FontStore, SizedFont, TextMeasure};
pub use assets::provider::AssetProvider;
pub use cache::gradient::{GradientCache, GradientDirection, GradientKey};
pub use foundation::error::{EpigramError, EpigramResult};
pub use generator::{Generator, GeneratorOptions, QuoteRequest};
pub use layout::engine::{
    FONT_FLOOR, FONT_STEP, QuoteLayout, approx_chars_per_line, fit_font_size, plan_quote, wrap,
};
pub use render::effects::draw_text_with_effects;
pub use style::{EnhanceProfile, StyleConfig, StyleSpec};
