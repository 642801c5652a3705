use std::sync::Mutex;

use anyhow::Context;
use image::{DynamicImage, Rgba, RgbaImage, imageops::FilterType};

use crate::cache::gradient::{GradientCache, GradientDirection, GradientKey};
use crate::foundation::error::{EpigramError, EpigramResult};
use crate::foundation::math::{blend_over, clamp_channel, luma_u8};
use crate::style::StyleConfig;

/// Open and decode a background image file.
pub(crate) fn open_background(path: &std::path::Path) -> EpigramResult<DynamicImage> {
    image::open(path)
        .with_context(|| format!("open background {}", path.display()))
        .map_err(EpigramError::image_load)
}

/// Build the enhanced, blurred, overlaid background for one render.
///
/// Stages, in order: exact-stretch resize to the output size, contrast /
/// brightness / saturation per the style's enhancement profile, Gaussian
/// blur, flat black overlay at the style's overlay opacity, and (when
/// enabled) the cached vertical gradient overlay. Rounded-corner masking is
/// applied by the generator after text composition so text never re-fills
/// masked pixels.
#[tracing::instrument(skip(source, style, gradients))]
pub(crate) fn prepare(
    source: DynamicImage,
    width: u32,
    height: u32,
    style: &StyleConfig,
    gradients: &Mutex<GradientCache>,
) -> EpigramResult<RgbaImage> {
    // Stretch: aspect ratio intentionally not preserved.
    let mut img = source.resize_exact(width, height, FilterType::Lanczos3).to_rgba8();

    let profile = style.enhance;
    apply_contrast(&mut img, profile.contrast());
    apply_brightness(&mut img, profile.brightness());
    apply_saturation(&mut img, profile.saturation());

    img = super::blur::gaussian_blur(&img, profile.blur_radius());

    apply_flat_overlay(&mut img, style.overlay_opacity);

    if style.gradient_overlay {
        let key = GradientKey {
            width,
            height,
            direction: GradientDirection::Vertical,
            start: [0, 0, 0, 0],
            end: [0, 0, 0, profile.gradient_opacity()],
        };
        let overlay = gradients
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get_or_build(key);
        apply_overlay(&mut img, &overlay);
    }

    Ok(img)
}

/// Contrast about the image's mean luminance: each channel is interpolated
/// between the mean and its original value by `factor`. A uniform image is
/// a fixed point.
pub(crate) fn apply_contrast(img: &mut RgbaImage, factor: f32) {
    let mut sum = 0u64;
    for px in img.pixels() {
        sum += u64::from(luma_u8(px.0[0], px.0[1], px.0[2]));
    }
    let count = (img.width() as u64 * img.height() as u64).max(1);
    let mean = (sum / count) as f32;
    for px in img.pixels_mut() {
        for c in 0..3 {
            px.0[c] = clamp_channel(mean + (px.0[c] as f32 - mean) * factor);
        }
    }
}

/// Channel-wise brightness multiplier.
pub(crate) fn apply_brightness(img: &mut RgbaImage, factor: f32) {
    for px in img.pixels_mut() {
        for c in 0..3 {
            px.0[c] = clamp_channel(px.0[c] as f32 * factor);
        }
    }
}

/// Saturation about the per-pixel gray value: each channel is interpolated
/// between the pixel's luminance and its original value by `factor`. Gray
/// pixels are fixed points.
pub(crate) fn apply_saturation(img: &mut RgbaImage, factor: f32) {
    for px in img.pixels_mut() {
        let gray = luma_u8(px.0[0], px.0[1], px.0[2]) as f32;
        for c in 0..3 {
            px.0[c] = clamp_channel(gray + (px.0[c] as f32 - gray) * factor);
        }
    }
}

/// Composite a flat black layer at `opacity` over the whole image.
pub(crate) fn apply_flat_overlay(img: &mut RgbaImage, opacity: u8) {
    if opacity == 0 {
        return;
    }
    let overlay = Rgba([0, 0, 0, opacity]);
    for px in img.pixels_mut() {
        blend_over(px, overlay);
    }
}

/// Composite a same-sized overlay bitmap over the whole image.
pub(crate) fn apply_overlay(img: &mut RgbaImage, overlay: &RgbaImage) {
    debug_assert_eq!(img.dimensions(), overlay.dimensions());
    for (px, src) in img.pixels_mut().zip(overlay.pixels()) {
        blend_over(px, *src);
    }
}

/// Zero the alpha channel outside a rounded rectangle covering the image.
pub(crate) fn apply_rounded_corners(img: &mut RgbaImage, radius: u32) {
    if radius == 0 {
        return;
    }
    let (width, height) = img.dimensions();
    let w = width as i64;
    let h = height as i64;
    let r = i64::from(radius).min(w / 2).min(h / 2);
    for (x, y, px) in img.enumerate_pixels_mut() {
        if !rounded_rect_contains(i64::from(x), i64::from(y), w, h, r) {
            px.0[3] = 0;
        }
    }
}

/// Membership test for a rounded rectangle of size `w` × `h` with corner
/// radius `r`.
fn rounded_rect_contains(x: i64, y: i64, w: i64, h: i64, r: i64) -> bool {
    if x >= r && x < w - r {
        return true;
    }
    if y >= r && y < h - r {
        return true;
    }
    let cx = if x < r { r - 1 } else { w - r };
    let cy = if y < r { r - 1 } else { h - r };
    let dx = x - cx;
    let dy = y - cy;
    dx * dx + dy * dy <= r * r
}

#[cfg(test)]
#[path = "../../tests/unit/render/background.rs"]
mod tests;
