use image::{Rgba, RgbaImage};
use rusttype::point;

use crate::assets::font::SizedFont;
use crate::foundation::math::{blend_over, mul_div255_u8};

/// A private sub-buffer rendered by one worker task.
///
/// Tiles own their pixels, so parallel text rendering never shares a
/// mutable surface; the canvas is mutated only by the sequential
/// [`blit_over`] merge.
#[derive(Debug)]
pub(crate) struct Tile {
    /// Canvas position of the tile's top-left corner. May be negative when
    /// an effect margin extends past the canvas edge; blitting clips.
    pub x: i64,
    pub y: i64,
    pub image: RgbaImage,
}

/// Draw one line of text into `img` with its top-left at `(x, y)`.
///
/// Glyph coverage is scaled by the fill color's alpha and blended
/// source-over; pixels outside the buffer are clipped.
pub(crate) fn draw_text(img: &mut RgbaImage, x: f32, y: f32, text: &str, font: &SizedFont, color: Rgba<u8>) {
    let scale = font.scale();
    let baseline = y + font.ascent();
    let (width, height) = img.dimensions();

    for glyph in font.font().layout(text, scale, point(x, baseline)) {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, coverage| {
            let px = gx as i64 + i64::from(bb.min.x);
            let py = gy as i64 + i64::from(bb.min.y);
            if px < 0 || py < 0 || px >= i64::from(width) || py >= i64::from(height) {
                return;
            }
            let alpha = mul_div255_u8((coverage * 255.0) as u16, u16::from(color.0[3]));
            if alpha == 0 {
                return;
            }
            let src = Rgba([color.0[0], color.0[1], color.0[2], alpha]);
            blend_over(img.get_pixel_mut(px as u32, py as u32), src);
        });
    }
}

/// Merge a tile onto the canvas with source-over blending, clipping at the
/// canvas borders.
pub(crate) fn blit_over(canvas: &mut RgbaImage, tile: &Tile) {
    let (cw, ch) = canvas.dimensions();
    for (tx, ty, src) in tile.image.enumerate_pixels() {
        if src.0[3] == 0 {
            continue;
        }
        let px = tile.x + i64::from(tx);
        let py = tile.y + i64::from(ty);
        if px < 0 || py < 0 || px >= i64::from(cw) || py >= i64::from(ch) {
            continue;
        }
        blend_over(canvas.get_pixel_mut(px as u32, py as u32), *src);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/canvas.rs"]
mod tests;
