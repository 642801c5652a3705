use std::sync::Arc;

use image::{Rgba, RgbaImage};
use rayon::prelude::*;

use crate::assets::font::SizedFont;
use crate::foundation::error::{EpigramError, EpigramResult};
use crate::layout::engine::QuoteLayout;
use crate::render::canvas::{Tile, blit_over, draw_text};
use crate::style::StyleConfig;

/// Radius of the solid-black outline ring (all 5×5 offsets but the origin).
const OUTLINE_RADIUS: i32 = 2;
/// Size of the decorative quotation mark relative to the quote font.
const QUOTE_MARK_SCALE: f32 = 2.5;
/// Vertical gap between the quote block and the author line.
const AUTHOR_GAP: u32 = 30;
/// Shadow copies for the author line and the quotation mark.
const ACCENT_SHADOW_STRENGTH: u32 = 3;
/// Branding string drawn in the bottom-right corner of every image.
const WATERMARK_TEXT: &str = "Powered by Epigram";
/// Canvas margin around the watermark.
const WATERMARK_MARGIN: u32 = 20;
/// Smallest watermark point size.
const WATERMARK_MIN_SIZE: u32 = 12;

/// One positioned piece of text with its effect parameters.
#[derive(Clone, Debug)]
pub(crate) struct TextBlock {
    pub text: String,
    pub font: Arc<SizedFont>,
    /// Canvas position of the text's top-left corner.
    pub x: i64,
    pub y: i64,
    pub fill: Rgba<u8>,
    pub shadow: Rgba<u8>,
    pub shadow_strength: u32,
}

/// Derive the sizes of the helper fonts from the fitted quote size.
pub(crate) fn author_font_size(quote_size: u32) -> u32 {
    (quote_size / 2).max(1)
}

pub(crate) fn quote_mark_font_size(quote_size: u32) -> u32 {
    ((quote_size as f32 * QUOTE_MARK_SCALE) as u32).max(1)
}

pub(crate) fn watermark_font_size(quote_size: u32) -> u32 {
    (quote_size / 5).max(WATERMARK_MIN_SIZE)
}

/// Fonts used by one composition, all from the same font file.
pub(crate) struct ComposeFonts {
    pub quote: Arc<SizedFont>,
    pub author: Arc<SizedFont>,
    pub mark: Arc<SizedFont>,
    pub watermark: Arc<SizedFont>,
}

/// Build the ordered block list for one render: quotation mark, wrapped
/// quote lines, optional author line, watermark. The order is the merge
/// order, so it also fixes stacking.
pub(crate) fn quote_blocks(
    layout: &QuoteLayout,
    fonts: &ComposeFonts,
    author: Option<&str>,
    width: u32,
    height: u32,
    style: &StyleConfig,
    fill: [u8; 3],
) -> Vec<TextBlock> {
    let fill = Rgba([fill[0], fill[1], fill[2], 255]);
    let shadow = Rgba([0, 0, 0, style.shadow_opacity]);
    let mut blocks = Vec::with_capacity(layout.lines.len() + 3);

    blocks.push(TextBlock {
        text: "\"".to_string(),
        font: Arc::clone(&fonts.mark),
        x: i64::from(width / 8),
        y: i64::from(height / 6),
        fill,
        shadow,
        shadow_strength: ACCENT_SHADOW_STRENGTH,
    });

    for (idx, line) in layout.lines.iter().enumerate() {
        let line_width = fonts.quote.line_width(line);
        let x = (width as f32 - line_width) / 2.0;
        blocks.push(TextBlock {
            text: line.clone(),
            font: Arc::clone(&fonts.quote),
            x: x as i64,
            y: i64::from(layout.line_y(idx)),
            fill,
            shadow,
            shadow_strength: style.shadow_strength,
        });
    }

    if let Some(author) = author {
        let text = format!("— {author}");
        let author_width = fonts.author.line_width(&text);
        // Right of center: the line is centered on 60% of the canvas width.
        let x = width as f32 * 0.6 - author_width / 2.0;
        blocks.push(TextBlock {
            text,
            font: Arc::clone(&fonts.author),
            x: x as i64,
            y: i64::from(layout.block_end_y() + AUTHOR_GAP),
            fill,
            shadow,
            shadow_strength: ACCENT_SHADOW_STRENGTH,
        });
    }

    let wm_width = fonts.watermark.line_width(WATERMARK_TEXT);
    blocks.push(TextBlock {
        text: WATERMARK_TEXT.to_string(),
        font: Arc::clone(&fonts.watermark),
        x: i64::from(width) - wm_width as i64 - i64::from(WATERMARK_MARGIN),
        y: i64::from(height) - i64::from(fonts.watermark.size()) - i64::from(WATERMARK_MARGIN),
        fill: Rgba([200, 200, 200, 255]),
        shadow: Rgba([0, 0, 0, 150]),
        shadow_strength: 1,
    });

    blocks
}

/// Render one block into its private tile.
///
/// Draw order inside the tile: `shadow_strength` diagonal shadow copies at
/// offsets (i, i), the solid-black outline ring, then the main fill. The
/// tile carries an effect margin so offsets never clip.
pub(crate) fn render_tile(block: &TextBlock) -> EpigramResult<Option<Tile>> {
    if block.text.trim().is_empty() {
        return Ok(None);
    }
    let margin = OUTLINE_RADIUS as u32 + block.shadow_strength;
    let text_width = block.font.line_width(&block.text).ceil() as u32;
    let text_height = block.font.line_height().ceil() as u32;
    let tile_width = text_width
        .checked_add(2 * margin + 2)
        .ok_or_else(|| EpigramError::layout("text block exceeds canvas limits"))?;
    let tile_height = text_height
        .checked_add(2 * margin + 2)
        .ok_or_else(|| EpigramError::layout("text block exceeds canvas limits"))?;

    let mut image = RgbaImage::new(tile_width, tile_height);
    let origin = margin as f32;

    for i in 1..=block.shadow_strength as i32 {
        draw_text(
            &mut image,
            origin + i as f32,
            origin + i as f32,
            &block.text,
            &block.font,
            block.shadow,
        );
    }
    for dx in -OUTLINE_RADIUS..=OUTLINE_RADIUS {
        for dy in -OUTLINE_RADIUS..=OUTLINE_RADIUS {
            if dx == 0 && dy == 0 {
                continue;
            }
            draw_text(
                &mut image,
                origin + dx as f32,
                origin + dy as f32,
                &block.text,
                &block.font,
                Rgba([0, 0, 0, 255]),
            );
        }
    }
    draw_text(&mut image, origin, origin, &block.text, &block.font, block.fill);

    Ok(Some(Tile {
        x: block.x - i64::from(margin),
        y: block.y - i64::from(margin),
        image,
    }))
}

/// Render every block into its tile on the worker pool, then merge the
/// tiles onto the canvas in block order.
///
/// The fan-out blocks until every tile completes; the first tile failure
/// aborts the whole composition. Because tiles are private buffers and the
/// merge is sequential, the final image is independent of worker
/// scheduling.
pub(crate) fn compose(
    canvas: &mut RgbaImage,
    blocks: &[TextBlock],
    pool: &rayon::ThreadPool,
) -> EpigramResult<()> {
    let tiles = pool.install(|| {
        blocks
            .par_iter()
            .map(render_tile)
            .collect::<EpigramResult<Vec<_>>>()
    })?;
    for tile in tiles.into_iter().flatten() {
        blit_over(canvas, &tile);
    }
    Ok(())
}

/// Draw `text` onto `canvas` at `(x, y)` with the full shadow/outline/fill
/// effect stack.
///
/// Convenience single-block form of the tile pipeline; the effect sub-draws
/// target a private tile which is merged onto the canvas in one step.
pub fn draw_text_with_effects(
    canvas: &mut RgbaImage,
    x: i64,
    y: i64,
    text: &str,
    font: &SizedFont,
    fill: Rgba<u8>,
    shadow: Rgba<u8>,
    shadow_strength: u32,
) -> EpigramResult<()> {
    let block = TextBlock {
        text: text.to_string(),
        font: Arc::new(font.clone()),
        x,
        y,
        fill,
        shadow,
        shadow_strength: shadow_strength.max(1),
    };
    if let Some(tile) = render_tile(&block)? {
        blit_over(canvas, &tile);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/effects.rs"]
mod tests;
