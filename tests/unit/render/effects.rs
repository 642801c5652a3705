use super::*;

use std::path::{Path, PathBuf};

use crate::assets::font::FontData;
use crate::layout::engine::plan_quote;

fn system_font() -> Option<PathBuf> {
    let roots = [
        "/usr/share/fonts",
        "/usr/local/share/fonts",
        "/Library/Fonts",
        "/System/Library/Fonts",
        "C:\\Windows\\Fonts",
    ];
    fn walk(dir: &Path, found: &mut Option<PathBuf>) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            if found.is_some() {
                return;
            }
            let path = entry.path();
            if path.is_dir() {
                walk(&path, found);
            } else {
                let ext = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e.to_ascii_lowercase());
                if matches!(ext.as_deref(), Some("ttf" | "otf"))
                    && FontData::load(&path).is_ok()
                {
                    *found = Some(path);
                }
            }
        }
    }
    let mut found = None;
    for root in roots {
        walk(Path::new(root), &mut found);
        if found.is_some() {
            break;
        }
    }
    found
}

fn test_fonts(size: u32) -> Option<ComposeFonts> {
    let path = system_font()?;
    let data = Arc::new(FontData::load(&path).ok()?);
    Some(ComposeFonts {
        quote: Arc::new(SizedFont::new(Arc::clone(&data), size)),
        author: Arc::new(SizedFont::new(Arc::clone(&data), author_font_size(size))),
        mark: Arc::new(SizedFont::new(Arc::clone(&data), quote_mark_font_size(size))),
        watermark: Arc::new(SizedFont::new(data, watermark_font_size(size))),
    })
}

#[test]
fn derived_font_sizes_follow_the_quote_size() {
    assert_eq!(author_font_size(90), 45);
    assert_eq!(quote_mark_font_size(90), 225);
    assert_eq!(watermark_font_size(90), 18);
    // Watermark never drops below its floor.
    assert_eq!(watermark_font_size(30), 12);
    assert_eq!(author_font_size(1), 1);
}

#[test]
fn empty_text_renders_no_tile() {
    let Some(fonts) = test_fonts(40) else {
        eprintln!("skipping: no system font found");
        return;
    };
    let block = TextBlock {
        text: "   ".to_string(),
        font: fonts.quote,
        x: 0,
        y: 0,
        fill: Rgba([255, 255, 255, 255]),
        shadow: Rgba([0, 0, 0, 180]),
        shadow_strength: 3,
    };
    assert!(render_tile(&block).unwrap().is_none());
}

#[test]
fn tile_carries_the_effect_margin() {
    let Some(fonts) = test_fonts(40) else {
        eprintln!("skipping: no system font found");
        return;
    };
    let strength = 3u32;
    let block = TextBlock {
        text: "Quote".to_string(),
        font: fonts.quote,
        x: 50,
        y: 60,
        fill: Rgba([255, 255, 255, 255]),
        shadow: Rgba([0, 0, 0, 180]),
        shadow_strength: strength,
    };
    let tile = render_tile(&block).unwrap().unwrap();
    let margin = i64::from(2 + strength);
    assert_eq!(tile.x, 50 - margin);
    assert_eq!(tile.y, 60 - margin);
    assert!(tile.image.pixels().any(|px| px.0[3] > 0));
}

#[test]
fn quote_blocks_orders_mark_lines_author_watermark() {
    let Some(fonts) = test_fonts(40) else {
        eprintln!("skipping: no system font found");
        return;
    };
    let layout = plan_quote(fonts.quote.font_data(), "hello world", 800, 400, 40).unwrap();
    let style = StyleConfig::modern();
    let blocks = quote_blocks(&layout, &fonts, Some("Ada"), 800, 400, &style, [255, 255, 255]);

    assert_eq!(blocks.len(), layout.lines.len() + 3);
    // Quotation mark in the top-left quadrant.
    assert_eq!(blocks[0].text, "\"");
    assert_eq!((blocks[0].x, blocks[0].y), (100, 66));
    // Author line below the quote block, right of center.
    let author = &blocks[blocks.len() - 2];
    assert_eq!(author.text, "— Ada");
    assert_eq!(author.y, i64::from(layout.block_end_y() + 30));
    assert!(author.x > 0);
    // Watermark last, light gray at strength 1.
    let watermark = blocks.last().unwrap();
    assert_eq!(watermark.fill, Rgba([200, 200, 200, 255]));
    assert_eq!(watermark.shadow_strength, 1);
    assert!(watermark.y > author.y);
}

#[test]
fn quote_blocks_skips_the_author_when_absent() {
    let Some(fonts) = test_fonts(40) else {
        eprintln!("skipping: no system font found");
        return;
    };
    let layout = plan_quote(fonts.quote.font_data(), "hello world", 800, 400, 40).unwrap();
    let style = StyleConfig::modern();
    let blocks = quote_blocks(&layout, &fonts, None, 800, 400, &style, [255, 255, 255]);
    assert_eq!(blocks.len(), layout.lines.len() + 2);
    assert!(blocks.iter().all(|b| !b.text.starts_with('—')));
}

#[test]
fn compose_is_deterministic_across_runs() {
    let Some(fonts) = test_fonts(28) else {
        eprintln!("skipping: no system font found");
        return;
    };
    let pool = rayon::ThreadPoolBuilder::new().num_threads(4).build().unwrap();
    let layout = plan_quote(fonts.quote.font_data(), "determinism matters", 400, 300, 28).unwrap();
    let style = StyleConfig::modern();
    let blocks = quote_blocks(&layout, &fonts, Some("Ada"), 400, 300, &style, [255, 255, 255]);

    let mut first = RgbaImage::from_pixel(400, 300, Rgba([20, 20, 20, 255]));
    let mut second = first.clone();
    compose(&mut first, &blocks, &pool).unwrap();
    compose(&mut second, &blocks, &pool).unwrap();
    assert_eq!(first.as_raw(), second.as_raw());
}

#[test]
fn draw_text_with_effects_writes_through_the_tile_pipeline() {
    let Some(fonts) = test_fonts(32) else {
        eprintln!("skipping: no system font found");
        return;
    };
    let mut canvas = RgbaImage::from_pixel(200, 100, Rgba([0, 0, 0, 255]));
    draw_text_with_effects(
        &mut canvas,
        20,
        20,
        "Hi",
        &fonts.quote,
        Rgba([255, 255, 255, 255]),
        Rgba([0, 0, 0, 180]),
        3,
    )
    .unwrap();
    assert!(canvas.pixels().any(|px| px.0[0] > 128));
}
