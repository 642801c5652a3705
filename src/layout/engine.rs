use crate::assets::font::TextMeasure;
use crate::foundation::error::{EpigramError, EpigramResult};

/// Step of the linear font-size descent.
pub const FONT_STEP: u32 = 5;
/// Floor of the linear font-size descent.
pub const FONT_FLOOR: u32 = 20;

/// Horizontal pixel budget reserved around the quote block.
const SIDE_MARGIN: u32 = 100;
/// Extra pixels between consecutive quote lines.
const LINE_SPACING: u32 = 10;
/// Fraction of the canvas height the quote block may occupy.
const HEIGHT_FRACTION: f32 = 0.7;

/// Greedy word-wrap of `text` to at most `max_chars` characters per line.
///
/// No hyphenation; words longer than `max_chars` are hard-broken so no line
/// ever exceeds the bound. Whitespace is normalized: rejoining the lines
/// with single spaces reproduces the whitespace-normalized input (as long
/// as no word needed hard-breaking).
pub fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        for piece in break_word(word, max_chars) {
            let piece_len = piece.chars().count();
            if current_len == 0 {
                current.push_str(piece);
                current_len = piece_len;
            } else if current_len + 1 + piece_len <= max_chars {
                current.push(' ');
                current.push_str(piece);
                current_len += 1 + piece_len;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(piece);
                current_len = piece_len;
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Split one word into chunks of at most `max_chars` characters.
fn break_word(word: &str, max_chars: usize) -> Vec<&str> {
    if word.chars().count() <= max_chars {
        return vec![word];
    }
    let mut pieces = Vec::new();
    let mut start = 0usize;
    let mut count = 0usize;
    for (idx, _) in word.char_indices() {
        if count == max_chars {
            pieces.push(&word[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    pieces.push(&word[start..]);
    pieces
}

/// Approximate characters per line for a canvas of `canvas_width` pixels:
/// `(canvas_width − 100) / glyph_width('A')`.
///
/// This is an approximation, not exact per-glyph fitting. A degenerate
/// result (canvas narrower than the margin budget, or zero glyph advance)
/// is a [`EpigramError::Layout`].
pub fn approx_chars_per_line(
    measure: &dyn TextMeasure,
    canvas_width: u32,
    font_size: u32,
) -> EpigramResult<usize> {
    let budget = canvas_width.saturating_sub(SIDE_MARGIN);
    let advance = measure.glyph_width('A', font_size);
    if budget == 0 || !advance.is_finite() || advance <= 0.0 {
        return Err(EpigramError::layout(format!(
            "cannot fit text into a {canvas_width} px wide canvas at size {font_size}"
        )));
    }
    let chars = (budget as f32 / advance) as usize;
    if chars == 0 {
        return Err(EpigramError::layout(format!(
            "cannot fit text into a {canvas_width} px wide canvas at size {font_size}"
        )));
    }
    Ok(chars)
}

/// Largest font size that fits `text` into `max_width` × `max_height`.
///
/// Linear descent from `initial` in steps of [`FONT_STEP`] down to
/// [`FONT_FLOOR`]: at each candidate the text is re-wrapped and the first
/// size is accepted where the widest wrapped line is at most
/// `max_width − 100` px and the block height (`lines × (size + 10)`) is at
/// most 70% of `max_height`. The floor is returned when nothing fits. The
/// exact step and floor are kept for reproducible output sizing.
pub fn fit_font_size(
    measure: &dyn TextMeasure,
    text: &str,
    max_width: u32,
    max_height: u32,
    initial: u32,
) -> EpigramResult<u32> {
    let mut size = initial.max(FONT_FLOOR);
    loop {
        if fits(measure, text, max_width, max_height, size)? {
            return Ok(size);
        }
        if size <= FONT_FLOOR {
            return Ok(FONT_FLOOR);
        }
        size = size.saturating_sub(FONT_STEP).max(FONT_FLOOR);
    }
}

fn fits(
    measure: &dyn TextMeasure,
    text: &str,
    max_width: u32,
    max_height: u32,
    size: u32,
) -> EpigramResult<bool> {
    // A size whose approximate line length degenerates to zero simply does
    // not fit; the descent continues toward the floor.
    let Ok(chars) = approx_chars_per_line(measure, max_width, size) else {
        return Ok(false);
    };
    let lines = wrap(text, chars);
    if lines.is_empty() {
        return Err(EpigramError::layout("quote text is empty"));
    }
    let widest = lines
        .iter()
        .map(|line| measure.line_width(line, size))
        .fold(0.0f32, f32::max);
    let block_height = lines.len() as u32 * (size + LINE_SPACING);
    Ok(widest <= max_width.saturating_sub(SIDE_MARGIN) as f32
        && block_height as f32 <= HEIGHT_FRACTION * max_height as f32)
}

/// Resolved layout for one quote: fitted size, wrapped lines and vertical
/// placement.
#[derive(Clone, Debug)]
pub struct QuoteLayout {
    /// Fitted font size in points.
    pub font_size: u32,
    /// Wrapped quote lines, top to bottom.
    pub lines: Vec<String>,
    /// Y of the first line's top edge.
    pub start_y: u32,
    /// Vertical distance between consecutive line tops.
    pub line_step: u32,
}

impl QuoteLayout {
    /// Y of line `index`'s top edge.
    pub fn line_y(&self, index: usize) -> u32 {
        self.start_y + index as u32 * self.line_step
    }

    /// Total height of the wrapped block.
    pub fn block_height(&self) -> u32 {
        self.lines.len() as u32 * self.line_step
    }

    /// Y just below the last line.
    pub fn block_end_y(&self) -> u32 {
        self.start_y + self.block_height()
    }
}

/// Fit, wrap and vertically place `text` on a `width` × `height` canvas.
///
/// The block starts at `max((height − block) / 2, height / 3)` so short
/// quotes sit centered and long ones never crowd the quotation mark drawn
/// in the top-left quadrant.
pub fn plan_quote(
    measure: &dyn TextMeasure,
    text: &str,
    width: u32,
    height: u32,
    initial_size: u32,
) -> EpigramResult<QuoteLayout> {
    if text.split_whitespace().next().is_none() {
        return Err(EpigramError::layout("quote text is empty"));
    }
    let font_size = fit_font_size(measure, text, width, height, initial_size)?;
    let chars = approx_chars_per_line(measure, width, font_size)?;
    let lines = wrap(text, chars);
    let line_step = font_size + LINE_SPACING;
    let block_height = lines.len() as u32 * line_step;
    let centered = height.saturating_sub(block_height) / 2;
    let start_y = centered.max(height / 3);
    Ok(QuoteLayout {
        font_size,
        lines,
        start_y,
        line_step,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/layout/engine.rs"]
mod tests;
