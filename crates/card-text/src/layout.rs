//! Block geometry for anchored, wrapped text

use crate::anchor::Anchor;
use crate::wrap::{measure_with_spacing, wrap_text};

/// Styling inputs that affect text geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Font size in pixels (also the nominal line height)
    pub font_size: f32,
    /// Extra space between lines
    pub line_spacing: f32,
    /// Extra space between characters
    pub letter_spacing: f32,
    /// Wrap width; `None` or a non-positive value disables wrapping
    pub wrap_width: Option<f32>,
    pub anchor: Anchor,
}

impl TextStyle {
    pub fn new(font_size: f32) -> Self {
        Self {
            font_size,
            line_spacing: 4.0,
            letter_spacing: 0.0,
            wrap_width: None,
            anchor: Anchor::default(),
        }
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_line_spacing(mut self, line_spacing: f32) -> Self {
        self.line_spacing = line_spacing;
        self
    }

    pub fn with_letter_spacing(mut self, letter_spacing: f32) -> Self {
        self.letter_spacing = letter_spacing;
        self
    }

    pub fn with_wrap_width(mut self, wrap_width: Option<f32>) -> Self {
        self.wrap_width = wrap_width;
        self
    }

    /// Distance between consecutive baselines
    pub fn line_height(&self) -> f32 {
        self.font_size + self.line_spacing
    }
}

/// One laid-out line
#[derive(Debug, Clone, PartialEq)]
pub struct LineLayout {
    pub text: String,
    /// Left edge of the line
    pub x: f32,
    /// Baseline of the line
    pub baseline: f32,
    /// Width including letter spacing
    pub width: f32,
}

/// Geometry of a whole text block
///
/// `x`, `y`, `width` and `height` describe the anchored bounding box, which is
/// what selection highlights and hit-testing use.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockLayout {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub ascent: f32,
    pub lines: Vec<LineLayout>,
}

/// Height of `line_count` lines: `n * (size + spacing) - spacing`
pub fn block_height(line_count: usize, font_size: f32, line_spacing: f32) -> f32 {
    if line_count == 0 {
        return 0.0;
    }
    line_count as f32 * (font_size + line_spacing) - line_spacing
}

/// Lay out `text` anchored at `origin`
///
/// The block is anchored as a whole (its box is offset by the anchor), while
/// each line is positioned horizontally against `origin.0` on its own, so
/// centred and right-aligned blocks stay aligned line by line.
pub fn layout_block(
    text: &str,
    origin: (f32, f32),
    style: &TextStyle,
    ascent: f32,
    measure: impl Fn(&str) -> f32,
) -> BlockLayout {
    let lines = wrap_text(text, style.wrap_width, style.letter_spacing, &measure);

    let widths: Vec<f32> = lines
        .iter()
        .map(|line| measure_with_spacing(line, style.letter_spacing, &measure))
        .collect();

    let width = widths.iter().copied().fold(0.0f32, f32::max);
    let height = block_height(lines.len(), style.font_size, style.line_spacing);
    let (dx, dy) = style.anchor.offset(width, height, ascent);

    let (x, y) = origin;
    let first_baseline = y + dy + ascent;
    let line_height = style.line_height();

    let lines = lines
        .into_iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (text, line_width))| LineLayout {
            x: x + style.anchor.horizontal.offset(line_width),
            baseline: first_baseline + i as f32 * line_height,
            width: line_width,
            text,
        })
        .collect();

    BlockLayout {
        x: x + dx,
        y: y + dy,
        width,
        height,
        ascent,
        lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mono(s: &str) -> f32 {
        s.chars().count() as f32 * 10.0
    }

    #[test]
    fn test_block_height() {
        assert_eq!(block_height(0, 32.0, 4.0), 0.0);
        assert_eq!(block_height(1, 32.0, 4.0), 32.0);
        assert_eq!(block_height(3, 32.0, 4.0), 104.0);
    }

    #[test]
    fn test_left_top_single_line() {
        let style = TextStyle::new(20.0).with_anchor(Anchor::LT);
        let block = layout_block("Alice", (10.0, 10.0), &style, 15.0, mono);

        assert_eq!((block.x, block.y), (10.0, 10.0));
        assert_eq!((block.width, block.height), (50.0, 20.0));
        assert_eq!(block.lines.len(), 1);
        assert_eq!(block.lines[0].x, 10.0);
        assert_eq!(block.lines[0].baseline, 25.0);
    }

    #[test]
    fn test_middle_middle_centres_box() {
        let style = TextStyle::new(20.0).with_anchor(Anchor::MM);
        let block = layout_block("abcd", (100.0, 100.0), &style, 15.0, mono);

        assert_eq!(block.x, 100.0 - 40.0 / 2.0);
        assert_eq!(block.y, 100.0 - 20.0 / 2.0);
    }

    #[test]
    fn test_baseline_anchor_puts_first_baseline_on_origin() {
        let style = TextStyle::new(20.0).with_anchor(Anchor::LA);
        let block = layout_block("abc", (0.0, 50.0), &style, 15.0, mono);

        assert_eq!(block.y, 35.0);
        assert_eq!(block.lines[0].baseline, 50.0);
    }

    #[test]
    fn test_multiline_lines_align_individually() {
        let style = TextStyle::new(20.0)
            .with_anchor(Anchor::RT)
            .with_line_spacing(5.0);
        let block = layout_block("abcd\nab", (200.0, 0.0), &style, 15.0, mono);

        assert_eq!(block.width, 40.0);
        assert_eq!(block.height, 45.0);
        assert_eq!(block.x, 160.0);

        assert_eq!(block.lines[0].x, 160.0);
        assert_eq!(block.lines[1].x, 180.0);
        assert_eq!(block.lines[0].baseline, 15.0);
        assert_eq!(block.lines[1].baseline, 40.0);
    }

    #[test]
    fn test_centred_lines_share_axis() {
        let style = TextStyle::new(10.0)
            .with_anchor(Anchor::MT)
            .with_wrap_width(Some(50.0));
        let block = layout_block("abcdefgh", (100.0, 0.0), &style, 8.0, mono);

        assert_eq!(block.lines.len(), 2);
        for line in &block.lines {
            assert_eq!(line.x + line.width / 2.0, 100.0);
        }
    }

    #[test]
    fn test_letter_spacing_widens_box() {
        let style = TextStyle::new(10.0)
            .with_anchor(Anchor::LT)
            .with_letter_spacing(3.0);
        let block = layout_block("abc", (0.0, 0.0), &style, 8.0, mono);

        assert_eq!(block.width, 36.0);
    }
}
