//! Title placement on the cover.
//!
//! The title is drawn at a fixed size, centered on the cover. When it does
//! not fit on one line it is split into `ceil(width / available)` lines with
//! the same number of words each, in order; lines are not re-balanced by
//! their measured width. A single word is never broken, so a one-word
//! title wider than the cover stays on one (overflowing) line.

use super::shaper::{TextMetrics, TextShaper, TextStyle, VerticalAnchor, num};
use crate::error::Result;

pub const TITLE_FONT_SIZE: f64 = 100.0;
/// Horizontal room kept free around a single-line title.
pub const TITLE_MARGIN: f64 = 100.0;
/// Padding between text and its backing box.
pub const BOX_PADDING: f64 = 10.0;
pub const TEXT_FILL: &str = "#ffffff";
pub const BOX_FILL: &str = "#000000";

/// One laid-out line of the title.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleLine {
    pub text: String,
    pub style: TextStyle,
    pub metrics: TextMetrics,
}

/// Result of fitting a title into the cover.
#[derive(Debug, Clone, PartialEq)]
pub enum TitleLayout {
    /// The whole title on one centered line.
    Single(TitleLine),
    /// Exactly `line_count` rows of words. Rows past the last word have
    /// empty text and keep their slot in the block.
    Wrapped { line_count: usize, lines: Vec<TitleLine> },
}

fn centered_style(container_width: u32, container_height: u32) -> TextStyle {
    TextStyle {
        x: (f64::from(container_width) / 2.0).round(),
        y: (f64::from(container_height) / 2.0).round(),
        font_size: TITLE_FONT_SIZE,
        anchor: VerticalAnchor::Middle,
        fill: TEXT_FILL.to_string(),
    }
}

/// Fit `title` into a `container_width`x`container_height` cover.
pub fn layout_title(
    title: &str,
    container_width: u32,
    container_height: u32,
    shaper: &dyn TextShaper,
) -> Result<TitleLayout> {
    let style = centered_style(container_width, container_height);
    let metrics = shaper.measure(title, &style)?;
    let available = (f64::from(container_width) - TITLE_MARGIN).max(1.0);
    let words: Vec<&str> = title.split_whitespace().collect();

    if metrics.width < available || words.len() <= 1 {
        return Ok(TitleLayout::Single(TitleLine {
            text: title.to_string(),
            style,
            metrics,
        }));
    }

    let line_count = (metrics.width / available).ceil() as usize;
    let words_per_line = words.len().div_ceil(line_count);
    let line_height = metrics.height;
    let block_height = line_height * line_count as f64;
    let first_baseline =
        (f64::from(container_height) / 2.0 - block_height / 2.0 + line_height).round();

    let mut lines = Vec::with_capacity(line_count);
    let mut rows = words.chunks(words_per_line);
    for index in 0..line_count {
        let text = rows.next().map(|row| row.join(" ")).unwrap_or_default();
        let line_style = TextStyle {
            y: first_baseline + index as f64 * line_height,
            anchor: VerticalAnchor::Baseline,
            ..style.clone()
        };
        let metrics = shaper.measure(&text, &line_style)?;
        lines.push(TitleLine {
            text,
            style: line_style,
            metrics,
        });
    }

    Ok(TitleLayout::Wrapped { line_count, lines })
}

/// SVG fragment drawing `title` with backing boxes, ready to wrap in an `<svg>`.
pub fn title_overlay(
    title: &str,
    container_width: u32,
    container_height: u32,
    shaper: &dyn TextShaper,
) -> Result<String> {
    let mut svg = String::new();
    match layout_title(title, container_width, container_height, shaper)? {
        TitleLayout::Single(line) => {
            let m = line.metrics;
            svg.push_str(&rect(
                m.x - BOX_PADDING,
                m.y - BOX_PADDING,
                m.width + 2.0 * BOX_PADDING,
                m.height + 2.0 * BOX_PADDING,
            ));
            svg.push_str(&shaper.to_path(&line.text, &line.style)?);
        }
        TitleLayout::Wrapped { lines, .. } => {
            for line in &lines {
                let m = line.metrics;
                svg.push_str(&rect(
                    0.0,
                    m.y - BOX_PADDING,
                    f64::from(container_width),
                    m.height + 2.0 * BOX_PADDING,
                ));
                if !line.text.is_empty() {
                    svg.push_str(&shaper.to_path(&line.text, &line.style)?);
                }
            }
        }
    }
    Ok(svg)
}

fn rect(x: f64, y: f64, width: f64, height: f64) -> String {
    format!(
        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{BOX_FILL}\"/>",
        num(x),
        num(y),
        num(width),
        num(height)
    )
}
