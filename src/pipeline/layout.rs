//! Pagination: assign each wrapped line to a fixed-height cell on a page.
//!
//! Cells are stacked from the top margin downwards. A page holds as many
//! cells as fit above the bottom margin (at least one), and the next line
//! starts a new page. Text is vertically centred in its cell.

use crate::config::ConversionConfig;

/// One line placed on a page. `y` is the text baseline in PDF user space
/// (origin bottom-left).
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine<'a> {
    pub text: &'a str,
    pub x: f32,
    pub y: f32,
}

/// Page geometry derived from a [`ConversionConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub bottom_margin: f32,
    pub line_height: f32,
    pub font_size: f32,
}

impl PageGeometry {
    pub fn from_config(config: &ConversionConfig) -> Self {
        let (width, height) = config.page_size_pt();
        Self {
            width,
            height,
            margin: config.margin_pt(),
            bottom_margin: config.bottom_margin_pt(),
            line_height: config.line_height(),
            font_size: config.font_size_pt,
        }
    }

    pub fn lines_per_page(&self) -> usize {
        let usable = self.height - self.margin - self.bottom_margin;
        ((usable / self.line_height).floor() as usize).max(1)
    }

    /// Baseline of the cell at `slot` (0 = top of the page).
    pub fn baseline(&self, slot: usize) -> f32 {
        let cell_top = self.margin + slot as f32 * self.line_height;
        self.height - (cell_top + 0.5 * self.line_height + 0.3 * self.font_size)
    }
}

/// Split `lines` into pages of placed lines.
///
/// Always returns at least one page; an empty document yields one empty page.
pub fn paginate<'a>(lines: &'a [String], geometry: &PageGeometry) -> Vec<Vec<PlacedLine<'a>>> {
    let per_page = geometry.lines_per_page();
    if lines.is_empty() {
        return vec![Vec::new()];
    }

    lines
        .chunks(per_page)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .map(|(slot, text)| PlacedLine {
                    text,
                    x: geometry.margin,
                    y: geometry.baseline(slot),
                })
                .collect()
        })
        .collect()
}
