//! Grid pagination: turn a [`Grid`] into positioned rectangles and text.
//!
//! Coordinates are millimetres with the origin at the top-left of the page
//! and `y` growing downwards; text `y` is the baseline of the first line.
//! [`crate::pipeline::pdf`] flips these into PDF user space.
//!
//! ## Row height
//!
//! Every cell of a row is wrapped independently to the column width minus
//! the cell inset. The row is as tall as its tallest cell:
//!
//! ```text
//! row_height = max(lines per cell) × line_height + row_padding
//! ```
//!
//! so no cell is clipped vertically. Column widths are uniform; long text
//! wraps instead of widening its column.
//!
//! ## Page breaks
//!
//! Before a data row is placed, the cursor is checked against the bottom
//! margin. If the row would cross it and the page already carries at least
//! one data row, a new page starts at the top margin and (when configured)
//! the header band is drawn again. A row taller than a whole page is placed
//! on its own page and runs past the bottom margin.

use crate::config::{ExportConfig, Orientation};
use crate::grid::Grid;
use crate::pipeline::metrics::{wrap_text, TextMeasure};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Horizontal anchoring of a text op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Align {
    Left,
    Center,
}

/// One drawing instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayoutOp {
    /// Stroked rectangle; (`x`, `y`) is the top-left corner.
    Rect { x: f32, y: f32, w: f32, h: f32 },
    /// Lines of text starting at baseline (`x`, `y`), `leading` apart.
    /// With [`Align::Center`], `x` is the centre of each line.
    Text {
        x: f32,
        y: f32,
        lines: Vec<String>,
        font_size: f32,
        leading: f32,
        align: Align,
    },
}

/// Drawing instructions for one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutPage {
    pub ops: Vec<LayoutOp>,
}

/// The complete paginated table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub orientation: Orientation,
    pub page_width: f32,
    pub page_height: f32,
    pub column_width: f32,
    pub pages: Vec<LayoutPage>,
}

impl Layout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Mutable state threaded through pagination.
struct LayoutContext<'a> {
    config: &'a ExportConfig,
    measure: &'a dyn TextMeasure,
    headers: &'a [String],
    page_height: f32,
    column_width: f32,
    /// Vertical position of the next band on the current page.
    cursor: f32,
    /// Data rows already placed on the current page.
    rows_on_page: usize,
    pages: Vec<LayoutPage>,
}

impl<'a> LayoutContext<'a> {
    fn page(&mut self) -> &mut LayoutPage {
        if self.pages.is_empty() {
            self.pages.push(LayoutPage::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn wrap(&self, text: &str) -> Vec<String> {
        let max = self.column_width - 2.0 * self.config.cell_inset;
        wrap_text(self.measure, text, max, self.config.font_size)
    }

    fn column_x(&self, col: usize) -> f32 {
        self.config.margin + col as f32 * self.column_width
    }

    fn bottom_limit(&self) -> f32 {
        self.page_height - self.config.margin
    }

    fn draw_title(&mut self, page_width: f32) {
        let c = self.config;
        let y = self.cursor;
        let op = LayoutOp::Text {
            x: page_width / 2.0,
            y,
            lines: vec![c.title.clone()],
            font_size: c.title_font_size,
            leading: c.line_height,
            align: Align::Center,
        };
        self.page().ops.push(op);
        self.cursor += c.title_advance;
    }

    fn draw_header_band(&mut self) {
        let h = self.config.header_height;
        let headers = self.headers;
        for (i, header) in headers.iter().enumerate() {
            let lines = self.wrap(header);
            self.draw_cell(i, h, lines);
        }
        self.cursor += h;
    }

    fn draw_cell(&mut self, col: usize, height: f32, lines: Vec<String>) {
        let x = self.column_x(col);
        let y = self.cursor;
        let (w, inset, baseline, font_size, leading) = (
            self.column_width,
            self.config.cell_inset,
            self.config.baseline_offset,
            self.config.font_size,
            self.config.line_height,
        );
        let page = self.page();
        page.ops.push(LayoutOp::Rect { x, y, w, h: height });
        page.ops.push(LayoutOp::Text {
            x: x + inset,
            y: y + baseline,
            lines,
            font_size,
            leading,
            align: Align::Left,
        });
    }

    fn start_continuation_page(&mut self) {
        self.pages.push(LayoutPage::default());
        self.cursor = self.config.margin;
        self.rows_on_page = 0;
        if self.config.repeat_header {
            self.draw_header_band();
        }
        debug!("Page break → page {}", self.pages.len());
    }

    fn draw_row(&mut self, cells: Vec<Vec<String>>) {
        let height = row_height(&cells, self.config);
        if self.rows_on_page > 0 && self.cursor + height > self.bottom_limit() {
            self.start_continuation_page();
        }
        for (col, lines) in cells.into_iter().enumerate() {
            self.draw_cell(col, height, lines);
        }
        self.cursor += height;
        self.rows_on_page += 1;
    }
}

/// Height of a data row whose cells wrapped to `cells`.
///
/// Never less than one line plus padding, and non-decreasing in the
/// tallest cell's line count.
pub fn row_height(cells: &[Vec<String>], config: &ExportConfig) -> f32 {
    let max_lines = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
    max_lines as f32 * config.line_height + config.row_padding
}

/// Lay out `grid` as a titled, bordered table over one or more pages.
///
/// `grid` must have at least one header; the exporter checks this before
/// calling. Rows are read through [`Grid::cell`], so every row has exactly
/// `headers.len()` cells.
pub fn paginate(grid: &Grid, config: &ExportConfig, measure: &dyn TextMeasure) -> Layout {
    let columns = grid.column_count().max(1);
    let orientation = config.orientation_for(grid.column_count());
    let (page_width, page_height) = config.page_dimensions(orientation);
    let usable_width = page_width - 2.0 * config.margin;
    let column_width = usable_width / columns as f32;

    debug!(
        "Paginating {} rows × {} columns, {:?}, column width {:.1}mm",
        grid.row_count(),
        grid.column_count(),
        orientation,
        column_width
    );

    let mut ctx = LayoutContext {
        config,
        measure,
        headers: &grid.headers,
        page_height,
        column_width,
        cursor: config.margin,
        rows_on_page: 0,
        pages: vec![LayoutPage::default()],
    };

    ctx.draw_title(page_width);
    ctx.draw_header_band();

    for row in 0..grid.row_count() {
        let cells: Vec<Vec<String>> = grid
            .normalized_row(row)
            .into_iter()
            .map(|cell| ctx.wrap(cell))
            .collect();
        ctx.draw_row(cells);
    }

    Layout {
        orientation,
        page_width,
        page_height,
        column_width,
        pages: ctx.pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::metrics::Helvetica;

    fn grid(headers: &[&str], rows: &[&[&str]]) -> Grid {
        Grid::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    fn rects(page: &LayoutPage) -> Vec<(f32, f32, f32, f32)> {
        page.ops
            .iter()
            .filter_map(|op| match op {
                LayoutOp::Rect { x, y, w, h } => Some((*x, *y, *w, *h)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn portrait_for_three_columns() {
        let g = grid(&["Meal", "Food", "Notes"], &[&["Lunch", "Rice", ""]]);
        let layout = paginate(&g, &ExportConfig::default(), &Helvetica);
        assert_eq!(layout.orientation, Orientation::Portrait);
        assert_eq!(layout.page_width, 210.0);
        assert!((layout.column_width - 190.0 / 3.0).abs() < 1e-3);
    }

    #[test]
    fn landscape_for_six_columns() {
        let g = grid(&["A", "B", "C", "D", "E", "F"], &[]);
        let layout = paginate(&g, &ExportConfig::default(), &Helvetica);
        assert_eq!(layout.orientation, Orientation::Landscape);
        assert_eq!(layout.page_width, 297.0);
        assert!((layout.column_width - 277.0 / 6.0).abs() < 1e-3);
    }

    #[test]
    fn title_header_and_first_row_positions() {
        let g = grid(&["Meal", "Food"], &[&["Breakfast", "Oats"]]);
        let layout = paginate(&g, &ExportConfig::default(), &Helvetica);
        let page = &layout.pages[0];

        match &page.ops[0] {
            LayoutOp::Text { x, y, lines, align, .. } => {
                assert_eq!(*x, 105.0);
                assert_eq!(*y, 10.0);
                assert_eq!(lines, &vec!["Personalized Diet Plan".to_string()]);
                assert_eq!(*align, Align::Center);
            }
            other => panic!("expected title text, got {other:?}"),
        }

        let r = rects(page);
        // two header cells then two data cells
        assert_eq!(r.len(), 4);
        assert_eq!(r[0], (10.0, 20.0, 95.0, 8.0));
        assert_eq!(r[1], (105.0, 20.0, 95.0, 8.0));
        // single-line row: 1 × 5 + 2
        assert_eq!(r[2], (10.0, 28.0, 95.0, 7.0));
    }

    #[test]
    fn ragged_rows_draw_one_cell_per_header() {
        let g = grid(&["Meal", "Food", "Notes"], &[&["Lunch"], &["a", "b", "c", "d"]]);
        let layout = paginate(&g, &ExportConfig::default(), &Helvetica);
        // 3 header + 3 + 3
        assert_eq!(rects(&layout.pages[0]).len(), 9);
    }

    #[test]
    fn tallest_cell_sets_row_height() {
        let long = "steamed vegetables with brown rice, grilled chicken breast, \
                    a side of lentil soup and a glass of buttermilk";
        let g = grid(&["Meal", "Food", "Notes"], &[&["Lunch", long, "light"]]);
        let layout = paginate(&g, &ExportConfig::default(), &Helvetica);
        let r = rects(&layout.pages[0]);
        let row_rects = &r[3..];
        assert!(row_rects[0].3 > 7.0);
        assert!(row_rects.iter().all(|rr| rr.3 == row_rects[0].3));
    }

    #[test]
    fn row_height_floor_and_monotonic() {
        let c = ExportConfig::default();
        let one = row_height(&[vec![String::new()]], &c);
        assert_eq!(one, 7.0);
        assert!(one >= c.line_height);
        assert_eq!(row_height(&[], &c), 7.0);
        let mut prev = 0.0;
        for n in 1..10 {
            let cells = vec![vec![String::new(); n], vec![String::new()]];
            let h = row_height(&cells, &c);
            assert!(h >= prev);
            prev = h;
        }
    }

    #[test]
    fn long_tables_break_pages_and_repeat_header() {
        let rows: Vec<Vec<String>> = (0..60)
            .map(|i| vec![format!("Meal {i}"), "Food".to_string()])
            .collect();
        let g = Grid::new(vec!["Meal".into(), "Food".into()], rows);
        let layout = paginate(&g, &ExportConfig::default(), &Helvetica);
        assert!(layout.page_count() >= 2);

        let second = &layout.pages[1];
        // no title on continuation pages; header band first
        let r = rects(second);
        assert_eq!(r[0], (10.0, 10.0, 95.0, 8.0));
        let header_text = second.ops.iter().find_map(|op| match op {
            LayoutOp::Text { lines, .. } => Some(lines[0].clone()),
            _ => None,
        });
        assert_eq!(header_text.as_deref(), Some("Meal"));

        // nothing crosses the bottom margin
        for page in &layout.pages {
            for (_, y, _, h) in rects(page) {
                assert!(y + h <= 297.0 - 10.0 + 1e-3);
            }
        }
    }

    #[test]
    fn header_not_repeated_when_disabled() {
        let rows: Vec<Vec<String>> = (0..60).map(|i| vec![format!("{i}")]).collect();
        let g = Grid::new(vec!["N".into()], rows);
        let config = ExportConfig::builder().repeat_header(false).build().unwrap();
        let layout = paginate(&g, &config, &Helvetica);
        let r = rects(&layout.pages[1]);
        // first rect on page 2 is a data row (height 7), not the 8mm header
        assert_eq!(r[0].3, 7.0);
    }
}
