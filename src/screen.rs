//! Plain-text rendering of replies for the terminal.

use crate::classify::looks_like_day_plan;
use crate::grid::{DayTable, Grid};
use crate::pipeline::blocks::parse_day_plan;
use unicode_width::UnicodeWidthStr;

/// Shown under a day whose block carries no table.
pub const NO_MEAL_PLAN_PLACEHOLDER: &str = "No meal plan available for this day.";

/// Render a reply: day tables when it looks like a day plan, otherwise the
/// markdown as-is.
pub fn render_reply(text: &str) -> String {
    if looks_like_day_plan(text) {
        let days = parse_day_plan(text);
        if !days.is_empty() {
            return render_day_tables(&days);
        }
    }
    let mut out = text.trim_end().to_string();
    out.push('\n');
    out
}

/// One section per day: the label, then the aligned grid or the
/// placeholder. Sections are separated by a blank line.
pub fn render_day_tables(days: &[DayTable]) -> String {
    days.iter()
        .map(|day| {
            let body = if day.grid.has_table() {
                render_grid(&day.grid)
            } else {
                format!("{NO_MEAL_PLAN_PLACEHOLDER}\n")
            };
            format!("{}\n{}", day.label, body)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Box-drawn text table. Every row shows exactly `headers.len()` cells.
/// Columns are sized in terminal cells, so wide glyphs stay aligned.
pub fn render_grid(grid: &Grid) -> String {
    let widths: Vec<usize> = (0..grid.column_count())
        .map(|c| {
            grid.normalized_rows()
                .map(|r| r[c].width())
                .chain(std::iter::once(grid.headers[c].width()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let rule = |left: char, mid: char, right: char| -> String {
        let mut s = String::new();
        s.push(left);
        for (i, w) in widths.iter().enumerate() {
            if i > 0 {
                s.push(mid);
            }
            s.extend(std::iter::repeat('─').take(w + 2));
        }
        s.push(right);
        s.push('\n');
        s
    };
    let line = |cells: &[&str]| -> String {
        let mut s = String::from("│");
        for (cell, w) in cells.iter().zip(&widths) {
            let pad = w.saturating_sub(cell.width());
            s.push(' ');
            s.push_str(cell);
            s.extend(std::iter::repeat(' ').take(pad + 1));
            s.push('│');
        }
        s.push('\n');
        s
    };

    let headers: Vec<&str> = grid.headers.iter().map(String::as_str).collect();
    let mut out = rule('┌', '┬', '┐');
    out.push_str(&line(&headers));
    out.push_str(&rule('├', '┼', '┤'));
    for row in grid.normalized_rows() {
        out.push_str(&line(&row));
    }
    out.push_str(&rule('└', '┴', '┘'));
    out
}
