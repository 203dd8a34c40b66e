//! Tabular data model shared by the on-screen renderer and the PDF exporter.
//!
//! A [`Grid`] keeps rows exactly as parsed. Ragged rows are *not* padded at
//! parse time; every consumer reads cells through [`Grid::cell`], which
//! returns `""` for missing indices, so a row always presents exactly
//! `headers.len()` cells and surplus cells are ignored.

use serde::{Deserialize, Serialize};

/// Headers plus data rows, positionally aligned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    /// Column titles, in order. Duplicates are allowed.
    pub headers: Vec<String>,
    /// Data rows as parsed; lengths may differ from `headers.len()`.
    pub rows: Vec<Vec<String>>,
}

impl Grid {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// The "no table" state: no headers, no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether a table was detected at all.
    pub fn has_table(&self) -> bool {
        !self.headers.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell at (`row`, `col`), or `""` when the row is too short or the
    /// indices are out of range.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Row `row` viewed through the headers: exactly `column_count()` cells.
    pub fn normalized_row(&self, row: usize) -> Vec<&str> {
        (0..self.column_count()).map(|c| self.cell(row, c)).collect()
    }

    /// Every row viewed through the headers.
    pub fn normalized_rows(&self) -> impl Iterator<Item = Vec<&str>> + '_ {
        (0..self.row_count()).map(move |r| self.normalized_row(r))
    }
}

/// One labelled day from a multi-day plan, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayTable {
    /// The day's heading line, e.g. `Day 3`.
    pub label: String,
    /// The day's table, or [`Grid::empty`] when the block had none.
    pub grid: Grid,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn short_row_reads_as_empty_cells() {
        let g = Grid::new(s(&["Meal", "Food", "Notes"]), vec![s(&["Lunch"])]);
        assert_eq!(g.normalized_row(0), vec!["Lunch", "", ""]);
    }

    #[test]
    fn long_row_is_truncated_to_headers() {
        let g = Grid::new(s(&["A", "B"]), vec![s(&["1", "2", "3", "4"])]);
        assert_eq!(g.normalized_row(0), vec!["1", "2"]);
        // raw data is untouched
        assert_eq!(g.rows[0].len(), 4);
    }

    #[test]
    fn cell_out_of_range_is_empty() {
        let g = Grid::new(s(&["A"]), vec![s(&["x"])]);
        assert_eq!(g.cell(5, 0), "");
        assert_eq!(g.cell(0, 9), "");
    }

    #[test]
    fn empty_grid_has_no_table() {
        let g = Grid::empty();
        assert!(!g.has_table());
        assert_eq!(g.normalized_rows().count(), 0);
    }

    #[test]
    fn header_only_grid_still_has_table() {
        let g = Grid::new(s(&["Meal"]), vec![]);
        assert!(g.has_table());
        assert_eq!(g.row_count(), 0);
    }
}
