//! First-table extraction from markdown, for the PDF export path.
//!
//! Unlike [`crate::pipeline::blocks`], which scans raw lines per day, this
//! stage runs the whole reply through a GFM-table-aware markdown parser and
//! takes the first table it emits. Inline formatting is flattened to plain
//! text (`**Oats**` → `Oats`); line breaks inside a cell become spaces.
//! Only the first table is used; later tables are ignored.

use crate::grid::Grid;
use pulldown_cmark::{Event, Options, Parser, Tag};
use tracing::debug;

/// Extract the first table in `markdown`, or `None` if there is none.
///
/// The first row (the table head) supplies the headers; every later row
/// becomes a data row. All cell text is trimmed.
pub fn first_table(markdown: &str) -> Option<Grid> {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES);

    let mut in_table = false;
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut cell: Option<String> = None;

    for event in parser {
        match event {
            Event::Start(Tag::Table(_)) => in_table = true,
            Event::End(Tag::Table(_)) => break,
            _ if !in_table => {}
            Event::Start(Tag::TableHead) | Event::Start(Tag::TableRow) => rows.push(Vec::new()),
            Event::Start(Tag::TableCell) => cell = Some(String::new()),
            Event::End(Tag::TableCell) => {
                if let (Some(text), Some(row)) = (cell.take(), rows.last_mut()) {
                    row.push(text.trim().to_string());
                }
            }
            Event::Text(t) | Event::Code(t) => {
                if let Some(c) = cell.as_mut() {
                    c.push_str(&t);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some(c) = cell.as_mut() {
                    c.push(' ');
                }
            }
            _ => {}
        }
    }

    if !in_table {
        return None;
    }

    let mut rows = rows.into_iter();
    let headers = rows.next().unwrap_or_default();
    let body: Vec<Vec<String>> = rows.collect();
    debug!(
        "First table: {} headers, {} rows",
        headers.len(),
        body.len()
    );
    Some(Grid::new(headers, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_table_is_none() {
        assert!(first_table("# Plan\n\nEat well and sleep.").is_none());
        assert!(first_table("").is_none());
    }

    #[test]
    fn basic_table() {
        let md = "| Meal | Food |\n|---|---|\n| Breakfast | Oats |\n| Lunch | Rice |\n";
        let g = first_table(md).unwrap();
        assert_eq!(g.headers, vec!["Meal", "Food"]);
        assert_eq!(g.rows, vec![vec!["Breakfast", "Oats"], vec!["Lunch", "Rice"]]);
    }

    #[test]
    fn inline_formatting_is_flattened() {
        let md = "| **Day** | Meal |\n|---|---|\n| *1* | `oats` with **honey** |\n";
        let g = first_table(md).unwrap();
        assert_eq!(g.headers, vec!["Day", "Meal"]);
        assert_eq!(g.rows[0], vec!["1", "oats with honey"]);
    }

    #[test]
    fn only_first_table_is_used() {
        let md = "| A |\n|---|\n| 1 |\n\ntext\n\n| B |\n|---|\n| 2 |\n";
        let g = first_table(md).unwrap();
        assert_eq!(g.headers, vec!["A"]);
        assert_eq!(g.rows, vec![vec!["1"]]);
    }

    #[test]
    fn surrounding_prose_is_ignored() {
        let md = "Here is your plan.\n\n| Meal | Food |\n|---|---|\n| Dinner | Soup |\n\nThis is not medical advice.\n";
        let g = first_table(md).unwrap();
        assert_eq!(g.row_count(), 1);
        assert_eq!(g.cell(0, 1), "Soup");
    }
}
