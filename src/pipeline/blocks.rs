//! Day-block splitting and per-block table extraction.
//!
//! ```text
//! reply text ──▶ split_day_blocks ──▶ [Block] ──▶ extract_grid ──▶ Grid
//! ```
//!
//! Text before the first day label is dropped. Callers are expected to have
//! already decided the reply is a day plan (see
//! [`crate::classify::looks_like_day_plan`]); with no labels at all this
//! returns no blocks and the caller falls back to prose rendering.

use crate::grid::{DayTable, Grid};
use crate::pipeline::lines::{classify_line, is_table_line, split_cells, LineKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A contiguous run of lines starting at a day label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// The label line, trimmed.
    pub label: String,
    /// The raw lines of the block, label line first, untrimmed.
    pub lines: Vec<String>,
}

/// Split `text` into day blocks.
///
/// Every line classified as [`LineKind::Label`] starts a new block; the
/// block runs until the next label or end of input.
pub fn split_day_blocks(text: &str) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();

    for line in text.lines() {
        if classify_line(line) == LineKind::Label {
            blocks.push(Block {
                label: line.trim().to_string(),
                lines: vec![line.to_string()],
            });
        } else if let Some(current) = blocks.last_mut() {
            current.lines.push(line.to_string());
        }
    }

    debug!("Split reply into {} day blocks", blocks.len());
    blocks
}

/// Extract the header + rows grid from one block.
///
/// 1. trim lines, drop blanks, skip the first (the title)
/// 2. keep only lines containing `|`
/// 3. none left → [`Grid::empty`]
/// 4. first candidate is the header row
/// 5. separator lines among the rest are dropped
/// 6. remaining lines become rows; rows with no cells are dropped
///
/// Rows are not padded or truncated here.
pub fn extract_grid(block: &Block) -> Grid {
    let candidates: Vec<&str> = block
        .lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .skip(1)
        .filter(|l| is_table_line(l))
        .collect();

    let Some((header_line, body)) = candidates.split_first() else {
        return Grid::empty();
    };

    let headers = split_cells(header_line);
    let rows: Vec<Vec<String>> = body
        .iter()
        .filter(|l| classify_line(l) != LineKind::Separator)
        .map(|l| split_cells(l))
        .filter(|cells| !cells.is_empty())
        .collect();

    Grid::new(headers, rows)
}

/// Split and extract in one pass: one [`DayTable`] per day block.
pub fn parse_day_plan(text: &str) -> Vec<DayTable> {
    split_day_blocks(text)
        .iter()
        .map(|block| {
            let grid = extract_grid(block);
            debug!(
                "{}: {} columns, {} rows",
                block.label,
                grid.column_count(),
                grid.row_count()
            );
            DayTable {
                label: block.label.clone(),
                grid,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_single_day_table() {
        let days = parse_day_plan("Day 1\n| Meal | Food |\n|---|---|\n| Breakfast | Oats |\n");
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].label, "Day 1");
        assert_eq!(days[0].grid.headers, vec!["Meal", "Food"]);
        assert_eq!(days[0].grid.rows, vec![vec!["Breakfast", "Oats"]]);
    }

    #[test]
    fn scenario_day_without_table() {
        let days = parse_day_plan("Day 2\nNo table today.\n");
        assert_eq!(days.len(), 1);
        assert!(!days[0].grid.has_table());
        assert!(days[0].grid.rows.is_empty());
    }

    #[test]
    fn scenario_short_row_normalises() {
        let days = parse_day_plan("Day 1\n| Meal | Food | Notes |\n| Lunch |\n");
        assert_eq!(days[0].grid.normalized_row(0), vec!["Lunch", "", ""]);
    }

    #[test]
    fn preamble_is_discarded() {
        let blocks = split_day_blocks("Here is your plan:\n\nDay 1\n| A |\nDay 2\nrest\n");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].lines, vec!["Day 1", "| A |"]);
        assert_eq!(blocks[1].lines, vec!["Day 2", "rest"]);
    }

    #[test]
    fn blocks_reproduce_lines_after_first_label() {
        let text = "intro\n### Day 1\n\n| Meal | Food |\n|---|---|\nnote\nDay 2\n| x |\n\n";
        let joined: Vec<String> = split_day_blocks(text)
            .into_iter()
            .flat_map(|b| b.lines)
            .collect();
        let expected: Vec<String> = text.lines().skip(1).map(str::to_string).collect();
        assert_eq!(joined, expected);
    }

    #[test]
    fn no_labels_no_blocks() {
        assert!(split_day_blocks("| Meal | Food |\n| a | b |").is_empty());
    }

    #[test]
    fn separators_never_become_rows() {
        let block = Block {
            label: "Day 1".into(),
            lines: vec![
                "Day 1".into(),
                "| Meal | Food |".into(),
                "|:---|---:|".into(),
                "| Breakfast | Oats |".into(),
                "| --- | --- |".into(),
                "| Dinner | Soup |".into(),
            ],
        };
        let grid = extract_grid(&block);
        assert_eq!(grid.rows.len(), 2);
        assert!(grid
            .rows
            .iter()
            .flatten()
            .all(|c| !c.chars().all(|ch| ch == '-' || ch == ':')));
    }

    #[test]
    fn prose_between_rows_is_ignored_and_empty_rows_dropped() {
        let days = parse_day_plan(
            "Day 1\nSome intro prose\n| Meal | Food |\n| Breakfast | Eggs |\nTip: chew slowly\n| | |\n| Lunch | Salad |",
        );
        let g = &days[0].grid;
        assert_eq!(g.headers, vec!["Meal", "Food"]);
        assert_eq!(
            g.rows,
            vec![vec!["Breakfast", "Eggs"], vec!["Lunch", "Salad"]]
        );
    }

    #[test]
    fn parsing_is_idempotent() {
        let text = "Day 1\n| A | B |\n|---|---|\n| 1 | 2 |\nDay 2\nnothing";
        assert_eq!(parse_day_plan(text), parse_day_plan(text));
    }

    #[test]
    fn horizontal_rule_is_not_a_candidate() {
        let days = parse_day_plan("Day 1\n---\n| Meal | Food |\n| Lunch | Rice |");
        assert_eq!(days[0].grid.headers, vec!["Meal", "Food"]);
        assert_eq!(days[0].grid.rows.len(), 1);
    }

    #[test]
    fn header_only_table() {
        let days = parse_day_plan("Day 3\n| Meal | Food |\n|---|---|\n");
        assert!(days[0].grid.has_table());
        assert!(days[0].grid.rows.is_empty());
    }
}
