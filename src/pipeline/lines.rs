//! Line classification for model-generated day plans.
//!
//! Each line of a reply is one of four kinds. The patterns behind them are
//! exposed as named predicates so they can be tested in isolation and
//! reused by [`crate::classify`].
//!
//! | Kind        | Predicate              | Example                    |
//! |-------------|------------------------|----------------------------|
//! | `Label`     | [`is_day_label`]       | `Day 1`, `- **Day 12:**`   |
//! | `Separator` | [`is_separator_line`]  | `|---|:---:|`              |
//! | `Data`      | [`is_table_line`]      | `| Breakfast | Oats |`     |
//! | `Prose`     | none of the above      | `Drink plenty of water.`   |

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// What a single line of text is, structurally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineKind {
    /// Starts a new day block.
    Label,
    /// Markdown table divider; carries no data.
    Separator,
    /// Pipe-delimited table content (header or body).
    Data,
    /// Anything else.
    Prose,
}

// `Day` + integer at the start of a line. Model output decorates labels
// with a list marker (`- Day 1`, `1. Day 1`), a heading (`### Day 1`),
// emphasis (`**Day 2:**`) or a leading emoji (`## 🥗 Day 3`), in that order.
static RE_DAY_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)^\s*
          (?:(?:[-*+]|\d+[.)])\s+)?
          (?:\#{1,6}\s*)?
          [*_]*\s*
          (?:[\p{Extended_Pictographic}\x{FE0F}\x{200D}]+\s*)?
          [*_]*\s*
          day\s*\d+",
    )
    .unwrap()
});

// Anywhere in the text, used for whole-reply detection.
static RE_DAY_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)day\s*\d+").unwrap());

/// Classify one line. Label takes precedence over table syntax.
pub fn classify_line(line: &str) -> LineKind {
    if is_day_label(line) {
        LineKind::Label
    } else if is_separator_line(line) {
        LineKind::Separator
    } else if is_table_line(line) {
        LineKind::Data
    } else {
        LineKind::Prose
    }
}

/// A line that opens a day block.
pub fn is_day_label(line: &str) -> bool {
    RE_DAY_LABEL.is_match(line)
}

/// `Day N` appears somewhere in `text`.
pub fn contains_day_token(text: &str) -> bool {
    RE_DAY_TOKEN.is_match(text)
}

/// Candidate table line: contains the pipe delimiter.
pub fn is_table_line(line: &str) -> bool {
    line.contains('|')
}

/// Decorative divider: only dashes, pipes, alignment colons and whitespace,
/// with at least one dash.
pub fn is_separator_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && trimmed.contains('-')
        && trimmed
            .chars()
            .all(|c| c == '-' || c == '|' || c == ':' || c.is_whitespace())
}

/// Split a pipe-delimited line into trimmed, non-empty cells.
///
/// Leading/trailing pipes produce empty pieces which are discarded, as are
/// genuinely empty cells in the middle of the row.
pub fn split_cells(line: &str) -> Vec<String> {
    line.split('|')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_labels() {
        assert!(is_day_label("Day 1"));
        assert!(is_day_label("day 12: recovery"));
        assert!(is_day_label("DAY3"));
        assert!(is_day_label("### Day 4"));
        assert!(is_day_label("**Day 5:**"));
        assert!(is_day_label("  Day 6"));
        assert!(is_day_label("- Day 7"));
        assert!(is_day_label("1. Day 8"));
        assert!(is_day_label("* **Day 9:**"));
        assert!(is_day_label("## 🥗 Day 10"));
        assert!(is_day_label("🍎 **Day 11**"));
        assert!(!is_day_label("- Drink water on day 2"));
        assert!(!is_day_label("2. Avoid fried food"));
        assert!(!is_day_label("Monday"));
        assert!(!is_day_label("Every day 2 litres of water"));
        assert!(!is_day_label("| Day 1 | Oats |"));
        assert!(!is_day_label("Day one"));
    }

    #[test]
    fn separators() {
        assert!(is_separator_line("|---|---|"));
        assert!(is_separator_line("| --- | --- |"));
        assert!(is_separator_line("|:---|---:|:-:|"));
        assert!(is_separator_line("-----"));
        assert!(!is_separator_line("| a | - |"));
        assert!(!is_separator_line("| | |"));
        assert!(!is_separator_line(""));
    }

    #[test]
    fn classify_each_kind() {
        assert_eq!(classify_line("Day 1"), LineKind::Label);
        assert_eq!(classify_line("|---|---|"), LineKind::Separator);
        assert_eq!(classify_line("| Meal | Food |"), LineKind::Data);
        assert_eq!(classify_line("Stay hydrated."), LineKind::Prose);
    }

    #[test]
    fn split_absorbs_outer_pipes_and_blanks() {
        assert_eq!(split_cells("| Meal | Food |"), vec!["Meal", "Food"]);
        assert_eq!(split_cells("Meal|Food"), vec!["Meal", "Food"]);
        assert_eq!(split_cells("| Lunch |  | Rice |"), vec!["Lunch", "Rice"]);
        assert!(split_cells("| | |").is_empty());
    }

    #[test]
    fn day_token_anywhere() {
        assert!(contains_day_token("Here is your plan.\n**Day 1**"));
        assert!(!contains_day_token("No days here"));
    }
}
