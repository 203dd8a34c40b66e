//! Post-processing: deterministic cleanup of model-generated markdown.
//!
//! Chat models follow "format strictly as a markdown table" loosely. They
//! wrap the answer in ```markdown fences, forget the `|---|` delimiter row,
//! glue a table directly under a `Day 3` line, or sprinkle zero-width
//! characters. The day-block parser tolerates most of this, but the
//! markdown parser used for PDF export does not, so replies are normalised
//! once, right after they arrive.
//!
//! Rules, in order:
//! 1. Strip an outer markdown fence
//! 2. Normalise line endings (CRLF/CR → LF)
//! 3. Trim trailing whitespace per line
//! 4. Remove invisible Unicode (zero-width space, BOM, soft hyphen, …)
//! 5. Insert a missing delimiter row under each table header
//! 6. Ensure a blank line before each table
//! 7. Collapse 3+ consecutive blank lines down to 2
//! 8. End with exactly one newline

use crate::pipeline::lines::is_separator_line;
use once_cell::sync::Lazy;
use regex::Regex;

/// Apply every cleanup rule to a raw model reply.
pub fn clean_markdown(input: &str) -> String {
    let s = strip_markdown_fences(input);
    let s = normalise_line_endings(&s);
    let s = trim_trailing_whitespace(&s);
    let s = remove_invisible_chars(&s);
    let s = repair_table_delimiters(&s);
    let s = separate_tables(&s);
    let s = collapse_blank_lines(&s);
    ensure_final_newline(&s)
}

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:markdown|md)?\r?\n(.*)\n```\s*$").unwrap());

fn strip_markdown_fences(input: &str) -> String {
    match RE_OUTER_FENCES.captures(input.trim()) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        ['\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}'],
        "",
    )
}

/// A markdown table row: starts with a pipe and has at least one cell
/// separator after it.
fn is_table_row(line: &str) -> bool {
    let t = line.trim();
    t.starts_with('|') && t[1..].contains('|')
}

/// Number of cells in a table row, counting blank ones (`| | Lunch |` is
/// two cells). Only the pieces outside the outer pipes are dropped.
fn column_count(line: &str) -> usize {
    let t = line.trim();
    let t = t.strip_prefix('|').unwrap_or(t);
    let t = t.strip_suffix('|').unwrap_or(t);
    t.split('|').count()
}

/// Give every table a delimiter row directly under its first row.
///
/// Only the first row of each contiguous run of table rows is examined, so
/// body rows are never touched.
fn repair_table_delimiters(input: &str) -> String {
    let lines: Vec<&str> = input.lines().collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len() + 4);
    let mut prev_is_row = false;

    for (i, line) in lines.iter().enumerate() {
        out.push(line.to_string());
        let is_row = is_table_row(line);
        let starts_table = is_row && !prev_is_row && !is_separator_line(line);
        if starts_table {
            let next = lines.get(i + 1).copied().unwrap_or("");
            if is_table_row(next) && !is_separator_line(next) {
                let columns = column_count(line);
                let delimiter: String = std::iter::once("|")
                    .chain(std::iter::repeat(" --- |").take(columns))
                    .collect();
                out.push(delimiter);
            }
        }
        prev_is_row = is_row;
    }

    out.join("\n")
}

/// Insert a blank line between a table and a directly preceding text line
/// (typically the `Day N` heading), so markdown parsers start a table
/// instead of continuing the paragraph.
fn separate_tables(input: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut prev: Option<&str> = None;

    for line in input.lines() {
        if let Some(p) = prev {
            let glued = is_table_row(line) && !p.trim().is_empty() && !is_table_row(p);
            if glued {
                out.push("");
            }
        }
        out.push(line);
        prev = Some(line);
    }

    out.join("\n")
}

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n\n").to_string()
}

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_end();
    if trimmed.is_empty() {
        String::from("\n")
    } else {
        format!("{trimmed}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_fences() {
        assert_eq!(strip_markdown_fences("```markdown\n# Hi\nthere\n```"), "# Hi\nthere");
        assert_eq!(strip_markdown_fences("```\n| a |\n```"), "| a |");
        assert_eq!(strip_markdown_fences("no fences"), "no fences");
    }

    #[test]
    fn line_endings() {
        assert_eq!(normalise_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn trailing_whitespace() {
        assert_eq!(trim_trailing_whitespace("  a   \nb \t"), "  a\nb");
    }

    #[test]
    fn invisible_chars() {
        assert_eq!(remove_invisible_chars("Oa\u{200B}ts\u{FEFF}"), "Oats");
    }

    #[test]
    fn delimiter_inserted_once_per_table() {
        let out = repair_table_delimiters("| Meal | Food |\n| Lunch | Rice |\n| Dinner | Soup |");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "| --- | --- |");
        assert_eq!(lines.iter().filter(|l| is_separator_line(l)).count(), 1);
    }

    #[test]
    fn blank_header_cells_count_as_columns() {
        assert_eq!(column_count("| | Breakfast | Lunch |"), 3);
        assert_eq!(column_count("Meal | Food"), 2);
        assert_eq!(column_count("| Meal |  |"), 2);

        let out = repair_table_delimiters("| | Breakfast | Lunch |\n| Day 1 | Oats | Rice |");
        assert_eq!(out.lines().nth(1), Some("| --- | --- | --- |"));
    }

    #[test]
    fn existing_delimiter_kept() {
        let input = "| Meal | Food |\n|---|---|\n| Lunch | Rice |";
        assert_eq!(repair_table_delimiters(input), input);
    }

    #[test]
    fn table_after_label_gets_blank_line() {
        let out = separate_tables("Day 1\n| Meal | Food |\n|---|---|");
        assert_eq!(out, "Day 1\n\n| Meal | Food |\n|---|---|");
    }

    #[test]
    fn separate_tables_leaves_rows_alone() {
        let input = "Day 1\n\n| A | B |\n|---|---|\n| 1 | 2 |";
        assert_eq!(separate_tables(input), input);
    }

    #[test]
    fn collapse_blanks() {
        assert_eq!(collapse_blank_lines("a\n\n\n\n\n\nb"), "a\n\n\nb");
    }

    #[test]
    fn final_newline() {
        assert_eq!(ensure_final_newline("x\n\n"), "x\n");
        assert_eq!(ensure_final_newline(""), "\n");
    }

    #[test]
    fn full_pipeline_on_fenced_plan() {
        let raw = "```markdown\r\nDay 1\r\n| Meal | Food |\r\n| Breakfast | Oats |   \r\n```";
        let cleaned = clean_markdown(raw);
        assert_eq!(
            cleaned,
            "Day 1\n\n| Meal | Food |\n| --- | --- |\n| Breakfast | Oats |\n"
        );
    }
}
