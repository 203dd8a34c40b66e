//! Text measurement and wrapping in page units (millimetres).
//!
//! Widths come from the Adobe Helvetica metrics (1/1000 em). The exporter
//! draws with the standard Helvetica Type1 font, so no font file needs to be
//! embedded and the measurements here match what the viewer renders.

/// Points per millimetre.
pub const PT_PER_MM: f32 = 72.0 / 25.4;

/// Measures rendered text width.
///
/// The paginator only needs widths, so alternative fonts plug in here
/// without touching layout code.
pub trait TextMeasure {
    /// Width of `text` at `font_size` points, in millimetres.
    fn width_mm(&self, text: &str, font_size: f32) -> f32;
}

/// Standard Helvetica (regular) metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct Helvetica;

impl Helvetica {
    /// Advance width of one character in 1/1000 em.
    pub fn advance(c: char) -> u16 {
        match c {
            ' ' | '!' | ',' | '.' | '/' | ':' | ';' | '[' | '\\' | ']' | 'I' | 'f' | 't' => 278,
            '"' => 355,
            '#' | '$' | '0'..='9' | '?' | '_' | 'L' => 556,
            'a' | 'b' | 'd' | 'e' | 'g' | 'h' | 'n' | 'o' | 'p' | 'q' | 'u' => 556,
            '%' => 889,
            '&' | 'A' | 'B' | 'E' | 'K' | 'P' | 'S' | 'V' | 'X' | 'Y' => 667,
            '\'' => 191,
            '(' | ')' | '-' | '`' | 'r' => 333,
            '*' => 389,
            '+' | '<' | '=' | '>' | '~' => 584,
            '@' => 1015,
            'C' | 'D' | 'H' | 'N' | 'R' | 'U' => 722,
            'F' | 'T' | 'Z' => 611,
            'G' | 'O' | 'Q' => 778,
            'J' | 'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' => 500,
            'M' | 'm' => 833,
            'W' => 944,
            '^' => 469,
            'i' | 'j' | 'l' => 222,
            'w' => 722,
            '{' | '}' => 334,
            '|' => 260,
            // WinAnsi extras the encoder maps
            '\u{2013}' => 556,
            '\u{2014}' | '\u{2026}' | '\u{2030}' => 1000,
            '\u{2018}' | '\u{2019}' | '\u{201A}' => 222,
            '\u{201C}' | '\u{201D}' | '\u{201E}' => 333,
            '\u{2022}' => 350,
            '\u{20AC}' => 556,
            '\u{00B0}' => 400,
            '\u{00B7}' => 278,
            _ => 556,
        }
    }
}

impl TextMeasure for Helvetica {
    fn width_mm(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| Self::advance(c) as u32).sum();
        units as f32 / 1000.0 * font_size / PT_PER_MM
    }
}

/// Wrap `text` so that every line fits within `max_width` millimetres.
///
/// Embedded newlines are hard breaks. Words are separated by whitespace;
/// a single word wider than `max_width` is broken between characters, with
/// at least one character per line so wrapping always makes progress.
/// Always returns at least one line (an empty string yields `[""]`).
pub fn wrap_text(
    measure: &dyn TextMeasure,
    text: &str,
    max_width: f32,
    font_size: f32,
) -> Vec<String> {
    let fits = |s: &str| measure.width_mm(s, font_size) <= max_width;
    let mut out = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();

        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            if fits(&candidate) {
                line = candidate;
                continue;
            }

            if !line.is_empty() {
                out.push(std::mem::take(&mut line));
            }
            if fits(word) {
                line = word.to_string();
                continue;
            }

            // over-long word: hard break
            for c in word.chars() {
                line.push(c);
                if !fits(&line) && line.chars().count() > 1 {
                    line.pop();
                    out.push(std::mem::take(&mut line));
                    line.push(c);
                }
            }
        }

        out.push(line);
    }

    out
}
