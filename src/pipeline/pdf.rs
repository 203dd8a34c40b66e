//! PDF emission: serialise a [`Layout`] with `pdf-writer`.
//!
//! Text is drawn in the standard Helvetica Type1 font with WinAnsi encoding,
//! which every viewer ships, so nothing is embedded. Characters outside
//! WinAnsi are replaced with `?`.

use crate::config::ExportConfig;
use crate::pipeline::layout::{Align, Layout, LayoutOp, LayoutPage};
use crate::pipeline::metrics::{Helvetica, TextMeasure, PT_PER_MM};
use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str, TextStr};
use tracing::debug;

const FONT_NAME: Name<'static> = Name(b"F1");

/// Serialise `layout` to PDF bytes.
pub fn write_pdf(layout: &Layout, config: &ExportConfig) -> Vec<u8> {
    let mut pdf = Pdf::new();

    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let font_id = Ref::new(3);
    let info_id = Ref::new(4);
    let mut next_ref = 5;

    let page_refs: Vec<(Ref, Ref)> = layout
        .pages
        .iter()
        .map(|_| {
            let ids = (Ref::new(next_ref), Ref::new(next_ref + 1));
            next_ref += 2;
            ids
        })
        .collect();

    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id)
        .kids(page_refs.iter().map(|(page_id, _)| *page_id))
        .count(page_refs.len() as i32);

    pdf.type1_font(font_id)
        .base_font(Name(b"Helvetica"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));

    pdf.document_info(info_id)
        .title(TextStr(&config.title))
        .producer(TextStr(concat!("dietplan-md2pdf ", env!("CARGO_PKG_VERSION"))));

    let width_pt = layout.page_width * PT_PER_MM;
    let height_pt = layout.page_height * PT_PER_MM;

    for (page, (page_id, content_id)) in layout.pages.iter().zip(&page_refs) {
        {
            let mut pdf_page = pdf.page(*page_id);
            pdf_page.media_box(Rect::new(0.0, 0.0, width_pt, height_pt));
            pdf_page.parent(page_tree_id);
            pdf_page.contents(*content_id);
            {
                let mut resources = pdf_page.resources();
                resources.fonts().pair(FONT_NAME, font_id);
            }
            pdf_page.finish();
        }

        let content = page_content(page, layout.page_height, config);
        pdf.stream(*content_id, &content);
    }

    let bytes = pdf.finish();
    debug!(
        "Wrote {} page(s), {} bytes",
        layout.pages.len(),
        bytes.len()
    );
    bytes
}

/// Content stream for one page. Converts top-left millimetres to
/// bottom-left points.
fn page_content(page: &LayoutPage, page_height: f32, config: &ExportConfig) -> Vec<u8> {
    let k = PT_PER_MM;
    let mut content = Content::new();
    content.set_line_width(config.border_width * k);
    content.set_stroke_gray(0.0);
    content.set_fill_gray(0.0);

    for op in &page.ops {
        match op {
            LayoutOp::Rect { x, y, w, h } => {
                content.rect(x * k, (page_height - y - h) * k, w * k, h * k);
                content.stroke();
            }
            LayoutOp::Text {
                x,
                y,
                lines,
                font_size,
                leading,
                align,
            } => {
                for (i, line) in lines.iter().enumerate() {
                    if line.is_empty() {
                        continue;
                    }
                    let left = match align {
                        Align::Left => *x,
                        Align::Center => x - Helvetica.width_mm(line, *font_size) / 2.0,
                    };
                    let baseline = y + i as f32 * leading;
                    let bytes = encode_winansi(line);
                    content.begin_text();
                    content.set_font(FONT_NAME, *font_size);
                    content.next_line(left * k, (page_height - baseline) * k);
                    content.show(Str(&bytes));
                    content.end_text();
                }
            }
        }
    }

    content.finish()
}

/// Encode `text` in WinAnsi (CP-1252). Unmappable characters become `?`.
pub fn encode_winansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7E}' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '\u{20AC}' => 0x80,
            '\u{201A}' => 0x82,
            '\u{201E}' => 0x84,
            '\u{2026}' => 0x85,
            '\u{2030}' => 0x89,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\t' => b' ',
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::pipeline::layout::paginate;

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    fn sample_layout(rows: usize) -> Layout {
        let grid = Grid::new(
            vec!["Meal".into(), "Food".into()],
            (0..rows)
                .map(|i| vec![format!("Meal {i}"), "Oats".into()])
                .collect(),
        );
        paginate(&grid, &ExportConfig::default(), &Helvetica)
    }

    #[test]
    fn output_is_a_pdf() {
        let bytes = write_pdf(&sample_layout(3), &ExportConfig::default());
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(contains(&bytes, b"/Helvetica"));
        assert!(contains(&bytes, b"%%EOF"));
    }

    #[test]
    fn page_count_matches_layout() {
        let layout = sample_layout(80);
        assert!(layout.page_count() > 1);
        let bytes = write_pdf(&layout, &ExportConfig::default());
        let expected = format!("/Count {}", layout.page_count());
        assert!(contains(&bytes, expected.as_bytes()));
    }

    #[test]
    fn winansi_ascii_passthrough() {
        assert_eq!(encode_winansi("Oats (1 cup)"), b"Oats (1 cup)".to_vec());
    }

    #[test]
    fn winansi_latin1_and_punctuation() {
        assert_eq!(encode_winansi("café"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(encode_winansi("a–b"), vec![b'a', 0x96, b'b']);
        assert_eq!(encode_winansi("“x”"), vec![0x93, b'x', 0x94]);
    }

    #[test]
    fn winansi_unmappable_becomes_question_mark() {
        assert_eq!(encode_winansi("🥑"), b"?".to_vec());
        assert_eq!(encode_winansi("日本"), b"??".to_vec());
    }
}
