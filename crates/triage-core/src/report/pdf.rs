//! PDF rendering of the report layout.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use super::{ReportError, ReportResult};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 12.0;
const LINE_HEIGHT: f32 = 10.0;
const WRAP_COLUMNS: usize = 85;
const LAYER: &str = "Layer 1";

/// Render a centered title followed by one line per field on A4 pages.
pub(super) fn render(title: &str, lines: &[String]) -> ReportResult<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
    let title_font = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?;
    let body_font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;

    let mut current = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT - MARGIN - LINE_HEIGHT;

    current.use_text(title, TITLE_SIZE, Mm(centered_x(title, TITLE_SIZE)), Mm(y), &title_font);
    y -= LINE_HEIGHT * 1.5;

    for line in lines.iter().flat_map(|l| wrap(l, WRAP_COLUMNS)) {
        if y < MARGIN {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
            current = doc.get_page(page).get_layer(layer);
            y = PAGE_HEIGHT - MARGIN - LINE_HEIGHT;
        }
        write_line(&current, &line, y, &body_font);
        y -= LINE_HEIGHT;
    }

    doc.save_to_bytes().map_err(pdf_error)
}

fn write_line(layer: &PdfLayerReference, line: &str, y: f32, font: &IndirectFontRef) {
    if !line.is_empty() {
        layer.use_text(line, BODY_SIZE, Mm(MARGIN), Mm(y), font);
    }
}

// Helvetica averages roughly half an em per glyph
fn centered_x(text: &str, size: f32) -> f32 {
    let width_mm = text.chars().count() as f32 * size * 0.5 * 25.4 / 72.0;
    ((PAGE_WIDTH - width_mm) / 2.0).max(MARGIN)
}

/// Greedy word wrap; words longer than a line are kept whole.
fn wrap(line: &str, columns: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();

    for word in line.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > columns {
            out.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    out.push(current);
    out
}

fn pdf_error(e: printpdf::Error) -> ReportError {
    ReportError::Pdf(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("", 10), vec![""]);
        assert_eq!(wrap("Name: Ann", 10), vec!["Name: Ann"]);
        assert_eq!(
            wrap("Foods to Eat: soup, rice, tea", 14),
            vec!["Foods to Eat:", "soup, rice,", "tea"]
        );
    }

    #[test]
    fn test_long_report_spans_pages() {
        let lines: Vec<String> = (0..60).map(|i| format!("Line {}", i)).collect();
        let bytes = render("Patient Report", &lines).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }
}
