//! PDF text extraction.
//!
//! The parser downstream is positional: it expects every table cell and
//! every free-standing text run on its own line. Text is therefore collected
//! as separate items wherever the document leaves a column-sized gap or
//! starts a new baseline, instead of being reflowed into visual lines.
//! Page order and the order of items within a page are kept as drawn.

use std::panic::{self, AssertUnwindSafe};

use pdf_extract::{Document, MediaBox, OutputDev, OutputError, Transform};

use crate::error::{AppError, Result};

/// Horizontal gap, in font sizes, that separates two text items.
const ITEM_GAP: f64 = 0.5;

/// Smaller gaps inside an item are read as word spaces.
const WORD_GAP: f64 = 0.15;

/// End of the last glyph written, in device space.
#[derive(Debug, Clone, Copy)]
struct Pen {
    x: f64,
    y: f64,
    size: f64,
}

/// Collects text items per page; each page is its items joined by `\n`.
#[derive(Debug, Default)]
struct TextItems {
    pages: Vec<String>,
    items: Vec<String>,
    current: String,
    pen: Option<Pen>,
}

impl TextItems {
    fn flush_item(&mut self) {
        let item = std::mem::take(&mut self.current);
        if !item.trim().is_empty() {
            self.items.push(item);
        }
        self.pen = None;
    }
}

impl OutputDev for TextItems {
    fn begin_page(
        &mut self,
        _page_num: u32,
        _media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> std::result::Result<(), OutputError> {
        self.items.clear();
        self.current.clear();
        self.pen = None;
        Ok(())
    }

    fn end_page(&mut self) -> std::result::Result<(), OutputError> {
        self.flush_item();
        self.pages.push(std::mem::take(&mut self.items).join("\n"));
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        spacing: f64,
        font_size: f64,
        char: &str,
    ) -> std::result::Result<(), OutputError> {
        let scale_x = trm.m11.hypot(trm.m12);
        let scale_y = trm.m21.hypot(trm.m22);
        let size = match font_size * scale_y {
            s if s > 0.0 => s,
            _ => font_size.abs().max(1.0),
        };
        let (x, y) = (trm.m31, trm.m32);

        if let Some(pen) = self.pen {
            let em = pen.size.max(size);
            let gap = x - pen.x;
            if (y - pen.y).abs() > 0.5 * em || gap > ITEM_GAP * em || gap < -em {
                self.flush_item();
            } else if gap > WORD_GAP * em && !self.current.ends_with(' ') {
                self.current.push(' ');
            }
        }

        self.current.push_str(char);
        self.pen = Some(Pen {
            x: x + (width * font_size + spacing) * scale_x,
            y,
            size,
        });
        Ok(())
    }

    fn begin_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }
}

fn collect_pages(data: &[u8]) -> std::result::Result<Vec<String>, OutputError> {
    let mut doc = Document::load_mem(data)?;
    if doc.is_encrypted() {
        doc.decrypt("")?;
    }

    let mut items = TextItems::default();
    pdf_extract::output_doc(&doc, &mut items)?;
    Ok(items.pages)
}

/// Extract the text items of each page, in page order.
///
/// `pdf_extract` panics on some malformed documents; panics are turned into
/// parse errors.
pub fn extract_pages(data: &[u8]) -> Result<Vec<String>> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| collect_pages(data)));

    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(AppError::parse(format!("PDF extraction failed: {e}"))),
        Err(_) => Err(AppError::parse(
            "PDF extraction panicked (malformed document)",
        )),
    }
}

/// Join pages, each terminated by a line break, and return the trimmed
/// non-blank lines.
pub fn lines_from_pages<S: AsRef<str>>(pages: &[S]) -> Vec<String> {
    let mut text = String::new();
    for page in pages {
        text.push_str(page.as_ref());
        text.push('\n');
    }

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Extract the parser input from a downloaded document.
pub fn extract_lines(data: &[u8]) -> Result<Vec<String>> {
    let pages = extract_pages(data)?;
    let lines = lines_from_pages(&pages);
    if lines.is_empty() {
        return Err(AppError::parse(
            "PDF contains no extractable text (may be scanned/image-only)",
        ));
    }
    log::debug!("Extracted {} lines from {} pages", lines.len(), pages.len());
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a PDF whose pages hold 12pt Helvetica text runs at `(x, y)`,
    /// each drawn in its own text object.
    fn pdf_with_pages(pages: &[&[(u32, u32, &str)]]) -> Vec<u8> {
        let mut objects: Vec<String> = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".into(),
            String::new(),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .into(),
        ];

        let mut kids = Vec::new();
        for cells in pages {
            let content: String = cells
                .iter()
                .map(|(x, y, text)| format!("BT /F1 12 Tf {x} {y} Td ({text}) Tj ET\n"))
                .collect();
            objects.push(format!(
                "<< /Length {} >>\nstream\n{content}endstream",
                content.len()
            ));
            let content_id = objects.len();
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 595 842] /Contents {content_id} 0 R \
                 /Resources << /Font << /F1 3 0 R >> >> >>"
            ));
            kids.push(format!("{} 0 R", objects.len()));
        }
        objects[1] = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            kids.len()
        );

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
        }

        let xref = pdf.len();
        let mut tail = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            tail.push_str(&format!("{offset:010} 00000 n \n"));
        }
        tail.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n",
            objects.len() + 1
        ));
        pdf.extend_from_slice(tail.as_bytes());
        pdf
    }

    #[test]
    fn cells_on_one_row_become_separate_lines() {
        let pdf = pdf_with_pages(&[&[
            (50, 750, "Stundenplan 2023 - 2024"),
            (50, 700, "10"),
            (120, 700, "5A"),
            (190, 700, "Mathe"),
            (260, 700, "Herr Mueller"),
        ]]);

        assert_eq!(
            extract_lines(&pdf).unwrap(),
            vec!["Stundenplan 2023 - 2024", "10", "5A", "Mathe", "Herr Mueller"]
        );
    }

    #[test]
    fn pages_are_read_in_document_order() {
        let pdf = pdf_with_pages(&[
            &[
                (50, 700, "3"),
                (120, 700, "7B"),
                (190, 700, "De"),
                (50, 60, "Humboldt-Gymnasium Potsdam"),
            ],
            &[
                (50, 700, "5-6"),
                (120, 700, "10A, 10B"),
                (260, 700, "Sport"),
            ],
        ]);

        assert_eq!(
            extract_lines(&pdf).unwrap(),
            vec![
                "3",
                "7B",
                "De",
                "Humboldt-Gymnasium Potsdam",
                "5-6",
                "10A, 10B",
                "Sport"
            ]
        );
    }

    #[test]
    fn narrow_gap_is_a_word_space() {
        // "Herr" is about 23.3pt wide at 12pt, leaving a 3.7pt gap.
        let pdf = pdf_with_pages(&[&[(50, 700, "Herr"), (77, 700, "Mueller")]]);

        assert_eq!(extract_lines(&pdf).unwrap(), vec!["Herr Mueller"]);
    }

    #[test]
    fn page_without_text_is_an_error() {
        let pdf = pdf_with_pages(&[&[]]);

        assert!(matches!(extract_lines(&pdf), Err(AppError::Parse(_))));
    }

    #[test]
    fn pages_keep_order_and_drop_blank_lines() {
        let pages = ["Stundenplan 2023 - 2024\n\n  Stunde  ", "   \nText\n1"];
        assert_eq!(
            lines_from_pages(&pages),
            vec!["Stundenplan 2023 - 2024", "Stunde", "Text", "1"]
        );
    }

    #[test]
    fn page_without_trailing_newline_does_not_merge_with_next() {
        let pages = ["R101", "Humboldt-Gymnasium Potsdam"];
        assert_eq!(
            lines_from_pages(&pages),
            vec!["R101", "Humboldt-Gymnasium Potsdam"]
        );
    }

    #[test]
    fn malformed_data_returns_error() {
        let result = extract_lines(b"definitely not a pdf");
        assert!(matches!(result, Err(AppError::Parse(_))));
    }
}
