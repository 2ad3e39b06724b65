use crate::domain::ports::TargetWriter;
use crate::utils::error::{DocGenError, Result};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::path::Path;

const MM: f64 = 72.0 / 25.4;

/// Page geometry and typography for generated PDFs.
#[derive(Debug, Clone)]
pub struct PdfLayout {
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    pub margin_mm: f64,
    pub font_size: i64,
    pub line_height: i64,
}

impl Default for PdfLayout {
    /// A4, 15 mm margins, 12 pt Helvetica.
    fn default() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 15.0,
            font_size: 12,
            line_height: 15,
        }
    }
}

impl PdfLayout {
    fn page_width(&self) -> i64 {
        (self.page_width_mm * MM).round() as i64
    }

    fn page_height(&self) -> i64 {
        (self.page_height_mm * MM).round() as i64
    }

    fn margin(&self) -> i64 {
        (self.margin_mm * MM).round() as i64
    }

    fn lines_per_page(&self) -> usize {
        let usable = self.page_height() - 2 * self.margin();
        (usable / self.line_height.max(1)).max(1) as usize
    }

    /// Helvetica averages roughly half an em per glyph.
    fn chars_per_line(&self) -> usize {
        let usable = (self.page_width() - 2 * self.margin()) as f64;
        (usable / (self.font_size.max(1) as f64 * 0.5)).floor().max(1.0) as usize
    }
}

/// Lays plain text out on Helvetica pages with automatic page breaks.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    layout: PdfLayout,
}

impl PdfWriter {
    pub fn new(layout: PdfLayout) -> Self {
        Self { layout }
    }

    pub fn render(&self, text: &str) -> Result<Vec<u8>> {
        let lines = wrap_lines(text, self.layout.chars_per_line());
        let blank: &[String] = &[];
        let pages: Vec<&[String]> = if lines.is_empty() {
            vec![blank]
        } else {
            lines.chunks(self.layout.lines_per_page()).collect()
        };

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids = Vec::with_capacity(pages.len());
        for page_lines in pages {
            let page_id = self.add_page(&mut doc, pages_id, page_lines)?;
            kids.push(Object::Reference(page_id));
        }

        let page_count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(page_count),
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(self.layout.page_width()),
                Object::Integer(self.layout.page_height()),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).map_err(DocGenError::pdf)?;
        Ok(buffer)
    }

    fn add_page(&self, doc: &mut Document, pages_id: ObjectId, lines: &[String]) -> Result<ObjectId> {
        let top = self.layout.page_height() - self.layout.margin() - self.layout.font_size;
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![Object::Name(b"F1".to_vec()), Object::Integer(self.layout.font_size)],
            ),
            Operation::new("TL", vec![Object::Integer(self.layout.line_height)]),
            Operation::new(
                "Td",
                vec![Object::Integer(self.layout.margin()), Object::Integer(top)],
            ),
        ];
        for line in lines {
            operations.push(Operation::new("Tj", vec![Object::string_literal(win_ansi(line))]));
            operations.push(Operation::new("T*", vec![]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations }.encode().map_err(DocGenError::pdf)?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));

        Ok(doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        }))
    }
}

impl TargetWriter for PdfWriter {
    fn write_document(&self, text: &str, path: &Path) -> Result<()> {
        let bytes = self.render(text)?;
        if let Err(e) = std::fs::write(path, &bytes) {
            let _ = std::fs::remove_file(path);
            return Err(e.into());
        }
        Ok(())
    }
}

/// Splits on newlines, expands tabs and word-wraps to `width` characters.
fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in text.lines() {
        let expanded = raw.replace('\t', "    ");
        let expanded = expanded.trim_end();
        if expanded.chars().count() <= width {
            lines.push(expanded.to_string());
            continue;
        }

        let mut current = String::new();
        for word in expanded.split(' ') {
            let candidate_len =
                current.chars().count() + usize::from(!current.is_empty()) + word.chars().count();
            if candidate_len > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            while current.chars().count() > width {
                let head: String = current.chars().take(width).collect();
                let tail: String = current.chars().skip(width).collect();
                lines.push(head);
                current = tail;
            }
        }
        lines.push(current);
    }
    lines
}

/// Encodes a line for a WinAnsi font. Latin-1 maps straight through, the
/// 0x80..=0x9F block holds the typographic extras, anything else is `?`.
fn win_ansi(line: &str) -> Vec<u8> {
    line.chars()
        .map(|c| match u32::from(c) {
            code @ 0x20..=0x7E | code @ 0xA0..=0xFF => code as u8,
            _ => win_ansi_extra(c).unwrap_or(b'?'),
        })
        .collect()
}

fn win_ansi_extra(c: char) -> Option<u8> {
    let code = match c {
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_produces_loadable_pdf() {
        let bytes = PdfWriter::default().render("Hello (World)\nSecond line").unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_long_text_breaks_pages() {
        let layout = PdfLayout::default();
        let per_page = layout.lines_per_page();
        let text: Vec<String> = (0..per_page * 2 + 1).map(|i| format!("line {}", i)).collect();

        let bytes = PdfWriter::new(layout).render(&text.join("\n")).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_wrap_lines() {
        assert_eq!(wrap_lines("a b c d", 3), vec!["a b", "c d"]);
        assert_eq!(wrap_lines("abcdefg", 3), vec!["abc", "def", "g"]);
        assert_eq!(wrap_lines("x\n\ny", 10), vec!["x", "", "y"]);
        assert_eq!(wrap_lines("\tz", 10), vec!["    z"]);
    }

    #[test]
    fn test_win_ansi_maps_typographic_characters() {
        assert_eq!(
            win_ansi("O\u{2019}Brien \u{20AC}"),
            vec![b'O', 0x92, b'B', b'r', b'i', b'e', b'n', b' ', 0x80]
        );
        assert_eq!(
            win_ansi("\u{201C}caf\u{e9}\u{201D} \u{2013} \u{2022}"),
            vec![0x93, b'c', b'a', b'f', 0xE9, 0x94, b' ', 0x96, b' ', 0x95]
        );
    }

    #[test]
    fn test_win_ansi_replaces_unmappable() {
        assert_eq!(win_ansi("\u{3042}\u{1F600} \u{81}"), vec![b'?', b'?', b' ', b'?']);
    }

    #[test]
    fn test_write_document_to_missing_dir_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.pdf");
        assert!(PdfWriter::default().write_document("text", &path).is_err());
        assert!(!path.exists());
    }
}
