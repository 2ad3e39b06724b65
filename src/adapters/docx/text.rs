use super::DOCUMENT_PART;
use crate::domain::ports::TextExtractor;
use crate::utils::error::{DocGenError, Result};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

/// Extracts the body text of a `.docx`, one line per paragraph.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxTextExtractor;

impl DocxTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for DocxTextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String> {
        let conversion_error = |message: String| DocGenError::ConversionError {
            path: path.to_path_buf(),
            message,
        };

        let mut archive = ZipArchive::new(File::open(path)?)?;
        let mut entry = archive
            .by_name(DOCUMENT_PART)
            .map_err(|_| conversion_error(format!("missing {}", DOCUMENT_PART)))?;

        let mut xml = String::new();
        entry.read_to_string(&mut xml)?;
        document_text(&xml)
            .map_err(|e| conversion_error(format!("malformed {}: {}", DOCUMENT_PART, e)))
    }
}

/// Walks the WordprocessingML body. Text, tabs and breaks count only inside a
/// run (`w:r`); the same element names also appear in paragraph properties.
pub(crate) fn document_text(xml: &str) -> std::result::Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut run_depth = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:r" => run_depth += 1,
                b"w:t" if run_depth > 0 => in_text = true,
                b"w:tab" if run_depth > 0 => text.push('\t'),
                b"w:br" | b"w:cr" if run_depth > 0 => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" if run_depth > 0 => text.push('\t'),
                b"w:br" | b"w:cr" if run_depth > 0 => text.push('\n'),
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:r" => run_depth = run_depth.saturating_sub(1),
                b"w:t" => in_text = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_text => text.push_str(&e.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text.trim().to_string())
}
