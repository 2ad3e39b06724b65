use super::DOCUMENT_PART;
use crate::domain::model::Row;
use crate::domain::ports::TemplateEngine;
use crate::utils::error::{DocGenError, Result};
use quick_xml::escape::escape;
use regex::Regex;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

// Word often splits `{{` / `}}` and the field name across several runs.
static SPLIT_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{((?:<[^>]*>)+)\{").expect("valid regex"));
static SPLIT_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\}((?:<[^>]*>)+)\}").expect("valid regex"));
static SPANNING_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{((?:[^{}<]|<[^>]*>)*?)\}\}").expect("valid regex"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([^{}]*?)\s*\}\}").expect("valid regex"));
static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

enum Part {
    Markup(String),
    Binary(Vec<u8>),
}

/// A parsed `.docx` template: every package part, with the text-bearing XML
/// parts already normalised so each placeholder sits inside one run.
pub struct DocxTemplate {
    path: PathBuf,
    parts: Vec<(String, Part)>,
    placeholders: Vec<String>,
}

impl DocxTemplate {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Distinct placeholder names in first-seen order.
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DocxTemplateEngine;

impl DocxTemplateEngine {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateEngine for DocxTemplateEngine {
    type Template = DocxTemplate;

    fn open_template(&self, path: &Path) -> Result<DocxTemplate> {
        let template_error = |message: String| DocGenError::RenderError {
            row_index: None,
            path: Some(path.to_path_buf()),
            message,
        };

        let bytes = std::fs::read(path)
            .map_err(|e| template_error(format!("cannot read template: {}", e)))?;
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| template_error(format!("not a .docx package: {}", e)))?;

        let mut parts = Vec::with_capacity(archive.len());
        let mut placeholders: Vec<String> = Vec::new();

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;

            if is_templatable(&name) {
                let xml = String::from_utf8(data)
                    .map_err(|_| template_error(format!("{} is not valid UTF-8", name)))?;
                let normalized = normalize_placeholders(&xml);
                for field in check_placeholders(&normalized).map_err(template_error)? {
                    if !placeholders.contains(&field) {
                        placeholders.push(field);
                    }
                }
                parts.push((name, Part::Markup(normalized)));
            } else {
                parts.push((name, Part::Binary(data)));
            }
        }

        if !parts.iter().any(|(name, _)| name == DOCUMENT_PART) {
            return Err(template_error(format!("missing {}", DOCUMENT_PART)));
        }

        tracing::debug!(
            "Loaded template {} with placeholders: {}",
            path.display(),
            placeholders.join(", ")
        );

        Ok(DocxTemplate {
            path: path.to_path_buf(),
            parts,
            placeholders,
        })
    }

    fn render(&self, template: &DocxTemplate, row: &Row) -> Result<Vec<u8>> {
        for name in &template.placeholders {
            if row.get(name).is_none() {
                tracing::debug!("Row has no field '{}', rendering it blank", name);
            }
        }

        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        for (name, part) in &template.parts {
            zip.start_file(name.as_str(), options)?;
            match part {
                Part::Markup(xml) => zip.write_all(substitute(xml, row).as_bytes())?,
                Part::Binary(data) => zip.write_all(data)?,
            }
        }

        Ok(zip.finish()?.into_inner())
    }
}

fn is_templatable(name: &str) -> bool {
    if name == DOCUMENT_PART || name == "word/footnotes.xml" || name == "word/endnotes.xml" {
        return true;
    }
    name.strip_prefix("word/")
        .map(|rest| {
            (rest.starts_with("header") || rest.starts_with("footer"))
                && rest.ends_with(".xml")
                && !rest.contains('/')
        })
        .unwrap_or(false)
}

/// Pulls run boundaries out of placeholders so `{{`, the name and `}}` end up
/// contiguous inside the first run.
pub(crate) fn normalize_placeholders(xml: &str) -> String {
    let joined_open = SPLIT_OPEN.replace_all(xml, |caps: &regex::Captures| {
        format!("{{{{{}", &caps[1])
    });
    let joined_close = SPLIT_CLOSE.replace_all(&joined_open, |caps: &regex::Captures| {
        format!("{}}}}}", &caps[1])
    });
    SPANNING_PLACEHOLDER
        .replace_all(&joined_close, |caps: &regex::Captures| {
            format!("{{{{{}}}}}", TAG.replace_all(&caps[1], ""))
        })
        .into_owned()
}

fn check_placeholders(xml: &str) -> std::result::Result<Vec<String>, String> {
    let mut names = Vec::new();
    for caps in PLACEHOLDER.captures_iter(xml) {
        let name = &caps[1];
        if !IDENTIFIER.is_match(name) {
            return Err(format!("unsupported placeholder '{{{{ {} }}}}'", name));
        }
        names.push(name.to_string());
    }

    let remainder = PLACEHOLDER.replace_all(xml, "");
    if remainder.contains("{{") {
        return Err("unclosed placeholder '{{'".to_string());
    }
    Ok(names)
}

fn substitute(xml: &str, row: &Row) -> String {
    PLACEHOLDER
        .replace_all(xml, |caps: &regex::Captures| {
            row.display_value(&caps[1])
                .map(|value| escape(value.as_str()).into_owned())
                .unwrap_or_default()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, serde_json::Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn document(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        )
    }

    fn write_template(parts: &[(&str, &str)]) -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        let mut zip = ZipWriter::new(std::fs::File::create(file.path()).unwrap());
        for (name, content) in parts {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
        file
    }

    fn read_part(bytes: Vec<u8>, name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_normalize_joins_split_runs() {
        let xml = "<w:r><w:t>{</w:t></w:r><w:r><w:t>{ na</w:t></w:r><w:r><w:t>me }</w:t></w:r><w:r><w:t>}</w:t></w:r>";
        let normalized = normalize_placeholders(xml);
        assert!(normalized.contains("{{ name }}"), "got {}", normalized);
        assert_eq!(
            normalized.matches("<w:r>").count(),
            normalized.matches("</w:r>").count()
        );
    }

    #[test]
    fn test_render_substitutes_and_escapes() {
        let file = write_template(&[(
            DOCUMENT_PART,
            &document("<w:p><w:r><w:t>Dear {{ name }}, you owe {{amount}}.</w:t></w:r></w:p>"),
        )]);
        let engine = DocxTemplateEngine::new();
        let template = engine.open_template(file.path()).unwrap();
        assert_eq!(template.placeholders(), &["name".to_string(), "amount".to_string()]);

        let bytes = engine
            .render(&template, &row(&[("name", json!("Tom & Jerry")), ("amount", json!(12))]))
            .unwrap();
        let xml = read_part(bytes, DOCUMENT_PART);

        assert!(xml.contains("Dear Tom &amp; Jerry, you owe 12."));
        assert_eq!(
            crate::adapters::docx::text::document_text(&xml).unwrap(),
            "Dear Tom & Jerry, you owe 12."
        );
    }

    #[test]
    fn test_markup_in_values_stays_text() {
        let file = write_template(&[(
            DOCUMENT_PART,
            &document("<w:p><w:r><w:t>{{ note }}</w:t></w:r></w:p>"),
        )]);
        let engine = DocxTemplateEngine::new();
        let template = engine.open_template(file.path()).unwrap();

        let note = r#"<w:br/> "quoted" & 'single'"#;
        let xml = read_part(
            engine.render(&template, &row(&[("note", json!(note))])).unwrap(),
            DOCUMENT_PART,
        );

        assert!(!xml.contains("<w:br/>"));
        assert_eq!(crate::adapters::docx::text::document_text(&xml).unwrap(), note);
    }

    #[test]
    fn test_missing_field_renders_blank() {
        let file = write_template(&[(
            DOCUMENT_PART,
            &document("<w:p><w:r><w:t>[{{ nickname }}]</w:t></w:r></w:p>"),
        )]);
        let engine = DocxTemplateEngine::new();
        let template = engine.open_template(file.path()).unwrap();

        let xml = read_part(engine.render(&template, &Row::default()).unwrap(), DOCUMENT_PART);
        assert!(xml.contains("[]"));
    }

    #[test]
    fn test_headers_are_templated_and_media_copied() {
        let file = write_template(&[
            (DOCUMENT_PART, &document("<w:p><w:r><w:t>body</w:t></w:r></w:p>")),
            ("word/header1.xml", "<w:hdr><w:t>{{ company }}</w:t></w:hdr>"),
            ("word/media/logo.png", "{{ not_templated }}"),
        ]);
        let engine = DocxTemplateEngine::new();
        let template = engine.open_template(file.path()).unwrap();
        let bytes = engine
            .render(&template, &row(&[("company", json!("Acme"))]))
            .unwrap();

        assert_eq!(read_part(bytes.clone(), "word/header1.xml"), "<w:hdr><w:t>Acme</w:t></w:hdr>");
        assert_eq!(read_part(bytes, "word/media/logo.png"), "{{ not_templated }}");
    }

    #[test]
    fn test_unclosed_placeholder_is_render_error() {
        let file = write_template(&[(
            DOCUMENT_PART,
            &document("<w:p><w:r><w:t>Hello {{ name</w:t></w:r></w:p>"),
        )]);
        let err = DocxTemplateEngine::new().open_template(file.path()).err().unwrap();
        assert!(matches!(err, DocGenError::RenderError { .. }));
    }

    #[test]
    fn test_non_identifier_placeholder_is_rejected() {
        let file = write_template(&[(
            DOCUMENT_PART,
            &document("<w:p><w:r><w:t>{{ first name }}</w:t></w:r></w:p>"),
        )]);
        assert!(DocxTemplateEngine::new().open_template(file.path()).is_err());
    }

    #[test]
    fn test_non_docx_is_render_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"plain text, not a zip").unwrap();
        let err = DocxTemplateEngine::new().open_template(file.path()).err().unwrap();
        assert!(matches!(err, DocGenError::RenderError { .. }));

        let no_body = write_template(&[("word/styles.xml", "<w:styles/>")]);
        assert!(DocxTemplateEngine::new().open_template(no_body.path()).is_err());
    }

    #[test]
    fn test_is_templatable() {
        assert!(is_templatable("word/document.xml"));
        assert!(is_templatable("word/footer2.xml"));
        assert!(!is_templatable("word/_rels/header1.xml.rels"));
        assert!(!is_templatable("word/styles.xml"));
    }
}
