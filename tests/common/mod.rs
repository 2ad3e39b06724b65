#![allow(dead_code)]

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

/// Writes a minimal WordprocessingML package. Each entry of `paragraphs` is
/// raw run markup placed inside its own `<w:p>`.
pub fn write_docx_runs(path: &Path, paragraphs: &[&str]) {
    let body: String = paragraphs
        .iter()
        .map(|runs| format!("<w:p>{}</w:p>", runs))
        .collect();
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default();
    for (name, content) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", RELS),
        ("word/document.xml", document.as_str()),
    ] {
        zip.start_file(name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

/// One plain run per paragraph.
pub fn write_docx(path: &Path, paragraphs: &[&str]) {
    let runs: Vec<String> = paragraphs
        .iter()
        .map(|text| format!(r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#, text))
        .collect();
    let refs: Vec<&str> = runs.iter().map(String::as_str).collect();
    write_docx_runs(path, &refs);
}

/// Letter template; the amount placeholder is split over three runs the way
/// Word saves an edited field.
pub fn write_letter_template(path: &Path) {
    write_docx_runs(
        path,
        &[
            r#"<w:r><w:t xml:space="preserve">Dear {{ name }},</w:t></w:r>"#,
            r#"<w:r><w:t xml:space="preserve">Amount due: {{</w:t></w:r><w:r><w:t>amount</w:t></w:r><w:r><w:t>}}</w:t></w:r>"#,
        ],
    );
}

pub fn write_csv(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

pub fn archive_entries(path: &Path) -> Vec<(String, Vec<u8>)> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        entries.push((entry.name().to_string(), data));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
}

pub fn archive_names(path: &Path) -> Vec<String> {
    archive_entries(path).into_iter().map(|(name, _)| name).collect()
}
