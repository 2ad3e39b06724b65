//! WordprocessingML (`.docx`) support: placeholder templating and plain-text
//! extraction. A `.docx` is a zip package whose body lives in
//! `word/document.xml`.

pub mod template;
pub mod text;

pub use template::{DocxTemplate, DocxTemplateEngine};
pub use text::DocxTextExtractor;

pub const DOCUMENT_PART: &str = "word/document.xml";
