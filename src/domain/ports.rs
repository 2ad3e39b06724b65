use crate::domain::model::{PipelineEvent, Row};
use crate::utils::error::Result;
use std::path::Path;

/// Produces the rows of a tabular file. Every call to `rows` starts over
/// from the first record.
pub trait RowSource: Send + Sync {
    type Rows: Iterator<Item = Result<Row>>;

    fn rows(&self) -> Result<Self::Rows>;
}

/// Fills a document template from one row.
pub trait TemplateEngine: Send + Sync {
    type Template;

    fn open_template(&self, path: &Path) -> Result<Self::Template>;
    fn render(&self, template: &Self::Template, row: &Row) -> Result<Vec<u8>>;
}

/// Pulls plain text out of a rendered document. An empty string means the
/// document has no usable content.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, path: &Path) -> Result<String>;
}

/// Writes text as a document in the target format.
pub trait TargetWriter: Send + Sync {
    fn write_document(&self, text: &str, path: &Path) -> Result<()>;
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: &PipelineEvent);
}

pub trait ConfigProvider: Send + Sync {
    fn csv_path(&self) -> Option<&str>;
    fn template_path(&self) -> Option<&str>;
    fn output_dir(&self) -> &str;
    fn workers(&self) -> usize;
    fn convert_enabled(&self) -> bool;
    fn keep_intermediate(&self) -> bool;
}
