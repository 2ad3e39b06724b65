// Adapters layer: concrete collaborators behind the domain ports.
pub mod csv_source;
pub mod docx;
pub mod pdf_writer;

pub use csv_source::CsvRowSource;
pub use docx::{DocxTemplateEngine, DocxTextExtractor};
pub use pdf_writer::{PdfLayout, PdfWriter};
