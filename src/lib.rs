pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::{CsvRowSource, DocxTemplateEngine, DocxTextExtractor, PdfWriter};
pub use core::{BatchGenerator, MergeSession, PipelineOrchestrator, PipelineSettings};
pub use domain::model::{PipelineFailure, PipelineResult, RunReport};
pub use utils::error::{DocGenError, Result};
