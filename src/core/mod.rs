pub mod archive;
pub mod batch;
pub mod convert;
pub mod orchestrator;
pub mod render;
pub mod session;

pub use crate::domain::model::{PipelineFailure, PipelineResult, Row, RunReport};
pub use crate::domain::ports::{
    ConfigProvider, EventSink, RowSource, TargetWriter, TemplateEngine, TextExtractor,
};
pub use crate::utils::error::Result;
pub use archive::ArchiveBuilder;
pub use batch::BatchGenerator;
pub use convert::{ConversionBatch, ConversionSettings, FormatConverter};
pub use orchestrator::{PipelineOrchestrator, PipelineSettings};
pub use render::DocumentRenderer;
pub use session::{MergeRequest, MergeSession};
