use crate::core::render::DocumentRenderer;
use crate::domain::model::{EventOutcome, GeneratedDocument, PipelineEvent, Row, Stage};
use crate::domain::ports::{EventSink, RowSource, TemplateEngine};
use crate::utils::error::Result;
use crate::utils::logger::TracingEventSink;
use std::path::Path;
use std::sync::Arc;

pub fn output_name(index: usize, extension: &str) -> String {
    format!("output_{}.{}", index, extension)
}

/// Mail-merge driver: one rendered document per row, named `output_<i>`.
pub struct BatchGenerator<T: TemplateEngine> {
    renderer: DocumentRenderer<T>,
    extension: String,
    events: Arc<dyn EventSink>,
}

impl<T: TemplateEngine> BatchGenerator<T> {
    pub fn new(engine: T) -> Self {
        Self {
            renderer: DocumentRenderer::new(engine),
            extension: "docx".to_string(),
            events: Arc::new(TracingEventSink),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn open_template(&self, path: &Path) -> Result<T::Template> {
        self.renderer.open_template(path)
    }

    /// Renders rows in order. The first row error or render error aborts the
    /// batch; documents already written stay on disk.
    pub fn generate<I>(
        &self,
        rows: I,
        template: &T::Template,
        output_dir: &Path,
    ) -> Result<Vec<GeneratedDocument>>
    where
        I: IntoIterator<Item = Result<Row>>,
    {
        let mut documents = Vec::new();

        for (i, row) in rows.into_iter().enumerate() {
            let index = i + 1;
            let row = row?;
            let name = output_name(index, &self.extension);

            let path = match self.renderer.render(template, &row, output_dir, &name) {
                Ok(path) => path,
                Err(e) => {
                    let e = e.at_row(index);
                    self.events.emit(&PipelineEvent::for_file(
                        Stage::Render,
                        &output_dir.join(&name),
                        EventOutcome::Failed(e.to_string()),
                    ));
                    return Err(e);
                }
            };

            self.events.emit(&PipelineEvent::for_file(
                Stage::Render,
                &path,
                EventOutcome::Completed,
            ));
            documents.push(GeneratedDocument { index, path });
        }

        tracing::info!(
            "Generated {} documents in {}",
            documents.len(),
            output_dir.display()
        );
        Ok(documents)
    }

    /// Opens the template, reads the source and renders every row.
    pub fn generate_from<R: RowSource>(
        &self,
        source: &R,
        template_path: &Path,
        output_dir: &Path,
    ) -> Result<Vec<GeneratedDocument>> {
        let rows = source.rows()?;
        let template = self.open_template(template_path)?;
        self.generate(rows, &template, output_dir)
    }
}
