use crate::domain::model::{
    ConversionFailure, ConvertedDocument, EventOutcome, PipelineEvent, Stage,
};
use crate::domain::ports::{EventSink, TargetWriter, TextExtractor};
use crate::utils::error::Result;
use crate::utils::logger::TracingEventSink;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ConversionSettings {
    pub source_extension: String,
    pub target_extension: String,
    /// Name of the subdirectory, next to each source document, that receives
    /// converted files.
    pub output_dir_name: String,
    pub workers: usize,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            source_extension: "docx".to_string(),
            target_extension: "pdf".to_string(),
            output_dir_name: "pdfs".to_string(),
            workers: 1,
        }
    }
}

/// Outcome of converting a set of documents. Failures are kept for
/// reporting; they never stop the batch.
#[derive(Debug, Clone, Default)]
pub struct ConversionBatch {
    pub converted: Vec<ConvertedDocument>,
    pub failed: Vec<ConversionFailure>,
}

impl ConversionBatch {
    pub fn successes(&self) -> &[ConvertedDocument] {
        &self.converted
    }

    pub fn attempted(&self) -> usize {
        self.converted.len() + self.failed.len()
    }
}

/// Lists files with `extension` directly under `directory`, sorted by name.
pub fn list_documents(directory: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(extension))
            .unwrap_or(false);
        if matches {
            documents.push(path);
        }
    }
    documents.sort();
    Ok(documents)
}

/// Turns rendered documents into the target format via text extraction.
pub struct FormatConverter<E: TextExtractor, W: TargetWriter> {
    extractor: E,
    writer: W,
    settings: ConversionSettings,
    events: Arc<dyn EventSink>,
}

impl<E: TextExtractor, W: TargetWriter> FormatConverter<E, W> {
    pub fn new(extractor: E, writer: W, settings: ConversionSettings) -> Self {
        Self {
            extractor,
            writer,
            settings,
            events: Arc::new(TracingEventSink),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn settings(&self) -> &ConversionSettings {
        &self.settings
    }

    pub fn conversion_dir(&self, directory: &Path) -> PathBuf {
        directory.join(&self.settings.output_dir_name)
    }

    /// `<dir>/<output_dir_name>/<stem>.<target_extension>` for a document in `<dir>`.
    pub fn target_path(&self, document: &Path) -> PathBuf {
        let parent = document.parent().unwrap_or_else(|| Path::new(""));
        let stem = document
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.conversion_dir(parent)
            .join(format!("{}.{}", stem, self.settings.target_extension))
    }

    /// Converts a single document. Nothing is written when this fails.
    pub fn convert(
        &self,
        document: &Path,
    ) -> std::result::Result<ConvertedDocument, ConversionFailure> {
        tracing::debug!("Extracting text from {}", document.display());
        let text = self
            .extractor
            .extract_text(document)
            .map_err(|e| ConversionFailure::new(document, format!("unreadable document: {}", e)))?;

        if text.trim().is_empty() {
            return Err(ConversionFailure::new(document, "no text found"));
        }

        let target = self.target_path(document);
        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir).map_err(|e| {
                ConversionFailure::new(
                    document,
                    format!("cannot create {}: {}", dir.display(), e),
                )
            })?;
        }

        if let Err(e) = self.writer.write_document(&text, &target) {
            let _ = fs::remove_file(&target);
            return Err(ConversionFailure::new(document, format!("write failed: {}", e)));
        }

        tracing::debug!("Converted {} to {}", document.display(), target.display());
        Ok(ConvertedDocument {
            document: document.to_path_buf(),
            path: target,
        })
    }

    /// Converts every matching document directly under `directory`.
    pub fn convert_all(&self, directory: &Path) -> Result<ConversionBatch> {
        let documents = list_documents(directory, &self.settings.source_extension)?;
        Ok(self.convert_documents(&documents))
    }

    /// Converts `documents` independently, on up to `workers` threads. Results
    /// keep the input order.
    pub fn convert_documents(&self, documents: &[PathBuf]) -> ConversionBatch {
        let workers = self.settings.workers.max(1).min(documents.len().max(1));

        let outcomes: Vec<std::result::Result<ConvertedDocument, ConversionFailure>> =
            if workers <= 1 {
                documents.iter().map(|doc| self.convert(doc)).collect()
            } else {
                self.convert_parallel(documents, workers)
            };

        let mut batch = ConversionBatch::default();
        for outcome in outcomes {
            match outcome {
                Ok(converted) => {
                    self.events.emit(&PipelineEvent::for_file(
                        Stage::Convert,
                        &converted.document,
                        EventOutcome::Completed,
                    ));
                    batch.converted.push(converted);
                }
                Err(failure) => {
                    self.events.emit(&PipelineEvent::for_file(
                        Stage::Convert,
                        &failure.document,
                        EventOutcome::Skipped(failure.reason.clone()),
                    ));
                    batch.failed.push(failure);
                }
            }
        }

        tracing::info!(
            "Converted {}/{} documents ({} skipped)",
            batch.converted.len(),
            batch.attempted(),
            batch.failed.len()
        );
        batch
    }

    fn convert_parallel(
        &self,
        documents: &[PathBuf],
        workers: usize,
    ) -> Vec<std::result::Result<ConvertedDocument, ConversionFailure>> {
        let chunk_size = documents.len().div_ceil(workers);
        tracing::debug!(
            "Converting {} documents on {} workers",
            documents.len(),
            workers
        );

        std::thread::scope(|scope| {
            let handles: Vec<_> = documents
                .chunks(chunk_size)
                .map(|chunk| {
                    let handle = scope
                        .spawn(move || chunk.iter().map(|doc| self.convert(doc)).collect::<Vec<_>>());
                    (chunk, handle)
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|(chunk, handle)| {
                    handle.join().unwrap_or_else(|_| {
                        chunk
                            .iter()
                            .map(|doc| Err(ConversionFailure::new(doc, "conversion worker panicked")))
                            .collect()
                    })
                })
                .collect()
        })
    }
}
