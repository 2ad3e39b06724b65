use crate::core::archive::ArchiveBuilder;
use crate::core::batch::BatchGenerator;
use crate::core::convert::{list_documents, ConversionSettings, FormatConverter};
use crate::domain::model::{
    EventOutcome, FailureKind, PipelineEvent, PipelineFailure, PipelineResult, RunReport, Stage,
};
use crate::domain::ports::{
    ConfigProvider, EventSink, RowSource, TargetWriter, TemplateEngine, TextExtractor,
};
use crate::utils::error::{DocGenError, ErrorCategory};
use crate::utils::logger::TracingEventSink;
use crate::utils::monitor::SystemMonitor;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

type StageResult<T> = std::result::Result<T, PipelineFailure>;

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub source_extension: String,
    pub target_extension: String,
    pub conversion_dir_name: String,
    pub archive_name: String,
    pub workers: usize,
    /// When false the source documents are archived as they are.
    pub convert: bool,
    pub keep_intermediate: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            source_extension: "docx".to_string(),
            target_extension: "pdf".to_string(),
            conversion_dir_name: "pdfs".to_string(),
            archive_name: "pdf_files.zip".to_string(),
            workers: 1,
            convert: true,
            keep_intermediate: false,
        }
    }
}

impl PipelineSettings {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self {
            workers: config.workers().max(1),
            convert: config.convert_enabled(),
            keep_intermediate: config.keep_intermediate(),
            ..Self::default()
        }
    }

    pub fn archive_path(&self, working_dir: &Path) -> PathBuf {
        working_dir.join(&self.archive_name)
    }

    pub fn conversion_dir(&self, working_dir: &Path) -> PathBuf {
        working_dir.join(&self.conversion_dir_name)
    }

    pub fn conversion_settings(&self) -> ConversionSettings {
        ConversionSettings {
            source_extension: self.source_extension.clone(),
            target_extension: self.target_extension.clone(),
            output_dir_name: self.conversion_dir_name.clone(),
            workers: self.workers,
        }
    }
}

/// Maps a fatal library error onto the stage that reports it.
pub fn failure_from_error(error: DocGenError) -> PipelineFailure {
    let message = error.to_string();
    match error {
        DocGenError::DataFormat(e) => {
            PipelineFailure::new(FailureKind::Data, message).with_file(e.path())
        }
        DocGenError::RenderError {
            row_index, path, ..
        } => {
            let failure = PipelineFailure::new(FailureKind::Render, message);
            let failure = match row_index {
                Some(row) => failure.with_row(row),
                None => failure,
            };
            match path {
                Some(path) => failure.with_file(path),
                None => failure,
            }
        }
        DocGenError::NoInputError { dir } => {
            PipelineFailure::new(FailureKind::NoInput, message).with_file(dir)
        }
        DocGenError::ConversionError { path, .. } => {
            PipelineFailure::new(FailureKind::Convert, message).with_file(path)
        }
        DocGenError::ArchiveError { path, .. } => {
            PipelineFailure::new(FailureKind::Archive, message).with_file(path)
        }
        other => {
            let kind = match other.category() {
                ErrorCategory::Input => FailureKind::Data,
                ErrorCategory::Conversion => FailureKind::Convert,
                ErrorCategory::Archive => FailureKind::Archive,
                _ => FailureKind::Render,
            };
            PipelineFailure::new(kind, message)
        }
    }
}

/// Drives collect, convert, archive and cleanup over one working directory.
pub struct PipelineOrchestrator<E: TextExtractor, W: TargetWriter> {
    settings: PipelineSettings,
    converter: FormatConverter<E, W>,
    events: Arc<dyn EventSink>,
    monitor: SystemMonitor,
}

impl<E: TextExtractor, W: TargetWriter> PipelineOrchestrator<E, W> {
    pub fn new(extractor: E, writer: W, settings: PipelineSettings) -> Self {
        let converter = FormatConverter::new(extractor, writer, settings.conversion_settings());
        Self {
            settings,
            converter,
            events: Arc::new(TracingEventSink),
            monitor: SystemMonitor::default(),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.converter = self.converter.with_events(events.clone());
        self.events = events;
        self
    }

    pub fn with_monitoring(mut self, monitor: SystemMonitor) -> Self {
        self.monitor = monitor;
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Packages the documents found directly under `working_dir`.
    pub fn run_pipeline(&self, working_dir: &Path) -> PipelineResult {
        let mut report = RunReport::start();
        tracing::info!("Starting pipeline in {}", working_dir.display());

        let outcome = self
            .collect_sources(working_dir)
            .and_then(|documents| self.package(working_dir, documents, &mut report));
        self.finish(outcome, report)
    }

    /// Renders one document per row into `working_dir`, then packages exactly
    /// those documents.
    pub fn run_mail_merge<R, T>(
        &self,
        source: &R,
        generator: &BatchGenerator<T>,
        template_path: &Path,
        working_dir: &Path,
    ) -> PipelineResult
    where
        R: RowSource,
        T: TemplateEngine,
    {
        let mut report = RunReport::start();
        tracing::info!("Starting mail merge into {}", working_dir.display());

        let outcome = self
            .generate(source, generator, template_path, working_dir)
            .and_then(|documents| {
                report.generated = documents.clone();
                self.package(working_dir, documents, &mut report)
            });
        self.finish(outcome, report)
    }

    fn generate<R, T>(
        &self,
        source: &R,
        generator: &BatchGenerator<T>,
        template_path: &Path,
        working_dir: &Path,
    ) -> StageResult<Vec<PathBuf>>
    where
        R: RowSource,
        T: TemplateEngine,
    {
        // Data
        self.started(Stage::Data);
        let rows = source.rows().map_err(failure_from_error)?;
        self.completed(Stage::Data);

        // Render
        self.started(Stage::Render);
        let template = generator
            .open_template(template_path)
            .map_err(|e| match e {
                DocGenError::RenderError { path: None, message, .. } => PipelineFailure::new(
                    FailureKind::Render,
                    format!("Render failed: {}", message),
                )
                .with_file(template_path),
                other => failure_from_error(other),
            })?;
        let generated = generator
            .generate(rows, &template, working_dir)
            .map_err(failure_from_error)?;
        self.monitor.log_stats(Stage::Render);
        self.completed(Stage::Render);

        Ok(generated.into_iter().map(|doc| doc.path).collect())
    }

    fn collect_sources(&self, working_dir: &Path) -> StageResult<Vec<PathBuf>> {
        self.started(Stage::CollectSources);
        let no_input = |message: String| {
            PipelineFailure::new(FailureKind::NoInput, message).with_file(working_dir)
        };

        if !working_dir.is_dir() {
            return Err(no_input(format!(
                "working directory {} does not exist",
                working_dir.display()
            )));
        }

        let documents = list_documents(working_dir, &self.settings.source_extension)
            .map_err(|e| no_input(e.to_string()))?;
        if documents.is_empty() {
            return Err(no_input(format!(
                "no .{} documents in {}",
                self.settings.source_extension,
                working_dir.display()
            )));
        }

        tracing::info!("Found {} documents to process", documents.len());
        self.completed(Stage::CollectSources);
        Ok(documents)
    }

    fn package(
        &self,
        working_dir: &Path,
        documents: Vec<PathBuf>,
        report: &mut RunReport,
    ) -> StageResult<PathBuf> {
        report.documents_found = documents.len();
        let archive_path = self.settings.archive_path(working_dir);

        if !self.settings.convert {
            // Archive the documents themselves; there is nothing to clean up.
            self.started(Stage::Archive);
            let builder = ArchiveBuilder::new(self.settings.source_extension.as_str());
            let summary = builder
                .members_from_paths(working_dir, &documents, &archive_path)
                .and_then(|members| builder.build_from(members, &archive_path))
                .map_err(|e| self.archive_failure(e, &archive_path))?;
            report.archive = Some(summary);
            self.completed(Stage::Archive);
            return Ok(archive_path);
        }

        // Convert
        self.started(Stage::Convert);
        let conversion_dir = self.settings.conversion_dir(working_dir);
        reset_dir(&conversion_dir).map_err(|e| {
            PipelineFailure::new(
                FailureKind::Convert,
                format!("cannot prepare conversion directory: {}", e),
            )
            .with_file(&conversion_dir)
        })?;

        let batch = self.converter.convert_documents(&documents);
        report.converted = batch.successes().iter().map(|c| c.path.clone()).collect();
        report.skipped = batch.failed;
        self.monitor.log_stats(Stage::Convert);

        if report.converted.is_empty() {
            return Err(PipelineFailure::new(
                FailureKind::AllConversionsFailed,
                format!("none of the {} documents could be converted", documents.len()),
            )
            .with_file(working_dir));
        }
        if report.skipped_count() > 0 {
            tracing::warn!(
                "{} of {} documents were skipped during conversion",
                report.skipped_count(),
                documents.len()
            );
        }
        self.completed(Stage::Convert);

        // Archive
        self.started(Stage::Archive);
        let builder = ArchiveBuilder::new(self.settings.target_extension.as_str());
        let summary = builder
            .build(&conversion_dir, &archive_path, true)
            .map_err(|e| self.archive_failure(e, &archive_path))?;
        self.monitor.log_stats(Stage::Archive);
        self.completed(Stage::Archive);

        // Cleanup
        if !self.settings.keep_intermediate {
            self.started(Stage::Cleanup);
            report.cleanup_warnings = builder.cleanup(&summary, &conversion_dir);
            for warning in &report.cleanup_warnings {
                self.events.emit(&PipelineEvent::for_file(
                    Stage::Cleanup,
                    &warning.path,
                    EventOutcome::Skipped(warning.message.clone()),
                ));
            }
            self.completed(Stage::Cleanup);
        }

        report.archive = Some(summary);
        Ok(archive_path)
    }

    fn archive_failure(&self, error: DocGenError, archive_path: &Path) -> PipelineFailure {
        match error {
            DocGenError::NoInputError { .. } => failure_from_error(error),
            other => PipelineFailure::new(FailureKind::Archive, other.to_string())
                .with_file(archive_path),
        }
    }

    fn finish(&self, outcome: StageResult<PathBuf>, mut report: RunReport) -> PipelineResult {
        self.monitor.log_final_stats();
        match outcome {
            Ok(archive_path) => {
                report.finished_at = Some(Utc::now());
                tracing::info!(
                    "Pipeline succeeded: {} ({} converted, {} skipped)",
                    archive_path.display(),
                    report.converted.len(),
                    report.skipped_count()
                );
                PipelineResult::Succeeded {
                    archive_path,
                    report,
                }
            }
            Err(failure) => {
                let event = match &failure.file {
                    Some(file) => PipelineEvent::for_file(
                        failure.stage(),
                        file,
                        EventOutcome::Failed(failure.message.clone()),
                    ),
                    None => PipelineEvent::new(
                        failure.stage(),
                        EventOutcome::Failed(failure.message.clone()),
                    ),
                };
                self.events.emit(&event);
                PipelineResult::Failed(failure)
            }
        }
    }

    fn started(&self, stage: Stage) {
        self.events.emit(&PipelineEvent::new(stage, EventOutcome::Started));
    }

    fn completed(&self, stage: Stage) {
        self.events.emit(&PipelineEvent::new(stage, EventOutcome::Completed));
    }
}

fn reset_dir(dir: &Path) -> std::io::Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Row;
    use crate::utils::error::{DataFormatError, Result};
    use serde_json::json;
    use std::fs::File;
    use std::sync::Mutex;
    use zip::ZipArchive;

    struct RawText;

    impl TextExtractor for RawText {
        fn extract_text(&self, path: &Path) -> Result<String> {
            Ok(fs::read_to_string(path)?)
        }
    }

    struct CopyWriter;

    impl TargetWriter for CopyWriter {
        fn write_document(&self, text: &str, path: &Path) -> Result<()> {
            fs::write(path, format!("converted:{}", text))?;
            Ok(())
        }
    }

    struct NameEngine;

    impl TemplateEngine for NameEngine {
        type Template = ();

        fn open_template(&self, path: &Path) -> Result<()> {
            if path.ends_with("broken.docx") {
                return Err(DocGenError::render("not a zip container"));
            }
            Ok(())
        }

        fn render(&self, _template: &(), row: &Row) -> Result<Vec<u8>> {
            let name = row.display_value("name").unwrap_or_default();
            if name == "boom" {
                return Err(DocGenError::render("expression failed"));
            }
            Ok(format!("{} {}", name, row.display_value("amount").unwrap_or_default()).into_bytes())
        }
    }

    struct VecSource(Option<Vec<Row>>);

    impl RowSource for VecSource {
        type Rows = std::vec::IntoIter<Result<Row>>;

        fn rows(&self) -> Result<Self::Rows> {
            match &self.0 {
                Some(rows) => Ok(rows.iter().cloned().map(Ok).collect::<Vec<_>>().into_iter()),
                None => Err(DataFormatError::Empty {
                    path: PathBuf::from("data.csv"),
                }
                .into()),
            }
        }
    }

    #[derive(Default)]
    struct RecordingSink(Mutex<Vec<PipelineEvent>>);

    impl EventSink for RecordingSink {
        fn emit(&self, event: &PipelineEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    fn orchestrator(settings: PipelineSettings) -> PipelineOrchestrator<RawText, CopyWriter> {
        PipelineOrchestrator::new(RawText, CopyWriter, settings)
    }

    fn seed(dir: &Path, files: &[(&str, &str)]) {
        for (name, content) in files {
            let path = dir.join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
    }

    fn archive_names(path: &Path) -> Vec<String> {
        let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        names
    }

    fn people(names: &[&str]) -> VecSource {
        VecSource(Some(
            names
                .iter()
                .enumerate()
                .map(|(i, n)| {
                    vec![
                        ("name".to_string(), json!(n)),
                        ("amount".to_string(), json!((i + 1) * 10)),
                    ]
                    .into_iter()
                    .collect()
                })
                .collect(),
        ))
    }

    #[test]
    fn test_pipeline_archives_converted_documents_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        seed(
            dir.path(),
            &[("output_1.docx", "a"), ("output_2.docx", "b"), ("output_3.docx", "c")],
        );

        let result = orchestrator(PipelineSettings::default()).run_pipeline(dir.path());

        let archive_path = result.archive_path().unwrap().to_path_buf();
        assert_eq!(archive_path, dir.path().join("pdf_files.zip"));
        assert_eq!(
            archive_names(&archive_path),
            vec!["output_1.pdf", "output_2.pdf", "output_3.pdf"]
        );
        assert!(!dir.path().join("pdfs").exists());

        match result {
            PipelineResult::Succeeded { report, .. } => {
                assert_eq!(report.documents_found, 3);
                assert_eq!(report.converted.len(), 3);
                assert_eq!(report.skipped_count(), 0);
                assert!(report.finished_at.is_some());
                assert!(report.cleanup_warnings.is_empty());
            }
            PipelineResult::Failed(f) => panic!("unexpected failure: {f}"),
        }
    }

    #[test]
    fn test_partial_conversion_reports_skipped_count() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path(), &[("output_1.docx", "a"), ("output_2.docx", "  ")]);

        let result = orchestrator(PipelineSettings::default()).run_pipeline(dir.path());

        match result {
            PipelineResult::Succeeded {
                archive_path,
                report,
            } => {
                assert_eq!(archive_names(&archive_path), vec!["output_1.pdf"]);
                assert_eq!(report.skipped_count(), 1);
                assert_eq!(report.skipped[0].document, dir.path().join("output_2.docx"));
            }
            PipelineResult::Failed(f) => panic!("unexpected failure: {f}"),
        }
    }

    #[test]
    fn test_all_conversions_failed() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path(), &[("output_1.docx", ""), ("output_2.docx", "\n")]);

        let result = orchestrator(PipelineSettings::default()).run_pipeline(dir.path());

        let failure = result.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::AllConversionsFailed);
        assert_eq!(failure.kind.code(), "all-conversions-failed");
        assert!(!dir.path().join("pdf_files.zip").exists());
    }

    #[test]
    fn test_no_input() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path(), &[("notes.txt", "not a document")]);

        let empty = orchestrator(PipelineSettings::default()).run_pipeline(dir.path());
        assert_eq!(empty.failure().unwrap().kind, FailureKind::NoInput);

        let missing =
            orchestrator(PipelineSettings::default()).run_pipeline(&dir.path().join("absent"));
        assert_eq!(missing.failure().unwrap().kind, FailureKind::NoInput);
        assert_eq!(missing.failure().unwrap().stage(), Stage::CollectSources);
    }

    #[test]
    fn test_stale_conversions_never_enter_archive() {
        let dir = tempfile::tempdir().unwrap();
        seed(
            dir.path(),
            &[("output_1.docx", "fresh"), ("pdfs/output_9.pdf", "stale")],
        );

        let result = orchestrator(PipelineSettings::default()).run_pipeline(dir.path());

        assert_eq!(
            archive_names(result.archive_path().unwrap()),
            vec!["output_1.pdf"]
        );
    }

    #[test]
    fn test_keep_intermediate_leaves_conversions() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path(), &[("output_1.docx", "a")]);
        let settings = PipelineSettings {
            keep_intermediate: true,
            ..PipelineSettings::default()
        };

        let result = orchestrator(settings).run_pipeline(dir.path());

        assert!(result.is_success());
        assert_eq!(
            fs::read_to_string(dir.path().join("pdfs").join("output_1.pdf")).unwrap(),
            "converted:a"
        );
    }

    #[test]
    fn test_direct_mode_archives_documents() {
        let dir = tempfile::tempdir().unwrap();
        seed(
            dir.path(),
            &[("output_1.docx", "a"), ("output_2.docx", "b"), ("nested/x.docx", "c")],
        );
        let settings = PipelineSettings {
            convert: false,
            ..PipelineSettings::default()
        };

        let result = orchestrator(settings).run_pipeline(dir.path());

        assert_eq!(
            archive_names(result.archive_path().unwrap()),
            vec!["output_1.docx", "output_2.docx"]
        );
        assert!(dir.path().join("output_1.docx").exists());
        assert!(!dir.path().join("pdfs").exists());
    }

    #[test]
    fn test_direct_mail_merge_ignores_other_documents_in_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        seed(
            dir.path(),
            &[("letter.docx", "template"), ("output_7.docx", "from an earlier run")],
        );
        let settings = PipelineSettings {
            convert: false,
            ..PipelineSettings::default()
        };

        let result = orchestrator(settings).run_mail_merge(
            &people(&["Ann"]),
            &BatchGenerator::new(NameEngine),
            &dir.path().join("letter.docx"),
            dir.path(),
        );

        assert_eq!(
            archive_names(result.archive_path().unwrap()),
            vec!["output_1.docx"]
        );
        assert!(dir.path().join("output_7.docx").exists());
    }

    #[test]
    fn test_parallel_workers_produce_same_archive() {
        let dir = tempfile::tempdir().unwrap();
        for i in 1..=6 {
            fs::write(dir.path().join(format!("output_{}.docx", i)), format!("doc {}", i)).unwrap();
        }
        let settings = PipelineSettings {
            workers: 3,
            ..PipelineSettings::default()
        };

        let result = orchestrator(settings).run_pipeline(dir.path());

        assert_eq!(archive_names(result.archive_path().unwrap()).len(), 6);
    }

    #[test]
    fn test_mail_merge_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let generator = BatchGenerator::new(NameEngine);

        let result = orchestrator(PipelineSettings::default()).run_mail_merge(
            &people(&["Ann", "Bob", "Cy"]),
            &generator,
            Path::new("template.docx"),
            dir.path(),
        );

        match result {
            PipelineResult::Succeeded {
                archive_path,
                report,
            } => {
                assert_eq!(report.generated.len(), 3);
                assert_eq!(
                    archive_names(&archive_path),
                    vec!["output_1.pdf", "output_2.pdf", "output_3.pdf"]
                );
                let mut archive = ZipArchive::new(File::open(&archive_path).unwrap()).unwrap();
                let mut entry = archive.by_name("output_2.pdf").unwrap();
                let mut content = String::new();
                std::io::Read::read_to_string(&mut entry, &mut content).unwrap();
                assert_eq!(content, "converted:Bob 20");
            }
            PipelineResult::Failed(f) => panic!("unexpected failure: {f}"),
        }
    }

    #[test]
    fn test_mail_merge_render_failure_names_row() {
        let dir = tempfile::tempdir().unwrap();
        let generator = BatchGenerator::new(NameEngine);

        let result = orchestrator(PipelineSettings::default()).run_mail_merge(
            &people(&["Ann", "boom"]),
            &generator,
            Path::new("template.docx"),
            dir.path(),
        );

        let failure = result.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::Render);
        assert_eq!(failure.row_index, Some(2));
        assert!(dir.path().join("output_1.docx").exists());
        assert!(!dir.path().join("output_2.docx").exists());
        assert!(!dir.path().join("pdf_files.zip").exists());
    }

    #[test]
    fn test_mail_merge_data_and_template_failures() {
        let dir = tempfile::tempdir().unwrap();
        let generator = BatchGenerator::new(NameEngine);
        let orchestrator = orchestrator(PipelineSettings::default());

        let data = orchestrator.run_mail_merge(
            &VecSource(None),
            &generator,
            Path::new("template.docx"),
            dir.path(),
        );
        let failure = data.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::Data);
        assert_eq!(failure.file.as_deref(), Some(Path::new("data.csv")));

        let template = orchestrator.run_mail_merge(
            &people(&["Ann"]),
            &generator,
            Path::new("broken.docx"),
            dir.path(),
        );
        let failure = template.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::Render);
        assert_eq!(failure.row_index, None);
        assert_eq!(failure.file.as_deref(), Some(Path::new("broken.docx")));

        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_events_cover_every_stage() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path(), &[("output_1.docx", "a"), ("output_2.docx", "")]);
        let sink = Arc::new(RecordingSink::default());

        orchestrator(PipelineSettings::default())
            .with_events(sink.clone())
            .run_pipeline(dir.path());

        let events = sink.0.lock().unwrap();
        for stage in [Stage::CollectSources, Stage::Convert, Stage::Archive, Stage::Cleanup] {
            assert!(
                events
                    .iter()
                    .any(|e| e.stage == stage && e.outcome == EventOutcome::Completed),
                "missing completion for {stage}"
            );
        }
        assert!(events.iter().any(|e| e.stage == Stage::Convert
            && e.file.as_deref() == Some(dir.path().join("output_2.docx").as_path())
            && matches!(e.outcome, EventOutcome::Skipped(_))));
    }

    #[test]
    fn test_failure_from_error_keeps_row_and_file() {
        let failure = failure_from_error(DocGenError::RenderError {
            row_index: Some(4),
            path: Some(PathBuf::from("out/output_4.docx")),
            message: "denied".to_string(),
        });
        assert_eq!(failure.kind, FailureKind::Render);
        assert_eq!(failure.row_index, Some(4));
        assert_eq!(failure.file, Some(PathBuf::from("out/output_4.docx")));

        let io = failure_from_error(DocGenError::IoError(std::io::Error::other("disk")));
        assert_eq!(io.kind, FailureKind::Render);
    }
}
