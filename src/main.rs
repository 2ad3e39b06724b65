use clap::Parser;
use docgen::config::RunMode;
use docgen::core::PipelineSettings;
use docgen::domain::model::{FailureKind, PipelineFailure, RunReport};
use docgen::utils::error::{DocGenError, ErrorSeverity};
use docgen::utils::monitor::SystemMonitor;
use docgen::utils::{logger, validation::Validate};
use docgen::{
    BatchGenerator, CliConfig, CsvRowSource, DocxTemplateEngine, DocxTextExtractor,
    PdfWriter, PipelineOrchestrator, PipelineResult,
};
use std::path::{Path, PathBuf};

enum Outcome {
    Pipeline(PipelineResult),
    Generated(Vec<PathBuf>),
    Error(DocGenError),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting docgen CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    // The pipeline is blocking file work; keep it off the async workers.
    let outcome = match tokio::task::spawn_blocking(move || run(config)).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("❌ Pipeline task aborted: {}", e);
            eprintln!("❌ Pipeline task aborted: {}", e);
            std::process::exit(3);
        }
    };

    match outcome {
        Outcome::Pipeline(PipelineResult::Succeeded {
            archive_path,
            report,
        }) => print_success(&archive_path, &report),
        Outcome::Pipeline(PipelineResult::Failed(failure)) => {
            tracing::error!(
                stage = failure.stage().as_str(),
                code = failure.kind.code(),
                "❌ Pipeline failed: {}",
                failure
            );
            eprintln!("❌ {}", failure);
            std::process::exit(exit_code(failure_severity(&failure)));
        }
        Outcome::Generated(documents) => {
            println!("✅ Generated {} documents", documents.len());
            for document in &documents {
                println!("  {}", document.display());
            }
        }
        Outcome::Error(e) => {
            tracing::error!(
                "❌ docgen failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let code = exit_code(e.severity());
            if code > 0 {
                std::process::exit(code);
            }
        }
    }

    Ok(())
}

fn run(config: CliConfig) -> Outcome {
    let output_dir = PathBuf::from(&config.output_dir);
    let settings = PipelineSettings::from_config(&config);
    let generator = BatchGenerator::new(DocxTemplateEngine::new());

    match (config.mode(), config.csv.as_deref(), config.template.as_deref()) {
        (RunMode::GenerateOnly, Some(csv), Some(template)) => {
            let source = CsvRowSource::new(csv);
            match generator.generate_from(&source, Path::new(template), &output_dir) {
                Ok(documents) => Outcome::Generated(documents.into_iter().map(|d| d.path).collect()),
                Err(e) => Outcome::Error(e),
            }
        }
        (RunMode::Merge, Some(csv), Some(template)) => {
            let source = CsvRowSource::new(csv);
            let orchestrator = orchestrator(settings, config.monitor);
            Outcome::Pipeline(orchestrator.run_mail_merge(
                &source,
                &generator,
                Path::new(template),
                &output_dir,
            ))
        }
        _ => {
            tracing::info!("No CSV/template given; packaging {}", output_dir.display());
            Outcome::Pipeline(orchestrator(settings, config.monitor).run_pipeline(&output_dir))
        }
    }
}

fn orchestrator(
    settings: PipelineSettings,
    monitor: bool,
) -> PipelineOrchestrator<DocxTextExtractor, PdfWriter> {
    PipelineOrchestrator::new(DocxTextExtractor::new(), PdfWriter::default(), settings)
        .with_monitoring(SystemMonitor::new(monitor))
}

fn print_success(archive_path: &Path, report: &RunReport) {
    tracing::info!("✅ Pipeline completed successfully!");
    println!("✅ Pipeline completed successfully!");
    println!("📁 Archive saved to: {}", archive_path.display());
    if let Some(archive) = &report.archive {
        println!("📦 {} files archived", archive.members.len());
    }
    if report.skipped_count() > 0 {
        println!("⚠️  {} documents skipped:", report.skipped_count());
        for skipped in &report.skipped {
            println!("  {}: {}", skipped.document.display(), skipped.reason);
        }
    }
    for warning in &report.cleanup_warnings {
        println!("⚠️  Could not remove {}: {}", warning.path.display(), warning.message);
    }
}

fn failure_severity(failure: &PipelineFailure) -> ErrorSeverity {
    match failure.kind {
        FailureKind::Archive => ErrorSeverity::Medium,
        FailureKind::Convert => ErrorSeverity::Critical,
        FailureKind::NoInput
        | FailureKind::Data
        | FailureKind::Render
        | FailureKind::AllConversionsFailed => ErrorSeverity::High,
    }
}

fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}
