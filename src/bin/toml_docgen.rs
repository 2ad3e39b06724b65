use anyhow::Context;
use clap::Parser;
use docgen::config::TomlConfig;
use docgen::core::convert::list_documents;
use docgen::core::PipelineSettings;
use docgen::domain::ports::ConfigProvider;
use docgen::utils::monitor::SystemMonitor;
use docgen::utils::{logger, validation::Validate};
use docgen::{
    BatchGenerator, CsvRowSource, DocxTemplateEngine, DocxTextExtractor, PdfWriter,
    PipelineOrchestrator, PipelineResult,
};
use std::path::Path;

#[derive(Parser)]
#[command(name = "toml-docgen")]
#[command(about = "Document generation driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "docgen.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the worker count from config
    #[arg(long)]
    workers: Option<usize>,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load config file '{}'", args.config))?;

    let verbose = args.verbose || config.verbose();
    if config.json_logs() {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("🚀 Starting TOML-based docgen");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Some(workers) = args.workers {
        config.conversion.workers = Some(workers);
        tracing::info!("🔧 Workers overridden to: {}", workers);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config)?;
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let result = tokio::task::spawn_blocking(move || run(&config, monitor_enabled))
        .await
        .context("pipeline task aborted")?;

    match result {
        PipelineResult::Succeeded {
            archive_path,
            report,
        } => {
            tracing::info!("✅ Pipeline completed successfully!");
            println!("✅ Pipeline completed successfully!");
            println!("📁 Archive saved to: {}", archive_path.display());
            if report.skipped_count() > 0 {
                println!("⚠️  {} documents skipped", report.skipped_count());
            }
            Ok(())
        }
        PipelineResult::Failed(failure) => {
            anyhow::bail!("pipeline stopped at stage '{}': {}", failure.stage(), failure)
        }
    }
}

fn run(config: &TomlConfig, monitor_enabled: bool) -> PipelineResult {
    let output_dir = Path::new(config.output_dir());
    let orchestrator = PipelineOrchestrator::new(
        DocxTextExtractor::new(),
        PdfWriter::default(),
        config.pipeline_settings(),
    )
    .with_monitoring(SystemMonitor::new(monitor_enabled));

    match (config.csv_path(), config.template_path()) {
        (Some(csv), Some(template)) => {
            let source = CsvRowSource::new(csv).with_type_inference(!config.raw_values());
            let generator = BatchGenerator::new(DocxTemplateEngine::new());
            orchestrator.run_mail_merge(&source, &generator, Path::new(template), output_dir)
        }
        _ => orchestrator.run_pipeline(output_dir),
    }
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    let settings = config.pipeline_settings();

    println!("📋 Configuration Summary:");
    match &config.pipeline.version {
        Some(version) => println!("  Pipeline: {} v{}", config.pipeline.name, version),
        None => println!("  Pipeline: {}", config.pipeline.name),
    }
    if let Some(description) = &config.pipeline.description {
        println!("  Description: {}", description);
    }
    println!("  CSV: {}", config.csv_path().unwrap_or("-"));
    println!("  Template: {}", config.template_path().unwrap_or("-"));
    println!("  Output: {}", config.output_dir());
    println!("  Archive: {}", settings.archive_name);
    println!("  Convert: {}", config.convert_enabled());
    println!("  Workers: {}", config.workers());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) -> anyhow::Result<()> {
    let settings: PipelineSettings = config.pipeline_settings();
    let output_dir = Path::new(config.output_dir());

    println!("🔍 Dry Run Analysis:");
    println!();

    match (config.csv_path(), config.template_path()) {
        (Some(csv), Some(template)) => {
            let records = CsvRowSource::new(csv)
                .count_records()
                .with_context(|| format!("cannot read {}", csv))?;
            println!("📄 Mail merge:");
            println!("  Template: {}", template);
            println!("  Records: {} (one document each)", records);
        }
        _ => {
            let documents = if output_dir.is_dir() {
                list_documents(output_dir, &settings.source_extension)?.len()
            } else {
                0
            };
            println!("📦 Package only:");
            println!(
                "  Documents found in {}: {}",
                output_dir.display(),
                documents
            );
        }
    }

    println!();
    println!("💾 Output:");
    println!("  Archive: {}", settings.archive_path(output_dir).display());
    if settings.convert {
        println!(
            "  Conversion dir: {}",
            settings.conversion_dir(output_dir).display()
        );
        println!("  Keep intermediate: {}", settings.keep_intermediate);
    } else {
        println!("  Conversion disabled: documents are archived as they are");
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");

    Ok(())
}
