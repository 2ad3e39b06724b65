use crate::domain::model::{EventOutcome, PipelineEvent};
use crate::domain::ports::EventSink;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docgen=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docgen=info"))
    }
}

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// Machine-readable output for log collectors.
pub fn init_json_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .init();
}

/// Forwards pipeline events to `tracing` with the stage and file as fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: &PipelineEvent) {
        let stage = event.stage.as_str();
        let file = event
            .file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        match &event.outcome {
            EventOutcome::Started => tracing::debug!(stage, file, "stage started"),
            EventOutcome::Completed => tracing::info!(stage, file, "completed"),
            EventOutcome::Skipped(reason) => tracing::warn!(stage, file, reason = %reason, "skipped"),
            EventOutcome::Failed(reason) => tracing::error!(stage, file, reason = %reason, "failed"),
        }
    }
}
