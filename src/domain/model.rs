use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// One source record: field names in header order, each with a scalar value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Row {
    fields: Vec<(String, serde_json::Value)>,
}

impl Row {
    pub fn new(fields: Vec<(String, serde_json::Value)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// The text a placeholder for `name` expands to, if the field exists.
    pub fn display_value(&self, name: &str) -> Option<String> {
        self.get(name).map(display_value)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, serde_json::Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, serde_json::Value)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

pub fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedDocument {
    /// 1-based position of the source row.
    pub index: usize,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertedDocument {
    pub document: PathBuf,
    pub path: PathBuf,
}

/// A document that could not be converted. Recorded and skipped, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("could not convert '{}': {reason}", document.display())]
pub struct ConversionFailure {
    pub document: PathBuf,
    pub reason: String,
}

impl ConversionFailure {
    pub fn new(document: &Path, reason: impl Into<String>) -> Self {
        Self {
            document: document.to_path_buf(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupWarning {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveMember {
    /// Entry name inside the archive, `/`-separated and relative to the source directory.
    pub name: String,
    pub source_path: PathBuf,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    pub members: Vec<ArchiveMember>,
}

impl ArchiveSummary {
    pub fn member_names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    CollectSources,
    Data,
    Render,
    Convert,
    Archive,
    Cleanup,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::CollectSources => "collect-sources",
            Stage::Data => "data",
            Stage::Render => "render",
            Stage::Convert => "convert",
            Stage::Archive => "archive",
            Stage::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    NoInput,
    Data,
    Render,
    Convert,
    AllConversionsFailed,
    Archive,
}

impl FailureKind {
    pub fn code(&self) -> &'static str {
        match self {
            FailureKind::NoInput => "no-input",
            FailureKind::Data => "data",
            FailureKind::Render => "render",
            FailureKind::Convert => "convert",
            FailureKind::AllConversionsFailed => "all-conversions-failed",
            FailureKind::Archive => "archive",
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            FailureKind::NoInput => Stage::CollectSources,
            FailureKind::Data => Stage::Data,
            FailureKind::Render => Stage::Render,
            FailureKind::Convert | FailureKind::AllConversionsFailed => Stage::Convert,
            FailureKind::Archive => Stage::Archive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineFailure {
    pub kind: FailureKind,
    pub message: String,
    pub file: Option<PathBuf>,
    pub row_index: Option<usize>,
}

impl PipelineFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            file: None,
            row_index: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_row(mut self, row_index: usize) -> Self {
        self.row_index = Some(row_index);
        self
    }

    pub fn stage(&self) -> Stage {
        self.kind.stage()
    }
}

impl fmt::Display for PipelineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed", self.kind.code())?;
        if let Some(row) = self.row_index {
            write!(f, " at row {}", row)?;
        }
        if let Some(file) = &self.file {
            write!(f, " ({})", file.display())?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Bookkeeping for one end-to-end run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub documents_found: usize,
    pub generated: Vec<PathBuf>,
    pub converted: Vec<PathBuf>,
    pub skipped: Vec<ConversionFailure>,
    pub archive: Option<ArchiveSummary>,
    pub cleanup_warnings: Vec<CleanupWarning>,
}

impl RunReport {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            documents_found: 0,
            generated: Vec::new(),
            converted: Vec::new(),
            skipped: Vec::new(),
            archive: None,
            cleanup_warnings: Vec::new(),
        }
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

#[derive(Debug, Clone)]
pub enum PipelineResult {
    Succeeded {
        archive_path: PathBuf,
        report: RunReport,
    },
    Failed(PipelineFailure),
}

impl PipelineResult {
    pub fn is_success(&self) -> bool {
        matches!(self, PipelineResult::Succeeded { .. })
    }

    pub fn archive_path(&self) -> Option<&Path> {
        match self {
            PipelineResult::Succeeded { archive_path, .. } => Some(archive_path),
            PipelineResult::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&PipelineFailure> {
        match self {
            PipelineResult::Failed(failure) => Some(failure),
            PipelineResult::Succeeded { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Started,
    Completed,
    Skipped(String),
    Failed(String),
}

/// Progress notification emitted by the orchestrator and its stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineEvent {
    pub stage: Stage,
    pub file: Option<PathBuf>,
    pub outcome: EventOutcome,
}

impl PipelineEvent {
    pub fn new(stage: Stage, outcome: EventOutcome) -> Self {
        Self {
            stage,
            file: None,
            outcome,
        }
    }

    pub fn for_file(stage: Stage, file: &Path, outcome: EventOutcome) -> Self {
        Self {
            stage,
            file: Some(file.to_path_buf()),
            outcome,
        }
    }
}
