use std::path::PathBuf;
use thiserror::Error;

/// Why a tabular source could not produce rows.
#[derive(Error, Debug)]
pub enum DataFormatError {
    #[error("Data file '{}' is empty", path.display())]
    Empty { path: PathBuf },

    #[error("Data file '{}' has a header row but no records", path.display())]
    NoRecords { path: PathBuf },

    #[error("Data file '{}' is not valid CSV (line {line}): {message}", path.display())]
    Malformed {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error("Data file '{}' could not be read: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DataFormatError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Empty { path }
            | Self::NoRecords { path }
            | Self::Malformed { path, .. }
            | Self::Unreadable { path, .. } => path,
        }
    }
}

#[derive(Error, Debug)]
pub enum DocGenError {
    #[error(transparent)]
    DataFormat(#[from] DataFormatError),

    #[error("Render failed{}: {message}", row_index.map(|i| format!(" at row {}", i)).unwrap_or_default())]
    RenderError {
        row_index: Option<usize>,
        path: Option<PathBuf>,
        message: String,
    },

    #[error("Conversion of '{}' failed: {message}", path.display())]
    ConversionError { path: PathBuf, message: String },

    #[error("Archive '{}' failed: {message}", path.display())]
    ArchiveError { path: PathBuf, message: String },

    #[error("No input documents found in '{}'", dir.display())]
    NoInputError { dir: PathBuf },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("PDF generation error: {message}")]
    PdfError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration field '{field}' is invalid: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required setting: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Render,
    Conversion,
    Archive,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DocGenError {
    pub fn render(message: impl Into<String>) -> Self {
        Self::RenderError {
            row_index: None,
            path: None,
            message: message.into(),
        }
    }

    pub fn pdf(message: impl ToString) -> Self {
        Self::PdfError {
            message: message.to_string(),
        }
    }

    /// Pins a per-row failure to its 1-based row index. Anything that is not
    /// already a render error is folded into one, keeping its message.
    pub fn at_row(self, index: usize) -> Self {
        match self {
            Self::RenderError { path, message, .. } => Self::RenderError {
                row_index: Some(index),
                path,
                message,
            },
            other => Self::RenderError {
                row_index: Some(index),
                path: None,
                message: other.to_string(),
            },
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DataFormat(_) | Self::CsvError(_) | Self::NoInputError { .. } => {
                ErrorCategory::Input
            }
            Self::RenderError { .. } => ErrorCategory::Render,
            Self::ConversionError { .. } | Self::PdfError { .. } => ErrorCategory::Conversion,
            Self::ArchiveError { .. } | Self::ZipError(_) => ErrorCategory::Archive,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::ValidationError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Conversion => ErrorSeverity::Low,
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Render => ErrorSeverity::High,
            ErrorCategory::Archive => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::DataFormat(DataFormatError::Empty { .. })
            | Self::DataFormat(DataFormatError::NoRecords { .. }) => {
                "Upload a CSV file with a header row and at least one record"
            }
            Self::DataFormat(DataFormatError::Malformed { .. }) | Self::CsvError(_) => {
                "Check that every CSV record has the same number of fields as the header"
            }
            Self::DataFormat(DataFormatError::Unreadable { .. }) => {
                "Check that the CSV file exists and is readable"
            }
            Self::RenderError { .. } => {
                "Check the template placeholders and that the output folder is writable"
            }
            Self::ConversionError { .. } | Self::PdfError { .. } => {
                "Make sure the generated documents contain text"
            }
            Self::ArchiveError { .. } | Self::ZipError(_) => {
                "Re-run the pipeline; the archive must not be distributed"
            }
            Self::NoInputError { .. } => "Generate documents into the folder before packaging",
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::ValidationError { .. } => "Review the command line arguments or config file",
            Self::IoError(_) | Self::SerializationError(_) => {
                "Check disk space and file permissions"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::DataFormat(DataFormatError::Empty { .. }) => {
                "The uploaded CSV file is empty. Please upload a valid CSV file.".to_string()
            }
            Self::DataFormat(DataFormatError::Malformed { .. }) | Self::CsvError(_) => {
                "The uploaded file is not a valid CSV. Please upload a valid CSV file.".to_string()
            }
            Self::MissingConfigError { .. } => {
                "Both CSV and DOCX files must be provided before generating documents.".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DocGenError>;
