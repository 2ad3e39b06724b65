use crate::adapters::CsvRowSource;
use crate::utils::error::{DocGenError, Result};
use crate::utils::validation::{
    validate_existing_file, validate_file_extension, validate_required_field,
};
use std::path::{Path, PathBuf};

/// Everything one mail-merge run needs, checked up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequest {
    pub csv_path: PathBuf,
    pub template_path: PathBuf,
    pub output_dir: PathBuf,
}

/// Input files collected for a single caller. Each caller owns its own
/// session; attaching again replaces the previous file.
#[derive(Debug, Clone, Default)]
pub struct MergeSession {
    csv: Option<PathBuf>,
    template: Option<PathBuf>,
}

impl MergeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts a CSV only if it parses and has at least one record. Returns
    /// the record count.
    pub fn attach_csv(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        validate_file_extension("csv", &path.to_string_lossy(), &["csv"])?;

        let records = CsvRowSource::new(path).count_records()?;
        tracing::info!("CSV file attached: {} ({} records)", path.display(), records);
        self.csv = Some(path.to_path_buf());
        Ok(records)
    }

    pub fn attach_template(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let display = path.to_string_lossy();
        validate_file_extension("template", &display, &["docx"])?;
        validate_existing_file("template", &display)?;

        tracing::info!("Template attached: {}", path.display());
        self.template = Some(path.to_path_buf());
        Ok(())
    }

    pub fn csv(&self) -> Option<&Path> {
        self.csv.as_deref()
    }

    pub fn template(&self) -> Option<&Path> {
        self.template.as_deref()
    }

    pub fn is_ready(&self) -> bool {
        self.csv.is_some() && self.template.is_some()
    }

    pub fn merge_request(&self, output_dir: impl AsRef<Path>) -> Result<MergeRequest> {
        let csv_path = validate_required_field("csv", &self.csv)?.clone();
        let template_path = validate_required_field("template", &self.template)?.clone();

        let output_dir = output_dir.as_ref();
        if output_dir.as_os_str().is_empty() {
            return Err(DocGenError::ValidationError {
                message: "output directory must not be empty".to_string(),
            });
        }

        Ok(MergeRequest {
            csv_path,
            template_path,
            output_dir: output_dir.to_path_buf(),
        })
    }
}
