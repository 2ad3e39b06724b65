use crate::domain::ports::ConfigProvider;
use crate::utils::error::{DocGenError, Result};
use crate::utils::validation::{
    validate_existing_file, validate_file_extension, validate_path, validate_positive_number,
    Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "docgen")]
#[command(about = "Mail-merge CSV rows into documents, convert them to PDF and zip the result")]
pub struct CliConfig {
    /// CSV file with a header row; one document is generated per record
    #[arg(long)]
    pub csv: Option<String>,

    /// DOCX template with {{ field }} placeholders
    #[arg(long)]
    pub template: Option<String>,

    #[arg(long, default_value = "./output")]
    pub output_dir: String,

    #[arg(long, default_value = "1")]
    pub workers: usize,

    #[arg(long, help = "Archive the generated documents without converting them")]
    pub skip_convert: bool,

    #[arg(long, help = "Keep converted files after they are archived")]
    pub keep_intermediate: bool,

    #[arg(long, help = "Only render documents; skip conversion and packaging")]
    pub generate_only: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per stage")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Package documents already present in the output directory.
    Package,
    /// Render, convert and package.
    Merge,
    GenerateOnly,
}

impl CliConfig {
    pub fn mode(&self) -> RunMode {
        match (self.has_merge_inputs(), self.generate_only) {
            (true, true) => RunMode::GenerateOnly,
            (true, false) => RunMode::Merge,
            (false, _) => RunMode::Package,
        }
    }

    fn has_merge_inputs(&self) -> bool {
        self.csv.is_some() && self.template.is_some()
    }
}

impl ConfigProvider for CliConfig {
    fn csv_path(&self) -> Option<&str> {
        self.csv.as_deref()
    }

    fn template_path(&self) -> Option<&str> {
        self.template.as_deref()
    }

    fn output_dir(&self) -> &str {
        &self.output_dir
    }

    fn workers(&self) -> usize {
        self.workers
    }

    fn convert_enabled(&self) -> bool {
        !self.skip_convert
    }

    fn keep_intermediate(&self) -> bool {
        self.keep_intermediate
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("output_dir", &self.output_dir)?;
        validate_positive_number("workers", self.workers, 1)?;

        match (&self.csv, &self.template) {
            (Some(csv), Some(template)) => {
                validate_file_extension("csv", csv, &["csv"])?;
                validate_existing_file("csv", csv)?;
                validate_file_extension("template", template, &["docx"])?;
                validate_existing_file("template", template)?;
            }
            (Some(_), None) => {
                return Err(DocGenError::MissingConfigError {
                    field: "template".to_string(),
                })
            }
            (None, Some(_)) => {
                return Err(DocGenError::MissingConfigError {
                    field: "csv".to_string(),
                })
            }
            (None, None) if self.generate_only => {
                return Err(DocGenError::MissingConfigError {
                    field: "csv".to_string(),
                })
            }
            (None, None) => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults_package_existing_documents() {
        let config = CliConfig::try_parse_from(["docgen"]).unwrap();

        assert_eq!(config.output_dir, "./output");
        assert_eq!(config.workers, 1);
        assert_eq!(config.mode(), RunMode::Package);
        assert!(config.convert_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_merge_inputs_must_come_together() {
        let config = CliConfig::try_parse_from(["docgen", "--csv", "data.csv"]).unwrap();
        assert!(matches!(
            config.validate(),
            Err(DocGenError::MissingConfigError { .. })
        ));

        let config = CliConfig::try_parse_from(["docgen", "--generate-only"]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_mode_checks_files() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("data.csv");
        let template = dir.path().join("letter.docx");
        fs::write(&csv, "name\nAnn\n").unwrap();
        fs::write(&template, b"PK").unwrap();

        let config = CliConfig::try_parse_from([
            "docgen",
            "--csv",
            csv.to_str().unwrap(),
            "--template",
            template.to_str().unwrap(),
            "--workers",
            "4",
            "--skip-convert",
        ])
        .unwrap();

        assert_eq!(config.mode(), RunMode::Merge);
        assert!(!config.convert_enabled());
        assert_eq!(config.csv_path(), csv.to_str());
        assert!(config.validate().is_ok());

        let wrong = CliConfig {
            template: Some(csv.to_string_lossy().into_owned()),
            ..config
        };
        assert!(wrong.validate().is_err());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = CliConfig::try_parse_from(["docgen", "--workers", "0"]).unwrap();
        assert!(config.validate().is_err());
    }
}
