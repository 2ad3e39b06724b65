use crate::core::orchestrator::PipelineSettings;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{DocGenError, Result};
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_string, validate_path, validate_positive_number,
    Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub input: InputConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub conversion: ConversionConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    pub csv: Option<String>,
    pub template: Option<String>,
    /// Keep every CSV cell as text instead of inferring numbers.
    pub raw_values: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub dir: String,
    pub archive_name: Option<String>,
    pub keep_intermediate: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    pub enabled: bool,
    pub workers: Option<usize>,
    pub output_dir_name: Option<String>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            workers: None,
            output_dir_name: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
    pub system_stats: Option<bool>,
    pub json_logs: Option<bool>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DocGenError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| DocGenError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value. Unset variables are left
    /// as written.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("pipeline.name", &self.pipeline.name)?;
        validate_path("output.dir", &self.output.dir)?;

        if let Some(workers) = self.conversion.workers {
            validate_positive_number("conversion.workers", workers, 1)?;
        }
        if let Some(name) = &self.conversion.output_dir_name {
            validate_non_empty_string("conversion.output_dir_name", name)?;
        }
        if let Some(name) = &self.output.archive_name {
            validate_file_extension("output.archive_name", name, &["zip"])?;
        }

        match (&self.input.csv, &self.input.template) {
            (Some(csv), Some(template)) => {
                validate_file_extension("input.csv", csv, &["csv"])?;
                validate_file_extension("input.template", template, &["docx"])?;
            }
            (Some(_), None) => {
                return Err(DocGenError::MissingConfigError {
                    field: "input.template".to_string(),
                })
            }
            (None, Some(_)) => {
                return Err(DocGenError::MissingConfigError {
                    field: "input.csv".to_string(),
                })
            }
            (None, None) => {}
        }

        if let Some(level) = self.monitoring.as_ref().and_then(|m| m.log_level.as_deref()) {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            if !valid_levels.contains(&level) {
                return Err(DocGenError::InvalidConfigValueError {
                    field: "monitoring.log_level".to_string(),
                    value: level.to_string(),
                    reason: format!("Valid levels: {}", valid_levels.join(", ")),
                });
            }
        }

        Ok(())
    }

    /// Orchestrator settings with the file's naming overrides applied.
    pub fn pipeline_settings(&self) -> PipelineSettings {
        let mut settings = PipelineSettings::from_config(self);
        if let Some(name) = &self.output.archive_name {
            settings.archive_name = name.clone();
        }
        if let Some(name) = &self.conversion.output_dir_name {
            settings.conversion_dir_name = name.clone();
        }
        settings
    }

    pub fn raw_values(&self) -> bool {
        self.input.raw_values.unwrap_or(false)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring
            .as_ref()
            .map(|m| m.enabled && m.system_stats.unwrap_or(true))
            .unwrap_or(false)
    }

    pub fn verbose(&self) -> bool {
        matches!(
            self.monitoring.as_ref().and_then(|m| m.log_level.as_deref()),
            Some("debug") | Some("trace")
        )
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn csv_path(&self) -> Option<&str> {
        self.input.csv.as_deref()
    }

    fn template_path(&self) -> Option<&str> {
        self.input.template.as_deref()
    }

    fn output_dir(&self) -> &str {
        &self.output.dir
    }

    fn workers(&self) -> usize {
        self.conversion.workers.unwrap_or(1)
    }

    fn convert_enabled(&self) -> bool {
        self.conversion.enabled
    }

    fn keep_intermediate(&self) -> bool {
        self.output.keep_intermediate.unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
