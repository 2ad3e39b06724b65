use crate::domain::model::Row;
use crate::domain::ports::TemplateEngine;
use crate::utils::error::{DocGenError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Renders one row through a template engine and saves the result.
pub struct DocumentRenderer<T: TemplateEngine> {
    engine: T,
}

impl<T: TemplateEngine> DocumentRenderer<T> {
    pub fn new(engine: T) -> Self {
        Self { engine }
    }

    pub fn open_template(&self, path: &Path) -> Result<T::Template> {
        self.engine.open_template(path)
    }

    /// Writes exactly one file at `output_dir/output_name`, creating
    /// `output_dir` if needed.
    pub fn render(
        &self,
        template: &T::Template,
        row: &Row,
        output_dir: &Path,
        output_name: &str,
    ) -> Result<PathBuf> {
        let path = output_dir.join(output_name);
        let write_error = |message: String| DocGenError::RenderError {
            row_index: None,
            path: Some(path.clone()),
            message,
        };

        fs::create_dir_all(output_dir).map_err(|e| {
            write_error(format!("cannot create {}: {}", output_dir.display(), e))
        })?;

        let bytes = self.engine.render(template, row)?;

        if let Err(e) = fs::write(&path, &bytes) {
            let _ = fs::remove_file(&path);
            return Err(write_error(format!("cannot write document: {}", e)));
        }

        tracing::debug!("Document saved to: {}", path.display());
        Ok(path)
    }
}
