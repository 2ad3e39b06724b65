use crate::domain::model::Row;
use crate::domain::ports::RowSource;
use crate::utils::error::{DataFormatError, DocGenError, Result};
use csv::{StringRecord, StringRecordsIntoIter};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Reads rows from a CSV file with a header row.
#[derive(Debug, Clone)]
pub struct CsvRowSource {
    path: PathBuf,
    infer_types: bool,
}

impl CsvRowSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            infer_types: true,
        }
    }

    /// Keep every cell as a string instead of guessing numbers and blanks.
    pub fn with_type_inference(mut self, enabled: bool) -> Self {
        self.infer_types = enabled;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parses the whole file and returns the record count.
    pub fn count_records(&self) -> Result<usize> {
        let mut count = 0;
        for row in self.rows()? {
            row?;
            count += 1;
        }
        Ok(count)
    }
}

impl RowSource for CsvRowSource {
    type Rows = CsvRows;

    fn rows(&self) -> Result<CsvRows> {
        let file = File::open(&self.path).map_err(|source| DataFormatError::Unreadable {
            path: self.path.clone(),
            source,
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(file);

        let headers = reader
            .headers()
            .map_err(|e| classify_csv_error(&self.path, e))?
            .clone();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(DataFormatError::Empty {
                path: self.path.clone(),
            }
            .into());
        }

        let mut records = reader.into_records();
        let first = match records.next() {
            None => {
                return Err(DataFormatError::NoRecords {
                    path: self.path.clone(),
                }
                .into())
            }
            Some(Err(e)) => return Err(classify_csv_error(&self.path, e)),
            Some(Ok(record)) => record,
        };

        tracing::debug!(
            "Opened {} with columns: {}",
            self.path.display(),
            headers.iter().collect::<Vec<_>>().join(", ")
        );

        Ok(CsvRows {
            path: self.path.clone(),
            headers: headers.iter().map(str::to_string).collect(),
            records,
            pending: Some(first),
            infer_types: self.infer_types,
        })
    }
}

pub struct CsvRows {
    path: PathBuf,
    headers: Arc<[String]>,
    records: StringRecordsIntoIter<File>,
    pending: Option<StringRecord>,
    infer_types: bool,
}

impl CsvRows {
    fn to_row(&self, record: &StringRecord) -> Row {
        self.headers
            .iter()
            .zip(record.iter())
            .map(|(name, raw)| {
                let value = if self.infer_types {
                    infer_value(raw)
                } else {
                    serde_json::Value::String(raw.to_string())
                };
                (name.clone(), value)
            })
            .collect()
    }
}

impl Iterator for CsvRows {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.pending.take() {
            Some(record) => record,
            None => match self.records.next()? {
                Ok(record) => record,
                Err(e) => return Some(Err(classify_csv_error(&self.path, e))),
            },
        };
        Some(Ok(self.to_row(&record)))
    }
}

fn classify_csv_error(path: &Path, error: csv::Error) -> DocGenError {
    let line = error.position().map(|p| p.line()).unwrap_or(0);
    let message = error.to_string();
    match error.into_kind() {
        csv::ErrorKind::Io(source) => DataFormatError::Unreadable {
            path: path.to_path_buf(),
            source,
        }
        .into(),
        _ => DataFormatError::Malformed {
            path: path.to_path_buf(),
            line,
            message,
        }
        .into(),
    }
}

/// Blank cells become null, numeric cells become numbers, the rest stays text.
pub fn infer_value(raw: &str) -> serde_json::Value {
    if raw.is_empty() {
        return serde_json::Value::Null;
    }
    if let Ok(int) = raw.parse::<i64>() {
        return serde_json::Value::from(int);
    }
    if let Ok(float) = raw.parse::<f64>() {
        if let Some(number) = serde_json::Number::from_f64(float) {
            return serde_json::Value::Number(number);
        }
    }
    serde_json::Value::String(raw.to_string())
}
