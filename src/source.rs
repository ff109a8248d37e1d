use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::SourceError;
use crate::models::Table;

/// Cells cross this boundary as plain strings.
#[async_trait]
pub trait TabularSource: Send + Sync {
    async fn read_table(&self, sheet: &str) -> Result<Table, SourceError>;

    async fn append_row(&self, sheet: &str, cells: &[String]) -> Result<(), SourceError>;

    /// Creates the sheet if needed and replaces its contents.
    async fn replace_table(&self, sheet: &str, rows: &[Vec<String>]) -> Result<(), SourceError>;
}

#[derive(Debug, Clone)]
pub struct CsvWorkbook {
    dir: PathBuf,
}

impl CsvWorkbook {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn sheet_path(&self, sheet: &str) -> PathBuf {
        self.dir.join(format!("{sheet}.csv"))
    }
}

#[async_trait]
impl TabularSource for CsvWorkbook {
    async fn read_table(&self, sheet: &str) -> Result<Table, SourceError> {
        let path = self.sheet_path(sheet);
        if !path.is_file() {
            return Err(SourceError::Missing {
                sheet: sheet.to_string(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)
            .map_err(|err| SourceError::access(sheet, err))?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|err| SourceError::access(sheet, err))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        tracing::debug!(sheet, rows = rows.len(), "read csv sheet");
        Ok(Table::new(rows))
    }

    async fn append_row(&self, sheet: &str, cells: &[String]) -> Result<(), SourceError> {
        let path = self.sheet_path(sheet);
        if !path.is_file() {
            return Err(SourceError::Missing {
                sheet: sheet.to_string(),
            });
        }

        let file = OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(|err| SourceError::write(sheet, err))?;
        let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(file);
        writer
            .write_record(cells)
            .map_err(|err| SourceError::write(sheet, err))?;
        writer.flush().map_err(|err| SourceError::write(sheet, err))?;
        Ok(())
    }

    async fn replace_table(&self, sheet: &str, rows: &[Vec<String>]) -> Result<(), SourceError> {
        std::fs::create_dir_all(&self.dir).map_err(|err| SourceError::write(sheet, err))?;
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(self.sheet_path(sheet))
            .map_err(|err| SourceError::write(sheet, err))?;
        for row in rows {
            writer
                .write_record(row)
                .map_err(|err| SourceError::write(sheet, err))?;
        }
        writer.flush().map_err(|err| SourceError::write(sheet, err))?;
        Ok(())
    }
}
