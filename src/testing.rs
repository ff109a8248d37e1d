use async_trait::async_trait;

use crate::error::SourceError;
use crate::models::Table;
use crate::source::TabularSource;

pub fn table(rows: &[&[&str]]) -> Table {
    Table::new(
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect(),
    )
}

/// A source whose every call fails like a dropped connection.
pub struct BrokenWorkbook;

#[async_trait]
impl TabularSource for BrokenWorkbook {
    async fn read_table(&self, sheet: &str) -> Result<Table, SourceError> {
        Err(SourceError::access(sheet, "connection reset"))
    }

    async fn append_row(&self, sheet: &str, _cells: &[String]) -> Result<(), SourceError> {
        Err(SourceError::write(sheet, "connection reset"))
    }

    async fn replace_table(&self, sheet: &str, _rows: &[Vec<String>]) -> Result<(), SourceError> {
        Err(SourceError::write(sheet, "connection reset"))
    }
}
