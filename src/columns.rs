use std::convert::Infallible;
use std::str::FromStr;

use serde::Serialize;

use crate::models::Table;
use crate::source::TabularSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    Index(usize),
    /// Matched against the header row.
    Name(String),
}

impl FromStr for ColumnRef {
    type Err = Infallible;

    /// Numbers are zero-based indexes, anything else is a header name.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        Ok(match raw.parse::<usize>() {
            Ok(index) => ColumnRef::Index(index),
            Err(_) => ColumnRef::Name(raw.to_string()),
        })
    }
}

/// Result of reading one column. `Unavailable` means the source failed, as
/// opposed to a column that simply holds nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ColumnData {
    Values(Vec<String>),
    Unavailable { message: String },
}

impl ColumnData {
    pub fn values(&self) -> &[String] {
        match self {
            ColumnData::Values(values) => values,
            ColumnData::Unavailable { .. } => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ColumnData::Values(_) => None,
            ColumnData::Unavailable { message } => Some(message.as_str()),
        }
    }
}

pub async fn extract(
    source: &dyn TabularSource,
    sheet: &str,
    column: &ColumnRef,
    skip_header: bool,
) -> ColumnData {
    match source.read_table(sheet).await {
        Ok(table) => ColumnData::Values(column_values(&table, column, skip_header)),
        Err(err) if err.is_missing() => {
            tracing::info!(sheet, "sheet not found, treating column as empty");
            ColumnData::Values(Vec::new())
        }
        Err(err) => {
            tracing::warn!(sheet, error = %err, "column unavailable");
            ColumnData::Unavailable {
                message: err.to_string(),
            }
        }
    }
}

pub fn column_values(table: &Table, column: &ColumnRef, skip_header: bool) -> Vec<String> {
    let index = match column {
        ColumnRef::Index(index) => *index,
        ColumnRef::Name(name) => {
            let found = table.headers().iter().position(|h| h.trim() == name.as_str());
            match found {
                Some(index) => index,
                None => return Vec::new(),
            }
        }
    };

    let first = usize::from(skip_header);
    let last = table.last_row_with_data();
    (first..last)
        .map(|row| table.cell(row, index))
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string)
        .collect()
}
