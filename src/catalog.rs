use serde::Serialize;

use crate::error::SourceError;
use crate::models::Table;
use crate::source::TabularSource;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolEntry {
    pub school_name: String,
    pub classes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchoolCatalog {
    pub schools: Vec<SchoolEntry>,
}

impl SchoolCatalog {
    // A header repeated in a later column adds its classes to the first entry.
    pub fn from_table(table: &Table) -> Self {
        let mut catalog = SchoolCatalog::default();
        let last = table.last_row_with_data();

        for (col, header) in table.headers().iter().enumerate() {
            let school_name = header.trim();
            if school_name.is_empty() {
                continue;
            }

            let classes = (1..last)
                .map(|row| table.cell(row, col).trim())
                .filter(|class| !class.is_empty())
                .map(str::to_string);

            match catalog
                .schools
                .iter_mut()
                .find(|entry| entry.school_name == school_name)
            {
                Some(entry) => entry.classes.extend(classes),
                None => catalog.schools.push(SchoolEntry {
                    school_name: school_name.to_string(),
                    classes: classes.collect(),
                }),
            }
        }

        catalog
    }

    pub fn classes(&self, school_name: &str) -> Option<&[String]> {
        self.schools
            .iter()
            .find(|entry| entry.school_name == school_name)
            .map(|entry| entry.classes.as_slice())
    }

    pub fn school_names(&self) -> impl Iterator<Item = &str> {
        self.schools.iter().map(|entry| entry.school_name.as_str())
    }
}

pub async fn load(source: &dyn TabularSource, sheet: &str) -> Result<SchoolCatalog, SourceError> {
    let table = source.read_table(sheet).await?;
    let catalog = SchoolCatalog::from_table(&table);
    tracing::debug!(sheet, schools = catalog.schools.len(), "loaded school catalog");
    Ok(catalog)
}
