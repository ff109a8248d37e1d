use std::path::Path;

use anyhow::Context;

use crate::config::SheetNames;
use crate::sessions;
use crate::source::TabularSource;

fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
    data.iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect()
}

pub async fn seed(source: &dyn TabularSource, sheets: &SheetNames) -> anyhow::Result<()> {
    let coordinators = rows(&[
        &["Coordinator"],
        &["Avery Lee"],
        &["Jules Moreno"],
        &["Kiara Patel"],
    ]);
    let modules = rows(&[
        &["Module"],
        &["Robotics"],
        &["Coding Basics"],
        &["Digital Safety"],
    ]);
    let schools = rows(&[
        &["Hillside Primary", "Riverside Academy", "Lakeside School"],
        &["6a", "7b", ""],
        &["6b", "8a", ""],
        &["7a", "", ""],
    ]);

    let mut session_rows = vec![sessions::header_row()];
    session_rows.extend(rows(&[
        &[
            "2026-01-12 15:02:11",
            "Avery Lee",
            "2026-01-12 09:00:00",
            "2026-01-12 10:30:00",
            "Robotics",
            "Hillside Primary",
            "6a: 24, 6b: 22",
            "Assembled drive bases",
            "Two kits missing sensors",
        ],
        &[
            "2026-01-14 12:40:03",
            "Jules Moreno",
            "2026-01-14 11:00:00",
            "2026-01-14 12:00:00",
            "Coding Basics",
            "Riverside Academy",
            "7b: 28",
            "Loops and conditionals",
            "",
        ],
        &[
            "2026-01-20 14:15:47",
            "Kiara Patel",
            "2026-01-20 13:00:00",
            "2026-01-20 14:00:00",
            "Digital Safety",
            "Hillside Primary",
            "7a: 30, 6a: 25",
            "Password hygiene",
            "Short on time",
        ],
        &[
            "2026-02-02 10:05:30",
            "Avery Lee",
            "2026-02-02 08:45:00",
            "2026-02-02 09:45:00",
            "Robotics",
            "Riverside Academy",
            "8a: 19",
            "Line following",
            "",
        ],
    ]));

    source
        .replace_table(&sheets.coordinators, &coordinators)
        .await?;
    source.replace_table(&sheets.modules, &modules).await?;
    source.replace_table(&sheets.schools, &schools).await?;
    source.replace_table(&sheets.sessions, &session_rows).await?;
    Ok(())
}

/// Returns the number of data rows imported.
pub async fn import_csv(
    source: &dyn TabularSource,
    sheet: &str,
    csv_path: &Path,
) -> anyhow::Result<usize> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    source.replace_table(sheet, &rows).await?;
    Ok(rows.len().saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::models::SessionSheet;
    use crate::source::CsvWorkbook;

    #[tokio::test]
    async fn seed_writes_every_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let workbook = CsvWorkbook::new(dir.path());
        let sheets = SheetNames::default();

        seed(&workbook, &sheets).await.unwrap();

        let catalog = catalog::load(&workbook, &sheets.schools).await.unwrap();
        assert_eq!(catalog.schools.len(), 3);
        assert_eq!(catalog.classes("Lakeside School"), Some(&[][..]));

        let table = workbook.read_table(&sheets.sessions).await.unwrap();
        let sheet = SessionSheet::from_table(&table);
        assert_eq!(sheet.records.len(), 4);
        assert!(sheet.records.iter().all(|r| r.session_start.is_some()));
    }

    #[tokio::test]
    async fn import_replaces_sheet_contents() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("modules.csv");
        std::fs::write(&csv_path, "Module\nRobotics\nArt\n").unwrap();
        let workbook = CsvWorkbook::new(dir.path().join("book"));

        let imported = import_csv(&workbook, "Modules", &csv_path).await.unwrap();
        assert_eq!(imported, 2);

        let table = workbook.read_table("Modules").await.unwrap();
        assert_eq!(table.cell(2, 0), "Art");
    }
}
