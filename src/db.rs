use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::SourceError;
use crate::models::Table;
use crate::source::TabularSource;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Cells are kept as a JSON array of strings, one row per sheet row.
#[derive(Debug, Clone)]
pub struct PgWorkbook {
    pool: PgPool,
    workbook_id: String,
}

impl PgWorkbook {
    pub fn new(pool: PgPool, workbook_id: impl Into<String>) -> Self {
        Self {
            pool,
            workbook_id: workbook_id.into(),
        }
    }

    async fn sheet_id(&self, sheet: &str) -> Result<Option<Uuid>, SourceError> {
        let row = sqlx::query(
            "SELECT id FROM session_tracker.sheets WHERE workbook_id = $1 AND name = $2",
        )
        .bind(&self.workbook_id)
        .bind(sheet)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| SourceError::access(sheet, err))?;

        Ok(row.map(|row| row.get("id")))
    }
}

#[async_trait]
impl TabularSource for PgWorkbook {
    async fn read_table(&self, sheet: &str) -> Result<Table, SourceError> {
        let sheet_id = self.sheet_id(sheet).await?.ok_or_else(|| SourceError::Missing {
            sheet: sheet.to_string(),
        })?;

        let records = sqlx::query(
            "SELECT cells FROM session_tracker.sheet_rows WHERE sheet_id = $1 ORDER BY row_index",
        )
        .bind(sheet_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|err| SourceError::access(sheet, err))?;

        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            let Json(cells): Json<Vec<String>> = record
                .try_get("cells")
                .map_err(|err| SourceError::access(sheet, err))?;
            rows.push(cells);
        }

        tracing::debug!(sheet, rows = rows.len(), workbook = %self.workbook_id, "read postgres sheet");
        Ok(Table::new(rows))
    }

    async fn append_row(&self, sheet: &str, cells: &[String]) -> Result<(), SourceError> {
        let result = sqlx::query(
            r#"
            INSERT INTO session_tracker.sheet_rows (id, sheet_id, row_index, cells)
            SELECT $1, s.id,
                   COALESCE((SELECT MAX(r.row_index) + 1
                             FROM session_tracker.sheet_rows r
                             WHERE r.sheet_id = s.id), 0),
                   $4
            FROM session_tracker.sheets s
            WHERE s.workbook_id = $2 AND s.name = $3
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&self.workbook_id)
        .bind(sheet)
        .bind(Json(cells.to_vec()))
        .execute(&self.pool)
        .await
        .map_err(|err| SourceError::write(sheet, err))?;

        if result.rows_affected() == 0 {
            return Err(SourceError::Missing {
                sheet: sheet.to_string(),
            });
        }
        Ok(())
    }

    async fn replace_table(&self, sheet: &str, rows: &[Vec<String>]) -> Result<(), SourceError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| SourceError::write(sheet, err))?;

        let sheet_id: Uuid = sqlx::query(
            r#"
            INSERT INTO session_tracker.sheets (id, workbook_id, name)
            VALUES ($1, $2, $3)
            ON CONFLICT (workbook_id, name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&self.workbook_id)
        .bind(sheet)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| SourceError::write(sheet, err))?
        .get("id");

        sqlx::query("DELETE FROM session_tracker.sheet_rows WHERE sheet_id = $1")
            .bind(sheet_id)
            .execute(&mut *tx)
            .await
            .map_err(|err| SourceError::write(sheet, err))?;

        for (row_index, cells) in rows.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO session_tracker.sheet_rows (id, sheet_id, row_index, cells)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(sheet_id)
            .bind(row_index as i32)
            .bind(Json(cells.clone()))
            .execute(&mut *tx)
            .await
            .map_err(|err| SourceError::write(sheet, err))?;
        }

        tx.commit()
            .await
            .map_err(|err| SourceError::write(sheet, err))?;
        Ok(())
    }
}
