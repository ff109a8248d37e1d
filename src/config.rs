use std::path::PathBuf;

use clap::Args;

/// Where the workbook lives and what its sheets are called.
#[derive(Args, Debug, Clone)]
pub struct WorkbookArgs {
    /// Directory of `<sheet>.csv` files; when unset the Postgres workbook is used
    #[arg(long, global = true, env = "SESSION_TRACKER_WORKBOOK_DIR")]
    pub workbook_dir: Option<PathBuf>,

    /// Identifier of the workbook inside Postgres
    #[arg(
        long,
        global = true,
        env = "SESSION_TRACKER_SPREADSHEET_ID",
        default_value = "default"
    )]
    pub spreadsheet_id: String,

    #[arg(long, global = true, default_value = "Sessions")]
    pub sessions_sheet: String,

    #[arg(long, global = true, default_value = "Schools")]
    pub schools_sheet: String,

    #[arg(long, global = true, default_value = "Coordinators")]
    pub coordinators_sheet: String,

    #[arg(long, global = true, default_value = "Modules")]
    pub modules_sheet: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    CsvDirectory(PathBuf),
    Postgres { database_url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetNames {
    pub sessions: String,
    pub schools: String,
    pub coordinators: String,
    pub modules: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            sessions: "Sessions".to_string(),
            schools: "Schools".to_string(),
            coordinators: "Coordinators".to_string(),
            modules: "Modules".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbookConfig {
    pub backend: Backend,
    pub spreadsheet_id: String,
    pub sheets: SheetNames,
}

impl WorkbookConfig {
    /// A workbook directory wins over `database_url`; one of the two is required.
    pub fn resolve(args: &WorkbookArgs, database_url: Option<String>) -> anyhow::Result<Self> {
        let backend = match (&args.workbook_dir, database_url) {
            (Some(dir), _) => Backend::CsvDirectory(dir.clone()),
            (None, Some(database_url)) => Backend::Postgres { database_url },
            (None, None) => anyhow::bail!(
                "set --workbook-dir (SESSION_TRACKER_WORKBOOK_DIR) or DATABASE_URL"
            ),
        };

        Ok(Self {
            backend,
            spreadsheet_id: args.spreadsheet_id.clone(),
            sheets: SheetNames {
                sessions: args.sessions_sheet.clone(),
                schools: args.schools_sheet.clone(),
                coordinators: args.coordinators_sheet.clone(),
                modules: args.modules_sheet.clone(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(workbook_dir: Option<&str>) -> WorkbookArgs {
        WorkbookArgs {
            workbook_dir: workbook_dir.map(PathBuf::from),
            spreadsheet_id: "north-district".to_string(),
            sessions_sheet: "Form Responses 1".to_string(),
            schools_sheet: "Schools".to_string(),
            coordinators_sheet: "Coordinators".to_string(),
            modules_sheet: "Modules".to_string(),
        }
    }

    #[test]
    fn workbook_dir_takes_precedence() {
        let config =
            WorkbookConfig::resolve(&args(Some("data")), Some("postgres://x".to_string())).unwrap();
        assert_eq!(config.backend, Backend::CsvDirectory(PathBuf::from("data")));
        assert_eq!(config.sheets.sessions, "Form Responses 1");
    }

    #[test]
    fn falls_back_to_postgres() {
        let config = WorkbookConfig::resolve(&args(None), Some("postgres://x".to_string())).unwrap();
        assert_eq!(
            config.backend,
            Backend::Postgres {
                database_url: "postgres://x".to_string()
            }
        );
        assert_eq!(config.spreadsheet_id, "north-district");
    }

    #[test]
    fn requires_a_backend() {
        assert!(WorkbookConfig::resolve(&args(None), None).is_err());
    }
}
