use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod catalog;
mod class_counts;
mod columns;
mod config;
mod dashboard;
mod db;
mod error;
mod filter;
mod handlers;
mod models;
mod report;
mod sessions;
mod setup;
mod source;
#[cfg(test)]
mod testing;

use columns::ColumnRef;
use config::{Backend, WorkbookArgs, WorkbookConfig};
use source::{CsvWorkbook, TabularSource};

#[derive(Parser)]
#[command(name = "session-tracker")]
#[command(about = "Session entry and reporting over a spreadsheet workbook", long_about = None)]
struct Cli {
    #[command(flatten)]
    workbook: WorkbookArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the Postgres workbook schema
    InitDb,
    /// Load a sample workbook
    Seed,
    /// Replace a sheet with the rows of a CSV file
    Import {
        #[arg(long)]
        sheet: String,
        #[arg(long)]
        csv: PathBuf,
    },
    /// Record one session
    Submit {
        #[arg(long)]
        name: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long)]
        module: String,
        #[arg(long)]
        school: String,
        /// Students per class, repeatable
        #[arg(long = "class", value_name = "CLASS=COUNT")]
        classes: Vec<String>,
        /// Pre-encoded counts, e.g. "6a: 20, 7b: 15"
        #[arg(long, conflicts_with = "classes")]
        class_counts: Option<String>,
        #[arg(long, default_value = "")]
        learning_outcomes: String,
        #[arg(long, default_value = "")]
        challenges: String,
    },
    /// Filter sessions and build the dashboard reports
    Dashboard {
        #[arg(long)]
        coordinator: Option<String>,
        #[arg(long)]
        school: Option<String>,
        /// YYYY-MM-DD, inclusive
        #[arg(long)]
        start_date: Option<String>,
        /// YYYY-MM-DD, inclusive
        #[arg(long)]
        end_date: Option<String>,
        /// Write a markdown report here instead of printing JSON
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List coordinators, schools and modules for the filter controls
    FilterOptions,
    /// List schools with their classes
    SchoolData,
    /// Print the non-blank values of one sheet column
    Column {
        #[arg(long)]
        sheet: String,
        /// Zero-based index or header name
        #[arg(long)]
        column: ColumnRef,
        #[arg(long)]
        include_header: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = WorkbookConfig::resolve(&cli.workbook, std::env::var("DATABASE_URL").ok())?;
    let (source, pool) = open_workbook(&config).await?;
    let sheets = &config.sheets;

    match cli.command {
        Commands::InitDb => {
            let pool = pool.context("init-db needs the Postgres backend (DATABASE_URL)")?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            setup::seed(source.as_ref(), sheets).await?;
            println!("Seed workbook written.");
        }
        Commands::Import { sheet, csv } => {
            let imported = setup::import_csv(source.as_ref(), &sheet, &csv).await?;
            println!("Imported {imported} rows into {sheet} from {}.", csv.display());
        }
        Commands::Submit {
            name,
            start,
            end,
            module,
            school,
            classes,
            class_counts: encoded,
            learning_outcomes,
            challenges,
        } => {
            let class_counts = if classes.is_empty() {
                encoded.unwrap_or_default()
            } else {
                let counts = classes
                    .iter()
                    .map(|raw| class_counts::parse_assignment(raw))
                    .collect::<Result<Vec<_>, _>>()?;
                class_counts::encode(&counts)
            };
            let submission = sessions::SessionSubmission {
                name,
                session_start_time: start,
                session_end_time: end,
                module,
                school_name: school,
                class_counts,
                learning_outcomes,
                challenges_faced: challenges,
            };
            let now = chrono::Local::now().naive_local();
            let response = handlers::submit(source.as_ref(), sheets, &submission, now).await?;
            print_json(&response)?;
        }
        Commands::Dashboard {
            coordinator,
            school,
            start_date,
            end_date,
            out,
        } => {
            let request = handlers::DashboardRequest {
                coordinator_name: coordinator,
                school_name: school,
                start_date,
                end_date,
            };
            let criteria = request.criteria()?;
            let response = handlers::dashboard(source.as_ref(), sheets, &criteria).await;

            match out {
                Some(out) => {
                    for error in &response.errors {
                        eprintln!("warning: {error}");
                    }
                    std::fs::write(&out, report::render_markdown(&response.report))?;
                    println!("Report written to {}.", out.display());
                }
                None => print_json(&response)?,
            }
        }
        Commands::FilterOptions => {
            print_json(&handlers::filter_options(source.as_ref(), sheets).await)?;
        }
        Commands::SchoolData => {
            print_json(&handlers::school_data(source.as_ref(), sheets).await)?;
        }
        Commands::Column {
            sheet,
            column,
            include_header,
        } => {
            let data = columns::extract(source.as_ref(), &sheet, &column, !include_header).await;
            print_json(&data)?;
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "session_tracker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn open_workbook(
    config: &WorkbookConfig,
) -> anyhow::Result<(Box<dyn TabularSource>, Option<PgPool>)> {
    match &config.backend {
        Backend::CsvDirectory(dir) => {
            tracing::debug!(dir = %dir.display(), "using csv workbook");
            Ok((Box::new(CsvWorkbook::new(dir)), None))
        }
        Backend::Postgres { database_url } => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await
                .context("failed to connect to Postgres")?;
            tracing::debug!(workbook = %config.spreadsheet_id, "using postgres workbook");
            let workbook = db::PgWorkbook::new(pool.clone(), config.spreadsheet_id.clone());
            Ok((Box::new(workbook), Some(pool)))
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
