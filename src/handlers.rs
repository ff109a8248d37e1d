use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::catalog::{self, SchoolCatalog, SchoolEntry};
use crate::columns::{self, ColumnRef};
use crate::config::SheetNames;
use crate::dashboard;
use crate::models::{
    DashboardReport, FilterCriteria, SessionSheet, ALL_COORDINATORS, ALL_SCHOOLS,
};
use crate::sessions::SessionSubmission;
use crate::source::TabularSource;

#[derive(Debug, Clone, Default)]
pub struct DashboardRequest {
    pub coordinator_name: Option<String>,
    pub school_name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl DashboardRequest {
    pub fn criteria(&self) -> anyhow::Result<FilterCriteria> {
        Ok(FilterCriteria {
            coordinator_name: non_blank(&self.coordinator_name),
            school_name: non_blank(&self.school_name),
            start_date: parse_date("start date", &self.start_date)?,
            end_date: parse_date("end date", &self.end_date)?,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}

fn parse_date(field: &str, value: &Option<String>) -> anyhow::Result<Option<NaiveDate>> {
    non_blank(value)
        .map(|v| {
            NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d")
                .with_context(|| format!("{field} must be YYYY-MM-DD, got \"{v}\""))
        })
        .transpose()
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub report: DashboardReport,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

pub async fn dashboard(
    source: &dyn TabularSource,
    sheets: &SheetNames,
    criteria: &FilterCriteria,
) -> DashboardResponse {
    let mut errors = Vec::new();

    let sheet = match source.read_table(&sheets.sessions).await {
        Ok(table) => SessionSheet::from_table(&table),
        Err(err) => {
            tracing::warn!(sheet = %sheets.sessions, error = %err, "sessions unavailable");
            errors.push(err.to_string());
            SessionSheet::default()
        }
    };

    let catalog = if criteria.school().is_some() {
        match catalog::load(source, &sheets.schools).await {
            Ok(catalog) => catalog,
            Err(err) => {
                tracing::warn!(sheet = %sheets.schools, error = %err, "school catalog unavailable");
                errors.push(err.to_string());
                SchoolCatalog::default()
            }
        }
    } else {
        SchoolCatalog::default()
    };

    let report = dashboard::run(&sheet, &catalog, criteria);
    tracing::info!(
        sessions = sheet.records.len(),
        matched = report.report1.len(),
        breakdown = report.report2.is_some(),
        "dashboard query"
    );

    DashboardResponse { report, errors }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SubmitResponse {
    pub status: &'static str,
}

pub async fn submit(
    source: &dyn TabularSource,
    sheets: &SheetNames,
    submission: &SessionSubmission,
    now: NaiveDateTime,
) -> anyhow::Result<SubmitResponse> {
    let row = submission.to_row(now)?;
    source
        .append_row(&sheets.sessions, &row)
        .await
        .context("could not save the session")?;

    tracing::info!(
        coordinator = %submission.name.trim(),
        school = %submission.school_name.trim(),
        "session recorded"
    );
    Ok(SubmitResponse { status: "success" })
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct FilterOptions {
    pub coordinators: Vec<String>,
    pub schools: Vec<String>,
    pub modules: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

pub async fn filter_options(source: &dyn TabularSource, sheets: &SheetNames) -> FilterOptions {
    let mut errors = Vec::new();

    let coordinators =
        columns::extract(source, &sheets.coordinators, &ColumnRef::Index(0), true).await;
    let modules = columns::extract(source, &sheets.modules, &ColumnRef::Index(0), true).await;
    errors.extend(coordinators.error().map(str::to_string));
    errors.extend(modules.error().map(str::to_string));

    let catalog = match catalog::load(source, &sheets.schools).await {
        Ok(catalog) => catalog,
        Err(err) if err.is_missing() => SchoolCatalog::default(),
        Err(err) => {
            tracing::warn!(sheet = %sheets.schools, error = %err, "school catalog unavailable");
            errors.push(err.to_string());
            SchoolCatalog::default()
        }
    };

    FilterOptions {
        coordinators: with_sentinel(ALL_COORDINATORS, coordinators.values()),
        schools: with_sentinel(ALL_SCHOOLS, catalog.school_names()),
        modules: modules.values().to_vec(),
        errors,
    }
}

fn with_sentinel<S: AsRef<str>>(
    sentinel: &str,
    names: impl IntoIterator<Item = S>,
) -> Vec<String> {
    std::iter::once(sentinel.to_string())
        .chain(names.into_iter().map(|name| name.as_ref().to_string()))
        .collect()
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SchoolData {
    pub schools: Vec<SchoolEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn school_data(source: &dyn TabularSource, sheets: &SheetNames) -> SchoolData {
    match catalog::load(source, &sheets.schools).await {
        Ok(catalog) => SchoolData {
            schools: catalog.schools,
            error: None,
        },
        Err(err) => {
            tracing::warn!(sheet = %sheets.schools, error = %err, "school catalog unavailable");
            SchoolData {
                schools: Vec::new(),
                error: Some(err.to_string()),
            }
        }
    }
}
