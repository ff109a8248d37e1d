use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};

pub const ALL_COORDINATORS: &str = "All Coordinators";
pub const ALL_SCHOOLS: &str = "All Schools";

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn headers(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Index one past the last row holding any non-blank cell.
    pub fn last_row_with_data(&self) -> usize {
        self.rows
            .iter()
            .rposition(|row| row.iter().any(|c| !c.trim().is_empty()))
            .map(|i| i + 1)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    DateTime(NaiveDateTime),
    Text(String),
}

impl CellValue {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }
        if let Some(dt) = parse_date_time(trimmed) {
            return CellValue::DateTime(dt);
        }
        if trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
        {
            if let Ok(number) = trimmed.parse::<f64>() {
                return CellValue::Number(number);
            }
        }
        CellValue::Text(raw.to_string())
    }

    pub fn display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) if is_whole(*n) => format!("{}", *n as i64),
            CellValue::Number(n) => n.to_string(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Number(n) if is_whole(*n) => serializer.serialize_i64(*n as i64),
            CellValue::Number(n) => serializer.serialize_f64(*n),
            other => serializer.serialize_str(&other.display()),
        }
    }
}

fn is_whole(n: f64) -> bool {
    n.fract() == 0.0 && n.abs() < 1e15
}

/// Accepts ISO-ish date-times (`T` or space separated, seconds optional) and
/// bare dates, which are taken as midnight.
pub fn parse_date_time(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub timestamp: Option<NaiveDateTime>,
    pub coordinator_name: String,
    pub session_start: Option<NaiveDateTime>,
    pub session_end: Option<NaiveDateTime>,
    pub module: String,
    pub school_name: String,
    pub class_counts: String,
    pub learning_outcomes: String,
    pub challenges_faced: String,
    pub cells: Vec<CellValue>,
}

#[derive(Debug, Clone, Default)]
pub struct SessionSheet {
    pub headers: Vec<String>,
    pub records: Vec<SessionRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub coordinator_name: Option<String>,
    pub school_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl FilterCriteria {
    /// Coordinator to match, or `None` when absent or the sentinel.
    pub fn coordinator(&self) -> Option<&str> {
        active(self.coordinator_name.as_deref(), ALL_COORDINATORS)
    }

    pub fn school(&self) -> Option<&str> {
        active(self.school_name.as_deref(), ALL_SCHOOLS)
    }

    pub fn has_date_range(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }
}

fn active<'a>(value: Option<&'a str>, sentinel: &str) -> Option<&'a str> {
    value.filter(|v| *v != sentinel)
}

/// One line of the "all sessions" report; serialized as `[serial, ...values]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub serial_number: usize,
    pub values: Vec<CellValue>,
}

impl Serialize for ReportRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeSeq;

        let mut seq = serializer.serialize_seq(Some(self.values.len() + 1))?;
        seq.serialize_element(&self.serial_number)?;
        for value in &self.values {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassSession {
    pub module: String,
    pub date: String,
    pub coordinator: String,
    pub students: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassBreakdownEntry {
    pub class_name: String,
    pub sessions: Vec<ClassSession>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub report1: Vec<ReportRow>,
    pub report1_headers: Vec<String>,
    pub report2: Option<Vec<ClassBreakdownEntry>>,
    pub filter_values: FilterCriteria,
    #[serde(skip)]
    pub sessions: Vec<SessionRecord>,
}
