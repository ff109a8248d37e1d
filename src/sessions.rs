use chrono::NaiveDateTime;

use crate::error::SubmissionError;
use crate::models::{parse_date_time, CellValue, SessionRecord, SessionSheet, Table};

pub const TIMESTAMP: &str = "Timestamp";
pub const COORDINATOR: &str = "Name";
pub const SESSION_START: &str = "Session Start Time";
pub const SESSION_END: &str = "Session End Time";
pub const MODULE: &str = "Module";
pub const SCHOOL: &str = "School Name";
pub const CLASS_COUNTS: &str = "Class Counts";
pub const LEARNING_OUTCOMES: &str = "Learning Outcomes";
pub const CHALLENGES: &str = "Challenges Faced";

/// Header row written to a fresh session sheet; also the fallback layout when
/// a header cannot be found by name.
pub const HEADERS: [&str; 9] = [
    TIMESTAMP,
    COORDINATOR,
    SESSION_START,
    SESSION_END,
    MODULE,
    SCHOOL,
    CLASS_COUNTS,
    LEARNING_OUTCOMES,
    CHALLENGES,
];

const STORED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionColumns {
    pub timestamp: usize,
    pub coordinator: usize,
    pub start: usize,
    pub end: usize,
    pub module: usize,
    pub school: usize,
    pub class_counts: usize,
    pub learning_outcomes: usize,
    pub challenges: usize,
}

impl SessionColumns {
    pub fn resolve(headers: &[String]) -> Self {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .or_else(|| HEADERS.iter().position(|h| *h == name))
                .unwrap_or(0)
        };
        Self {
            timestamp: find(TIMESTAMP),
            coordinator: find(COORDINATOR),
            start: find(SESSION_START),
            end: find(SESSION_END),
            module: find(MODULE),
            school: find(SCHOOL),
            class_counts: find(CLASS_COUNTS),
            learning_outcomes: find(LEARNING_OUTCOMES),
            challenges: find(CHALLENGES),
        }
    }
}

impl SessionSheet {
    pub fn from_table(table: &Table) -> Self {
        let headers = table.headers().to_vec();
        let columns = SessionColumns::resolve(&headers);
        let last = table.last_row_with_data();

        let records = (1..last)
            .map(|row| {
                let text = |col: usize| table.cell(row, col).to_string();
                let date = |col: usize| parse_date_time(table.cell(row, col));
                SessionRecord {
                    timestamp: date(columns.timestamp),
                    coordinator_name: text(columns.coordinator),
                    session_start: date(columns.start),
                    session_end: date(columns.end),
                    module: text(columns.module),
                    school_name: text(columns.school),
                    class_counts: text(columns.class_counts),
                    learning_outcomes: text(columns.learning_outcomes),
                    challenges_faced: text(columns.challenges),
                    cells: table.rows[row].iter().map(|c| CellValue::parse(c)).collect(),
                }
            })
            .collect();

        SessionSheet { headers, records }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSubmission {
    pub name: String,
    pub session_start_time: String,
    pub session_end_time: String,
    pub module: String,
    pub school_name: String,
    pub class_counts: String,
    pub learning_outcomes: String,
    pub challenges_faced: String,
}

impl SessionSubmission {
    pub fn to_row(&self, timestamp: NaiveDateTime) -> Result<Vec<String>, SubmissionError> {
        let name = required("name", &self.name)?;
        let module = required("module", &self.module)?;
        let school_name = required("school name", &self.school_name)?;
        let start = date_time("session start time", &self.session_start_time)?;
        let end = date_time("session end time", &self.session_end_time)?;

        Ok(vec![
            timestamp.format(STORED_FORMAT).to_string(),
            name.to_string(),
            start.format(STORED_FORMAT).to_string(),
            end.format(STORED_FORMAT).to_string(),
            module.to_string(),
            school_name.to_string(),
            self.class_counts.trim().to_string(),
            self.learning_outcomes.clone(),
            self.challenges_faced.clone(),
        ])
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, SubmissionError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(SubmissionError::MissingField { field });
    }
    Ok(value)
}

fn date_time(field: &'static str, value: &str) -> Result<NaiveDateTime, SubmissionError> {
    let value = required(field, value)?;
    parse_date_time(value).ok_or_else(|| SubmissionError::InvalidDateTime {
        field,
        value: value.to_string(),
    })
}

pub fn header_row() -> Vec<String> {
    HEADERS.iter().map(|h| h.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::table;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, 0))
            .unwrap()
    }

    fn submission() -> SessionSubmission {
        SessionSubmission {
            name: " Avery Lee ".to_string(),
            session_start_time: "2024-01-05T09:00".to_string(),
            session_end_time: "2024-01-05T10:30".to_string(),
            module: "Robotics".to_string(),
            school_name: "Hillside".to_string(),
            class_counts: "6a: 20, 7b: 15".to_string(),
            learning_outcomes: "Built a line follower".to_string(),
            challenges_faced: String::new(),
        }
    }

    #[test]
    fn resolves_columns_by_name_then_position() {
        let headers: Vec<String> = ["School Name", "Name"].iter().map(|s| s.to_string()).collect();
        let columns = SessionColumns::resolve(&headers);
        assert_eq!(columns.school, 0);
        assert_eq!(columns.coordinator, 1);
        assert_eq!(columns.start, 2);
        assert_eq!(columns.challenges, 8);
    }

    #[test]
    fn builds_records_from_sheet_rows() {
        let t = table(&[
            &HEADERS,
            &[
                "2024-01-05 11:00:00",
                "Avery",
                "2024-01-05 09:00:00",
                "2024-01-05 10:00:00",
                "Robotics",
                "Hillside",
                "6a: 20",
                "Sensors",
                "",
            ],
            &["", "", "", "", "", "", "", "", ""],
        ]);
        let sheet = SessionSheet::from_table(&t);

        assert_eq!(sheet.headers.len(), 9);
        assert_eq!(sheet.records.len(), 1);
        let record = &sheet.records[0];
        assert_eq!(record.coordinator_name, "Avery");
        assert_eq!(record.school_name, "Hillside");
        assert_eq!(record.session_start, Some(at(2024, 1, 5, 9, 0)));
        assert_eq!(record.cells[2], CellValue::DateTime(at(2024, 1, 5, 9, 0)));
        assert_eq!(record.cells[8], CellValue::Empty);
    }

    #[test]
    fn submission_row_follows_header_order() {
        let row = submission().to_row(at(2024, 1, 5, 11, 15)).unwrap();
        assert_eq!(
            row,
            vec![
                "2024-01-05 11:15:00",
                "Avery Lee",
                "2024-01-05 09:00:00",
                "2024-01-05 10:30:00",
                "Robotics",
                "Hillside",
                "6a: 20, 7b: 15",
                "Built a line follower",
                "",
            ]
        );
    }

    #[test]
    fn submission_requires_core_fields() {
        let mut missing = submission();
        missing.school_name = "  ".to_string();
        let err = missing.to_row(at(2024, 1, 5, 11, 15)).unwrap_err();
        assert_eq!(err.to_string(), "school name is required");

        let mut bad_time = submission();
        bad_time.session_end_time = "half past ten".to_string();
        let err = bad_time.to_row(at(2024, 1, 5, 11, 15)).unwrap_err();
        assert!(matches!(err, SubmissionError::InvalidDateTime { .. }));
    }
}
