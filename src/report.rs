use std::collections::HashMap;
use std::fmt::Write;

use chrono::NaiveDateTime;

use crate::catalog::SchoolCatalog;
use crate::class_counts;
use crate::models::{
    CellValue, ClassBreakdownEntry, ClassSession, DashboardReport, ReportRow, SessionRecord,
    ALL_COORDINATORS, ALL_SCHOOLS,
};
use crate::sessions::{SESSION_END, SESSION_START, TIMESTAMP};

pub const SERIAL_HEADER: &str = "S No";
pub const DATE_HEADER: &str = "Date";

const DATE_FORMAT: &str = "%-m/%-d/%Y";
const DATE_TIME_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

pub fn format_date(value: NaiveDateTime) -> String {
    value.format(DATE_FORMAT).to_string()
}

pub fn format_date_time(value: NaiveDateTime) -> String {
    value.format(DATE_TIME_FORMAT).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rendering {
    DateOnly,
    Full,
}

#[derive(Debug, Clone, Copy)]
struct RetainedColumn {
    source: usize,
    rendering: Rendering,
}

/// Drops the timestamp and end columns and renames the start column "Date".
pub fn build_sessions_report(
    records: &[SessionRecord],
    headers: &[String],
) -> (Vec<String>, Vec<ReportRow>) {
    let mut report_headers = vec![SERIAL_HEADER.to_string()];
    let mut retained = Vec::new();

    for (source, header) in headers.iter().enumerate() {
        match header.trim() {
            TIMESTAMP | SESSION_END => continue,
            SESSION_START => {
                report_headers.push(DATE_HEADER.to_string());
                retained.push(RetainedColumn {
                    source,
                    rendering: Rendering::DateOnly,
                });
            }
            _ => {
                report_headers.push(header.clone());
                retained.push(RetainedColumn {
                    source,
                    rendering: Rendering::Full,
                });
            }
        }
    }

    let rows = records
        .iter()
        .enumerate()
        .map(|(i, record)| ReportRow {
            serial_number: i + 1,
            values: retained
                .iter()
                .map(|column| {
                    let value = record.cells.get(column.source).unwrap_or(&CellValue::Empty);
                    render(value, column.rendering)
                })
                .collect(),
        })
        .collect();

    (report_headers, rows)
}

fn render(value: &CellValue, rendering: Rendering) -> CellValue {
    match (value, rendering) {
        (CellValue::DateTime(dt), Rendering::DateOnly) => CellValue::Text(format_date(*dt)),
        (CellValue::DateTime(dt), Rendering::Full) => CellValue::Text(format_date_time(*dt)),
        (other, _) => other.clone(),
    }
}

// Every catalog class gets an entry, even without sessions.
pub fn build_class_breakdown(
    records: &[SessionRecord],
    school_name: &str,
    catalog: &SchoolCatalog,
) -> Vec<ClassBreakdownEntry> {
    let Some(classes) = catalog.classes(school_name) else {
        tracing::debug!(school = school_name, "school not in catalog, no class breakdown");
        return Vec::new();
    };

    let mut entries: Vec<ClassBreakdownEntry> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for class_name in classes {
        if index.contains_key(class_name.as_str()) {
            continue;
        }
        index.insert(class_name.as_str(), entries.len());
        entries.push(ClassBreakdownEntry {
            class_name: class_name.clone(),
            sessions: Vec::new(),
        });
    }

    for record in records {
        let date = record.session_start.map(format_date).unwrap_or_default();
        for count in class_counts::parse(&record.class_counts) {
            match index.get(count.class_name.as_str()) {
                Some(&i) => entries[i].sessions.push(ClassSession {
                    module: record.module.clone(),
                    date: date.clone(),
                    coordinator: record.coordinator_name.clone(),
                    students: count.count,
                }),
                None => tracing::debug!(
                    school = school_name,
                    class = %count.class_name,
                    "dropping count for class not listed for school"
                ),
            }
        }
    }

    entries
}

pub fn render_markdown(report: &DashboardReport) -> String {
    let mut output = String::new();
    let criteria = &report.filter_values;

    let coordinator = criteria.coordinator().unwrap_or(ALL_COORDINATORS);
    let school = criteria.school().unwrap_or(ALL_SCHOOLS);
    let range = match (criteria.start_date, criteria.end_date) {
        (None, None) => "all dates".to_string(),
        (Some(start), None) => format!("from {start}"),
        (None, Some(end)) => format!("through {end}"),
        (Some(start), Some(end)) => format!("{start} to {end}"),
    };

    let _ = writeln!(output, "# Session Dashboard");
    let _ = writeln!(output, "Generated for {coordinator} at {school} ({range})");
    let _ = writeln!(output);
    let _ = writeln!(output, "## All Sessions");

    if report.report1.is_empty() {
        let _ = writeln!(output, "No sessions match these filters.");
    } else {
        let _ = writeln!(output, "| {} |", escape_all(&report.report1_headers).join(" | "));
        let _ = writeln!(
            output,
            "|{}",
            "---|".repeat(report.report1_headers.len())
        );
        for row in &report.report1 {
            let mut cells = vec![row.serial_number.to_string()];
            cells.extend(row.values.iter().map(|v| escape(&v.display())));
            let _ = writeln!(output, "| {} |", cells.join(" | "));
        }
    }

    if let Some(breakdown) = &report.report2 {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Class Breakdown");

        if breakdown.is_empty() {
            let _ = writeln!(output, "No classes listed for {school}.");
        }
        for entry in breakdown {
            let _ = writeln!(output);
            let _ = writeln!(output, "### {}", entry.class_name);
            if entry.sessions.is_empty() {
                let _ = writeln!(output, "No sessions recorded.");
                continue;
            }
            let total: u64 = entry.sessions.iter().map(|s| s.students).sum();
            for session in &entry.sessions {
                let _ = writeln!(
                    output,
                    "- {} on {} with {}: {} students",
                    session.module, session.date, session.coordinator, session.students
                );
            }
            let _ = writeln!(
                output,
                "- Total: {} students across {} sessions",
                total,
                entry.sessions.len()
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Session Notes");

    if report.sessions.is_empty() {
        let _ = writeln!(output, "No sessions match these filters.");
    }
    for session in &report.sessions {
        let date = session.session_start.map(format_date).unwrap_or_default();
        let length = match (session.session_start, session.session_end) {
            (Some(start), Some(end)) if end >= start => {
                format!(", {} min", (end - start).num_minutes())
            }
            _ => String::new(),
        };
        let _ = writeln!(
            output,
            "- {} at {} on {} ({}{}): {}",
            session.coordinator_name,
            session.school_name,
            date,
            session.module,
            length,
            or_dash(&session.learning_outcomes)
        );
        if !session.challenges_faced.trim().is_empty() {
            let _ = writeln!(output, "  - Challenges: {}", session.challenges_faced.trim());
        }
        if let Some(recorded) = session.timestamp {
            let _ = writeln!(output, "  - Recorded {}", format_date_time(recorded));
        }
    }

    output
}

fn or_dash(value: &str) -> &str {
    match value.trim() {
        "" => "-",
        trimmed => trimmed,
    }
}

fn escape(value: &str) -> String {
    value.replace('|', "\\|").replace(['\r', '\n'], " ")
}

fn escape_all(values: &[String]) -> Vec<String> {
    values.iter().map(|v| escape(v)).collect()
}
