use crate::catalog::SchoolCatalog;
use crate::filter;
use crate::models::{DashboardReport, FilterCriteria, SessionSheet};
use crate::report;

/// The class breakdown is only built when a specific school is selected.
pub fn run(
    sheet: &SessionSheet,
    catalog: &SchoolCatalog,
    criteria: &FilterCriteria,
) -> DashboardReport {
    let filtered = filter::apply(&sheet.records, criteria);
    let (report1_headers, report1) = report::build_sessions_report(&filtered, &sheet.headers);
    let report2 = criteria
        .school()
        .map(|school| report::build_class_breakdown(&filtered, school, catalog));

    DashboardReport {
        report1,
        report1_headers,
        report2,
        filter_values: criteria.clone(),
        sessions: filtered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ALL_SCHOOLS;
    use crate::sessions::HEADERS;
    use crate::testing::table;

    fn sheet() -> SessionSheet {
        SessionSheet::from_table(&table(&[
            &HEADERS,
            &[
                "2024-01-05 11:00:00",
                "A",
                "2024-01-05 09:00:00",
                "2024-01-05 10:00:00",
                "Robotics",
                "X",
                "6a: 20",
                "",
                "",
            ],
            &[
                "2024-01-06 11:00:00",
                "B",
                "2024-01-06 09:00:00",
                "2024-01-06 10:00:00",
                "Coding",
                "Y",
                "p: 4",
                "",
                "",
            ],
        ]))
    }

    fn catalog() -> SchoolCatalog {
        SchoolCatalog::from_table(&table(&[&["X", "Y"], &["6a", "p"], &["7b", ""]]))
    }

    #[test]
    fn single_match_produces_both_reports() {
        let criteria = FilterCriteria {
            coordinator_name: Some("A".to_string()),
            school_name: Some("X".to_string()),
            ..FilterCriteria::default()
        };
        let report = run(&sheet(), &catalog(), &criteria);

        assert_eq!(report.report1.len(), 1);
        assert_eq!(report.report1[0].serial_number, 1);
        let breakdown = report.report2.as_ref().unwrap();
        let classes: Vec<_> = breakdown.iter().map(|e| e.class_name.as_str()).collect();
        assert_eq!(classes, vec!["6a", "7b"]);
        assert_eq!(breakdown[0].sessions.len(), 1);
        assert_eq!(report.filter_values, criteria);
        assert_eq!(report.sessions.len(), report.report1.len());
    }

    #[test]
    fn no_breakdown_without_a_selected_school() {
        let all = FilterCriteria {
            school_name: Some(ALL_SCHOOLS.to_string()),
            ..FilterCriteria::default()
        };
        let report = run(&sheet(), &catalog(), &all);
        assert_eq!(report.report1.len(), 2);
        assert!(report.report2.is_none());

        let report = run(&sheet(), &catalog(), &FilterCriteria::default());
        assert!(report.report2.is_none());
    }

    #[test]
    fn serializes_with_dashboard_field_names() {
        let criteria = FilterCriteria {
            school_name: Some("Y".to_string()),
            ..FilterCriteria::default()
        };
        let json = serde_json::to_value(run(&sheet(), &catalog(), &criteria)).unwrap();

        assert_eq!(json["report1Headers"][0], "S No");
        assert_eq!(json["report1"][0][0], 1);
        assert_eq!(json["report1"][0][1], "B");
        assert_eq!(json["report2"][0]["sessions"][0]["students"], 4);
        assert_eq!(json["filterValues"]["schoolName"], "Y");
        assert!(json["filterValues"]["startDate"].is_null());
        assert!(json.get("sessions").is_none());
    }
}
