use chrono::{Duration, NaiveDateTime};

use crate::models::{FilterCriteria, SessionRecord};

pub fn apply(records: &[SessionRecord], criteria: &FilterCriteria) -> Vec<SessionRecord> {
    let window = DateWindow::from_criteria(criteria);

    records
        .iter()
        .filter(|r| {
            criteria
                .coordinator()
                .map_or(true, |name| r.coordinator_name == name)
        })
        .filter(|r| criteria.school().map_or(true, |name| r.school_name == name))
        .filter(|r| window.as_ref().map_or(true, |w| w.contains(r.session_start)))
        .cloned()
        .collect()
}

// Upper bound is the midnight after end_date, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub from: Option<NaiveDateTime>,
    pub until: Option<NaiveDateTime>,
}

impl DateWindow {
    pub fn from_criteria(criteria: &FilterCriteria) -> Option<Self> {
        if !criteria.has_date_range() {
            return None;
        }
        Some(Self {
            from: criteria
                .start_date
                .and_then(|date| date.and_hms_opt(0, 0, 0)),
            until: criteria
                .end_date
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .and_then(|midnight| midnight.checked_add_signed(Duration::days(1))),
        })
    }

    pub fn contains(&self, start: Option<NaiveDateTime>) -> bool {
        let Some(start) = start else {
            return false;
        };
        self.from.map_or(true, |from| start >= from)
            && self.until.map_or(true, |until| start <= until)
    }
}
