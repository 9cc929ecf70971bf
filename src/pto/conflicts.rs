use std::collections::HashSet;

use chrono::NaiveDate;

use crate::parse;
use crate::pto::{LocationSet, PtoRequest, PtoStatus, PtoSummary};
use crate::schedule::{ScheduleDay, Slot};

fn normalized_person_name(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Location match over the default EP/NL/BOTH set.
pub fn pto_location_matches(request_location: &str, scope_location: &str) -> bool {
    LocationSet::default().matches(request_location, scope_location)
}

/// Inclusive interval overlap. A request missing either date never overlaps.
pub fn pto_date_overlap(request: &PtoRequest, start: NaiveDate, end: NaiveDate) -> bool {
    let (Some(req_start), Some(req_end)) = (
        parse::iso_date(&request.start_date),
        parse::iso_date(&request.end_date),
    ) else {
        return false;
    };
    req_start <= end && req_end >= start
}

pub fn pto_rows_for_range<'a>(
    requests: &'a [PtoRequest],
    scope_location: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<&'a PtoRequest> {
    LocationSet::default().rows_for_range(requests, scope_location, start, end)
}

pub fn pto_rows_for_day<'a>(
    requests: &'a [PtoRequest],
    scope_location: &str,
    date: NaiveDate,
) -> Vec<&'a PtoRequest> {
    pto_rows_for_range(requests, scope_location, date, date)
}

/// Normalized names of everyone assigned to any slot on the day.
pub fn assigned_people_for_day(slots: &[Slot]) -> HashSet<String> {
    slots
        .iter()
        .flat_map(|slot| slot.assignments.iter())
        .map(|name| normalized_person_name(name))
        .filter(|name| !name.is_empty())
        .collect()
}

pub fn pto_summary_for_day(
    requests: &[PtoRequest],
    location: &str,
    day: &ScheduleDay,
) -> PtoSummary {
    LocationSet::default().summary_for_day(requests, location, day)
}

impl LocationSet {
    pub fn rows_for_range<'a>(
        &self,
        requests: &'a [PtoRequest],
        scope_location: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<&'a PtoRequest> {
        requests
            .iter()
            .filter(|request| {
                self.matches(&request.location, scope_location)
                    && pto_date_overlap(request, start, end)
            })
            .collect()
    }

    /// Counts requests touching the day and flags actionable ones whose
    /// employee is also on the schedule.
    pub fn summary_for_day(
        &self,
        requests: &[PtoRequest],
        location: &str,
        day: &ScheduleDay,
    ) -> PtoSummary {
        let rows = self.rows_for_range(requests, location, day.date, day.date);
        let assigned = assigned_people_for_day(&day.slots);
        let conflicts = rows
            .iter()
            .filter(|row| row.status.is_actionable())
            .filter(|row| assigned.contains(&normalized_person_name(&row.employee)))
            .map(|row| (*row).clone())
            .collect();

        PtoSummary {
            total: rows.len(),
            approved_count: rows
                .iter()
                .filter(|row| row.status == PtoStatus::Approved)
                .count(),
            pending_count: rows
                .iter()
                .filter(|row| row.status == PtoStatus::Pending)
                .count(),
            conflicts,
        }
    }
}
